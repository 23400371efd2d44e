use serde::{Deserialize, Serialize};

use crate::aligner::scoring::{AlignmentScoring, GAP_SYMBOL};

pub const DEFAULT_MATCH_AWARD: i32 = 1;
pub const DEFAULT_MISMATCH_PENALTY: i32 = -1;
pub const DEFAULT_GAP_PENALTY: i32 = -1;

/// Fixed match award, mismatch penalty and linear gap penalty
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapLinear {
    match_award: i32,
    mismatch_penalty: i32,
    gap_penalty: i32,
}

impl GapLinear {
    pub fn new(match_award: i32, mismatch_penalty: i32, gap_penalty: i32) -> Self {
        Self { match_award, mismatch_penalty, gap_penalty }
    }

    #[inline(always)]
    pub fn match_award(&self) -> i32 {
        self.match_award
    }

    #[inline(always)]
    pub fn mismatch_penalty(&self) -> i32 {
        self.mismatch_penalty
    }
}

impl Default for GapLinear {
    fn default() -> Self {
        Self::new(DEFAULT_MATCH_AWARD, DEFAULT_MISMATCH_PENALTY, DEFAULT_GAP_PENALTY)
    }
}

impl AlignmentScoring for GapLinear {
    #[inline]
    fn match_score(&self, a: u8, b: u8) -> i32 {
        if a == b {
            self.match_award
        } else if a == GAP_SYMBOL || b == GAP_SYMBOL {
            self.gap_penalty
        } else {
            self.mismatch_penalty
        }
    }

    #[inline(always)]
    fn gap_penalty(&self) -> i32 {
        self.gap_penalty
    }
}

#[cfg(test)]
mod tests {
    use super::GapLinear;
    use crate::aligner::scoring::AlignmentScoring;

    #[test]
    fn test_match_score() {
        let scoring = GapLinear::new(2, -3, -5);

        assert_eq!(scoring.match_score(b'A', b'A'), 2);
        assert_eq!(scoring.match_score(b'A', b'C'), -3);
        assert_eq!(scoring.match_score(b'-', b'C'), -5);
        assert_eq!(scoring.match_score(b'G', b'-'), -5);

        // Equality is checked before the gap marker
        assert_eq!(scoring.match_score(b'-', b'-'), 2);
    }

    #[test]
    fn test_defaults() {
        let scoring = GapLinear::default();
        assert_eq!(scoring.match_award(), 1);
        assert_eq!(scoring.mismatch_penalty(), -1);
        assert_eq!(scoring.gap_penalty(), -1);
        assert_eq!(scoring.gap_cost(4), -4);
        assert_eq!(scoring.gap_cost(0), 0);
    }
}
