use serde::Serialize;

use crate::aligner::scoring::{AlignmentScoring, GAP_SYMBOL};

/// An aligned pair of residues. The first element represents the position in sequence A, the
/// second element the position in sequence B.
///
/// In case of an insertion or deletion, one of the elements is `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AlignedPair {
    /// Sequence A position
    pub apos: Option<usize>,

    /// Sequence B position
    pub bpos: Option<usize>,
}

impl AlignedPair {
    pub fn new(apos: Option<usize>, bpos: Option<usize>) -> Self {
        Self { apos, bpos }
    }

    pub fn is_aligned(&self) -> bool {
        matches!((self.apos, self.bpos), (Some(_), Some(_)))
    }

    pub fn is_indel(&self) -> bool {
        !self.is_aligned()
    }
}

/// One optimal global alignment of two sequences
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alignment {
    score: i64,
    pairs: Vec<AlignedPair>,
    aligned_a: Vec<u8>,
    aligned_b: Vec<u8>,
}

impl Alignment {
    /// Build an alignment from pairs given in start-to-end order
    pub fn from_pairs(seq_a: &[u8], seq_b: &[u8], pairs: Vec<AlignedPair>, score: i64) -> Self {
        let aligned_a = pairs.iter()
            .map(|p| p.apos.map_or(GAP_SYMBOL, |pos| seq_a[pos]))
            .collect();
        let aligned_b = pairs.iter()
            .map(|p| p.bpos.map_or(GAP_SYMBOL, |pos| seq_b[pos]))
            .collect();

        Self { score, pairs, aligned_a, aligned_b }
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn pairs(&self) -> &[AlignedPair] {
        &self.pairs
    }

    /// Sequence A with gap symbols inserted
    pub fn aligned_a(&self) -> &[u8] {
        &self.aligned_a
    }

    /// Sequence B with gap symbols inserted
    pub fn aligned_b(&self) -> &[u8] {
        &self.aligned_b
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn stats(&self) -> AlignmentStats {
        let mut stats = AlignmentStats { length: self.len(), ..Default::default() };

        for (a, b) in self.aligned_a.iter().zip(&self.aligned_b) {
            if *a == GAP_SYMBOL || *b == GAP_SYMBOL {
                stats.gaps += 1;
            } else if a == b {
                stats.matches += 1;
            } else {
                stats.mismatches += 1;
            }
        }

        stats
    }

    /// Recompute the alignment score from the aligned pairs
    pub fn rescore<C>(&self, scoring: &C) -> i64
    where
        C: AlignmentScoring + ?Sized,
    {
        self.aligned_a.iter()
            .zip(&self.aligned_b)
            .map(|(&a, &b)| {
                let column = if a == GAP_SYMBOL || b == GAP_SYMBOL {
                    scoring.gap_penalty()
                } else {
                    scoring.match_score(a, b)
                };

                i64::from(column)
            })
            .sum()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AlignmentStats {
    pub matches: usize,
    pub mismatches: usize,
    pub gaps: usize,
    pub length: usize,
}

impl AlignmentStats {
    /// Fraction of alignment columns that are identical residues
    pub fn identity(&self) -> f64 {
        if self.length == 0 {
            0.0
        } else {
            self.matches as f64 / self.length as f64
        }
    }
}

/// Three line rendering of an alignment: sequence A, a match line, and sequence B.
pub fn print_alignment(aln: &Alignment) -> String {
    let match_line: Vec<u8> = aln.aligned_a.iter()
        .zip(&aln.aligned_b)
        .map(|(&a, &b)| {
            if a == GAP_SYMBOL || b == GAP_SYMBOL {
                b' '
            } else if a == b {
                b'|'
            } else {
                b'*'
            }
        })
        .collect();

    format!(
        "{}\n{}\n{}",
        String::from_utf8_lossy(&aln.aligned_a),
        String::from_utf8_lossy(&match_line),
        String::from_utf8_lossy(&aln.aligned_b),
    )
}
