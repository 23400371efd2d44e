pub mod gap_linear;
pub mod substitution;

pub use gap_linear::GapLinear;
pub use substitution::{SubstitutionMatrix, SubstitutionScoring};

/// Symbol used to represent a gap in an aligned sequence
pub const GAP_SYMBOL: u8 = b'-';

/// Scoring model for global alignment with a linear gap penalty.
///
/// Scores are maximized, so penalties are usually negative. Per-column scores are `i32`, while
/// cumulative scores are accumulated as `i64` so any `i32` scoring constants are valid. All
/// arithmetic is integer, which keeps the equality checks during traceback exact.
pub trait AlignmentScoring {
    /// Score of aligning symbol `a` against symbol `b`. Either of them may be [`GAP_SYMBOL`].
    fn match_score(&self, a: u8, b: u8) -> i32;

    /// Score added for every gap position
    fn gap_penalty(&self) -> i32;

    /// Cumulative score of a gap of the given length
    #[inline]
    fn gap_cost(&self, length: usize) -> i64 {
        i64::from(self.gap_penalty()) * length as i64
    }
}

impl<T> AlignmentScoring for &T
where
    T: AlignmentScoring + ?Sized,
{
    #[inline(always)]
    fn match_score(&self, a: u8, b: u8) -> i32 {
        (**self).match_score(a, b)
    }

    #[inline(always)]
    fn gap_penalty(&self) -> i32 {
        (**self).gap_penalty()
    }
}
