use tracing::trace;

use crate::aligner::alignment::{AlignedPair, Alignment};
use crate::aligner::matrix::ScoreMatrix;
use crate::aligner::scoring::AlignmentScoring;
use crate::errors::NwAlignError;

/// A single move through the score matrix during traceback
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Align `A[j-1]` with `B[i-1]`, moving to `(i-1, j-1)`
    Diagonal,

    /// Align `A[j-1]` with a gap, moving to `(i, j-1)`
    Left,

    /// Align a gap with `B[i-1]`, moving to `(i-1, j)`
    Up,
}

/// Decides which step to take when multiple predecessors explain a cell's score.
///
/// Steps are tested in the returned order and the first one consistent with the matrix wins.
pub trait TracebackPolicy {
    fn order(&self) -> [Step; 3];
}

/// Prefer a match/mismatch, then a gap in B, then a gap in A
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DiagonalFirst;

impl TracebackPolicy for DiagonalFirst {
    #[inline(always)]
    fn order(&self) -> [Step; 3] {
        [Step::Diagonal, Step::Left, Step::Up]
    }
}

/// Arbitrary step priority
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StepOrder(pub [Step; 3]);

impl TracebackPolicy for StepOrder {
    #[inline(always)]
    fn order(&self) -> [Step; 3] {
        self.0
    }
}

impl<T> TracebackPolicy for &T
where
    T: TracebackPolicy + ?Sized,
{
    #[inline(always)]
    fn order(&self) -> [Step; 3] {
        (**self).order()
    }
}

/// Reconstruct one optimal alignment from a score matrix built by
/// [`build_score_matrix`](crate::aligner::matrix::build_score_matrix) with the same sequences
/// and scoring model.
pub fn traceback<C, P>(
    matrix: &ScoreMatrix,
    seq_a: &[u8],
    seq_b: &[u8],
    scoring: &C,
    policy: &P,
) -> Result<Alignment, NwAlignError>
where
    C: AlignmentScoring + ?Sized,
    P: TracebackPolicy + ?Sized,
{
    let expected_rows = seq_b.len() + 1;
    let expected_cols = seq_a.len() + 1;
    if matrix.rows() != expected_rows || matrix.cols() != expected_cols {
        return Err(NwAlignError::MatrixDimensionMismatch {
            expected_rows,
            expected_cols,
            rows: matrix.rows(),
            cols: matrix.cols(),
        });
    }

    let gap = i64::from(scoring.gap_penalty());
    let order = policy.order();

    let score = matrix.get(seq_b.len(), seq_a.len());
    let mut pairs = Vec::with_capacity(seq_a.len() + seq_b.len());
    let mut i = seq_b.len();
    let mut j = seq_a.len();

    while i > 0 && j > 0 {
        let current = matrix.get(i, j);

        let step = order.into_iter()
            .find(|step| match step {
                Step::Diagonal => current == matrix.get(i - 1, j - 1) + i64::from(scoring.match_score(seq_a[j - 1], seq_b[i - 1])),
                Step::Left => current == matrix.get(i, j - 1) + gap,
                Step::Up => current == matrix.get(i - 1, j) + gap,
            })
            .ok_or(NwAlignError::InconsistentMatrix { row: i, col: j })?;

        trace!(i, j, score = current, ?step, "traceback");

        match step {
            Step::Diagonal => {
                pairs.push(AlignedPair::new(Some(j - 1), Some(i - 1)));
                i -= 1;
                j -= 1;
            },
            Step::Left => {
                pairs.push(AlignedPair::new(Some(j - 1), None));
                j -= 1;
            },
            Step::Up => {
                pairs.push(AlignedPair::new(None, Some(i - 1)));
                i -= 1;
            },
        }
    }

    // Leading symbols of the sequence that is not yet exhausted are aligned to gaps
    while j > 0 {
        pairs.push(AlignedPair::new(Some(j - 1), None));
        j -= 1;
    }

    while i > 0 {
        pairs.push(AlignedPair::new(None, Some(i - 1)));
        i -= 1;
    }

    pairs.reverse();

    Ok(Alignment::from_pairs(seq_a, seq_b, pairs, score))
}

#[cfg(test)]
mod tests {
    use super::{traceback, DiagonalFirst, Step, StepOrder};
    use crate::aligner::matrix::{build_score_matrix, ScoreMatrix};
    use crate::aligner::scoring::GapLinear;
    use crate::errors::NwAlignError;

    fn align_default(seq_a: &[u8], seq_b: &[u8]) -> (Vec<u8>, Vec<u8>, i64) {
        let scoring = GapLinear::default();
        let matrix = build_score_matrix(seq_a, seq_b, &scoring);
        let aln = traceback(&matrix, seq_a, seq_b, &scoring, &DiagonalFirst).unwrap();

        (aln.aligned_a().to_vec(), aln.aligned_b().to_vec(), aln.score())
    }

    #[test]
    fn test_gattaca() {
        let (a, b, score) = align_default(b"GATTACA", b"GCATGCU");
        assert_eq!(score, 0);
        assert_eq!(a, b"G-ATTACA");
        assert_eq!(b, b"GCA-TGCU");
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(align_default(b"", b"AAA"), (b"---".to_vec(), b"AAA".to_vec(), -3));
        assert_eq!(align_default(b"AAA", b""), (b"AAA".to_vec(), b"---".to_vec(), -3));
        assert_eq!(align_default(b"", b""), (vec![], vec![], 0));
        assert_eq!(align_default(b"AC", b"AC"), (b"AC".to_vec(), b"AC".to_vec(), 2));
    }

    #[test]
    fn test_tie_breaking() {
        // Both -AT/TA- and AT-/-TA are optimal; diagonal-first then left picks the former
        assert_eq!(align_default(b"AT", b"TA"), (b"-AT".to_vec(), b"TA-".to_vec(), -1));

        let scoring = GapLinear::default();
        let matrix = build_score_matrix(b"AT", b"TA", &scoring);
        let up_first = StepOrder([Step::Up, Step::Left, Step::Diagonal]);
        let aln = traceback(&matrix, b"AT", b"TA", &scoring, &up_first).unwrap();

        assert_eq!(aln.score(), -1);
        assert_eq!(aln.aligned_a(), b"AT-");
        assert_eq!(aln.aligned_b(), b"-TA");
    }

    #[test]
    fn test_dimension_check() {
        let scoring = GapLinear::default();
        let matrix = ScoreMatrix::new(2, 2);

        let result = traceback(&matrix, b"ACG", b"A", &scoring, &DiagonalFirst);
        assert!(matches!(result, Err(NwAlignError::MatrixDimensionMismatch {
            expected_rows: 2, expected_cols: 4, rows: 2, cols: 2
        })));
    }

    #[test]
    fn test_inconsistent_scoring() {
        let matrix = build_score_matrix(b"ACGT", b"ACGT", &GapLinear::new(5, -4, -8));
        let result = traceback(&matrix, b"ACGT", b"ACGT", &GapLinear::default(), &DiagonalFirst);

        assert!(matches!(result, Err(NwAlignError::InconsistentMatrix { row: 4, col: 4 })));
    }
}
