use std::fmt::{Display, Formatter};

use tracing::debug;

use crate::aligner::scoring::AlignmentScoring;

/// Dense dynamic programming table of optimal prefix alignment scores.
///
/// Rows correspond to prefixes of sequence B, columns to prefixes of sequence A. Cell `(i, j)`
/// holds the optimal score of aligning `A[..j]` with `B[..i]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreMatrix {
    data: Vec<i64>,
    rows: usize,
    cols: usize,
}

impl ScoreMatrix {
    /// Zero-filled matrix of the given dimensions
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0; rows * cols],
            rows,
            cols,
        }
    }

    #[inline(always)]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline(always)]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> i64 {
        self.data[row * self.cols + col]
    }

    #[inline(always)]
    pub fn set(&mut self, row: usize, col: usize, value: i64) {
        self.data[row * self.cols + col] = value;
    }

    pub fn row(&self, row: usize) -> &[i64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Score of the bottom-right cell, i.e., the optimal global alignment score. `None` for a
    /// matrix without cells.
    pub fn final_score(&self) -> Option<i64> {
        self.data.last().copied()
    }
}

impl Display for ScoreMatrix {
    /// Tab separated rendering, one line per row
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for i in 0..self.rows {
            let line = self.row(i)
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join("\t");

            writeln!(f, "{line}")?;
        }

        Ok(())
    }
}

/// Fill the score matrix for aligning `seq_a` (columns) against `seq_b` (rows).
///
/// The first row and column hold the cumulative gap penalty. Remaining cells are filled
/// row by row, left to right, so the diagonal, upper and left neighbours of a cell are always
/// computed before the cell itself.
pub fn build_score_matrix<C>(seq_a: &[u8], seq_b: &[u8], scoring: &C) -> ScoreMatrix
where
    C: AlignmentScoring + ?Sized,
{
    let rows = seq_b.len() + 1;
    let cols = seq_a.len() + 1;
    let gap = i64::from(scoring.gap_penalty());

    debug!(rows, cols, "Building score matrix");

    let mut matrix = ScoreMatrix::new(rows, cols);
    for i in 0..rows {
        matrix.set(i, 0, scoring.gap_cost(i));
    }

    for j in 0..cols {
        matrix.set(0, j, scoring.gap_cost(j));
    }

    for (i, &b) in seq_b.iter().enumerate().map(|(i, b)| (i + 1, b)) {
        for (j, &a) in seq_a.iter().enumerate().map(|(j, a)| (j + 1, a)) {
            let diagonal = matrix.get(i - 1, j - 1) + i64::from(scoring.match_score(a, b));
            let up = matrix.get(i - 1, j) + gap;
            let left = matrix.get(i, j - 1) + gap;

            matrix.set(i, j, diagonal.max(up).max(left));
        }
    }

    matrix
}

#[cfg(test)]
mod tests {
    use super::{build_score_matrix, ScoreMatrix};
    use crate::aligner::scoring::GapLinear;

    #[test]
    fn test_small_matrix() {
        let matrix = build_score_matrix(b"ACG", b"AG", &GapLinear::default());

        assert_eq!(matrix.rows(), 3);
        assert_eq!(matrix.cols(), 4);
        assert_eq!(matrix.row(0), &[0, -1, -2, -3]);
        assert_eq!(matrix.row(1), &[-1, 1, 0, -1]);
        assert_eq!(matrix.row(2), &[-2, 0, 0, 1]);
        assert_eq!(matrix.final_score(), Some(1));
    }

    #[test]
    fn test_empty_sequences() {
        let matrix = build_score_matrix(b"", b"", &GapLinear::default());
        assert_eq!(matrix, ScoreMatrix::new(1, 1));
        assert_eq!(matrix.final_score(), Some(0));

        let matrix = build_score_matrix(b"", b"AAA", &GapLinear::default());
        assert_eq!(matrix.rows(), 4);
        assert_eq!(matrix.cols(), 1);
        assert_eq!(matrix.final_score(), Some(-3));

        let matrix = build_score_matrix(b"AAAA", b"", &GapLinear::new(1, -1, -2));
        assert_eq!(matrix.row(0), &[0, -2, -4, -6, -8]);

        assert_eq!(ScoreMatrix::new(0, 0).final_score(), None);
    }

    #[test]
    fn test_no_overflow_on_large_penalties() {
        let matrix = build_score_matrix(b"AAA", b"AA", &GapLinear::new(i32::MAX, i32::MIN, i32::MIN));
        let gap = i64::from(i32::MIN);

        assert_eq!(matrix.row(0), &[0, gap, 2 * gap, 3 * gap]);
        assert_eq!(matrix.get(2, 0), 2 * gap);
        assert_eq!(matrix.final_score(), Some(2 * i64::from(i32::MAX) + gap));
    }

    #[test]
    fn test_recurrence_holds() {
        let scoring = GapLinear::new(3, -2, -4);
        let seq_a = b"TTAGGCATCA";
        let seq_b = b"TAGCTACA";
        let matrix = build_score_matrix(seq_a, seq_b, &scoring);

        for i in 1..matrix.rows() {
            for j in 1..matrix.cols() {
                let sub = if seq_a[j - 1] == seq_b[i - 1] { 3 } else { -2 };
                let expected = (matrix.get(i - 1, j - 1) + sub)
                    .max(matrix.get(i - 1, j) - 4)
                    .max(matrix.get(i, j - 1) - 4);

                assert_eq!(matrix.get(i, j), expected);
            }
        }
    }

    #[test]
    fn test_display_tsv() {
        let matrix = build_score_matrix(b"A", b"A", &GapLinear::default());
        assert_eq!(matrix.to_string(), "0\t-1\n-1\t1\n");
    }
}
