use std::str::FromStr;

use crate::aligner::scoring::{AlignmentScoring, GAP_SYMBOL};
use crate::errors::NwAlignError;

/// Residue order of the NCBI substitution matrices
pub const NCBI_RESIDUES: &[u8; 24] = b"ARNDCQEGHILKMFPSTWYVBZX*";

const NO_INDEX: u8 = u8::MAX;

/// A symmetric or asymmetric residue substitution matrix.
///
/// Lookups are case-insensitive. Pairs involving a residue not covered by the matrix score the
/// lowest value in the matrix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubstitutionMatrix {
    name: String,
    residues: Vec<u8>,
    index: [u8; 256],
    scores: Vec<i32>,
    worst: i32,
}

impl SubstitutionMatrix {
    fn from_table(name: &str, residues: &[u8], scores: Vec<i32>) -> Self {
        let mut index = [NO_INDEX; 256];
        for (i, r) in residues.iter().enumerate() {
            index[r.to_ascii_uppercase() as usize] = i as u8;
            index[r.to_ascii_lowercase() as usize] = i as u8;
        }

        let worst = scores.iter().copied().min().unwrap_or(0);

        Self {
            name: name.to_string(),
            residues: residues.to_vec(),
            index,
            scores,
            worst,
        }
    }

    /// Dayhoff PAM250
    pub fn pam250() -> Self {
        Self::from_table("PAM250", NCBI_RESIDUES, PAM250.to_vec())
    }

    pub fn blosum62() -> Self {
        Self::from_table("BLOSUM62", NCBI_RESIDUES, BLOSUM62.to_vec())
    }

    /// Look up a built-in matrix by (case-insensitive) name
    pub fn by_name(name: &str) -> Result<Self, NwAlignError> {
        match name.to_ascii_uppercase().as_str() {
            "PAM250" => Ok(Self::pam250()),
            "BLOSUM62" => Ok(Self::blosum62()),
            _ => Err(NwAlignError::UnknownMatrix(name.to_string())),
        }
    }

    /// Parse a matrix in NCBI text format: `#` comment lines, a header line listing the residues,
    /// followed by one row per residue starting with the residue symbol.
    pub fn from_ncbi_str(name: &str, text: &str) -> Result<Self, NwAlignError> {
        let mut lines = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'));

        let header = lines.next()
            .ok_or_else(|| NwAlignError::MatrixParseError("missing header line".to_string()))?;

        let residues = header.split_whitespace()
            .map(parse_residue)
            .collect::<Result<Vec<u8>, _>>()?;

        if residues.is_empty() || residues.len() >= NO_INDEX as usize {
            return Err(NwAlignError::MatrixParseError(
                format!("invalid number of residues in header ({})", residues.len())
            ));
        }

        let mut scores = vec![0; residues.len() * residues.len()];
        let mut rows_seen = vec![false; residues.len()];
        for line in lines {
            let mut fields = line.split_whitespace();
            let row_residue = fields.next()
                .map(parse_residue)
                .transpose()?
                .ok_or_else(|| NwAlignError::MatrixParseError("empty row".to_string()))?;

            let row = residues.iter()
                .position(|r| r.eq_ignore_ascii_case(&row_residue))
                .ok_or_else(|| NwAlignError::MatrixParseError(
                    format!("row residue '{}' not in header", row_residue as char)
                ))?;

            let values = fields
                .map(|v| v.parse::<i32>()
                    .map_err(|e| NwAlignError::MatrixParseError(format!("invalid score '{v}': {e}"))))
                .collect::<Result<Vec<i32>, _>>()?;

            if values.len() != residues.len() {
                return Err(NwAlignError::MatrixParseError(format!(
                    "row '{}' has {} values, expected {}", row_residue as char, values.len(), residues.len()
                )));
            }

            scores[row * residues.len()..(row + 1) * residues.len()].copy_from_slice(&values);
            rows_seen[row] = true;
        }

        if let Some(missing) = rows_seen.iter().position(|seen| !seen) {
            return Err(NwAlignError::MatrixParseError(
                format!("missing row for residue '{}'", residues[missing] as char)
            ));
        }

        Ok(Self::from_table(name, &residues, scores))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn residues(&self) -> &[u8] {
        &self.residues
    }

    #[inline]
    pub fn score(&self, a: u8, b: u8) -> i32 {
        let ia = self.index[a as usize];
        let ib = self.index[b as usize];

        if ia == NO_INDEX || ib == NO_INDEX {
            self.worst
        } else {
            self.scores[ia as usize * self.residues.len() + ib as usize]
        }
    }

    pub fn worst_score(&self) -> i32 {
        self.worst
    }
}

fn parse_residue(field: &str) -> Result<u8, NwAlignError> {
    match field.as_bytes() {
        [r] => Ok(*r),
        _ => Err(NwAlignError::MatrixParseError(format!("invalid residue '{field}'"))),
    }
}

impl FromStr for SubstitutionMatrix {
    type Err = NwAlignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_ncbi_str("custom", s)
    }
}

/// Substitution matrix scores combined with a linear gap penalty
#[derive(Clone, Debug)]
pub struct SubstitutionScoring {
    matrix: SubstitutionMatrix,
    gap_penalty: i32,
}

impl SubstitutionScoring {
    pub fn new(matrix: SubstitutionMatrix, gap_penalty: i32) -> Self {
        Self { matrix, gap_penalty }
    }

    pub fn matrix(&self) -> &SubstitutionMatrix {
        &self.matrix
    }
}

impl AlignmentScoring for SubstitutionScoring {
    #[inline]
    fn match_score(&self, a: u8, b: u8) -> i32 {
        match (a == GAP_SYMBOL, b == GAP_SYMBOL) {
            (false, false) => self.matrix.score(a, b),
            (true, true) => 0,
            _ => self.gap_penalty,
        }
    }

    #[inline(always)]
    fn gap_penalty(&self) -> i32 {
        self.gap_penalty
    }
}

#[rustfmt::skip]
const BLOSUM62: [i32; 24 * 24] = [
//   A   R   N   D   C   Q   E   G   H   I   L   K   M   F   P   S   T   W   Y   V   B   Z   X   *
     4, -1, -2, -2,  0, -1, -1,  0, -2, -1, -1, -1, -1, -2, -1,  1,  0, -3, -2,  0, -2, -1,  0, -4, // A
    -1,  5,  0, -2, -3,  1,  0, -2,  0, -3, -2,  2, -1, -3, -2, -1, -1, -3, -2, -3, -1,  0, -1, -4, // R
    -2,  0,  6,  1, -3,  0,  0,  0,  1, -3, -3,  0, -2, -3, -2,  1,  0, -4, -2, -3,  3,  0, -1, -4, // N
    -2, -2,  1,  6, -3,  0,  2, -1, -1, -3, -4, -1, -3, -3, -1,  0, -1, -4, -3, -3,  4,  1, -1, -4, // D
     0, -3, -3, -3,  9, -3, -4, -3, -3, -1, -1, -3, -1, -2, -3, -1, -1, -2, -2, -1, -3, -3, -2, -4, // C
    -1,  1,  0,  0, -3,  5,  2, -2,  0, -3, -2,  1,  0, -3, -1,  0, -1, -2, -1, -2,  0,  3, -1, -4, // Q
    -1,  0,  0,  2, -4,  2,  5, -2,  0, -3, -3,  1, -2, -3, -1,  0, -1, -3, -2, -2,  1,  4, -1, -4, // E
     0, -2,  0, -1, -3, -2, -2,  6, -2, -4, -4, -2, -3, -3, -2,  0, -2, -2, -3, -3, -1, -2, -1, -4, // G
    -2,  0,  1, -1, -3,  0,  0, -2,  8, -3, -3, -1, -2, -1, -2, -1, -2, -2,  2, -3,  0,  0, -1, -4, // H
    -1, -3, -3, -3, -1, -3, -3, -4, -3,  4,  2, -3,  1,  0, -3, -2, -1, -3, -1,  3, -3, -3, -1, -4, // I
    -1, -2, -3, -4, -1, -2, -3, -4, -3,  2,  4, -2,  2,  0, -3, -2, -1, -2, -1,  1, -4, -3, -1, -4, // L
    -1,  2,  0, -1, -3,  1,  1, -2, -1, -3, -2,  5, -1, -3, -1,  0, -1, -3, -2, -2,  0,  1, -1, -4, // K
    -1, -1, -2, -3, -1,  0, -2, -3, -2,  1,  2, -1,  5,  0, -2, -1, -1, -1, -1,  1, -3, -1, -1, -4, // M
    -2, -3, -3, -3, -2, -3, -3, -3, -1,  0,  0, -3,  0,  6, -4, -2, -2,  1,  3, -1, -3, -3, -1, -4, // F
    -1, -2, -2, -1, -3, -1, -1, -2, -2, -3, -3, -1, -2, -4,  7, -1, -1, -4, -3, -2, -2, -1, -2, -4, // P
     1, -1,  1,  0, -1,  0,  0,  0, -1, -2, -2,  0, -1, -2, -1,  4,  1, -3, -2, -2,  0,  0,  0, -4, // S
     0, -1,  0, -1, -1, -1, -1, -2, -2, -1, -1, -1, -1, -2, -1,  1,  5, -2, -2,  0, -1, -1,  0, -4, // T
    -3, -3, -4, -4, -2, -2, -3, -2, -2, -3, -2, -3, -1,  1, -4, -3, -2, 11,  2, -3, -4, -3, -2, -4, // W
    -2, -2, -2, -3, -2, -1, -2, -3,  2, -1, -1, -2, -1,  3, -3, -2, -2,  2,  7, -1, -3, -2, -1, -4, // Y
     0, -3, -3, -3, -1, -2, -2, -3, -3,  3,  1, -2,  1, -1, -2, -2,  0, -3, -1,  4, -3, -2, -1, -4, // V
    -2, -1,  3,  4, -3,  0,  1, -1,  0, -3, -4,  0, -3, -3, -2,  0, -1, -4, -3, -3,  4,  1, -1, -4, // B
    -1,  0,  0,  1, -3,  3,  4, -2,  0, -3, -3,  1, -1, -3, -1,  0, -1, -3, -2, -2,  1,  4, -1, -4, // Z
     0, -1, -1, -1, -2, -1, -1, -1, -1, -1, -1, -1, -1, -1, -2,  0,  0, -2, -1, -1, -1, -1, -1, -4, // X
    -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4,  1, // *
];

#[rustfmt::skip]
const PAM250: [i32; 24 * 24] = [
//   A   R   N   D   C   Q   E   G   H   I   L   K   M   F   P   S   T   W   Y   V   B   Z   X   *
     2, -2,  0,  0, -2,  0,  0,  1, -1, -1, -2, -1, -1, -3,  1,  1,  1, -6, -3,  0,  0,  0,  0, -8, // A
    -2,  6,  0, -1, -4,  1, -1, -3,  2, -2, -3,  3,  0, -4,  0,  0, -1,  2, -4, -2, -1,  0, -1, -8, // R
     0,  0,  2,  2, -4,  1,  1,  0,  2, -2, -3,  1, -2, -3,  0,  1,  0, -4, -2, -2,  2,  1,  0, -8, // N
     0, -1,  2,  4, -5,  2,  3,  1,  1, -2, -4,  0, -3, -6, -1,  0,  0, -7, -4, -2,  3,  3, -1, -8, // D
    -2, -4, -4, -5, 12, -5, -5, -3, -3, -2, -6, -5, -5, -4, -3,  0, -2, -8,  0, -2, -4, -5, -3, -8, // C
     0,  1,  1,  2, -5,  4,  2, -1,  3, -2, -2,  1, -1, -5,  0, -1, -1, -5, -4, -2,  1,  3, -1, -8, // Q
     0, -1,  1,  3, -5,  2,  4,  0,  1, -2, -3,  0, -2, -5, -1,  0,  0, -7, -4, -2,  3,  3, -1, -8, // E
     1, -3,  0,  1, -3, -1,  0,  5, -2, -3, -4, -2, -3, -5,  0,  1,  0, -7, -5, -1,  0,  0, -1, -8, // G
    -1,  2,  2,  1, -3,  3,  1, -2,  6, -2, -2,  0, -2, -2,  0, -1, -1, -3,  0, -2,  1,  2, -1, -8, // H
    -1, -2, -2, -2, -2, -2, -2, -3, -2,  5,  2, -2,  2,  1, -2, -1,  0, -5, -1,  4, -2, -2, -1, -8, // I
    -2, -3, -3, -4, -6, -2, -3, -4, -2,  2,  6, -3,  4,  2, -3, -3, -2, -2, -1,  2, -3, -3, -1, -8, // L
    -1,  3,  1,  0, -5,  1,  0, -2,  0, -2, -3,  5,  0, -5, -1,  0,  0, -3, -4, -2,  1,  0, -1, -8, // K
    -1,  0, -2, -3, -5, -1, -2, -3, -2,  2,  4,  0,  6,  0, -2, -2, -1, -4, -2,  2, -2, -2, -1, -8, // M
    -3, -4, -3, -6, -4, -5, -5, -5, -2,  1,  2, -5,  0,  9, -5, -3, -3,  0,  7, -1, -4, -5, -2, -8, // F
     1,  0,  0, -1, -3,  0, -1,  0,  0, -2, -3, -1, -2, -5,  6,  1,  0, -6, -5, -1, -1,  0, -1, -8, // P
     1,  0,  1,  0,  0, -1,  0,  1, -1, -1, -3,  0, -2, -3,  1,  2,  1, -2, -3, -1,  0,  0,  0, -8, // S
     1, -1,  0,  0, -2, -1,  0,  0, -1,  0, -2,  0, -1, -3,  0,  1,  3, -5, -3,  0,  0, -1,  0, -8, // T
    -6,  2, -4, -7, -8, -5, -7, -7, -3, -5, -2, -3, -4,  0, -6, -2, -5, 17,  0, -6, -5, -6, -4, -8, // W
    -3, -4, -2, -4,  0, -4, -4, -5,  0, -1, -1, -4, -2,  7, -5, -3, -3,  0, 10, -2, -3, -4, -2, -8, // Y
     0, -2, -2, -2, -2, -2, -2, -1, -2,  4,  2, -2,  2, -1, -1, -1,  0, -6, -2,  4, -2, -2, -1, -8, // V
     0, -1,  2,  3, -4,  1,  3,  0,  1, -2, -3,  1, -2, -4, -1,  0,  0, -5, -3, -2,  3,  2, -1, -8, // B
     0,  0,  1,  3, -5,  3,  3,  0,  2, -2, -3,  0, -2, -5,  0,  0, -1, -6, -4, -2,  2,  3, -1, -8, // Z
     0, -1,  0, -1, -3, -1, -1, -1, -1, -1, -1, -1, -1, -2, -1,  0,  0, -4, -2, -1, -1, -1, -1, -8, // X
    -8, -8, -8, -8, -8, -8, -8, -8, -8, -8, -8, -8, -8, -8, -8, -8, -8, -8, -8, -8, -8, -8, -8,  1, // *
];

#[cfg(test)]
mod tests {
    use super::{SubstitutionMatrix, SubstitutionScoring};
    use crate::aligner::scoring::AlignmentScoring;
    use crate::errors::NwAlignError;

    #[test]
    fn test_builtin_lookups() {
        let pam = SubstitutionMatrix::pam250();
        assert_eq!(pam.score(b'A', b'A'), 2);
        assert_eq!(pam.score(b'W', b'W'), 17);
        assert_eq!(pam.score(b'w', b'c'), -8);
        assert_eq!(pam.score(b'R', b'W'), pam.score(b'W', b'R'));

        let blosum = SubstitutionMatrix::blosum62();
        assert_eq!(blosum.score(b'A', b'R'), -1);
        assert_eq!(blosum.score(b'a', b'a'), 4);

        // Unknown residues score the worst matrix value
        assert_eq!(blosum.score(b'?', b'A'), -4);
        assert_eq!(pam.worst_score(), -8);
    }

    #[test]
    fn test_by_name() {
        assert_eq!(SubstitutionMatrix::by_name("pam250").unwrap().name(), "PAM250");
        assert_eq!(SubstitutionMatrix::by_name("Blosum62").unwrap().name(), "BLOSUM62");
        assert!(matches!(SubstitutionMatrix::by_name("PAM30"), Err(NwAlignError::UnknownMatrix(_))));
    }

    #[test]
    fn test_parse_ncbi_format() {
        let text = "# Toy nucleotide matrix\n\
                    #\n\
                    \x20  A  C  G  T\n\
                    A  5 -4 -4 -4\n\
                    C -4  5 -4 -4\n\
                    G -4 -4  5 -4\n\
                    T -4 -4 -4  5\n";

        let matrix: SubstitutionMatrix = text.parse().unwrap();
        assert_eq!(matrix.residues(), b"ACGT");
        assert_eq!(matrix.score(b'A', b'A'), 5);
        assert_eq!(matrix.score(b'g', b'T'), -4);
        assert_eq!(matrix.score(b'N', b'A'), -4);
    }

    #[test]
    fn test_parse_errors() {
        assert!(SubstitutionMatrix::from_ncbi_str("x", "# only comments\n").is_err());
        assert!(SubstitutionMatrix::from_ncbi_str("x", "A C\nA 1 0\n").is_err());
        assert!(SubstitutionMatrix::from_ncbi_str("x", "A C\nA 1 0\nC 0\n").is_err());
        assert!(SubstitutionMatrix::from_ncbi_str("x", "A C\nA 1 0\nC 0 x\n").is_err());
        assert!(SubstitutionMatrix::from_ncbi_str("x", "A C\nA 1 0\nG 0 1\n").is_err());
    }

    #[test]
    fn test_substitution_scoring_gaps() {
        let scoring = SubstitutionScoring::new(SubstitutionMatrix::pam250(), -3);

        assert_eq!(scoring.match_score(b'C', b'C'), 12);
        assert_eq!(scoring.match_score(b'C', b'-'), -3);
        assert_eq!(scoring.match_score(b'-', b'C'), -3);
        assert_eq!(scoring.gap_penalty(), -3);
    }
}
