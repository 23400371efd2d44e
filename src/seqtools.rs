//! Simple sequence utilities that don't need dynamic programming

use std::fmt::{Display, Formatter};

use itertools::Itertools;
use num::BigUint;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::io::fasta::SequenceRecord;

#[inline]
fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'T' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        b'a' => b't',
        b't' => b'a',
        b'c' => b'g',
        b'g' => b'c',
        other => other,
    }
}

/// Reverse complement of a DNA sequence. Symbols other than `ACGT` are kept as is.
pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|&b| complement(b)).collect()
}

/// Number of positions at which two equal length sequences differ, `None` if the lengths differ
pub fn count_mismatches(a: &[u8], b: &[u8]) -> Option<usize> {
    if a.len() != b.len() {
        return None;
    }

    Some(a.iter().zip(b).filter(|(x, y)| x != y).count())
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum PairRelation {
    /// Both records have the same sequence
    Identical,

    /// The sequences differ at a single position
    PointMutation,

    /// The first sequence differs at a single position from the reverse complement of the second
    ReverseComplementMutation,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MutationPair {
    pub name_a: String,
    pub name_b: String,
    pub seq_a: String,

    /// Sequence of the second record, reverse complemented for
    /// [`PairRelation::ReverseComplementMutation`]
    pub seq_b: String,
    pub relation: PairRelation,
}

impl Display for MutationPair {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "( {} {} ) {} -> {}", self.name_a, self.name_b, self.seq_a, self.seq_b)
    }
}

/// Find pairs of records that are identical, differ by one point mutation, or differ by one point
/// mutation from the other's reverse complement.
///
/// Forward comparisons are reported first, in input order. Each pair of records is reported at
/// most once, and records sharing a name are never paired. A reverse complement match is only
/// skipped when that exact pair was already reported, not when both names merely occur in
/// earlier results.
pub fn find_point_mutations(records: &[SequenceRecord]) -> Vec<MutationPair> {
    let mut result = Vec::new();
    let mut reported = FxHashSet::default();

    for ((i, a), (j, b)) in records.iter().enumerate().tuple_combinations() {
        if a.name() == b.name() {
            continue;
        }

        let relation = match count_mismatches(a.sequence(), b.sequence()) {
            Some(0) => PairRelation::Identical,
            Some(1) => PairRelation::PointMutation,
            _ => continue,
        };

        reported.insert((i, j));
        result.push(MutationPair {
            name_a: a.name().to_string(),
            name_b: b.name().to_string(),
            seq_a: String::from_utf8_lossy(a.sequence()).into_owned(),
            seq_b: String::from_utf8_lossy(b.sequence()).into_owned(),
            relation,
        });
    }

    let rev_comps: Vec<_> = records.iter()
        .map(|r| reverse_complement(r.sequence()))
        .collect();

    for (i, a) in records.iter().enumerate() {
        for (j, b) in records.iter().enumerate() {
            if i == j || a.name() == b.name() || reported.contains(&(i.min(j), i.max(j))) {
                continue;
            }

            if count_mismatches(a.sequence(), &rev_comps[j]) == Some(1) {
                reported.insert((i.min(j), i.max(j)));
                result.push(MutationPair {
                    name_a: a.name().to_string(),
                    name_b: b.name().to_string(),
                    seq_a: String::from_utf8_lossy(a.sequence()).into_owned(),
                    seq_b: String::from_utf8_lossy(&rev_comps[j]).into_owned(),
                    relation: PairRelation::ReverseComplementMutation,
                });
            }
        }
    }

    result
}

/// Upper bound on the number of matchings of an RNA sequence, computed as the product of
/// `#A × #U` and `#G × #C` (case-insensitive).
pub fn max_matchings(seq: &[u8]) -> BigUint {
    let mut counts = [0u64; 4];
    for b in seq {
        match b.to_ascii_uppercase() {
            b'A' => counts[0] += 1,
            b'U' => counts[1] += 1,
            b'G' => counts[2] += 1,
            b'C' => counts[3] += 1,
            _ => (),
        }
    }

    let a_to_u = BigUint::from(counts[0]) * counts[1];
    let g_to_c = BigUint::from(counts[2]) * counts[3];

    a_to_u * g_to_c
}

#[cfg(test)]
mod tests {
    use num::BigUint;

    use super::{count_mismatches, find_point_mutations, max_matchings, reverse_complement, PairRelation};
    use crate::io::fasta::{read_fasta_from, SequenceRecord};

    #[test]
    fn test_reverse_complement() {
        assert_eq!(reverse_complement(b"AACGTTN"), b"NAACGTT");
        assert_eq!(reverse_complement(b"acgG"), b"Ccgt");
        assert_eq!(reverse_complement(b""), b"");
    }

    #[test]
    fn test_count_mismatches() {
        assert_eq!(count_mismatches(b"GAGCCTACTAACGGGAT", b"CATCGTAATGACGGCCT"), Some(7));
        assert_eq!(count_mismatches(b"ACGT", b"ACGT"), Some(0));
        assert_eq!(count_mismatches(b"ACGT", b"ACG"), None);
    }

    #[test]
    fn test_find_point_mutations() {
        let input = b">Rosalind_52\nTCATC\n>Rosalind_44\nTTCAT\n>Rosalind_68\nTCATC\n\
                      >Rosalind_28\nTGAAA\n>Rosalind_95\nGAGGA\n>Rosalind_66\nTTTCA\n\
                      >Rosalind_33\nATCAA\n>Rosalind_21\nTTGAT\n>Rosalind_18\nTTTCC\n";
        let records = read_fasta_from(&input[..]).unwrap();

        let pairs = find_point_mutations(&records);
        let lines: Vec<String> = pairs.iter().map(|p| p.to_string()).collect();

        assert_eq!(lines, vec![
            "( Rosalind_52 Rosalind_68 ) TCATC -> TCATC",
            "( Rosalind_44 Rosalind_21 ) TTCAT -> TTGAT",
            "( Rosalind_66 Rosalind_18 ) TTTCA -> TTTCC",
            "( Rosalind_52 Rosalind_95 ) TCATC -> TCCTC",
            "( Rosalind_44 Rosalind_33 ) TTCAT -> TTGAT",
            // Both names already occur above, but this exact pair does not
            "( Rosalind_68 Rosalind_95 ) TCATC -> TCCTC",
            "( Rosalind_28 Rosalind_18 ) TGAAA -> GGAAA",
        ]);

        assert_eq!(pairs[0].relation, PairRelation::Identical);
        assert_eq!(pairs[1].relation, PairRelation::PointMutation);
        assert_eq!(pairs[6].relation, PairRelation::ReverseComplementMutation);
    }

    #[test]
    fn test_same_name_never_paired() {
        let records = vec![
            SequenceRecord::new("x", b"ACGT".to_vec()),
            SequenceRecord::new("x", b"ACGT".to_vec()),
        ];

        assert!(find_point_mutations(&records).is_empty());
    }

    #[test]
    fn test_max_matchings() {
        assert_eq!(max_matchings(b"AUGCUUC"), BigUint::from(6u32));
        assert_eq!(max_matchings(b"augcuuc"), BigUint::from(6u32));
        assert_eq!(max_matchings(b"AAAA"), BigUint::from(0u32));
        assert_eq!(max_matchings(b""), BigUint::from(0u32));
    }
}
