use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles::fasta::{self as fasta, record::{Definition, Sequence}, Record};
use rustc_hash::FxHashMap;

use crate::aligner::Alignment;
use crate::errors::NwAlignError;

/// A named sequence read from a FASTA file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceRecord {
    name: String,
    sequence: Vec<u8>,
}

impl SequenceRecord {
    pub fn new(name: impl Into<String>, sequence: impl Into<Vec<u8>>) -> Self {
        Self { name: name.into(), sequence: sequence.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sequence(&self) -> &[u8] {
        &self.sequence
    }
}

/// Symbol sets sequences can be validated against
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Alphabet {
    Dna,
    Rna,
}

impl Alphabet {
    pub fn symbols(&self) -> &'static [u8] {
        match self {
            Self::Dna => b"ACGT",
            Self::Rna => b"ACGU",
        }
    }

    #[inline]
    pub fn contains(&self, symbol: u8) -> bool {
        self.symbols().contains(&symbol.to_ascii_uppercase())
    }
}

/// Read all records from a FASTA file. Files ending in `.gz` are decompressed on the fly.
pub fn read_fasta(path: impl AsRef<Path>) -> Result<Vec<SequenceRecord>, NwAlignError> {
    let p = path.as_ref();
    let is_gzipped = p
        .file_name()
        .map(|v| v.to_string_lossy().ends_with(".gz"))
        .unwrap_or(false);

    let file = File::open(p).map_err(|source| NwAlignError::FileReadError { source })?;

    // Check if we have a gzipped file
    let reader_inner: Box<dyn BufRead> = if is_gzipped {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    read_fasta_from(reader_inner)
}

/// Read all records from FASTA formatted input. Multi-line sequences are concatenated.
pub fn read_fasta_from<R: BufRead>(reader: R) -> Result<Vec<SequenceRecord>, NwAlignError> {
    let mut reader = fasta::io::Reader::new(reader);

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        let name = std::str::from_utf8(record.name())?;
        let sequence: &[u8] = record.sequence().as_ref();

        records.push(SequenceRecord::new(name, sequence));
    }

    Ok(records)
}

/// Map from sequence identifier to sequence. For duplicate identifiers the last record wins.
pub fn records_to_map(records: &[SequenceRecord]) -> FxHashMap<String, Vec<u8>> {
    records.iter()
        .map(|r| (r.name.clone(), r.sequence.clone()))
        .collect()
}

/// Check that every symbol of the record is part of the alphabet (case-insensitive)
pub fn validate_alphabet(record: &SequenceRecord, alphabet: Alphabet) -> Result<(), NwAlignError> {
    match record.sequence.iter().position(|&s| !alphabet.contains(s)) {
        Some(position) => Err(NwAlignError::InvalidSymbol {
            record: record.name.clone(),
            position,
            symbol: record.sequence[position],
        }),
        None => Ok(()),
    }
}

/// Write both rows of a pairwise alignment, gaps included, as FASTA records
pub fn write_alignment_fasta<W>(output: W, name_a: &str, name_b: &str, aln: &Alignment) -> Result<(), NwAlignError>
where
    W: Write,
{
    let mut writer = fasta::io::Writer::new(output);

    for (name, row) in [(name_a, aln.aligned_a()), (name_b, aln.aligned_b())] {
        let header = Definition::new(name, None);
        let seq = Sequence::from(row.to_vec());

        writer.write_record(&Record::new(header, seq))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use flate2::write::GzEncoder;
    use flate2::Compression;

    use super::{read_fasta, read_fasta_from, records_to_map, validate_alphabet, write_alignment_fasta, Alphabet, SequenceRecord};
    use crate::aligner::{GapLinear, NeedlemanWunsch, PairwiseAligner};
    use crate::errors::NwAlignError;

    fn test_data(fname: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join(fname)
    }

    #[test]
    fn test_read_multiline() {
        let records = read_fasta(test_data("rosalind_corr.fa")).unwrap();

        assert_eq!(records.len(), 9);
        assert_eq!(records[0].name(), "Rosalind_52");
        assert_eq!(records[0].sequence(), b"TCATC");
        assert_eq!(records[8].name(), "Rosalind_18");
        assert_eq!(records[8].sequence(), b"TTTCC");

        let records = read_fasta(test_data("rosalind_mmch.fa")).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sequence(), b"AUGCUUC");
    }

    #[test]
    fn test_read_gzipped() {
        let path = std::env::temp_dir().join(format!("nwalign_test_{}.fa.gz", std::process::id()));
        {
            let file = std::fs::File::create(&path).unwrap();
            let mut encoder = GzEncoder::new(file, Compression::default());
            encoder.write_all(b">seq1 some description\nACGT\nAC\n>seq2\nGG\n").unwrap();
            encoder.finish().unwrap();
        }

        let records = read_fasta(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(records, vec![
            SequenceRecord::new("seq1", b"ACGTAC".to_vec()),
            SequenceRecord::new("seq2", b"GG".to_vec()),
        ]);
    }

    #[test]
    fn test_missing_file() {
        let result = read_fasta(test_data("does_not_exist.fa"));
        assert!(matches!(result, Err(NwAlignError::FileReadError { .. })));
    }

    #[test]
    fn test_records_to_map() {
        let records = read_fasta_from(&b">a\nAC\n>b\nGT\n>a\nTT\n"[..]).unwrap();
        let map = records_to_map(&records);

        assert_eq!(map.len(), 2);
        assert_eq!(map["a"], b"TT");
        assert_eq!(map["b"], b"GT");
    }

    #[test]
    fn test_validate_alphabet() {
        let record = SequenceRecord::new("r1", b"ACGuua".to_vec());
        assert!(validate_alphabet(&record, Alphabet::Rna).is_ok());

        match validate_alphabet(&record, Alphabet::Dna) {
            Err(NwAlignError::InvalidSymbol { record, position, symbol }) => {
                assert_eq!(record, "r1");
                assert_eq!(position, 3);
                assert_eq!(symbol, b'u');
            },
            other => panic!("Unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_write_alignment_fasta() {
        let aln = NeedlemanWunsch::new(GapLinear::default())
            .align(b"ACGT", b"AGT")
            .unwrap();

        let mut output = Vec::new();
        write_alignment_fasta(&mut output, "first", "second", &aln).unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), ">first\nACGT\n>second\nA-GT\n");
    }
}
