pub mod fasta;

pub use fasta::{read_fasta, read_fasta_from, records_to_map, validate_alphabet, write_alignment_fasta, Alphabet, SequenceRecord};
