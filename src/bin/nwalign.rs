use std::fs;
use std::fs::File;
use std::io::{self, stdout, IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use itertools::Itertools;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry};

use nwalign::aligner::{
    print_alignment, AlignmentScoring, AlignmentStats, GapLinear, NeedlemanWunsch, PairwiseAligner, Step,
    StepOrder, SubstitutionMatrix, SubstitutionScoring,
};
use nwalign::debug::messages::DebugOutputMessage;
use nwalign::debug::DebugOutputWriter;
use nwalign::errors::NwAlignError;
use nwalign::io::fasta::{read_fasta, validate_alphabet, write_alignment_fasta, Alphabet, SequenceRecord};
use nwalign::seqtools::{find_point_mutations, max_matchings};

trait Output: Write + IsTerminal {}
impl<T> Output for T where T: Write + IsTerminal {}

/// The output formats for pairwise alignments
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputType {
    /// Human readable three-line alignment with its score
    Text,

    /// Both gapped sequences as FASTA records
    Fasta,

    /// Alignment, score and statistics as JSON
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum BuiltinMatrix {
    Pam250,
    Blosum62,
}

/// Which traceback step to prefer when several explain a cell's score
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum TieBreak {
    /// Match/mismatch, then gap in the second sequence, then gap in the first sequence
    DiagonalFirst,

    /// Gap in the second sequence, then match/mismatch, then gap in the first sequence
    LeftFirst,

    /// Gap in the first sequence, then gap in the second sequence, then match/mismatch
    UpFirst,
}

impl TieBreak {
    fn step_order(&self) -> StepOrder {
        match self {
            Self::DiagonalFirst => StepOrder([Step::Diagonal, Step::Left, Step::Up]),
            Self::LeftFirst => StepOrder([Step::Left, Step::Diagonal, Step::Up]),
            Self::UpFirst => StepOrder([Step::Up, Step::Left, Step::Diagonal]),
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct CliArgs {
    /// Set verbosity level. Use multiple times to increase the verbosity level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<NwAlignSubcommand>,
}

#[derive(Subcommand, Debug)]
enum NwAlignSubcommand {
    /// Globally align pairs of sequences
    Align(AlignArgs),

    /// Report records that are identical or one point mutation apart, including reverse complements
    Compare(CompareArgs),

    /// Print the maximum number of base pair matchings for each RNA record
    Matchings(MatchingsArgs),
}

#[derive(Args, Debug)]
struct AlignArgs {
    /// Sequences to align in FASTA format. The first two records are aligned.
    #[clap(help_heading = "Inputs")]
    sequences: Option<PathBuf>,

    /// First sequence, given directly on the command line
    #[arg(long, requires = "seq_b", conflicts_with = "sequences")]
    #[clap(help_heading = "Inputs")]
    seq_a: Option<String>,

    /// Second sequence, given directly on the command line
    #[arg(long, requires = "seq_a", conflicts_with = "sequences")]
    #[clap(help_heading = "Inputs")]
    seq_b: Option<String>,

    /// Align every pair of records in the FASTA file instead of only the first two
    #[arg(long, requires = "sequences")]
    #[clap(help_heading = "Inputs")]
    all_pairs: bool,

    /// Output filename. If not given, defaults to stdout
    #[arg(short, long)]
    #[clap(help_heading = "Outputs")]
    output: Option<PathBuf>,

    /// Output file type.
    #[arg(value_enum, short = 'O', long, default_value = "text")]
    #[clap(help_heading = "Outputs")]
    output_type: OutputType,

    /// Output debug information (score matrices) and write files to the given directory
    #[arg(short, long)]
    #[clap(help_heading = "Outputs")]
    debug_output: Option<PathBuf>,

    /// Score for identical symbols
    #[arg(short = 'M', long, default_value_t = 1, allow_negative_numbers = true)]
    #[clap(help_heading = "Alignment configuration")]
    match_award: i32,

    /// Score for differing symbols
    #[arg(short = 'X', long, default_value_t = -1, allow_negative_numbers = true)]
    #[clap(help_heading = "Alignment configuration")]
    mismatch_penalty: i32,

    /// Score for each gap position
    #[arg(short = 'G', long, default_value_t = -1, allow_negative_numbers = true)]
    #[clap(help_heading = "Alignment configuration")]
    gap_penalty: i32,

    /// Score residue pairs with a built-in substitution matrix instead of match/mismatch scores
    #[arg(value_enum, long, conflicts_with = "matrix_file")]
    #[clap(help_heading = "Alignment configuration")]
    matrix: Option<BuiltinMatrix>,

    /// Score residue pairs with a substitution matrix in NCBI text format
    #[arg(long)]
    #[clap(help_heading = "Alignment configuration")]
    matrix_file: Option<PathBuf>,

    /// Preferred traceback step among equally scoring ones
    #[arg(value_enum, long, default_value = "diagonal-first")]
    #[clap(help_heading = "Alignment configuration")]
    tie_break: TieBreak,
}

#[derive(Args, Debug)]
struct CompareArgs {
    /// DNA sequences in FASTA format
    sequences: PathBuf,
}

#[derive(Args, Debug)]
struct MatchingsArgs {
    /// RNA sequences in FASTA format
    sequences: PathBuf,

    /// Fail on symbols outside the RNA alphabet
    #[arg(long)]
    validate: bool,
}

#[derive(Serialize, Debug)]
struct AlignmentReport<'a> {
    name_a: &'a str,
    name_b: &'a str,
    score: i64,
    aligned_a: String,
    aligned_b: String,
    stats: AlignmentStats,
}

/// Install the tracing subscriber logging to stderr. `RUST_LOG` takes precedence over `-v`.
fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter_layer = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_log = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_filter(filter_layer);

    Registry::default().with(stderr_log).init();
}

fn create_output(path: Option<&Path>) -> Result<Box<dyn Output>> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?
            }

            let file = File::create(path)
                .with_context(|| format!("Could not create output file {path:?}"))?;
            Ok(Box::new(file))
        },
        None => Ok(Box::new(stdout())),
    }
}

fn load_records(path: &Path) -> Result<Vec<SequenceRecord>> {
    let records = read_fasta(path)
        .with_context(|| format!("Could not read sequences from {path:?}"))?;
    info!("Read {} records from {:?}", records.len(), path);

    Ok(records)
}

fn build_scoring(align_args: &AlignArgs) -> Result<Box<dyn AlignmentScoring>> {
    let matrix = if let Some(path) = &align_args.matrix_file {
        let text = fs::read_to_string(path)
            .map_err(|source| NwAlignError::FileReadError { source })
            .with_context(|| format!("Could not read substitution matrix {path:?}"))?;

        let name = path.file_stem()
            .map(|v| v.to_string_lossy().to_string())
            .unwrap_or_else(|| "custom".to_string());

        Some(SubstitutionMatrix::from_ncbi_str(&name, &text)
            .with_context(|| format!("Invalid substitution matrix {path:?}"))?)
    } else {
        align_args.matrix.map(|m| match m {
            BuiltinMatrix::Pam250 => SubstitutionMatrix::pam250(),
            BuiltinMatrix::Blosum62 => SubstitutionMatrix::blosum62(),
        })
    };

    Ok(match matrix {
        Some(matrix) => {
            info!("Scoring with substitution matrix {}, gap {}", matrix.name(), align_args.gap_penalty);
            Box::new(SubstitutionScoring::new(matrix, align_args.gap_penalty))
        },
        None => {
            let scoring = GapLinear::new(align_args.match_award, align_args.mismatch_penalty, align_args.gap_penalty);
            info!("Scoring with {:?}", scoring);
            Box::new(scoring)
        }
    })
}

fn align_subcommand(align_args: &AlignArgs) -> Result<()> {
    let records = match (&align_args.seq_a, &align_args.seq_b, &align_args.sequences) {
        (Some(a), Some(b), _) => vec![
            SequenceRecord::new("seq_a", a.as_bytes()),
            SequenceRecord::new("seq_b", b.as_bytes()),
        ],
        (_, _, Some(path)) => load_records(path)?,
        _ => return Err(NwAlignError::Other)
            .with_context(|| "Give either a FASTA file or both --seq-a and --seq-b.".to_string()),
    };

    if records.len() < 2 {
        return Err(NwAlignError::Other)
            .with_context(|| format!("Need at least two sequences to align, got {}.", records.len()));
    }

    let pairs: Vec<(&SequenceRecord, &SequenceRecord)> = if align_args.all_pairs {
        records.iter().tuple_combinations().collect()
    } else {
        if records.len() > 2 {
            warn!("Only aligning the first two of {} records, use --all-pairs to align all.", records.len());
        }

        vec![(&records[0], &records[1])]
    };

    let debug_writer = align_args
        .debug_output
        .as_ref()
        .map(DebugOutputWriter::init);

    let scoring = build_scoring(align_args)?;
    let mut aligner = NeedlemanWunsch::with_policy(&*scoring, align_args.tie_break.step_order());
    if let Some(ref debug) = debug_writer {
        aligner = aligner.with_debug_output(debug);
    }

    let mut writer = create_output(align_args.output.as_deref())?;
    let mut reports = Vec::new();

    for (rec_a, rec_b) in pairs {
        if let Some(ref debug) = debug_writer {
            debug.log(DebugOutputMessage::NewPair {
                name_a: rec_a.name().to_string(),
                name_b: rec_b.name().to_string(),
                len_a: rec_a.sequence().len(),
                len_b: rec_b.sequence().len(),
            });
        }

        let aln = aligner.align(rec_a.sequence(), rec_b.sequence())
            .with_context(|| format!("Could not align {} to {}", rec_a.name(), rec_b.name()))?;

        info!("Aligned {} to {}, score {}", rec_a.name(), rec_b.name(), aln.score());

        match align_args.output_type {
            OutputType::Text => {
                writeln!(writer, "# {} vs {}", rec_a.name(), rec_b.name())?;
                writeln!(writer, "{}", print_alignment(&aln))?;
                writeln!(writer, "Score: {}", aln.score())?;
            },
            OutputType::Fasta => write_alignment_fasta(&mut writer, rec_a.name(), rec_b.name(), &aln)?,
            OutputType::Json => reports.push(AlignmentReport {
                name_a: rec_a.name(),
                name_b: rec_b.name(),
                score: aln.score(),
                aligned_a: String::from_utf8_lossy(aln.aligned_a()).into_owned(),
                aligned_b: String::from_utf8_lossy(aln.aligned_b()).into_owned(),
                stats: aln.stats(),
            }),
        }
    }

    if align_args.output_type == OutputType::Json {
        serde_json::to_writer_pretty(&mut writer, &reports)?;
        writeln!(writer)?;
    }

    writer.flush()?;

    if let Some(debug) = debug_writer {
        info!("Waiting for debug writer thread to finish...");
        debug.log(DebugOutputMessage::Terminate);
        debug.join()?;
    }

    Ok(())
}

fn compare_subcommand(compare_args: &CompareArgs) -> Result<()> {
    let records = load_records(&compare_args.sequences)?;

    let mut writer = stdout().lock();
    for pair in find_point_mutations(&records) {
        writeln!(writer, "{}", pair)?;
    }

    Ok(())
}

fn matchings_subcommand(matchings_args: &MatchingsArgs) -> Result<()> {
    let records = load_records(&matchings_args.sequences)?;

    let mut writer = stdout().lock();
    for record in &records {
        if matchings_args.validate {
            validate_alphabet(record, Alphabet::Rna)?;
        }

        writeln!(writer, "{}\t{}", record.name(), max_matchings(record.sequence()))?;
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.verbose);

    match &args.command {
        Some(NwAlignSubcommand::Align(v)) => align_subcommand(v)?,
        Some(NwAlignSubcommand::Compare(v)) => compare_subcommand(v)?,
        Some(NwAlignSubcommand::Matchings(v)) => matchings_subcommand(v)?,
        None => return Err(NwAlignError::Other).with_context(|| "No subcommand given.".to_string()),
    };

    Ok(())
}
