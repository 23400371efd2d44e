pub mod alignment;
pub mod matrix;
pub mod scoring;
pub mod traceback;

use tracing::{debug, debug_span};

use crate::debug::messages::DebugOutputMessage;
use crate::debug::DebugOutputWriter;
use crate::errors::NwAlignError;

pub use alignment::{print_alignment, AlignedPair, Alignment, AlignmentStats};
pub use matrix::{build_score_matrix, ScoreMatrix};
pub use scoring::{AlignmentScoring, GapLinear, SubstitutionMatrix, SubstitutionScoring, GAP_SYMBOL};
pub use traceback::{traceback, DiagonalFirst, Step, StepOrder, TracebackPolicy};

/// Global pairwise alignment of two sequences
pub trait PairwiseAligner {
    fn align<A, B>(&self, seq_a: A, seq_b: B) -> Result<Alignment, NwAlignError>
    where
        A: AsRef<[u8]>,
        B: AsRef<[u8]>;
}

/// Needleman-Wunsch aligner: fills the full score matrix, then walks it back from the
/// bottom-right corner to recover one optimal alignment.
pub struct NeedlemanWunsch<'a, C, P = DiagonalFirst>
where
    C: AlignmentScoring,
    P: TracebackPolicy,
{
    scoring: C,
    policy: P,
    debug_output: Option<&'a DebugOutputWriter>,
}

impl<'a, C> NeedlemanWunsch<'a, C, DiagonalFirst>
where
    C: AlignmentScoring,
{
    pub fn new(scoring: C) -> Self {
        Self::with_policy(scoring, DiagonalFirst)
    }
}

impl<'a, C, P> NeedlemanWunsch<'a, C, P>
where
    C: AlignmentScoring,
    P: TracebackPolicy,
{
    pub fn with_policy(scoring: C, policy: P) -> Self {
        Self {
            scoring,
            policy,
            debug_output: None,
        }
    }

    /// Send every computed score matrix to the given debug writer
    pub fn with_debug_output(mut self, debug_writer: &'a DebugOutputWriter) -> Self {
        self.debug_output = Some(debug_writer);
        self
    }

    pub fn scoring(&self) -> &C {
        &self.scoring
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Only fill the score matrix, without traceback
    pub fn score_matrix(&self, seq_a: &[u8], seq_b: &[u8]) -> ScoreMatrix {
        build_score_matrix(seq_a, seq_b, &self.scoring)
    }

    fn align_u8(&self, seq_a: &[u8], seq_b: &[u8]) -> Result<Alignment, NwAlignError> {
        let span = debug_span!("align", len_a = seq_a.len(), len_b = seq_b.len());
        let _enter = span.enter();

        let matrix = self.score_matrix(seq_a, seq_b);

        if let Some(debug_out) = self.debug_output {
            debug_out.log(DebugOutputMessage::new_from_matrix(&matrix));
        }

        let alignment = traceback(&matrix, seq_a, seq_b, &self.scoring, &self.policy)?;
        debug!(score = alignment.score(), length = alignment.len(), "Alignment done");

        Ok(alignment)
    }
}

impl<'a, C, P> PairwiseAligner for NeedlemanWunsch<'a, C, P>
where
    C: AlignmentScoring,
    P: TracebackPolicy,
{
    fn align<A, B>(&self, seq_a: A, seq_b: B) -> Result<Alignment, NwAlignError>
    where
        A: AsRef<[u8]>,
        B: AsRef<[u8]>,
    {
        self.align_u8(seq_a.as_ref(), seq_b.as_ref())
    }
}
