pub mod errors;
pub mod aligner;
pub mod io;
pub mod seqtools;
pub mod debug;
