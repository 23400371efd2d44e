use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::thread::JoinHandle;

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::errors::NwAlignError;

pub mod messages {
    use serde::{Deserialize, Serialize};

    use crate::aligner::ScoreMatrix;

    #[derive(Debug, Serialize, Deserialize)]
    pub enum DebugOutputMessage {
        NewPair { name_a: String, name_b: String, len_a: usize, len_b: usize },
        ScoreMatrix { tsv: String },
        Terminate,
    }

    impl DebugOutputMessage {
        pub fn new_from_matrix(matrix: &ScoreMatrix) -> Self {
            Self::ScoreMatrix { tsv: format!("{}", matrix) }
        }
    }
}

/// Writes intermediate alignment data to a directory from a background thread
pub struct DebugOutputWriter {
    transmitter: Sender<messages::DebugOutputMessage>,
    worker: DebugOutputWorker,
}

impl DebugOutputWriter {
    pub fn init<T: AsRef<Path>>(debug_output_dir: T) -> Self {
        let (tx, rx) = unbounded();

        Self { transmitter: tx, worker: DebugOutputWorker::new(debug_output_dir, rx) }
    }

    pub fn log(&self, msg: messages::DebugOutputMessage) {
        if let Err(e) = self.transmitter.send(msg) {
            tracing::warn!("Could not log debug message: {}", e)
        }
    }

    pub fn join(self) -> Result<(), NwAlignError> {
        self.worker.join()
    }
}

fn write_msg(writer: &mut impl Write, msg: &messages::DebugOutputMessage) {
    match serde_json::to_string(&msg) {
        Ok(json) => {
            if let Err(e) = writeln!(writer, "{}", json) {
                tracing::warn!("Error writing message to debug output: {}", e);
            }
        },
        Err(e) => tracing::warn!("Could not serialize debug data to JSON: {}", e)
    }
}

struct DebugOutputWorker {
    thread: JoinHandle<Result<(), NwAlignError>>,
}

impl DebugOutputWorker {
    fn new<T: AsRef<Path>>(debug_output_dir: T, receiver: Receiver<messages::DebugOutputMessage>) -> Self {
        let output_path = debug_output_dir.as_ref().to_path_buf();
        Self { thread: std::thread::spawn(move || {
            tracing::debug!("Debug output directory {:?}", output_path);
            std::fs::create_dir_all(&output_path)?;

            let mut curr_pair_name = "none".to_string();
            let mut events_file: Option<BufWriter<File>> = None;

            for msg in receiver {
                match msg {
                    messages::DebugOutputMessage::NewPair { ref name_a, ref name_b, .. } => {
                        curr_pair_name = format!("{name_a}_vs_{name_b}");
                        let mut output_file = File::create(output_path.join(format!("{curr_pair_name}.json")))
                            .map(BufWriter::new)?;

                        write_msg(&mut output_file, &msg);
                        events_file = Some(output_file);
                    },
                    messages::DebugOutputMessage::ScoreMatrix { ref tsv } => {
                        if let Some(ref mut events) = events_file {
                            write_msg(events, &msg);
                        }

                        let fname = output_path.join(format!("score_matrix_{}.tsv", &curr_pair_name));
                        let mut tsv_file = File::create(fname)?;
                        write!(tsv_file, "{}", tsv)?
                    },
                    messages::DebugOutputMessage::Terminate => break
                }
            }

            if let Some(mut events) = events_file {
                events.flush()?;
            }

            Ok(())
        })}
    }

    fn join(self) -> Result<(), NwAlignError> {
        self.thread.join().map_err(|_| NwAlignError::Other)?
    }
}

#[cfg(test)]
mod tests {
    use super::messages::DebugOutputMessage;
    use super::DebugOutputWriter;
    use crate::aligner::build_score_matrix;
    use crate::aligner::scoring::GapLinear;

    #[test]
    fn test_writes_matrix_files() {
        let dir = std::env::temp_dir().join(format!("nwalign_debug_{}", std::process::id()));

        let writer = DebugOutputWriter::init(&dir);
        writer.log(DebugOutputMessage::NewPair {
            name_a: "a".to_string(),
            name_b: "b".to_string(),
            len_a: 1,
            len_b: 1,
        });
        writer.log(DebugOutputMessage::new_from_matrix(&build_score_matrix(b"A", b"A", &GapLinear::default())));
        writer.log(DebugOutputMessage::Terminate);
        writer.join().unwrap();

        let tsv = std::fs::read_to_string(dir.join("score_matrix_a_vs_b.tsv")).unwrap();
        assert_eq!(tsv, "0\t-1\n-1\t1\n");

        let events = std::fs::read_to_string(dir.join("a_vs_b.json")).unwrap();
        assert_eq!(events.lines().count(), 2);
        assert!(events.starts_with("{\"NewPair\""));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
