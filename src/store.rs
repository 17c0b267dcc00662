//! Persistence of per-sample evaluation results.

use crate::error::Result;
use crate::results::SampleEvaluation;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Durably commits one sample's evaluation.
///
/// A call either succeeds or returns an error. Nothing is retried.
pub trait SampleStore {
    fn save(&mut self, evaluation: &SampleEvaluation) -> Result<()>;
}

/// Writes each evaluation as one JSON object per line.
///
/// The writer is flushed after every sample, so samples saved before a
/// failure remain on disk.
pub struct JsonLinesStore<W: Write> {
    writer: W,
    written: usize,
}

impl JsonLinesStore<BufWriter<File>> {
    /// Create (or truncate) a JSON lines file at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonLinesStore<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Number of evaluations written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> SampleStore for JsonLinesStore<W> {
    fn save(&mut self, evaluation: &SampleEvaluation) -> Result<()> {
        serde_json::to_writer(&mut self.writer, evaluation)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.written += 1;
        Ok(())
    }
}

/// Keeps evaluations in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    evaluations: Vec<SampleEvaluation>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn evaluations(&self) -> &[SampleEvaluation] {
        &self.evaluations
    }

    pub fn into_evaluations(self) -> Vec<SampleEvaluation> {
        self.evaluations
    }
}

impl SampleStore for MemoryStore {
    fn save(&mut self, evaluation: &SampleEvaluation) -> Result<()> {
        self.evaluations.push(evaluation.clone());
        Ok(())
    }
}
