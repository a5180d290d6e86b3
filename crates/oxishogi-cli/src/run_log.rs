//! The persistent run log of a training run.
//!
//! Mirrors what the console progress bar cannot keep: the configuration
//! echo, one statistics row per generation, and the final results (best
//! individual, final population, total duration). The log doubles as the
//! evolution loop's record sink, so rows appear as generations complete
//! rather than in one burst at the end.

use std::{
    fs::File,
    io::{self, BufWriter, Write as _},
    path::Path,
};

use anyhow::Context;
use oxishogi_training::{GenerationRecord, RecordSink};

use crate::util;

/// Buffered, file-backed run log.
///
/// [`RecordSink`] has no error channel, so write failures during the run
/// are deferred and surfaced by [`RunLog::finish`].
#[derive(Debug)]
pub struct RunLog {
    writer: BufWriter<File>,
    deferred: Option<io::Error>,
}

impl RunLog {
    pub fn create(path: &Path) -> anyhow::Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create run log: {}", path.display()))?;
        Ok(Self {
            writer: BufWriter::new(file),
            deferred: None,
        })
    }

    /// Writes one line to the log.
    pub fn line(&mut self, message: &str) -> anyhow::Result<()> {
        writeln!(self.writer, "{message}").context("Failed to write run log")
    }

    /// Writes the column header for the per-generation statistics rows.
    pub fn generation_header(&mut self) -> anyhow::Result<()> {
        self.line(&format!(
            "{:<6} {:<8} {:<10} {:<12} {:<12} {:<10} {:<10}",
            "gen", "nevals", "time", "avg", "std", "min", "max"
        ))
    }

    fn write_record(&mut self, record: &GenerationRecord) -> io::Result<()> {
        writeln!(
            self.writer,
            "{:<6} {:<8} {:<10} {:<12.2} {:<12.2} {:<10.0} {:<10.0}",
            record.generation,
            record.evaluations,
            util::format_hms(record.elapsed),
            record.fitness.mean,
            record.fitness.std_dev,
            record.fitness.min,
            record.fitness.max,
        )
    }

    /// Flushes the log and reports any write failure deferred during the
    /// run.
    pub fn finish(mut self) -> anyhow::Result<()> {
        if let Some(err) = self.deferred.take() {
            return Err(err).context("Failed to write run log during the run");
        }
        self.writer.flush().context("Failed to flush run log")
    }
}

impl RecordSink for RunLog {
    fn record(&mut self, record: &GenerationRecord) {
        if self.deferred.is_none()
            && let Err(err) = self.write_record(record)
        {
            self.deferred = Some(err);
        }
    }
}
