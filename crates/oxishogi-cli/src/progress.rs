//! Stderr progress bar for training runs.
//!
//! Purely observational: the evolution loop drives it through the
//! [`ProgressSink`] interface and never reads anything back.

use std::{
    io::{self, Write as _},
    time::Instant,
};

use oxishogi_training::ProgressSink;

use crate::util;

/// In-place progress line on stderr: elapsed time, generation counter and
/// percentage.
#[derive(Debug)]
pub struct StderrProgress {
    total: usize,
    started: Instant,
}

impl StderrProgress {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            started: Instant::now(),
        }
    }

    #[expect(clippy::cast_precision_loss)]
    fn draw(&self, generation: usize) {
        let percent = if self.total == 0 {
            100.0
        } else {
            generation as f64 / self.total as f64 * 100.0
        };
        eprint!(
            "\r {} {generation}/{} ({percent:5.1}%)",
            util::format_hms(self.started.elapsed()),
            self.total,
        );
        let _ = io::stderr().flush();
    }
}

impl ProgressSink for StderrProgress {
    fn start(&mut self) {
        self.started = Instant::now();
        self.draw(0);
    }

    fn update(&mut self, generation: usize) {
        self.draw(generation);
    }

    fn finish(&mut self) {
        eprintln!();
    }
}
