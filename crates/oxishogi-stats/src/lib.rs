//! Statistical summaries for the oxishogi training pipeline.
//!
//! This crate provides the descriptive statistics the evolution logbook
//! records for every generation of a training run.
//!
//! # Examples
//!
//! ```
//! use oxishogi_stats::descriptive::DescriptiveStats;
//!
//! let fitness = [1.0, 4.0, 9.0, 16.0, 25.0];
//! let stats = DescriptiveStats::new(fitness).unwrap();
//! assert_eq!(stats.min, 1.0);
//! assert_eq!(stats.max, 25.0);
//! assert_eq!(stats.mean, 11.0);
//! ```

pub mod descriptive;
