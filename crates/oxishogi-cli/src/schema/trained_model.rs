use chrono::{DateTime, Utc};
use oxishogi_evaluator::FeatureClass;
use serde::{Deserialize, Serialize};

/// Persisted result of a training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    pub trained_at: DateTime<Utc>,
    pub seed: u64,
    pub generations: usize,
    pub fitness: u64,
    pub duration_secs: u64,
    pub weights: Vec<TrainedWeight>,
}

/// One decoded feature weight of the best individual.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedWeight {
    pub label: String,
    pub class: FeatureClass,
    pub weight: u32,
}
