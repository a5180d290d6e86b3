use std::path::PathBuf;

use oxishogi_evaluator::FeatureClass;

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct InspectSetArg {
    /// Evaluation set JSON to summarize
    #[arg(long)]
    eval_set: PathBuf,
}

pub(crate) fn run(arg: &InspectSetArg) -> anyhow::Result<()> {
    let set = util::read_eval_set(&arg.eval_set)?;
    let schema = &set.schema;

    println!(
        "Features: {} ({} major, {} minor)",
        schema.num_features(),
        schema.num_major_features(),
        schema.num_minor_features(),
    );
    for feature in schema.features() {
        let class = match feature.class {
            FeatureClass::Major => "Major",
            FeatureClass::Minor => "Minor",
        };
        println!("  {}: {class}", feature.label);
    }

    let positions = set.num_positions();
    let candidates = set.num_candidates();
    println!("Positions: {positions}");
    #[expect(clippy::cast_precision_loss)]
    let branching = candidates as f64 / positions as f64;
    println!("Candidate moves: {candidates} ({branching:.1} per position)");
    Ok(())
}
