// Imports
use std::path::PathBuf;

use anyhow::Context;
use clap::ArgMatches;
use console::style;
use hcceval_core::prelude::*;
use indicatif::MultiProgress;

use crate::app::config::Config;

pub fn eval(
    mut mat: ArgMatches,
    config: &Config,
) -> anyhow::Result<()> {
    let profile_filepath: PathBuf = mat.remove_one("profile").unwrap();
    let cluster_filepath: PathBuf = mat.remove_one("cluster").unwrap();
    let output_prefix: String = mat.remove_one("output").unwrap();
    let stepwise: usize = mat.remove_one("stepwise").unwrap();

    let profile = ProfileMatrix::from_file(&profile_filepath).with_context(|| {
        format!("Failed to load the profile matrix from '{}'", profile_filepath.display())
    })?;
    let cluster = ClusterMatrix::from_file(&cluster_filepath).with_context(|| {
        format!("Failed to load the cluster matrix from '{}'", cluster_filepath.display())
    })?;

    let levels = cluster
        .align_to(&profile)
        .context("Failed to align the cluster matrix against the profile matrix")?
        .select_levels(stepwise)?;

    let multi = MultiProgress::new();
    let evaluator = Evaluator::new(config.nb_workers)?;

    let silhouette = evaluator
        .silhouette_scores(&profile, &levels, &AllelicDistance, Some(&multi))
        .context("The silhouette phase failed")?;
    let similarity = evaluator.similarity_matrix(&levels, Similarity::default(), Some(&multi));

    let labels = levels.labels();
    write_report_to_file(&output_prefix, &labels, silhouette.view(), similarity.view())
        .with_context(|| format!("Failed to write the evaluation report to '{output_prefix}.tsv'"))?;
    render_chart(&output_prefix, stepwise, silhouette.view(), similarity.view())
        .with_context(|| format!("Failed to render the evaluation chart to '{output_prefix}.svg'"))?;

    println!("{} '{output_prefix}.tsv'", style("Tab delimited evaluation saved to").green());
    println!("{} '{output_prefix}.svg'", style("Graphic visualisation saved to").green());

    Ok(())
}
