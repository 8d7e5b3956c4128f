// Imports
use std::io::Write;

use itertools::Itertools;
use ndarray::{ArrayView1, ArrayView2};
use plotters::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error("Failed to render the evaluation chart, {0}")]
    Render(String),
}

fn render_err<E: std::fmt::Display>(err: E) -> Error {
    Error::Render(err.to_string())
}

/// Writes the tab-delimited evaluation: one `#Silhouette` line per level, a blank line, then the
/// `#NMI` header and one similarity row per level at 3 decimal places.
pub fn write_report<W: Write>(
    mut output: W,
    labels: &[String],
    silhouette: ArrayView1<f64>,
    similarity: ArrayView2<f64>,
) -> Result<W, Error> {
    for (label, score) in labels.iter().zip_eq(silhouette.iter()) {
        writeln!(output, "#Silhouette\t{label}\t{score}")?;
    }

    writeln!(output)?;
    writeln!(output, "#NMI\t{}", labels.join("\t"))?;
    for (label, row) in labels.iter().zip_eq(similarity.rows()) {
        writeln!(output, "{label}\t{}", row.iter().map(|nmi| format!("{nmi:.3}")).join("\t"))?;
    }

    Ok(output)
}

pub fn write_report_to_file(
    prefix: &str,
    labels: &[String],
    silhouette: ArrayView1<f64>,
    similarity: ArrayView2<f64>,
) -> Result<(), Error> {
    let file = write_report(
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(format!("{prefix}.tsv"))?,
        labels,
        silhouette,
        similarity,
    )?;
    file.sync_all()?;
    Ok(())
}

/// Renders `<prefix>.svg`: the NMI heatmap on the original's `10·log10(1−nmi)` color scale above
/// a silhouette line chart, both indexed by allelic distance.
pub fn render_chart(
    prefix: &str,
    stepwise: usize,
    silhouette: ArrayView1<f64>,
    similarity: ArrayView2<f64>,
) -> Result<(), Error> {
    let nb_levels = silhouette.len();
    if nb_levels == 0 {
        return Ok(());
    }

    let path = format!("{prefix}.svg");
    let extent = (nb_levels * stepwise) as f64;
    let cell = stepwise as f64;

    let root = SVGBackend::new(&path, (800, 1200)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let (upper, lower) = root.split_vertically(780);

    {
        let mut chart = ChartBuilder::on(&upper)
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0.0..extent, extent..0.0)
            .map_err(render_err)?;
        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc("HCs (allelic distances)")
            .y_desc("HCs (allelic distances)")
            .draw()
            .map_err(render_err)?;
        chart
            .draw_series((0..nb_levels).cartesian_product(0..nb_levels).map(|(i, j)| {
                let (x0, y0) = (j as f64 * cell, i as f64 * cell);
                Rectangle::new(
                    [(x0, y0), (x0 + cell, y0 + cell)],
                    nmi_color(similarity[[i, j]]).filled(),
                )
            }))
            .map_err(render_err)?;
    }

    {
        let (mut y_min, mut y_max) = silhouette
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &s| (lo.min(s), hi.max(s)));
        y_min -= 0.05;
        y_max += 0.05;

        let mut chart = ChartBuilder::on(&lower)
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0.0..extent, y_min..y_max)
            .map_err(render_err)?;
        chart
            .configure_mesh()
            .x_desc("HCs (allelic distances)")
            .y_desc("Silhouette scores")
            .draw()
            .map_err(render_err)?;
        chart
            .draw_series(LineSeries::new(
                (0..nb_levels).map(|idx| ((idx * stepwise) as f64, silhouette[idx])),
                &BLUE,
            ))
            .map_err(render_err)?;
    }

    root.present().map_err(render_err)?;
    Ok(())
}

/// Diverging red/white/blue over `10·log10(1−nmi)`, centered at −10 so the interesting
/// `0.9..0.999` similarity band gets most of the dynamic range.
fn nmi_color(nmi: f64) -> RGBColor {
    const RED: (f64, f64, f64) = (178.0, 24.0, 43.0);
    const WHITE_C: (f64, f64, f64) = (247.0, 247.0, 247.0);
    const BLUE_C: (f64, f64, f64) = (33.0, 102.0, 172.0);

    let t = if nmi >= 1.0 { -30.0 } else { (10.0 * (1.0 - nmi).log10()).clamp(-30.0, 0.0) };

    let ((r0, g0, b0), (r1, g1, b1), f) = if t <= -10.0 {
        (RED, WHITE_C, (t + 30.0) / 20.0)
    } else {
        (WHITE_C, BLUE_C, (t + 10.0) / 10.0)
    };
    RGBColor(
        (r0 + (r1 - r0) * f).round() as u8,
        (g0 + (g1 - g0) * f).round() as u8,
        (b0 + (b1 - b0) * f).round() as u8,
    )
}
