//! Manhattan plot generation for merged scan tables

use crate::PlotConfig;
use anyhow::{Context, Result};
use plotters::prelude::*;
use selsweep_core::types::{natural_chrom_cmp, MarkerRecord};
use std::collections::BTreeMap;
use std::path::Path;

/// Processed data ready for Manhattan plot rendering
struct ManhattanData {
    /// Points with cumulative x positions: (cumulative_pos, abs_score, chrom_index)
    points: Vec<(f64, f64, usize)>,
    /// Chromosome boundaries: (name, start_pos, end_pos, mid_pos)
    chrom_info: Vec<(String, f64, f64, f64)>,
    /// Maximum cumulative position
    max_x: f64,
    /// Maximum absolute score
    max_y: f64,
}

/// Lay markers out along a cumulative genome axis, one chromosome after
/// another in natural order, with a small gap between chromosomes.
fn prepare_manhattan_data(records: &[MarkerRecord]) -> ManhattanData {
    let mut by_chrom: BTreeMap<String, Vec<&MarkerRecord>> = BTreeMap::new();
    for record in records {
        by_chrom
            .entry(record.chromosome.clone())
            .or_default()
            .push(record);
    }

    let mut chrom_order: Vec<String> = by_chrom.keys().cloned().collect();
    chrom_order.sort_by(|a, b| natural_chrom_cmp(a, b));

    let mut cumulative_offset = 0.0;
    let mut points = Vec::new();
    let mut chrom_info = Vec::new();
    let mut max_y = 0.0_f64;

    for (chrom_idx, chrom_name) in chrom_order.iter().enumerate() {
        let mut chrom_points = by_chrom[chrom_name].clone();
        chrom_points.sort_by_key(|r| r.position);

        let chrom_start = cumulative_offset;
        let mut chrom_max_pos = 0.0_f64;

        for record in chrom_points {
            // non-finite scores cannot be placed on the axis
            if !record.abs_score.is_finite() {
                continue;
            }
            let pos = record.position as f64;
            chrom_max_pos = chrom_max_pos.max(pos);
            max_y = max_y.max(record.abs_score);
            points.push((cumulative_offset + pos, record.abs_score, chrom_idx));
        }

        let chrom_end = cumulative_offset + chrom_max_pos;
        let chrom_mid = (chrom_start + chrom_end) / 2.0;
        chrom_info.push((chrom_name.clone(), chrom_start, chrom_end, chrom_mid));

        // Gap between chromosomes
        cumulative_offset = chrom_end + chrom_max_pos * 0.02;
    }

    ManhattanData {
        points,
        chrom_info,
        max_x: cumulative_offset,
        max_y,
    }
}

/// Generate a Manhattan plot from merged scan records
///
/// # Arguments
/// * `records` - merged per-population marker records
/// * `output_path` - Path for output file (SVG or PNG based on extension)
/// * `config` - Plot configuration
///
/// # Example
/// ```ignore
/// use selsweep_plotting::{manhattan_plot, PlotConfig};
///
/// let config = PlotConfig { threshold: Some(threshold), ..PlotConfig::default() };
/// manhattan_plot(&records, "manhattan.svg", config)?;
/// ```
pub fn manhattan_plot<P: AsRef<Path>>(
    records: &[MarkerRecord],
    output_path: P,
    config: PlotConfig,
) -> Result<()> {
    let output_path = output_path.as_ref();

    if records.is_empty() {
        anyhow::bail!("No markers to plot");
    }

    let data = prepare_manhattan_data(records);

    // Padding above the tallest point, keeping the threshold line in frame
    let mut y_max = data.max_y * 1.1;
    if let Some(threshold) = config.threshold {
        y_max = y_max.max(threshold * 1.1);
    }
    let y_max = y_max.max(1.0);

    let ext = output_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("svg")
        .to_lowercase();

    match ext.as_str() {
        "svg" => draw_manhattan_svg(output_path, &data, &config, y_max),
        #[cfg(feature = "png")]
        "png" => draw_manhattan_png(output_path, &data, &config, y_max),
        _ => anyhow::bail!("Unsupported output format: {}", ext),
    }
}

fn draw_manhattan_svg(
    output_path: &Path,
    data: &ManhattanData,
    config: &PlotConfig,
    y_max: f64,
) -> Result<()> {
    let root = SVGBackend::new(output_path, (config.width, config.height)).into_drawing_area();

    draw_manhattan_impl(&root, data, config, y_max).context("Failed to draw Manhattan plot")?;

    root.present().context("Failed to write SVG")?;
    Ok(())
}

#[cfg(feature = "png")]
fn draw_manhattan_png(
    output_path: &Path,
    data: &ManhattanData,
    config: &PlotConfig,
    y_max: f64,
) -> Result<()> {
    let root = BitMapBackend::new(output_path, (config.width, config.height)).into_drawing_area();

    draw_manhattan_impl(&root, data, config, y_max).context("Failed to draw Manhattan plot")?;

    root.present().context("Failed to write PNG")?;
    Ok(())
}

fn draw_manhattan_impl<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    data: &ManhattanData,
    config: &PlotConfig,
    y_max: f64,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&config.theme.background)?;

    let title = config.title.as_deref().unwrap_or("Genome scan");

    let mut chart = ChartBuilder::on(root)
        .caption(
            title,
            ("sans-serif", 24).into_font().color(&config.theme.text),
        )
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..data.max_x, 0.0..y_max)?;

    // Chromosome names replace the meaningless cumulative coordinates
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(0)
        .y_desc(&config.y_label)
        .y_label_style(("sans-serif", 14).into_font().color(&config.theme.text))
        .axis_style(&config.theme.axis)
        .draw()?;

    // Threshold line
    if let Some(threshold) = config.threshold {
        chart.draw_series(LineSeries::new(
            vec![(0.0, threshold), (data.max_x, threshold)],
            config.theme.significance_line.stroke_width(2),
        ))?;
    }

    // Points colored by chromosome
    let colors = &config.theme.chromosome_colors;
    let point_size = config.point_size;

    for (cum_pos, score, chrom_idx) in &data.points {
        let color = &colors[*chrom_idx % colors.len()];
        chart.draw_series(std::iter::once(Circle::new(
            (*cum_pos, *score),
            point_size,
            color.filled(),
        )))?;
    }

    // Chromosome labels under the x-axis
    if config.show_chrom_labels {
        for (chrom_name, _start, _end, mid) in &data.chrom_info {
            chart.draw_series(std::iter::once(Text::new(
                chrom_name.clone(),
                (*mid, -y_max * 0.02),
                ("sans-serif", 11).into_font().color(&config.theme.text),
            )))?;
        }
    }

    Ok(())
}
