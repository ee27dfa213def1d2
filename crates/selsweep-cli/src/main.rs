use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use selsweep_annotate::{distinct_feature_count, join_windows, load_features, write_annotation_table};
use selsweep_core::io::{read_marker_table, read_regions_table, write_merged_table};
use selsweep_core::{
    merge_population_dir, print_thresholds, sigma_threshold, LoadWarning, ThresholdResult,
};
use selsweep_pipeline::{run_pipeline, PipelineConfig};
use selsweep_plotting::{manhattan_plot, PlotConfig, Theme};

/// selsweep: selection-signature scan toolkit
#[derive(Parser)]
#[command(
    name = "selsweep",
    version,
    about = "selsweep: aggregate genome-scan scores, call selection signatures, annotate them"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge one population's per-chromosome score files
    #[command(after_help = "EXAMPLES:
    # Concatenate JM's per-chromosome files in chromosome order
    selsweep merge --input-dir norm/ --population JM --out JM_merged.tsv

FILES:
    Partition files are matched by the '<population>_' prefix and ordered by
    the number after their '_chr' tag. 7/8/9-column layouts are accepted;
    gzipped files are read transparently.")]
    Merge {
        /// Directory with per-chromosome score files
        #[arg(long)]
        input_dir: String,

        /// Population label
        #[arg(long)]
        population: String,

        /// Output TSV path
        #[arg(long)]
        out: String,

        /// Highest chromosome number to look for
        #[arg(long, default_value = "29")]
        max_chrom: u32,
    },

    /// Scan populations for selection signatures
    #[command(after_help = "EXAMPLES:
    # Scan two populations with the default 3-sigma cutoff
    selsweep scan --input-dir norm/ --populations JM,RW --out-dir results/

    # Wider windows and a stricter cutoff
    selsweep scan --input-dir norm/ --populations JM --k 4 --window 50000 \\
        --out-dir results/

OUTPUT LAYOUT (per population under --out-dir):
    merged/{pop}_merged_scores.tsv
    significant_hits/{pop}_significant_hits.tsv
    regions/{pop}_regions.tsv")]
    Scan {
        // === Input/Output ===
        /// Directory with per-chromosome score files
        #[arg(long, help_heading = "Input/Output")]
        input_dir: String,

        /// Population labels (comma-separated)
        #[arg(long, help_heading = "Input/Output")]
        populations: String,

        /// Output directory
        #[arg(long, help_heading = "Input/Output")]
        out_dir: String,

        // === Analysis ===
        /// Highest chromosome number to merge
        #[arg(long, default_value = "29", help_heading = "Analysis")]
        max_chrom: u32,

        /// Sigma multiplier of the outlier cutoff (mean + k*sd)
        #[arg(long, default_value = "3.0", help_heading = "Analysis")]
        k: f64,

        /// Window half-width around each hit, in bp
        #[arg(long, default_value = "25000", help_heading = "Analysis")]
        window: u64,

        /// Number of threads (default: all cores)
        #[arg(long, help_heading = "Analysis")]
        threads: Option<usize>,
    },

    /// Annotate a windowed-region table against a feature catalogue
    #[command(after_help = "EXAMPLES:
    # Annotate an existing region table
    selsweep annotate --regions results/regions/JM_regions.tsv \\
        --gff genes.gff --out JM_annotated.tsv")]
    Annotate {
        /// Windowed-region table (CHR/START/END)
        #[arg(long)]
        regions: String,

        /// Feature catalogue (GFF3, plain or gzipped)
        #[arg(long)]
        gff: String,

        /// Output TSV path
        #[arg(long)]
        out: String,
    },

    /// Draw a Manhattan plot from a merged score table
    #[command(after_help = "EXAMPLES:
    # Manhattan plot with the 3-sigma threshold line
    selsweep plot --input results/merged/JM_merged_scores.tsv --out JM.svg

    # PNG output, no threshold line
    selsweep plot --input results/merged/JM_merged_scores.tsv --out JM.png --k 0")]
    Plot {
        // === Input/Output ===
        /// Merged score table (headerless TSV)
        #[arg(long, help_heading = "Input/Output")]
        input: String,

        /// Output file path (.svg or .png)
        #[arg(long, help_heading = "Input/Output")]
        out: String,

        // === Threshold ===
        /// Sigma multiplier for the threshold line (0 disables the line)
        #[arg(long, default_value = "3.0", help_heading = "Threshold")]
        k: f64,

        // === Appearance ===
        /// Plot title
        #[arg(long, help_heading = "Appearance")]
        title: Option<String>,

        /// Color theme
        #[arg(long, default_value = "classic", value_parser = ["classic", "grayscale", "dark"], help_heading = "Appearance")]
        theme: String,

        /// Plot width in pixels
        #[arg(long, default_value = "1200", help_heading = "Appearance")]
        width: u32,

        /// Plot height in pixels
        #[arg(long, default_value = "600", help_heading = "Appearance")]
        height: u32,
    },

    /// Run the whole pipeline: scan, annotate, and plot
    #[command(after_help = "EXAMPLES:
    # Scan, annotate, and plot four populations
    selsweep run --input-dir norm/ --populations JM,RW,AN,HO \\
        --gff genes.gff --out-dir results/

    # PNG plots with the dark theme, capped at 8 threads
    selsweep run --input-dir norm/ --populations JM,RW --gff genes.gff \\
        --out-dir results/ --plots png --theme dark --threads 8

NOTES:
    Populations are independent; one failing (for example with too few
    markers) does not stop the others. The run fails only when no population
    completes or the catalogue itself is unreadable.")]
    Run {
        // === Input/Output ===
        /// Directory with per-chromosome score files
        #[arg(long, help_heading = "Input/Output")]
        input_dir: String,

        /// Population labels (comma-separated)
        #[arg(long, help_heading = "Input/Output")]
        populations: String,

        /// Output directory
        #[arg(long, help_heading = "Input/Output")]
        out_dir: String,

        /// Feature catalogue (GFF3, plain or gzipped)
        #[arg(long, help_heading = "Input/Output")]
        gff: Option<String>,

        // === Analysis ===
        /// Highest chromosome number to merge
        #[arg(long, default_value = "29", help_heading = "Analysis")]
        max_chrom: u32,

        /// Sigma multiplier of the outlier cutoff (mean + k*sd)
        #[arg(long, default_value = "3.0", help_heading = "Analysis")]
        k: f64,

        /// Window half-width around each hit, in bp
        #[arg(long, default_value = "25000", help_heading = "Analysis")]
        window: u64,

        // === Output Options ===
        /// Manhattan plot format
        #[arg(long, default_value = "svg", value_parser = ["svg", "png", "none"], help_heading = "Output Options")]
        plots: String,

        /// Color theme for plots
        #[arg(long, default_value = "classic", value_parser = ["classic", "grayscale", "dark"], help_heading = "Output Options")]
        theme: String,

        /// Number of threads (default: all cores)
        #[arg(long, help_heading = "Output Options")]
        threads: Option<usize>,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Merge {
            input_dir,
            population,
            out,
            max_chrom,
        } => {
            let outcome = merge_population_dir(Path::new(&input_dir), &population, max_chrom)
                .with_context(|| format!("merging score files for {}", population))?;
            write_merged_table(Path::new(&out), &outcome.records)
                .with_context(|| format!("writing {}", out))?;
            eprintln!(
                "Merged {} markers from {} file(s) into {}",
                outcome.records.len(),
                outcome.files_merged,
                out
            );
            report_warnings(&outcome.warnings);
        }
        Commands::Scan {
            input_dir,
            populations,
            out_dir,
            max_chrom,
            k,
            window,
            threads,
        } => {
            run_scan(
                &input_dir,
                &populations,
                &out_dir,
                None,
                max_chrom,
                k,
                window,
                "none",
                "classic",
                threads,
            )?;
        }
        Commands::Annotate { regions, gff, out } => {
            eprintln!("Loading regions from {}...", regions);
            let (windows, region_warnings) = read_regions_table(Path::new(&regions))?;
            eprintln!("Loading feature catalogue from {}...", gff);
            let (features, gff_warnings) = load_features(Path::new(&gff))?;
            eprintln!(
                "Joining {} window(s) against {} feature(s)...",
                windows.len(),
                features.len()
            );

            let hits = join_windows(&windows, &features);
            write_annotation_table(Path::new(&out), &hits)
                .with_context(|| format!("writing {}", out))?;
            eprintln!(
                "{} hit(s), {} distinct feature(s), written to {}",
                hits.len(),
                distinct_feature_count(&hits),
                out
            );
            report_warnings(&region_warnings);
            report_warnings(&gff_warnings);
        }
        Commands::Plot {
            input,
            out,
            k,
            title,
            theme,
            width,
            height,
        } => {
            eprintln!("Loading merged scores from {}...", input);
            let (records, warnings) = read_marker_table(Path::new(&input), false)?;
            report_warnings(&warnings);
            if records.is_empty() {
                anyhow::bail!("no markers in {}", input);
            }

            let threshold = if k > 0.0 {
                let abs: Vec<f64> = records.iter().map(|r| r.abs_score).collect();
                match sigma_threshold(&abs, k) {
                    Ok(t) => {
                        eprintln!("Threshold (mean + {}*sd): {:.4}", k, t.threshold);
                        Some(t.threshold)
                    }
                    Err(err) => {
                        eprintln!("Skipping threshold line: {}", err);
                        None
                    }
                }
            } else {
                None
            };

            let config = PlotConfig {
                width,
                height,
                threshold,
                title,
                theme: parse_theme(&theme),
                ..PlotConfig::default()
            };
            manhattan_plot(&records, &out, config)?;
            eprintln!("Plot saved to {}", out);
        }
        Commands::Run {
            input_dir,
            populations,
            out_dir,
            gff,
            max_chrom,
            k,
            window,
            plots,
            theme,
            threads,
        } => {
            run_scan(
                &input_dir,
                &populations,
                &out_dir,
                gff.as_deref(),
                max_chrom,
                k,
                window,
                &plots,
                &theme,
                threads,
            )?;
        }
    }

    Ok(())
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_csv_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .collect()
}

fn parse_theme(name: &str) -> Theme {
    match name {
        "grayscale" => Theme::grayscale(),
        "dark" => Theme::dark(),
        _ => Theme::classic(),
    }
}

fn report_warnings(warnings: &[LoadWarning]) {
    if warnings.is_empty() {
        return;
    }
    eprintln!("{} warning(s):", warnings.len());
    for warning in warnings.iter().take(10) {
        eprintln!("  {}", warning);
    }
    if warnings.len() > 10 {
        eprintln!("  ... and {} more", warnings.len() - 10);
    }
}

fn run_scan(
    input_dir: &str,
    populations: &str,
    out_dir: &str,
    gff: Option<&str>,
    max_chrom: u32,
    k: f64,
    window: u64,
    plots: &str,
    theme: &str,
    threads: Option<usize>,
) -> Result<()> {
    if let Some(n) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()?;
    }

    let populations = parse_csv_list(populations);
    if populations.is_empty() {
        anyhow::bail!("no populations given");
    }

    let config = PipelineConfig {
        input_dir: PathBuf::from(input_dir),
        output_dir: PathBuf::from(out_dir),
        populations,
        max_chromosome: max_chrom,
        k,
        half_width: window,
        annotation: gff.map(PathBuf::from),
    };

    let summary = run_pipeline(&config)?;

    let thresholds: Vec<(String, ThresholdResult)> = summary
        .succeeded()
        .map(|r| (r.population.clone(), r.threshold.clone()))
        .collect();
    print_thresholds(&thresholds);

    let warning_total: usize = summary.succeeded().map(|r| r.warnings.len()).sum();
    if warning_total > 0 {
        eprintln!("{} input warning(s)", warning_total);
    }

    if plots != "none" {
        let plots_dir = Path::new(out_dir).join("plots");
        std::fs::create_dir_all(&plots_dir)?;
        for report in summary.succeeded() {
            let (records, _) = read_marker_table(&report.merged_path, false)?;
            let path = plots_dir.join(format!("{}_manhattan.{}", report.population, plots));
            let plot_config = PlotConfig {
                threshold: Some(report.threshold.threshold),
                title: Some(report.population.clone()),
                theme: parse_theme(theme),
                ..PlotConfig::default()
            };
            manhattan_plot(&records, &path, plot_config)
                .with_context(|| format!("plotting {}", path.display()))?;
            eprintln!("[{}] plot saved to {}", report.population, path.display());
        }
    }

    for (population, err) in summary.failed() {
        eprintln!("{} failed: {:#}", population, err);
    }
    if summary.succeeded().count() == 0 {
        anyhow::bail!("no population completed successfully");
    }

    Ok(())
}
