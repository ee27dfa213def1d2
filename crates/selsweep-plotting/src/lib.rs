//! selsweep-plotting: visualization for selection-scan results
//!
//! Renders Manhattan plots of absolute haplotype scores along a cumulative
//! genome axis, with the outlier threshold drawn as a horizontal line.
//!
//! ## Features
//! - Manhattan plots with alternating chromosome colors and themes
//! - Threshold line at the configured cutoff
//! - SVG output (default)
//! - PNG output (optional, requires `png` feature)
//!
//! ## Example
//! ```ignore
//! use selsweep_plotting::{manhattan_plot, PlotConfig};
//!
//! let config = PlotConfig {
//!     threshold: Some(4.8),
//!     title: Some("JM".to_string()),
//!     ..PlotConfig::default()
//! };
//! manhattan_plot(&records, "jm_manhattan.svg", config)?;
//! ```

pub mod manhattan;
pub mod themes;

/// Configuration for plot appearance
#[derive(Debug, Clone)]
pub struct PlotConfig {
    /// Plot width in pixels
    pub width: u32,
    /// Plot height in pixels
    pub height: u32,
    /// Horizontal cutoff line (mean + k sigma); no line when `None`
    pub threshold: Option<f64>,
    /// Plot title
    pub title: Option<String>,
    /// Color theme
    pub theme: themes::Theme,
    /// Point size
    pub point_size: u32,
    /// Y-axis caption
    pub y_label: String,
    /// Show chromosome labels on x-axis
    pub show_chrom_labels: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 600,
            threshold: None,
            title: None,
            theme: themes::Theme::default(),
            point_size: 3,
            y_label: "|score|".to_string(),
            show_chrom_labels: true,
        }
    }
}

// Re-export main functions
pub use manhattan::manhattan_plot;
pub use themes::Theme;
