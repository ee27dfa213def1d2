//! Color themes for scan plots

use plotters::style::RGBColor;

/// Color theme for plots
#[derive(Debug, Clone)]
pub struct Theme {
    /// Background color
    pub background: RGBColor,
    /// Text color
    pub text: RGBColor,
    /// Axis color
    pub axis: RGBColor,
    /// Threshold line color
    pub significance_line: RGBColor,
    /// Alternating chromosome colors
    pub chromosome_colors: Vec<RGBColor>,
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

impl Theme {
    /// Classic theme with alternating steel blue / ochre chromosomes
    pub fn classic() -> Self {
        Self {
            background: RGBColor(255, 255, 255),
            text: RGBColor(0, 0, 0),
            axis: RGBColor(90, 90, 90),
            significance_line: RGBColor(193, 41, 46),
            chromosome_colors: vec![
                RGBColor(54, 92, 141),  // Steel blue
                RGBColor(214, 140, 69), // Ochre
            ],
        }
    }

    /// Grayscale theme for print
    pub fn grayscale() -> Self {
        Self {
            background: RGBColor(255, 255, 255),
            text: RGBColor(0, 0, 0),
            axis: RGBColor(80, 80, 80),
            significance_line: RGBColor(20, 20, 20),
            chromosome_colors: vec![
                RGBColor(70, 70, 70),    // Dark gray
                RGBColor(170, 170, 170), // Light gray
            ],
        }
    }

    /// Dark theme for presentations
    pub fn dark() -> Self {
        Self {
            background: RGBColor(25, 28, 32),
            text: RGBColor(225, 228, 230),
            axis: RGBColor(130, 135, 140),
            significance_line: RGBColor(242, 95, 92),
            chromosome_colors: vec![
                RGBColor(77, 175, 220), // Sky blue
                RGBColor(255, 200, 87), // Amber
            ],
        }
    }
}
