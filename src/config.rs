// src/config.rs

use std::path::PathBuf;

static DEFAULT_SOURCE_URL: &str =
    "https://en.wikipedia.org/wiki/Timeline_of_the_2019%E2%80%9320_Wuhan_coronavirus_outbreak";

/// Everything a run needs. Defaults reproduce the stock report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub source: SourceLayout,
    pub chart: ChartStyle,
    pub output: OutputSettings,
}

/// Where the table lives and which columns hold which series.
///
/// Column paths are header labels, outermost level first.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceLayout {
    pub url: String,
    pub table_index: usize,
    pub date_column: Vec<String>,
    pub infections_column: Vec<String>,
    pub deaths_column: Vec<String>,
    pub recovered_column: Vec<String>,
}

impl Default for SourceLayout {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            table_index: 1,
            date_column: path(&["DateCST", "DateCST"]),
            infections_column: path(&["Cases", "Confirmed"]),
            deaths_column: path(&["Deaths", "Deaths"]),
            recovered_column: path(&["Recovered", "Recovered"]),
        }
    }
}

fn path(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|l| l.to_string()).collect()
}

/// Figure styling handed to the plot stage.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub title: String,
    /// Figure size in inches, (width, height).
    pub size_inches: (f64, f64),
    pub dpi: u32,
    /// Font size in points.
    pub font_size: f64,
    pub font_family: String,
    pub infections_color: [u8; 3],
    pub deaths_color: [u8; 3],
    pub kill_rate_color: [u8; 3],
    pub kill_rate_alpha: f64,
    pub date_format: String,
}

impl Default for ChartStyle {
    fn default() -> Self {
        // seaborn's default palette, first three entries
        let [blue, orange, green] = [[0x1f, 0x77, 0xb4], [0xff, 0x7f, 0x0e], [0x2c, 0xa0, 0x2c]];
        Self {
            title: "Corona Virus Wuhan".to_string(),
            size_inches: (20.0, 8.0),
            dpi: 72,
            font_size: 20.0,
            font_family: "sans-serif".to_string(),
            infections_color: green,
            deaths_color: orange,
            kill_rate_color: blue,
            kill_rate_alpha: 0.5,
            date_format: "%m/%d".to_string(),
        }
    }
}

impl ChartStyle {
    /// Bitmap dimensions in pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        let (w, h) = self.size_inches;
        let dpi = f64::from(self.dpi);
        ((w * dpi).round() as u32, (h * dpi).round() as u32)
    }

    /// Font size converted from points to pixels at the configured resolution.
    pub fn font_pixels(&self) -> f64 {
        self.font_size * f64::from(self.dpi) / 72.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputSettings {
    pub image_path: PathBuf,
    /// Open the saved image in the system viewer.
    pub show: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            image_path: PathBuf::from("corona.png"),
            show: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_figure_geometry() {
        let style = ChartStyle::default();
        assert_eq!(style.pixel_size(), (1440, 576));
        assert_eq!(style.font_pixels(), 20.0);
    }

    #[test]
    fn test_default_layout_targets_timeline_table() {
        let cfg = Config::default();
        assert_eq!(cfg.source.table_index, 1);
        assert_eq!(cfg.source.date_column, vec!["DateCST", "DateCST"]);
        assert_eq!(cfg.source.infections_column, vec!["Cases", "Confirmed"]);
        assert_eq!(cfg.output.image_path, PathBuf::from("corona.png"));
        assert!(cfg.output.show);
    }
}
