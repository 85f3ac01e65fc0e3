// src/plot/mod.rs

use crate::config::ChartStyle;
use crate::timeline::Timeline;
use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate};
use plotters::coord::types::RangedCoordi32;
use plotters::prelude::*;
use std::{fs, ops::Range, path::Path};
use tracing::{info, instrument, warn};

/// Axes ranges derived from the data.
#[derive(Debug, Clone, PartialEq)]
pub struct Extents {
    pub days: Range<i32>,
    pub counts: Range<f64>,
    pub rates: Range<f64>,
}

impl Extents {
    pub fn of(timeline: &Timeline) -> Option<Self> {
        let first = day_number(timeline.first_date()?);
        let mut last = day_number(timeline.last_date()?);
        if last <= first {
            last = first + 1;
        }
        let peak = timeline
            .rows
            .iter()
            .flat_map(|r| [r.infections, r.deaths])
            .fold(0.0_f64, f64::max);
        let peak_rate = timeline
            .kill_rates()
            .into_iter()
            .map(|(_, k)| k)
            .fold(0.0_f64, f64::max);
        Some(Self {
            days: first..last,
            counts: 0.0..headroom(peak),
            rates: 0.0..headroom(peak_rate),
        })
    }
}

fn headroom(max: f64) -> f64 {
    if max > 0.0 {
        max * 1.05
    } else {
        1.0
    }
}

/// Dates sit on the x axis as whole day numbers so both coordinate systems
/// share one range type and ticks never fall between days.
pub fn day_number(date: NaiveDate) -> i32 {
    date.num_days_from_ce()
}

pub fn format_day(x: i32, fmt: &str) -> String {
    NaiveDate::from_num_days_from_ce_opt(x)
        .map(|d| d.format(fmt).to_string())
        .unwrap_or_default()
}

/// Day numbers that get an x-axis label.
pub fn day_ticks(days: &Range<i32>, max_labels: usize) -> Vec<i32> {
    RangedCoordi32::from(days.clone()).key_points(max_labels)
}

pub fn format_percent(y: f64) -> String {
    format!("{:.1}%", y)
}

const X_LABELS: usize = 12;

fn rgb([r, g, b]: [u8; 3]) -> RGBColor {
    RGBColor(r, g, b)
}

/// Draw the dual-axis chart and write it to `path`, replacing any existing file.
#[instrument(level = "info", skip_all, fields(rows = timeline.len(), path = %path.display()))]
pub fn render(timeline: &Timeline, style: &ChartStyle, path: &Path) -> Result<()> {
    let Some(ext) = Extents::of(timeline) else {
        bail!("nothing to plot: timeline is empty");
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }

    let (infections, deaths) = timeline.case_series();
    let as_xy = |pts: Vec<(NaiveDate, f64)>| -> Vec<(i32, f64)> {
        pts.into_iter().map(|(d, v)| (day_number(d), v)).collect()
    };
    let infections = as_xy(infections);
    let deaths = as_xy(deaths);
    let kill_rates = as_xy(timeline.kill_rates());

    let font_px = style.font_pixels();
    let family = style.font_family.as_str();
    let label_font = (family, font_px).into_font();
    let gutter = (font_px * 4.0) as u32;

    let root = BitMapBackend::new(path, style.pixel_size()).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&style.title, (family, font_px * 1.2))
        .margin(10)
        .x_label_area_size((font_px * 2.0) as u32)
        .y_label_area_size(gutter)
        .right_y_label_area_size(gutter)
        .build_cartesian_2d(ext.days.clone(), ext.counts.clone())?
        .set_secondary_coord(ext.days.clone(), ext.rates.clone());

    chart
        .configure_mesh()
        .x_labels(X_LABELS)
        .x_label_formatter(&|x| format_day(*x, &style.date_format))
        .y_label_formatter(&|y| format!("{:.0}", y))
        .label_style(label_font.clone())
        .draw()?;
    chart
        .configure_secondary_axes()
        .y_label_formatter(&|y| format_percent(*y))
        .label_style(label_font.clone())
        .draw()?;

    let kill_color = rgb(style.kill_rate_color).mix(style.kill_rate_alpha);
    chart
        .draw_secondary_series(DashedLineSeries::new(
            kill_rates.clone(),
            10,
            6,
            kill_color.stroke_width(2),
        ))?
        .label("kill rate")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &kill_color));
    chart.draw_secondary_series(
        kill_rates
            .iter()
            .map(|p| Circle::new(*p, 3, kill_color.filled())),
    )?;

    for (name, points, color) in [
        ("infections", infections, rgb(style.infections_color)),
        ("deaths", deaths, rgb(style.deaths_color)),
    ] {
        chart
            .draw_series(LineSeries::new(points, color.stroke_width(2)).point_size(3))?
            .label(name)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font(label_font)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()
        .with_context(|| format!("writing chart to {}", path.display()))?;
    info!("chart saved to {}", path.display());
    Ok(())
}

/// Open the saved image in the system viewer. Headless hosts just log a warning.
pub fn show(path: &Path) {
    match open::that(path) {
        Ok(()) => info!(path = %path.display(), "opened chart viewer"),
        Err(e) => warn!(path = %path.display(), error = %e, "could not display chart"),
    }
}
