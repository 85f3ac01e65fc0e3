// src/pipeline.rs

use crate::config::Config;
use crate::fetch::{TimelineSource, WebSource};
use crate::plot;
use crate::timeline::{self, Timeline};
use anyhow::Result;
use std::time::Instant;
use tracing::info;

/// Fetch and clean; no side effects beyond the source's own I/O.
pub fn prepare(source: &dyn TimelineSource) -> Result<Timeline> {
    let raw = source.load()?;
    Ok(timeline::clean(raw))
}

/// Fetch, clean, plot, show.
pub fn run(config: &Config) -> Result<Timeline> {
    let start = Instant::now();
    let source = WebSource::new(config.source.clone())?;
    let timeline = prepare(&source)?;

    if let (Some(first), Some(last)) = (timeline.first_date(), timeline.last_date()) {
        info!(%first, %last, rows = timeline.len(), "timeline span");
    }
    if let Some(latest) = timeline.rows.last() {
        info!(
            date = %latest.date,
            infections = latest.infections,
            deaths = latest.deaths,
            recovered = latest.recovered,
            "latest observation"
        );
    }

    plot::render(&timeline, &config.chart, &config.output.image_path)?;
    if config.output.show {
        plot::show(&config.output.image_path);
    }
    info!(elapsed = ?start.elapsed(), "done");
    Ok(timeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceLayout;
    use crate::fetch::HtmlSource;
    use chrono::NaiveDate;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    // Row 3 has only two populated fields and is dropped; the rest exercise
    // forward fill on infections/deaths and the recovered fill.
    const PAGE: &str = r#"
<html><body>
<table><tr><td>navigation</td></tr></table>
<table class="wikitable">
  <tr>
    <th rowspan="2">DateCST</th>
    <th colspan="2">Cases</th>
    <th rowspan="2">Deaths</th>
    <th rowspan="2">Recovered</th>
  </tr>
  <tr><th>Suspected</th><th>Confirmed</th></tr>
  <tr><td>20 January 2020</td><td>54</td><td>100</td><td>5</td><td>20</td></tr>
  <tr><td>21 January 2020</td><td></td><td></td><td>6</td><td>25</td></tr>
  <tr><td>22 January 2020</td><td></td><td></td><td>7</td><td>—</td></tr>
  <tr><td>23 January 2020</td><td></td><td>200</td><td>9</td><td></td></tr>
  <tr><td>24 January 2020</td><td></td><td>300</td><td></td><td>40</td></tr>
</table>
</body></html>"#;

    #[test]
    fn test_prepare_end_to_end() -> Result<()> {
        init_test_logging();
        let source = HtmlSource::new(PAGE, SourceLayout::default());
        let tl = prepare(&source)?;

        let dates: Vec<NaiveDate> = tl.rows.iter().map(|o| o.date).collect();
        let want_dates: Vec<NaiveDate> = [20, 21, 23, 24]
            .iter()
            .map(|d| NaiveDate::from_ymd_opt(2020, 1, *d).unwrap())
            .collect();
        assert_eq!(dates, want_dates);

        let (infections, deaths) = tl.case_series();
        let infections: Vec<f64> = infections.into_iter().map(|(_, v)| v).collect();
        let deaths: Vec<f64> = deaths.into_iter().map(|(_, v)| v).collect();
        assert_eq!(infections, vec![100.0, 100.0, 200.0, 300.0]);
        assert_eq!(deaths, vec![5.0, 6.0, 9.0, 9.0]);

        let recovered: Vec<f64> = tl.rows.iter().map(|o| o.recovered).collect();
        assert_eq!(recovered, vec![20.0, 25.0, 25.0, 40.0]);

        let rates: Vec<f64> = tl.kill_rates().into_iter().map(|(_, k)| k).collect();
        let want = [
            100.0 * 5.0 / 120.0,
            100.0 * 6.0 / 125.0,
            100.0 * 9.0 / 225.0,
            100.0 * 9.0 / 340.0,
        ];
        assert_eq!(rates.len(), want.len());
        for (got, want) in rates.iter().zip(want) {
            assert!((got - want).abs() < 1e-12, "{got} != {want}");
        }
        Ok(())
    }

    #[test]
    fn test_prepare_propagates_layout_errors() {
        init_test_logging();
        let layout = SourceLayout {
            table_index: 2,
            ..SourceLayout::default()
        };
        assert!(prepare(&HtmlSource::new(PAGE, layout)).is_err());
    }
}
