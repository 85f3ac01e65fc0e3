// src/fetch/mod.rs
//
// Everything that knows the source page's layout lives here: which table,
// which header paths, how cells become values. The rest of the crate only
// sees a `RawTimeline`.

pub mod page;
pub mod table;

use crate::config::SourceLayout;
use crate::timeline::{
    parse::{parse_count, parse_date},
    RawObservation, RawTimeline,
};
use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use self::table::HtmlTable;
use tracing::{debug, info, instrument};
use url::Url;

/// Anything that can produce the raw four-column table.
pub trait TimelineSource {
    fn load(&self) -> Result<RawTimeline>;
}

/// Downloads the configured page and reads the table from it.
pub struct WebSource {
    client: Client,
    url: Url,
    layout: SourceLayout,
}

impl WebSource {
    pub fn new(layout: SourceLayout) -> Result<Self> {
        Self::with_client(page::build_client()?, layout)
    }

    pub fn with_client(client: Client, layout: SourceLayout) -> Result<Self> {
        let url = Url::parse(&layout.url)
            .with_context(|| format!("parsing source URL {}", layout.url))?;
        Ok(Self {
            client,
            url,
            layout,
        })
    }
}

impl TimelineSource for WebSource {
    fn load(&self) -> Result<RawTimeline> {
        let html = page::fetch_page(&self.client, &self.url)?;
        extract_timeline(&html, &self.layout)
            .with_context(|| format!("reading timeline from {}", self.url))
    }
}

/// Reads the table from HTML already in memory.
pub struct HtmlSource {
    html: String,
    layout: SourceLayout,
}

impl HtmlSource {
    pub fn new(html: impl Into<String>, layout: SourceLayout) -> Self {
        Self {
            html: html.into(),
            layout,
        }
    }
}

impl TimelineSource for HtmlSource {
    fn load(&self) -> Result<RawTimeline> {
        extract_timeline(&self.html, &self.layout)
    }
}

/// Pick the table at `layout.table_index` and read the four columns from it.
#[instrument(level = "info", skip_all, fields(table = layout.table_index))]
pub fn extract_timeline(html: &str, layout: &SourceLayout) -> Result<RawTimeline> {
    let tables = table::parse_tables(html);
    debug!(count = tables.len(), "tables on page");
    let table = tables.get(layout.table_index).ok_or_else(|| {
        anyhow!(
            "page has {} tables; none at index {}",
            tables.len(),
            layout.table_index
        )
    })?;

    let date = locate(table, &layout.date_column)?;
    let infections = locate(table, &layout.infections_column)?;
    let deaths = locate(table, &layout.deaths_column)?;
    let recovered = locate(table, &layout.recovered_column)?;

    let mut rows = Vec::with_capacity(table.body.len());
    for idx in 0..table.body.len() {
        let count = |col: usize, path: &[String]| {
            parse_count(table.cell(idx, col))
                .with_context(|| format!("row {} column {:?}", idx, path))
        };
        rows.push(RawObservation {
            date: parse_date(table.cell(idx, date))
                .with_context(|| format!("row {} column {:?}", idx, layout.date_column))?,
            infections: count(infections, &layout.infections_column)?,
            deaths: count(deaths, &layout.deaths_column)?,
            recovered: count(recovered, &layout.recovered_column)?,
        });
    }

    info!(rows = rows.len(), "fetched timeline");
    Ok(RawTimeline::new(rows))
}

fn locate(table: &HtmlTable, path: &[String]) -> Result<usize> {
    table.find_column(path).ok_or_else(|| {
        let available: Vec<Vec<String>> =
            (0..table.width()).map(|c| table.column_labels(c)).collect();
        anyhow!("no column {:?}; table has {:?}", path, available)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const PAGE: &str = r#"
<html><body>
<table class="infobox"><tr><td>Outbreak</td></tr></table>
<table class="wikitable">
  <thead>
    <tr>
      <th rowspan="2">DateCST</th>
      <th colspan="2">Cases</th>
      <th rowspan="2">Deaths</th>
      <th rowspan="2">Recovered</th>
    </tr>
    <tr><th>Suspected</th><th>Confirmed</th></tr>
  </thead>
  <tbody>
    <tr><td>20 Jan 2020</td><td>54</td><td>291</td><td>6</td><td>25</td></tr>
    <tr><td>21 Jan 2020</td><td></td><td>1,440<sup>[3]</sup></td><td>—</td><td></td></tr>
  </tbody>
</table>
</body></html>"#;

    #[test]
    fn test_extract_selects_and_renames_columns() -> Result<()> {
        let raw = HtmlSource::new(PAGE, SourceLayout::default()).load()?;
        assert_eq!(
            raw.rows,
            vec![
                RawObservation {
                    date: NaiveDate::from_ymd_opt(2020, 1, 20),
                    infections: Some(291.0),
                    deaths: Some(6.0),
                    recovered: Some(25.0),
                },
                RawObservation {
                    date: NaiveDate::from_ymd_opt(2020, 1, 21),
                    infections: Some(1440.0),
                    deaths: None,
                    recovered: None,
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn test_missing_table_is_an_error() {
        let layout = SourceLayout {
            table_index: 5,
            ..SourceLayout::default()
        };
        let err = extract_timeline(PAGE, &layout).unwrap_err();
        assert!(err.to_string().contains("none at index 5"));
    }

    #[test]
    fn test_renamed_column_is_an_error() {
        let layout = SourceLayout {
            recovered_column: vec!["Recoveries".into(), "Recoveries".into()],
            ..SourceLayout::default()
        };
        let err = extract_timeline(PAGE, &layout).unwrap_err();
        assert!(err.to_string().contains("Recoveries"));
    }

    #[test]
    fn test_unparsable_date_is_an_error() {
        let page = PAGE.replace("21 Jan 2020", "the next day");
        let err = HtmlSource::new(page, SourceLayout::default())
            .load()
            .unwrap_err();
        assert!(format!("{:#}", err).contains("unrecognised date"));
    }

    #[test]
    fn test_bad_source_url_is_rejected() {
        let layout = SourceLayout {
            url: "not a url".into(),
            ..SourceLayout::default()
        };
        assert!(WebSource::new(layout).is_err());
    }
}
