// src/timeline/mod.rs

pub mod clean;
pub mod parse;

pub use clean::clean;

use chrono::NaiveDate;

/// One row as read from the page, before any filling.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawObservation {
    pub date: Option<NaiveDate>,
    pub infections: Option<f64>,
    pub deaths: Option<f64>,
    pub recovered: Option<f64>,
}

impl RawObservation {
    /// Number of populated fields among the four columns.
    pub fn non_null_count(&self) -> usize {
        usize::from(self.date.is_some())
            + usize::from(self.infections.is_some())
            + usize::from(self.deaths.is_some())
            + usize::from(self.recovered.is_some())
    }
}

/// The fetched table, in page order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTimeline {
    pub rows: Vec<RawObservation>,
}

impl RawTimeline {
    pub fn new(rows: Vec<RawObservation>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A fully resolved row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub infections: f64,
    pub deaths: f64,
    pub recovered: f64,
}

impl Observation {
    /// `100 * deaths / (infections + recovered)`; `None` when the denominator is zero.
    pub fn kill_rate(&self) -> Option<f64> {
        let base = self.infections + self.recovered;
        if base == 0.0 {
            None
        } else {
            Some(100.0 * self.deaths / base)
        }
    }
}

/// The cleaned time series handed to the plot stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    pub rows: Vec<Observation>,
}

impl Timeline {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.iter().map(|r| r.date).min()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.iter().map(|r| r.date).max()
    }

    /// (date, infections) and (date, deaths) points for the primary axis.
    pub fn case_series(&self) -> (Vec<(NaiveDate, f64)>, Vec<(NaiveDate, f64)>) {
        self.rows
            .iter()
            .map(|r| ((r.date, r.infections), (r.date, r.deaths)))
            .unzip()
    }

    /// Kill-rate points for the secondary axis; rows with a zero denominator are skipped.
    pub fn kill_rates(&self) -> Vec<(NaiveDate, f64)> {
        self.rows
            .iter()
            .filter_map(|r| r.kill_rate().map(|k| (r.date, k)))
            .collect()
    }
}
