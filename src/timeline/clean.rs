// src/timeline/clean.rs

use super::{Observation, RawObservation, RawTimeline, Timeline};
use tracing::{info, instrument, warn};

/// Rows with fewer populated fields than this are treated as noise.
pub const MIN_NON_NULL: usize = 3;

/// How many single-step fills the recovered column gets before defaulting to 0.
pub const RECOVERED_FILL_PASSES: usize = 3;

/// Drop sparse rows, fill the gaps, and resolve every row to an `Observation`.
#[instrument(level = "info", skip(raw), fields(rows = raw.len()))]
pub fn clean(raw: RawTimeline) -> Timeline {
    let total = raw.len();
    let mut rows = drop_sparse_rows(raw.rows, MIN_NON_NULL);
    let dropped = total - rows.len();
    if dropped > 0 {
        info!(dropped, "dropped sparse rows");
    }

    fill_cases(&mut rows);
    fill_recovered(&mut rows, RECOVERED_FILL_PASSES);

    let timeline = resolve(rows);
    info!(rows = timeline.len(), "cleaned");
    timeline
}

/// Keep rows with at least `min` populated fields.
pub fn drop_sparse_rows(rows: Vec<RawObservation>, min: usize) -> Vec<RawObservation> {
    rows.into_iter()
        .filter(|r| r.non_null_count() >= min)
        .collect()
}

/// Forward fill infections and deaths.
pub fn fill_cases(rows: &mut [RawObservation]) {
    let mut infections = None;
    let mut deaths = None;
    for row in rows.iter_mut() {
        forward_fill(&mut row.infections, &mut infections);
        forward_fill(&mut row.deaths, &mut deaths);
    }
}

fn forward_fill(slot: &mut Option<f64>, last: &mut Option<f64>) {
    match *slot {
        Some(v) => *last = Some(v),
        None => *slot = *last,
    }
}

/// Fill recovered from the previous row `passes` times, then default to 0.
///
/// Each pass only looks one row back at the values left by the previous
/// pass, so a run of nulls longer than `passes` keeps its tail for the
/// zero default.
pub fn fill_recovered(rows: &mut [RawObservation], passes: usize) {
    for _ in 0..passes {
        let previous: Vec<Option<f64>> = rows.iter().map(|r| r.recovered).collect();
        for (row, prev) in rows.iter_mut().skip(1).zip(previous) {
            if row.recovered.is_none() {
                row.recovered = prev;
            }
        }
    }
    for row in rows.iter_mut() {
        row.recovered.get_or_insert(0.0);
    }
}

fn resolve(rows: Vec<RawObservation>) -> Timeline {
    let mut out = Vec::with_capacity(rows.len());
    for (idx, row) in rows.into_iter().enumerate() {
        match (row.date, row.infections, row.deaths) {
            (Some(date), Some(infections), Some(deaths)) => out.push(Observation {
                date,
                infections,
                deaths,
                recovered: row.recovered.unwrap_or(0.0),
            }),
            _ => warn!(index = idx, ?row, "dropping row with unresolved values"),
        }
    }
    Timeline { rows: out }
}
