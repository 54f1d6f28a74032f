//! Particle-size percentages
//!
//! Rows accumulate in the order they are listed, not in sieve order: an
//! out-of-order row shifts the cumulative curve of every row after it.

use super::{finite, ratio, Reduce, TestParameters};
use crate::measurement::SieveRow;

impl Reduce for SieveRow {
    fn reduce(&self, preceding: &[Self], parameters: &TestParameters) -> Self {
        let before: f64 = preceding
            .iter()
            .filter_map(|row| percent_retained(row, parameters))
            .sum();
        derive(self, before, parameters)
    }
}

/// Reduce a whole sieve table in one pass
#[must_use]
pub fn reduce_rows(rows: &[SieveRow], parameters: &TestParameters) -> Vec<SieveRow> {
    let mut cumulative = 0.0;
    rows.iter()
        .map(|row| {
            let reduced = derive(row, cumulative, parameters);
            if let Some(retained) = reduced.percent_retained {
                cumulative += retained;
            }
            reduced
        })
        .collect()
}

fn derive(row: &SieveRow, cumulative_before: f64, parameters: &TestParameters) -> SieveRow {
    match percent_retained(row, parameters) {
        Some(retained) => {
            let cumulative = cumulative_before + retained;
            SieveRow {
                percent_retained: Some(retained),
                percent_cumulative: Some(cumulative),
                percent_passing: Some(100.0 - cumulative),
                ..*row
            }
        }
        None => SieveRow {
            percent_retained: None,
            percent_cumulative: None,
            percent_passing: None,
            ..*row
        },
    }
}

fn percent_retained(row: &SieveRow, parameters: &TestParameters) -> Option<f64> {
    let mass = finite(row.retained_mass).filter(|m| *m >= 0.0)?;
    let total = finite(parameters.total_dry_mass).filter(|t| *t > 0.0);
    ratio(Some(mass * 100.0), total)
}
