//! Alignment engine
//!
//! Merges the series of several tests of one procedure into a single wide
//! table: one row per distinct x across all tests, one column per test.
//! A test with no sample at a row's x gets `None` in that column; nothing is
//! interpolated.
//!
//! # Example
//!
//! ```rust,ignore
//! use geolab_core::alignment::align;
//!
//! // a chart degrades to "no data" on mixed procedures
//! let table = align(&selected).unwrap_or_default();
//! for row in &table.rows {
//!     println!("{} {:?}", row.x, row.values);
//! }
//! ```

use crate::error::AlignmentError;
use crate::series::Series;
use crate::types::{Test, TestId, TestType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Legend entry for one aligned column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesMeta {
    /// Column key in [`AlignedRow::values`]
    pub key: String,
    /// Test identifier, `None` when unsaved
    pub test_id: Option<TestId>,
    /// Display label
    pub label: String,
}

/// One row of the aligned table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedRow {
    /// Shared abscissa
    pub x: f64,
    /// Ordinate per column key, `None` where the test has no sample at `x`
    #[serde(flatten)]
    pub values: IndexMap<String, Option<f64>>,
}

impl AlignedRow {
    /// Value of one column
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied().flatten()
    }
}

/// Aligned table and its legend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alignment {
    /// Shared procedure, `None` when no test was given
    pub test_type: Option<TestType>,
    /// Rows sorted ascending by x
    pub rows: Vec<AlignedRow>,
    /// One entry per input test, in input order
    pub series_meta: Vec<SeriesMeta>,
}

impl Alignment {
    /// Check if there is nothing to show
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row abscissas
    #[must_use]
    pub fn x_domain(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.x).collect()
    }

    /// One column, top to bottom
    #[must_use]
    pub fn column(&self, key: &str) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r.get(key)).collect()
    }

    /// Legend entry of a test
    #[must_use]
    pub fn meta_for(&self, id: TestId) -> Option<&SeriesMeta> {
        self.series_meta.iter().find(|m| m.test_id == Some(id))
    }
}

/// Align the series of `tests`
///
/// All tests must share one procedure; otherwise a
/// [`AlignmentError::TypeMismatch`] is returned and callers fall back to an
/// empty [`Alignment`]. With a single test the rows are its series verbatim,
/// duplicate abscissas included.
pub fn align(tests: &[Test]) -> Result<Alignment, AlignmentError> {
    let Some(first) = tests.first() else {
        return Ok(Alignment::default());
    };
    if let Some((position, odd)) = tests
        .iter()
        .enumerate()
        .find(|(_, t)| t.test_type != first.test_type)
    {
        tracing::warn!(
            expected = %first.test_type,
            found = %odd.test_type,
            position,
            "refusing to align tests of different types"
        );
        return Err(AlignmentError::TypeMismatch {
            expected: first.test_type,
            found: odd.test_type,
            position,
        });
    }

    let series_meta = legend(tests);
    let series: Vec<Series> = tests.iter().map(Test::series).collect();

    let rows = if let [only] = series.as_slice() {
        passthrough(&series_meta[0].key, only)
    } else {
        merge(&series_meta, &series)
    };

    tracing::debug!(
        test_type = %first.test_type,
        tests = tests.len(),
        rows = rows.len(),
        "aligned series"
    );

    Ok(Alignment {
        test_type: Some(first.test_type),
        rows,
        series_meta,
    })
}

fn passthrough(key: &str, series: &Series) -> Vec<AlignedRow> {
    series
        .points
        .iter()
        .map(|p| AlignedRow {
            x: p.x,
            values: IndexMap::from([(key.to_string(), Some(p.y))]),
        })
        .collect()
}

fn merge(meta: &[SeriesMeta], series: &[Series]) -> Vec<AlignedRow> {
    let mut domain: Vec<f64> = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.x))
        .collect();
    domain.sort_by(f64::total_cmp);
    #[allow(clippy::float_cmp)]
    domain.dedup_by(|a, b| a == b);

    domain
        .into_iter()
        .map(|x| AlignedRow {
            x,
            values: meta
                .iter()
                .zip(series)
                .map(|(m, s)| (m.key.clone(), s.first_at(x)))
                .collect(),
        })
        .collect()
}

/// Column keys are `test_<id>` for saved tests and `draft_<position>` for
/// unsaved ones; a repeated key gets the position appended.
fn legend(tests: &[Test]) -> Vec<SeriesMeta> {
    let mut used = HashSet::new();
    tests
        .iter()
        .enumerate()
        .map(|(position, test)| {
            let base = match test.id {
                Some(id) => format!("test_{id}"),
                None => format!("draft_{position}"),
            };
            let key = if used.contains(&base) {
                format!("{base}_{position}")
            } else {
                base
            };
            used.insert(key.clone());
            SeriesMeta {
                key,
                test_id: test.id,
                label: test.label(),
            }
        })
        .collect()
}
