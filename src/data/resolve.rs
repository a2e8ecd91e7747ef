use super::model::{ReconciliationResult, ReferenceDataset, ResolvedResult};
use crate::error::{DataSourceError, ReconcileError, Result};

// ---------------------------------------------------------------------------
// Value resolution: year field → log10
// ---------------------------------------------------------------------------

/// Turn a join result into per-code log10 values for `year`.
///
/// `year` is a column name, not a number. For every matched code:
/// * empty field → `no_value_for_year`
/// * positive number → `values[code] = log10(number)`
///
/// Unmatched codes pass through as `missing_from_reference`. A non-numeric
/// field fails with [`ReconcileError::NumericFormat`], a value ≤ 0 with
/// [`ReconcileError::Domain`], and a record with no such column with
/// [`DataSourceError::MissingYear`].
pub fn resolve(
    joined: &ReconciliationResult,
    reference: &ReferenceDataset,
    year: &str,
) -> Result<ResolvedResult> {
    let mut out = ResolvedResult {
        missing_from_reference: joined.unmatched.clone(),
        ..ResolvedResult::default()
    };

    for (code, key) in &joined.matched {
        let cell = reference
            .get(key)
            .and_then(|record| record.get(year))
            .ok_or_else(|| DataSourceError::MissingYear {
                key: key.clone(),
                year: year.to_string(),
            })?;

        if cell.is_empty() {
            out.no_value_for_year.insert(code.clone());
            continue;
        }
        let value = parse_value(code, year, cell)?;
        out.values.insert(code.clone(), value.log10());
    }

    log::debug!(
        "year {year}: {} with value, {} missing, {} without value",
        out.values.len(),
        out.missing_from_reference.len(),
        out.no_value_for_year.len()
    );
    Ok(out)
}

/// Parse a non-empty cell into a finite, positive number.
fn parse_value(code: &str, year: &str, cell: &str) -> Result<f64> {
    let value = cell
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ReconcileError::NumericFormat {
            code: code.to_string(),
            year: year.to_string(),
            value: cell.to_string(),
        })?;

    if value <= 0.0 {
        return Err(ReconcileError::Domain {
            code: code.to_string(),
            year: year.to_string(),
            value,
        });
    }
    Ok(value)
}
