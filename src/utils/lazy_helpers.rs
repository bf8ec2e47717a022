//! LazyFrame materialization helpers with column validation
//!
//! Provides safe, explicit patterns for turning a raw reference table into a
//! typed, cleaned DataFrame so a missing or mistyped column fails loudly at
//! startup instead of surfacing as a NaN default later.

use polars::prelude::*;

use crate::error::{StartupError, StartupResult};

/// Check that every required column is present
///
/// # Errors
/// Returns [`StartupError::MissingColumn`] naming the first absent column and
/// listing what the frame does contain.
pub fn require_columns(df: &DataFrame, columns: &[&str]) -> StartupResult<()> {
    let available: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    for &expected in columns {
        if !available.iter().any(|c| c == expected) {
            return Err(StartupError::MissingColumn {
                column: expected.to_string(),
                available,
            });
        }
    }

    Ok(())
}

/// Materialize an explicit typed column list, dropping incomplete rows
///
/// # Arguments
/// * `df` - Raw frame (must already contain every column, see [`require_columns`])
/// * `columns` - `(name, dtype)` pairs; each column is cast to its dtype
///
/// Rows with a null in any selected column, or a NaN or infinite value in
/// any float column, are removed.
///
/// # Example
/// ```rust,ignore
/// let cleaned = materialize_with_columns(
///     &raw,
///     &[("Crop", DataType::String), ("Rain_Sum", DataType::Float64)],
/// )?;
/// ```
pub fn materialize_with_columns(
    df: &DataFrame,
    columns: &[(&str, DataType)],
) -> StartupResult<DataFrame> {
    let names: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
    require_columns(df, &names)?;

    let col_exprs: Vec<Expr> = columns
        .iter()
        .map(|(name, dtype)| col(*name).cast(dtype.clone()))
        .collect();

    let complete = columns.iter().fold(lit(true), |acc, (name, dtype)| {
        let present = col(*name).is_not_null();
        if dtype.is_float() {
            acc.and(present.and(col(*name).is_finite()))
        } else {
            acc.and(present)
        }
    });

    let cleaned = df
        .clone()
        .lazy()
        .select(col_exprs)
        .filter(complete)
        .collect()?;

    Ok(cleaned)
}
