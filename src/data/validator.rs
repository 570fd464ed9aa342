//! Upload validation
//!
//! Checks run in a fixed order and the first failure wins, so a table that
//! lacks `target` is always reported as such whatever else is wrong with it.

use super::TARGET_COLUMN;
use crate::error::{Result, SchemaViolation};
use polars::prelude::*;

/// Check an uploaded table before it is admitted to the store.
pub fn validate_upload(df: &DataFrame) -> Result<()> {
    let target = df
        .column(TARGET_COLUMN)
        .map_err(|_| SchemaViolation::MissingTargetColumn)?;

    let distinct = target.as_materialized_series().drop_nulls().n_unique()?;
    if distinct < 2 {
        return Err(SchemaViolation::InsufficientTargetClasses.into());
    }

    let features: Vec<&Column> = df
        .get_columns()
        .iter()
        .filter(|c| c.name().as_str() != TARGET_COLUMN)
        .collect();
    if features.is_empty() {
        return Err(SchemaViolation::NoFeatureColumns.into());
    }

    for column in &features {
        if column.null_count() > 0 || has_nan(column)? {
            return Err(SchemaViolation::MissingFeatureValues.into());
        }
    }

    if target.null_count() > 0 {
        return Err(SchemaViolation::MissingTargetValues.into());
    }

    if let Some(column) = features.iter().find(|c| !c.dtype().is_primitive_numeric()) {
        return Err(SchemaViolation::NonNumericFeature(column.name().to_string()).into());
    }

    Ok(())
}

fn has_nan(column: &Column) -> Result<bool> {
    if !column.dtype().is_float() {
        return Ok(false);
    }
    let values = column.cast(&DataType::Float64)?;
    let found = values.f64()?.into_iter().flatten().any(f64::is_nan);
    Ok(found)
}
