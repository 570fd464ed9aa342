//! Conversions between polars frames and [`Dataset`]

use super::{Dataset, Label, TARGET_COLUMN};
use crate::error::{PlaygroundError, Result};
use ndarray::Array2;
use polars::prelude::*;

impl Dataset {
    /// Split a table into features and target.
    ///
    /// Every column except `target` is a feature, in table order.
    pub fn from_frame(name: &str, df: &DataFrame) -> Result<Self> {
        let target_column = df
            .column(TARGET_COLUMN)
            .map_err(|_| PlaygroundError::Data(format!("dataset '{}' has no target column", name)))?;
        let target = labels_from_column(target_column)?;

        let feature_names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .filter(|col| col.as_str() != TARGET_COLUMN)
            .map(|col| col.to_string())
            .collect();

        let integer_features: Vec<bool> = feature_names
            .iter()
            .map(|col| df.column(col).map(|c| c.dtype().is_integer()))
            .collect::<PolarsResult<_>>()?;

        let features = columns_to_array2(df, &feature_names)?;
        Ok(Dataset::new(name, feature_names, features, target)?.with_integer_features(&integer_features))
    }

    /// Rebuild the table form (features then `target`)
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut columns: Vec<Column> = self
            .feature_names
            .iter()
            .enumerate()
            .map(|(j, feature)| {
                let values = self.features.column(j);
                let series = if self.integer_features[j] {
                    let ints: Vec<i64> = values.iter().map(|&v| v as i64).collect();
                    Series::new(feature.as_str().into(), ints)
                } else {
                    Series::new(feature.as_str().into(), values.to_vec())
                };
                Column::from(series)
            })
            .collect();

        let all_integer = self.target.iter().all(|l| matches!(l, Label::Integer(_)));
        let target: Column = if all_integer {
            let values: Vec<i64> = self
                .target
                .iter()
                .map(|l| match l {
                    Label::Integer(v) => *v,
                    Label::Text(_) => 0,
                })
                .collect();
            Series::new(TARGET_COLUMN.into(), values).into()
        } else {
            let values: Vec<String> = self.target.iter().map(|l| l.to_string()).collect();
            Series::new(TARGET_COLUMN.into(), values).into()
        };
        columns.push(target);

        Ok(DataFrame::new(columns)?)
    }
}

fn missing_target() -> PlaygroundError {
    PlaygroundError::Data("target column contains missing values".to_string())
}

/// Read a target column into labels, keeping integers where the column is integral.
fn labels_from_column(col: &Column) -> Result<Vec<Label>> {
    let dtype = col.dtype().clone();

    if dtype.is_integer() {
        let cast = col.cast(&DataType::Int64)?;
        let labels = cast
            .i64()?
            .into_iter()
            .map(|v| v.map(Label::Integer).ok_or_else(missing_target))
            .collect();
        labels
    } else if dtype.is_float() {
        let cast = col.cast(&DataType::Float64)?;
        let labels = cast
            .f64()?
            .into_iter()
            .map(|v| v.map(Label::from_f64).ok_or_else(missing_target))
            .collect();
        labels
    } else {
        let cast = col.cast(&DataType::String)?;
        let labels = cast
            .str()?
            .into_iter()
            .map(|v| v.map(|s| Label::Text(s.to_string())).ok_or_else(missing_target))
            .collect();
        labels
    }
}

/// Extract named columns into a row-major `Array2<f64>`, refusing nulls.
fn columns_to_array2(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|col_name| {
            let column = df.column(col_name)?;
            let as_f64 = column.cast(&DataType::Float64)?;
            let values = as_f64
                .f64()?
                .into_iter()
                .map(|v| {
                    v.ok_or_else(|| {
                        PlaygroundError::Data(format!("feature '{}' contains missing values", col_name))
                    })
                })
                .collect::<Result<Vec<f64>>>();
            values
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| col_data[c][r]))
}
