//! Shared utilities for the audit pipeline.
//!
//! Dtype checks used by the loader, the textual null markers recognised in
//! the extracts, and the number formatting conventions of the narrative.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is an integer type.
#[inline]
pub fn is_integer_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    is_integer_dtype(dtype) || matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Check if a DataType can carry airport ids: numbers, or text holding numbers.
///
/// An all-null column is read as `Null` (or `String` when the header is the
/// only line), both of which cast cleanly to an empty integer column.
#[inline]
pub fn is_key_compatible_dtype(dtype: &DataType) -> bool {
    is_numeric_dtype(dtype) || matches!(dtype, DataType::String | DataType::Null)
}

// =============================================================================
// Null Markers
// =============================================================================

/// Cell values read as null, matching the markers common dataframe readers
/// treat as missing so null-cell counts agree with other tooling.
pub const NULL_MARKERS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Null markers in the form polars' CSV reader expects.
pub fn null_values() -> NullValues {
    NullValues::AllColumns(NULL_MARKERS.iter().map(|m| (*m).into()).collect())
}

// =============================================================================
// Formatting Utilities
// =============================================================================

/// Format an integer with `,` thousands separators.
///
/// ```rust,ignore
/// assert_eq!(fmt_int(1234567), "1,234,567");
/// ```
pub fn fmt_int(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format a fraction as a percentage with one decimal (`0.953` -> `95.3%`).
pub fn fmt_pct(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// Format a ratio with two decimals.
pub fn fmt_ratio(ratio: f64) -> String {
    format!("{:.2}", ratio)
}

/// `numerator / denominator`, or 0.0 when the denominator is zero.
#[inline]
pub fn fraction(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

// =============================================================================
// Statistics Utilities
// =============================================================================

/// Median of a slice of finite values. `None` for an empty slice.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Maximum of a slice of finite values. `None` for an empty slice.
pub fn max_value(values: &[f64]) -> Option<f64> {
    values.iter().copied().max_by(|a, b| a.total_cmp(b))
}

// =============================================================================
// Tests
// =============================================================================
