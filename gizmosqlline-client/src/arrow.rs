use anyhow::{anyhow, bail, Result};
use arrow_array::{
    Array, BinaryArray, Int16Array, Int32Array, Int64Array, Int8Array, LargeBinaryArray,
    LargeStringArray, StringArray, UInt16Array, UInt32Array, UInt64Array, UInt8Array,
};
use arrow_cast::display::{ArrayFormatter, FormatOptions};

/// Text shown for SQL NULL.
pub const NULL_TEXT: &str = "NULL";

/// Format every value of `column` for display, NULLs as [`NULL_TEXT`].
///
/// # Example
///
/// ```rust
/// use arrow_array::Int64Array;
/// use gizmosqlline_client::arrow::format_column;
///
/// let arr = Int64Array::from(vec![Some(1), None]);
/// assert_eq!(format_column(&arr)?, vec!["1", "NULL"]);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn format_column(column: &dyn Array) -> Result<Vec<String>> {
    let options = FormatOptions::default().with_null(NULL_TEXT);
    let formatter = ArrayFormatter::try_new(column, &options)?;
    Ok((0..column.len())
        .map(|idx| formatter.value(idx).to_string())
        .collect())
}

/// Interpret a scalar Arrow value as i64.
///
/// Supports signed and unsigned integers of every width.
pub fn value_as_i64(column: &dyn Array, idx: usize) -> Result<i64> {
    if column.is_null(idx) {
        bail!("value is NULL");
    }
    let any = column.as_any();
    if let Some(array) = any.downcast_ref::<Int64Array>() {
        return Ok(array.value(idx));
    }
    if let Some(array) = any.downcast_ref::<Int32Array>() {
        return Ok(array.value(idx) as i64);
    }
    if let Some(array) = any.downcast_ref::<Int16Array>() {
        return Ok(array.value(idx) as i64);
    }
    if let Some(array) = any.downcast_ref::<Int8Array>() {
        return Ok(array.value(idx) as i64);
    }
    if let Some(array) = any.downcast_ref::<UInt64Array>() {
        return i64::try_from(array.value(idx)).map_err(|e| anyhow!(e));
    }
    if let Some(array) = any.downcast_ref::<UInt32Array>() {
        return Ok(array.value(idx) as i64);
    }
    if let Some(array) = any.downcast_ref::<UInt16Array>() {
        return Ok(array.value(idx) as i64);
    }
    if let Some(array) = any.downcast_ref::<UInt8Array>() {
        return Ok(array.value(idx) as i64);
    }

    Err(anyhow!(
        "unsupported column type {} for integer projection",
        column.data_type()
    ))
}

/// Interpret a scalar Arrow value as string. Binary values are decoded as
/// UTF-8 when possible.
pub fn value_as_string(column: &dyn Array, idx: usize) -> Result<String> {
    if column.is_null(idx) {
        bail!("value is NULL");
    }
    let any = column.as_any();
    if let Some(array) = any.downcast_ref::<StringArray>() {
        return Ok(array.value(idx).to_string());
    }
    if let Some(array) = any.downcast_ref::<LargeStringArray>() {
        return Ok(array.value(idx).to_string());
    }
    if let Some(array) = any.downcast_ref::<BinaryArray>() {
        return Ok(String::from_utf8_lossy(array.value(idx)).into_owned());
    }
    if let Some(array) = any.downcast_ref::<LargeBinaryArray>() {
        return Ok(String::from_utf8_lossy(array.value(idx)).into_owned());
    }
    Err(anyhow!(
        "unsupported column type {} for string projection",
        column.data_type()
    ))
}

#[cfg(test)]
mod tests {
    use arrow_array::{BooleanArray, Float64Array};

    use super::*;

    #[test]
    fn formats_nulls_and_values() {
        let arr = StringArray::from(vec![Some("Alice"), None]);
        assert_eq!(format_column(&arr).unwrap(), vec!["Alice", "NULL"]);

        let arr = BooleanArray::from(vec![true, false]);
        assert_eq!(format_column(&arr).unwrap(), vec!["true", "false"]);

        let arr = Float64Array::from(vec![1.5]);
        assert_eq!(format_column(&arr).unwrap(), vec!["1.5"]);
    }

    #[test]
    fn projects_integers_of_any_width() {
        let arr = Int32Array::from(vec![5]);
        assert_eq!(value_as_i64(&arr, 0).unwrap(), 5);
        let arr = UInt8Array::from(vec![7u8]);
        assert_eq!(value_as_i64(&arr, 0).unwrap(), 7);
        let arr = UInt64Array::from(vec![u64::MAX]);
        assert!(value_as_i64(&arr, 0).is_err());
    }

    #[test]
    fn projection_rejects_null_and_wrong_types() {
        let arr = Int64Array::from(vec![None]);
        assert!(value_as_i64(&arr, 0).is_err());
        let arr = StringArray::from(vec!["x"]);
        assert!(value_as_i64(&arr, 0).is_err());
        assert_eq!(value_as_string(&arr, 0).unwrap(), "x");
    }
}
