//! Filter state reducers.
//!
//! Each function takes the current [`FiltersState`] and returns the next one.
//! Inputs are never modified. Operators follow value counts through
//! [`determine_new_operator`], so adding a second status to an `is` filter
//! yields `is any of`.

use crate::column::{ColumnConfig, ColumnDataType};
use crate::error::{FilterError, Result};
use crate::filter::{dedup, FilterModel, FilterValues, FiltersState};
use crate::operators::{default_operators, operator_details, FilterOperator};
use crate::transition::determine_new_operator;

/// Adds option values to a column's filter (set union).
///
/// Creates the filter when the column has none yet, with the default
/// operator for the number of values. Only option and multi-option columns
/// accept this; other types fail with [`FilterError::TypeMismatch`].
pub fn add_filter_value<T, I, S>(
    filters: &FiltersState,
    column: &ColumnConfig<T>,
    values: I,
) -> Result<FiltersState>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let data_type = require_option_column(column, "addFilterValue")?;
    let values = dedup(values.into_iter().map(Into::into).collect());

    let Some(index) = filters.position(column.id()) else {
        if values.is_empty() {
            return Ok(filters.clone());
        }
        let operator = default_operators(data_type).for_count(values.len());
        let values = FilterValues::from_strings(data_type, values)?;
        return Ok(filters.appended(FilterModel::from_parts(column.id(), operator, values)));
    };

    let current = &filters[index];
    let old = current.values();
    let mut merged = strings_of(old).to_vec();
    merged.extend(values);
    let merged = FilterValues::from_strings(data_type, dedup(merged))?;

    if data_type == ColumnDataType::MultiOption && merged.is_empty() {
        return Ok(filters.removed(index));
    }

    let operator = determine_new_operator(data_type, old, &merged, current.operator())?;
    Ok(filters.replaced(
        index,
        FilterModel::from_parts(column.id(), operator, merged),
    ))
}

/// Removes option values from a column's filter (set difference).
///
/// The filter is dropped once no values remain.
pub fn remove_filter_value<T, I, S>(
    filters: &FiltersState,
    column: &ColumnConfig<T>,
    values: I,
) -> Result<FiltersState>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let data_type = require_option_column(column, "removeFilterValue")?;
    let Some(index) = filters.position(column.id()) else {
        return Ok(filters.clone());
    };

    let removed: Vec<String> = values.into_iter().map(Into::into).collect();
    let current = &filters[index];
    let old = current.values();
    let remaining: Vec<String> = strings_of(old)
        .iter()
        .filter(|v| !removed.contains(*v))
        .cloned()
        .collect();

    if remaining.is_empty() {
        return Ok(filters.removed(index));
    }

    let remaining = FilterValues::from_strings(data_type, remaining)?;
    let operator = determine_new_operator(data_type, old, &remaining, current.operator())?;
    Ok(filters.replaced(
        index,
        FilterModel::from_parts(column.id(), operator, remaining),
    ))
}

/// Replaces a column's filter values.
///
/// Number and date values become a single value or an ordered range, other
/// values are deduplicated. Values that end up empty leave the state as is;
/// use [`remove_filter`] to clear a filter. NaN and infinite numbers are a
/// configuration error.
pub fn set_filter_value<T>(
    filters: &FiltersState,
    column: &ColumnConfig<T>,
    values: FilterValues,
) -> Result<FiltersState> {
    if values.data_type() != column.data_type() {
        return Err(FilterError::type_mismatch(
            format!("{} values for column '{}'", column.data_type(), column.id()),
            format!("{} values", values.data_type()),
        ));
    }
    values.check_finite()?;

    let values = values.normalized();
    if values.is_empty() {
        return Ok(filters.clone());
    }

    match filters.position(column.id()) {
        Some(index) => {
            let current = &filters[index];
            let operator = determine_new_operator(
                column.data_type(),
                current.values(),
                &values,
                current.operator(),
            )?;
            Ok(filters.replaced(
                index,
                FilterModel::from_parts(column.id(), operator, values),
            ))
        }
        None => {
            let operator = default_operators(column.data_type()).for_count(values.len());
            Ok(filters.appended(FilterModel::from_parts(column.id(), operator, values)))
        }
    }
}

/// Replaces the operator of a column's filter.
///
/// The operator must exist for the filter's type; its arity is not checked
/// against the current values.
pub fn set_filter_operator(
    filters: &FiltersState,
    column_id: &str,
    operator: FilterOperator,
) -> Result<FiltersState> {
    let Some(index) = filters.position(column_id) else {
        return Ok(filters.clone());
    };
    let current = &filters[index];
    operator_details(current.data_type(), operator)?;
    Ok(filters.replaced(index, current.with_operator(operator)))
}

/// Drops a column's filter, if any.
pub fn remove_filter(filters: &FiltersState, column_id: &str) -> FiltersState {
    match filters.position(column_id) {
        Some(index) => filters.removed(index),
        None => filters.clone(),
    }
}

/// Drops every filter.
pub fn remove_all_filters(_filters: &FiltersState) -> FiltersState {
    FiltersState::new()
}

fn require_option_column<T>(column: &ColumnConfig<T>, action: &str) -> Result<ColumnDataType> {
    let data_type = column.data_type();
    if data_type.is_option_like() {
        Ok(data_type)
    } else {
        Err(FilterError::type_mismatch(
            format!("option or multiOption column for {action}()"),
            format!("{data_type} column '{}'", column.id()),
        ))
    }
}

fn strings_of(values: &FilterValues) -> &[String] {
    values.as_strings().unwrap_or(&[])
}
