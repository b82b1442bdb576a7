//! Filter state model.
//!
//! A [`FilterModel`] is one active constraint on one column. Its values are
//! typed per column type ([`FilterValues`]), so a number filter can never
//! carry strings. [`FiltersState`] is the ordered list of active filters,
//! at most one per column.
//!
//! Filters serialize to the shape hosts persist in URLs and storage:
//!
//! ```json
//! {"columnId":"status","type":"option","operator":"is any of","values":["todo","done"]}
//! ```
//!
//! Dates are written as ISO-8601 strings and parsed back at the boundary.

use std::ops::Deref;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::column::ColumnDataType;
use crate::error::{FilterError, Result};
use crate::operators::{operator_details, FilterOperator, OperatorDetails};

/// Values of one filter, typed by column type.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValues {
    Text(Vec<String>),
    Number(Vec<f64>),
    Date(Vec<NaiveDateTime>),
    Option(Vec<String>),
    MultiOption(Vec<String>),
    Boolean(Vec<bool>),
}

impl FilterValues {
    pub fn text<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterValues::Text(values.into_iter().map(Into::into).collect())
    }

    pub fn number<I: IntoIterator<Item = f64>>(values: I) -> Self {
        FilterValues::Number(values.into_iter().collect())
    }

    pub fn date<I: IntoIterator<Item = NaiveDateTime>>(values: I) -> Self {
        FilterValues::Date(values.into_iter().collect())
    }

    pub fn option<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterValues::Option(values.into_iter().map(Into::into).collect())
    }

    pub fn multi_option<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterValues::MultiOption(values.into_iter().map(Into::into).collect())
    }

    pub fn boolean<I: IntoIterator<Item = bool>>(values: I) -> Self {
        FilterValues::Boolean(values.into_iter().collect())
    }

    /// Empty values of the given type.
    pub fn empty(data_type: ColumnDataType) -> Self {
        match data_type {
            ColumnDataType::Text => FilterValues::Text(Vec::new()),
            ColumnDataType::Number => FilterValues::Number(Vec::new()),
            ColumnDataType::Date => FilterValues::Date(Vec::new()),
            ColumnDataType::Option => FilterValues::Option(Vec::new()),
            ColumnDataType::MultiOption => FilterValues::MultiOption(Vec::new()),
            ColumnDataType::Boolean => FilterValues::Boolean(Vec::new()),
        }
    }

    /// String values of an option or multi-option filter, typed by `data_type`.
    pub(crate) fn from_strings(data_type: ColumnDataType, values: Vec<String>) -> Result<Self> {
        match data_type {
            ColumnDataType::Text => Ok(FilterValues::Text(values)),
            ColumnDataType::Option => Ok(FilterValues::Option(values)),
            ColumnDataType::MultiOption => Ok(FilterValues::MultiOption(values)),
            other => Err(FilterError::type_mismatch(
                "text, option or multiOption values",
                other.as_str(),
            )),
        }
    }

    pub fn data_type(&self) -> ColumnDataType {
        match self {
            FilterValues::Text(_) => ColumnDataType::Text,
            FilterValues::Number(_) => ColumnDataType::Number,
            FilterValues::Date(_) => ColumnDataType::Date,
            FilterValues::Option(_) => ColumnDataType::Option,
            FilterValues::MultiOption(_) => ColumnDataType::MultiOption,
            FilterValues::Boolean(_) => ColumnDataType::Boolean,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FilterValues::Text(v) | FilterValues::Option(v) | FilterValues::MultiOption(v) => v.len(),
            FilterValues::Number(v) => v.len(),
            FilterValues::Date(v) => v.len(),
            FilterValues::Boolean(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// String values of a text, option or multi-option filter.
    pub fn as_strings(&self) -> Option<&[String]> {
        match self {
            FilterValues::Text(v) | FilterValues::Option(v) | FilterValues::MultiOption(v) => Some(v),
            _ => None,
        }
    }

    /// Rejects NaN and infinite numbers, which JSON cannot carry.
    pub(crate) fn check_finite(&self) -> Result<()> {
        match self {
            FilterValues::Number(v) => match v.iter().find(|n| !n.is_finite()) {
                Some(n) => Err(FilterError::config(format!(
                    "number filter values must be finite, got {n}"
                ))),
                None => Ok(()),
            },
            _ => Ok(()),
        }
    }

    /// Normalizes values the way `setFilterValue` stores them: number and
    /// date values become a single value or an ordered `[min, max]` pair,
    /// everything else is deduplicated.
    pub fn normalized(self) -> Self {
        match self {
            FilterValues::Number(v) => FilterValues::Number(create_number_filter_value(&v)),
            FilterValues::Date(v) => FilterValues::Date(create_date_filter_value(&v)),
            FilterValues::Text(v) => FilterValues::Text(dedup(v)),
            FilterValues::Option(v) => FilterValues::Option(dedup(v)),
            FilterValues::MultiOption(v) => FilterValues::MultiOption(dedup(v)),
            FilterValues::Boolean(v) => FilterValues::Boolean(dedup(v)),
        }
    }
}

/// Normalizes number filter values.
///
/// No values stay empty, one value stays as is, two or more become the
/// `[min, max]` pair of the first two.
pub fn create_number_filter_value(values: &[f64]) -> Vec<f64> {
    match values {
        [] => Vec::new(),
        [single] => vec![*single],
        [a, b, ..] => ordered_pair(*a, *b),
    }
}

/// Normalizes date filter values the same way as numbers.
pub fn create_date_filter_value(values: &[NaiveDateTime]) -> Vec<NaiveDateTime> {
    match values {
        [] => Vec::new(),
        [single] => vec![*single],
        [a, b, ..] => ordered_pair(*a, *b),
    }
}

fn ordered_pair<T: PartialOrd>(a: T, b: T) -> Vec<T> {
    if b < a {
        vec![b, a]
    } else {
        vec![a, b]
    }
}

/// Removes duplicates, keeping the first occurrence.
pub(crate) fn dedup<T: PartialEq>(values: Vec<T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(values.len());
    for v in values {
        if !out.contains(&v) {
            out.push(v);
        }
    }
    out
}

/// One active filter: a column, an operator and its values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFilter", into = "RawFilter")]
pub struct FilterModel {
    column_id: String,
    operator: FilterOperator,
    values: FilterValues,
}

impl FilterModel {
    /// Creates a filter, checking the operator against the catalog for the
    /// values' column type. Number values must be finite.
    pub fn new(
        column_id: impl Into<String>,
        operator: FilterOperator,
        values: FilterValues,
    ) -> Result<Self> {
        operator_details(values.data_type(), operator)?;
        values.check_finite()?;
        Ok(FilterModel {
            column_id: column_id.into(),
            operator,
            values,
        })
    }

    pub(crate) fn from_parts(column_id: &str, operator: FilterOperator, values: FilterValues) -> Self {
        FilterModel {
            column_id: column_id.to_string(),
            operator,
            values,
        }
    }

    pub fn column_id(&self) -> &str {
        &self.column_id
    }

    pub fn data_type(&self) -> ColumnDataType {
        self.values.data_type()
    }

    pub fn operator(&self) -> FilterOperator {
        self.operator
    }

    pub fn values(&self) -> &FilterValues {
        &self.values
    }

    /// Catalog entry of this filter's operator.
    pub fn details(&self) -> Result<&'static OperatorDetails> {
        operator_details(self.data_type(), self.operator)
    }

    pub(crate) fn with_operator(&self, operator: FilterOperator) -> Self {
        FilterModel {
            operator,
            ..self.clone()
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFilter {
    column_id: String,
    #[serde(rename = "type")]
    data_type: ColumnDataType,
    operator: String,
    values: Vec<RawValue>,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Bool(bool),
    Number(f64),
    Text(String),
    // Written as ISO-8601 by chrono; read back through `Text`.
    #[serde(skip_deserializing)]
    Date(NaiveDateTime),
}

impl RawValue {
    fn kind(&self) -> &'static str {
        match self {
            RawValue::Bool(_) => "boolean",
            RawValue::Number(_) => "number",
            RawValue::Text(_) => "string",
            RawValue::Date(_) => "date",
        }
    }
}

impl From<FilterModel> for RawFilter {
    fn from(filter: FilterModel) -> Self {
        let data_type = filter.data_type();
        let values = match filter.values {
            FilterValues::Text(v) | FilterValues::Option(v) | FilterValues::MultiOption(v) => {
                v.into_iter().map(RawValue::Text).collect()
            }
            FilterValues::Number(v) => v.into_iter().map(RawValue::Number).collect(),
            FilterValues::Date(v) => v.into_iter().map(RawValue::Date).collect(),
            FilterValues::Boolean(v) => v.into_iter().map(RawValue::Bool).collect(),
        };
        RawFilter {
            column_id: filter.column_id,
            data_type,
            operator: filter.operator.as_str().to_string(),
            values,
        }
    }
}

impl TryFrom<RawFilter> for FilterModel {
    type Error = FilterError;

    fn try_from(raw: RawFilter) -> Result<Self> {
        let operator = FilterOperator::parse(raw.data_type, &raw.operator)?;
        let values = match raw.data_type {
            ColumnDataType::Number => FilterValues::Number(
                raw.values
                    .into_iter()
                    .map(|v| match v {
                        RawValue::Number(n) => Ok(n),
                        other => Err(FilterError::type_mismatch("number", other.kind())),
                    })
                    .collect::<Result<_>>()?,
            ),
            ColumnDataType::Date => FilterValues::Date(
                raw.values
                    .into_iter()
                    .map(|v| match v {
                        RawValue::Text(s) => parse_date(&s),
                        other => Err(FilterError::type_mismatch("date string", other.kind())),
                    })
                    .collect::<Result<_>>()?,
            ),
            ColumnDataType::Boolean => FilterValues::Boolean(
                raw.values
                    .into_iter()
                    .map(|v| match v {
                        RawValue::Bool(b) => Ok(b),
                        other => Err(FilterError::type_mismatch("boolean", other.kind())),
                    })
                    .collect::<Result<_>>()?,
            ),
            data_type => {
                let strings = raw
                    .values
                    .into_iter()
                    .map(|v| match v {
                        RawValue::Text(s) => Ok(s),
                        other => Err(FilterError::type_mismatch("string", other.kind())),
                    })
                    .collect::<Result<Vec<_>>>()?;
                FilterValues::from_strings(data_type, strings)?
            }
        };
        Ok(FilterModel {
            column_id: raw.column_id,
            operator,
            values,
        })
    }
}

/// Parses an ISO-8601 date, date-time, or RFC 3339 timestamp.
fn parse_date(s: &str) -> Result<NaiveDateTime> {
    if let Ok(dt) = s.parse::<NaiveDateTime>() {
        return Ok(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }
    s.parse::<NaiveDate>()
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|_| FilterError::type_mismatch("ISO-8601 date", format!("'{s}'")))
}

/// Ordered list of active filters, at most one per column.
///
/// The state is never edited in place: every filter operation returns a new
/// value, so observers can detect changes by comparing before and after.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<FilterModel>", into = "Vec<FilterModel>")]
pub struct FiltersState(Vec<FilterModel>);

impl FiltersState {
    pub fn new() -> Self {
        FiltersState(Vec::new())
    }

    /// Builds a state from a list of filters.
    ///
    /// Filters without values are dropped; two filters on one column are a
    /// configuration error.
    pub fn from_filters(filters: Vec<FilterModel>) -> Result<Self> {
        let mut out: Vec<FilterModel> = Vec::with_capacity(filters.len());
        for filter in filters {
            if filter.values.is_empty() {
                continue;
            }
            if out.iter().any(|f| f.column_id == filter.column_id) {
                return Err(FilterError::config(format!(
                    "more than one filter for column '{}'",
                    filter.column_id
                )));
            }
            out.push(filter);
        }
        Ok(FiltersState(out))
    }

    /// Returns the filter on `column_id`, if any.
    pub fn get(&self, column_id: &str) -> Option<&FilterModel> {
        self.0.iter().find(|f| f.column_id == column_id)
    }

    pub fn into_vec(self) -> Vec<FilterModel> {
        self.0
    }

    /// Encodes the state as JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes and validates a JSON-encoded state.
    ///
    /// Unlike decoding through serde directly, a duplicate column surfaces
    /// as [`FilterError::Config`] rather than inside `Serialization`.
    pub fn from_json(json: &str) -> Result<Self> {
        let filters: Vec<FilterModel> = serde_json::from_str(json)?;
        Self::from_filters(filters)
    }

    pub(crate) fn position(&self, column_id: &str) -> Option<usize> {
        self.0.iter().position(|f| f.column_id == column_id)
    }

    /// Copy with `filter` replacing the filter at `index`.
    pub(crate) fn replaced(&self, index: usize, filter: FilterModel) -> Self {
        let mut next = self.0.clone();
        next[index] = filter;
        FiltersState(next)
    }

    /// Copy with the filter at `index` removed.
    pub(crate) fn removed(&self, index: usize) -> Self {
        let mut next = self.0.clone();
        next.remove(index);
        FiltersState(next)
    }

    /// Copy with `filter` appended.
    pub(crate) fn appended(&self, filter: FilterModel) -> Self {
        let mut next = self.0.clone();
        next.push(filter);
        FiltersState(next)
    }
}

impl TryFrom<Vec<FilterModel>> for FiltersState {
    type Error = FilterError;

    fn try_from(filters: Vec<FilterModel>) -> Result<Self> {
        FiltersState::from_filters(filters)
    }
}

impl From<FiltersState> for Vec<FilterModel> {
    fn from(state: FiltersState) -> Self {
        state.0
    }
}

impl Deref for FiltersState {
    type Target = [FilterModel];

    fn deref(&self) -> &[FilterModel] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a FiltersState {
    type Item = &'a FilterModel;
    type IntoIter = std::slice::Iter<'a, FilterModel>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_time(NaiveTime::MIN)
    }

    #[test]
    fn number_range_is_ordered() {
        assert_eq!(create_number_filter_value(&[10.0, 3.0]), vec![3.0, 10.0]);
        assert_eq!(create_number_filter_value(&[3.0, 10.0]), vec![3.0, 10.0]);
        assert_eq!(create_number_filter_value(&[7.0]), vec![7.0]);
        assert!(create_number_filter_value(&[]).is_empty());
        assert_eq!(create_number_filter_value(&[9.0, 1.0, 5.0]), vec![1.0, 9.0]);
    }

    #[test]
    fn date_range_is_ordered() {
        let a = day(2024, 1, 3);
        let b = day(2024, 1, 1);
        assert_eq!(create_date_filter_value(&[a, b]), vec![b, a]);
    }

    #[test]
    fn normalized_dedups_sets() {
        let values = FilterValues::option(["a", "b", "a"]).normalized();
        assert_eq!(values, FilterValues::option(["a", "b"]));
    }

    #[test]
    fn new_checks_catalog() {
        assert!(FilterModel::new("status", FilterOperator::IsAnyOf, FilterValues::option(["a"])).is_ok());
        let err = FilterModel::new("title", FilterOperator::IsAnyOf, FilterValues::text(["a"]))
            .unwrap_err();
        assert!(matches!(err, FilterError::OperatorNotFound { .. }));
    }

    #[test]
    fn serializes_to_wire_shape() {
        let filter =
            FilterModel::new("status", FilterOperator::IsAnyOf, FilterValues::option(["todo", "done"]))
                .unwrap();
        let json = serde_json::to_string(&filter).unwrap();
        assert_eq!(
            json,
            r#"{"columnId":"status","type":"option","operator":"is any of","values":["todo","done"]}"#
        );
    }

    #[test]
    fn dates_survive_json() {
        let start = day(2024, 1, 1);
        let end = NaiveDate::from_ymd_opt(2024, 1, 3)
            .unwrap()
            .and_hms_opt(23, 59, 0)
            .unwrap();
        let state = FiltersState::from_filters(vec![FilterModel::new(
            "created",
            FilterOperator::IsBetween,
            FilterValues::date([start, end]),
        )
        .unwrap()])
        .unwrap();

        let decoded = FiltersState::from_json(&state.to_json().unwrap()).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn dates_encode_as_iso_8601() {
        let end = NaiveDate::from_ymd_opt(2024, 1, 3)
            .unwrap()
            .and_hms_opt(23, 59, 0)
            .unwrap();
        let filter = FilterModel::new("due", FilterOperator::Is, FilterValues::date([end])).unwrap();
        let json = serde_json::to_string(&filter).unwrap();
        assert_eq!(
            json,
            r#"{"columnId":"due","type":"date","operator":"is","values":["2024-01-03T23:59:00"]}"#
        );
    }

    #[test]
    fn decode_accepts_plain_and_rfc3339_dates() {
        let json = r#"[{"columnId":"due","type":"date","operator":"is between","values":["2024-01-01","2024-01-03T10:00:00.000Z"]}]"#;
        let state = FiltersState::from_json(json).unwrap();
        let FilterValues::Date(dates) = state[0].values() else {
            panic!("expected date values");
        };
        assert_eq!(dates[0], day(2024, 1, 1));
        assert_eq!(dates[1].date(), NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
    }

    #[test]
    fn decode_rejects_unknown_operator() {
        let json = r#"[{"columnId":"title","type":"text","operator":"is any of","values":["a"]}]"#;
        let err = FiltersState::from_json(json).unwrap_err();
        assert!(err.to_string().contains("operator 'is any of' not found for text columns"));
    }

    #[test]
    fn decode_rejects_wrong_value_kind() {
        let json = r#"[{"columnId":"points","type":"number","operator":"is","values":["three"]}]"#;
        assert!(FiltersState::from_json(json).is_err());
    }

    #[test]
    fn from_filters_prunes_empty_and_rejects_duplicates() {
        let empty = FilterModel::new("a", FilterOperator::Is, FilterValues::option(Vec::<String>::new())).unwrap();
        let state = FiltersState::from_filters(vec![empty]).unwrap();
        assert!(state.is_empty());

        let one = FilterModel::new("a", FilterOperator::Is, FilterValues::option(["x"])).unwrap();
        let err = FiltersState::from_filters(vec![one.clone(), one]).unwrap_err();
        assert!(err.to_string().contains("more than one filter for column 'a'"));
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        for n in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = FilterModel::new("points", FilterOperator::Is, FilterValues::number([n]))
                .unwrap_err();
            assert!(matches!(err, FilterError::Config(_)));
        }
    }

    #[test]
    fn number_filters_survive_json() {
        let state = FiltersState::from_filters(vec![FilterModel::new(
            "points",
            FilterOperator::IsBetween,
            FilterValues::number([-1.5, 1e6]),
        )
        .unwrap()])
        .unwrap();
        let decoded = FiltersState::from_json(&state.to_json().unwrap()).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn serde_decode_enforces_state_rules() {
        let duplicate = r#"[
            {"columnId":"a","type":"option","operator":"is","values":["x"]},
            {"columnId":"a","type":"option","operator":"is","values":["y"]}
        ]"#;
        let err = serde_json::from_str::<FiltersState>(duplicate).unwrap_err();
        assert!(err.to_string().contains("more than one filter for column 'a'"));

        let with_empty = r#"[
            {"columnId":"a","type":"option","operator":"is","values":["x"]},
            {"columnId":"b","type":"option","operator":"is","values":[]}
        ]"#;
        let state: FiltersState = serde_json::from_str(with_empty).unwrap();
        assert_eq!(state.len(), 1);
        assert_eq!(state[0].column_id(), "a");
    }

    #[test]
    fn embedded_state_is_validated() {
        #[derive(Deserialize)]
        struct Saved {
            filters: FiltersState,
        }

        let json = r#"{"filters":[
            {"columnId":"a","type":"option","operator":"is","values":["x"]},
            {"columnId":"a","type":"option","operator":"is any of","values":["y","z"]}
        ]}"#;
        assert!(serde_json::from_str::<Saved>(json).is_err());
    }
}
