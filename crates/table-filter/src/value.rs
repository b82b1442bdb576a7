//! Runtime values read from records.
//!
//! A column accessor turns a record into a [`Value`]. The filter engine only
//! ever sees records through this enum, so the predicate functions and the
//! column data service don't need to know the host's record type.


use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::column::ColumnOption;

/// Field value extracted from a record by a column accessor.
///
/// # Example
///
/// ```
/// use table_filter::Value;
///
/// struct Issue {
///     title: String,
///     estimate: Option<u32>,
///     labels: Vec<String>,
/// }
///
/// let issue = Issue {
///     title: "Fix login".into(),
///     estimate: None,
///     labels: vec!["bug".into()],
/// };
///
/// assert_eq!(Value::from(issue.title.as_str()), Value::String("Fix login".into()));
/// assert!(Value::from(issue.estimate).is_none());
/// assert!(matches!(Value::from(issue.labels.clone()), Value::List(_)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Text value, or a raw option identifier.
    String(String),
    /// Numeric value.
    Number(Number),
    /// Date and time.
    Date(NaiveDateTime),
    /// Boolean value.
    Bool(bool),
    /// A value already shaped as a column option.
    Option(ColumnOption),
    /// Several values (multi-option columns).
    List(Vec<Value>),
    /// Field not present or null.
    None,
}

impl Value {
    /// Returns `true` if this is a `None` value.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the number value, if present.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extracts the date value, if present.
    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Extracts the boolean value, if present.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extracts the option, if this value is option-shaped.
    pub fn as_option(&self) -> Option<&ColumnOption> {
        match self {
            Value::Option(o) => Some(o),
            _ => None,
        }
    }

    /// Identity used for option membership and facet counting.
    ///
    /// A raw string is its own key; an option is keyed by its `value`.
    pub fn option_key(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            Value::Option(o) => Some(&o.value),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Date(_) => "date",
            Value::Bool(_) => "boolean",
            Value::Option(_) => "option",
            Value::List(_) => "list",
            Value::None => "none",
        }
    }

    /// Pushes this value into `out`, expanding lists and dropping `None`.
    pub(crate) fn flatten_into(self, out: &mut Vec<Value>) {
        match self {
            Value::None => {}
            Value::List(items) => {
                for item in items {
                    item.flatten_into(out);
                }
            }
            other => out.push(other),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(d: NaiveDateTime) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d.and_time(NaiveTime::MIN))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<ColumnOption> for Value {
    fn from(o: ColumnOption) -> Self {
        Value::Option(o)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::None, Into::into)
    }
}

macro_rules! value_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Number(Number::from(n))
                }
            }
        )*
    };
}

value_from_number!(i32, i64, u32, u64, usize, f32, f64);

/// Numeric value supporting all common numeric types.
///
/// Numbers are stored in one of three variants to preserve precision:
/// - `I64` for signed integers
/// - `U64` for unsigned integers
/// - `F64` for floating point
///
/// Predicates and bounds compare numbers through [`Number::to_f64`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Converts the number to f64 for comparison.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Returns `true` for a floating point NaN.
    pub fn is_nan(self) -> bool {
        matches!(self, Number::F64(n) if n.is_nan())
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Number::I64(n as i64)
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::I64(n)
    }
}

impl From<u32> for Number {
    fn from(n: u32) -> Self {
        Number::U64(n as u64)
    }
}

impl From<u64> for Number {
    fn from(n: u64) -> Self {
        Number::U64(n)
    }
}

impl From<usize> for Number {
    fn from(n: usize) -> Self {
        Number::U64(n as u64)
    }
}

impl From<f32> for Number {
    fn from(n: f32) -> Self {
        Number::F64(n as f64)
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number::F64(n)
    }
}
