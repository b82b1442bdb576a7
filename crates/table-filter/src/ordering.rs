//! Option ordering.
//!
//! A column's `orderFn` is a list of [`OrderStep`]s applied like a SQL
//! `ORDER BY`: the first step that tells two options apart decides, and
//! options equal under every step keep their relative input order.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::column::ColumnOption;
use crate::error::{FilterError, Result};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Dir {
    /// Applies this direction to an ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }

    /// Parses `"asc"` or `"desc"`.
    pub fn parse(s: &str) -> Result<Dir> {
        match s {
            "asc" => Ok(Dir::Asc),
            "desc" => Ok(Dir::Desc),
            other => Err(FilterError::config(format!(
                "invalid order direction '{other}', expected 'asc' or 'desc'"
            ))),
        }
    }

    /// Returns the display name of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Built-in option sort keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderKey {
    /// Faceted occurrence count (absent counts sort as 0).
    Count,
    /// Option label.
    Label,
}

impl OrderKey {
    /// Parses `"count"` or `"label"`.
    pub fn parse(s: &str) -> Result<OrderKey> {
        match s {
            "count" => Ok(OrderKey::Count),
            "label" => Ok(OrderKey::Label),
            other => Err(FilterError::config(format!(
                "invalid order function '{other}', expected 'count' or 'label'"
            ))),
        }
    }

    fn compare(self, a: &ColumnOption, b: &ColumnOption) -> Ordering {
        match self {
            OrderKey::Count => a.count.unwrap_or(0).cmp(&b.count.unwrap_or(0)),
            OrderKey::Label => a.label.cmp(&b.label),
        }
    }
}

/// Custom two-argument option comparator.
pub type OptionComparator = Arc<dyn Fn(&ColumnOption, &ColumnOption) -> Ordering + Send + Sync>;

/// One step of an option ordering chain.
#[derive(Clone)]
pub enum OrderStep {
    /// Built-in key with a direction.
    By(OrderKey, Dir),
    /// Caller-supplied comparator.
    Custom(OptionComparator),
}

impl OrderStep {
    /// Orders by a built-in key.
    pub fn by(key: OrderKey, dir: Dir) -> Self {
        OrderStep::By(key, dir)
    }

    /// Orders by a built-in key given by name, e.g. `("count", "desc")`.
    ///
    /// Unknown names fail with a configuration error.
    pub fn named(key: &str, dir: &str) -> Result<Self> {
        Ok(OrderStep::By(OrderKey::parse(key)?, Dir::parse(dir)?))
    }

    /// Orders with a custom comparator.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&ColumnOption, &ColumnOption) -> Ordering + Send + Sync + 'static,
    {
        OrderStep::Custom(Arc::new(f))
    }

    /// Compares two options under this step.
    pub fn compare(&self, a: &ColumnOption, b: &ColumnOption) -> Ordering {
        match self {
            OrderStep::By(key, dir) => dir.apply(key.compare(a, b)),
            OrderStep::Custom(cmp) => cmp(a, b),
        }
    }
}

impl fmt::Debug for OrderStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStep::By(key, dir) => f.debug_tuple("By").field(key).field(dir).finish(),
            OrderStep::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Compares two options using a chain of steps.
///
/// The first step returning a non-equal ordering wins. If all steps
/// compare equal, returns `Equal`.
pub fn compare_by_steps(a: &ColumnOption, b: &ColumnOption, steps: &[OrderStep]) -> Ordering {
    for step in steps {
        let ordering = step.compare(a, b);
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Stable-sorts options by a chain of steps.
pub fn sort_options(options: &mut [ColumnOption], steps: &[OrderStep]) {
    if steps.is_empty() {
        return;
    }
    options.sort_by(|a, b| compare_by_steps(a, b, steps));
}
