//! `<table>_aggregate` result wrappers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Column name to statistic. A column whose statistic is undefined (no rows,
/// or all nulls) maps to `None`.
pub type ColumnStats = BTreeMap<String, Option<f64>>;

/// `<table>_aggregate { aggregate { ... } nodes { ... } }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "R: Deserialize<'de>"))]
pub struct Aggregate<R> {
    #[serde(default)]
    pub aggregate: Option<AggregateFields<R>>,
    #[serde(default = "Vec::new")]
    pub nodes: Vec<R>,
}

impl<R> Default for Aggregate<R> {
    fn default() -> Self {
        Self {
            aggregate: None,
            nodes: Vec::new(),
        }
    }
}

impl<R> Aggregate<R> {
    /// `aggregate.count`, or 0 when it was not selected.
    pub fn count(&self) -> i64 {
        self.aggregate.as_ref().map_or(0, |fields| fields.count)
    }
}

/// `<table>_aggregate_fields`
///
/// `max`/`min` are partial rows; the numeric statistics are keyed by column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "R: Deserialize<'de>"))]
pub struct AggregateFields<R> {
    #[serde(default)]
    pub count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Box<R>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Box<R>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sum: Option<ColumnStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg: Option<ColumnStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stddev: Option<ColumnStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stddev_pop: Option<ColumnStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stddev_samp: Option<ColumnStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub var_pop: Option<ColumnStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub var_samp: Option<ColumnStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variance: Option<ColumnStats>,
}

/// Statistic families selectable under `aggregate { ... }` besides `count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    Sum,
    Avg,
    Max,
    Min,
    Stddev,
    StddevPop,
    StddevSamp,
    VarPop,
    VarSamp,
    Variance,
}

impl Statistic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Avg => "avg",
            Self::Max => "max",
            Self::Min => "min",
            Self::Stddev => "stddev",
            Self::StddevPop => "stddev_pop",
            Self::StddevSamp => "stddev_samp",
            Self::VarPop => "var_pop",
            Self::VarSamp => "var_samp",
            Self::Variance => "variance",
        }
    }
}
