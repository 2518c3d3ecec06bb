//! Hasura's `order_by` enum.

use serde::{Deserialize, Serialize};

/// Column sort direction, with explicit null placement variants.
///
/// Plain `asc` sorts nulls last and plain `desc` sorts nulls first, matching
/// Postgres defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderBy {
    Asc,
    AscNullsFirst,
    AscNullsLast,
    Desc,
    DescNullsFirst,
    DescNullsLast,
}

impl OrderBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::AscNullsFirst => "asc_nulls_first",
            Self::AscNullsLast => "asc_nulls_last",
            Self::Desc => "desc",
            Self::DescNullsFirst => "desc_nulls_first",
            Self::DescNullsLast => "desc_nulls_last",
        }
    }

    pub fn is_descending(&self) -> bool {
        matches!(
            self,
            Self::Desc | Self::DescNullsFirst | Self::DescNullsLast
        )
    }
}

impl std::fmt::Display for OrderBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
