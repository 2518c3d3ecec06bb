//! Per-scalar `<scalar>_comparison_exp` inputs.

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::scalars::{Date, Jsonb, Timestamp, Timestamptz, Uuid};

/// A scalar that can appear as a table column.
///
/// Ties the Rust type to its GraphQL type name (used when declaring
/// operation variables) and to the comparison input Hasura generates for it.
pub trait HasuraScalar: Serialize + DeserializeOwned + Clone + Debug + PartialEq {
    const GRAPHQL_TYPE: &'static str;
    type Comparison: Serialize + DeserializeOwned + Clone + Debug + PartialEq + Default;
}

/// Operators shared by every scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ComparisonExp<T> {
    #[serde(rename = "_eq", default, skip_serializing_if = "Option::is_none")]
    pub eq: Option<T>,
    #[serde(rename = "_neq", default, skip_serializing_if = "Option::is_none")]
    pub neq: Option<T>,
    #[serde(rename = "_gt", default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<T>,
    #[serde(rename = "_gte", default, skip_serializing_if = "Option::is_none")]
    pub gte: Option<T>,
    #[serde(rename = "_lt", default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<T>,
    #[serde(rename = "_lte", default, skip_serializing_if = "Option::is_none")]
    pub lte: Option<T>,
    #[serde(rename = "_in", default, skip_serializing_if = "Option::is_none")]
    pub in_list: Option<Vec<T>>,
    #[serde(rename = "_nin", default, skip_serializing_if = "Option::is_none")]
    pub not_in_list: Option<Vec<T>>,
    #[serde(rename = "_is_null", default, skip_serializing_if = "Option::is_none")]
    pub is_null: Option<bool>,
}

impl<T> Default for ComparisonExp<T> {
    fn default() -> Self {
        Self {
            eq: None,
            neq: None,
            gt: None,
            gte: None,
            lt: None,
            lte: None,
            in_list: None,
            not_in_list: None,
            is_null: None,
        }
    }
}

impl<T> ComparisonExp<T> {
    pub fn eq(value: T) -> Self {
        Self {
            eq: Some(value),
            ..Default::default()
        }
    }

    pub fn neq(value: T) -> Self {
        Self {
            neq: Some(value),
            ..Default::default()
        }
    }

    pub fn gt(value: T) -> Self {
        Self {
            gt: Some(value),
            ..Default::default()
        }
    }

    pub fn gte(value: T) -> Self {
        Self {
            gte: Some(value),
            ..Default::default()
        }
    }

    pub fn lt(value: T) -> Self {
        Self {
            lt: Some(value),
            ..Default::default()
        }
    }

    pub fn lte(value: T) -> Self {
        Self {
            lte: Some(value),
            ..Default::default()
        }
    }

    pub fn one_of(values: impl IntoIterator<Item = T>) -> Self {
        Self {
            in_list: Some(values.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn none_of(values: impl IntoIterator<Item = T>) -> Self {
        Self {
            not_in_list: Some(values.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn is_null(null: bool) -> Self {
        Self {
            is_null: Some(null),
            ..Default::default()
        }
    }

    /// Inclusive range, `lower <= x <= upper`.
    pub fn between(lower: T, upper: T) -> Self {
        Self {
            gte: Some(lower),
            lte: Some(upper),
            ..Default::default()
        }
    }
}

/// `String_comparison_exp`: the shared operators plus pattern matching.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StringComparisonExp {
    #[serde(flatten)]
    pub base: ComparisonExp<String>,
    #[serde(rename = "_like", default, skip_serializing_if = "Option::is_none")]
    pub like: Option<String>,
    #[serde(rename = "_nlike", default, skip_serializing_if = "Option::is_none")]
    pub nlike: Option<String>,
    #[serde(rename = "_ilike", default, skip_serializing_if = "Option::is_none")]
    pub ilike: Option<String>,
    #[serde(rename = "_nilike", default, skip_serializing_if = "Option::is_none")]
    pub nilike: Option<String>,
    #[serde(rename = "_similar", default, skip_serializing_if = "Option::is_none")]
    pub similar: Option<String>,
    #[serde(rename = "_nsimilar", default, skip_serializing_if = "Option::is_none")]
    pub nsimilar: Option<String>,
    #[serde(rename = "_regex", default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(rename = "_nregex", default, skip_serializing_if = "Option::is_none")]
    pub nregex: Option<String>,
    #[serde(rename = "_iregex", default, skip_serializing_if = "Option::is_none")]
    pub iregex: Option<String>,
    #[serde(rename = "_niregex", default, skip_serializing_if = "Option::is_none")]
    pub niregex: Option<String>,
}

impl StringComparisonExp {
    pub fn eq(value: impl Into<String>) -> Self {
        Self {
            base: ComparisonExp::eq(value.into()),
            ..Default::default()
        }
    }

    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            base: ComparisonExp::one_of(values.into_iter().map(Into::into)),
            ..Default::default()
        }
    }

    pub fn is_null(null: bool) -> Self {
        Self {
            base: ComparisonExp::is_null(null),
            ..Default::default()
        }
    }

    pub fn like(pattern: impl Into<String>) -> Self {
        Self {
            like: Some(pattern.into()),
            ..Default::default()
        }
    }

    pub fn ilike(pattern: impl Into<String>) -> Self {
        Self {
            ilike: Some(pattern.into()),
            ..Default::default()
        }
    }

    /// Case-insensitive substring match; `%` and `_` in `needle` are escaped.
    pub fn contains_insensitive(needle: &str) -> Self {
        let mut escaped = String::with_capacity(needle.len() + 2);
        escaped.push('%');
        for ch in needle.chars() {
            if matches!(ch, '%' | '_' | '\\') {
                escaped.push('\\');
            }
            escaped.push(ch);
        }
        escaped.push('%');
        Self::ilike(escaped)
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        Self {
            regex: Some(pattern.into()),
            ..Default::default()
        }
    }
}

/// `jsonb_comparison_exp`: the shared operators plus containment and key
/// tests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonbComparisonExp {
    #[serde(flatten)]
    pub base: ComparisonExp<Jsonb>,
    #[serde(rename = "_contains", default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<Jsonb>,
    #[serde(rename = "_contained_in", default, skip_serializing_if = "Option::is_none")]
    pub contained_in: Option<Jsonb>,
    #[serde(rename = "_has_key", default, skip_serializing_if = "Option::is_none")]
    pub has_key: Option<String>,
    #[serde(rename = "_has_keys_all", default, skip_serializing_if = "Option::is_none")]
    pub has_keys_all: Option<Vec<String>>,
    #[serde(rename = "_has_keys_any", default, skip_serializing_if = "Option::is_none")]
    pub has_keys_any: Option<Vec<String>>,
}

impl JsonbComparisonExp {
    pub fn contains(value: Jsonb) -> Self {
        Self {
            contains: Some(value),
            ..Default::default()
        }
    }

    pub fn has_key(key: impl Into<String>) -> Self {
        Self {
            has_key: Some(key.into()),
            ..Default::default()
        }
    }
}

macro_rules! plain_scalar {
    ($($ty:ty => $name:literal),+ $(,)?) => {
        $(
            impl HasuraScalar for $ty {
                const GRAPHQL_TYPE: &'static str = $name;
                type Comparison = ComparisonExp<$ty>;
            }
        )+
    };
}

plain_scalar! {
    Uuid => "uuid",
    bool => "Boolean",
    i32 => "Int",
    i64 => "bigint",
    f64 => "numeric",
    Timestamptz => "timestamptz",
    Timestamp => "timestamp",
    Date => "date",
}

impl HasuraScalar for String {
    const GRAPHQL_TYPE: &'static str = "String";
    type Comparison = StringComparisonExp;
}

impl HasuraScalar for Jsonb {
    const GRAPHQL_TYPE: &'static str = "jsonb";
    type Comparison = JsonbComparisonExp;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unset_operators_are_omitted() {
        let exp: ComparisonExp<i32> = ComparisonExp::default();
        assert_eq!(serde_json::to_value(&exp).unwrap(), json!({}));
    }

    #[test]
    fn eq_serialises_with_underscore_operator() {
        let id: Uuid = "00000000-0000-0000-0000-000000000001".parse().unwrap();
        let exp = ComparisonExp::eq(id);
        assert_eq!(
            serde_json::to_value(&exp).unwrap(),
            json!({"_eq": "00000000-0000-0000-0000-000000000001"})
        );
    }

    #[test]
    fn in_and_is_null_use_hasura_names() {
        let exp = ComparisonExp::one_of([1, 2, 3]);
        assert_eq!(serde_json::to_value(&exp).unwrap(), json!({"_in": [1, 2, 3]}));
        let exp: ComparisonExp<i32> = ComparisonExp::is_null(true);
        assert_eq!(serde_json::to_value(&exp).unwrap(), json!({"_is_null": true}));
    }

    #[test]
    fn between_sets_both_bounds() {
        let exp = ComparisonExp::between(10, 20);
        assert_eq!(
            serde_json::to_value(&exp).unwrap(),
            json!({"_gte": 10, "_lte": 20})
        );
    }

    #[test]
    fn string_comparison_flattens_base_operators() {
        let mut exp = StringComparisonExp::eq("client");
        exp.ilike = Some("%acme%".into());
        assert_eq!(
            serde_json::to_value(&exp).unwrap(),
            json!({"_eq": "client", "_ilike": "%acme%"})
        );
    }

    #[test]
    fn string_comparison_decodes_mixed_operators() {
        let exp: StringComparisonExp =
            serde_json::from_value(json!({"_nin": ["a", "b"], "_regex": "^x"})).unwrap();
        assert_eq!(exp.base.not_in_list, Some(vec!["a".into(), "b".into()]));
        assert_eq!(exp.regex.as_deref(), Some("^x"));
    }

    #[test]
    fn contains_insensitive_escapes_wildcards() {
        let exp = StringComparisonExp::contains_insensitive("50%_off");
        assert_eq!(exp.ilike.as_deref(), Some("%50\\%\\_off%"));
    }

    #[test]
    fn jsonb_comparison_supports_key_tests() {
        let exp = JsonbComparisonExp {
            has_keys_any: Some(vec!["a".into(), "b".into()]),
            ..JsonbComparisonExp::contains(json!({"kind": "payroll"}))
        };
        assert_eq!(
            serde_json::to_value(&exp).unwrap(),
            json!({"_contains": {"kind": "payroll"}, "_has_keys_any": ["a", "b"]})
        );
    }

    #[test]
    fn enum_comparison_decodes_without_default() {
        use crate::enums::PayrollStatus;

        let exp: <PayrollStatus as HasuraScalar>::Comparison =
            serde_json::from_value(json!({"_in": ["Active", "Implementation"]})).unwrap();
        assert_eq!(
            exp.in_list,
            Some(vec![PayrollStatus::Active, PayrollStatus::Implementation])
        );
        assert_eq!(exp.eq, None);
    }

    #[test]
    fn graphql_type_names_match_hasura() {
        assert_eq!(<Uuid as HasuraScalar>::GRAPHQL_TYPE, "uuid");
        assert_eq!(<String as HasuraScalar>::GRAPHQL_TYPE, "String");
        assert_eq!(<Timestamptz as HasuraScalar>::GRAPHQL_TYPE, "timestamptz");
        assert_eq!(<Jsonb as HasuraScalar>::GRAPHQL_TYPE, "jsonb");
    }
}
