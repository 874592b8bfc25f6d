//! The recursive, backend-neutral filter AST.
//!
//! A [`SearchExpression`] node is either a leaf (`field` + `value`) or a
//! combinator (`children`); the `operator` is always present on well-formed
//! nodes. Malformed shapes are preserved as-is and compile to the empty
//! predicate, never to an error — validation beyond value coercion is a
//! compiler concern, since operator support differs per backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Closed set of abstract comparison and combinator operators.
///
/// `Tgt`, `Tget` and `Ctk` are wide-column pseudo-operators (partition-token
/// comparison and `CONTAINS KEY`); every other backend rejects them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Eq,
    Ne,
    In,
    NotIn,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    NotLike,
    ILike,
    NotILike,
    Regexp,
    NotRegexp,
    IRegexp,
    NotIRegexp,
    Between,
    NotBetween,
    Contains,
    NotContains,
    And,
    Or,
    Not,
    Tgt,
    Tget,
    Ctk,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::In => "in",
            Operator::NotIn => "notIn",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Like => "like",
            Operator::NotLike => "notLike",
            Operator::ILike => "iLike",
            Operator::NotILike => "notILike",
            Operator::Regexp => "regexp",
            Operator::NotRegexp => "notRegexp",
            Operator::IRegexp => "iRegexp",
            Operator::NotIRegexp => "notIRegexp",
            Operator::Between => "between",
            Operator::NotBetween => "notBetween",
            Operator::Contains => "contains",
            Operator::NotContains => "notContains",
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Not => "not",
            Operator::Tgt => "tgt",
            Operator::Tget => "tget",
            Operator::Ctk => "ctk",
        }
    }

    /// True for the logical join operators (`and`, `or`, `not`).
    pub fn is_combinator(self) -> bool {
        matches!(self, Operator::And | Operator::Or | Operator::Not)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "eq" => Operator::Eq,
            "ne" => Operator::Ne,
            "in" => Operator::In,
            "notIn" => Operator::NotIn,
            "gt" => Operator::Gt,
            "gte" => Operator::Gte,
            "lt" => Operator::Lt,
            "lte" => Operator::Lte,
            "like" => Operator::Like,
            "notLike" => Operator::NotLike,
            "iLike" => Operator::ILike,
            "notILike" => Operator::NotILike,
            "regexp" => Operator::Regexp,
            "notRegexp" => Operator::NotRegexp,
            "iRegexp" => Operator::IRegexp,
            "notIRegexp" => Operator::NotIRegexp,
            "between" => Operator::Between,
            "notBetween" => Operator::NotBetween,
            "contains" => Operator::Contains,
            "notContains" => Operator::NotContains,
            "and" => Operator::And,
            "or" => Operator::Or,
            "not" => Operator::Not,
            "tgt" => Operator::Tgt,
            "tget" => Operator::Tget,
            "ctk" => Operator::Ctk,
            other => return Err(Error::UnknownOperator(other.to_string())),
        })
    }
}

/// Declared shape of a raw filter value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    #[default]
    Scalar,
    Array,
}

/// A coerced comparison operand: one raw scalar, or a comma-split sequence.
///
/// Values stay raw strings until a backend compiler coerces them against the
/// attribute's declared type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchValue {
    One(String),
    Many(Vec<String>),
}

impl SearchValue {
    /// Coerce a raw string by its declared [`ValueType`]; `Array` comma-splits.
    pub fn parse(raw: &str, value_type: ValueType) -> Self {
        match value_type {
            ValueType::Scalar => SearchValue::One(raw.to_string()),
            ValueType::Array => {
                SearchValue::Many(raw.split(',').map(|s| s.to_string()).collect())
            }
        }
    }

    /// All items, a scalar counting as a one-element sequence.
    pub fn items(&self) -> Vec<&str> {
        match self {
            SearchValue::One(s) => vec![s.as_str()],
            SearchValue::Many(v) => v.iter().map(String::as_str).collect(),
        }
    }
}

/// One node of the filter tree.
///
/// Wire shape matches the GraphQL `searchInput`: children are serialized
/// under the `search` key.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchExpression {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<SearchValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<Operator>,

    #[serde(default, rename = "search", skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<SearchExpression>>,
}

impl SearchExpression {
    /// Build a node from raw request parts, coercing the value by type.
    pub fn new(
        field: Option<&str>,
        raw_value: Option<&str>,
        value_type: ValueType,
        operator: Option<Operator>,
        children: Option<Vec<SearchExpression>>,
    ) -> Self {
        Self {
            field: field.map(str::to_string),
            value: raw_value.map(|raw| SearchValue::parse(raw, value_type)),
            operator,
            children,
        }
    }

    /// A leaf comparison node.
    pub fn leaf(field: &str, operator: Operator, raw_value: &str, value_type: ValueType) -> Self {
        Self {
            field: Some(field.to_string()),
            value: Some(SearchValue::parse(raw_value, value_type)),
            operator: Some(operator),
            children: None,
        }
    }

    /// Conjunction of the given sub-expressions.
    pub fn all_of(children: Vec<SearchExpression>) -> Self {
        Self {
            field: None,
            value: None,
            operator: Some(Operator::And),
            children: Some(children),
        }
    }

    /// Disjunction of the given sub-expressions.
    pub fn any_of(children: Vec<SearchExpression>) -> Self {
        Self {
            field: None,
            value: None,
            operator: Some(Operator::Or),
            children: Some(children),
        }
    }

    /// Negation of a single sub-expression.
    pub fn negation(child: SearchExpression) -> Self {
        Self {
            field: None,
            value: None,
            operator: Some(Operator::Not),
            children: Some(vec![child]),
        }
    }

    /// AND an extra predicate into an optional existing filter.
    ///
    /// Used by the pagination normalizer to merge a boundary predicate into
    /// the caller's filter without disturbing either tree.
    pub fn and_merge(filter: Option<SearchExpression>, extra: SearchExpression) -> Self {
        match filter {
            Some(existing) => SearchExpression::all_of(vec![existing, extra]),
            None => extra,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none() && self.field.is_some()
    }

    pub fn is_combinator(&self) -> bool {
        self.children.is_some()
    }
}
