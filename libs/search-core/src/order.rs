//! Order specification and in-memory record ordering.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cursor::Projection;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    pub fn reverse(self) -> Self {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

/// One ordering entry. Wire shape matches the GraphQL `orderInput`
/// (`{field, order}`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderKey {
    pub field: String,
    #[serde(rename = "order")]
    pub dir: SortDir,
}

/// Ordered sequence of sort keys.
///
/// Keyset pagination is only total when the sequence contains the entity's
/// identifying attribute; [`OrderBy::ensure_tiebreaker`] appends it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy(pub Vec<OrderKey>);

impl OrderBy {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn single(field: &str, dir: SortDir) -> Self {
        Self(vec![OrderKey {
            field: field.to_string(),
            dir,
        }])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.0.iter().any(|k| k.field == field)
    }

    /// Append the identifying attribute if it is not already present.
    /// An existing entry keeps its original direction.
    pub fn ensure_tiebreaker(mut self, field: &str, dir: SortDir) -> Self {
        if !self.contains_field(field) {
            self.0.push(OrderKey {
                field: field.to_string(),
                dir,
            });
        }
        self
    }

    /// Same fields with every direction flipped (backward scan order).
    pub fn reversed(&self) -> Self {
        Self(
            self.0
                .iter()
                .map(|k| OrderKey {
                    field: k.field.clone(),
                    dir: k.dir.reverse(),
                })
                .collect(),
        )
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.0.iter().map(|k| k.field.as_str()).collect()
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(none)");
        }
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|k| format!("{} {}", k.field, k.dir.as_str().to_lowercase()))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

/// Total order over JSON scalars: null, then booleans, then numbers, then
/// strings, then everything else by its serialized form.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            _ => 4,
        }
    }
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ if rank(a) != rank(b) => rank(a).cmp(&rank(b)),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

/// Multi-key in-memory sort, used to merge and order record sets that were
/// fetched from more than one storage adapter.
pub fn sort_records(records: &mut [Projection], order: &OrderBy) {
    records.sort_by(|a, b| {
        for key in &order.0 {
            let av = a.get(&key.field).unwrap_or(&Value::Null);
            let bv = b.get(&key.field).unwrap_or(&Value::Null);
            let mut ord = compare_values(av, bv);
            if key.dir == SortDir::Desc {
                ord = ord.reverse();
            }
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}
