//! Root-entity filters: a conjunction of equality and array-containment predicates.

use serde_json::Value;

#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    /// `column = value`
    Equals { column: String, value: Value },
    /// `column @> ARRAY[value]` on an integer-array column.
    Contains { column: String, value: i64 },
}

impl Predicate {
    pub fn column(&self) -> &str {
        match self {
            Predicate::Equals { column, .. } | Predicate::Contains { column, .. } => column,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    pub predicates: Vec<Predicate>,
}

impl Filter {
    pub fn new() -> Self {
        Filter::default()
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate::Equals {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    pub fn contains(mut self, column: impl Into<String>, value: i64) -> Self {
        self.predicates.push(Predicate::Contains {
            column: column.into(),
            value,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}
