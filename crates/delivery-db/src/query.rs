//! Query builder for table-scoped reads, updates and deletes.

use crate::types::compare_values;
use crate::{Row, Value};

/// A single filter condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Column equals value.
    Eq(String, Value),
    /// Case-insensitive substring match (`ILIKE '%needle%'`).
    ILike(String, String),
    /// Any of the nested conditions holds.
    Or(Vec<Condition>),
}

impl Condition {
    /// Evaluate the condition against a row.
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            Condition::Eq(column, value) => value.matches(row.get(column)),
            Condition::ILike(column, needle) => row
                .get_str(column)
                .map(|s| s.to_lowercase().contains(&needle.to_lowercase()))
                .unwrap_or(false),
            Condition::Or(any) => any.iter().any(|c| c.matches(row)),
        }
    }
}

/// Ordering clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

/// A query against one table.
///
/// Conditions are combined with AND; ordering clauses apply in sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub conditions: Vec<Condition>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    /// Create an empty query (matches every row).
    pub fn new() -> Self {
        Self::default()
    }

    /// Query a single row by primary key.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self::new().eq("id", id.into())
    }

    /// Add an equality condition.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions
            .push(Condition::Eq(column.into(), value.into()));
        self
    }

    /// Add a case-insensitive contains condition.
    pub fn ilike(mut self, column: impl Into<String>, needle: impl Into<String>) -> Self {
        self.conditions
            .push(Condition::ILike(column.into(), needle.into()));
        self
    }

    /// Add a disjunction of conditions.
    pub fn any_of(mut self, conditions: Vec<Condition>) -> Self {
        self.conditions.push(Condition::Or(conditions));
        self
    }

    /// Append an ordering clause.
    pub fn order_by(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order_by.push(OrderBy {
            column: column.into(),
            ascending,
        });
        self
    }

    /// Cap the number of rows returned.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check whether a row satisfies every condition.
    pub fn matches(&self, row: &Row) -> bool {
        self.conditions.iter().all(|c| c.matches(row))
    }

    /// Filter, sort and truncate a set of rows.
    pub fn apply<'a>(&self, rows: impl Iterator<Item = &'a Row>) -> Vec<Row> {
        let mut out: Vec<Row> = rows.filter(|r| self.matches(r)).cloned().collect();

        if !self.order_by.is_empty() {
            out.sort_by(|a, b| {
                for clause in &self.order_by {
                    let ord = compare_values(a.get(&clause.column), b.get(&clause.column));
                    let ord = if clause.ascending { ord } else { ord.reverse() };
                    if ord != std::cmp::Ordering::Equal {
                        return ord;
                    }
                }
                std::cmp::Ordering::Equal
            });
        }

        if let Some(limit) = self.limit {
            out.truncate(limit);
        }
        out
    }
}
