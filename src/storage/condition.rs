//! Filter conditions applied after the key condition of a read

use rusqlite::types::Value;

/// A post-filter predicate over item attributes.
///
/// Attribute names are always static column names, never caller input.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(&'static str, String),
    Ge(&'static str, String),
    In(&'static str, Vec<String>),
    And(Box<Condition>, Box<Condition>),
}

impl Condition {
    pub fn eq(attr: &'static str, value: impl Into<String>) -> Self {
        Condition::Eq(attr, value.into())
    }

    pub fn ge(attr: &'static str, value: impl Into<String>) -> Self {
        Condition::Ge(attr, value.into())
    }

    pub fn is_in<T: Into<String>>(attr: &'static str, values: impl IntoIterator<Item = T>) -> Self {
        Condition::In(attr, values.into_iter().map(Into::into).collect())
    }

    pub fn and(self, other: Condition) -> Self {
        Condition::And(Box::new(self), Box::new(other))
    }

    /// Render as a SQL boolean expression, appending bound values to `params`.
    pub fn to_sql(&self, params: &mut Vec<Value>) -> String {
        match self {
            Condition::Eq(attr, value) => {
                params.push(Value::Text(value.clone()));
                format!("{} = ?", attr)
            }
            Condition::Ge(attr, value) => {
                params.push(Value::Text(value.clone()));
                format!("{} >= ?", attr)
            }
            Condition::In(_, values) if values.is_empty() => "0".to_string(),
            Condition::In(attr, values) => {
                params.extend(values.iter().cloned().map(Value::Text));
                let marks = vec!["?"; values.len()].join(", ");
                format!("{} IN ({})", attr, marks)
            }
            Condition::And(left, right) => {
                let l = left.to_sql(params);
                let r = right.to_sql(params);
                format!("({} AND {})", l, r)
            }
        }
    }
}

/// Fold step for building a conjunction from optional terms.
///
/// Starts from no filter at all; absent terms leave the accumulator as is.
pub fn conjoin(acc: Option<Condition>, term: Option<Condition>) -> Option<Condition> {
    match (acc, term) {
        (None, term) => term,
        (acc, None) => acc,
        (Some(acc), Some(term)) => Some(acc.and(term)),
    }
}
