//! Search-after cursor
//!
//! A cursor is the sort tuple of the last record of a page. It is re-sent
//! verbatim as `search_after` to request the next page.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

/// Opaque sort-key tuple identifying the last record retrieved
///
/// # Examples
///
/// ```
/// use dredge::domain::Cursor;
/// use serde_json::json;
///
/// let first = Cursor::new(vec![json!("doc-0001")]).unwrap();
/// let second = Cursor::new(vec![json!("doc-0002")]).unwrap();
/// assert!(first.precedes(&second));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Value>", into = "Vec<Value>")]
pub struct Cursor(Vec<Value>);

impl TryFrom<Vec<Value>> for Cursor {
    type Error = String;

    fn try_from(values: Vec<Value>) -> Result<Self, Self::Error> {
        Self::new(values).ok_or_else(|| "cursor must hold at least one sort value".to_string())
    }
}

impl From<Cursor> for Vec<Value> {
    fn from(cursor: Cursor) -> Self {
        cursor.0
    }
}

impl Cursor {
    /// Creates a cursor from a sort tuple
    ///
    /// Returns `None` for an empty tuple, which cannot identify a position.
    pub fn new(values: Vec<Value>) -> Option<Self> {
        if values.is_empty() {
            None
        } else {
            Some(Self(values))
        }
    }

    /// Sort values in order
    pub fn values(&self) -> &[Value] {
        &self.0
    }

    /// Whether this cursor sorts strictly before `other`
    ///
    /// Compares element-wise with null < bool < number < string; arrays and
    /// objects compare by their serialized form. Tuples of different length
    /// compare on the shared prefix, then the shorter one first.
    pub fn precedes(&self, other: &Cursor) -> bool {
        self.compare(other) == Ordering::Less
    }

    fn compare(&self, other: &Cursor) -> Ordering {
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            match compare_values(a, b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        self.0.len().cmp(&other.0.len())
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => {
                let x = x.as_f64().unwrap_or(f64::NAN);
                let y = y.as_f64().unwrap_or(f64::NAN);
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            }
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => {
            a.to_string().cmp(&b.to_string())
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Array(self.0.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_tuple_is_not_a_cursor() {
        assert!(Cursor::new(vec![]).is_none());
    }

    #[test]
    fn test_string_ordering() {
        let a = Cursor::new(vec![json!("a")]).unwrap();
        let b = Cursor::new(vec![json!("b")]).unwrap();
        assert!(a.precedes(&b));
        assert!(!b.precedes(&a));
        assert!(!a.precedes(&a.clone()));
    }

    #[test]
    fn test_numeric_ordering() {
        let small = Cursor::new(vec![json!(9)]).unwrap();
        let large = Cursor::new(vec![json!(10)]).unwrap();
        assert!(small.precedes(&large));

        let float = Cursor::new(vec![json!(9.5)]).unwrap();
        assert!(small.precedes(&float));
        assert!(float.precedes(&large));
    }

    #[test]
    fn test_tuple_ordering_uses_tie_breaker() {
        let a = Cursor::new(vec![json!(1700000000), json!("doc-2")]).unwrap();
        let b = Cursor::new(vec![json!(1700000000), json!("doc-3")]).unwrap();
        assert!(a.precedes(&b));
    }

    #[test]
    fn test_mixed_type_ordering() {
        let null = Cursor::new(vec![Value::Null]).unwrap();
        let number = Cursor::new(vec![json!(1)]).unwrap();
        let string = Cursor::new(vec![json!("1")]).unwrap();
        assert!(null.precedes(&number));
        assert!(number.precedes(&string));
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let cursor = Cursor::new(vec![json!("doc-7"), json!(42)]).unwrap();
        assert_eq!(serde_json::to_value(&cursor).unwrap(), json!(["doc-7", 42]));
        assert_eq!(cursor.to_string(), r#"["doc-7",42]"#);

        let parsed: Cursor = serde_json::from_str(r#"["doc-7",42]"#).unwrap();
        assert_eq!(parsed, cursor);
    }

    #[test]
    fn test_empty_array_does_not_deserialize() {
        let err = serde_json::from_str::<Cursor>("[]").unwrap_err();
        assert!(err.to_string().contains("at least one sort value"));

        let absent: Option<Cursor> = serde_json::from_str("null").unwrap();
        assert!(absent.is_none());
    }
}
