use crate::error::Error;
use serde_json::{Map, Value};
use std::{fmt::Display, str::FromStr};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

/// A dot-delimited locator into a JSON document, e.g. `data.email`,
/// `data[0].email` or `token`.
///
/// A key applied to an array projects that key out of every element, so
/// `data.email` over a list of records yields the list of their emails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<Segment>,
}

impl FieldPath {
    pub fn parse<S: AsRef<str>>(path: S) -> Result<Self, Error> {
        let raw = path.as_ref();
        let invalid = |reason: &str| Error::InvalidFieldPath {
            path: raw.into(),
            reason: reason.into(),
        };

        if raw.trim().is_empty() {
            return Err(invalid("the path is empty"));
        }

        let mut segments = Vec::new();
        for part in raw.split('.') {
            let (name, mut indexes) = match part.find('[') {
                Some(position) => part.split_at(position),
                None => (part, ""),
            };

            if name.is_empty() && (indexes.is_empty() || !segments.is_empty()) {
                return Err(invalid("empty path segment"));
            }
            if name.contains(']') || name.chars().any(char::is_whitespace) {
                return Err(invalid("unexpected character in path segment"));
            }
            if !name.is_empty() {
                segments.push(Segment::Key(name.into()));
            }

            while !indexes.is_empty() {
                let close = indexes
                    .find(']')
                    .ok_or_else(|| invalid("unterminated index"))?;
                let index = indexes[1..close]
                    .parse()
                    .map_err(|_| invalid("index should be a non-negative number"))?;
                segments.push(Segment::Index(index));

                indexes = &indexes[close + 1..];
                if !indexes.is_empty() && !indexes.starts_with('[') {
                    return Err(invalid("unexpected text after index"));
                }
            }
        }

        Ok(Self {
            raw: raw.into(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns `None` when the path doesn't lead anywhere in `document`.
    pub fn resolve(&self, document: &Value) -> Option<ExtractedValue> {
        let mut cursor = Cursor::One(document);

        for segment in &self.segments {
            cursor = match (segment, cursor) {
                (Segment::Key(key), Cursor::One(Value::Object(members))) => {
                    Cursor::One(members.get(key)?)
                }
                (Segment::Key(key), Cursor::One(Value::Array(items))) => {
                    Cursor::Many(project(items.iter(), key))
                }
                (Segment::Key(key), Cursor::Many(items)) => {
                    Cursor::Many(project(items.into_iter(), key))
                }
                (Segment::Index(index), Cursor::One(Value::Array(items))) => {
                    Cursor::One(items.get(*index)?)
                }
                (Segment::Index(index), Cursor::Many(items)) => {
                    Cursor::One(*items.get(*index)?)
                }
                _ => return None,
            };
        }

        Some(match cursor {
            Cursor::One(value) => ExtractedValue::from(value.clone()),
            Cursor::Many(items) => ExtractedValue::List(items.into_iter().cloned().collect()),
        })
    }
}

enum Cursor<'a> {
    One(&'a Value),
    Many(Vec<&'a Value>),
}

fn project<'a, I: Iterator<Item = &'a Value>>(items: I, key: &str) -> Vec<&'a Value> {
    let mut projected = Vec::new();

    for item in items {
        match item {
            Value::Object(members) => match members.get(key) {
                Some(Value::Array(nested)) => projected.extend(nested.iter()),
                Some(value) => projected.push(value),
                None => {}
            },
            Value::Array(nested) => projected.extend(project(nested.iter(), key)),
            _ => {}
        }
    }

    projected
}

impl FromStr for FieldPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// A value pulled out of a response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractedValue {
    Scalar(Value),
    List(Vec<Value>),
    Object(Map<String, Value>),
}

impl ExtractedValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ExtractedValue::Scalar(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn items(&self) -> Option<&[Value]> {
        match self {
            ExtractedValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// The list elements as strings, if this is a list of strings only.
    pub fn as_strings(&self) -> Option<Vec<&str>> {
        self.items()?.iter().map(Value::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ExtractedValue::Scalar(Value::Null) => true,
            ExtractedValue::Scalar(Value::String(s)) => s.is_empty(),
            ExtractedValue::Scalar(_) => false,
            ExtractedValue::List(items) => items.is_empty(),
            ExtractedValue::Object(members) => members.is_empty(),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            ExtractedValue::Scalar(value) => value.clone(),
            ExtractedValue::List(items) => Value::Array(items.clone()),
            ExtractedValue::Object(members) => Value::Object(members.clone()),
        }
    }
}

impl From<Value> for ExtractedValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => ExtractedValue::List(items),
            Value::Object(members) => ExtractedValue::Object(members),
            scalar => ExtractedValue::Scalar(scalar),
        }
    }
}

impl Display for ExtractedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractedValue::Scalar(Value::String(s)) => write!(f, "{}", s),
            other => write!(f, "{}", other.to_value()),
        }
    }
}
