//! # Path based access to nested documents
//!
//! A [`Path`] is a slash delimited address into a JSON document such as `/results/patients`.
//! Each segment selects a field of an object, or an element of an array when it parses as an index.
//! A final `*` segment selects all the children of an object or an array.
//!

use core::fmt;
use itertools::Itertools;
use serde_json::Value;
use std::{error, result, str::FromStr};

pub const SEPARATOR: char = '/';
pub const WILDCARD: &str = "*";

#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    InvalidPath(String),
}

impl Error {
    pub fn invalid_path(path: impl fmt::Display, reason: impl fmt::Display) -> Error {
        Error::InvalidPath(format!("'{path}' is invalid ({reason})"))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidPath(desc) => writeln!(f, "InvalidPath: {}", desc),
        }
    }
}

impl error::Error for Error {}
pub type Result<T> = result::Result<T, Error>;

/// What a path found in a document
#[derive(Clone, Debug, PartialEq)]
pub enum Found<T> {
    Zero,
    One(T),
    /// Every match of a wildcard, even when there is only one
    Many(Vec<T>),
}

impl<T> Found<T> {
    pub fn is_zero(&self) -> bool {
        matches!(self, Found::Zero)
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Found::Zero => vec![],
            Found::One(t) => vec![t],
            Found::Many(v) => v,
        }
    }
}

/// Found can be converted to Option
impl<T> From<Found<T>> for Option<T> {
    fn from(value: Found<T>) -> Self {
        match value {
            Found::One(t) => Some(t),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Wildcard,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => write!(f, "{key}"),
            Segment::Wildcard => write!(f, "{WILDCARD}"),
        }
    }
}

/// A parsed path expression
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Path(Vec<Segment>);

impl Path {
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn has_wildcard(&self) -> bool {
        matches!(self.0.last(), Some(Segment::Wildcard))
    }

    /// Walk `document` segment by segment.
    /// Missing fields, out of range indices and scalars in the middle of the path
    /// all give `Found::Zero`.
    pub fn extract<'a>(&self, document: &'a Value) -> Found<&'a Value> {
        let mut current = document;
        for segment in &self.0 {
            match segment {
                Segment::Key(key) => match child(current, key) {
                    Some(value) => current = value,
                    None => return Found::Zero,
                },
                Segment::Wildcard => return Found::Many(children(current)),
            }
        }
        Found::One(current)
    }
}

fn child<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn children(value: &Value) -> Vec<&Value> {
    match value {
        Value::Object(map) => map.values().collect(),
        Value::Array(items) => items.iter().collect(),
        _ => vec![],
    }
}

impl FromStr for Path {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let body = s.strip_prefix(SEPARATOR).unwrap_or(s);
        if body.is_empty() {
            return Err(Error::invalid_path(s, "empty path"));
        }
        let segments: Vec<&str> = body.split(SEPARATOR).collect();
        let last = segments.len() - 1;
        segments
            .into_iter()
            .enumerate()
            .map(|(i, segment)| match segment {
                "" => Err(Error::invalid_path(s, "empty segment")),
                WILDCARD if i < last => {
                    Err(Error::invalid_path(s, "wildcard before the last segment"))
                }
                WILDCARD => Ok(Segment::Wildcard),
                key => Ok(Segment::Key(key.to_string())),
            })
            .collect::<Result<Vec<Segment>>>()
            .map(Path)
    }
}

impl TryFrom<&str> for Path {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SEPARATOR}{}", self.0.iter().join("/"))
    }
}

/// Parse `path` and look it up in `document`
pub fn extract<'a>(document: &'a Value, path: &str) -> Result<Found<&'a Value>> {
    Ok(path.parse::<Path>()?.extract(document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> Value {
        json!({
            "results": {
                "patients": [
                    {"causeOfDeath": {"Cancer": 32, "Heart": 23}},
                    {"gender": {"Male": 3}}
                ],
                "status": "ok"
            }
        })
    }

    #[test]
    fn test_parse() {
        let path: Path = "/results/patients".parse().unwrap();
        assert_eq!(
            path.segments(),
            &[
                Segment::Key("results".to_string()),
                Segment::Key("patients".to_string())
            ]
        );
        assert_eq!(path.to_string(), "/results/patients");
        // The leading separator is optional
        assert_eq!(Path::try_from("results/patients").unwrap(), path);
        assert!(Path::try_from("/results/*").unwrap().has_wildcard());
        assert!(!path.has_wildcard());
    }

    #[test]
    fn test_malformed_paths() {
        for malformed in ["", "/", "//results", "/results//patients", "/results/", "/*/patients"] {
            assert!(
                matches!(Path::try_from(malformed), Err(Error::InvalidPath(_))),
                "{malformed} should not parse"
            );
        }
    }

    #[test]
    fn test_extract() {
        let document = document();
        let found = extract(&document, "/results/patients/0/causeOfDeath/Cancer").unwrap();
        assert_eq!(found, Found::One(&json!(32)));
        let found: Option<&Value> = extract(&document, "/results/status").unwrap().into();
        assert_eq!(found, Some(&json!("ok")));
        match extract(&document, "/results/patients").unwrap() {
            Found::One(Value::Array(patients)) => assert_eq!(patients.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_extract_absent() {
        let document = document();
        // missing field
        assert!(extract(&document, "/results/samples").unwrap().is_zero());
        // index out of range
        assert!(extract(&document, "/results/patients/2").unwrap().is_zero());
        // walking through a scalar
        assert!(extract(&document, "/results/status/code").unwrap().is_zero());
        // non numeric index into an array
        assert!(extract(&document, "/results/patients/first").unwrap().is_zero());
        // empty documents
        assert!(extract(&json!({}), "/results").unwrap().is_zero());
        assert!(extract(&Value::Null, "/results").unwrap().is_zero());
    }

    #[test]
    fn test_extract_wildcard() {
        let document = document();
        let found = extract(&document, "/results/patients/*").unwrap();
        assert_eq!(found.clone().into_vec().len(), 2);
        assert!(matches!(found, Found::Many(_)));
        let found = extract(&document, "/results/patients/0/causeOfDeath/*").unwrap();
        assert_eq!(found, Found::Many(vec![&json!(32), &json!(23)]));
        // a wildcard over a scalar selects nothing
        assert_eq!(
            extract(&document, "/results/status/*").unwrap(),
            Found::Many(vec![])
        );
    }

    #[test]
    fn test_extract_malformed() {
        assert!(extract(&document(), "/results//patients").is_err());
    }
}
