//! JSONPath subset used by definitions to address document fields.
//!
//! Supported syntax:
//! - `$`: the document root
//! - `$.a.b` / `$['a']["b"]`: member access
//! - `$.items[0]` / `$.items[-1]`: array index, negative counts from the end
//! - `$.items[*]` / `$.obj.*`: wildcard over array elements or object values
//!
//! A path without wildcards is *definite* and resolves to one value. A path
//! with a wildcard resolves to an array of every value it reached.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::JsonView;
use crate::error::PathError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Segment {
    Member(String),
    Index(i64),
    Wildcard,
}

/// A parsed path expression.
///
/// Parsing happens once, when the path is built or deserialized, so malformed
/// expressions are rejected when a definition is loaded rather than on every read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JsonPath {
    raw: String,
    segments: Vec<Segment>,
}

impl JsonPath {
    /// Parse a path expression.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let segments = parse_segments(raw)?;
        Ok(Self {
            raw: raw.trim().to_string(),
            segments,
        })
    }

    /// The root path `$`.
    pub fn root() -> Self {
        Self {
            raw: "$".to_string(),
            segments: Vec::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True when the path contains no wildcard.
    pub fn is_definite(&self) -> bool {
        !self.segments.contains(&Segment::Wildcard)
    }

    /// Read the addressed value from a document view.
    ///
    /// Unresolvable definite paths yield `Value::Null`; an explicit `null`
    /// in the document reads the same way.
    pub fn read(&self, doc: &JsonView) -> Value {
        self.read_value(doc.as_tree())
    }

    /// Read the addressed value from a raw JSON tree.
    pub fn read_value(&self, root: &Value) -> Value {
        if self.is_definite() {
            self.segments
                .iter()
                .try_fold(root, step)
                .cloned()
                .unwrap_or(Value::Null)
        } else {
            Value::Array(self.resolve_all(root).into_iter().cloned().collect())
        }
    }

    fn resolve_all<'a>(&self, root: &'a Value) -> Vec<&'a Value> {
        let mut current = vec![root];
        for segment in &self.segments {
            let mut next = Vec::new();
            for value in current {
                match (segment, value) {
                    (Segment::Wildcard, Value::Object(map)) => next.extend(map.values()),
                    (Segment::Wildcard, Value::Array(items)) => next.extend(items.iter()),
                    (Segment::Wildcard, _) => {}
                    (other, value) => next.extend(step(value, other)),
                }
            }
            current = next;
        }
        current
    }
}

/// Parse `path` and read it from `doc` in one call.
pub fn read_path(path: &str, doc: &JsonView) -> Result<Value, PathError> {
    Ok(JsonPath::parse(path)?.read(doc))
}

fn step<'a>(value: &'a Value, segment: &Segment) -> Option<&'a Value> {
    match segment {
        Segment::Member(name) => value.as_object()?.get(name),
        Segment::Index(index) => {
            let items = value.as_array()?;
            let position = if *index < 0 {
                items.len().checked_sub(usize::try_from(index.unsigned_abs()).ok()?)?
            } else {
                usize::try_from(*index).ok()?
            };
            items.get(position)
        }
        Segment::Wildcard => None,
    }
}

fn parse_segments(raw: &str) -> Result<Vec<Segment>, PathError> {
    let path = raw.trim();
    let chars: Vec<char> = path.chars().collect();
    if chars.is_empty() {
        return Err(PathError::Empty);
    }
    if chars[0] != '$' {
        return Err(PathError::MissingRoot {
            path: path.to_string(),
        });
    }

    let unexpected = |position: usize| PathError::Unexpected {
        path: path.to_string(),
        position,
        found: chars[position],
    };
    let unterminated = |position: usize| PathError::UnterminatedBracket {
        path: path.to_string(),
        position,
    };

    let mut segments = Vec::new();
    let mut i = 1;
    while i < chars.len() {
        match chars[i] {
            '.' => {
                i += 1;
                if i < chars.len() && chars[i] == '.' {
                    // Recursive descent is not supported.
                    return Err(unexpected(i));
                }
                if i < chars.len() && chars[i] == '*' {
                    segments.push(Segment::Wildcard);
                    i += 1;
                    continue;
                }
                let start = i;
                while i < chars.len() && chars[i] != '.' && chars[i] != '[' {
                    i += 1;
                }
                if start == i {
                    return Err(PathError::MissingName {
                        path: path.to_string(),
                        position: start,
                    });
                }
                segments.push(Segment::Member(chars[start..i].iter().collect()));
            }
            '[' => {
                let open = i;
                i += 1;
                skip_whitespace(&chars, &mut i);
                if i >= chars.len() {
                    return Err(unterminated(open));
                }
                match chars[i] {
                    quote @ ('\'' | '"') => {
                        i += 1;
                        let mut name = String::new();
                        loop {
                            if i >= chars.len() {
                                return Err(unterminated(open));
                            }
                            let c = chars[i];
                            if c == '\\' && i + 1 < chars.len() {
                                name.push(chars[i + 1]);
                                i += 2;
                                continue;
                            }
                            i += 1;
                            if c == quote {
                                break;
                            }
                            name.push(c);
                        }
                        close_bracket(&chars, &mut i, open, path)?;
                        segments.push(Segment::Member(name));
                    }
                    '*' => {
                        i += 1;
                        close_bracket(&chars, &mut i, open, path)?;
                        segments.push(Segment::Wildcard);
                    }
                    _ => {
                        let start = i;
                        while i < chars.len() && chars[i] != ']' {
                            i += 1;
                        }
                        if i >= chars.len() {
                            return Err(unterminated(open));
                        }
                        let token: String = chars[start..i].iter().collect();
                        let index = token.trim().parse::<i64>().map_err(|_| PathError::InvalidIndex {
                            path: path.to_string(),
                            index: token.trim().to_string(),
                        })?;
                        i += 1;
                        segments.push(Segment::Index(index));
                    }
                }
            }
            _ => return Err(unexpected(i)),
        }
    }

    Ok(segments)
}

fn skip_whitespace(chars: &[char], i: &mut usize) {
    while *i < chars.len() && chars[*i].is_whitespace() {
        *i += 1;
    }
}

fn close_bracket(chars: &[char], i: &mut usize, open: usize, path: &str) -> Result<(), PathError> {
    skip_whitespace(chars, i);
    match chars.get(*i) {
        Some(']') => {
            *i += 1;
            Ok(())
        }
        Some(&found) => Err(PathError::Unexpected {
            path: path.to_string(),
            position: *i,
            found,
        }),
        None => Err(PathError::UnterminatedBracket {
            path: path.to_string(),
            position: open,
        }),
    }
}

impl Default for JsonPath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for JsonPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for JsonPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<JsonPath> for String {
    fn from(path: JsonPath) -> Self {
        path.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> JsonView {
        JsonView::from_tree(json!({
            "status": "active",
            "owner": { "name": "ada", "tags": ["a", "b", "c"] },
            "items": [ { "sku": "x1" }, { "sku": "x2" } ],
            "nothing": null,
            "odd key": 7
        }))
    }

    fn read(path: &str) -> Value {
        read_path(path, &doc()).unwrap()
    }

    #[test]
    fn reads_members_and_indices() {
        assert_eq!(read("$.status"), json!("active"));
        assert_eq!(read("$.owner.name"), json!("ada"));
        assert_eq!(read("$.owner.tags[1]"), json!("b"));
        assert_eq!(read("$.owner.tags[-1]"), json!("c"));
        assert_eq!(read("$['odd key']"), json!(7));
        assert_eq!(read(r#"$["owner"]["name"]"#), json!("ada"));
        assert_eq!(read("$.items[0].sku"), json!("x1"));
    }

    #[test]
    fn root_reads_whole_document() {
        assert_eq!(read("$"), doc().as_tree().clone());
    }

    #[test]
    fn unresolved_paths_read_as_null() {
        assert_eq!(read("$.missing"), Value::Null);
        assert_eq!(read("$.owner.tags[9]"), Value::Null);
        assert_eq!(read("$.owner.tags[-9]"), Value::Null);
        assert_eq!(read("$.status.deeper"), Value::Null);
        assert_eq!(read("$.nothing"), Value::Null);
    }

    #[test]
    fn wildcards_collect_every_match() {
        assert_eq!(read("$.items[*].sku"), json!(["x1", "x2"]));
        assert_eq!(read("$.owner.tags.*"), json!(["a", "b", "c"]));
        assert_eq!(read("$.missing[*]"), json!([]));
        assert!(!JsonPath::parse("$.items[*]").unwrap().is_definite());
    }

    #[test]
    fn malformed_paths_are_rejected() {
        assert_eq!(JsonPath::parse(""), Err(PathError::Empty));
        assert!(matches!(
            JsonPath::parse("status"),
            Err(PathError::MissingRoot { .. })
        ));
        assert!(matches!(
            JsonPath::parse("$.a["),
            Err(PathError::UnterminatedBracket { .. })
        ));
        assert!(matches!(
            JsonPath::parse("$.a[x]"),
            Err(PathError::InvalidIndex { .. })
        ));
        assert!(matches!(
            JsonPath::parse("$..a"),
            Err(PathError::Unexpected { .. })
        ));
        assert!(matches!(
            JsonPath::parse("$.a."),
            Err(PathError::MissingName { .. })
        ));
        assert!(matches!(
            JsonPath::parse("$a"),
            Err(PathError::Unexpected { found: 'a', .. })
        ));
    }

    #[test]
    fn serde_uses_the_raw_expression() {
        let path: JsonPath = serde_json::from_value(json!("$.owner.name")).unwrap();
        assert_eq!(path.to_string(), "$.owner.name");
        assert_eq!(serde_json::to_value(&path).unwrap(), json!("$.owner.name"));
        assert!(serde_json::from_value::<JsonPath>(json!("owner")).is_err());
    }

    #[test]
    fn default_is_root() {
        assert_eq!(JsonPath::default().as_str(), "$");
        assert!(JsonPath::default().is_definite());
    }
}
