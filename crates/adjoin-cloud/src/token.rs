//! Deploy-time values
//!
//! Most values in a template are only known once CloudFormation creates the
//! resources (`Ref`, `Fn::GetAtt`, ...). They are modelled as [`Intrinsic`]
//! functions. Intrinsics can be embedded into ordinary strings as token
//! markers (`${Token[TOKEN.<n>]}`) so that string-building code such as
//! document templates does not need to know about them; the [`TokenTable`]
//! turns those markers back into intrinsics when the stack is synthesized.

use crate::error::{CloudError, Result};
use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::{Value, json};
use std::sync::LazyLock;

static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{Token\[TOKEN\.(\d+)\]\}").expect("token marker pattern is valid")
});

/// CloudFormation pseudo parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pseudo {
    Partition,
    UrlSuffix,
}

impl Pseudo {
    pub fn name(&self) -> &'static str {
        match self {
            Pseudo::Partition => "AWS::Partition",
            Pseudo::UrlSuffix => "AWS::URLSuffix",
        }
    }
}

/// CloudFormation intrinsic function
#[derive(Debug, Clone, PartialEq)]
pub enum Intrinsic {
    /// `{"Ref": name}`
    Ref(String),
    /// `{"Fn::GetAtt": [logical_id, attribute]}`
    GetAtt { logical_id: String, attribute: String },
    /// `{"Fn::Select": [index, list]}`
    Select { index: usize, list: Value },
    /// `{"Fn::Join": [delimiter, list]}`
    Join { delimiter: String, list: Value },
    /// `{"Fn::Base64": value}`
    Base64(Value),
    /// `{"Fn::GetAZs": region}`
    GetAzs(String),
}

impl Intrinsic {
    pub fn reference(logical_id: impl Into<String>) -> Self {
        Intrinsic::Ref(logical_id.into())
    }

    pub fn get_att(logical_id: impl Into<String>, attribute: impl Into<String>) -> Self {
        Intrinsic::GetAtt {
            logical_id: logical_id.into(),
            attribute: attribute.into(),
        }
    }

    pub fn pseudo(pseudo: Pseudo) -> Self {
        Intrinsic::Ref(pseudo.name().to_string())
    }

    pub fn select(index: usize, list: impl Into<Value>) -> Self {
        Intrinsic::Select {
            index,
            list: list.into(),
        }
    }

    pub fn join(delimiter: impl Into<String>, list: impl Into<Value>) -> Self {
        Intrinsic::Join {
            delimiter: delimiter.into(),
            list: list.into(),
        }
    }

    pub fn base64(value: impl Into<Value>) -> Self {
        Intrinsic::Base64(value.into())
    }

    /// Availability zones of the stack's region
    pub fn azs() -> Self {
        Intrinsic::GetAzs(String::new())
    }

    /// JSON form as it appears in the template
    pub fn to_value(&self) -> Value {
        match self {
            Intrinsic::Ref(name) => json!({ "Ref": name }),
            Intrinsic::GetAtt {
                logical_id,
                attribute,
            } => json!({ "Fn::GetAtt": [logical_id, attribute] }),
            Intrinsic::Select { index, list } => json!({ "Fn::Select": [index, list] }),
            Intrinsic::Join { delimiter, list } => json!({ "Fn::Join": [delimiter, list] }),
            Intrinsic::Base64(value) => json!({ "Fn::Base64": value }),
            Intrinsic::GetAzs(region) => json!({ "Fn::GetAZs": region }),
        }
    }
}

impl Serialize for Intrinsic {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl From<Intrinsic> for Value {
    fn from(intrinsic: Intrinsic) -> Self {
        intrinsic.to_value()
    }
}

/// Returns true if the string carries at least one token marker
pub fn is_unresolved(s: &str) -> bool {
    TOKEN_PATTERN.is_match(s)
}

/// Joins values with a delimiter.
///
/// Plain strings are joined locally; anything deploy-time becomes
/// `Fn::Join`. An empty result is reported as absent so callers can skip
/// it the same way they skip any other missing value.
pub fn join(delimiter: &str, values: &[Value]) -> Option<Value> {
    if values.is_empty() {
        return None;
    }

    let plain: Option<Vec<&str>> = values
        .iter()
        .map(|v| v.as_str().filter(|s| !is_unresolved(s)))
        .collect();

    match plain {
        Some(parts) => {
            let joined = parts.join(delimiter);
            if joined.is_empty() {
                None
            } else {
                Some(Value::String(joined))
            }
        }
        None => Some(Intrinsic::join(delimiter, Value::Array(values.to_vec())).into()),
    }
}

/// Presence check used before emitting optional values
pub fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(_) => true,
    }
}

/// Table of intrinsics embedded into strings
#[derive(Debug, Clone, Default)]
pub struct TokenTable {
    tokens: Vec<Intrinsic>,
}

impl TokenTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an intrinsic and returns its string marker.
    ///
    /// Registering an equal intrinsic twice yields the same marker.
    pub fn register(&mut self, intrinsic: Intrinsic) -> String {
        let index = match self.tokens.iter().position(|t| *t == intrinsic) {
            Some(index) => index,
            None => {
                self.tokens.push(intrinsic);
                self.tokens.len() - 1
            }
        };
        format!("${{Token[TOKEN.{}]}}", index)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    fn lookup(&self, marker: &str, index: &str) -> Result<&Intrinsic> {
        index
            .parse::<usize>()
            .ok()
            .and_then(|i| self.tokens.get(i))
            .ok_or_else(|| CloudError::UnresolvedToken(marker.to_string()))
    }

    /// Resolves the markers in a single string
    pub fn resolve_string(&self, s: &str) -> Result<Value> {
        let mut parts: Vec<Value> = Vec::new();
        let mut literal = String::new();
        let mut last = 0;

        for caps in TOKEN_PATTERN.captures_iter(s) {
            let whole = caps.get(0).map(|m| (m.start(), m.end(), m.as_str()));
            let Some((start, end, marker)) = whole else {
                continue;
            };
            literal.push_str(&s[last..start]);
            let intrinsic = self.lookup(marker, &caps[1])?;
            if !literal.is_empty() {
                parts.push(Value::String(std::mem::take(&mut literal)));
            }
            parts.push(self.resolve_value(intrinsic.to_value())?);
            last = end;
        }

        if parts.is_empty() {
            return Ok(Value::String(s.to_string()));
        }

        literal.push_str(&s[last..]);
        if !literal.is_empty() {
            parts.push(Value::String(literal));
        }

        if parts.len() == 1 {
            return Ok(parts.remove(0));
        }
        Ok(Intrinsic::join("", Value::Array(parts)).into())
    }

    /// Resolves every string in a JSON tree
    pub fn resolve_value(&self, value: Value) -> Result<Value> {
        match value {
            Value::String(s) => self.resolve_string(&s),
            Value::Array(items) => items
                .into_iter()
                .map(|item| self.resolve_value(item))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Value::Object(map) => {
                let mut resolved = serde_json::Map::with_capacity(map.len());
                for (key, item) in map {
                    resolved.insert(key, self.resolve_value(item)?);
                }
                Ok(Value::Object(resolved))
            }
            other => Ok(other),
        }
    }
}
