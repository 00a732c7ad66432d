//! Solution summary produced by a generation run
//!
//! The engine's internal representation is opaque to the harness. What the
//! harness sees is the JSON summary the engine writes next to the generated
//! suite: every evaluated individual with the HTTP calls it made and the
//! responses it got back.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{EngineError, VerificationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    Trace,
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Delete => "DELETE",
            HttpVerb::Patch => "PATCH",
            HttpVerb::Options => "OPTIONS",
            HttpVerb::Head => "HEAD",
            HttpVerb::Trace => "TRACE",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for HttpVerb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpVerb::Get),
            "POST" => Ok(HttpVerb::Post),
            "PUT" => Ok(HttpVerb::Put),
            "DELETE" => Ok(HttpVerb::Delete),
            "PATCH" => Ok(HttpVerb::Patch),
            "OPTIONS" => Ok(HttpVerb::Options),
            "HEAD" => Ok(HttpVerb::Head),
            "TRACE" => Ok(HttpVerb::Trace),
            _ => Err(format!("unknown HTTP verb '{s}'")),
        }
    }
}

/// One request made by an individual and the response it got
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpCall {
    pub verb: HttpVerb,
    pub path: String,
    /// Missing when the call never got a response (timeout, connection reset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl HttpCall {
    pub fn new(verb: HttpVerb, path: impl Into<String>, status: u16) -> Self {
        Self {
            verb,
            path: path.into(),
            status: Some(status),
            body: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    fn matches(
        &self,
        verb: HttpVerb,
        status: u16,
        path: &str,
        body_contains: Option<&str>,
    ) -> bool {
        self.verb == verb
            && self.status == Some(status)
            && self.path == path
            && body_contains.is_none_or(|fragment| {
                self.body.as_deref().is_some_and(|body| body.contains(fragment))
            })
    }
}

/// A generated test case
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Individual {
    #[serde(default)]
    pub calls: Vec<HttpCall>,
}

impl Individual {
    pub fn new(calls: Vec<HttpCall>) -> Self {
        Self { calls }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    #[serde(default)]
    pub individuals: Vec<Individual>,
}

impl Solution {
    pub fn new(individuals: Vec<Individual>) -> Self {
        Self { individuals }
    }

    /// Load the summary written by the engine.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let contents = std::fs::read_to_string(path).map_err(|source| EngineError::SummaryRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| EngineError::SummaryParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn calls(&self) -> impl Iterator<Item = &HttpCall> {
        self.individuals.iter().flat_map(|i| i.calls.iter())
    }

    /// True if any call in any individual used `verb` on exactly `path`,
    /// got `status`, and (when given) a response body containing
    /// `body_contains`.
    pub fn has_at_least_one(
        &self,
        verb: HttpVerb,
        status: u16,
        path: &str,
        body_contains: Option<&str>,
    ) -> bool {
        self.calls()
            .any(|call| call.matches(verb, status, path, body_contains))
    }

    pub fn assert_has_at_least_one(
        &self,
        verb: HttpVerb,
        status: u16,
        path: &str,
        body_contains: Option<&str>,
    ) -> Result<(), VerificationError> {
        if self.has_at_least_one(verb, status, path, body_contains) {
            Ok(())
        } else {
            Err(VerificationError::NoMatchingCall {
                verb,
                status,
                path: path.to_string(),
                body_contains: body_contains.map(str::to_string),
            })
        }
    }

    pub fn assert_not_empty(&self) -> Result<(), VerificationError> {
        if self.individuals.is_empty() {
            Err(VerificationError::EmptySolution)
        } else {
            Ok(())
        }
    }
}

/// Parse an expectation of the form `"POST 200 /api/path"` with an optional
/// trailing body fragment: `"POST 200 /api/path ok"`. Fields are separated
/// by any run of whitespace; the fragment is the rest of the line.
pub fn parse_expectation(raw: &str) -> Result<(HttpVerb, u16, String, Option<String>), String> {
    let (verb, rest) = next_field(raw).ok_or_else(|| format!("empty expectation '{raw}'"))?;
    let verb = verb.parse::<HttpVerb>()?;
    let (status, rest) = next_field(rest).ok_or_else(|| format!("missing status in '{raw}'"))?;
    let status = status
        .parse::<u16>()
        .map_err(|e| format!("invalid status in '{raw}': {e}"))?;
    let (path, rest) = next_field(rest).ok_or_else(|| format!("missing path in '{raw}'"))?;
    let body = Some(rest.trim()).filter(|b| !b.is_empty());
    Ok((verb, status, path.to_string(), body.map(str::to_string)))
}

/// First whitespace-delimited field of `text` and the remainder after it
fn next_field(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }
    let end = text.find(char::is_whitespace).unwrap_or(text.len());
    Some(text.split_at(end))
}
