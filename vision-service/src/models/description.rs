use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Message returned to callers when the provider payload has no answer text.
pub const PARSE_FAILURE_MESSAGE: &str = "Gemini response parsing failed";

/// Which step of `candidates[0].content.parts[0].text` was absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnwrapFailure {
    MissingCandidates,
    MissingContent,
    MissingParts,
    MissingText,
}

impl UnwrapFailure {
    pub fn code(&self) -> &'static str {
        match self {
            UnwrapFailure::MissingCandidates => "missing_candidates",
            UnwrapFailure::MissingContent => "missing_content",
            UnwrapFailure::MissingParts => "missing_parts",
            UnwrapFailure::MissingText => "missing_text",
        }
    }
}

impl fmt::Display for UnwrapFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Outcome of one describe call.
#[derive(Debug, Clone, PartialEq)]
pub enum Description {
    /// HTML produced by the model.
    Html(String),
    /// The provider answered, but not with the expected shape.
    Unparsed { failure: UnwrapFailure, raw: Value },
}

impl Description {
    pub fn failure(&self) -> Option<UnwrapFailure> {
        match self {
            Description::Html(_) => None,
            Description::Unparsed { failure, .. } => Some(*failure),
        }
    }

    pub fn outcome(&self) -> &'static str {
        match self {
            Description::Html(_) => "html",
            Description::Unparsed { failure, .. } => failure.code(),
        }
    }
}

/// JSON body of `/describe-image`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DescriptionResult {
    Html { html: String },
    Error { error: String, raw: Value },
}

impl From<Description> for DescriptionResult {
    fn from(description: Description) -> Self {
        match description {
            Description::Html(html) => DescriptionResult::Html { html },
            Description::Unparsed { raw, .. } => DescriptionResult::Error {
                error: PARSE_FAILURE_MESSAGE.to_string(),
                raw,
            },
        }
    }
}
