use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

static URI_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9+.-]*:").unwrap());

static MIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^/]+/[^/]+$").unwrap());

// UTI grammar per the platform documentation: alphanumerics, hyphens, periods.
static IDENTIFIER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9.-]*$").unwrap());

/// The four input shapes the tool understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Uri,
    Mime,
    FileExtension,
    Identifier,
}

impl InputKind {
    /// Kind name as it appears in user-facing messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            InputKind::Uri => "uri scheme",
            InputKind::Mime => "mime type",
            InputKind::FileExtension => "file extension",
            InputKind::Identifier => "type identifier",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A raw input string together with its classified kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedInput {
    pub kind: InputKind,
    pub raw: String,
}

impl TypedInput {
    /// Classify an input by its surface syntax.
    ///
    /// The checks run in a fixed order (extension, uri, mime, identifier)
    /// and the first hit wins. The grammars overlap, so the order is a
    /// priority policy: `x:y/z` is a uri even though it contains a slash.
    pub fn classify(raw: &str) -> Option<TypedInput> {
        let kind = if raw.starts_with('.') {
            InputKind::FileExtension
        } else if URI_PATTERN.is_match(raw) {
            InputKind::Uri
        } else if MIME_PATTERN.is_match(raw) {
            InputKind::Mime
        } else if IDENTIFIER_PATTERN.is_match(raw) {
            InputKind::Identifier
        } else {
            return None;
        };

        Some(TypedInput {
            kind,
            raw: raw.to_string(),
        })
    }
}

impl fmt::Display for TypedInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind, self.raw)
    }
}
