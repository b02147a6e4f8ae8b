//! Root document template.
//!
//! # Responsibilities
//! - Define the `RootTemplate` collaborator the render pipeline hands page markup to
//! - Provide `HtmlTemplate`, a small built-in engine for HTML root documents
//!
//! # Syntax
//! - `{{ .name }}` inserts a data value (HTML-escaped unless it is `TemplateValue::Html`)
//! - `{{ func arg ... }}` calls a registered function; arguments are `"string"`
//!   literals, numbers, `true`/`false`, or `.name` data references
//!
//! # Design Decisions
//! - Templates are parsed once at startup; rendering never re-reads the source
//! - Missing data keys render as empty strings
//! - Unknown functions are reported at render time, since functions are registered
//!   after the template source is chosen

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

use crate::error::BoxError;

/// Data key receiving the head fragments (raw HTML).
pub const HEAD_KEY: &str = "inertiaHead";

/// Data key receiving the body or container fragment (raw HTML).
pub const BODY_KEY: &str = "inertia";

/// Function callable from a template.
pub type TemplateFunc = Arc<dyn Fn(&[Value]) -> Result<Value, BoxError> + Send + Sync>;

/// Named template functions.
pub type TemplateFuncs = IndexMap<String, TemplateFunc>;

/// Named template data.
pub type TemplateData = IndexMap<String, TemplateValue>;

/// A value made available to the root template.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateValue {
    /// Escaped on output.
    Value(Value),
    /// Trusted markup inserted verbatim.
    Html(String),
}

impl TemplateValue {
    fn to_value(&self) -> Value {
        match self {
            TemplateValue::Value(value) => value.clone(),
            TemplateValue::Html(html) => Value::String(html.clone()),
        }
    }
}

macro_rules! template_value_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for TemplateValue {
                fn from(value: $ty) -> Self {
                    TemplateValue::Value(Value::from(value))
                }
            }
        )*
    };
}

template_value_from!(Value, &str, String, bool, i32, i64, u64, f64);

/// Errors raised while loading or rendering the root template.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unclosed action starting at byte {0}")]
    Unclosed(usize),

    #[error("invalid action `{0}`")]
    InvalidAction(String),

    #[error("unknown template function `{0}`")]
    UnknownFunction(String),

    #[error("template function `{name}` failed: {source}")]
    Function {
        name: String,
        #[source]
        source: BoxError,
    },
}

/// Collaborator that turns template data into the final HTML document.
pub trait RootTemplate: Send + Sync {
    fn render(&self, data: &TemplateData, funcs: &TemplateFuncs) -> Result<String, TemplateError>;
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Text(String),
    Var(String),
    Call { name: String, args: Vec<Arg> },
}

#[derive(Debug, Clone, PartialEq)]
enum Arg {
    Literal(Value),
    Var(String),
}

/// Parsed HTML template.
#[derive(Clone, PartialEq)]
pub struct HtmlTemplate {
    segments: Vec<Segment>,
}

impl HtmlTemplate {
    /// Parse template source.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = source;
        let mut offset = 0;

        while let Some(start) = rest.find("{{") {
            if start > 0 {
                segments.push(Segment::Text(rest[..start].to_string()));
            }
            let after = &rest[start + 2..];
            let end = find_close(after).ok_or(TemplateError::Unclosed(offset + start))?;
            segments.push(parse_action(after[..end].trim())?);

            let consumed = start + 2 + end + 2;
            offset += consumed;
            rest = &rest[consumed..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }

        Ok(Self { segments })
    }

    /// Read and parse a template file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&source)
    }
}

impl fmt::Debug for HtmlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HtmlTemplate")
            .field("segments", &self.segments.len())
            .finish()
    }
}

impl RootTemplate for HtmlTemplate {
    fn render(&self, data: &TemplateData, funcs: &TemplateFuncs) -> Result<String, TemplateError> {
        let mut out = String::new();

        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Var(name) => match data.get(name) {
                    Some(TemplateValue::Html(html)) => out.push_str(html),
                    Some(TemplateValue::Value(value)) => out.push_str(&escape_html(&display(value))),
                    None => {}
                },
                Segment::Call { name, args } => {
                    let func = funcs
                        .get(name)
                        .ok_or_else(|| TemplateError::UnknownFunction(name.clone()))?;
                    let args: Vec<Value> = args
                        .iter()
                        .map(|arg| match arg {
                            Arg::Literal(value) => value.clone(),
                            Arg::Var(key) => data.get(key).map(TemplateValue::to_value).unwrap_or(Value::Null),
                        })
                        .collect();
                    let result = func(&args).map_err(|source| TemplateError::Function {
                        name: name.clone(),
                        source,
                    })?;
                    out.push_str(&escape_html(&display(&result)));
                }
            }
        }

        Ok(out)
    }
}

/// Byte offset of the first `}}` outside a double-quoted string.
fn find_close(action: &str) -> Option<usize> {
    let bytes = action.as_bytes();
    let mut quoted = false;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' if quoted => i += 1,
            b'"' => quoted = !quoted,
            b'}' if !quoted && bytes.get(i + 1) == Some(&b'}') => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

fn parse_action(action: &str) -> Result<Segment, TemplateError> {
    let tokens = tokenize(action)?;
    let invalid = || TemplateError::InvalidAction(action.to_string());

    let (head, rest) = tokens.split_first().ok_or_else(invalid)?;
    if let Some(key) = head.strip_prefix('.') {
        if key.is_empty() || !rest.is_empty() {
            return Err(invalid());
        }
        return Ok(Segment::Var(key.to_string()));
    }
    if head.starts_with('"') || !is_identifier(head) {
        return Err(invalid());
    }

    let args = rest
        .iter()
        .map(|token| parse_arg(token).ok_or_else(invalid))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Segment::Call {
        name: head.clone(),
        args,
    })
}

fn parse_arg(token: &str) -> Option<Arg> {
    if let Some(key) = token.strip_prefix('.') {
        return (!key.is_empty()).then(|| Arg::Var(key.to_string()));
    }
    if token.starts_with('"') {
        return serde_json::from_str::<String>(token)
            .ok()
            .map(|s| Arg::Literal(Value::String(s)));
    }
    match token {
        "true" => Some(Arg::Literal(Value::Bool(true))),
        "false" => Some(Arg::Literal(Value::Bool(false))),
        number => serde_json::from_str::<serde_json::Number>(number)
            .ok()
            .map(|n| Arg::Literal(Value::Number(n))),
    }
}

/// Split on whitespace, keeping double-quoted strings (with `\` escapes) intact.
fn tokenize(action: &str) -> Result<Vec<String>, TemplateError> {
    let mut tokens = Vec::new();
    let mut chars = action.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let mut token = String::new();
        if c == '"' {
            token.push(c);
            chars.next();
            let mut closed = false;
            while let Some(c) = chars.next() {
                token.push(c);
                match c {
                    '\\' => {
                        if let Some(escaped) = chars.next() {
                            token.push(escaped);
                        }
                    }
                    '"' => {
                        closed = true;
                        break;
                    }
                    _ => {}
                }
            }
            if !closed {
                return Err(TemplateError::InvalidAction(action.to_string()));
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                token.push(c);
                chars.next();
            }
        }
        tokens.push(token);
    }

    Ok(tokens)
}

fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Escape text for use in HTML content and double- or single-quoted attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Reverse [`escape_html`], including the named forms of the quote entities.
pub fn unescape_html(input: &str) -> String {
    input
        .replace("&#34;", "\"")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
