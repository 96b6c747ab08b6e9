//! Parsers for annotation markers and `key:"value"` parameter lists.

use std::fmt;

/// Ordered `key:"value"` parameters attached to an annotation or a field.
///
/// Lookups return the first occurrence of a key, matching the way struct
/// tags are read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagParams {
    entries: Vec<(String, String)>,
}

impl TagParams {
    /// Returns the value recorded for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the value for `key`, treating an empty value as absent.
    #[must_use]
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.is_empty())
    }

    /// Iterates over the parameters in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of parameters.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no parameters were given.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TagParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Syntax problems found in tag text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagSyntaxError {
    /// A key was not followed by `:`.
    MissingColon(String),
    /// A key's value did not start with a double quote.
    MissingQuote(String),
    /// A quoted value never closed.
    UnterminatedValue(String),
    /// A `:` appeared without a key in front of it.
    EmptyKey,
    /// The parameter list opened with `(` but never closed.
    UnclosedParen,
}

impl fmt::Display for TagSyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingColon(key) => write!(f, "expected ':' after key '{key}'"),
            Self::MissingQuote(key) => write!(f, "value for '{key}' must be double-quoted"),
            Self::UnterminatedValue(key) => write!(f, "unterminated value for '{key}'"),
            Self::EmptyKey => f.write_str("parameter is missing its key"),
            Self::UnclosedParen => f.write_str("parameter list is missing ')'"),
        }
    }
}

/// Parses `key:"value" key2:"value2"` text.
///
/// Whitespace separates pairs and may surround the colon. Values support
/// `\"` and `\\` escapes.
///
/// # Errors
///
/// Returns a [`TagSyntaxError`] describing the first malformed pair.
pub fn parse_params(text: &str) -> Result<TagParams, TagSyntaxError> {
    let mut chars = text.chars().peekable();
    let mut entries = Vec::new();
    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.peek().is_none() {
            break;
        }
        let mut key = String::new();
        while let Some(c) = chars.next_if(|c| *c != ':' && *c != '"' && !c.is_whitespace()) {
            key.push(c);
        }
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.next_if_eq(&':').is_none() {
            return Err(if key.is_empty() {
                TagSyntaxError::EmptyKey
            } else {
                TagSyntaxError::MissingColon(key)
            });
        }
        if key.is_empty() {
            return Err(TagSyntaxError::EmptyKey);
        }
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.next_if_eq(&'"').is_none() {
            return Err(TagSyntaxError::MissingQuote(key));
        }
        let mut value = String::new();
        let mut closed = false;
        while let Some(c) = chars.next() {
            match c {
                '"' => {
                    closed = true;
                    break;
                }
                '\\' => match chars.next() {
                    Some(escaped) => value.push(escaped),
                    None => break,
                },
                other => value.push(other),
            }
        }
        if !closed {
            return Err(TagSyntaxError::UnterminatedValue(key));
        }
        entries.push((key, value));
    }
    Ok(TagParams { entries })
}

/// Outcome of looking for a marker in doc text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerMatch {
    /// The marker is absent.
    Absent,
    /// The marker is present; carries the text between the parentheses that
    /// follow it (empty when there are none).
    Present(String),
}

/// Looks for `marker` as a whole word in `doc` and extracts its
/// parenthesised parameter text.
///
/// The marker must be preceded by whitespace or the start of the text and
/// followed by whitespace, `(`, or the end of the text, so `@app-cfg` does
/// not match `@app-cfgx`.
///
/// # Errors
///
/// Returns [`TagSyntaxError::UnclosedParen`] when the parameter list never
/// closes.
pub fn find_marker(doc: &str, marker: &str) -> Result<MarkerMatch, TagSyntaxError> {
    if marker.is_empty() {
        return Ok(MarkerMatch::Absent);
    }
    let chars: Vec<char> = doc.chars().collect();
    let needle: Vec<char> = marker.chars().collect();
    let mut start = 0;
    while let Some(offset) = chars
        .get(start..)
        .and_then(|rest| rest.windows(needle.len()).position(|w| w == needle.as_slice()))
    {
        let at = start + offset;
        let end = at + needle.len();
        let before_ok = at == 0 || chars.get(at - 1).is_some_and(|c| c.is_whitespace());
        let after_ok = chars
            .get(end)
            .is_none_or(|c| c.is_whitespace() || *c == '(');
        if before_ok && after_ok {
            return params_after(chars.get(end..).unwrap_or_default()).map(MarkerMatch::Present);
        }
        start = at + 1;
    }
    Ok(MarkerMatch::Absent)
}

fn params_after(rest: &[char]) -> Result<String, TagSyntaxError> {
    let mut iter = rest.iter().skip_while(|c| **c == ' ' || **c == '\t').peekable();
    if iter.next_if_eq(&&'(').is_none() {
        return Ok(String::new());
    }
    let mut text = String::new();
    let mut in_quotes = false;
    let mut escaped = false;
    for &c in iter {
        if in_quotes {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_quotes = false;
            }
        } else if c == '"' {
            in_quotes = true;
        } else if c == ')' {
            return Ok(text);
        }
        text.push(c);
    }
    Err(TagSyntaxError::UnclosedParen)
}
