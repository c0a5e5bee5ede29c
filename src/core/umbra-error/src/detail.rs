//! Encoding of structured error fields inside a canonical `detail`.
//!
//! A structured detail has the form
//!
//! ```text
//! tag: key1=value1;key2=value2
//! ```
//!
//! * `tag` and every key match `[a-z][a-z0-9_]*`.
//! * Values escape `%` as `%25`, `;` as `%3B` and `=` as `%3D`.
//! * Fields keep the order in which they were encoded.
//!
//! A tagged plain-text detail has the form `tag: free text`, where the text is
//! copied verbatim.
//!
//! [`parse`] only accepts a string when re-encoding the parsed fields yields
//! the identical string, so a detail that merely looks structured is never
//! rewritten during translation.

/// A decoded structured detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Structured {
    /// Variant tag.
    pub tag: String,
    /// Ordered `(key, value)` pairs.
    pub fields: Vec<(String, String)>,
}

impl Structured {
    /// Returns the value of a field by key.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the field values if the keys are exactly `keys`, in order.
    pub fn exact(&self, keys: &[&str]) -> Option<Vec<&str>> {
        if self.fields.len() != keys.len() {
            return None;
        }
        self.fields
            .iter()
            .zip(keys)
            .map(|((k, v), expected)| (k.as_str() == *expected).then_some(v.as_str()))
            .collect()
    }

    /// Returns the field value parsed as an unsigned integer in canonical decimal form.
    pub fn number(&self, key: &str) -> Option<usize> {
        let raw = self.field(key)?;
        let value: usize = raw.parse().ok()?;
        (value.to_string() == raw).then_some(value)
    }
}

const SEPARATOR: &str = ": ";

/// Encodes a tag and its fields.
pub fn encode(tag: &str, fields: &[(&str, &str)]) -> String {
    let body: Vec<String> = fields
        .iter()
        .map(|(k, v)| format!("{}={}", k, escape(v)))
        .collect();
    format!("{}{}{}", tag, SEPARATOR, body.join(";"))
}

/// Parses a structured detail carrying the given tag.
pub fn parse(detail: &str, tag: &str) -> Option<Structured> {
    let body = strip_tag(detail, tag)?;
    if body.is_empty() {
        return None;
    }

    let mut fields = Vec::new();
    for pair in body.split(';') {
        let (key, value) = pair.split_once('=')?;
        if !is_identifier(key) {
            return None;
        }
        fields.push((key.to_string(), unescape(value)?));
    }

    let borrowed: Vec<(&str, &str)> = fields
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    if encode(tag, &borrowed) != detail {
        return None;
    }

    Some(Structured {
        tag: tag.to_string(),
        fields,
    })
}

/// Prefixes free text with a tag.
pub fn tagged(tag: &str, text: &str) -> String {
    format!("{}{}{}", tag, SEPARATOR, text)
}

/// Returns the text following `tag: `, if the detail carries that tag.
pub fn strip_tag<'a>(detail: &'a str, tag: &str) -> Option<&'a str> {
    detail.strip_prefix(tag)?.strip_prefix(SEPARATOR)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '%' => out.push_str("%25"),
            ';' => out.push_str("%3B"),
            '=' => out.push_str("%3D"),
            other => out.push(other),
        }
    }
    out
}

fn unescape(value: &str) -> Option<String> {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let code = rest.get(pos + 1..pos + 3)?;
        match code {
            "25" => out.push('%'),
            "3B" => out.push(';'),
            "3D" => out.push('='),
            _ => return None,
        }
        rest = &rest[pos + 3..];
    }
    out.push_str(rest);
    Some(out)
}
