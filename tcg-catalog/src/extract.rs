//! Lenient extraction of typed values from object-literal text.
//!
//! Dump files are written in a loose object-literal dialect: `key: value` or
//! `key = value` pairs, single/double/backtick quoted strings, nested `{}` and
//! `[]`, line and block comments, and assorted statement noise such as
//! `import` lines or `const card: Card = { ... }` wrappers. Nothing here
//! validates that dialect. The scanner recovers whatever key/value structure
//! it can find and every extraction function is total: malformed input yields
//! empty or absent results, never an error or a panic.
//!
//! All slicing happens at ASCII delimiters, so arbitrary UTF-8 passes through
//! untouched.

use crate::types::{LocalizedText, PropertyMap};

/// Nesting depth past which brackets are skipped instead of parsed.
const MAX_DEPTH: usize = 48;

/// A scanned value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// Quoted string with its quotes removed and escapes resolved.
    Str(String),
    /// Unquoted token (`80`, `true`, `Card`, `undefined`).
    Bare(&'a str),
    /// `{ ... }` with its recovered entries and its source text.
    Object {
        entries: Vec<(String, Value<'a>)>,
        raw: &'a str,
    },
    /// `[ ... ]` with its recovered items and its source text.
    Array { items: Vec<Value<'a>>, raw: &'a str },
}

impl<'a> Value<'a> {
    /// Scalar text for strings and bare tokens; source text for containers.
    pub fn as_text(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            Value::Bare(s) => (*s).to_string(),
            Value::Object { raw, .. } | Value::Array { raw, .. } => (*raw).to_string(),
        }
    }

    /// Scalar text, or `None` for containers.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            Value::Bare(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_entries(&self) -> Option<&[(String, Value<'a>)]> {
        match self {
            Value::Object { entries, .. } => Some(entries),
            _ => None,
        }
    }

    pub fn as_items(&self) -> Option<&[Value<'a>]> {
        match self {
            Value::Array { items, .. } => Some(items),
            _ => None,
        }
    }

    /// First entry named `key` when this is an object.
    pub fn get(&self, key: &str) -> Option<&Value<'a>> {
        self.as_entries()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

/// Flatten an object's entries into a string map (first key wins).
fn flatten(entries: &[(String, Value<'_>)]) -> PropertyMap {
    let mut map = PropertyMap::new();
    for (key, value) in entries {
        map.entry(key.clone())
            .or_insert_with(|| value.as_text().trim().to_string());
    }
    map
}

fn parse_integer(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}

// ── Scanner ─────────────────────────────────────────────────────────────────

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

fn ends_bare(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b',' | b'}' | b']' | b'{' | b'[' | b';' | b')')
}

struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    /// Containers skipped because they nested too deeply.
    skipped: usize,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            skipped: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    /// Advance past one full character.
    fn bump_char(&mut self) {
        let len = self.src[self.pos..]
            .chars()
            .next()
            .map_or(1, char::len_utf8);
        self.pos = (self.pos + len).min(self.bytes.len());
    }

    /// Skip whitespace, `// line` and `/* block */` comments.
    fn skip_trivia(&mut self) {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(b), _) if b.is_ascii_whitespace() => self.pos += 1,
                (Some(b'/'), Some(b'/')) => {
                    while let Some(b) = self.peek() {
                        if b == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                (Some(b'/'), Some(b'*')) => {
                    self.pos += 2;
                    loop {
                        match (self.peek(), self.peek_at(1)) {
                            (None, _) => break,
                            (Some(b'*'), Some(b'/')) => {
                                self.pos += 2;
                                break;
                            }
                            _ => self.pos += 1,
                        }
                    }
                }
                _ => break,
            }
        }
    }

    /// Parse a quoted string starting at the opening quote. An unterminated
    /// string runs to end of input.
    fn parse_string(&mut self) -> String {
        let quote = self.bytes[self.pos];
        self.pos += 1;
        let mut out = String::new();
        let mut run_start = self.pos;
        while let Some(b) = self.peek() {
            if b == quote {
                out.push_str(&self.src[run_start..self.pos]);
                self.pos += 1;
                return out;
            }
            if b == b'\\' {
                out.push_str(&self.src[run_start..self.pos]);
                self.pos += 1;
                if self.peek().is_none() {
                    return out;
                }
                let start = self.pos;
                self.bump_char();
                match &self.src[start..self.pos] {
                    "n" => out.push('\n'),
                    "t" => out.push('\t'),
                    "r" => out.push('\r'),
                    other => out.push_str(other),
                }
                run_start = self.pos;
                continue;
            }
            self.pos += 1;
        }
        out.push_str(&self.src[run_start..self.pos]);
        out
    }

    fn parse_ident(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_byte) {
            self.pos += 1;
        }
        &self.src[start..self.pos]
    }

    /// Identifier or quoted key.
    fn parse_key(&mut self) -> Option<String> {
        match self.peek()? {
            b'\'' | b'"' | b'`' => Some(self.parse_string()),
            b if is_ident_byte(b) => Some(self.parse_ident().to_string()),
            _ => None,
        }
    }

    fn parse_bare(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(|b| !ends_bare(b)) {
            self.pos += 1;
        }
        &self.src[start..self.pos]
    }

    /// Parse one value at the cursor. Returns `None` when the cursor sits on
    /// a delimiter or at end of input.
    fn parse_value(&mut self, depth: usize) -> Option<Value<'a>> {
        self.skip_trivia();
        match self.peek()? {
            b'{' | b'[' if depth >= MAX_DEPTH => Some(self.skip_container()),
            b'{' => Some(self.parse_object(depth)),
            b'[' => Some(self.parse_array(depth)),
            b'\'' | b'"' | b'`' => Some(Value::Str(self.parse_string())),
            b'}' | b']' | b',' | b')' | b';' => None,
            _ => {
                let token = self.parse_bare();
                if token.is_empty() {
                    None
                } else {
                    Some(Value::Bare(token))
                }
            }
        }
    }

    fn parse_object(&mut self, depth: usize) -> Value<'a> {
        let start = self.pos;
        self.pos += 1;
        let mut entries = Vec::new();
        loop {
            self.skip_trivia();
            let before = self.pos;
            match self.peek() {
                None => break,
                Some(b'}') => {
                    self.pos += 1;
                    break;
                }
                Some(b',' | b';' | b']' | b')') => self.pos += 1,
                Some(_) => match self.parse_key() {
                    Some(key) => {
                        self.skip_trivia();
                        if matches!(self.peek(), Some(b':' | b'=')) {
                            self.pos += 1;
                            if let Some(value) = self.parse_value(depth + 1) {
                                entries.push((key, value));
                            }
                        }
                    }
                    None => {
                        // Not a key: consume whatever value sits here.
                        let _ = self.parse_value(depth + 1);
                    }
                },
            }
            if self.pos == before {
                self.bump_char();
            }
        }
        Value::Object {
            entries,
            raw: &self.src[start..self.pos],
        }
    }

    fn parse_array(&mut self, depth: usize) -> Value<'a> {
        let start = self.pos;
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            let before = self.pos;
            match self.peek() {
                None => break,
                Some(b']') => {
                    self.pos += 1;
                    break;
                }
                Some(b',' | b';' | b'}' | b')') => self.pos += 1,
                Some(_) => {
                    if let Some(item) = self.parse_value(depth + 1) {
                        items.push(item);
                    }
                }
            }
            if self.pos == before {
                self.bump_char();
            }
        }
        Value::Array {
            items,
            raw: &self.src[start..self.pos],
        }
    }

    /// Skip a too-deep container by bracket counting, without recursion.
    fn skip_container(&mut self) -> Value<'a> {
        let start = self.pos;
        let is_object = self.bytes[self.pos] == b'{';
        let mut open = 0usize;
        while let Some(b) = self.peek() {
            match b {
                b'{' | b'[' => {
                    open += 1;
                    self.pos += 1;
                }
                b'}' | b']' => {
                    open = open.saturating_sub(1);
                    self.pos += 1;
                    if open == 0 {
                        break;
                    }
                }
                b'\'' | b'"' | b'`' => {
                    self.parse_string();
                }
                _ => self.bump_char(),
            }
        }
        self.skipped += 1;
        let raw = &self.src[start..self.pos];
        if is_object {
            Value::Object {
                entries: Vec::new(),
                raw,
            }
        } else {
            Value::Array {
                items: Vec::new(),
                raw,
            }
        }
    }
}

// ── Document ────────────────────────────────────────────────────────────────

/// The recovered top-level entries of one source text.
///
/// Top-level `key: value` / `key = value` pairs are collected in order, and
/// the properties of any top-level `{ ... }` block are merged in as if they
/// were written at top level. For a repeated key the first occurrence wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document<'a> {
    entries: Vec<(String, Value<'a>)>,
    skipped: usize,
}

impl<'a> Document<'a> {
    pub fn parse(text: &'a str) -> Self {
        let mut scanner = Scanner::new(text);
        let mut entries = Vec::new();
        loop {
            scanner.skip_trivia();
            let before = scanner.pos;
            match scanner.peek() {
                None => break,
                Some(b'{') => {
                    if let Some(Value::Object { entries: inner, .. }) = scanner.parse_value(0) {
                        entries.extend(inner);
                    }
                }
                Some(b'\'' | b'"' | b'`') => {
                    scanner.parse_string();
                }
                Some(b) if is_ident_byte(b) => {
                    let key = scanner.parse_ident().to_string();
                    scanner.skip_trivia();
                    let separator = scanner.peek();
                    if matches!(separator, Some(b':' | b'=')) {
                        scanner.pos += 1;
                        if let Some(value) = scanner.parse_value(1) {
                            // `const card = { ... }` declares the record itself.
                            if separator == Some(b'=') {
                                if let Some(inner) = value.as_entries() {
                                    let inner = inner.to_vec();
                                    entries.push((key, value));
                                    entries.extend(inner);
                                    continue;
                                }
                            }
                            entries.push((key, value));
                        }
                    }
                }
                Some(_) => scanner.bump_char(),
            }
            if scanner.pos == before {
                scanner.bump_char();
            }
        }
        Self {
            entries,
            skipped: scanner.skipped,
        }
    }

    /// All recovered entries in source order, duplicates included.
    pub fn entries(&self) -> &[(String, Value<'a>)] {
        &self.entries
    }

    /// Containers skipped for nesting past the depth limit.
    pub fn skipped_containers(&self) -> usize {
        self.skipped
    }

    /// First top-level value named `key`.
    pub fn get(&self, key: &str) -> Option<&Value<'a>> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Nested object of quoted strings. Only non-empty string values count.
    pub fn localized_map(&self, key: &str) -> LocalizedText {
        let mut text = LocalizedText::new();
        let Some(entries) = self.get(key).and_then(Value::as_entries) else {
            return text;
        };
        for (language, value) in entries {
            if let Value::Str(s) = value {
                if !s.is_empty() && text.get(language).is_empty() {
                    text.set(language.clone(), s.clone());
                }
            }
        }
        text
    }

    /// Array of integers. Elements that do not parse are dropped.
    pub fn integer_list(&self, key: &str) -> Vec<i64> {
        self.get(key)
            .and_then(Value::as_items)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_scalar().and_then(parse_integer))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Array of objects, each flattened to a string map. Non-object elements
    /// are dropped; nested values keep their source text.
    pub fn object_list(&self, key: &str) -> Vec<PropertyMap> {
        self.get(key)
            .and_then(Value::as_items)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_entries)
                    .map(flatten)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Single nested object flattened to a string map.
    pub fn sub_object(&self, key: &str) -> PropertyMap {
        self.get(key)
            .and_then(Value::as_entries)
            .map(flatten)
            .unwrap_or_default()
    }

    /// Scalar text for `key`, or `""`.
    pub fn string(&self, key: &str) -> String {
        self.get(key)
            .and_then(Value::as_scalar)
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }

    pub fn integer(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_scalar).and_then(parse_integer)
    }

    /// Array of scalars as strings. A lone scalar becomes a one-element list.
    pub fn string_list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::Array { items, .. }) => items
                .iter()
                .map(|item| item.as_text().trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Some(value @ (Value::Str(_) | Value::Bare(_))) => {
                let text = value.as_text().trim().to_string();
                if text.is_empty() { Vec::new() } else { vec![text] }
            }
            _ => Vec::new(),
        }
    }

    /// The record's own `id`: a non-empty top-level scalar only. Nested
    /// objects such as `set: { id }` belong to other records.
    pub fn own_id(&self) -> Option<String> {
        let id = self.get("id")?.as_scalar()?.trim();
        (!id.is_empty()).then(|| id.to_string())
    }

    /// First `id` found: top level first, then depth-first through nested
    /// objects and arrays.
    pub fn first_id(&self) -> Option<String> {
        fn scalar_id(value: &Value<'_>) -> Option<String> {
            value
                .as_scalar()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        }

        fn search(value: &Value<'_>) -> Option<String> {
            match value {
                Value::Object { entries, .. } => entries
                    .iter()
                    .find(|(k, _)| k == "id")
                    .and_then(|(_, v)| scalar_id(v))
                    .or_else(|| entries.iter().find_map(|(_, v)| search(v))),
                Value::Array { items, .. } => items.iter().find_map(search),
                _ => None,
            }
        }

        self.get("id")
            .and_then(scalar_id)
            .or_else(|| self.entries.iter().find_map(|(_, v)| search(v)))
    }

    /// English name from `name: { en: ... }`, else `name` as a plain string.
    pub fn display_name(&self) -> Option<String> {
        let value = self.get("name")?;
        let name = match value {
            Value::Object { .. } => value.get("en")?.as_scalar()?.trim().to_string(),
            other => other.as_scalar()?.trim().to_string(),
        };
        (!name.is_empty()).then_some(name)
    }

    /// Every image-like property. Keys containing `image` contribute their
    /// nested entries (for objects) or themselves (for scalars).
    pub fn images(&self) -> PropertyMap {
        let mut map = PropertyMap::new();
        for (key, value) in &self.entries {
            if !key.to_ascii_lowercase().contains("image") {
                continue;
            }
            match value {
                Value::Object { entries, .. } => {
                    for (k, v) in flatten(entries) {
                        map.entry(k).or_insert(v);
                    }
                }
                Value::Array { .. } => {}
                scalar => {
                    map.entry(key.clone())
                        .or_insert_with(|| scalar.as_text().trim().to_string());
                }
            }
        }
        map
    }
}

// ── One-shot helpers ────────────────────────────────────────────────────────

pub fn extract_localized_map(text: &str, key: &str) -> LocalizedText {
    Document::parse(text).localized_map(key)
}

pub fn extract_integer_list(text: &str, key: &str) -> Vec<i64> {
    Document::parse(text).integer_list(key)
}

pub fn extract_object_list(text: &str, key: &str) -> Vec<PropertyMap> {
    Document::parse(text).object_list(key)
}

pub fn extract_sub_object(text: &str, key: &str) -> PropertyMap {
    Document::parse(text).sub_object(key)
}

pub fn extract_string(text: &str, key: &str) -> String {
    Document::parse(text).string(key)
}

pub fn extract_integer(text: &str, key: &str) -> Option<i64> {
    Document::parse(text).integer(key)
}

pub fn extract_string_list(text: &str, key: &str) -> Vec<String> {
    Document::parse(text).string_list(key)
}

pub fn extract_first_id(text: &str) -> Option<String> {
    Document::parse(text).first_id()
}

pub fn extract_display_name(text: &str) -> Option<String> {
    Document::parse(text).display_name()
}

pub fn extract_images(text: &str) -> PropertyMap {
    Document::parse(text).images()
}
