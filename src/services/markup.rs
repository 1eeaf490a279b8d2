// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Low-level markup scanning helpers.
//!
//! These are deliberately small: they tokenise start tags, read the `class`
//! attribute, and pull text out of an element. They make no attempt at full
//! HTML parsing and assume the markup served by the race site's activity feed.

/// A start tag found in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartTag<'a> {
    /// Lowercase-insensitive tag name as written (e.g. `div`, `H4`)
    pub name: &'a str,
    /// Raw attribute text between the name and the closing `>`
    pub attrs: &'a str,
    /// Byte offset of `<`
    pub start: usize,
    /// Byte offset just past `>`
    pub end: usize,
}

impl<'a> StartTag<'a> {
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Whitespace-separated tokens of the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &'a str> {
        attr_value(self.attrs, "class")
            .unwrap_or("")
            .split_ascii_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }
}

/// Iterate over start tags in `s`, skipping end tags, comments and doctypes.
pub fn start_tags(s: &str) -> StartTags<'_> {
    StartTags { src: s, pos: 0 }
}

pub struct StartTags<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Iterator for StartTags<'a> {
    type Item = StartTag<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let rel = self.src.get(self.pos..)?.find('<')?;
            let start = self.pos + rel;
            if self.src[start..].starts_with(COMMENT_OPEN) {
                self.pos = comment_end(self.src, start)?;
                continue;
            }
            let close = start + self.src[start..].find('>')?;
            self.pos = close + 1;

            let body = &self.src[start + 1..close];
            let name_len = body
                .find(|c: char| c.is_ascii_whitespace() || c == '/')
                .unwrap_or(body.len());
            let name = &body[..name_len];
            if name.is_empty() || !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
                continue;
            }

            return Some(StartTag {
                name,
                attrs: body[name_len..].trim_end_matches('/'),
                start,
                end: close + 1,
            });
        }
    }
}

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";

/// Offset just past the `-->` closing the comment opened at `start`.
fn comment_end(s: &str, start: usize) -> Option<usize> {
    let body = start + COMMENT_OPEN.len();
    s.get(body..)?
        .find(COMMENT_CLOSE)
        .map(|rel| body + rel + COMMENT_CLOSE.len())
}

/// Read attribute `name` from raw attribute text. Handles `"..."`, `'...'`
/// and unquoted values.
fn attr_value<'a>(attrs: &'a str, name: &str) -> Option<&'a str> {
    let bytes = attrs.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let key_start = i;
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'=' {
            i += 1;
        }
        let key = &attrs[key_start..i];
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] != b'=' {
            // Bare attribute (no value)
            if key.eq_ignore_ascii_case(name) {
                return Some("");
            }
            continue;
        }
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let (value_start, value_end) = match bytes.get(i) {
            Some(&q) if q == b'"' || q == b'\'' => {
                let value_start = i + 1;
                let len = attrs[value_start..]
                    .find(q as char)
                    .unwrap_or(attrs.len() - value_start);
                i = value_start + len + 1;
                (value_start, value_start + len)
            }
            _ => {
                let value_start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                (value_start, i)
            }
        };
        if key.eq_ignore_ascii_case(name) {
            return Some(&attrs[value_start..value_end.min(attrs.len())]);
        }
    }
    None
}

/// Inner markup of the element opened by `tag`, up to its matching end tag.
///
/// Nested elements with the same name are balanced. If no end tag is found
/// the rest of the document is returned.
pub fn inner_markup<'a>(s: &'a str, tag: &StartTag<'_>) -> &'a str {
    let open_pat = format!("<{}", tag.name.to_ascii_lowercase());
    let close_pat = format!("</{}", tag.name.to_ascii_lowercase());
    let lc = s.to_ascii_lowercase();

    let mut depth = 1usize;
    let mut pos = tag.end;
    while let Some(rel) = lc.get(pos..).and_then(|rest| rest.find('<')) {
        let at = pos + rel;
        if lc[at..].starts_with(&close_pat) && is_name_boundary(&lc, at + close_pat.len()) {
            depth -= 1;
            if depth == 0 {
                return &s[tag.end..at];
            }
        } else if lc[at..].starts_with(&open_pat) && is_name_boundary(&lc, at + open_pat.len()) {
            depth += 1;
        }
        pos = at + 1;
    }
    &s[tag.end..]
}

fn is_name_boundary(s: &str, idx: usize) -> bool {
    s.as_bytes()
        .get(idx)
        .map_or(true, |b| b.is_ascii_whitespace() || *b == b'>' || *b == b'/')
}

/// Remove all tags, decode the common entities and collapse whitespace.
pub fn text_content(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut in_tag = false;
    let mut pos = 0;
    while let Some(ch) = markup[pos..].chars().next() {
        if ch == '<' && markup[pos..].starts_with(COMMENT_OPEN) {
            match comment_end(markup, pos) {
                Some(end) => {
                    pos = end;
                    continue;
                }
                None => break,
            }
        }
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
        pos += ch.len_utf8();
    }
    let decoded = out
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}
