//! Lexical syntax highlighting.
//!
//! The text is cut into spans in a single left-to-right pass, then
//! rendered as HTML-escaped markup. Because classification happens on a
//! token stream, no class can ever be applied inside another class's
//! markup.
//!
//! When a word could belong to several classes the earlier entry wins:
//!
//! 1. keyword (case-insensitive)
//! 2. string literal
//! 3. number
//! 4. function call (identifier followed by `(`)
//! 5. operator run
//! 6. product reference (`REL_ProductComponentGroup_…`)
//! 7. known attribute name

use std::fmt::Write as _;

use crate::SymbolLookup;
use crate::scanner::{ReferenceCategory, is_word_char};

/// The fixed CML keyword set.
pub const KEYWORDS: [&str; 10] = [
    "constraint",
    "require",
    "message",
    "setdefault",
    "rule",
    "when",
    "then",
    "and",
    "or",
    "not",
];

const OPERATOR_CHARS: &[char] = &['+', '-', '*', '/', '%', '=', '<', '>', '!', '&', '|'];

/// A highlighted span of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSpan {
    /// Start byte offset
    pub start: usize,
    /// End byte offset
    pub end: usize,
    pub kind: HighlightKind,
}

/// Lexical classes of CML text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightKind {
    Keyword,
    String,
    Number,
    Function,
    Operator,
    Reference,
    Attribute,
}

impl HighlightKind {
    /// CSS class suffix; the stylesheet predates the `Reference` name.
    pub fn class_name(&self) -> &'static str {
        match self {
            HighlightKind::Keyword => "keyword",
            HighlightKind::String => "string",
            HighlightKind::Number => "number",
            HighlightKind::Function => "function",
            HighlightKind::Operator => "operator",
            HighlightKind::Reference => "product",
            HighlightKind::Attribute => "attribute",
        }
    }
}

/// Highlights `text` into markup with the default `syntax-` class prefix.
///
/// Deterministic: the same text and symbols always give the same bytes.
pub fn highlight<S>(text: &str, symbols: &S) -> String
where
    S: SymbolLookup + ?Sized,
{
    to_markup(text, &highlight_spans(text, symbols), "syntax-")
}

/// Renders spans over `text` as escaped markup.
///
/// Spans must be sorted and non-overlapping, as `highlight_spans`
/// produces them.
pub fn to_markup(text: &str, spans: &[HighlightSpan], class_prefix: &str) -> String {
    let mut out = String::with_capacity(text.len() + spans.len() * 32);
    let mut cursor = 0;

    for span in spans {
        escape_into(&mut out, &text[cursor..span.start]);
        let _ = write!(out, "<span class=\"{class_prefix}{}\">", span.kind.class_name());
        escape_into(&mut out, &text[span.start..span.end]);
        out.push_str("</span>");
        cursor = span.end;
    }
    escape_into(&mut out, &text[cursor..]);
    out
}

/// Classifies `text` into highlight spans (byte offsets).
pub fn highlight_spans<S>(text: &str, symbols: &S) -> Vec<HighlightSpan>
where
    S: SymbolLookup + ?Sized,
{
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let byte_at = |i: usize| chars.get(i).map_or(text.len(), |(idx, _)| *idx);

    let mut spans = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i].1;

        if c == '"' || c == '\'' {
            if let Some(close) = closing_quote(&chars, i) {
                spans.push(HighlightSpan {
                    start: byte_at(i),
                    end: byte_at(close + 1),
                    kind: HighlightKind::String,
                });
                i = close + 1;
            } else {
                i += 1;
            }
            continue;
        }

        if is_word_char(c) {
            let mut end = i;
            while end < chars.len() && is_word_char(chars[end].1) {
                end += 1;
            }
            let word = &text[byte_at(i)..byte_at(end)];

            if word.chars().all(|c| c.is_ascii_digit()) {
                // Optional fraction: `10.5`
                if end + 1 < chars.len()
                    && chars[end].1 == '.'
                    && chars[end + 1].1.is_ascii_digit()
                {
                    end += 1;
                    while end < chars.len() && chars[end].1.is_ascii_digit() {
                        end += 1;
                    }
                }
                // `10abc` is not a number
                if end >= chars.len() || !is_word_char(chars[end].1) {
                    spans.push(HighlightSpan {
                        start: byte_at(i),
                        end: byte_at(end),
                        kind: HighlightKind::Number,
                    });
                }
            } else if let Some(kind) = classify_word(word, calls_function(&chars, end), symbols) {
                spans.push(HighlightSpan {
                    start: byte_at(i),
                    end: byte_at(end),
                    kind,
                });
            }
            i = end;
            continue;
        }

        if OPERATOR_CHARS.contains(&c) {
            let mut end = i;
            while end < chars.len() && OPERATOR_CHARS.contains(&chars[end].1) {
                end += 1;
            }
            spans.push(HighlightSpan {
                start: byte_at(i),
                end: byte_at(end),
                kind: HighlightKind::Operator,
            });
            i = end;
            continue;
        }

        i += 1;
    }

    spans
}

fn classify_word<S>(word: &str, followed_by_paren: bool, symbols: &S) -> Option<HighlightKind>
where
    S: SymbolLookup + ?Sized,
{
    if KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(word)) {
        return Some(HighlightKind::Keyword);
    }
    let starts_like_identifier = word
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_');
    if followed_by_paren && starts_like_identifier {
        return Some(HighlightKind::Function);
    }
    if ReferenceCategory::of_token(word).is_some() {
        return Some(HighlightKind::Reference);
    }
    if symbols.is_attribute(word) {
        return Some(HighlightKind::Attribute);
    }
    None
}

/// True when the next non-whitespace character after `end` is `(`.
fn calls_function(chars: &[(usize, char)], end: usize) -> bool {
    chars[end..]
        .iter()
        .find(|(_, c)| !c.is_whitespace())
        .is_some_and(|(_, c)| *c == '(')
}

/// Index of the quote closing the literal opened at `open`. Literals do
/// not span lines; a backslash escapes the next character.
fn closing_quote(chars: &[(usize, char)], open: usize) -> Option<usize> {
    let quote = chars[open].1;
    let mut j = open + 1;
    while j < chars.len() {
        match chars[j].1 {
            '\n' => return None,
            '\\' => j += 2,
            c if c == quote => return Some(j),
            _ => j += 1,
        }
    }
    None
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}
