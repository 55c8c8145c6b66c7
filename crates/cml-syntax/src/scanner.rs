//! Caret-context scanner.
//!
//! Decides, from the text before the caret alone, which completion the
//! user is asking for:
//!
//! ```text
//! price = wi|                         -> Word("wi")
//! REL_ProductComponentGroup_42[wid|   -> Trigger(Reference 42, "wid")
//! Bundle[wid|                         -> Trigger(label "Bundle" resolved via lookup)
//! color == "Re|                       -> Trigger(Picklist color, "Re")
//! Unknown[x|                          -> Suppressed(UnresolvedBracket)
//! ```
//!
//! Offsets are character offsets. Word characters are Unicode
//! alphanumerics plus `_`.

use serde::{Deserialize, Serialize};

use crate::SymbolLookup;

/// Which family of product reference a context key points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceCategory {
    ProductComponentGroup,
    ProductRelatedComponent,
}

impl ReferenceCategory {
    pub const ALL: [ReferenceCategory; 2] = [
        ReferenceCategory::ProductComponentGroup,
        ReferenceCategory::ProductRelatedComponent,
    ];

    /// The identifier prefix that marks a reference token of this category.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::ProductComponentGroup => "REL_ProductComponentGroup_",
            Self::ProductRelatedComponent => "REL_ProductRelatedComponent_",
        }
    }

    /// Classifies a whole token, e.g. `REL_ProductComponentGroup_42`.
    ///
    /// The prefix alone is not a reference; at least one word character
    /// must follow it.
    pub fn of_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| {
            token
                .strip_prefix(category.prefix())
                .is_some_and(|rest| !rest.is_empty() && rest.chars().all(is_word_char))
        })
    }
}

/// What a contextual fetch is keyed by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContextKey {
    /// Members of a product group or related component.
    Reference {
        token: String,
        category: ReferenceCategory,
    },
    /// Picklist values of an attribute.
    Picklist { attribute: String },
}

impl ContextKey {
    /// Builds a reference key from an identifier, if it is one.
    pub fn reference(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        ReferenceCategory::of_token(&token).map(|category| Self::Reference { token, category })
    }

    /// The token the context hangs off: the identifier or the attribute name.
    pub fn prefix_token(&self) -> &str {
        match self {
            Self::Reference { token, .. } => token,
            Self::Picklist { attribute } => attribute,
        }
    }
}

impl std::fmt::Display for ContextKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reference { token, .. } => write!(f, "{token}"),
            Self::Picklist { attribute } => write!(f, "picklist:{attribute}"),
        }
    }
}

/// A bracket or picklist context that switches the suggestion source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextTrigger {
    pub key: ContextKey,
    /// Text typed between the opening `[` (or quote) and the caret.
    pub inner_partial: String,
}

/// Why the popup must stay hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Suppression {
    /// Caret offset beyond the end of the text.
    MalformedCaret,
    /// No word characters directly before the caret.
    NoWord,
    /// A word shorter than the minimum completion length.
    WordTooShort,
    /// Inside `[` but the prefix is not a known product or group.
    UnresolvedBracket,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ContextKind {
    Word,
    Trigger(ContextTrigger),
    Suppressed(Suppression),
}

/// Everything the resolver and editor need to know about one keystroke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditorContext {
    pub caret_offset: usize,
    /// The filter term: the bare word, or the partial inside a trigger.
    pub current_word: String,
    /// Where an accepted suggestion starts replacing text.
    pub replace_start: usize,
    pub kind: ContextKind,
}

impl EditorContext {
    fn suppressed(caret_offset: usize, reason: Suppression) -> Self {
        Self {
            caret_offset,
            current_word: String::new(),
            replace_start: caret_offset,
            kind: ContextKind::Suppressed(reason),
        }
    }

    pub fn trigger(&self) -> Option<&ContextTrigger> {
        match &self.kind {
            ContextKind::Trigger(trigger) => Some(trigger),
            _ => None,
        }
    }

    pub fn is_suppressed(&self) -> bool {
        matches!(self.kind, ContextKind::Suppressed(_))
    }
}

/// Scans the text around the caret.
#[derive(Debug, Clone, Copy)]
pub struct Scanner {
    min_word_len: usize,
}

impl Default for Scanner {
    fn default() -> Self {
        Self { min_word_len: 2 }
    }
}

impl Scanner {
    pub fn new(min_word_len: usize) -> Self {
        Self { min_word_len }
    }

    pub fn min_word_len(&self) -> usize {
        self.min_word_len
    }

    /// Computes the caret context for `text` with the caret at `caret`
    /// (a character offset).
    pub fn scan<S>(&self, text: &str, caret: usize, symbols: &S) -> EditorContext
    where
        S: SymbolLookup + ?Sized,
    {
        let Some(byte_caret) = byte_offset(text, caret) else {
            tracing::debug!(caret, "caret beyond end of text");
            return EditorContext::suppressed(caret, Suppression::MalformedCaret);
        };
        let before = &text[..byte_caret];

        if let Some(open) = unterminated_bracket(before) {
            return self.scan_bracket(before, open, caret, symbols);
        }

        if let Some(context) = scan_picklist(before, caret, symbols) {
            return context;
        }

        let word = trailing_word(before);
        let len = word.chars().count();
        if len == 0 {
            return EditorContext::suppressed(caret, Suppression::NoWord);
        }
        if len < self.min_word_len {
            return EditorContext::suppressed(caret, Suppression::WordTooShort);
        }

        EditorContext {
            caret_offset: caret,
            current_word: word.to_string(),
            replace_start: caret - len,
            kind: ContextKind::Word,
        }
    }

    fn scan_bracket<S>(&self, before: &str, open: usize, caret: usize, symbols: &S) -> EditorContext
    where
        S: SymbolLookup + ?Sized,
    {
        let inner = &before[open + 1..];
        let prefix = trailing_word(before[..open].trim_end());

        let key = reference_suffix(prefix)
            .and_then(ContextKey::reference)
            .or_else(|| {
                if prefix.is_empty() {
                    None
                } else {
                    symbols.context_for_label(prefix)
                }
            });

        let Some(key) = key else {
            tracing::debug!(prefix, "bracket without a known context");
            return EditorContext::suppressed(caret, Suppression::UnresolvedBracket);
        };

        tracing::debug!(%key, inner, "context trigger");
        let replace_len = trailing_word(inner).chars().count();
        EditorContext {
            caret_offset: caret,
            current_word: inner.to_string(),
            replace_start: caret - replace_len,
            kind: ContextKind::Trigger(ContextTrigger {
                key,
                inner_partial: inner.to_string(),
            }),
        }
    }
}

/// Returns true for characters that make up identifiers and keywords.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Maps a character offset to a byte offset; `None` when out of range.
fn byte_offset(text: &str, caret: usize) -> Option<usize> {
    text.char_indices()
        .map(|(idx, _)| idx)
        .chain(std::iter::once(text.len()))
        .nth(caret)
}

/// The maximal run of word characters at the end of `s`.
fn trailing_word(s: &str) -> &str {
    let start = s
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_word_char(*c))
        .last()
        .map_or(s.len(), |(idx, _)| idx);
    &s[start..]
}

/// Byte index of the innermost `[` with no `]` between it and the end.
/// Brackets inside string literals are text, not structure.
fn unterminated_bracket(before: &str) -> Option<usize> {
    let mut bracket = None;
    let mut quote: Option<char> = None;
    let mut chars = before.char_indices();

    while let Some((idx, c)) = chars.next() {
        match quote {
            Some(_) if c == '\n' => quote = None,
            Some(_) if c == '\\' => {
                chars.next();
            }
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' => quote = Some(c),
                '[' => bracket = Some(idx),
                ']' => bracket = None,
                _ => {}
            },
        }
    }

    bracket
}

/// The leftmost reference token that runs to the end of `word`.
///
/// `xREL_ProductComponentGroup_1` yields `REL_ProductComponentGroup_1`.
fn reference_suffix(word: &str) -> Option<&str> {
    word.match_indices("REL_Product")
        .map(|(idx, _)| &word[idx..])
        .find(|candidate| ReferenceCategory::of_token(candidate).is_some())
}

/// Detects `attribute == "partial|` where the literal is still open.
fn scan_picklist<S>(before: &str, caret: usize, symbols: &S) -> Option<EditorContext>
where
    S: SymbolLookup + ?Sized,
{
    let quote_at = open_string_start(before)?;
    let partial = &before[quote_at + 1..];

    let lhs = before[..quote_at].trim_end();
    let operator_start = lhs
        .char_indices()
        .rev()
        .take_while(|(_, c)| matches!(c, '=' | '!'))
        .last()
        .map(|(idx, _)| idx)?;
    if !matches!(&lhs[operator_start..], "=" | "==" | "!=") {
        return None;
    }

    let attribute = trailing_word(lhs[..operator_start].trim_end());
    if attribute.is_empty() || !symbols.is_attribute(attribute) {
        return None;
    }

    let key = ContextKey::Picklist {
        attribute: attribute.to_string(),
    };
    tracing::debug!(%key, partial, "picklist trigger");
    Some(EditorContext {
        caret_offset: caret,
        current_word: partial.to_string(),
        replace_start: caret - partial.chars().count(),
        kind: ContextKind::Trigger(ContextTrigger {
            key,
            inner_partial: partial.to_string(),
        }),
    })
}

/// Byte index of the opening quote of a literal still open at the end of
/// `before`. Literals end at their closing quote or at a newline, and a
/// backslash escapes the next character.
fn open_string_start(before: &str) -> Option<usize> {
    let mut open: Option<(usize, char)> = None;
    let mut chars = before.char_indices();

    while let Some((idx, c)) = chars.next() {
        match open {
            Some(_) if c == '\n' => open = None,
            Some(_) if c == '\\' => {
                chars.next();
            }
            Some((_, quote)) if c == quote => open = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => open = Some((idx, c)),
            None => {}
        }
    }

    open.map(|(idx, _)| idx)
}
