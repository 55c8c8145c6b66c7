//! # CML Syntax
//!
//! Lexical helpers for the CML rule language.
//!
//! Nothing here is a parser. The scanner looks at the text before the
//! caret and decides what kind of completion the user is asking for; the
//! highlighter colours tokens by lexical class. Both are pure functions
//! of their inputs and never fail: malformed input yields a suppressed
//! context or plain, escaped text.
//!
//! ## Why Not Tree-sitter?
//!
//! CML snippets are a few lines long and frequently half-typed. A
//! grammar would reject most of what the user sees while typing, and the
//! editor only needs token classes, so a hand-written lexer is enough.

mod highlight;
mod scanner;

pub use highlight::{HighlightKind, HighlightSpan, KEYWORDS, highlight, highlight_spans, to_markup};
pub use scanner::{
    ContextKey, ContextKind, ContextTrigger, EditorContext, ReferenceCategory, Scanner,
    Suppression, is_word_char,
};

use std::collections::HashSet;

/// Lookups the lexer needs from the surrounding suggestion pools.
///
/// The scanner resolves a human label typed before `[` into the
/// identifier it stands for, and both the scanner and the highlighter
/// need to know which bare words are attribute names.
pub trait SymbolLookup {
    /// Resolves a product or group label to its context key.
    fn context_for_label(&self, label: &str) -> Option<ContextKey>;

    /// Returns true if `name` is a known attribute.
    fn is_attribute(&self, name: &str) -> bool;
}

/// A lookup that knows nothing. Reference tokens still resolve because
/// they carry their identifier inline.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSymbols;

impl SymbolLookup for NoSymbols {
    fn context_for_label(&self, _label: &str) -> Option<ContextKey> {
        None
    }

    fn is_attribute(&self, _name: &str) -> bool {
        false
    }
}

/// A plain set of attribute names.
impl SymbolLookup for HashSet<String> {
    fn context_for_label(&self, _label: &str) -> Option<ContextKey> {
        None
    }

    fn is_attribute(&self, name: &str) -> bool {
        self.contains(name)
    }
}
