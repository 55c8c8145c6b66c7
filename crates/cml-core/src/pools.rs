//! Suggestion pools.
//!
//! The two provider-fed pools are stored separately and merged on read,
//! so refreshing one never duplicates or reorders the other. A contextual
//! pool lives in its own overlay slot, tagged with the trigger it was
//! fetched for; it never replaces the base pools.

use cml_syntax::{ContextKey, SymbolLookup};
use std::collections::{HashMap, HashSet};

use crate::suggestion::{SuggestionItem, SuggestionKind};

/// Items fetched for one context trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextualPool {
    pub key: ContextKey,
    pub items: Vec<SuggestionItem>,
}

#[derive(Debug, Clone, Default)]
pub struct SuggestionPools {
    /// Attribute-style suggestions for the record/object
    attributes: Vec<SuggestionItem>,
    /// Product-component suggestions for the record
    products: Vec<SuggestionItem>,
    /// Overlay for the active bracket or picklist trigger
    contextual: Option<ContextualPool>,
    /// Lookup tables over attributes and products
    base_symbols: SymbolIndex,
    /// Lookup tables over the contextual overlay
    contextual_symbols: SymbolIndex,
}

/// Names the highlighter asks about, indexed once per pool update.
#[derive(Debug, Clone, Default)]
struct SymbolIndex {
    attributes: HashSet<String>,
    /// actual_name -> context of the first item with that label that opens one
    labels: HashMap<String, ContextKey>,
}

impl SymbolIndex {
    fn build<'a>(items: impl IntoIterator<Item = &'a SuggestionItem>) -> Self {
        let mut index = Self::default();
        for item in items {
            if item.kind == SuggestionKind::Attribute {
                index.attributes.insert(item.value.clone());
            }
            if let Some(key) = item.context_key() {
                index.labels.entry(item.actual_name.clone()).or_insert(key);
            }
        }
        index
    }
}

impl SuggestionPools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_attributes(&mut self, items: Vec<SuggestionItem>) {
        self.attributes = items;
        self.reindex_base();
    }

    pub fn set_products(&mut self, items: Vec<SuggestionItem>) {
        self.products = items;
        self.reindex_base();
    }

    fn reindex_base(&mut self) {
        self.base_symbols = SymbolIndex::build(self.attributes.iter().chain(&self.products));
    }

    pub fn attributes(&self) -> &[SuggestionItem] {
        &self.attributes
    }

    pub fn products(&self) -> &[SuggestionItem] {
        &self.products
    }

    /// The static pool: attributes then products, first item per value.
    pub fn merged(&self) -> Vec<&SuggestionItem> {
        let mut seen = HashSet::new();
        self.attributes
            .iter()
            .chain(&self.products)
            .filter(|item| seen.insert(item.value.as_str()))
            .collect()
    }

    pub fn contextual(&self) -> Option<&ContextualPool> {
        self.contextual.as_ref()
    }

    /// The cached contextual items, only if they were fetched for `key`.
    pub fn contextual_for(&self, key: &ContextKey) -> Option<&[SuggestionItem]> {
        self.contextual
            .as_ref()
            .filter(|pool| &pool.key == key)
            .map(|pool| pool.items.as_slice())
    }

    pub fn set_contextual(&mut self, key: ContextKey, items: Vec<SuggestionItem>) {
        self.contextual_symbols = SymbolIndex::build(&items);
        self.contextual = Some(ContextualPool { key, items });
    }

    pub fn clear_contextual(&mut self) {
        self.contextual = None;
        self.contextual_symbols = SymbolIndex::default();
    }
}

/// Base pools answer first; the overlay only fills gaps.
impl SymbolLookup for SuggestionPools {
    fn context_for_label(&self, label: &str) -> Option<ContextKey> {
        self.base_symbols
            .labels
            .get(label)
            .or_else(|| self.contextual_symbols.labels.get(label))
            .cloned()
    }

    fn is_attribute(&self, name: &str) -> bool {
        self.base_symbols.attributes.contains(name) || self.contextual_symbols.attributes.contains(name)
    }
}
