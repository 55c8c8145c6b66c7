//! Label ⇄ identifier translation.
//!
//! Persisted CML refers to products by opaque ids; the editor shows their
//! labels. The table collects every identifier-bearing suggestion seen in
//! the session and rewrites whole texts at the load and save boundaries.
//!
//! ## Collisions
//!
//! - The first registration of a label (or of an id) wins. Later entries
//!   that reuse it are ignored in that direction, so a table never changes
//!   its mind about a name it has already translated.
//! - Substitution is a single pass with longer names tried first, so
//!   `Box Large` beats `Box`, and replaced text is never re-scanned.
//! - Matches are whole-word: a name is not replaced inside a longer
//!   identifier.

use aho_corasick::AhoCorasick;
use cml_syntax::is_word_char;
use std::collections::HashMap;

use crate::suggestion::{IdMapping, SuggestionItem};

#[derive(Debug, Clone, Default)]
pub struct TranslationTable {
    /// actual_name -> value
    to_id: HashMap<String, String>,
    /// value -> actual_name
    to_label: HashMap<String, String>,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_id.is_empty() && self.to_label.is_empty()
    }

    /// Records a label/id pair. Returns true if either direction learned
    /// something new.
    pub fn register(&mut self, label: &str, id: &str) -> bool {
        if label.is_empty() || id.is_empty() || label == id {
            return false;
        }

        let mut learned = false;
        match self.to_id.get(label) {
            None => {
                self.to_id.insert(label.to_string(), id.to_string());
                learned = true;
            }
            Some(existing) if existing != id => {
                tracing::debug!(label, existing = %existing, ignored = id, "label already mapped");
            }
            Some(_) => {}
        }
        if !self.to_label.contains_key(id) {
            self.to_label.insert(id.to_string(), label.to_string());
            learned = true;
        }
        learned
    }

    pub fn register_mapping(&mut self, mapping: &IdMapping) -> bool {
        self.register(&mapping.display_name, &mapping.actual_value)
    }

    /// Registers every identifier-bearing item; others are skipped.
    pub fn register_items<'a>(&mut self, items: impl IntoIterator<Item = &'a SuggestionItem>) -> usize {
        items
            .into_iter()
            .filter_map(SuggestionItem::id_mapping)
            .filter(|mapping| self.register_mapping(mapping))
            .count()
    }

    pub fn id_for(&self, label: &str) -> Option<&str> {
        self.to_id.get(label).map(String::as_str)
    }

    pub fn label_for(&self, id: &str) -> Option<&str> {
        self.to_label.get(id).map(String::as_str)
    }

    /// Rewrites labels to ids, for saving.
    pub fn to_storage_form(&self, text: &str) -> String {
        substitute(text, &self.to_id)
    }

    /// Rewrites ids to labels, for loading into the editor.
    pub fn to_display_form(&self, text: &str) -> String {
        substitute(text, &self.to_label)
    }
}

/// Replaces every whole-word occurrence of a key in `table`, taking the
/// longest candidate at the leftmost position. Scans `text` once, so the
/// output is never matched again.
fn substitute(text: &str, table: &HashMap<String, String>) -> String {
    if table.is_empty() || text.is_empty() {
        return text.to_string();
    }

    let names: Vec<&str> = table.keys().map(String::as_str).collect();
    let automaton = match AhoCorasick::new(&names) {
        Ok(automaton) => automaton,
        Err(err) => {
            tracing::warn!(error = %err, names = names.len(), "translation automaton not built");
            return text.to_string();
        }
    };

    // Longest whole-word match starting at each byte offset, as (end, name)
    let mut best: Vec<Option<(usize, usize)>> = vec![None; text.len()];
    for found in automaton.find_overlapping_iter(text) {
        let (start, end) = (found.start(), found.end());
        if !at_word_edges(text, start, end) {
            continue;
        }
        let slot = &mut best[start];
        if slot.is_none_or(|(longest, _)| end > longest) {
            *slot = Some((end, found.pattern().as_usize()));
        }
    }

    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut at = 0;
    while at < text.len() {
        match best[at] {
            Some((end, name)) => {
                out.push_str(&text[copied..at]);
                out.push_str(&table[names[name]]);
                copied = end;
                at = end;
            }
            None => at += 1,
        }
    }
    out.push_str(&text[copied..]);
    out
}

/// Whether `text[start..end]` stands alone as a word. Only edges that are
/// word characters are checked; a name ending in `)` may touch anything.
fn at_word_edges(text: &str, start: usize, end: usize) -> bool {
    let is_word = |c: Option<char>| c.is_some_and(is_word_char);
    let name = &text[start..end];
    let lead_ok = !(is_word(name.chars().next()) && is_word(text[..start].chars().next_back()));
    let trail_ok = !(is_word(name.chars().next_back()) && is_word(text[end..].chars().next()));
    lead_ok && trail_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suggestion::SuggestionKind;
    use proptest::prelude::*;

    fn table() -> TranslationTable {
        let mut table = TranslationTable::new();
        table.register("Laptop", "01tLAPTOP");
        table.register("Bundle", "REL_ProductComponentGroup_42");
        table.register("Box", "01tBOX");
        table.register("Box Large", "01tBOXL");
        table
    }

    #[test]
    fn test_storage_and_display_forms() {
        let table = table();
        let display = "require(Bundle[Laptop], Box Large) and Box";
        let storage = table.to_storage_form(display);
        assert_eq!(
            storage,
            "require(REL_ProductComponentGroup_42[01tLAPTOP], 01tBOXL) and 01tBOX"
        );
        assert_eq!(table.to_display_form(&storage), display);
    }

    #[test]
    fn test_whole_word_only() {
        let table = table();
        assert_eq!(
            table.to_storage_form("Laptops LaptopX Laptop_1 Laptop"),
            "Laptops LaptopX Laptop_1 01tLAPTOP"
        );
    }

    #[test]
    fn test_names_with_punctuation() {
        let mut table = TranslationTable::new();
        table.register("Wi-Fi (5G)", "01tWIFI");
        assert_eq!(
            table.to_storage_form("x = Wi-Fi (5G);"),
            "x = 01tWIFI;"
        );
    }

    #[test]
    fn test_first_registration_wins() {
        let mut table = TranslationTable::new();
        assert!(table.register("Laptop", "01tA"));
        assert!(table.register("Laptop", "01tB"));
        assert!(!table.register("Laptop", "01tA"));
        assert_eq!(table.id_for("Laptop"), Some("01tA"));
        assert_eq!(table.label_for("01tB"), Some("Laptop"));
        assert_eq!(table.to_storage_form("Laptop"), "01tA");

        // New label, known id: only the label direction learns
        assert!(table.register("Notebook", "01tA"));
        assert_eq!(table.id_for("Notebook"), Some("01tA"));
        assert_eq!(table.label_for("01tA"), Some("Laptop"));
    }

    #[test]
    fn test_identity_and_empty_pairs_are_ignored() {
        let mut table = TranslationTable::new();
        assert!(!table.register("width", "width"));
        assert!(!table.register("", "x"));
        assert!(table.is_empty());
        assert_eq!(table.to_display_form("width"), "width");
    }

    #[test]
    fn test_single_pass_does_not_chain() {
        // A label that equals another entry's id is replaced once only.
        let mut table = TranslationTable::new();
        table.register("A1", "B1");
        table.register("B1", "C1");
        assert_eq!(table.to_storage_form("A1 B1"), "B1 C1");
    }

    #[test]
    fn test_large_table_translates() {
        let mut table = TranslationTable::new();
        for i in 0..20_000 {
            table.register(&format!("Product Label Number {i:06} Deluxe"), &format!("01t{i:015}AAA"));
        }
        assert_eq!(table.len(), 20_000);

        let display = "require(Product Label Number 000007 Deluxe, Product Label Number 019999 Deluxe)";
        let storage = table.to_storage_form(display);
        assert_eq!(storage, "require(01t000000000000007AAA, 01t000000000019999AAA)");
        assert_eq!(table.to_display_form(&storage), display);
    }

    #[test]
    fn test_unicode_neighbours_block_a_match() {
        let mut table = TranslationTable::new();
        table.register("Box", "01tBOX");
        assert_eq!(table.to_storage_form("éBox Box_é (Box)"), "éBox Box_é (01tBOX)");
    }

    #[test]
    fn test_register_items_skips_plain_kinds() {
        let mut table = TranslationTable::new();
        let items = vec![
            SuggestionItem::new("width", SuggestionKind::Attribute).with_actual_name("Width"),
            SuggestionItem::new("01tA", SuggestionKind::Product).with_actual_name("Laptop"),
            SuggestionItem::new("Red", SuggestionKind::Picklist),
        ];
        assert_eq!(table.register_items(&items), 1);
        assert_eq!(table.len(), 1);
    }

    proptest! {
        #[test]
        fn prop_round_trip(words in proptest::collection::vec(
            prop_oneof![
                Just("Laptop"), Just("Bundle"), Just("Box"), Just("Box Large"),
                Just("=="), Just("require("), Just(")"), Just("42"), Just("size"),
            ],
            0..24,
        )) {
            let table = table();
            let text = words.join(" ");
            let storage = table.to_storage_form(&text);
            prop_assert_eq!(table.to_display_form(&storage), text.clone());

            let display = table.to_display_form(&storage);
            prop_assert_eq!(table.to_storage_form(&display), storage);
        }
    }
}
