//! Snippet list grouped by statement keyword.
//!
//! A snippet lands in every section whose keyword occurs anywhere in its
//! text (case-insensitive); one that mentions none goes to Constraints.

use crate::store::{Snippet, SnippetKeyword};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetSection {
    pub keyword: SnippetKeyword,
    pub items: Vec<Snippet>,
    pub expanded: bool,
}

impl SnippetSection {
    pub fn key(&self) -> &'static str {
        self.keyword.section_key()
    }

    pub fn label(&self) -> &'static str {
        self.keyword.section_label()
    }

    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetSections {
    sections: Vec<SnippetSection>,
}

impl Default for SnippetSections {
    fn default() -> Self {
        Self {
            sections: SnippetKeyword::ALL
                .into_iter()
                .map(|keyword| SnippetSection {
                    keyword,
                    items: Vec::new(),
                    expanded: true,
                })
                .collect(),
        }
    }
}

impl SnippetSections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Regroups `snippets`, keeping each section's expanded flag.
    pub fn group(&mut self, snippets: &[Snippet]) {
        for section in &mut self.sections {
            section.items.clear();
        }

        for snippet in snippets {
            let text = snippet.cml_text.to_lowercase();
            let mut grouped = false;
            for section in &mut self.sections {
                if text.contains(section.keyword.keyword()) {
                    section.items.push(snippet.clone());
                    grouped = true;
                }
            }
            if !grouped {
                self.section_mut(SnippetKeyword::Constraint).items.push(snippet.clone());
            }
        }
    }

    pub fn sections(&self) -> &[SnippetSection] {
        &self.sections
    }

    pub fn section(&self, keyword: SnippetKeyword) -> &SnippetSection {
        // Sections are built from `SnippetKeyword::ALL` in order
        &self.sections[keyword_index(keyword)]
    }

    /// Flips a section open or closed. Returns false for an unknown key.
    pub fn toggle(&mut self, key: &str) -> bool {
        match SnippetKeyword::from_section_key(key) {
            Some(keyword) => {
                let section = self.section_mut(keyword);
                section.expanded = !section.expanded;
                true
            }
            None => false,
        }
    }

    fn section_mut(&mut self, keyword: SnippetKeyword) -> &mut SnippetSection {
        &mut self.sections[keyword_index(keyword)]
    }
}

fn keyword_index(keyword: SnippetKeyword) -> usize {
    match keyword {
        SnippetKeyword::Constraint => 0,
        SnippetKeyword::Require => 1,
        SnippetKeyword::Message => 2,
        SnippetKeyword::SetDefault => 3,
        SnippetKeyword::Rule => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn snippet(id: &str, text: &str) -> Snippet {
        Snippet {
            id: id.to_string(),
            label: id.to_string(),
            cml_text: text.to_string(),
        }
    }

    fn ids(sections: &SnippetSections, keyword: SnippetKeyword) -> Vec<&str> {
        sections.section(keyword).items.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_grouping_by_keyword() {
        let mut sections = SnippetSections::new();
        sections.group(&[
            snippet("a", "REQUIRE(Bundle[Laptop])"),
            snippet("b", "rule x; message(\"hi\")"),
            snippet("c", "x = 1"),
            snippet("d", "setDefault(color, \"Red\")"),
        ]);

        assert_eq!(ids(&sections, SnippetKeyword::Constraint), vec!["c"]);
        assert_eq!(ids(&sections, SnippetKeyword::Require), vec!["a"]);
        assert_eq!(ids(&sections, SnippetKeyword::Message), vec!["b"]);
        assert_eq!(ids(&sections, SnippetKeyword::SetDefault), vec!["d"]);
        assert_eq!(ids(&sections, SnippetKeyword::Rule), vec!["b"]);
    }

    #[test]
    fn test_regroup_keeps_expanded_flags() {
        let mut sections = SnippetSections::new();
        assert!(sections.toggle("require"));
        assert!(!sections.toggle("bogus"));
        sections.group(&[snippet("a", "require(x)")]);
        sections.group(&[]);
        let require = sections.section(SnippetKeyword::Require);
        assert!(!require.expanded);
        assert!(!require.has_items());
        assert_eq!(require.label(), "Require");
        assert!(sections.section(SnippetKeyword::Rule).expanded);
    }

    proptest! {
        #[test]
        fn prop_every_snippet_is_listed(texts in proptest::collection::vec("[a-zA-Z ()=]{0,30}", 0..12)) {
            let snippets: Vec<_> = texts
                .iter()
                .enumerate()
                .map(|(i, t)| snippet(&i.to_string(), t))
                .collect();
            let mut sections = SnippetSections::new();
            sections.group(&snippets);
            for s in &snippets {
                prop_assert!(sections.sections().iter().any(|sec| sec.items.contains(s)));
            }
        }
    }
}
