//! Suggestion items and their normalization at the provider boundary.
//!
//! Providers may send a bare string or an object with optional fields.
//! Both are turned into a [`SuggestionItem`] once, on the way in, so the
//! rest of the engine never inspects the shape of an item.

use cml_syntax::{ContextKey, ReferenceCategory};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What a suggestion refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SuggestionKind {
    Attribute,
    ProductComponentGroup,
    Product,
    ProductRelatedComponent,
    Picklist,
}

impl SuggestionKind {
    /// Kinds whose `value` is an opaque id edited under its label.
    pub fn is_identifier_bearing(self) -> bool {
        matches!(
            self,
            Self::ProductComponentGroup | Self::Product | Self::ProductRelatedComponent
        )
    }

    /// Kinds whose label may open a bracket context (`Label[`).
    pub fn opens_context(self) -> bool {
        matches!(self, Self::ProductComponentGroup | Self::Product)
    }
}

/// One row of a suggestion pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionItem {
    /// Stored form: an id for identifier-bearing kinds, else the token
    pub value: String,
    /// Label shown in the popup
    pub display_name: String,
    /// Label inserted in place of `value`
    pub actual_name: String,
    /// Advisory row color
    pub color: String,
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
}

impl SuggestionItem {
    pub fn new(value: impl Into<String>, kind: SuggestionKind) -> Self {
        let value = value.into();
        Self {
            display_name: value.clone(),
            actual_name: value.clone(),
            value,
            color: "black".to_string(),
            kind,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_actual_name(mut self, actual_name: impl Into<String>) -> Self {
        self.actual_name = actual_name.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// The text spliced into the editor when this item is accepted.
    pub fn insertion_text(&self) -> &str {
        if self.kind.is_identifier_bearing() {
            &self.actual_name
        } else {
            &self.value
        }
    }

    /// Case-insensitive substring match; `needle` must be lowercase.
    ///
    /// `actual_name` is only searched in contextual pools.
    pub fn matches(&self, needle: &str, include_actual_name: bool) -> bool {
        needle.is_empty()
            || self.value.to_lowercase().contains(needle)
            || self.display_name.to_lowercase().contains(needle)
            || (include_actual_name && self.actual_name.to_lowercase().contains(needle))
    }

    /// The context this item opens when its label precedes `[`.
    pub fn context_key(&self) -> Option<ContextKey> {
        if !self.kind.opens_context() {
            return None;
        }
        let category = ReferenceCategory::of_token(&self.value).unwrap_or(match self.kind {
            SuggestionKind::ProductComponentGroup => ReferenceCategory::ProductComponentGroup,
            _ => ReferenceCategory::ProductRelatedComponent,
        });
        Some(ContextKey::Reference {
            token: self.value.clone(),
            category,
        })
    }

    /// The label/id pair this item contributes to translation, if any.
    pub fn id_mapping(&self) -> Option<IdMapping> {
        self.kind.is_identifier_bearing().then(|| IdMapping {
            display_name: self.actual_name.clone(),
            actual_value: self.value.clone(),
            kind: self.kind,
        })
    }
}

/// A label inserted in place of an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdMapping {
    pub display_name: String,
    pub actual_value: String,
    pub kind: SuggestionKind,
}

/// A suggestion as a provider sends it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawSuggestion {
    Plain(String),
    Full(RawFields),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFields {
    pub value: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub actual_name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<SuggestionKind>,
}

impl RawSuggestion {
    /// Fills in defaults. Items without a value are dropped.
    pub fn normalize(self, default_kind: SuggestionKind, default_color: &str) -> Option<SuggestionItem> {
        let fields = match self {
            RawSuggestion::Plain(value) => RawFields {
                value,
                display_name: None,
                actual_name: None,
                color: None,
                kind: None,
            },
            RawSuggestion::Full(fields) => fields,
        };

        if fields.value.is_empty() {
            return None;
        }

        let non_empty = |s: Option<String>| s.filter(|s| !s.is_empty());
        Some(SuggestionItem {
            display_name: non_empty(fields.display_name).unwrap_or_else(|| fields.value.clone()),
            actual_name: non_empty(fields.actual_name).unwrap_or_else(|| fields.value.clone()),
            color: non_empty(fields.color).unwrap_or_else(|| default_color.to_string()),
            kind: fields.kind.unwrap_or(default_kind),
            value: fields.value,
        })
    }

    /// Normalizes a whole pool, keeping the first item for each value.
    pub fn normalize_pool(
        raw: impl IntoIterator<Item = RawSuggestion>,
        default_kind: SuggestionKind,
        default_color: &str,
    ) -> Vec<SuggestionItem> {
        let mut seen = HashSet::new();
        raw.into_iter()
            .filter_map(|r| r.normalize(default_kind, default_color))
            .filter(|item| {
                let fresh = seen.insert(item.value.clone());
                if !fresh {
                    tracing::debug!(value = %item.value, "duplicate suggestion dropped");
                }
                fresh
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_and_full_payloads_normalize_to_one_shape() {
        let raw: Vec<RawSuggestion> = serde_json::from_str(
            r#"[
                "width",
                {"value": "REL_ProductComponentGroup_1", "displayName": "Bundle (group)",
                 "actualName": "Bundle", "color": "blue", "type": "ProductComponentGroup"},
                {"value": "height", "displayName": ""},
                {"value": ""},
                "width"
            ]"#,
        )
        .unwrap();

        let items = RawSuggestion::normalize_pool(raw, SuggestionKind::Attribute, "gray");
        assert_eq!(items.len(), 3);
        assert_eq!(items[0], SuggestionItem::new("width", SuggestionKind::Attribute).with_color("gray"));
        assert_eq!(items[1].actual_name, "Bundle");
        assert_eq!(items[1].kind, SuggestionKind::ProductComponentGroup);
        assert_eq!(items[1].color, "blue");
        assert_eq!(items[2].display_name, "height");
    }

    #[test]
    fn test_insertion_text_by_kind() {
        let attr = SuggestionItem::new("width", SuggestionKind::Attribute).with_actual_name("W");
        assert_eq!(attr.insertion_text(), "width");
        let pick = SuggestionItem::new("Red", SuggestionKind::Picklist).with_actual_name("r");
        assert_eq!(pick.insertion_text(), "Red");
        for kind in [
            SuggestionKind::ProductComponentGroup,
            SuggestionKind::Product,
            SuggestionKind::ProductRelatedComponent,
        ] {
            let item = SuggestionItem::new("01tXX", kind).with_actual_name("Laptop");
            assert_eq!(item.insertion_text(), "Laptop");
            assert_eq!(item.id_mapping().unwrap().actual_value, "01tXX");
        }
        assert!(attr.id_mapping().is_none());
    }

    #[test]
    fn test_context_key_category() {
        let group = SuggestionItem::new("REL_ProductRelatedComponent_5", SuggestionKind::ProductComponentGroup);
        assert_eq!(
            group.context_key(),
            Some(ContextKey::Reference {
                token: "REL_ProductRelatedComponent_5".to_string(),
                category: ReferenceCategory::ProductRelatedComponent,
            })
        );
        let product = SuggestionItem::new("01tA", SuggestionKind::Product);
        assert_eq!(
            product.context_key(),
            Some(ContextKey::Reference {
                token: "01tA".to_string(),
                category: ReferenceCategory::ProductRelatedComponent,
            })
        );
        let related = SuggestionItem::new("REL_ProductRelatedComponent_5", SuggestionKind::ProductRelatedComponent);
        assert!(related.context_key().is_none());
    }

    #[test]
    fn test_matches() {
        let item = SuggestionItem::new("REL_X_1", SuggestionKind::Product)
            .with_display_name("Laptop Pro")
            .with_actual_name("Notebook");
        assert!(item.matches("laptop", false));
        assert!(item.matches("rel_x", false));
        assert!(!item.matches("note", false));
        assert!(item.matches("note", true));
        assert!(item.matches("", false));
    }
}
