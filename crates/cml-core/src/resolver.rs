//! Suggestion resolution.
//!
//! `resolve` is side-effect free: it never fetches. For a context trigger
//! whose pool is not cached it returns what it can (nothing) plus a
//! [`ContextRequest`] for the caller to fulfil. Results keep pool order.

use cml_syntax::{ContextKey, ContextKind, EditorContext};
use serde::Serialize;

use crate::pools::SuggestionPools;
use crate::suggestion::SuggestionItem;

/// A contextual pool the host should fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextRequest {
    pub key: ContextKey,
    /// What the user has typed inside the context so far
    pub search_term: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub options: Vec<SuggestionItem>,
    pub request: Option<ContextRequest>,
}

/// Resolves the options for a caret context.
pub fn resolve(context: &EditorContext, pools: &SuggestionPools) -> Resolution {
    match &context.kind {
        ContextKind::Suppressed(_) => Resolution::default(),

        ContextKind::Word => {
            let needle = context.current_word.to_lowercase();
            let options = pools
                .merged()
                .into_iter()
                .filter(|item| item.matches(&needle, false))
                .cloned()
                .collect();
            Resolution {
                options,
                request: None,
            }
        }

        ContextKind::Trigger(trigger) => match pools.contextual_for(&trigger.key) {
            // Same trigger, only the partial moved: re-filter locally
            Some(items) => Resolution {
                options: filter_contextual(items, &trigger.inner_partial),
                request: None,
            },
            None => Resolution {
                options: Vec::new(),
                request: Some(ContextRequest {
                    key: trigger.key.clone(),
                    search_term: trigger.inner_partial.clone(),
                }),
            },
        },
    }
}

/// Filters a contextual pool by the partial typed inside the trigger.
/// An empty partial keeps everything.
pub fn filter_contextual(items: &[SuggestionItem], partial: &str) -> Vec<SuggestionItem> {
    let needle = partial.to_lowercase();
    items
        .iter()
        .filter(|item| item.matches(&needle, true))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suggestion::SuggestionKind;
    use cml_syntax::Scanner;

    fn pools() -> SuggestionPools {
        let mut pools = SuggestionPools::new();
        pools.set_attributes(vec![
            SuggestionItem::new("width", SuggestionKind::Attribute),
            SuggestionItem::new("weight", SuggestionKind::Attribute).with_display_name("Weight (kg)"),
            SuggestionItem::new("color", SuggestionKind::Attribute),
        ]);
        pools.set_products(vec![
            SuggestionItem::new("REL_ProductComponentGroup_42", SuggestionKind::ProductComponentGroup)
                .with_actual_name("Bundle"),
        ]);
        pools
    }

    fn context(text: &str, pools: &SuggestionPools) -> EditorContext {
        Scanner::default().scan(text, text.chars().count(), pools)
    }

    fn values(resolution: &Resolution) -> Vec<&str> {
        resolution.options.iter().map(|i| i.value.as_str()).collect()
    }

    #[test]
    fn test_word_filters_static_pool_in_order() {
        let pools = pools();
        let resolution = resolve(&context("x = W", &pools), &pools);
        assert!(resolution.options.is_empty());

        let resolution = resolve(&context("x = WE", &pools), &pools);
        assert_eq!(values(&resolution), vec!["weight"]);

        let resolution = resolve(&context("x = kg", &pools), &pools);
        assert_eq!(values(&resolution), vec!["weight"]);

        let resolution = resolve(&context("x = wi", &pools), &pools);
        assert_eq!(values(&resolution), vec!["width"]);
        assert!(resolution.request.is_none());
    }

    #[test]
    fn test_uncached_trigger_requests_fetch() {
        let pools = pools();
        let resolution = resolve(&context("Bundle[wi", &pools), &pools);
        assert!(resolution.options.is_empty());
        let request = resolution.request.unwrap();
        assert_eq!(request.key.prefix_token(), "REL_ProductComponentGroup_42");
        assert_eq!(request.search_term, "wi");
    }

    #[test]
    fn test_cached_trigger_refilters_without_fetch() {
        let mut pools = pools();
        let key = ContextKey::reference("REL_ProductComponentGroup_42").unwrap();
        pools.set_contextual(
            key,
            vec![
                SuggestionItem::new("01tA", SuggestionKind::Product).with_actual_name("Widget"),
                SuggestionItem::new("01tB", SuggestionKind::Product).with_actual_name("Gadget"),
            ],
        );

        let resolution = resolve(&context("REL_ProductComponentGroup_42[wid", &pools), &pools);
        assert!(resolution.request.is_none());
        assert_eq!(values(&resolution), vec!["01tA"]);

        let resolution = resolve(&context("REL_ProductComponentGroup_42[", &pools), &pools);
        assert_eq!(values(&resolution), vec!["01tA", "01tB"]);
    }

    #[test]
    fn test_cache_for_other_trigger_is_ignored() {
        let mut pools = pools();
        pools.set_contextual(
            ContextKey::reference("REL_ProductComponentGroup_1").unwrap(),
            vec![SuggestionItem::new("01tA", SuggestionKind::Product)],
        );
        let resolution = resolve(&context("REL_ProductComponentGroup_42[", &pools), &pools);
        assert!(resolution.options.is_empty());
        assert!(resolution.request.is_some());
    }

    #[test]
    fn test_suppressed_resolves_to_nothing() {
        let pools = pools();
        let resolution = resolve(&context("Nope[wi", &pools), &pools);
        assert_eq!(resolution, Resolution::default());
    }
}
