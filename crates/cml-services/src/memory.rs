//! In-memory collaborators: a provider fed from a pool file, a snippet
//! store, and a notifier that keeps what it is sent.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use cml_core::{RawSuggestion, ReferenceCategory, SuggestionItem, SuggestionKind};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::notify::{Notification, NotificationSink};
use crate::provider::{RecordContext, SuggestionProvider};
use crate::store::{Snippet, SnippetKeyword, SnippetStore};
use crate::{ServiceError, ServiceResult};

/// Every pool a provider can serve, as one JSON document:
///
/// ```json
/// {
///   "attributes": ["width", {"value": "color", "color": "green"}],
///   "products": [{"value": "REL_ProductComponentGroup_1", "actualName": "Bundle",
///                 "type": "ProductComponentGroup"}],
///   "contextual": {"REL_ProductComponentGroup_1": [{"value": "01tA", "actualName": "Laptop"}]},
///   "picklists": {"color": ["Red", "Blue"]}
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PoolFile {
    pub attributes: Vec<RawSuggestion>,
    pub products: Vec<RawSuggestion>,
    /// Keyed by reference token
    pub contextual: HashMap<String, Vec<RawSuggestion>>,
    /// Keyed by attribute name
    pub picklists: HashMap<String, Vec<RawSuggestion>>,
}

impl PoolFile {
    pub fn from_json(json: &str) -> ServiceResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> ServiceResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Every identifier-bearing item in the file, normalized. Used to
    /// translate text without an interactive session.
    pub fn identifier_items(&self, default_color: &str) -> Vec<SuggestionItem> {
        let products = RawSuggestion::normalize_pool(self.products.clone(), SuggestionKind::Product, default_color);
        let mut tokens: Vec<_> = self.contextual.keys().collect();
        tokens.sort();
        let contextual = tokens.into_iter().flat_map(|token| {
            RawSuggestion::normalize_pool(
                self.contextual[token].clone(),
                SuggestionKind::Product,
                default_color,
            )
        });
        products
            .into_iter()
            .chain(contextual)
            .filter(|item| item.kind.is_identifier_bearing())
            .collect()
    }
}

/// Serves fixed pools.
#[derive(Debug, Clone, Default)]
pub struct StaticSuggestions {
    pools: PoolFile,
}

impl StaticSuggestions {
    pub fn new(pools: PoolFile) -> Self {
        Self { pools }
    }

    pub fn pools(&self) -> &PoolFile {
        &self.pools
    }
}

#[async_trait]
impl SuggestionProvider for StaticSuggestions {
    async fn attribute_suggestions(&self, _record: &RecordContext) -> ServiceResult<Vec<RawSuggestion>> {
        Ok(self.pools.attributes.clone())
    }

    async fn product_suggestions(&self, _record: &RecordContext) -> ServiceResult<Vec<RawSuggestion>> {
        Ok(self.pools.products.clone())
    }

    async fn contextual_suggestions(
        &self,
        token: &str,
        _category: ReferenceCategory,
    ) -> ServiceResult<Vec<RawSuggestion>> {
        Ok(self.pools.contextual.get(token).cloned().unwrap_or_default())
    }

    async fn picklist_values(&self, attribute: &str) -> ServiceResult<Vec<RawSuggestion>> {
        Ok(self.pools.picklists.get(attribute).cloned().unwrap_or_default())
    }
}

#[derive(Debug, Clone)]
struct StoredSnippet {
    record: RecordContext,
    snippet: Snippet,
}

/// Snippets held in memory, in creation order.
#[derive(Debug, Default)]
pub struct MemorySnippetStore {
    snippets: RwLock<Vec<StoredSnippet>>,
}

impl MemorySnippetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an existing snippet, e.g. when seeding from disk.
    pub async fn insert(&self, record: &RecordContext, snippet: Snippet) {
        self.snippets.write().await.push(StoredSnippet {
            record: record.clone(),
            snippet,
        });
    }

    pub async fn get(&self, id: &str) -> Option<Snippet> {
        self.snippets
            .read()
            .await
            .iter()
            .find(|s| s.snippet.id == id)
            .map(|s| s.snippet.clone())
    }
}

#[async_trait]
impl SnippetStore for MemorySnippetStore {
    async fn create(
        &self,
        record: &RecordContext,
        keyword: SnippetKeyword,
        label: &str,
    ) -> ServiceResult<Snippet> {
        let snippet = Snippet {
            id: uuid::Uuid::new_v4().to_string(),
            label: label.to_string(),
            cml_text: keyword.keyword().to_string(),
        };
        self.insert(record, snippet.clone()).await;
        tracing::info!(id = %snippet.id, label, "snippet created");
        Ok(snippet)
    }

    async fn save(&self, id: &str, label: &str, cml_text: &str) -> ServiceResult<()> {
        let mut snippets = self.snippets.write().await;
        let stored = snippets
            .iter_mut()
            .find(|s| s.snippet.id == id)
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))?;
        stored.snippet.label = label.to_string();
        stored.snippet.cml_text = cml_text.to_string();
        tracing::info!(id, label, "snippet saved");
        Ok(())
    }

    async fn delete(&self, id: &str) -> ServiceResult<()> {
        let mut snippets = self.snippets.write().await;
        let before = snippets.len();
        snippets.retain(|s| s.snippet.id != id);
        if snippets.len() == before {
            return Err(ServiceError::NotFound(id.to_string()));
        }
        tracing::info!(id, "snippet deleted");
        Ok(())
    }

    async fn list(&self, record: &RecordContext, search_term: &str) -> ServiceResult<Vec<Snippet>> {
        let needle = search_term.trim().to_lowercase();
        Ok(self
            .snippets
            .read()
            .await
            .iter()
            .filter(|s| &s.record == record)
            .filter(|s| {
                needle.is_empty()
                    || s.snippet.label.to_lowercase().contains(&needle)
                    || s.snippet.cml_text.to_lowercase().contains(&needle)
            })
            .map(|s| s.snippet.clone())
            .collect())
    }
}

/// Keeps every notification it receives.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl CollectingNotifier {
    /// Removes and returns everything received so far.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.sent.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl NotificationSink for CollectingNotifier {
    fn notify(&self, notification: Notification) {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const POOLS: &str = r#"{
        "attributes": ["width", {"value": "color", "color": "green"}],
        "products": [
            {"value": "REL_ProductComponentGroup_1", "actualName": "Bundle", "type": "ProductComponentGroup"},
            {"value": "01tP", "actualName": "Printer"}
        ],
        "contextual": {"REL_ProductComponentGroup_1": [{"value": "01tA", "actualName": "Laptop"}]},
        "picklists": {"color": ["Red", "Blue"]}
    }"#;

    fn record() -> RecordContext {
        RecordContext::new("001", "Product2")
    }

    #[test]
    fn test_pool_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(POOLS.as_bytes()).unwrap();
        let pools = PoolFile::load(file.path()).unwrap();
        assert_eq!(pools.attributes.len(), 2);
        assert_eq!(pools.picklists["color"].len(), 2);

        let ids: Vec<_> = pools
            .identifier_items("black")
            .into_iter()
            .map(|i| (i.actual_name, i.value))
            .collect();
        assert_eq!(
            ids,
            vec![
                ("Bundle".to_string(), "REL_ProductComponentGroup_1".to_string()),
                ("Printer".to_string(), "01tP".to_string()),
                ("Laptop".to_string(), "01tA".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_pool_file() {
        let pools = PoolFile::from_json("{}").unwrap();
        assert!(pools.attributes.is_empty());
        assert!(PoolFile::from_json("[").is_err());
    }

    #[tokio::test]
    async fn test_static_provider() {
        let provider = StaticSuggestions::new(PoolFile::from_json(POOLS).unwrap());
        assert_eq!(provider.attribute_suggestions(&record()).await.unwrap().len(), 2);
        let members = provider
            .contextual_suggestions("REL_ProductComponentGroup_1", ReferenceCategory::ProductComponentGroup)
            .await
            .unwrap();
        assert_eq!(members.len(), 1);
        assert!(provider.picklist_values("size").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_crud_and_search() {
        let store = MemorySnippetStore::new();
        let other = RecordContext::new("002", "Product2");
        let a = store.create(&record(), SnippetKeyword::Require, "Needs laptop").await.unwrap();
        store.create(&other, SnippetKeyword::Rule, "Elsewhere").await.unwrap();
        assert_eq!(a.cml_text, "require");

        store.save(&a.id, "Needs laptop", "require(01tA)").await.unwrap();
        assert_eq!(store.get(&a.id).await.unwrap().cml_text, "require(01tA)");

        assert_eq!(store.list(&record(), "").await.unwrap().len(), 1);
        assert_eq!(store.list(&record(), "LAPTOP").await.unwrap().len(), 1);
        assert!(store.list(&record(), "rule").await.unwrap().is_empty());

        store.delete(&a.id).await.unwrap();
        assert!(matches!(store.delete(&a.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(
            store.save(&a.id, "x", "y").await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn test_collecting_notifier() {
        let notifier = CollectingNotifier::default();
        notifier.notify(Notification::info("hello"));
        assert_eq!(notifier.take().len(), 1);
        assert!(notifier.take().is_empty());
    }
}
