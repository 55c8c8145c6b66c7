//! Suggestion providers.

use async_trait::async_trait;
use cml_core::{ContextKey, RawSuggestion, ReferenceCategory};
use serde::{Deserialize, Serialize};

use crate::ServiceResult;

/// The record an editor session is scoped to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordContext {
    pub record_id: String,
    pub object_api_name: String,
}

impl RecordContext {
    pub fn new(record_id: impl Into<String>, object_api_name: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            object_api_name: object_api_name.into(),
        }
    }
}

/// Source of suggestion pools.
///
/// Payloads are returned raw; the studio normalizes them on arrival.
#[async_trait]
pub trait SuggestionProvider: Send + Sync {
    /// Attribute-style names for the record and object.
    async fn attribute_suggestions(&self, record: &RecordContext) -> ServiceResult<Vec<RawSuggestion>>;

    /// Product-component names for the record.
    async fn product_suggestions(&self, record: &RecordContext) -> ServiceResult<Vec<RawSuggestion>>;

    /// Members of a product group or related component.
    async fn contextual_suggestions(
        &self,
        token: &str,
        category: ReferenceCategory,
    ) -> ServiceResult<Vec<RawSuggestion>>;

    /// Allowed values of a picklist attribute.
    async fn picklist_values(&self, attribute: &str) -> ServiceResult<Vec<RawSuggestion>>;
}

/// A finished contextual fetch, tagged with the trigger it was made for.
#[derive(Debug)]
pub struct ContextResponse {
    pub key: ContextKey,
    pub result: ServiceResult<Vec<RawSuggestion>>,
}

/// Dispatches a context key to the matching provider call.
pub async fn fetch_for_key(
    provider: &dyn SuggestionProvider,
    key: &ContextKey,
) -> ServiceResult<Vec<RawSuggestion>> {
    match key {
        ContextKey::Reference { token, category } => {
            provider.contextual_suggestions(token, *category).await
        }
        ContextKey::Picklist { attribute } => provider.picklist_values(attribute).await,
    }
}
