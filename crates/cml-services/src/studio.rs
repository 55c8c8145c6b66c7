//! The studio: one editor session over one record.
//!
//! Owns the [`CodeEditor`] and the [`TranslationTable`], and talks to
//! the injected provider, store and notifier. Text enters the editor in
//! display form and leaves it in storage form; the studio is the only
//! place either conversion happens.
//!
//! Contextual fetches are split in three so the host decides how to run
//! them: [`Studio::input`] yields a request, [`Studio::fetch_context`]
//! turns it into a detached future, and [`Studio::apply_context`] lands
//! the response if its trigger is still current.

use std::future::Future;
use std::sync::Arc;

use cml_core::{
    Acceptance, CodeEditor, Config, ContextKey, ContextRequest, CoreError, EditorKey,
    KeyOutcome, RawSuggestion, SuggestionItem, SuggestionKind, TranslationTable,
};

use crate::notify::{Notification, NotificationSink};
use crate::provider::{ContextResponse, RecordContext, SuggestionProvider, fetch_for_key};
use crate::sections::SnippetSections;
use crate::store::{Snippet, SnippetKeyword, SnippetStore};
use crate::{ServiceError, ServiceResult};

pub struct Studio {
    provider: Arc<dyn SuggestionProvider>,
    store: Arc<dyn SnippetStore>,
    notifier: Arc<dyn NotificationSink>,
    record: RecordContext,

    editor: CodeEditor,
    translations: TranslationTable,

    /// Snippet currently in the editor
    current: Option<Snippet>,

    snippets: Vec<Snippet>,
    sections: SnippetSections,
    search_term: String,
    default_color: String,
}

impl Studio {
    pub fn new(
        record: RecordContext,
        provider: Arc<dyn SuggestionProvider>,
        store: Arc<dyn SnippetStore>,
        notifier: Arc<dyn NotificationSink>,
        config: &Config,
    ) -> Self {
        Self {
            provider,
            store,
            notifier,
            record,
            editor: CodeEditor::with_config(config),
            translations: TranslationTable::new(),
            current: None,
            snippets: Vec::new(),
            sections: SnippetSections::new(),
            search_term: String::new(),
            default_color: config.popup.default_color.clone(),
        }
    }

    // ==================== Accessors ====================

    pub fn editor(&self) -> &CodeEditor {
        &self.editor
    }

    pub fn translations(&self) -> &TranslationTable {
        &self.translations
    }

    pub fn record(&self) -> &RecordContext {
        &self.record
    }

    pub fn current_snippet(&self) -> Option<&Snippet> {
        self.current.as_ref()
    }

    pub fn snippets(&self) -> &[Snippet] {
        &self.snippets
    }

    pub fn sections(&self) -> &SnippetSections {
        &self.sections
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    // ==================== Suggestion Pools ====================

    /// Fetches both base pools. A pool whose fetch fails keeps its
    /// previous contents.
    pub async fn refresh_pools(&mut self) {
        match self.provider.attribute_suggestions(&self.record).await {
            Ok(raw) => {
                let items = self.normalize(raw, SuggestionKind::Attribute);
                self.translations.register_items(&items);
                self.editor.set_attribute_pool(items);
            }
            Err(err) => tracing::warn!(error = %err, "attribute suggestions unavailable"),
        }

        match self.provider.product_suggestions(&self.record).await {
            Ok(raw) => {
                let items = self.normalize(raw, SuggestionKind::Product);
                self.translations.register_items(&items);
                self.editor.set_product_pool(items);
            }
            Err(err) => tracing::warn!(error = %err, "product suggestions unavailable"),
        }
    }

    /// Starts the fetch for `request`. The future owns everything it
    /// needs, so it can be spawned or awaited out of order.
    pub fn fetch_context(
        &self,
        request: &ContextRequest,
    ) -> impl Future<Output = ContextResponse> + Send + use<> {
        let provider = Arc::clone(&self.provider);
        let key = request.key.clone();
        async move {
            let result = fetch_for_key(provider.as_ref(), &key).await;
            ContextResponse { key, result }
        }
    }

    /// Lands a finished fetch. Returns true if it reached the popup.
    ///
    /// Responses for a superseded trigger are dropped, as are failed
    /// fetches; neither touches the popup.
    pub fn apply_context(&mut self, response: ContextResponse) -> bool {
        let ContextResponse { key, result } = response;
        if self.editor.active_context() != Some(&key) {
            tracing::debug!(%key, "dropping stale contextual response");
            return false;
        }

        let raw = match result {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(%key, error = %err, "contextual fetch failed");
                return false;
            }
        };

        let items = match &key {
            ContextKey::Reference { .. } => self.normalize(raw, SuggestionKind::Product),
            ContextKey::Picklist { .. } => self
                .normalize(raw, SuggestionKind::Picklist)
                .into_iter()
                .map(|mut item| {
                    item.kind = SuggestionKind::Picklist;
                    item
                })
                .collect(),
        };
        self.translations.register_items(&items);
        self.editor.apply_context(key, items)
    }

    fn normalize(&self, raw: Vec<RawSuggestion>, default_kind: SuggestionKind) -> Vec<SuggestionItem> {
        RawSuggestion::normalize_pool(raw, default_kind, &self.default_color)
    }

    // ==================== Editor Input ====================

    /// Feeds an input event to the editor; see [`CodeEditor::input`].
    pub fn input(&mut self, text: &str, caret: usize) -> Option<ContextRequest> {
        self.editor.input(text, caret)
    }

    /// Input followed by an inline fetch, for hosts without their own
    /// task scheduling.
    pub async fn input_and_fetch(&mut self, text: &str, caret: usize) -> bool {
        match self.input(text, caret) {
            Some(request) => {
                let response = self.fetch_context(&request).await;
                self.apply_context(response)
            }
            None => false,
        }
    }

    pub fn handle_key(&mut self, key: EditorKey) -> Result<KeyOutcome, CoreError> {
        let outcome = self.editor.handle_key(key)?;
        if let KeyOutcome::Accepted(acceptance) = &outcome {
            self.learn(acceptance);
        }
        Ok(outcome)
    }

    pub fn click_option(&mut self, index: usize) -> Result<Option<Acceptance>, CoreError> {
        let acceptance = self.editor.click_option(index)?;
        if let Some(acceptance) = &acceptance {
            self.learn(acceptance);
        }
        Ok(acceptance)
    }

    pub fn pointer_down(&mut self) {
        self.editor.pointer_down();
    }

    pub fn focus(&mut self) {
        self.editor.focus();
    }

    pub fn blur(&mut self, now: std::time::Instant) {
        self.editor.blur(now);
    }

    pub fn poll_blur(&mut self, now: std::time::Instant) -> bool {
        self.editor.poll_blur(now)
    }

    fn learn(&mut self, acceptance: &Acceptance) {
        if let Some(mapping) = &acceptance.mapping {
            self.translations.register_mapping(mapping);
        }
    }

    // ==================== Snippets ====================

    /// Opens a snippet: its stored text is shown in display form.
    pub fn load_snippet(&mut self, snippet: Snippet) {
        let display = self.translations.to_display_form(&snippet.cml_text);
        self.editor.set_text(&display);
        self.editor.mark_clean();
        tracing::debug!(id = %snippet.id, "snippet loaded");
        self.current = Some(snippet);
    }

    /// Saves the editor text, in storage form, to the open snippet.
    ///
    /// On failure the editor is left exactly as it was.
    pub async fn save_snippet(&mut self, label: Option<&str>) -> ServiceResult<()> {
        let result = self.try_save(label).await;
        match &result {
            Ok(()) => self
                .notifier
                .notify(Notification::success("CML Snippet saved successfully")),
            Err(err) => self.notify_error("Error saving CML Snippet: ", err),
        }
        result
    }

    async fn try_save(&mut self, label: Option<&str>) -> ServiceResult<()> {
        let current = self.current.as_ref().ok_or(ServiceError::NoSnippetOpen)?;
        let label = label.unwrap_or(&current.label).to_string();
        let storage = self.translations.to_storage_form(&self.editor.text());

        self.store.save(&current.id, &label, &storage).await?;

        if let Some(current) = self.current.as_mut() {
            current.label = label;
            current.cml_text = storage;
        }
        self.editor.mark_clean();
        Ok(())
    }

    pub async fn create_snippet(&mut self, keyword: SnippetKeyword, label: &str) -> ServiceResult<Snippet> {
        match self.store.create(&self.record, keyword, label).await {
            Ok(snippet) => {
                self.notifier
                    .notify(Notification::success("CML Snippet created successfully"));
                self.reload_snippets().await;
                Ok(snippet)
            }
            Err(err) => {
                self.notify_error("Error creating CML Snippet: ", &err);
                Err(err)
            }
        }
    }

    /// Deletes a snippet. Deleting the open snippet closes it but keeps
    /// the editor text.
    pub async fn delete_snippet(&mut self, id: &str) -> ServiceResult<()> {
        match self.store.delete(id).await {
            Ok(()) => {
                self.notifier
                    .notify(Notification::success("CML Snippet deleted successfully"));
                if self.current.as_ref().is_some_and(|s| s.id == id) {
                    self.current = None;
                }
                self.reload_snippets().await;
                Ok(())
            }
            Err(err) => {
                self.notify_error("Error deleting CML Snippet: ", &err);
                Err(err)
            }
        }
    }

    /// Sets the search term and re-lists from the store.
    pub async fn search(&mut self, term: &str) {
        self.search_term = term.to_string();
        self.reload_snippets().await;
    }

    pub fn toggle_section(&mut self, key: &str) -> bool {
        self.sections.toggle(key)
    }

    /// Re-lists snippets. On failure the previous list stays.
    pub async fn reload_snippets(&mut self) {
        match self.store.list(&self.record, &self.search_term).await {
            Ok(snippets) => {
                self.sections.group(&snippets);
                self.snippets = snippets;
            }
            Err(err) => self.notify_error("Error loading CML Snippets: ", &err),
        }
    }

    fn notify_error(&self, action: &str, err: &ServiceError) {
        tracing::warn!(error = %err, "{}", action.trim_end_matches([':', ' ']));
        self.notifier
            .notify(Notification::error(format!("{action}{err}")));
    }
}
