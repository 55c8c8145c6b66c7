//! The code editor's autocomplete state machine.
//!
//! ```text
//!            input: options               input: uncached trigger
//!   ┌──────┐ ──────────────► ┌────────────┐ ─────────────► ┌─────────────────┐
//!   │ Idle │                 │ Suggesting │                │ AwaitingContext │
//!   └──────┘ ◄────────────── └────────────┘ ◄───────────── └─────────────────┘
//!     escape / accept / blur grace / no options   apply_context (current trigger)
//! ```
//!
//! Every input event recomputes the caret context from scratch; the
//! only state carried between keystrokes is the last context (for
//! re-filtering when a contextual pool arrives) and the active trigger
//! (for dropping stale pools).

use std::borrow::Cow;
use std::time::{Duration, Instant};

use cml_buffer::TextBuffer;
use cml_syntax::{ContextKey, EditorContext, Scanner, highlight_spans, to_markup};

use crate::CoreResult;
use crate::config::{Config, PopupConfig};
use crate::event::{EditorEvent, EventBus};
use crate::pools::SuggestionPools;
use crate::popup::{Anchor, PopupState};
use crate::resolver::{ContextRequest, resolve};
use crate::suggestion::{IdMapping, SuggestionItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorState {
    /// Popup hidden
    #[default]
    Idle,
    /// Popup visible with at least one option
    Suggesting,
    /// A contextual pool was requested and has not arrived
    AwaitingContext,
}

/// Keys the popup reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKey {
    Up,
    Down,
    Enter,
    Tab,
    Escape,
    Other,
}

impl EditorKey {
    /// Maps a DOM `KeyboardEvent.key` value.
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "ArrowUp" => Self::Up,
            "ArrowDown" => Self::Down,
            "Enter" => Self::Enter,
            "Tab" => Self::Tab,
            "Escape" | "Esc" => Self::Escape,
            _ => Self::Other,
        }
    }
}

/// What a key press did.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyOutcome {
    /// Not for the popup; let the text area have it
    Ignored,
    Navigated,
    Accepted(Acceptance),
    Dismissed,
}

impl KeyOutcome {
    /// True when the host must suppress the key's default action.
    pub fn prevents_default(&self) -> bool {
        matches!(self, Self::Navigated | Self::Accepted(_))
    }
}

/// The result of splicing a suggestion into the text.
#[derive(Debug, Clone, PartialEq)]
pub struct Acceptance {
    pub text: String,
    /// Caret to restore once the host has re-rendered
    pub caret: usize,
    pub inserted: String,
    pub item: SuggestionItem,
    pub mapping: Option<IdMapping>,
}

pub struct CodeEditor {
    buffer: TextBuffer,

    /// Caret as a character offset
    caret: usize,

    scanner: Scanner,
    pools: SuggestionPools,
    popup: PopupState,
    state: EditorState,

    /// Context of the last input event
    context: Option<EditorContext>,

    /// Trigger whose contextual pool may still be applied
    active_key: Option<ContextKey>,

    /// When a blur hides the popup unless cancelled
    pending_hide: Option<Instant>,

    blur_grace: Duration,
    popup_config: PopupConfig,
    class_prefix: String,
    event_bus: EventBus,
}

impl CodeEditor {
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    pub fn with_config(config: &Config) -> Self {
        Self {
            buffer: TextBuffer::new(),
            caret: 0,
            scanner: Scanner::new(config.editor.min_word_len),
            pools: SuggestionPools::new(),
            popup: PopupState::default(),
            state: EditorState::Idle,
            context: None,
            active_key: None,
            pending_hide: None,
            blur_grace: Duration::from_millis(config.editor.blur_grace_ms),
            popup_config: config.popup.clone(),
            class_prefix: config.highlight.class_prefix.clone(),
            event_bus: EventBus::new(),
        }
    }

    // ==================== Accessors ====================

    pub fn text(&self) -> Cow<'_, str> {
        self.buffer.text()
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn popup(&self) -> &PopupState {
        &self.popup
    }

    pub fn pools(&self) -> &SuggestionPools {
        &self.pools
    }

    pub fn context(&self) -> Option<&EditorContext> {
        self.context.as_ref()
    }

    pub fn active_context(&self) -> Option<&ContextKey> {
        self.active_key.as_ref()
    }

    pub fn is_modified(&self) -> bool {
        self.buffer.is_modified()
    }

    pub fn mark_clean(&mut self) {
        self.buffer.mark_clean();
    }

    /// Subscribes to editor events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<EditorEvent> {
        self.event_bus.subscribe()
    }

    // ==================== Pools ====================

    pub fn set_attribute_pool(&mut self, items: Vec<SuggestionItem>) {
        self.pools.set_attributes(items);
    }

    pub fn set_product_pool(&mut self, items: Vec<SuggestionItem>) {
        self.pools.set_products(items);
    }

    // ==================== Text ====================

    /// Replaces the text without running autocomplete, e.g. on load.
    /// The caret moves to the end.
    pub fn set_text(&mut self, text: &str) {
        self.buffer.set_text(text);
        self.caret = self.buffer.len_chars();
        self.context = None;
        self.dismiss();
    }

    /// Handles an input event: the full new text and the caret offset.
    ///
    /// Returns the contextual fetch the host should start, if any.
    pub fn input(&mut self, text: &str, caret: usize) -> Option<ContextRequest> {
        self.buffer.set_text(text);
        self.caret = caret;
        self.pending_hide = None;

        let context = self.scanner.scan(text, caret, &self.pools);
        match context.trigger() {
            Some(trigger) => self.active_key = Some(trigger.key.clone()),
            None => {
                self.active_key = None;
                self.pools.clear_contextual();
            }
        }

        let resolution = resolve(&context, &self.pools);
        self.context = Some(context);

        if let Some(request) = &resolution.request {
            tracing::debug!(key = %request.key, term = %request.search_term, "requesting context");
            self.emit(EditorEvent::ContextRequested(request.clone()));
        }
        self.present(resolution.options, resolution.request.is_some());
        resolution.request
    }

    /// Installs a fetched contextual pool.
    ///
    /// Returns false, and changes nothing, when `key` is no longer the
    /// active trigger.
    pub fn apply_context(&mut self, key: ContextKey, items: Vec<SuggestionItem>) -> bool {
        if self.active_key.as_ref() != Some(&key) {
            tracing::debug!(%key, "dropping stale contextual suggestions");
            return false;
        }

        self.pools.set_contextual(key, items);
        let resolution = match &self.context {
            Some(context) => resolve(context, &self.pools),
            None => return false,
        };
        self.present(resolution.options, false);
        true
    }

    // ==================== Keyboard & Pointer ====================

    pub fn handle_key(&mut self, key: EditorKey) -> CoreResult<KeyOutcome> {
        if key == EditorKey::Escape {
            let was_open = self.state != EditorState::Idle;
            self.dismiss();
            return Ok(if was_open {
                KeyOutcome::Dismissed
            } else {
                KeyOutcome::Ignored
            });
        }

        if self.state != EditorState::Suggesting || self.popup.options().is_empty() {
            return Ok(KeyOutcome::Ignored);
        }

        let outcome = match key {
            EditorKey::Down => {
                self.popup.select_next();
                KeyOutcome::Navigated
            }
            EditorKey::Up => {
                self.popup.select_previous();
                KeyOutcome::Navigated
            }
            EditorKey::Enter | EditorKey::Tab => {
                match self.accept(self.popup.selected_index())? {
                    Some(acceptance) => KeyOutcome::Accepted(acceptance),
                    None => KeyOutcome::Ignored,
                }
            }
            EditorKey::Escape | EditorKey::Other => KeyOutcome::Ignored,
        };
        Ok(outcome)
    }

    /// A click on a popup row. Accepts it immediately, ahead of any
    /// pending blur hide.
    pub fn click_option(&mut self, index: usize) -> CoreResult<Option<Acceptance>> {
        self.pending_hide = None;
        if !self.popup.select(index) {
            return Ok(None);
        }
        self.accept(index)
    }

    /// Pointer pressed on the popup; the text area keeps focus.
    pub fn pointer_down(&mut self) {
        self.pending_hide = None;
    }

    pub fn focus(&mut self) {
        self.pending_hide = None;
    }

    /// The text area lost focus at `now`. The popup hides after the
    /// grace delay unless something cancels it first.
    pub fn blur(&mut self, now: Instant) {
        self.pending_hide = Some(now + self.blur_grace);
    }

    /// Applies a due blur hide. Returns true if the popup was hidden.
    pub fn poll_blur(&mut self, now: Instant) -> bool {
        match self.pending_hide {
            Some(deadline) if now >= deadline => {
                self.pending_hide = None;
                self.dismiss();
                true
            }
            _ => false,
        }
    }

    pub fn blur_pending(&self) -> bool {
        self.pending_hide.is_some()
    }

    // ==================== Rendering ====================

    /// Highlight markup for the current text.
    pub fn markup(&self) -> String {
        let text = self.buffer.text();
        to_markup(&text, &highlight_spans(&text, &self.pools), &self.class_prefix)
    }

    // ==================== Internals ====================

    fn accept(&mut self, index: usize) -> CoreResult<Option<Acceptance>> {
        let Some(item) = self.popup.options().get(index).cloned() else {
            return Ok(None);
        };
        let Some(start) = self.context.as_ref().map(|c| c.replace_start) else {
            return Ok(None);
        };

        let inserted = item.insertion_text().to_string();
        self.buffer.replace(start..self.caret, &inserted)?;
        let caret = start + inserted.chars().count();
        let text = self.buffer.text().into_owned();

        self.emit(EditorEvent::TextChanged { text: text.clone() });
        let mapping = item.id_mapping();
        if let Some(mapping) = &mapping {
            self.emit(EditorEvent::IdMapping(mapping.clone()));
        }

        self.dismiss();
        self.context = None;
        self.caret = caret;
        self.emit(EditorEvent::CaretRestored(caret));

        tracing::debug!(value = %item.value, inserted = %inserted, "suggestion accepted");
        Ok(Some(Acceptance {
            text,
            caret,
            inserted,
            item,
            mapping,
        }))
    }

    fn present(&mut self, options: Vec<SuggestionItem>, awaiting: bool) {
        if options.is_empty() {
            self.hide_popup();
            self.state = if awaiting {
                EditorState::AwaitingContext
            } else {
                EditorState::Idle
            };
            return;
        }

        let count = options.len();
        let anchor = self.anchor();
        self.popup.show(options, anchor);
        self.state = EditorState::Suggesting;
        self.emit(EditorEvent::PopupShown { count });
    }

    /// Back to `Idle`, forgetting any trigger.
    fn dismiss(&mut self) {
        self.hide_popup();
        self.active_key = None;
        self.pools.clear_contextual();
        self.state = EditorState::Idle;
    }

    fn hide_popup(&mut self) {
        if self.popup.is_visible() {
            self.emit(EditorEvent::PopupHidden);
        }
        self.popup.hide();
    }

    /// Popup position below the caret line, from fixed glyph metrics.
    fn anchor(&self) -> Anchor {
        let line = self.buffer.char_idx_to_position(self.caret).map(|p| p.line);
        let column = self.buffer.display_column(self.caret);
        match (line, column) {
            (Ok(line), Ok(column)) => Anchor {
                top: (line as u32 + 1) * self.popup_config.line_height,
                left: column as u32 * self.popup_config.char_width,
            },
            _ => Anchor::default(),
        }
    }

    fn emit(&self, event: EditorEvent) {
        self.event_bus.emit(event);
    }
}

impl Default for CodeEditor {
    fn default() -> Self {
        Self::new()
    }
}
