//! Autocomplete popup state.

use serde::Serialize;

use crate::suggestion::SuggestionItem;

/// Popup offset from the top-left of the text area, in px.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Anchor {
    pub top: u32,
    pub left: u32,
}

impl Anchor {
    /// Inline style for the popup element.
    pub fn css(&self) -> String {
        format!("top: {}px; left: {}px;", self.top, self.left)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PopupState {
    visible: bool,
    options: Vec<SuggestionItem>,
    selected_index: usize,
    anchor: Anchor,
}

/// One rendered popup row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupRow<'a> {
    pub index: usize,
    pub item: &'a SuggestionItem,
    pub is_selected: bool,
}

impl PopupRow<'_> {
    pub fn class_name(&self) -> &'static str {
        if self.is_selected {
            "autocomplete-option selected"
        } else {
            "autocomplete-option"
        }
    }

    pub fn style(&self) -> String {
        format!("color: {};", self.item.color)
    }
}

impl PopupState {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn options(&self) -> &[SuggestionItem] {
        &self.options
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn selected(&self) -> Option<&SuggestionItem> {
        self.options.get(self.selected_index)
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub fn rows(&self) -> impl Iterator<Item = PopupRow<'_>> {
        self.options.iter().enumerate().map(|(index, item)| PopupRow {
            index,
            item,
            is_selected: index == self.selected_index,
        })
    }

    /// Shows a new option set. Selection resets to the first row.
    pub(crate) fn show(&mut self, options: Vec<SuggestionItem>, anchor: Anchor) {
        self.visible = !options.is_empty();
        self.options = options;
        self.selected_index = 0;
        self.anchor = anchor;
    }

    pub(crate) fn hide(&mut self) {
        self.visible = false;
        self.options.clear();
        self.selected_index = 0;
    }

    pub(crate) fn select_next(&mut self) {
        if !self.options.is_empty() {
            self.selected_index = (self.selected_index + 1) % self.options.len();
        }
    }

    pub(crate) fn select_previous(&mut self) {
        if !self.options.is_empty() {
            self.selected_index = self
                .selected_index
                .checked_sub(1)
                .unwrap_or(self.options.len() - 1);
        }
    }

    pub(crate) fn select(&mut self, index: usize) -> bool {
        if index < self.options.len() {
            self.selected_index = index;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suggestion::SuggestionKind;

    fn popup(n: usize) -> PopupState {
        let mut popup = PopupState::default();
        let options = (0..n)
            .map(|i| SuggestionItem::new(format!("opt{i}"), SuggestionKind::Attribute))
            .collect();
        popup.show(options, Anchor { top: 24, left: 80 });
        popup
    }

    #[test]
    fn test_navigation_wraps() {
        let mut popup = popup(3);
        popup.select_previous();
        assert_eq!(popup.selected_index(), 2);
        popup.select_next();
        assert_eq!(popup.selected_index(), 0);
    }

    #[test]
    fn test_rows_mark_selection() {
        let mut popup = popup(2);
        popup.select_next();
        let rows: Vec<_> = popup.rows().map(|r| r.class_name()).collect();
        assert_eq!(rows, vec!["autocomplete-option", "autocomplete-option selected"]);
        assert_eq!(popup.rows().next().unwrap().style(), "color: black;");
        assert_eq!(popup.anchor().css(), "top: 24px; left: 80px;");
    }

    #[test]
    fn test_empty_show_stays_hidden() {
        let mut popup = popup(0);
        assert!(!popup.is_visible());
        popup.select_next();
        assert_eq!(popup.selected_index(), 0);
        assert!(!popup.select(0));
    }
}
