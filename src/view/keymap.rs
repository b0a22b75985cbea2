//! Keyboard shortcuts for the search box.

/// The parts of a key event the shortcuts depend on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    /// `KeyboardEvent.key`, e.g. `"f"`, `"Escape"`.
    pub key: String,
    pub ctrl: bool,
    /// Cmd on macOS.
    pub meta: bool,
    /// Whether the search box currently has focus.
    pub search_focused: bool,
}

impl KeyInput {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ctrl: false,
            meta: false,
            search_focused: false,
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn in_search(mut self) -> Self {
        self.search_focused = true;
        self
    }
}

/// What a key press should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Focus the search box and suppress the browser's own find.
    FocusSearch,
    /// Clear the search term and drop focus from the search box.
    ClearSearch,
    None,
}

impl KeyAction {
    /// Whether the browser default for the key must be suppressed.
    pub fn prevents_default(&self) -> bool {
        matches!(self, KeyAction::FocusSearch)
    }
}

/// Map a key press to a shortcut action.
pub fn keymap(input: &KeyInput) -> KeyAction {
    let is_find = input.key.eq_ignore_ascii_case("f") && (input.ctrl || input.meta);
    if is_find {
        return KeyAction::FocusSearch;
    }
    if input.key == "Escape" && input.search_focused {
        return KeyAction::ClearSearch;
    }
    KeyAction::None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ctrl_or_cmd_f_focuses_search() {
        assert_eq!(keymap(&KeyInput::new("f").ctrl()), KeyAction::FocusSearch);
        assert_eq!(keymap(&KeyInput::new("F").meta()), KeyAction::FocusSearch);
        assert!(KeyAction::FocusSearch.prevents_default());
    }

    #[test]
    fn test_plain_f_is_ignored() {
        assert_eq!(keymap(&KeyInput::new("f")), KeyAction::None);
        assert_eq!(keymap(&KeyInput::new("f").in_search()), KeyAction::None);
    }

    #[test]
    fn test_escape_only_clears_when_search_focused() {
        assert_eq!(
            keymap(&KeyInput::new("Escape").in_search()),
            KeyAction::ClearSearch
        );
        assert_eq!(keymap(&KeyInput::new("Escape")), KeyAction::None);
        assert!(!KeyAction::ClearSearch.prevents_default());
    }
}
