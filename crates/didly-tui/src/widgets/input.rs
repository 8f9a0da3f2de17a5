//! Minimal single-line text editing.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Apply an editing key to `value`. Returns `true` if the key was an
/// edit, whether or not the text actually changed.
///
/// Supports typing, Backspace, and Ctrl+U to clear.
pub fn edit(value: &mut String, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('u') if ctrl => {
            value.clear();
            true
        }
        KeyCode::Char(c) if !ctrl => {
            value.push(c);
            true
        }
        KeyCode::Backspace => {
            value.pop();
            true
        }
        _ => false,
    }
}

/// Trimmed value, or `None` when blank.
pub fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Text with a trailing block cursor when focused.
pub fn display(value: &str, focused: bool) -> String {
    if focused {
        format!("{value}█")
    } else {
        value.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn typing_and_backspace() {
        let mut value = String::new();
        for c in "415x".chars() {
            assert!(edit(&mut value, key(KeyCode::Char(c))));
        }
        assert!(edit(&mut value, key(KeyCode::Backspace)));
        assert_eq!(value, "415");
    }

    #[test]
    fn ctrl_u_clears() {
        let mut value = "san fran".to_owned();
        assert!(edit(
            &mut value,
            KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL)
        ));
        assert_eq!(value, "");
    }

    #[test]
    fn navigation_keys_are_not_edits() {
        let mut value = "1".to_owned();
        assert!(!edit(&mut value, key(KeyCode::Up)));
        assert!(!edit(&mut value, key(KeyCode::Enter)));
        assert_eq!(value, "1");
    }

    #[test]
    fn blank_is_none() {
        assert_eq!(non_empty("   "), None);
        assert_eq!(non_empty(" 415 ").as_deref(), Some("415"));
    }
}
