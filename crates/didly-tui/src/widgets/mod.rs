//! Reusable widgets: text editing, popups, toasts, and the config dialog.

pub mod config_dialog;
pub mod input;
pub mod popup;
pub mod toast;
