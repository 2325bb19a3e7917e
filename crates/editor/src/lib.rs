//! Editor sessions for quire.
//!
//! An [`Editor`] is one open document: the text surface plus the search
//! session, bookmarks, detected language and `.editorconfig` properties
//! that belong to it. Callers drive it with [`Command`] values.

mod command;
mod editor;
mod save;

pub use command::{Command, Outcome};
pub use editor::Editor;
