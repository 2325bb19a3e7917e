//! Language detection and `.editorconfig` support for quire.
//!
//! [`LanguageRegistry`] is an ordinary value built once by the
//! application and passed to each editor; there is no global table.

mod editorconfig;
mod glob;
mod registry;

pub use editorconfig::{
    EditorConfigFile, EditorConfigProperties, EndOfLine, IndentSize, IndentStyle, Section,
    EDITORCONFIG_FILE_NAME,
};
pub use glob::Glob;
pub use registry::{Language, LanguageRegistry};
