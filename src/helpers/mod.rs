//! Helper functions for templates and rendering
//!
//! URL generation, HTML snippets and date formatting shared by the
//! generator and the server.

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
