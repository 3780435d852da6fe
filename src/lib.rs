//! flatwiki - minimal personal wiki over flat text files
//!
//! Pages are stored one-per-file under a data directory and served through
//! three HTML templates (home listing, page view, page edit). There is no
//! authentication, versioning, or markup processing; the server targets a
//! single trusted user.
//!
//! # Usage
//!
//! ```bash
//! flatwiki
//! ```
//!
//! The server listens on `127.0.0.1:8080`, reads templates from `views/`
//! and page files from `data/` in the working directory.

pub mod store;
pub mod templates;
pub mod title;
pub mod web;

// Re-export public API
pub use store::{Page, PageStore, StoreError};
pub use templates::{Context, TemplateError, TemplateSet, Value};
pub use title::TitleValidator;
pub use web::{wiki_routes, AppState, ServerConfig, WikiServer};
