//! HTML template rendering
//!
//! A fixed set of named templates, loaded once at startup and compiled to
//! segment lists for rendering. The engine is pure text substitution:
//! `{{key}}` placeholders and `{{each key |var|}} ... {{/each}}` list
//! blocks, with substituted values HTML-escaped. Templates carry no logic
//! beyond that.

mod engine;

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use engine::Template;

/// Default views directory, relative to the working directory
pub const DEFAULT_VIEWS_DIR: &str = "views";

/// The fixed template set; each name maps to `<name>.html` in the views
/// directory
pub const TEMPLATE_NAMES: [&str; 3] = ["home", "view", "edit"];

/// Template error type
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template not found: {0}")]
    UnknownTemplate(String),

    #[error("failed to read template {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("template {name}: {reason}")]
    Parse { name: String, reason: String },

    #[error("unknown placeholder: {0}")]
    UnknownKey(String),

    #[error("placeholder {0} is not text")]
    NotText(String),

    #[error("placeholder {0} is not a list")]
    NotAList(String),
}

impl TemplateError {
    pub(crate) fn parse(name: &str, reason: impl Into<String>) -> Self {
        Self::Parse {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// A value a template placeholder can resolve to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    List(Vec<String>),
}

/// Data supplied to a template render
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: HashMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a text value
    pub fn with_text(mut self, key: &str, value: impl Into<String>) -> Self {
        self.values.insert(key.to_string(), Value::Text(value.into()));
        self
    }

    /// Bind a list value
    pub fn with_list(mut self, key: &str, values: Vec<String>) -> Self {
        self.values.insert(key.to_string(), Value::List(values));
        self
    }

    pub(crate) fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

/// The precompiled, immutable template set
///
/// Loaded once at startup and shared read-only through application state.
/// A missing or malformed template file fails the load, and with it the
/// whole process.
#[derive(Debug)]
pub struct TemplateSet {
    templates: HashMap<String, Template>,
}

impl TemplateSet {
    /// Load and compile all templates in [`TEMPLATE_NAMES`] from `dir`
    pub fn load(dir: &Path) -> Result<Self, TemplateError> {
        let mut templates = HashMap::new();
        for name in TEMPLATE_NAMES {
            let path = dir.join(format!("{name}.html"));
            let source = fs::read_to_string(&path).map_err(|source| TemplateError::Read {
                name: name.to_string(),
                source,
            })?;
            templates.insert(name.to_string(), Template::compile(name, &source)?);
        }
        Ok(Self { templates })
    }

    /// Render the named template against the given context
    pub fn render(&self, name: &str, ctx: &Context) -> Result<String, TemplateError> {
        self.templates
            .get(name)
            .ok_or_else(|| TemplateError::UnknownTemplate(name.to_string()))?
            .render(ctx)
    }
}
