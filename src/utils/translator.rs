use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

/// Fallback locale used when an interaction's locale has no table
pub const DEFAULT_LOCALE: &str = "en-US";

/// Locale table loaded from `resources/langs.json`.
///
/// The file maps `locale -> key -> template`. Unknown locales fall back to
/// `en-US`; unknown keys pass through unchanged so raw strings survive.
#[derive(Clone)]
pub struct Translator {
    tables: Arc<HashMap<String, HashMap<String, String>>>,
}

impl Translator {
    /// Load the locale tables from disk. A missing or broken file degrades
    /// to an empty table, which makes every translation a pass-through.
    pub fn load(path: &Path) -> Self {
        let tables = match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<HashMap<String, HashMap<String, String>>>(&raw)
            {
                Ok(tables) => {
                    info!("Loaded {} locale tables from {}", tables.len(), path.display());
                    tables
                }
                Err(e) => {
                    warn!("Failed to parse locale file {}: {}", path.display(), e);
                    HashMap::new()
                }
            },
            Err(e) => {
                warn!("Failed to read locale file {}: {}", path.display(), e);
                HashMap::new()
            }
        };

        Self {
            tables: Arc::new(tables),
        }
    }

    /// Build a translator from an already-parsed table (used by tests)
    pub fn from_tables(tables: HashMap<String, HashMap<String, String>>) -> Self {
        Self {
            tables: Arc::new(tables),
        }
    }

    /// Translate `key` for `locale`, falling back to `en-US` and finally to
    /// the key itself.
    pub fn translate(&self, locale: &str, key: &str) -> String {
        let table = self
            .tables
            .get(locale)
            .or_else(|| self.tables.get(DEFAULT_LOCALE));

        match table.and_then(|t| t.get(key)) {
            Some(template) => template.clone(),
            None => key.to_string(),
        }
    }

    /// Translate `key` and substitute every `{arg}` placeholder
    pub fn translate_with(&self, locale: &str, key: &str, args: &[(&str, String)]) -> String {
        let mut result = self.translate(locale, key);
        for (arg, value) in args {
            result = result.replace(&format!("{{{}}}", arg), value);
        }
        result
    }
}

/// Locale-aware shortcuts on the command context; the locale comes from the
/// invoking interaction
pub trait Localize {
    fn tr(&self, key: &str) -> String;
    fn tr_with(&self, key: &str, args: &[(&str, String)]) -> String;
}

impl Localize for crate::models::Context<'_> {
    fn tr(&self, key: &str) -> String {
        self.data()
            .translator
            .translate(self.locale().unwrap_or(DEFAULT_LOCALE), key)
    }

    fn tr_with(&self, key: &str, args: &[(&str, String)]) -> String {
        self.data()
            .translator
            .translate_with(self.locale().unwrap_or(DEFAULT_LOCALE), key, args)
    }
}
