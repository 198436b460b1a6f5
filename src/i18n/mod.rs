//! Internationalization (i18n) support
//!
//! UI strings ship with the binary for `pt-BR` and `en`; a site can override
//! or add languages with YAML files in its `languages/` directory.

use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Language used when the configured one has no translations
pub const DEFAULT_LANGUAGE: &str = "pt-BR";

const BUILTIN: &[(&str, &str)] = &[
    ("pt-BR", include_str!("languages/pt-BR.yml")),
    ("en", include_str!("languages/en.yml")),
];

/// Internationalization handler
#[derive(Debug, Clone)]
pub struct I18n {
    /// Current language
    language: String,
    /// Language data: lang -> key -> translation
    translations: HashMap<String, HashMap<String, serde_yaml::Value>>,
}

impl I18n {
    /// Create a handler with the built-in languages loaded
    pub fn new(language: &str) -> Self {
        let mut translations = HashMap::new();
        for (lang, source) in BUILTIN {
            match serde_yaml::from_str(source) {
                Ok(data) => {
                    translations.insert(lang.to_string(), data);
                }
                Err(e) => tracing::warn!("Invalid built-in language {}: {}", lang, e),
            }
        }

        Self {
            language: language.to_string(),
            translations,
        }
    }

    /// Load language files from a directory, overriding built-in keys
    pub fn load_languages<P: AsRef<Path>>(&mut self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(());
        }

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let ext = path.extension().and_then(|e| e.to_str());
            if !path.is_file() || !matches!(ext, Some("yml") | Some("yaml")) {
                continue;
            }

            let Some(lang) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let content = fs::read_to_string(&path)?;

            match serde_yaml::from_str::<HashMap<String, serde_yaml::Value>>(&content) {
                Ok(data) => {
                    self.translations
                        .entry(lang.to_string())
                        .or_default()
                        .extend(data);
                    tracing::debug!("Loaded language file: {:?}", path);
                }
                Err(e) => tracing::warn!("Failed to parse language file {:?}: {}", path, e),
            }
        }

        Ok(())
    }

    /// Get a translation by key, nested keys use dots ("post.minutes")
    pub fn get(&self, key: &str) -> String {
        for lang in [self.language.as_str(), DEFAULT_LANGUAGE] {
            if let Some(value) = self
                .translations
                .get(lang)
                .and_then(|data| get_nested_value(data, key))
            {
                return yaml_value_to_string(value);
            }
        }

        // Return key as fallback
        key.to_string()
    }

    /// All translations for the current language as a flat map,
    /// missing keys filled from the default language
    pub fn get_all_translations(&self) -> HashMap<String, String> {
        let mut result = HashMap::new();

        if let Some(lang_data) = self.translations.get(&self.language) {
            flatten_translations(lang_data, "", &mut result);
        }

        if self.language != DEFAULT_LANGUAGE {
            if let Some(default_data) = self.translations.get(DEFAULT_LANGUAGE) {
                let mut defaults = HashMap::new();
                flatten_translations(default_data, "", &mut defaults);
                for (k, v) in defaults {
                    result.entry(k).or_insert(v);
                }
            }
        }

        result
    }
}

/// Get a nested value from a YAML map using dot notation
fn get_nested_value<'a>(
    data: &'a HashMap<String, serde_yaml::Value>,
    key: &str,
) -> Option<&'a serde_yaml::Value> {
    let mut parts = key.split('.');
    let mut current = data.get(parts.next()?);

    for part in parts {
        match current {
            Some(serde_yaml::Value::Mapping(map)) => {
                current = map.get(serde_yaml::Value::String(part.to_string()));
            }
            _ => return None,
        }
    }

    current
}

/// Convert a YAML value to a string
fn yaml_value_to_string(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => String::new(),
        _ => format!("{:?}", value),
    }
}

/// Flatten translations into a HashMap with dot-notation keys
fn flatten_translations(
    data: &HashMap<String, serde_yaml::Value>,
    prefix: &str,
    result: &mut HashMap<String, String>,
) {
    for (key, value) in data {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            serde_yaml::Value::Mapping(map) => {
                let nested: HashMap<String, serde_yaml::Value> = map
                    .iter()
                    .filter_map(|(k, v)| Some((k.as_str()?.to_string(), v.clone())))
                    .collect();
                flatten_translations(&nested, &full_key, result);
            }
            serde_yaml::Value::Sequence(_) | serde_yaml::Value::Tagged(_) => {}
            other => {
                result.insert(full_key, yaml_value_to_string(other));
            }
        }
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }
}
