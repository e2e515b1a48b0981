//! Configuration loading
//!
//! `defaults/glint.default.toml` is embedded into the library so the documented
//! defaults and runtime behavior stay in sync. Applications layer their own
//! files and key overrides on top via [`Loader`] before deserializing into
//! [`GlintConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_TOML: &str = include_str!("../defaults/glint.default.toml");

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GlintConfig {
    pub render: RenderConfig,
    pub tokenizer: TokenizerConfig,
    pub languages: LanguagesConfig,
}

/// Markup emitted for tokens.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RenderConfig {
    pub tag: String,
    pub class_prefix: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenizerConfig {
    /// Inputs longer than this are rendered as escaped plaintext. 0 = no cap.
    pub max_input_bytes: usize,
}

/// Which grammars a highlighter starts with.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LanguagesConfig {
    pub builtins: bool,
    /// alias -> language
    #[serde(default)]
    pub aliases: IndexMap<String, String>,
    #[serde(default)]
    pub extra: Vec<ExtraGrammar>,
}

/// A grammar definition file registered at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtraGrammar {
    pub name: String,
    pub path: PathBuf,
    /// Defaults to the file extension (`.json`, `.yaml`/`.yml`)
    #[serde(default)]
    pub format: Option<GrammarFormat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GrammarFormat {
    Json,
    Yaml,
}

impl ExtraGrammar {
    pub fn format(&self) -> GrammarFormat {
        if let Some(format) = self.format {
            return format;
        }
        match self.path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => GrammarFormat::Yaml,
            _ => GrammarFormat::Json,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            tag: "span".to_string(),
            class_prefix: "token".to_string(),
        }
    }
}

impl Default for LanguagesConfig {
    fn default() -> Self {
        Self {
            builtins: true,
            aliases: IndexMap::new(),
            extra: Vec::new(),
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<GlintConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<GlintConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config, GlintConfig::default());
        assert_eq!(config.render.tag, "span");
        assert_eq!(config.render.class_prefix, "token");
        assert!(config.languages.builtins);
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("render.tag", "code")
            .expect("override to apply")
            .set_override("tokenizer.max_input_bytes", 1024_i64)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.render.tag, "code");
        assert_eq!(config.tokenizer.max_input_bytes, 1024);
    }

    #[test]
    fn layers_user_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[render]\nclass_prefix = \"hl\"\n\n[languages]\nbuiltins = false\n\n[[languages.extra]]\nname = \"ini\"\npath = \"grammars/ini.yaml\"\n"
        )
        .unwrap();

        let config = Loader::new().with_file(file.path()).build().unwrap();
        assert_eq!(config.render.class_prefix, "hl");
        assert_eq!(config.render.tag, "span");
        assert!(!config.languages.builtins);
        assert_eq!(config.languages.extra.len(), 1);
        assert_eq!(config.languages.extra[0].format(), GrammarFormat::Yaml);
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let config = Loader::new()
            .with_optional_file("/definitely/not/here.toml")
            .build()
            .unwrap();
        assert_eq!(config, GlintConfig::default());
    }

    #[test]
    fn missing_required_file_is_an_error() {
        assert!(Loader::new()
            .with_file("/definitely/not/here.toml")
            .build()
            .is_err());
    }

    #[test]
    fn format_falls_back_to_json() {
        let grammar = ExtraGrammar {
            name: "x".into(),
            path: PathBuf::from("x.grammar"),
            format: None,
        };
        assert_eq!(grammar.format(), GrammarFormat::Json);
    }
}
