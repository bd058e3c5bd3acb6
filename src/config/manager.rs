use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::paths;
use crate::ui::Style;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_MODELS: &[&str] = &["gpt-3.5-turbo", "gpt-3.5-turbo-0301"];
pub const DEFAULT_RETRY: u32 = 3;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Session defaults in the `[chat]` section of config.toml.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatConfig {
    /// Model used when `--model` is not given.
    pub model: Option<String>,
    /// Attempts per request.
    pub retry: Option<u32>,
    /// Directory `\save` writes to.
    pub dump_dir: Option<PathBuf>,
}

/// Remote endpoint settings in the `[api]` section of config.toml.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
    /// The OpenAI-compatible API endpoint URL.
    pub endpoint: Option<String>,
    /// API key stored directly in config (not recommended).
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable name containing the API key.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Request timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Models offered by `\change`.
    #[serde(default)]
    pub models: Vec<String>,
}

impl ApiConfig {
    /// Gets the API key, preferring the environment variable over the config file.
    pub fn get_api_key(&self) -> Option<String> {
        let env_var = self.api_key_env.as_deref().unwrap_or(DEFAULT_API_KEY_ENV);
        if let Ok(key) = std::env::var(env_var)
            && !key.is_empty()
        {
            return Some(key);
        }
        self.api_key.clone()
    }

    /// Configured models, or the built-in list when none are configured.
    pub fn known_models(&self) -> Vec<String> {
        if self.models.is_empty() {
            DEFAULT_MODELS.iter().map(|m| (*m).to_string()).collect()
        } else {
            self.models.clone()
        }
    }
}

/// The complete configuration file structure.
///
/// Corresponds to `~/.config/simchat/config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// Resolved configuration after merging CLI arguments, config file and defaults.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub retry: u32,
    pub dump_dir: Option<PathBuf>,
    pub cache_path: Option<PathBuf>,
    pub timeout: Duration,
    pub known_models: Vec<String>,
}

/// CLI overrides that take precedence over config file values.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub retry: Option<u32>,
    pub dump_dir: Option<PathBuf>,
    pub cache_path: Option<PathBuf>,
    pub endpoint: Option<String>,
}

/// Resolves configuration by merging CLI options with config file settings.
///
/// Priority: CLI option, then config file, then built-in default.
///
/// # Errors
///
/// Returns an error if the retry budget resolves to zero.
pub fn resolve_config(
    options: &ResolveOptions,
    config_file: &ConfigFile,
) -> Result<ResolvedConfig> {
    let known_models = config_file.api.known_models();

    let model = options
        .model
        .as_ref()
        .or(config_file.chat.model.as_ref())
        .cloned()
        .or_else(|| known_models.first().cloned())
        .unwrap_or_else(|| DEFAULT_MODELS[0].to_string());

    if !known_models.contains(&model) {
        eprintln!(
            "{} Model '{}' is not in the known models list\n\
             Known models: {}\n\
             Proceeding anyway...\n",
            Style::warning("Warning:"),
            model,
            known_models.join(", ")
        );
    }

    let retry = options
        .retry
        .or(config_file.chat.retry)
        .unwrap_or(DEFAULT_RETRY);

    if retry == 0 {
        bail!(
            "Invalid configuration: 'retry' must be at least 1\n\n\
             Set it via:\n  \
             - CLI option: simchat --retry <n>\n  \
             - Config file: ~/.config/simchat/config.toml"
        );
    }

    let endpoint = options
        .endpoint
        .as_ref()
        .or(config_file.api.endpoint.as_ref())
        .cloned()
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

    let api_key = options
        .api_key
        .clone()
        .filter(|k| !k.is_empty())
        .or_else(|| config_file.api.get_api_key());

    let timeout = Duration::from_secs(
        config_file
            .api
            .timeout_secs
            .unwrap_or(DEFAULT_TIMEOUT_SECS),
    );

    Ok(ResolvedConfig {
        endpoint,
        model,
        api_key,
        retry,
        dump_dir: options
            .dump_dir
            .clone()
            .or_else(|| config_file.chat.dump_dir.clone()),
        cache_path: options.cache_path.clone(),
        timeout,
        known_models,
    })
}

/// Manages loading and saving configuration files.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Creates a new config manager.
    ///
    /// Configuration is stored at `$XDG_CONFIG_HOME/simchat/config.toml`
    /// or `~/.config/simchat/config.toml` if `XDG_CONFIG_HOME` is not set.
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_path: paths::config_dir()?.join("config.toml"),
        })
    }

    pub const fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn load(&self) -> Result<ConfigFile> {
        let contents = fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file: {}", self.config_path.display())
        })?;

        let config_file: ConfigFile =
            toml::from_str(&contents).with_context(|| "Failed to parse config file")?;

        Ok(config_file)
    }

    /// Loads the config file, treating a missing file as empty.
    ///
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default(&self) -> Result<ConfigFile> {
        if self.config_path.exists() {
            self.load()
        } else {
            Ok(ConfigFile::default())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn create_test_manager(temp_dir: &TempDir) -> ConfigManager {
        ConfigManager::with_path(temp_dir.path().join("config.toml"))
    }

    #[test]
    fn test_load_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_test_manager(&temp_dir);
        fs::write(
            temp_dir.path().join("config.toml"),
            r#"
[chat]
model = "gpt-3.5-turbo-0301"
retry = 5
dump_dir = "/tmp/chats"

[api]
endpoint = "http://localhost:11434"
api_key_env = "LOCAL_KEY"
timeout_secs = 10
models = ["llama3.2"]
"#,
        )
        .unwrap();

        let loaded = manager.load().unwrap();

        assert_eq!(loaded.chat.model, Some("gpt-3.5-turbo-0301".to_string()));
        assert_eq!(loaded.chat.retry, Some(5));
        assert_eq!(loaded.chat.dump_dir, Some(PathBuf::from("/tmp/chats")));
        assert_eq!(loaded.api.endpoint, Some("http://localhost:11434".to_string()));
        assert_eq!(loaded.api.timeout_secs, Some(10));
        assert_eq!(loaded.api.models, vec!["llama3.2".to_string()]);
    }

    #[test]
    fn test_load_nonexistent_config() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_test_manager(&temp_dir);

        assert!(manager.load().is_err());
        assert!(manager.load_or_default().is_ok());
    }

    #[test]
    fn test_load_or_default_reports_broken_file() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_test_manager(&temp_dir);
        fs::write(temp_dir.path().join("config.toml"), "[chat\nretry = ").unwrap();

        assert!(manager.load_or_default().is_err());
    }

    #[test]
    fn test_parse_partial_config() {
        let config: ConfigFile = toml::from_str("[chat]\nretry = 7\n").unwrap();
        assert_eq!(config.chat.retry, Some(7));
        assert!(config.api.endpoint.is_none());
        assert!(config.api.models.is_empty());
    }

    #[test]
    #[serial]
    fn test_api_key_from_env() {
        // SAFETY: serialized with other env-touching tests
        unsafe {
            std::env::set_var("SIMCHAT_TEST_API_KEY", "test-key-value");
        }

        let api = ApiConfig {
            api_key: Some("fallback-key".to_string()),
            api_key_env: Some("SIMCHAT_TEST_API_KEY".to_string()),
            ..ApiConfig::default()
        };
        assert_eq!(api.get_api_key(), Some("test-key-value".to_string()));

        unsafe {
            std::env::remove_var("SIMCHAT_TEST_API_KEY");
        }
    }

    #[test]
    #[serial]
    fn test_api_key_fallback() {
        unsafe {
            std::env::remove_var("SIMCHAT_NONEXISTENT_KEY");
        }

        let api = ApiConfig {
            api_key: Some("fallback-key".to_string()),
            api_key_env: Some("SIMCHAT_NONEXISTENT_KEY".to_string()),
            ..ApiConfig::default()
        };
        assert_eq!(api.get_api_key(), Some("fallback-key".to_string()));
    }

    #[test]
    fn test_known_models_default() {
        let api = ApiConfig::default();
        assert_eq!(
            api.known_models(),
            vec!["gpt-3.5-turbo".to_string(), "gpt-3.5-turbo-0301".to_string()]
        );
    }

    // resolve_config tests

    #[test]
    #[serial]
    fn test_resolve_config_builtin_defaults() {
        unsafe {
            std::env::remove_var(DEFAULT_API_KEY_ENV);
        }

        let resolved = resolve_config(&ResolveOptions::default(), &ConfigFile::default()).unwrap();

        assert_eq!(resolved.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(resolved.model, "gpt-3.5-turbo");
        assert_eq!(resolved.retry, DEFAULT_RETRY);
        assert_eq!(resolved.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(resolved.api_key.is_none());
        assert!(resolved.dump_dir.is_none());
        assert!(resolved.cache_path.is_none());
    }

    #[test]
    fn test_resolve_config_cli_overrides_file() {
        let options = ResolveOptions {
            api_key: Some("sk-cli".to_string()),
            model: Some("gpt-3.5-turbo-0301".to_string()),
            retry: Some(1),
            dump_dir: Some(PathBuf::from("cli-dump")),
            cache_path: Some(PathBuf::from("old.json")),
            endpoint: Some("http://cli.local".to_string()),
        };
        let config = ConfigFile {
            chat: ChatConfig {
                model: Some("gpt-3.5-turbo".to_string()),
                retry: Some(9),
                dump_dir: Some(PathBuf::from("file-dump")),
            },
            api: ApiConfig {
                endpoint: Some("http://file.local".to_string()),
                api_key: Some("sk-file".to_string()),
                ..ApiConfig::default()
            },
        };

        let resolved = resolve_config(&options, &config).unwrap();

        assert_eq!(resolved.api_key, Some("sk-cli".to_string()));
        assert_eq!(resolved.model, "gpt-3.5-turbo-0301");
        assert_eq!(resolved.retry, 1);
        assert_eq!(resolved.dump_dir, Some(PathBuf::from("cli-dump")));
        assert_eq!(resolved.cache_path, Some(PathBuf::from("old.json")));
        assert_eq!(resolved.endpoint, "http://cli.local");
    }

    #[test]
    fn test_resolve_config_falls_back_to_file() {
        let config = ConfigFile {
            chat: ChatConfig {
                model: Some("llama3.2".to_string()),
                retry: Some(4),
                dump_dir: Some(PathBuf::from("file-dump")),
            },
            api: ApiConfig {
                endpoint: Some("http://localhost:11434".to_string()),
                timeout_secs: Some(5),
                models: vec!["llama3.2".to_string()],
                ..ApiConfig::default()
            },
        };

        let resolved = resolve_config(&ResolveOptions::default(), &config).unwrap();

        assert_eq!(resolved.model, "llama3.2");
        assert_eq!(resolved.retry, 4);
        assert_eq!(resolved.dump_dir, Some(PathBuf::from("file-dump")));
        assert_eq!(resolved.endpoint, "http://localhost:11434");
        assert_eq!(resolved.timeout, Duration::from_secs(5));
        assert_eq!(resolved.known_models, vec!["llama3.2".to_string()]);
    }

    #[test]
    fn test_resolve_config_model_defaults_to_first_known() {
        let config = ConfigFile {
            api: ApiConfig {
                models: vec!["mistral".to_string(), "llama3.2".to_string()],
                ..ApiConfig::default()
            },
            ..ConfigFile::default()
        };

        let resolved = resolve_config(&ResolveOptions::default(), &config).unwrap();
        assert_eq!(resolved.model, "mistral");
    }

    #[test]
    fn test_resolve_config_rejects_zero_retry() {
        let options = ResolveOptions {
            retry: Some(0),
            ..ResolveOptions::default()
        };

        let result = resolve_config(&options, &ConfigFile::default());

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("retry"));
    }

    #[test]
    fn test_resolve_config_unknown_model_is_accepted() {
        let options = ResolveOptions {
            model: Some("gpt-4o".to_string()),
            ..ResolveOptions::default()
        };

        let resolved = resolve_config(&options, &ConfigFile::default()).unwrap();
        assert_eq!(resolved.model, "gpt-4o");
    }
}
