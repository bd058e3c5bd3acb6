//! Configuration file management and resolution of CLI overrides.

mod manager;

pub use manager::{
    ApiConfig, ChatConfig, ConfigFile, ConfigManager, DEFAULT_API_KEY_ENV, DEFAULT_ENDPOINT,
    DEFAULT_MODELS, DEFAULT_RETRY, DEFAULT_TIMEOUT_SECS, ResolveOptions, ResolvedConfig,
    resolve_config,
};
