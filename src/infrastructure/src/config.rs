use anyhow::Context;
use dotenvy::dotenv;
use serde_json::{Map, Value};
use shared::error::SessionError;
use shared::types::Result;
use shared::PROGRAM_NAME;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const KEY_LOG_PATH: &str = "log_path";
pub const KEY_LOG_LEVEL: &str = "log_level";
pub const KEY_OPENAI_KEY: &str = "openai_key";
pub const KEY_OPENAI_BASE_URL: &str = "openai_base_url";

pub const DEFAULT_LOG_FILE: &str = "user_program.log";
pub const DEFAULT_LOG_LEVEL: &str = "WARNING";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

const CONFIG_FILE: &str = "config.json";

/// `~/.config/agcl`, the directory holding the config file and the default log.
pub fn program_folder() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| {
        SessionError::Configuration("cannot determine the home directory".to_string())
    })?;
    Ok(home.join(".config").join(PROGRAM_NAME))
}

/// JSON-object configuration persisted under the program folder.
///
/// Built once at startup and handed to whoever needs it. Every `set` is
/// written through to disk, and missing keys get their defaults the first
/// time they are read.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    folder: PathBuf,
    values: Map<String, Value>,
    env_openai_key: Option<String>,
}

impl ConfigStore {
    /// Loads `~/.config/agcl/config.json`, honouring `.env` and `OPENAI_API_KEY`.
    pub fn load() -> Result<Self> {
        dotenv().ok();
        let store = Self::load_from(&program_folder()?)?;
        Ok(store.with_env_key(env::var("OPENAI_API_KEY").ok()))
    }

    /// Key that takes precedence over the stored one and is never persisted.
    pub fn with_env_key(mut self, key: Option<String>) -> Self {
        self.env_openai_key = key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        self
    }

    /// Loads the config file inside `folder`, creating `{}` if it is missing.
    pub fn load_from(folder: &Path) -> Result<Self> {
        fs::create_dir_all(folder)
            .with_context(|| format!("Failed to create config folder {}", folder.display()))?;
        let path = folder.join(CONFIG_FILE);

        let values = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            match serde_json::from_str::<Value>(&content).map_err(SessionError::from)? {
                Value::Object(map) => map,
                other => {
                    return Err(SessionError::Configuration(format!(
                        "{} must contain a JSON object, found {}",
                        path.display(),
                        other
                    ))
                    .into())
                }
            }
        } else {
            Map::new()
        };

        let store = Self {
            path,
            folder: folder.to_path_buf(),
            values,
            env_openai_key: None,
        };
        if !store.path.exists() {
            store.save()?;
        }
        tracing::debug!("Loaded config from {}", store.path.display());
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        self.values.insert(key.to_string(), value.into());
        self.save()
    }

    fn save(&self) -> Result<()> {
        let content =
            serde_json::to_string_pretty(&Value::Object(self.values.clone())).map_err(SessionError::from)?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write config {}", self.path.display()))?;
        Ok(())
    }

    /// Session log location, defaulting to `<folder>/user_program.log`.
    pub fn log_path(&mut self) -> Result<PathBuf> {
        if let Some(path) = self.get_str(KEY_LOG_PATH) {
            return Ok(PathBuf::from(path));
        }
        let path = self.folder.join(DEFAULT_LOG_FILE);
        tracing::info!("Log file not set, setting to {}", path.display());
        self.set(KEY_LOG_PATH, path.to_string_lossy().to_string())?;
        Ok(path)
    }

    /// Severity name such as `WARNING` or `DEBUG`.
    pub fn log_level(&mut self) -> Result<String> {
        if let Some(level) = self.get_str(KEY_LOG_LEVEL) {
            return Ok(level.to_string());
        }
        self.set(KEY_LOG_LEVEL, DEFAULT_LOG_LEVEL)?;
        Ok(DEFAULT_LOG_LEVEL.to_string())
    }

    /// API key from the environment, then from the config file.
    pub fn openai_key(&self) -> Option<String> {
        self.env_openai_key
            .clone()
            .or_else(|| self.get_str(KEY_OPENAI_KEY).map(str::to_string))
    }

    /// Returns the API key, asking for it through `prompt` and persisting the
    /// answer when none is configured.
    pub fn ensure_openai_key<F>(&mut self, prompt: F) -> Result<String>
    where
        F: FnOnce() -> Result<String>,
    {
        if let Some(key) = self.openai_key() {
            return Ok(key);
        }
        tracing::info!("No OpenAI key configured");
        let key = prompt()?.trim().to_string();
        if key.is_empty() {
            return Err(SessionError::Configuration("an OpenAI key is required".to_string()).into());
        }
        self.set(KEY_OPENAI_KEY, key.clone())?;
        Ok(key)
    }

    pub fn openai_base_url(&self) -> String {
        self.get_str(KEY_OPENAI_BASE_URL)
            .unwrap_or(DEFAULT_OPENAI_BASE_URL)
            .trim_end_matches('/')
            .to_string()
    }
}
