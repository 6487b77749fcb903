//! API key storage and resolution.

use anyhow::{Context, Result, anyhow, bail};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::runtime::Runtime;

/// Environment variable consulted before the stored key.
pub const TOKEN_ENV_VAR: &str = "GLOSSA_API_TOKEN";

#[derive(Serialize, Deserialize, Debug, Default)]
struct StoredConfig {
    #[serde(rename = "apiKey", skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
}

/// Stores the API key in `<config_dir>/glossa/config.json`.
pub struct CredentialStore<'a, R: Runtime> {
    runtime: &'a R,
}

impl<'a, R: Runtime> CredentialStore<'a, R> {
    pub fn new(runtime: &'a R) -> Self {
        Self { runtime }
    }

    fn config_path(&self) -> Result<PathBuf> {
        let dir = self
            .runtime
            .config_dir()
            .ok_or_else(|| anyhow!("Could not determine the user config directory"))?;
        Ok(dir.join("glossa").join("config.json"))
    }

    fn load(&self) -> Result<StoredConfig> {
        let path = self.config_path()?;
        if !self.runtime.exists(&path) {
            return Ok(StoredConfig::default());
        }

        let contents = self.runtime.read_to_string(&path)?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Malformed config file at {}", path.display()))
    }

    fn save(&self, config: &StoredConfig) -> Result<()> {
        let path = self.config_path()?;
        if let Some(parent) = path.parent() {
            self.runtime.create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(config)?;
        self.runtime.write(&path, contents.as_bytes())?;
        debug!("Config written to {}", path.display());
        Ok(())
    }

    /// Returns the stored key, if any.
    pub fn stored_key(&self) -> Result<Option<String>> {
        Ok(self.load()?.api_key)
    }

    pub fn set_key(&self, api_key: &str) -> Result<()> {
        let mut config = self.load().unwrap_or_default();
        config.api_key = Some(api_key.trim().to_string());
        self.save(&config)
    }

    pub fn reset(&self) -> Result<()> {
        let path = self.config_path()?;
        if self.runtime.exists(&path) {
            self.runtime.remove_file(&path)?;
        }
        Ok(())
    }

    /// Returns the stored key, prompting for one (and saving it) when absent.
    pub fn get_or_prompt(&self) -> Result<String> {
        if let Some(key) = self.stored_key()? {
            return Ok(key);
        }

        let key = self
            .runtime
            .read_line("Enter your Glossa API key: ")?
            .trim()
            .to_string();
        if key.is_empty() {
            bail!("API key is required");
        }

        self.set_key(&key)?;
        println!("API key saved");
        Ok(key)
    }

    /// Resolution order: explicit flag, then environment, then the stored key
    /// (prompting interactively when nothing is stored). In CI a missing
    /// token is an error instead of a prompt.
    pub fn resolve_token(&self, cli_token: Option<&str>) -> Result<String> {
        if let Some(token) = cli_token.map(str::trim).filter(|t| !t.is_empty()) {
            return Ok(token.to_string());
        }

        if let Ok(token) = self.runtime.env_var(TOKEN_ENV_VAR) {
            let token = token.trim().to_string();
            if !token.is_empty() {
                return Ok(token);
            }
        }

        if self.runtime.env_var("CI").is_ok() {
            bail!(
                "Missing API token. Provide --api-token or set {}.",
                TOKEN_ENV_VAR
            );
        }

        self.get_or_prompt()
    }
}
