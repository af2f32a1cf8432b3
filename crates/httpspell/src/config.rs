use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use httpspell_core::{BatchOptions, CacheOptions, EvictionPolicy};

pub const HTTPSPELL_CONFIG_FILE: &str = "httpspell.toml";

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    // Document root for static files
    pub root: PathBuf,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3001,
            root: PathBuf::from("app"),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DictConfig {
    // Where to find <lang>.aff and <lang>.dic
    pub base: PathBuf,
    // Used when the request does not say which language to use
    pub lang: String,
    pub load_timeout_ms: Option<u64>,
    pub batch_timeout_ms: Option<u64>,
    pub max_suggestions: Option<usize>,
    // Words of one request checked at the same time, defaults to the CPU count
    pub max_concurrency: Option<usize>,
    pub eviction: EvictionPolicy,
}

impl Default for DictConfig {
    fn default() -> Self {
        Self {
            base: PathBuf::from("dict"),
            lang: "ko".to_string(),
            load_timeout_ms: None,
            batch_timeout_ms: None,
            max_suggestions: None,
            max_concurrency: None,
            eviction: EvictionPolicy::KeepForever,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub http: HttpConfig,
    pub dict: DictConfig,
}

impl Config {
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(config_path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("While reading {}", config_path.display()))?;
        Self::parse(&contents).with_context(|| format!("While parsing {}", config_path.display()))
    }

    /// Use the given config file, or `httpspell.toml` in the working
    /// directory if it exists, or the defaults
    pub fn find(config_path: Option<&Path>) -> Result<Self> {
        if let Some(p) = config_path {
            return Self::load(p);
        }
        let default_path = Path::new(HTTPSPELL_CONFIG_FILE);
        if default_path.exists() {
            Self::load(default_path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        if let EvictionPolicy::Lru { capacity: 0 } = self.dict.eviction {
            bail!("dict.eviction.capacity must be at least 1");
        }
        if self.dict.max_concurrency == Some(0) {
            bail!("dict.max_concurrency must be at least 1");
        }
        if self.dict.lang.is_empty() {
            bail!("dict.lang must not be empty");
        }
        Ok(())
    }

    pub fn cache_options(&self) -> CacheOptions {
        CacheOptions {
            dictionary_root: self.dict.base.clone(),
            load_timeout: self.dict.load_timeout_ms.map(Duration::from_millis),
            eviction: self.dict.eviction,
        }
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            timeout: self.dict.batch_timeout_ms.map(Duration::from_millis),
            max_suggestions: self.dict.max_suggestions,
            max_concurrency: self.dict.max_concurrency,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.http.host, self.http.port)
    }
}
