use crate::cli_args::Cli;
use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_HOST: &str = "api.openai.com";
const DEFAULT_PORT: u16 = 443;
const DEFAULT_PATH: &str = "/v1/chat/completions";
const DEFAULT_TIMEOUT_SECS: u64 = 90;

/// Final resolved configuration, built once in `main`.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_token: String,
    pub model: String,
    pub api_host: String,
    pub api_port: u16,
    pub api_path: String,
    pub timeout: Duration,
}

/// One source of settings. Unset fields fall through to the next layer.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ConfigLayer {
    pub api_token: Option<String>,
    pub model: Option<String>,
    pub api_host: Option<String>,
    pub api_port: Option<u16>,
    pub api_path: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Build the final config from CLI flags, environment, TOML file, and defaults.
    ///
    /// Precedence:
    ///   1. CLI flags (`--api-token`, `--model`, `--timeout`)
    ///   2. Env vars `AI_API_TOKEN`, `AI_API_MODEL`, `AI_API_HOST`, `AI_API_PORT`,
    ///      `AI_API_PATH`, `AI_API_TIMEOUT`
    ///   3. TOML `~/.config/semcommit.toml`
    ///   4. Hardcoded defaults
    pub fn from_sources(cli: &Cli) -> Result<Self> {
        let file_cfg = load_file_config()?.unwrap_or_default();
        let env_cfg = ConfigLayer::from_env()?;
        let cli_cfg = ConfigLayer::from_cli(cli);

        Self::resolve(&[cli_cfg, env_cfg, file_cfg])
    }

    /// Merge layers, first one wins.
    pub fn resolve(layers: &[ConfigLayer]) -> Result<Self> {
        fn pick<T>(layers: &[ConfigLayer], f: impl Fn(&ConfigLayer) -> Option<T>) -> Option<T> {
            layers.iter().find_map(f)
        }

        // Blank strings count as unset so they fall through to the next layer.
        fn pick_str(layers: &[ConfigLayer], f: impl Fn(&ConfigLayer) -> &Option<String>) -> Option<String> {
            pick(layers, |l| f(l).as_deref().map(str::trim).filter(|v| !v.is_empty()).map(String::from))
        }

        let api_token = pick_str(layers, |l| &l.api_token).ok_or_else(|| {
            anyhow!("AI_API_TOKEN must be set via env var, --api-token, or ~/.config/semcommit.toml")
        })?;

        let model = pick_str(layers, |l| &l.model).unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_host = pick_str(layers, |l| &l.api_host).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let api_port = pick(layers, |l| l.api_port).unwrap_or(DEFAULT_PORT);
        let api_path = pick_str(layers, |l| &l.api_path).unwrap_or_else(|| DEFAULT_PATH.to_string());
        let timeout_secs = pick(layers, |l| l.timeout_secs).unwrap_or(DEFAULT_TIMEOUT_SECS);

        let api_path = if api_path.starts_with('/') {
            api_path
        } else {
            format!("/{api_path}")
        };

        Ok(Config {
            api_token,
            model,
            api_host,
            api_port,
            api_path,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// `https://<host>:<port><path>`
    pub fn endpoint(&self) -> String {
        format!("https://{}:{}{}", self.api_host, self.api_port, self.api_path)
    }
}

impl ConfigLayer {
    pub fn from_cli(cli: &Cli) -> Self {
        ConfigLayer {
            api_token: cli.api_token.clone(),
            model: cli.model.clone(),
            timeout_secs: cli.timeout,
            ..Default::default()
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_port = lookup("AI_API_PORT")
            .map(|v| v.trim().parse::<u16>().with_context(|| format!("AI_API_PORT is not a valid port: {v:?}")))
            .transpose()?;
        let timeout_secs = lookup("AI_API_TIMEOUT")
            .map(|v| v.trim().parse::<u64>().with_context(|| format!("AI_API_TIMEOUT is not a number of seconds: {v:?}")))
            .transpose()?;

        Ok(ConfigLayer {
            api_token: lookup("AI_API_TOKEN"),
            model: lookup("AI_API_MODEL"),
            api_host: lookup("AI_API_HOST"),
            api_port,
            api_path: lookup("AI_API_PATH"),
            timeout_secs,
        })
    }
}

/// Return `~/.config/semcommit.toml`
fn config_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(home.join(".config").join("semcommit.toml"))
}

fn load_file_config() -> Result<Option<ConfigLayer>> {
    let Some(path) = config_path() else {
        return Ok(None);
    };
    if !path.exists() {
        return Ok(None);
    }

    let data = fs::read_to_string(&path).with_context(|| format!("failed to read {path:?}"))?;
    let layer = toml::from_str::<ConfigLayer>(&data).with_context(|| format!("failed to parse {path:?}"))?;
    log::debug!("Loaded config file {path:?}");
    Ok(Some(layer))
}
