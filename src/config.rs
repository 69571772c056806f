//! Configuration loading from a TOML file and environment variables.
//!
//! Precedence (highest wins):
//! 1. Environment variables (`JIB_SHELL`, `JIB_*_COLOR`, `OPENAI_*`)
//! 2. TOML file given via `--config`
//! 3. `$XDG_CONFIG_HOME/jib/jib.toml` (or `~/.config/jib/jib.toml`)
//! 4. Built-in defaults
//!
//! The loaded value is constructed once at startup and passed explicitly to
//! the collaborators that need it; nothing reads it as ambient global state.

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_SHELL: &str = "bash";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Shell binary used by every execution strategy.
    pub shell: String,
    pub colors: ColorConfig,
    pub agent: AgentConfig,
}

/// Color names for the prompt, branch decoration, and error messages.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ColorConfig {
    pub prompt: String,
    pub branch: String,
    pub error: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            prompt: "cyan".into(),
            branch: "magenta".into(),
            error: "red".into(),
        }
    }
}

/// Assistant provider settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AgentConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.into(),
            base_url: DEFAULT_API_BASE_URL.into(),
        }
    }
}

/// On-disk file shape. Every section is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    shell: Option<String>,
    colors: ColorConfig,
    agent: AgentConfig,
}

/// Load configuration, merging file, environment, and defaults.
///
/// A missing file is not an error; a present-but-unparsable one is.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let file = match resolve_path(path) {
        Some(p) if p.exists() => {
            let text = std::fs::read_to_string(&p)?;
            toml::from_str::<ConfigFile>(&text)?
        }
        _ => ConfigFile::default(),
    };

    let mut config = Config {
        shell: file.shell.unwrap_or_else(|| DEFAULT_SHELL.into()),
        colors: file.colors,
        agent: file.agent,
    };

    if let Some(v) = nonempty_env("JIB_SHELL") {
        config.shell = v;
    }
    if let Some(v) = nonempty_env("JIB_PROMPT_COLOR") {
        config.colors.prompt = v;
    }
    if let Some(v) = nonempty_env("JIB_BRANCH_COLOR") {
        config.colors.branch = v;
    }
    if let Some(v) = nonempty_env("JIB_ERROR_COLOR") {
        config.colors.error = v;
    }
    if let Some(v) = nonempty_env("OPENAI_API_KEY") {
        config.agent.api_key = v;
    }
    if let Some(v) = nonempty_env("OPENAI_MODEL") {
        config.agent.model = v;
    }
    if let Some(v) = nonempty_env("OPENAI_API_BASE") {
        config.agent.base_url = v;
    }

    Ok(config)
}

fn resolve_path(explicit: Option<&str>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return Some(PathBuf::from(p));
    }
    dirs::config_dir().map(|d| d.join("jib").join("jib.toml"))
}

fn nonempty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// ANSI escape code for a named color.
///
/// Already-escaped values pass through unchanged so config files can carry
/// raw codes; unknown names disable coloring for that slot.
pub fn ansi_code(name: &str) -> String {
    match name.to_ascii_lowercase().as_str() {
        "black" => "\x1b[30m".into(),
        "red" => "\x1b[31m".into(),
        "green" => "\x1b[32m".into(),
        "yellow" => "\x1b[33m".into(),
        "blue" => "\x1b[34m".into(),
        "magenta" => "\x1b[35m".into(),
        "cyan" => "\x1b[36m".into(),
        "white" => "\x1b[37m".into(),
        _ if name.starts_with("\x1b[") => name.into(),
        _ => String::new(),
    }
}

/// ANSI reset sequence closing any color opened by [`ansi_code`].
pub const RESET: &str = "\x1b[0m";

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_when_no_file_is_present() {
        let config = load_config(Some("/nonexistent/jib-test.toml")).unwrap();
        assert_eq!(config.shell, "bash");
        assert_eq!(config.colors, ColorConfig::default());
        assert_eq!(config.agent.base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("jib-config-test-{}.toml", std::process::id()));
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            "shell = \"sh\"\n\n[colors]\nprompt = \"green\"\n\n[agent]\nmodel = \"local-model\""
        )
        .unwrap();

        let config = load_config(path.to_str()).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(config.shell, "sh");
        assert_eq!(config.colors.prompt, "green");
        assert_eq!(config.colors.error, "red"); // untouched default
        assert_eq!(config.agent.model, "local-model");
    }

    #[test]
    fn unparsable_file_is_an_error() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("jib-config-bad-{}.toml", std::process::id()));
        std::fs::write(&path, "shell = [unclosed").unwrap();
        let err = load_config(path.to_str()).unwrap_err();
        let _ = std::fs::remove_file(&path);
        assert!(err.to_string().starts_with("toml:"));
    }

    #[test]
    fn named_colors_resolve_to_ansi_codes() {
        assert_eq!(ansi_code("cyan"), "\x1b[36m");
        assert_eq!(ansi_code("RED"), "\x1b[31m");
        assert_eq!(ansi_code("\x1b[95m"), "\x1b[95m"); // raw code passthrough
        assert_eq!(ansi_code("mauve-ish"), "");
    }
}
