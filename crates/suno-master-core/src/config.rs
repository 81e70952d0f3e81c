// Configuration: settings.toml, optional credentials.toml, environment.
//
// Layout relative to the working directory:
//
//   defaults/   shipped files, copied into config/ when missing
//   config/     settings.toml (required), credentials.toml (optional)
//
// The API key comes from credentials.toml and is overridden by the
// ANTHROPIC_API_KEY environment variable.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable that supplies (or overrides) the API key.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid `{field}`: {message}")]
    ValidationError { field: &'static str, message: String },

    #[error("failed to copy default config to {path}: {source}")]
    DefaultsCopyError { path: PathBuf, source: io::Error },

    #[error("failed to read instructions file {path}: {source}")]
    InstructionsRead { path: PathBuf, source: io::Error },
}

/// Fully loaded and validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub prompt: PromptConfig,
    pub credentials: CredentialsConfig,
}

impl Config {
    /// The API key, if one is configured and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.credentials
            .anthropic_api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
    }
}

/// `[llm]` table of settings.toml.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub max_tokens: u32,
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl LlmConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: "llm.model",
                message: "must not be empty".into(),
            });
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationError {
                field: "llm.max_tokens",
                message: "must be greater than 0".into(),
            });
        }
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::ValidationError {
                field: "llm.api_url",
                message: format!("expected an http(s) URL, got {:?}", self.api_url),
            });
        }
        Ok(())
    }
}

/// Prompt settings after the optional instructions file has been read.
#[derive(Debug, Clone, Default)]
pub struct PromptConfig {
    /// Replaces the built-in instruction preamble when set.
    pub custom_instructions: Option<String>,
}

/// Contents of credentials.toml.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsConfig {
    pub anthropic_api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SettingsFile {
    llm: LlmConfig,
    #[serde(default)]
    prompt: PromptTable,
}

#[derive(Debug, Default, Deserialize)]
struct PromptTable {
    /// Relative to the base directory.
    instructions_path: Option<PathBuf>,
}

/// Load `config/settings.toml`, `config/credentials.toml` (if present) and
/// the instructions file (if configured) under `base_dir`, then validate.
///
/// Neither the environment nor `defaults/` is consulted; `load_config` does
/// the full startup sequence.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    let settings: SettingsFile = read_toml(&config_dir.join("settings.toml"))?;

    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.is_file() {
        read_toml(&credentials_path)?
    } else {
        debug!("no credentials.toml, relying on {}", API_KEY_ENV);
        CredentialsConfig::default()
    };

    let custom_instructions = settings
        .prompt
        .instructions_path
        .filter(|rel| !rel.as_os_str().is_empty())
        .map(|rel| {
            let path = base_dir.join(rel);
            fs::read_to_string(&path)
                .map_err(|source| ConfigError::InstructionsRead { path, source })
        })
        .transpose()?;

    settings.llm.validate()?;

    Ok(Config {
        llm: settings.llm,
        prompt: PromptConfig {
            custom_instructions,
        },
        credentials,
    })
}

/// Use `env_key` as the API key when it is set and non-blank.
pub fn apply_api_key_override(config: &mut Config, env_key: Option<String>) {
    if let Some(key) = env_key.filter(|k| !k.trim().is_empty()) {
        config.credentials.anthropic_api_key = Some(key);
    }
}

/// Copy every file in `defaults/` that is missing from `config/`, skipping
/// `*.example` templates. Existing config files are never touched.
///
/// Returns the paths that were created. Without a `defaults/` directory an
/// existing `config/` is accepted as is.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.is_dir() {
        return if config_dir.is_dir() {
            Ok(Vec::new())
        } else {
            Err(ConfigError::FileNotFound { path: defaults_dir })
        };
    }

    fs::create_dir_all(&config_dir).map_err(copy_error(&config_dir))?;

    let mut created = Vec::new();
    for entry in fs::read_dir(&defaults_dir).map_err(copy_error(&defaults_dir))? {
        let src = entry.map_err(copy_error(&defaults_dir))?.path();
        if !src.is_file() || src.extension().is_some_and(|ext| ext == "example") {
            continue;
        }
        let Some(name) = src.file_name() else {
            continue;
        };

        let dst = config_dir.join(name);
        if copy_if_missing(&src, &dst).map_err(copy_error(&dst))? {
            info!("created {} from defaults", dst.display());
            created.push(dst);
        }
    }

    Ok(created)
}

/// Startup path: copy defaults into `./config`, load it, then apply the
/// `ANTHROPIC_API_KEY` override.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    let mut config = load_config_from(&cwd)?;
    apply_api_key_override(&mut config, std::env::var(API_KEY_ENV).ok());
    Ok(config)
}

fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::ParseError {
        path: path.to_path_buf(),
        source,
    })
}

fn copy_error(path: &Path) -> impl FnOnce(io::Error) -> ConfigError {
    let path = path.to_path_buf();
    move |source| ConfigError::DefaultsCopyError { path, source }
}

/// `Ok(false)` when `dst` already exists. `create_new` keeps a file written
/// concurrently by someone else intact.
fn copy_if_missing(src: &Path, dst: &Path) -> io::Result<bool> {
    let mut out = match OpenOptions::new().write(true).create_new(true).open(dst) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(e),
    };
    io::copy(&mut File::open(src)?, &mut out)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MINIMAL: &str = "[llm]\nmodel = \"m\"\nmax_tokens = 100\n";

    fn shipped_defaults() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../defaults")
    }

    /// Temp base dir with `config/settings.toml` and, optionally,
    /// `config/credentials.toml`.
    fn base_with(settings: &str, credentials: Option<&str>) -> TempDir {
        let tmp = TempDir::new().unwrap();
        let config_dir = tmp.path().join("config");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join("settings.toml"), settings).unwrap();
        if let Some(creds) = credentials {
            fs::write(config_dir.join("credentials.toml"), creds).unwrap();
        }
        tmp
    }

    fn validation_field(err: ConfigError) -> &'static str {
        match err {
            ConfigError::ValidationError { field, .. } => field,
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn shipped_settings_load() {
        let settings = fs::read_to_string(shipped_defaults().join("settings.toml")).unwrap();
        let tmp = base_with(&settings, None);

        let config = load_config_from(tmp.path()).unwrap();
        assert!(!config.llm.model.is_empty());
        assert!(config.llm.max_tokens >= 4096);
        assert_eq!(config.llm.api_url, DEFAULT_API_URL);
        assert!(config.prompt.custom_instructions.is_none());
        assert!(config.api_key().is_none());
    }

    #[test]
    fn shipped_credentials_example_parses() {
        let text = fs::read_to_string(shipped_defaults().join("credentials.toml.example")).unwrap();
        let creds: CredentialsConfig = toml::from_str(&text).unwrap();
        assert!(creds.anthropic_api_key.is_some());
    }

    #[test]
    fn api_key_from_credentials_file() {
        let tmp = base_with(MINIMAL, Some("anthropic_api_key = \"sk-ant-test-key\"\n"));
        let config = load_config_from(tmp.path()).unwrap();
        assert_eq!(config.api_key(), Some("sk-ant-test-key"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let tmp = base_with(MINIMAL, Some("anthropic_api_key = \"  \"\n"));
        let config = load_config_from(tmp.path()).unwrap();
        assert!(config.api_key().is_none());
    }

    #[test]
    fn env_key_override() {
        let tmp = base_with(MINIMAL, Some("anthropic_api_key = \"file\"\n"));
        let mut config = load_config_from(tmp.path()).unwrap();

        apply_api_key_override(&mut config, None);
        assert_eq!(config.api_key(), Some("file"));
        apply_api_key_override(&mut config, Some(" ".to_string()));
        assert_eq!(config.api_key(), Some("file"), "blank env value is ignored");
        apply_api_key_override(&mut config, Some("from-env".to_string()));
        assert_eq!(config.api_key(), Some("from-env"));
    }

    #[test]
    fn env_key_works_without_credentials_file() {
        let tmp = base_with(MINIMAL, None);
        let mut config = load_config_from(tmp.path()).unwrap();
        apply_api_key_override(&mut config, Some("sk-env".to_string()));
        assert_eq!(config.api_key(), Some("sk-env"));
    }

    #[test]
    fn custom_api_url() {
        let tmp = base_with(
            "[llm]\nmodel = \"m\"\nmax_tokens = 100\napi_url = \"http://127.0.0.1:9999/v1/messages\"\n",
            None,
        );
        let config = load_config_from(tmp.path()).unwrap();
        assert_eq!(config.llm.api_url, "http://127.0.0.1:9999/v1/messages");
    }

    #[test]
    fn instructions_file_replaces_preamble() {
        let tmp = base_with(
            "[llm]\nmodel = \"m\"\nmax_tokens = 100\n\n[prompt]\ninstructions_path = \"my_rules.txt\"\n",
            None,
        );
        fs::write(tmp.path().join("my_rules.txt"), "Write sea shanties only.").unwrap();

        let config = load_config_from(tmp.path()).unwrap();
        assert_eq!(
            config.prompt.custom_instructions.as_deref(),
            Some("Write sea shanties only.")
        );
    }

    #[test]
    fn empty_prompt_table_is_fine() {
        let tmp = base_with("[llm]\nmodel = \"m\"\nmax_tokens = 100\n\n[prompt]\n", None);
        let config = load_config_from(tmp.path()).unwrap();
        assert!(config.prompt.custom_instructions.is_none());
    }

    #[test]
    fn missing_instructions_file() {
        let tmp = base_with(
            "[llm]\nmodel = \"m\"\nmax_tokens = 100\n\n[prompt]\ninstructions_path = \"nope.txt\"\n",
            None,
        );
        match load_config_from(tmp.path()).unwrap_err() {
            ConfigError::InstructionsRead { path, .. } => assert!(path.ends_with("nope.txt")),
            other => panic!("expected InstructionsRead, got: {other}"),
        }
    }

    #[test]
    fn validation_failures() {
        let cases = [
            ("[llm]\nmodel = \"m\"\nmax_tokens = 0\n", "llm.max_tokens"),
            ("[llm]\nmodel = \" \"\nmax_tokens = 10\n", "llm.model"),
            (
                "[llm]\nmodel = \"m\"\nmax_tokens = 10\napi_url = \"ftp://example\"\n",
                "llm.api_url",
            ),
        ];
        for (settings, field) in cases {
            let tmp = base_with(settings, None);
            assert_eq!(validation_field(load_config_from(tmp.path()).unwrap_err()), field);
        }
    }

    #[test]
    fn missing_settings_file() {
        let tmp = TempDir::new().unwrap();
        match load_config_from(tmp.path()).unwrap_err() {
            ConfigError::FileNotFound { path } => assert!(path.ends_with("settings.toml")),
            other => panic!("expected FileNotFound, got: {other}"),
        }
    }

    #[test]
    fn malformed_settings_and_credentials() {
        let tmp = base_with("this is not valid [[[ toml", None);
        match load_config_from(tmp.path()).unwrap_err() {
            ConfigError::ParseError { path, .. } => assert!(path.ends_with("settings.toml")),
            other => panic!("expected ParseError, got: {other}"),
        }

        let tmp = base_with(MINIMAL, Some("anthropic_api_key = 42\n"));
        match load_config_from(tmp.path()).unwrap_err() {
            ConfigError::ParseError { path, .. } => assert!(path.ends_with("credentials.toml")),
            other => panic!("expected ParseError, got: {other}"),
        }
    }

    fn with_defaults() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let defaults = tmp.path().join("defaults");
        fs::create_dir_all(&defaults).unwrap();
        fs::copy(
            shipped_defaults().join("settings.toml"),
            defaults.join("settings.toml"),
        )
        .unwrap();
        fs::write(
            defaults.join("credentials.toml.example"),
            "anthropic_api_key = \"sk-ant-...\"\n",
        )
        .unwrap();
        tmp
    }

    #[test]
    fn defaults_are_copied_except_examples() {
        let tmp = with_defaults();

        let created = ensure_config_files(tmp.path()).unwrap();
        assert_eq!(created, vec![tmp.path().join("config").join("settings.toml")]);
        assert!(!tmp.path().join("config/credentials.toml.example").exists());

        // Second run has nothing to do.
        assert!(ensure_config_files(tmp.path()).unwrap().is_empty());
        assert!(load_config_from(tmp.path()).is_ok());
    }

    #[test]
    fn existing_config_is_left_alone() {
        let tmp = with_defaults();
        let config_dir = tmp.path().join("config");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join("settings.toml"), "# mine\n").unwrap();

        assert!(ensure_config_files(tmp.path()).unwrap().is_empty());
        assert_eq!(
            fs::read_to_string(config_dir.join("settings.toml")).unwrap(),
            "# mine\n"
        );
    }

    #[test]
    fn config_dir_alone_is_accepted() {
        let tmp = base_with(MINIMAL, None);
        assert!(ensure_config_files(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn no_defaults_and_no_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        match ensure_config_files(tmp.path()).unwrap_err() {
            ConfigError::FileNotFound { path } => assert!(path.ends_with("defaults")),
            other => panic!("expected FileNotFound, got: {other}"),
        }
    }
}
