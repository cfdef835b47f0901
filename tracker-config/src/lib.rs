//! Loader for tracker configuration with YAML + environment overlays.
//!
//! Precedence, lowest first: built-in defaults, YAML files/snippets in the
//! order they were attached, then `TRACKER__`-prefixed environment variables
//! (`__` separates nesting levels, e.g. `TRACKER__BROWSER__CONTAINERIZED=true`).
//! After merging, `${VAR}` placeholders inside string values are expanded.
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracker_common::observability::{LogConfig, LogFormat};
use tracker_common::{DEFAULT_TARGETS, Target, TrackerError};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "TRACKER";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub version: Option<String>,
    /// Pages to visit, in order.
    pub targets: Vec<String>,
    pub ledger: LedgerConfig,
    pub browser: BrowserConfig,
    /// Absent means notifications are disabled.
    pub mail: Option<MailConfig>,
    pub logging: LoggingConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            version: None,
            targets: DEFAULT_TARGETS.iter().map(|t| t.to_string()).collect(),
            ledger: LedgerConfig::default(),
            browser: BrowserConfig::default(),
            mail: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl TrackerConfig {
    /// Validate the configured target list.
    ///
    /// ```
    /// use tracker_config::TrackerConfigLoader;
    ///
    /// let cfg = TrackerConfigLoader::new()
    ///     .with_yaml_str("targets: ['https://capital.com/']")
    ///     .load()
    ///     .unwrap();
    /// let targets = cfg.targets().unwrap();
    /// assert_eq!(targets[0].as_str(), "https://capital.com/");
    /// ```
    pub fn targets(&self) -> tracker_common::Result<Vec<Target>> {
        if self.targets.is_empty() {
            return Err(TrackerError::Config(
                "at least one target URL must be configured".into(),
            ));
        }
        self.targets.iter().map(|raw| Target::parse(raw)).collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub path: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data").join("data.txt"),
        }
    }
}

/// Browser session settings.
///
/// `containerized` only selects which WebDriver endpoint sessions are opened
/// on; every other setting applies to both topologies.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub containerized: bool,
    pub local_endpoint: String,
    pub remote_endpoint: String,
    pub headless: bool,
    pub user_agent: String,
    pub window_size: (u32, u32),
    pub languages: Vec<String>,
    pub page_load_timeout_secs: u64,
    pub settle_millis: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            containerized: false,
            local_endpoint: "http://localhost:9515".into(),
            remote_endpoint: "http://selenium:4444/wd/hub".into(),
            headless: true,
            user_agent: DEFAULT_USER_AGENT.into(),
            window_size: (1920, 1080),
            languages: vec!["en-US".into(), "en".into()],
            page_load_timeout_secs: 30,
            settle_millis: 1000,
        }
    }
}

impl BrowserConfig {
    /// WebDriver endpoint for the current deployment topology.
    pub fn endpoint(&self) -> &str {
        if self.containerized {
            &self.remote_endpoint
        } else {
            &self.local_endpoint
        }
    }

    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_millis)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailSecurity {
    /// Plain connection upgraded with STARTTLS (usually port 587).
    #[default]
    Starttls,
    /// TLS from the first byte (usually port 465).
    Tls,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    #[serde(default = "default_relay")]
    pub relay: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub security: MailSecurity,
    pub from: String,
    pub to: String,
    /// Login name on the relay; defaults to `from`.
    #[serde(default)]
    pub username: Option<String>,
    /// Environment variable holding the relay password, read at send time.
    #[serde(default = "default_password_env")]
    pub password_env: String,
    #[serde(default = "default_subject")]
    pub subject: String,
    #[serde(default = "default_body")]
    pub body: String,
}

impl MailConfig {
    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.from)
    }
}

fn default_relay() -> String {
    "smtp.gmail.com".into()
}
fn default_port() -> u16 {
    587
}
fn default_password_env() -> String {
    "EMAIL_PASSWORD".into()
}
fn default_subject() -> String {
    "Gambling broker tracker".into()
}
fn default_body() -> String {
    "Attached is the CFD retail-loss disclosure ledger.".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: Option<PathBuf>,
    pub format: LogFormat,
    pub stderr: bool,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: None,
            format: LogFormat::Text,
            stderr: true,
            filter: "info".into(),
        }
    }
}

impl LoggingConfig {
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            log_dir: self.dir.clone(),
            emit_stderr: self.stderr,
            format: self.format,
            default_filter: self.filter.clone(),
            ..LogConfig::default()
        }
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct TrackerConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for TrackerConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackerConfigLoader {
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is merged only when present.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    ///
    /// ```
    /// use tracker_config::TrackerConfigLoader;
    ///
    /// let cfg = TrackerConfigLoader::new()
    ///     .with_yaml_str("browser:\n  containerized: true\n")
    ///     .load()
    ///     .unwrap();
    /// assert_eq!(cfg.browser.endpoint(), "http://selenium:4444/wd/hub");
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Merge all sources, apply environment overrides and `${VAR}` expansion,
    /// then deserialize into [`TrackerConfig`].
    pub fn load(self) -> Result<TrackerConfig, ConfigError> {
        // Added last so the environment wins over every file.
        let env = Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("targets");
        let cfg = self.builder.add_source(env).build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}
