use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::Subscriber;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::Layer;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::layer::SubscriberExt;

const DEFAULT_LOG_DIR: &str = "log";
const DEFAULT_LOG_FILE: &str = "embedding.log";

fn default_file_name() -> Option<String> {
    Some(DEFAULT_LOG_FILE.to_string())
}
fn default_file_dir() -> Option<String> {
    Some(DEFAULT_LOG_DIR.to_string())
}
fn default_use_stdout() -> bool {
    true
}

/// Logging settings, read from `LOG_*` environment variables.
///
/// By default records go both to `log/embedding.log` and to stdout.
#[derive(Deserialize, Debug, Clone)]
pub struct LoggingConfig {
    #[serde(default)]
    pub app_name: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default = "default_file_name")]
    pub file_name: Option<String>,
    #[serde(default = "default_file_dir")]
    pub file_dir: Option<String>,
    #[serde(default)]
    pub use_json: bool,
    #[serde(default = "default_use_stdout")]
    pub use_stdout: bool,
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self {
            app_name: None,
            level: None,
            file_name: default_file_name(),
            file_dir: default_file_dir(),
            use_json: false,
            use_stdout: default_use_stdout(),
        }
    }

    /// stdout only, no log file
    pub fn stdout_only() -> Self {
        Self {
            file_name: None,
            ..Self::new()
        }
    }

    fn max_level(&self) -> tracing::Level {
        self.level
            .as_deref()
            .and_then(|lv| tracing::Level::from_str(lv).ok())
            .unwrap_or(tracing::Level::INFO)
    }

    fn log_file_path(&self) -> Option<PathBuf> {
        let file_name = self.file_name.as_deref()?;
        let dir = self.file_dir.as_deref().unwrap_or(".");
        Some(PathBuf::from(dir).join(file_name))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub fn load_tracing_config_from_env() -> Result<LoggingConfig> {
    envy::prefixed("LOG_")
        .from_env::<LoggingConfig>()
        .context("cannot read logging config from env:")
}

pub fn tracing_init(conf: LoggingConfig) -> Result<()> {
    let subscriber = setup_layer_from_logging_config(&conf)?;
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;
    Ok(())
}

pub fn tracing_init_from_env() -> Result<()> {
    match load_tracing_config_from_env() {
        Ok(conf) => tracing_init(conf),
        Err(e) => {
            tracing::warn!("failed to load logging config from env: {:?}", e);
            Err(e)
        }
    }
}

fn create_log_file(conf: &LoggingConfig) -> Result<Option<File>> {
    let Some(path) = conf.log_file_path() else {
        return Ok(None);
    };
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create log file directory: {:?}", dir))?;
    }
    let file =
        File::create(&path).with_context(|| format!("create log file to {:?}", path.as_os_str()))?;
    Ok(Some(file))
}

pub fn setup_layer_from_logging_config(
    conf: &LoggingConfig,
) -> Result<Box<dyn Subscriber + Send + Sync + 'static>> {
    let lv = conf.max_level();
    // RUST_LOG overrides the configured level; http internals stay quiet
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(lv).into())
        .from_env_lossy()
        .add_directive("hyper=off".parse()?)
        .add_directive("hyper_util=off".parse()?);

    let (json_file, plain_file) = match create_log_file(conf)? {
        Some(f) if conf.use_json => (Some(f), None),
        Some(f) => (None, Some(f)),
        None => (None, None),
    };

    let subscriber = Box::new(
        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_file.map(|f| {
                Layer::new()
                    .with_writer(f.with_max_level(lv))
                    .with_ansi(false)
                    .json()
            }))
            .with(plain_file.map(|f| {
                Layer::new()
                    .with_writer(f.with_max_level(lv))
                    .with_ansi(false)
            }))
            .with(if !conf.use_json && conf.use_stdout {
                Some(tracing_subscriber::fmt::layer().pretty())
            } else {
                None
            })
            .with(if conf.use_json && conf.use_stdout {
                Some(tracing_subscriber::fmt::layer().json())
            } else {
                None
            }),
    );
    if let Some(name) = conf.app_name.as_deref() {
        tracing::debug!("logging initialized for {}", name);
    }
    Ok(subscriber)
}

// for simple stdout logging
pub fn tracing_init_test(level: tracing::Level) {
    let _ = tracing_subscriber::fmt().with_max_level(level).try_init();
}
