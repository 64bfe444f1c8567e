//! every available configuration option and its type is listed in this file
use {
    crate::{
        complete::CompletionSettings,
        config::validate::{Validate, format_validation_errors},
        loader::{DEFAULT_DATA_URL, DEFAULT_MANIFEST_URL, HttpSettings, SourceDescriptor},
    },
    color_eyre::{
        Section, SectionExt,
        eyre::{Context, OptionExt, Result, eyre},
    },
    config::{Config, ConfigBuilder},
    schemars::JsonSchema,
    serde::{Deserialize, Serialize},
    smart_default::SmartDefault,
    std::{
        path::{Path, PathBuf},
        time::Duration,
    },
    tracing::info,
};

/// the file name looked for in the config dir and the working directory's ancestors
pub const CONFIG_FILE_NAME: &str = "tagcomplete.toml";

/// the prefix for environment overrides
pub const ENV_PREFIX: &str = "TAGCOMPLETE";

/// Where tag datasets come from
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, SmartDefault)]
#[schemars(default)]
pub struct SourcesCfg {
    /// The URL relative source URLs are resolved against
    #[schemars(url)]
    #[default(Some("http://127.0.0.1:8080/".to_string()))]
    pub base_url: Option<String>,

    /// The manifest listing the datasets to load
    #[default(Some(DEFAULT_MANIFEST_URL.to_string()))]
    pub manifest_url: Option<String>,

    /// The single dataset loaded when the manifest lists nothing
    #[default(Some(DEFAULT_DATA_URL.to_string()))]
    pub data_url: Option<String>,

    /// Sources to load instead of the manifest
    #[default(Some(Vec::new()))]
    pub extra: Option<Vec<SourceDescriptor>>,
}

/// How suggestions behave in a field
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, SmartDefault)]
#[schemars(default)]
pub struct CompletionCfg {
    /// The most suggestions shown at once
    #[schemars(range(min = 1, max = 100))]
    #[default(Some(20))]
    pub max_results: Option<usize>,

    /// How many characters have to be typed before suggestions show up
    #[default(Some(1))]
    pub min_token_len: Option<usize>,

    /// How long (in milliseconds) the popup stays after the field loses focus
    #[default(Some(120))]
    pub blur_grace_ms: Option<u64>,

    /// The gap between the field and the popup
    #[default(Some(4.0))]
    pub popup_offset: Option<f32>,
}

/// Configuration options for making HTTP requests
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, SmartDefault)]
#[schemars(default)]
pub struct HttpCfg {
    /// User agent string sent with every request
    #[default(Some(format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))))]
    pub user_agent: Option<String>,

    /// Request timeout in seconds
    #[default(Some(30))]
    pub timeout_secs: Option<u64>,

    /// Connection timeout in seconds
    #[default(Some(10))]
    pub connect_timeout_secs: Option<u64>,
}

/// Log output formats
#[derive(Serialize, Deserialize, Clone, Copy, Debug, JsonSchema, SmartDefault, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LoggingFormat {
    /// Use the compact output format
    Compact,

    /// Use the pretty output format
    #[default]
    Pretty,
}

/// Settings for logging
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, SmartDefault)]
#[schemars(default)]
pub struct LoggingConfig {
    /// Enable logging
    #[default(Some(true))]
    pub enable: Option<bool>,

    /// The max level to log at
    #[default(Some("info".to_string()))]
    pub level: Option<String>,

    /// The output format
    #[default(Some(LoggingFormat::Pretty))]
    pub format: Option<LoggingFormat>,

    /// Enable ANSI escape codes for colors
    #[default(Some(true))]
    pub ansi: Option<bool>,

    /// Display event targets in log messages
    #[default(Some(false))]
    pub event_targets: Option<bool>,

    /// Display line numbers in log messages
    #[default(Some(false))]
    pub line_numbers: Option<bool>,
}

/// The full configuration
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, SmartDefault)]
#[schemars(default)]
pub struct TagcompleteCfg {
    /// Configuration file version (do not modify manually)
    #[default(Some(1))]
    pub version: Option<u32>,

    /// Dataset sources
    #[default(Some(SourcesCfg::default()))]
    pub sources: Option<SourcesCfg>,

    /// Suggestion behavior
    #[default(Some(CompletionCfg::default()))]
    pub completion: Option<CompletionCfg>,

    /// HTTP client configuration
    #[default(Some(HttpCfg::default()))]
    pub http: Option<HttpCfg>,

    /// Logging settings
    #[default(Some(LoggingConfig::default()))]
    pub logging: Option<LoggingConfig>,
}

impl TagcompleteCfg {
    /// load config from default locations
    ///
    /// load prio: env > local > global > defaults
    ///
    /// # Errors
    ///
    /// returns an error if a config file is malformed or the result fails validation
    pub fn load() -> Result<Self> {
        let global_config_path = Self::global_config_path()?;
        let local_config_path = Self::find_local_config()?;

        let cfg = Self::load_from(Some(&global_config_path), local_config_path.as_deref())?;

        if !global_config_path.exists() {
            Self::create_default_config(&global_config_path, &Self::default())?;
        }

        Ok(cfg)
    }

    /// load config from explicit files layered over the defaults
    ///
    /// missing files are skipped. environment overrides are always applied last, with `__`
    /// between section and key (`TAGCOMPLETE_COMPLETION__MAX_RESULTS=10`)
    ///
    /// # Errors
    ///
    /// returns an error if a file is malformed or the result fails validation
    pub fn load_from(global: Option<&Path>, local: Option<&Path>) -> Result<Self> {
        let mut builder = Self::create_builder(&Self::default())?;

        for path in [global, local].into_iter().flatten() {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder.build().wrap_err("Failed to build configuration")?;
        let cfg: TagcompleteCfg = settings
            .try_deserialize()
            .wrap_err("Failed to deserialize configuration")?;

        cfg.run_validation()?;
        info!("Configuration validation successful");

        Ok(cfg)
    }

    /// get the global config file path
    ///
    /// # Errors
    ///
    /// returns an error if there's no system config directory
    pub fn global_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_eyre("Unable to determine system config directory")
            .suggestion("Ensure XDG_CONFIG_HOME or HOME environment variables are set")
            .suggestion("On Windows, APPDATA should be set")?;

        Ok(config_dir.join(CONFIG_FILE_NAME))
    }

    /// create a config builder with defaults
    fn create_builder(
        defaults: &TagcompleteCfg,
    ) -> Result<ConfigBuilder<config::builder::DefaultState>> {
        let config_source = Config::try_from(defaults)
            .wrap_err("Failed to convert default config struct to config source")?;

        Ok(Config::builder().add_source(config_source))
    }

    /// run validation and return a pretty error if it fails
    fn run_validation(&self) -> Result<()> {
        self.validate()
            .map_err(|errors| eyre!(format_validation_errors(&errors)))
            .wrap_err("config validation failed")
            .suggestion(format!("Check your {CONFIG_FILE_NAME} for invalid values"))
            .suggestion("Run with --gen-default to see valid options")
    }

    /// find the nearest local config file
    fn find_local_config() -> Result<Option<PathBuf>> {
        let curr_dir = std::env::current_dir()
            .wrap_err("Failed to get current working directory")
            .suggestion("Ensure the current directory exists and is accessible")?;

        Ok(curr_dir
            .ancestors()
            .map(|ancestor| ancestor.join(CONFIG_FILE_NAME))
            .find(|path| path.exists()))
    }

    /// create the default config file
    fn create_default_config(path: &Path, defaults: &TagcompleteCfg) -> Result<()> {
        let config_dir = path
            .parent()
            .ok_or_eyre("Unable to determine parent directory of config path")?;

        std::fs::create_dir_all(config_dir)
            .wrap_err("Failed to create config directory")
            .with_section(|| format!("{}", config_dir.display()).header("Directory:"))?;

        defaults
            .save_to_file(path)
            .wrap_err("Failed to write default configuration file")?;

        Ok(())
    }

    /// save config to a file
    ///
    /// # Errors
    ///
    /// returns an error if the config can't be serialized or written
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let toml_str =
            toml::to_string_pretty(self).wrap_err("Failed to serialize config to TOML")?;

        std::fs::write(path, &toml_str)
            .wrap_err_with(|| format!("Failed to write config file: {}", path.display()))
            .with_section(|| path.display().to_string().header("File path"))
            .with_section(|| format!("{} bytes", toml_str.len()).header("Content size:"))?;

        Ok(())
    }

    /// save config to the global config location
    ///
    /// # Errors
    ///
    /// returns an error if the global path can't be found or written
    pub fn save(&self) -> Result<()> {
        let path = Self::global_config_path()?;
        self.save_to_file(path)
    }
}

impl CompletionCfg {
    /// the settings handed to each autocomplete
    pub fn settings(&self) -> CompletionSettings {
        let defaults = CompletionSettings::default();

        CompletionSettings {
            max_results: self.max_results.unwrap_or(defaults.max_results),
            min_token_len: self.min_token_len.unwrap_or(defaults.min_token_len),
            blur_grace: self
                .blur_grace_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.blur_grace),
            popup_offset: self.popup_offset.unwrap_or(defaults.popup_offset),
        }
    }
}

impl HttpCfg {
    /// the settings for the http client
    pub fn settings(&self) -> HttpSettings {
        let defaults = HttpSettings::default();

        HttpSettings {
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
            timeout: self
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            connect_timeout: self
                .connect_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
        }
    }
}
