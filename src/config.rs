use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub source_paths: Vec<String>,
    #[serde(default)]
    pub destination: Option<String>,
    /// Treat `destination` as a parent and merge into `<first source>_merged` inside it.
    #[serde(default)]
    pub merged_suffix: bool,
    #[serde(default)]
    pub export_log: Option<String>,
    #[serde(default)]
    pub assume_yes: bool,
    /// Level for this crate's diagnostics (`debug`), or a full filter directive.
    #[serde(default)]
    pub log_level: Option<String>,
    /// Diagnostic log file; an empty string turns file logging off.
    #[serde(default)]
    pub log_file: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<AppConfig, ConfigError> {
        Self::load_from("Config")
    }

    /// Read `<name>.toml` (optional) and `MERGE_*` environment variables.
    /// `MERGE_SOURCE_PATHS` takes a comma-separated list.
    pub fn load_from(name: &str) -> Result<AppConfig, ConfigError> {
        let builder = Config::builder()
            .add_source(ConfigFile::with_name(name).required(false))
            .add_source(
                Environment::with_prefix("MERGE")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("source_paths"),
            )
            .build()?;

        builder.try_deserialize::<AppConfig>()
    }
}
