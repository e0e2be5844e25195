use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::debug;

use crate::error::{ExtractError, Result};
use crate::parser::blocks::SourceProfile;
use crate::parser::expand::DEFAULT_DATE_FORMAT;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub profile: SourceProfile,
    /// chrono format for the `Processed` column.
    pub date_format: String,
    /// Input B columns that hold a free-text address.
    pub address_columns: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            profile: SourceProfile::default(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            address_columns: vec!["Debtor Address".to_string(), "Secured Party Address".to_string()],
        }
    }
}

/// Defaults, then an optional TOML file, then `UCC_*` environment variables
/// (`UCC_PROFILE__BOUNDARY_MARKER`, `UCC_DATE_FORMAT`, ...).
pub fn load(path: Option<&Path>) -> Result<Settings> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        if !path.exists() {
            return Err(ExtractError::InputAbsent(path.to_path_buf()));
        }
        builder = builder.add_source(File::from(path));
    }
    builder = builder.add_source(
        Environment::with_prefix("UCC")
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("address_columns")
            .with_list_parse_key("profile.metadata_prefixes")
            .try_parsing(true),
    );

    let settings: Settings = builder.build()?.try_deserialize()?;
    debug!(?settings, "settings loaded");
    Ok(settings)
}
