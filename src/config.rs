//! Extraction and service configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ConfigError;
use crate::mesh::LoadKind;

/// Environment variable holding the service account name.
pub const USERNAME_VAR: &str = "STRUCTMESH_API_USERNAME";
/// Environment variable holding the service API key.
pub const KEY_VAR: &str = "STRUCTMESH_API_KEY";
/// Environment variable overriding the service endpoint.
pub const URL_VAR: &str = "STRUCTMESH_API_URL";

/// Default endpoint of the solver service API.
pub const DEFAULT_ENDPOINT: &str = "https://api.skyciv.com/v3";

/// Pressure magnitudes and load group used for area loads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadSettings {
    /// Wind pressure in ksf.
    pub wind_magnitude: f64,
    /// Live pressure in ksf.
    pub live_magnitude: f64,
    /// Load group every area load is placed in.
    pub load_group: String,
}

impl Default for LoadSettings {
    fn default() -> Self {
        Self {
            wind_magnitude: 0.08,
            live_magnitude: 0.15,
            load_group: "LG".to_string(),
        }
    }
}

/// Properties given to every plate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlateSettings {
    /// Thickness in inches.
    pub thickness: f64,
    /// Material id, see [`default_materials`](crate::project::default_materials).
    pub material_id: u32,
}

impl Default for PlateSettings {
    fn default() -> Self {
        Self {
            // 10 mm
            thickness: 0.393_700_787_401_574_77,
            material_id: 3,
        }
    }
}

/// Options controlling how a mesh becomes a project.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Classification for faces the user did not tag.
    pub default_load: Option<LoadKind>,
    /// Load magnitudes.
    pub loads: LoadSettings,
    /// Plate properties.
    pub plate: PlateSettings,
}

/// Where and how projects are submitted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// API endpoint.
    pub endpoint: String,
    /// Ask the service to solve the model after uploading it.
    pub solve: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            solve: false,
        }
    }
}

/// Top level configuration file.
///
/// Every field is optional in the file; omitted values keep their defaults.
///
/// # Examples
/// ```
/// use structmesh::{Config, LoadKind};
///
/// let config: Config =
///     serde_json::from_str(r#"{"extract": {"default_load": "live"}}"#).unwrap();
/// assert_eq!(config.extract.default_load, Some(LoadKind::Live));
/// assert_eq!(config.extract.loads.wind_magnitude, 0.08);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Mesh extraction options.
    pub extract: ExtractOptions,
    /// Solver service options.
    pub service: ServiceConfig,
}

impl Config {
    /// Read a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::Invalid`] when it does not parse.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Apply overrides found through `lookup`, normally [`std::env::var`].
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = lookup(URL_VAR).filter(|value| !value.is_empty()) {
            debug!(%endpoint, "endpoint overridden from environment");
            self.service.endpoint = endpoint;
        }
    }
}

/// Account used to authenticate API requests.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    /// Account name.
    pub username: String,
    /// API key.
    pub key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Read credentials through `lookup`, normally [`std::env::var`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredentials`] naming the first variable that is
    /// unset or empty.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::MissingCredentials(name))
        };
        Ok(Self {
            username: read(USERNAME_VAR)?,
            key: read(KEY_VAR)?,
        })
    }

    /// Read credentials from the process environment.
    ///
    /// # Errors
    ///
    /// See [`Credentials::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{"extract": {{"loads": {{"live_magnitude": 0.05}}}}, "service": {{"solve": true}}}}"#
        )
        .expect("config written");

        let config = Config::from_file(file.path()).expect("config loads");
        assert_eq!(config.extract.loads.live_magnitude, 0.05);
        assert_eq!(config.extract.loads.wind_magnitude, 0.08);
        assert_eq!(config.extract.plate, PlateSettings::default());
        assert_eq!(config.extract.default_load, None);
        assert!(config.service.solve);
        assert_eq!(config.service.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn malformed_file_is_reported() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "{{ not json").expect("config written");
        let error = Config::from_file(file.path()).expect_err("invalid config");
        assert!(matches!(error, ConfigError::Invalid { .. }));

        let missing = Config::from_file("/definitely/not/here.json").expect_err("missing file");
        assert!(matches!(missing, ConfigError::Io { .. }));
    }

    #[test]
    fn endpoint_override_ignores_empty_values() {
        let mut config = Config::default();
        config.apply_overrides(lookup(&[(URL_VAR, "")]));
        assert_eq!(config.service.endpoint, DEFAULT_ENDPOINT);

        config.apply_overrides(lookup(&[(URL_VAR, "http://localhost:8080")]));
        assert_eq!(config.service.endpoint, "http://localhost:8080");
    }

    #[test]
    fn credentials_require_both_variables() {
        let error = Credentials::from_lookup(lookup(&[(USERNAME_VAR, "jb")]))
            .expect_err("key missing");
        assert!(matches!(error, ConfigError::MissingCredentials(KEY_VAR)));

        let credentials =
            Credentials::from_lookup(lookup(&[(USERNAME_VAR, "jb"), (KEY_VAR, "secret")]))
                .expect("credentials present");
        assert_eq!(credentials.username, "jb");
        assert!(!format!("{credentials:?}").contains("secret"));
    }
}
