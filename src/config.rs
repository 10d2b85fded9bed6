use serde::Deserialize;
use serde_inline_default::serde_inline_default;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use crate::oci::RuntimeImages;

const DEFAULT_CONFIG: &str = include_str!("../default.toml");

#[derive(Error, Debug)]
pub enum Error {
    #[error("read {path}: {err}")]
    ReadFile {
        err: std::io::Error,
        path: String,
    },

    #[error("parse {path}: {err}")]
    Parse {
        err: toml::de::Error,
        path: String,
    },

    #[error("{path}: retry_interval_seconds must be at least 1")]
    ZeroRetryInterval { path: String },
}

/// A devconsole.toml file.
#[serde_inline_default]
#[derive(Deserialize, Debug, Clone)]
pub struct File {
    pub description: Option<String>,

    /// Namespace searched for cluster-local builder image streams.
    #[serde_inline_default("openshift".to_string())]
    pub shared_namespace: String,

    /// Delay before a failed reconciliation is retried.
    #[serde_inline_default(30)]
    pub retry_interval_seconds: u64,

    #[serde(default = "HashMap::new")]
    pub runtimes: HashMap<String, String>,
}

impl Default for File {
    fn default() -> Self {
        // The default config is compiled into the program, so
        // make sure to test default() to catch panics compile-time.
        toml::from_str(DEFAULT_CONFIG).unwrap()
    }
}

/// A user-supplied devconsole.toml. Settings left out keep their built-in value.
#[derive(Deserialize, Debug)]
struct UserFile {
    description: Option<String>,
    shared_namespace: Option<String>,
    retry_interval_seconds: Option<u64>,
    #[serde(default = "HashMap::new")]
    runtimes: HashMap<String, String>,
}

impl File {
    /// Read a user configuration file and merge it on top of the built-in defaults.
    ///
    /// Scalar settings from the user file replace the defaults. Entries in its
    /// `[runtimes]` table are added to the built-in table, replacing any build
    /// type that is defined in both.
    pub fn default_with_user_config_file(path: &str) -> Result<Self, Error> {
        let data = std::fs::read_to_string(path).map_err(|err| Error::ReadFile {
            err,
            path: path.to_string(),
        })?;
        let user: UserFile = toml::from_str(&data).map_err(|err| Error::Parse {
            err,
            path: path.to_string(),
        })?;

        let mut cfg = Self::default();
        cfg.runtimes.extend(user.runtimes);
        let cfg = Self {
            description: user.description.or(cfg.description),
            shared_namespace: user.shared_namespace.unwrap_or(cfg.shared_namespace),
            retry_interval_seconds: user
                .retry_interval_seconds
                .unwrap_or(cfg.retry_interval_seconds),
            runtimes: cfg.runtimes,
        };

        // A zero delay would requeue failing components in a tight loop.
        if cfg.retry_interval_seconds == 0 {
            return Err(Error::ZeroRetryInterval {
                path: path.to_string(),
            });
        }
        Ok(cfg)
    }

    pub fn runtime_images(&self) -> RuntimeImages {
        self.runtimes.clone().into_iter().collect()
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_seconds)
    }
}

#[cfg(test)]
pub mod test {
    use crate::oci::DockerImage;
    use std::io::Write;

    #[test]
    pub fn load_default_configuration() {
        let cfg = super::File::default();
        assert_eq!(cfg.description, Some("Default configuration file".into()));
        assert_eq!(cfg.shared_namespace, "openshift");
        assert_eq!(cfg.retry_interval_seconds, 30);
        assert_eq!(
            cfg.runtime_images().resolve("nodejs"),
            Some(&DockerImage("nodeshift/centos7-s2i-nodejs:10.x".into()))
        );
    }

    #[test]
    pub fn user_configuration_extends_runtimes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"
shared_namespace = "images"

[runtimes]
python = "centos/python-36-centos7"
nodejs = "registry.example.com/nodejs:12"
"#,
        )
        .unwrap();

        let cfg = super::File::default_with_user_config_file(file.path().to_str().unwrap())
            .unwrap();
        assert_eq!(cfg.shared_namespace, "images");
        assert_eq!(cfg.retry_interval_seconds, 30);
        assert_eq!(cfg.description, Some("Default configuration file".into()));

        let runtimes = cfg.runtime_images();
        assert_eq!(
            runtimes.resolve("python"),
            Some(&DockerImage("centos/python-36-centos7".into()))
        );
        assert_eq!(
            runtimes.resolve("nodejs"),
            Some(&DockerImage("registry.example.com/nodejs:12".into()))
        );
        assert!(runtimes.resolve("wildfly").is_some());
    }

    #[test]
    pub fn omitted_settings_keep_built_in_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"description = \"team config\"\n").unwrap();

        let builtin = super::File::default();
        let cfg = super::File::default_with_user_config_file(file.path().to_str().unwrap())
            .unwrap();
        assert_eq!(cfg.description, Some("team config".into()));
        assert_eq!(cfg.shared_namespace, builtin.shared_namespace);
        assert_eq!(cfg.retry_interval_seconds, builtin.retry_interval_seconds);
        assert_eq!(cfg.runtimes, builtin.runtimes);
    }

    #[test]
    pub fn zero_retry_interval_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"retry_interval_seconds = 0\n").unwrap();

        let err = super::File::default_with_user_config_file(file.path().to_str().unwrap())
            .unwrap_err();
        assert!(matches!(err, super::Error::ZeroRetryInterval { .. }));
    }

    #[test]
    pub fn missing_user_configuration_is_an_error() {
        let err = super::File::default_with_user_config_file("/nonexistent/devconsole.toml")
            .unwrap_err();
        assert!(matches!(err, super::Error::ReadFile { .. }));
    }
}
