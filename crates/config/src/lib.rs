//! Configuration loading and validation.
//!
//! Sources are layered, later ones overriding earlier ones:
//!
//! 1. Built-in defaults ([`Config::default`]).
//! 2. A configuration file: the path given on the command line, otherwise
//!    `fastdog.toml` in the platform config directory and then in the
//!    working directory. TOML, YAML and JSON are recognised by extension.
//! 3. Environment variables prefixed `FASTDOG_`, with `__` separating
//!    nested keys (`FASTDOG_CACHE__CAPACITY=100`).
//!
//! Relative directories are resolved against the working directory once
//! loading finishes, so the rest of the program only sees absolute paths.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "FASTDOG_";
const FILE_NAME: &str = "fastdog.toml";
const MIB: usize = 1024 * 1024;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Address the HTTP server listens on.
    pub bind: SocketAddr,
    /// Path prefix for the model and cache routes.
    pub api_prefix: String,
    /// Directory holding `.gltf`, `.glb` and optional `.fastdog` sidecars.
    pub models_dir: PathBuf,
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
    /// Extensions never served from `/static`, with or without a leading dot.
    pub protected_extensions: Vec<String>,
    /// `tracing` filter directive; `RUST_LOG` takes precedence when set.
    pub log_filter: Option<String>,
    pub cache: CacheConfig,
    pub streaming: StreamingConfig,
    pub auth: AuthConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of transcoded models held in memory.
    pub capacity: NonZeroUsize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Chunk size when streaming FASTDOG containers.
    pub blob_chunk_size: NonZeroUsize,
    /// Chunk size when streaming raw files.
    pub file_chunk_size: NonZeroUsize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Bearer tokens accepted by authenticated routes, keyed by the name
    /// reported when they are used.
    pub tokens: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8000)),
            api_prefix: "/api/v1/resources".to_string(),
            models_dir: PathBuf::from("static/models"),
            static_dir: PathBuf::from("static"),
            protected_extensions: [".gltf", ".glb", ".fastdog"].map(String::from).to_vec(),
            log_filter: None,
            cache: CacheConfig::default(),
            streaming: StreamingConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: NonZeroUsize::new(50).unwrap_or(NonZeroUsize::MIN) }
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            blob_chunk_size: NonZeroUsize::new(4 * MIB).unwrap_or(NonZeroUsize::MIN),
            file_chunk_size: NonZeroUsize::new(MIB).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl Config {
    /// Load, resolve and validate configuration.
    ///
    /// An explicitly given `path` must exist; the default file locations are
    /// optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let figment = Self::figment(path)?;
        let mut config: Config = figment
            .extract()
            .map_err(|e| ErrorKind::Load(e.to_string()))?;
        config.models_dir = resolve(&config.models_dir)?;
        config.static_dir = resolve(&config.static_dir)?;
        config.validate()?;
        tracing::debug!(bind = %config.bind, models_dir = %config.models_dir.display(), "configuration loaded");
        Ok(config)
    }

    /// The layered providers, before extraction.
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        match path {
            Some(path) => {
                if !path.is_file() {
                    exn::bail!(ErrorKind::Missing(path.to_path_buf()));
                }
                figment = merge_file(figment, path);
            },
            None => {
                if let Some(dirs) = ProjectDirs::from("", "", "fastdog") {
                    figment = figment.merge(Toml::file(dirs.config_dir().join(FILE_NAME)));
                }
                figment = figment.merge(Toml::file(FILE_NAME));
            },
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Check constraints that the types alone cannot express.
    pub fn validate(&self) -> Result<()> {
        if !self.api_prefix.starts_with('/') {
            exn::bail!(ErrorKind::Invalid(format!(
                "api_prefix must start with '/', got {:?}",
                self.api_prefix
            )));
        }
        if self.api_prefix.len() > 1 && self.api_prefix.ends_with('/') {
            exn::bail!(ErrorKind::Invalid(format!(
                "api_prefix must not end with '/', got {:?}",
                self.api_prefix
            )));
        }
        if let Some((name, _)) = self.auth.tokens.iter().find(|(_, token)| token.trim().is_empty()) {
            exn::bail!(ErrorKind::Invalid(format!("auth token {name:?} is empty")));
        }
        Ok(())
    }
}

fn merge_file(figment: Figment, path: &Path) -> Figment {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
        Some("json") => figment.merge(Json::file(path)),
        _ => figment.merge(Toml::file(path)),
    }
}

fn resolve(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).or_raise(|| ErrorKind::Invalid(format!("cannot resolve {}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.bind.port(), 8000);
        assert_eq!(config.api_prefix, "/api/v1/resources");
        assert_eq!(config.cache.capacity.get(), 50);
        assert_eq!(config.streaming.blob_chunk_size.get(), 4 * MIB);
        assert_eq!(config.streaming.file_chunk_size.get(), MIB);
        assert_eq!(config.protected_extensions, [".gltf", ".glb", ".fastdog"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn file_then_environment() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "fastdog.toml",
                r#"
                    bind = "127.0.0.1:9000"
                    models_dir = "assets/models"

                    [cache]
                    capacity = 10

                    [auth.tokens]
                    admin = "from-file"
                "#,
            )?;
            jail.set_env("FASTDOG_CACHE__CAPACITY", "7");
            jail.set_env("FASTDOG_AUTH__TOKENS__CI", "from-env");

            let config = Config::load(None).unwrap();
            assert_eq!(config.bind, "127.0.0.1:9000".parse().unwrap());
            assert_eq!(config.cache.capacity.get(), 7);
            assert_eq!(config.auth.tokens.get("admin").map(String::as_str), Some("from-file"));
            assert_eq!(config.auth.tokens.get("ci").map(String::as_str), Some("from-env"));
            assert!(config.models_dir.is_absolute());
            assert!(config.models_dir.ends_with("assets/models"));
            Ok(())
        });
    }

    #[test]
    fn explicit_yaml_file() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.yaml", "api_prefix: /models\nstreaming:\n  file_chunk_size: 4096\n")?;
            let config = Config::load(Some(Path::new("custom.yaml"))).unwrap();
            assert_eq!(config.api_prefix, "/models");
            assert_eq!(config.streaming.file_chunk_size.get(), 4096);
            Ok(())
        });
    }

    #[test]
    fn explicit_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = Config::load(Some(&missing)).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Missing(path) if *path == missing));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("FASTDOG_CACHE__CAPACITY", "0");
            let err = Config::load(None).unwrap_err();
            assert!(matches!(&*err, ErrorKind::Load(_)));
            Ok(())
        });
    }

    #[rstest]
    #[case("api/v1")]
    #[case("/api/v1/")]
    fn invalid_prefix(#[case] prefix: &str) {
        let config = Config { api_prefix: prefix.to_string(), ..Config::default() };
        let err = config.validate().unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid(_)));
    }

    #[test]
    fn empty_token_is_rejected() {
        let mut config = Config::default();
        config.auth.tokens.insert("admin".to_string(), " ".to_string());
        assert!(matches!(&*config.validate().unwrap_err(), ErrorKind::Invalid(_)));
    }
}
