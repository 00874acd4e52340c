use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why `comanda.toml` could not become an [`AppConfig`](super::AppConfig).
///
/// Both binaries stop at startup on any of these; nothing is retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no comanda config at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("cannot read comanda config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid TOML in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown store backend '{backend}' (expected 'sqlite' or 'memory')")]
    InvalidStoreBackend { backend: String },

    #[error("[host] command must not be empty")]
    EmptyHostCommand,

    #[error("[address] url must not be empty")]
    EmptyAddressUrl,
}
