use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

// Failures of the backing store. A missing entity is never an error; lookups
// and mutations report it as `None`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("store unavailable, failed to read {path:?}: {source}")]
    StoreUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path:?}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {path:?}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no identities left in {0}")]
    IdsExhausted(&'static str),
}
