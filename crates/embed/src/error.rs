use thiserror::Error;

/// Failures that can surface from embedded execution itself, as opposed to
/// the recovered-and-logged `E100` path a script raising an error takes.
#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("I/O error resolving {path:?}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("script evaluation error: {0}")]
    Script(String),
}
