use thiserror::Error;

/// Errors surfaced by the top-level [`crate::Engine`] facade.
///
/// Wraps the per-crate error hierarchies (`vellum_convert::ConvertError`,
/// `vellum_style::StyleError`) plus the I/O failures that `read`/`write`
/// can hit, so a host embedding `vellum` has one error type to match on.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Convert(#[from] vellum_convert::ConvertError),

    #[error(transparent)]
    Style(#[from] vellum_style::StyleError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
