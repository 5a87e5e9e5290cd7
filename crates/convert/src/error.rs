use thiserror::Error;

/// The converter's error hierarchy: one error type per crate, with
/// `#[from]` conversions at the boundaries.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("type error: {0}")]
    Type(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error(transparent)]
    Directive(#[from] vellum_directive::DirectiveError),

    #[error(transparent)]
    Style(#[from] vellum_style::StyleError),
}
