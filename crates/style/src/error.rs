use thiserror::Error;

/// Resolution-time failures for the style registry.
#[derive(Debug, Error)]
pub enum StyleError {
    #[error("no style module registered for key {0:?}")]
    Unknown(String),

    #[error("style module key {0:?} is already registered; pass override=true to replace it")]
    Duplicate(String),
}
