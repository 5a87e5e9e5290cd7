use thiserror::Error;

/// Registration-time failures for the directive registry.
#[derive(Debug, Error)]
pub enum DirectiveError {
    #[error("directive class {0:?} declares no directive name")]
    MissingName(String),

    #[error("directive key {0:?} is already registered; pass override=true to replace it")]
    Duplicate(String),
}
