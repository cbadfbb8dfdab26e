use crate::typed_array::kind::ElementKind;
use thiserror::Error;

/// Errors raised while setting up or driving the typed array bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("script engine error: {0}")]
    Engine(#[from] rquickjs::Error),

    #[error("typed array backend '{active}' is already installed")]
    AlreadyInstalled { active: &'static str },

    #[error("invalid typed array configuration: {0}")]
    Config(String),

    #[error("failed to parse typed array configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read typed array configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a strict read refused a value.
///
/// The plain `read` maps every one of these to an empty vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReadError {
    #[error("value is not a typed array or ArrayBuffer")]
    NotTypedArray,

    #[error("expected {expected}, found {found}")]
    KindMismatch {
        expected: ElementKind,
        found: ElementKind,
    },
}
