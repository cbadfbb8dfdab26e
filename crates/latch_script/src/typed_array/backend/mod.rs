//! Engine backends for the typed array bridge
//!
//! Two implementations of the same contract, picked once at startup:
//!
//! - [`CopyOutBackend`]: the engine copies data in and hands back copies.
//! - [`NoCopyBackend`]: ownership of a native block moves into the engine,
//!   reads borrow engine memory.

mod copy_out;
mod engine;
mod no_copy;

pub use copy_out::CopyOutBackend;
pub use no_copy::NoCopyBackend;

use crate::typed_array::descriptor::BufferDescriptor;
use crate::typed_array::error::BridgeError;
use crate::typed_array::kind::{ElementKind, ElementSlice};
use rquickjs::{Ctx, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a backend moves bytes across the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendMode {
    /// The engine copies synchronously; nothing is shared or transferred.
    CopyOut,
    /// Native blocks are transferred to the engine with a release callback.
    #[default]
    NoCopy,
}

impl BackendMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            BackendMode::CopyOut => "copy-out",
            BackendMode::NoCopy => "no-copy",
        }
    }

    /// Construct the backend implementing this mode.
    pub fn backend(self) -> Box<dyn TypedArrayBackend> {
        match self {
            BackendMode::CopyOut => Box::new(CopyOutBackend),
            BackendMode::NoCopy => Box::new(NoCopyBackend),
        }
    }
}

impl fmt::Display for BackendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendMode {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "copy-out" => Ok(BackendMode::CopyOut),
            "no-copy" => Ok(BackendMode::NoCopy),
            other => Err(BridgeError::Config(format!(
                "unknown backend mode '{other}' (expected 'copy-out' or 'no-copy')"
            ))),
        }
    }
}

/// Bridge contract implemented once per engine and operating mode.
///
/// Methods return engine errors as-is; the facade decides which of them
/// collapse into empty results.
pub trait TypedArrayBackend: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    fn mode(&self) -> BackendMode;

    /// Build a script-visible value of `kind` holding `data`.
    ///
    /// `kind == ElementKind::None` yields `undefined`.
    fn create<'js>(
        &self,
        ctx: &Ctx<'js>,
        kind: ElementKind,
        data: ElementSlice<'_>,
    ) -> rquickjs::Result<Value<'js>>;

    /// Pass the bytes behind `value` to `sink`.
    ///
    /// `sink` is not called when `value` is not a typed array or buffer.
    /// The descriptor is only valid for the duration of the call.
    fn read<'js>(
        &self,
        ctx: &Ctx<'js>,
        value: &Value<'js>,
        sink: &mut dyn FnMut(BufferDescriptor<'_>),
    ) -> rquickjs::Result<()>;

    /// Classify `value`, returning `ElementKind::None` for anything else.
    fn type_of<'js>(
        &self,
        ctx: &Ctx<'js>,
        value: &Value<'js>,
    ) -> rquickjs::Result<ElementKind> {
        engine::kind_of(ctx, value)
    }

    /// Overwrite the bytes of `value` in place; returns how many were written.
    fn write<'js>(
        &self,
        ctx: &Ctx<'js>,
        value: &Value<'js>,
        bytes: &[u8],
    ) -> rquickjs::Result<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_parse_loosely() {
        assert_eq!("copy-out".parse::<BackendMode>().unwrap(), BackendMode::CopyOut);
        assert_eq!(" NO_COPY ".parse::<BackendMode>().unwrap(), BackendMode::NoCopy);
        assert!("mmap".parse::<BackendMode>().is_err());
    }

    #[test]
    fn each_mode_builds_its_backend() {
        for mode in [BackendMode::CopyOut, BackendMode::NoCopy] {
            let backend = mode.backend();
            assert_eq!(backend.mode(), mode);
            assert_eq!(mode.to_string().parse::<BackendMode>().unwrap(), mode);
        }
    }
}
