//! Typed array bridge
//!
//! Moves homogeneous numeric buffers between native code and script as
//! typed arrays, in either direction, under one of two ownership modes.
//!
//! ## Layers
//!
//! - [`kind`]: element kinds and their native types
//! - [`descriptor`]: ownership of bytes crossing the boundary
//! - [`intrinsics`]: engine functions captured before any script runs
//! - [`backend`]: copy-out and no-copy QuickJS implementations
//! - [`registry`]: the process-wide active backend
//! - [`bridge`]: the facade collaborators call
//!
//! The free functions below forward to [`registry::active`], which panics
//! when no backend has been installed.

pub mod backend;
pub mod bridge;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod intrinsics;
pub mod kind;
pub mod registry;

pub use backend::{BackendMode, CopyOutBackend, NoCopyBackend, TypedArrayBackend};
pub use bridge::TypedArrayBridge;
pub use config::BridgeConfig;
pub use descriptor::{BufferDescriptor, Ownership, TransferBlock};
pub use error::{BridgeError, ReadError};
pub use kind::{kinds, Element, ElementKind, ElementSlice, TypedKind};

use rquickjs::{Ctx, Value};

pub fn create<'js, K: TypedKind>(
    ctx: &Ctx<'js>,
    data: &[K::Native],
) -> Result<Value<'js>, BridgeError> {
    registry::active().create::<K>(ctx, data)
}

pub fn read<'js, K: TypedKind>(ctx: &Ctx<'js>, value: &Value<'js>) -> Vec<K::Native> {
    registry::active().read::<K>(ctx, value)
}

pub fn try_read<'js, K: TypedKind>(
    ctx: &Ctx<'js>,
    value: &Value<'js>,
) -> Result<Vec<K::Native>, ReadError> {
    registry::active().try_read::<K>(ctx, value)
}

pub fn raw_read<'js>(ctx: &Ctx<'js>, value: &Value<'js>) -> Vec<u8> {
    registry::active().raw_read(ctx, value)
}

pub fn type_of<'js>(ctx: &Ctx<'js>, value: &Value<'js>) -> ElementKind {
    registry::active().type_of(ctx, value)
}

pub fn write<'js, T: Element>(ctx: &Ctx<'js>, value: &Value<'js>, data: &[T]) -> usize {
    registry::active().write(ctx, value, data)
}
