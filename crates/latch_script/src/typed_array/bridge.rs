//! The single entry point collaborators use for typed array traffic.

use crate::typed_array::backend::{BackendMode, TypedArrayBackend};
use crate::typed_array::descriptor::BufferDescriptor;
use crate::typed_array::error::{BridgeError, ReadError};
use crate::typed_array::kind::{kinds, Element, ElementKind, TypedKind};
use rquickjs::{Ctx, Value};
use std::sync::Arc;

/// Forwards typed array operations to one backend.
///
/// Built once at startup and handed to whoever needs it. Cloning is cheap
/// and every clone shares the same backend.
#[derive(Debug, Clone)]
pub struct TypedArrayBridge {
    backend: Arc<dyn TypedArrayBackend>,
}

impl TypedArrayBridge {
    pub fn new(backend: Box<dyn TypedArrayBackend>) -> Self {
        Self {
            backend: Arc::from(backend),
        }
    }

    pub fn for_mode(mode: BackendMode) -> Self {
        Self::new(mode.backend())
    }

    pub fn backend(&self) -> &dyn TypedArrayBackend {
        self.backend.as_ref()
    }

    pub fn mode(&self) -> BackendMode {
        self.backend.mode()
    }

    /// Create a typed array of kind `K` from native elements.
    pub fn create<'js, K: TypedKind>(
        &self,
        ctx: &Ctx<'js>,
        data: &[K::Native],
    ) -> Result<Value<'js>, BridgeError> {
        Ok(self.backend.create(ctx, K::KIND, K::Native::wrap(data))?)
    }

    /// Copy the contents of a typed array or buffer out as `K` elements.
    ///
    /// Anything that is not a typed array or buffer reads as empty, as do
    /// engine errors raised while inspecting it.
    pub fn read<'js, K: TypedKind>(&self, ctx: &Ctx<'js>, value: &Value<'js>) -> Vec<K::Native> {
        let mut out = Vec::new();
        let result = self
            .backend
            .read(ctx, value, &mut |desc: BufferDescriptor<'_>| out = desc.to_vec::<K::Native>());
        if let Err(err) = result {
            tracing::warn!(
                backend = self.backend.name(),
                kind = %K::KIND,
                %err,
                "read failed; returning empty"
            );
            return Vec::new();
        }
        out
    }

    /// Raw bytes behind any typed array or buffer, whatever its element kind.
    pub fn raw_read<'js>(&self, ctx: &Ctx<'js>, value: &Value<'js>) -> Vec<u8> {
        self.read::<kinds::Uint8Array>(ctx, value)
    }

    pub fn type_of<'js>(&self, ctx: &Ctx<'js>, value: &Value<'js>) -> ElementKind {
        self.backend.type_of(ctx, value).unwrap_or_else(|err| {
            tracing::warn!(backend = self.backend.name(), %err, "type classification failed");
            ElementKind::None
        })
    }

    /// Like [`read`](Self::read), but says why a value was refused.
    ///
    /// Accepts views of kind `K` and raw buffers; raw-buffer readers accept
    /// any view.
    pub fn try_read<'js, K: TypedKind>(
        &self,
        ctx: &Ctx<'js>,
        value: &Value<'js>,
    ) -> Result<Vec<K::Native>, ReadError> {
        match self.type_of(ctx, value) {
            ElementKind::None => Err(ReadError::NotTypedArray),
            found if found == K::KIND || found == ElementKind::ArrayBuffer => {
                Ok(self.read::<K>(ctx, value))
            }
            _ if K::KIND == ElementKind::ArrayBuffer => Ok(self.read::<K>(ctx, value)),
            found => Err(ReadError::KindMismatch {
                expected: K::KIND,
                found,
            }),
        }
    }

    /// Overwrite a typed array or buffer in place with `data`.
    ///
    /// Writes at most as many bytes as the target holds and returns the
    /// count; non-typed values are left alone and report 0.
    pub fn write<'js, T: Element>(&self, ctx: &Ctx<'js>, value: &Value<'js>, data: &[T]) -> usize {
        let bytes = T::wrap(data).as_bytes();
        self.backend.write(ctx, value, bytes).unwrap_or_else(|err| {
            tracing::warn!(backend = self.backend.name(), %err, "in-place write failed");
            0
        })
    }
}
