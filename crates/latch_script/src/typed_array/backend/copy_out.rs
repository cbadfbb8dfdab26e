//! Legacy-compatible backend: the engine copies on the way in and on the way out.

use super::{engine, BackendMode, TypedArrayBackend};
use crate::typed_array::descriptor::BufferDescriptor;
use crate::typed_array::intrinsics::Intrinsics;
use crate::typed_array::kind::{ElementKind, ElementSlice};
use rquickjs::{ArrayBuffer, Ctx, Value};

/// Hands native data to the engine's copying constructor and never shares memory.
///
/// The caller's slice may be freed as soon as `create` returns. Reads go
/// through an engine-made duplicate that is copied again into the result
/// and then released.
#[derive(Debug, Default, Clone, Copy)]
pub struct CopyOutBackend;

impl TypedArrayBackend for CopyOutBackend {
    fn name(&self) -> &'static str {
        "quickjs-copy-out"
    }

    fn mode(&self) -> BackendMode {
        BackendMode::CopyOut
    }

    fn create<'js>(
        &self,
        ctx: &Ctx<'js>,
        kind: ElementKind,
        data: ElementSlice<'_>,
    ) -> rquickjs::Result<Value<'js>> {
        tracing::debug!(backend = self.name(), %kind, byte_len = data.byte_len(), "create");
        if kind == ElementKind::None {
            return Ok(engine::sentinel(ctx, self.name()));
        }
        let intrinsics = Intrinsics::load(ctx)?;
        // Some engines refuse a zero-length data pointer, so empty arrays
        // go through the length constructor instead.
        if data.is_empty() {
            return intrinsics.constructor(kind)?.construct((0u32,));
        }
        let buffer = ArrayBuffer::new_copy(ctx.clone(), data.as_bytes())?;
        engine::view_over(&intrinsics, kind, buffer)
    }

    fn read<'js>(
        &self,
        ctx: &Ctx<'js>,
        value: &Value<'js>,
        sink: &mut dyn FnMut(BufferDescriptor<'_>),
    ) -> rquickjs::Result<()> {
        let intrinsics = Intrinsics::load(ctx)?;
        let Some((kind, window)) = engine::source_window(&intrinsics, value)? else {
            return Ok(());
        };
        let copy = engine::engine_copy(&intrinsics, &window)?;
        // A species constructor may hand back a larger buffer; only the
        // window's bytes were copied into it.
        let bytes = copy
            .as_ref()
            .and_then(|buffer| buffer.as_bytes())
            .map(|bytes| &bytes[..bytes.len().min(window.byte_len as usize)]);
        let desc = BufferDescriptor::copied_out(bytes);
        tracing::debug!(backend = self.name(), %kind, byte_len = desc.byte_len(), "read");
        sink(desc);
        // `copy` is released here, after its bytes have been duplicated.
        Ok(())
    }

    fn write<'js>(
        &self,
        ctx: &Ctx<'js>,
        value: &Value<'js>,
        bytes: &[u8],
    ) -> rquickjs::Result<usize> {
        let intrinsics = Intrinsics::load(ctx)?;
        let Some((_, window)) = engine::source_window(&intrinsics, value)? else {
            return Ok(0);
        };
        let count = (window.byte_len as usize).min(bytes.len());
        if count == 0 {
            return Ok(0);
        }
        let staged = ArrayBuffer::new_copy(ctx.clone(), &bytes[..count])?;
        engine::overwrite(&intrinsics, &window, staged, count as u32)?;
        Ok(count)
    }
}
