//! Zero-copy backend: ownership moves into the engine, reads borrow engine memory.

use super::{engine, BackendMode, TypedArrayBackend};
use crate::typed_array::descriptor::{self, BufferDescriptor};
use crate::typed_array::intrinsics::Intrinsics;
use crate::typed_array::kind::{Element, ElementKind, ElementSlice};
use rquickjs::{Ctx, Value};

/// Duplicates native data once into a block the engine takes ownership of.
///
/// The engine frees the block from its release callback when the buffer
/// becomes unreachable. Reads borrow the engine's bytes directly and copy
/// them out before returning, so results never depend on the source
/// staying alive.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCopyBackend;

impl TypedArrayBackend for NoCopyBackend {
    fn name(&self) -> &'static str {
        "quickjs-no-copy"
    }

    fn mode(&self) -> BackendMode {
        BackendMode::NoCopy
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
        // Zero-length transfers are legal here; no special empty path.
        let buffer = descriptor::transfer(ctx, data)?;
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
        let buffer = window.array_buffer();
        let desc = BufferDescriptor::borrowed(
            buffer.as_ref().and_then(|buffer| buffer.as_bytes()),
            window.byte_offset as usize,
            window.byte_len as usize,
        );
        tracing::debug!(
            backend = self.name(),
            %kind,
            byte_offset = desc.byte_offset(),
            byte_len = desc.byte_len(),
            "read"
        );
        sink(desc);
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
        let staged = descriptor::transfer(ctx, u8::wrap(&bytes[..count]))?;
        engine::overwrite(&intrinsics, &window, staged, count as u32)?;
        Ok(count)
    }
}
