//! QuickJS typed array primitives shared by both backends.
//!
//! Everything here goes through the context's sealed intrinsics; the
//! backends differ only in how bytes enter and leave.

use crate::typed_array::intrinsics::Intrinsics;
use crate::typed_array::kind::ElementKind;
use rquickjs::{ArrayBuffer, Ctx, Object, Value};

/// Value handed back when asked to create the sentinel kind.
pub(super) fn sentinel<'js>(ctx: &Ctx<'js>, backend: &str) -> Value<'js> {
    tracing::warn!(backend, "cannot create a typed array of kind None; returning undefined");
    Value::new_undefined(ctx.clone())
}

/// Wrap `buffer` in a view of `kind`, or return the buffer itself for raw kinds.
pub(super) fn view_over<'js>(
    intrinsics: &Intrinsics<'js>,
    kind: ElementKind,
    buffer: ArrayBuffer<'js>,
) -> rquickjs::Result<Value<'js>> {
    if kind == ElementKind::ArrayBuffer {
        return Ok(buffer.into_value());
    }
    intrinsics.constructor(kind)?.construct((buffer.into_value(),))
}

/// Classify a value as one of the typed array kinds, a raw buffer, or `None`.
pub(super) fn kind_of<'js>(
    ctx: &Ctx<'js>,
    value: &Value<'js>,
) -> rquickjs::Result<ElementKind> {
    let Some(object) = value.as_object() else {
        return Ok(ElementKind::None);
    };
    classify(&Intrinsics::load(ctx)?, object)
}

/// The tag getter reads the internal typed array name slot and returns
/// `undefined` for anything else, so an own `Symbol.toStringTag` cannot
/// spoof it.
fn classify<'js>(
    intrinsics: &Intrinsics<'js>,
    object: &Object<'js>,
) -> rquickjs::Result<ElementKind> {
    let tag = intrinsics.tag(object)?;
    if let Some(kind) = tag.as_deref().and_then(ElementKind::from_tag) {
        if kind.is_typed_array() {
            return Ok(kind);
        }
    }

    if ArrayBuffer::from_object(object.clone()).is_some() {
        return Ok(ElementKind::ArrayBuffer);
    }
    Ok(ElementKind::None)
}

/// The byte range a source value addresses inside its backing buffer.
#[derive(Clone)]
pub(super) struct Window<'js> {
    pub buffer: Object<'js>,
    pub byte_offset: u32,
    pub byte_len: u32,
}

impl<'js> Window<'js> {
    pub fn array_buffer(&self) -> Option<ArrayBuffer<'js>> {
        ArrayBuffer::from_object(self.buffer.clone())
    }

    pub fn end(&self) -> u32 {
        self.byte_offset.saturating_add(self.byte_len)
    }
}

/// Resolve the window behind `value`, or `None` if it is not a typed array or buffer.
///
/// Offsets and lengths come from the intrinsic accessors, never from
/// properties on the value itself.
pub(super) fn source_window<'js>(
    intrinsics: &Intrinsics<'js>,
    value: &Value<'js>,
) -> rquickjs::Result<Option<(ElementKind, Window<'js>)>> {
    let Some(object) = value.as_object() else {
        return Ok(None);
    };

    let kind = classify(intrinsics, object)?;
    let window = match kind {
        ElementKind::None => return Ok(None),
        // A buffer is never a sub-view of another allocation, so its window
        // always starts at zero. Detached buffers have no bytes.
        ElementKind::ArrayBuffer => {
            let len = ArrayBuffer::from_object(object.clone())
                .and_then(|buffer| buffer.as_bytes().map(<[u8]>::len))
                .unwrap_or(0);
            Window {
                buffer: object.clone(),
                byte_offset: 0,
                byte_len: u32::try_from(len).unwrap_or(u32::MAX),
            }
        }
        _ => Window {
            buffer: intrinsics.view_buffer(object)?,
            byte_offset: intrinsics.view_byte_offset(object)?,
            byte_len: intrinsics.view_byte_length(object)?,
        },
    };
    Ok(Some((kind, window)))
}

/// Have the engine duplicate a window into a new, unshared buffer.
pub(super) fn engine_copy<'js>(
    intrinsics: &Intrinsics<'js>,
    window: &Window<'js>,
) -> rquickjs::Result<Option<ArrayBuffer<'js>>> {
    let copy = intrinsics.slice(&window.buffer, window.byte_offset, window.end())?;
    Ok(ArrayBuffer::from_object(copy))
}

/// Copy the first `count` bytes of `source` over the start of `target`.
pub(super) fn overwrite<'js>(
    intrinsics: &Intrinsics<'js>,
    target: &Window<'js>,
    source: ArrayBuffer<'js>,
    count: u32,
) -> rquickjs::Result<()> {
    let bytes = intrinsics.constructor(ElementKind::Uint8Array)?;
    let dst: Object = bytes.construct((target.buffer.clone(), target.byte_offset, count))?;
    let src: Object = bytes.construct((source.into_value(),))?;
    intrinsics.set(&dst, src)
}
