//! Engine intrinsics captured before any script runs
//!
//! Classification, window resolution, engine-side copies and in-place
//! writes call these captured functions directly. A script that reassigns
//! `Int8Array`, shadows `byteOffset` on a view or patches
//! `ArrayBuffer.prototype.slice` therefore changes nothing the bridge sees.
//!
//! The snapshot lives in a read-only, non-configurable global slot, so it
//! is owned by the context and freed with it.

use crate::typed_array::kind::ElementKind;
use rquickjs::function::{Constructor, This};
use rquickjs::{Ctx, FromJs, Function, IntoJs, Object, Value};

/// Global slot holding the snapshot.
pub const SLOT: &str = "__latchTypedArrayIntrinsics";

const TAG: &str = "typedArrayTag";
const BUFFER: &str = "typedArrayBuffer";
const BYTE_OFFSET: &str = "typedArrayByteOffset";
const BYTE_LENGTH: &str = "typedArrayByteLength";
const SET: &str = "typedArraySet";
const SLICE: &str = "arrayBufferSlice";

/// Capture the typed array intrinsics of `ctx`.
///
/// Must run before untrusted script. [`ScriptRuntime::new`] does this for
/// its own context. Sealing an already sealed context is a no-op.
///
/// [`ScriptRuntime::new`]: crate::runtime::ScriptRuntime::new
pub fn seal(ctx: &Ctx<'_>) -> rquickjs::Result<()> {
    let globals = ctx.globals();
    if globals.contains_key(SLOT)? {
        return Ok(());
    }

    let snapshot = Object::new(ctx.clone())?;
    for kind in ElementKind::ALL {
        if kind == ElementKind::None {
            continue;
        }
        let ctor: Constructor = globals.get(kind.as_str())?;
        snapshot.prop(kind.as_str(), ctor)?;
    }

    let object: Object = globals.get("Object")?;
    let get_prototype_of: Function = object.get("getPrototypeOf")?;
    let describe: Function = object.get("getOwnPropertyDescriptor")?;

    let int8: Object = globals.get(ElementKind::Int8Array.as_str())?;
    let int8_proto: Object = int8.get("prototype")?;
    let typed_array_proto: Object = get_prototype_of.call((int8_proto,))?;

    let symbol: Object = globals.get("Symbol")?;
    let to_string_tag: Value = symbol.get("toStringTag")?;

    snapshot.prop(TAG, getter(&describe, &typed_array_proto, to_string_tag)?)?;
    snapshot.prop(BUFFER, getter(&describe, &typed_array_proto, "buffer")?)?;
    snapshot.prop(BYTE_OFFSET, getter(&describe, &typed_array_proto, "byteOffset")?)?;
    snapshot.prop(BYTE_LENGTH, getter(&describe, &typed_array_proto, "byteLength")?)?;
    snapshot.prop(SET, typed_array_proto.get::<_, Function>("set")?)?;

    let array_buffer: Object = globals.get(ElementKind::ArrayBuffer.as_str())?;
    let array_buffer_proto: Object = array_buffer.get("prototype")?;
    snapshot.prop(SLICE, array_buffer_proto.get::<_, Function>("slice")?)?;

    globals.prop(SLOT, snapshot)?;
    tracing::trace!("typed array intrinsics sealed");
    Ok(())
}

fn getter<'js, K: IntoJs<'js>>(
    describe: &Function<'js>,
    proto: &Object<'js>,
    key: K,
) -> rquickjs::Result<Function<'js>> {
    let descriptor: Object = describe.call((proto.clone(), key))?;
    descriptor.get("get")
}

/// Handle on a context's sealed intrinsics.
#[derive(Clone)]
pub(crate) struct Intrinsics<'js>(Object<'js>);

impl<'js> Intrinsics<'js> {
    /// Fetch the snapshot, sealing first if the context never was.
    pub fn load(ctx: &Ctx<'js>) -> rquickjs::Result<Self> {
        let globals = ctx.globals();
        if let Some(snapshot) = globals.get::<_, Option<Object>>(SLOT)? {
            return Ok(Self(snapshot));
        }
        tracing::warn!(
            "typed array intrinsics sealed on first use; earlier scripts may have replaced them"
        );
        seal(ctx)?;
        globals.get(SLOT).map(Self)
    }

    pub fn constructor(&self, kind: ElementKind) -> rquickjs::Result<Constructor<'js>> {
        debug_assert_ne!(kind, ElementKind::None);
        self.0.get(kind.as_str())
    }

    fn call_on<R: FromJs<'js>>(&self, name: &str, this: &Object<'js>) -> rquickjs::Result<R> {
        let function: Function = self.0.get(name)?;
        function.call((This(this.clone()),))
    }

    /// `%TypedArray%.prototype[@@toStringTag]`: the kind name, or `None` for non-views.
    pub fn tag(&self, object: &Object<'js>) -> rquickjs::Result<Option<String>> {
        self.call_on(TAG, object)
    }

    pub fn view_buffer(&self, view: &Object<'js>) -> rquickjs::Result<Object<'js>> {
        self.call_on(BUFFER, view)
    }

    pub fn view_byte_offset(&self, view: &Object<'js>) -> rquickjs::Result<u32> {
        self.call_on(BYTE_OFFSET, view)
    }

    pub fn view_byte_length(&self, view: &Object<'js>) -> rquickjs::Result<u32> {
        self.call_on(BYTE_LENGTH, view)
    }

    /// `ArrayBuffer.prototype.slice` over `[start, end)` of `buffer`.
    pub fn slice(
        &self,
        buffer: &Object<'js>,
        start: u32,
        end: u32,
    ) -> rquickjs::Result<Object<'js>> {
        let slice: Function = self.0.get(SLICE)?;
        slice.call((This(buffer.clone()), start, end))
    }

    /// `%TypedArray%.prototype.set`: copy `source` into `target` from index 0.
    pub fn set(&self, target: &Object<'js>, source: Object<'js>) -> rquickjs::Result<()> {
        let set: Function = self.0.get(SET)?;
        set.call((This(target.clone()), source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ScriptRuntime;

    #[test]
    fn slot_cannot_be_replaced_by_script() {
        let runtime = ScriptRuntime::new().unwrap();
        runtime.context.with(|ctx| {
            ctx.eval::<(), _>(format!("try {{ globalThis.{SLOT} = {{}}; }} catch (_) {{}}"))
                .unwrap();
            ctx.eval::<(), _>(format!("try {{ delete globalThis.{SLOT}; }} catch (_) {{}}"))
                .unwrap();
            let intrinsics = Intrinsics::load(&ctx).unwrap();
            assert!(intrinsics.constructor(ElementKind::Float32Array).is_ok());
        });
    }

    #[test]
    fn sealing_twice_is_a_no_op() {
        let runtime = ScriptRuntime::new().unwrap();
        runtime.context.with(|ctx| {
            seal(&ctx).unwrap();
            seal(&ctx).unwrap();
        });
    }

    #[test]
    fn unsealed_contexts_seal_on_first_load() {
        let rt = rquickjs::Runtime::new().unwrap();
        let context = rquickjs::Context::full(&rt).unwrap();
        context.with(|ctx| {
            assert!(!ctx.globals().contains_key(SLOT).unwrap());
            let intrinsics = Intrinsics::load(&ctx).unwrap();
            let view: Object = ctx.eval("new Uint16Array(3)").unwrap();
            assert_eq!(intrinsics.tag(&view).unwrap().as_deref(), Some("Uint16Array"));
            assert_eq!(intrinsics.view_byte_length(&view).unwrap(), 6);
        });
    }
}
