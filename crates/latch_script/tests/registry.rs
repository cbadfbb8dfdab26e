//! Process-wide install lifecycle. Kept to a single test so the ordering
//! of "before install" and "after install" is deterministic.

use latch_script::runtime::ScriptRuntime;
use latch_script::typed_array::{
    self, kinds, registry, BackendMode, BridgeConfig, BridgeError, ElementKind, TypedArrayBridge,
};
use pretty_assertions::assert_eq;

#[test]
fn install_once_then_dispatch() {
    assert!(registry::try_active().is_none());
    let early = std::panic::catch_unwind(registry::active);
    assert!(early.is_err(), "active() must refuse to run before install");

    let installed = BridgeConfig { mode: BackendMode::CopyOut }.install().unwrap();
    assert_eq!(installed.mode(), BackendMode::CopyOut);

    let again = registry::install(TypedArrayBridge::for_mode(BackendMode::NoCopy));
    assert!(matches!(
        again,
        Err(BridgeError::AlreadyInstalled { active: "quickjs-copy-out" })
    ));
    assert_eq!(registry::active().mode(), BackendMode::CopyOut);

    let runtime = ScriptRuntime::new().unwrap();
    runtime.context.with(|ctx| {
        let value = typed_array::create::<kinds::Uint16Array>(&ctx, &[7, 8, 9]).unwrap();
        assert_eq!(typed_array::type_of(&ctx, &value), ElementKind::Uint16Array);
        assert_eq!(typed_array::read::<kinds::Uint16Array>(&ctx, &value), vec![7, 8, 9]);
        assert_eq!(typed_array::raw_read(&ctx, &value).len(), 6);
        assert_eq!(typed_array::try_read::<kinds::Uint16Array>(&ctx, &value), Ok(vec![7, 8, 9]));
        assert_eq!(typed_array::write(&ctx, &value, &[1u16]), 2);
        assert_eq!(typed_array::read::<kinds::Uint16Array>(&ctx, &value), vec![1, 8, 9]);
    });
}
