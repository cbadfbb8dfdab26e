//! Process-wide active backend.
//!
//! Installed exactly once during startup, read-only afterwards. Prefer
//! passing a [`TypedArrayBridge`] around directly; the registry exists
//! for collaborators that cannot be handed one.

use crate::typed_array::bridge::TypedArrayBridge;
use crate::typed_array::error::BridgeError;
use once_cell::sync::OnceCell;

static ACTIVE: OnceCell<TypedArrayBridge> = OnceCell::new();

/// Install the process-wide bridge. Fails if one is already installed.
pub fn install(bridge: TypedArrayBridge) -> Result<&'static TypedArrayBridge, BridgeError> {
    let name = bridge.backend().name();
    let mut fresh = false;
    let active = ACTIVE.get_or_init(|| {
        fresh = true;
        bridge
    });

    if !fresh {
        let active_name = active.backend().name();
        tracing::warn!(
            rejected = name,
            active = active_name,
            "typed array backend already installed"
        );
        return Err(BridgeError::AlreadyInstalled { active: active_name });
    }

    tracing::info!(backend = name, mode = %active.mode(), "typed array backend installed");
    Ok(active)
}

/// The installed bridge.
///
/// # Panics
/// Panics if no backend has been installed yet. That is a startup-ordering
/// bug in the host, not a condition callers can recover from.
pub fn active() -> &'static TypedArrayBridge {
    match ACTIVE.get() {
        Some(bridge) => bridge,
        None => panic!("typed array bridge used before a backend was installed"),
    }
}

pub fn try_active() -> Option<&'static TypedArrayBridge> {
    ACTIVE.get()
}
