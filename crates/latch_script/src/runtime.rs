//! Script runtime management
//!
//! Owns the QuickJS runtime and context that typed arrays live in.

use crate::typed_array::{intrinsics, BridgeError};
use rquickjs::{Context, Runtime};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Script execution context
pub struct ScriptRuntime {
    pub context: Context,
    runtime: Runtime,
    valid: Arc<AtomicBool>,
}

/// Native context handle plus a flag that drops once teardown begins.
///
/// Handles keep the context alive on their own; `is_valid` turns false as
/// soon as the owning [`ScriptRuntime`] is dropped.
#[derive(Clone)]
pub struct EngineHandle {
    context: Context,
    valid: Arc<AtomicBool>,
}

impl EngineHandle {
    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Acquire)
    }
}

impl ScriptRuntime {
    /// Create a runtime and seal its typed array intrinsics before any script runs.
    pub fn new() -> Result<Self, BridgeError> {
        let runtime = Runtime::new()?;
        let context = Context::full(&runtime)?;
        context.with(|ctx| intrinsics::seal(&ctx))?;

        Ok(Self {
            context,
            runtime,
            valid: Arc::new(AtomicBool::new(true)),
        })
    }

    pub fn execute(&self, source: &str) -> Result<(), BridgeError> {
        self.context.with(|ctx| ctx.eval::<(), _>(source))?;
        Ok(())
    }

    pub fn engine_handle(&self) -> EngineHandle {
        EngineHandle {
            context: self.context.clone(),
            valid: Arc::clone(&self.valid),
        }
    }

    /// Run a full collection, firing release callbacks of anything unreachable.
    pub fn run_gc(&self) {
        self.runtime.run_gc();
    }
}

impl Drop for ScriptRuntime {
    fn drop(&mut self) {
        self.valid.store(false, Ordering::Release);
        tracing::trace!("script runtime teardown");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_is_valid_while_runtime_lives() {
        let runtime = ScriptRuntime::new().unwrap();
        let handle = runtime.engine_handle();
        assert!(handle.is_valid());
        let two: i32 = handle.context().with(|ctx| ctx.eval("1 + 1")).unwrap();
        assert_eq!(two, 2);
    }

    #[test]
    fn handle_observes_teardown() {
        let runtime = ScriptRuntime::new().unwrap();
        let handle = runtime.engine_handle();
        let copy = handle.clone();
        drop(runtime);
        assert!(!handle.is_valid());
        assert!(!copy.is_valid());
    }

    #[test]
    fn execute_reports_script_errors() {
        let runtime = ScriptRuntime::new().unwrap();
        runtime.execute("globalThis.answer = 42;").unwrap();
        assert!(matches!(
            runtime.execute("throw new Error('boom')"),
            Err(BridgeError::Engine(_))
        ));
    }

    #[test]
    fn intrinsics_are_sealed_on_creation() {
        let runtime = ScriptRuntime::new().unwrap();
        let sealed = runtime
            .context
            .with(|ctx| ctx.globals().contains_key(intrinsics::SLOT))
            .unwrap();
        assert!(sealed);
    }
}
