//! Latch Engine Runtime
//!
//! Minimal binary that selects the typed array backend, boots a script
//! runtime and checks that buffers survive the trip into script and back.

use anyhow::{ensure, Result};
use latch_script::runtime::ScriptRuntime;
use latch_script::typed_array::{self, kinds, BridgeConfig, ElementKind};
use std::path::PathBuf;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    tracing::info!("Latch Runtime v{}", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = BridgeConfig::load(config_path.as_deref())?;
    config.install()?;

    let runtime = ScriptRuntime::new()?;
    self_check(&runtime)?;

    tracing::info!("Runtime initialized successfully");
    Ok(())
}

/// Push a small buffer through the installed backend and read it back.
fn self_check(runtime: &ScriptRuntime) -> Result<()> {
    let handle = runtime.engine_handle();
    ensure!(handle.is_valid(), "script context already torn down");

    handle.context().with(|ctx| -> Result<()> {
        let bytes = typed_array::create::<kinds::Uint8Array>(&ctx, &[1, 2, 3, 255])?;
        ensure!(typed_array::type_of(&ctx, &bytes) == ElementKind::Uint8Array);
        ensure!(typed_array::raw_read(&ctx, &bytes) == [1, 2, 3, 255]);

        let empty = typed_array::create::<kinds::Float32Array>(&ctx, &[])?;
        ensure!(typed_array::read::<kinds::Float32Array>(&ctx, &empty).is_empty());

        ctx.globals().set("selfCheck", bytes)?;
        ctx.eval::<(), _>("selfCheck[0] = 42;")?;
        let bytes = ctx.globals().get("selfCheck")?;
        let read = typed_array::raw_read(&ctx, &bytes);
        let mode = typed_array::registry::active().mode();
        tracing::info!(%mode, ?read, "typed array self-check passed");
        ensure!(read == [42, 2, 3, 255]);
        Ok(())
    })?;

    runtime.run_gc();
    Ok(())
}
