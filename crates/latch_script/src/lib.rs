//! Latch Scripting System
//!
//! JavaScript execution via QuickJS, plus the typed array bridge that moves
//! numeric buffers between native code and script.
//!
//! ## Architecture
//!
//! - **Runtime:** one QuickJS runtime/context pair per [`runtime::ScriptRuntime`]
//! - **Typed arrays:** [`typed_array`] creates and reads script typed arrays,
//!   either copying through the engine (`copy-out`) or transferring native
//!   blocks to it (`no-copy`)
//!
//! ```ignore
//! use latch_script::typed_array::{self, kinds, BridgeConfig};
//!
//! BridgeConfig::from_env()?.install()?;
//! runtime.context.with(|ctx| {
//!     let value = typed_array::create::<kinds::Float32Array>(&ctx, &[1.0, 2.0])?;
//!     assert_eq!(typed_array::read::<kinds::Float32Array>(&ctx, &value), [1.0, 2.0]);
//!     Ok::<_, typed_array::BridgeError>(())
//! })?;
//! ```

pub mod runtime;
pub mod typed_array;

pub use rquickjs;
