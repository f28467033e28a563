#![forbid(unsafe_code)]

//! Logging support for the core primitives.
//!
//! With the `tracing` feature `debug!` is re-exported from `tracing`.
//! Without it, a no-op stand-in is exported at the crate root so call sites
//! can write `crate::debug!(...)` unconditionally.

#[cfg(feature = "tracing")]
pub use tracing::debug;

#[cfg(not(feature = "tracing"))]
mod noop_macros {
    /// No-op debug macro when tracing is disabled.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }
}
