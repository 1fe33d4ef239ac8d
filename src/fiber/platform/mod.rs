//! Platform-specific fiber backend abstraction.
//!
//! This module provides a unified interface over the two ways an OS can
//! host a fiber:
//! - `ucontext` contexts with a manually mapped stack on Unix,
//! - native fibers (`CreateFiberEx` and friends) on Windows.
//!
//! Both backends expose the same three-step surface: construct (wrap the
//! current thread, or allocate a stack), `bind` the owning fiber's address
//! into the entry trampoline, and `switch` between two fibers.
//!
//! The concrete implementation is selected at compile time depending on
//! the target operating system.

#[cfg(unix)]
mod stack;

#[cfg(unix)]
mod unix;

#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub(crate) type PlatformFiber = unix::UcontextFiber;

#[cfg(windows)]
pub(crate) type PlatformFiber = windows::WindowsFiber;
