//! # Filament
//!
//! **Filament** is a small cooperative-scheduling toolkit for Rust, designed as the
//! fiber substrate for the **Nebula** ecosystem's blocking-free schedulers.
//!
//! Unlike full task runtimes, Filament stops at the primitives a scheduler is built
//! from: stackful fibers with explicit switching, and an inline-first vector for the
//! small, hot collections such schedulers keep per worker. There is no queue, no
//! worker pool and no I/O here; higher layers compose those out of these pieces.
//!
//! Filament is built from the ground up with predictability in mind, offering:
//!
//! - **Stackful fibers** over `ucontext` (Unix) and native fibers (Windows), with
//!   guard-paged stacks and explicit, cooperative `switch_to` hand-offs
//! - A **thread adopter** so the thread itself becomes a switchable fiber and can
//!   always be switched back to
//! - An **inline-first vector**, [`InlineVec`], that stores up to `N` elements
//!   without touching the heap and spills to a heap buffer only when it must
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use filament::Fiber;
//! use std::sync::Arc;
//!
//! fn main() -> std::io::Result<()> {
//!     let main = Fiber::from_current_thread()?;
//!
//!     let back = Arc::clone(&main);
//!     let worker = Fiber::new(64 * 1024, move |me| {
//!         println!("running on the worker fiber");
//!         unsafe { me.switch_to(&back) };
//!     })?;
//!
//!     // Runs the worker to its first switch-away, then resumes here.
//!     unsafe { main.switch_to(&worker) };
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`fiber`] — Stackful fibers and cooperative switching
//! - [`containers`] — Inline-first collections
//!
//! ## Getting Started
//!
//! Add Filament to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! filament = { git = "https://github.com/nebula-platform/filament", package = "filament" }
//! ```

pub mod containers;
pub mod fiber;

pub use containers::InlineVec;
pub use fiber::Fiber;
