//! `ucontext`-based fiber backend for Unix targets.
//!
//! Saved execution state lives in a [`libc::ucontext_t`]. Switching is one
//! `swapcontext` call: it stores the caller's registers into the outgoing
//! context and restores the incoming one. A fiber created with a stack gets
//! its context seeded by `getcontext` + `makecontext` so that the first
//! switch into it lands at the top of [`fiber_entry`] on its own stack.
//!
//! `makecontext` only forwards C `int` arguments to the entry routine, so
//! the fiber pointer is split into two 32-bit halves on the way in and
//! rejoined inside the trampoline.

use super::stack::FiberStack;
use crate::fiber::Fiber;

use libc::{c_int, c_uint, ucontext_t};
use std::cell::UnsafeCell;
use std::io;
use std::mem;
use std::ptr;

/// Per-fiber saved state for the `ucontext` backend.
pub(crate) struct UcontextFiber {
    /// Saved machine state. For a fiber wrapping the current thread this
    /// starts zeroed: it is a write target for the first switch away, never
    /// a restore source before that, so no syscall is needed up front.
    context: UnsafeCell<ucontext_t>,

    /// Owned stack mapping; `None` for fibers wrapping an existing thread.
    stack: Option<FiberStack>,
}

impl UcontextFiber {
    /// Wraps the calling thread's execution in a fiber.
    pub(crate) fn from_current_thread() -> io::Result<Self> {
        Ok(Self {
            // Safety: `ucontext_t` is a plain C struct; the all-zero pattern
            // is a valid placeholder that the first `swapcontext` overwrites
            // in full.
            context: UnsafeCell::new(unsafe { mem::zeroed() }),
            stack: None,
        })
    }

    /// Allocates the stack for a new fiber without arming its context yet.
    pub(crate) fn with_stack(stack_size: usize) -> io::Result<Self> {
        let stack = FiberStack::new(stack_size)?;
        Ok(Self {
            // Safety: as in `from_current_thread`; `bind` fills this in.
            context: UnsafeCell::new(unsafe { mem::zeroed() }),
            stack: Some(stack),
        })
    }

    /// Arms the context so the first switch in runs [`fiber_entry`] on the
    /// fiber's own stack with `fiber` as its argument.
    ///
    /// # Safety
    ///
    /// `fiber` must point at the [`Fiber`] that owns this state, at an
    /// address that stays stable until the fiber is dropped.
    pub(crate) unsafe fn bind(&mut self, fiber: *const Fiber) -> io::Result<()> {
        let context = self.context.get_mut();
        let stack = self
            .stack
            .as_ref()
            .expect("bind called on a fiber without a stack");

        // Safety: `context` is a valid, exclusively borrowed ucontext_t.
        let rc = unsafe { libc::getcontext(context) };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }

        context.uc_stack.ss_sp = stack.base();
        context.uc_stack.ss_size = stack.len();
        context.uc_stack.ss_flags = 0;
        // No successor context: a fiber entry must switch away, never return.
        context.uc_link = ptr::null_mut();

        let addr = fiber as usize as u64;
        let lo = addr as c_uint;
        let hi = (addr >> 32) as c_uint;

        // Safety: the cast through `extern "C" fn()` is what the
        // `makecontext` contract requires; argc matches the two integer
        // arguments [`fiber_entry`] declares.
        unsafe {
            let entry = mem::transmute::<extern "C" fn(c_uint, c_uint), extern "C" fn()>(
                fiber_entry,
            );
            libc::makecontext(context, entry, 2, lo as c_int, hi as c_int);
        }

        Ok(())
    }

    /// Saves the calling context into `from` and resumes `to`.
    ///
    /// # Safety
    ///
    /// The caller must be running on `from`, `to` must hold a resumable
    /// saved state, and no other thread may touch either context during the
    /// switch.
    pub(crate) unsafe fn switch(from: &Self, to: &Self) {
        // Safety: per the contract above; only the thread driving this
        // switch reaches into the two cells.
        let rc = unsafe { libc::swapcontext(from.context.get(), to.context.get()) };
        debug_assert_eq!(rc, 0, "swapcontext failed");
    }
}

/// First-switch landing point for created fibers.
///
/// Rejoins the pointer halves smuggled through `makecontext` and hands
/// control to the shared entry runner, which never returns normally.
extern "C" fn fiber_entry(lo: c_uint, hi: c_uint) {
    let addr = (lo as u64) | ((hi as u64) << 32);
    let fiber = addr as usize as *const Fiber;
    // Safety: the halves were produced from a live fiber address in `bind`,
    // and a fiber is never dropped while control is inside it.
    unsafe { crate::fiber::run_entry(fiber) }
}
