//! Cooperatively scheduled fibers (user-space execution contexts).
//!
//! A [`Fiber`] is an execution context with its own stack that is scheduled
//! explicitly: control only moves when a running fiber calls
//! [`Fiber::switch_to`], and the suspended side resumes exactly where it
//! left off. Nothing preempts a fiber and no fiber runs on two threads at
//! once, which is what makes them useful as the substrate of blocking-free
//! schedulers: a worker that would block parks its fiber and switches to
//! another one instead of stalling the thread.
//!
//! There are two kinds of fiber:
//! - a *thread fiber* from [`Fiber::from_current_thread`], which adopts the
//!   calling thread's existing stack so that the thread itself can take part
//!   in switching;
//! - a *created fiber* from [`Fiber::new`], which owns a freshly mapped
//!   stack and starts executing its entry closure on the first switch in.
//!
//! Switching is inherently `unsafe`: the compiler cannot see that a fiber
//! jumps between stacks, so the caller carries the scheduling contract (see
//! [`Fiber::switch_to`]). Everything else on the type is safe.
//!
//! The entry closure of a created fiber receives a reference to its own
//! fiber, so it can hand control onward without external plumbing.
//!
//! # Example
//!
//! ```rust,ignore
//! use filament::Fiber;
//! use std::sync::Arc;
//!
//! let main = Fiber::from_current_thread()?;
//!
//! let back = Arc::clone(&main);
//! let worker = Fiber::new(64 * 1024, move |me| {
//!     println!("on the worker stack");
//!     // A fiber entry must end by switching away, never by returning.
//!     unsafe { me.switch_to(&back) };
//! })?;
//!
//! unsafe { main.switch_to(&worker) };
//! ```

mod context;
mod platform;
mod state;

use platform::PlatformFiber;

use std::cell::UnsafeCell;
use std::io;
use std::ptr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A cooperatively scheduled execution context.
///
/// Handles are shared as `Arc<Fiber>` so that a suspended fiber's stack and
/// saved registers stay alive while any part of the program can still
/// switch to it. The address behind the `Arc` is also what the platform
/// trampoline receives on the first switch in, so a `Fiber` is never moved
/// once constructed.
pub struct Fiber {
    /// The current lifecycle state of the fiber (UNSTARTED, RUNNING or
    /// SUSPENDED).
    state: AtomicUsize,

    /// Entry closure for created fibers.
    ///
    /// `None` for thread fibers, and again after the first switch in has
    /// consumed it. Wrapped in `UnsafeCell` because the trampoline takes it
    /// out from the fiber's own stack, where no `&mut self` can exist.
    entry: UnsafeCell<Option<Box<dyn FnOnce(&Fiber) + Send>>>,

    /// Platform saved state: registers plus, for created fibers, the stack.
    ///
    /// Wrapped in `UnsafeCell` because a switch writes the *outgoing*
    /// fiber's context through a shared reference.
    inner: UnsafeCell<PlatformFiber>,

    /// Whether this fiber adopted a thread's stack instead of owning one.
    thread_fiber: bool,
}

// A fiber's mutable internals (`entry`, `inner`) are only ever touched by
// the single thread currently driving it, which the `switch_to` contract
// guarantees; the atomics handle the rest.
unsafe impl Send for Fiber {}
unsafe impl Sync for Fiber {}

impl Fiber {
    /// The smallest stack accepted by [`Fiber::new`], in bytes.
    ///
    /// Anything below this cannot reliably hold a signal-free call chain on
    /// the supported targets, so smaller requests are rejected up front
    /// instead of faulting on first use.
    pub const MIN_STACK_SIZE: usize = 8 * 1024;

    /// Wraps the calling thread's execution in a fiber.
    ///
    /// The returned fiber is `RUNNING` and registered as the thread's
    /// current fiber; it adopts the thread's own stack rather than
    /// allocating one. Threads that want to switch to created fibers must
    /// call this first so there is a context to switch back to.
    ///
    /// Dropping the last handle unregisters the fiber and returns the
    /// thread to its ordinary, fiber-less execution. That drop must happen
    /// on the adopted thread while this fiber is the one running, i.e.
    /// after it has been switched back to; the platform teardown acts on
    /// the calling thread.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the platform fails to adopt the thread. On
    /// Unix this path performs no syscall and cannot fail.
    pub fn from_current_thread() -> io::Result<Arc<Fiber>> {
        debug_assert!(
            context::current().is_null(),
            "thread already runs inside a fiber"
        );

        let fiber = Arc::new(Fiber {
            state: AtomicUsize::new(state::RUNNING),
            entry: UnsafeCell::new(None),
            inner: UnsafeCell::new(PlatformFiber::from_current_thread()?),
            thread_fiber: true,
        });

        context::set_current(Arc::as_ptr(&fiber));
        Ok(fiber)
    }

    /// Creates a suspended fiber that will run `entry` on its own stack.
    ///
    /// The stack holds at least `stack_size` usable bytes (rounded up to
    /// whole pages) and is bounded below by a guard page, so an overflow
    /// faults instead of corrupting neighboring memory. The fiber stays
    /// `UNSTARTED` until the first switch in, which begins executing
    /// `entry` from its top; `entry` receives a reference to its own fiber
    /// so it can switch away.
    ///
    /// `entry` must finish by switching to another fiber. If it returns
    /// instead, there is no frame to return into; the process panics with a
    /// diagnostic and aborts. A panic that unwinds out of `entry` aborts
    /// the same way.
    ///
    /// # Errors
    ///
    /// Returns [`io::ErrorKind::InvalidInput`] if `stack_size` is below
    /// [`MIN_STACK_SIZE`](Self::MIN_STACK_SIZE), or the OS error if stack
    /// memory could not be mapped.
    pub fn new<F>(stack_size: usize, entry: F) -> io::Result<Arc<Fiber>>
    where
        F: FnOnce(&Fiber) + Send + 'static,
    {
        if stack_size < Self::MIN_STACK_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "stack size {stack_size} is below the minimum of {} bytes",
                    Self::MIN_STACK_SIZE
                ),
            ));
        }

        let fiber = Arc::new(Fiber {
            state: AtomicUsize::new(state::UNSTARTED),
            entry: UnsafeCell::new(Some(Box::new(entry))),
            inner: UnsafeCell::new(PlatformFiber::with_stack(stack_size)?),
            thread_fiber: false,
        });

        // The Arc allocation fixes the fiber's address; arm the platform
        // trampoline with it now that it is known.
        // Safety: nothing else can reach `inner` before `new` returns, and
        // the address stays valid until the last handle is dropped.
        unsafe { (*fiber.inner.get()).bind(Arc::as_ptr(&fiber))? };

        Ok(fiber)
    }

    /// Suspends this fiber and resumes `target`.
    ///
    /// Control re-enters this call when some fiber later switches back to
    /// `self`. The switch is recorded before control leaves this stack:
    /// `self` becomes `SUSPENDED`, `target` becomes `RUNNING` and is made
    /// the thread's current fiber.
    ///
    /// # Safety
    ///
    /// The caller must uphold the scheduling contract:
    /// - `self` is the fiber currently executing on this thread;
    /// - `target` is not running on any thread (it is `UNSTARTED` or
    ///   `SUSPENDED`), and no other thread switches to it concurrently;
    /// - if `target` last ran on a different thread, the hand-off between
    ///   the two threads is otherwise synchronized.
    ///
    /// Debug builds catch violations of the first two rules with
    /// assertions; release builds do not, and a violation is undefined
    /// behavior (two threads sharing one stack).
    pub unsafe fn switch_to(&self, target: &Fiber) {
        debug_assert!(
            context::is_current(self),
            "switch_to called on a fiber that is not current"
        );
        debug_assert!(
            !ptr::eq(self, target),
            "fiber cannot switch to itself"
        );
        debug_assert_ne!(
            target.state.load(Ordering::Acquire),
            state::RUNNING,
            "switch target is already running"
        );

        self.state.store(state::SUSPENDED, Ordering::Release);
        target.state.store(state::RUNNING, Ordering::Release);
        // The resumed side runs no bookkeeping of its own, so the hand-off
        // is recorded before control leaves this stack.
        context::set_current(target);

        // Safety: per this function's contract, the calling thread is the
        // only one touching either context.
        unsafe { PlatformFiber::switch(&*self.inner.get(), &*target.inner.get()) };

        // Some fiber switched back; `self` is RUNNING and current again.
    }
}

impl Drop for Fiber {
    fn drop(&mut self) {
        if context::is_current(self) {
            // Only a thread fiber may be dropped while current: that is the
            // thread winding itself down. A created fiber dropping its own
            // stack out from under itself is a scheduling bug.
            debug_assert!(self.thread_fiber, "fiber dropped while running");
            context::set_current(ptr::null());
        } else {
            // Reversing an adoption must happen on the adopted thread while
            // this fiber is the one running, or the platform teardown would
            // hit the wrong thread.
            debug_assert!(
                !self.thread_fiber,
                "thread fiber dropped while not current"
            );
            debug_assert_ne!(
                self.state.load(Ordering::Acquire),
                state::RUNNING,
                "fiber dropped while running on another thread"
            );
        }
    }
}

impl std::fmt::Debug for Fiber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.state.load(Ordering::Acquire) {
            state::UNSTARTED => "unstarted",
            state::RUNNING => "running",
            state::SUSPENDED => "suspended",
            _ => "unknown",
        };
        f.debug_struct("Fiber")
            .field("state", &state)
            .field("thread_fiber", &self.thread_fiber)
            .finish()
    }
}

/// Runs a created fiber's entry closure after the first switch in.
///
/// Called by the platform trampolines on the fiber's own stack. Never
/// returns: a well-behaved entry switches away forever, and one that
/// returns is reported and taken down here.
///
/// # Safety
///
/// `fiber` must be the address armed by `bind`, still alive.
pub(crate) unsafe fn run_entry(fiber: *const Fiber) -> ! {
    // Safety: per the contract; the handle keeping this fiber alive cannot
    // be released while control is inside it.
    let fiber = unsafe { &*fiber };

    // Safety: first and only take; this fiber is RUNNING, so no other
    // thread reaches into the cell.
    let entry = unsafe { (*fiber.entry.get()).take() };
    if let Some(entry) = entry {
        entry(fiber);
    }

    // There is no caller frame on this stack. The panic unwinds into the
    // extern trampoline, which aborts the process after printing the
    // message.
    panic!("fiber entry returned instead of switching away");
}
