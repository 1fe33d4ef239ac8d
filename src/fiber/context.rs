use crate::fiber::Fiber;

use std::cell::Cell;
use std::ptr;

thread_local! {
    /// Thread-local pointer to the fiber currently executing on this thread.
    ///
    /// Registered by [`Fiber::from_current_thread`](super::Fiber::from_current_thread)
    /// and retargeted by every switch, it is what makes "exactly one current
    /// context per thread" a checkable invariant. Null until the thread
    /// adopts itself as a thread fiber.
    static CURRENT_FIBER: Cell<*const Fiber> = const { Cell::new(ptr::null()) };
}

/// Returns the fiber currently registered as running on this thread, or null
/// if the thread has not adopted itself as a thread fiber.
pub(crate) fn current() -> *const Fiber {
    CURRENT_FIBER.with(Cell::get)
}

/// Records `fiber` as the current execution context of this thread.
///
/// Called immediately before control is handed to `fiber`; the store must
/// happen on the switching side because the resumed side does not run any
/// bookkeeping code of its own.
pub(crate) fn set_current(fiber: *const Fiber) {
    CURRENT_FIBER.with(|cell| cell.set(fiber));
}

/// Returns `true` if `fiber` is the current execution context of this thread.
pub(crate) fn is_current(fiber: &Fiber) -> bool {
    ptr::eq(current(), fiber)
}
