//! Native fiber backend for Windows targets.
//!
//! Windows ships fibers as an OS facility, so this backend is a thin
//! wrapper: `CreateFiberEx` allocates the stack and arms the entry
//! trampoline in one call, `SwitchToFiber` performs the switch, and the OS
//! tracks which fiber each thread is currently running. A fiber wrapping
//! the calling thread comes from `ConvertThreadToFiberEx` and is undone
//! with `ConvertFiberToThread` when dropped.
//!
//! `FIBER_FLAG_FLOAT_SWITCH` is always set: without it the floating point
//! state is shared across fibers on the same thread, which would make FP
//! arithmetic unsound across switches.

use crate::fiber::Fiber;

use std::ffi::c_void;
use std::io;
use std::ptr;

use windows_sys::Win32::System::Threading::{
    ConvertFiberToThread, ConvertThreadToFiberEx, CreateFiberEx, DeleteFiber, SwitchToFiber,
    FIBER_FLAG_FLOAT_SWITCH,
};

/// Per-fiber saved state for the Windows backend.
pub(crate) struct WindowsFiber {
    /// Raw fiber handle returned by the OS. Null for a created fiber until
    /// `bind` arms it.
    raw: *mut c_void,

    /// Requested stack size, kept until `bind` passes it to the OS.
    stack_size: usize,

    /// Whether this fiber wraps the thread itself rather than owning a
    /// `CreateFiberEx` allocation.
    from_thread: bool,
}

impl WindowsFiber {
    /// Wraps the calling thread's execution in a fiber.
    pub(crate) fn from_current_thread() -> io::Result<Self> {
        // Safety: no fiber parameter; float state kept per fiber.
        let raw = unsafe { ConvertThreadToFiberEx(ptr::null(), FIBER_FLAG_FLOAT_SWITCH) };
        if raw.is_null() {
            return Err(io::Error::last_os_error());
        }
        Ok(Self {
            raw,
            stack_size: 0,
            from_thread: true,
        })
    }

    /// Records the stack size for a new fiber without creating it yet.
    pub(crate) fn with_stack(stack_size: usize) -> io::Result<Self> {
        Ok(Self {
            raw: ptr::null_mut(),
            stack_size,
            from_thread: false,
        })
    }

    /// Creates the OS fiber so the first switch in runs [`fiber_entry`] on
    /// its own stack with `fiber` as its argument.
    ///
    /// # Safety
    ///
    /// `fiber` must point at the [`Fiber`] that owns this state, at an
    /// address that stays stable until the fiber is dropped.
    pub(crate) unsafe fn bind(&mut self, fiber: *const Fiber) -> io::Result<()> {
        // Commit the whole reservation up front; the OS adds its own guard
        // page below it.
        // Safety: the trampoline and its parameter outlive the fiber handle.
        let raw = unsafe {
            CreateFiberEx(
                self.stack_size,
                self.stack_size,
                FIBER_FLAG_FLOAT_SWITCH,
                Some(fiber_entry),
                fiber.cast(),
            )
        };
        if raw.is_null() {
            return Err(io::Error::last_os_error());
        }
        self.raw = raw;
        Ok(())
    }

    /// Resumes `to`; the OS saves the calling fiber's state itself.
    ///
    /// # Safety
    ///
    /// The caller must be running on `from`, `to` must hold a resumable
    /// saved state, and no other thread may touch either fiber during the
    /// switch.
    pub(crate) unsafe fn switch(_from: &Self, to: &Self) {
        // Safety: per the contract above; `to.raw` is a live fiber handle.
        unsafe { SwitchToFiber(to.raw) };
    }
}

impl Drop for WindowsFiber {
    fn drop(&mut self) {
        if self.from_thread {
            // Safety: undoes ConvertThreadToFiberEx on the thread that is
            // winding this fiber down.
            let ok = unsafe { ConvertFiberToThread() };
            debug_assert_ne!(ok, 0, "ConvertFiberToThread failed");
        } else if !self.raw.is_null() {
            // Safety: the fiber is not running, so DeleteFiber only frees
            // its stack and bookkeeping.
            unsafe { DeleteFiber(self.raw) };
        }
    }
}

/// First-switch landing point for created fibers.
unsafe extern "system" fn fiber_entry(param: *mut c_void) {
    // Safety: `param` is the live fiber address installed by `bind`, and a
    // fiber is never dropped while control is inside it.
    unsafe { crate::fiber::run_entry(param.cast()) }
}
