/// Fiber has been created but never switched into.
///
/// Only fibers built with [`Fiber::new`](super::Fiber::new) pass through this
/// state; its entry closure has not started running.
pub(crate) const UNSTARTED: usize = 0;

/// Fiber is the current execution context of some thread.
///
/// At most one fiber per thread may observe this state at a time. Fibers
/// wrapping a thread's own execution start here.
pub(crate) const RUNNING: usize = 1;

/// Fiber was switched away from and holds a resumable saved state.
///
/// A suspended fiber resumes exactly when some other fiber's switch names it
/// as the target. This is the only state from which a created fiber may be
/// dropped.
pub(crate) const SUSPENDED: usize = 2;
