use axerrno::LinuxResult;

/// Blocking support supplied by the scheduler.
///
/// Every lifecycle record owns one queue; a thread joining the record blocks
/// on it and the record's exit broadcasts on it. This is the only suspension
/// point in the crate.
pub trait WaitQueue: Sized + Send + Sync {
    /// Creates a new queue, failing with `ENOMEM` if the backing storage
    /// cannot be obtained.
    fn new() -> LinuxResult<Self>;

    /// Blocks the calling thread until `cond` returns true.
    ///
    /// `cond` must be evaluated under the queue's own serialization, so that
    /// a [`notify_all`](WaitQueue::notify_all) arriving between the check and
    /// the suspension cannot be lost.
    fn wait_until<F: FnMut() -> bool>(&self, cond: F);

    /// Wakes every thread blocked in [`wait_until`](WaitQueue::wait_until).
    fn notify_all(&self);
}
