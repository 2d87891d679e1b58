use alloc::sync::Arc;
use core::fmt;

use axerrno::LinuxResult;

use crate::{INVALID_PID, Pid, signal::PendingSignals, wait::WaitQueue};

/// Recognizably invalid status for a record that has not exited yet.
pub(crate) const STATUS_UNSET: i32 = 0xbaad;
/// Placeholder status stamped on a record reclaimed via `unalloc`.
pub(crate) const STATUS_ROLLBACK: i32 = 0xdead;

/// Lifecycle record for one allocated pid.
///
/// If `ppid` is [`INVALID_PID`] the parent has gone away and will not be
/// waiting; once that holds together with `exited`, nobody can ever observe
/// the record again and it may be dropped from the table.
pub(crate) struct PidEntry<W> {
    pub(crate) pid: Pid,
    pub(crate) ppid: Pid,
    pub(crate) exited: bool,
    pub(crate) exit_status: i32,
    pub(crate) pending: PendingSignals,
    pub(crate) wait: Arc<W>,
}

impl<W: WaitQueue> PidEntry<W> {
    pub(crate) fn new(pid: Pid, ppid: Pid) -> LinuxResult<Self> {
        assert_ne!(pid, INVALID_PID);
        Ok(Self {
            pid,
            ppid,
            exited: false,
            exit_status: STATUS_UNSET,
            pending: PendingSignals::empty(),
            wait: Arc::new(W::new()?),
        })
    }

    /// True once the record is both exited and disowned.
    pub(crate) fn reclaimable(&self) -> bool {
        self.exited && self.ppid == INVALID_PID
    }
}

impl<W> fmt::Debug for PidEntry<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PidEntry({}, ppid={}, exited={})",
            self.pid, self.ppid, self.exited
        )
    }
}
