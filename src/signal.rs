use axerrno::{LinuxError, LinuxResult};
use bitflags::bitflags;
use log::debug;

use crate::{INVALID_PID, Pid, table::PidTable, wait::WaitQueue};

/// Hangup.
pub const SIGHUP: u32 = 1;
/// Keyboard interrupt.
pub const SIGINT: u32 = 2;
/// Quit.
pub const SIGQUIT: u32 = 3;
/// Unblockable termination.
pub const SIGKILL: u32 = 9;
/// Termination request.
pub const SIGTERM: u32 = 15;
/// Stop.
pub const SIGSTOP: u32 = 17;
/// Continue a stopped process; cancels a pending [`SIGSTOP`].
pub const SIGCONT: u32 = 19;
/// Window size change.
pub const SIGWINCH: u32 = 28;
/// Status report request.
pub const SIGINFO: u32 = 29;

/// Largest signal number accepted by [`PidTable::kill`].
pub const SIG_MAX: u32 = 32;

bitflags! {
    /// Signals delivered to a record but not yet acted on.
    ///
    /// Bit `n` is signal `n`, one bit per recognized signal, so distinct
    /// signals stay distinguishable until the owning thread polls them.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct PendingSignals: u32 {
        const HUP = 1 << SIGHUP;
        const INT = 1 << SIGINT;
        const QUIT = 1 << SIGQUIT;
        const KILL = 1 << SIGKILL;
        const TERM = 1 << SIGTERM;
        const STOP = 1 << SIGSTOP;
        const WINCH = 1 << SIGWINCH;
        const INFO = 1 << SIGINFO;
    }
}

impl PendingSignals {
    /// The flag for a recognized, deliverable signal number.
    ///
    /// [`SIGCONT`] has no flag of its own: delivering it only cancels a
    /// pending stop.
    fn from_signal(sig: u32) -> Option<Self> {
        match sig {
            SIGHUP => Some(Self::HUP),
            SIGINT => Some(Self::INT),
            SIGQUIT => Some(Self::QUIT),
            SIGKILL => Some(Self::KILL),
            SIGTERM => Some(Self::TERM),
            SIGSTOP => Some(Self::STOP),
            SIGWINCH => Some(Self::WINCH),
            SIGINFO => Some(Self::INFO),
            _ => None,
        }
    }

    /// The lowest-numbered signal currently pending.
    pub fn lowest(self) -> Option<u32> {
        (!self.is_empty()).then(|| self.bits().trailing_zeros())
    }
}

/// Signal delivery.
impl<W: WaitQueue> PidTable<W> {
    /// Delivers `sig` to `target`.
    ///
    /// Delivery only marks the record; the owning thread observes the mark
    /// via [`PidTable::pending_signal`] at its next safe point. Signal `0`
    /// probes for the target's existence without any effect, [`SIGCONT`]
    /// clears a pending [`SIGSTOP`], and the other recognized signals set
    /// their own pending bit. Numbers outside `1..=SIG_MAX` fail with
    /// `EINVAL`; in-range but unrecognized ones with `ENOSYS`. No error path
    /// has side effects.
    pub fn kill(&self, target: Pid, sig: u32) -> LinuxResult<()> {
        if target == INVALID_PID {
            return Err(LinuxError::ESRCH);
        }

        let mut inner = self.lock();
        let entry = inner.get_mut(target).ok_or(LinuxError::ESRCH)?;

        if sig == 0 {
            return Ok(());
        }
        if !(1..=SIG_MAX).contains(&sig) {
            return Err(LinuxError::EINVAL);
        }

        if sig == SIGCONT {
            debug!("delivering SIGCONT to pid {target}");
            entry.pending.remove(PendingSignals::STOP);
        } else if let Some(flag) = PendingSignals::from_signal(sig) {
            debug!("delivering signal {sig} to pid {target}");
            entry.pending.insert(flag);
        } else {
            return Err(LinuxError::ENOSYS);
        }

        Ok(())
    }

    /// Safe-point poll for a pending signal on `current`.
    ///
    /// Returns the lowest-numbered signal delivered to `current` and not yet
    /// acted on; the caller is expected to terminate itself with it as its
    /// exit status. `None` if nothing is pending or the record is gone.
    pub fn pending_signal(&self, current: Pid) -> Option<u32> {
        let inner = self.lock();
        inner.get(current)?.pending.lowest()
    }
}
