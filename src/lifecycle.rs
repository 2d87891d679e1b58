use alloc::vec::Vec;

use axerrno::{LinuxError, LinuxResult};
use bitflags::bitflags;
use log::{debug, trace};

use crate::{BOOTUP_PID, INVALID_PID, Pid, table::PidTable, wait::WaitQueue};

bitflags! {
    /// Flags accepted by [`PidTable::join`] and [`PidTable::wait_child`].
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct JoinFlags: u32 {
        /// Return immediately instead of blocking when the target has not
        /// exited yet.
        const NOHANG = 1;
    }
}

/// Exit, wait and detach.
impl<W: WaitQueue> PidTable<W> {
    /// Disowns `child`, so that its record is freed as soon as it exits (or
    /// immediately, if it already has).
    ///
    /// Only the current parent of `child` may detach it, and only once:
    /// `EINVAL` is returned for a non-parent caller, an already-detached
    /// target, or a sentinel pid, and `ESRCH` for an unknown one.
    pub fn detach(&self, current: Pid, child: Pid) -> LinuxResult<()> {
        if child == INVALID_PID || child == BOOTUP_PID {
            return Err(LinuxError::EINVAL);
        }

        let mut inner = self.lock();

        let entry = inner.get_mut(child).ok_or(LinuxError::ESRCH)?;
        if entry.ppid == INVALID_PID {
            // Already detached.
            return Err(LinuxError::EINVAL);
        }
        if entry.ppid != current {
            return Err(LinuxError::EINVAL);
        }

        entry.ppid = INVALID_PID;
        let exited = entry.exited;
        if exited {
            inner.drop_entry(child);
        }

        trace!("pid {current} detached pid {child}");
        Ok(())
    }

    /// Publishes the exit status of `current` and wakes every thread joining
    /// it. If `current` was already detached, its record is freed instead.
    ///
    /// With `detach_children` set, every remaining child of `current` is
    /// detached first: exited children are freed and live ones become
    /// orphans.
    ///
    /// Must be called exactly once, by the execution context that owns
    /// `current`.
    ///
    /// # Panics
    ///
    /// Panics if `current` has no record in the table.
    pub fn exit(&self, current: Pid, status: i32, detach_children: bool) {
        assert!(
            self.lock().get(current).is_some(),
            "exit of pid {current} which has no record"
        );

        if detach_children {
            // Collect the child pids under the lock, then detach with it
            // released: detach acquires the table lock itself.
            let children: Vec<Pid> = self.lock().children_of(current);
            for child in children {
                // Cannot fail: we are the parent and have not detached yet.
                let _ = self.detach(current, child);
            }
        }

        let wait = {
            let mut inner = self.lock();
            let entry = inner
                .get_mut(current)
                .unwrap_or_else(|| panic!("exit of pid {current} which has no record"));
            entry.exit_status = status;
            entry.exited = true;
            let wait = entry.wait.clone();
            if entry.ppid == INVALID_PID {
                inner.drop_entry(current);
            }
            wait
        };

        debug!("pid {current} exited with status {status}");

        // Waking outside the table lock keeps the lock order one-way; the
        // queue's own serialization orders this against a joiner's re-check
        // of `exited`, so the wake cannot be lost. The wake also covers a
        // joiner that blocked before a racing detach made the record
        // reclaimable here.
        wait.notify_all();
    }

    /// Retrieves the exit status of `target` once it is available.
    ///
    /// Blocks until `target` exits, unless [`JoinFlags::NOHANG`] is given, in
    /// which case `Ok(None)` is returned when no status is ready yet.
    /// Collecting a status does not free the record: only a detach (or an
    /// exit after one) does, so joining an exited target again is legal.
    ///
    /// Fails with `EINVAL` for a sentinel or already-detached target,
    /// `ESRCH` for an unknown one (including a record reclaimed while the
    /// caller was blocked), and `EDEADLK` when `current` joins itself.
    pub fn join(&self, current: Pid, target: Pid, flags: JoinFlags) -> LinuxResult<Option<i32>> {
        if target == INVALID_PID || target == BOOTUP_PID {
            return Err(LinuxError::EINVAL);
        }
        if target == current {
            return Err(LinuxError::EDEADLK);
        }

        let wait = {
            let inner = self.lock();
            let entry = inner.get(target).ok_or(LinuxError::ESRCH)?;
            if entry.ppid == INVALID_PID {
                // Nobody may collect from a detached pid.
                return Err(LinuxError::EINVAL);
            }
            if entry.exited {
                return Ok(Some(entry.exit_status));
            }
            if flags.contains(JoinFlags::NOHANG) {
                return Ok(None);
            }
            entry.wait.clone()
        };

        trace!("pid {current} waiting for pid {target}");

        let mut status = None;
        wait.wait_until(|| {
            let inner = self.lock();
            match inner.get(target) {
                Some(entry) if entry.exited => {
                    status = Some(entry.exit_status);
                    true
                }
                Some(_) => false,
                // Reclaimed while we slept; stop waiting.
                None => true,
            }
        });

        match status {
            Some(status) => Ok(Some(status)),
            None => Err(LinuxError::ESRCH),
        }
    }

    /// Waits for a child's exit status.
    ///
    /// Like [`PidTable::join`], but `current` must presently be the parent of
    /// `target`; fails with `ECHILD` otherwise.
    pub fn wait_child(
        &self,
        current: Pid,
        target: Pid,
        flags: JoinFlags,
    ) -> LinuxResult<Option<i32>> {
        if target == INVALID_PID || target == BOOTUP_PID {
            return Err(LinuxError::EINVAL);
        }

        {
            let inner = self.lock();
            let entry = inner.get(target).ok_or(LinuxError::ESRCH)?;
            if entry.ppid != current {
                return Err(LinuxError::ECHILD);
            }
        }

        self.join(current, target, flags)
    }
}
