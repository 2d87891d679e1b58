use alloc::{boxed::Box, vec::Vec};
use core::{array, fmt};

use axerrno::{LinuxError, LinuxResult};
use kspin::{SpinNoIrq, SpinNoIrqGuard};
use log::debug;

use crate::{
    BOOTUP_PID, INVALID_PID, MAX_PROCS, PID_MAX, PID_MIN, Pid,
    entry::{PidEntry, STATUS_ROLLBACK},
    wait::WaitQueue,
};

/// Slot-per-pid storage behind the table lock.
///
/// The table is an el-cheapo hash table: indexed by `pid % MAX_PROCS` and
/// holding one record per slot. A candidate pid whose slot is taken is simply
/// skipped by the allocator, never chained.
pub(crate) struct TableInner<W> {
    slots: [Option<Box<PidEntry<W>>>; MAX_PROCS],
    nextpid: Pid,
    nprocs: usize,
}

impl<W: WaitQueue> TableInner<W> {
    fn slot(pid: Pid) -> usize {
        pid as usize % MAX_PROCS
    }

    /// Looks up the record for `pid`.
    ///
    /// Returns `None` if the slot is empty or holds a different pid, which
    /// guards against stale ids whose slot has since been reused.
    pub(crate) fn get(&self, pid: Pid) -> Option<&PidEntry<W>> {
        assert_ne!(pid, INVALID_PID);
        self.slots[Self::slot(pid)]
            .as_deref()
            .filter(|entry| entry.pid == pid)
    }

    pub(crate) fn get_mut(&mut self, pid: Pid) -> Option<&mut PidEntry<W>> {
        assert_ne!(pid, INVALID_PID);
        self.slots[Self::slot(pid)]
            .as_deref_mut()
            .filter(|entry| entry.pid == pid)
    }

    fn slot_occupied(&self, pid: Pid) -> bool {
        self.slots[Self::slot(pid)].is_some()
    }

    /// Inserts a new record; the slot must be empty.
    fn put(&mut self, entry: Box<PidEntry<W>>) {
        assert_ne!(entry.pid, INVALID_PID);
        let slot = &mut self.slots[Self::slot(entry.pid)];
        assert!(slot.is_none(), "pid table slot already occupied");
        *slot = Some(entry);
        self.nprocs += 1;
    }

    /// Removes and frees a record that has already exited and been disowned.
    pub(crate) fn drop_entry(&mut self, pid: Pid) {
        let slot = &mut self.slots[Self::slot(pid)];
        let entry = slot
            .as_deref()
            .unwrap_or_else(|| panic!("dropping pid {pid} which is not in the table"));
        assert_eq!(entry.pid, pid);
        assert!(
            entry.reclaimable(),
            "dropping pid {pid} before it exited and was detached"
        );
        *slot = None;
        self.nprocs -= 1;
    }

    /// Pids of every record whose parent is `pid`.
    pub(crate) fn children_of(&self, pid: Pid) -> Vec<Pid> {
        self.slots
            .iter()
            .flatten()
            .filter(|entry| entry.ppid == pid)
            .map(|entry| entry.pid)
            .collect()
    }

    fn inc_nextpid(&mut self) {
        self.nextpid += 1;
        if self.nextpid > PID_MAX {
            self.nextpid = PID_MIN;
        }
    }
}

/// The pid table service.
///
/// Owns every lifecycle record, keyed by pid, behind a single lock. One
/// instance is constructed at kernel init and passed by reference to every
/// entry point; the caller identifies its own execution context by passing
/// its pid as the `current` argument.
pub struct PidTable<W> {
    inner: SpinNoIrq<TableInner<W>>,
}

impl<W: WaitQueue> PidTable<W> {
    /// Creates the table with the [`BOOTUP_PID`] record already seeded.
    ///
    /// # Panics
    ///
    /// Panics if storage for the bootup record cannot be obtained.
    pub fn new() -> Self {
        let mut inner = TableInner {
            slots: array::from_fn(|_| None),
            nextpid: PID_MIN,
            nprocs: 0,
        };
        let boot = PidEntry::new(BOOTUP_PID, INVALID_PID)
            .unwrap_or_else(|_| panic!("out of memory creating bootup pid record"));
        inner.put(Box::new(boot));
        Self {
            inner: SpinNoIrq::new(inner),
        }
    }

    pub(crate) fn lock(&self) -> SpinNoIrqGuard<'_, TableInner<W>> {
        self.inner.lock()
    }

    /// Number of currently allocated pids.
    pub fn live_count(&self) -> usize {
        self.lock().nprocs
    }

    /// Allocates a fresh pid with `parent` recorded as its parent.
    ///
    /// Fails with `EAGAIN` when [`MAX_PROCS`] pids are already live, and with
    /// `ENOMEM` if record storage cannot be obtained; in both cases the table
    /// is left unchanged.
    pub fn alloc(&self, parent: Pid) -> LinuxResult<Pid> {
        assert_ne!(parent, INVALID_PID);

        let mut inner = self.lock();

        if inner.nprocs == MAX_PROCS {
            return Err(LinuxError::EAGAIN);
        }

        // The count check above guarantees this scan terminates unless
        // `nprocs` has drifted from the slots. The extra probes cover the
        // wrap-around boundary cases.
        let mut count = 0;
        while inner.slot_occupied(inner.nextpid) {
            assert!(count < 2 * MAX_PROCS + 5, "pid table live count out of sync");
            count += 1;
            inner.inc_nextpid();
        }

        let pid = inner.nextpid;
        let entry = Box::new(PidEntry::new(pid, parent)?);
        inner.put(entry);
        inner.inc_nextpid();

        debug!("allocated pid {pid} (parent {parent})");
        Ok(pid)
    }

    /// Rolls back an allocation for a child that never started running, e.g.
    /// after a failed program load. The record is freed immediately.
    ///
    /// This is not an exit path: the caller must be the record's parent and
    /// the record must not have exited.
    ///
    /// # Panics
    ///
    /// Panics if `pid` is out of range or unknown, if the record has already
    /// exited, or if `current` is not its parent.
    pub fn unalloc(&self, current: Pid, pid: Pid) {
        assert!((PID_MIN..=PID_MAX).contains(&pid));

        let mut inner = self.lock();
        let entry = inner
            .get_mut(pid)
            .unwrap_or_else(|| panic!("unalloc of unknown pid {pid}"));
        assert!(!entry.exited, "unalloc of an exited pid");
        assert_eq!(entry.ppid, current, "unalloc by a non-parent");

        // Satisfy the reclamation invariant before dropping the record.
        entry.exit_status = STATUS_ROLLBACK;
        entry.exited = true;
        entry.ppid = INVALID_PID;

        inner.drop_entry(pid);
    }
}

impl<W: WaitQueue> fmt::Debug for PidTable<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("PidTable")
            .field("nprocs", &inner.nprocs)
            .field("nextpid", &inner.nextpid)
            .finish()
    }
}
