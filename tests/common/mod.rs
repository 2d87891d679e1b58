use std::sync::{Condvar, Mutex};

use axerrno::LinuxResult;
use axpid::{PidTable, WaitQueue};

/// Host-side wait queue: a condition variable standing in for the
/// scheduler's blocking primitive.
pub struct StdWaitQueue {
    state: Mutex<()>,
    cond: Condvar,
}

impl WaitQueue for StdWaitQueue {
    fn new() -> LinuxResult<Self> {
        Ok(Self {
            state: Mutex::new(()),
            cond: Condvar::new(),
        })
    }

    fn wait_until<F: FnMut() -> bool>(&self, mut cond: F) {
        let mut guard = self.state.lock().unwrap();
        while !cond() {
            guard = self.cond.wait(guard).unwrap();
        }
    }

    fn notify_all(&self) {
        let _guard = self.state.lock().unwrap();
        self.cond.notify_all();
    }
}

pub type Table = PidTable<StdWaitQueue>;

pub fn new_table() -> Table {
    PidTable::new()
}
