#![no_std]

extern crate alloc;

mod entry;
mod lifecycle;
mod signal;
mod table;
mod wait;

/// Process id.
pub type Pid = u32;

/// Never assigned to a process; stands for "no parent" and "no target".
pub const INVALID_PID: Pid = 0;
/// The statically-created first process; never reclaimed in steady state.
pub const BOOTUP_PID: Pid = 1;
/// Smallest id handed out by the allocator.
pub const PID_MIN: Pid = 2;
/// Largest id handed out by the allocator; the cursor wraps back to
/// [`PID_MIN`] past it.
pub const PID_MAX: Pid = 32767;
/// Capacity of the pid table; at most this many ids are live at once.
pub const MAX_PROCS: usize = 128;

pub use lifecycle::JoinFlags;
pub use signal::{
    PendingSignals, SIG_MAX, SIGCONT, SIGHUP, SIGINFO, SIGINT, SIGKILL, SIGQUIT, SIGSTOP, SIGTERM,
    SIGWINCH,
};
pub use table::PidTable;
pub use wait::WaitQueue;
