use axerrno::LinuxError;
use axpid::{BOOTUP_PID, INVALID_PID, SIGCONT, SIGINT, SIGSTOP, SIGTERM};

mod common;

#[test]
fn probe_has_no_effect() {
    let table = common::new_table();

    let a = table.alloc(BOOTUP_PID).unwrap();
    table.kill(a, 0).unwrap();
    assert_eq!(table.pending_signal(a), None);

    table.kill(a, SIGSTOP).unwrap();
    table.kill(a, 0).unwrap();
    assert_eq!(table.pending_signal(a), Some(SIGSTOP));
}

#[test]
fn continue_clears_stop() {
    let table = common::new_table();

    let a = table.alloc(BOOTUP_PID).unwrap();
    table.kill(a, SIGSTOP).unwrap();
    assert_eq!(table.pending_signal(a), Some(SIGSTOP));

    table.kill(a, SIGCONT).unwrap();
    assert_eq!(table.pending_signal(a), None);

    // A continue with no stop pending is still accepted.
    table.kill(a, SIGCONT).unwrap();
    assert_eq!(table.pending_signal(a), None);
}

#[test]
fn lowest_pending_wins() {
    let table = common::new_table();

    let a = table.alloc(BOOTUP_PID).unwrap();
    table.kill(a, SIGTERM).unwrap();
    assert_eq!(table.pending_signal(a), Some(SIGTERM));

    table.kill(a, SIGINT).unwrap();
    assert_eq!(table.pending_signal(a), Some(SIGINT));
}

#[test]
fn rejects_bad_numbers() {
    let table = common::new_table();

    let a = table.alloc(BOOTUP_PID).unwrap();
    assert_eq!(table.kill(a, 33).err(), Some(LinuxError::EINVAL));
    assert_eq!(table.kill(a, 999).err(), Some(LinuxError::EINVAL));
    // Recognized range but unsupported.
    assert_eq!(table.kill(a, 4).err(), Some(LinuxError::ENOSYS));
    // No side effects on any error path.
    assert_eq!(table.pending_signal(a), None);
}

#[test]
fn rejects_unknown_targets() {
    let table = common::new_table();

    assert_eq!(table.kill(999, SIGTERM).err(), Some(LinuxError::ESRCH));
    assert_eq!(table.kill(999, 0).err(), Some(LinuxError::ESRCH));
    assert_eq!(table.kill(INVALID_PID, 0).err(), Some(LinuxError::ESRCH));
}
