use axerrno::LinuxError;
use axpid::{BOOTUP_PID, JoinFlags, MAX_PROCS, PID_MAX, PID_MIN, Pid};

mod common;

#[test]
fn distinct_in_range() {
    let table = common::new_table();

    let mut pids: Vec<Pid> = Vec::new();
    for _ in 0..MAX_PROCS - 1 {
        let pid = table.alloc(BOOTUP_PID).unwrap();
        assert!((PID_MIN..=PID_MAX).contains(&pid));
        assert!(!pids.contains(&pid));
        // One live pid per table slot.
        assert!(
            !pids
                .iter()
                .any(|p| p % MAX_PROCS as Pid == pid % MAX_PROCS as Pid)
        );
        pids.push(pid);
    }
    assert_eq!(table.live_count(), MAX_PROCS);
}

#[test]
fn exhaustion_and_recovery() {
    let table = common::new_table();

    let mut pids = Vec::new();
    for _ in 0..MAX_PROCS - 1 {
        pids.push(table.alloc(BOOTUP_PID).unwrap());
    }
    assert_eq!(table.alloc(BOOTUP_PID).err(), Some(LinuxError::EAGAIN));

    // One full reclamation frees exactly one slot.
    let victim = pids[0];
    table.exit(victim, 0, false);
    assert_eq!(table.alloc(BOOTUP_PID).err(), Some(LinuxError::EAGAIN));
    table.detach(BOOTUP_PID, victim).unwrap();
    assert!(table.alloc(BOOTUP_PID).is_ok());
}

#[test]
fn unalloc_rolls_back() {
    let table = common::new_table();

    let pid = table.alloc(BOOTUP_PID).unwrap();
    assert_eq!(table.live_count(), 2);

    table.unalloc(BOOTUP_PID, pid);
    assert_eq!(table.live_count(), 1);
    assert_eq!(
        table.join(BOOTUP_PID, pid, JoinFlags::NOHANG).err(),
        Some(LinuxError::ESRCH)
    );
}

#[test]
#[should_panic(expected = "unalloc of an exited pid")]
fn unalloc_after_exit_panics() {
    let table = common::new_table();

    let pid = table.alloc(BOOTUP_PID).unwrap();
    table.exit(pid, 0, false);
    table.unalloc(BOOTUP_PID, pid);
}

#[test]
#[should_panic(expected = "unalloc by a non-parent")]
fn unalloc_by_non_parent_panics() {
    let table = common::new_table();

    let a = table.alloc(BOOTUP_PID).unwrap();
    let b = table.alloc(BOOTUP_PID).unwrap();
    table.unalloc(a, b);
}
