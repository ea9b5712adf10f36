// Typed selectors for the libproc call family. Values mirror <sys/proc_info.h>.
//
// Selectors are open newtypes rather than closed enums: the kernel accepts
// flavors this crate has no constant for, and forwarders pass them through.

use serde::Serialize;

/// Process identifier (`pid_t`).
pub type Pid = libc::pid_t;

/// `type` argument of `proc_listpids` / `proc_listpidspath`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListPidsType(pub u32);

impl ListPidsType {
    pub const ALL_PIDS: Self = Self(1);
    pub const PGRP_ONLY: Self = Self(2);
    pub const TTY_ONLY: Self = Self(3);
    pub const UID_ONLY: Self = Self(4);
    pub const RUID_ONLY: Self = Self(5);
    pub const PPID_ONLY: Self = Self(6);
    pub const KDBG_ONLY: Self = Self(7);
}

/// `flavor` argument of `proc_pidinfo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PidInfoFlavor(pub i32);

impl PidInfoFlavor {
    pub const LIST_FDS: Self = Self(1);
    pub const TASK_ALL_INFO: Self = Self(2);
    pub const TBSD_INFO: Self = Self(3);
    pub const TASK_INFO: Self = Self(4);
    pub const THREAD_INFO: Self = Self(5);
    pub const LIST_THREADS: Self = Self(6);
    pub const REGION_INFO: Self = Self(7);
    pub const REGION_PATH_INFO: Self = Self(8);
    pub const VNODE_PATH_INFO: Self = Self(9);
    pub const THREAD_PATH_INFO: Self = Self(10);
    pub const PATH_INFO: Self = Self(11);
    pub const WORKQUEUE_INFO: Self = Self(12);
    pub const T_SHORT_BSD_INFO: Self = Self(13);
    pub const LIST_FILEPORTS: Self = Self(14);
    pub const THREAD_ID64_INFO: Self = Self(15);
    pub const RUSAGE: Self = Self(16);
}

/// `flavor` argument of `proc_pidfdinfo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PidFdInfoFlavor(pub i32);

impl PidFdInfoFlavor {
    pub const VNODE_INFO: Self = Self(1);
    pub const VNODE_PATH_INFO: Self = Self(2);
    pub const SOCKET_INFO: Self = Self(3);
    pub const PSEM_INFO: Self = Self(4);
    pub const PSHM_INFO: Self = Self(5);
    pub const PIPE_INFO: Self = Self(6);
    pub const KQUEUE_INFO: Self = Self(7);
    pub const ATALK_INFO: Self = Self(8);
}

/// `flavor` argument of `proc_pidfileportinfo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PidFilePortInfoFlavor(pub i32);

impl PidFilePortInfoFlavor {
    pub const VNODE_PATH_INFO: Self = Self(2);
    pub const SOCKET_INFO: Self = Self(3);
    pub const PSHM_INFO: Self = Self(5);
    pub const PIPE_INFO: Self = Self(6);
}

/// Action the kernel takes on the calling process under resource pressure
/// (`proc_setpcontrol`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessControl(pub i32);

impl ProcessControl {
    pub const NONE: Self = Self(0);
    pub const THROTTLE_MEMORY: Self = Self(1);
    pub const SUSPEND: Self = Self(2);
    pub const TERMINATE: Self = Self(3);
}

/// Flags accepted by `proc_track_dirty` and `proc_clear_dirty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DirtyControlFlags(pub u32);

impl DirtyControlFlags {
    pub const TRACK: Self = Self(0x1);
    pub const ALLOW_IDLE_EXIT: Self = Self(0x2);
    pub const DEFER: Self = Self(0x4);
    pub const LAUNCH_IN_PROGRESS: Self = Self(0x8);
    pub const DEFER_ALWAYS: Self = Self(0x10);

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// Decoded result of `proc_get_dirty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DirtyStatus {
    pub raw: u32,
}

impl DirtyStatus {
    const TRACKED: u32 = 0x1;
    const ALLOWS_IDLE_EXIT: u32 = 0x2;
    const IS_DIRTY: u32 = 0x4;
    const LAUNCH_IS_IN_PROGRESS: u32 = 0x8;

    pub fn is_tracked(&self) -> bool {
        self.raw & Self::TRACKED != 0
    }

    pub fn allows_idle_exit(&self) -> bool {
        self.raw & Self::ALLOWS_IDLE_EXIT != 0
    }

    pub fn is_dirty(&self) -> bool {
        self.raw & Self::IS_DIRTY != 0
    }

    pub fn launch_in_progress(&self) -> bool {
        self.raw & Self::LAUNCH_IS_IN_PROGRESS != 0
    }
}
