// Seam over the native process-information facility.
//
// On macOS: `Libproc` calls straight into libproc (part of libSystem).
// Elsewhere there is no native implementation; the trait still exists so the
// discovery and marshaling logic can be driven by any implementor.
//
// Every method maps to exactly one native call. Implementations normalise the
// call's return convention (byte count, errno, or status code) into
// `io::Result`, so callers never see a raw `-1`.

use std::ffi::CStr;
use std::io;

use crate::rusage::rusage_info_v4;
use crate::types::Pid;

#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "macos")]
pub use macos::Libproc;

fn unsupported() -> io::Error {
    io::Error::from(io::ErrorKind::Unsupported)
}

/// One method per libproc entry point.
///
/// Buffer arguments are slices; their length (in bytes) is the capacity
/// handed to the native call. Counts are returned exactly as the native call
/// reports them. Every method except `pid_rusage` and `current_pid` has a
/// default body that fails with `ErrorKind::Unsupported`, which lets partial
/// implementations cover only the calls they care about.
pub trait Native {
    /// Identity used for capability probes.
    fn current_pid(&self) -> Pid {
        std::process::id() as Pid
    }

    /// `proc_pid_rusage`. `flavor` selects how much of `info` the native
    /// layer fills; the rest is left untouched.
    fn pid_rusage(&self, pid: Pid, flavor: i32, info: &mut rusage_info_v4) -> io::Result<()>;

    /// `proc_listpids`; returns bytes written.
    fn list_pids(&self, kind: u32, type_info: u32, buffer: &mut [Pid]) -> io::Result<usize> {
        let _ = (kind, type_info, buffer);
        Err(unsupported())
    }

    /// `proc_listpidspath`; returns bytes written.
    fn list_pids_path(
        &self,
        kind: u32,
        type_info: u32,
        path: &CStr,
        path_flags: u32,
        buffer: &mut [Pid],
    ) -> io::Result<usize> {
        let _ = (kind, type_info, path, path_flags, buffer);
        Err(unsupported())
    }

    /// `proc_listallpids`; returns the number of pids.
    fn list_all_pids(&self, buffer: &mut [Pid]) -> io::Result<usize> {
        let _ = buffer;
        Err(unsupported())
    }

    /// `proc_listpgrppids`; returns the number of pids.
    fn list_pgrp_pids(&self, pgrpid: Pid, buffer: &mut [Pid]) -> io::Result<usize> {
        let _ = (pgrpid, buffer);
        Err(unsupported())
    }

    /// `proc_listchildpids`; returns the number of pids.
    fn list_child_pids(&self, ppid: Pid, buffer: &mut [Pid]) -> io::Result<usize> {
        let _ = (ppid, buffer);
        Err(unsupported())
    }

    fn pid_info(&self, pid: Pid, flavor: i32, arg: u64, buffer: &mut [u8]) -> io::Result<usize> {
        let _ = (pid, flavor, arg, buffer);
        Err(unsupported())
    }

    fn pid_fd_info(&self, pid: Pid, fd: i32, flavor: i32, buffer: &mut [u8]) -> io::Result<usize> {
        let _ = (pid, fd, flavor, buffer);
        Err(unsupported())
    }

    fn pid_fileport_info(
        &self,
        pid: Pid,
        fileport: u32,
        flavor: i32,
        buffer: &mut [u8],
    ) -> io::Result<usize> {
        let _ = (pid, fileport, flavor, buffer);
        Err(unsupported())
    }

    fn name(&self, pid: Pid, buffer: &mut [u8]) -> io::Result<usize> {
        let _ = (pid, buffer);
        Err(unsupported())
    }

    fn region_filename(&self, pid: Pid, address: u64, buffer: &mut [u8]) -> io::Result<usize> {
        let _ = (pid, address, buffer);
        Err(unsupported())
    }

    fn kmsgbuf(&self, buffer: &mut [u8]) -> io::Result<usize> {
        let _ = buffer;
        Err(unsupported())
    }

    fn pid_path(&self, pid: Pid, buffer: &mut [u8]) -> io::Result<usize> {
        let _ = (pid, buffer);
        Err(unsupported())
    }

    /// `proc_libversion`; returns `(major, minor)`.
    fn lib_version(&self) -> io::Result<(i32, i32)> {
        Err(unsupported())
    }

    fn set_pcontrol(&self, control: i32) -> io::Result<()> {
        let _ = control;
        Err(unsupported())
    }

    fn track_dirty(&self, pid: Pid, flags: u32) -> io::Result<()> {
        let _ = (pid, flags);
        Err(unsupported())
    }

    fn set_dirty(&self, pid: Pid, dirty: bool) -> io::Result<()> {
        let _ = (pid, dirty);
        Err(unsupported())
    }

    /// `proc_get_dirty`; returns the raw dirty-state flags.
    fn get_dirty(&self, pid: Pid) -> io::Result<u32> {
        let _ = pid;
        Err(unsupported())
    }

    fn clear_dirty(&self, pid: Pid, flags: u32) -> io::Result<()> {
        let _ = (pid, flags);
        Err(unsupported())
    }
}
