use std::ffi::CStr;
use std::io;
use std::mem;

use libc::{c_char, c_int, c_void, pid_t};

use super::Native;
use crate::rusage::rusage_info_v4;
use crate::types::Pid;

unsafe extern "C" {
    fn proc_listpids(type_: u32, typeinfo: u32, buffer: *mut c_void, buffersize: c_int) -> c_int;

    fn proc_listpidspath(
        type_: u32,
        typeinfo: u32,
        path: *const c_char,
        pathflags: u32,
        buffer: *mut c_void,
        buffersize: c_int,
    ) -> c_int;

    fn proc_listallpids(buffer: *mut c_void, buffersize: c_int) -> c_int;

    fn proc_listpgrppids(pgrpid: pid_t, buffer: *mut c_void, buffersize: c_int) -> c_int;

    fn proc_listchildpids(ppid: pid_t, buffer: *mut c_void, buffersize: c_int) -> c_int;

    fn proc_pidinfo(
        pid: c_int,
        flavor: c_int,
        arg: u64,
        buffer: *mut c_void,
        buffersize: c_int,
    ) -> c_int;

    fn proc_pidfdinfo(
        pid: c_int,
        fd: c_int,
        flavor: c_int,
        buffer: *mut c_void,
        buffersize: c_int,
    ) -> c_int;

    fn proc_pidfileportinfo(
        pid: c_int,
        fileport: u32,
        flavor: c_int,
        buffer: *mut c_void,
        buffersize: c_int,
    ) -> c_int;

    fn proc_name(pid: c_int, buffer: *mut c_void, buffersize: u32) -> c_int;

    fn proc_regionfilename(pid: c_int, address: u64, buffer: *mut c_void, buffersize: u32)
    -> c_int;

    fn proc_kmsgbuf(buffer: *mut c_void, buffersize: u32) -> c_int;

    fn proc_pidpath(pid: c_int, buffer: *mut c_void, buffersize: u32) -> c_int;

    fn proc_libversion(major: *mut c_int, minor: *mut c_int) -> c_int;

    fn proc_pid_rusage(pid: c_int, flavor: c_int, buffer: *mut c_void) -> c_int;

    fn proc_setpcontrol(control: c_int) -> c_int;

    fn proc_track_dirty(pid: pid_t, flags: u32) -> c_int;

    fn proc_set_dirty(pid: pid_t, dirty: bool) -> c_int;

    fn proc_get_dirty(pid: pid_t, flags: *mut u32) -> c_int;

    fn proc_clear_dirty(pid: pid_t, flags: u32) -> c_int;
}

/// The system libproc.
#[derive(Debug, Clone, Copy, Default)]
pub struct Libproc;

// Capacities larger than the native argument type can express are clamped;
// the kernel then simply sees a smaller buffer.
fn capacity_int<T>(buffer: &[T]) -> c_int {
    c_int::try_from(mem::size_of_val(buffer)).unwrap_or(c_int::MAX)
}

fn capacity_u32<T>(buffer: &[T]) -> u32 {
    u32::try_from(mem::size_of_val(buffer)).unwrap_or(u32::MAX)
}

fn clear_errno() {
    unsafe { *libc::__error() = 0 };
}

/// Calls returning a count or byte length. Failure shows up as 0 (or -1)
/// with errno set; 0 with errno untouched is a genuinely empty result.
/// The caller must clear errno before the call.
fn check_len(ret: c_int) -> io::Result<usize> {
    if ret > 0 {
        return Ok(ret as usize);
    }
    let err = io::Error::last_os_error();
    match err.raw_os_error() {
        Some(0) | None if ret == 0 => Ok(0),
        Some(0) | None => Err(io::Error::other(format!(
            "native call returned {ret} without setting errno"
        ))),
        Some(_) => Err(err),
    }
}

/// Calls returning 0, or -1 with errno set.
fn check_zero(ret: c_int) -> io::Result<()> {
    if ret == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

/// Calls returning 0, or the error number itself.
fn check_status(ret: c_int) -> io::Result<()> {
    if ret == 0 {
        Ok(())
    } else {
        Err(io::Error::from_raw_os_error(ret))
    }
}

impl Native for Libproc {
    fn current_pid(&self) -> Pid {
        unsafe { libc::getpid() }
    }

    fn pid_rusage(&self, pid: Pid, flavor: i32, info: &mut rusage_info_v4) -> io::Result<()> {
        let ret = unsafe { proc_pid_rusage(pid, flavor, info as *mut _ as *mut c_void) };
        check_zero(ret)
    }

    fn list_pids(&self, kind: u32, type_info: u32, buffer: &mut [Pid]) -> io::Result<usize> {
        clear_errno();
        let ret = unsafe {
            proc_listpids(
                kind,
                type_info,
                buffer.as_mut_ptr() as *mut c_void,
                capacity_int(buffer),
            )
        };
        check_len(ret)
    }

    fn list_pids_path(
        &self,
        kind: u32,
        type_info: u32,
        path: &CStr,
        path_flags: u32,
        buffer: &mut [Pid],
    ) -> io::Result<usize> {
        clear_errno();
        let ret = unsafe {
            proc_listpidspath(
                kind,
                type_info,
                path.as_ptr(),
                path_flags,
                buffer.as_mut_ptr() as *mut c_void,
                capacity_int(buffer),
            )
        };
        check_len(ret)
    }

    fn list_all_pids(&self, buffer: &mut [Pid]) -> io::Result<usize> {
        clear_errno();
        let ret =
            unsafe { proc_listallpids(buffer.as_mut_ptr() as *mut c_void, capacity_int(buffer)) };
        check_len(ret)
    }

    fn list_pgrp_pids(&self, pgrpid: Pid, buffer: &mut [Pid]) -> io::Result<usize> {
        clear_errno();
        let ret = unsafe {
            proc_listpgrppids(
                pgrpid,
                buffer.as_mut_ptr() as *mut c_void,
                capacity_int(buffer),
            )
        };
        check_len(ret)
    }

    fn list_child_pids(&self, ppid: Pid, buffer: &mut [Pid]) -> io::Result<usize> {
        clear_errno();
        let ret = unsafe {
            proc_listchildpids(ppid, buffer.as_mut_ptr() as *mut c_void, capacity_int(buffer))
        };
        check_len(ret)
    }

    fn pid_info(&self, pid: Pid, flavor: i32, arg: u64, buffer: &mut [u8]) -> io::Result<usize> {
        clear_errno();
        let ret = unsafe {
            proc_pidinfo(
                pid,
                flavor,
                arg,
                buffer.as_mut_ptr() as *mut c_void,
                capacity_int(buffer),
            )
        };
        check_len(ret)
    }

    fn pid_fd_info(&self, pid: Pid, fd: i32, flavor: i32, buffer: &mut [u8]) -> io::Result<usize> {
        clear_errno();
        let ret = unsafe {
            proc_pidfdinfo(
                pid,
                fd,
                flavor,
                buffer.as_mut_ptr() as *mut c_void,
                capacity_int(buffer),
            )
        };
        check_len(ret)
    }

    fn pid_fileport_info(
        &self,
        pid: Pid,
        fileport: u32,
        flavor: i32,
        buffer: &mut [u8],
    ) -> io::Result<usize> {
        clear_errno();
        let ret = unsafe {
            proc_pidfileportinfo(
                pid,
                fileport,
                flavor,
                buffer.as_mut_ptr() as *mut c_void,
                capacity_int(buffer),
            )
        };
        check_len(ret)
    }

    fn name(&self, pid: Pid, buffer: &mut [u8]) -> io::Result<usize> {
        clear_errno();
        let ret =
            unsafe { proc_name(pid, buffer.as_mut_ptr() as *mut c_void, capacity_u32(buffer)) };
        check_len(ret)
    }

    fn region_filename(&self, pid: Pid, address: u64, buffer: &mut [u8]) -> io::Result<usize> {
        clear_errno();
        let ret = unsafe {
            proc_regionfilename(
                pid,
                address,
                buffer.as_mut_ptr() as *mut c_void,
                capacity_u32(buffer),
            )
        };
        check_len(ret)
    }

    fn kmsgbuf(&self, buffer: &mut [u8]) -> io::Result<usize> {
        clear_errno();
        let ret = unsafe { proc_kmsgbuf(buffer.as_mut_ptr() as *mut c_void, capacity_u32(buffer)) };
        check_len(ret)
    }

    fn pid_path(&self, pid: Pid, buffer: &mut [u8]) -> io::Result<usize> {
        clear_errno();
        let ret =
            unsafe { proc_pidpath(pid, buffer.as_mut_ptr() as *mut c_void, capacity_u32(buffer)) };
        check_len(ret)
    }

    fn lib_version(&self) -> io::Result<(i32, i32)> {
        let mut major: c_int = 0;
        let mut minor: c_int = 0;
        let ret = unsafe { proc_libversion(&mut major, &mut minor) };
        check_zero(ret)?;
        Ok((major, minor))
    }

    fn set_pcontrol(&self, control: i32) -> io::Result<()> {
        check_status(unsafe { proc_setpcontrol(control) })
    }

    fn track_dirty(&self, pid: Pid, flags: u32) -> io::Result<()> {
        check_status(unsafe { proc_track_dirty(pid, flags) })
    }

    fn set_dirty(&self, pid: Pid, dirty: bool) -> io::Result<()> {
        check_status(unsafe { proc_set_dirty(pid, dirty) })
    }

    fn get_dirty(&self, pid: Pid) -> io::Result<u32> {
        let mut flags: u32 = 0;
        check_status(unsafe { proc_get_dirty(pid, &mut flags) })?;
        Ok(flags)
    }

    fn clear_dirty(&self, pid: Pid, flags: u32) -> io::Result<()> {
        check_status(unsafe { proc_clear_dirty(pid, flags) })
    }
}
