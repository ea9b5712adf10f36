use std::ffi::CString;

use crate::error::ProcError;
use crate::native::Native;
use crate::rusage::{RUsageCapability, RUsageFlavor, RUsageSnapshot, rusage_info_v4};
use crate::types::{
    DirtyControlFlags, DirtyStatus, ListPidsType, Pid, PidFdInfoFlavor, PidFilePortInfoFlavor,
    PidInfoFlavor, ProcessControl,
};

/// Entry point for every libproc operation.
///
/// Forwarders make exactly one native call, keep no state and leave buffer
/// sizing to the caller. The only state is the rusage capability, resolved
/// on the first `pid_rusage` / `rusage_flavor` call.
#[derive(Debug, Default)]
pub struct ProcInfo<N> {
    native: N,
    rusage: RUsageCapability,
}

impl<N> ProcInfo<N> {
    pub const fn new(native: N) -> Self {
        Self {
            native,
            rusage: RUsageCapability::new(),
        }
    }

    /// Use a pre-resolved (or shared-by-construction) capability.
    pub fn with_capability(native: N, rusage: RUsageCapability) -> Self {
        Self { native, rusage }
    }

    pub fn native(&self) -> &N {
        &self.native
    }

    pub fn capability(&self) -> &RUsageCapability {
        &self.rusage
    }
}

impl<N: Native> ProcInfo<N> {
    /// Newest supported rusage flavor, discovering it on first use.
    pub fn rusage_flavor(&self) -> Option<RUsageFlavor> {
        self.rusage.get_or_discover(&self.native)
    }

    /// `rusage_flavor` as a raw integer; `-1` when unsupported.
    pub fn raw_highest_rusage_flavor(&self) -> i32 {
        self.rusage_flavor()
            .map_or(RUsageFlavor::UNSUPPORTED_RAW, RUsageFlavor::as_raw)
    }

    /// Resource usage of `pid` at the highest supported flavor.
    pub fn pid_rusage(&self, pid: Pid) -> Result<RUsageSnapshot, ProcError> {
        let flavor = self
            .rusage_flavor()
            .ok_or(ProcError::UnsupportedCapability)?;

        let mut raw = rusage_info_v4::default();
        self.native
            .pid_rusage(pid, flavor.as_raw(), &mut raw)
            .map_err(|e| ProcError::native("proc_pid_rusage", e))?;

        Ok(RUsageSnapshot::from_raw(flavor, &raw))
    }

    /// Returns bytes written into `buffer`.
    pub fn list_pids(
        &self,
        kind: ListPidsType,
        type_info: u32,
        buffer: &mut [Pid],
    ) -> Result<usize, ProcError> {
        self.native
            .list_pids(kind.0, type_info, buffer)
            .map_err(|e| ProcError::native("proc_listpids", e))
    }

    /// Pids of processes that have `path` open. Returns bytes written.
    pub fn list_pids_path(
        &self,
        kind: ListPidsType,
        type_info: u32,
        path: &str,
        path_flags: u32,
        buffer: &mut [Pid],
    ) -> Result<usize, ProcError> {
        let c_path = CString::new(path).map_err(|_| ProcError::InvalidPath(path.to_string()))?;
        self.native
            .list_pids_path(kind.0, type_info, &c_path, path_flags, buffer)
            .map_err(|e| ProcError::native("proc_listpidspath", e))
    }

    /// Returns the number of pids written.
    pub fn list_all_pids(&self, buffer: &mut [Pid]) -> Result<usize, ProcError> {
        self.native
            .list_all_pids(buffer)
            .map_err(|e| ProcError::native("proc_listallpids", e))
    }

    pub fn list_pgrp_pids(&self, pgrpid: Pid, buffer: &mut [Pid]) -> Result<usize, ProcError> {
        self.native
            .list_pgrp_pids(pgrpid, buffer)
            .map_err(|e| ProcError::native("proc_listpgrppids", e))
    }

    pub fn list_child_pids(&self, ppid: Pid, buffer: &mut [Pid]) -> Result<usize, ProcError> {
        self.native
            .list_child_pids(ppid, buffer)
            .map_err(|e| ProcError::native("proc_listchildpids", e))
    }

    pub fn pid_info(
        &self,
        pid: Pid,
        flavor: PidInfoFlavor,
        arg: u64,
        buffer: &mut [u8],
    ) -> Result<usize, ProcError> {
        self.native
            .pid_info(pid, flavor.0, arg, buffer)
            .map_err(|e| ProcError::native("proc_pidinfo", e))
    }

    pub fn pid_fd_info(
        &self,
        pid: Pid,
        fd: i32,
        flavor: PidFdInfoFlavor,
        buffer: &mut [u8],
    ) -> Result<usize, ProcError> {
        self.native
            .pid_fd_info(pid, fd, flavor.0, buffer)
            .map_err(|e| ProcError::native("proc_pidfdinfo", e))
    }

    pub fn pid_fileport_info(
        &self,
        pid: Pid,
        fileport: u32,
        flavor: PidFilePortInfoFlavor,
        buffer: &mut [u8],
    ) -> Result<usize, ProcError> {
        self.native
            .pid_fileport_info(pid, fileport, flavor.0, buffer)
            .map_err(|e| ProcError::native("proc_pidfileportinfo", e))
    }

    pub fn name(&self, pid: Pid, buffer: &mut [u8]) -> Result<usize, ProcError> {
        self.native
            .name(pid, buffer)
            .map_err(|e| ProcError::native("proc_name", e))
    }

    pub fn region_filename(
        &self,
        pid: Pid,
        address: u64,
        buffer: &mut [u8],
    ) -> Result<usize, ProcError> {
        self.native
            .region_filename(pid, address, buffer)
            .map_err(|e| ProcError::native("proc_regionfilename", e))
    }

    pub fn kmsgbuf(&self, buffer: &mut [u8]) -> Result<usize, ProcError> {
        self.native
            .kmsgbuf(buffer)
            .map_err(|e| ProcError::native("proc_kmsgbuf", e))
    }

    pub fn pid_path(&self, pid: Pid, buffer: &mut [u8]) -> Result<usize, ProcError> {
        self.native
            .pid_path(pid, buffer)
            .map_err(|e| ProcError::native("proc_pidpath", e))
    }

    /// `(major, minor)` version of libproc.
    pub fn lib_version(&self) -> Result<(i32, i32), ProcError> {
        self.native
            .lib_version()
            .map_err(|e| ProcError::native("proc_libversion", e))
    }

    /// Applies to the calling process only.
    pub fn set_pcontrol(&self, control: ProcessControl) -> Result<(), ProcError> {
        self.native
            .set_pcontrol(control.0)
            .map_err(|e| ProcError::native("proc_setpcontrol", e))
    }

    pub fn track_dirty(&self, pid: Pid, flags: DirtyControlFlags) -> Result<(), ProcError> {
        self.native
            .track_dirty(pid, flags.0)
            .map_err(|e| ProcError::native("proc_track_dirty", e))
    }

    pub fn set_dirty(&self, pid: Pid, dirty: bool) -> Result<(), ProcError> {
        self.native
            .set_dirty(pid, dirty)
            .map_err(|e| ProcError::native("proc_set_dirty", e))
    }

    pub fn get_dirty(&self, pid: Pid) -> Result<DirtyStatus, ProcError> {
        self.native
            .get_dirty(pid)
            .map(|raw| DirtyStatus { raw })
            .map_err(|e| ProcError::native("proc_get_dirty", e))
    }

    pub fn clear_dirty(&self, pid: Pid, flags: DirtyControlFlags) -> Result<(), ProcError> {
        self.native
            .clear_dirty(pid, flags.0)
            .map_err(|e| ProcError::native("proc_clear_dirty", e))
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::CStr;
    use std::io;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Records what each forwarder handed to the native layer.
    #[derive(Default)]
    struct Recorder {
        rusage_calls: AtomicUsize,
        last_call: Mutex<Option<String>>,
        fail_errno: Option<i32>,
    }

    impl Recorder {
        fn record(&self, call: String) {
            *self.last_call.lock().unwrap() = Some(call);
        }

        fn last(&self) -> String {
            self.last_call.lock().unwrap().clone().unwrap_or_default()
        }

        fn result(&self) -> io::Result<()> {
            match self.fail_errno {
                Some(errno) => Err(io::Error::from_raw_os_error(errno)),
                None => Ok(()),
            }
        }
    }

    impl Native for Recorder {
        fn pid_rusage(&self, _pid: Pid, _flavor: i32, _info: &mut rusage_info_v4) -> io::Result<()> {
            self.rusage_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn list_pids_path(
            &self,
            kind: u32,
            type_info: u32,
            path: &CStr,
            path_flags: u32,
            buffer: &mut [Pid],
        ) -> io::Result<usize> {
            self.record(format!(
                "listpidspath {kind} {type_info} {} {path_flags} {}",
                path.to_string_lossy(),
                buffer.len()
            ));
            Ok(0)
        }

        fn pid_fileport_info(
            &self,
            pid: Pid,
            fileport: u32,
            flavor: i32,
            buffer: &mut [u8],
        ) -> io::Result<usize> {
            self.record(format!("fileport {pid} {fileport} {flavor}"));
            Ok(buffer.len())
        }

        fn track_dirty(&self, pid: Pid, flags: u32) -> io::Result<()> {
            self.record(format!("track_dirty {pid} {flags}"));
            self.result()
        }

        fn list_pgrp_pids(&self, pgrpid: Pid, buffer: &mut [Pid]) -> io::Result<usize> {
            self.record(format!("listpgrppids {pgrpid} {}", buffer.len()));
            self.result().map(|()| buffer.len())
        }

        fn list_child_pids(&self, ppid: Pid, buffer: &mut [Pid]) -> io::Result<usize> {
            self.record(format!("listchildpids {ppid} {}", buffer.len()));
            self.result().map(|()| buffer.len())
        }

        fn name(&self, pid: Pid, buffer: &mut [u8]) -> io::Result<usize> {
            self.record(format!("name {pid} {}", buffer.len()));
            self.result().map(|()| buffer.len())
        }

        fn region_filename(&self, pid: Pid, address: u64, buffer: &mut [u8]) -> io::Result<usize> {
            self.record(format!("regionfilename {pid} {address:#x} {}", buffer.len()));
            self.result().map(|()| buffer.len())
        }

        fn kmsgbuf(&self, buffer: &mut [u8]) -> io::Result<usize> {
            self.record(format!("kmsgbuf {}", buffer.len()));
            self.result().map(|()| buffer.len())
        }

        fn set_pcontrol(&self, control: i32) -> io::Result<()> {
            self.record(format!("setpcontrol {control}"));
            self.result()
        }

        fn set_dirty(&self, pid: Pid, dirty: bool) -> io::Result<()> {
            self.record(format!("set_dirty {pid} {dirty}"));
            self.result()
        }

        fn clear_dirty(&self, pid: Pid, flags: u32) -> io::Result<()> {
            self.record(format!("clear_dirty {pid} {flags}"));
            self.result()
        }

        fn get_dirty(&self, _pid: Pid) -> io::Result<u32> {
            self.result().map(|()| 0x4 | 0x1)
        }
    }

    fn failing(errno: i32) -> ProcInfo<Recorder> {
        ProcInfo::new(Recorder {
            fail_errno: Some(errno),
            ..Default::default()
        })
    }

    fn assert_failed_call(err: ProcError, expected_call: &str, errno: i32) {
        assert_eq!(err.errno(), Some(errno));
        assert!(err.to_string().contains(expected_call), "{err}");
        match err {
            ProcError::Native { call, .. } => assert_eq!(call, expected_call),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn list_pgrp_pids_forwards_group_and_capacity() {
        let info = ProcInfo::new(Recorder::default());
        let mut buf = [0 as Pid; 6];
        assert_eq!(info.list_pgrp_pids(120, &mut buf).unwrap(), 6);
        assert_eq!(info.native().last(), "listpgrppids 120 6");

        let err = failing(libc::ESRCH).list_pgrp_pids(120, &mut buf).unwrap_err();
        assert_failed_call(err, "proc_listpgrppids", libc::ESRCH);
    }

    #[test]
    fn list_child_pids_forwards_parent_and_capacity() {
        let info = ProcInfo::new(Recorder::default());
        let mut buf = [0 as Pid; 3];
        assert_eq!(info.list_child_pids(1, &mut buf).unwrap(), 3);
        assert_eq!(info.native().last(), "listchildpids 1 3");

        let err = failing(libc::EPERM).list_child_pids(1, &mut buf).unwrap_err();
        assert_failed_call(err, "proc_listchildpids", libc::EPERM);
    }

    #[test]
    fn name_forwards_pid_and_buffer() {
        let info = ProcInfo::new(Recorder::default());
        let mut buf = [0u8; 32];
        assert_eq!(info.name(88, &mut buf).unwrap(), 32);
        assert_eq!(info.native().last(), "name 88 32");

        let err = failing(libc::ESRCH).name(88, &mut buf).unwrap_err();
        assert_failed_call(err, "proc_name", libc::ESRCH);
    }

    #[test]
    fn region_filename_forwards_address() {
        let info = ProcInfo::new(Recorder::default());
        let mut buf = [0u8; 64];
        assert_eq!(info.region_filename(9, 0x1000_4000, &mut buf).unwrap(), 64);
        assert_eq!(info.native().last(), "regionfilename 9 0x10004000 64");

        let err = failing(libc::EINVAL)
            .region_filename(9, 0, &mut buf)
            .unwrap_err();
        assert_failed_call(err, "proc_regionfilename", libc::EINVAL);
    }

    #[test]
    fn kmsgbuf_forwards_capacity() {
        let info = ProcInfo::new(Recorder::default());
        let mut buf = [0u8; 128];
        assert_eq!(info.kmsgbuf(&mut buf).unwrap(), 128);
        assert_eq!(info.native().last(), "kmsgbuf 128");

        let err = failing(libc::EPERM).kmsgbuf(&mut buf).unwrap_err();
        assert_failed_call(err, "proc_kmsgbuf", libc::EPERM);
    }

    #[test]
    fn set_pcontrol_forwards_raw_control() {
        let info = ProcInfo::new(Recorder::default());
        info.set_pcontrol(ProcessControl::SUSPEND).unwrap();
        assert_eq!(info.native().last(), "setpcontrol 2");

        let err = failing(libc::EINVAL)
            .set_pcontrol(ProcessControl(42))
            .unwrap_err();
        assert_failed_call(err, "proc_setpcontrol", libc::EINVAL);
    }

    #[test]
    fn set_dirty_forwards_pid_and_state() {
        let info = ProcInfo::new(Recorder::default());
        info.set_dirty(31, true).unwrap();
        assert_eq!(info.native().last(), "set_dirty 31 true");

        let err = failing(libc::EPERM).set_dirty(31, false).unwrap_err();
        assert_failed_call(err, "proc_set_dirty", libc::EPERM);
    }

    #[test]
    fn clear_dirty_forwards_flags() {
        let info = ProcInfo::new(Recorder::default());
        let flags = DirtyControlFlags::DEFER.union(DirtyControlFlags::ALLOW_IDLE_EXIT);
        info.clear_dirty(31, flags).unwrap();
        assert_eq!(info.native().last(), "clear_dirty 31 6");

        let err = failing(libc::ESRCH)
            .clear_dirty(31, DirtyControlFlags::TRACK)
            .unwrap_err();
        assert_failed_call(err, "proc_clear_dirty", libc::ESRCH);
    }

    #[test]
    fn unsupported_capability_skips_native_call() {
        let info = ProcInfo::with_capability(Recorder::default(), RUsageCapability::resolved(None));
        let err = info.pid_rusage(1).unwrap_err();
        assert!(matches!(err, ProcError::UnsupportedCapability));
        assert_eq!(info.native().rusage_calls.load(Ordering::SeqCst), 0);
        assert_eq!(info.raw_highest_rusage_flavor(), -1);
    }

    #[test]
    fn rusage_flavor_is_discovered_lazily() {
        let info = ProcInfo::new(Recorder::default());
        assert_eq!(info.native().rusage_calls.load(Ordering::SeqCst), 0);
        assert_eq!(info.rusage_flavor(), Some(RUsageFlavor::V4));
        info.pid_rusage(10).unwrap();
        info.pid_rusage(11).unwrap();
        // one probe plus two queries
        assert_eq!(info.native().rusage_calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn fileport_info_passes_pid_and_fileport_separately() {
        let info = ProcInfo::new(Recorder::default());
        let mut buf = [0u8; 24];
        let n = info
            .pid_fileport_info(77, 9, PidFilePortInfoFlavor::SOCKET_INFO, &mut buf)
            .unwrap();
        assert_eq!(n, 24);
        assert_eq!(info.native().last(), "fileport 77 9 3");
    }

    #[test]
    fn list_pids_path_rejects_interior_nul() {
        let info = ProcInfo::new(Recorder::default());
        let mut buf = [0 as Pid; 4];
        let err = info
            .list_pids_path(ListPidsType::ALL_PIDS, 0, "/tmp/a\0b", 0, &mut buf)
            .unwrap_err();
        assert!(matches!(err, ProcError::InvalidPath(_)));
        assert_eq!(info.native().last(), "");

        info.list_pids_path(ListPidsType::UID_ONLY, 501, "/var/log", 1, &mut buf)
            .unwrap();
        assert_eq!(info.native().last(), "listpidspath 4 501 /var/log 1 4");
    }

    #[test]
    fn dirty_control_errors_keep_their_errno() {
        let info = ProcInfo::new(Recorder {
            fail_errno: Some(libc::EPERM),
            ..Default::default()
        });
        let err = info.track_dirty(5, DirtyControlFlags::TRACK).unwrap_err();
        assert_eq!(err.errno(), Some(libc::EPERM));
        assert!(err.to_string().starts_with("proc_track_dirty failed"));
        assert_eq!(info.native().last(), "track_dirty 5 1");
    }

    #[test]
    fn get_dirty_decodes_flags() {
        let info = ProcInfo::new(Recorder::default());
        let status = info.get_dirty(5).unwrap();
        assert!(status.is_tracked());
        assert!(status.is_dirty());
        assert!(!status.allows_idle_exit());
    }

    #[test]
    fn calls_without_native_support_report_unsupported() {
        let info = ProcInfo::new(Recorder::default());
        let err = info.lib_version().unwrap_err();
        match err {
            ProcError::Native { call, source } => {
                assert_eq!(call, "proc_libversion");
                assert_eq!(source.kind(), io::ErrorKind::Unsupported);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
