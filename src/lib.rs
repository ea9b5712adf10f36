//! Thin, safe call-through layer over macOS `libproc`.
//!
//! Every forwarder on [`ProcInfo`] maps to one libproc call and translates
//! its error convention into [`ProcError`]. Resource usage is the exception:
//! the newest `rusage_info` flavor the kernel accepts is discovered once per
//! process and reused for every [`ProcInfo::pid_rusage`] query.
//!
//! The native binding only exists on macOS. The [`native::Native`] trait is
//! available everywhere so other implementations can drive the same code.

pub mod error;
pub mod native;
pub mod procinfo;
pub mod rusage;
pub mod types;

pub use error::ProcError;
pub use native::Native;
pub use procinfo::ProcInfo;
pub use rusage::{RUsageCapability, RUsageField, RUsageFlavor, RUsageSnapshot};
pub use types::Pid;

#[cfg(target_os = "macos")]
pub use native::Libproc;

/// Process-wide handle over the system libproc.
#[cfg(target_os = "macos")]
pub fn system() -> &'static ProcInfo<Libproc> {
    static SYSTEM: ProcInfo<Libproc> = ProcInfo::new(Libproc);
    &SYSTEM
}

/// Highest rusage flavor supported by the running kernel, or `-1`.
#[cfg(target_os = "macos")]
pub fn raw_highest_rusage_flavor() -> i32 {
    system().raw_highest_rusage_flavor()
}
