use std::sync::OnceLock;

use super::{RUsageFlavor, rusage_info_v4};
use crate::native::Native;

/// Find the newest rusage flavor the native layer accepts.
///
/// Probes the current process from `RUsageFlavor::NEWEST` down to `V0` and
/// stops at the first success, so at most five native calls are made. The
/// scratch struct is always the v4 layout: the kernel only writes the prefix
/// belonging to the requested flavor. Failed probes are reported through
/// `log` and never surface to the caller.
pub fn discover_rusage_flavor<N: Native + ?Sized>(native: &N) -> Option<RUsageFlavor> {
    let pid = native.current_pid();
    let mut scratch = rusage_info_v4::default();

    for flavor in RUsageFlavor::DESCENDING {
        match native.pid_rusage(pid, flavor.as_raw(), &mut scratch) {
            Ok(()) => {
                log::debug!("rusage flavor {flavor} supported (probed via pid {pid})");
                return Some(flavor);
            }
            Err(e) => log::debug!("rusage flavor {flavor} probe failed for pid {pid}: {e}"),
        }
    }

    log::warn!(
        "no rusage flavor between v0 and {} is supported; rusage queries are disabled",
        RUsageFlavor::NEWEST
    );
    None
}

/// Process-lifetime cache of the discovered rusage flavor.
///
/// Transitions once from undiscovered to a terminal value (`Some(flavor)` or
/// `None` for unsupported) and is never invalidated. Concurrent first callers
/// block until the single discovery run finishes.
#[derive(Debug, Default)]
pub struct RUsageCapability {
    flavor: OnceLock<Option<RUsageFlavor>>,
}

impl RUsageCapability {
    pub const fn new() -> Self {
        Self {
            flavor: OnceLock::new(),
        }
    }

    /// A cache that is already resolved; discovery will never run.
    pub fn resolved(flavor: Option<RUsageFlavor>) -> Self {
        Self {
            flavor: OnceLock::from(flavor),
        }
    }

    pub fn get_or_discover<N: Native + ?Sized>(&self, native: &N) -> Option<RUsageFlavor> {
        *self.flavor.get_or_init(|| discover_rusage_flavor(native))
    }

    /// `None` until discovery has run.
    pub fn get(&self) -> Option<Option<RUsageFlavor>> {
        self.flavor.get().copied()
    }
}
