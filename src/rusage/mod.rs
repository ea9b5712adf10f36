// Versioned resource-usage schema.
//
// The kernel's rusage_info structs grow by appending fields: v(n+1) is v(n)
// plus a tail. A flavor therefore populates a prefix of the v4 layout, which
// `RUsageFlavor::fields` exposes as a prefix of `RUsageField::ALL`.

mod capability;
mod snapshot;

use std::fmt;
use std::mem;

use serde::Serialize;

pub use capability::{RUsageCapability, discover_rusage_flavor};
pub use snapshot::RUsageSnapshot;

/// `struct rusage_info_v4` from <sys/resource.h> (296 bytes).
#[allow(non_camel_case_types)]
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct rusage_info_v4 {
    pub ri_uuid: [u8; 16],
    pub ri_user_time: u64,
    pub ri_system_time: u64,
    pub ri_pkg_idle_wkups: u64,
    pub ri_interrupt_wkups: u64,
    pub ri_pageins: u64,
    pub ri_wired_size: u64,
    pub ri_resident_size: u64,
    pub ri_phys_footprint: u64,
    pub ri_proc_start_abstime: u64,
    pub ri_proc_exit_abstime: u64,
    // v1
    pub ri_child_user_time: u64,
    pub ri_child_system_time: u64,
    pub ri_child_pkg_idle_wkups: u64,
    pub ri_child_interrupt_wkups: u64,
    pub ri_child_pageins: u64,
    pub ri_child_elapsed_abstime: u64,
    // v2
    pub ri_diskio_bytesread: u64,
    pub ri_diskio_byteswritten: u64,
    // v3
    pub ri_cpu_time_qos_default: u64,
    pub ri_cpu_time_qos_maintenance: u64,
    pub ri_cpu_time_qos_background: u64,
    pub ri_cpu_time_qos_utility: u64,
    pub ri_cpu_time_qos_legacy: u64,
    pub ri_cpu_time_qos_user_initiated: u64,
    pub ri_cpu_time_qos_user_interactive: u64,
    pub ri_billed_system_time: u64,
    pub ri_serviced_system_time: u64,
    // v4
    pub ri_logical_writes: u64,
    pub ri_lifetime_max_phys_footprint: u64,
    pub ri_instructions: u64,
    pub ri_cycles: u64,
    pub ri_billed_energy: u64,
    pub ri_serviced_energy: u64,
    pub ri_interval_max_phys_footprint: u64,
    pub ri_runnable_time: u64,
}

const _: () = assert!(mem::size_of::<rusage_info_v4>() == 296);
const _: () = assert!(16 + RUsageField::ALL.len() * 8 == 296);

/// Version of the rusage_info struct requested from `proc_pid_rusage`
/// (`RUSAGE_INFO_V0` .. `RUSAGE_INFO_V4`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "i32")]
#[repr(i32)]
pub enum RUsageFlavor {
    V0 = 0,
    V1 = 1,
    V2 = 2,
    V3 = 3,
    V4 = 4,
}

impl RUsageFlavor {
    /// Newest layout this crate knows; scratch buffers are always this size.
    pub const NEWEST: Self = Self::V4;

    /// Probe order used by capability discovery.
    pub const DESCENDING: [Self; 5] = [Self::V4, Self::V3, Self::V2, Self::V1, Self::V0];

    /// Raw value reported when no flavor is supported.
    pub const UNSUPPORTED_RAW: i32 = -1;

    // Number of counters populated by each flavor, indexed by flavor.
    const FIELD_COUNTS: [usize; 5] = [10, 16, 18, 27, 35];

    pub fn as_raw(self) -> i32 {
        self as i32
    }

    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::V0),
            1 => Some(Self::V1),
            2 => Some(Self::V2),
            3 => Some(Self::V3),
            4 => Some(Self::V4),
            _ => None,
        }
    }

    /// Counters this flavor fills, in layout order.
    pub fn fields(self) -> &'static [RUsageField] {
        &RUsageField::ALL[..Self::FIELD_COUNTS[self as usize]]
    }

    pub fn populates(self, field: RUsageField) -> bool {
        field.introduced_in() <= self
    }

    /// Size in bytes of `struct rusage_info_v<N>`.
    pub fn layout_size(self) -> usize {
        16 + self.fields().len() * 8
    }
}

impl From<RUsageFlavor> for i32 {
    fn from(flavor: RUsageFlavor) -> i32 {
        flavor.as_raw()
    }
}

impl fmt::Display for RUsageFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.as_raw())
    }
}

/// One `u64` counter of the rusage_info layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RUsageField {
    UserTime,
    SystemTime,
    PkgIdleWkups,
    InterruptWkups,
    Pageins,
    WiredSize,
    ResidentSize,
    PhysFootprint,
    ProcStartAbstime,
    ProcExitAbstime,
    ChildUserTime,
    ChildSystemTime,
    ChildPkgIdleWkups,
    ChildInterruptWkups,
    ChildPageins,
    ChildElapsedAbstime,
    DiskioBytesRead,
    DiskioBytesWritten,
    CpuTimeQosDefault,
    CpuTimeQosMaintenance,
    CpuTimeQosBackground,
    CpuTimeQosUtility,
    CpuTimeQosLegacy,
    CpuTimeQosUserInitiated,
    CpuTimeQosUserInteractive,
    BilledSystemTime,
    ServicedSystemTime,
    LogicalWrites,
    LifetimeMaxPhysFootprint,
    Instructions,
    Cycles,
    BilledEnergy,
    ServicedEnergy,
    IntervalMaxPhysFootprint,
    RunnableTime,
}

impl RUsageField {
    /// Every counter in layout order.
    pub const ALL: [Self; 35] = [
        Self::UserTime,
        Self::SystemTime,
        Self::PkgIdleWkups,
        Self::InterruptWkups,
        Self::Pageins,
        Self::WiredSize,
        Self::ResidentSize,
        Self::PhysFootprint,
        Self::ProcStartAbstime,
        Self::ProcExitAbstime,
        Self::ChildUserTime,
        Self::ChildSystemTime,
        Self::ChildPkgIdleWkups,
        Self::ChildInterruptWkups,
        Self::ChildPageins,
        Self::ChildElapsedAbstime,
        Self::DiskioBytesRead,
        Self::DiskioBytesWritten,
        Self::CpuTimeQosDefault,
        Self::CpuTimeQosMaintenance,
        Self::CpuTimeQosBackground,
        Self::CpuTimeQosUtility,
        Self::CpuTimeQosLegacy,
        Self::CpuTimeQosUserInitiated,
        Self::CpuTimeQosUserInteractive,
        Self::BilledSystemTime,
        Self::ServicedSystemTime,
        Self::LogicalWrites,
        Self::LifetimeMaxPhysFootprint,
        Self::Instructions,
        Self::Cycles,
        Self::BilledEnergy,
        Self::ServicedEnergy,
        Self::IntervalMaxPhysFootprint,
        Self::RunnableTime,
    ];

    /// Oldest flavor whose layout contains this counter.
    pub fn introduced_in(self) -> RUsageFlavor {
        let index = self as usize;
        RUsageFlavor::DESCENDING
            .iter()
            .rev()
            .copied()
            .find(|flavor| index < RUsageFlavor::FIELD_COUNTS[*flavor as usize])
            .unwrap_or(RUsageFlavor::NEWEST)
    }

    /// Native field name, without the `ri_` prefix.
    pub fn name(self) -> &'static str {
        match self {
            Self::UserTime => "user_time",
            Self::SystemTime => "system_time",
            Self::PkgIdleWkups => "pkg_idle_wkups",
            Self::InterruptWkups => "interrupt_wkups",
            Self::Pageins => "pageins",
            Self::WiredSize => "wired_size",
            Self::ResidentSize => "resident_size",
            Self::PhysFootprint => "phys_footprint",
            Self::ProcStartAbstime => "proc_start_abstime",
            Self::ProcExitAbstime => "proc_exit_abstime",
            Self::ChildUserTime => "child_user_time",
            Self::ChildSystemTime => "child_system_time",
            Self::ChildPkgIdleWkups => "child_pkg_idle_wkups",
            Self::ChildInterruptWkups => "child_interrupt_wkups",
            Self::ChildPageins => "child_pageins",
            Self::ChildElapsedAbstime => "child_elapsed_abstime",
            Self::DiskioBytesRead => "diskio_bytesread",
            Self::DiskioBytesWritten => "diskio_byteswritten",
            Self::CpuTimeQosDefault => "cpu_time_qos_default",
            Self::CpuTimeQosMaintenance => "cpu_time_qos_maintenance",
            Self::CpuTimeQosBackground => "cpu_time_qos_background",
            Self::CpuTimeQosUtility => "cpu_time_qos_utility",
            Self::CpuTimeQosLegacy => "cpu_time_qos_legacy",
            Self::CpuTimeQosUserInitiated => "cpu_time_qos_user_initiated",
            Self::CpuTimeQosUserInteractive => "cpu_time_qos_user_interactive",
            Self::BilledSystemTime => "billed_system_time",
            Self::ServicedSystemTime => "serviced_system_time",
            Self::LogicalWrites => "logical_writes",
            Self::LifetimeMaxPhysFootprint => "lifetime_max_phys_footprint",
            Self::Instructions => "instructions",
            Self::Cycles => "cycles",
            Self::BilledEnergy => "billed_energy",
            Self::ServicedEnergy => "serviced_energy",
            Self::IntervalMaxPhysFootprint => "interval_max_phys_footprint",
            Self::RunnableTime => "runnable_time",
        }
    }
}

impl fmt::Display for RUsageField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
