use serde::Serialize;

use super::{RUsageField, RUsageFlavor, rusage_info_v4};

/// Resource usage of one process at the moment of the query.
///
/// Values are copied verbatim from the kernel: times are Mach absolute-time
/// ticks, sizes are bytes, energy is nanojoules. Counters the queried flavor
/// does not populate read as zero; `get` reports them as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RUsageSnapshot {
    pub flavor: RUsageFlavor,
    pub uuid: [u8; 16],
    pub user_time: u64,
    pub system_time: u64,
    pub pkg_idle_wkups: u64,
    pub interrupt_wkups: u64,
    pub pageins: u64,
    pub wired_size: u64,
    pub resident_size: u64,
    pub phys_footprint: u64,
    pub proc_start_abstime: u64,
    pub proc_exit_abstime: u64,
    pub child_user_time: u64,
    pub child_system_time: u64,
    pub child_pkg_idle_wkups: u64,
    pub child_interrupt_wkups: u64,
    pub child_pageins: u64,
    pub child_elapsed_abstime: u64,
    pub diskio_bytesread: u64,
    pub diskio_byteswritten: u64,
    pub cpu_time_qos_default: u64,
    pub cpu_time_qos_maintenance: u64,
    pub cpu_time_qos_background: u64,
    pub cpu_time_qos_utility: u64,
    pub cpu_time_qos_legacy: u64,
    pub cpu_time_qos_user_initiated: u64,
    pub cpu_time_qos_user_interactive: u64,
    pub billed_system_time: u64,
    pub serviced_system_time: u64,
    pub logical_writes: u64,
    pub lifetime_max_phys_footprint: u64,
    pub instructions: u64,
    pub cycles: u64,
    pub billed_energy: u64,
    pub serviced_energy: u64,
    pub interval_max_phys_footprint: u64,
    pub runnable_time: u64,
}

impl RUsageSnapshot {
    /// Copy a filled native struct. Only called after the native call
    /// succeeded, so the snapshot is never partially populated.
    pub(crate) fn from_raw(flavor: RUsageFlavor, raw: &rusage_info_v4) -> Self {
        Self {
            flavor,
            uuid: raw.ri_uuid,
            user_time: raw.ri_user_time,
            system_time: raw.ri_system_time,
            pkg_idle_wkups: raw.ri_pkg_idle_wkups,
            interrupt_wkups: raw.ri_interrupt_wkups,
            pageins: raw.ri_pageins,
            wired_size: raw.ri_wired_size,
            resident_size: raw.ri_resident_size,
            phys_footprint: raw.ri_phys_footprint,
            proc_start_abstime: raw.ri_proc_start_abstime,
            proc_exit_abstime: raw.ri_proc_exit_abstime,
            child_user_time: raw.ri_child_user_time,
            child_system_time: raw.ri_child_system_time,
            child_pkg_idle_wkups: raw.ri_child_pkg_idle_wkups,
            child_interrupt_wkups: raw.ri_child_interrupt_wkups,
            child_pageins: raw.ri_child_pageins,
            child_elapsed_abstime: raw.ri_child_elapsed_abstime,
            diskio_bytesread: raw.ri_diskio_bytesread,
            diskio_byteswritten: raw.ri_diskio_byteswritten,
            cpu_time_qos_default: raw.ri_cpu_time_qos_default,
            cpu_time_qos_maintenance: raw.ri_cpu_time_qos_maintenance,
            cpu_time_qos_background: raw.ri_cpu_time_qos_background,
            cpu_time_qos_utility: raw.ri_cpu_time_qos_utility,
            cpu_time_qos_legacy: raw.ri_cpu_time_qos_legacy,
            cpu_time_qos_user_initiated: raw.ri_cpu_time_qos_user_initiated,
            cpu_time_qos_user_interactive: raw.ri_cpu_time_qos_user_interactive,
            billed_system_time: raw.ri_billed_system_time,
            serviced_system_time: raw.ri_serviced_system_time,
            logical_writes: raw.ri_logical_writes,
            lifetime_max_phys_footprint: raw.ri_lifetime_max_phys_footprint,
            instructions: raw.ri_instructions,
            cycles: raw.ri_cycles,
            billed_energy: raw.ri_billed_energy,
            serviced_energy: raw.ri_serviced_energy,
            interval_max_phys_footprint: raw.ri_interval_max_phys_footprint,
            runnable_time: raw.ri_runnable_time,
        }
    }

    /// Counter value, or `None` when the snapshot's flavor predates it.
    pub fn get(&self, field: RUsageField) -> Option<u64> {
        self.flavor.populates(field).then(|| self.value(field))
    }

    fn value(&self, field: RUsageField) -> u64 {
        match field {
            RUsageField::UserTime => self.user_time,
            RUsageField::SystemTime => self.system_time,
            RUsageField::PkgIdleWkups => self.pkg_idle_wkups,
            RUsageField::InterruptWkups => self.interrupt_wkups,
            RUsageField::Pageins => self.pageins,
            RUsageField::WiredSize => self.wired_size,
            RUsageField::ResidentSize => self.resident_size,
            RUsageField::PhysFootprint => self.phys_footprint,
            RUsageField::ProcStartAbstime => self.proc_start_abstime,
            RUsageField::ProcExitAbstime => self.proc_exit_abstime,
            RUsageField::ChildUserTime => self.child_user_time,
            RUsageField::ChildSystemTime => self.child_system_time,
            RUsageField::ChildPkgIdleWkups => self.child_pkg_idle_wkups,
            RUsageField::ChildInterruptWkups => self.child_interrupt_wkups,
            RUsageField::ChildPageins => self.child_pageins,
            RUsageField::ChildElapsedAbstime => self.child_elapsed_abstime,
            RUsageField::DiskioBytesRead => self.diskio_bytesread,
            RUsageField::DiskioBytesWritten => self.diskio_byteswritten,
            RUsageField::CpuTimeQosDefault => self.cpu_time_qos_default,
            RUsageField::CpuTimeQosMaintenance => self.cpu_time_qos_maintenance,
            RUsageField::CpuTimeQosBackground => self.cpu_time_qos_background,
            RUsageField::CpuTimeQosUtility => self.cpu_time_qos_utility,
            RUsageField::CpuTimeQosLegacy => self.cpu_time_qos_legacy,
            RUsageField::CpuTimeQosUserInitiated => self.cpu_time_qos_user_initiated,
            RUsageField::CpuTimeQosUserInteractive => self.cpu_time_qos_user_interactive,
            RUsageField::BilledSystemTime => self.billed_system_time,
            RUsageField::ServicedSystemTime => self.serviced_system_time,
            RUsageField::LogicalWrites => self.logical_writes,
            RUsageField::LifetimeMaxPhysFootprint => self.lifetime_max_phys_footprint,
            RUsageField::Instructions => self.instructions,
            RUsageField::Cycles => self.cycles,
            RUsageField::BilledEnergy => self.billed_energy,
            RUsageField::ServicedEnergy => self.serviced_energy,
            RUsageField::IntervalMaxPhysFootprint => self.interval_max_phys_footprint,
            RUsageField::RunnableTime => self.runnable_time,
        }
    }

    /// Populated counters in layout order.
    pub fn populated(&self) -> impl Iterator<Item = (RUsageField, u64)> + '_ {
        self.flavor
            .fields()
            .iter()
            .map(move |field| (*field, self.value(*field)))
    }
}
