//! Local resource usage, reported as percentages

#[cfg(feature = "metrics")]
use crate::core::models::metric_types;
#[cfg(feature = "metrics")]
use parking_lot::Mutex;
#[cfg(feature = "metrics")]
use sysinfo::{Disks, System};

/// Samples CPU, memory and disk utilisation of the host
#[derive(Debug)]
pub struct SystemCollector {
    #[cfg(feature = "metrics")]
    system: Mutex<System>,
    #[cfg(feature = "metrics")]
    disks: Mutex<Disks>,
}

impl Default for SystemCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemCollector {
    pub fn new() -> Self {
        Self {
            #[cfg(feature = "metrics")]
            system: Mutex::new(primed_system()),
            #[cfg(feature = "metrics")]
            disks: Mutex::new(Disks::new_with_refreshed_list()),
        }
    }

    /// `(metric_type, percent)` pairs; empty without the `metrics` feature
    #[cfg(feature = "metrics")]
    pub fn collect(&self) -> Vec<(&'static str, f64)> {
        let (cpu, memory) = {
            let mut system = self.system.lock();
            system.refresh_cpu_usage();
            system.refresh_memory();
            (
                system.global_cpu_usage() as f64,
                percent(system.used_memory(), system.total_memory()),
            )
        };

        let disk = {
            let mut disks = self.disks.lock();
            disks.refresh_list();
            let (used, total) = disks.iter().fold((0u64, 0u64), |(used, total), disk| {
                (
                    used + disk.total_space().saturating_sub(disk.available_space()),
                    total + disk.total_space(),
                )
            });
            percent(used, total)
        };

        vec![
            (metric_types::CPU, cpu),
            (metric_types::MEMORY, memory),
            (metric_types::DISK, disk),
        ]
    }

    #[cfg(not(feature = "metrics"))]
    pub fn collect(&self) -> Vec<(&'static str, f64)> {
        Vec::new()
    }
}

/// CPU usage is a delta between two refreshes; take the first one here
#[cfg(feature = "metrics")]
fn primed_system() -> System {
    let mut system = System::new();
    system.refresh_cpu_usage();
    system
}

#[cfg(feature = "metrics")]
fn percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        used as f64 / total as f64 * 100.0
    }
}
