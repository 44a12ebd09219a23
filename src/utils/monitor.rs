use std::sync::Mutex;
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, RefreshKind, System};

#[derive(Debug, Clone)]
pub struct ProcessStats {
    pub cpu_usage: f32,
    pub memory_usage_mb: u64,
    pub peak_memory_mb: u64,
}

/// Per-phase timing for one ETL run, with process stats when the `cli`
/// feature is compiled in.
pub struct SystemMonitor {
    enabled: bool,
    start_time: Instant,
    phase_start: Mutex<Instant>,
    phases: Mutex<Vec<(String, Duration)>>,
    #[cfg(feature = "cli")]
    system: Mutex<System>,
    #[cfg(feature = "cli")]
    pid: Option<Pid>,
    #[cfg(feature = "cli")]
    peak_memory: Mutex<u64>,
}

impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        #[cfg(feature = "cli")]
        let system = {
            let mut system = System::new_with_specifics(RefreshKind::everything());
            if enabled {
                system.refresh_all();
            }
            system
        };

        Self {
            enabled,
            start_time: Instant::now(),
            phase_start: Mutex::new(Instant::now()),
            phases: Mutex::new(Vec::new()),
            #[cfg(feature = "cli")]
            system: Mutex::new(system),
            #[cfg(feature = "cli")]
            pid: sysinfo::get_current_pid().ok(),
            #[cfg(feature = "cli")]
            peak_memory: Mutex::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[cfg(feature = "cli")]
    fn process_stats(&self) -> Option<ProcessStats> {
        let pid = self.pid?;
        let mut system = self.system.lock().ok()?;
        system.refresh_all();
        let process = system.process(pid)?;
        let memory_mb = process.memory() / 1024 / 1024;

        let mut peak = self.peak_memory.lock().ok()?;
        if memory_mb > *peak {
            *peak = memory_mb;
        }

        Some(ProcessStats {
            cpu_usage: process.cpu_usage(),
            memory_usage_mb: memory_mb,
            peak_memory_mb: *peak,
        })
    }

    #[cfg(not(feature = "cli"))]
    fn process_stats(&self) -> Option<ProcessStats> {
        None
    }

    /// Closes the current phase and logs its duration.
    pub fn finish_phase(&self, phase: &str) {
        if !self.enabled {
            return;
        }

        let elapsed = match self.phase_start.lock() {
            Ok(mut start) => {
                let elapsed = start.elapsed();
                *start = Instant::now();
                elapsed
            }
            Err(_) => return,
        };

        if let Ok(mut phases) = self.phases.lock() {
            phases.push((phase.to_string(), elapsed));
        }

        match self.process_stats() {
            Some(stats) => tracing::info!(
                "📊 {} - {:?} (CPU: {:.1}%, Memory: {}MB, Peak: {}MB)",
                phase,
                elapsed,
                stats.cpu_usage,
                stats.memory_usage_mb,
                stats.peak_memory_mb
            ),
            None => tracing::info!("📊 {} - {:?}", phase, elapsed),
        }
    }

    pub fn phase_durations(&self) -> Vec<(String, Duration)> {
        self.phases.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn log_final_stats(&self) {
        if !self.enabled {
            return;
        }
        let peak = self
            .process_stats()
            .map(|s| format!(", Peak Memory: {}MB", s.peak_memory_mb))
            .unwrap_or_default();
        tracing::info!(
            "📊 Final Stats - Total Time: {:?}{}",
            self.start_time.elapsed(),
            peak
        );
    }
}

impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}
