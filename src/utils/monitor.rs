#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, RefreshKind, System};

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct SystemStats {
    pub cpu_usage: f32,
    pub memory_usage_mb: u64,
    pub elapsed_time: Duration,
}

#[cfg(feature = "cli")]
pub struct SystemMonitor {
    system: System,
    pid: Pid,
    start_time: Instant,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let mut system = System::new_with_specifics(RefreshKind::everything());
        let pid = sysinfo::get_current_pid().expect("Failed to get current PID");

        // 初始刷新
        system.refresh_all();

        Self {
            system,
            pid,
            start_time: Instant::now(),
            enabled,
        }
    }

    pub fn get_stats(&mut self) -> Option<SystemStats> {
        if !self.enabled {
            return None;
        }

        self.system.refresh_all();
        let process = self.system.process(self.pid)?;

        Some(SystemStats {
            cpu_usage: process.cpu_usage(),
            memory_usage_mb: process.memory() / 1024 / 1024,
            elapsed_time: self.start_time.elapsed(),
        })
    }

    pub fn log_stats(&mut self, label: &str) {
        if let Some(stats) = self.get_stats() {
            tracing::info!(
                "🔍 {}: cpu {:.1}%, memory {} MB, elapsed {:.2}s",
                label,
                stats.cpu_usage,
                stats.memory_usage_mb,
                stats.elapsed_time.as_secs_f64()
            );
        }
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_monitor_returns_no_stats() {
        let mut monitor = SystemMonitor::new(false);
        assert!(monitor.get_stats().is_none());
    }

    #[test]
    fn test_enabled_monitor_reports_current_process() {
        let mut monitor = SystemMonitor::new(true);
        let stats = monitor.get_stats().expect("stats for the current process");
        assert!(stats.elapsed_time >= Duration::ZERO);
    }
}
