//! Search statistics

use std::collections::VecDeque;
use std::time::Duration;

/// Outcome of one `find_path` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchRecord {
    /// Loop iterations spent
    pub iterations: usize,
    /// Nodes created in the arena
    pub nodes_created: usize,
    /// Whether a target was reached
    pub reached: bool,
    /// Wall-clock time of the search
    pub duration: Duration,
}

/// Rolling statistics over recent searches
#[derive(Debug)]
pub struct SearchStats {
    /// Recent searches, oldest first
    history: VecDeque<SearchRecord>,
    /// Maximum samples to keep
    max_samples: usize,
    /// Total searches run
    total_searches: u64,
    /// Total searches that reached a target
    total_reached: u64,
}

impl SearchStats {
    /// Create a new tracker
    pub fn new() -> Self {
        Self {
            history: VecDeque::with_capacity(32),
            max_samples: 32,
            total_searches: 0,
            total_reached: 0,
        }
    }

    /// Record a finished search
    pub fn record(&mut self, record: SearchRecord) {
        self.total_searches += 1;
        if record.reached {
            self.total_reached += 1;
        }

        if self.history.len() >= self.max_samples {
            self.history.pop_front();
        }
        self.history.push_back(record);
    }

    /// Most recent search
    pub fn last(&self) -> Option<&SearchRecord> {
        self.history.back()
    }

    /// Average iterations over the kept history
    pub fn avg_iterations(&self) -> f32 {
        if self.history.is_empty() {
            return 0.0;
        }
        let total: usize = self.history.iter().map(|r| r.iterations).sum();
        total as f32 / self.history.len() as f32
    }

    /// Longest search in the kept history
    pub fn max_duration(&self) -> Duration {
        self.history
            .iter()
            .map(|r| r.duration)
            .max()
            .unwrap_or(Duration::ZERO)
    }

    /// Total searches run
    pub fn total_searches(&self) -> u64 {
        self.total_searches
    }

    /// Fraction of searches that reached a target
    pub fn success_rate(&self) -> f32 {
        if self.total_searches == 0 {
            return 0.0;
        }
        self.total_reached as f32 / self.total_searches as f32
    }

    /// Get a formatted stats string
    pub fn format_stats(&self) -> String {
        format!(
            "searches: {} | reached: {:.0}% | avg iterations: {:.1} | max: {:.2}ms",
            self.total_searches,
            self.success_rate() * 100.0,
            self.avg_iterations(),
            self.max_duration().as_secs_f32() * 1000.0
        )
    }
}

impl Default for SearchStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(iterations: usize, reached: bool) -> SearchRecord {
        SearchRecord {
            iterations,
            nodes_created: iterations * 4,
            reached,
            duration: Duration::from_micros(iterations as u64),
        }
    }

    #[test]
    fn test_stats_averages() {
        let mut stats = SearchStats::new();
        stats.record(record(10, true));
        stats.record(record(30, false));

        assert_eq!(stats.total_searches(), 2);
        assert!((stats.avg_iterations() - 20.0).abs() < 1e-6);
        assert!((stats.success_rate() - 0.5).abs() < 1e-6);
        assert_eq!(stats.last().map(|r| r.iterations), Some(30));
    }

    #[test]
    fn test_stats_history_is_bounded() {
        let mut stats = SearchStats::new();
        for i in 0..100 {
            stats.record(record(i, true));
        }
        assert_eq!(stats.total_searches(), 100);
        assert_eq!(stats.max_duration(), Duration::from_micros(99));
        assert!(stats.avg_iterations() > 60.0);
    }
}
