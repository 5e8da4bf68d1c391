use std::sync::Mutex;

/// Running counts of records flowing through ingest and projection.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub read: usize,
    pub projected: usize,
    pub rejected: usize,
}

#[derive(Default)]
struct Metrics {
    read: usize,
    projected: usize,
    rejected: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    pub fn record_read(&self, count: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.read += count;
        }
    }

    pub fn record_projected(&self, count: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.projected += count;
        }
    }

    pub fn record_rejected(&self, count: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.rejected += count;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            MetricsSnapshot {
                read: metrics.read,
                projected: metrics.projected,
                rejected: metrics.rejected,
            }
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_accumulates_counts() {
        let metrics = MetricsRecorder::new();
        metrics.record_read(5);
        metrics.record_projected(4);
        metrics.record_rejected(1);
        metrics.record_read(2);
        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                read: 7,
                projected: 4,
                rejected: 1
            }
        );
    }
}
