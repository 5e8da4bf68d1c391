use log::{debug, info};

/// Thin front for the `log` facade so stages share one log target.
pub struct LogManager {
    target: &'static str,
}

impl LogManager {
    pub fn new() -> Self {
        Self {
            target: "trackcore",
        }
    }

    pub fn record(&self, message: &str) {
        info!(target: self.target, "{}", message);
    }

    pub fn detail(&self, message: &str) {
        debug!(target: self.target, "{}", message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_share_the_crate_target() {
        assert_eq!(LogManager::new().target, "trackcore");
        assert_eq!(LogManager::default().target, LogManager::new().target);
    }
}
