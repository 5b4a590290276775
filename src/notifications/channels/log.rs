//! Log notification channel

use async_trait::async_trait;

use super::{Channel, ChannelResult};

/// Writes messages to the operational log
///
/// The selection payload is ignored and publishing never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogChannel;

impl LogChannel {
    /// Create a new log channel
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Channel for LogChannel {
    fn name(&self) -> &str {
        "log"
    }

    async fn publish(&self, _payload: &str, message: &str) -> ChannelResult<()> {
        tracing::info!(target: "appointment_monitor::published", "{message}");
        Ok(())
    }
}
