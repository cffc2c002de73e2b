//! Configuration for workflow controllers.

/// Tunable settings shared by the workflow controllers.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// Page size for message fetches. The API caps message pages at 100.
    pub message_page_size: u32,
    /// Page size for the notification count query. Only the page meta's
    /// total is read, so a single item per page is enough.
    pub notification_page_size: u32,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            message_page_size: 100,
            notification_page_size: 1,
        }
    }
}

impl FlowConfig {
    /// Sets the message page size.
    pub fn with_message_page_size(mut self, size: u32) -> Self {
        self.message_page_size = size;
        self
    }

    /// Sets the notification query page size.
    pub fn with_notification_page_size(mut self, size: u32) -> Self {
        self.notification_page_size = size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_api_limits() {
        let config = FlowConfig::default();
        assert_eq!(config.message_page_size, 100);
        assert_eq!(config.notification_page_size, 1);
    }
}
