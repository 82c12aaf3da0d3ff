use athwatch_domain::repositories::notifier::Notifier;

/// Dry-run sink: writes the message to the log and reports it as delivered.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOnlyNotifier;

impl LogOnlyNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for LogOnlyNotifier {
    fn notify(&self, message: &str) -> bool {
        tracing::info!(target: "athwatch::notify", text = message, "dry-run notification");
        true
    }
}
