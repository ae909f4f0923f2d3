//! Blocking user alerts.

/// Surface for messages the user must acknowledge.
pub trait Notifier {
    fn alert(&mut self, message: &str);
}

/// Collects alerts in order; used by tests and headless runs.
impl Notifier for Vec<String> {
    fn alert(&mut self, message: &str) {
        self.push(message.to_string());
    }
}
