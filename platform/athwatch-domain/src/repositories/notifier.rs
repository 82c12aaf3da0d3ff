/// Delivers a text message. Returns whether the endpoint accepted it; never fails.
pub trait Notifier {
    fn notify(&self, message: &str) -> bool;
}
