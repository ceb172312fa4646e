/// User-facing alert collaborator.
pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, message: &str);
}

/// Sends alerts to the log when no UI is attached.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        log::warn!("{message}");
    }
}

impl<F> Notifier for F
where
    F: Fn(&str) + Send + Sync + 'static,
{
    fn notify(&self, message: &str) {
        self(message)
    }
}
