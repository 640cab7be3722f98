/*
 * User-visible reporting for failures that must not abort the operation in
 * progress, such as a failed save of the outgoing workspace during a switch.
 * Hosts with a UI show a message box; the default implementation logs.
 */
use crate::core::error::WorkspaceError;

pub trait WorkspaceNotifier: Send + Sync {
    fn write_failed(&self, workspace_name: &str, error: &WorkspaceError);
}

#[derive(Debug, Default)]
pub struct LogNotifier;

impl WorkspaceNotifier for LogNotifier {
    fn write_failed(&self, workspace_name: &str, error: &WorkspaceError) {
        log::error!("LogNotifier: Writing workspace '{workspace_name}' failed: {error}");
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::Mutex;

    // Records every notification for later inspection.
    #[derive(Default)]
    pub(crate) struct RecordingNotifier {
        pub(crate) failures: Mutex<Vec<String>>,
    }

    impl WorkspaceNotifier for RecordingNotifier {
        fn write_failed(&self, workspace_name: &str, _error: &WorkspaceError) {
            self.failures
                .lock()
                .unwrap()
                .push(workspace_name.to_string());
        }
    }
}
