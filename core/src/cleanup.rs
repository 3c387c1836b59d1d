use tracing::{error, info};

use crate::source::{CleanupAction, PollError};

/// Launch the external cleanup tool once.
///
/// Fire and forget: a failure is reported and swallowed, nothing is
/// retried and no polling state is touched. Whether the remediation
/// actually freed space shows up in the next poll. The returned result
/// exists for callers that want an exit code; ignoring it is fine.
pub async fn trigger_cleanup<C: CleanupAction + ?Sized>(action: &C) -> Result<(), PollError> {
    match action.launch_cleanup().await {
        Ok(()) => {
            info!("Cleanup action launched");
            Ok(())
        }
        Err(e) => {
            let err = PollError::CleanupLaunchFailed(e);
            error!("{err}");
            Err(err)
        }
    }
}
