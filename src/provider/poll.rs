// Polling for background interactions
//
// Deep research runs as a remote background job; the only way to observe
// it is to re-fetch the interaction until its status leaves `in_progress`.
// The loop runs on the tokio clock, so tests drive it with paused time,
// and it carries a maximum wait so a stuck remote job cannot block a
// request forever.

use std::time::Duration;

use crate::error::WorkflowError;

use super::{Interaction, InteractionClient};

#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between status fetches
    pub interval: Duration,
    /// Upper bound on total waiting before giving up
    pub max_wait: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_wait: Duration::from_secs(600),
        }
    }
}

/// Fetch an interaction at a fixed interval until its status is no longer
/// `in_progress`, returning the final interaction.
///
/// The caller decides what a terminal status means; a `failed` interaction
/// is returned, not swallowed.
pub async fn poll_until_terminal(
    client: &dyn InteractionClient,
    id: &str,
    config: &PollConfig,
) -> Result<Interaction, WorkflowError> {
    let started = tokio::time::Instant::now();

    loop {
        let interaction = client.get_interaction(id).await?;

        if !interaction.status.is_in_progress() {
            return Ok(interaction);
        }

        if started.elapsed() >= config.max_wait {
            return Err(WorkflowError::PollTimeout {
                id: id.to_string(),
                waited_secs: config.max_wait.as_secs(),
            });
        }

        log::debug!("Interaction {} still in progress, waiting", id);
        tokio::time::sleep(config.interval).await;
    }
}
