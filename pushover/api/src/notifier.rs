use log::{debug, info};

use crate::{NotificationError, PushoverApi};

/// Result of a finished build.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum BuildResult {
    /// Build succeeded.
    Success,
    /// Build succeeded but tests failed.
    Unstable,
    /// Build failed.
    Failure,
    /// Build was skipped.
    NotBuilt,
    /// Build was interrupted.
    Aborted,
}

/// What the CI host knows about a finished build.
#[derive(Clone, Debug)]
pub struct BuildOutcome {
    /// Project or job name.
    pub project: String,
    /// Build result.
    pub result: BuildResult,
    /// Users whose changes possibly broke the build.
    pub culprits: Vec<String>,
}

impl BuildOutcome {
    /// Creates a [`BuildOutcome`] without culprits.
    pub fn new<T: Into<String>>(project: T, result: BuildResult) -> Self {
        Self {
            project: project.into(),
            result,
            culprits: Vec::new(),
        }
    }

    /// `<project>: <RESULT>` followed by a line per culprit.
    pub fn message(&self) -> String {
        let mut message = format!("{}: {}\n", self.project, self.result);
        let culprits: Vec<_> = self
            .culprits
            .iter()
            .map(|c| format!("Possible Culprit: {c}"))
            .collect();
        message.push_str(&culprits.join("\n"));
        message
    }
}

/// Post-build step run by the CI host.
pub trait Publisher {
    /// Returns the response body when a notification was sent, [`None`] when skipped.
    fn perform(&self, outcome: &BuildOutcome) -> Result<Option<String>, NotificationError>;
}

/// Sends a Pushover message for unsuccessful builds, or for every build on request.
#[derive(Clone, Copy, Debug)]
pub struct BuildNotifier<'a> {
    api: &'a PushoverApi,
    /// Notify successful builds as well.
    pub notify_on_success: bool,
}

impl<'a> BuildNotifier<'a> {
    /// Creates a [`BuildNotifier`] sharing `api`.
    pub fn new(api: &'a PushoverApi, notify_on_success: bool) -> Self {
        Self {
            api,
            notify_on_success,
        }
    }

    /// Whether `outcome` warrants a notification.
    pub fn should_notify(&self, outcome: &BuildOutcome) -> bool {
        outcome.result != BuildResult::Success || self.notify_on_success
    }
}

impl Publisher for BuildNotifier<'_> {
    fn perform(&self, outcome: &BuildOutcome) -> Result<Option<String>, NotificationError> {
        if !self.should_notify(outcome) {
            debug!("skip notification of {} {}", outcome.project, outcome.result);
            return Ok(None);
        }
        info!("send notification of {} {}", outcome.project, outcome.result);
        self.api.send(outcome.message()).map(Some)
    }
}
