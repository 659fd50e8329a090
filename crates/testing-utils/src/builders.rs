//! Test data builders for job runs

use chrono::{DateTime, Duration, Utc};
use etl_metrics_domain::entities::{JobRun, JobRunState};

/// Builder for creating test JobRun entities
///
/// Defaults to a SUCCEEDED run that started ten minutes before the
/// reference time and finished one minute later.
pub struct JobRunBuilder {
    reference: DateTime<Utc>,
    run: JobRun,
}

impl JobRunBuilder {
    pub fn new(id: &str) -> Self {
        Self::at(id, Utc::now())
    }

    /// Offsets given to the builder are relative to `reference`
    pub fn at(id: &str, reference: DateTime<Utc>) -> Self {
        Self {
            reference,
            run: JobRun {
                id: id.to_string(),
                state: JobRunState::Succeeded,
                started_on: reference - Duration::seconds(600),
                completed_on: Some(reference - Duration::seconds(540)),
                execution_time: 60,
                error_message: None,
            },
        }
    }

    pub fn with_state(mut self, state: JobRunState) -> Self {
        self.run.state = state;
        self
    }

    pub fn with_state_label(mut self, label: &str) -> Self {
        self.run.state = JobRunState::from_label(label);
        self
    }

    pub fn started_secs_ago(mut self, secs: i64) -> Self {
        self.run.started_on = self.reference - Duration::seconds(secs);
        self
    }

    pub fn completed_secs_ago(mut self, secs: i64) -> Self {
        self.run.completed_on = Some(self.reference - Duration::seconds(secs));
        self
    }

    pub fn not_completed(mut self) -> Self {
        self.run.completed_on = None;
        self
    }

    pub fn with_execution_time(mut self, seconds: i64) -> Self {
        self.run.execution_time = seconds;
        self
    }

    pub fn with_error(mut self, message: &str) -> Self {
        self.run.error_message = Some(message.to_string());
        self
    }

    /// RUNNING with no completion time
    pub fn running(self) -> Self {
        self.with_state(JobRunState::Running).not_completed()
    }

    pub fn failed(self, message: &str) -> Self {
        self.with_state(JobRunState::Failed).with_error(message)
    }

    pub fn build(self) -> JobRun {
        self.run
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let reference = Utc::now();
        let run = JobRunBuilder::at("jr_1", reference).build();
        assert_eq!(run.id, "jr_1");
        assert_eq!(run.state, JobRunState::Succeeded);
        assert_eq!(run.completed_on, Some(reference - Duration::seconds(540)));
        assert!(run.error_message.is_none());
    }

    #[test]
    fn test_running_clears_completion() {
        let run = JobRunBuilder::new("jr_2").running().build();
        assert_eq!(run.state, JobRunState::Running);
        assert!(run.completed_on.is_none());
    }

    #[test]
    fn test_failed_sets_error() {
        let run = JobRunBuilder::new("jr_3").failed("OOM").build();
        assert_eq!(run.state, JobRunState::Failed);
        assert_eq!(run.error_message.as_deref(), Some("OOM"));
    }
}
