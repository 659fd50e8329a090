use chrono::{DateTime, Duration, Utc};

use crate::entities::JobRun;

/// 默认的活跃窗口（秒）
pub const DEFAULT_ELIGIBILITY_WINDOW_SECONDS: i64 = 900;

/// 选出需要发布单次运行指标的"当前"运行
///
/// 满足以下任一条件的运行入选:
/// - 尚未完成且状态为活跃
/// - 已完成且完成时间不早于 `now - window`（边界包含）
///
/// 未完成但状态不活跃的运行视为已废弃，不入选。
#[derive(Debug, Clone, Copy)]
pub struct EligibilityFilter {
    window: Duration,
}

impl Default for EligibilityFilter {
    fn default() -> Self {
        Self::new(DEFAULT_ELIGIBILITY_WINDOW_SECONDS)
    }
}

impl EligibilityFilter {
    pub fn new(window_seconds: i64) -> Self {
        Self {
            window: Duration::seconds(window_seconds),
        }
    }

    pub fn window_seconds(&self) -> i64 {
        self.window.num_seconds()
    }

    pub fn is_eligible(&self, run: &JobRun, now: DateTime<Utc>) -> bool {
        match run.completed_on {
            None => run.is_active(),
            Some(completed_on) => completed_on >= now - self.window,
        }
    }

    /// 保持输入顺序
    pub fn select<'a>(&self, runs: &'a [JobRun], now: DateTime<Utc>) -> Vec<&'a JobRun> {
        runs.iter()
            .filter(|run| self.is_eligible(run, now))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::JobRunState;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn run(id: &str, state: JobRunState, completed_secs_ago: Option<i64>) -> JobRun {
        JobRun {
            id: id.to_string(),
            state,
            started_on: now() - Duration::days(3),
            completed_on: completed_secs_ago.map(|secs| now() - Duration::seconds(secs)),
            execution_time: 60,
            error_message: None,
        }
    }

    #[test]
    fn test_running_without_completion_is_eligible_regardless_of_start() {
        let filter = EligibilityFilter::default();
        assert!(filter.is_eligible(&run("r", JobRunState::Running, None), now()));
    }

    #[test]
    fn test_completion_exactly_at_window_boundary_is_eligible() {
        let filter = EligibilityFilter::default();
        assert!(filter.is_eligible(&run("r", JobRunState::Succeeded, Some(900)), now()));
    }

    #[test]
    fn test_completion_just_outside_window_is_excluded() {
        let filter = EligibilityFilter::default();
        assert!(!filter.is_eligible(&run("r", JobRunState::Succeeded, Some(901)), now()));
    }

    #[test]
    fn test_inactive_without_completion_is_excluded() {
        let filter = EligibilityFilter::default();
        assert!(!filter.is_eligible(&run("r", JobRunState::Stopped, None), now()));
        assert!(!filter.is_eligible(
            &run("r", JobRunState::Unrecognized("PAUSED".to_string()), None),
            now()
        ));
    }

    #[test]
    fn test_active_states_without_completion() {
        let filter = EligibilityFilter::default();
        for state in [
            JobRunState::Starting,
            JobRunState::Running,
            JobRunState::Stopping,
            JobRunState::Waiting,
        ] {
            assert!(filter.is_eligible(&run("r", state.clone(), None), now()), "{state}");
        }
    }

    #[test]
    fn test_select_preserves_input_order() {
        let filter = EligibilityFilter::default();
        let runs = vec![
            run("a", JobRunState::Succeeded, Some(10)),
            run("b", JobRunState::Failed, Some(10_000)),
            run("c", JobRunState::Running, None),
            run("d", JobRunState::Stopped, None),
            run("e", JobRunState::Timeout, Some(899)),
        ];
        let selected: Vec<&str> = filter
            .select(&runs, now())
            .into_iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(selected, vec!["a", "c", "e"]);
    }

    #[test]
    fn test_custom_window() {
        let filter = EligibilityFilter::new(60);
        assert_eq!(filter.window_seconds(), 60);
        assert!(filter.is_eligible(&run("r", JobRunState::Succeeded, Some(60)), now()));
        assert!(!filter.is_eligible(&run("r", JobRunState::Succeeded, Some(61)), now()));
    }
}
