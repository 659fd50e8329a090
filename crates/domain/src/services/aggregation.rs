use chrono::{DateTime, Utc};

use crate::entities::{JobRun, RunHistory};
use crate::value_objects::{MetricName, MetricSet, MetricUnit};
use etl_metrics_errors::MetricsResult;

/// 作业级聚合结果
#[derive(Debug, Clone, PartialEq)]
pub struct JobAggregate {
    pub job_name: String,
    pub metrics: MetricSet,
    /// 最近一次运行的错误信息，作为作业级批次的 Error Message 维度
    pub latest_error_message: Option<String>,
}

/// 运行历史聚合器，无状态
#[derive(Debug, Clone, Copy, Default)]
pub struct RunAggregator;

impl RunAggregator {
    pub fn new() -> Self {
        Self
    }

    /// 计算作业级指标
    ///
    /// 运行历史为空时只产生 Execution Count = 0，不产生平均时长和最近运行指标。
    pub fn aggregate_job(&self, history: &RunHistory) -> MetricsResult<JobAggregate> {
        let mut metrics = MetricSet::new();
        let runs = history.runs();

        metrics.push(
            MetricName::ExecutionCount,
            runs.len() as f64,
            MetricUnit::Count,
        )?;

        let Some(latest) = history.latest() else {
            return Ok(JobAggregate {
                job_name: history.job_name().to_string(),
                metrics,
                latest_error_message: None,
            });
        };

        if let Some(average) = Self::average_execution_time(runs) {
            metrics.push(
                MetricName::AverageExecutionDuration,
                average as f64,
                MetricUnit::Seconds,
            )?;
        }

        metrics.push(
            MetricName::LatestRunState,
            latest.state.code() as f64,
            MetricUnit::None,
        )?;
        metrics.push(
            MetricName::LatestRunExecutionDuration,
            latest.execution_time as f64,
            MetricUnit::Seconds,
        )?;
        metrics.push(
            MetricName::LatestRunStartTime,
            epoch_seconds(latest.started_on),
            MetricUnit::Seconds,
        )?;
        if let Some(completed_on) = latest.completed_on {
            metrics.push(
                MetricName::LatestRunCompletionTime,
                epoch_seconds(completed_on),
                MetricUnit::Seconds,
            )?;
        }
        metrics.push(
            MetricName::LatestRunErrorState,
            error_state(latest),
            MetricUnit::None,
        )?;

        Ok(JobAggregate {
            job_name: history.job_name().to_string(),
            metrics,
            latest_error_message: latest.error_message.clone(),
        })
    }

    /// 计算单次运行的指标
    pub fn aggregate_run(&self, run: &JobRun) -> MetricsResult<MetricSet> {
        let mut metrics = MetricSet::new();

        metrics.push(
            MetricName::CurrentRunState,
            run.state.code() as f64,
            MetricUnit::None,
        )?;
        metrics.push(
            MetricName::RunStartTime,
            epoch_seconds(run.started_on),
            MetricUnit::Seconds,
        )?;
        if let Some(completed_on) = run.completed_on {
            metrics.push(
                MetricName::RunCompletionTime,
                epoch_seconds(completed_on),
                MetricUnit::Seconds,
            )?;
        }
        metrics.push(
            MetricName::RunExecutionDuration,
            run.execution_time as f64,
            MetricUnit::Seconds,
        )?;
        metrics.push(MetricName::RunErrorState, error_state(run), MetricUnit::None)?;

        Ok(metrics)
    }

    /// 平均执行时长，整数除法向零截断；没有运行记录时返回 None
    pub fn average_execution_time(runs: &[JobRun]) -> Option<i64> {
        if runs.is_empty() {
            return None;
        }
        let total: i64 = runs.iter().map(|run| run.execution_time).sum();
        Some(total / runs.len() as i64)
    }
}

fn error_state(run: &JobRun) -> f64 {
    if run.has_error() {
        1.0
    } else {
        0.0
    }
}

fn epoch_seconds(at: DateTime<Utc>) -> f64 {
    at.timestamp() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::JobRunState;
    use chrono::{Duration, TimeZone};

    fn run_with_duration(id: &str, started_secs_ago: i64, execution_time: i64) -> JobRun {
        JobRun {
            id: id.to_string(),
            state: JobRunState::Succeeded,
            started_on: Utc::now() - Duration::seconds(started_secs_ago),
            completed_on: None,
            execution_time,
            error_message: None,
        }
    }

    #[test]
    fn test_average_uses_truncating_integer_division() {
        let runs = vec![
            run_with_duration("a", 10, 10),
            run_with_duration("b", 20, 15),
            run_with_duration("c", 30, 20),
        ];
        assert_eq!(RunAggregator::average_execution_time(&runs), Some(15));

        let runs = vec![run_with_duration("a", 10, 10), run_with_duration("b", 20, 11)];
        assert_eq!(RunAggregator::average_execution_time(&runs), Some(10));
    }

    #[test]
    fn test_average_of_empty_history_is_none() {
        assert_eq!(RunAggregator::average_execution_time(&[]), None);
    }

    #[test]
    fn test_empty_history_produces_only_execution_count() {
        let history = RunHistory::new("empty-job", Vec::new());
        let aggregate = RunAggregator::new().aggregate_job(&history).unwrap();

        assert_eq!(aggregate.metrics.names(), vec![MetricName::ExecutionCount]);
        assert_eq!(aggregate.metrics.value_of(MetricName::ExecutionCount), Some(0.0));
        assert_eq!(aggregate.latest_error_message, None);
    }

    #[test]
    fn test_latest_run_snapshot() {
        let started_on = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let completed_on = Utc.with_ymd_and_hms(2024, 5, 1, 10, 5, 0).unwrap();
        let latest = JobRun {
            id: "jr_latest".to_string(),
            state: JobRunState::Failed,
            started_on,
            completed_on: Some(completed_on),
            execution_time: 300,
            error_message: Some("OOM".to_string()),
        };
        let older = JobRun {
            id: "jr_older".to_string(),
            state: JobRunState::Succeeded,
            started_on: started_on - Duration::hours(1),
            completed_on: Some(started_on - Duration::minutes(50)),
            execution_time: 100,
            error_message: None,
        };
        let history = RunHistory::new("nightly", vec![latest, older]);
        let aggregate = RunAggregator::new().aggregate_job(&history).unwrap();
        let metrics = &aggregate.metrics;

        assert_eq!(metrics.value_of(MetricName::ExecutionCount), Some(2.0));
        assert_eq!(metrics.value_of(MetricName::AverageExecutionDuration), Some(200.0));
        assert_eq!(metrics.value_of(MetricName::LatestRunState), Some(5.0));
        assert_eq!(metrics.value_of(MetricName::LatestRunExecutionDuration), Some(300.0));
        assert_eq!(
            metrics.value_of(MetricName::LatestRunStartTime),
            Some(started_on.timestamp() as f64)
        );
        assert_eq!(
            metrics.value_of(MetricName::LatestRunCompletionTime),
            Some(completed_on.timestamp() as f64)
        );
        assert_eq!(metrics.value_of(MetricName::LatestRunErrorState), Some(1.0));
        assert_eq!(aggregate.latest_error_message.as_deref(), Some("OOM"));

        assert_eq!(
            metrics.get(MetricName::ExecutionCount).map(|e| e.unit),
            Some(MetricUnit::Count)
        );
        assert_eq!(
            metrics.get(MetricName::AverageExecutionDuration).map(|e| e.unit),
            Some(MetricUnit::Seconds)
        );
        assert_eq!(
            metrics.get(MetricName::LatestRunState).map(|e| e.unit),
            Some(MetricUnit::None)
        );
    }

    #[test]
    fn test_running_latest_run_has_no_completion_metric() {
        let mut running = run_with_duration("jr_running", 5, 42);
        running.state = JobRunState::Running;
        let history = RunHistory::new("streaming", vec![running]);
        let aggregate = RunAggregator::new().aggregate_job(&history).unwrap();

        assert!(!aggregate.metrics.contains(MetricName::LatestRunCompletionTime));
        assert_eq!(aggregate.metrics.value_of(MetricName::LatestRunState), Some(1.0));
        assert_eq!(aggregate.metrics.value_of(MetricName::LatestRunErrorState), Some(0.0));
        assert_eq!(aggregate.metrics.len(), 6);
    }

    #[test]
    fn test_unknown_latest_state_reports_minus_one() {
        let mut odd = run_with_duration("jr_odd", 5, 1);
        odd.state = JobRunState::Unrecognized("PAUSED".to_string());
        let history = RunHistory::new("odd", vec![odd]);
        let aggregate = RunAggregator::new().aggregate_job(&history).unwrap();
        assert_eq!(aggregate.metrics.value_of(MetricName::LatestRunState), Some(-1.0));
    }

    #[test]
    fn test_run_metrics() {
        let started_on = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let completed_run = JobRun {
            id: "jr_1".to_string(),
            state: JobRunState::Succeeded,
            started_on,
            completed_on: Some(started_on + Duration::seconds(90)),
            execution_time: 90,
            error_message: None,
        };
        let metrics = RunAggregator::new().aggregate_run(&completed_run).unwrap();
        assert_eq!(
            metrics.names(),
            vec![
                MetricName::CurrentRunState,
                MetricName::RunStartTime,
                MetricName::RunCompletionTime,
                MetricName::RunExecutionDuration,
                MetricName::RunErrorState,
            ]
        );
        assert_eq!(metrics.value_of(MetricName::CurrentRunState), Some(4.0));
        assert_eq!(metrics.value_of(MetricName::RunExecutionDuration), Some(90.0));
        assert_eq!(metrics.value_of(MetricName::RunErrorState), Some(0.0));

        let mut running = completed_run.clone();
        running.state = JobRunState::Waiting;
        running.completed_on = None;
        running.error_message = Some("retrying".to_string());
        let metrics = RunAggregator::new().aggregate_run(&running).unwrap();
        assert!(!metrics.contains(MetricName::RunCompletionTime));
        assert_eq!(metrics.value_of(MetricName::CurrentRunState), Some(8.0));
        assert_eq!(metrics.value_of(MetricName::RunErrorState), Some(1.0));
    }
}
