use crate::config::FileConfig;
use crate::domain::model::{StepLog, SuiteReport};
use crate::domain::ports::SmokeSuite;
use crate::suites::{ElasticSuite, MongoSuite, PostgresSuite, RedisSuite};
use crate::utils::error::Result;
use std::collections::HashMap;
use std::time::Instant;

/// Suite 序列執行器：依註冊順序逐一執行，遇到錯誤立即中止
pub struct SuiteRunner {
    suites: Vec<Box<dyn SmokeSuite>>,
    execution_id: String,
}

impl SuiteRunner {
    pub fn new(execution_id: String) -> Self {
        Self {
            suites: Vec::new(),
            execution_id,
        }
    }

    pub fn add_suite(&mut self, suite: Box<dyn SmokeSuite>) {
        self.suites.push(suite);
    }

    pub fn suites(&self) -> &[Box<dyn SmokeSuite>] {
        &self.suites
    }

    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    pub async fn execute_all(&self) -> Result<Vec<SuiteReport>> {
        tracing::info!(
            "🎬 Starting smoke run {} ({} suites)",
            self.execution_id,
            self.suites.len()
        );

        let mut reports = Vec::with_capacity(self.suites.len());

        for suite in &self.suites {
            tracing::info!("🚀 Running {} suite", suite.name());
            let started = Instant::now();

            let mut log = StepLog::new();
            suite.run(&mut log).await?;

            let report = SuiteReport {
                suite_name: suite.name().to_string(),
                steps: log.into_steps(),
                duration: started.elapsed(),
            };
            tracing::info!(
                "✅ {} suite finished: {} operations in {:.2}s",
                report.suite_name,
                report.steps.len(),
                report.duration.as_secs_f64()
            );
            reports.push(report);
        }

        Ok(reports)
    }

    pub fn get_execution_summary(results: &[SuiteReport]) -> HashMap<String, serde_json::Value> {
        let mut summary = HashMap::new();

        summary.insert(
            "total_suites".to_string(),
            serde_json::Value::Number(results.len().into()),
        );
        summary.insert(
            "total_steps".to_string(),
            serde_json::Value::Number(
                results
                    .iter()
                    .map(|r| r.steps.len())
                    .sum::<usize>()
                    .into(),
            ),
        );
        summary.insert(
            "total_duration_ms".to_string(),
            serde_json::Value::Number(
                results
                    .iter()
                    .map(|r| r.duration.as_millis() as u64)
                    .sum::<u64>()
                    .into(),
            ),
        );
        summary.insert(
            "executed_suites".to_string(),
            serde_json::Value::Array(
                results
                    .iter()
                    .map(|r| serde_json::Value::String(r.suite_name.clone()))
                    .collect(),
            ),
        );

        summary
    }
}

/// Builds the enabled suites in the fixed walkthrough order, honoring
/// `--only` / `--skip` selections.
pub fn build_suites(config: &FileConfig, only: &[String], skip: &[String]) -> Vec<Box<dyn SmokeSuite>> {
    let mut suites: Vec<Box<dyn SmokeSuite>> = Vec::new();

    if selected("search", config.search.enabled, only, skip) {
        suites.push(Box::new(ElasticSuite::new(config)));
    }
    if selected("document", config.document.enabled, only, skip) {
        suites.push(Box::new(MongoSuite::new(config)));
    }
    if selected("relational", config.relational.enabled, only, skip) {
        suites.push(Box::new(PostgresSuite::new(config)));
    }
    if selected("keyvalue", config.keyvalue.enabled, only, skip) {
        suites.push(Box::new(RedisSuite::new(config)));
    }

    suites
}

fn selected(name: &str, enabled: bool, only: &[String], skip: &[String]) -> bool {
    if !enabled {
        tracing::info!("⏸️ Suite '{}' disabled in config", name);
        return false;
    }
    if !only.is_empty() && !only.iter().any(|o| o == name) {
        return false;
    }
    if skip.iter().any(|s| s == name) {
        tracing::info!("⏭️ Skipping suite '{}'", name);
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::SmokeError;
    use async_trait::async_trait;

    struct MockSuite {
        name: String,
        steps: Vec<&'static str>,
        fail: bool,
    }

    impl MockSuite {
        fn new(name: &str, steps: Vec<&'static str>) -> Self {
            Self {
                name: name.to_string(),
                steps,
                fail: false,
            }
        }

        fn failing(name: &str) -> Self {
            Self {
                name: name.to_string(),
                steps: vec![],
                fail: true,
            }
        }
    }

    #[async_trait]
    impl SmokeSuite for MockSuite {
        fn name(&self) -> &str {
            &self.name
        }

        fn operations(&self) -> Vec<&'static str> {
            self.steps.clone()
        }

        async fn run(&self, log: &mut StepLog) -> Result<()> {
            if self.fail {
                return Err(SmokeError::UnexpectedResponseError {
                    store: self.name.clone(),
                    message: "mock failure".to_string(),
                });
            }
            for step in &self.steps {
                log.record(step, "ok");
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_execute_all_preserves_order() {
        let mut runner = SuiteRunner::new("test-run".to_string());
        runner.add_suite(Box::new(MockSuite::new("first", vec!["connect", "get"])));
        runner.add_suite(Box::new(MockSuite::new("second", vec!["connect"])));

        let reports = runner.execute_all().await.unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].suite_name, "first");
        assert_eq!(reports[0].steps.len(), 2);
        assert_eq!(reports[1].suite_name, "second");
        assert_eq!(reports[1].steps.len(), 1);
    }

    #[tokio::test]
    async fn test_execute_all_stops_at_first_failure() {
        let mut runner = SuiteRunner::new("test-run".to_string());
        runner.add_suite(Box::new(MockSuite::failing("broken")));
        runner.add_suite(Box::new(MockSuite::new("never-run", vec!["connect"])));

        let err = runner.execute_all().await.unwrap_err();
        assert!(matches!(err, SmokeError::UnexpectedResponseError { .. }));
    }

    #[tokio::test]
    async fn test_execution_summary_totals() {
        let mut runner = SuiteRunner::new("test-run".to_string());
        runner.add_suite(Box::new(MockSuite::new("a", vec!["one", "two", "three"])));
        runner.add_suite(Box::new(MockSuite::new("b", vec!["one"])));

        let reports = runner.execute_all().await.unwrap();
        let summary = SuiteRunner::get_execution_summary(&reports);

        assert_eq!(summary["total_suites"], serde_json::Value::Number(2.into()));
        assert_eq!(summary["total_steps"], serde_json::Value::Number(4.into()));
        let executed = summary["executed_suites"].as_array().unwrap();
        assert_eq!(executed[0], "a");
        assert_eq!(executed[1], "b");
    }

    #[test]
    fn test_build_suites_selection() {
        let config = FileConfig::default();

        let all = build_suites(&config, &[], &[]);
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].name(), "search");
        assert_eq!(all[3].name(), "keyvalue");

        let only = build_suites(&config, &["relational".to_string()], &[]);
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].name(), "relational");

        let skipped = build_suites(&config, &[], &["document".to_string()]);
        assert_eq!(skipped.len(), 3);
        assert!(skipped.iter().all(|s| s.name() != "document"));
    }

    #[test]
    fn test_build_suites_respects_enabled_flag() {
        let mut config = FileConfig::default();
        config.search.enabled = false;

        let suites = build_suites(&config, &[], &[]);
        assert_eq!(suites.len(), 3);
        assert!(suites.iter().all(|s| s.name() != "search"));
    }
}
