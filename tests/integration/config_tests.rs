//! Configuration files through to a working orchestrator

#[cfg(test)]
mod tests {
    use crate::common::fixtures::correlation_ids;
    use crate::common::{requests, results_for};
    use crate::{assert_err, assert_ok};
    use litellm_batch::utils::jsonl;
    use litellm_batch::{BatchConfig, BatchOrchestrator, BatchStatus, RunnerError};
    use serde_json::json;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_orchestrator_from_file_uses_default_provider_first() {
        let file = write_config(
            r#"
default_provider: backup
providers:
  - name: primary
    kind: anthropic
    api_key: sk-ant-primary
  - name: backup
    kind: openai
    api_key: sk-backup
  - name: retired
    kind: openai
    api_key: sk-retired
    enabled: false
polling:
  poll_interval_ms: 500
  max_poll_interval_ms: 4000
  timeout_ms: 60000
"#,
        );

        let config = assert_ok!(BatchConfig::from_file(file.path()).await);
        let orchestrator = assert_ok!(BatchOrchestrator::from_config(&config));

        assert_eq!(orchestrator.providers(), vec!["backup", "primary"]);
        assert!(orchestrator.is_available(Some("primary")).await);
        assert!(!orchestrator.is_available(Some("retired")).await);

        let wait = config.wait_options();
        assert_eq!(wait.poll_interval, Duration::from_millis(500));
        assert_eq!(wait.max_poll_interval, Duration::from_millis(4000));
        assert_eq!(wait.timeout, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_api_key_placeholders_resolve_from_environment() {
        // SAFETY: variable name is unique to this test
        unsafe { std::env::set_var("LITELLM_BATCH_CONFIG_TEST_KEY", "sk-from-env") };

        let file = write_config(
            r#"
providers:
  - name: resolved
    kind: openai
    api_key: ${LITELLM_BATCH_CONFIG_TEST_KEY}
  - name: unresolved
    kind: anthropic
    api_key: ${LITELLM_BATCH_CONFIG_TEST_MISSING}
"#,
        );

        let config = assert_ok!(BatchConfig::from_file(file.path()).await);
        assert_eq!(
            config.provider("resolved").and_then(|p| p.resolved_api_key()),
            Some("sk-from-env".to_string())
        );

        let orchestrator = assert_ok!(BatchOrchestrator::from_config(&config));
        assert!(orchestrator.is_available(Some("resolved")).await);
        assert!(!orchestrator.is_available(Some("unresolved")).await);
    }

    #[tokio::test]
    async fn test_invalid_configuration_is_rejected() {
        let duplicate = write_config(
            r#"
providers:
  - name: same
    kind: openai
  - name: same
    kind: anthropic
"#,
        );
        let err = assert_err!(BatchConfig::from_file(duplicate.path()).await);
        assert!(matches!(err, RunnerError::Config(_)));

        let missing_default = write_config(
            r#"
default_provider: nowhere
providers:
  - name: gpt
    kind: openai
"#,
        );
        let err = assert_err!(BatchConfig::from_file(missing_default.path()).await);
        assert!(err.to_string().contains("nowhere"));

        let unknown_kind = write_config(
            r#"
providers:
  - name: gem
    kind: gemini
"#,
        );
        assert!(BatchConfig::from_file(unknown_kind.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_configured_base_url_reaches_provider() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/batches/batch_cfg"))
            .and(header("authorization", "Bearer sk-cfg"))
            .and(header("x-team", "batch"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "batch_cfg",
                "status": "in_progress",
                "request_counts": {"total": 4, "completed": 2, "failed": 0}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let file = write_config(&format!(
            r#"
providers:
  - name: gpt
    kind: openai
    api_key: sk-cfg
    base_url: {}/v1
    headers:
      x-team: batch
"#,
            server.uri()
        ));

        let config = assert_ok!(BatchConfig::from_file(file.path()).await);
        let orchestrator = assert_ok!(BatchOrchestrator::from_config(&config));
        let job = assert_ok!(orchestrator.get_batch_status("batch_cfg", Some("gpt")).await);

        assert_eq!(job.status, BatchStatus::InProgress);
        assert_eq!(job.completed_requests, 2);
        assert_eq!(job.total_requests, 4);
    }

    #[tokio::test]
    async fn test_request_and_result_files() {
        let input = write_config(
            "{\"correlationId\":\"req-1\",\"userPrompt\":\"prompt 1\"}\n\n\
             {\"correlationId\":\"req-2\",\"userPrompt\":\"prompt 2\",\"maxTokens\":16}\n",
        );
        let parsed = assert_ok!(jsonl::read_requests(input.path()).await);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].max_tokens, Some(16));

        let output = NamedTempFile::new().unwrap();
        let results = results_for(&requests(2));
        assert_ok!(jsonl::write_results(output.path(), &results).await);

        let written = std::fs::read_to_string(output.path()).unwrap();
        let lines: Vec<serde_json::Value> = written
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["correlationId"], "req-1");
        assert_eq!(lines[0]["success"], true);
        assert_eq!(correlation_ids(&results), vec!["req-1", "req-2"]);

        let broken = write_config("{\"correlationId\":\"req-1\",\"userPrompt\":\"ok\"}\nnot json\n");
        let err = assert_err!(jsonl::read_requests(broken.path()).await);
        assert!(matches!(err, RunnerError::InvalidInput { line: 2, .. }));
    }
}
