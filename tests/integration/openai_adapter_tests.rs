//! OpenAI Batch adapter against a local mock server

#[cfg(test)]
mod tests {
    use crate::common::fixtures::correlation_ids;
    use crate::common::requests;
    use crate::{assert_err, assert_ok};
    use litellm_batch::core::providers::openai::OpenAIConfig;
    use litellm_batch::{
        BatchError, BatchOrchestrator, BatchProviderAdapter, BatchStatus, OpenAIBatchAdapter,
        ProviderError, SubmitOptions, WaitOptions,
    };
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const API_KEY: &str = "sk-test";
    const BATCH_ID: &str = "batch_abc";

    fn adapter(server: &MockServer) -> OpenAIBatchAdapter {
        let config = OpenAIConfig::new(API_KEY)
            .with_api_base(format!("{}/v1", server.uri()))
            .with_organization("org-test")
            .with_default_model("gpt-test");
        assert_ok!(OpenAIBatchAdapter::new("openai", config))
    }

    fn batch_object(status: &str, completed: u32, failed: u32, total: u32) -> Value {
        json!({
            "id": BATCH_ID,
            "object": "batch",
            "endpoint": "/v1/chat/completions",
            "status": status,
            "input_file_id": "file-in",
            "output_file_id": null,
            "error_file_id": null,
            "completion_window": "24h",
            "created_at": 1711471533,
            "request_counts": {"total": total, "completed": completed, "failed": failed}
        })
    }

    fn finished_batch(output: Option<&str>, error: Option<&str>) -> Value {
        let mut batch = batch_object("completed", 2, 1, 3);
        batch["output_file_id"] = json!(output);
        batch["error_file_id"] = json!(error);
        batch
    }

    fn output_file() -> String {
        [
            json!({
                "id": "batch_req_1",
                "custom_id": "req-1",
                "response": {
                    "status_code": 200,
                    "request_id": "r1",
                    "body": {
                        "choices": [{"index": 0, "message": {"role": "assistant", "content": "four"}}],
                        "usage": {"prompt_tokens": 9, "completion_tokens": 1, "total_tokens": 10}
                    }
                },
                "error": null
            })
            .to_string(),
            json!({
                "id": "batch_req_2",
                "custom_id": "req-2",
                "response": {
                    "status_code": 400,
                    "request_id": "r2",
                    "body": {"error": {"message": "context length exceeded", "type": "invalid_request_error"}}
                },
                "error": null
            })
            .to_string(),
            String::new(),
            "garbage".to_string(),
        ]
        .join("\n")
    }

    fn error_file() -> String {
        json!({
            "id": "batch_req_3",
            "custom_id": "req-3",
            "response": null,
            "error": {"code": "batch_expired", "message": "request expired"}
        })
        .to_string()
    }

    async fn mount_submission(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/v1/files"))
            .and(header("authorization", format!("Bearer {}", API_KEY).as_str()))
            .and(body_string_contains("batch_input.jsonl"))
            .and(body_string_contains("\"custom_id\":\"req-1\""))
            .and(body_string_contains("gpt-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "file-in",
                "object": "file",
                "bytes": 512,
                "purpose": "batch"
            })))
            .expect(1)
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/batches"))
            .and(header("OpenAI-Organization", "org-test"))
            .and(body_partial_json(json!({
                "input_file_id": "file-in",
                "endpoint": "/v1/chat/completions",
                "completion_window": "24h"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(batch_object("validating", 0, 0, 0)))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_submit_uploads_then_creates() {
        let server = MockServer::start().await;
        mount_submission(&server).await;

        let job = assert_ok!(
            adapter(&server)
                .submit_batch(&requests(3), &SubmitOptions::default())
                .await
        );

        assert_eq!(job.provider_job_id, BATCH_ID);
        assert_eq!(job.status, BatchStatus::Submitted);
        assert_eq!(job.total_requests, 3);
        assert_eq!(job.provider_name, "openai");
    }

    #[tokio::test]
    async fn test_submit_records_tags_in_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "file-in"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/batches"))
            .and(body_partial_json(json!({
                "metadata": {"agent_name": "reviewer", "purpose": "triage"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(batch_object("validating", 0, 0, 0)))
            .expect(1)
            .mount(&server)
            .await;

        let options = SubmitOptions::default()
            .with_agent_name("reviewer")
            .with_purpose("triage");
        assert_ok!(adapter(&server).submit_batch(&requests(1), &options).await);
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let cases = [
            ("validating", BatchStatus::Submitted),
            ("in_progress", BatchStatus::InProgress),
            ("finalizing", BatchStatus::InProgress),
            ("completed", BatchStatus::Completed),
            ("failed", BatchStatus::Failed),
            ("expired", BatchStatus::Expired),
            ("cancelling", BatchStatus::Cancelling),
            ("cancelled", BatchStatus::Cancelled),
            ("paused", BatchStatus::InProgress),
        ];

        for (status, expected) in cases {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path(format!("/v1/batches/{}", BATCH_ID)))
                .respond_with(ResponseTemplate::new(200).set_body_json(batch_object(status, 1, 1, 3)))
                .expect(1)
                .mount(&server)
                .await;

            let job = assert_ok!(adapter(&server).get_batch_status(BATCH_ID).await);
            assert_eq!(job.status, expected, "{status}");
            assert_eq!(job.total_requests, 3);
            assert_eq!(job.completed_requests, 1);
            assert_eq!(job.failed_requests, 1);
        }
    }

    #[tokio::test]
    async fn test_results_merge_output_and_error_files() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/v1/batches/{}", BATCH_ID)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(finished_batch(Some("file-out"), Some("file-err"))),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/files/file-out/content"))
            .respond_with(ResponseTemplate::new(200).set_body_string(output_file()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/files/file-err/content"))
            .respond_with(ResponseTemplate::new(200).set_body_string(error_file()))
            .expect(1)
            .mount(&server)
            .await;

        let results = assert_ok!(adapter(&server).get_batch_results(BATCH_ID).await);

        assert_eq!(correlation_ids(&results), vec!["req-1", "req-2", "req-3"]);
        let by_id = |id: &str| {
            results
                .iter()
                .find(|r| r.correlation_id == id)
                .cloned()
                .expect("result present")
        };

        let ok = by_id("req-1");
        assert!(ok.success);
        assert_eq!(ok.content.as_deref(), Some("four"));
        assert_eq!(ok.usage.map(|u| (u.input_tokens, u.output_tokens)), Some((9, 1)));

        let rejected = by_id("req-2");
        assert!(!rejected.success);
        assert_eq!(rejected.error.as_deref(), Some("context length exceeded"));

        let expired = by_id("req-3");
        assert!(!expired.success);
        assert_eq!(expired.error.as_deref(), Some("batch_expired: request expired"));
    }

    #[tokio::test]
    async fn test_results_with_only_error_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/v1/batches/{}", BATCH_ID)))
            .respond_with(ResponseTemplate::new(200).set_body_json(finished_batch(None, Some("file-err"))))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/files/file-err/content"))
            .respond_with(ResponseTemplate::new(200).set_body_string(error_file()))
            .expect(1)
            .mount(&server)
            .await;

        let results = assert_ok!(adapter(&server).get_batch_results(BATCH_ID).await);
        assert_eq!(results.len(), 1);
        assert!(!results[0].success);
    }

    #[tokio::test]
    async fn test_results_without_files_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/v1/batches/{}", BATCH_ID)))
            .respond_with(ResponseTemplate::new(200).set_body_json(finished_batch(None, None)))
            .mount(&server)
            .await;

        let err = assert_err!(adapter(&server).get_batch_results(BATCH_ID).await);
        assert!(err.to_string().contains("no output or error file"));
    }

    #[tokio::test]
    async fn test_cancel() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/v1/batches/{}/cancel", BATCH_ID)))
            .respond_with(ResponseTemplate::new(200).set_body_json(batch_object("cancelling", 0, 0, 3)))
            .expect(1)
            .mount(&server)
            .await;

        assert_ok!(adapter(&server).cancel_batch(BATCH_ID).await);
    }

    #[tokio::test]
    async fn test_http_errors_are_classified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/batches/batch_missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"message": "No batch found with id 'batch_missing'.", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/files"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/batches"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let adapter = adapter(&server);
        let err = assert_err!(adapter.get_batch_status("batch_missing").await);
        assert!(matches!(err, ProviderError::NotFound { .. }));

        let err = assert_err!(
            adapter
                .submit_batch(&requests(1), &SubmitOptions::default())
                .await
        );
        assert!(matches!(err, ProviderError::Authentication { .. }));
        assert!(err.to_string().contains("Incorrect API key"));
    }

    #[tokio::test]
    async fn test_submit_and_wait_end_to_end() {
        let server = MockServer::start().await;
        mount_submission(&server).await;
        Mock::given(method("GET"))
            .and(path(format!("/v1/batches/{}", BATCH_ID)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(finished_batch(Some("file-out"), Some("file-err"))),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/files/file-out/content"))
            .respond_with(ResponseTemplate::new(200).set_body_string(output_file()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/files/file-err/content"))
            .respond_with(ResponseTemplate::new(200).set_body_string(error_file()))
            .mount(&server)
            .await;

        let orchestrator = BatchOrchestrator::new();
        orchestrator.register_provider(Arc::new(adapter(&server)));
        let options = WaitOptions::default()
            .with_provider("openai")
            .with_poll_interval(Duration::from_millis(10))
            .with_timeout(Duration::from_secs(10));

        let results = assert_ok!(orchestrator.submit_and_wait(&requests(3), &options).await);
        assert_eq!(results.len(), 3);
        assert_eq!(results.iter().filter(|r| r.success).count(), 1);
    }

    #[tokio::test]
    async fn test_failed_job_through_orchestrator() {
        let server = MockServer::start().await;
        mount_submission(&server).await;
        Mock::given(method("GET"))
            .and(path(format!("/v1/batches/{}", BATCH_ID)))
            .respond_with(ResponseTemplate::new(200).set_body_json(batch_object("failed", 0, 3, 3)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/files/file-out/content"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let orchestrator = BatchOrchestrator::new();
        orchestrator.register_provider(Arc::new(adapter(&server)));
        let options = WaitOptions::default().with_poll_interval(Duration::from_millis(10));

        let err = assert_err!(orchestrator.submit_and_wait(&requests(3), &options).await);
        assert!(matches!(err, BatchError::JobFailed { failed: 3, total: 3, .. }));
    }
}
