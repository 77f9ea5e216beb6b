//! # OCR Client Tests
//!
//! Exercises the provider client against a mock HTTP server: the
//! submit-then-poll flow, failure statuses, the bounded poll budget, and
//! malformed provider responses.

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use nutrition_wallet::config::OcrConfig;
    use nutrition_wallet::ocr_client::OcrClient;
    use nutrition_wallet::ocr_errors::OcrError;
    use serde_json::json;

    const ANALYZE_PATH: &str = "/vision/v3.2/read/analyze";
    const OPERATION_PATH: &str = "/vision/v3.2/read/analyzeResults/abc123";

    /// Config with near-instant polling so tests stay fast
    fn fast_config() -> OcrConfig {
        OcrConfig {
            max_poll_attempts: 3,
            poll_interval_ms: 1,
            poll_jitter_ms: 0,
            ..OcrConfig::default()
        }
    }

    async fn mock_submit(server: &MockServer) -> httpmock::Mock<'_> {
        let operation_url = format!("{}{}", server.base_url(), OPERATION_PATH);
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(ANALYZE_PATH)
                    .header("Ocp-Apim-Subscription-Key", "test-key");
                then.status(202).header("operation-location", &operation_url);
            })
            .await
    }

    #[tokio::test]
    async fn test_successful_extraction_joins_lines() {
        let server = MockServer::start_async().await;
        let submit = mock_submit(&server).await;

        let poll = server
            .mock_async(|when, then| {
                when.method(GET).path(OPERATION_PATH);
                then.status(200).json_body(json!({
                    "status": "succeeded",
                    "analyzeResult": {
                        "readResults": [
                            { "lines": [
                                { "text": "Nutrition Facts" },
                                { "text": "Calories 120" },
                                { "text": "Protein 3g" }
                            ]}
                        ]
                    }
                }));
            })
            .await;

        let client = OcrClient::new(&server.base_url(), "test-key", fast_config());
        let text = client.extract_text(vec![0xFF, 0xD8]).await.unwrap();

        assert_eq!(text, "Nutrition Facts\nCalories 120\nProtein 3g");
        submit.assert_async().await;
        poll.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_operation_is_reported_as_failure() {
        let server = MockServer::start_async().await;
        mock_submit(&server).await;

        server
            .mock_async(|when, then| {
                when.method(GET).path(OPERATION_PATH);
                then.status(200).json_body(json!({ "status": "failed" }));
            })
            .await;

        let client = OcrClient::new(&server.base_url(), "test-key", fast_config());
        let result = client.extract_text(vec![1, 2, 3]).await;

        assert!(matches!(result, Err(OcrError::Failed(_))));
    }

    #[tokio::test]
    async fn test_pending_operation_times_out_after_attempt_budget() {
        let server = MockServer::start_async().await;
        mock_submit(&server).await;

        let poll = server
            .mock_async(|when, then| {
                when.method(GET).path(OPERATION_PATH);
                then.status(200).json_body(json!({ "status": "running" }));
            })
            .await;

        let client = OcrClient::new(&server.base_url(), "test-key", fast_config());
        let result = client.extract_text(vec![1, 2, 3]).await;

        assert!(matches!(result, Err(OcrError::Timeout(_))));
        // One status request per configured attempt, no more
        poll.assert_hits_async(3).await;
    }

    #[tokio::test]
    async fn test_missing_operation_location_is_submit_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(ANALYZE_PATH);
                then.status(202);
            })
            .await;

        let client = OcrClient::new(&server.base_url(), "test-key", fast_config());
        let result = client.extract_text(vec![1, 2, 3]).await;

        assert!(matches!(result, Err(OcrError::Submit(_))));
    }

    #[tokio::test]
    async fn test_submit_rejection_is_submit_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(ANALYZE_PATH);
                then.status(401);
            })
            .await;

        let client = OcrClient::new(&server.base_url(), "test-key", fast_config());
        let result = client.extract_text(vec![1, 2, 3]).await;

        assert!(matches!(result, Err(OcrError::Submit(_))));
    }

    #[tokio::test]
    async fn test_succeeded_without_result_yields_empty_text() {
        let server = MockServer::start_async().await;
        mock_submit(&server).await;

        server
            .mock_async(|when, then| {
                when.method(GET).path(OPERATION_PATH);
                then.status(200).json_body(json!({ "status": "succeeded" }));
            })
            .await;

        let client = OcrClient::new(&server.base_url(), "test-key", fast_config());
        let text = client.extract_text(vec![1, 2, 3]).await.unwrap();

        assert_eq!(text, "");
    }
}
