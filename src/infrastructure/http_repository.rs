// Upstream variables API repository implementation
use crate::application::variable_repository::{FetchError, VariableRepository};
use crate::domain::variable::VariableRecord;
use crate::infrastructure::config::UpstreamSettings;
use crate::infrastructure::retry::{retry_with_delay, RetryConfig};
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpVariableRepository {
    client: reqwest::Client,
    base_url: String,
    retry: RetryConfig,
}

impl HttpVariableRepository {
    pub fn new(settings: &UpstreamSettings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            retry: RetryConfig {
                max_attempts: settings.retry_attempts.max(1),
                ..RetryConfig::default()
            },
        })
    }

    async fn fetch_records(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<VariableRecord>, FetchError> {
        let url = format!("{}{}", self.base_url, path);

        retry_with_delay(&self.retry, path, || async {
            let mut request = self.client.get(&url);
            if !query.is_empty() {
                request = request.query(query);
            }
            let response = request
                .send()
                .await
                .map_err(|e| FetchError::Transport(format!("request to {} failed: {}", path, e)))?;

            if !response.status().is_success() {
                return Err(FetchError::Transport(format!(
                    "upstream returned {} for {}",
                    response.status(),
                    path
                )));
            }

            response.json::<Vec<VariableRecord>>().await.map_err(|e| {
                FetchError::Transport(format!("failed to decode {} response: {}", path, e))
            })
        })
        .await
    }
}

/// Widen date-only bounds to full date-times and reject missing bounds
/// before any request is issued.
pub(crate) fn normalize_range_bounds(
    start: &str,
    end: &str,
) -> Result<(String, String), FetchError> {
    if start.trim().is_empty() || end.trim().is_empty() {
        return Err(FetchError::Validation(
            "both start and end dates are required".to_string(),
        ));
    }
    let start = if start.contains('T') {
        start.to_string()
    } else {
        format!("{start}T00:00:00")
    };
    let end = if end.contains('T') {
        end.to_string()
    } else {
        format!("{end}T23:59:59")
    };
    Ok((start, end))
}

#[async_trait]
impl VariableRepository for HttpVariableRepository {
    async fn fetch_all(&self) -> Result<Vec<VariableRecord>, FetchError> {
        self.fetch_records("/variables", &[]).await
    }

    async fn fetch_by_module(&self, module: &str) -> Result<Vec<VariableRecord>, FetchError> {
        let path = format!("/variables/module/{}", urlencoding::encode(module));
        self.fetch_records(&path, &[]).await
    }

    async fn fetch_by_date_range(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<VariableRecord>, FetchError> {
        let (start, end) = normalize_range_bounds(start, end)?;
        self.fetch_records(
            "/variables/date-range",
            &[("start_date", start.as_str()), ("end_date", end.as_str())],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::variable::{DataType, RawValue};
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn repository(base_url: String) -> HttpVariableRepository {
        HttpVariableRepository::new(&UpstreamSettings {
            base_url,
            timeout_secs: 5,
            retry_attempts: 2,
        })
        .unwrap()
    }

    fn sample_body() -> serde_json::Value {
        json!([
            {
                "id": 1,
                "address": "%I0.0",
                "symbol": "Motor_Run",
                "comment": "main drive",
                "data_type": "BOOL",
                "value": "True",
                "module": "DI16xDC24V",
                "timestamp": "2025-01-15T10:30:00"
            },
            {
                "address": "%IW64",
                "symbol": "Tank_Level",
                "data_type": "WORD",
                "value": "512",
                "module": "AI8x13Bit",
                "timestamp": "2025-01-15T10:30:05"
            }
        ])
    }

    #[tokio::test]
    async fn fetch_all_decodes_record_array() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/variables"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .mount(&server)
            .await;

        let records = repository(server.uri()).fetch_all().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].data_type, DataType::Bool);
        assert_eq!(records[0].projection(), 1.0);
        assert_eq!(records[1].value, RawValue::Text("512".to_string()));
    }

    #[tokio::test]
    async fn fetch_by_module_hits_module_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/variables/module/AI8x13Bit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let records = repository(server.uri())
            .fetch_by_module("AI8x13Bit")
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn date_range_widens_date_only_bounds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/variables/date-range"))
            .and(query_param("start_date", "2025-01-01T00:00:00"))
            .and(query_param("end_date", "2025-01-31T23:59:59"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        repository(server.uri())
            .fetch_by_date_range("2025-01-01", "2025-01-31")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn missing_bound_fails_without_a_request() {
        let server = MockServer::start().await;

        let error = repository(server.uri())
            .fetch_by_date_range("2025-01-01", "")
            .await
            .unwrap_err();
        assert!(matches!(error, FetchError::Validation(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn transient_failure_is_retried_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/variables"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/variables"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let records = repository(server.uri()).fetch_all().await.unwrap();
        assert!(records.is_empty());
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn persistent_failure_surfaces_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/variables"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let error = repository(server.uri()).fetch_all().await.unwrap_err();
        assert!(matches!(error, FetchError::Transport(_)));
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[test]
    fn bounds_with_time_components_pass_through() {
        let (start, end) =
            normalize_range_bounds("2025-01-01T08:00:00", "2025-01-01T17:00:00").unwrap();
        assert_eq!(start, "2025-01-01T08:00:00");
        assert_eq!(end, "2025-01-01T17:00:00");
    }
}
