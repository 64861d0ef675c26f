use crate::api::{
    ApiError, FluentCApi, JobResultsRequest, LanguagesResponse, CHECK_LANGUAGE_PATH,
    LANGUAGES_PATH, RESULTS_PATH, TRANSLATE_PATH,
};
use crate::config::{ApiKey, ClientConfig};
use crate::request::{CheckLanguageRequest, TranslateBody};
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;

const LOG_TARGET: &str = "fluentc::api";

#[derive(Clone)]
pub struct HttpFluentCClient {
    client: Client,
    api_key: ApiKey,
    base_url: String,
}

impl HttpFluentCClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.as_str().trim_end_matches('/').to_owned(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request
            .header("Authorization", self.api_key.expose())
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(target: LOG_TARGET, status = status.as_u16(), "FluentC request rejected");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse JSON: {}", e)))
    }
}

impl FluentCApi for HttpFluentCClient {
    fn check_language(
        &self,
        request: CheckLanguageRequest,
    ) -> BoxFuture<'_, Result<Value, ApiError>> {
        async move {
            let url = self.endpoint(CHECK_LANGUAGE_PATH);
            tracing::debug!(target: LOG_TARGET, %url, format = %request.input_format, "checking language");
            self.send(self.client.post(&url).json(&request)).await
        }
        .boxed()
    }

    fn languages(&self) -> BoxFuture<'_, Result<LanguagesResponse, ApiError>> {
        async move {
            let url = self.endpoint(LANGUAGES_PATH);
            tracing::debug!(target: LOG_TARGET, %url, "fetching languages");
            let body: Value = self.send(self.client.get(&url)).await?;
            LanguagesResponse::from_value(body)
        }
        .boxed()
    }

    fn translate(&self, body: TranslateBody) -> BoxFuture<'_, Result<Value, ApiError>> {
        async move {
            let url = self.endpoint(TRANSLATE_PATH);
            tracing::debug!(
                target: LOG_TARGET,
                %url,
                mode = %body.mode,
                target_language = %body.target_language,
                "submitting translation"
            );
            self.send(self.client.post(&url).json(&body)).await
        }
        .boxed()
    }

    fn job_results(&self, job_id: String) -> BoxFuture<'_, Result<Value, ApiError>> {
        async move {
            let url = self.endpoint(RESULTS_PATH);
            let body = JobResultsRequest { job_id };
            self.send(self.client.post(&url).json(&body)).await
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LanguageCode;
    use crate::request::{InputFormat, TranslationMode, TranslationRequest};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const KEY: &str = "fc-test-key";

    fn client_for(base: &str) -> HttpFluentCClient {
        let cfg = ClientConfig::new(ApiKey::new(KEY).unwrap())
            .unwrap()
            .with_base_url(base)
            .unwrap();
        HttpFluentCClient::new(&cfg).unwrap()
    }

    async fn mock_server() -> (MockServer, HttpFluentCClient) {
        let server = MockServer::start().await;
        let client = client_for(&format!("{}/ai_agent", server.uri()));
        (server, client)
    }

    #[test]
    fn endpoints_extend_the_base_path() {
        let client = client_for("https://dashboard.fluentc.io/ai_agent");
        assert_eq!(
            client.endpoint(TRANSLATE_PATH),
            "https://dashboard.fluentc.io/ai_agent/translate"
        );
        assert_eq!(
            client.endpoint(RESULTS_PATH),
            "https://dashboard.fluentc.io/ai_agent/results"
        );
    }

    #[test]
    fn trailing_slash_on_base_is_ignored() {
        let client = client_for("http://localhost:8080/ai_agent/");
        assert_eq!(
            client.endpoint(LANGUAGES_PATH),
            "http://localhost:8080/ai_agent/languages"
        );
    }

    #[tokio::test]
    async fn translate_posts_body_with_raw_key() {
        let (server, client) = mock_server().await;
        Mock::given(method("POST"))
            .and(path("/ai_agent/translate"))
            .and(header("Authorization", KEY))
            .and(body_json(json!({
                "input": "Hello",
                "input_format": "text",
                "target_language": "fr",
                "mode": "batch"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"job_id": "j-1"})))
            .expect(1)
            .mount(&server)
            .await;

        let body = TranslationRequest::new(
            &json!("Hello"),
            InputFormat::Text,
            LanguageCode::new("fr").unwrap(),
            None,
            TranslationMode::Batch,
        )
        .unwrap()
        .into_body();
        let response = client.translate(body).await.unwrap();

        assert_eq!(response, json!({"job_id": "j-1"}));
    }

    #[tokio::test]
    async fn results_posts_job_id() {
        let (server, client) = mock_server().await;
        Mock::given(method("POST"))
            .and(path("/ai_agent/results"))
            .and(header("Authorization", KEY))
            .and(body_json(json!({"job_id": "j-42"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": "pending"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let response = client.job_results("j-42".into()).await.unwrap();

        assert_eq!(response["status"], "pending");
    }

    #[tokio::test]
    async fn check_language_posts_input_and_format() {
        let (server, client) = mock_server().await;
        Mock::given(method("POST"))
            .and(path("/ai_agent/checklanguage"))
            .and(header("Authorization", KEY))
            .and(body_json(json!({"input": "<p>Hallo</p>", "input_format": "html"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"detected_language": "de"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let request = CheckLanguageRequest::new("<p>Hallo</p>".into(), InputFormat::Html).unwrap();
        let response = client.check_language(request).await.unwrap();

        assert_eq!(response["detected_language"], "de");
    }

    #[tokio::test]
    async fn languages_is_a_get() {
        let (server, client) = mock_server().await;
        Mock::given(method("GET"))
            .and(path("/ai_agent/languages"))
            .and(header("Authorization", KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "supported_languages": [{"code": "en", "name": "English", "native_name": "English"}],
                "source_languages": [{"code": "en", "name": "English"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = client.languages().await.unwrap();

        assert_eq!(response.supported_languages[0]["native_name"], "English");
        assert_eq!(response.source_languages[0]["code"], "en");
    }

    #[tokio::test]
    async fn languages_without_list_is_invalid() {
        let (server, client) = mock_server().await;
        Mock::given(method("GET"))
            .and(path("/ai_agent/languages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "no plan"})))
            .mount(&server)
            .await;

        let err = client.languages().await.unwrap_err();

        assert!(matches!(err, ApiError::InvalidResponse(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn rejected_key_maps_to_status() {
        let (server, client) = mock_server().await;
        Mock::given(method("POST"))
            .and(path("/ai_agent/results"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let err = client.job_results("j-1".into()).await.unwrap_err();

        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid api key");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_error_maps_to_status() {
        let (server, client) = mock_server().await;
        Mock::given(method("GET"))
            .and(path("/ai_agent/languages"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client.languages().await.unwrap_err();

        assert!(
            matches!(err, ApiError::Status { status: 503, ref body } if body == "maintenance"),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn non_json_body_is_invalid_response() {
        let (server, client) = mock_server().await;
        Mock::given(method("POST"))
            .and(path("/ai_agent/results"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client.job_results("j-1".into()).await.unwrap_err();

        assert!(matches!(err, ApiError::InvalidResponse(_)), "got {err:?}");
    }
}
