use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::debug;

const USER_AGENT: &str = "gengi/0.1";

/// Builds a client with the crate user agent and an optional API key header.
pub fn http_client(api_key_header: Option<(&'static str, &str)>) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    if let Some((name, key)) = api_key_header {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_str(key).context("Invalid API key format")?,
        );
    }

    Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .build()
        .context("Failed to build HTTP client")
}

/// Issues one GET and parses the body as `T`. Non-2xx and shape mismatches are errors.
pub async fn get_json<T: DeserializeOwned>(client: &Client, url: &str, what: &str) -> Result<T> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| anyhow!("Request error: {} for {}", e, what))?;

    if !response.status().is_success() {
        return Err(anyhow!("HTTP error: {} for {}", response.status(), what));
    }

    let text = response
        .text()
        .await
        .with_context(|| format!("Failed to get response text for {what}"))?;
    debug!(bytes = text.len(), "Received {} response", what);

    serde_json::from_str(&text)
        .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", what, e))
}

/// Drops the query string so API keys never reach the logs.
pub fn redact(url: &str) -> &str {
    url.split_once('?').map_or(url, |(path, _)| path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct Payload {
        value: f64,
    }

    #[tokio::test]
    async fn test_get_json_sends_key_header() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .and(header("x-test-key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"value": 1.5}"#))
            .mount(&mock_server)
            .await;

        let client = http_client(Some(("x-test-key", "secret"))).unwrap();
        let payload: Payload = get_json(&client, &format!("{}/data", mock_server.uri()), "test")
            .await
            .unwrap();
        assert_eq!(payload.value, 1.5);
    }

    #[tokio::test]
    async fn test_get_json_error_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = http_client(None).unwrap();
        let result: Result<Payload> =
            get_json(&client, &format!("{}/data", mock_server.uri()), "test").await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 503 Service Unavailable for test"
        );
    }

    #[test]
    fn test_redact() {
        assert_eq!(
            redact("https://api.metals.dev/v1/latest?api_key=abc"),
            "https://api.metals.dev/v1/latest"
        );
        assert_eq!(redact("https://flagcdn.com/is.svg"), "https://flagcdn.com/is.svg");
    }
}
