use async_trait::async_trait;
use hotfinder_core::client::{CredentialProvider, PlatformSearch, VideoPlatformClient};
use hotfinder_core::{HotFinderError, Result};
use log::{debug, warn};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

const KEY_REASONS: [&str; 3] = ["keyInvalid", "keyExpired", "API_KEY_INVALID"];
const QUOTA_REASONS: [&str; 3] = ["quotaExceeded", "rateLimitExceeded", "QUOTA_EXCEEDED"];

/// YouTube Data API v3 over reqwest.
pub struct YouTubeApiClient {
    http: Client,
    base_url: Url,
    credentials: Arc<dyn CredentialProvider>,
}

impl YouTubeApiClient {
    pub fn new(base_url: &str, credentials: Arc<dyn CredentialProvider>) -> anyhow::Result<Self> {
        Ok(YouTubeApiClient {
            http: Client::new(),
            base_url: Url::parse(base_url)?,
            credentials,
        })
    }

    /// `{base}/{resource}?{params}&key={key}`
    pub fn endpoint(&self, resource: &str, params: &[(&str, String)], key: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| HotFinderError::Transport(format!("unusable base URL {}", self.base_url)))?
            .pop_if_empty()
            .push(resource);
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())))
            .append_pair("key", key);
        Ok(url)
    }

    async fn get_json(&self, resource: &str, params: &[(&str, String)]) -> Result<Value> {
        let key = self.credentials.api_key()?;
        let url = self.endpoint(resource, params, &key)?;
        debug!("GET {}/{resource} {params:?}", self.base_url);

        // Errors are stripped of their URL, which carries the key.
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| HotFinderError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| HotFinderError::Transport(e.without_url().to_string()))?;

        if !status.is_success() {
            let error = classify_error(status.as_u16(), &body);
            warn!("YouTube {resource} request failed with {status}: {error}");
            return Err(error);
        }

        serde_json::from_str(&body).map_err(|e| {
            HotFinderError::MalformedResponse(format!("{resource} response is not JSON: {e}"))
        })
    }
}

/// Map a failed API response to the error taxonomy. Reasons in the body win over the
/// status code.
pub fn classify_error(status: u16, body: &str) -> HotFinderError {
    let parsed: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    let error = &parsed["error"];

    let reasons: Vec<&str> = ["errors", "details"]
        .iter()
        .filter_map(|field| error[*field].as_array())
        .flatten()
        .filter_map(|entry| entry["reason"].as_str())
        .collect();

    if reasons.iter().any(|r| KEY_REASONS.contains(r)) {
        return HotFinderError::KeyInvalid;
    }
    if reasons.iter().any(|r| QUOTA_REASONS.contains(r)) {
        return HotFinderError::QuotaExceeded;
    }

    match status {
        400 | 401 => HotFinderError::KeyInvalid,
        403 | 429 => HotFinderError::QuotaExceeded,
        _ => {
            let message = error["message"].as_str().unwrap_or("no error message");
            HotFinderError::Transport(format!("HTTP {status}: {message}"))
        }
    }
}

#[async_trait]
impl VideoPlatformClient for YouTubeApiClient {
    async fn search(&self, request: &PlatformSearch) -> Result<Value> {
        let mut params = vec![
            ("part", "snippet".to_string()),
            ("q", request.query.clone()),
            ("type", request.kind.as_str().to_string()),
            ("maxResults", request.max_results.to_string()),
        ];
        if let Some(region) = &request.region_code {
            params.push(("regionCode", region.clone()));
        }
        if let Some(language) = &request.relevance_language {
            params.push(("relevanceLanguage", language.clone()));
        }
        if let Some(order) = &request.order {
            params.push(("order", order.clone()));
        }

        self.get_json("search", &params).await
    }

    async fn video_details(&self, ids: &[String]) -> Result<Value> {
        let params = [
            ("part", "snippet,statistics,contentDetails".to_string()),
            ("id", ids.join(",")),
        ];
        self.get_json("videos", &params).await
    }

    async fn channel_details(&self, ids: &[String]) -> Result<Value> {
        let params = [
            ("part", "snippet,statistics".to_string()),
            ("id", ids.join(",")),
        ];
        self.get_json("channels", &params).await
    }

    async fn most_popular(
        &self,
        region_code: &str,
        category_id: &str,
        max_results: u32,
    ) -> Result<Value> {
        let params = [
            ("part", "snippet,statistics,contentDetails".to_string()),
            ("chart", "mostPopular".to_string()),
            ("regionCode", region_code.to_string()),
            ("videoCategoryId", category_id.to_string()),
            ("maxResults", max_results.to_string()),
        ];
        self.get_json("videos", &params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotfinder_core::client::StaticCredential;

    fn client(key: Option<&str>) -> YouTubeApiClient {
        YouTubeApiClient::new(
            "https://www.googleapis.com/youtube/v3",
            Arc::new(StaticCredential::new(key.map(String::from))),
        )
        .unwrap()
    }

    #[test]
    fn reason_beats_status() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.",
            "errors":[{"reason":"badRequest"}],
            "details":[{"reason":"API_KEY_INVALID"}]}}"#;
        assert_eq!(classify_error(400, body), HotFinderError::KeyInvalid);

        let quota = r#"{"error":{"code":403,"errors":[{"reason":"quotaExceeded"}]}}"#;
        assert_eq!(classify_error(403, quota), HotFinderError::QuotaExceeded);

        let rate = r#"{"error":{"errors":[{"reason":"rateLimitExceeded"}]}}"#;
        assert_eq!(classify_error(400, rate), HotFinderError::QuotaExceeded);
    }

    #[test]
    fn status_decides_without_reason() {
        assert_eq!(classify_error(401, ""), HotFinderError::KeyInvalid);
        assert_eq!(classify_error(429, "<html>"), HotFinderError::QuotaExceeded);
        assert_eq!(
            classify_error(500, r#"{"error":{"message":"Backend Error"}}"#),
            HotFinderError::Transport("HTTP 500: Backend Error".to_string())
        );
    }

    #[test]
    fn endpoint_appends_resource_and_key() {
        let url = client(Some("secret"))
            .endpoint("videos", &[("id", "a,b".to_string())], "secret")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/youtube/v3/videos?id=a%2Cb&key=secret"
        );
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let result = client(None).video_details(&["a".to_string()]).await;
        assert_eq!(result, Err(HotFinderError::MissingCredential));
    }
}
