//! Lookup over HTTP against an airmap server.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use crate::provider::{ErrorBody, LookupProvider, MapResponse};
use crate::request::ValidatedRequest;
use crate::AirmapError;

/// Path of the map generation endpoint.
pub const GENERATE_PATH: &str = "/api/maps/generate";

/// Posts requests to `<base>/api/maps/generate`.
#[derive(Debug, Clone)]
pub struct HttpLookupProvider {
    client: Client,
    endpoint: Url,
}

impl HttpLookupProvider {
    /// Creates a provider for the server at `base_url`, e.g. `http://127.0.0.1:5000`.
    pub fn new(base_url: &str) -> Result<Self, AirmapError> {
        Self::with_client(Client::new(), base_url)
    }

    /// Same as [`HttpLookupProvider::new`] with a preconfigured client.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self, AirmapError> {
        let endpoint = Url::parse(base_url)
            .and_then(|mut base| {
                // Keep any path prefix of the base when joining.
                if !base.path().ends_with('/') {
                    let path = format!("{}/", base.path());
                    base.set_path(&path);
                }
                base.join(GENERATE_PATH.trim_start_matches('/'))
            })
            .map_err(|err| AirmapError::Network(format!("invalid server url {base_url:?}: {err}")))?;

        Ok(Self { client, endpoint })
    }

    /// Full endpoint URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl LookupProvider for HttpLookupProvider {
    async fn lookup(&self, request: &ValidatedRequest) -> Result<MapResponse, AirmapError> {
        log::debug!("POST {} for {}", self.endpoint, request.dataset());
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request.to_request())
            .send()
            .await
            .inspect_err(|err| log::error!("Error fetching map data: {err}"))?;

        let status = response.status();
        if status.is_success() {
            return response.json::<MapResponse>().await.map_err(|err| {
                log::error!("Invalid map data from {}: {err}", self.endpoint);
                AirmapError::Network(err.to_string())
            });
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.to_string(),
        };
        log::warn!("Map lookup failed with {status}: {message}");

        Err(error_for_status(status, message))
    }
}

fn error_for_status(status: StatusCode, message: String) -> AirmapError {
    match status {
        StatusCode::NOT_FOUND => AirmapError::NotFound(message),
        // 400 and 5xx are shown as a generic fetch failure.
        _ => AirmapError::Network(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_is_joined_to_base() {
        let provider = HttpLookupProvider::new("http://127.0.0.1:5000").unwrap();
        assert_eq!(provider.endpoint().as_str(), "http://127.0.0.1:5000/api/maps/generate");
    }

    #[test]
    fn endpoint_keeps_base_path() {
        for base in ["http://host/airmap", "http://host/airmap/"] {
            let provider = HttpLookupProvider::new(base).unwrap();
            assert_eq!(provider.endpoint().as_str(), "http://host/airmap/api/maps/generate");
        }
    }

    #[test]
    fn invalid_base_url() {
        assert!(matches!(
            HttpLookupProvider::new("not a url"),
            Err(AirmapError::Network(_))
        ));
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(
            error_for_status(StatusCode::NOT_FOUND, "none".into()),
            AirmapError::NotFound(msg) if msg == "none"
        ));
        assert!(matches!(
            error_for_status(StatusCode::BAD_REQUEST, "bad".into()),
            AirmapError::Network(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::INTERNAL_SERVER_ERROR, "boom".into()),
            AirmapError::Network(_)
        ));
    }
}
