//! Collaborator clients - traits, mocks and HTTP implementations

pub mod settler;
pub mod transactor;

#[cfg(feature = "client")]
pub(crate) mod http {
    use crate::error::{UpstreamError, UpstreamResult};
    use reqwest::{Client, Response};
    use serde::Deserialize;
    use std::time::Duration;

    /// Fee answer shared by the transactor and settler fee endpoints
    #[derive(Debug, Deserialize)]
    pub(crate) struct FeeResponse<T> {
        pub fee: T,
    }

    pub(crate) fn build_client(timeout: Duration) -> UpstreamResult<Client> {
        Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Other(format!("failed to build HTTP client: {}", e)))
    }

    pub(crate) fn unavailable(e: reqwest::Error) -> UpstreamError {
        UpstreamError::Unavailable(e.to_string())
    }

    /// Turn a non-2xx answer into `Rejected` carrying the response text
    pub(crate) async fn ensure_success(response: Response) -> UpstreamResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        Err(UpstreamError::Rejected(format!("{}: {}", status, error_text)))
    }
}
