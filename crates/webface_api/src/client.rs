use reqwest::{Client, Response};
use tracing::debug;
use url::Url;

use crate::config::WebfaceApiConfig;
use crate::error::{parse_error_message, ApiError};
use crate::headers::{build_headers, to_header_map};
use crate::payload::{decode, AfterReadReply, ChatReply, ForumBatch, MessageBody};
use crate::request::{BackendRequest, BackendResponse, Endpoint};
use crate::url::{endpoint_url, normalize_base_url};

#[derive(Debug, Clone)]
pub struct WebfaceApiClient {
    http: Client,
    config: WebfaceApiConfig,
    base_url: Url,
}

impl WebfaceApiClient {
    pub fn new(config: WebfaceApiConfig) -> Result<Self, ApiError> {
        let base_url = normalize_base_url(&config.base_url)?;
        let headers = to_header_map(&build_headers(&config))?;
        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ApiError::from)?;
        Ok(Self {
            http,
            config,
            base_url,
        })
    }

    pub fn config(&self) -> &WebfaceApiConfig {
        &self.config
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoint_url(&self, request: &BackendRequest) -> Result<Url, ApiError> {
        let path = request.endpoint().path();
        match request {
            BackendRequest::Chat { session_id, .. }
            | BackendRequest::ClearHistory { session_id } => {
                endpoint_url(&self.base_url, path, &[("session_id", session_id.as_str())])
            }
            BackendRequest::AfterRead {
                version,
                session_id,
            } => endpoint_url(
                &self.base_url,
                path,
                &[("version", version.as_str()), ("session_id", session_id.as_str())],
            ),
            BackendRequest::ForumStart | BackendRequest::ForumChat { .. } => {
                endpoint_url(&self.base_url, path, &[])
            }
        }
    }

    pub fn build_request(
        &self,
        request: &BackendRequest,
    ) -> Result<reqwest::RequestBuilder, ApiError> {
        let url = self.endpoint_url(request)?;
        let builder = self.http.request(request.endpoint().method(), url);
        Ok(match request {
            BackendRequest::Chat { message, .. } | BackendRequest::ForumChat { message } => {
                builder.json(&MessageBody::new(message.clone()))
            }
            BackendRequest::ClearHistory { .. }
            | BackendRequest::AfterRead { .. }
            | BackendRequest::ForumStart => builder,
        })
    }

    /// Issue one request and decode the endpoint-specific response.
    pub async fn execute(&self, request: &BackendRequest) -> Result<BackendResponse, ApiError> {
        match request.endpoint() {
            Endpoint::Chat => self
                .fetch_decoded::<ChatReply>(request)
                .await
                .map(BackendResponse::Chat),
            Endpoint::ChatClear => self.fetch(request).await.map(|_| BackendResponse::Cleared),
            Endpoint::AfterRead => self
                .fetch_decoded::<AfterReadReply>(request)
                .await
                .map(BackendResponse::AfterRead),
            Endpoint::ForumStart | Endpoint::ForumChat => self
                .fetch_decoded::<ForumBatch>(request)
                .await
                .map(BackendResponse::Forum),
        }
    }

    pub async fn chat(&self, session_id: &str, message: &str) -> Result<ChatReply, ApiError> {
        self.fetch_decoded(&BackendRequest::Chat {
            session_id: session_id.to_owned(),
            message: message.to_owned(),
        })
        .await
    }

    pub async fn clear_history(&self, session_id: &str) -> Result<(), ApiError> {
        self.fetch(&BackendRequest::ClearHistory {
            session_id: session_id.to_owned(),
        })
        .await
        .map(|_| ())
    }

    pub async fn after_read(
        &self,
        version: &str,
        session_id: &str,
    ) -> Result<AfterReadReply, ApiError> {
        self.fetch_decoded(&BackendRequest::AfterRead {
            version: version.to_owned(),
            session_id: session_id.to_owned(),
        })
        .await
    }

    pub async fn forum_start(&self) -> Result<ForumBatch, ApiError> {
        self.fetch_decoded(&BackendRequest::ForumStart).await
    }

    pub async fn forum_chat(&self, message: &str) -> Result<ForumBatch, ApiError> {
        self.fetch_decoded(&BackendRequest::ForumChat {
            message: message.to_owned(),
        })
        .await
    }

    async fn fetch_decoded<T>(&self, request: &BackendRequest) -> Result<T, ApiError>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        let body = self.fetch(request).await?;
        decode(request.endpoint().label(), &body)
    }

    async fn fetch(&self, request: &BackendRequest) -> Result<Vec<u8>, ApiError> {
        let endpoint = request.endpoint();
        debug!(endpoint = endpoint.label(), "sending backend request");
        let response = self.build_request(request)?.send().await?;
        read_success_body(endpoint, response).await
    }
}

async fn read_success_body(endpoint: Endpoint, response: Response) -> Result<Vec<u8>, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.bytes().await?.to_vec());
    }

    let body = response.text().await.unwrap_or_default();
    let message = parse_error_message(status, &body);
    debug!(
        endpoint = endpoint.label(),
        status = status.as_u16(),
        %message,
        "backend returned non-success status"
    );
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}
