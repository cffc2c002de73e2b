//! HTTP implementation of the marketplace API traits.
//!
//! Endpoints follow the marketplace's flat layout: `GET` endpoints carry
//! their parameters as query pairs, `POST` endpoints as JSON bodies.
//! Non-2xx responses are parsed as error envelopes and normalized into
//! [`Error::Api`].

use async_trait::async_trait;
use quayside_api::{ApiErrorResponse, ApiResponse};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::api::{
    CurrentUserApi, ListingsApi, MessagesApi, QueryMessagesParams, QueryTransactionsParams,
    SendMessageParams, ShowListingParams, ShowTransactionParams, TransactionsApi,
    TransitionParams, UpdateProfileParams,
};
use crate::config::ClientConfig;
use crate::error::{Error, Result};

/// Marketplace API client backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: Url,
    client: reqwest::Client,
    client_id: Option<String>,
}

impl HttpClient {
    /// Create a client from the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        // Url::join treats the last path segment as a file unless the base
        // ends with a slash.
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(|e| {
            Error::Configuration(format!("invalid base url {}: {}", config.base_url, e))
        })?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            base_url,
            client,
            client_id: config.client_id,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Configuration(format!("invalid endpoint {}: {}", path, e)))
    }

    fn apply_client_id(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.client_id {
            Some(client_id) => request.header("X-Client-Id", client_id),
            None => request,
        }
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<ApiResponse> {
        let url = self.endpoint(path)?;
        debug!(%url, "marketplace GET");
        let request = self.apply_client_id(self.client.get(url).query(query));
        let response = request.send().await?;
        Self::read_response(response).await
    }

    async fn post(&self, path: &str, query: &[(&str, String)], body: &Value) -> Result<ApiResponse> {
        let url = self.endpoint(path)?;
        debug!(%url, "marketplace POST");
        let request = self.apply_client_id(self.client.post(url).query(query).json(body));
        let response = request.send().await?;
        Self::read_response(response).await
    }

    async fn read_response(response: reqwest::Response) -> Result<ApiResponse> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json::<ApiResponse>().await?)
        } else {
            // An unreadable error body still surfaces the status.
            let body = response
                .json::<ApiErrorResponse>()
                .await
                .unwrap_or_default();
            debug!(status = status.as_u16(), code = ?body.code(), "marketplace request rejected");
            Err(Error::Api {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl TransactionsApi for HttpClient {
    async fn show_transaction(&self, params: ShowTransactionParams) -> Result<ApiResponse> {
        self.get("transactions/show", &params.query()).await
    }

    async fn transition_transaction(&self, params: TransitionParams) -> Result<ApiResponse> {
        self.post("transactions/transition", &params.query(), &params.body())
            .await
    }

    async fn query_transactions(&self, params: QueryTransactionsParams) -> Result<ApiResponse> {
        self.get("transactions/query", &params.query()).await
    }
}

#[async_trait]
impl ListingsApi for HttpClient {
    async fn show_listing(&self, params: ShowListingParams) -> Result<ApiResponse> {
        self.get("listings/show", &params.query()).await
    }
}

#[async_trait]
impl MessagesApi for HttpClient {
    async fn query_messages(&self, params: QueryMessagesParams) -> Result<ApiResponse> {
        self.get("messages/query", &params.query()).await
    }

    async fn send_message(&self, params: SendMessageParams) -> Result<ApiResponse> {
        self.post("messages/send", &[], &params.body()).await
    }
}

#[async_trait]
impl CurrentUserApi for HttpClient {
    async fn update_profile(&self, params: UpdateProfileParams) -> Result<ApiResponse> {
        self.post("current_user/update_profile", &params.query(), &params.body())
            .await
    }
}
