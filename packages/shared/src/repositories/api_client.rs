use std::sync::{Arc, PoisonError, RwLock, Weak};

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};

use crate::config::ClientConfig;
use crate::repositories::errors::api_client_errors::ApiClientError;

/// Supplies the bearer token for each outgoing request.
pub trait CredentialSource: Send + Sync {
    fn current_token(&self) -> Option<String>;
}

/// Notified whenever the backend rejects the current credential.
pub trait UnauthorizedHandler: Send + Sync {
    fn on_unauthorized(&self);
}

/// The single HTTP client every repository goes through.
///
/// The token is read from the credential source on every request rather than
/// cached, and any 401 is reported to the registered handler before the error
/// is returned to the caller.
pub struct HttpApiClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialSource>,
    unauthorized_handler: RwLock<Option<Weak<dyn UnauthorizedHandler>>>,
}

impl HttpApiClient {
    pub fn new(
        config: &ClientConfig,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Self, ApiClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            credentials,
            unauthorized_handler: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Registers the handler without keeping it alive.
    pub fn set_unauthorized_handler(&self, handler: Weak<dyn UnauthorizedHandler>) {
        let mut slot = self
            .unauthorized_handler
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = Some(handler);
    }

    fn notify_unauthorized(&self) {
        let handler = self
            .unauthorized_handler
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(Weak::upgrade);
        if let Some(handler) = handler {
            handler.on_unauthorized();
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);
        let builder = self.client.request(method, url);
        match self.credentials.current_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response, ApiClientError> {
        let response = builder.send().await.map_err(|e| {
            error!("Request could not be completed: {}", e);
            ApiClientError::Transport(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            error!("Backend answered 401 Unauthorized, forcing logout");
            self.notify_unauthorized();
            return Err(ApiClientError::Unauthorized);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ApiClientError::from_response(status.as_u16(), &body);
        error!("Request failed: {}", err);
        Err(err)
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiClientError> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(ApiClientError::from)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ApiClientError> {
        let response = self.execute(self.request(Method::GET, path)).await?;
        Self::read_json(response).await
    }

    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .execute(self.request(method, path).json(body))
            .await?;
        Self::read_json(response).await
    }

    /// Sends a request whose response body, if any, is ignored.
    pub(crate) async fn send_empty<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), ApiClientError>
    where
        B: Serialize + ?Sized,
    {
        let builder = match body {
            Some(body) => self.request(method, path).json(body),
            None => self.request(method, path),
        };
        self.execute(builder).await?;
        Ok(())
    }

    /// Like `send_json`, but an empty body yields `T::default()`.
    pub(crate) async fn send_json_or_default<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Default,
    {
        let response = self
            .execute(self.request(method, path).json(body))
            .await?;
        let raw = response.text().await?;
        if raw.trim().is_empty() {
            return Ok(T::default());
        }
        serde_json::from_str(&raw).map_err(ApiClientError::from)
    }
}

/// Placeholder body for bodiless requests sent through `send_empty`.
pub(crate) const NO_BODY: Option<&()> = None;
