/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

use crate::application::config::Config;
use crate::error::{ApiError, AppError};
use crate::utils::id::id_from_location;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, LOCATION};
use reqwest::{Certificate, Client, Identity, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

/// Body attached to an outgoing request
///
/// Bodies are serialized once so a request can be resent after a token refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestBody {
    /// No body
    #[default]
    Empty,
    /// Serialized JSON, sent as `application/json`
    Json(Vec<u8>),
    /// Raw text, sent as `text/plain`
    Text(String),
}

impl RequestBody {
    /// Serializes `value` as JSON
    pub fn json<B: Serialize + ?Sized>(value: &B) -> Result<Self, AppError> {
        Ok(RequestBody::Json(serde_json::to_vec(value)?))
    }

    /// Wraps plain text
    pub fn text(value: impl Into<String>) -> Self {
        RequestBody::Text(value.into())
    }
}

/// Successful response of an admin API call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status, always 2xx
    pub status: StatusCode,
    /// Raw response body
    pub body: Vec<u8>,
    /// `Location` header, set on `201 Created`
    pub location: Option<String>,
}

impl ApiResponse {
    /// ID of the created resource, taken from the `Location` header
    #[must_use]
    pub fn id(&self) -> Option<String> {
        self.location
            .as_deref()
            .map(id_from_location)
            .filter(|id| !id.is_empty())
    }

    /// Decodes the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Body as (lossy) UTF-8 text
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Builds the shared transport from the configuration
///
/// Applies the user agent, the per-request timeout, the default headers, the
/// optional CA certificate and the optional mutual TLS identity.
pub fn build_http_client(config: &Config) -> Result<Client, AppError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    for (name, value) in &config.server.additional_headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| AppError::Config(format!("invalid header name {name}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| AppError::Config(format!("invalid value for header {name}: {e}")))?;
        headers.insert(name, value);
    }

    let mut builder = Client::builder()
        .user_agent(config.user_agent())
        .default_headers(headers);

    if let Some(timeout) = config.timeout() {
        builder = builder.timeout(timeout);
    }

    if let Some(ca_cert) = config.tls.ca_cert.as_deref().filter(|c| !c.is_empty()) {
        let certificate = Certificate::from_pem(ca_cert.as_bytes())
            .map_err(|e| AppError::Config(format!("invalid CA certificate: {e}")))?;
        builder = builder.add_root_certificate(certificate);
    }

    if config.tls.has_client_identity() {
        let cert = config.tls.client_cert.as_deref().unwrap_or_default();
        let key = config.tls.client_key.as_deref().unwrap_or_default();
        let identity = Identity::from_pkcs8_pem(cert.as_bytes(), key.as_bytes())
            .map_err(|e| AppError::Config(format!("invalid client certificate or key: {e}")))?;
        builder = builder.identity(identity);
    }

    if config.tls.insecure_skip_verify {
        builder = builder.danger_accept_invalid_certs(true);
    }

    Ok(builder.build()?)
}

/// Sends a single request and classifies the answer
///
/// No retry happens here: 401/403 come back as [`AppError::TokenRejected`],
/// 404 as [`AppError::NotFound`] and any other non-2xx status as [`AppError::Api`].
///
/// # Arguments
///
/// * `client` - Shared transport
/// * `method` - HTTP method
/// * `url` - Full URL
/// * `authorization` - `Authorization` header value, omitted when `None`
/// * `query` - Query string parameters
/// * `body` - Request body
pub async fn make_http_request(
    client: &Client,
    method: Method,
    url: &str,
    authorization: Option<&str>,
    query: &[(&str, &str)],
    body: &RequestBody,
) -> Result<ApiResponse, AppError> {
    debug!("{} {}", method, url);

    let mut request = client.request(method.clone(), url);

    if let Some(value) = authorization {
        request = request.header(reqwest::header::AUTHORIZATION, value);
    }

    if !query.is_empty() {
        request = request.query(query);
    }

    request = match body {
        RequestBody::Empty => request,
        RequestBody::Json(bytes) => request
            .header(CONTENT_TYPE, "application/json")
            .body(bytes.clone()),
        RequestBody::Text(text) => request
            .header(CONTENT_TYPE, "text/plain")
            .body(text.clone()),
    };

    let response = request.send().await?;
    let status = response.status();
    let path = response.url().path().to_string();
    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    debug!("Response status: {}", status);

    let bytes = response.bytes().await?;

    if status.is_success() {
        return Ok(ApiResponse {
            status,
            body: bytes.to_vec(),
            location,
        });
    }

    let body_text = String::from_utf8_lossy(&bytes).into_owned();
    let api_error = ApiError::new(status, method, path, body_text);
    if !api_error.is_auth_failure() && status != StatusCode::NOT_FOUND {
        error!("Request failed with status {}: {}", status, api_error.body);
    }
    Err(AppError::from_response(api_error))
}
