//! HTTP implementation of the object-store service
//!
//! Wraps reqwest and implements the `ObjectService` trait from swc-core:
//! Keystone password authentication (v2 and v3), container HEAD/PUT against
//! the Swift proxy, and streamed object PUT. Raw HTTP outcomes map onto
//! `ServiceError`; classification into caller-facing errors stays in the
//! core client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode, header};

use swc_core::{
    Container, Credentials, Error, ObjectService, PutOutcome, ServiceError, ServiceResult,
    Session, StorageEndpoint, TransportConfig, UploadBody,
};

use crate::types;

/// Token header on every request after authentication.
const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Token header on a v3 authentication response.
const SUBJECT_TOKEN_HEADER: &str = "X-Subject-Token";

/// How much of an error body to keep in messages.
const ERROR_BODY_LIMIT: usize = 256;

/// reqwest-backed [`ObjectService`].
///
/// Stateless apart from the connection pool: sessions live in the client
/// that drives this service, never here.
pub struct HttpObjectService {
    http: reqwest::Client,
}

impl HttpObjectService {
    /// Build the service from injected transport options.
    pub fn new(config: &TransportConfig) -> swc_core::Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .danger_accept_invalid_certs(config.insecure)
            .build()
            .map_err(|e| Error::Config(format!("could not build HTTP client: {e}")))?;
        Ok(Self { http })
    }

    async fn authenticate_v3(
        &self,
        endpoint: &StorageEndpoint,
        credentials: &Credentials,
        auth_url: &str,
    ) -> ServiceResult<Session> {
        let request = types::V3AuthRequest::new(
            &credentials.username,
            &credentials.password,
            endpoint.domain_id.as_deref(),
        );
        let response = self
            .http
            .post(auth_url)
            .json(&request)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        reject_unauthorized(status)?;
        if !status.is_success() {
            return Err(unexpected(status, response).await);
        }

        let token = response
            .headers()
            .get(SUBJECT_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                ServiceError::InvalidResponse(format!(
                    "token response carried no {SUBJECT_TOKEN_HEADER} header"
                ))
            })?;

        let body: types::V3AuthResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;
        let storage_url =
            types::object_store_url_v3(&body.token.catalog, endpoint.region.as_deref())
                .ok_or_else(|| no_object_store(endpoint.region.as_deref()))?;

        Ok(Session { storage_url, token })
    }

    async fn authenticate_v2(
        &self,
        endpoint: &StorageEndpoint,
        credentials: &Credentials,
        auth_url: &str,
    ) -> ServiceResult<Session> {
        let request = types::V2AuthRequest::new(&credentials.username, &credentials.password);
        let response = self
            .http
            .post(auth_url)
            .json(&request)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        reject_unauthorized(status)?;
        if !status.is_success() {
            return Err(unexpected(status, response).await);
        }

        let body: types::V2AuthResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;
        let storage_url =
            types::object_store_url_v2(&body.access.service_catalog, endpoint.region.as_deref())
                .ok_or_else(|| no_object_store(endpoint.region.as_deref()))?;

        Ok(Session {
            storage_url,
            token: body.access.token.id,
        })
    }
}

#[async_trait]
impl ObjectService for HttpObjectService {
    async fn authenticate(
        &self,
        endpoint: &StorageEndpoint,
        credentials: &Credentials,
    ) -> ServiceResult<Session> {
        let auth_url = endpoint.auth_url();
        tracing::debug!(url = %auth_url, version = endpoint.api_version(), "requesting token");

        if endpoint.api_version() == "v3" {
            self.authenticate_v3(endpoint, credentials, &auth_url).await
        } else {
            self.authenticate_v2(endpoint, credentials, &auth_url).await
        }
    }

    async fn get_container(&self, session: &Session, name: &str) -> ServiceResult<Container> {
        let url = container_url(&session.storage_url, name);
        let response = self
            .http
            .head(&url)
            .header(AUTH_TOKEN_HEADER, &session.token)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ServiceError::NotFound);
        }
        reject_unauthorized(status)?;
        if !status.is_success() {
            return Err(unexpected(status, response).await);
        }

        Ok(Container {
            name: name.to_string(),
            object_count: header_u64(&response, "X-Container-Object-Count"),
            bytes_used: header_u64(&response, "X-Container-Bytes-Used"),
        })
    }

    async fn create_container(&self, session: &Session, name: &str) -> ServiceResult<Container> {
        let url = container_url(&session.storage_url, name);
        let response = self
            .http
            .put(&url)
            .header(AUTH_TOKEN_HEADER, &session.token)
            .header(header::CONTENT_LENGTH, 0)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        reject_unauthorized(status)?;
        // 201 fresh, 202 already existed; both mean the container is there.
        if !matches!(status.as_u16(), 201 | 202) {
            return Err(unexpected(status, response).await);
        }

        Ok(Container {
            name: name.to_string(),
            object_count: None,
            bytes_used: None,
        })
    }

    async fn put_object(
        &self,
        session: &Session,
        container: &str,
        key: &str,
        body: UploadBody,
    ) -> ServiceResult<PutOutcome> {
        let url = object_url(&session.storage_url, container, key);
        tracing::debug!(url = %url, length = ?body.content_length, "PUT object");

        let mut request = self
            .http
            .put(&url)
            .header(AUTH_TOKEN_HEADER, &session.token);
        if let Some(length) = body.content_length {
            request = request.header(header::CONTENT_LENGTH, length);
        }
        if let Some(content_type) = &body.content_type {
            request = request.header(header::CONTENT_TYPE, content_type);
        }

        let response = request
            .body(reqwest::Body::wrap_stream(body.stream))
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        reject_unauthorized(status)?;
        if !matches!(status.as_u16(), 201 | 202) {
            return Err(unexpected(status, response).await);
        }

        let etag = response
            .headers()
            .get(header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim_matches('"').to_string());

        Ok(PutOutcome {
            status: status.as_u16(),
            etag,
        })
    }
}

fn transport(err: reqwest::Error) -> ServiceError {
    ServiceError::Transport(Box::new(err))
}

fn reject_unauthorized(status: StatusCode) -> ServiceResult<()> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ServiceError::Unauthorized {
            status: status.as_u16(),
        });
    }
    Ok(())
}

async fn unexpected(status: StatusCode, response: Response) -> ServiceError {
    let mut message = response.text().await.unwrap_or_default();
    message.truncate(ERROR_BODY_LIMIT);
    if message.is_empty() {
        message = status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_string();
    }
    ServiceError::UnexpectedStatus {
        status: status.as_u16(),
        message,
    }
}

fn no_object_store(region: Option<&str>) -> ServiceError {
    match region {
        Some(region) => ServiceError::InvalidResponse(format!(
            "no public object-store endpoint for region '{region}' in the service catalog"
        )),
        None => ServiceError::InvalidResponse(
            "no public object-store endpoint in the service catalog".to_string(),
        ),
    }
}

fn header_u64(response: &Response, name: &str) -> Option<u64> {
    response.headers().get(name)?.to_str().ok()?.parse().ok()
}

/// `{storage_url}/{container}`, with the container name percent-encoded.
fn container_url(storage_url: &str, name: &str) -> String {
    format!(
        "{}/{}",
        storage_url.trim_end_matches('/'),
        urlencoding::encode(name)
    )
}

/// `{storage_url}/{container}/{key}`, each key segment percent-encoded so
/// pseudo-directory separators survive as separators.
fn object_url(storage_url: &str, container: &str, key: &str) -> String {
    let encoded_key = key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!(
        "{}/{}/{}",
        storage_url.trim_end_matches('/'),
        urlencoding::encode(container),
        encoded_key
    )
}
