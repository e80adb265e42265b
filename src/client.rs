//! Pet-shop backend HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{ApiConfig, ApiRoutes};
use crate::error::{AppError, INVALID_CREDENTIALS_MESSAGE, Result};
use crate::models::{
    Appointment, AttachServicesRequest, CreateAppointmentRequest, CreateAppointmentResponse, Page, Pet, Service,
};
use crate::session::Session;

/// Operations the console needs from the backend.
///
/// Everything except `login` is scoped by an explicit [`Session`].
#[async_trait]
pub trait Backend: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<Session>;

    async fn list_pets(&self, session: &Session) -> Result<Vec<Pet>>;

    async fn list_appointments(&self, session: &Session, page: u32, page_size: u32) -> Result<Page<Appointment>>;

    async fn create_appointment(
        &self,
        session: &Session,
        request: &CreateAppointmentRequest,
    ) -> Result<CreateAppointmentResponse>;

    async fn attach_services(&self, session: &Session, appointment_id: i64, service_ids: &[i64]) -> Result<()>;

    async fn list_services(&self, session: &Session, page: u32, page_size: u32) -> Result<Page<Service>>;
}

/// REST client for the pet-shop backend.
///
/// Uses bearer authentication from the session passed to each call.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    routes: ApiRoutes,
}

/// List bodies arrive either wrapped in `{ "data": [...] }` or bare.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody<T> {
    Paged(Page<T>),
    Bare(Vec<T>),
}

impl<T> ListBody<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Paged(page) => page.data,
            Self::Bare(items) => items,
        }
    }
}

impl ApiClient {
    /// Create a new client from API settings.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            routes: config.routes.clone(),
        })
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, route: &str) -> String {
        format!("{base}{route}", base = self.base_url)
    }

    fn attach_services_url(&self, appointment_id: i64) -> String {
        self.url(&self.routes.attach_services.replace("{id}", &appointment_id.to_string()))
    }

    fn authorized(&self, builder: RequestBuilder, session: &Session) -> RequestBuilder {
        builder.bearer_auth(&session.token)
    }

    /// Test that the backend answers at all.
    pub async fn test_connection(&self) -> Result<bool> {
        let response = self.client.get(self.url("/")).send().await?;
        // Any HTTP answer means the server is up; 404 on "/" is common.
        Ok(!response.status().is_server_error())
    }
}

#[async_trait]
impl Backend for ApiClient {
    async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let response = self
            .client
            .post(self.url(&self.routes.login))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        read_json(response, AuthScope::Anonymous).await
    }

    async fn list_pets(&self, session: &Session) -> Result<Vec<Pet>> {
        let request = self
            .client
            .get(self.url(&self.routes.pets))
            .query(&[("userId", session.user_id())]);

        let response = self.authorized(request, session).send().await?;
        let body: ListBody<Pet> = read_json(response, AuthScope::Session).await?;
        Ok(body.into_vec())
    }

    async fn list_appointments(&self, session: &Session, page: u32, page_size: u32) -> Result<Page<Appointment>> {
        let request = self.client.get(self.url(&self.routes.appointments)).query(&[
            ("userId", session.user_id().to_string()),
            ("page", page.to_string()),
            ("pageSize", page_size.to_string()),
        ]);

        let response = self.authorized(request, session).send().await?;
        let body: ListBody<Appointment> = read_json(response, AuthScope::Session).await?;
        Ok(Page { data: body.into_vec() })
    }

    async fn create_appointment(
        &self,
        session: &Session,
        request: &CreateAppointmentRequest,
    ) -> Result<CreateAppointmentResponse> {
        let builder = self.client.post(self.url(&self.routes.appointments)).json(request);

        let response = self.authorized(builder, session).send().await?;
        read_json_lenient(response).await
    }

    async fn attach_services(&self, session: &Session, appointment_id: i64, service_ids: &[i64]) -> Result<()> {
        let body = AttachServicesRequest {
            service_ids: service_ids.to_vec(),
        };
        let builder = self.client.patch(self.attach_services_url(appointment_id)).json(&body);

        let response = self.authorized(builder, session).send().await?;
        expect_success(response, AuthScope::Session).await.map(|_| ())
    }

    async fn list_services(&self, session: &Session, page: u32, page_size: u32) -> Result<Page<Service>> {
        let request = self
            .client
            .get(self.url(&self.routes.services))
            .query(&[("page", page), ("pageSize", page_size)]);

        let response = self.authorized(request, session).send().await?;
        let body: ListBody<Service> = read_json(response, AuthScope::Session).await?;
        Ok(Page { data: body.into_vec() })
    }
}

/// Whether a request was made on behalf of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthScope {
    /// No token sent; a 401 means the credentials were rejected.
    Anonymous,
    /// Bearer token sent; a 401 means the session has expired.
    Session,
}

/// Check the status and return the body text of a 2xx response.
async fn expect_success(response: Response, scope: AuthScope) -> Result<String> {
    let status = response.status();
    let url = response.url().path().to_string();
    let body = response.text().await?;

    if status == StatusCode::UNAUTHORIZED {
        return Err(match scope {
            AuthScope::Session => {
                warn!("{url}: session rejected");
                AppError::Unauthorized
            }
            AuthScope::Anonymous => {
                warn!("{url}: credentials rejected: {body}");
                let message =
                    extract_error_message(&body).unwrap_or_else(|| INVALID_CREDENTIALS_MESSAGE.to_string());
                AppError::backend(status.as_u16(), message)
            }
        });
    }

    if !status.is_success() {
        let message = extract_error_message(&body).unwrap_or_default();
        warn!("{url}: backend returned {status}: {body}");
        return Err(AppError::backend(status.as_u16(), message));
    }

    debug!("{url}: {status}");
    Ok(body)
}

async fn read_json<T: DeserializeOwned>(response: Response, scope: AuthScope) -> Result<T> {
    let body = expect_success(response, scope).await?;
    serde_json::from_str(&body).map_err(|e| AppError::parse(format!("Invalid response body: {e}")))
}

/// Like [`read_json`] for session calls, but an empty or unreadable 2xx body
/// yields `T::default()`. The request has already succeeded at that point.
async fn read_json_lenient<T: DeserializeOwned + Default>(response: Response) -> Result<T> {
    let url = response.url().path().to_string();
    let body = expect_success(response, AuthScope::Session).await?;
    if body.trim().is_empty() {
        return Ok(T::default());
    }
    match serde_json::from_str(&body) {
        Ok(value) => Ok(value),
        Err(e) => {
            warn!("{url}: unreadable success body ({e}): {body}");
            Ok(T::default())
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// Understands `{"message": "..."}`, `{"message": ["...", "..."]}` and
/// `{"error": "..."}`.
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    match value.get("message") {
        Some(serde_json::Value::String(message)) if !message.trim().is_empty() => return Some(message.clone()),
        Some(serde_json::Value::Array(items)) => {
            let parts: Vec<&str> = items.iter().filter_map(|item| item.as_str()).collect();
            if !parts.is_empty() {
                return Some(parts.join("; "));
            }
        }
        _ => {}
    }

    value
        .get("error")
        .and_then(|e| e.as_str())
        .filter(|e| !e.trim().is_empty())
        .map(str::to_string)
}
