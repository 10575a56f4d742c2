use reqwest::{Client, RequestBuilder, StatusCode, header::CONTENT_TYPE};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
#[cfg(not(target_arch = "wasm32"))]
use shared::config::client::ClientConfig;
use shared::models::{
    ErrorResponse, LoginRequest, NewRecipe, RecipeListResponse, RegisterRequest, TokenResponse,
    UserResponse,
};

use crate::error::{ClientError, ClientResult};

/// Header carrying the session token on authenticated routes.
pub const AUTH_HEADER: &str = "Auth";
/// Base URL of a locally running API.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

/// Status and parsed body of a successful API call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status of the response.
    pub status: StatusCode,
    /// JSON body. An empty body is `null`; non-JSON text becomes a JSON string.
    pub body: Value,
}

impl ApiResponse {
    /// Decode the body into a typed model.
    ///
    /// # Errors
    /// Returns [`ClientError::Malformed`] when the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self, endpoint: &'static str) -> ClientResult<T> {
        serde_json::from_value(self.body.clone())
            .map_err(|err| ClientError::malformed(endpoint, err.to_string()))
    }
}

/// Thin typed client over the recipe REST API.
#[derive(Clone, Debug)]
pub struct RecipeApiClient {
    base_url: String,
    client: Client,
}

impl RecipeApiClient {
    /// Create a client for the API rooted at `base_url` (including `/api`).
    ///
    /// Cookies set by the server are kept for the life of the client.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.cookie_store(true).user_agent("recipebox-client");
        Ok(Self::with_client(base_url, builder.build()?))
    }

    /// Build a client from resolved configuration, honouring its timeout.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .user_agent("recipebox-client");
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(&config.api_base_url, builder.build()?))
    }

    /// Wrap an existing `reqwest` client.
    pub fn with_client(base_url: &str, client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Base URL with any trailing slash removed.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(self.api_url(path))
            .header(CONTENT_TYPE, "application/json")
    }

    fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> RequestBuilder {
        self.client.post(self.api_url(path)).json(body)
    }

    async fn send(request: RequestBuilder) -> ClientResult<ApiResponse> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let body = parse_body(&text);

        if status.is_success() {
            return Ok(ApiResponse { status, body });
        }

        let message = ErrorResponse::from_body(&body).map_or_else(
            || {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            },
            |error| error.to_string(),
        );
        Err(ClientError::from_status(status, message))
    }

    /// `GET /`: every recipe. Does not need a session.
    ///
    /// # Errors
    /// Transport, status and decode failures.
    pub async fn list_recipes(&self) -> ClientResult<RecipeListResponse> {
        Self::send(self.get("/")).await?.json("/")
    }

    /// `GET /saved`: recipes the session owner saved, left undecoded so the
    /// caller can judge the shape.
    ///
    /// # Errors
    /// Transport and status failures.
    pub async fn saved_recipes(&self, token: &str) -> ClientResult<ApiResponse> {
        Self::send(self.get("/saved").header(AUTH_HEADER, token)).await
    }

    /// `GET /user`: profile of the session owner.
    ///
    /// # Errors
    /// Transport, status and decode failures.
    pub async fn profile(&self, token: &str) -> ClientResult<UserResponse> {
        Self::send(self.get("/user").header(AUTH_HEADER, token))
            .await?
            .json("/user")
    }

    /// `POST /login`.
    ///
    /// # Errors
    /// Transport and status failures.
    pub async fn login(&self, payload: &LoginRequest) -> ClientResult<ApiResponse> {
        Self::send(self.post("/login", payload)).await
    }

    /// `POST /register`.
    ///
    /// # Errors
    /// Transport and status failures.
    pub async fn register(&self, payload: &RegisterRequest) -> ClientResult<ApiResponse> {
        Self::send(self.post("/register", payload)).await
    }

    /// `POST /add`.
    ///
    /// # Errors
    /// Transport and status failures.
    pub async fn add_recipe(&self, token: &str, recipe: &NewRecipe) -> ClientResult<ApiResponse> {
        Self::send(self.post("/add", recipe).header(AUTH_HEADER, token)).await
    }

    /// `GET /:id`.
    ///
    /// # Errors
    /// Transport and status failures.
    pub async fn recipe_by_id(&self, token: &str, id: &str) -> ClientResult<ApiResponse> {
        Self::send(self.get(id).header(AUTH_HEADER, token)).await
    }

    /// `POST /:id` with an empty object.
    ///
    /// # Errors
    /// Transport and status failures.
    pub async fn save_recipe(&self, token: &str, id: &str) -> ClientResult<ApiResponse> {
        Self::send(self.post(id, &json!({})).header(AUTH_HEADER, token)).await
    }
}

fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Pull the token out of a login or registration response.
///
/// # Errors
/// Returns [`ClientError::Malformed`] when the body has no usable token.
pub fn token_from(response: &ApiResponse, endpoint: &'static str) -> ClientResult<String> {
    let TokenResponse { token, .. } = response.json(endpoint)?;
    if token.trim().is_empty() {
        return Err(ClientError::malformed(endpoint, "server issued an empty token"));
    }
    Ok(token)
}
