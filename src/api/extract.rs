//! Request extractors: bearer authentication and JSON bodies.

use axum::extract::{FromRequest, FromRequestParts};
use http::header;
use http::request::Parts;

use crate::api::AppState;
use crate::api::error::ApiError;
use crate::auth::RequestContext;
use crate::error::CoreError;
use crate::types::{InvalidUserId, UserId};

/// Authenticated caller. Rejects the request with `err.unauthenticated`
/// before the handler runs if the bearer token is missing or invalid.
pub struct Authenticated(pub RequestContext);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let authorization = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        let identity = state.authenticator.authenticate(authorization)?;

        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        Ok(Self(RequestContext::new(identity).with_user_agent(user_agent)))
    }
}

impl Authenticated {
    /// Attach the path-addressed user id. Non-numeric ids are malformed input.
    pub fn targeting(self, raw_id: &str) -> Result<RequestContext, ApiError> {
        let target: UserId = raw_id
            .parse()
            .map_err(|e: InvalidUserId| CoreError::Malformed(e.to_string()))?;
        Ok(self.0.with_target(target))
    }
}

/// JSON body whose parse failures map to `err.json_invalid`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
