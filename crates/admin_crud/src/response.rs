use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use shared::error::SafeMessage;

/// Outcome of a CRUD operation, independent of the flashes it produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CrudResponse {
    View { status: StatusCode, body: String },
    /// Always answered with 303 so the client re-fetches with GET.
    SeeOther { location: String },
    Accepted,
    Failure(SafeMessage),
}

impl CrudResponse {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::View { status, .. } => *status,
            Self::SeeOther { .. } => StatusCode::SEE_OTHER,
            Self::Accepted => StatusCode::ACCEPTED,
            Self::Failure(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            Self::SeeOther { location } => Some(location),
            _ => None,
        }
    }
}

impl IntoResponse for CrudResponse {
    fn into_response(self) -> Response {
        match self {
            Self::View { status, body } => (status, Html(body)).into_response(),
            Self::SeeOther { location } => {
                (StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response()
            }
            Self::Accepted => (StatusCode::ACCEPTED, Body::empty()).into_response(),
            Self::Failure(message) => (StatusCode::BAD_REQUEST, Json(message)).into_response(),
        }
    }
}
