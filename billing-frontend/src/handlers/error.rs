use crate::services::api_client::ApiError;
use crate::services::pdf::PdfError;
use askama::Template;
use axum::response::{IntoResponse, Response};
use service_core::error::AppError;

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub current_page: &'static str,
    pub status: u16,
    pub title: String,
    pub message: String,
}

/// [`AppError`] rendered as an HTML page instead of JSON.
#[derive(Debug)]
pub struct PageError(pub AppError);

impl From<AppError> for PageError {
    fn from(err: AppError) -> Self {
        PageError(err)
    }
}

impl From<ApiError> for PageError {
    fn from(err: ApiError) -> Self {
        PageError(err.into())
    }
}

impl From<PdfError> for PageError {
    fn from(err: PdfError) -> Self {
        PageError(err.into())
    }
}

impl PageError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        PageError(AppError::BadRequest(anyhow::anyhow!(message.into())))
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        PageError(AppError::InternalError(err.into()))
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let message = match &self.0 {
            AppError::NotFound(e) | AppError::BadRequest(e) => e.to_string(),
            AppError::ValidationError(e) => e.to_string(),
            AppError::BadGateway(_) | AppError::ServiceUnavailable => {
                "The billing backend could not be reached. Please try again.".to_string()
            }
            AppError::InternalError(_) => {
                "Something went wrong while preparing this page.".to_string()
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, status = status.as_u16(), "page request failed");
        } else {
            tracing::warn!(error = %self.0, status = status.as_u16(), "page request rejected");
        }

        let page = ErrorTemplate {
            current_page: "",
            status: status.as_u16(),
            title: status.canonical_reason().unwrap_or("Error").to_string(),
            message,
        };
        (status, page).into_response()
    }
}
