//! Responses for requests no route handles.

use std::any::Any;

use axum::http::Method;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;

/// Any path without a matching route.
pub async fn not_found() -> AppError {
    AppError::NotFound
}

/// A known path requested with an unsupported method.
pub async fn method_not_allowed(method: Method) -> AppError {
    AppError::MethodNotAllowed(method)
}

/// Turn a caught handler panic into the standard 500 body.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else {
        "unknown panic payload".to_string()
    };

    AppError::InternalError(format!("handler panicked: {detail}")).into_response()
}
