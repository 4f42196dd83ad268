//! Mapping of domain errors and warp rejections onto HTTP responses.

use serde::Serialize;
use std::convert::Infallible;
use warp::http::StatusCode;
use warp::reject::Reject;
use warp::{Rejection, Reply};

use crate::error::RomiError;

/// Error body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

/// Client message for storage failures on routes that do not name their own.
const STORAGE_MESSAGE: &str = "Error al acceder al almacén de datos";

#[derive(Debug)]
pub struct ApiRejection {
    pub error: RomiError,
    /// Replaces the detail of a storage failure in the response body.
    pub storage_message: &'static str,
}

impl Reject for ApiRejection {}

impl From<RomiError> for ApiRejection {
    fn from(error: RomiError) -> Self {
        ApiRejection {
            error,
            storage_message: STORAGE_MESSAGE,
        }
    }
}

pub fn reject(err: RomiError) -> Rejection {
    warp::reject::custom(ApiRejection::from(err))
}

/// Reject with `storage_message` shown to the client if `err` is a storage failure.
pub fn reject_with(storage_message: &'static str) -> impl Fn(RomiError) -> Rejection + Clone {
    move |error| warp::reject::custom(ApiRejection { error, storage_message })
}

pub fn status_for(err: &RomiError) -> (StatusCode, &'static str) {
    match err {
        RomiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        RomiError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
        RomiError::InvalidRange { .. } => (StatusCode::BAD_REQUEST, "INVALID_RANGE"),
        RomiError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
    }
}

pub fn error_reply(err: &RomiError, storage_message: &str) -> warp::reply::Response {
    let (status, code) = status_for(err);
    let message = match err {
        RomiError::Storage(detail) => {
            tracing::error!(error = %detail, "storage failure while handling request");
            storage_message.to_string()
        }
        other => other.to_string(),
    };
    json_error(status, code, message)
}

fn json_error(status: StatusCode, code: &'static str, message: String) -> warp::reply::Response {
    let body = ErrorBody { error: message, code };
    warp::reply::with_status(warp::reply::json(&body), status).into_response()
}

pub async fn handle_rejection(err: Rejection) -> Result<warp::reply::Response, Infallible> {
    if let Some(rejection) = err.find::<ApiRejection>() {
        return Ok(error_reply(&rejection.error, rejection.storage_message));
    }

    let response = if err.is_not_found() {
        json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "Ruta no encontrada".to_string())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        json_error(StatusCode::BAD_REQUEST, "INVALID_INPUT", format!("Cuerpo no válido: {}", e))
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        json_error(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "UNSUPPORTED_MEDIA_TYPE",
            "El cuerpo debe ser JSON".to_string(),
        )
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        json_error(
            StatusCode::PAYLOAD_TOO_LARGE,
            "PAYLOAD_TOO_LARGE",
            "Cuerpo de la petición demasiado grande".to_string(),
        )
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        json_error(StatusCode::METHOD_NOT_ALLOWED, "METHOD_NOT_ALLOWED", "Método no permitido".to_string())
    } else {
        tracing::error!(rejection = ?err, "unhandled rejection");
        json_error(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", "Error interno".to_string())
    };

    Ok(response)
}
