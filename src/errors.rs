use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::dtos::ErrorDto;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    Decode(#[from] base64::DecodeError),

    #[error("{0}")]
    Payload(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Storage(#[from] diesel::result::Error),

    #[error("couldn't get db connection from pool: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("blocking task was cancelled")]
    Blocking(#[from] actix_web::error::BlockingError),
}

impl StoreError {
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::Decode(_) => "decode",
            StoreError::Payload(_) => "payload",
            StoreError::Validation(_) => "validation",
            StoreError::Storage(_) => "storage",
            StoreError::Pool(_) => "pool",
            StoreError::Blocking(_) => "blocking",
        }
    }
}

/// A failed request: the endpoint's fixed message plus what went wrong.
#[derive(Error, Debug)]
#[error("{message}: {source}")]
pub struct ApiError {
    pub message: &'static str,
    #[source]
    pub source: StoreError,
}

impl ApiError {
    pub const UPLOAD: &'static str = "Error uploading data";
    pub const LIST: &'static str = "Error getting data";

    pub fn upload(source: impl Into<StoreError>) -> Self {
        ApiError {
            message: Self::UPLOAD,
            source: source.into(),
        }
    }

    pub fn list(source: impl Into<StoreError>) -> Self {
        ApiError {
            message: Self::LIST,
            source: source.into(),
        }
    }
}

// Every kind stays a 500 so clients see one failure shape.
impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        tracing::error!(kind = self.source.kind(), "{}", self);
        HttpResponse::build(self.status_code()).json(ErrorDto {
            message: self.message.to_string(),
            error: self.source.to_string(),
        })
    }
}
