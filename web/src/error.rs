use std::convert::From;

use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use thiserror::Error;

use db::{DbError, PassageError};

use crate::responder::ErrorData;

/// Error type for the scripture API.
#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("There was an error with the blocking thread pool.")]
    Blocking,

    #[error("There was a database error.")]
    Db,

    #[error("'{reference}' is not a valid Bible reference.")]
    InvalidReference { reference: String },

    #[error("'{book}' was not found.")]
    BookNotFound { book: String },

    #[error("Translation '{translation}' was not found.")]
    TranslationNotFound { translation: String },

    #[error("'{reference}' was not found in translation '{translation}'.")]
    PassageNotFound {
        reference: String,
        translation: String,
    },

    #[error("{message}")]
    InvalidRequest { message: String },
}

impl From<DbError> for Error {
    fn from(e: DbError) -> Self {
        error!("{}", e);
        Error::Db
    }
}

impl From<PassageError> for Error {
    fn from(e: PassageError) -> Self {
        match e {
            PassageError::MalformedReference { reference } => Error::InvalidReference { reference },
            PassageError::BookNotFound { book } => Error::BookNotFound { book },
            PassageError::TranslationNotFound { translation } => {
                Error::TranslationNotFound { translation }
            }
            PassageError::PassageNotFound {
                reference,
                translation,
            } => Error::PassageNotFound {
                reference,
                translation,
            },
            PassageError::Store(e) => e.into(),
        }
    }
}

/// Error to display as JSON
#[derive(Error, Debug)]
#[error("Error: {0}")]
pub struct JsonError(pub Error);

impl From<Error> for JsonError {
    fn from(e: Error) -> Self {
        JsonError(e)
    }
}

impl From<PassageError> for JsonError {
    fn from(e: PassageError) -> Self {
        JsonError(e.into())
    }
}

impl From<DbError> for JsonError {
    fn from(e: DbError) -> Self {
        JsonError(e.into())
    }
}

impl From<BlockingError> for JsonError {
    fn from(e: BlockingError) -> Self {
        JsonError(e.into())
    }
}

impl From<BlockingError> for Error {
    fn from(e: BlockingError) -> Self {
        error!("{}", e);
        Error::Blocking
    }
}

impl ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        match self.0 {
            Error::Blocking | Error::Db => StatusCode::INTERNAL_SERVER_ERROR,
            Error::InvalidReference { .. }
            | Error::BookNotFound { .. }
            | Error::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            Error::TranslationNotFound { .. } | Error::PassageNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorData::from_error(&self.0))
    }
}
