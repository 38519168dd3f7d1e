use serde_derive::{Deserialize, Serialize};

use db::models::Verse;

use crate::error::Error;

/// Error data for a JSON response.
#[derive(Clone, Deserialize, Serialize, Debug)]
pub struct ErrorData {
    pub message: String,
}

impl ErrorData {
    /// Creates new error data from an [Error](crate::error::Error).
    pub fn from_error(e: &Error) -> Self {
        Self {
            message: e.to_string(),
        }
    }
}

/// Data for the search endpoint.
#[derive(Clone, Deserialize, Serialize, Debug)]
pub struct SearchResultData {
    pub query: String,
    pub count: usize,
    pub results: Vec<Verse>,
}

impl SearchResultData {
    pub fn new(query: String, results: Vec<Verse>) -> Self {
        Self {
            query,
            count: results.len(),
            results,
        }
    }
}

/// Acknowledgement for write endpoints.
#[derive(Clone, Deserialize, Serialize, Debug)]
pub struct StatusData {
    pub status: String,
}

impl StatusData {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}
