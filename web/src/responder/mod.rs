mod data;

pub use self::data::{ErrorData, SearchResultData, StatusData};
