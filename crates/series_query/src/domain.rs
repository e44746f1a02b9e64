mod series;
mod series_query_service;

pub use series::*;
pub use series_query_service::*;
