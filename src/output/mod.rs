pub mod schema;

pub use schema::{AnalysisResponse, Level, Recommendation, MAX_CHECK_IN_DAYS, MIN_CHECK_IN_DAYS};
