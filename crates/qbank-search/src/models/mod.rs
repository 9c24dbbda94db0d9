//! models module

pub mod model_definition;
mod request;
mod response;

pub use model_definition::{MetadataIndex, QuestionRecord, question_id};
pub use request::SearchRequest;
pub use response::{FilterValues, Pagination, SearchResponse};
