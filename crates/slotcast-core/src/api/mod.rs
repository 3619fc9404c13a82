//! Request and response shapes exchanged with the serving layer.

pub mod request;
pub mod response;

pub use request::{CommitRequest, FeedbackRequest, RequestParams, SuggestRequest};
pub use response::{Ack, EventListing, Events, Suggestion};
