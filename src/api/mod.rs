//! Client side of the dataset HTTP API.

mod client;
mod error;
mod request;
mod types;

pub use client::{ApiClient, GroupQuery};
pub use error::ApiError;
pub use request::{RequestTracker, Ticket};
pub use types::{
	Dataset, Direction, EdgePayload, FeatureGroupPage, FeatureGroupSummary, Field, GraphPayload,
	NodeId, NodePayload,
};
