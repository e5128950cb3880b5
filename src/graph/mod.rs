//! Client-side graph bookkeeping: the live view and the association filter.

mod filter;
mod model;
mod view;

pub use filter::{AssociationFilter, AssociationGroup, ToggleOutcome};
pub use model::{Arrow, EdgeKey, INCOMPLETE_PREFIX, ViewEdge, ViewNode};
pub use view::{GraphView, MergeOutcome, ViewError};

#[cfg(test)]
pub(crate) use view::tests as fixtures;
