use crate::api::NodeId;

/// Node under the pointer, in canvas coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Hovered {
	pub id: NodeId,
	pub x: f64,
	pub y: f64,
}
