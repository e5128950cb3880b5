use crate::api::{Direction, EdgePayload, Field, NodeId, NodePayload};
use crate::config::{GHOST_COLOR, Shape, StyleConfig};

/// Marks a node whose associations are not all on screen yet.
pub const INCOMPLETE_PREFIX: &str = "[+] ";

/// A feature as shown in the view.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewNode {
	pub id: NodeId,
	pub name: String,
	/// Label without the incomplete marker.
	pub base_label: String,
	pub incomplete: bool,
	pub fields: Vec<Field>,
	pub assoc_count: usize,
	pub is_ghost: bool,
	pub color: String,
	pub shape: Shape,
}

impl ViewNode {
	/// `payload_degree` is the number of edges in the same payload touching
	/// this node, used for the initial incomplete marker.
	pub fn from_payload(node: &NodePayload, payload_degree: usize, styles: &StyleConfig) -> Self {
		let style = styles.get(&node.name);

		let abbrev = style
			.and_then(|s| s.abbrev.clone())
			.or_else(|| node.abbrev.clone())
			.unwrap_or_else(|| node.name.clone());
		let mut base_label = abbrev;
		if !node.fields.is_empty() {
			let concat = style
				.and_then(|s| s.concat_fields)
				.unwrap_or(node.fields_concat);
			let values: Vec<&str> = node.fields.iter().map(|f| f.value.as_str()).collect();
			base_label.push_str(": ");
			base_label.push_str(&values.join(if concat { "" } else { "," }));
		}

		let (color, shape) = if node.is_ghost {
			(GHOST_COLOR.to_owned(), Shape::Star)
		} else {
			let color = style
				.and_then(|s| s.color.clone())
				.or_else(|| node.color.clone())
				.unwrap_or_else(|| StyleConfig::palette_color(&node.name).to_owned());
			let shape = style
				.and_then(|s| s.shape)
				.or_else(|| node.shape.as_deref().and_then(Shape::parse))
				.unwrap_or_default();
			(color, shape)
		};

		Self {
			id: node.id.clone(),
			name: node.name.clone(),
			base_label,
			incomplete: node.assoc_count > payload_degree,
			fields: node.fields.clone(),
			assoc_count: node.assoc_count,
			is_ghost: node.is_ghost,
			color,
			shape,
		}
	}

	/// Label as drawn, with the incomplete marker when applicable.
	pub fn label(&self) -> String {
		if self.incomplete {
			format!("{INCOMPLETE_PREFIX}{}", self.base_label)
		} else {
			self.base_label.clone()
		}
	}

	/// Rows of the hover popup: header, id, fields, association count.
	pub fn popup_rows(&self) -> Vec<(String, String)> {
		let mut rows = Vec::with_capacity(self.fields.len() + 3);
		rows.push((self.name.clone(), String::new()));
		rows.push(("ID".into(), format!("{} (Ctrl-C to copy)", self.id)));
		rows.extend(
			self.fields
				.iter()
				.map(|f| (f.name.clone(), f.value.clone())),
		);
		rows.push(("Num of associations".into(), self.assoc_count.to_string()));
		rows
	}
}

/// Where an edge draws its arrow head.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Arrow {
	#[default]
	None,
	/// At the `target` endpoint.
	To,
	/// At the `source` endpoint.
	From,
}

impl From<Option<Direction>> for Arrow {
	fn from(direction: Option<Direction>) -> Self {
		match direction {
			Some(Direction::Target) => Self::To,
			Some(Direction::Source) => Self::From,
			None => Self::None,
		}
	}
}

/// Unordered endpoint pair; `A-B` and `B-A` are the same key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EdgeKey(NodeId, NodeId);

impl EdgeKey {
	pub fn new(a: &str, b: &str) -> Self {
		if a <= b {
			Self(a.to_owned(), b.to_owned())
		} else {
			Self(b.to_owned(), a.to_owned())
		}
	}
}

/// An association as shown in the view.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewEdge {
	pub source: NodeId,
	pub target: NodeId,
	pub name: String,
	/// Drawn dashed: one endpoint is a ghost.
	pub is_broken: bool,
	pub arrow: Arrow,
}

impl ViewEdge {
	pub fn key(&self) -> EdgeKey {
		EdgeKey::new(&self.source, &self.target)
	}

	pub fn touches(&self, id: &str) -> bool {
		self.source == id || self.target == id
	}

	/// The endpoint opposite `id`, if `id` is one of them.
	pub fn other(&self, id: &str) -> Option<&str> {
		if self.source == id {
			Some(&self.target)
		} else if self.target == id {
			Some(&self.source)
		} else {
			None
		}
	}
}

impl From<&EdgePayload> for ViewEdge {
	fn from(edge: &EdgePayload) -> Self {
		Self {
			source: edge.source.clone(),
			target: edge.target.clone(),
			name: edge.name.clone(),
			is_broken: edge.is_broken,
			arrow: edge.direction.into(),
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	fn payload(id: &str, name: &str) -> NodePayload {
		NodePayload {
			id: id.into(),
			name: name.into(),
			abbrev: None,
			fields: Vec::new(),
			fields_concat: false,
			assoc_count: 0,
			is_ghost: false,
			color: None,
			shape: None,
		}
	}

	#[test]
	fn label_joins_fields() {
		let mut node = payload("1", "Unknown");
		node.abbrev = Some("UNK".into());
		node.fields = vec![
			Field {
				name: "a".into(),
				value: "X".into(),
			},
			Field {
				name: "b".into(),
				value: "Y".into(),
			},
		];
		let styles = StyleConfig::default();
		assert_eq!(ViewNode::from_payload(&node, 0, &styles).label(), "UNK: X,Y");

		node.fields_concat = true;
		assert_eq!(ViewNode::from_payload(&node, 0, &styles).label(), "UNK: XY");
	}

	#[test]
	fn incomplete_marker_from_payload_degree() {
		let mut node = payload("1", "Runway");
		node.assoc_count = 3;
		let view = ViewNode::from_payload(&node, 1, &StyleConfig::embedded().unwrap());
		assert_eq!(view.label(), "[+] RWY");
		assert_eq!(view.shape, Shape::Box);
	}

	#[test]
	fn ghost_overrides_style() {
		let mut node = payload("1", "Runway");
		node.is_ghost = true;
		node.color = Some("#000000".into());
		let view = ViewNode::from_payload(&node, 0, &StyleConfig::embedded().unwrap());
		assert_eq!(view.color, GHOST_COLOR);
		assert_eq!(view.shape, Shape::Star);
	}

	#[test]
	fn server_style_used_without_config() {
		let mut node = payload("1", "Unknown");
		node.color = Some("#abcdef".into());
		node.shape = Some("hexagon".into());
		let view = ViewNode::from_payload(&node, 0, &StyleConfig::default());
		assert_eq!(view.color, "#abcdef");
		assert_eq!(view.shape, Shape::Hexagon);
		assert_eq!(view.base_label, "Unknown");
	}

	#[test]
	fn popup_lists_fields_and_count() {
		let mut node = payload("42", "Navaid");
		node.assoc_count = 2;
		node.fields = vec![Field {
			name: "designator".into(),
			value: "BOR".into(),
		}];
		let rows = ViewNode::from_payload(&node, 0, &StyleConfig::default()).popup_rows();
		assert_eq!(rows[1], ("ID".to_string(), "42 (Ctrl-C to copy)".to_string()));
		assert_eq!(rows[2], ("designator".to_string(), "BOR".to_string()));
		assert_eq!(
			rows.last().unwrap(),
			&("Num of associations".to_string(), "2".to_string())
		);
	}

	#[test]
	fn edge_key_is_unordered() {
		assert_eq!(EdgeKey::new("a", "b"), EdgeKey::new("b", "a"));
		assert_ne!(EdgeKey::new("a", "b"), EdgeKey::new("a", "c"));
	}
}
