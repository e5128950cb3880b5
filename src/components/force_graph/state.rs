use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use crate::api::NodeId;
use crate::config::Shape;
use crate::graph::{Arrow, EdgeKey, GraphView, ViewNode};

pub const NODE_RADIUS: f64 = 7.0;
pub const HIT_RADIUS: f64 = 12.0;
/// Pointer travel (px) below which a press counts as a click.
pub const CLICK_SLOP: f64 = 4.0;
const SPAWN_RADIUS: f64 = 120.0;
const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 10.0;

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub id: NodeId,
	pub label: String,
	pub color: String,
	pub shape: Shape,
	pub is_ghost: bool,
}

impl From<&ViewNode> for NodeInfo {
	fn from(node: &ViewNode) -> Self {
		Self {
			id: node.id.clone(),
			label: node.label(),
			color: node.color.clone(),
			shape: node.shape,
			is_ghost: node.is_ghost,
		}
	}
}

#[derive(Clone, Debug)]
pub struct LayoutEdge {
	pub source: DefaultNodeIdx,
	pub target: DefaultNodeIdx,
	pub label: String,
	pub dashed: bool,
	pub arrow: Arrow,
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub moved: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<DefaultNodeIdx>,
	pub neighbors: HashSet<DefaultNodeIdx>,
	pub highlight_t: f64,
	pub prev_node: Option<DefaultNodeIdx>,
	pub prev_neighbors: HashSet<DefaultNodeIdx>,
	delay_t: f64,
}

/// Layout and interaction state of the canvas, mirrored from a [`GraphView`].
pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	pub flow_time: f64,
	pub edges: Vec<LayoutEdge>,
	index: HashMap<NodeId, DefaultNodeIdx>,
	linked: HashSet<EdgeKey>,
}

fn simulation() -> SimulationParameters {
	SimulationParameters {
		force_charge: 250.0,
		force_spring: 0.05,
		force_max: 100.0,
		node_speed: 3000.0,
		damping_factor: 0.9,
	}
}

impl ForceGraphState {
	pub fn new(view: &GraphView, width: f64, height: f64) -> Self {
		let mut state = Self {
			graph: ForceGraph::new(simulation()),
			edges: Vec::new(),
			index: HashMap::new(),
			linked: HashSet::new(),
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			animation_running: true,
			flow_time: 0.0,
		};
		state.sync(view);
		state
	}

	/// Brings the layout in line with `view`. Added nodes spawn next to a
	/// neighbour already on screen; removals rebuild the layout while
	/// keeping the positions of surviving nodes.
	pub fn sync(&mut self, view: &GraphView) {
		let stale = self.index.keys().any(|id| !view.contains_node(id));
		let positions = if stale { self.rebuild() } else { HashMap::new() };

		let total = view.len().max(1);
		for (i, node) in view.nodes().iter().enumerate() {
			if self.index.contains_key(&node.id) {
				continue;
			}
			let ((x, y), is_anchor) = positions
				.get(&node.id)
				.copied()
				.unwrap_or_else(|| (self.spawn_point(view, node, i, total), false));
			let idx = self.graph.add_node(NodeData {
				x,
				y,
				mass: 10.0,
				is_anchor,
				user_data: NodeInfo::from(node),
			});
			self.index.insert(node.id.clone(), idx);
		}

		let labels: HashMap<&str, &ViewNode> =
			view.nodes().iter().map(|n| (n.id.as_str(), n)).collect();
		self.graph.visit_nodes_mut(|node| {
			if let Some(current) = labels.get(node.data.user_data.id.as_str()) {
				node.data.user_data.label = current.label();
			}
		});

		self.edges.clear();
		for edge in view.edges() {
			let (Some(&source), Some(&target)) =
				(self.index.get(&edge.source), self.index.get(&edge.target))
			else {
				continue;
			};
			if self.linked.insert(edge.key()) {
				self.graph.add_edge(source, target, EdgeData::default());
			}
			self.edges.push(LayoutEdge {
				source,
				target,
				label: edge.name.clone(),
				dashed: edge.is_broken,
				arrow: edge.arrow,
			});
		}
	}

	// Empties the simulation, returning where each node was.
	fn rebuild(&mut self) -> HashMap<NodeId, ((f32, f32), bool)> {
		let mut positions = HashMap::new();
		self.graph.visit_nodes(|node| {
			positions.insert(
				node.data.user_data.id.clone(),
				((node.x(), node.y()), node.data.is_anchor),
			);
		});
		self.graph = ForceGraph::new(simulation());
		self.index.clear();
		self.linked.clear();
		self.hover = HoverState::default();
		self.drag = DragState::default();
		positions
	}

	fn spawn_point(&self, view: &GraphView, node: &ViewNode, i: usize, total: usize) -> (f32, f32) {
		let angle = (i as f64) * 2.0 * PI / total as f64;
		let neighbour = view
			.edges()
			.iter()
			.filter_map(|e| e.other(&node.id))
			.find_map(|id| self.index.get(id));

		let mut origin = (0.0f32, 0.0f32);
		let mut radius = SPAWN_RADIUS;
		if let Some(&idx) = neighbour {
			self.graph.visit_nodes(|n| {
				if n.index() == idx {
					origin = (n.x(), n.y());
				}
			});
			radius = SPAWN_RADIUS / 3.0;
		}
		(
			origin.0 + (radius * angle.cos()) as f32,
			origin.1 + (radius * angle.sin()) as f32,
		)
	}

	pub fn node_id(&self, idx: DefaultNodeIdx) -> Option<NodeId> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some(node.data.user_data.id.clone());
			}
		});
		found
	}

	/// Current layout position of every node.
	pub fn positions(&self) -> HashMap<DefaultNodeIdx, (f64, f64)> {
		let mut positions = HashMap::new();
		self.graph.visit_nodes(|node| {
			positions.insert(node.index(), (node.x() as f64, node.y() as f64));
		});
		positions
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			// HIT_RADIUS is in world-space, scales with zoom like nodes
			if (dx * dx + dy * dy).sqrt() < HIT_RADIUS {
				found = Some(node.index());
			}
		});
		found
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Save previous state for fade-out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			for edge in &self.edges {
				if edge.source == idx {
					self.hover.neighbors.insert(edge.target);
				} else if edge.target == idx {
					self.hover.neighbors.insert(edge.source);
				}
			}
		}
	}

	pub fn is_highlighted(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	pub fn tick(&mut self, dt: f32) {
		self.graph.update(dt);
		self.flow_time += dt as f64;

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt as f64).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	fn position_of(&self, idx: DefaultNodeIdx) -> Option<(f32, f32)> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some((node.x(), node.y()));
			}
		});
		found
	}

	fn place(&mut self, idx: DefaultNodeIdx, position: Option<(f32, f32)>) {
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				if let Some((x, y)) = position {
					node.data.x = x;
					node.data.y = y;
				}
				node.data.is_anchor = true;
			}
		});
	}

	/// Pointer pressed at screen `(x, y)`: grabs the node there, otherwise
	/// starts panning.
	pub fn press(&mut self, x: f64, y: f64) {
		match self.node_at_position(x, y) {
			Some(idx) => {
				let (node_x, node_y) = self.position_of(idx).unwrap_or_default();
				self.drag = DragState {
					active: true,
					moved: false,
					node_idx: Some(idx),
					start_x: x,
					start_y: y,
					node_start_x: node_x,
					node_start_y: node_y,
				};
			}
			None => {
				self.pan = PanState {
					active: true,
					start_x: x,
					start_y: y,
					transform_start_x: self.transform.x,
					transform_start_y: self.transform.y,
				};
			}
		}
	}

	/// Pointer moved to screen `(x, y)`. Drags the grabbed node once it has
	/// travelled past [`CLICK_SLOP`], pans, or updates the hover target.
	/// Returns the id of the hovered node.
	pub fn pointer_move(&mut self, x: f64, y: f64) -> Option<NodeId> {
		if let (true, Some(idx)) = (self.drag.active, self.drag.node_idx) {
			let (dx, dy) = (x - self.drag.start_x, y - self.drag.start_y);
			self.drag.moved |= dx.hypot(dy) > CLICK_SLOP;
			if self.drag.moved {
				let k = self.transform.k;
				let target = (
					self.drag.node_start_x + (dx / k) as f32,
					self.drag.node_start_y + (dy / k) as f32,
				);
				self.place(idx, Some(target));
			}
			return self.node_id(idx);
		}

		if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (x - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (y - self.pan.start_y);
		}
		let hovered = self.node_at_position(x, y);
		self.set_hover(hovered);
		hovered.and_then(|idx| self.node_id(idx))
	}

	/// Pointer released. A dragged node stays pinned where it was dropped;
	/// a node pressed without moving counts as clicked and its id is
	/// returned.
	pub fn release(&mut self) -> Option<NodeId> {
		let grabbed = self.drag.node_idx.filter(|_| self.drag.active);
		let clicked = match grabbed {
			Some(idx) if self.drag.moved => {
				self.place(idx, None);
				None
			}
			Some(idx) => self.node_id(idx),
			None => None,
		};
		self.drag = DragState::default();
		self.pan.active = false;
		clicked
	}

	/// Pointer left the canvas.
	pub fn leave(&mut self) {
		self.drag = DragState::default();
		self.pan.active = false;
		self.set_hover(None);
	}

	/// Zooms by one wheel step, keeping screen `(x, y)` fixed.
	pub fn zoom_at(&mut self, x: f64, y: f64, zoom_in: bool) {
		let factor = if zoom_in { 1.1 } else { 0.9 };
		let k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = k;
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use super::*;
	use crate::api::GraphPayload;
	use crate::graph::fixtures::{airport_graph, edge, node};

	fn layout_ids(state: &ForceGraphState) -> Vec<String> {
		let mut ids = Vec::new();
		state
			.graph
			.visit_nodes(|n| ids.push(n.data.user_data.id.clone()));
		ids.sort();
		ids
	}

	#[test]
	fn mirrors_view_nodes_and_edges() {
		let view = GraphView::create(&airport_graph(), Arc::default());
		let state = ForceGraphState::new(&view, 800.0, 600.0);

		assert_eq!(layout_ids(&state), vec!["1", "2", "3"]);
		assert_eq!(state.edges.len(), 2);
	}

	#[test]
	fn sync_adds_and_removes() {
		let mut view = GraphView::create(&airport_graph(), Arc::default());
		let mut state = ForceGraphState::new(&view, 800.0, 600.0);

		view.merge(&GraphPayload {
			nodes: vec![node("4", "RunwayDirection", 1)],
			edges: vec![edge("2", "4")],
		});
		state.sync(&view);
		assert_eq!(layout_ids(&state), vec!["1", "2", "3", "4"]);
		assert_eq!(state.edges.len(), 3);

		view.remove_node_by_id("2").unwrap();
		state.sync(&view);
		assert_eq!(layout_ids(&state), vec!["1", "3", "4"]);
		assert_eq!(state.edges.len(), 1);
	}

	// Screen coordinates of the node with the given id.
	fn screen_point(state: &ForceGraphState, id: &str) -> (f64, f64) {
		let (x, y) = state.positions()[&state.index[id]];
		(
			x * state.transform.k + state.transform.x,
			y * state.transform.k + state.transform.y,
		)
	}

	#[test]
	fn press_and_release_in_place_is_a_click() {
		let view = GraphView::create(&airport_graph(), Arc::default());
		let mut state = ForceGraphState::new(&view, 800.0, 600.0);
		let (x, y) = screen_point(&state, "1");

		state.press(x, y);
		state.pointer_move(x + 1.0, y + 1.0);
		assert_eq!(state.release().as_deref(), Some("1"));
		assert!(!state.drag.active);
	}

	#[test]
	fn dragging_pins_the_node() {
		let view = GraphView::create(&airport_graph(), Arc::default());
		let mut state = ForceGraphState::new(&view, 800.0, 600.0);
		let (x, y) = screen_point(&state, "1");

		state.press(x, y);
		assert_eq!(state.pointer_move(x + 30.0, y).as_deref(), Some("1"));
		assert_eq!(state.release(), None);

		let (nx, _) = screen_point(&state, "1");
		assert!((nx - (x + 30.0)).abs() < 1e-3);
		let mut anchored = false;
		state.graph.visit_nodes(|n| {
			if n.data.user_data.id == "1" {
				anchored = n.data.is_anchor;
			}
		});
		assert!(anchored);
	}

	#[test]
	fn background_drag_pans() {
		let view = GraphView::create(&airport_graph(), Arc::default());
		let mut state = ForceGraphState::new(&view, 800.0, 600.0);

		state.press(5.0, 5.0);
		assert_eq!(state.pointer_move(25.0, 15.0), None);
		assert_eq!(state.release(), None);
		assert_eq!((state.transform.x, state.transform.y), (420.0, 310.0));
	}

	#[test]
	fn zoom_keeps_pointer_fixed_and_clamps() {
		let view = GraphView::create(&airport_graph(), Arc::default());
		let mut state = ForceGraphState::new(&view, 800.0, 600.0);
		let before = state.screen_to_graph(100.0, 50.0);

		state.zoom_at(100.0, 50.0, true);
		let after = state.screen_to_graph(100.0, 50.0);
		assert!((before.0 - after.0).abs() < 1e-9 && (before.1 - after.1).abs() < 1e-9);

		for _ in 0..100 {
			state.zoom_at(0.0, 0.0, false);
		}
		assert_eq!(state.transform.k, MIN_ZOOM);
	}

	#[test]
	fn hover_collects_neighbors() {
		let view = GraphView::create(&airport_graph(), Arc::default());
		let mut state = ForceGraphState::new(&view, 800.0, 600.0);
		let airport = state.index["1"];

		state.set_hover(Some(airport));
		assert_eq!(state.hover.neighbors.len(), 2);
		assert_eq!(state.node_id(airport).as_deref(), Some("1"));
	}
}
