use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use thiserror::Error;

use super::model::{EdgeKey, ViewEdge, ViewNode};
use crate::api::{GraphPayload, NodeId};
use crate::config::StyleConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
	#[error("node {0} is not in the view")]
	NodeNotFound(NodeId),
}

/// What a merge actually changed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergeOutcome {
	pub added_nodes: Vec<NodeId>,
	pub added_edges: usize,
}

impl MergeOutcome {
	pub fn is_empty(&self) -> bool {
		self.added_nodes.is_empty() && self.added_edges == 0
	}
}

/// The live node/edge collection behind the canvas.
///
/// Node ids are unique, and at most one edge exists per unordered endpoint
/// pair. Repeated partial updates from the server are merged without
/// overwriting or duplicating what is already shown.
#[derive(Clone, Debug, Default)]
pub struct GraphView {
	styles: Arc<StyleConfig>,
	nodes: Vec<ViewNode>,
	edges: Vec<ViewEdge>,
	edge_keys: HashSet<EdgeKey>,
}

impl GraphView {
	/// Builds a fresh view from a full graph payload.
	pub fn create(graph: &GraphPayload, styles: Arc<StyleConfig>) -> Self {
		let mut view = Self {
			styles,
			..Self::default()
		};
		view.merge(graph);
		view
	}

	/// Adds the unseen nodes and edges of `graph`, then refreshes the
	/// incomplete marker of every node from its materialized edge count.
	pub fn merge(&mut self, graph: &GraphPayload) -> MergeOutcome {
		let mut payload_degree: HashMap<&str, usize> = HashMap::new();
		for edge in &graph.edges {
			*payload_degree.entry(&edge.source).or_default() += 1;
			if edge.target != edge.source {
				*payload_degree.entry(&edge.target).or_default() += 1;
			}
		}

		let mut outcome = MergeOutcome::default();
		for node in &graph.nodes {
			let degree = payload_degree.get(node.id.as_str()).copied().unwrap_or(0);
			if self.add_node(ViewNode::from_payload(node, degree, &self.styles)) {
				outcome.added_nodes.push(node.id.clone());
			}
		}
		for edge in &graph.edges {
			if self.add_edge(edge.into()) {
				outcome.added_edges += 1;
			}
		}

		self.refresh_incomplete();
		log::debug!(
			"Merged {} nodes and {} edges ({} nodes, {} edges in view)",
			outcome.added_nodes.len(),
			outcome.added_edges,
			self.len(),
			self.edge_count()
		);
		outcome
	}

	/// Inserts `node` unless a node with the same id is present.
	pub fn add_node(&mut self, node: ViewNode) -> bool {
		if self.contains_node(&node.id) {
			return false;
		}
		self.nodes.push(node);
		true
	}

	/// Inserts `edge` unless its endpoint pair is already connected, or an
	/// endpoint is missing.
	pub fn add_edge(&mut self, edge: ViewEdge) -> bool {
		if !self.contains_node(&edge.source) || !self.contains_node(&edge.target) {
			return false;
		}
		if self.contains_edge(&edge.source, &edge.target) {
			return false;
		}
		self.edge_keys.insert(edge.key());
		self.edges.push(edge);
		true
	}

	/// Detaches a node together with every edge touching it. The detached
	/// edges are returned so callers can restore them later.
	pub fn remove_node_by_id(&mut self, id: &str) -> Result<Vec<ViewEdge>, ViewError> {
		let position = self
			.nodes
			.iter()
			.position(|n| n.id == id)
			.ok_or_else(|| ViewError::NodeNotFound(id.to_owned()))?;
		self.nodes.remove(position);

		let (detached, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.edges)
			.into_iter()
			.partition(|e| e.touches(id));
		for edge in &detached {
			self.edge_keys.remove(&edge.key());
		}
		self.edges = kept;
		Ok(detached)
	}

	/// Ids reachable from `root` along source to target edges without
	/// passing through `excluded`.
	///
	/// Iterative depth-first walk. The root itself is never part of the
	/// result and each id appears once, so cycles terminate.
	pub fn branch_ids(&self, root: &str, excluded: &HashSet<NodeId>) -> Vec<NodeId> {
		if !self.contains_node(root) {
			return Vec::new();
		}
		let adjacency = self.adjacency(false);

		let mut visited: HashSet<&str> = excluded.iter().map(String::as_str).collect();
		visited.insert(root);
		let mut stack = vec![root];
		let mut branch = Vec::new();

		while let Some(current) = stack.pop() {
			for &next in adjacency.get(current).into_iter().flatten() {
				if visited.insert(next) {
					branch.push(next.to_owned());
					stack.push(next);
				}
			}
		}
		branch
	}

	pub fn contains_node(&self, id: &str) -> bool {
		self.nodes.iter().any(|n| n.id == id)
	}

	pub fn contains_edge(&self, a: &str, b: &str) -> bool {
		self.edge_keys.contains(&EdgeKey::new(a, b))
	}

	pub fn node(&self, id: &str) -> Option<&ViewNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub fn nodes(&self) -> &[ViewNode] {
		&self.nodes
	}

	pub fn edges(&self) -> &[ViewEdge] {
		&self.edges
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	/// Ids of every node of the given feature type.
	pub fn ids_named(&self, name: &str) -> Vec<NodeId> {
		self.nodes
			.iter()
			.filter(|n| n.name == name)
			.map(|n| n.id.clone())
			.collect()
	}

	/// `seeds` plus every node connected to them, in either direction,
	/// without entering `barrier`.
	pub fn closure<'a>(
		&self,
		seeds: impl IntoIterator<Item = &'a str>,
		barrier: &HashSet<NodeId>,
	) -> HashSet<NodeId> {
		let adjacency = self.adjacency(true);
		let mut reached: HashSet<NodeId> = HashSet::new();
		let mut stack: Vec<&str> = Vec::new();
		for seed in seeds {
			if let Some(node) = self.node(seed) {
				if reached.insert(node.id.clone()) {
					stack.push(&node.id);
				}
			}
		}

		while let Some(current) = stack.pop() {
			for &next in adjacency.get(current).into_iter().flatten() {
				if !barrier.contains(next) && reached.insert(next.to_owned()) {
					stack.push(next);
				}
			}
		}
		reached
	}

	fn adjacency(&self, both_ways: bool) -> HashMap<&str, Vec<&str>> {
		let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
		for edge in &self.edges {
			adjacency.entry(&edge.source).or_default().push(&edge.target);
			if both_ways {
				adjacency.entry(&edge.target).or_default().push(&edge.source);
			}
		}
		adjacency
	}

	/// Sets each node's incomplete marker from its materialized edge count.
	pub fn refresh_incomplete(&mut self) {
		let mut degree: HashMap<&str, usize> = HashMap::new();
		for edge in &self.edges {
			*degree.entry(&edge.source).or_default() += 1;
			if edge.target != edge.source {
				*degree.entry(&edge.target).or_default() += 1;
			}
		}
		for node in &mut self.nodes {
			let materialized = degree.get(node.id.as_str()).copied().unwrap_or(0);
			node.incomplete = materialized < node.assoc_count;
		}
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::api::{EdgePayload, NodePayload};
	use crate::graph::model::INCOMPLETE_PREFIX;

	pub(crate) fn node(id: &str, name: &str, assoc_count: usize) -> NodePayload {
		NodePayload {
			id: id.into(),
			name: name.into(),
			abbrev: Some(name.into()),
			fields: Vec::new(),
			fields_concat: false,
			assoc_count,
			is_ghost: false,
			color: None,
			shape: None,
		}
	}

	pub(crate) fn edge(source: &str, target: &str) -> EdgePayload {
		EdgePayload {
			source: source.into(),
			target: target.into(),
			name: "assoc".into(),
			is_broken: false,
			direction: None,
		}
	}

	pub(crate) fn airport_graph() -> GraphPayload {
		GraphPayload {
			nodes: vec![
				node("1", "Airport", 2),
				node("2", "Runway", 0),
				node("3", "Runway", 0),
			],
			edges: vec![edge("1", "2"), edge("1", "3")],
		}
	}

	fn ids(view: &GraphView) -> Vec<&str> {
		view.nodes().iter().map(|n| n.id.as_str()).collect()
	}

	#[test]
	fn fully_expanded_node_has_no_marker() {
		let view = GraphView::create(&airport_graph(), Arc::default());
		let airport = view.node("1").unwrap();
		assert!(!airport.incomplete);
		assert!(!airport.label().starts_with(INCOMPLETE_PREFIX));
	}

	#[test]
	fn merge_is_idempotent() {
		let mut view = GraphView::create(&airport_graph(), Arc::default());
		let partial = GraphPayload {
			nodes: vec![node("3", "Runway", 2), node("4", "RunwayDirection", 1)],
			edges: vec![edge("3", "4")],
		};

		let first = view.merge(&partial);
		assert_eq!(first.added_nodes, vec!["4".to_string()]);
		assert_eq!(first.added_edges, 1);
		let snapshot = (view.nodes().to_vec(), view.edges().to_vec());

		let second = view.merge(&partial);
		assert!(second.is_empty());
		assert_eq!((view.nodes().to_vec(), view.edges().to_vec()), snapshot);
	}

	#[test]
	fn existing_node_is_not_overwritten() {
		let mut view = GraphView::create(&airport_graph(), Arc::default());
		let mut renamed = node("2", "Runway", 0);
		renamed.abbrev = Some("Other".into());
		view.merge(&GraphPayload {
			nodes: vec![renamed],
			edges: Vec::new(),
		});
		assert_eq!(view.node("2").unwrap().base_label, "Runway");
	}

	#[test]
	fn reversed_edge_is_a_duplicate() {
		let mut view = GraphView::create(&airport_graph(), Arc::default());
		assert_eq!(view.edge_count(), 2);

		view.merge(&GraphPayload {
			nodes: Vec::new(),
			edges: vec![edge("2", "1")],
		});
		assert_eq!(view.edge_count(), 2);
		assert!(view.contains_edge("2", "1"));
	}

	#[test]
	fn edge_to_missing_node_is_skipped() {
		let mut view = GraphView::create(&airport_graph(), Arc::default());
		let outcome = view.merge(&GraphPayload {
			nodes: Vec::new(),
			edges: vec![edge("1", "99")],
		});
		assert_eq!(outcome.added_edges, 0);
	}

	#[test]
	fn marker_tracks_materialized_edges() {
		let graph = GraphPayload {
			nodes: vec![node("1", "Airport", 2), node("2", "Runway", 1)],
			edges: vec![edge("1", "2")],
		};
		let mut view = GraphView::create(&graph, Arc::default());
		assert!(view.node("1").unwrap().incomplete);
		assert!(!view.node("2").unwrap().incomplete);

		view.merge(&GraphPayload {
			nodes: vec![node("1", "Airport", 2), node("3", "Navaid", 1)],
			edges: vec![edge("3", "1")],
		});
		for n in view.nodes() {
			let degree = view.edges().iter().filter(|e| e.touches(&n.id)).count();
			assert_eq!(n.incomplete, degree < n.assoc_count);
		}
		assert_eq!(view.node("1").unwrap().label(), "Airport");
	}

	#[test]
	fn remove_detaches_touching_edges() {
		let mut view = GraphView::create(&airport_graph(), Arc::default());
		let detached = view.remove_node_by_id("2").unwrap();

		assert_eq!(detached.len(), 1);
		assert_eq!(ids(&view), vec!["1", "3"]);
		assert!(!view.contains_edge("1", "2"));
		assert_eq!(
			view.remove_node_by_id("2"),
			Err(ViewError::NodeNotFound("2".into()))
		);
	}

	#[test]
	fn branch_ids_terminates_on_cycles() {
		let graph = GraphPayload {
			nodes: ["a", "b", "c", "d"]
				.iter()
				.map(|id| node(id, "X", 0))
				.collect(),
			edges: vec![edge("a", "b"), edge("b", "c"), edge("c", "a"), edge("c", "d")],
		};
		let view = GraphView::create(&graph, Arc::default());

		let mut branch = view.branch_ids("a", &HashSet::new());
		branch.sort();
		assert_eq!(branch, vec!["b", "c", "d"]);
	}

	#[test]
	fn closure_respects_barrier() {
		let graph = GraphPayload {
			nodes: ["f", "a", "b", "x"]
				.iter()
				.map(|id| node(id, "X", 0))
				.collect(),
			edges: vec![edge("f", "a"), edge("a", "x"), edge("f", "b")],
		};
		let view = GraphView::create(&graph, Arc::default());
		let barrier: HashSet<NodeId> = ["a".to_string()].into();

		let reached = view.closure(["f", "missing"], &barrier);
		let expected: HashSet<NodeId> = ["f".to_string(), "b".to_string()].into();
		assert_eq!(reached, expected);
	}

	#[test]
	fn branch_ids_stops_at_excluded() {
		let graph = GraphPayload {
			nodes: ["root", "m", "x", "y"]
				.iter()
				.map(|id| node(id, "X", 0))
				.collect(),
			edges: vec![edge("root", "m"), edge("m", "x"), edge("x", "y")],
		};
		let view = GraphView::create(&graph, Arc::default());
		let excluded: HashSet<NodeId> = ["root".to_string(), "x".to_string()].into();

		assert!(view.branch_ids("m", &excluded).is_empty());
		assert!(view.branch_ids("missing", &excluded).is_empty());
	}

	#[test]
	fn branch_ids_ignores_incoming_edges() {
		let graph = GraphPayload {
			nodes: ["r", "d", "n"].iter().map(|id| node(id, "X", 0)).collect(),
			edges: vec![edge("r", "d"), edge("n", "r")],
		};
		let view = GraphView::create(&graph, Arc::default());

		assert_eq!(view.branch_ids("r", &HashSet::new()), vec!["d"]);
		assert_eq!(view.branch_ids("d", &HashSet::new()), Vec::<NodeId>::new());
	}
}
