//! The controller owning whatever graph is currently on screen.

use std::sync::Arc;

use crate::api::{FeatureGroupPage, GraphPayload, NodeId};
use crate::config::StyleConfig;
use crate::graph::{AssociationFilter, GraphView, MergeOutcome};
use crate::pagination::PageInfo;

/// What the current view is centred on.
#[derive(Clone, Debug, PartialEq)]
pub enum Focus {
	/// A page of a feature group, optionally narrowed by a key.
	FeatureGroup {
		name: String,
		key: Option<String>,
		page: PageInfo,
	},
	/// One feature and its direct associations.
	Feature { id: NodeId, name: String },
}

/// Owns the active view and its association filter. Rebuilt wholesale on
/// every refocus, merged into on expansion.
#[derive(Clone, Debug, Default)]
pub struct Explorer {
	styles: Arc<StyleConfig>,
	/// Bumped whenever `view` is replaced.
	generation: u64,
	view: GraphView,
	filter: AssociationFilter,
	focus: Option<Focus>,
}

impl Explorer {
	pub fn new(styles: Arc<StyleConfig>) -> Self {
		Self {
			styles,
			..Self::default()
		}
	}

	pub fn show_feature_group(
		&mut self,
		name: &str,
		key: Option<String>,
		response: &FeatureGroupPage,
	) {
		self.replace_view(GraphView::create(&response.graph, self.styles.clone()));
		let focused = self.view.ids_named(name);
		self.filter = AssociationFilter::build(self.view.nodes(), name, focused);
		self.focus = Some(Focus::FeatureGroup {
			name: name.to_owned(),
			key: key.filter(|k| !k.is_empty()),
			page: PageInfo::new(response.offset, response.limit, response.size),
		});
		log::info!(
			"Showing {name} features {} ({} nodes)",
			self.page().map(PageInfo::text).unwrap_or_default(),
			self.view.len()
		);
	}

	pub fn show_feature(&mut self, id: &str, name: &str, graph: &GraphPayload) {
		self.replace_view(GraphView::create(graph, self.styles.clone()));
		self.filter = AssociationFilter::build(self.view.nodes(), name, [id.to_owned()]);
		self.focus = Some(Focus::Feature {
			id: id.to_owned(),
			name: name.to_owned(),
		});
		log::info!("Focused feature {name} ({id}), {} nodes", self.view.len());
	}

	/// Merges a one-hop expansion into the view it was requested from.
	/// `None` when that view has since been replaced.
	pub fn expand(&mut self, generation: u64, graph: &GraphPayload) -> Option<MergeOutcome> {
		if generation != self.generation {
			return None;
		}
		Some(self.view.merge(graph))
	}

	/// Returns warnings to surface to the user.
	pub fn toggle_group(&mut self, name: &str) -> Vec<String> {
		self.filter
			.toggle(name, &mut self.view)
			.map(|outcome| outcome.warnings)
			.unwrap_or_default()
	}

	pub fn toggle_all_groups(&mut self) -> Vec<String> {
		self.filter.toggle_all(&mut self.view)
	}

	/// Drops the view, e.g. when another dataset is loaded.
	pub fn clear(&mut self) {
		self.replace_view(GraphView::default());
		self.filter = AssociationFilter::default();
		self.focus = None;
	}

	fn replace_view(&mut self, view: GraphView) {
		self.view = view;
		self.generation += 1;
	}

	/// Identifies the view on screen, for requests that must land on it.
	pub fn generation(&self) -> u64 {
		self.generation
	}

	pub fn view(&self) -> &GraphView {
		&self.view
	}

	pub fn filter(&self) -> &AssociationFilter {
		&self.filter
	}

	pub fn focus(&self) -> Option<&Focus> {
		self.focus.as_ref()
	}

	pub fn page(&self) -> Option<&PageInfo> {
		match &self.focus {
			Some(Focus::FeatureGroup { page, .. }) => Some(page),
			_ => None,
		}
	}

	/// Heading above the graph.
	pub fn description(&self) -> String {
		match &self.focus {
			Some(Focus::FeatureGroup {
				name,
				key: Some(key),
				..
			}) => format!("{name} features with matching key '{key}'"),
			Some(Focus::FeatureGroup { name, .. }) => format!("{name} features"),
			Some(Focus::Feature { id, name }) => format!("{name} ({id})"),
			None => String::new(),
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::graph::fixtures::{airport_graph, edge, node};

	fn page(graph: GraphPayload) -> FeatureGroupPage {
		FeatureGroupPage {
			graph,
			offset: 0,
			limit: 5,
			size: 7,
		}
	}

	#[test]
	fn feature_group_page_focus() {
		let mut explorer = Explorer::default();
		explorer.show_feature_group("Airport", Some("EA".into()), &page(airport_graph()));

		assert_eq!(explorer.description(), "Airport features with matching key 'EA'");
		assert_eq!(explorer.page().unwrap().text(), "1-5 of 7");
		assert_eq!(explorer.filter().groups().len(), 1);
		assert_eq!(explorer.view().len(), 3);
	}

	#[test]
	fn empty_key_is_no_key() {
		let mut explorer = Explorer::default();
		explorer.show_feature_group("Airport", Some(String::new()), &page(airport_graph()));
		assert_eq!(explorer.description(), "Airport features");
	}

	#[test]
	fn refocus_replaces_view() {
		let mut explorer = Explorer::default();
		explorer.show_feature_group("Airport", None, &page(airport_graph()));

		let graph = GraphPayload {
			nodes: vec![node("2", "Runway", 1), node("9", "RunwayDirection", 1)],
			edges: vec![edge("2", "9")],
		};
		explorer.show_feature("2", "Runway", &graph);

		assert_eq!(explorer.view().len(), 2);
		assert_eq!(explorer.page(), None);
		assert_eq!(explorer.description(), "Runway (2)");
		assert!(explorer.filter().group("RunwayDirection").is_some());
	}

	#[test]
	fn expand_then_toggle() {
		let mut explorer = Explorer::default();
		explorer.show_feature_group("Airport", None, &page(airport_graph()));

		let outcome = explorer
			.expand(
				explorer.generation(),
				&GraphPayload {
					nodes: vec![node("2", "Runway", 2), node("4", "RunwayDirection", 1)],
					edges: vec![edge("2", "4")],
				},
			)
			.unwrap();
		assert_eq!(outcome.added_nodes, vec!["4".to_string()]);

		assert!(explorer.toggle_group("Runway").is_empty());
		assert_eq!(explorer.view().len(), 1);
		assert!(explorer.toggle_group("Nothing").is_empty());

		explorer.clear();
		assert!(explorer.view().is_empty());
		assert_eq!(explorer.focus(), None);
	}

	#[test]
	fn expansion_of_a_replaced_view_is_dropped() {
		let mut explorer = Explorer::default();
		explorer.show_feature_group("Airport", None, &page(airport_graph()));
		// Runway "2" clicked while the next page is still loading.
		let clicked_on = explorer.generation();

		let navaids = GraphPayload {
			nodes: vec![node("n1", "Navaid", 0)],
			edges: Vec::new(),
		};
		explorer.show_feature_group("Navaid", None, &page(navaids));

		let runway = GraphPayload {
			nodes: vec![node("2", "Runway", 1), node("9", "RunwayDirection", 1)],
			edges: vec![edge("2", "9")],
		};
		assert_eq!(explorer.expand(clicked_on, &runway), None);
		assert_eq!(explorer.view().len(), 1);
		assert!(explorer.view().contains_node("n1"));

		let cleared_from = explorer.generation();
		explorer.clear();
		assert_eq!(explorer.expand(cleared_from, &runway), None);
		assert!(explorer.view().is_empty());
	}
}
