use std::collections::HashSet;

use super::model::{ViewEdge, ViewNode};
use super::view::GraphView;
use crate::api::NodeId;

/// Nodes of one associated feature type, shown or hidden together.
#[derive(Clone, Debug, PartialEq)]
pub struct AssociationGroup {
	pub name: String,
	pub members: Vec<ViewNode>,
	pub selected: bool,
	detached_edges: Vec<ViewEdge>,
}

impl AssociationGroup {
	fn new(name: &str) -> Self {
		Self {
			name: name.to_owned(),
			members: Vec::new(),
			selected: true,
			detached_edges: Vec::new(),
		}
	}

	fn member_ids(&self) -> impl Iterator<Item = &str> {
		self.members.iter().map(|m| m.id.as_str())
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ToggleOutcome {
	pub selected: bool,
	/// Non-fatal problems met while removing branches.
	pub warnings: Vec<String>,
}

/// Selection state of the association groups around the focused feature.
#[derive(Clone, Debug, Default)]
pub struct AssociationFilter {
	groups: Vec<AssociationGroup>,
	focused_name: String,
	focused_ids: HashSet<NodeId>,
	all_selected: bool,
}

impl AssociationFilter {
	/// Groups every node not of the focused feature type by name, in
	/// first-seen order. All groups start selected.
	pub fn build(
		nodes: &[ViewNode],
		focused_name: &str,
		focused_ids: impl IntoIterator<Item = NodeId>,
	) -> Self {
		let mut filter = Self {
			groups: Vec::new(),
			focused_name: focused_name.to_owned(),
			focused_ids: focused_ids.into_iter().collect(),
			all_selected: true,
		};
		for node in nodes {
			filter.insert_member(node);
		}
		filter
	}

	pub fn groups(&self) -> &[AssociationGroup] {
		&self.groups
	}

	pub fn group(&self, name: &str) -> Option<&AssociationGroup> {
		self.groups.iter().find(|g| g.name == name)
	}

	/// Drives the master "all associations" control.
	pub fn all_selected(&self) -> bool {
		self.all_selected
	}

	/// Flips a group's selection and applies it to `view`. `None` when no
	/// group has that name.
	pub fn toggle(&mut self, name: &str, view: &mut GraphView) -> Option<ToggleOutcome> {
		let index = self.groups.iter().position(|g| g.name == name)?;
		let selected = !self.groups[index].selected;
		self.groups[index].selected = selected;

		let warnings = if selected {
			self.restore(index, view);
			Vec::new()
		} else {
			self.remove_branches(index, view)
		};

		self.all_selected = self.groups.iter().all(|g| g.selected);
		Some(ToggleOutcome { selected, warnings })
	}

	/// Flips the master flag and brings every group in line with it.
	pub fn toggle_all(&mut self, view: &mut GraphView) -> Vec<String> {
		let target = !self.all_selected;
		let pending: Vec<String> = self
			.groups
			.iter()
			.filter(|g| g.selected != target)
			.map(|g| g.name.clone())
			.collect();

		let mut warnings = Vec::new();
		for name in pending {
			if let Some(outcome) = self.toggle(&name, view) {
				warnings.extend(outcome.warnings);
			}
		}
		self.all_selected = target;
		warnings
	}

	fn insert_member(&mut self, node: &ViewNode) {
		if node.name == self.focused_name {
			return;
		}
		let index = match self.groups.iter().position(|g| g.name == node.name) {
			Some(index) => index,
			None => {
				self.groups.push(AssociationGroup::new(&node.name));
				self.groups.len() - 1
			}
		};
		let group = &mut self.groups[index];
		if !group.members.iter().any(|m| m.id == node.id) {
			group.members.push(node.clone());
		}
	}

	fn restore(&mut self, index: usize, view: &mut GraphView) {
		let group = &mut self.groups[index];
		for member in &group.members {
			view.add_node(member.clone());
		}
		for edge in group.detached_edges.drain(..) {
			view.add_edge(edge);
		}
		view.refresh_incomplete();
	}

	// Removes the deselected group's members and every node only they lead
	// to. Anything reachable from the focused nodes or a kept group without
	// crossing this group is protected.
	fn remove_branches(&mut self, index: usize, view: &mut GraphView) -> Vec<String> {
		let barrier: HashSet<NodeId> = self.groups[index]
			.member_ids()
			.map(str::to_owned)
			.collect();
		let seeds = self
			.groups
			.iter()
			.filter(|g| g.selected && g.name != self.groups[index].name)
			.flat_map(AssociationGroup::member_ids)
			.chain(self.focused_ids.iter().map(String::as_str));
		let protected = view.closure(seeds, &barrier);

		let mut warnings = Vec::new();
		let group = &mut self.groups[index];
		for member in &group.members {
			if !view.contains_node(&member.id) {
				continue;
			}
			let mut branch = view.branch_ids(&member.id, &protected);
			branch.push(member.id.clone());

			let mut failed = false;
			for id in branch {
				match view.remove_node_by_id(&id) {
					Ok(edges) => group.detached_edges.extend(edges),
					Err(e) => {
						log::warn!("Removing branch of {}: {e}", member.id);
						failed = true;
					}
				}
			}
			if failed {
				warnings.push(format!(
					"An error occurred while removing {} branches.",
					member.name
				));
			}
		}
		warnings
	}
}
