//! Reactive state shared by the shell components, and the actions that talk
//! to the API on their behalf.

use js_sys::Uint8Array;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen_futures::JsFuture;

use crate::api::{
	ApiClient, ApiError, Dataset, FeatureGroupSummary, GroupQuery, NodeId, RequestTracker, Ticket,
};
use crate::components::toast::Toasts;
use crate::config::AppConfig;
use crate::explorer::Explorer;

/// Whether `file_name` looks like something the server will ingest.
pub fn is_aixm_file(file_name: &str) -> bool {
	file_name
		.rsplit_once('.')
		.is_some_and(|(stem, ext)| !stem.is_empty() && ext.eq_ignore_ascii_case("xml"))
}

/// Groups listed in the side panel.
pub fn visible_groups(groups: &[FeatureGroupSummary], only_broken: bool) -> Vec<FeatureGroupSummary> {
	groups
		.iter()
		.filter(|g| !only_broken || g.has_broken_xlinks())
		.cloned()
		.collect()
}

pub fn total_features(groups: &[FeatureGroupSummary]) -> usize {
	groups.iter().map(|g| g.size).sum()
}

/// App-wide signals. `Copy`, so every component and callback can hold one.
#[derive(Clone, Copy)]
pub struct Session {
	pub datasets: RwSignal<Vec<Dataset>>,
	pub dataset: RwSignal<Option<Dataset>>,
	pub feature_groups: RwSignal<Vec<FeatureGroupSummary>>,
	pub only_broken: RwSignal<bool>,
	pub selected_group: RwSignal<Option<String>>,
	pub explorer: RwSignal<Explorer>,
	/// Progress text while a dataset or graph request is pending.
	pub loading: RwSignal<Option<String>>,
	pub page_size: RwSignal<usize>,
	pub filter_key: RwSignal<String>,
	pub toasts: Toasts,
	tracker: StoredValue<RequestTracker>,
	config: StoredValue<AppConfig>,
}

impl Session {
	pub fn new(config: AppConfig, toasts: Toasts) -> Self {
		Self {
			datasets: RwSignal::new(Vec::new()),
			dataset: RwSignal::new(None),
			feature_groups: RwSignal::new(Vec::new()),
			only_broken: RwSignal::new(false),
			selected_group: RwSignal::new(None),
			explorer: RwSignal::new(Explorer::new(config.styles.clone())),
			loading: RwSignal::new(None),
			page_size: RwSignal::new(config.default_page_size),
			filter_key: RwSignal::new(String::new()),
			toasts,
			tracker: StoredValue::new(RequestTracker::default()),
			config: StoredValue::new(config),
		}
	}

	pub fn page_sizes(&self) -> Vec<usize> {
		self.config.with_value(|c| c.page_sizes.clone())
	}

	fn client(&self) -> ApiClient {
		ApiClient::new(self.config.with_value(|c| c.api.clone()))
	}

	fn begin(&self) -> Option<Ticket> {
		self.tracker.try_update_value(RequestTracker::begin)
	}

	fn is_current(&self, ticket: Ticket) -> bool {
		self.tracker
			.try_with_value(|t| t.is_current(ticket))
			.unwrap_or(false)
	}

	pub fn skeleton_url(&self) -> Option<String> {
		let dataset = self.dataset.get()?;
		Some(self.client().skeleton_url(&dataset.dataset_id))
	}

	pub fn load_datasets(&self) {
		let session = *self;
		spawn_local(async move {
			match session.client().datasets().await {
				Ok(datasets) => {
					log::info!("{} datasets available", datasets.len());
					session.datasets.set(datasets);
				}
				Err(e) => session
					.toasts
					.error(format!("Failed to load datasets: {}", e.user_message())),
			}
		});
	}

	/// Uploads an AIXM file and opens the resulting dataset.
	pub fn upload(&self, file: web_sys::File) {
		let file_name = file.name();
		if !is_aixm_file(&file_name) {
			self.toasts
				.error(format!("Dataset upload failed: {file_name} is not an XML file"));
			return;
		}
		let Some(ticket) = self.begin() else {
			return;
		};
		self.reset_dataset(None);
		self.loading.set(Some("Uploading...".into()));

		let session = *self;
		spawn_local(async move {
			let result: Result<Dataset, ApiError> = async {
				let buffer = JsFuture::from(file.array_buffer())
					.await
					.map_err(|e| ApiError::File(format!("{e:?}")))?;
				let bytes = Uint8Array::new(&buffer).to_vec();
				log::info!("Uploading {file_name} ({} bytes)", bytes.len());
				session.client().upload(file_name, bytes).await
			}
			.await;

			if !session.is_current(ticket) {
				log::debug!("Dropping stale upload response");
				return;
			}
			match result {
				Ok(dataset) => {
					session.datasets.update(|all| all.push(dataset.clone()));
					session.open_dataset(dataset);
				}
				Err(e) => {
					session.loading.set(None);
					session
						.toasts
						.error(format!("Dataset upload failed: {}", e.user_message()));
				}
			}
		});
	}

	/// Makes `dataset` current and asks the server to process it.
	pub fn open_dataset(&self, dataset: Dataset) {
		let Some(ticket) = self.begin() else {
			return;
		};
		log::info!("Opening dataset {} ({})", dataset.dataset_name, dataset.dataset_id);
		self.reset_dataset(Some(dataset.clone()));
		self.loading.set(Some("Processing dataset...".into()));

		let session = *self;
		spawn_local(async move {
			let result = session.client().process(&dataset.dataset_id).await;
			if !session.is_current(ticket) {
				log::debug!("Dropping stale process response for {}", dataset.dataset_id);
				return;
			}
			session.loading.set(None);
			match result {
				Ok(groups) => {
					log::info!(
						"Dataset {} has {} feature groups",
						dataset.dataset_name,
						groups.len()
					);
					session.feature_groups.set(groups);
				}
				Err(e) => {
					log::error!("{e}");
					session.toasts.error("Dataset process failed!");
				}
			}
		});
	}

	fn reset_dataset(&self, dataset: Option<Dataset>) {
		self.dataset.set(dataset);
		self.feature_groups.set(Vec::new());
		self.selected_group.set(None);
		self.filter_key.set(String::new());
		self.explorer.update(Explorer::clear);
	}

	/// Picks a feature group from the side panel: first page, no key filter.
	pub fn select_group(&self, name: String) {
		self.filter_key.set(String::new());
		self.show_feature_group(name, 0);
	}

	/// Replaces the view with one page of a feature group, filtered by the
	/// current key.
	pub fn show_feature_group(&self, name: String, offset: usize) {
		let Some(dataset) = self.dataset.get_untracked() else {
			return;
		};
		let Some(ticket) = self.begin() else {
			return;
		};
		let key = Some(self.filter_key.get_untracked().trim().to_owned()).filter(|k| !k.is_empty());
		let query = GroupQuery {
			dataset_id: dataset.dataset_id,
			feature_group: name.clone(),
			offset,
			limit: self.page_size.get_untracked(),
			key: key.clone(),
		};
		self.loading.set(Some(format!("Loading {name}...")));

		let session = *self;
		spawn_local(async move {
			let result = session.client().feature_group_graph(&query).await;
			if !session.is_current(ticket) {
				log::debug!(
					"Dropping stale page of {name} at offset {offset} (request {})",
					ticket.generation()
				);
				return;
			}
			session.loading.set(None);
			match result {
				Ok(page) => {
					session
						.explorer
						.update(|e| e.show_feature_group(&name, key, &page));
					session.selected_group.set(Some(name));
				}
				Err(e) => {
					log::error!("{e}");
					session
						.toasts
						.error(format!("Failed to get the graph for {name}"));
				}
			}
		});
	}

	/// Re-requests the current group page, e.g. after the key or page size
	/// changed.
	pub fn reload_group(&self, offset: usize) {
		if let Some(name) = self.selected_group.get_untracked() {
			self.show_feature_group(name, offset);
		}
	}

	/// Rebuilds the view around a single node already on screen.
	pub fn focus_feature(&self, id: NodeId) {
		let Some(dataset) = self.dataset.get_untracked() else {
			return;
		};
		let Some(name) = self
			.explorer
			.with_untracked(|e| e.view().node(&id).map(|n| n.name.clone()))
		else {
			log::debug!("Ignoring focus on unknown node {id}");
			return;
		};
		let Some(ticket) = self.begin() else {
			return;
		};
		self.loading.set(Some(format!("Loading {name} ({id})...")));

		let session = *self;
		spawn_local(async move {
			let result = session
				.client()
				.feature_graph(&dataset.dataset_id, &id)
				.await;
			if !session.is_current(ticket) {
				log::debug!("Dropping stale graph for {id} (request {})", ticket.generation());
				return;
			}
			session.loading.set(None);
			match result {
				Ok(graph) => {
					session.filter_key.set(String::new());
					session.explorer.update(|e| e.show_feature(&id, &name, &graph));
				}
				Err(e) => {
					log::error!("{e}");
					session
						.toasts
						.error(format!("Failed to get the graph for feature {name} {id}"));
				}
			}
		});
	}

	/// Merges the one-hop neighbourhood of `id` into the current view.
	pub fn expand_feature(&self, id: NodeId) {
		let Some(dataset) = self.dataset.get_untracked() else {
			return;
		};
		let generation = self.explorer.with_untracked(Explorer::generation);

		let session = *self;
		spawn_local(async move {
			let result = session
				.client()
				.feature_graph(&dataset.dataset_id, &id)
				.await;
			if session.explorer.try_with_untracked(Explorer::generation) != Some(generation) {
				log::debug!("Dropping expansion of {id}: the view was replaced");
				return;
			}
			match result {
				Ok(graph) => {
					let merged = session
						.explorer
						.try_update(|e| e.expand(generation, &graph))
						.flatten();
					if let Some(outcome) = merged {
						log::debug!(
							"Expanded {id}: {} nodes, {} edges added",
							outcome.added_nodes.len(),
							outcome.added_edges
						);
					}
				}
				Err(e) => {
					log::error!("{e}");
					session.toasts.error("Failed to expand the graph.");
				}
			}
		});
	}

	pub fn toggle_group(&self, name: &str) {
		let warnings = self
			.explorer
			.try_update(|e| e.toggle_group(name))
			.unwrap_or_default();
		for warning in warnings {
			self.toasts.warning(warning);
		}
	}

	pub fn toggle_all_groups(&self) {
		let warnings = self
			.explorer
			.try_update(Explorer::toggle_all_groups)
			.unwrap_or_default();
		for warning in warnings {
			self.toasts.warning(warning);
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	fn group(name: &str, size: usize, broken: bool) -> FeatureGroupSummary {
		serde_json::from_value(serde_json::json!({
			"name": name,
			"size": size,
			"has_broken_xlinks": broken,
		}))
		.unwrap()
	}

	#[test]
	fn accepts_xml_uploads_only() {
		assert!(is_aixm_file("donlon.xml"));
		assert!(is_aixm_file("EAD.Snapshot.XML"));
		assert!(!is_aixm_file("donlon.json"));
		assert!(!is_aixm_file("xml"));
		assert!(!is_aixm_file(".xml"));
	}

	#[test]
	fn broken_filter_narrows_groups() {
		let groups = vec![
			group("AirportHeliport", 2, false),
			group("Runway", 3, true),
			group("Navaid", 4, false),
		];

		assert_eq!(visible_groups(&groups, false).len(), 3);
		let broken = visible_groups(&groups, true);
		assert_eq!(broken.len(), 1);
		assert_eq!(broken[0].name, "Runway");
		assert_eq!(total_features(&groups), 9);
	}
}
