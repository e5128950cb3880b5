use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Server-assigned feature identifier. Numeric ids are stringified.
pub type NodeId = String;

/// Response envelope shared by every endpoint.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
	pub data: Option<T>,
	pub error: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Dataset {
	#[serde(alias = "id", deserialize_with = "de_id")]
	pub dataset_id: String,
	#[serde(alias = "name")]
	pub dataset_name: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct FeatureGroupSummary {
	pub name: String,
	#[serde(alias = "total_count", default)]
	pub size: usize,
	#[serde(default)]
	has_broken_xlinks: bool,
	#[serde(default)]
	features_num_with_broken_xlinks: Option<usize>,
}

impl FeatureGroupSummary {
	pub fn has_broken_xlinks(&self) -> bool {
		self.has_broken_xlinks || self.features_num_with_broken_xlinks.unwrap_or(0) > 0
	}
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProcessResponse {
	#[serde(alias = "feature_types")]
	pub feature_groups: Vec<FeatureGroupSummary>,
}

/// One page of a feature group, with the graph reachable from its features.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct FeatureGroupPage {
	pub graph: GraphPayload,
	#[serde(default)]
	pub offset: usize,
	pub limit: usize,
	#[serde(alias = "total_count")]
	pub size: usize,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeatureGraph {
	pub graph: GraphPayload,
}

/// A (partial) graph as returned by the server.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct GraphPayload {
	#[serde(default)]
	pub nodes: Vec<NodePayload>,
	#[serde(default)]
	pub edges: Vec<EdgePayload>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NodePayload {
	#[serde(deserialize_with = "de_id")]
	pub id: NodeId,
	pub name: String,
	#[serde(default)]
	pub abbrev: Option<String>,
	#[serde(default, deserialize_with = "de_fields")]
	pub fields: Vec<Field>,
	#[serde(default, deserialize_with = "de_flag")]
	pub fields_concat: bool,
	#[serde(default)]
	pub assoc_count: usize,
	#[serde(default, deserialize_with = "de_flag")]
	pub is_ghost: bool,
	#[serde(default)]
	pub color: Option<String>,
	#[serde(default)]
	pub shape: Option<String>,
}

/// A name/value pair shown in the node popup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
	pub name: String,
	pub value: String,
}

/// Which endpoint an arrow points at.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
	Source,
	Target,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct EdgePayload {
	#[serde(deserialize_with = "de_id")]
	pub source: NodeId,
	#[serde(deserialize_with = "de_id")]
	pub target: NodeId,
	#[serde(default)]
	pub name: String,
	#[serde(default, deserialize_with = "de_flag")]
	pub is_broken: bool,
	#[serde(default)]
	pub direction: Option<Direction>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
	Text(String),
	Number(serde_json::Number),
}

fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
	Ok(match RawId::deserialize(deserializer)? {
		RawId::Text(id) => id,
		RawId::Number(id) => id.to_string(),
	})
}

fn de_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
	Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

// Fields arrive as a list of single-key objects: `[{"designator": "EADD"}]`.
fn de_fields<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Field>, D::Error> {
	let raw = Option::<Vec<BTreeMap<String, Value>>>::deserialize(deserializer)?;
	Ok(raw
		.unwrap_or_default()
		.into_iter()
		.flat_map(|entry| entry.into_iter())
		.map(|(name, value)| Field {
			name,
			value: match value {
				Value::String(s) => s,
				Value::Null => String::new(),
				other => other.to_string(),
			},
		})
		.collect())
}
