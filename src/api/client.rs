use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::types::{
	Dataset, Envelope, FeatureGraph, FeatureGroupPage, FeatureGroupSummary, GraphPayload,
	ProcessResponse,
};
use crate::config::ApiSettings;

/// Parameters of a feature group page request.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupQuery {
	pub dataset_id: String,
	pub feature_group: String,
	pub offset: usize,
	pub limit: usize,
	pub key: Option<String>,
}

impl GroupQuery {
	fn path(&self) -> String {
		format!(
			"/datasets/{}/feature_groups/{}/graph?offset={}&limit={}&key={}",
			urlencoding::encode(&self.dataset_id),
			urlencoding::encode(&self.feature_group),
			self.offset,
			self.limit,
			urlencoding::encode(self.key.as_deref().unwrap_or_default()),
		)
	}
}

/// Typed access to the dataset API.
#[derive(Clone, Debug)]
pub struct ApiClient {
	http: Client,
	settings: ApiSettings,
}

impl ApiClient {
	pub fn new(settings: ApiSettings) -> Self {
		Self {
			http: Client::new(),
			settings,
		}
	}

	pub async fn datasets(&self) -> Result<Vec<Dataset>, ApiError> {
		self.send(self.http.get(self.settings.url("/datasets")))
			.await
	}

	/// Registers a new dataset from the bytes of an AIXM file.
	pub async fn upload(&self, file_name: String, bytes: Vec<u8>) -> Result<Dataset, ApiError> {
		let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));
		self.send(self.http.post(self.settings.url("/upload")).multipart(form))
			.await
	}

	/// Runs server-side ingestion and returns the feature group summaries.
	pub async fn process(&self, dataset_id: &str) -> Result<Vec<FeatureGroupSummary>, ApiError> {
		let url = self
			.settings
			.url(&format!("/datasets/{}/process", urlencoding::encode(dataset_id)));
		let response: ProcessResponse = self
			.send(self.http.put(url).json(&serde_json::json!({})))
			.await?;
		Ok(response.feature_groups)
	}

	pub async fn feature_group_graph(
		&self,
		query: &GroupQuery,
	) -> Result<FeatureGroupPage, ApiError> {
		self.send(self.http.get(self.settings.url(&query.path())))
			.await
	}

	/// One-hop graph around a single feature.
	pub async fn feature_graph(
		&self,
		dataset_id: &str,
		feature_id: &str,
	) -> Result<GraphPayload, ApiError> {
		let url = self.settings.url(&format!(
			"/datasets/{}/features/{}/graph",
			urlencoding::encode(dataset_id),
			urlencoding::encode(feature_id)
		));
		let response: FeatureGraph = self.send(self.http.get(url)).await?;
		Ok(response.graph)
	}

	/// Skeleton download link. Opened by the browser, never fetched here.
	pub fn skeleton_url(&self, dataset_id: &str) -> String {
		self.settings
			.url(&format!("/datasets/{}/download", urlencoding::encode(dataset_id)))
	}

	async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
		let response = request.send().await?;
		let status = response.status().as_u16();
		let body = response.text().await?;
		decode_envelope(status, &body)
	}
}

pub(crate) fn decode_envelope<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
	if !(200..300).contains(&status) {
		let message = serde_json::from_str::<Envelope<serde_json::Value>>(body)
			.ok()
			.and_then(|envelope| envelope.error)
			.unwrap_or_else(|| format!("HTTP {status}"));
		return Err(ApiError::Status { status, message });
	}

	let envelope: Envelope<T> = serde_json::from_str(body)?;
	match (envelope.data, envelope.error) {
		(Some(data), _) => Ok(data),
		(None, Some(message)) => Err(ApiError::Status { status, message }),
		(None, None) => Err(ApiError::MissingData),
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn group_query_path_encodes_key() {
		let query = GroupQuery {
			dataset_id: "ds-1".into(),
			feature_group: "AirportHeliport".into(),
			offset: 10,
			limit: 5,
			key: Some("EA DD".into()),
		};
		assert_eq!(
			query.path(),
			"/datasets/ds-1/feature_groups/AirportHeliport/graph?offset=10&limit=5&key=EA%20DD"
		);
	}

	#[test]
	fn group_query_path_without_key() {
		let query = GroupQuery {
			dataset_id: "ds-1".into(),
			feature_group: "Runway".into(),
			offset: 0,
			limit: 5,
			key: None,
		};
		assert!(query.path().ends_with("&key="));
	}

	#[test]
	fn decodes_success_envelope() {
		let datasets: Vec<Dataset> = decode_envelope(
			200,
			r#"{"data": [{"dataset_name": "donlon.xml", "dataset_id": 3}]}"#,
		)
		.unwrap();
		assert_eq!(
			datasets,
			vec![Dataset {
				dataset_id: "3".into(),
				dataset_name: "donlon.xml".into()
			}]
		);
	}

	#[test]
	fn error_status_uses_server_message() {
		let err = decode_envelope::<Vec<Dataset>>(400, r#"{"error": "Dataset already exists"}"#)
			.unwrap_err();
		assert_eq!(err.user_message(), "Dataset already exists");
		assert!(matches!(err, ApiError::Status { status: 400, .. }));
	}

	#[test]
	fn error_status_without_body() {
		let err = decode_envelope::<Vec<Dataset>>(502, "Bad Gateway").unwrap_err();
		assert_eq!(err.user_message(), "HTTP 502");
	}

	#[test]
	fn malformed_and_empty_bodies() {
		assert!(matches!(
			decode_envelope::<Vec<Dataset>>(200, r#"{"data": {"nodes": 1}}"#),
			Err(ApiError::Decode(_))
		));
		assert!(matches!(
			decode_envelope::<Vec<Dataset>>(200, "{}"),
			Err(ApiError::MissingData)
		));
	}

	#[test]
	fn skeleton_url_is_absolute() {
		let client = ApiClient::new(ApiSettings::new("http://localhost:5000"));
		assert_eq!(
			client.skeleton_url("42"),
			"http://localhost:5000/api/datasets/42/download"
		);
	}
}
