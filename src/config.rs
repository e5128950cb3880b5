//! Application configuration, built once at startup and shared read-only.
//!
//! Feature presentation (abbreviation, color, shape, field joining) is read
//! from the embedded `config/features.yml` and validated with the same rules
//! the server applies to its own feature configuration.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_yaml::Value;
use thiserror::Error;

/// Color used for ghost (unresolved xlink) nodes.
pub const GHOST_COLOR: &str = "#FF0000";

const PALETTE: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

const EMBEDDED_FEATURES: &str = include_str!("../config/features.yml");

const ATTRIBUTES: &[&str] = &["abbrev", "fields", "color", "shape"];

static COLOR_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^#[\da-fA-F]{6}$").expect("color pattern is valid"));

/// Errors raised while loading the feature configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
	/// The document is not valid YAML or has the wrong overall layout.
	#[error("invalid feature configuration: {0}")]
	Parse(String),

	/// An entry carries an attribute outside of [`ATTRIBUTES`].
	#[error("error while parsing {feature} config: invalid config attribute '{attribute}'")]
	InvalidAttribute { feature: String, attribute: String },

	/// Shape name is not one of the supported shapes.
	#[error("error while parsing {feature} config: invalid shape value: '{value}'")]
	InvalidShape { feature: String, value: String },

	/// Abbreviations must be exactly three characters.
	#[error("error while parsing {feature} config: abbrev should be 3 characters long")]
	InvalidAbbrev { feature: String },

	/// Colors must be `#RRGGBB`.
	#[error("error while parsing {feature} config: invalid color value: '{value}'")]
	InvalidColor { feature: String, value: String },

	/// `fields` must be a mapping with an optional `concat` flag and `names` list.
	#[error("error while parsing {feature} config: {reason}")]
	InvalidFields { feature: String, reason: String },
}

/// Node shapes understood by the canvas renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Shape {
	#[default]
	Dot,
	Triangle,
	TriangleDown,
	Box,
	Square,
	Diamond,
	Hexagon,
	Ellipse,
	Image,
	/// Reserved for ghost nodes; not accepted in configuration.
	Star,
}

impl Shape {
	/// Parses a shape name as sent by the server or written in configuration.
	pub fn parse(value: &str) -> Option<Self> {
		Some(match value {
			"dot" => Self::Dot,
			"triangle" => Self::Triangle,
			"triangleDown" => Self::TriangleDown,
			"box" => Self::Box,
			"square" => Self::Square,
			"diamond" => Self::Diamond,
			"hexagon" => Self::Hexagon,
			"ellipse" => Self::Ellipse,
			"image" => Self::Image,
			"star" => Self::Star,
			_ => return None,
		})
	}
}

/// Presentation of one feature type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureStyle {
	pub abbrev: Option<String>,
	pub color: Option<String>,
	pub shape: Option<Shape>,
	/// Join field values without a separator instead of with commas.
	pub concat_fields: Option<bool>,
}

/// Per-feature presentation lookup.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleConfig {
	features: HashMap<String, FeatureStyle>,
}

impl StyleConfig {
	/// Loads the configuration bundled with the application.
	pub fn embedded() -> Result<Self, ConfigError> {
		Self::from_yaml(EMBEDDED_FEATURES)
	}

	pub fn from_yaml(source: &str) -> Result<Self, ConfigError> {
		if source.trim().is_empty() {
			return Ok(Self::default());
		}
		let raw: Option<BTreeMap<String, BTreeMap<String, Value>>> =
			serde_yaml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;

		let mut features = HashMap::new();
		for (feature, attributes) in raw.unwrap_or_default() {
			let style = parse_feature(&feature, &attributes)?;
			features.insert(feature, style);
		}
		Ok(Self { features })
	}

	pub fn get(&self, name: &str) -> Option<&FeatureStyle> {
		self.features.get(name)
	}

	pub fn len(&self) -> usize {
		self.features.len()
	}

	pub fn is_empty(&self) -> bool {
		self.features.is_empty()
	}

	/// Stable palette color for feature types without a configured one.
	pub fn palette_color(name: &str) -> &'static str {
		let hash = name
			.bytes()
			.fold(2166136261u32, |h, b| (h ^ b as u32).wrapping_mul(16777619));
		PALETTE[hash as usize % PALETTE.len()]
	}
}

fn parse_feature(
	feature: &str,
	attributes: &BTreeMap<String, Value>,
) -> Result<FeatureStyle, ConfigError> {
	let mut style = FeatureStyle::default();

	for (name, value) in attributes {
		if !ATTRIBUTES.contains(&name.as_str()) {
			return Err(ConfigError::InvalidAttribute {
				feature: feature.into(),
				attribute: name.clone(),
			});
		}
		let text = value.as_str().map(str::to_owned);

		match name.as_str() {
			"abbrev" => {
				let abbrev = text.unwrap_or_default();
				if abbrev.chars().count() != 3 {
					return Err(ConfigError::InvalidAbbrev {
						feature: feature.into(),
					});
				}
				style.abbrev = Some(abbrev);
			}
			"color" => {
				let color = text.unwrap_or_else(|| yaml_display(value));
				if !COLOR_RE.is_match(&color) {
					return Err(ConfigError::InvalidColor {
						feature: feature.into(),
						value: color,
					});
				}
				style.color = Some(color);
			}
			"shape" => {
				let shape = text.unwrap_or_else(|| yaml_display(value));
				match Shape::parse(&shape) {
					Some(parsed) if parsed != Shape::Star => style.shape = Some(parsed),
					_ => {
						return Err(ConfigError::InvalidShape {
							feature: feature.into(),
							value: shape,
						});
					}
				}
			}
			_ => style.concat_fields = Some(parse_fields(feature, value)?),
		}
	}

	Ok(style)
}

fn parse_fields(feature: &str, value: &Value) -> Result<bool, ConfigError> {
	let invalid = |reason: &str| ConfigError::InvalidFields {
		feature: feature.into(),
		reason: reason.into(),
	};
	let Value::Mapping(fields) = value else {
		return Err(invalid("fields should be a mapping"));
	};

	let concat = match fields.get("concat") {
		None | Some(Value::Null) => false,
		Some(Value::Bool(concat)) => *concat,
		Some(_) => return Err(invalid("fields.concat should be a boolean")),
	};
	match fields.get("names") {
		None | Some(Value::Null) | Some(Value::Sequence(_)) => {}
		Some(_) => return Err(invalid("fields.names should be a list")),
	}
	Ok(concat)
}

fn yaml_display(value: &Value) -> String {
	serde_yaml::to_string(value)
		.map(|s| s.trim().to_owned())
		.unwrap_or_default()
}

/// Where the API lives.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiSettings {
	pub base_url: String,
	pub prefix: String,
}

impl ApiSettings {
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			base_url: base_url.into().trim_end_matches('/').to_owned(),
			prefix: "/api".into(),
		}
	}

	/// `AIXM_API_URL` at build time, otherwise the origin serving the page.
	pub fn from_environment() -> Self {
		let base = option_env!("AIXM_API_URL")
			.map(str::to_owned)
			.or_else(|| web_sys::window().and_then(|w| w.location().origin().ok()))
			.unwrap_or_default();
		Self::new(base)
	}

	/// Absolute URL of an API path such as `/datasets`.
	pub fn url(&self, path: &str) -> String {
		format!("{}{}{}", self.base_url, self.prefix, path)
	}
}

/// Everything the UI needs that does not change while the app runs.
#[derive(Clone, Debug)]
pub struct AppConfig {
	pub api: ApiSettings,
	pub styles: Arc<StyleConfig>,
	pub page_sizes: Vec<usize>,
	pub default_page_size: usize,
}

impl AppConfig {
	pub fn new(api: ApiSettings, styles: StyleConfig) -> Self {
		Self {
			api,
			styles: Arc::new(styles),
			page_sizes: vec![5, 10, 15, 20],
			default_page_size: 5,
		}
	}

	/// Builds the startup configuration. A broken feature file is logged and
	/// replaced by an empty one so the app still renders server styles.
	pub fn load() -> Self {
		let styles = StyleConfig::embedded().unwrap_or_else(|e| {
			log::error!("{e}");
			StyleConfig::default()
		});
		if styles.is_empty() {
			log::warn!("No presentation config, using server-provided styles");
		} else {
			log::info!("Loaded presentation config for {} feature types", styles.len());
		}
		Self::new(ApiSettings::from_environment(), styles)
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn embedded_config_is_valid() {
		let config = StyleConfig::embedded().unwrap();
		let airport = config.get("AirportHeliport").unwrap();
		assert_eq!(airport.abbrev.as_deref(), Some("AHP"));
		assert_eq!(airport.shape, Some(Shape::Dot));
		assert_eq!(
			config.get("DesignatedPoint").unwrap().concat_fields,
			Some(true)
		);
	}

	#[test]
	fn rejects_unknown_attribute() {
		let err = StyleConfig::from_yaml("Runway:\n  size: 3\n").unwrap_err();
		assert_eq!(
			err,
			ConfigError::InvalidAttribute {
				feature: "Runway".into(),
				attribute: "size".into(),
			}
		);
	}

	#[test]
	fn rejects_bad_values() {
		assert!(matches!(
			StyleConfig::from_yaml("Runway:\n  shape: star\n"),
			Err(ConfigError::InvalidShape { .. })
		));
		assert!(matches!(
			StyleConfig::from_yaml("Runway:\n  abbrev: RW\n"),
			Err(ConfigError::InvalidAbbrev { .. })
		));
		assert!(matches!(
			StyleConfig::from_yaml("Runway:\n  color: \"#12345\"\n"),
			Err(ConfigError::InvalidColor { .. })
		));
		assert!(matches!(
			StyleConfig::from_yaml("Runway:\n  fields: yes\n"),
			Err(ConfigError::InvalidFields { .. })
		));
	}

	#[test]
	fn empty_document_is_empty_config() {
		assert!(StyleConfig::from_yaml("").unwrap().is_empty());
	}

	#[test]
	fn palette_color_is_stable() {
		let first = StyleConfig::palette_color("Runway");
		assert_eq!(first, StyleConfig::palette_color("Runway"));
		assert!(PALETTE.contains(&first));
	}

	#[test]
	fn api_urls_join_prefix() {
		let api = ApiSettings::new("http://localhost:5000/");
		assert_eq!(api.url("/datasets"), "http://localhost:5000/api/datasets");
	}
}
