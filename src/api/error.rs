use thiserror::Error;

/// Failures talking to the dataset API.
#[derive(Debug, Error)]
pub enum ApiError {
	/// The request never produced a response.
	#[error("request failed: {0}")]
	Transport(String),

	/// Non-2xx status; `message` is the server's `error` field when present.
	#[error("server responded with {status}: {message}")]
	Status { status: u16, message: String },

	/// Body was not the expected JSON shape.
	#[error("malformed response: {0}")]
	Decode(String),

	/// A 2xx envelope without a `data` member.
	#[error("response carried no data")]
	MissingData,

	/// The selected upload could not be read.
	#[error("could not read file: {0}")]
	File(String),
}

impl ApiError {
	/// Message suitable for a toast: the server's explanation when it gave one.
	pub fn user_message(&self) -> String {
		match self {
			Self::Status { message, .. } => message.clone(),
			other => other.to_string(),
		}
	}
}

impl From<reqwest::Error> for ApiError {
	fn from(e: reqwest::Error) -> Self {
		Self::Transport(e.to_string())
	}
}

impl From<serde_json::Error> for ApiError {
	fn from(e: serde_json::Error) -> Self {
		Self::Decode(e.to_string())
	}
}
