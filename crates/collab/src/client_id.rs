use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier naming one editing session.
///
/// Stable for the session's lifetime. Cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(Arc<str>);

impl ClientId {
	/// Wraps a caller-supplied identifier.
	pub fn new(id: impl Into<Arc<str>>) -> Self {
		Self(id.into())
	}

	/// Generates a fresh random identifier.
	pub fn random() -> Self {
		Self(Uuid::new_v4().simple().to_string().into())
	}

	/// Returns the identifier as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ClientId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl AsRef<str> for ClientId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl From<&str> for ClientId {
	fn from(id: &str) -> Self {
		Self::new(id)
	}
}

impl From<String> for ClientId {
	fn from(id: String) -> Self {
		Self::new(id)
	}
}
