//! Normalized user profile mapped from TheGrid's profile document.

// self
use crate::_prelude::*;

/// Provider identifier stamped on every normalized profile.
pub const PROVIDER: &str = "thegrid";

/// Single email address entry in the normalized profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
	/// The address itself.
	pub value: String,
}

/// Normalized user profile produced by one successful fetch.
///
/// The serialized shape follows the portable-contacts convention host
/// frameworks expect: `displayName`, `emails[].value`, plus the `_raw` body
/// and `_json` document retained verbatim for caller inspection. A fresh
/// value is created on every fetch; the strategy retains no reference to it.
#[derive(Clone, Debug, Serialize)]
pub struct Profile {
	/// Constant strategy identifier, always `thegrid`.
	pub provider: &'static str,
	/// Unique user identifier, sourced from the document's `uuid` field.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	/// Full display name, sourced from the document's `name` field.
	#[serde(rename = "displayName", skip_serializing_if = "Option::is_none")]
	pub display_name: Option<String>,
	/// Email addresses; a single entry sourced from the document's `email` field.
	pub emails: Vec<Email>,
	/// Verbatim response body.
	#[serde(rename = "_raw")]
	pub raw: String,
	/// Parsed profile document.
	#[serde(rename = "_json")]
	pub json: serde_json::Value,
}
impl Profile {
	/// Parses a profile endpoint body and maps it into the normalized shape.
	///
	/// Failure is total: a body that is not valid JSON yields an error and no
	/// partial profile. Missing document fields never fail the mapping; they
	/// produce `None` entries, matching the provider's sparse responses for
	/// restricted scopes.
	pub fn from_body(body: &str) -> Result<Self> {
		let mut deserializer = serde_json::Deserializer::from_str(body);
		let json: serde_json::Value = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| Error::ProfileParse { source })?;
		let id = string_field(&json, "uuid");
		let display_name = string_field(&json, "name");
		let emails =
			string_field(&json, "email").map(|value| vec![Email { value }]).unwrap_or_default();

		Ok(Self { provider: PROVIDER, id, display_name, emails, raw: body.to_owned(), json })
	}
}

fn string_field(json: &serde_json::Value, field: &str) -> Option<String> {
	json.get(field).and_then(serde_json::Value::as_str).map(str::to_owned)
}
