//! Strongly typed gate identifier enforced across the quota domain.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when gate identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum GateIdError {
	/// The identifier was empty.
	#[error("Gate identifier cannot be empty.")]
	Empty,
	/// The identifier contains whitespace characters.
	#[error("Gate identifier contains whitespace.")]
	ContainsWhitespace,
	/// The identifier contains the store-key separator.
	#[error("Gate identifier contains the reserved `/` separator.")]
	ContainsSeparator,
	/// The identifier exceeded the allowed character count.
	#[error("Gate identifier exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

/// Unique identifier for a logical quota; namespaces the gate's store keys.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GateId(String);
impl GateId {
	/// Creates a new identifier after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, GateIdError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}
}
impl Deref for GateId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for GateId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl From<GateId> for String {
	fn from(value: GateId) -> Self {
		value.0
	}
}
impl TryFrom<String> for GateId {
	type Error = GateIdError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view(&value)?;

		Ok(Self(value))
	}
}
impl Borrow<str> for GateId {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl Debug for GateId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Gate({})", self.0)
	}
}
impl Display for GateId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl FromStr for GateId {
	type Err = GateIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

fn validate_view(view: &str) -> Result<(), GateIdError> {
	if view.is_empty() {
		return Err(GateIdError::Empty);
	}
	if view.chars().any(char::is_whitespace) {
		return Err(GateIdError::ContainsWhitespace);
	}
	if view.contains('/') {
		return Err(GateIdError::ContainsSeparator);
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(GateIdError::TooLong { max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identifiers_validate_on_construction() {
		assert!(GateId::new(" gate-1").is_err(), "Leading whitespace must be rejected.");
		assert!(GateId::new("gate-1 ").is_err(), "Trailing whitespace must be rejected.");
		assert!(GateId::new("").is_err());
		assert!(GateId::new("gate/window").is_err(), "Key separator must be rejected.");

		let gate = GateId::new("gate-1").expect("Gate fixture should be considered valid.");

		assert_eq!(gate.as_ref(), "gate-1");
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let payload = "\"gate-42\"";
		let gate: GateId =
			serde_json::from_str(payload).expect("Identifier should deserialize successfully.");

		assert_eq!(gate.as_ref(), "gate-42");
		assert!(serde_json::from_str::<GateId>("\"with space\"").is_err());
		assert!(serde_json::from_str::<GateId>("\"a/b\"").is_err());
	}

	#[test]
	fn unicode_whitespace_and_length_limits() {
		let nbsp = format!("gate{}id", '\u{00A0}');

		assert!(GateId::new(&nbsp).is_err());

		let exact = "a".repeat(IDENTIFIER_MAX_LEN);

		GateId::new(&exact).expect("Exact length should succeed.");

		let too_long = "a".repeat(IDENTIFIER_MAX_LEN + 1);

		assert!(GateId::new(&too_long).is_err());
	}

	#[test]
	fn borrow_supports_fast_lookup() {
		let map: HashMap<GateId, u8> = HashMap::from_iter([(
			GateId::new("gate-123").expect("Gate identifier used for lookup should be valid."),
			7_u8,
		)]);

		assert_eq!(map.get("gate-123"), Some(&7));
	}
}
