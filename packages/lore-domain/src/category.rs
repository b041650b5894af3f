use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
	Policies,
	Medical,
	Device,
	Membership,
}

#[derive(Debug, thiserror::Error)]
#[error("Unsupported category {name:?}; expected one of policies, medical, device, membership.")]
pub struct UnknownCategory {
	pub name: String,
}

impl Category {
	pub const ALL: [Self; 4] = [Self::Policies, Self::Medical, Self::Device, Self::Membership];

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Policies => "policies",
			Self::Medical => "medical",
			Self::Device => "device",
			Self::Membership => "membership",
		}
	}
}

impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Category {
	type Err = UnknownCategory;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"policies" => Ok(Self::Policies),
			"medical" => Ok(Self::Medical),
			"device" => Ok(Self::Device),
			"membership" => Ok(Self::Membership),
			_ => Err(UnknownCategory { name: s.trim().to_string() }),
		}
	}
}
