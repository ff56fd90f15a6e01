use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Unknown role {0}")]
pub struct UnknownRole(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Manager,
    Designer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Client, Role::Manager, Role::Designer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Manager => "manager",
            Self::Designer => "designer",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Self::Client),
            "manager" => Ok(Self::Manager),
            "designer" => Ok(Self::Designer),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}
