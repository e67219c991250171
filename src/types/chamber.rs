use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Legislative body whose district plan precincts are apportioned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Chamber {
    #[serde(rename = "senate")]
    StateSenate,
    #[serde(rename = "house")]
    StateHouse,
    #[serde(rename = "congress", alias = "congressional")]
    Congressional,
}

impl Chamber {
    pub const ALL: [Chamber; 3] = [Chamber::StateSenate, Chamber::StateHouse, Chamber::Congressional];

    /// Stable slug used in cache keys, file names and the CLI.
    pub fn to_str(&self) -> &'static str {
        match self {
            Chamber::StateSenate => "senate",
            Chamber::StateHouse => "house",
            Chamber::Congressional => "congress",
        }
    }
}

impl fmt::Display for Chamber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

impl FromStr for Chamber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "senate" | "sd" | "state-senate" => Ok(Chamber::StateSenate),
            "house" | "hd" | "state-house" => Ok(Chamber::StateHouse),
            "congress" | "cd" | "congressional" => Ok(Chamber::Congressional),
            _ => Err(Error::UnknownChamber(s.to_string())),
        }
    }
}
