//! Vocabulaire van de verbindingen tussen en rond secties.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Afwerking op een grens van een sectie: niets, een paal of een koppeling.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Junction {
    #[serde(rename = "rien")]
    None,
    #[default]
    #[serde(rename = "poteau")]
    Post,
    #[serde(rename = "liaison")]
    Link,
}

impl Junction {
    /// Alle varianten in de volgorde waarin het formulier ze aanbiedt.
    pub const ALL: [Junction; 3] = [Junction::None, Junction::Post, Junction::Link];

    /// Waarde zoals die in formuliervelden en JSON-payloads staat.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::None => "rien",
            Self::Post => "poteau",
            Self::Link => "liaison",
        }
    }

    /// Label van de optie in de keuzelijst.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "Rien",
            Self::Post => "Poteau",
            Self::Link => "Liaison",
        }
    }
}

impl fmt::Display for Junction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Een waarde die niet tot het jonctie-vocabulaire behoort.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("type de jonction inconnu : `{0}`")]
pub struct UnknownJunction(pub String);

impl FromStr for Junction {
    type Err = UnknownJunction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|junction| junction.wire_name() == s.trim())
            .ok_or_else(|| UnknownJunction(s.to_owned()))
    }
}
