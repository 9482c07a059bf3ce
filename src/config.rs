//! Instellingen van de configurator: endpoints, opslagsleutel, bestandsnaam
//! van de PDF en de catalogus van vaste velden.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::form::naming::PieceField;
use crate::form::shape::{self, StaticField};
use crate::model::project::{IDENTICAL_KEY, PIECE_COUNT_KEY, PIECES_KEY};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration illisible : {0}")]
    Parse(#[from] serde_json::Error),
    #[error("la clé de stockage ne peut pas être vide")]
    EmptyStorageKey,
    #[error("un champ du catalogue n'a pas de nom")]
    UnnamedField,
    #[error("le champ `{0}` est déclaré plusieurs fois")]
    DuplicateField(String),
    #[error("le nom `{0}` est réservé à la structure du projet")]
    ReservedField(String),
    #[error("la valeur par défaut `{default}` n'est pas valide pour le champ `{field}`")]
    InvalidDefault { field: String, default: String },
}

/// Paden van de drie endpoints, relatief aan `api_base`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub compute: String,
    pub parse: String,
    pub pdf: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            compute: "process-data".to_owned(),
            parse: "parse-text".to_owned(),
            pdf: "draw-pdf".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub api_base: String,
    pub endpoints: Endpoints,
    pub storage_key: String,
    pub pdf_filename: String,
    pub fields: Vec<StaticField>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_base: "/api".to_owned(),
            endpoints: Endpoints::default(),
            storage_key: "gardeCorpsProject".to_owned(),
            pdf_filename: "plan_garde_corps.pdf".to_owned(),
            fields: shape::default_catalog(),
        }
    }
}

impl EngineConfig {
    /// Leest een configuratie uit JSON; ontbrekende sleutels krijgen hun
    /// standaardwaarde.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Self::from_value(serde_json::from_str(text)?)
    }

    /// Zelfde als [`EngineConfig::from_json`], voor een al ingelezen object.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }

        let mut seen = BTreeSet::new();
        for field in &self.fields {
            let name = field.name.trim();
            if name.is_empty() {
                return Err(ConfigError::UnnamedField);
            }
            if is_reserved(name) {
                return Err(ConfigError::ReservedField(name.to_owned()));
            }
            if !seen.insert(name) {
                return Err(ConfigError::DuplicateField(name.to_owned()));
            }
            if !field.kind.accepts(&field.default) || !field.kind.is_valid_number(&field.default) {
                return Err(ConfigError::InvalidDefault {
                    field: name.to_owned(),
                    default: field.default.clone(),
                });
            }
        }
        Ok(())
    }

    /// Volledige URL van een endpoint.
    #[must_use]
    pub fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn is_reserved(name: &str) -> bool {
    name == PIECE_COUNT_KEY
        || name == IDENTICAL_KEY
        || name == PIECES_KEY
        || PieceField::parse(name).is_some()
}
