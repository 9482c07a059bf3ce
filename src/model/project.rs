//! Het gestructureerde projectmodel dat naar de rekenservice gaat.

use std::collections::BTreeMap;
use std::num::NonZeroU32;

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use thiserror::Error;

use super::piece::Piece;

/// Sleutel van het aantal morceaux.
pub const PIECE_COUNT_KEY: &str = "nombre_morceaux";
/// Sleutel van de vlag "morceaux identiques".
pub const IDENTICAL_KEY: &str = "morceaux_identiques";
/// Sleutel van de verzameling morceaux.
pub const PIECES_KEY: &str = "morceaux";

/// Bovengrens voor het aantal morceaux van een project.
pub const MAX_PIECES: usize = 100;
/// Bovengrens voor het aantal secties van één morceau.
pub const MAX_SECTIONS: usize = 100;

/// Waarde van [`IDENTICAL_KEY`] wanneer alle morceaux gelijk zijn.
pub const IDENTICAL_YES: &str = "oui";
/// Waarde van [`IDENTICAL_KEY`] wanneer elk morceau apart beschreven is.
pub const IDENTICAL_NO: &str = "non";

/// Zet de radiowaarde van [`IDENTICAL_KEY`] om naar een vlag.
#[must_use]
pub fn parse_identical_flag(value: &str) -> Option<bool> {
    match value.trim() {
        IDENTICAL_YES => Some(true),
        IDENTICAL_NO => Some(false),
        _ => None,
    }
}

#[must_use]
pub const fn identical_flag_value(identical: bool) -> &'static str {
    if identical { IDENTICAL_YES } else { IDENTICAL_NO }
}

/// De morceaux van een project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PieceSet {
    /// Eén sjabloon dat `count` keer herhaald wordt.
    Identical { count: NonZeroU32, template: Piece },
    /// Precies één morceau per index.
    Distinct(Vec<Piece>),
}

impl PieceSet {
    #[must_use]
    pub fn identical(count: NonZeroU32, template: Piece) -> Self {
        Self::Identical { count, template }
    }

    pub fn distinct(pieces: Vec<Piece>) -> Result<Self, ProjectError> {
        if pieces.is_empty() {
            return Err(ProjectError::NoPieces);
        }
        Ok(Self::Distinct(pieces))
    }

    #[must_use]
    pub fn count(&self) -> usize {
        match self {
            Self::Identical { count, .. } => count.get() as usize,
            Self::Distinct(pieces) => pieces.len(),
        }
    }

    #[must_use]
    pub const fn is_identical(&self) -> bool {
        matches!(self, Self::Identical { .. })
    }

    /// Het morceau op positie `index`; bij identieke morceaux steeds het sjabloon.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Piece> {
        match self {
            Self::Identical { count, template } => {
                (index < count.get() as usize).then_some(template)
            }
            Self::Distinct(pieces) => pieces.get(index),
        }
    }

    /// Alle logische morceaux, sjabloon herhaald waar nodig.
    pub fn iter(&self) -> impl Iterator<Item = &Piece> + '_ {
        (0..self.count()).filter_map(move |index| self.get(index))
    }

    /// De morceaux zoals ze in het formulier staan: één bij identiek, anders allemaal.
    #[must_use]
    pub fn rendered(&self) -> &[Piece] {
        match self {
            Self::Identical { template, .. } => std::slice::from_ref(template),
            Self::Distinct(pieces) => pieces,
        }
    }
}

/// Fouten bij het samenstellen van een project.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectError {
    #[error("un projet doit contenir au moins un morceau")]
    NoPieces,
}

/// Projectmodel: morceaux plus doorgegeven scalaire attributen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pieces: PieceSet,
    attributes: BTreeMap<String, String>,
}

impl Project {
    /// Gereserveerde sleutels worden uit de attributen gefilterd.
    #[must_use]
    pub fn new(pieces: PieceSet, mut attributes: BTreeMap<String, String>) -> Self {
        for key in [PIECE_COUNT_KEY, IDENTICAL_KEY, PIECES_KEY] {
            if attributes.remove(key).is_some() {
                log::warn!("attribuut `{key}` genegeerd: sleutel is gereserveerd");
            }
        }
        Self { pieces, attributes }
    }

    #[must_use]
    pub fn pieces(&self) -> &PieceSet {
        &self.pieces
    }

    #[must_use]
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    #[must_use]
    pub fn piece_count(&self) -> usize {
        self.pieces.count()
    }

    #[must_use]
    pub fn is_identical(&self) -> bool {
        self.pieces.is_identical()
    }
}

impl Serialize for Project {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.attributes.len() + 3))?;
        for (key, value) in &self.attributes {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry(PIECE_COUNT_KEY, &self.piece_count())?;
        map.serialize_entry(IDENTICAL_KEY, identical_flag_value(self.is_identical()))?;
        let pieces: Vec<&Piece> = self.pieces.iter().collect();
        map.serialize_entry(PIECES_KEY, &pieces)?;
        map.end()
    }
}
