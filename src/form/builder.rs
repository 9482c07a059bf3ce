//! Formulier → projectmodel.

use std::num::NonZeroU32;

use thiserror::Error;

use super::FlatSnapshot;
use super::naming::{PieceField, junction_name, section_count_name, section_length_name};
use crate::model::project::{
    IDENTICAL_KEY, MAX_PIECES, MAX_SECTIONS, PIECE_COUNT_KEY, PIECES_KEY, parse_identical_flag,
};
use crate::model::{Junction, Piece, PieceError, PieceSet, Project, ProjectError, SectionLength};

/// Redenen waarom een formulier geen geldig project oplevert. Er wordt
/// nooit een gedeeltelijk project verstuurd.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("formulaire invalide : le champ `{0}` est obligatoire")]
    MissingField(String),
    #[error("formulaire invalide : `{field}` attend un nombre entier positif, reçu `{value}`")]
    InvalidNumber { field: String, value: String },
    #[error("formulaire invalide : jonction `{value}` inconnue dans `{field}`")]
    InvalidJunction { field: String, value: String },
    #[error("formulaire invalide : valeur `{value}` non reconnue pour `{field}`")]
    InvalidChoice { field: String, value: String },
    #[error("formulaire invalide : morceau {piece} : {source}")]
    Piece {
        piece: usize,
        #[source]
        source: PieceError,
    },
    #[error("formulaire invalide : {0}")]
    Project(#[from] ProjectError),
}

/// Bouwt het projectmodel uit de platte veldwaarden.
///
/// Bij identieke morceaux worden alleen de velden van morceau `0` gelezen;
/// dat sjabloon geldt voor alle `nombre_morceaux` morceaux.
pub fn build_project(snapshot: &FlatSnapshot) -> Result<Project, BuildError> {
    let count = required_count(snapshot, PIECE_COUNT_KEY, MAX_PIECES)?;
    let identical_raw = required(snapshot, IDENTICAL_KEY)?;
    let identical =
        parse_identical_flag(identical_raw).ok_or_else(|| BuildError::InvalidChoice {
            field: IDENTICAL_KEY.to_owned(),
            value: identical_raw.to_owned(),
        })?;

    let pieces = if identical {
        PieceSet::identical(count, build_piece(snapshot, 0)?)
    } else {
        let pieces = (0..count.get() as usize)
            .map(|piece| build_piece(snapshot, piece))
            .collect::<Result<Vec<_>, _>>()?;
        PieceSet::distinct(pieces)?
    };

    let attributes = snapshot
        .iter()
        .filter(|(name, _)| !is_structural(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    log::debug!(
        "project opgebouwd: {} morceau(x), identiek: {identical}",
        pieces.count()
    );
    Ok(Project::new(pieces, attributes))
}

fn build_piece(snapshot: &FlatSnapshot, piece: usize) -> Result<Piece, BuildError> {
    let sections = required_count(snapshot, &section_count_name(piece), MAX_SECTIONS)?.get() as usize;

    let mut lengths = Vec::with_capacity(sections);
    let mut junctions = Vec::with_capacity(sections + 1);
    for boundary in 0..=sections {
        junctions.push(required_junction(snapshot, &junction_name(piece, boundary))?);
        if boundary < sections {
            let length = required_positive(snapshot, &section_length_name(piece, boundary))?;
            lengths.push(SectionLength::from(length));
        }
    }

    Piece::new(lengths, junctions).map_err(|source| BuildError::Piece { piece, source })
}

fn is_structural(name: &str) -> bool {
    name == PIECE_COUNT_KEY
        || name == IDENTICAL_KEY
        || name == PIECES_KEY
        || PieceField::parse(name).is_some()
}

fn required<'a>(snapshot: &'a FlatSnapshot, field: &str) -> Result<&'a str, BuildError> {
    snapshot
        .get(field)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| BuildError::MissingField(field.to_owned()))
}

fn required_positive(snapshot: &FlatSnapshot, field: &str) -> Result<NonZeroU32, BuildError> {
    let raw = required(snapshot, field)?;
    raw.parse::<NonZeroU32>()
        .map_err(|_| BuildError::InvalidNumber {
            field: field.to_owned(),
            value: raw.to_owned(),
        })
}

fn required_count(
    snapshot: &FlatSnapshot,
    field: &str,
    max: usize,
) -> Result<NonZeroU32, BuildError> {
    let count = required_positive(snapshot, field)?;
    if count.get() as usize > max {
        return Err(BuildError::InvalidNumber {
            field: field.to_owned(),
            value: count.to_string(),
        });
    }
    Ok(count)
}

fn required_junction(snapshot: &FlatSnapshot, field: &str) -> Result<Junction, BuildError> {
    let raw = required(snapshot, field)?;
    raw.parse::<Junction>()
        .map_err(|_| BuildError::InvalidJunction {
            field: field.to_owned(),
            value: raw.to_owned(),
        })
}
