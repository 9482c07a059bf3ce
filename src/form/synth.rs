//! Projectdocument → formulier.
//!
//! Volgorde is belangrijk: eerst de scalaire velden, dan de vorm (aantal en
//! identiek-vlag), en pas daarna de waarden van de velden die
//! de vorm heeft aangemaakt. De synthese werkt op een kopie; bij een fout
//! blijft het oorspronkelijke formulier onaangeroerd.

use thiserror::Error;

use super::naming::{PieceField, junction_name, section_count_name, section_length_name};
use super::{DataLoss, FormError, FormState};
use crate::model::project::{IDENTICAL_KEY, MAX_SECTIONS, PIECE_COUNT_KEY, parse_identical_flag};
use crate::model::{DocumentError, Junction, Piece, ProjectDocument};

/// Fouten tijdens het opnieuw opbouwen van het formulier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisError {
    #[error("valeur `{value}` invalide pour le champ `{field}`")]
    InvalidField { field: String, value: String },
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Form(#[from] FormError),
}

/// Bouwt een nieuw formulier uit `document`, vertrekkend van `form`.
pub fn synthesize(form: &FormState, document: &ProjectDocument) -> Result<FormState, SynthesisError> {
    let mut next = form.clone();

    assign_scalars(&mut next, document);

    let piece_count = document.piece_count()?;
    let identical = document
        .scalar(IDENTICAL_KEY)
        .and_then(parse_identical_flag)
        .unwrap_or_else(|| next.shape().is_identical());
    next.reset_pieces(piece_count, identical);
    log::debug!("synthese: {piece_count} morceau(x), identiek: {identical}");

    match document.pieces() {
        Some(pieces) => fill_from_pieces(&mut next, pieces)?,
        None => fill_from_fields(&mut next, document)?,
    }

    Ok(next)
}

fn assign_scalars(form: &mut FormState, document: &ProjectDocument) {
    for (name, value) in document.scalars() {
        if name == PIECE_COUNT_KEY || name == IDENTICAL_KEY || PieceField::parse(name).is_some() {
            continue;
        }
        if form.descriptor(name).is_none() {
            log::debug!("synthese: geen veld `{name}`, waarde genegeerd");
            continue;
        }
        if let Err(err) = form.set_value(name, value) {
            log::warn!("synthese: `{name}` niet overgenomen: {err}");
        }
    }
}

fn fill_from_pieces(form: &mut FormState, pieces: &[Piece]) -> Result<(), SynthesisError> {
    let rendered = form.shape().rendered_pieces();
    if pieces.len() > rendered && !form.shape().is_identical() {
        log::warn!(
            "synthese: {} morceau(x) aangeleverd, {rendered} getoond; de rest wordt genegeerd",
            pieces.len()
        );
    } else if pieces.len() < rendered {
        log::warn!(
            "synthese: slechts {} van {rendered} morceau(x) aangeleverd",
            pieces.len()
        );
    }

    for (index, piece) in pieces.iter().enumerate().take(rendered) {
        write_piece(form, index, piece)?;
    }
    Ok(())
}

/// Schrijft een morceau rechtstreeks via zijn indices: sectie `j` naar
/// `section_longueur_j`, jonction `j` naar `jonction_j`.
fn write_piece(form: &mut FormState, index: usize, piece: &Piece) -> Result<(), SynthesisError> {
    form.set_section_count(index, piece.section_count(), DataLoss::Accept)?;
    for (section, length) in piece.sections().iter().enumerate() {
        form.set_value(&section_length_name(index, section), &length.to_string())?;
    }
    for (boundary, junction) in piece.junctions().iter().enumerate() {
        form.set_value(&junction_name(index, boundary), junction.wire_name())?;
    }
    Ok(())
}

/// Terugval voor een platte snapshot: velden per naam overnemen.
fn fill_from_fields(form: &mut FormState, document: &ProjectDocument) -> Result<(), SynthesisError> {
    for index in 0..form.shape().rendered_pieces() {
        let count_field = section_count_name(index);
        let Some(raw) = document.scalar(&count_field) else {
            continue;
        };
        let sections = raw
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|count| (1..=MAX_SECTIONS).contains(count))
            .ok_or_else(|| SynthesisError::InvalidField {
                field: count_field.clone(),
                value: raw.to_owned(),
            })?;
        form.set_section_count(index, sections, DataLoss::Accept)?;

        for section in 0..sections {
            let field = section_length_name(index, section);
            if let Some(value) = document.scalar(&field) {
                form.set_value(&field, value)?;
            }
        }
        for boundary in 0..=sections {
            let field = junction_name(index, boundary);
            if let Some(value) = document.scalar(&field) {
                if value.parse::<Junction>().is_err() {
                    return Err(SynthesisError::InvalidField {
                        field,
                        value: value.to_owned(),
                    });
                }
                form.set_value(&field, value)?;
            }
        }
    }
    Ok(())
}
