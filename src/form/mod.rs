//! Formuliertoestand: vaste velden, vorm en waarden.
//!
//! De waardenmap bevat altijd precies de namen van de velden die de huidige
//! vorm rendert. Elke vormwijziging rendert opnieuw: velden die blijven,
//! houden hun waarde; nieuwe velden krijgen hun standaardwaarde.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

pub mod builder;
pub mod naming;
pub mod shape;
pub mod synth;

pub use builder::{BuildError, build_project};
pub use naming::{PieceField, SlotKind};
pub use shape::{FieldDescriptor, FieldGroup, FieldKind, FieldOption, FormShape, StaticField};
pub use synth::{SynthesisError, synthesize};

use crate::model::Project;
use crate::model::project::{
    IDENTICAL_KEY, MAX_PIECES, MAX_SECTIONS, PIECE_COUNT_KEY, identical_flag_value,
    parse_identical_flag,
};

/// Alle veldnamen met hun huidige tekstwaarde; ook het opslagformaat.
pub type FlatSnapshot = BTreeMap<String, String>;

/// Wat er moet gebeuren met ingevulde velden die door een vormwijziging verdwijnen.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DataLoss {
    /// Weiger de wijziging zolang ingevulde velden zouden verdwijnen.
    Refuse,
    /// De gebruiker heeft bevestigd dat die velden weg mogen.
    Accept,
}

impl DataLoss {
    #[must_use]
    pub const fn from_confirmation(confirmed: bool) -> Self {
        if confirmed { Self::Accept } else { Self::Refuse }
    }
}

/// Fouten bij het bewerken van het formulier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("champ inconnu : `{0}`")]
    UnknownField(String),
    #[error("valeur `{value}` non autorisée pour le champ `{field}`")]
    InvalidOption { field: String, value: String },
    #[error("le champ `{field}` attend un nombre entier entre 1 et {max}, reçu `{value}`")]
    InvalidCount {
        field: String,
        value: String,
        max: usize,
    },
    #[error("le morceau {0} n'est pas affiché")]
    PieceNotRendered(usize),
    #[error("cette modification efface {} champ(s) déjà rempli(s) ; confirmez pour continuer", .fields.len())]
    DiscardRequiresConfirmation { fields: Vec<String> },
}

/// De volledige toestand van het configuratorformulier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    catalog: Vec<StaticField>,
    shape: FormShape,
    values: FlatSnapshot,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new(shape::default_catalog())
    }
}

impl FormState {
    /// Formulier met één morceau van één sectie en alle standaardwaarden.
    #[must_use]
    pub fn new(catalog: Vec<StaticField>) -> Self {
        let shape = FormShape::default();
        let values = collect_descriptors(&catalog, &shape)
            .into_iter()
            .map(|field| (field.name, field.default))
            .collect();
        let mut state = Self {
            catalog,
            shape,
            values,
        };
        state.sync_controls();
        state
    }

    #[must_use]
    pub fn shape(&self) -> &FormShape {
        &self.shape
    }

    #[must_use]
    pub fn catalog(&self) -> &[StaticField] {
        &self.catalog
    }

    /// Vaste velden, stuurvelden en daarna de velden per morceau.
    #[must_use]
    pub fn descriptors(&self) -> Vec<FieldDescriptor> {
        collect_descriptors(&self.catalog, &self.shape)
    }

    #[must_use]
    pub fn descriptor(&self, name: &str) -> Option<FieldDescriptor> {
        self.descriptors().into_iter().find(|field| field.name == name)
    }

    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn values(&self) -> &FlatSnapshot {
        &self.values
    }

    /// Alle huidige veldwaarden, ongefilterd.
    #[must_use]
    pub fn snapshot(&self) -> FlatSnapshot {
        self.values.clone()
    }

    /// Schrijft een veldwaarde. Stuurvelden sturen door naar de
    /// vormoperaties en weigeren dataverlies.
    pub fn set_value(&mut self, name: &str, value: &str) -> Result<(), FormError> {
        if name == PIECE_COUNT_KEY {
            let count = parse_count(name, value, MAX_PIECES)?;
            return self.set_piece_count(count, DataLoss::Refuse);
        }
        if name == IDENTICAL_KEY {
            let identical = parse_identical_flag(value).ok_or_else(|| FormError::InvalidOption {
                field: name.to_owned(),
                value: value.to_owned(),
            })?;
            return self.set_identical(identical, DataLoss::Refuse);
        }
        if let Some(PieceField::SectionCount { piece }) = PieceField::parse(name) {
            let count = parse_count(name, value, MAX_SECTIONS)?;
            return self.set_section_count(piece, count, DataLoss::Refuse);
        }

        let descriptor = self
            .descriptor(name)
            .ok_or_else(|| FormError::UnknownField(name.to_owned()))?;
        if !descriptor.kind.accepts(value) {
            return Err(FormError::InvalidOption {
                field: name.to_owned(),
                value: value.to_owned(),
            });
        }
        self.values.insert(name.to_owned(), value.to_owned());
        Ok(())
    }

    pub fn set_piece_count(&mut self, count: usize, loss: DataLoss) -> Result<(), FormError> {
        if !(1..=MAX_PIECES).contains(&count) {
            return Err(FormError::InvalidCount {
                field: PIECE_COUNT_KEY.to_owned(),
                value: count.to_string(),
                max: MAX_PIECES,
            });
        }
        log::debug!("aantal morceaux wordt {count}");
        let next = self.shape.with_piece_count(count);
        self.apply_shape(next, loss)
    }

    pub fn set_identical(&mut self, identical: bool, loss: DataLoss) -> Result<(), FormError> {
        log::debug!("morceaux identiques wordt {identical}");
        let next = self.shape.with_identical(identical);
        self.apply_shape(next, loss)
    }

    pub fn set_section_count(
        &mut self,
        piece: usize,
        count: usize,
        loss: DataLoss,
    ) -> Result<(), FormError> {
        if piece >= self.shape.rendered_pieces() {
            return Err(FormError::PieceNotRendered(piece));
        }
        let next = self
            .shape
            .with_section_count(piece, count)
            .ok_or_else(|| FormError::InvalidCount {
                field: naming::section_count_name(piece),
                value: count.to_string(),
                max: MAX_SECTIONS,
            })?;
        log::debug!("morceau {piece} krijgt {count} sectie(s)");
        self.apply_shape(next, loss)
    }

    /// Vers gerenderde veldgroepen voor alle morceaux; eerdere waarden van
    /// morceauvelden vervallen.
    pub fn reset_pieces(&mut self, piece_count: usize, identical: bool) {
        let shape = FormShape::new(piece_count, identical);
        let mut values: FlatSnapshot = self
            .values
            .iter()
            .filter(|(name, _)| PieceField::parse(name).is_none())
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        for field in shape::render(&shape) {
            values.insert(field.name, field.default);
        }
        self.shape = shape;
        self.values = values;
        self.sync_controls();
    }

    /// Controleert verplichte velden en getallen en bouwt daarna het
    /// projectmodel.
    pub fn build(&self) -> Result<Project, BuildError> {
        for field in self.descriptors() {
            let value = self.value(&field.name).unwrap_or_default();
            if field.required && value.trim().is_empty() {
                return Err(BuildError::MissingField(field.name));
            }
            if !field.kind.is_valid_number(value) {
                return Err(BuildError::InvalidNumber {
                    field: field.name,
                    value: value.to_owned(),
                });
            }
        }
        build_project(&self.values)
    }

    fn apply_shape(&mut self, next: FormShape, loss: DataLoss) -> Result<(), FormError> {
        let current_defaults: BTreeMap<String, String> = self
            .descriptors()
            .into_iter()
            .map(|field| (field.name, field.default))
            .collect();
        let next_fields = collect_descriptors(&self.catalog, &next);
        let kept: BTreeSet<&str> = next_fields.iter().map(|field| field.name.as_str()).collect();

        let discarded: Vec<String> = self
            .values
            .iter()
            .filter(|(name, value)| {
                !kept.contains(name.as_str())
                    && current_defaults.get(*name).is_none_or(|default| default != *value)
            })
            .map(|(name, _)| name.clone())
            .collect();

        if !discarded.is_empty() {
            if loss == DataLoss::Refuse {
                return Err(FormError::DiscardRequiresConfirmation { fields: discarded });
            }
            log::info!("{} ingevulde velden vervallen na vormwijziging", discarded.len());
        }

        let mut values = FlatSnapshot::new();
        for field in next_fields {
            let value = self.values.remove(&field.name).unwrap_or(field.default);
            values.insert(field.name, value);
        }
        self.values = values;
        self.shape = next;
        self.sync_controls();
        Ok(())
    }

    fn sync_controls(&mut self) {
        self.values
            .insert(PIECE_COUNT_KEY.to_owned(), self.shape.piece_count().to_string());
        self.values.insert(
            IDENTICAL_KEY.to_owned(),
            identical_flag_value(self.shape.is_identical()).to_owned(),
        );
        for piece in 0..self.shape.rendered_pieces() {
            if let Some(count) = self.shape.section_count(piece) {
                self.values
                    .insert(naming::section_count_name(piece), count.to_string());
            }
        }
    }
}

fn collect_descriptors(catalog: &[StaticField], shape: &FormShape) -> Vec<FieldDescriptor> {
    catalog
        .iter()
        .map(StaticField::descriptor)
        .chain(shape::control_fields())
        .chain(shape::render(shape))
        .collect()
}

fn parse_count(field: &str, value: &str, max: usize) -> Result<usize, FormError> {
    value
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|count| (1..=max).contains(count))
        .ok_or_else(|| FormError::InvalidCount {
            field: field.to_owned(),
            value: value.to_owned(),
            max,
        })
}
