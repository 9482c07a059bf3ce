//! Weergavestructuur van een berekend plan.

use serde::Serialize;

use crate::api::{PiecePlan, PlanData, SectionPlan};

pub const RESULT_TITLE: &str = "Proposition Générée";
pub const MISSING_DESCRIPTION: &str = "Description non fournie.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultView {
    pub title: String,
    pub description: String,
    pub nomenclature: Vec<NomenclatureRow>,
    pub pieces: Vec<PieceTable>,
    /// Het volledige plan, ingesprongen JSON.
    pub json: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NomenclatureRow {
    pub item: String,
    pub details: String,
    pub quantity: String,
    pub unit_length: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PieceTable {
    pub heading: String,
    pub rows: Vec<SectionRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionRow {
    pub section: String,
    pub section_length: String,
    pub free_length: String,
    pub bar_count: String,
    pub bar_gap: String,
    pub start_gap: String,
}

#[must_use]
pub fn render_plan(plan: &PlanData) -> ResultView {
    let description = plan
        .description_projet
        .as_deref()
        .filter(|text| !text.is_empty())
        .unwrap_or(MISSING_DESCRIPTION)
        .to_owned();

    let nomenclature = plan
        .nomenclature
        .iter()
        .map(|item| NomenclatureRow {
            item: item.item.clone(),
            details: item.details.clone(),
            quantity: item.quantite.to_string(),
            unit_length: format!("{} mm", item.longueur_unitaire_mm),
        })
        .collect();

    let pieces = plan
        .morceaux
        .iter()
        .enumerate()
        .map(|(index, piece)| piece_table(index, piece))
        .collect();

    ResultView {
        title: RESULT_TITLE.to_owned(),
        description,
        nomenclature,
        pieces,
        json: serde_json::to_string_pretty(plan).unwrap_or_default(),
    }
}

fn piece_table(index: usize, piece: &PiecePlan) -> PieceTable {
    PieceTable {
        heading: format!(
            "Détail du Morceau {} (Longueur totale: {})",
            index + 1,
            millimeters(piece.longueur_totale)
        ),
        rows: piece
            .sections_details
            .iter()
            .enumerate()
            .map(|(section, details)| section_row(section, details))
            .collect(),
    }
}

fn section_row(section: usize, details: &SectionPlan) -> SectionRow {
    SectionRow {
        section: (section + 1).to_string(),
        section_length: millimeters(details.longueur_section),
        free_length: millimeters(details.longueur_libre),
        bar_count: details.nombre_barreaux.to_string(),
        bar_gap: millimeters(details.vide_entre_barreaux_mm),
        start_gap: millimeters(details.jeu_depart_mm),
    }
}

fn millimeters(value: f64) -> String {
    format!("{value:.1} mm")
}
