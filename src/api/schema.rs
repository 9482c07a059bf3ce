//! JSON-schema's van de drie externe endpoints.
//!
//! De plandata worden getypeerd gelezen voor weergave, maar onbekende
//! sleutels blijven bewaard: de PDF-service krijgt exact het resultaat
//! terug dat de rekenservice leverde.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Antwoord van `process-data`: `{status, data}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub data: PlanData,
}

/// Het berekende fabricageplan.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_projet: Option<String>,
    #[serde(default)]
    pub nomenclature: Vec<NomenclatureItem>,
    #[serde(default)]
    pub morceaux: Vec<PiecePlan>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NomenclatureItem {
    pub item: String,
    #[serde(default)]
    pub details: String,
    pub quantite: u32,
    pub longueur_unitaire_mm: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiecePlan {
    pub longueur_totale: f64,
    #[serde(default)]
    pub sections_details: Vec<SectionPlan>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionPlan {
    pub longueur_section: f64,
    pub longueur_libre: f64,
    pub nombre_barreaux: u32,
    pub vide_entre_barreaux_mm: f64,
    pub jeu_depart_mm: f64,
}

/// Verzoek aan `parse-text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseRequest {
    pub description: String,
}

/// Foutlichaam van een niet-succesvol antwoord. Validatiefouten van de
/// server sturen `detail` als lijst; alleen een tekst wordt getoond.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorBody {
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.detail
            .as_ref()
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|detail| !detail.is_empty())
    }
}

/// Binair antwoord van `draw-pdf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfDocument {
    pub bytes: Vec<u8>,
    pub filename: String,
}
