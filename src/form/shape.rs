//! Vorm van het formulier en de veldbeschrijvingen die daaruit volgen.
//!
//! `render` is een pure functie: gegeven een [`FormShape`] levert ze de
//! volledige lijst getypeerde velden op, los van een UI-toolkit.

use serde::{Deserialize, Serialize};

use super::naming::{junction_name, section_count_name, section_length_name};
use crate::model::Junction;
use crate::model::project::{
    IDENTICAL_KEY, IDENTICAL_NO, IDENTICAL_YES, MAX_PIECES, MAX_SECTIONS, PIECE_COUNT_KEY,
};

/// Een keuzemogelijkheid van een select- of radioveld.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: String,
    pub label: String,
}

impl FieldOption {
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Invoertype van een veld.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Integer { min: u32 },
    Text,
    Select { options: Vec<FieldOption> },
    Radio { options: Vec<FieldOption> },
}

impl FieldKind {
    /// Opties van een select- of radioveld.
    #[must_use]
    pub fn options(&self) -> Option<&[FieldOption]> {
        match self {
            Self::Select { options } | Self::Radio { options } => Some(options),
            Self::Integer { .. } | Self::Text => None,
        }
    }

    /// Controleert of `value` toegestaan is voor dit veldtype. Lege waarden
    /// zijn altijd toegestaan; verplichte velden worden apart gecontroleerd.
    /// Getallen worden pas bij het opbouwen gecontroleerd, zie
    /// [`FieldKind::is_valid_number`].
    #[must_use]
    pub fn accepts(&self, value: &str) -> bool {
        match self.options() {
            Some(options) => value.is_empty() || options.iter().any(|o| o.value == value),
            None => true,
        }
    }

    /// Een ingevulde waarde van een geheel-getalveld moet een geheel getal
    /// `>= min` zijn. Andere veldtypes en lege waarden slagen altijd.
    #[must_use]
    pub fn is_valid_number(&self, value: &str) -> bool {
        let Self::Integer { min } = self else {
            return true;
        };
        let value = value.trim();
        value.is_empty() || value.parse::<u64>().is_ok_and(|n| n >= u64::from(*min))
    }
}

/// Groep waartoe een veld behoort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldGroup {
    Static,
    Control,
    Piece { index: usize, legend: String },
}

/// Beschrijving van één gerenderd veld.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    pub default: String,
    pub group: FieldGroup,
}

/// Vast veld uit de configuratie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticField {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: String,
}

impl StaticField {
    fn new(name: &str, label: &str, kind: FieldKind, required: bool, default: &str) -> Self {
        Self {
            name: name.to_owned(),
            label: label.to_owned(),
            kind,
            required,
            default: default.to_owned(),
        }
    }

    #[must_use]
    pub fn descriptor(&self) -> FieldDescriptor {
        FieldDescriptor {
            name: self.name.clone(),
            label: self.label.clone(),
            kind: self.kind.clone(),
            required: self.required,
            default: self.default.clone(),
            group: FieldGroup::Static,
        }
    }
}

fn options(values: &[(&str, &str)]) -> Vec<FieldOption> {
    values
        .iter()
        .map(|(value, label)| FieldOption::new(*value, *label))
        .collect()
}

/// Standaardcatalogus van vaste velden.
#[must_use]
pub fn default_catalog() -> Vec<StaticField> {
    let integer = |min| FieldKind::Integer { min };
    vec![
        StaticField::new("hauteur_totale", "Hauteur totale (mm)", integer(1), true, "1020"),
        StaticField::new(
            "hauteur_lisse_basse",
            "Hauteur lisse basse (mm)",
            integer(0),
            true,
            "100",
        ),
        StaticField::new("poteau_dims", "Dimensions poteau", FieldKind::Text, true, "40x40"),
        StaticField::new("liaison_dims", "Dimensions liaison", FieldKind::Text, true, "40x20"),
        StaticField::new(
            "lissehaute_dims",
            "Dimensions lisse haute",
            FieldKind::Text,
            true,
            "40x40",
        ),
        StaticField::new(
            "lissebasse_dims",
            "Dimensions lisse basse",
            FieldKind::Text,
            true,
            "40x40",
        ),
        StaticField::new("barreau_dims", "Dimensions barreau", FieldKind::Text, true, "20x20"),
        StaticField::new(
            "ecart_barreaux",
            "Écart maximal entre barreaux (mm)",
            integer(1),
            true,
            "110",
        ),
        StaticField::new(
            "type_fixation",
            "Type de fixation",
            FieldKind::Select {
                options: options(&[("platine", "Platine"), ("scellement", "Scellement")]),
            },
            true,
            "platine",
        ),
        StaticField::new(
            "remplissage_type",
            "Type de remplissage",
            FieldKind::Select {
                options: options(&[
                    ("barreaudage_vertical", "Barreaudage vertical"),
                    ("barreaudage_horizontal", "Barreaudage horizontal"),
                ]),
            },
            true,
            "barreaudage_vertical",
        ),
        StaticField::new(
            "platine_dimensions",
            "Dimensions platine",
            FieldKind::Text,
            false,
            "",
        ),
        StaticField::new("platine_trous", "Trous platine", FieldKind::Text, false, ""),
        StaticField::new("platine_entraxes", "Entraxes platine", FieldKind::Text, false, ""),
    ]
}

/// De twee velden die de vorm van het formulier sturen.
#[must_use]
pub fn control_fields() -> [FieldDescriptor; 2] {
    [
        FieldDescriptor {
            name: PIECE_COUNT_KEY.to_owned(),
            label: "Nombre de morceaux".to_owned(),
            kind: FieldKind::Integer { min: 1 },
            required: true,
            default: "1".to_owned(),
            group: FieldGroup::Control,
        },
        FieldDescriptor {
            name: IDENTICAL_KEY.to_owned(),
            label: "Les morceaux sont-ils identiques ?".to_owned(),
            kind: FieldKind::Radio {
                options: options(&[(IDENTICAL_YES, "Oui"), (IDENTICAL_NO, "Non")]),
            },
            required: true,
            default: IDENTICAL_NO.to_owned(),
            group: FieldGroup::Control,
        },
    ]
}

/// Aantal morceaux, identiek-vlag en secties per gerenderd morceau.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormShape {
    piece_count: usize,
    identical: bool,
    sections: Vec<usize>,
}

impl Default for FormShape {
    fn default() -> Self {
        Self::new(1, false)
    }
}

impl FormShape {
    /// Verse vorm: elk gerenderd morceau heeft één sectie. Het aantal
    /// morceaux wordt begrensd tot `1..=MAX_PIECES`.
    #[must_use]
    pub fn new(piece_count: usize, identical: bool) -> Self {
        let piece_count = piece_count.clamp(1, MAX_PIECES);
        let rendered = if identical { 1 } else { piece_count };
        Self {
            piece_count,
            identical,
            sections: vec![1; rendered],
        }
    }

    #[must_use]
    pub fn piece_count(&self) -> usize {
        self.piece_count
    }

    #[must_use]
    pub fn is_identical(&self) -> bool {
        self.identical
    }

    /// Aantal veldgroepen: één sjabloon bij identieke morceaux.
    #[must_use]
    pub fn rendered_pieces(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    pub fn section_count(&self, piece: usize) -> Option<usize> {
        self.sections.get(piece).copied()
    }

    /// Nieuwe vorm met een ander aantal morceaux; bestaande sectieaantallen blijven.
    #[must_use]
    pub fn with_piece_count(&self, piece_count: usize) -> Self {
        self.reshaped(piece_count.clamp(1, MAX_PIECES), self.identical)
    }

    #[must_use]
    pub fn with_identical(&self, identical: bool) -> Self {
        self.reshaped(self.piece_count, identical)
    }

    /// `None` als `piece` niet gerenderd is of `sections` buiten
    /// `1..=MAX_SECTIONS` valt.
    #[must_use]
    pub fn with_section_count(&self, piece: usize, sections: usize) -> Option<Self> {
        if !(1..=MAX_SECTIONS).contains(&sections) || piece >= self.sections.len() {
            return None;
        }
        let mut next = self.clone();
        next.sections[piece] = sections;
        Some(next)
    }

    fn reshaped(&self, piece_count: usize, identical: bool) -> Self {
        let rendered = if identical { 1 } else { piece_count };
        let mut sections = self.sections.clone();
        sections.resize(rendered, 1);
        Self {
            piece_count,
            identical,
            sections,
        }
    }
}

/// Legende van de veldgroep van een morceau.
#[must_use]
pub fn piece_legend(piece: usize, template: bool) -> String {
    if template {
        "Détail du morceau type".to_owned()
    } else {
        format!("Détail du Morceau {}", piece + 1)
    }
}

fn junction_options() -> Vec<FieldOption> {
    Junction::ALL
        .iter()
        .map(|junction| FieldOption::new(junction.wire_name(), junction.label()))
        .collect()
}

/// Velden van één morceau: het aantal secties, dan `Début`, en per sectie
/// een lengte gevolgd door de jonction erna.
#[must_use]
pub fn render_piece(piece: usize, sections: usize, template: bool) -> Vec<FieldDescriptor> {
    let group = FieldGroup::Piece {
        index: piece,
        legend: piece_legend(piece, template),
    };
    let junction = |boundary: usize| FieldDescriptor {
        name: junction_name(piece, boundary),
        label: if boundary == 0 {
            "Début".to_owned()
        } else {
            format!("Jonction {boundary}")
        },
        kind: FieldKind::Select {
            options: junction_options(),
        },
        required: true,
        default: Junction::default().wire_name().to_owned(),
        group: group.clone(),
    };

    let mut fields = Vec::with_capacity(sections * 2 + 2);
    fields.push(FieldDescriptor {
        name: section_count_name(piece),
        label: "Nombre de sections pour ce morceau".to_owned(),
        kind: FieldKind::Integer { min: 1 },
        required: true,
        default: "1".to_owned(),
        group: group.clone(),
    });
    fields.push(junction(0));
    for section in 0..sections {
        fields.push(FieldDescriptor {
            name: section_length_name(piece, section),
            label: format!("Long. Section {} (mm):", section + 1),
            kind: FieldKind::Integer { min: 1 },
            required: true,
            default: String::new(),
            group: group.clone(),
        });
        fields.push(junction(section + 1));
    }
    fields
}

/// Alle dynamische velden van de vorm.
#[must_use]
pub fn render(shape: &FormShape) -> Vec<FieldDescriptor> {
    shape
        .sections
        .iter()
        .enumerate()
        .flat_map(|(piece, sections)| render_piece(piece, *sections, shape.identical))
        .collect()
}
