//! Een morceau: een afwisselende reeks van jonctions en secties.
//!
//! Intern bewaart een [`Piece`] de secties en jonctions in twee aparte
//! vectoren, zodat jonction `j` altijd direct adresseerbaar is. De
//! afgevlakte vorm (`structure`) bestaat alleen op de draad.

use core::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::junction::Junction;

/// Lengte van een sectie in millimeter, altijd minstens 1.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionLength(NonZeroU32);

impl SectionLength {
    #[must_use]
    pub const fn new(millimeters: u32) -> Option<Self> {
        match NonZeroU32::new(millimeters) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl From<NonZeroU32> for SectionLength {
    fn from(value: NonZeroU32) -> Self {
        Self(value)
    }
}

impl fmt::Display for SectionLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Element van de afgevlakte structuur zoals de rekenservice die verwacht.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawStructureItem", into = "RawStructureItem")]
pub enum StructureItem {
    Junction(Junction),
    Section { longueur: SectionLength },
}

impl StructureItem {
    #[must_use]
    pub fn section(millimeters: u32) -> Option<Self> {
        SectionLength::new(millimeters).map(|longueur| Self::Section { longueur })
    }

    #[must_use]
    pub const fn is_section(&self) -> bool {
        matches!(self, Self::Section { .. })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct RawStructureItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    longueur: Option<u32>,
}

const SECTION_TYPE: &str = "section";

impl TryFrom<RawStructureItem> for StructureItem {
    type Error = PieceError;

    fn try_from(raw: RawStructureItem) -> Result<Self, Self::Error> {
        if raw.kind == SECTION_TYPE {
            let millimeters = raw.longueur.ok_or(PieceError::MissingLength)?;
            return StructureItem::section(millimeters).ok_or(PieceError::ZeroLength);
        }

        raw.kind
            .parse::<Junction>()
            .map(StructureItem::Junction)
            .map_err(|_| PieceError::UnknownItem(raw.kind))
    }
}

impl From<StructureItem> for RawStructureItem {
    fn from(item: StructureItem) -> Self {
        match item {
            StructureItem::Junction(junction) => Self {
                kind: junction.wire_name().to_owned(),
                longueur: None,
            },
            StructureItem::Section { longueur } => Self {
                kind: SECTION_TYPE.to_owned(),
                longueur: Some(longueur.get()),
            },
        }
    }
}

/// Fouten bij het opbouwen of decoderen van een morceau.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PieceError {
    #[error("un morceau doit contenir au moins une section")]
    NoSections,
    #[error("{junctions} jonctions pour {sections} sections (attendu : sections + 1)")]
    JunctionCount { sections: usize, junctions: usize },
    #[error("deux jonctions consécutives à la position {0} de la structure")]
    AdjacentJunctions(usize),
    #[error("nombre_sections vaut {declared} mais la structure contient {found} sections")]
    SectionCountMismatch { declared: u32, found: usize },
    #[error("section sans longueur")]
    MissingLength,
    #[error("la longueur d'une section doit être d'au moins 1 mm")]
    ZeroLength,
    #[error("élément de structure inconnu : `{0}`")]
    UnknownItem(String),
}

/// Een morceau met `N` secties en `N + 1` jonctions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PieceWire", into = "PieceWire")]
pub struct Piece {
    sections: Vec<SectionLength>,
    junctions: Vec<Junction>,
}

impl Piece {
    /// Bouwt een morceau en controleert de kardinaliteit.
    pub fn new(sections: Vec<SectionLength>, junctions: Vec<Junction>) -> Result<Self, PieceError> {
        if sections.is_empty() {
            return Err(PieceError::NoSections);
        }
        if junctions.len() != sections.len() + 1 {
            return Err(PieceError::JunctionCount {
                sections: sections.len(),
                junctions: junctions.len(),
            });
        }
        Ok(Self {
            sections,
            junctions,
        })
    }

    #[must_use]
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    pub fn sections(&self) -> &[SectionLength] {
        &self.sections
    }

    /// Jonction `0` is het begin, jonction `section_count()` het einde.
    #[must_use]
    pub fn junctions(&self) -> &[Junction] {
        &self.junctions
    }

    /// Afgevlakte vorm: `[J, S, J, S, ..., J]`, lengte `2N + 1`.
    #[must_use]
    pub fn flatten(&self) -> Vec<StructureItem> {
        let mut items = Vec::with_capacity(self.sections.len() * 2 + 1);
        for (index, junction) in self.junctions.iter().enumerate() {
            items.push(StructureItem::Junction(*junction));
            if let Some(longueur) = self.sections.get(index) {
                items.push(StructureItem::Section { longueur: *longueur });
            }
        }
        items
    }

    /// Inverse van [`Piece::flatten`].
    ///
    /// Een grens zonder jonction-element (twee secties naast elkaar of een
    /// sectie aan de rand) krijgt [`Junction::None`]; het veld bestaat in het
    /// formulier hoe dan ook.
    pub fn from_structure(items: &[StructureItem]) -> Result<Self, PieceError> {
        let mut sections = Vec::new();
        let mut junctions = Vec::new();
        let mut pending: Option<Junction> = None;

        for (position, item) in items.iter().enumerate() {
            match item {
                StructureItem::Junction(junction) => {
                    if pending.is_some() {
                        return Err(PieceError::AdjacentJunctions(position));
                    }
                    pending = Some(*junction);
                }
                StructureItem::Section { longueur } => {
                    junctions.push(pending.take().unwrap_or(Junction::None));
                    sections.push(*longueur);
                }
            }
        }
        junctions.push(pending.unwrap_or(Junction::None));

        Self::new(sections, junctions)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PieceWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nombre_sections: Option<u32>,
    structure: Vec<StructureItem>,
}

impl TryFrom<PieceWire> for Piece {
    type Error = PieceError;

    fn try_from(wire: PieceWire) -> Result<Self, Self::Error> {
        let piece = Piece::from_structure(&wire.structure)?;
        if let Some(declared) = wire.nombre_sections
            && declared as usize != piece.section_count()
        {
            return Err(PieceError::SectionCountMismatch {
                declared,
                found: piece.section_count(),
            });
        }
        Ok(piece)
    }
}

impl From<Piece> for PieceWire {
    fn from(piece: Piece) -> Self {
        Self {
            nombre_sections: u32::try_from(piece.section_count()).ok(),
            structure: piece.flatten(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Junction, Piece, PieceError, SectionLength, StructureItem};
    use pretty_assertions::assert_eq;

    fn mm(value: u32) -> SectionLength {
        SectionLength::new(value).unwrap()
    }

    fn sample() -> Piece {
        Piece::new(
            vec![mm(1500), mm(2000)],
            vec![Junction::Post, Junction::Link, Junction::Post],
        )
        .unwrap()
    }

    #[test]
    fn flattens_into_alternating_sequence() {
        let items = sample().flatten();
        assert_eq!(
            items,
            vec![
                StructureItem::Junction(Junction::Post),
                StructureItem::section(1500).unwrap(),
                StructureItem::Junction(Junction::Link),
                StructureItem::section(2000).unwrap(),
                StructureItem::Junction(Junction::Post),
            ]
        );
    }

    #[test]
    fn unflattening_restores_sections_and_junctions() {
        let piece = Piece::from_structure(&sample().flatten()).unwrap();
        assert_eq!(piece.sections(), &[mm(1500), mm(2000)]);
        assert_eq!(
            piece.junctions(),
            &[Junction::Post, Junction::Link, Junction::Post]
        );
    }

    #[test]
    fn missing_boundary_junction_becomes_none() {
        let items = [
            StructureItem::section(1000).unwrap(),
            StructureItem::section(1200).unwrap(),
            StructureItem::Junction(Junction::Post),
        ];
        let piece = Piece::from_structure(&items).unwrap();
        assert_eq!(
            piece.junctions(),
            &[Junction::None, Junction::None, Junction::Post]
        );
    }

    #[test]
    fn adjacent_junctions_are_rejected() {
        let items = [
            StructureItem::Junction(Junction::Post),
            StructureItem::Junction(Junction::Link),
            StructureItem::section(1000).unwrap(),
        ];
        assert_eq!(
            Piece::from_structure(&items),
            Err(PieceError::AdjacentJunctions(1))
        );
    }

    #[test]
    fn structure_without_sections_is_rejected() {
        let items = [StructureItem::Junction(Junction::Post)];
        assert_eq!(Piece::from_structure(&items), Err(PieceError::NoSections));
    }

    #[test]
    fn new_checks_junction_count() {
        let err = Piece::new(vec![mm(10)], vec![Junction::Post]).unwrap_err();
        assert_eq!(
            err,
            PieceError::JunctionCount {
                sections: 1,
                junctions: 1
            }
        );
    }

    #[test]
    fn wire_format_matches_compute_service() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "nombre_sections": 2,
                "structure": [
                    {"type": "poteau"},
                    {"type": "section", "longueur": 1500},
                    {"type": "liaison"},
                    {"type": "section", "longueur": 2000},
                    {"type": "poteau"}
                ]
            })
        );
    }

    #[test]
    fn decoding_derives_count_when_absent() {
        let piece: Piece = serde_json::from_value(serde_json::json!({
            "id": 0,
            "structure": [
                {"type": "poteau"},
                {"type": "section", "longueur": 3000},
                {"type": "liaison"}
            ]
        }))
        .unwrap();
        assert_eq!(piece.section_count(), 1);
        assert_eq!(piece.junctions(), &[Junction::Post, Junction::Link]);
    }

    #[test]
    fn decoding_rejects_inconsistent_count() {
        let result: Result<Piece, _> = serde_json::from_value(serde_json::json!({
            "nombre_sections": 2,
            "structure": [
                {"type": "poteau"},
                {"type": "section", "longueur": 3000},
                {"type": "poteau"}
            ]
        }));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("nombre_sections vaut 2"), "{err}");
    }

    #[test]
    fn decoding_rejects_zero_length() {
        let result: Result<StructureItem, _> =
            serde_json::from_value(serde_json::json!({"type": "section", "longueur": 0}));
        assert!(result.is_err());
    }

    #[test]
    fn decoding_rejects_unknown_item() {
        let result: Result<StructureItem, _> =
            serde_json::from_value(serde_json::json!({"type": "mur"}));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("mur"), "{err}");
    }
}
