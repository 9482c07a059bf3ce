//! Naamgeving van de dynamische formuliervelden per morceau.
//!
//! - `morceau_{i}_nombre_sections`
//! - `morceau_{i}_section_longueur_{j}` voor `j` in `0..N`
//! - `morceau_{i}_jonction_{j}` voor `j` in `0..=N`
//!
//! Jonction `0` is het begin van het morceau, jonction `N` het einde.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Soort slot binnen een morceau.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SlotKind {
    SectionCount,
    SectionLength,
    Junction,
}

/// Een veld binnen de veldgroep van een morceau.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceField {
    SectionCount { piece: usize },
    SectionLength { piece: usize, section: usize },
    Junction { piece: usize, boundary: usize },
}

static PIECE_FIELD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^morceau_(0|[1-9][0-9]*)_(?:(nombre_sections)|section_longueur_(0|[1-9][0-9]*)|jonction_(0|[1-9][0-9]*))$",
    )
    .expect("veldnaampatroon is geldig")
});

impl PieceField {
    #[must_use]
    pub const fn piece(self) -> usize {
        match self {
            Self::SectionCount { piece }
            | Self::SectionLength { piece, .. }
            | Self::Junction { piece, .. } => piece,
        }
    }

    /// Slotindex: sectie- of jonctionnummer, `0` voor het aantal secties.
    #[must_use]
    pub const fn slot(self) -> usize {
        match self {
            Self::SectionCount { .. } => 0,
            Self::SectionLength { section, .. } => section,
            Self::Junction { boundary, .. } => boundary,
        }
    }

    #[must_use]
    pub const fn kind(self) -> SlotKind {
        match self {
            Self::SectionCount { .. } => SlotKind::SectionCount,
            Self::SectionLength { .. } => SlotKind::SectionLength,
            Self::Junction { .. } => SlotKind::Junction,
        }
    }

    /// Bouwt het veld uit een `(morceau, slot, soort)`-drietal.
    #[must_use]
    pub const fn from_parts(piece: usize, slot: usize, kind: SlotKind) -> Self {
        match kind {
            SlotKind::SectionCount => Self::SectionCount { piece },
            SlotKind::SectionLength => Self::SectionLength {
                piece,
                section: slot,
            },
            SlotKind::Junction => Self::Junction {
                piece,
                boundary: slot,
            },
        }
    }

    #[must_use]
    pub fn name(self) -> String {
        self.to_string()
    }

    /// Exacte inverse van [`PieceField::name`]. Namen met voorloopnullen of
    /// andere afwijkingen geven `None`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let captures = PIECE_FIELD_PATTERN.captures(name)?;
        let piece = captures.get(1)?.as_str().parse().ok()?;

        if captures.get(2).is_some() {
            return Some(Self::SectionCount { piece });
        }
        if let Some(section) = captures.get(3) {
            return Some(Self::SectionLength {
                piece,
                section: section.as_str().parse().ok()?,
            });
        }
        let boundary = captures.get(4)?.as_str().parse().ok()?;
        Some(Self::Junction { piece, boundary })
    }
}

impl fmt::Display for PieceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SectionCount { piece } => write!(f, "morceau_{piece}_nombre_sections"),
            Self::SectionLength { piece, section } => {
                write!(f, "morceau_{piece}_section_longueur_{section}")
            }
            Self::Junction { piece, boundary } => write!(f, "morceau_{piece}_jonction_{boundary}"),
        }
    }
}

#[must_use]
pub fn section_count_name(piece: usize) -> String {
    PieceField::SectionCount { piece }.name()
}

#[must_use]
pub fn section_length_name(piece: usize, section: usize) -> String {
    PieceField::SectionLength { piece, section }.name()
}

#[must_use]
pub fn junction_name(piece: usize, boundary: usize) -> String {
    PieceField::Junction { piece, boundary }.name()
}
