//! Datamodel van een garde-corps: jonctions, morceaux en projecten.

pub mod document;
pub mod junction;
pub mod piece;
pub mod project;

pub use document::{DocumentError, ProjectDocument};
pub use junction::Junction;
pub use piece::{Piece, PieceError, SectionLength, StructureItem};
pub use project::{MAX_PIECES, MAX_SECTIONS, PieceSet, Project, ProjectError};
