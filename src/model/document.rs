//! Losjes getypeerd projectdocument, zoals het van buitenaf binnenkomt.
//!
//! Drie bronnen leveren dit formaat: het volledige rekenresultaat, het
//! antwoord van de tekstanalyse en een opgeslagen formuliersnapshot. Ze delen
//! alleen de vorm "object met scalaire velden en eventueel `morceaux`".

use std::collections::BTreeMap;

use serde_json::{Number, Value as JsonValue};
use thiserror::Error;

use super::piece::Piece;
use super::project::{MAX_PIECES, MAX_SECTIONS, PIECE_COUNT_KEY, PIECES_KEY};

/// Fouten bij het inlezen van een projectdocument.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("le projet doit être un objet JSON")]
    NotAnObject,
    #[error("le champ `morceaux` doit être une liste")]
    PiecesNotAList,
    #[error("morceau {index} invalide : {message}")]
    Malformed { index: usize, message: String },
    #[error("trop de morceaux : {count} (maximum {MAX_PIECES})")]
    TooManyPieces { count: String },
    #[error("morceau {index} : trop de sections ({count}, maximum {MAX_SECTIONS})")]
    TooManySections { index: usize, count: usize },
}

/// Scalaire velden plus (optioneel) gevalideerde morceaux.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectDocument {
    scalars: BTreeMap<String, String>,
    pieces: Option<Vec<Piece>>,
}

impl ProjectDocument {
    #[must_use]
    pub fn new(scalars: BTreeMap<String, String>, pieces: Option<Vec<Piece>>) -> Self {
        Self {
            scalars,
            pieces: pieces.filter(|pieces| !pieces.is_empty()),
        }
    }

    /// Een snapshot heeft geen `morceaux`; alles is scalair.
    #[must_use]
    pub fn from_snapshot(snapshot: &BTreeMap<String, String>) -> Self {
        Self::new(snapshot.clone(), None)
    }

    /// Leest een JSON-object in. `null`-waarden, lijsten en objecten op het
    /// hoogste niveau worden overgeslagen; `morceaux` wordt gevalideerd.
    pub fn from_json(value: JsonValue) -> Result<Self, DocumentError> {
        let JsonValue::Object(object) = value else {
            return Err(DocumentError::NotAnObject);
        };

        let mut scalars = BTreeMap::new();
        let mut pieces = None;

        for (key, value) in object {
            if key == PIECES_KEY {
                pieces = decode_pieces(value)?;
                continue;
            }
            match scalar_text(&value) {
                Some(text) => {
                    scalars.insert(key, text);
                }
                None => log::debug!("veld `{key}` is niet scalair en wordt overgeslagen"),
            }
        }

        Ok(Self::new(scalars, pieces))
    }

    #[must_use]
    pub fn scalars(&self) -> &BTreeMap<String, String> {
        &self.scalars
    }

    #[must_use]
    pub fn scalar(&self, key: &str) -> Option<&str> {
        self.scalars.get(key).map(String::as_str)
    }

    /// `None` wanneer het document geen (niet-lege) `morceaux` bevat.
    #[must_use]
    pub fn pieces(&self) -> Option<&[Piece]> {
        self.pieces.as_deref()
    }

    /// Aantal morceaux: expliciete waarde, anders lengte van `morceaux`, anders 1.
    ///
    /// Een aantal boven [`MAX_PIECES`] is een fout, ook wanneer het alleen uit
    /// de lijst volgt.
    pub fn piece_count(&self) -> Result<usize, DocumentError> {
        if let Some(text) = self.scalar(PIECE_COUNT_KEY) {
            match parse_bounded_count(text, MAX_PIECES) {
                Count::Valid(count) => return Ok(count),
                Count::TooLarge => {
                    return Err(DocumentError::TooManyPieces {
                        count: text.trim().to_owned(),
                    });
                }
                Count::Invalid => {
                    log::warn!("`{PIECE_COUNT_KEY}` onleesbaar (`{text}`), terugval op de lijst");
                }
            }
        }
        match self.pieces.as_ref().map(Vec::len) {
            Some(len) if len > MAX_PIECES => Err(DocumentError::TooManyPieces {
                count: len.to_string(),
            }),
            Some(len) => Ok(len),
            None => Ok(1),
        }
    }
}

enum Count {
    Valid(usize),
    TooLarge,
    Invalid,
}

/// Leest een aantal in `1..=max`. Een geheel getal dat niet in `usize` past,
/// telt als te groot en niet als onleesbaar.
fn parse_bounded_count(text: &str, max: usize) -> Count {
    let text = text.trim();
    match text.parse::<usize>() {
        Ok(0) => Count::Invalid,
        Ok(count) if count > max => Count::TooLarge,
        Ok(count) => Count::Valid(count),
        Err(_) if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) => Count::TooLarge,
        Err(_) => Count::Invalid,
    }
}

fn decode_pieces(value: JsonValue) -> Result<Option<Vec<Piece>>, DocumentError> {
    let items = match value {
        JsonValue::Null => return Ok(None),
        JsonValue::Array(items) => items,
        _ => return Err(DocumentError::PiecesNotAList),
    };

    if items.len() > MAX_PIECES {
        return Err(DocumentError::TooManyPieces {
            count: items.len().to_string(),
        });
    }

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let piece =
                serde_json::from_value::<Piece>(item).map_err(|err| DocumentError::Malformed {
                    index,
                    message: err.to_string(),
                })?;
            if piece.section_count() > MAX_SECTIONS {
                return Err(DocumentError::TooManySections {
                    index,
                    count: piece.section_count(),
                });
            }
            Ok(piece)
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn scalar_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(text) => Some(text.clone()),
        JsonValue::Number(number) => Some(number_text(number)),
        JsonValue::Bool(flag) => Some(flag.to_string()),
        JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

/// Gehele floats (`2.0`) worden als geheel getal geschreven, zodat ze als
/// aantal of lengte leesbaar blijven.
fn number_text(number: &Number) -> String {
    match number.as_f64() {
        Some(float) if number.is_f64() && float.fract() == 0.0 && float.abs() < 1e15 => {
            format!("{float:.0}")
        }
        _ => number.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{DocumentError, ProjectDocument};
    use crate::model::junction::Junction;
    use crate::model::project::{MAX_PIECES, MAX_SECTIONS};
    use serde_json::json;

    #[test]
    fn collects_scalars_and_skips_nulls() {
        let doc = ProjectDocument::from_json(json!({
            "nombre_morceaux": null,
            "hauteur_totale": 1020,
            "poteau_dims": "40x40",
            "nomenclature": [{"item": "Poteaux"}],
            "platine_details": null
        }))
        .unwrap();

        assert_eq!(doc.scalar("hauteur_totale"), Some("1020"));
        assert_eq!(doc.scalar("poteau_dims"), Some("40x40"));
        assert!(doc.scalar("nombre_morceaux").is_none());
        assert!(doc.scalar("nomenclature").is_none());
        assert!(doc.pieces().is_none());
    }

    #[test]
    fn piece_count_prefers_explicit_value() {
        let doc = ProjectDocument::from_json(json!({
            "nombre_morceaux": 3,
            "morceaux": [
                {"structure": [{"type": "poteau"}, {"type": "section", "longueur": 1000}, {"type": "poteau"}]}
            ]
        }))
        .unwrap();
        assert_eq!(doc.piece_count(), Ok(3));
    }

    #[test]
    fn piece_count_falls_back_to_list_then_one() {
        let doc = ProjectDocument::from_json(json!({
            "morceaux": [
                {"structure": [{"type": "poteau"}, {"type": "section", "longueur": 1000}, {"type": "poteau"}]},
                {"structure": [{"type": "liaison"}, {"type": "section", "longueur": 4000}, {"type": "poteau"}]}
            ]
        }))
        .unwrap();
        assert_eq!(doc.piece_count(), Ok(2));
        assert_eq!(doc.pieces().unwrap()[1].junctions()[0], Junction::Link);

        let empty = ProjectDocument::from_json(json!({"morceaux": []})).unwrap();
        assert!(empty.pieces().is_none());
        assert_eq!(empty.piece_count(), Ok(1));
    }

    #[test]
    fn rejects_non_objects_and_bad_pieces() {
        assert!(matches!(
            ProjectDocument::from_json(json!([1, 2])),
            Err(DocumentError::NotAnObject)
        ));
        assert!(matches!(
            ProjectDocument::from_json(json!({"morceaux": "deux"})),
            Err(DocumentError::PiecesNotAList)
        ));
        let err = ProjectDocument::from_json(json!({
            "morceaux": [{"structure": [{"type": "poteau"}]}]
        }))
        .unwrap_err();
        assert!(matches!(err, DocumentError::Malformed { index: 0, .. }));
    }

    #[test]
    fn piece_count_is_bounded() {
        let huge = ProjectDocument::from_json(json!({"nombre_morceaux": 4_000_000_000u64})).unwrap();
        assert_eq!(
            huge.piece_count(),
            Err(DocumentError::TooManyPieces {
                count: "4000000000".to_owned()
            })
        );

        let overflow = ProjectDocument::from_json(json!({
            "nombre_morceaux": "123456789012345678901234567890"
        }))
        .unwrap();
        assert!(matches!(
            overflow.piece_count(),
            Err(DocumentError::TooManyPieces { .. })
        ));

        let at_limit = ProjectDocument::from_json(json!({"nombre_morceaux": MAX_PIECES})).unwrap();
        assert_eq!(at_limit.piece_count(), Ok(MAX_PIECES));
    }

    #[test]
    fn oversized_piece_lists_are_rejected() {
        let piece = json!({"structure": [{"type": "poteau"}, {"type": "section", "longueur": 1000}, {"type": "poteau"}]});
        let pieces: Vec<_> = std::iter::repeat_n(piece, MAX_PIECES + 1).collect();
        assert!(matches!(
            ProjectDocument::from_json(json!({"morceaux": pieces})),
            Err(DocumentError::TooManyPieces { .. })
        ));

        let mut structure = vec![json!({"type": "poteau"})];
        for _ in 0..=MAX_SECTIONS {
            structure.push(json!({"type": "section", "longueur": 500}));
            structure.push(json!({"type": "rien"}));
        }
        assert_eq!(
            ProjectDocument::from_json(json!({"morceaux": [{"structure": structure}]})),
            Err(DocumentError::TooManySections {
                index: 0,
                count: MAX_SECTIONS + 1
            })
        );
    }

    #[test]
    fn integral_floats_read_as_integers() {
        let doc = ProjectDocument::from_json(json!({
            "nombre_morceaux": 2.0,
            "hauteur_totale": 1100.0,
            "ecart_barreaux": 110.5
        }))
        .unwrap();
        assert_eq!(doc.scalar("nombre_morceaux"), Some("2"));
        assert_eq!(doc.scalar("hauteur_totale"), Some("1100"));
        assert_eq!(doc.scalar("ecart_barreaux"), Some("110.5"));
        assert_eq!(doc.piece_count(), Ok(2));
    }
}
