//! Property-based invariant tests for the form/model transforms.
//!
//! Verifies:
//! 1. Round trip: building the form synthesized from a project gives the project back
//! 2. Naming inversion: parse(name(i, j, kind)) == (i, j, kind)
//! 3. Shape: a piece with N sections renders N length fields and N + 1 junction fields
//! 4. Broadcast: identical pieces build into k value-equal pieces
//! 5. Flattening: unflatten(flatten(p)) == p

use std::collections::BTreeMap;
use std::num::NonZeroU32;

use garde_corps_engine::form::naming::{PieceField, SlotKind};
use garde_corps_engine::form::shape::{self, FormShape};
use garde_corps_engine::form::{DataLoss, FormState, synthesize};
use garde_corps_engine::model::{Junction, Piece, PieceSet, Project, ProjectDocument, SectionLength};
use proptest::prelude::*;

// ── Strategy helpers ──────────────────────────────────────────────────

fn arb_junction() -> impl Strategy<Value = Junction> {
    prop_oneof![Just(Junction::None), Just(Junction::Post), Just(Junction::Link)]
}

fn arb_piece() -> impl Strategy<Value = Piece> {
    (1usize..=5)
        .prop_flat_map(|sections| {
            (
                prop::collection::vec(1u32..=20_000, sections),
                prop::collection::vec(arb_junction(), sections + 1),
            )
        })
        .prop_map(|(lengths, junctions)| {
            let lengths = lengths
                .into_iter()
                .filter_map(SectionLength::new)
                .collect();
            Piece::new(lengths, junctions).unwrap()
        })
}

fn arb_piece_set() -> impl Strategy<Value = PieceSet> {
    prop_oneof![
        (1u32..=4, arb_piece()).prop_map(|(count, template)| {
            PieceSet::identical(NonZeroU32::new(count).unwrap(), template)
        }),
        prop::collection::vec(arb_piece(), 1..=4)
            .prop_map(|pieces| PieceSet::distinct(pieces).unwrap()),
    ]
}

/// Attributen zoals een vers formulier ze zou opleveren, met een
/// variabele hoogte.
fn attributes(height: u32) -> BTreeMap<String, String> {
    let mut attributes: BTreeMap<String, String> = shape::default_catalog()
        .into_iter()
        .map(|field| (field.name, field.default))
        .collect();
    attributes.insert("hauteur_totale".to_owned(), height.to_string());
    attributes
}

fn arb_project() -> impl Strategy<Value = Project> {
    (arb_piece_set(), 1u32..=3_000).prop_map(|(pieces, height)| Project::new(pieces, attributes(height)))
}

fn arb_slot_kind() -> impl Strategy<Value = SlotKind> {
    prop_oneof![
        Just(SlotKind::SectionCount),
        Just(SlotKind::SectionLength),
        Just(SlotKind::Junction),
    ]
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Round trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn synthesized_form_builds_original_project(project in arb_project()) {
        let document = ProjectDocument::from_json(serde_json::to_value(&project).unwrap()).unwrap();
        let form = synthesize(&FormState::default(), &document).unwrap();
        prop_assert_eq!(form.build().unwrap(), project);
    }

    #[test]
    fn snapshot_reload_reproduces_form(project in arb_project()) {
        let document = ProjectDocument::from_json(serde_json::to_value(&project).unwrap()).unwrap();
        let form = synthesize(&FormState::default(), &document).unwrap();

        let reloaded = synthesize(
            &FormState::default(),
            &ProjectDocument::from_snapshot(&form.snapshot()),
        )
        .unwrap();
        prop_assert_eq!(reloaded.values(), form.values());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Naming inversion
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn field_names_invert_exactly(piece in 0usize..10_000, slot in 0usize..10_000, kind in arb_slot_kind()) {
        let field = PieceField::from_parts(piece, slot, kind);
        let parsed = PieceField::parse(&field.name()).unwrap();
        prop_assert_eq!(parsed.piece(), piece);
        prop_assert_eq!(parsed.kind(), kind);
        if kind != SlotKind::SectionCount {
            prop_assert_eq!(parsed.slot(), slot);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Shape invariant
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn rendered_piece_has_n_sections_and_n_plus_one_junctions(
        pieces in 1usize..=4,
        target in 0usize..4,
        sections in 1usize..=12,
    ) {
        let target = target % pieces;
        let shape = FormShape::new(pieces, false)
            .with_section_count(target, sections)
            .unwrap();

        let fields: Vec<PieceField> = shape::render(&shape)
            .iter()
            .filter_map(|field| PieceField::parse(&field.name))
            .filter(|field| field.piece() == target)
            .collect();
        let lengths = fields.iter().filter(|f| f.kind() == SlotKind::SectionLength).count();
        let junctions = fields.iter().filter(|f| f.kind() == SlotKind::Junction).count();
        prop_assert_eq!(lengths, sections);
        prop_assert_eq!(junctions, sections + 1);
    }

    #[test]
    fn value_keys_follow_reshapes(counts in prop::collection::vec(1usize..=6, 1..=5)) {
        let mut form = FormState::default();
        for (step, count) in counts.into_iter().enumerate() {
            if step % 2 == 0 {
                form.set_piece_count(count, DataLoss::Accept).unwrap();
            } else {
                form.set_section_count(0, count, DataLoss::Accept).unwrap();
            }
            let mut names: Vec<String> = form.descriptors().into_iter().map(|f| f.name).collect();
            names.sort();
            let keys: Vec<String> = form.values().keys().cloned().collect();
            prop_assert_eq!(names, keys);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Identical-piece broadcast
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn identical_template_is_broadcast(count in 1usize..=20, template in arb_piece()) {
        let mut form = FormState::default();
        form.set_identical(true, DataLoss::Refuse).unwrap();
        form.set_piece_count(count, DataLoss::Refuse).unwrap();
        form.set_section_count(0, template.section_count(), DataLoss::Accept).unwrap();
        for (section, length) in template.sections().iter().enumerate() {
            form.set_value(&format!("morceau_0_section_longueur_{section}"), &length.to_string()).unwrap();
        }
        for (boundary, junction) in template.junctions().iter().enumerate() {
            form.set_value(&format!("morceau_0_jonction_{boundary}"), junction.wire_name()).unwrap();
        }

        let project = form.build().unwrap();
        prop_assert_eq!(project.piece_count(), count);
        prop_assert!(project.pieces().iter().all(|piece| *piece == template));
        prop_assert_eq!(project.pieces().iter().count(), count);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Flattening consistency
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn unflatten_restores_piece(piece in arb_piece()) {
        let items = piece.flatten();
        prop_assert_eq!(items.len(), piece.section_count() * 2 + 1);
        prop_assert_eq!(Piece::from_structure(&items).unwrap(), piece);
    }
}
