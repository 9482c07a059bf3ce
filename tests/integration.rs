use std::cell::{Cell, RefCell};
use std::future::{Future, ready};

use futures::executor::block_on;
use garde_corps_engine::Configurator;
use garde_corps_engine::api::{ApiClient, HttpResponse, Transport, TransportError};
use garde_corps_engine::config::EngineConfig;
use garde_corps_engine::form::{DataLoss, FormError, FormState};
use garde_corps_engine::model::{Junction, SectionLength};
use garde_corps_engine::session::{self, Notice, RequestKind, Session, SessionError};
use garde_corps_engine::store::{MemoryStorage, ProjectStore};
use pretty_assertions::assert_eq;
use serde_json::json;

struct CountingTransport {
    calls: Cell<usize>,
}

impl Transport for CountingTransport {
    fn post_json(
        &self,
        _url: &str,
        _body: String,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> {
        self.calls.set(self.calls.get() + 1);
        ready(Ok(HttpResponse {
            status: 200,
            body: json!({}).to_string().into_bytes(),
        }))
    }
}

struct AnswerTransport(serde_json::Value);

impl Transport for AnswerTransport {
    fn post_json(
        &self,
        _url: &str,
        _body: String,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> {
        ready(Ok(HttpResponse {
            status: 200,
            body: self.0.to_string().into_bytes(),
        }))
    }
}

#[test]
fn configurator_starts_with_one_piece() {
    let configurator = Configurator::new();
    assert_eq!(configurator.value("nombre_morceaux").as_deref(), Some("1"));
    assert_eq!(configurator.value("morceau_0_nombre_sections").as_deref(), Some("1"));
    assert_eq!(configurator.config().storage_key, "gardeCorpsProject");
}

#[test]
fn configurator_rejects_unknown_fields_and_invalid_config() {
    let mut configurator = Configurator::new();
    assert!(configurator.set_field("onbekend", "1").is_err());
    assert!(configurator.set_field("morceau_0_jonction_0", "mur").is_err());
    assert!(Configurator::with_config(r#"{"storage_key": ""}"#).is_err());
}

#[test]
fn configurator_requires_confirmation_before_dropping_data() {
    let mut configurator = Configurator::new();
    configurator.set_piece_count(2, false).unwrap();
    configurator
        .set_field("morceau_1_section_longueur_0", "1500")
        .unwrap();

    assert!(configurator.set_identical(true, false).is_err());
    assert_eq!(
        configurator.value("morceau_1_section_longueur_0").as_deref(),
        Some("1500")
    );

    configurator.set_identical(true, true).unwrap();
    assert!(configurator.value("morceau_1_section_longueur_0").is_none());
    assert_eq!(configurator.value("morceaux_identiques").as_deref(), Some("oui"));
}

#[test]
fn single_simple_piece_builds_expected_model() {
    let mut form = FormState::default();
    form.set_value("nombre_morceaux", "1").unwrap();
    form.set_value("morceaux_identiques", "non").unwrap();
    form.set_value("morceau_0_nombre_sections", "1").unwrap();
    form.set_value("morceau_0_jonction_0", "poteau").unwrap();
    form.set_value("morceau_0_section_longueur_0", "1800").unwrap();
    form.set_value("morceau_0_jonction_1", "poteau").unwrap();

    let project = form.build().unwrap();
    assert_eq!(project.piece_count(), 1);
    let piece = project.pieces().get(0).unwrap();
    assert_eq!(piece.sections(), &[SectionLength::new(1800).unwrap()]);
    assert_eq!(piece.junctions(), &[Junction::Post, Junction::Post]);
}

#[test]
fn save_then_load_restores_every_field() {
    let store = ProjectStore::new(MemoryStorage::new(), "gardeCorpsProject");
    let mut session = Session::default();
    {
        let form = session.form_mut();
        form.set_piece_count(2, DataLoss::Refuse).unwrap();
        form.set_section_count(1, 3, DataLoss::Refuse).unwrap();
        form.set_value("morceau_0_section_longueur_0", "1200").unwrap();
        form.set_value("morceau_1_jonction_0", "liaison").unwrap();
        form.set_value("morceau_1_section_longueur_2", "700").unwrap();
        form.set_value("morceau_1_jonction_3", "rien").unwrap();
        form.set_value("type_fixation", "scellement").unwrap();
    }
    assert_eq!(session.save(&store).unwrap(), Notice::Saved);
    let saved = session.form().snapshot();

    // Eerst een andere vorm, zodat het laden de vorm echt moet herstellen.
    session
        .form_mut()
        .set_piece_count(1, DataLoss::Accept)
        .unwrap();
    assert_eq!(session.load(&store).unwrap(), Notice::Loaded);
    assert_eq!(session.form().snapshot(), saved);
}

#[test]
fn loading_without_saved_project_is_a_notice() {
    let store = ProjectStore::new(MemoryStorage::new(), "gardeCorpsProject");
    let mut session = Session::default();
    let before = session.form().snapshot();

    let notice = session.load(&store).unwrap();
    assert_eq!(notice.to_string(), "Aucun projet sauvegardé trouvé.");
    assert_eq!(session.form().snapshot(), before);
}

#[test]
fn empty_description_is_rejected_without_network_call() {
    let transport = CountingTransport {
        calls: Cell::new(0),
    };
    let client = ApiClient::new(&transport, &EngineConfig::default());
    let session = RefCell::new(Session::default());

    for description in ["", "   ", "\n\t "] {
        let err = block_on(session::analyse_description(&session, &client, description)).unwrap_err();
        assert!(matches!(err, SessionError::EmptyDescription));
    }
    assert_eq!(transport.calls.get(), 0);
}

#[test]
fn reshape_error_names_discarded_fields() {
    let mut form = FormState::default();
    form.set_section_count(0, 2, DataLoss::Refuse).unwrap();
    form.set_value("morceau_0_section_longueur_1", "950").unwrap();

    let err = form
        .set_section_count(0, 1, DataLoss::Refuse)
        .unwrap_err();
    assert_eq!(
        err,
        FormError::DiscardRequiresConfirmation {
            fields: vec!["morceau_0_section_longueur_1".to_owned()]
        }
    );
}

#[test]
fn configurator_validates_numbers_and_counts() {
    let mut configurator = Configurator::new();
    configurator
        .set_field("morceau_0_section_longueur_0", "1800")
        .unwrap();
    assert!(configurator.validate().is_ok());

    configurator.set_field("hauteur_totale", "abc").unwrap();
    assert!(configurator.validate().is_err());
    configurator.set_field("hauteur_totale", "1020").unwrap();

    assert!(configurator.set_piece_count(u32::MAX, true).is_err());
    assert!(configurator.set_section_count(0, u32::MAX, true).is_err());
    assert_eq!(configurator.value("nombre_morceaux").as_deref(), Some("1"));
    assert!(configurator.validate().is_ok());
}

#[test]
fn oversized_analysis_answer_leaves_form_untouched() {
    let session = RefCell::new(Session::default());
    let before = session.borrow().form().snapshot();
    let transport = AnswerTransport(json!({"nombre_morceaux": 4_000_000_000u64}));
    let client = ApiClient::new(&transport, &EngineConfig::default());

    let err = block_on(session::analyse_description(&session, &client, "garde-corps géant")).unwrap_err();
    assert!(matches!(err, SessionError::Synthesis(_)));
    assert_eq!(session.borrow().form().snapshot(), before);
    assert!(!session.borrow().is_in_flight(RequestKind::Parse));
}
