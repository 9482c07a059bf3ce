//! Applicatiecontext: het formulier, het laatst berekende plan en de
//! lopende verzoeken.
//!
//! Elk verzoek heeft een begin- en een eindfase. Tussen die twee ligt de
//! netwerkaanroep; de sessie wordt dan niet geleend, zodat andere
//! interacties gewoon doorgaan.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use crate::api::{ApiClient, PdfDocument, PlanData, RemoteError, Transport};
use crate::form::{BuildError, FormState, SynthesisError, synthesize};
use crate::model::{Project, ProjectDocument};
use crate::render::{ResultView, render_plan};
use crate::store::{LoadOutcome, ProjectStore, SnapshotStorage, StoreError};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RequestKind {
    Compute,
    Parse,
    Pdf,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Compute => "calcul",
            Self::Parse => "analyse",
            Self::Pdf => "pdf",
        })
    }
}

/// Het laatste succesvolle rekenresultaat.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LastResult {
    #[default]
    NotComputed,
    Computed(PlanData),
}

impl LastResult {
    #[must_use]
    pub fn plan(&self) -> Option<&PlanData> {
        match self {
            Self::NotComputed => None,
            Self::Computed(plan) => Some(plan),
        }
    }
}

/// Meldingen voor de gebruiker na opslaan of laden.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Notice {
    Saved,
    Loaded,
    NothingSaved,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Saved => "Projet sauvegardé !",
            Self::Loaded => "Projet chargé !",
            Self::NothingSaved => "Aucun projet sauvegardé trouvé.",
        })
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    InvalidForm(#[from] BuildError),
    #[error("une requête « {0} » est déjà en cours")]
    Busy(RequestKind),
    #[error("Veuillez entrer une description.")]
    EmptyDescription,
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Default)]
pub struct Session {
    form: FormState,
    last_result: LastResult,
    in_flight: BTreeSet<RequestKind>,
}

impl Session {
    #[must_use]
    pub fn new(form: FormState) -> Self {
        Self {
            form,
            last_result: LastResult::NotComputed,
            in_flight: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormState {
        &mut self.form
    }

    #[must_use]
    pub fn last_result(&self) -> &LastResult {
        &self.last_result
    }

    #[must_use]
    pub fn is_in_flight(&self, kind: RequestKind) -> bool {
        self.in_flight.contains(&kind)
    }

    /// Valideert het formulier en markeert de berekening als lopend.
    pub fn begin_compute(&mut self) -> Result<Project, SessionError> {
        self.ensure_idle(RequestKind::Compute)?;
        let project = self.form.build()?;
        self.start(RequestKind::Compute);
        Ok(project)
    }

    /// Bewaart een geslaagd plan; bij een fout blijft het vorige staan.
    pub fn finish_compute(
        &mut self,
        outcome: Result<PlanData, RemoteError>,
    ) -> Result<ResultView, SessionError> {
        self.finish(RequestKind::Compute);
        let plan = outcome?;
        let view = render_plan(&plan);
        self.last_result = LastResult::Computed(plan);
        Ok(view)
    }

    /// Een lege beschrijving wordt lokaal geweigerd, zonder netwerkverkeer.
    pub fn begin_parse(&mut self, description: &str) -> Result<String, SessionError> {
        if description.trim().is_empty() {
            return Err(SessionError::EmptyDescription);
        }
        self.ensure_idle(RequestKind::Parse)?;
        self.start(RequestKind::Parse);
        Ok(description.to_owned())
    }

    /// Vult het formulier met het geanalyseerde project. Het formulier wordt
    /// alleen vervangen als de synthese volledig slaagt.
    pub fn finish_parse(
        &mut self,
        outcome: Result<ProjectDocument, RemoteError>,
    ) -> Result<(), SessionError> {
        self.finish(RequestKind::Parse);
        let document = outcome?;
        self.form = synthesize(&self.form, &document)?;
        Ok(())
    }

    /// `None` zolang er niets berekend is; de download is dan een no-op.
    pub fn begin_pdf(&mut self) -> Result<Option<PlanData>, SessionError> {
        let Some(plan) = self.last_result.plan().cloned() else {
            log::debug!("pdf gevraagd zonder berekend plan, genegeerd");
            return Ok(None);
        };
        self.ensure_idle(RequestKind::Pdf)?;
        self.start(RequestKind::Pdf);
        Ok(Some(plan))
    }

    pub fn finish_pdf(
        &mut self,
        outcome: Result<PdfDocument, RemoteError>,
    ) -> Result<PdfDocument, SessionError> {
        self.finish(RequestKind::Pdf);
        Ok(outcome?)
    }

    pub fn save<S: SnapshotStorage>(&self, store: &ProjectStore<S>) -> Result<Notice, SessionError> {
        store.save(&self.form.snapshot())?;
        Ok(Notice::Saved)
    }

    pub fn load<S: SnapshotStorage>(&mut self, store: &ProjectStore<S>) -> Result<Notice, SessionError> {
        match store.load()? {
            LoadOutcome::NotFound => Ok(Notice::NothingSaved),
            LoadOutcome::Loaded(snapshot) => {
                let document = ProjectDocument::from_snapshot(&snapshot);
                self.form = synthesize(&self.form, &document)?;
                Ok(Notice::Loaded)
            }
        }
    }

    fn ensure_idle(&self, kind: RequestKind) -> Result<(), SessionError> {
        if self.in_flight.contains(&kind) {
            return Err(SessionError::Busy(kind));
        }
        Ok(())
    }

    fn start(&mut self, kind: RequestKind) {
        log::debug!("verzoek `{kind}` gestart");
        self.in_flight.insert(kind);
    }

    fn finish(&mut self, kind: RequestKind) {
        log::debug!("verzoek `{kind}` afgerond");
        self.in_flight.remove(&kind);
    }
}

/// Formulier versturen naar de rekenservice.
pub async fn submit_form<T: Transport>(
    session: &RefCell<Session>,
    client: &ApiClient<T>,
) -> Result<ResultView, SessionError> {
    let project = session.borrow_mut().begin_compute()?;
    let outcome = client.compute(&project).await;
    session.borrow_mut().finish_compute(outcome)
}

/// Vrije tekst laten analyseren en het resultaat in het formulier zetten.
pub async fn analyse_description<T: Transport>(
    session: &RefCell<Session>,
    client: &ApiClient<T>,
    description: &str,
) -> Result<(), SessionError> {
    let description = session.borrow_mut().begin_parse(description)?;
    let outcome = client.parse_text(&description).await;
    session.borrow_mut().finish_parse(outcome)
}

/// PDF van het laatst berekende plan; `None` als er nog niets berekend is.
pub async fn download_pdf<T: Transport>(
    session: &RefCell<Session>,
    client: &ApiClient<T>,
) -> Result<Option<PdfDocument>, SessionError> {
    let Some(plan) = session.borrow_mut().begin_pdf()? else {
        return Ok(None);
    };
    let outcome = client.render_pdf(&plan).await;
    session.borrow_mut().finish_pdf(outcome).map(Some)
}
