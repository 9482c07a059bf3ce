//! Client voor de externe reken-, analyse- en PDF-services.
//!
//! Het HTTP-verkeer zelf zit achter [`Transport`]; in de browser is dat
//! `fetch`, in tests een vaste lijst antwoorden.

use std::future::Future;

use serde::Serialize;
use thiserror::Error;

pub mod schema;

#[cfg(target_arch = "wasm32")]
pub mod fetch;

pub use schema::{
    ComputeResponse, ErrorBody, NomenclatureItem, ParseRequest, PdfDocument, PiecePlan, PlanData,
    SectionPlan,
};

use crate::config::EngineConfig;
use crate::model::{DocumentError, Project, ProjectDocument};

/// Generieke foutmeldingen wanneer de server geen `detail` meestuurt.
pub const COMPUTE_FALLBACK: &str = "Erreur du serveur.";
pub const PARSE_FALLBACK: &str = "L'analyse du texte a échoué.";
pub const PDF_FALLBACK: &str = "Erreur lors de la génération du PDF.";

/// Status en ruwe body van een HTTP-antwoord.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("requête impossible : {0}")]
    Network(String),
}

/// Verstuurt een JSON-body met `POST`.
pub trait Transport {
    fn post_json(
        &self,
        url: &str,
        body: String,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn post_json(
        &self,
        url: &str,
        body: String,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> {
        (**self).post_json(url, body)
    }
}

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Niet-succesvol antwoord; `message` is de `detail` van de server of
    /// de generieke melding van het endpoint.
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("impossible d'encoder la requête : {0}")]
    Encode(#[source] serde_json::Error),
    #[error("réponse du serveur illisible : {0}")]
    Decode(#[source] serde_json::Error),
    #[error("réponse d'analyse invalide : {0}")]
    Document(#[from] DocumentError),
}

#[derive(Debug, Clone)]
pub struct ApiClient<T> {
    transport: T,
    compute_url: String,
    parse_url: String,
    pdf_url: String,
    pdf_filename: String,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, config: &EngineConfig) -> Self {
        Self {
            transport,
            compute_url: config.endpoint_url(&config.endpoints.compute),
            parse_url: config.endpoint_url(&config.endpoints.parse),
            pdf_url: config.endpoint_url(&config.endpoints.pdf),
            pdf_filename: config.pdf_filename.clone(),
        }
    }

    /// `process-data`: project in, plan uit.
    pub async fn compute(&self, project: &Project) -> Result<PlanData, RemoteError> {
        let response = self.post(&self.compute_url, project, COMPUTE_FALLBACK).await?;
        let decoded: ComputeResponse =
            serde_json::from_slice(&response.body).map_err(RemoteError::Decode)?;
        log::debug!(
            "plan ontvangen: {} morceau(x), {} nomenclatuurregels",
            decoded.data.morceaux.len(),
            decoded.data.nomenclature.len()
        );
        Ok(decoded.data)
    }

    /// `parse-text`: vrije tekst in, projectdocument uit.
    pub async fn parse_text(&self, description: &str) -> Result<ProjectDocument, RemoteError> {
        let request = ParseRequest {
            description: description.to_owned(),
        };
        let response = self.post(&self.parse_url, &request, PARSE_FALLBACK).await?;
        let value: serde_json::Value =
            serde_json::from_slice(&response.body).map_err(RemoteError::Decode)?;
        Ok(ProjectDocument::from_json(value)?)
    }

    /// `draw-pdf`: stuurt het volledige laatst berekende plan terug.
    pub async fn render_pdf(&self, plan: &PlanData) -> Result<PdfDocument, RemoteError> {
        let response = self.post(&self.pdf_url, plan, PDF_FALLBACK).await?;
        log::debug!("pdf ontvangen ({} bytes)", response.body.len());
        Ok(PdfDocument {
            bytes: response.body,
            filename: self.pdf_filename.clone(),
        })
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        fallback: &str,
    ) -> Result<HttpResponse, RemoteError> {
        let body = serde_json::to_string(body).map_err(RemoteError::Encode)?;
        let response = self.transport.post_json(url, body).await?;
        if response.is_success() {
            return Ok(response);
        }

        let detail = serde_json::from_slice::<ErrorBody>(&response.body).unwrap_or_default();
        let message = detail.message().unwrap_or(fallback).to_owned();
        log::warn!("{url} antwoordde met status {}: {message}", response.status);
        Err(RemoteError::Server {
            status: response.status,
            message,
        })
    }
}
