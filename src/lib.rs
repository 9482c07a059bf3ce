#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod config;
pub mod form;
pub mod model;
pub mod render;
pub mod session;
pub mod store;

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use config::EngineConfig;
use form::{DataLoss, FormState};
use serde::Serialize;
use session::{RequestKind, Session};
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

/// Public entry point for consumers.
#[wasm_bindgen]
pub struct Configurator {
    config: EngineConfig,
    session: Rc<RefCell<Session>>,
}

impl Default for Configurator {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl Configurator {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Configurator {
        Self::from_config(EngineConfig::default())
    }

    /// Configurator met instellingen uit JSON; ontbrekende sleutels krijgen
    /// hun standaardwaarde.
    #[wasm_bindgen]
    pub fn with_config(config_json: &str) -> Result<Configurator, JsValue> {
        let config = EngineConfig::from_json(config_json).map_err(to_js_error)?;
        Ok(Self::from_config(config))
    }

    /// Zelfde als `with_config`, maar met een JS-object in plaats van tekst.
    #[wasm_bindgen]
    pub fn with_config_object(config: JsValue) -> Result<Configurator, JsValue> {
        let value: serde_json::Value = serde_wasm_bindgen::from_value(config).map_err(to_js_error)?;
        let config = EngineConfig::from_value(value).map_err(to_js_error)?;
        Ok(Self::from_config(config))
    }

    /// Alle gerenderde velden, in weergavevolgorde.
    #[wasm_bindgen]
    pub fn get_fields(&self) -> Result<JsValue, JsValue> {
        let fields = self.session.borrow().form().descriptors();
        serde_wasm_bindgen::to_value(&fields).map_err(to_js_error)
    }

    /// De platte snapshot van alle veldwaarden.
    #[wasm_bindgen]
    pub fn get_snapshot(&self) -> Result<JsValue, JsValue> {
        let snapshot = self.session.borrow().form().snapshot();
        snapshot
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(to_js_error)
    }

    /// Schrijf een veldwaarde. Stuurvelden weigeren hier het wissen van
    /// ingevulde velden; gebruik daarvoor de `set_*`-methodes met `confirm`.
    #[wasm_bindgen]
    pub fn set_field(&mut self, name: &str, value: &str) -> Result<(), JsValue> {
        self.session
            .borrow_mut()
            .form_mut()
            .set_value(name, value)
            .map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn set_piece_count(&mut self, count: u32, confirm: bool) -> Result<(), JsValue> {
        self.session
            .borrow_mut()
            .form_mut()
            .set_piece_count(count as usize, DataLoss::from_confirmation(confirm))
            .map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn set_identical(&mut self, identical: bool, confirm: bool) -> Result<(), JsValue> {
        self.session
            .borrow_mut()
            .form_mut()
            .set_identical(identical, DataLoss::from_confirmation(confirm))
            .map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn set_section_count(&mut self, piece: u32, count: u32, confirm: bool) -> Result<(), JsValue> {
        self.session
            .borrow_mut()
            .form_mut()
            .set_section_count(piece as usize, count as usize, DataLoss::from_confirmation(confirm))
            .map_err(to_js_error)
    }

    /// Controleert het formulier zonder iets te versturen.
    #[wasm_bindgen]
    pub fn validate(&self) -> Result<(), JsValue> {
        self.session
            .borrow()
            .form()
            .build()
            .map(|_| ())
            .map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn has_result(&self) -> bool {
        self.session.borrow().last_result().plan().is_some()
    }

    #[wasm_bindgen]
    pub fn is_computing(&self) -> bool {
        self.session.borrow().is_in_flight(RequestKind::Compute)
    }

    #[wasm_bindgen]
    pub fn is_analysing(&self) -> bool {
        self.session.borrow().is_in_flight(RequestKind::Parse)
    }

    #[wasm_bindgen]
    pub fn is_rendering_pdf(&self) -> bool {
        self.session.borrow().is_in_flight(RequestKind::Pdf)
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl Configurator {
    /// Bewaar de snapshot in `localStorage`; geeft de melding terug.
    #[wasm_bindgen]
    pub fn save_project(&self) -> Result<String, JsValue> {
        let store = self.browser_store()?;
        let notice = self.session.borrow().save(&store).map_err(to_js_error)?;
        Ok(notice.to_string())
    }

    /// Laad de snapshot uit `localStorage`; geeft de melding terug.
    #[wasm_bindgen]
    pub fn load_project(&mut self) -> Result<String, JsValue> {
        let store = self.browser_store()?;
        let notice = self.session.borrow_mut().load(&store).map_err(to_js_error)?;
        Ok(notice.to_string())
    }

    /// Verstuur het formulier; de promise levert de resultaatweergave.
    #[wasm_bindgen]
    pub fn submit(&self) -> js_sys::Promise {
        let session = Rc::clone(&self.session);
        let client = self.client();
        wasm_bindgen_futures::future_to_promise(async move {
            let view = session::submit_form(&session, &client)
                .await
                .map_err(to_js_error)?;
            serde_wasm_bindgen::to_value(&view).map_err(to_js_error)
        })
    }

    /// Laat een vrije beschrijving analyseren en vul het formulier.
    #[wasm_bindgen]
    pub fn analyse(&self, description: String) -> js_sys::Promise {
        let session = Rc::clone(&self.session);
        let client = self.client();
        wasm_bindgen_futures::future_to_promise(async move {
            session::analyse_description(&session, &client, &description)
                .await
                .map_err(to_js_error)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Download de PDF van het laatste plan. Levert `false` zonder plan.
    #[wasm_bindgen]
    pub fn download_pdf(&self) -> js_sys::Promise {
        let session = Rc::clone(&self.session);
        let client = self.client();
        wasm_bindgen_futures::future_to_promise(async move {
            let Some(pdf) = session::download_pdf(&session, &client)
                .await
                .map_err(to_js_error)?
            else {
                return Ok(JsValue::FALSE);
            };
            offer_download(&pdf)?;
            Ok(JsValue::TRUE)
        })
    }
}

impl Configurator {
    #[must_use]
    pub fn from_config(config: EngineConfig) -> Self {
        let form = FormState::new(config.fields.clone());
        debug_log!("configurator met {} vaste velden", config.fields.len());
        Self {
            config,
            session: Rc::new(RefCell::new(Session::new(form))),
        }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> Ref<'_, Session> {
        self.session.borrow()
    }

    #[must_use]
    pub fn value(&self, name: &str) -> Option<String> {
        self.session.borrow().form().value(name).map(str::to_owned)
    }

    #[cfg(target_arch = "wasm32")]
    fn client(&self) -> api::ApiClient<api::fetch::FetchTransport> {
        api::ApiClient::new(api::fetch::FetchTransport, &self.config)
    }

    #[cfg(target_arch = "wasm32")]
    fn browser_store(&self) -> Result<store::ProjectStore<store::BrowserStorage>, JsValue> {
        let storage = store::BrowserStorage::local().map_err(to_js_error)?;
        Ok(store::ProjectStore::new(storage, self.config.storage_key.clone()))
    }
}

#[cfg(target_arch = "wasm32")]
fn offer_download(pdf: &api::PdfDocument) -> Result<(), JsValue> {
    use web_sys::{Blob, BlobPropertyBag, HtmlElement, Url};

    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| js_error("document indisponible"))?;

    let parts = js_sys::Array::new();
    parts.push(&js_sys::Uint8Array::from(pdf.bytes.as_slice()));
    let options = BlobPropertyBag::new();
    options.set_type("application/pdf");
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let anchor = document.create_element("a")?.dyn_into::<HtmlElement>()?;
    anchor.set_attribute("href", &url)?;
    anchor.set_attribute("download", &pdf.filename)?;
    if let Some(body) = document.body() {
        body.append_child(&anchor)?;
    }
    anchor.click();
    Url::revoke_object_url(&url)?;
    anchor.remove();
    Ok(())
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        wasm_bindgen::JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}
