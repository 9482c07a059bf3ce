//! [`Transport`] op basis van `window.fetch`.

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

use super::{HttpResponse, Transport, TransportError};

#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

fn network(err: JsValue) -> TransportError {
    TransportError::Network(
        err.as_string()
            .unwrap_or_else(|| format!("{err:?}")),
    )
}

impl Transport for FetchTransport {
    async fn post_json(&self, url: &str, body: String) -> Result<HttpResponse, TransportError> {
        let window = web_sys::window()
            .ok_or_else(|| TransportError::Network("window indisponible".to_owned()))?;

        let headers = Headers::new().map_err(network)?;
        headers
            .set("Content-Type", "application/json")
            .map_err(network)?;

        let init = RequestInit::new();
        init.set_method("POST");
        init.set_headers(&headers);
        init.set_body(&JsValue::from_str(&body));

        let request = Request::new_with_str_and_init(url, &init).map_err(network)?;
        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(network)?
            .dyn_into()
            .map_err(network)?;

        let buffer = JsFuture::from(response.array_buffer().map_err(network)?)
            .await
            .map_err(network)?;
        let body = js_sys::Uint8Array::new(&buffer).to_vec();

        Ok(HttpResponse {
            status: response.status(),
            body,
        })
    }
}
