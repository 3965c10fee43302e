/// Asset download through `window.fetch`

use icon3d_core::ModelError;
use js_sys::Uint8Array;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Response, Window};

fn describe(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

/// Fetch `path` and return the response body
pub async fn fetch_bytes(window: &Window, path: &str) -> Result<Vec<u8>, ModelError> {
    let failed = |err: JsValue| ModelError::Fetch {
        path: path.to_string(),
        reason: describe(&err),
    };

    let response = JsFuture::from(window.fetch_with_str(path)).await.map_err(failed)?;
    let response: Response = response.dyn_into().map_err(failed)?;

    if !response.ok() {
        return Err(ModelError::Status {
            path: path.to_string(),
            status: response.status(),
        });
    }

    let body = JsFuture::from(response.array_buffer().map_err(failed)?)
        .await
        .map_err(failed)?;
    Ok(Uint8Array::new(&body).to_vec())
}
