use js_sys::Array;
use vinyl_core::ChartConfig;
use vinyl_core::config::SEED_RANGE;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, Document, HtmlElement, Url, Window};

/// Build an absolute URL for an asset, taking into account the optional
/// `window.__BASE_URL` which is set by the host page.
pub fn asset_url(path: &str) -> String {
    let p = path.trim();
    if p.starts_with("http://") || p.starts_with("https://") || p.starts_with("data:") {
        return p.to_string();
    }
    let base = web_sys::window()
        .and_then(|w| {
            let v = js_sys::Reflect::get(&w, &JsValue::from_str("__BASE_URL")).ok()?;
            v.as_string()
        })
        .unwrap_or_else(|| "/".to_string());
    let base = if base.ends_with('/') {
        base
    } else {
        format!("{}/", base)
    };
    format!("{}{}", base, p.trim_start_matches('/'))
}

/// Fetch a text resource trying a list of fallback URLs in order.
pub async fn fetch_text_with_fallbacks(window: &Window, urls: &[&str]) -> Option<String> {
    for url in urls {
        let resp_value =
            match wasm_bindgen_futures::JsFuture::from(window.fetch_with_str(url)).await {
                Ok(v) => v,
                Err(_) => {
                    log::debug!("fetch {url} failed");
                    continue;
                }
            };
        let resp: web_sys::Response = match resp_value.dyn_into() {
            Ok(r) => r,
            Err(_) => continue,
        };
        if !resp.ok() {
            log::debug!("fetch {url}: HTTP {}", resp.status());
            continue;
        }
        if let Ok(text_promise) = resp.text()
            && let Ok(text_js) = wasm_bindgen_futures::JsFuture::from(text_promise).await
            && let Some(s) = text_js.as_string()
        {
            return Some(s);
        }
    }
    None
}

/// Simple query string parser used at start-up.
pub fn get_query_param(search: &str, key: &str) -> Option<String> {
    let s = search.trim_start_matches('?');
    for pair in s.split('&') {
        let mut it = pair.splitn(2, '=');
        let k = it.next()?;
        let v = it.next().unwrap_or("");
        if k == key {
            return Some(url_decode(v));
        }
    }
    None
}

fn url_decode(s: &str) -> String {
    let s = s.replace('+', " ");
    match percent_encoding::percent_decode_str(&s).decode_utf8() {
        Ok(v) => v.into_owned(),
        Err(_) => s.clone(),
    }
}

/// Chart settings: defaults, then `window.__CHART_CONFIG` (a plain object
/// with any `ChartConfig` fields), then the `seed` query parameter.
pub fn read_config(window: &Window, search: &str) -> ChartConfig {
    let mut cfg = js_sys::Reflect::get(window, &JsValue::from_str("__CHART_CONFIG"))
        .ok()
        .filter(|v| v.is_object())
        .and_then(|v| js_sys::JSON::stringify(&v).ok())
        .map(String::from)
        .and_then(|s| match serde_json::from_str::<ChartConfig>(&s) {
            Ok(c) => Some(c),
            Err(e) => {
                log::warn!("ignoring __CHART_CONFIG: {e}");
                None
            }
        })
        .unwrap_or_default();
    if let Some(seed) = get_query_param(search, "seed").and_then(|s| s.parse().ok()) {
        cfg.seed = Some(seed);
    }
    cfg
}

/// A fresh layout seed in `0..SEED_RANGE`.
pub fn random_seed() -> u64 {
    (js_sys::Math::random() * SEED_RANGE as f64).floor() as u64
}

/// Offer `bytes` as a download named `filename`.
pub fn save_bytes_as_file(
    document: &Document,
    filename: &str,
    mime: &str,
    bytes: &[u8],
) -> Result<(), JsValue> {
    let array = Array::new();
    array.push(&js_sys::Uint8Array::from(bytes));
    let props = BlobPropertyBag::new();
    props.set_type(mime);
    let blob = Blob::new_with_u8_array_sequence_and_options(&array, &props)?;
    let url = Url::create_object_url_with_blob(&blob)?;
    let a = document.create_element("a")?.dyn_into::<HtmlElement>()?;
    a.set_attribute("href", &url)?;
    a.set_attribute("download", filename)?;
    a.click();
    Url::revoke_object_url(&url)?;
    Ok(())
}
