use std::cell::RefCell;
use std::rc::Rc;

use vinyl_core::config::DATASET_PATH;
use vinyl_core::export::render_png;
use vinyl_core::{FillMode, Pointer, build_chart};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, MouseEvent, Window};

mod logger;
mod state;
mod tooltip_dom;
mod utils;

use state::State;
use utils::{
    asset_url, fetch_text_with_fallbacks, get_query_param, random_seed, read_config,
    save_bytes_as_file,
};

/// Raster scale of the PNG export relative to the chart size.
const EXPORT_SCALE: f32 = 2.0;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let search = window.location().search().unwrap_or_default();
    logger::init(logger::level_from(get_query_param(&search, "log").as_deref()));

    // One fetch, then one synchronous draw; a failed fetch leaves the page empty.
    wasm_bindgen_futures::spawn_local(async move {
        if let Err(err) = load_and_draw(window, document, &search).await {
            log::error!("chart not drawn: {:?}", err);
        }
    });
    Ok(())
}

async fn load_and_draw(window: Window, document: Document, search: &str) -> Result<(), JsValue> {
    let data_path = get_query_param(search, "data").unwrap_or_else(|| DATASET_PATH.to_string());
    let text = fetch_text_with_fallbacks(
        &window,
        &[
            &asset_url(&data_path),
            &format!("/{}", data_path.trim_start_matches('/')),
            &data_path,
        ],
    )
    .await
    .ok_or_else(|| JsValue::from_str(&format!("dataset {data_path} unavailable")))?;

    let mut config = read_config(&window, search);
    let seed = config.seed.unwrap_or_else(random_seed);
    config.seed = Some(seed);
    config.image_dir = asset_url(&config.image_dir);
    log::info!("drawing with seed {seed}");

    let chart = build_chart(&text, config).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let container = match document.get_element_by_id("chart") {
        Some(el) => el,
        None => {
            let el = document.create_element("div")?;
            el.set_id("chart");
            document
                .body()
                .ok_or_else(|| JsValue::from_str("no body"))?
                .append_child(&el)?;
            el
        }
    };
    container.set_inner_html(&chart.scene(FillMode::Pattern));
    let overlay = tooltip_dom::create_overlay(&document)?;

    let state = Rc::new(RefCell::new(State {
        window,
        document,
        container,
        overlay,
        chart,
        seed,
    }));
    attach_ui(state)
}

/// Draw id of the cell under the event target, if any.
fn event_node(e: &MouseEvent) -> Option<usize> {
    let target = e.target()?.dyn_into::<Element>().ok()?;
    let cell = target.closest("path[data-node]").ok()??;
    cell.get_attribute("data-node")?.parse().ok()
}

fn pointer(window: &Window, e: &MouseEvent) -> Pointer {
    Pointer {
        page_x: e.page_x() as f64,
        page_y: e.page_y() as f64,
        viewport_width: window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or_default(),
    }
}

fn attach_ui(state: Rc<RefCell<State>>) -> Result<(), JsValue> {
    let container = state.borrow().container.clone();

    // Cell click: show the record
    {
        let st = state.clone();
        let onclick = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |e: MouseEvent| {
            let Some(id) = event_node(&e) else { return };
            e.prevent_default();
            let mut s = st.borrow_mut();
            let p = pointer(&s.window, &e);
            if s.chart.click(id, p)
                && let Err(err) = tooltip_dom::sync(&s)
            {
                log::warn!("tooltip update failed: {:?}", err);
            }
        }));
        container.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    // Hover: one visible label, overlay follows
    {
        let st = state.clone();
        let onover = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |e: MouseEvent| {
            let Some(id) = event_node(&e) else { return };
            let mut s = st.borrow_mut();
            let p = pointer(&s.window, &e);
            let change = s.chart.hover(id, p);
            let res = tooltip_dom::apply_labels(&s.container, change)
                .and_then(|_| tooltip_dom::sync(&s));
            if let Err(err) = res {
                log::warn!("hover update failed: {:?}", err);
            }
        }));
        container
            .add_event_listener_with_callback("mouseover", onover.as_ref().unchecked_ref())?;
        onover.forget();
    }
    {
        let st = state.clone();
        let onout = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |e: MouseEvent| {
            let Some(id) = event_node(&e) else { return };
            let mut s = st.borrow_mut();
            let change = s.chart.leave(id);
            if let Err(err) = tooltip_dom::apply_labels(&s.container, change) {
                log::warn!("label update failed: {:?}", err);
            }
        }));
        container.add_event_listener_with_callback("mouseout", onout.as_ref().unchecked_ref())?;
        onout.forget();
    }

    // Overlay close button
    let close_btn = state.borrow().overlay.query_selector(".tooltip__remove")?;
    if let Some(btn) = close_btn {
        let btn: HtmlElement = btn.dyn_into()?;
        let st = state.clone();
        let onclick = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            let mut s = st.borrow_mut();
            s.chart.dismiss_tooltip();
            if let Err(err) = tooltip_dom::sync(&s) {
                log::warn!("tooltip close failed: {:?}", err);
            }
        }));
        btn.set_onclick(Some(onclick.as_ref().unchecked_ref()));
        onclick.forget();
    }

    // Export PNG (flat colors; deterministic for a given seed)
    let export_btn = state.borrow().document.get_element_by_id("exportPng");
    if let Some(btn) = export_btn {
        let btn: HtmlElement = btn.dyn_into()?;
        let st = state.clone();
        let onclick = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            if let Err(err) = export_png(&st.borrow()) {
                log::error!("PNG export failed: {:?}", err);
            }
        }));
        btn.set_onclick(Some(onclick.as_ref().unchecked_ref()));
        onclick.forget();
    }
    Ok(())
}

fn export_png(state: &State) -> Result<(), JsValue> {
    let svg = state.chart.scene(FillMode::Color);
    let bytes =
        render_png(&svg, EXPORT_SCALE).map_err(|e| JsValue::from_str(&e.to_string()))?;
    save_bytes_as_file(
        &state.document,
        &format!("vinyl_treemap_seed{}.png", state.seed),
        "image/png",
        &bytes,
    )
}
