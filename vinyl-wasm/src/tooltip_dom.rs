use vinyl_core::LabelChange;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement};

use crate::state::State;

const VISIBLE_OPACITY: &str = "0.9";

/// Append the hidden overlay to `<body>`: a text slot and a close button.
pub fn create_overlay(document: &Document) -> Result<HtmlElement, JsValue> {
    let overlay = document.create_element("div")?.dyn_into::<HtmlElement>()?;
    overlay.set_class_name("tooltip");
    overlay.style().set_property("position", "absolute")?;
    hide(&overlay)?;

    let text = document.create_element("div")?;
    text.set_class_name("tooltip__text");
    overlay.append_child(&text)?;

    let wrap = document.create_element("div")?;
    let close = document.create_element("button")?;
    close.set_class_name("tooltip__remove");
    close.set_text_content(Some("x"));
    wrap.append_child(&close)?;
    overlay.append_child(&wrap)?;

    document
        .body()
        .ok_or_else(|| JsValue::from_str("no body"))?
        .append_child(&overlay)?;
    Ok(overlay)
}

/// Make the overlay element match the chart's tooltip state.
pub fn sync(state: &State) -> Result<(), JsValue> {
    let style = state.overlay.style();
    match state.chart.tooltip().view() {
        Some(view) => {
            if let Some(text) = state.overlay.query_selector(".tooltip__text")? {
                text.set_inner_html(&view.html);
            }
            style.set_property("left", &format!("{}px", view.left))?;
            style.set_property("top", &format!("{}px", view.top))?;
            style.set_property("opacity", VISIBLE_OPACITY)?;
            style.remove_property("display")?;
        }
        None => hide(&state.overlay)?,
    }
    Ok(())
}

/// Transparent and out of the layout, at start-up and after every dismiss.
fn hide(overlay: &HtmlElement) -> Result<(), JsValue> {
    let style = overlay.style();
    style.set_property("opacity", "0")?;
    style.set_property("display", "none")
}

/// Apply a hover change to the label pair (`label-{id}` text and its halo).
pub fn apply_labels(container: &Element, change: LabelChange) -> Result<(), JsValue> {
    if let Some(id) = change.hide {
        set_label_opacity(container, id, "0")?;
    }
    if let Some(id) = change.show {
        set_label_opacity(container, id, "1")?;
    }
    Ok(())
}

fn set_label_opacity(container: &Element, id: usize, opacity: &str) -> Result<(), JsValue> {
    let nodes = container.query_selector_all(&format!(".label-{id}"))?;
    for i in 0..nodes.length() {
        if let Some(el) = nodes.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
            el.set_attribute("opacity", opacity)?;
        }
    }
    Ok(())
}
