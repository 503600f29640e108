use vinyl_core::Chart;
use web_sys::{Document, Element, HtmlElement, Window};

/// Page state stored behind an `Rc<RefCell<_>>` so it can be shared across
/// the WASM callbacks.
pub struct State {
    pub window: Window,
    pub document: Document,
    /// Element the SVG is mounted into.
    pub container: Element,
    /// Shared detail overlay.
    pub overlay: HtmlElement,
    pub chart: Chart,
    pub seed: u64,
}
