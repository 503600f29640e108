use crate::config::{IMAGE_DIR, POINTER_SCALE, TOOLTIP_EDGE_MARGIN, TOOLTIP_NUDGE};
use crate::format::{asset_path, format_usd, html_escape};
use crate::record::Record;

/// Pointer event data needed to place the overlay.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pointer {
    pub page_x: f64,
    pub page_y: f64,
    pub viewport_width: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TooltipView {
    /// Record the content was built from.
    pub record_name: String,
    pub html: String,
    pub left: f64,
    pub top: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum TooltipState {
    #[default]
    Hidden,
    Visible(TooltipView),
}

/// The one shared detail overlay.
#[derive(Clone, Debug)]
pub struct Tooltip {
    image_dir: String,
    state: TooltipState,
}

impl Default for Tooltip {
    fn default() -> Self {
        Tooltip::new(IMAGE_DIR)
    }
}

impl Tooltip {
    pub fn new(image_dir: &str) -> Self {
        Tooltip {
            image_dir: image_dir.to_string(),
            state: TooltipState::Hidden,
        }
    }

    /// Replace whatever is shown with `record`, placed near the pointer.
    pub fn show(&mut self, record: &Record, pointer: Pointer) {
        let (left, top) = position(pointer);
        self.state = TooltipState::Visible(TooltipView {
            record_name: record.name.clone(),
            html: tooltip_html(record, &self.image_dir),
            left,
            top,
        });
    }

    pub fn dismiss(&mut self) {
        self.state = TooltipState::Hidden;
    }

    pub fn state(&self) -> &TooltipState {
        &self.state
    }

    pub fn view(&self) -> Option<&TooltipView> {
        match &self.state {
            TooltipState::Visible(v) => Some(v),
            TooltipState::Hidden => None,
        }
    }

    pub fn is_visible(&self) -> bool {
        matches!(self.state, TooltipState::Visible(_))
    }
}

/// Scaled page position, pulled left when it would leave less than
/// `TOOLTIP_EDGE_MARGIN` before the right edge of the viewport.
pub fn position(p: Pointer) -> (f64, f64) {
    let mut left = p.page_x / POINTER_SCALE;
    let top = p.page_y / POINTER_SCALE;
    if p.viewport_width - left < TOOLTIP_EDGE_MARGIN {
        left = (p.viewport_width - TOOLTIP_EDGE_MARGIN - TOOLTIP_NUDGE).max(0.0);
    }
    (left, top)
}

/// Overlay body: heading, two images with credits, optional quote and source.
pub fn tooltip_html(r: &Record, image_dir: &str) -> String {
    let mut s = String::new();
    s.push_str(&format!(
        "<strong>{} - {}",
        html_escape(r.display_title()),
        format_usd(r.max_amount)
    ));
    if let Some(year) = &r.year {
        s.push_str(&format!(" <br /> ({})", html_escape(&year.to_string())));
    }
    s.push_str("</strong> <br /><br />\n");
    s.push_str(&image_tag(
        &asset_path(image_dir, &r.name, "_band.png"),
        200,
        r.photo_copyright.as_deref(),
    ));
    s.push_str(&image_tag(
        &asset_path(image_dir, &r.name, ".png"),
        100,
        r.icon_copyright.as_deref(),
    ));
    if let Some(story) = &r.story {
        let lines = story
            .lines()
            .map(html_escape)
            .collect::<Vec<_>>()
            .join("<br />");
        s.push_str(&format!("<q>{lines}</q>"));
    }
    if r.article.is_some() || r.article_date.is_some() {
        s.push_str(" <br /><br />\nSource: ");
        if let Some(url) = &r.article {
            let url = html_escape(url);
            s.push_str(&format!("<a href=\"{url}\" target=\"_blank\">{url}</a>"));
        }
        if let Some(date) = &r.article_date {
            s.push_str(&format!(" ({})", html_escape(date)));
        }
    }
    s
}

fn image_tag(src: &str, width: u32, credit: Option<&str>) -> String {
    let credit = credit
        .map(|c| format!("&copy; {}", html_escape(c)))
        .unwrap_or_default();
    format!("<img src=\"{src}\" width=\"{width}\" alt=\"{credit}\" title=\"{credit}\"/>\n")
}
