use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Characters escaped in asset file names.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'\\');

/// Whole dollars with thousands separators: `790000.4` → `$790,000`.
pub fn format_usd(amount: f64) -> String {
    if !amount.is_finite() {
        return "$0".to_string();
    }
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Escape text for element content and double-quoted attributes.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// `{dir}{key}{suffix}` with the key percent-encoded as one path segment.
pub fn asset_path(dir: &str, key: &str, suffix: &str) -> String {
    let mut out = String::from(dir);
    if !out.is_empty() && !out.ends_with('/') {
        out.push('/');
    }
    out.extend(utf8_percent_encode(key, PATH_SEGMENT));
    out.push_str(suffix);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usd_rounds_and_groups() {
        assert_eq!(format_usd(0.0), "$0");
        assert_eq!(format_usd(999.0), "$999");
        assert_eq!(format_usd(1000.0), "$1,000");
        assert_eq!(format_usd(790_000.4), "$790,000");
        assert_eq!(format_usd(2_090_299.5), "$2,090,300");
        assert_eq!(format_usd(-1234.0), "-$1,234");
        assert_eq!(format_usd(f64::NAN), "$0");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            html_escape(r#"<a href="x">R&B</a>"#),
            "&lt;a href=&quot;x&quot;&gt;R&amp;B&lt;/a&gt;"
        );
    }

    #[test]
    fn asset_paths_encode_the_key() {
        assert_eq!(asset_path("img/", "white_album", "_band.png"), "img/white_album_band.png");
        assert_eq!(asset_path("img", "a b#c", ".png"), "img/a%20b%23c.png");
        assert_eq!(asset_path("", "x/y", ".png"), "x%2Fy.png");
    }
}
