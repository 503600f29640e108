use png::{BitDepth, ColorType, Encoder};

use crate::error::VinylError;

/// Rasterized chart, straight (non-premultiplied) RGBA rows.
#[derive(Clone, Debug)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Render an SVG document at `scale` times its own size.
pub fn rasterize(svg: &str, scale: f32) -> Result<Raster, VinylError> {
    let opt = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg, &opt)
        .map_err(|e| VinylError::Render(format!("SVG parse error: {e}")))?;
    let size = tree.size();
    let width = (size.width() * scale).round().max(1.0) as u32;
    let height = (size.height() * scale).round().max(1.0) as u32;
    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| VinylError::Render("pixmap alloc failed".to_string()))?;
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    let rgba = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    Ok(Raster {
        width,
        height,
        rgba,
    })
}

/// Deterministic PNG encoding: same pixels, same bytes.
pub fn encode_png(raster: &Raster) -> Result<Vec<u8>, VinylError> {
    let mut buf = Vec::new();
    {
        let mut enc = Encoder::new(&mut buf, raster.width, raster.height);
        enc.set_color(ColorType::Rgba);
        enc.set_depth(BitDepth::Eight);
        let mut writer = enc.write_header()?;
        writer.write_image_data(&raster.rgba)?;
    }
    Ok(buf)
}

pub fn render_png(svg: &str, scale: f32) -> Result<Vec<u8>, VinylError> {
    encode_png(&rasterize(svg, scale)?)
}
