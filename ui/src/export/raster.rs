//! SVG → pixels.
//!
//! Desktop renders with `resvg`/`usvg` into a `tiny-skia` pixmap; web draws the SVG onto a
//! `<canvas>`. Either way the capture is composited on white, so every pixel is opaque.

use super::ExportError;

/// Straight (non-premultiplied) RGBA8, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl RasterImage {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, ExportError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(ExportError::Raster(format!(
                "expected {expected} bytes for {width}x{height}, got {}",
                rgba.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// RGB bytes of rows `top..top + rows`, alpha dropped.
    pub fn rgb_rows(&self, top: u32, rows: u32) -> Vec<u8> {
        let top = top.min(self.height);
        let bottom = top.saturating_add(rows).min(self.height);
        let stride = self.width as usize * 4;
        let slice = &self.rgba[top as usize * stride..bottom as usize * stride];
        let mut rgb = Vec::with_capacity(slice.len() / 4 * 3);
        for px in slice.chunks_exact(4) {
            rgb.extend_from_slice(&px[..3]);
        }
        rgb
    }
}

pub async fn rasterize(svg: String, width: u32, height: u32) -> Result<RasterImage, ExportError> {
    if width == 0 || height == 0 {
        return Err(ExportError::EmptyCapture);
    }

    #[cfg(target_arch = "wasm32")]
    {
        web::rasterize(&svg, width, height).await
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        crate::core::platform::run_blocking(move || desktop::rasterize(&svg, width, height))
            .await
            .map_err(ExportError::Raster)?
    }
}

/// One tall PNG of the whole capture.
pub async fn render_png(svg: String, width: u32, height: u32) -> Result<Vec<u8>, ExportError> {
    if width == 0 || height == 0 {
        return Err(ExportError::EmptyCapture);
    }

    #[cfg(target_arch = "wasm32")]
    {
        web::render_png(&svg, width, height).await
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        crate::core::platform::run_blocking(move || {
            let image = desktop::rasterize(&svg, width, height)?;
            desktop::encode_png(&image)
        })
        .await
        .map_err(ExportError::Raster)?
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod desktop {
    use std::sync::Arc;

    use once_cell::sync::Lazy;
    use tiny_skia::{Color, Pixmap, Transform};
    use usvg::fontdb;

    use super::{ExportError, RasterImage};

    static FONT_DB: Lazy<Arc<fontdb::Database>> = Lazy::new(|| {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "system fonts loaded for export");
        Arc::new(db)
    });

    pub fn rasterize(svg: &str, width: u32, height: u32) -> Result<RasterImage, ExportError> {
        let options = usvg::Options {
            fontdb: FONT_DB.clone(),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_str(svg, &options)
            .map_err(|err| ExportError::Raster(err.to_string()))?;

        let mut pixmap = Pixmap::new(width, height)
            .ok_or_else(|| ExportError::Raster(format!("cannot allocate {width}x{height}")))?;
        pixmap.fill(Color::WHITE);
        resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());

        // opaque after the white fill, so premultiplied equals straight alpha
        RasterImage::new(width, height, pixmap.take())
    }

    pub fn encode_png(image: &RasterImage) -> Result<Vec<u8>, ExportError> {
        let mut buffer = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buffer, image.width, image.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            encoder
                .write_header()
                .map_err(|err| ExportError::Png(err.to_string()))?
                .write_image_data(&image.rgba)
                .map_err(|err| ExportError::Png(err.to_string()))?;
        }
        Ok(buffer)
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use base64::Engine;
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{
        Blob, BlobPropertyBag, CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, Url,
    };

    use super::{ExportError, RasterImage};

    fn raster_err(msg: &str) -> ExportError {
        ExportError::Raster(msg.to_string())
    }

    async fn draw(
        svg: &str,
        width: u32,
        height: u32,
    ) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), ExportError> {
        let opts = BlobPropertyBag::new();
        opts.set_type("image/svg+xml");
        let parts = js_sys::Array::new();
        parts.push(&JsValue::from_str(svg));
        let blob = Blob::new_with_str_sequence_and_options(&parts, &opts)
            .map_err(|_| raster_err("unable to build SVG blob"))?;
        let url = Url::create_object_url_with_blob(&blob)
            .map_err(|_| raster_err("unable to create SVG URL"))?;

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| raster_err("document unavailable"))?;
        let canvas: HtmlCanvasElement = document
            .create_element("canvas")
            .map_err(|_| raster_err("unable to create canvas"))?
            .dyn_into()
            .map_err(|_| raster_err("canvas cast failed"))?;
        canvas.set_width(width);
        canvas.set_height(height);

        let context: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(|_| raster_err("canvas context unavailable"))?
            .ok_or_else(|| raster_err("canvas context missing"))?
            .dyn_into()
            .map_err(|_| raster_err("context cast failed"))?;
        context.set_fill_style_str("#ffffff");
        context.fill_rect(0.0, 0.0, f64::from(width), f64::from(height));

        let image = HtmlImageElement::new().map_err(|_| raster_err("unable to create image"))?;
        let decode = image.decode();
        image.set_src(&url);
        let decoded = JsFuture::from(decode).await;
        Url::revoke_object_url(&url).ok();
        decoded.map_err(|_| raster_err("SVG decode failed"))?;

        context
            .draw_image_with_html_image_element(&image, 0.0, 0.0)
            .map_err(|_| raster_err("unable to draw image"))?;
        Ok((canvas, context))
    }

    pub async fn rasterize(svg: &str, width: u32, height: u32) -> Result<RasterImage, ExportError> {
        let (_canvas, context) = draw(svg, width, height).await?;
        let data = context
            .get_image_data(0.0, 0.0, f64::from(width), f64::from(height))
            .map_err(|_| raster_err("canvas is too large to read back"))?;
        RasterImage::new(width, height, data.data().0)
    }

    pub async fn render_png(svg: &str, width: u32, height: u32) -> Result<Vec<u8>, ExportError> {
        let (canvas, _context) = draw(svg, width, height).await?;
        let data_url = canvas
            .to_data_url_with_type("image/png")
            .map_err(|_| ExportError::Png("unable to serialise canvas".into()))?;
        let encoded = data_url
            .split(',')
            .nth(1)
            .ok_or_else(|| ExportError::Png("malformed data URL".into()))?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|err| ExportError::Png(err.to_string()))
    }
}
