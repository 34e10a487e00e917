use std::path::Path;

use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use rayon::prelude::*;

use crate::config::Params;
use crate::error::Error;
use crate::geom::Point2;
use crate::grid::ScalarGrid;
use crate::mesh::ContourMesh;

// Diverging ramp: low values blue, mid white, high red.
const FIELD_LOW: [u8; 4] = [49, 54, 149, 255];
const FIELD_LOW_MID: [u8; 4] = [116, 173, 209, 255];
const FIELD_MID: [u8; 4] = [247, 247, 247, 255];
const FIELD_HIGH_MID: [u8; 4] = [244, 109, 67, 255];
const FIELD_HIGH: [u8; 4] = [165, 0, 38, 255];

/// Color stops over the normalized value, in increasing order.
const FIELD_RAMP: [(f32, [u8; 4]); 5] = [
    (0.0, FIELD_LOW),
    (0.25, FIELD_LOW_MID),
    (0.5, FIELD_MID),
    (0.75, FIELD_HIGH_MID),
    (1.0, FIELD_HIGH),
];

/// Largest preview raster, in pixels.
pub const MAX_PREVIEW_PIXELS: usize = 1 << 26;

#[inline]
fn mix(a: [u8; 4], b: [u8; 4], t: f32) -> [u8; 4] {
    let t = t.clamp(0.0, 1.0);
    let mut out = [0u8; 4];
    for (o, (&ca, &cb)) in out.iter_mut().zip(a.iter().zip(&b)) {
        let (ca, cb) = (f32::from(ca), f32::from(cb));
        *o = (ca + (cb - ca) * t).round() as u8;
    }
    out
}

/// Color for a value normalized to [0, 1].
fn ramp(t: f32) -> [u8; 4] {
    let t = t.clamp(0.0, 1.0);
    for pair in FIELD_RAMP.windows(2) {
        let ((t0, c0), (t1, c1)) = (pair[0], pair[1]);
        if t <= t1 {
            return mix(c0, c1, (t - t0) / (t1 - t0));
        }
    }
    FIELD_RAMP[FIELD_RAMP.len() - 1].1
}

/// RGBA8 raster, row 0 at the top.
#[derive(Debug, Clone)]
pub struct Preview {
    pub rgba: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

impl Preview {
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * 4;
        [self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]]
    }

    pub fn save_png(&self, path: &Path) -> Result<(), Error> {
        image::save_buffer(
            path,
            &self.rgba,
            self.width as u32,
            self.height as u32,
            image::ColorType::Rgba8,
        )?;
        Ok(())
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, Error> {
        let mut buf = Vec::new();
        PngEncoder::new(&mut buf).write_image(
            &self.rgba,
            self.width as u32,
            self.height as u32,
            image::ExtendedColorType::Rgba8,
        )?;
        Ok(buf)
    }
}

/// Render the scalar field, each grid point as a `scale`-sized block.
/// The top image row is the grid's last row (y grows upward).
pub fn render_field(grid: &ScalarGrid, scale: usize) -> Result<Preview, Error> {
    let scale = scale.max(1);
    let nx = grid.nx();
    let ny = grid.ny();
    let (w, h) = raster_size(nx, ny, scale)?;
    let (min_v, max_v) = grid.value_range();
    let range = if max_v > min_v { max_v - min_v } else { 1.0 };

    let mut rgba = vec![0u8; w * h * 4];
    rgba.par_chunks_mut(w * 4).enumerate().for_each(|(py, row)| {
        let gy = ny - 1 - py / scale;
        for px in 0..w {
            let v = grid.value(px / scale, gy);
            let color = ramp(((v - min_v) / range) as f32);
            row[px * 4..px * 4 + 4].copy_from_slice(&color);
        }
    });

    Ok(Preview {
        rgba,
        width: w,
        height: h,
    })
}

/// `(width, height)` of a preview, bounded by [`MAX_PREVIEW_PIXELS`].
fn raster_size(nx: usize, ny: usize, scale: usize) -> Result<(usize, usize), Error> {
    let too_large = || Error::PreviewTooLarge { nx, ny, scale };
    let w = nx.checked_mul(scale).ok_or_else(too_large)?;
    let h = ny.checked_mul(scale).ok_or_else(too_large)?;
    match w.checked_mul(h) {
        Some(pixels) if pixels <= MAX_PREVIEW_PIXELS => Ok((w, h)),
        _ => Err(too_large()),
    }
}

/// Pixel-space position of a physical point, with grid point centers at block centers.
fn to_pixel(grid: &ScalarGrid, p: Point2, scale: usize) -> (f64, f64) {
    let [ox, oy] = grid.origin();
    let [dx, dy] = grid.spacing();
    let s = scale as f64;
    let u = ((p.x - ox) / dx + 0.5) * s;
    let v = (grid.ny() as f64 - 0.5 - (p.y - oy) / dy) * s;
    (u, v)
}

fn draw_line(img: &mut Preview, a: (f64, f64), b: (f64, f64), color: [u8; 4]) {
    let (du, dv) = (b.0 - a.0, b.1 - a.1);
    let steps = du.abs().max(dv.abs()).ceil().max(1.0) as usize;
    for s in 0..=steps {
        let t = s as f64 / steps as f64;
        let x = (a.0 + du * t).floor();
        let y = (a.1 + dv * t).floor();
        if x < 0.0 || y < 0.0 {
            continue;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= img.width || y >= img.height {
            continue;
        }
        let i = (y * img.width + x) * 4;
        img.rgba[i..i + 4].copy_from_slice(&color);
    }
}

/// Draw every mesh segment on top of `img`.
pub fn draw_mesh(img: &mut Preview, grid: &ScalarGrid, mesh: &ContourMesh, scale: usize, color: [u8; 4]) {
    let scale = scale.max(1);
    for (a, b) in mesh.segments() {
        draw_line(img, to_pixel(grid, a, scale), to_pixel(grid, b, scale), color);
    }
}

/// Field raster with the contour overlaid.
pub fn render_preview(
    grid: &ScalarGrid,
    mesh: &ContourMesh,
    params: &Params,
) -> Result<Preview, Error> {
    let mut img = render_field(grid, params.preview_scale)?;
    draw_mesh(&mut img, grid, mesh, params.preview_scale, params.line_color);
    Ok(img)
}
