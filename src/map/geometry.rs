use crate::braille::BrailleCanvas;
use crate::map::projection::Viewport;

/// Bresenham line between two dots
pub fn draw_line(canvas: &mut BrailleCanvas, (x0, y0): (i32, i32), (x1, y1): (i32, i32)) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);

    loop {
        canvas.set_pixel_signed(x, y);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Project and draw a lon/lat path, skipping off-screen and antimeridian-wrapping segments
pub fn draw_path(canvas: &mut BrailleCanvas, path: &[(f64, f64)], viewport: &Viewport) {
    if path.len() < 2 {
        return;
    }
    // A segment longer than half the world is a wrap across the antimeridian
    let half_world = viewport.zoom * viewport.width as f64 / 2.0;
    let mut prev: Option<(i32, i32)> = None;
    for &(lon, lat) in path {
        let p = viewport.project(lon, lat);
        if let Some(q) = prev {
            let jump = (p.0 - q.0).abs() as f64;
            if jump < half_world && viewport.line_might_be_visible(q, p) {
                draw_line(canvas, q, p);
            }
        }
        prev = Some(p);
    }
}

/// Plus-shaped marker around a single center dot
pub fn draw_marker(canvas: &mut BrailleCanvas, (x, y): (i32, i32), size: i32) {
    for i in 2..=size.max(2) {
        canvas.set_pixel_signed(x + i, y);
        canvas.set_pixel_signed(x - i, y);
        canvas.set_pixel_signed(x, y + i);
        canvas.set_pixel_signed(x, y - i);
    }
    canvas.set_pixel_signed(x, y);
}
