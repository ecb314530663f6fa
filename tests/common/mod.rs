use image::{Rgba, RgbaImage};

pub const BORDER: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// A distinct, fully opaque colour for cell `k`.
pub fn cell_color(k: u32) -> Rgba<u8> {
    Rgba([
        (k * 53 % 256) as u8,
        ((k * 97 + 40) % 256) as u8,
        ((k * 151 + 80) % 256) as u8,
        255,
    ])
}

/// Four solid quadrants split at `(seam_x, seam_y)` by dark dividers `border` pixels wide.
pub fn quadrants_with_border(
    width: u32,
    height: u32,
    seam_x: u32,
    seam_y: u32,
    border: u32,
) -> RgbaImage {
    let colors = [
        Rgba([200, 40, 40, 255]),
        Rgba([40, 200, 40, 255]),
        Rgba([40, 40, 200, 255]),
        Rgba([220, 220, 40, 255]),
    ];
    let half = border / 2;
    RgbaImage::from_fn(width, height, |x, y| {
        let on_vertical = x + half >= seam_x && x < seam_x + (border - half);
        let on_horizontal = y + half >= seam_y && y < seam_y + (border - half);
        if on_vertical || on_horizontal {
            BORDER
        } else {
            let index = usize::from(y >= seam_y) * 2 + usize::from(x >= seam_x);
            colors[index]
        }
    })
}

/// A gapless `rows` x `cols` grid of solid cells, each in its own colour.
pub fn solid_grid(width: u32, height: u32, rows: u32, cols: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let row = (y * rows / height).min(rows - 1);
        let col = (x * cols / width).min(cols - 1);
        cell_color(row * cols + col)
    })
}
