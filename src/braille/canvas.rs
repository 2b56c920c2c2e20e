/// Dot bit for each (x % 2, y % 4) position inside a braille cell.
/// Unicode braille patterns start at U+2800.
const DOT_BITS: [[u8; 4]; 2] = [
    [0x01, 0x02, 0x04, 0x40], // left column, top to bottom
    [0x08, 0x10, 0x20, 0x80], // right column
];

const BLANK: u32 = 0x2800;

/// Off-screen drawing surface with 2x4 dots per terminal cell
#[derive(Clone, Debug)]
pub struct BrailleCanvas {
    width: usize,  // cells
    height: usize, // cells
    cells: Vec<u8>,
}

impl BrailleCanvas {
    /// Canvas of `width` x `height` terminal cells
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0; width * height],
        }
    }

    /// Dot resolution (width * 2, height * 4)
    pub fn dot_size(&self) -> (usize, usize) {
        (self.width * 2, self.height * 4)
    }

    pub fn set_pixel(&mut self, x: usize, y: usize) {
        let (cx, cy) = (x / 2, y / 4);
        if cx >= self.width || cy >= self.height {
            return;
        }
        self.cells[cy * self.width + cx] |= DOT_BITS[x % 2][y % 4];
    }

    /// Negative coordinates are off-canvas and ignored
    pub fn set_pixel_signed(&mut self, x: i32, y: i32) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as usize, y as usize);
        }
    }

    /// Glyph for a cell, `None` when no dot is set
    pub fn glyph(&self, col: usize, row: usize) -> Option<char> {
        if col >= self.width || row >= self.height {
            return None;
        }
        match self.cells[row * self.width + col] {
            0 => None,
            bits => char::from_u32(BLANK + bits as u32),
        }
    }

    /// All lit cells as (col, row, glyph)
    pub fn lit_cells(&self) -> impl Iterator<Item = (u16, u16, char)> + '_ {
        self.cells.iter().enumerate().filter_map(|(i, &bits)| {
            if bits == 0 {
                return None;
            }
            let glyph = char::from_u32(BLANK + bits as u32)?;
            Some(((i % self.width) as u16, (i / self.width) as u16, glyph))
        })
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|&b| b == 0)
    }

    #[cfg(test)]
    pub fn to_string(&self) -> String {
        (0..self.height)
            .map(|row| {
                (0..self.width)
                    .map(|col| self.glyph(col, row).unwrap_or('\u{2800}'))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_dot() {
        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.set_pixel(0, 0);
        assert_eq!(canvas.to_string(), "⠁");
    }

    #[test]
    fn test_full_cell() {
        let mut canvas = BrailleCanvas::new(1, 1);
        for x in 0..2 {
            for y in 0..4 {
                canvas.set_pixel(x, y);
            }
        }
        assert_eq!(canvas.to_string(), "⣿");
    }

    #[test]
    fn test_out_of_bounds_is_ignored() {
        let mut canvas = BrailleCanvas::new(2, 1);
        canvas.set_pixel(4, 0);
        canvas.set_pixel(0, 4);
        canvas.set_pixel_signed(-1, 0);
        assert!(canvas.is_blank());
        assert_eq!(canvas.dot_size(), (4, 4));
    }

    #[test]
    fn test_lit_cells_positions() {
        let mut canvas = BrailleCanvas::new(3, 2);
        canvas.set_pixel(5, 7); // bottom-right dot of cell (2, 1)
        let lit: Vec<_> = canvas.lit_cells().collect();
        assert_eq!(lit, vec![(2, 1, '⢀')]);
        assert_eq!(canvas.glyph(0, 0), None);
    }
}
