//! Grid layout for the tile command.

use qaime_types::{Rect, Size};

/// Lay out `n` windows in a grid filling `area` exactly.
///
/// Columns are `ceil(sqrt(n))`, rows `ceil(n / cols)`. An incomplete last row
/// spreads its windows across the full width so the union covers `area`.
pub fn grid(n: usize, area: Size) -> Vec<Rect> {
    if n == 0 {
        return Vec::new();
    }
    let cols = (n as f64).sqrt().ceil() as usize;
    let rows = n.div_ceil(cols);
    let cell_h = area.height / rows as f64;

    (0..n)
        .map(|i| {
            let row = i / cols;
            let col = i % cols;
            let in_row = cols.min(n - row * cols);
            let cell_w = area.width / in_row as f64;
            Rect::new(col as f64 * cell_w, row as f64 * cell_h, cell_w, cell_h)
        })
        .collect()
}
