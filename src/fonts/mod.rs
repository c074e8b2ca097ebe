// src/fonts/mod.rs - Vector-font glyph compiler
pub mod default;

pub use default::glyph;

/// One character: an ASCII stroke diagram plus explicit revisit ordering.
///
/// Non-space, non-`x` cells are "order markers"; sorting them yields the
/// stroke order. The revisit map lets one grid cell appear at several
/// stroke positions, for self-crossing glyphs.
#[derive(Debug)]
pub struct GlyphDef {
    pub art: &'static str,
    /// Marker char -> additional order chars its cell also occupies.
    pub revisits: &'static [(char, &'static str)],
}

/// Compile a glyph to a closed polyline of grid points, origin bottom-left.
/// An empty grid compiles to an empty polyline.
pub fn glyph_points(def: &GlyphDef) -> Vec<(i32, i32)> {
    let mut rows: Vec<&str> = def.art.lines().collect();

    // Remove any leading and/or trailing empty rows.
    while rows.first().is_some_and(|r| r.trim().is_empty()) {
        rows.remove(0);
    }
    while rows.last().is_some_and(|r| r.trim().is_empty()) {
        rows.pop();
    }
    if rows.is_empty() {
        return Vec::new();
    }

    // Collect the order-marker coordinates and find the leftmost one.
    let mut markers: Vec<(char, (i32, i32))> = Vec::new();
    let mut min_col = rows.iter().map(|r| r.len()).max().unwrap_or(0) as i32;
    for (row_num, row) in rows.iter().enumerate() {
        for (col_num, ch) in row.chars().enumerate() {
            if ch == ' ' || ch == 'x' {
                continue;
            }
            let coord = (col_num as i32, row_num as i32);
            min_col = min_col.min(coord.0);
            markers.push((ch, coord));
            if let Some((_, extra)) = def.revisits.iter().find(|(m, _)| *m == ch) {
                for order_char in extra.chars() {
                    markers.push((order_char, coord));
                }
            }
        }
    }
    if markers.is_empty() {
        return Vec::new();
    }

    // Left-align and invert the row axis to put the origin bottom-left.
    let num_rows = rows.len() as i32;
    for (_, (x, y)) in markers.iter_mut() {
        *x -= min_col;
        *y = num_rows - 1 - *y;
    }

    // Stroke order is the lexicographic order of the marker chars.
    markers.sort();
    markers.push(markers[0]);

    markers.into_iter().map(|(_, coord)| coord).collect()
}
