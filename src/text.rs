// src/text.rs - Vector-text drawing over the motion pipeline
use crate::fonts::{glyph, glyph_points};
use crate::motion::{Device, MotionError};

#[derive(Debug, Clone)]
pub struct TextOptions {
    pub char_height: f64,
    /// Defaults to `floor(char_height / 8)`.
    pub char_spacing: Option<f64>,
    /// Defaults to four char spacings.
    pub word_spacing: Option<f64>,
    /// Default to the current device position.
    pub x_offset: Option<f64>,
    pub y_offset: Option<f64>,
}

/// Draw a line of text as one locked motion operation. Spaces and
/// characters missing from the glyph table advance the cursor by a word
/// spacing.
pub async fn draw_text(
    device: &mut Device,
    text: &str,
    options: &TextOptions,
) -> Result<(), MotionError> {
    device.begin_motion()?;
    let result = draw_text_unlocked(device, text, options).await;
    device.finish_motion();
    result
}

async fn draw_text_unlocked(
    device: &mut Device,
    text: &str,
    options: &TextOptions,
) -> Result<(), MotionError> {
    let char_height = options.char_height;
    let char_spacing = options
        .char_spacing
        .unwrap_or((char_height / 8.0).floor());
    let word_spacing = options.word_spacing.unwrap_or(char_spacing * 4.0);
    let mut x_offset = options.x_offset.unwrap_or(device.state().x);
    let y_offset = options.y_offset.unwrap_or(device.state().y);

    for ch in text.chars() {
        let def = match glyph(ch) {
            Some(def) if ch != ' ' => def,
            _ => {
                x_offset += word_spacing;
                continue;
            }
        };
        let grid = glyph_points(def);
        if grid.is_empty() {
            x_offset += word_spacing;
            continue;
        }

        let max_y = grid.iter().map(|&(_, y)| y).max().unwrap_or(0);
        let scale = (char_height / (max_y + 1) as f64).ceil();

        // A sprue below the glyph's entry point carries the stroke in and
        // out, so the pen's approach line lands under the character.
        let sprue = grid[0];
        let mut points: Vec<(f64, f64)> = Vec::with_capacity(grid.len() + 2);
        points.push((sprue.0 as f64, sprue.1 as f64));
        points.extend(grid.iter().map(|&(x, y)| (x as f64, (y + 1) as f64)));
        points.push((sprue.0 as f64, sprue.1 as f64));

        for point in points.iter_mut() {
            point.0 *= scale;
            point.1 *= scale;
        }

        let glyph_width = points
            .iter()
            .map(|&(x, _)| x)
            .fold(0.0f64, f64::max);

        for &(px, py) in &points {
            device
                .move_xy_unlocked(px + x_offset, py + y_offset)
                .await?;
        }

        x_offset += glyph_width + char_spacing;
    }

    Ok(())
}
