// src/gcode/parser.rs - G-code line decoder
//
// Decoding is total: anything outside the recognized grammar comes back as
// `Unsupported`, never an error. Callers decide whether to abort or skip.

/// One decoded G-code line.
#[derive(Debug, Clone, PartialEq)]
pub enum GCodeCommand {
    Empty,
    Comment(String),
    RapidPositioning {
        x: f64,
        y: f64,
    },
    LinearInterpolation {
        x: Option<f64>,
        y: Option<f64>,
        z: Option<f64>,
        feed_rate: Option<f64>,
    },
    UnitsInches,
    UnitsMillimeters,
    AbsoluteMode,
    IncrementalMode,
    Unsupported,
}

/// Decode a single line. Whitespace-tolerant, case-sensitive on command
/// letters; a trailing `;` comment is allowed on any recognized command.
pub fn decode(line: &str) -> GCodeCommand {
    let line = line.trim();
    if line.is_empty() {
        return GCodeCommand::Empty;
    }
    if let Some(text) = line.strip_prefix(';') {
        return GCodeCommand::Comment(text.trim().to_string());
    }

    let body = match line.find(';') {
        Some(i) => line[..i].trim_end(),
        None => line,
    };
    let mut words = body.split_whitespace();

    match words.next() {
        Some("G0") => decode_rapid_positioning(words),
        Some("G1") => decode_linear_interpolation(words),
        Some("G20") if words.next().is_none() => GCodeCommand::UnitsInches,
        Some("G21") if words.next().is_none() => GCodeCommand::UnitsMillimeters,
        Some("G90") if words.next().is_none() => GCodeCommand::AbsoluteMode,
        Some("G91") if words.next().is_none() => GCodeCommand::IncrementalMode,
        _ => GCodeCommand::Unsupported,
    }
}

/// `G0 X<decimal> Y<decimal>` - both parameters required, in order.
fn decode_rapid_positioning<'a>(mut words: impl Iterator<Item = &'a str>) -> GCodeCommand {
    let x = words.next().and_then(|w| parse_param(w, 'X'));
    let y = words.next().and_then(|w| parse_param(w, 'Y'));
    match (x, y, words.next()) {
        (Some(x), Some(y), None) => GCodeCommand::RapidPositioning { x, y },
        _ => GCodeCommand::Unsupported,
    }
}

/// `G1 [X<d>] [Y<d>] [Z<d>] [F<d>]` - each optional, canonical order, at
/// most once. Absent fields mean "unchanged" to the executor.
fn decode_linear_interpolation<'a>(words: impl Iterator<Item = &'a str>) -> GCodeCommand {
    const ORDER: [char; 4] = ['X', 'Y', 'Z', 'F'];
    let mut values: [Option<f64>; 4] = [None; 4];
    let mut next_slot = 0;

    for word in words {
        let mut letter = None;
        for slot in next_slot..ORDER.len() {
            if let Some(value) = parse_param(word, ORDER[slot]) {
                values[slot] = Some(value);
                letter = Some(slot);
                break;
            }
        }
        match letter {
            Some(slot) => next_slot = slot + 1,
            None => return GCodeCommand::Unsupported,
        }
    }

    GCodeCommand::LinearInterpolation {
        x: values[0],
        y: values[1],
        z: values[2],
        feed_rate: values[3],
    }
}

fn parse_param(word: &str, letter: char) -> Option<f64> {
    word.strip_prefix(letter).and_then(parse_decimal)
}

/// Strict signed decimal: `-?\d+(\.\d+)?`. No exponents, no bare dots.
fn parse_decimal(s: &str) -> Option<f64> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if let Some(frac) = frac_part {
        if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_comment() {
        assert_eq!(decode(""), GCodeCommand::Empty);
        assert_eq!(decode("   "), GCodeCommand::Empty);
        assert_eq!(
            decode("; A comment"),
            GCodeCommand::Comment("A comment".to_string())
        );
    }

    #[test]
    fn test_rapid_positioning() {
        assert_eq!(
            decode("G0 X20.2 Y30.3"),
            GCodeCommand::RapidPositioning { x: 20.2, y: 30.3 }
        );
        // Both parameters are required, in order.
        assert_eq!(decode("G0 X20.2"), GCodeCommand::Unsupported);
        assert_eq!(decode("G0 Y30.3 X20.2"), GCodeCommand::Unsupported);
    }

    #[test]
    fn test_linear_interpolation() {
        assert_eq!(
            decode("G1 X10.1 Y40.4"),
            GCodeCommand::LinearInterpolation {
                x: Some(10.1),
                y: Some(40.4),
                z: None,
                feed_rate: None,
            }
        );
        assert_eq!(
            decode("G1 X-10.1 Y-40.4 Z20 F30"),
            GCodeCommand::LinearInterpolation {
                x: Some(-10.1),
                y: Some(-40.4),
                z: Some(20.0),
                feed_rate: Some(30.0),
            }
        );
        assert_eq!(
            decode("G1 Z20"),
            GCodeCommand::LinearInterpolation {
                x: None,
                y: None,
                z: Some(20.0),
                feed_rate: None,
            }
        );
        // Out-of-order parameters are not part of the grammar.
        assert_eq!(decode("G1 F30 X1"), GCodeCommand::Unsupported);
    }

    #[test]
    fn test_mode_and_units() {
        assert_eq!(decode("G20"), GCodeCommand::UnitsInches);
        assert_eq!(decode("G21"), GCodeCommand::UnitsMillimeters);
        assert_eq!(decode("G90"), GCodeCommand::AbsoluteMode);
        assert_eq!(decode("G91"), GCodeCommand::IncrementalMode);
        assert_eq!(decode("G90 X1"), GCodeCommand::Unsupported);
    }

    #[test]
    fn test_unsupported() {
        assert_eq!(decode("garbage"), GCodeCommand::Unsupported);
        assert_eq!(decode("G2 X1 Y1"), GCodeCommand::Unsupported);
        assert_eq!(decode("g0 X1 Y1"), GCodeCommand::Unsupported); // case-sensitive
    }

    #[test]
    fn test_trailing_comment() {
        assert_eq!(
            decode("G0 X1 Y2 ; head to the corner"),
            GCodeCommand::RapidPositioning { x: 1.0, y: 2.0 }
        );
        assert_eq!(decode("G21 ; millimeters"), GCodeCommand::UnitsMillimeters);
    }

    #[test]
    fn test_strict_decimals() {
        assert_eq!(decode("G0 X1e5 Y2"), GCodeCommand::Unsupported);
        assert_eq!(decode("G0 X.5 Y2"), GCodeCommand::Unsupported);
        assert_eq!(decode("G0 X1. Y2"), GCodeCommand::Unsupported);
        assert_eq!(decode("G0 Xnan Y2"), GCodeCommand::Unsupported);
        assert_eq!(
            decode("G0 X-0.01 Y0"),
            GCodeCommand::RapidPositioning { x: -0.01, y: 0.0 }
        );
    }
}
