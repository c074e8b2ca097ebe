// src/svg/path.rs - Path data (`d` attribute) decoder
use crate::svg::SvgError;

/// One decoded path command. Absolute vs relative is part of the tag, not a
/// flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveAbs(f64, f64),
    MoveRel(f64, f64),
    LineAbs(f64, f64),
    LineRel(f64, f64),
    HorizontalAbs(f64),
    HorizontalRel(f64),
    VerticalAbs(f64),
    VerticalRel(f64),
    CurveAbs(f64, f64, f64, f64, f64, f64),
    CurveRel(f64, f64, f64, f64, f64, f64),
    SmoothAbs(f64, f64, f64, f64),
    SmoothRel(f64, f64, f64, f64),
    QuadraticAbs(f64, f64, f64, f64),
    QuadraticRel(f64, f64, f64, f64),
    SmoothQuadraticAbs(f64, f64),
    SmoothQuadraticRel(f64, f64),
    Close,
}

/// Parameters each command letter consumes per group.
fn arity(letter: char) -> Option<usize> {
    match letter {
        'M' | 'm' | 'L' | 'l' | 'T' | 't' => Some(2),
        'H' | 'h' | 'V' | 'v' => Some(1),
        'C' | 'c' => Some(6),
        'S' | 's' | 'Q' | 'q' => Some(4),
        'Z' | 'z' => Some(0),
        _ => None,
    }
}

/// Decode a `d` attribute value into an ordered command list.
///
/// Commas count as whitespace. After a command letter, as many fixed-arity
/// parameter groups as are present are consumed; groups beyond the first
/// repeat the command, except for `M`/`m` whose extras are implicit
/// `L`/`l`.
pub fn parse_path_data(d: &str) -> Result<Vec<PathCommand>, SvgError> {
    let cleaned = d.replace(',', " ");
    let bytes = cleaned.as_bytes();
    let mut pos = 0;
    let mut commands = Vec::new();

    while pos < bytes.len() {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= bytes.len() {
            break;
        }

        let letter = bytes[pos] as char;
        if arity(letter).is_none() {
            return Err(SvgError::CouldNotParse(format!(
                "d attr command: {}",
                letter
            )));
        }
        pos += 1;

        let mut params = Vec::new();
        loop {
            while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }
            if pos >= bytes.len() || bytes[pos].is_ascii_alphabetic() {
                break;
            }
            let start = pos;
            while pos < bytes.len()
                && !bytes[pos].is_ascii_whitespace()
                && !bytes[pos].is_ascii_alphabetic()
            {
                pos += 1;
            }
            let token = &cleaned[start..pos];
            let value = parse_decimal(token).ok_or_else(|| {
                SvgError::CouldNotParse(format!("d attr coordinate: {}", token))
            })?;
            params.push(value);
        }

        push_command(letter, &params, &mut commands)?;
    }

    Ok(commands)
}

fn push_command(
    letter: char,
    params: &[f64],
    out: &mut Vec<PathCommand>,
) -> Result<(), SvgError> {
    let arity = match arity(letter) {
        Some(a) => a,
        None => {
            return Err(SvgError::CouldNotParse(format!(
                "d attr command: {}",
                letter
            )));
        }
    };

    if arity == 0 {
        if !params.is_empty() {
            return Err(SvgError::CouldNotParse(format!(
                "close command with parameters: {:?}",
                params
            )));
        }
        out.push(PathCommand::Close);
        return Ok(());
    }

    if params.is_empty() || params.len() % arity != 0 {
        return Err(SvgError::CouldNotParse(format!(
            "d attr {} params: {:?}",
            letter, params
        )));
    }

    for (i, group) in params.chunks(arity).enumerate() {
        // Additional groups after an M/m are implicit line commands.
        let effective = match (letter, i) {
            ('M', n) if n > 0 => 'L',
            ('m', n) if n > 0 => 'l',
            _ => letter,
        };
        out.push(build(effective, group));
    }
    Ok(())
}

fn build(letter: char, p: &[f64]) -> PathCommand {
    match letter {
        'M' => PathCommand::MoveAbs(p[0], p[1]),
        'm' => PathCommand::MoveRel(p[0], p[1]),
        'L' => PathCommand::LineAbs(p[0], p[1]),
        'l' => PathCommand::LineRel(p[0], p[1]),
        'H' => PathCommand::HorizontalAbs(p[0]),
        'h' => PathCommand::HorizontalRel(p[0]),
        'V' => PathCommand::VerticalAbs(p[0]),
        'v' => PathCommand::VerticalRel(p[0]),
        'C' => PathCommand::CurveAbs(p[0], p[1], p[2], p[3], p[4], p[5]),
        'c' => PathCommand::CurveRel(p[0], p[1], p[2], p[3], p[4], p[5]),
        'S' => PathCommand::SmoothAbs(p[0], p[1], p[2], p[3]),
        's' => PathCommand::SmoothRel(p[0], p[1], p[2], p[3]),
        'Q' => PathCommand::QuadraticAbs(p[0], p[1], p[2], p[3]),
        'q' => PathCommand::QuadraticRel(p[0], p[1], p[2], p[3]),
        'T' => PathCommand::SmoothQuadraticAbs(p[0], p[1]),
        't' => PathCommand::SmoothQuadraticRel(p[0], p[1]),
        _ => PathCommand::Close,
    }
}

/// Strict signed decimal: `-?\d+(\.\d+)?`.
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
    fn test_spacing_variants_decode_identically() {
        let spaced = parse_path_data("M 100 100 L 200 200").unwrap();
        let compact = parse_path_data("M100 100L200 200").unwrap();
        assert_eq!(spaced, compact);
        assert_eq!(
            spaced,
            vec![
                PathCommand::MoveAbs(100.0, 100.0),
                PathCommand::LineAbs(200.0, 200.0),
            ]
        );
    }

    #[test]
    fn test_implicit_repeat_after_move_is_line() {
        let commands = parse_path_data("M 1.2,-1.1 2.0,3.0").unwrap();
        assert_eq!(
            commands,
            vec![
                PathCommand::MoveAbs(1.2, -1.1),
                PathCommand::LineAbs(2.0, 3.0),
            ]
        );

        let commands = parse_path_data("m 1 1 2 2 3 3").unwrap();
        assert_eq!(
            commands,
            vec![
                PathCommand::MoveRel(1.0, 1.0),
                PathCommand::LineRel(2.0, 2.0),
                PathCommand::LineRel(3.0, 3.0),
            ]
        );
    }

    #[test]
    fn test_implicit_repeat_of_other_commands() {
        let commands = parse_path_data("L 1 1 2 2").unwrap();
        assert_eq!(
            commands,
            vec![
                PathCommand::LineAbs(1.0, 1.0),
                PathCommand::LineAbs(2.0, 2.0),
            ]
        );

        let commands = parse_path_data("h 5 10").unwrap();
        assert_eq!(
            commands,
            vec![
                PathCommand::HorizontalRel(5.0),
                PathCommand::HorizontalRel(10.0),
            ]
        );
    }

    #[test]
    fn test_curve_arities() {
        let commands = parse_path_data("C 1 2 3 4 5 6 S 7 8 9 10 Q 1 1 2 2 T 3 3 Z").unwrap();
        assert_eq!(
            commands,
            vec![
                PathCommand::CurveAbs(1.0, 2.0, 3.0, 4.0, 5.0, 6.0),
                PathCommand::SmoothAbs(7.0, 8.0, 9.0, 10.0),
                PathCommand::QuadraticAbs(1.0, 1.0, 2.0, 2.0),
                PathCommand::SmoothQuadraticAbs(3.0, 3.0),
                PathCommand::Close,
            ]
        );
    }

    #[test]
    fn test_incomplete_group_is_an_error() {
        assert!(parse_path_data("L 1 1 2").is_err());
        assert!(parse_path_data("C 1 2 3").is_err());
        assert!(parse_path_data("M").is_err());
    }

    #[test]
    fn test_unknown_command_is_an_error() {
        assert!(parse_path_data("A 1 2 3 4 5 6 7").is_err());
        assert!(parse_path_data("M 1 1 ~").is_err());
    }
}
