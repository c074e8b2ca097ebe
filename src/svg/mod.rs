// src/svg/mod.rs - SVG rendering over the motion pipeline
pub mod path;

pub use path::{PathCommand, parse_path_data};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::motion::{Device, MotionError};

#[derive(Debug, Error)]
pub enum SvgError {
    #[error("could not parse {0}")]
    CouldNotParse(String),
    #[error(transparent)]
    Motion(#[from] MotionError),
}

/// One event from the XML tokenizer. The tokenizer itself is an external
/// collaborator; the web surface accepts its output as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SvgToken {
    StartTag { name: String },
    EndTag { name: String },
    Attr { name: String, value: String },
}

/// Streaming decoder from tokenizer events to device points.
///
/// Tracks nested `<g>` translations (summed into one cumulative offset),
/// the current path's first point for `Z`/`z`, a relative reference for
/// lowercase commands, and the uniform output scale established by the
/// outer width/height attributes.
pub struct SvgRenderer {
    travel: (f64, f64),
    open_tags: Vec<String>,
    group_translates: Vec<(f64, f64)>,
    translate: (f64, f64),
    width: Option<(f64, String)>,
    height: Option<(f64, String)>,
    scale: Option<f64>,
    first_path_point: Option<(f64, f64)>,
    relative_reference: (f64, f64),
}

impl SvgRenderer {
    pub fn new(travel: (f64, f64)) -> Self {
        Self {
            travel,
            open_tags: Vec::new(),
            group_translates: Vec::new(),
            translate: (0.0, 0.0),
            width: None,
            height: None,
            scale: None,
            first_path_point: None,
            relative_reference: (0.0, 0.0),
        }
    }

    /// Consume one token, returning the device points it produces.
    pub fn feed(&mut self, token: &SvgToken) -> Result<Vec<(f64, f64)>, SvgError> {
        match token {
            SvgToken::StartTag { name } => {
                self.open_tags.push(name.clone());
                if name == "g" {
                    self.group_translates.push((0.0, 0.0));
                } else if name == "path" {
                    self.first_path_point = None;
                }
                Ok(Vec::new())
            }
            SvgToken::EndTag { name } => {
                self.open_tags.pop();
                if name == "g" {
                    let (x, y) = self
                        .group_translates
                        .pop()
                        .ok_or_else(|| SvgError::CouldNotParse("unbalanced </g>".to_string()))?;
                    self.translate = (self.translate.0 - x, self.translate.1 - y);
                }
                Ok(Vec::new())
            }
            SvgToken::Attr { name, value } => self.handle_attr(name, value),
        }
    }

    fn handle_attr(&mut self, name: &str, value: &str) -> Result<Vec<(f64, f64)>, SvgError> {
        match name {
            "width" => {
                self.width = Some(parse_number_unit(value)?);
                Ok(Vec::new())
            }
            "height" => {
                self.height = Some(parse_number_unit(value)?);
                Ok(Vec::new())
            }
            "transform" if self.open_tags.last().is_some_and(|t| t == "g") => {
                let (x, y) = parse_translate(value)?;
                if let Some(last) = self.group_translates.last_mut() {
                    *last = (x, y);
                }
                self.translate = (self.translate.0 + x, self.translate.1 + y);
                Ok(Vec::new())
            }
            "d" => self.handle_path_data(value),
            _ => Ok(Vec::new()),
        }
    }

    fn handle_path_data(&mut self, value: &str) -> Result<Vec<(f64, f64)>, SvgError> {
        let (width, width_unit) = self
            .width
            .as_ref()
            .ok_or_else(|| SvgError::CouldNotParse("path before width set".to_string()))?;
        let (height, height_unit) = self
            .height
            .as_ref()
            .ok_or_else(|| SvgError::CouldNotParse("path before height set".to_string()))?;
        if width_unit != height_unit {
            return Err(SvgError::CouldNotParse(format!(
                "different width/height units: {}/{}",
                width_unit, height_unit
            )));
        }
        if self.scale.is_none() {
            let max_travel = self.travel.0.max(self.travel.1);
            let scale = (max_travel / width.max(*height)).floor();
            // An oversized document degrades to unscaled output rather than
            // collapsing onto the origin.
            self.scale = Some(scale.max(1.0));
        }

        let mut points = Vec::new();
        for command in parse_path_data(value)? {
            for point in self.resolve(command)? {
                points.push(self.to_device(point));
            }
        }
        Ok(points)
    }

    /// Resolve one command to logical (pre-transform) points, updating the
    /// first-point and relative-reference state.
    fn resolve(&mut self, command: PathCommand) -> Result<Vec<(f64, f64)>, SvgError> {
        let (rx, ry) = self.relative_reference;
        let points: Vec<(f64, f64)> = match command {
            PathCommand::MoveAbs(x, y)
            | PathCommand::LineAbs(x, y)
            | PathCommand::SmoothQuadraticAbs(x, y) => vec![(x, y)],
            PathCommand::MoveRel(x, y)
            | PathCommand::LineRel(x, y)
            | PathCommand::SmoothQuadraticRel(x, y) => vec![(rx + x, ry + y)],
            PathCommand::HorizontalAbs(x) => vec![(x, ry)],
            PathCommand::HorizontalRel(x) => vec![(rx + x, ry)],
            PathCommand::VerticalAbs(y) => vec![(rx, y)],
            PathCommand::VerticalRel(y) => vec![(rx, ry + y)],
            // Curves are flattened to a polyline through their control and
            // end points; the machine never evaluates Beziers.
            PathCommand::CurveAbs(x1, y1, x2, y2, x, y) => {
                vec![(x1, y1), (x2, y2), (x, y)]
            }
            PathCommand::CurveRel(x1, y1, x2, y2, x, y) => {
                vec![(rx + x1, ry + y1), (rx + x2, ry + y2), (rx + x, ry + y)]
            }
            PathCommand::SmoothAbs(x2, y2, x, y) | PathCommand::QuadraticAbs(x2, y2, x, y) => {
                vec![(x2, y2), (x, y)]
            }
            PathCommand::SmoothRel(x2, y2, x, y) | PathCommand::QuadraticRel(x2, y2, x, y) => {
                vec![(rx + x2, ry + y2), (rx + x, ry + y)]
            }
            PathCommand::Close => {
                let first = self.first_path_point.ok_or_else(|| {
                    SvgError::CouldNotParse("close before any path point".to_string())
                })?;
                self.relative_reference = (0.0, 0.0);
                return Ok(vec![first]);
            }
        };

        if self.first_path_point.is_none() {
            self.first_path_point = points.first().copied();
        }
        if let Some(&last) = points.last() {
            self.relative_reference = last;
        }
        Ok(points)
    }

    /// Apply the cumulative translate, the uniform scale, and the Y-axis
    /// inversion that maps SVG's top-left origin onto the device's
    /// bottom-left one.
    fn to_device(&self, (x, y): (f64, f64)) -> (f64, f64) {
        let scale = self.scale.unwrap_or(1.0);
        (
            (x + self.translate.0) * scale,
            self.travel.1 - (y + self.translate.1) * scale,
        )
    }
}

/// Render a token stream as one locked motion operation. A parse failure
/// or an out-of-bounds point aborts the whole render.
pub async fn render_svg(
    device: &mut Device,
    tokens: impl IntoIterator<Item = SvgToken>,
) -> Result<(), SvgError> {
    device.begin_motion().map_err(SvgError::Motion)?;

    let mut renderer = SvgRenderer::new(device.travel());
    let mut result = Ok(());
    'tokens: for token in tokens {
        match renderer.feed(&token) {
            Ok(points) => {
                for (x, y) in points {
                    if let Err(e) = device.move_xy_unlocked(x, y).await {
                        result = Err(SvgError::Motion(e));
                        break 'tokens;
                    }
                }
            }
            Err(e) => {
                result = Err(e);
                break;
            }
        }
    }

    device.finish_motion();
    result
}

/// `<number><unit>`, e.g. `"485mm"`.
fn parse_number_unit(value: &str) -> Result<(f64, String), SvgError> {
    let split = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());
    let number: f64 = value[..split]
        .parse()
        .map_err(|_| SvgError::CouldNotParse(format!("dimension attr: {}", value)))?;
    Ok((number, value[split..].to_string()))
}

/// `translate(<x>,<y>)`. Other transforms are not supported.
fn parse_translate(value: &str) -> Result<(f64, f64), SvgError> {
    let err = || SvgError::CouldNotParse(format!("transform attr: {}", value));
    let inner = value
        .trim()
        .strip_prefix("translate(")
        .and_then(|v| v.strip_suffix(')'))
        .ok_or_else(err)?;
    let (x, y) = inner.split_once(',').ok_or_else(err)?;
    Ok((
        x.trim().parse().map_err(|_| err())?,
        y.trim().parse().map_err(|_| err())?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(name: &str, value: &str) -> SvgToken {
        SvgToken::Attr { name: name.to_string(), value: value.to_string() }
    }

    fn start(name: &str) -> SvgToken {
        SvgToken::StartTag { name: name.to_string() }
    }

    fn end(name: &str) -> SvgToken {
        SvgToken::EndTag { name: name.to_string() }
    }

    fn feed_all(renderer: &mut SvgRenderer, tokens: &[SvgToken]) -> Vec<(f64, f64)> {
        let mut points = Vec::new();
        for token in tokens {
            points.extend(renderer.feed(token).unwrap());
        }
        points
    }

    #[test]
    fn test_scale_and_y_inversion() {
        let mut renderer = SvgRenderer::new((100.0, 100.0));
        let points = feed_all(
            &mut renderer,
            &[
                start("svg"),
                attr("width", "10mm"),
                attr("height", "10mm"),
                start("path"),
                attr("d", "M 1 1 L 2 2"),
            ],
        );
        // scale = floor(100 / 10) = 10; y is inverted against travel_y.
        assert_eq!(points, vec![(10.0, 90.0), (20.0, 80.0)]);
    }

    #[test]
    fn test_unit_mismatch_fails() {
        let mut renderer = SvgRenderer::new((100.0, 100.0));
        renderer.feed(&attr("width", "10mm")).unwrap();
        renderer.feed(&attr("height", "10in")).unwrap();
        let err = renderer.feed(&attr("d", "M 1 1")).unwrap_err();
        assert!(matches!(err, SvgError::CouldNotParse(_)));
    }

    #[test]
    fn test_path_before_dimensions_fails() {
        let mut renderer = SvgRenderer::new((100.0, 100.0));
        let err = renderer.feed(&attr("d", "M 1 1")).unwrap_err();
        assert!(matches!(err, SvgError::CouldNotParse(_)));
    }

    #[test]
    fn test_nested_group_translates() {
        let mut renderer = SvgRenderer::new((1000.0, 1000.0));
        let mut points = feed_all(
            &mut renderer,
            &[
                start("svg"),
                attr("width", "1000mm"),
                attr("height", "1000mm"),
                start("g"),
                attr("transform", "translate(10,20)"),
                start("g"),
                attr("transform", "translate(1,2)"),
                start("path"),
                attr("d", "M 0 0"),
                end("path"),
                end("g"),
            ],
        );
        assert_eq!(points, vec![(11.0, 1000.0 - 22.0)]);

        // Inner group closed: only the outer translate remains.
        points = feed_all(
            &mut renderer,
            &[start("path"), attr("d", "M 0 0"), end("path")],
        );
        assert_eq!(points, vec![(10.0, 1000.0 - 20.0)]);
    }

    #[test]
    fn test_relative_commands_and_close() {
        let mut renderer = SvgRenderer::new((1000.0, 1000.0));
        let points = feed_all(
            &mut renderer,
            &[
                start("svg"),
                attr("width", "1000mm"),
                attr("height", "1000mm"),
                start("path"),
                attr("d", "M 10 10 l 5 5 h 10 V 40 Z"),
            ],
        );
        assert_eq!(
            points,
            vec![
                (10.0, 990.0),
                (15.0, 985.0),
                (25.0, 985.0),
                (25.0, 960.0),
                (10.0, 990.0), // back to the first path point
            ]
        );
    }

    #[test]
    fn test_token_round_trips_as_json() {
        let token = attr("d", "M 1 1");
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(serde_json::from_str::<SvgToken>(&json).unwrap(), token);
    }
}
