// Integration tests for SVG rendering through the motion engine.
mod common;

use scrawl::motion::MotionError;
use scrawl::svg::{PathCommand, SvgError, SvgToken, parse_path_data, render_svg};

fn attr(name: &str, value: &str) -> SvgToken {
    SvgToken::Attr { name: name.to_string(), value: value.to_string() }
}

fn start(name: &str) -> SvgToken {
    SvgToken::StartTag { name: name.to_string() }
}

#[test]
fn compact_and_spaced_path_data_are_equivalent() {
    assert_eq!(
        parse_path_data("M 100 100 L 200 200").unwrap(),
        parse_path_data("M100 100L200 200").unwrap(),
    );
    assert_eq!(
        parse_path_data("M 1.2,-1.1 2.0,3.0").unwrap(),
        vec![
            PathCommand::MoveAbs(1.2, -1.1),
            PathCommand::LineAbs(2.0, 3.0),
        ]
    );
}

#[tokio::test]
async fn render_moves_the_device() {
    let dir = tempfile::tempdir().unwrap();
    let (mut device, logs) = common::sim_device(&common::orthogonal_config(&dir));

    // travel 200, document 20 -> scale 10
    let tokens = vec![
        start("svg"),
        attr("width", "20mm"),
        attr("height", "20mm"),
        start("path"),
        attr("d", "M 1 1 L 2 1"),
    ];
    render_svg(&mut device, tokens).await.unwrap();

    // Final point: (2*10, 200 - 1*10) = (20, 190).
    assert_eq!(device.state().x, 20.0);
    assert_eq!(device.state().y, 190.0);
    assert!(common::pulse_count(&logs[0]) > 0);
    assert!(!device.state().moving);
}

#[tokio::test]
async fn parse_failure_aborts_the_render() {
    let dir = tempfile::tempdir().unwrap();
    let (mut device, _) = common::sim_device(&common::orthogonal_config(&dir));

    let tokens = vec![
        start("svg"),
        attr("width", "20mm"),
        attr("height", "20in"),
        start("path"),
        attr("d", "M 1 1"),
    ];
    let err = render_svg(&mut device, tokens).await.unwrap_err();
    assert!(matches!(err, SvgError::CouldNotParse(_)));
    assert!(!device.state().moving);
}

#[tokio::test]
async fn out_of_bounds_point_aborts_the_render() {
    let dir = tempfile::tempdir().unwrap();
    let (mut device, _) = common::sim_device(&common::orthogonal_config(&dir));

    let tokens = vec![
        start("svg"),
        attr("width", "200mm"),
        attr("height", "200mm"),
        start("path"),
        // The y inversion pushes a negative-y point above travel_y.
        attr("d", "M 10 -500"),
    ];
    let err = render_svg(&mut device, tokens).await.unwrap_err();
    assert!(matches!(err, SvgError::Motion(MotionError::OutOfBounds { .. })));
    assert!(!device.state().moving);
}
