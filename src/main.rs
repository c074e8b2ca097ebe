// src/main.rs - Plotter host bootstrap
use clap::Parser;
use tokio::sync::mpsc;
use tokio::task::LocalSet;

use scrawl::config;
use scrawl::motion::Direction;
use scrawl::plotter::Plotter;
use scrawl::text::TextOptions;
use scrawl::web;
use scrawl::web::models::{Position, StatusResponse, TravelLimits};
use scrawl::web::plotter_channel::{PlotterRequest, RequestError};

#[derive(Parser)]
#[command(name = "plotter-host", about = "Host firmware for belt/stepper plotters")]
struct Args {
    /// Path to the configuration file
    #[arg(default_value = "plotter.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    tracing::info!("Starting scrawl plotter host");

    let config = config::load_config(&args.config).inspect_err(|e| {
        tracing::error!("Failed to load config from '{}': {}", args.config, e);
    })?;

    tracing::info!(
        "Plotter: {} ({} geometry, travel {}x{} mm)",
        config.plotter.plotter_name.as_deref().unwrap_or("unnamed"),
        config.plotter.geometry,
        config.plotter.travel_x,
        config.plotter.travel_y,
    );

    let web_config = config.web.clone();
    let mut plotter = Plotter::new(config)?;

    // Channel between the Axum handlers and the plotter task.
    let (plotter_tx, mut plotter_rx) = mpsc::channel::<PlotterRequest>(16);

    // The plotter owns raw driver handles and is pinned to one local task:
    // a single logical thread of control runs each move to completion.
    let local = LocalSet::new();
    local.spawn_local(async move {
        let mut tick = tokio::time::interval(std::time::Duration::from_millis(20));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                request = plotter_rx.recv() => {
                    let Some(request) = request else { break };
                    handle_request(&mut plotter, request).await;
                }
                _ = tick.tick() => {
                    plotter.tick_draw().await;
                }
            }
        }
    });

    let app = web::api::create_router(plotter_tx);
    let listener =
        tokio::net::TcpListener::bind((web_config.bind_address.as_str(), web_config.port)).await?;
    tracing::info!("Web API listening on http://{}", listener.local_addr()?);
    local.spawn_local(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("web server error: {}", e);
        }
    });
    local.await;

    Ok(())
}

async fn handle_request(plotter: &mut Plotter, request: PlotterRequest) {
    match request {
        PlotterRequest::GetStatus { respond_to } => {
            let state = plotter.state();
            let (travel_x, travel_y) = plotter.travel();
            let _ = respond_to.send(StatusResponse {
                current_position: Position { x: state.x, y: state.y, z: state.z },
                max_position: TravelLimits { x: travel_x, y: travel_y },
                moving: state.moving,
            });
        }
        PlotterRequest::MoveTo { x, y, respond_to } => {
            let result = plotter.move_xy(x, y).await.map_err(RequestError::from);
            let _ = respond_to.send(result);
        }
        PlotterRequest::MoveZ { z, respond_to } => {
            let result = plotter.move_z(z).await.map_err(RequestError::from);
            let _ = respond_to.send(result);
        }
        PlotterRequest::Home { respond_to } => {
            let result = plotter.home().await.map_err(RequestError::from);
            let _ = respond_to.send(result);
        }
        PlotterRequest::Jog { actuator, direction, steps, respond_to } => {
            let result = match parse_direction(&direction) {
                Some(direction) => plotter
                    .jog(&actuator, direction, steps)
                    .await
                    .map_err(RequestError::from),
                None => Err(RequestError::BadRequest(format!(
                    "unknown direction: {}",
                    direction
                ))),
            };
            let _ = respond_to.send(result);
        }
        PlotterRequest::ExecuteGcode { program, respond_to } => {
            let result = plotter
                .execute_gcode(&program)
                .await
                .map_err(RequestError::from);
            let _ = respond_to.send(result);
        }
        PlotterRequest::RenderSvg { tokens, respond_to } => {
            let result = plotter
                .render_svg(tokens)
                .await
                .map_err(RequestError::from);
            let _ = respond_to.send(result);
        }
        PlotterRequest::Write {
            text,
            char_height,
            char_spacing,
            word_spacing,
            x_offset,
            y_offset,
            respond_to,
        } => {
            let options = TextOptions {
                char_height,
                char_spacing,
                word_spacing,
                x_offset,
                y_offset,
            };
            let result = plotter
                .draw_text(&text, &options)
                .await
                .map_err(RequestError::from);
            let _ = respond_to.send(result);
        }
        PlotterRequest::EnqueueDraw { event } => {
            plotter.enqueue_draw(event);
        }
    }
}

fn parse_direction(direction: &str) -> Option<Direction> {
    match direction {
        "forward" | "right" | "up" => Some(Direction::Forward),
        "reverse" | "left" | "down" => Some(Direction::Reverse),
        _ => None,
    }
}
