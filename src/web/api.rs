//! Axum API routes and handlers. Handlers only talk to the plotter task
//! over the request channel; the task owns the device.

use axum::{
    Json, Router,
    extract::State,
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    http::StatusCode,
    response::Response,
    routing::{get, post},
};
use tokio::sync::{mpsc::Sender, oneshot};

use crate::queue::DrawEvent;
use crate::svg::SvgToken;
use crate::web::models::{
    DrawMessage, JogRequest, MoveRequest, MoveZRequest, StatusResponse, WriteRequest,
};
use crate::web::plotter_channel::{PlotterRequest, RequestError};

pub type AppState = Sender<PlotterRequest>;

/// Creates the Axum router with all the API endpoints.
pub fn create_router(plotter_tx: AppState) -> Router {
    Router::new()
        .route("/api/v1/status", get(get_status))
        .route("/api/v1/move", post(move_to))
        .route("/api/v1/move_z", post(move_z))
        .route("/api/v1/home", post(home))
        .route("/api/v1/jog", post(jog))
        .route("/api/v1/gcode", post(execute_gcode))
        .route("/api/v1/svg", post(render_svg))
        .route("/api/v1/write", post(write_text))
        .route("/api/v1/draw", get(draw_socket))
        .with_state(plotter_tx)
}

fn status_for(error: &RequestError) -> StatusCode {
    match error {
        RequestError::Busy => StatusCode::CONFLICT,
        RequestError::CouldNotParse(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RequestError::OutOfBounds(_)
        | RequestError::Precondition(_)
        | RequestError::BadRequest(_) => StatusCode::BAD_REQUEST,
    }
}

/// Send a request and await its oneshot reply, translating the error into
/// an HTTP status plus body.
async fn dispatch(
    plotter_tx: &AppState,
    request: PlotterRequest,
    respond_rx: oneshot::Receiver<Result<(), RequestError>>,
) -> Result<StatusCode, (StatusCode, Json<RequestError>)> {
    if plotter_tx.send(request).await.is_err() {
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(RequestError::BadRequest("plotter task gone".to_string())),
        ));
    }
    match respond_rx.await {
        Ok(Ok(())) => Ok(StatusCode::OK),
        Ok(Err(error)) => Err((status_for(&error), Json(error))),
        Err(_) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(RequestError::BadRequest("plotter task gone".to_string())),
        )),
    }
}

async fn get_status(
    State(plotter_tx): State<AppState>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let (resp_tx, resp_rx) = oneshot::channel();
    if plotter_tx
        .send(PlotterRequest::GetStatus { respond_to: resp_tx })
        .await
        .is_err()
    {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    match resp_rx.await {
        Ok(status) => Ok(Json(status)),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

async fn move_to(
    State(plotter_tx): State<AppState>,
    Json(payload): Json<MoveRequest>,
) -> Result<StatusCode, (StatusCode, Json<RequestError>)> {
    let (resp_tx, resp_rx) = oneshot::channel();
    dispatch(
        &plotter_tx,
        PlotterRequest::MoveTo { x: payload.x, y: payload.y, respond_to: resp_tx },
        resp_rx,
    )
    .await
}

async fn move_z(
    State(plotter_tx): State<AppState>,
    Json(payload): Json<MoveZRequest>,
) -> Result<StatusCode, (StatusCode, Json<RequestError>)> {
    let (resp_tx, resp_rx) = oneshot::channel();
    dispatch(
        &plotter_tx,
        PlotterRequest::MoveZ { z: payload.z, respond_to: resp_tx },
        resp_rx,
    )
    .await
}

async fn home(
    State(plotter_tx): State<AppState>,
) -> Result<StatusCode, (StatusCode, Json<RequestError>)> {
    let (resp_tx, resp_rx) = oneshot::channel();
    dispatch(&plotter_tx, PlotterRequest::Home { respond_to: resp_tx }, resp_rx).await
}

async fn jog(
    State(plotter_tx): State<AppState>,
    Json(payload): Json<JogRequest>,
) -> Result<StatusCode, (StatusCode, Json<RequestError>)> {
    let (resp_tx, resp_rx) = oneshot::channel();
    dispatch(
        &plotter_tx,
        PlotterRequest::Jog {
            actuator: payload.actuator,
            direction: payload.direction,
            steps: payload.steps,
            respond_to: resp_tx,
        },
        resp_rx,
    )
    .await
}

async fn execute_gcode(
    State(plotter_tx): State<AppState>,
    program: String,
) -> Result<StatusCode, (StatusCode, Json<RequestError>)> {
    let (resp_tx, resp_rx) = oneshot::channel();
    dispatch(
        &plotter_tx,
        PlotterRequest::ExecuteGcode { program, respond_to: resp_tx },
        resp_rx,
    )
    .await
}

async fn render_svg(
    State(plotter_tx): State<AppState>,
    Json(tokens): Json<Vec<SvgToken>>,
) -> Result<StatusCode, (StatusCode, Json<RequestError>)> {
    let (resp_tx, resp_rx) = oneshot::channel();
    dispatch(
        &plotter_tx,
        PlotterRequest::RenderSvg { tokens, respond_to: resp_tx },
        resp_rx,
    )
    .await
}

async fn write_text(
    State(plotter_tx): State<AppState>,
    Json(payload): Json<WriteRequest>,
) -> Result<StatusCode, (StatusCode, Json<RequestError>)> {
    let (resp_tx, resp_rx) = oneshot::channel();
    dispatch(
        &plotter_tx,
        PlotterRequest::Write {
            text: payload.text,
            char_height: payload.char_height,
            char_spacing: payload.char_spacing,
            word_spacing: payload.word_spacing,
            x_offset: payload.x_offset,
            y_offset: payload.y_offset,
            respond_to: resp_tx,
        },
        resp_rx,
    )
    .await
}

/// Websocket feed of interactive draw events. Each frame is a JSON
/// `{event, x, y}` object pushed onto the draw queue; the plotter's
/// cooperative tick services them one at a time.
async fn draw_socket(State(plotter_tx): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_draw_socket(socket, plotter_tx))
}

async fn handle_draw_socket(mut socket: WebSocket, plotter_tx: AppState) {
    while let Some(Ok(message)) = socket.recv().await {
        let Message::Text(text) = message else {
            continue;
        };
        match serde_json::from_str::<DrawMessage>(&text) {
            Ok(draw) => {
                let event = DrawEvent { kind: draw.event, x: draw.x, y: draw.y };
                if plotter_tx
                    .send(PlotterRequest::EnqueueDraw { event })
                    .await
                    .is_err()
                {
                    break;
                }
            }
            Err(e) => {
                tracing::debug!("ignoring malformed draw message: {}", e);
            }
        }
    }
}
