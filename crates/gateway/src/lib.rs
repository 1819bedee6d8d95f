//! HTTP gateway for Discord interactions.
//!
//! Discord POSTs every slash command and modal submission to
//! `/interactions`. The handler verifies the request signature, answers
//! PINGs, and hands commands to the controller. The controller's first
//! answer (reply, deferral) becomes the HTTP response; when it defers, the
//! rest of the pipeline keeps running after the response has gone out.
//! A controller that misses [`INITIAL_RESPONSE_DEADLINE`] is deferred for
//! and its reply delivered as a followup.
//!
//! Built on Axum.

use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use ironlog_channels::interaction::{Interaction, InteractionResponse, kind};
use ironlog_channels::signature::{SIGNATURE_HEADER, SignatureVerifier, TIMESTAMP_HEADER};
use ironlog_channels::slash::SlashRequest;
use ironlog_channels::{FollowupSink, InteractionResponder, commands, modal, slash};
use ironlog_coach::Controller;
use ironlog_coach::messages::GENERIC_ERROR;
use ironlog_core::interaction::{Invocation, Room};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Discord's window for the initial response.
pub const INITIAL_RESPONSE_DEADLINE: Duration = Duration::from_secs(3);

/// Shared application state for the gateway.
pub struct GatewayState {
    pub controller: Arc<Controller>,
    pub verifier: SignatureVerifier,
    pub followups: Arc<dyn FollowupSink>,
    /// How long the handler waits for the controller's first answer.
    pub initial_deadline: Duration,
}

impl GatewayState {
    pub fn new(
        controller: Arc<Controller>,
        verifier: SignatureVerifier,
        followups: Arc<dyn FollowupSink>,
    ) -> Self {
        Self {
            controller,
            verifier,
            followups,
            initial_deadline: INITIAL_RESPONSE_DEADLINE,
        }
    }
}

type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/interactions", post(interactions_handler))
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn serve(
    listener: tokio::net::TcpListener,
    state: SharedState,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!(addr = %addr, "Gateway listening for interactions");
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn interactions_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    let timestamp = headers.get(TIMESTAMP_HEADER).and_then(|v| v.to_str().ok());
    let (Some(signature), Some(timestamp)) = (signature, timestamp) else {
        warn!("Interaction without signature headers");
        return (StatusCode::UNAUTHORIZED, "missing request signature").into_response();
    };
    if !state.verifier.verify(timestamp, &body, signature) {
        warn!("Interaction with invalid signature");
        return (StatusCode::UNAUTHORIZED, "invalid request signature").into_response();
    }

    let interaction: Interaction = match serde_json::from_slice(&body) {
        Ok(interaction) => interaction,
        Err(e) => {
            warn!(error = %e, "Unparseable interaction");
            return (StatusCode::BAD_REQUEST, "invalid interaction").into_response();
        }
    };
    debug!(id = %interaction.id, kind = interaction.kind, "Interaction received");

    match interaction.kind {
        kind::PING => Json(InteractionResponse::pong()).into_response(),
        kind::APPLICATION_COMMAND => match slash::parse(&interaction) {
            Ok(SlashRequest::Invoke(invocation)) => {
                dispatch(&state, &interaction, invocation).await
            }
            Ok(SlashRequest::OpenDiaryModal {
                channel_id,
                user_id,
            }) => open_diary_modal(&state, &channel_id, &user_id),
            Err(e) => unusable(&interaction, e),
        },
        kind::MODAL_SUBMIT => match modal::parse(&interaction) {
            Ok(invocation) => dispatch(&state, &interaction, invocation).await,
            Err(e) => unusable(&interaction, e),
        },
        other => {
            warn!(kind = other, "Unsupported interaction type");
            (StatusCode::BAD_REQUEST, "unsupported interaction type").into_response()
        }
    }
}

/// Run the controller in its own task and return its first answer.
async fn dispatch(
    state: &GatewayState,
    interaction: &Interaction,
    invocation: Invocation,
) -> Response {
    let (responder, initial) =
        InteractionResponder::new(state.followups.clone(), interaction.token.clone());
    let controller = state.controller.clone();

    tokio::spawn(async move {
        controller.handle(&invocation, &responder).await;
    });

    // Past the deadline the interaction is deferred and the controller's
    // answer arrives as a followup.
    match initial.resolve(state.initial_deadline).await {
        Some(response) => Json(response).into_response(),
        None => {
            error!(id = %interaction.id, "Controller finished without an initial response");
            generic_error()
        }
    }
}

/// The diary form, or the private rejection notice outside the diary channel.
fn open_diary_modal(state: &GatewayState, channel_id: &str, user_id: &str) -> Response {
    match state
        .controller
        .out_of_scope(Room::Diary, "diary", channel_id, user_id)
    {
        Some(notice) => Json(InteractionResponse::message(&notice, true)).into_response(),
        None => Json(InteractionResponse::modal(commands::diary_modal())).into_response(),
    }
}

fn unusable(interaction: &Interaction, e: ironlog_core::error::ChannelError) -> Response {
    warn!(id = %interaction.id, error = %e, "Interaction could not be parsed into a command");
    generic_error()
}

fn generic_error() -> Response {
    Json(InteractionResponse::message(GENERIC_ERROR, true)).into_response()
}
