// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::path::Path;
use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::application::device_service::DeviceService;
use crate::application::editing_service::EditingService;
use crate::application::household_service::HouseholdService;
use crate::application::streaming_service::StreamingDashboardService;
use crate::domain::resize::ResizePredictor;
use crate::infrastructure::config::{load_app_config, load_seed_data};
use crate::infrastructure::memory_household::InMemoryHouseholdStore;
use crate::infrastructure::memory_registry::InMemoryDeviceRegistry;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_app_config()?;
    let seed = load_seed_data(Path::new(&config.registry.seed))?;
    tracing::info!(
        "Loaded {} devices and {} households from seed",
        seed.devices.len(),
        seed.households.len()
    );

    // Create stores (infrastructure layer)
    let registry = Arc::new(InMemoryDeviceRegistry::with_devices(seed.devices));
    let households = Arc::new(InMemoryHouseholdStore::with_households(seed.households));

    // Create services (application layer)
    let dashboard_service = DashboardService::new(registry.clone(), config.layout.metrics(), config.tank);
    let device_service = DeviceService::new(
        registry.clone(),
        Duration::from_millis(config.registry.reset_grace_ms),
    );
    let editing_service = EditingService::new(
        registry.clone(),
        ResizePredictor::new(config.layout.sensitivity),
    );
    let streaming_service = StreamingDashboardService::new(registry.clone(), dashboard_service.clone());
    let household_service = HouseholdService::new(households);

    // Create application state
    let state = Arc::new(AppState {
        device_service,
        dashboard_service,
        editing_service: Arc::new(editing_service),
        streaming_service,
        household_service,
        tank_defaults: config.tank,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/homes/:home_id/devices", get(list_devices).post(add_device))
        .route("/homes/:home_id/rooms", get(list_rooms))
        .route("/homes/:home_id/dashboard", get(get_dashboard))
        .route("/homes/:home_id/dashboard/stream", get(stream_dashboard))
        .route("/homes", get(list_homes))
        .route("/homes/:home_id/editing", get(editing_layout).put(set_editing))
        .route("/homes/:home_id/cards/:card_id/drag/start", post(drag_start))
        .route("/homes/:home_id/cards/:card_id/drag/move", post(drag_move))
        .route("/homes/:home_id/cards/:card_id/drag/end", post(drag_end))
        .route("/homes/:home_id/cards/:card_id/drag/cancel", post(drag_cancel))
        .route("/homes/:home_id/members", get(list_members))
        .route("/homes/:home_id/members/:email", delete(remove_member))
        .route("/homes/:home_id/name", put(rename_home))
        .route("/homes/:home_id/leave", post(leave_home))
        .route("/devices/:id", delete(delete_device))
        .route("/devices/:id/toggle", post(toggle_device))
        .route("/devices/:id/size", put(set_size))
        .route("/devices/:id/cycle-size", post(cycle_size))
        .route("/devices/:id/visibility", put(set_visibility))
        .route("/devices/:id/name", put(rename_device))
        .route("/devices/:id/room", put(move_device))
        .route("/devices/:id/tank", get(tank_level).put(configure_tank))
        .route("/layout/predict", post(predict_size))
        .route("/profile", get(get_profile).put(update_profile))
        .route("/invites", get(incoming_invites).post(send_invite))
        .route("/invites/:id/respond", post(respond_invite))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!("Starting home-dashboard service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
