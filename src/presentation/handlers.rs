// HTTP request handlers
use crate::application::household_repository::HouseholdError;
use crate::domain::device::{Device, DeviceKind};
use crate::domain::layout::CardSize;
use crate::domain::profile::ProfileUpdate;
use crate::domain::resize::Displacement;
use crate::domain::water_tank::TankConfig;
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use crate::presentation::identity::Caller;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

type ApiResult = Result<Response, ApiError>;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDevice {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DeviceKind,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub size: Option<CardSize>,
}

#[derive(Deserialize)]
pub struct SizeBody {
    pub size: CardSize,
}

#[derive(Deserialize)]
pub struct VisibilityBody {
    pub visible: bool,
}

#[derive(Deserialize)]
pub struct NameBody {
    pub name: String,
}

#[derive(Deserialize)]
pub struct RoomBody {
    pub room: String,
}

#[derive(Deserialize)]
pub struct EditingBody {
    pub editing: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteBody {
    pub email: String,
    pub home_name: String,
}

#[derive(Deserialize)]
pub struct RespondBody {
    pub accept: bool,
}

#[derive(Serialize)]
pub struct Prediction {
    pub predicted: Option<CardSize>,
}

/// Plain JSON, Brotli-compressed when the client asks for it
async fn reply<T: Serialize>(status: StatusCode, headers: &HeaderMap, data: &T) -> Response {
    match json_response(status, data, accepts_brotli(headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

// ---- devices ----

pub async fn list_devices(
    Path(home_id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> ApiResult {
    let devices = state.device_service.list_devices(&home_id).await?;
    Ok(reply(StatusCode::OK, &headers, &devices).await)
}

pub async fn add_device(
    Path(home_id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewDevice>,
) -> ApiResult {
    let mut device = Device::new(String::new(), body.name, body.kind);
    device.room = body.room;
    device.mac_address = body.mac_address;
    device.size = body.size;
    match Caller::from_headers(&headers) {
        Ok(Caller(user)) => device.owner_email = Some(user.email),
        Err(e) => tracing::debug!("Adding device to home {} without an owner: {}", home_id, e),
    }

    let device = state.device_service.add_device(&home_id, device).await?;
    Ok(reply(StatusCode::CREATED, &headers, &device).await)
}

pub async fn list_rooms(
    Path(home_id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> ApiResult {
    let rooms = state.device_service.rooms(&home_id).await?;
    Ok(reply(StatusCode::OK, &headers, &rooms).await)
}

pub async fn toggle_device(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> ApiResult {
    let device = state.device_service.toggle(&id).await?;
    Ok(reply(StatusCode::OK, &headers, &device).await)
}

pub async fn set_size(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(body): Json<SizeBody>,
) -> ApiResult {
    let device = state.device_service.set_size(&id, body.size).await?;
    Ok(reply(StatusCode::OK, &headers, &device).await)
}

pub async fn cycle_size(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> ApiResult {
    let device = state.device_service.cycle_size(&id).await?;
    Ok(reply(StatusCode::OK, &headers, &device).await)
}

pub async fn set_visibility(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(body): Json<VisibilityBody>,
) -> ApiResult {
    let device = state.device_service.set_visibility(&id, body.visible).await?;
    Ok(reply(StatusCode::OK, &headers, &device).await)
}

pub async fn rename_device(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(body): Json<NameBody>,
) -> ApiResult {
    let device = state.device_service.rename(&id, &body.name).await?;
    Ok(reply(StatusCode::OK, &headers, &device).await)
}

pub async fn move_device(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(body): Json<RoomBody>,
) -> ApiResult {
    let device = state.device_service.move_to_room(&id, &body.room).await?;
    Ok(reply(StatusCode::OK, &headers, &device).await)
}

pub async fn configure_tank(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(body): Json<TankConfig>,
) -> ApiResult {
    let device = state.device_service.configure_tank(&id, body).await?;
    Ok(reply(StatusCode::OK, &headers, &device).await)
}

pub async fn tank_level(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> ApiResult {
    let level = state
        .device_service
        .tank_level(&id, &state.tank_defaults)
        .await?;
    Ok(reply(StatusCode::OK, &headers, &level).await)
}

/// Accepted once the reset is requested; removal follows after the grace period
pub async fn delete_device(Path(id): Path<String>, State(state): State<Arc<AppState>>) -> ApiResult {
    state.device_service.delete(&id).await?;
    Ok(StatusCode::ACCEPTED.into_response())
}

// ---- dashboard ----

pub async fn get_dashboard(
    Path(home_id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> ApiResult {
    let layout = state.dashboard_service.get_dashboard(&home_id).await?;
    Ok(reply(StatusCode::OK, &headers, &layout).await)
}

/// Live dashboard: one length-prefixed chunk per layout pass
pub async fn stream_dashboard(
    Path(home_id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let rx = state.streaming_service.stream_dashboard(&home_id);
    stream_from_receiver(rx, accepts_brotli(&headers))
}

pub async fn predict_size(State(state): State<Arc<AppState>>, Json(body): Json<Displacement>) -> Json<Prediction> {
    Json(Prediction {
        predicted: state.editing_service.predictor().predict(body),
    })
}

pub async fn set_editing(
    Path(home_id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(body): Json<EditingBody>,
) -> ApiResult {
    let rows = state
        .editing_service
        .set_editing(&home_id, body.editing)
        .await?;
    Ok(reply(StatusCode::OK, &headers, &rows).await)
}

pub async fn editing_layout(
    Path(home_id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> ApiResult {
    let rows = state.editing_service.layout(&home_id).await?;
    Ok(reply(StatusCode::OK, &headers, &rows).await)
}

pub async fn drag_start(
    Path((home_id, card_id)): Path<(String, String)>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> ApiResult {
    let preview = state.editing_service.drag_start(&home_id, &card_id).await?;
    Ok(reply(StatusCode::OK, &headers, &preview).await)
}

pub async fn drag_move(
    Path((home_id, card_id)): Path<(String, String)>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(body): Json<Displacement>,
) -> ApiResult {
    let preview = state
        .editing_service
        .drag_move(&home_id, &card_id, body)
        .await?;
    Ok(reply(StatusCode::OK, &headers, &preview).await)
}

pub async fn drag_end(
    Path((home_id, card_id)): Path<(String, String)>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> ApiResult {
    let outcome = state.editing_service.drag_end(&home_id, &card_id).await?;
    Ok(reply(StatusCode::OK, &headers, &outcome).await)
}

pub async fn drag_cancel(
    Path((home_id, card_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult {
    state.editing_service.drag_cancel(&home_id, &card_id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

// ---- household ----

pub async fn list_homes(
    Caller(user): Caller,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> ApiResult {
    state.household_service.register(&user).await?;
    let homes = state.household_service.homes(&user).await?;
    Ok(reply(StatusCode::OK, &headers, &homes).await)
}

pub async fn list_members(
    Path(home_id): Path<String>,
    Caller(user): Caller,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> ApiResult {
    state.household_service.register(&user).await?;
    let roster = state.household_service.roster(&user, &home_id).await?;
    Ok(reply(StatusCode::OK, &headers, &roster).await)
}

pub async fn rename_home(
    Path(home_id): Path<String>,
    Caller(user): Caller,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(body): Json<NameBody>,
) -> ApiResult {
    if home_id != user.uid {
        return Err(HouseholdError::NotOwner(home_id).into());
    }
    let household = state.household_service.rename_home(&user, &body.name).await?;
    Ok(reply(StatusCode::OK, &headers, &household).await)
}

pub async fn remove_member(
    Path((home_id, email)): Path<(String, String)>,
    Caller(user): Caller,
    State(state): State<Arc<AppState>>,
) -> ApiResult {
    state
        .household_service
        .remove_member(&user, &home_id, &email)
        .await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn leave_home(
    Path(home_id): Path<String>,
    Caller(user): Caller,
    State(state): State<Arc<AppState>>,
) -> ApiResult {
    state.household_service.leave_home(&user, &home_id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn send_invite(
    Caller(user): Caller,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(body): Json<InviteBody>,
) -> ApiResult {
    state.household_service.register(&user).await?;
    let invitation = state
        .household_service
        .send_invite(&user, &body.email, &body.home_name)
        .await?;
    Ok(reply(StatusCode::CREATED, &headers, &invitation).await)
}

pub async fn incoming_invites(
    Caller(user): Caller,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> ApiResult {
    state.household_service.register(&user).await?;
    let invites = state.household_service.incoming_invites(&user).await?;
    Ok(reply(StatusCode::OK, &headers, &invites).await)
}

pub async fn respond_invite(
    Path(id): Path<String>,
    Caller(user): Caller,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(body): Json<RespondBody>,
) -> ApiResult {
    state.household_service.register(&user).await?;
    let invitation = state
        .household_service
        .respond(&user, &id, body.accept)
        .await?;
    Ok(reply(StatusCode::OK, &headers, &invitation).await)
}

// ---- profile ----

pub async fn get_profile(
    Caller(user): Caller,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> ApiResult {
    let profile = state.household_service.profile(&user).await?;
    Ok(reply(StatusCode::OK, &headers, &profile).await)
}

pub async fn update_profile(
    Caller(user): Caller,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(body): Json<ProfileUpdate>,
) -> ApiResult {
    state.household_service.register(&user).await?;
    let profile = state.household_service.update_profile(&user, body).await?;
    Ok(reply(StatusCode::OK, &headers, &profile).await)
}
