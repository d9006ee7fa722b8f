// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::device_service::DeviceService;
use crate::application::editing_service::EditingService;
use crate::application::household_service::HouseholdService;
use crate::application::streaming_service::StreamingDashboardService;
use crate::domain::water_tank::TankDefaults;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub device_service: DeviceService,
    pub dashboard_service: DashboardService,
    pub editing_service: Arc<EditingService>,
    pub streaming_service: StreamingDashboardService,
    pub household_service: HouseholdService,
    pub tank_defaults: TankDefaults,
}
