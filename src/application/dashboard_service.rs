// Dashboard service - Use case for laying out a home's dashboard
use crate::application::device_registry::{DeviceRegistry, RegistryError};
use crate::domain::device::{Device, DeviceKind};
use crate::domain::layout::{partition, CardMetrics, CardSize, Frame, Row};
use crate::domain::water_tank::{TankDefaults, TankLevel};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    pub id: String,
    pub name: String,
    pub kind: DeviceKind,
    pub size: CardSize,
    pub frame: Frame,
    pub icon: &'static str,
    pub status: String,
    pub is_active: bool,
    pub room: String,
    pub mac_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tank: Option<TankCardView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TankCardView {
    pub percentage: i64,
    pub volume: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardLayout {
    pub home_id: String,
    pub rows: Vec<Row<CardView>>,
}

#[derive(Clone)]
pub struct DashboardService {
    registry: Arc<dyn DeviceRegistry>,
    metrics: CardMetrics,
    tank_defaults: TankDefaults,
}

impl DashboardService {
    pub fn new(registry: Arc<dyn DeviceRegistry>, metrics: CardMetrics, tank_defaults: TankDefaults) -> Self {
        Self {
            registry,
            metrics,
            tank_defaults,
        }
    }

    pub async fn get_dashboard(&self, home_id: &str) -> Result<DashboardLayout, RegistryError> {
        let devices = self.registry.list_devices(home_id).await?;
        Ok(self.layout(home_id, devices))
    }

    /// Lay out the visible subset of `devices`, keeping their order
    pub fn layout(&self, home_id: &str, devices: Vec<Device>) -> DashboardLayout {
        let visible = devices.into_iter().filter(Device::is_visible);
        let rows: Vec<Row<CardView>> = partition(visible)
            .into_iter()
            .map(|row| row.map(|device| self.card_view(device)))
            .collect();

        tracing::debug!("Laid out {} rows for home {}", rows.len(), home_id);

        DashboardLayout {
            home_id: home_id.to_string(),
            rows,
        }
    }

    fn card_view(&self, device: Device) -> CardView {
        let size = device.effective_size();
        let tank = (device.kind == DeviceKind::WaterSensor).then(|| {
            let level = TankLevel::for_device(&device, &self.tank_defaults);
            TankCardView {
                percentage: level.whole_percent(),
                volume: level.volume_label(),
            }
        });

        CardView {
            frame: size.frame(&self.metrics),
            icon: device.icon(),
            status: device.status_text(),
            room: device.room_label().to_string(),
            mac_address: device.mac_label().to_string(),
            is_active: device.is_active,
            id: device.id,
            name: device.name,
            kind: device.kind,
            size,
            tank,
        }
    }
}
