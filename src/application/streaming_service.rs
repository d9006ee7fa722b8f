// Streaming dashboard service - Pushes a fresh layout whenever a home changes
use crate::application::dashboard_service::{DashboardLayout, DashboardService};
use crate::application::device_registry::{DeviceRegistry, RegistryEvent};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, mpsc};

const STREAM_BUFFER: usize = 16;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StreamMessage {
    Layout {
        sequence: u64,
        layout: DashboardLayout,
    },
    Error {
        message: String,
    },
}

#[derive(Clone)]
pub struct StreamingDashboardService {
    registry: Arc<dyn DeviceRegistry>,
    dashboard_service: DashboardService,
}

impl StreamingDashboardService {
    pub fn new(registry: Arc<dyn DeviceRegistry>, dashboard_service: DashboardService) -> Self {
        Self {
            registry,
            dashboard_service,
        }
    }

    /// First message is the current layout; later ones follow registry changes.
    /// The background task ends once the receiver is dropped.
    pub fn stream_dashboard(&self, home_id: &str) -> mpsc::Receiver<StreamMessage> {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        // subscribe before the first pass so no change slips in between
        let mut events = self.registry.subscribe();
        let service = self.dashboard_service.clone();
        let home_id = home_id.to_string();

        tokio::spawn(async move {
            let started = Instant::now();
            let mut sequence = 0u64;

            loop {
                let message = match service.get_dashboard(&home_id).await {
                    Ok(layout) => StreamMessage::Layout { sequence, layout },
                    Err(e) => {
                        tracing::error!("Failed to lay out dashboard for {}: {}", home_id, e);
                        StreamMessage::Error {
                            message: e.to_string(),
                        }
                    }
                };
                if tx.send(message).await.is_err() {
                    break;
                }
                sequence += 1;

                tokio::select! {
                    changed = wait_for_change(&mut events, &home_id) => {
                        if !changed {
                            break;
                        }
                    }
                    _ = tx.closed() => break,
                }
            }

            tracing::debug!(
                "Dashboard stream for {} closed after {} updates ({} ms)",
                home_id,
                sequence,
                started.elapsed().as_millis()
            );
        });

        rx
    }
}

/// Block until the home changes. Returns false once the registry is gone.
async fn wait_for_change(events: &mut broadcast::Receiver<RegistryEvent>, home_id: &str) -> bool {
    loop {
        match events.recv().await {
            Ok(event) if event.home_id == home_id => return true,
            Ok(_) => continue,
            // missed events may include ours, so recompute
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!("Dashboard stream for {} lagged by {} events", home_id, skipped);
                return true;
            }
            Err(broadcast::error::RecvError::Closed) => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::device_registry::DeviceUpdate;
    use crate::domain::device::{Device, DeviceKind};
    use crate::domain::layout::{CardMetrics, CardSize, Row};
    use crate::domain::water_tank::TankDefaults;
    use crate::infrastructure::memory_registry::InMemoryDeviceRegistry;

    #[tokio::test]
    async fn test_stream_pushes_layout_on_change() {
        let mut lamp = Device::new("lamp", "Lamp", DeviceKind::Light);
        lamp.home_id = Some("h1".to_string());
        let registry = Arc::new(InMemoryDeviceRegistry::with_devices(vec![lamp]));
        let dashboard = DashboardService::new(registry.clone(), CardMetrics::default(), TankDefaults::default());
        let service = StreamingDashboardService::new(registry.clone(), dashboard);

        let mut rx = service.stream_dashboard("h1");

        match rx.recv().await.unwrap() {
            StreamMessage::Layout { sequence, layout } => {
                assert_eq!(sequence, 0);
                assert!(matches!(layout.rows[0], Row::Paired { .. }));
            }
            other => panic!("unexpected message {:?}", other),
        }

        registry
            .update_device("lamp", DeviceUpdate::Size(CardSize::Big))
            .await
            .unwrap();

        match rx.recv().await.unwrap() {
            StreamMessage::Layout { sequence, layout } => {
                assert_eq!(sequence, 1);
                assert!(matches!(layout.rows[0], Row::FullWidth { .. }));
            }
            other => panic!("unexpected message {:?}", other),
        }
    }
}
