//! Continuous position watch driver.
//!
//! A tracking session consumes the events a device's position watch produces
//! and feeds every fix through [`LocationService::upsert`], in arrival order.
//! What the tracking view would display is published on a `watch` channel.
//!
//! A failed write is logged and the displayed status keeps the last good
//! coordinates. Nothing is retried: the next fix carries the same intent, so
//! the record converges as long as fixes keep arriving.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::application::services::LocationService;
use crate::domain::entities::DeviceMetadata;
use crate::domain::position_event::{PositionEvent, TrackStatus};
use crate::domain::repositories::LocationRepository;

/// One device's tracking view: who is reporting and with what metadata.
pub struct TrackingSession<R: LocationRepository + ?Sized> {
    service: Arc<LocationService<R>>,
    device_id: String,
    metadata: DeviceMetadata,
}

impl<R: LocationRepository + ?Sized> TrackingSession<R> {
    pub fn new(
        service: Arc<LocationService<R>>,
        device_id: impl Into<String>,
        metadata: DeviceMetadata,
    ) -> Self {
        Self {
            service,
            device_id: device_id.into(),
            metadata,
        }
    }

    /// Handles one watch callback and updates the displayed status.
    ///
    /// Geolocation errors never reach storage.
    pub async fn handle(&self, event: PositionEvent, status: &watch::Sender<TrackStatus>) {
        match event {
            PositionEvent::Fix(sample) => {
                match self
                    .service
                    .upsert(&self.device_id, sample, self.metadata.clone())
                    .await
                {
                    Ok(_) => {
                        status.send_replace(TrackStatus::located(&sample));
                    }
                    Err(e) => {
                        tracing::error!(
                            device_id = %self.device_id,
                            error = %e,
                            "Error updating location"
                        );
                    }
                }
            }
            PositionEvent::Error(error) => {
                tracing::warn!(device_id = %self.device_id, ?error, "Geolocation error");
                status.send_replace(TrackStatus::from_error(&error));
            }
        }
    }
}

/// Runs a tracking session until the event stream ends or `cancel` fires.
///
/// The status starts at [`TrackStatus::Fetching`]. Closing the event channel
/// models the watch being cleared; flipping `cancel` to `true` (or dropping
/// its sender) models the view being unmounted.
pub async fn run_tracking_session<R: LocationRepository + ?Sized>(
    session: TrackingSession<R>,
    mut events: mpsc::Receiver<PositionEvent>,
    status: watch::Sender<TrackStatus>,
    mut cancel: watch::Receiver<bool>,
) {
    status.send_replace(TrackStatus::Fetching);
    tracing::info!(device_id = %session.device_id, "Tracking session started");

    if *cancel.borrow() {
        tracing::info!(device_id = %session.device_id, "Tracking session cancelled");
        return;
    }

    loop {
        tokio::select! {
            biased;

            changed = cancel.changed() => {
                if changed.is_err() || *cancel.borrow() {
                    tracing::info!(device_id = %session.device_id, "Tracking session cancelled");
                    break;
                }
            }
            event = events.recv() => {
                let Some(event) = event else {
                    tracing::info!(device_id = %session.device_id, "Position watch cleared");
                    break;
                };
                session.handle(event, &status).await;
            }
        }
    }
}
