//! Events produced by a device's continuous position watch.

use std::fmt;
use std::str::FromStr;

use super::entities::PositionSample;

/// Why the platform could not deliver a fix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeolocationError {
    PermissionDenied(String),
    Unavailable(String),
    Timeout(String),
    /// The platform has no geolocation capability at all.
    Unsupported,
}

impl GeolocationError {
    /// Builds an error from the W3C `GeolocationPositionError.code`.
    pub fn from_code(code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            1 => Self::PermissionDenied(message),
            3 => Self::Timeout(message),
            _ => Self::Unavailable(message),
        }
    }
}

/// One callback from the position watch: either a fix or an error.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionEvent {
    Fix(PositionSample),
    Error(GeolocationError),
}

/// Why a replay line could not be read as a [`PositionEvent`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid position event '{0}': expected 'LAT,LNG', 'error CODE MESSAGE' or 'unsupported'")]
pub struct ParsePositionEventError(String);

/// Reads one line of a recorded position watch.
///
/// ```text
/// 10.0,20.0
/// error 1 User denied Geolocation
/// unsupported
/// ```
///
/// Coordinates are not range-checked here; the reconciler rejects them.
impl FromStr for PositionEvent {
    type Err = ParsePositionEventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        let invalid = || ParsePositionEventError(line.to_string());

        if line.eq_ignore_ascii_case("unsupported") {
            return Ok(Self::Error(GeolocationError::Unsupported));
        }

        if let Some(rest) = line.strip_prefix("error ") {
            let (code, message) = rest.trim().split_once(' ').unwrap_or((rest.trim(), ""));
            let code = code.parse().map_err(|_| invalid())?;
            return Ok(Self::Error(GeolocationError::from_code(code, message.trim())));
        }

        let (lat, lng) = line.split_once(',').ok_or_else(invalid)?;
        let latitude = lat.trim().parse().map_err(|_| invalid())?;
        let longitude = lng.trim().parse().map_err(|_| invalid())?;

        Ok(Self::Fix(PositionSample::new(latitude, longitude)))
    }
}

/// What a tracking view displays in place of coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackStatus {
    Fetching,
    Located { latitude: f64, longitude: f64 },
    Failed(String),
    Unsupported,
}

impl TrackStatus {
    pub fn from_error(error: &GeolocationError) -> Self {
        match error {
            GeolocationError::PermissionDenied(message)
            | GeolocationError::Unavailable(message)
            | GeolocationError::Timeout(message) => Self::Failed(message.clone()),
            GeolocationError::Unsupported => Self::Unsupported,
        }
    }

    pub fn located(sample: &PositionSample) -> Self {
        Self::Located {
            latitude: sample.latitude,
            longitude: sample.longitude,
        }
    }
}

impl fmt::Display for TrackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackStatus::Fetching => write!(f, "Fetching location..."),
            TrackStatus::Located {
                latitude,
                longitude,
            } => write!(f, "Latitude: {:.6}, Longitude: {:.6}", latitude, longitude),
            TrackStatus::Failed(message) => write!(f, "Error: {}", message),
            TrackStatus::Unsupported => {
                write!(f, "Geolocation is not supported by this browser.")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(TrackStatus::Fetching.to_string(), "Fetching location...");
        assert_eq!(
            TrackStatus::located(&PositionSample::new(10.0, 20.0)).to_string(),
            "Latitude: 10.000000, Longitude: 20.000000"
        );
        assert_eq!(
            TrackStatus::Failed("User denied Geolocation".to_string()).to_string(),
            "Error: User denied Geolocation"
        );
        assert_eq!(
            TrackStatus::Unsupported.to_string(),
            "Geolocation is not supported by this browser."
        );
    }

    #[test]
    fn test_from_code() {
        assert_eq!(
            GeolocationError::from_code(1, "denied"),
            GeolocationError::PermissionDenied("denied".to_string())
        );
        assert_eq!(
            GeolocationError::from_code(2, "no signal"),
            GeolocationError::Unavailable("no signal".to_string())
        );
        assert_eq!(
            GeolocationError::from_code(3, "slow"),
            GeolocationError::Timeout("slow".to_string())
        );
    }

    #[test]
    fn test_status_from_error() {
        let status = TrackStatus::from_error(&GeolocationError::PermissionDenied(
            "User denied Geolocation".to_string(),
        ));
        assert_eq!(status.to_string(), "Error: User denied Geolocation");

        assert_eq!(
            TrackStatus::from_error(&GeolocationError::Unsupported),
            TrackStatus::Unsupported
        );
    }

    #[test]
    fn test_parse_events() {
        assert_eq!(
            " 10.5, -20.25 ".parse::<PositionEvent>().unwrap(),
            PositionEvent::Fix(PositionSample::new(10.5, -20.25))
        );
        assert_eq!(
            "error 1 User denied Geolocation"
                .parse::<PositionEvent>()
                .unwrap(),
            PositionEvent::Error(GeolocationError::PermissionDenied(
                "User denied Geolocation".to_string()
            ))
        );
        assert_eq!(
            "unsupported".parse::<PositionEvent>().unwrap(),
            PositionEvent::Error(GeolocationError::Unsupported)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("10.0".parse::<PositionEvent>().is_err());
        assert!("north,south".parse::<PositionEvent>().is_err());
        assert!("error x denied".parse::<PositionEvent>().is_err());
    }
}
