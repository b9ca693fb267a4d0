//! Barcode scanner session for batch lookups.
//!
//! Camera access and decoding live in the webview; the backend tracks the
//! scan lifecycle and turns camera failures into readable messages.

use log::{info, warn};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "camelCase", tag = "kind", content = "detail")]
pub enum ScanError {
    #[error("Camera permission was denied. Allow camera access and try again.")]
    PermissionDenied,
    #[error("No camera was found on this device.")]
    DeviceNotFound,
    #[error("The camera is already in use by another application.")]
    DeviceBusy,
    #[error("Could not start the camera: {0}")]
    Other(String),
}

impl ScanError {
    /// Maps a media-stream error name (`NotAllowedError`, ...) to a category.
    pub fn from_error_name(name: &str, detail: &str) -> Self {
        match name {
            "NotAllowedError" | "PermissionDeniedError" | "SecurityError" => {
                ScanError::PermissionDenied
            }
            "NotFoundError" | "DevicesNotFoundError" | "OverconstrainedError" => {
                ScanError::DeviceNotFound
            }
            "NotReadableError" | "TrackStartError" | "AbortError" => ScanError::DeviceBusy,
            _ if detail.trim().is_empty() => ScanError::Other(name.to_string()),
            _ => ScanError::Other(detail.trim().to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum ScannerState {
    Idle,
    Scanning,
    Detected { code: String },
    Failed { error: ScanError, message: String },
}

impl Default for ScannerState {
    fn default() -> Self {
        ScannerState::Idle
    }
}

#[derive(Debug, Default)]
pub struct BarcodeScanner {
    state: ScannerState,
}

impl BarcodeScanner {
    pub fn state(&self) -> &ScannerState {
        &self.state
    }

    pub fn start(&mut self) -> &ScannerState {
        self.state = ScannerState::Scanning;
        &self.state
    }

    pub fn stop(&mut self) -> &ScannerState {
        if self.state == ScannerState::Scanning {
            self.state = ScannerState::Idle;
        }
        &self.state
    }

    /// Accepts the first non-blank code seen while scanning and stops.
    pub fn on_detect(&mut self, code: &str) -> Option<String> {
        if self.state != ScannerState::Scanning {
            return None;
        }
        let code = code.trim();
        if code.is_empty() {
            return None;
        }

        info!("Barcode detected: {code}");
        self.state = ScannerState::Detected {
            code: code.to_string(),
        };
        Some(code.to_string())
    }

    pub fn on_error(&mut self, name: &str, detail: &str) -> &ScannerState {
        let error = ScanError::from_error_name(name, detail);
        warn!("Camera error {name}: {detail}");
        self.state = ScannerState::Failed {
            message: error.to_string(),
            error,
        };
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_names_are_categorized() {
        assert_eq!(
            ScanError::from_error_name("NotAllowedError", "Permission denied"),
            ScanError::PermissionDenied
        );
        assert_eq!(
            ScanError::from_error_name("NotFoundError", ""),
            ScanError::DeviceNotFound
        );
        assert_eq!(
            ScanError::from_error_name("NotReadableError", "Could not start video source"),
            ScanError::DeviceBusy
        );
        assert_eq!(
            ScanError::from_error_name("TypeError", "constraints invalid"),
            ScanError::Other("constraints invalid".into())
        );
        assert_eq!(
            ScanError::from_error_name("WeirdError", " "),
            ScanError::Other("WeirdError".into())
        );
    }

    #[test]
    fn first_detection_wins_and_stops_scanning() {
        let mut scanner = BarcodeScanner::default();
        assert_eq!(scanner.on_detect("B-1001"), None);

        scanner.start();
        assert_eq!(scanner.on_detect("   "), None);
        assert_eq!(scanner.on_detect(" B-1001 ").as_deref(), Some("B-1001"));
        assert_eq!(scanner.on_detect("B-1002"), None);
        assert_eq!(
            scanner.state(),
            &ScannerState::Detected {
                code: "B-1001".into()
            }
        );
    }

    #[test]
    fn stop_only_affects_active_scan() {
        let mut scanner = BarcodeScanner::default();
        scanner.start();
        assert_eq!(scanner.stop(), &ScannerState::Idle);

        scanner.on_error("NotAllowedError", "");
        assert!(matches!(scanner.stop(), ScannerState::Failed { .. }));
    }

    #[test]
    fn failure_carries_readable_message() {
        let mut scanner = BarcodeScanner::default();
        scanner.start();
        let state = scanner.on_error("NotFoundError", "Requested device not found").clone();
        assert_eq!(
            state,
            ScannerState::Failed {
                error: ScanError::DeviceNotFound,
                message: "No camera was found on this device.".into(),
            }
        );
    }
}
