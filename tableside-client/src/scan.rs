//! QR scanning
//!
//! [`ScanAdapter`] wraps a camera decoder. A scan session starts the
//! decoder, returns the first decoded payload and stops the decoder on
//! every exit path, including when the scan future is dropped.

use async_trait::async_trait;
use shared::ErrorCode;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard, mpsc};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("camera streaming is not supported")]
    Unsupported,
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("no camera found")]
    CameraNotFound,
    #[error("camera failed to start: {0}")]
    StartFailed(String),
    #[error("decoder stopped before a code was read")]
    Interrupted,
}

impl ScanError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ScanError::Unsupported => {
                "Camera streaming not supported by the browser. Please enter the table PIN instead."
            }
            ScanError::PermissionDenied => {
                "Camera permission denied. Please allow camera access and try again."
            }
            ScanError::CameraNotFound => "Camera not found. Please ensure your device has a camera.",
            ScanError::StartFailed(_) => {
                "Failed to start camera. Please ensure camera permissions are granted and try again."
            }
            ScanError::Interrupted => "Camera stopped unexpectedly. Please try scanning again.",
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ScanError::Unsupported => ErrorCode::CameraUnsupported,
            ScanError::PermissionDenied => ErrorCode::CameraPermissionDenied,
            ScanError::CameraNotFound => ErrorCode::CameraNotFound,
            ScanError::StartFailed(_) | ScanError::Interrupted => ErrorCode::ScanFailed,
        }
    }
}

/// Decode-on-frame camera capability
///
/// After a successful `start`, every decoded payload is sent on `frames`
/// until `stop` is called. `stop` must be safe to call after a failed start.
#[async_trait]
pub trait QrDecoder: Send {
    async fn start(&mut self, frames: mpsc::UnboundedSender<String>) -> Result<(), ScanError>;
    async fn stop(&mut self);
}

pub struct ScanAdapter<D> {
    decoder: Arc<Mutex<D>>,
}

impl<D: QrDecoder + 'static> ScanAdapter<D> {
    pub fn new(decoder: D) -> Self {
        Self {
            decoder: Arc::new(Mutex::new(decoder)),
        }
    }

    /// Run one scan session
    ///
    /// Returns the first decoded payload, or `None` if `cancel` fires first.
    /// Cancellation during start takes effect once start has completed.
    pub async fn scan(&self, cancel: &CancellationToken) -> Result<Option<String>, ScanError> {
        let decoder = self.decoder.clone().lock_owned().await;
        let mut session = ScanSession {
            decoder: Some(decoder),
        };
        let outcome = session.run(cancel).await;
        session.finish().await;

        match &outcome {
            Ok(Some(_)) => tracing::info!("QR code decoded"),
            Ok(None) => tracing::debug!("Scan cancelled"),
            Err(e) => tracing::warn!(error = %e, "Scan failed"),
        }
        outcome
    }
}

/// Holds the decoder for one session; stops it on drop if still running
struct ScanSession<D: QrDecoder + 'static> {
    decoder: Option<OwnedMutexGuard<D>>,
}

impl<D: QrDecoder + 'static> ScanSession<D> {
    async fn run(&mut self, cancel: &CancellationToken) -> Result<Option<String>, ScanError> {
        let Some(decoder) = self.decoder.as_deref_mut() else {
            return Err(ScanError::Interrupted);
        };

        let (tx, mut rx) = mpsc::unbounded_channel();
        decoder.start(tx).await?;

        if cancel.is_cancelled() {
            return Ok(None);
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Ok(None),
            frame = rx.recv() => frame.map(Some).ok_or(ScanError::Interrupted),
        }
    }

    async fn finish(&mut self) {
        if let Some(mut decoder) = self.decoder.take() {
            decoder.stop().await;
        }
    }
}

impl<D: QrDecoder + 'static> Drop for ScanSession<D> {
    fn drop(&mut self) {
        let Some(mut decoder) = self.decoder.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    decoder.stop().await;
                });
            }
            Err(_) => tracing::warn!("Scan dropped outside a runtime, decoder left running"),
        }
    }
}
