// ── Barcode detector seam ──

use async_trait::async_trait;
use strum::{Display, EnumString};

use super::media::Frame;
use crate::error::CoreError;

/// Symbologies the scanner asks the detector for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum BarcodeFormat {
    Ean13,
    Ean8,
    QrCode,
    Code128,
    Code39,
    UpcA,
    UpcE,
}

pub const SCAN_FORMATS: [BarcodeFormat; 7] = [
    BarcodeFormat::Ean13,
    BarcodeFormat::Ean8,
    BarcodeFormat::QrCode,
    BarcodeFormat::Code128,
    BarcodeFormat::Code39,
    BarcodeFormat::UpcA,
    BarcodeFormat::UpcE,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedBarcode {
    pub raw_value: String,
    pub format: Option<BarcodeFormat>,
}

impl DetectedBarcode {
    pub fn new(raw_value: impl Into<String>) -> Self {
        Self {
            raw_value: raw_value.into(),
            format: None,
        }
    }
}

#[async_trait]
pub trait BarcodeDetector: Send + Sync {
    /// Decode every barcode visible in `frame`, in detector order.
    async fn detect(&self, frame: &Frame) -> Result<Vec<DetectedBarcode>, CoreError>;
}
