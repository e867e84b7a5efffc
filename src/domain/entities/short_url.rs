//! Short URL entity: the stored mapping from a code to its target.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::qr_options::{QrErrorCorrection, QrOptions, QrSize};
use super::short_code::ShortCode;

/// A stored short URL.
///
/// Records are written once and never updated; `original_url` and the QR
/// defaults are fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortUrlRecord {
    pub short_code: ShortCode,
    pub original_url: String,
    pub qr_error_correction: QrErrorCorrection,
    pub qr_size: QrSize,
    pub created_at: DateTime<Utc>,
}

impl ShortUrlRecord {
    pub fn new(new_url: NewShortUrl, created_at: DateTime<Utc>) -> Self {
        Self {
            short_code: new_url.short_code,
            original_url: new_url.original_url,
            qr_error_correction: new_url.qr_options.error_correction,
            qr_size: new_url.qr_options.size,
            created_at,
        }
    }

    /// QR parameters chosen when the record was created.
    pub fn qr_options(&self) -> QrOptions {
        QrOptions::new(self.qr_error_correction, self.qr_size)
    }
}

/// Input data for inserting a short URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShortUrl {
    pub short_code: ShortCode,
    pub original_url: String,
    pub qr_options: QrOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_url() -> NewShortUrl {
        NewShortUrl {
            short_code: ShortCode::new_unchecked("abc123"),
            original_url: "https://example.com".to_string(),
            qr_options: QrOptions::new(QrErrorCorrection::H, QrSize::new(512).unwrap()),
        }
    }

    #[test]
    fn test_record_from_new_url() {
        let now = Utc::now();
        let record = ShortUrlRecord::new(new_url(), now);

        assert_eq!(record.short_code.as_str(), "abc123");
        assert_eq!(record.original_url, "https://example.com");
        assert_eq!(record.qr_error_correction, QrErrorCorrection::H);
        assert_eq!(record.qr_size.get(), 512);
        assert_eq!(record.created_at, now);
    }

    #[test]
    fn test_record_qr_options() {
        let record = ShortUrlRecord::new(new_url(), Utc::now());
        let options = record.qr_options();

        assert_eq!(options.error_correction, QrErrorCorrection::H);
        assert_eq!(options.size.get(), 512);
    }

    #[test]
    fn test_record_json_round_trip() {
        let record = ShortUrlRecord::new(new_url(), Utc::now());

        let json = serde_json::to_string(&record).unwrap();
        let decoded: ShortUrlRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded, record);
        assert!(json.contains("\"qr_error_correction\":\"H\""));
    }
}
