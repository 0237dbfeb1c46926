use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// The id of the single admin_settings row. All reads and writes address
/// this key; the first update creates the row.
pub const SETTINGS_ROW_ID: i32 = 1;

/// Payment identifiers listers point customers to: a QR code image and a UPI
/// handle. Maintained by admins, read by anyone about to pay for a booking.
#[derive(Debug, Clone, Serialize)]
pub struct AdminSettings {
    pub id: i32,
    pub payment_qr_code: Option<String>,
    pub payment_upi_id: Option<String>,
    pub updated_by: Option<Uuid>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Only provided fields are written.
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub payment_qr_code: Option<String>,
    pub payment_upi_id: Option<String>,
}
