use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Lifecycle state derived from the two optional timestamps.
///
/// The clean path is NotCheckedIn -> Present -> Departed, but check-in and
/// check-out are unconditional overwrites (see `AttendanceEngine`), so
/// Present -> Present, Departed -> Present and Departed -> Departed are all
/// reachable. Consumers get this tag instead of re-deriving state from
/// field absence.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AttendanceStatus {
    NotCheckedIn,
    Present,
    Departed,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "roll_number": "42",
        "name": "Asha Rahman",
        "email": "asha@example.com",
        "phone": "+8801712345678",
        "checkin_time": "2026-08-29T09:02:11Z",
        "checkout_time": null,
        "version": 3
    })
)]
pub struct StudentRecord {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "42")]
    pub roll_number: String,

    #[schema(example = "Asha Rahman")]
    pub name: String,

    #[schema(example = "asha@example.com")]
    pub email: String,

    #[schema(example = "+8801712345678")]
    pub phone: String,

    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub checkin_time: Option<DateTime<Utc>>,

    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub checkout_time: Option<DateTime<Utc>>,

    /// Optimistic-concurrency tag, bumped by the store on every update.
    #[schema(example = 0)]
    pub version: u64,
}

impl StudentRecord {
    pub fn status(&self) -> AttendanceStatus {
        match (self.checkin_time, self.checkout_time) {
            (None, None) => AttendanceStatus::NotCheckedIn,
            (Some(_), None) => AttendanceStatus::Present,
            // Checkout without a prior check-in is observable under the
            // permissive transition policy; surfaced as Departed.
            (_, Some(_)) => AttendanceStatus::Departed,
        }
    }

    pub fn is_present(&self) -> bool {
        self.status() == AttendanceStatus::Present
    }
}

/// Creation payload, shared by the engine command and the store contract.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct NewStudent {
    #[schema(example = "42")]
    pub roll_number: String,
    #[schema(example = "Asha Rahman")]
    pub name: String,
    #[schema(example = "asha@example.com", format = "email")]
    pub email: String,
    #[schema(example = "+8801712345678")]
    pub phone: String,
}
