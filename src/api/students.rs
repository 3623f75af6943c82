use actix_web::{HttpResponse, web};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use utoipa::ToSchema;

use crate::engine::AttendanceEngine;
use crate::error::EngineError;
use crate::model::student::{AttendanceStatus, NewStudent, StudentRecord};
use crate::store::MemoryStore;

/// The store bound by the server binary; tests drive the same handlers.
pub type Engine = AttendanceEngine<MemoryStore>;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StudentResponse {
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
    /// Wall-clock time-of-day renderings, so clients display attendance
    /// the way the dashboard always has without re-formatting.
    #[schema(example = "09:02:11", nullable = true)]
    pub checkin_local: Option<String>,
    #[schema(example = "16:45:03", nullable = true)]
    pub checkout_local: Option<String>,
    pub status: AttendanceStatus,
}

impl From<StudentRecord> for StudentResponse {
    fn from(record: StudentRecord) -> Self {
        let local = |t: DateTime<Utc>| t.with_timezone(&Local).format("%H:%M:%S").to_string();
        Self {
            status: record.status(),
            checkin_local: record.checkin_time.map(local),
            checkout_local: record.checkout_time.map(local),
            id: record.id,
            roll_number: record.roll_number,
            name: record.name,
            email: record.email,
            phone: record.phone,
            checkin_time: record.checkin_time,
            checkout_time: record.checkout_time,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct RosterResponse {
    pub data: Vec<StudentResponse>,
    #[schema(example = 10)]
    pub total: usize,
}

impl RosterResponse {
    fn from_records(records: Vec<StudentRecord>) -> Self {
        let data: Vec<StudentResponse> = records.into_iter().map(Into::into).collect();
        Self {
            total: data.len(),
            data,
        }
    }
}

/// Register a student
#[utoipa::path(
    post,
    path = "/api/students",
    request_body = NewStudent,
    responses(
        (status = 201, description = "Student registered successfully", body = StudentResponse),
        (status = 400, description = "Missing required field", body = Object, example = json!({
            "message": "missing required field: name"
        })),
        (status = 409, description = "Roll number already registered", body = Object, example = json!({
            "message": "roll number 42 is already registered"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Students"
)]
pub async fn create_student(
    engine: web::Data<Engine>,
    payload: web::Json<NewStudent>,
) -> Result<HttpResponse, EngineError> {
    let record = engine.create_student(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(StudentResponse::from(record)))
}

/// Full roster, creation order
#[utoipa::path(
    get,
    path = "/api/students",
    responses(
        (status = 200, description = "All students with their attendance state", body = RosterResponse)
    ),
    tag = "Students"
)]
pub async fn list_students(engine: web::Data<Engine>) -> Result<HttpResponse, EngineError> {
    let records = engine.list_all()?;
    debug!(total = records.len(), "Roster listed");
    Ok(HttpResponse::Ok().json(RosterResponse::from_records(records)))
}

/// Students currently present (checked in, not yet checked out)
#[utoipa::path(
    get,
    path = "/api/students/present",
    responses(
        (status = 200, description = "Present students only", body = RosterResponse)
    ),
    tag = "Students"
)]
pub async fn list_present(engine: web::Data<Engine>) -> Result<HttpResponse, EngineError> {
    let records = engine.list_present()?;
    Ok(HttpResponse::Ok().json(RosterResponse::from_records(records)))
}

/// Roll-number availability probe for registration forms
#[utoipa::path(
    get,
    path = "/api/students/rolls/{roll}/available",
    params(("roll" = String, Path, description = "Roll number to probe")),
    responses(
        (status = 200, description = "Availability of the roll number", body = Object, example = json!({
            "roll_number": "42",
            "available": false
        }))
    ),
    tag = "Students"
)]
pub async fn roll_available(
    engine: web::Data<Engine>,
    path: web::Path<String>,
) -> Result<HttpResponse, EngineError> {
    let roll = path.into_inner();
    let available = engine.is_roll_available(&roll).await;
    Ok(HttpResponse::Ok().json(json!({
        "roll_number": roll,
        "available": available
    })))
}

/// Check-in endpoint
#[utoipa::path(
    put,
    path = "/api/students/{id}/check-in",
    params(("id" = u64, Path, description = "Internal record id from a prior roster fetch")),
    responses(
        (status = 200, description = "Checked in successfully", body = StudentResponse),
        (status = 404, description = "Unknown student", body = Object, example = json!({
            "message": "student not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    engine: web::Data<Engine>,
    path: web::Path<u64>,
) -> Result<HttpResponse, EngineError> {
    let record = engine.check_in_by_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Checked in successfully",
        "student": StudentResponse::from(record)
    })))
}

/// Check-out endpoint
#[utoipa::path(
    put,
    path = "/api/students/{id}/check-out",
    params(("id" = u64, Path, description = "Internal record id from a prior roster fetch")),
    responses(
        (status = 200, description = "Checked out successfully", body = StudentResponse),
        (status = 404, description = "Unknown student", body = Object, example = json!({
            "message": "student not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    engine: web::Data<Engine>,
    path: web::Path<u64>,
) -> Result<HttpResponse, EngineError> {
    let record = engine.check_out_by_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Checked out successfully",
        "student": StudentResponse::from(record)
    })))
}
