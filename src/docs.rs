use crate::api::students::{RosterResponse, StudentResponse};
use crate::model::student::{AttendanceStatus, NewStudent, StudentRecord};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Student Attendance System API",
        version = "1.0.0",
        description = r#"
## Student Attendance System

This API powers a **Student Attendance System** tracking daily presence of a
student roster.

### 🔹 Key Features
- **Roster Management**
  - Register students with a unique roll number
- **Attendance Tracking**
  - Daily check-in and check-out per student
- **Dashboard Views**
  - Full roster audit view and a derived "present now" view

### 📦 Response Format
- JSON-based RESTful responses
- Roster responses include the total student count

---
Built with **Rust**, **Actix Web**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::students::create_student,
        crate::api::students::list_students,
        crate::api::students::list_present,
        crate::api::students::roll_available,
        crate::api::students::check_in,
        crate::api::students::check_out
    ),
    components(
        schemas(
            NewStudent,
            StudentRecord,
            StudentResponse,
            RosterResponse,
            AttendanceStatus
        )
    ),
    tags(
        (name = "Students", description = "Roster management APIs"),
        (name = "Attendance", description = "Check-in / check-out APIs"),
    )
)]
pub struct ApiDoc;
