use crate::api::calendar::{CalendarPdfRequest, StaffLeaveApplication};
use crate::api::timetable::TimetablePdfRequest;
use crate::model::department::Department;
use crate::model::staff::Staff;
use crate::models::LoginReqDto;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HR Reports API",
        version = "1.0.0",
        description = r#"
## HR Leave Calendar & Attendance Timetable Reports

This API serves the internal HR reporting tools of a logistics operation.

### 🔹 Key Features
- **Leave Calendar**
  - Month grid of approved and on-hold leave applications per department
  - Official leave tracked as its own partition
  - PDF export with public holiday highlighting
- **Attendance Timetable**
  - Per-employee monthly clock-in/out sheets from the time-clock store
  - Leave schedules merged into the same grid
  - PDF export with an optional table of contents

### 🔐 Security
All report endpoints are protected with **JWT Bearer authentication**;
staff sign in with their staff code and password.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::calendar::calendar_view,
        crate::api::calendar::staff_leaves,
        crate::api::calendar::calendar_pdf,

        crate::api::timetable::list_departments,
        crate::api::timetable::timetable_pdf
    ),
    components(
        schemas(
            LoginReqDto,
            Staff,
            Department,
            CalendarPdfRequest,
            StaffLeaveApplication,
            TimetablePdfRequest
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Calendar", description = "Monthly leave calendar APIs"),
        (name = "Timetable", description = "Attendance timetable APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
