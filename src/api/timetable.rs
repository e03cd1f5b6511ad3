use crate::api::calendar::pdf_timestamp;
use crate::api::{pdf_response, sanitize_filename};
use crate::config::Config;
use crate::model::department::Department;
use crate::pdf::CjkFont;
use crate::pdf::doc::PageChrome;
use crate::pdf::timetable::render_timetable_document;
use crate::report::ReportError;
use crate::report::attendance::{EmployeeMonthSheet, fetch_attendance};
use crate::report::grid::month_grid;
use crate::report::holidays::general_holidays;
use crate::utils::text::{month_year_label, parse_month_year};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{error, instrument};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct TimetablePdfRequest {
    #[schema(example = "Transportation")]
    pub department: String,
    #[schema(example = "2025-01")]
    pub month_year: Option<String>,
    /// Prepend a table of contents; defaults on
    pub include_toc: Option<bool>,
    pub filename: Option<String>,
}

/// Department names for the report form.
#[utoipa::path(
    get,
    path = "/api/timetable/departments",
    responses(
        (status = 200, description = "Department list", body = [Department]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Timetable"
)]
pub async fn list_departments(pool: web::Data<MySqlPool>) -> impl Responder {
    match sqlx::query_as::<_, Department>("SELECT id, name FROM departments ORDER BY name")
        .fetch_all(pool.get_ref())
        .await
    {
        Ok(departments) => HttpResponse::Ok().json(departments),
        Err(e) => {
            error!(error = %e, "Failed to list departments");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Monthly attendance timetable PDF for one department.
#[utoipa::path(
    post,
    path = "/api/timetable/pdf",
    request_body = TimetablePdfRequest,
    responses(
        (status = 200, description = "PDF document", body = Vec<u8>, content_type = "application/pdf"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Department not found"),
        (status = 422, description = "No attendance or leave data for the month"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Timetable"
)]
#[instrument(name = "timetable_pdf", skip(pool, config, cjk_font, body), fields(department = %body.department))]
pub async fn timetable_pdf(
    body: web::Json<TimetablePdfRequest>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    cjk_font: web::Data<CjkFont>,
) -> impl Responder {
    let (year, month) = parse_month_year(body.month_year.as_deref());
    let department = body.department.trim();

    let data = match fetch_attendance(pool.get_ref(), department, year, month).await {
        Ok(data) => data,
        Err(ReportError::DepartmentNotFound(name)) => {
            return HttpResponse::NotFound().json(json!({
                "message": format!("Department not found: {name}")
            }));
        }
        Err(ReportError::NoData) => {
            return HttpResponse::UnprocessableEntity().json(json!({
                "message": "No attendance or leave data for the requested month"
            }));
        }
        Err(e) => {
            error!(error = %e, department = %department, year, month, "Failed to fetch attendance data");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let grid = month_grid(year, month);
    let holidays = general_holidays(year);
    let sheets: Vec<EmployeeMonthSheet> = data
        .active_employees()
        .into_iter()
        .map(|employee| {
            EmployeeMonthSheet::build(
                employee.clone(),
                &grid,
                data.checks.get(&employee.id),
                data.leaves.get(&employee.id),
                &holidays,
            )
        })
        .collect();

    let chrome = PageChrome {
        title: config.company_name.clone(),
        subtitle: format!("{} - {}", department, month_year_label(year, month)),
        printed_at: pdf_timestamp(),
    };

    let bytes = match render_timetable_document(
        department,
        year,
        month,
        &sheets,
        body.include_toc.unwrap_or(true),
        &data.department_summary(month),
        chrome,
        cjk_font.bytes(),
    ) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(error = %e, "Timetable PDF rendering failed");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let filename = sanitize_filename(
        body.filename.as_deref(),
        format!(
            "timetable_{}_{year}_{month:02}.pdf",
            department.replace(' ', "_")
        ),
    );
    pdf_response(bytes, &filename)
}
