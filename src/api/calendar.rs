use crate::api::{pdf_response, sanitize_filename};
use crate::config::Config;
use crate::model::staff::Staff;
use crate::pdf::CjkFont;
use crate::pdf::calendar::render_calendar_document;
use crate::pdf::doc::PageChrome;
use crate::report::grid::{month_day_rows, month_grid};
use crate::report::holidays::general_holidays;
use crate::report::leave::{
    LeaveCell, LeaveStatus, fetch_leave_data, merged_day_groups, staff_leave_matrix,
};
use crate::report::leave_codes::full_description;
use crate::utils::text::{month_year_label, parse_month_year};
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use std::collections::{BTreeMap, HashMap};
use tracing::{error, instrument};
use utoipa::{IntoParams, ToSchema};

/* ===================== Query/body types ===================== */

#[derive(Debug, Deserialize, IntoParams)]
pub struct CalendarQuery {
    /// Month selector, `YYYY-MM`. Malformed input falls back to the
    /// current month instead of failing.
    pub month_year: Option<String>,
    /// Comma-separated department codes. Absent or empty matches no staff.
    pub departments: Option<String>,
    /// Restrict the leave partitions to official leave only
    pub official_only: Option<bool>,
    /// `staff_code` or `name`
    pub sort: Option<String>,
    /// `asc` or `desc`
    pub dir: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CalendarPdfRequest {
    #[schema(example = "2025-01")]
    pub month_year: Option<String>,
    #[schema(example = json!(["TRANS", "ADMIN"]))]
    #[serde(default)]
    pub departments: Vec<String>,
    #[serde(default)]
    pub official_only: bool,
    /// Download filename; sanitized, defaults to a generated name
    pub filename: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct StaffLeaveApplication {
    pub leave_id: u64,
    pub leave_type: i32,
    pub description: String,
    pub status: String,
    pub dates: Vec<NaiveDate>,
}

/* ===================== Helpers ===================== */

fn split_departments(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// ORDER BY fragments are whitelisted, never interpolated from raw input.
/// The name sort orders by the English name, the staff list's display key.
fn order_by_clause(sort: Option<&str>, dir: Option<&str>) -> &'static str {
    let descending = matches!(dir, Some("desc") | Some("DESC"));
    match (sort, descending) {
        (Some("name"), false) => "ORDER BY ename",
        (Some("name"), true) => "ORDER BY ename DESC",
        (_, true) => "ORDER BY staff_code DESC",
        (_, false) => "ORDER BY staff_code",
    }
}

async fn staff_in_departments(
    pool: &MySqlPool,
    departments: &[String],
    sort: Option<&str>,
    dir: Option<&str>,
) -> Result<Vec<Staff>, sqlx::Error> {
    if departments.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = vec!["?"; departments.len()].join(", ");
    let sql = format!(
        "SELECT staff_code, cname, ename, dept FROM staff WHERE dept IN ({placeholders}) {}",
        order_by_clause(sort, dir)
    );
    let mut query = sqlx::query_as::<_, Staff>(&sql);
    for dept in departments {
        query = query.bind(dept);
    }
    query.fetch_all(pool).await
}

/// Per-staff matrix rows for the grid view, in the caller-requested
/// staff order. Staff without a leave application in the month are
/// omitted, they have no row in the grid.
fn staff_matrix_rows(
    staff: &[Staff],
    matrix: &HashMap<String, BTreeMap<u32, LeaveCell>>,
) -> Vec<serde_json::Value> {
    staff
        .iter()
        .filter(|s| matrix.contains_key(&s.staff_code))
        .map(|s| {
            json!({
                "staff_code": s.staff_code,
                "cname": s.cname,
                "ename": s.ename,
                "dept": s.dept,
                "days": matrix.get(&s.staff_code),
            })
        })
        .collect()
}

/// Holiday names for one month keyed by day of month.
fn month_holidays(year: i32, month: u32) -> BTreeMap<u32, String> {
    general_holidays(year)
        .iter()
        .filter(|(date, _)| date.month() == month)
        .map(|(date, holiday)| (date.day(), holiday.name.to_string()))
        .collect()
}

/// Weekday index (0 = Sunday .. 6 = Saturday) per in-month day; the grid
/// view styles the staff-matrix columns from this map.
fn month_weekday_indices(year: i32, month: u32) -> BTreeMap<u32, u32> {
    month_grid(year, month)
        .iter()
        .flatten()
        .filter(|slot| slot.in_month)
        .map(|slot| (slot.date.day(), slot.weekday_index()))
        .collect()
}

pub fn pdf_timestamp() -> String {
    Local::now().format("%Y-%m-%d %I:%M:%S %p").to_string()
}

/* ===================== Handlers ===================== */

/// Month leave-calendar data for the grid view.
#[utoipa::path(
    get,
    path = "/api/calendar",
    params(CalendarQuery),
    responses(
        (status = 200, description = "Month grid with merged leave groups"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Calendar"
)]
#[instrument(name = "calendar_view", skip(pool))]
pub async fn calendar_view(
    query: web::Query<CalendarQuery>,
    pool: web::Data<MySqlPool>,
) -> impl Responder {
    let (year, month) = parse_month_year(query.month_year.as_deref());
    let departments = split_departments(query.departments.as_deref());
    let official_only = query.official_only.unwrap_or(false);

    let partitions = match fetch_leave_data(
        pool.get_ref(),
        year,
        month,
        &departments,
        official_only,
    )
    .await
    {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, year, month, "Failed to fetch leave data");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let staff = match staff_in_departments(
        pool.get_ref(),
        &departments,
        query.sort.as_deref(),
        query.dir.as_deref(),
    )
    .await
    {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Failed to list staff");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let matrix = staff_leave_matrix(&partitions);
    let staff_leave_data = staff_matrix_rows(&staff, &matrix);

    HttpResponse::Ok().json(json!({
        "year": year,
        "month": month,
        "month_label": month_year_label(year, month),
        "days_of_week": ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
        "weeks": month_day_rows(year, month),
        "weekday_indices": month_weekday_indices(year, month),
        "holidays": month_holidays(year, month),
        "leave_data": merged_day_groups(&partitions),
        "staff_leave_data": staff_leave_data,
    }))
}

/// One staff member's leave applications in a month, with dates.
#[utoipa::path(
    get,
    path = "/api/calendar/staff/{staff_code}/{year}/{month}",
    params(
        ("staff_code" = String, Path, description = "Staff code"),
        ("year" = i32, Path, description = "Calendar year"),
        ("month" = u32, Path, description = "Month, 1-12")
    ),
    responses(
        (status = 200, description = "Leave applications", body = [StaffLeaveApplication]),
        (status = 400, description = "Month out of range"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Calendar"
)]
#[instrument(name = "staff_leaves", skip(pool))]
pub async fn staff_leaves(
    path: web::Path<(String, i32, u32)>,
    pool: web::Data<MySqlPool>,
) -> impl Responder {
    let (staff_code, year, month) = path.into_inner();
    if !(1..=12).contains(&month) {
        return HttpResponse::BadRequest().json(json!({ "message": "Month must be 1-12" }));
    }

    let rows = match sqlx::query_as::<_, (u64, i32, i8, NaiveDate)>(
        r#"
        SELECT l.id, l.leave_type, l.is_approved, ld.leave_date
        FROM leaves l
        INNER JOIN leave_dates ld ON l.id = ld.leave_id
        WHERE l.staff_code = ?
        AND YEAR(ld.leave_date) = ?
        AND MONTH(ld.leave_date) = ?
        ORDER BY l.id, ld.leave_date
        "#,
    )
    .bind(&staff_code)
    .bind(year)
    .bind(month)
    .fetch_all(pool.get_ref())
    .await
    {
        Ok(rows) => rows,
        Err(e) => {
            error!(error = %e, staff_code = %staff_code, "Failed to fetch staff leaves");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let mut applications: Vec<StaffLeaveApplication> = Vec::new();
    for (leave_id, leave_type, is_approved, leave_date) in rows {
        match applications.iter_mut().find(|a| a.leave_id == leave_id) {
            Some(app) => app.dates.push(leave_date),
            None => applications.push(StaffLeaveApplication {
                leave_id,
                leave_type,
                description: full_description(leave_type).to_string(),
                status: if is_approved == 1 {
                    LeaveStatus::Approved
                } else {
                    LeaveStatus::OnHold
                }
                .as_str()
                .to_string(),
                dates: vec![leave_date],
            }),
        }
    }

    HttpResponse::Ok().json(applications)
}

/// Calendar PDF download.
#[utoipa::path(
    post,
    path = "/api/calendar/pdf",
    request_body = CalendarPdfRequest,
    responses(
        (status = 200, description = "PDF document", body = Vec<u8>, content_type = "application/pdf"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Calendar"
)]
#[instrument(name = "calendar_pdf", skip(pool, config, cjk_font, body))]
pub async fn calendar_pdf(
    body: web::Json<CalendarPdfRequest>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    cjk_font: web::Data<CjkFont>,
) -> impl Responder {
    let (year, month) = parse_month_year(body.month_year.as_deref());
    let departments: Vec<String> = body
        .departments
        .iter()
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .collect();

    let partitions = match fetch_leave_data(
        pool.get_ref(),
        year,
        month,
        &departments,
        body.official_only,
    )
    .await
    {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, year, month, "Failed to fetch leave data");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let chrome = PageChrome {
        title: config.company_name.clone(),
        subtitle: format!("Leave Calendar - {}", month_year_label(year, month)),
        printed_at: pdf_timestamp(),
    };

    let bytes = match render_calendar_document(
        year,
        month,
        &month_day_rows(year, month),
        &merged_day_groups(&partitions),
        &month_holidays(year, month),
        chrome,
        cjk_font.bytes(),
    ) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(error = %e, "Calendar PDF rendering failed");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let filename = sanitize_filename(
        body.filename.as_deref(),
        format!("leave_calendar_{year}_{month:02}.pdf"),
    );
    pdf_response(bytes, &filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn departments_split_on_commas_dropping_blanks() {
        assert_eq!(
            split_departments(Some("TRANS, ADMIN ,,  ")),
            vec!["TRANS".to_string(), "ADMIN".to_string()]
        );
        assert!(split_departments(None).is_empty());
        assert!(split_departments(Some("")).is_empty());
    }

    #[test]
    fn order_by_is_whitelisted() {
        assert_eq!(order_by_clause(None, None), "ORDER BY staff_code");
        assert_eq!(
            order_by_clause(Some("name"), Some("desc")),
            "ORDER BY ename DESC"
        );
        assert_eq!(order_by_clause(Some("name"), None), "ORDER BY ename");
        // Unknown sort keys fall back to staff_code
        assert_eq!(
            order_by_clause(Some("'; DROP TABLE staff"), None),
            "ORDER BY staff_code"
        );
    }

    #[test]
    fn matrix_rows_skip_staff_without_applications() {
        let staff = vec![
            Staff {
                staff_code: "TR001".to_string(),
                cname: "陳大文".to_string(),
                ename: "Chan Tai Man".to_string(),
                dept: "TRANS".to_string(),
            },
            Staff {
                staff_code: "TR002".to_string(),
                cname: String::new(),
                ename: "Wong Siu Ming".to_string(),
                dept: "TRANS".to_string(),
            },
        ];
        let mut matrix: HashMap<String, BTreeMap<u32, LeaveCell>> = HashMap::new();
        matrix.entry("TR002".to_string()).or_default().insert(
            6,
            LeaveCell {
                leave_type: 2,
                status: LeaveStatus::Approved,
                short_description: "AL".to_string(),
            },
        );

        let rows = staff_matrix_rows(&staff, &matrix);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["staff_code"], "TR002");
        assert_eq!(rows[0]["days"]["6"]["short_description"], "AL");
    }

    #[test]
    fn matrix_rows_keep_the_requested_staff_order() {
        let staff: Vec<Staff> = ["TR003", "TR001", "TR002"]
            .iter()
            .map(|code| Staff {
                staff_code: code.to_string(),
                cname: String::new(),
                ename: code.to_string(),
                dept: "TRANS".to_string(),
            })
            .collect();
        let mut matrix: HashMap<String, BTreeMap<u32, LeaveCell>> = HashMap::new();
        for code in ["TR001", "TR002", "TR003"] {
            matrix.insert(code.to_string(), BTreeMap::new());
        }

        let codes: Vec<String> = staff_matrix_rows(&staff, &matrix)
            .iter()
            .map(|row| row["staff_code"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(codes, vec!["TR003", "TR001", "TR002"]);
    }

    #[test]
    fn weekday_indices_cover_every_in_month_day() {
        let indices = month_weekday_indices(2025, 1);
        assert_eq!(indices.len(), 31);
        assert_eq!(indices[&1], 3); // 2025-01-01 is a Wednesday
        assert_eq!(indices[&5], 0); // Sunday
        assert_eq!(indices[&11], 6); // Saturday
        assert!(!indices.contains_key(&0));
        assert!(!indices.contains_key(&32));
    }

    #[test]
    fn holidays_are_filtered_to_the_month() {
        let jan = month_holidays(2025, 1);
        assert_eq!(jan.get(&1).map(String::as_str), Some("The first day of January"));
        assert_eq!(jan.get(&29).map(String::as_str), Some("Lunar New Year's Day"));
        assert!(!jan.contains_key(&25)); // Christmas is December
    }
}
