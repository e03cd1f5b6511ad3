use crate::model::leave::LeaveDayRow;
use crate::report::leave_codes::{OFFICIAL_LEAVE_TYPE, short_description};
use chrono::Datelike;
use serde::Serialize;
use sqlx::MySqlPool;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum LeaveStatus {
    #[serde(rename = "On Hold")]
    OnHold,
    Approved,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::OnHold => "On Hold",
            LeaveStatus::Approved => "Approved",
        }
    }

    fn approved_flag(&self) -> i32 {
        match self {
            LeaveStatus::OnHold => 0,
            LeaveStatus::Approved => 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StaffRef {
    pub staff_code: String,
    pub staff_name: String,
}

/// One leave application's presence on one day, before (type, status)
/// grouping. Keyed by leave id so a multi-day application stays one
/// entry per day.
#[derive(Debug, Clone)]
pub struct LeaveEntry {
    pub leave_type: i32,
    pub status: LeaveStatus,
    pub staff: Vec<StaffRef>,
}

/// day -> leave id -> entry
pub type DayLeaveEntries = BTreeMap<u32, BTreeMap<u64, LeaveEntry>>;

/// The four partitions the calendar always works from. The regular and
/// official partitions use different query predicates by design; they
/// are never folded into one fetch.
#[derive(Debug, Default)]
pub struct LeavePartitions {
    pub on_hold: DayLeaveEntries,
    pub on_hold_official: DayLeaveEntries,
    pub approved: DayLeaveEntries,
    pub approved_official: DayLeaveEntries,
}

impl LeavePartitions {
    pub fn iter(&self) -> impl Iterator<Item = &DayLeaveEntries> {
        [
            &self.on_hold,
            &self.on_hold_official,
            &self.approved,
            &self.approved_official,
        ]
        .into_iter()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().all(|p| p.is_empty())
    }
}

/// Staff on leave for one (leave type, status) pair on one day.
#[derive(Debug, Clone, Serialize)]
pub struct LeaveGroup {
    pub leave_type: i32,
    pub status: LeaveStatus,
    pub short_description: String,
    pub staff: Vec<StaffRef>,
}

/// A single day cell of the per-staff leave matrix.
#[derive(Debug, Clone, Serialize)]
pub struct LeaveCell {
    pub leave_type: i32,
    pub status: LeaveStatus,
    pub short_description: String,
}

/// Group raw rows by day, then by leave id within the day.
pub fn group_leave_rows(rows: Vec<LeaveDayRow>, status: LeaveStatus) -> DayLeaveEntries {
    let mut result: DayLeaveEntries = BTreeMap::new();
    for row in rows {
        let entry = result
            .entry(row.leave_date.day())
            .or_default()
            .entry(row.leave_id)
            .or_insert_with(|| LeaveEntry {
                leave_type: row.leave_type,
                status,
                staff: Vec::new(),
            });
        entry.staff.push(StaffRef {
            staff_code: row.staff_code,
            staff_name: row.staff_name,
        });
    }
    result
}

/// Merge all partitions into per-day groups keyed by (leave type, status).
/// The first occurrence of a key seeds the short description; staff of
/// later entries with the same key append to the same group.
pub fn merged_day_groups(partitions: &LeavePartitions) -> BTreeMap<u32, Vec<LeaveGroup>> {
    let mut merged: BTreeMap<u32, Vec<LeaveGroup>> = BTreeMap::new();
    for partition in partitions.iter() {
        for (&day, entries) in partition {
            let groups = merged.entry(day).or_default();
            for entry in entries.values() {
                match groups
                    .iter_mut()
                    .find(|g| g.leave_type == entry.leave_type && g.status == entry.status)
                {
                    Some(group) => group.staff.extend(entry.staff.iter().cloned()),
                    None => groups.push(LeaveGroup {
                        leave_type: entry.leave_type,
                        status: entry.status,
                        short_description: short_description(entry.leave_type).to_string(),
                        staff: entry.staff.clone(),
                    }),
                }
            }
        }
    }
    merged
}

/// Per-staff day-by-day matrix for the grid view. Only staff with at
/// least one application in the month appear; overlapping applications
/// on the same day resolve last-write-wins.
pub fn staff_leave_matrix(
    partitions: &LeavePartitions,
) -> HashMap<String, BTreeMap<u32, LeaveCell>> {
    let mut matrix: HashMap<String, BTreeMap<u32, LeaveCell>> = HashMap::new();
    for partition in partitions.iter() {
        for (&day, entries) in partition {
            for entry in entries.values() {
                for staff in &entry.staff {
                    matrix.entry(staff.staff_code.clone()).or_default().insert(
                        day,
                        LeaveCell {
                            leave_type: entry.leave_type,
                            status: entry.status,
                            short_description: short_description(entry.leave_type).to_string(),
                        },
                    );
                }
            }
        }
    }
    matrix
}

async fn fetch_partition(
    pool: &MySqlPool,
    year: i32,
    month: u32,
    departments: &[String],
    status: LeaveStatus,
    official: bool,
) -> Result<DayLeaveEntries, sqlx::Error> {
    let placeholders = vec!["?"; departments.len()].join(", ");
    let type_predicate = if official {
        "l.leave_type = ?"
    } else {
        "l.leave_type <> ?"
    };
    let sql = format!(
        r#"
        SELECT
            ld.leave_date,
            l.staff_code,
            CASE WHEN TRIM(s.cname) = '' THEN s.ename ELSE s.cname END AS staff_name,
            l.leave_type,
            l.id AS leave_id
        FROM leaves l
        INNER JOIN staff s ON s.staff_code = l.staff_code
        INNER JOIN leave_dates ld ON l.id = ld.leave_id
        WHERE l.is_approved = ?
        AND YEAR(ld.leave_date) = ?
        AND MONTH(ld.leave_date) = ?
        AND {type_predicate}
        AND s.dept IN ({placeholders})
        ORDER BY ld.leave_date, staff_name
        "#
    );

    let mut query = sqlx::query_as::<_, LeaveDayRow>(&sql)
        .bind(status.approved_flag())
        .bind(year)
        .bind(month)
        .bind(OFFICIAL_LEAVE_TYPE);
    for dept in departments {
        query = query.bind(dept);
    }

    let rows = query.fetch_all(pool).await?;
    Ok(group_leave_rows(rows, status))
}

/// Fetch the month's leave records in four partitions. An empty
/// department filter matches no staff at all. The regular partitions are
/// skipped entirely when `official_only` is set; the official ones are
/// always fetched.
pub async fn fetch_leave_data(
    pool: &MySqlPool,
    year: i32,
    month: u32,
    departments: &[String],
    official_only: bool,
) -> Result<LeavePartitions, sqlx::Error> {
    if departments.is_empty() {
        debug!(year, month, "empty department filter, matching no staff");
        return Ok(LeavePartitions::default());
    }

    let mut partitions = LeavePartitions::default();

    if !official_only {
        partitions.on_hold =
            fetch_partition(pool, year, month, departments, LeaveStatus::OnHold, false).await?;
    }
    partitions.on_hold_official =
        fetch_partition(pool, year, month, departments, LeaveStatus::OnHold, true).await?;
    if !official_only {
        partitions.approved =
            fetch_partition(pool, year, month, departments, LeaveStatus::Approved, false).await?;
    }
    partitions.approved_official =
        fetch_partition(pool, year, month, departments, LeaveStatus::Approved, true).await?;

    Ok(partitions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    fn row(day: u32, code: &str, name: &str, leave_type: i32, leave_id: u64) -> LeaveDayRow {
        LeaveDayRow {
            leave_date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            staff_code: code.to_string(),
            staff_name: name.to_string(),
            leave_type,
            leave_id,
        }
    }

    #[test]
    fn grouping_keeps_one_entry_per_application_per_day() {
        let rows = vec![
            row(6, "TR001", "Chan", 2, 10),
            row(7, "TR001", "Chan", 2, 10),
            row(6, "TR002", "Wong", 2, 11),
        ];
        let grouped = group_leave_rows(rows, LeaveStatus::Approved);
        assert_eq!(grouped[&6].len(), 2);
        assert_eq!(grouped[&7].len(), 1);
        assert_eq!(grouped[&6][&10].staff[0].staff_code, "TR001");
    }

    #[test]
    fn merged_groups_union_equals_all_staff_on_leave_that_day() {
        // Three staff on day 6: two on approved annual leave (separate
        // applications), one on hold sick leave
        let mut partitions = LeavePartitions::default();
        partitions.approved = group_leave_rows(
            vec![row(6, "TR001", "Chan", 2, 10), row(6, "TR002", "Wong", 2, 11)],
            LeaveStatus::Approved,
        );
        partitions.on_hold = group_leave_rows(
            vec![row(6, "TR003", "Lee", 3, 12)],
            LeaveStatus::OnHold,
        );

        let merged = merged_day_groups(&partitions);
        let groups = &merged[&6];
        assert_eq!(groups.len(), 2);

        let union: BTreeSet<&str> = groups
            .iter()
            .flat_map(|g| g.staff.iter().map(|s| s.staff_code.as_str()))
            .collect();
        assert_eq!(union, BTreeSet::from(["TR001", "TR002", "TR003"]));

        // No staff member duplicated within a single group
        for group in groups {
            let codes: BTreeSet<&str> =
                group.staff.iter().map(|s| s.staff_code.as_str()).collect();
            assert_eq!(codes.len(), group.staff.len());
        }
    }

    #[test]
    fn same_type_and_status_share_one_group_with_seeded_description() {
        let mut partitions = LeavePartitions::default();
        partitions.approved = group_leave_rows(
            vec![row(6, "TR001", "Chan", 2, 10), row(6, "TR002", "Wong", 2, 11)],
            LeaveStatus::Approved,
        );
        let merged = merged_day_groups(&partitions);
        let groups = &merged[&6];
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].short_description, "AL");
        assert_eq!(groups[0].staff.len(), 2);
    }

    #[test]
    fn official_partition_groups_carry_official_code() {
        let mut partitions = LeavePartitions::default();
        partitions.approved_official = group_leave_rows(
            vec![row(10, "TR001", "Chan", 7, 20)],
            LeaveStatus::Approved,
        );
        partitions.approved = group_leave_rows(
            vec![row(10, "TR002", "Wong", 2, 21)],
            LeaveStatus::Approved,
        );

        let merged = merged_day_groups(&partitions);
        let groups = &merged[&10];
        let official: Vec<_> = groups.iter().filter(|g| g.leave_type == 7).collect();
        assert_eq!(official.len(), 1);
        assert_eq!(official[0].short_description, "例");
        // Regular groups never carry type 7
        assert!(groups
            .iter()
            .filter(|g| g.leave_type != 7)
            .all(|g| g.leave_type == 2));
    }

    #[test]
    fn matrix_contains_only_staff_with_applications() {
        let mut partitions = LeavePartitions::default();
        partitions.on_hold = group_leave_rows(
            vec![row(3, "TR005", "Ng", 1, 30), row(4, "TR005", "Ng", 1, 30)],
            LeaveStatus::OnHold,
        );
        let matrix = staff_leave_matrix(&partitions);
        assert_eq!(matrix.len(), 1);
        let days: Vec<u32> = matrix["TR005"].keys().copied().collect();
        assert_eq!(days, vec![3, 4]);
        assert_eq!(matrix["TR005"][&3].short_description, "NP");
        assert_eq!(matrix["TR005"][&3].status, LeaveStatus::OnHold);
    }

    #[actix_web::test]
    async fn empty_department_filter_matches_no_staff() {
        // Lazy pool: never connects, and the empty filter returns before
        // any query is issued
        let pool = MySqlPool::connect_lazy("mysql://nobody@127.0.0.1:1/none").unwrap();
        let partitions = fetch_leave_data(&pool, 2025, 1, &[], false).await.unwrap();
        assert!(partitions.is_empty());
        assert!(merged_day_groups(&partitions).is_empty());
        assert!(staff_leave_matrix(&partitions).is_empty());
    }

    #[test]
    fn overlapping_applications_resolve_last_write_wins() {
        let mut partitions = LeavePartitions::default();
        partitions.on_hold =
            group_leave_rows(vec![row(5, "TR009", "Ho", 1, 40)], LeaveStatus::OnHold);
        partitions.approved =
            group_leave_rows(vec![row(5, "TR009", "Ho", 2, 41)], LeaveStatus::Approved);

        let matrix = staff_leave_matrix(&partitions);
        // Approved partition is processed after on-hold
        assert_eq!(matrix["TR009"][&5].status, LeaveStatus::Approved);
        assert_eq!(matrix["TR009"][&5].short_description, "AL");
    }
}
