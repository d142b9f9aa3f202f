use crate::calc::{matches_search, parse_choice, parse_search, CalcError};
use crate::model::{Language, StudentRecord};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterFilters {
    pub search: Option<String>,
    pub class_name: Option<String>,
    pub grade: Option<String>,
    pub status: Option<String>,
}

pub fn parse_roster_filters(raw: Option<&serde_json::Value>) -> Result<RosterFilters, CalcError> {
    let Some(raw) = raw.filter(|v| !v.is_null()) else {
        return Ok(RosterFilters::default());
    };
    let Some(obj) = raw.as_object() else {
        return Err(CalcError::new("bad_params", "filters must be an object"));
    };
    Ok(RosterFilters {
        search: parse_search(obj)?,
        class_name: parse_choice(obj, "className")?,
        grade: parse_choice(obj, "grade")?,
        status: parse_choice(obj, "status")?,
    })
}

pub fn filter_roster<'a>(
    students: &'a [StudentRecord],
    filters: &RosterFilters,
) -> Vec<&'a StudentRecord> {
    let search = filters.search.as_deref().map(str::to_lowercase);
    students
        .iter()
        .filter(|s| matches_search(s, search.as_deref()))
        .filter(|s| filters.class_name.as_deref().map_or(true, |c| s.class_name == c))
        .filter(|s| filters.grade.as_deref().map_or(true, |g| s.grade == g))
        .filter(|s| {
            filters
                .status
                .as_deref()
                .map_or(true, |st| s.status.as_str().eq_ignore_ascii_case(st))
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub classes: Vec<String>,
    pub grades: Vec<String>,
    pub statuses: Vec<String>,
}

fn with_all<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let set: BTreeSet<&str> = values.collect();
    std::iter::once("All")
        .chain(set)
        .map(str::to_string)
        .collect()
}

pub fn filter_options(students: &[StudentRecord]) -> FilterOptions {
    FilterOptions {
        classes: with_all(students.iter().map(|s| s.class_name.as_str())),
        grades: with_all(students.iter().map(|s| s.grade.as_str())),
        statuses: with_all(students.iter().map(|s| s.status.as_str())),
    }
}

fn csv_headers(lang: Language) -> [&'static str; 7] {
    match lang {
        Language::En => [
            "Name",
            "Student ID",
            "Email",
            "Class",
            "Enrollment Date",
            "Expected Graduation",
            "Status",
        ],
        Language::Zh => [
            "姓名",
            "学号",
            "电子邮件",
            "班级",
            "入学日期",
            "预计毕业日期",
            "状态",
        ],
    }
}

pub fn export_csv(students: &[&StudentRecord], lang: Language) -> anyhow::Result<String> {
    let mut w = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    w.write_record(csv_headers(lang))?;
    for s in students {
        w.write_record([
            s.name.as_str(),
            s.id.as_str(),
            s.email.as_str(),
            s.class_name.as_str(),
            s.enrollment_date.as_str(),
            s.expected_graduation_date.as_str(),
            s.status.as_str(),
        ])?;
    }
    let bytes = w.into_inner().map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

pub fn export_file_name(today: NaiveDate) -> String {
    format!("students_export_{}.csv", today.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StudentStatus;

    fn student(id: &str, name: &str, class_name: &str, grade: &str, status: StudentStatus) -> StudentRecord {
        StudentRecord {
            id: id.to_string(),
            name: name.to_string(),
            email: format!("{}@school.test", id.to_lowercase()),
            class_name: class_name.to_string(),
            avatar: String::new(),
            grade: grade.to_string(),
            attendance_rate: 90.0,
            enrollment_date: "2023-09-01".to_string(),
            expected_graduation_date: "2026-06-30".to_string(),
            status,
            results: Vec::new(),
            activities: Vec::new(),
        }
    }

    fn roster() -> Vec<StudentRecord> {
        vec![
            student("S1", "Alice Tan", "10-A", "10", StudentStatus::Active),
            student("S2", "Bob \"Bo\" Lim", "11-B", "11", StudentStatus::Inactive),
            student("S3", "Chen Wei", "10-A", "10", StudentStatus::Active),
        ]
    }

    #[test]
    fn filters_combine() {
        let students = roster();
        let f = parse_roster_filters(Some(&serde_json::json!({
            "className": "10-A",
            "status": "active",
            "grade": "All"
        })))
        .expect("filters");
        let ids: Vec<&str> = filter_roster(&students, &f).iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["S1", "S3"]);
    }

    #[test]
    fn options_are_sorted_with_all_first() {
        let o = filter_options(&roster());
        assert_eq!(o.classes, vec!["All", "10-A", "11-B"]);
        assert_eq!(o.grades, vec!["All", "10", "11"]);
        assert_eq!(o.statuses, vec!["All", "Active", "Inactive"]);
    }

    #[test]
    fn csv_quotes_every_field() {
        let students = roster();
        let refs: Vec<&StudentRecord> = students.iter().skip(1).take(1).collect();
        let out = export_csv(&refs, Language::En).expect("csv");
        let mut lines = out.lines();
        assert_eq!(
            lines.next(),
            Some("\"Name\",\"Student ID\",\"Email\",\"Class\",\"Enrollment Date\",\"Expected Graduation\",\"Status\"")
        );
        assert_eq!(
            lines.next(),
            Some("\"Bob \"\"Bo\"\" Lim\",\"S2\",\"s2@school.test\",\"11-B\",\"2023-09-01\",\"2026-06-30\",\"Inactive\"")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn export_file_name_uses_iso_date() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 7).expect("date");
        assert_eq!(export_file_name(d), "students_export_2024-03-07.csv");
    }
}
