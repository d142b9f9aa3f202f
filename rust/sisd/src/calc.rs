use crate::model::{ExamResult, MonthlyScore, StudentRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const AT_RISK_BELOW: i64 = 70;

/// Half-up rounding to an integer, matching the dashboard's `Math.round`
/// over the non-negative score domain: `floor(x + 0.5)`.
pub fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

pub fn monthly_average(entries: &[MonthlyScore]) -> Option<i64> {
    if entries.is_empty() {
        return None;
    }
    let sum: i64 = entries.iter().map(|m| m.score).sum();
    Some(round_half_up(sum as f64 / entries.len() as f64))
}

/// The score shown for a subject: the rounded monthly mean when monthly
/// entries exist, otherwise the stored semester score.
pub fn displayed_score(result: &ExamResult) -> i64 {
    monthly_average(&result.monthly_scores).unwrap_or(result.score)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
    #[serde(rename = "N/A")]
    NoData,
}

pub fn letter_grade(avg: i64) -> Grade {
    if avg >= 90 {
        Grade::A
    } else if avg >= 80 {
        Grade::B
    } else if avg >= 70 {
        Grade::C
    } else if avg >= 60 {
        Grade::D
    } else {
        Grade::F
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CalcError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl CalcError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordFilters {
    pub search: Option<String>,
    pub class_name: Option<String>,
    pub semester: Option<String>,
}

/// Reads an optional string filter where null, blank and "All" all mean "no filter".
pub(crate) fn parse_choice(
    obj: &serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> Result<Option<String>, CalcError> {
    match obj.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => {
            let Some(s) = v.as_str() else {
                return Err(CalcError::new(
                    "bad_params",
                    format!("filters.{key} must be string or null"),
                ));
            };
            let t = s.trim();
            if t.is_empty() || t.eq_ignore_ascii_case("ALL") {
                Ok(None)
            } else {
                Ok(Some(t.to_string()))
            }
        }
    }
}

pub(crate) fn parse_search(
    obj: &serde_json::Map<String, serde_json::Value>,
) -> Result<Option<String>, CalcError> {
    match obj.get("search") {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => {
            let Some(s) = v.as_str() else {
                return Err(CalcError::new(
                    "bad_params",
                    "filters.search must be string or null",
                ));
            };
            // An empty search term matches everyone; "All" is a legitimate search here.
            Ok((!s.is_empty()).then(|| s.to_lowercase()))
        }
    }
}

pub fn parse_record_filters(raw: Option<&serde_json::Value>) -> Result<RecordFilters, CalcError> {
    let Some(raw) = raw else {
        return Ok(RecordFilters::default());
    };
    if raw.is_null() {
        return Ok(RecordFilters::default());
    }
    let Some(obj) = raw.as_object() else {
        return Err(CalcError::new("bad_params", "filters must be an object"));
    };

    Ok(RecordFilters {
        search: parse_search(obj)?,
        class_name: parse_choice(obj, "className")?,
        semester: parse_choice(obj, "semester")?,
    })
}

/// Case-insensitive substring match against name or id. `needle` is lowercase.
pub fn matches_search(student: &StudentRecord, needle: Option<&str>) -> bool {
    let Some(needle) = needle else {
        return true;
    };
    student.name.to_lowercase().contains(needle) || student.id.to_lowercase().contains(needle)
}

fn matches_choice(value: &str, filter: Option<&str>) -> bool {
    filter.map(|f| f == value).unwrap_or(true)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectScore {
    pub subject: String,
    pub semester: String,
    pub score: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPerformance {
    pub student_id: String,
    pub name: String,
    pub class_name: String,
    pub scores: Vec<SubjectScore>,
    pub average: i64,
    pub grade: Grade,
    pub has_data: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAverage {
    pub subject: String,
    pub average: i64,
    pub result_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPerformer {
    pub student_id: String,
    pub name: String,
    pub average: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryModel {
    pub filters: RecordFilters,
    pub subjects: Vec<String>,
    pub students: Vec<StudentPerformance>,
    pub subject_averages: Vec<SubjectAverage>,
    pub class_average: i64,
    pub top_performer: Option<TopPerformer>,
    pub at_risk_count: usize,
    pub total_subjects: usize,
    pub unique_classes: Vec<String>,
}

pub fn unique_classes(students: &[StudentRecord]) -> Vec<String> {
    let set: BTreeSet<&str> = students.iter().map(|s| s.class_name.as_str()).collect();
    std::iter::once("All".to_string())
        .chain(set.into_iter().map(str::to_string))
        .collect()
}

fn student_performance(student: &StudentRecord, semester: Option<&str>) -> StudentPerformance {
    let scores: Vec<SubjectScore> = student
        .results
        .iter()
        .filter(|r| matches_choice(&r.semester, semester))
        .map(|r| SubjectScore {
            subject: r.subject.clone(),
            semester: r.semester.clone(),
            score: displayed_score(r),
        })
        .collect();

    let has_data = !scores.is_empty();
    let average = if has_data {
        let total: i64 = scores.iter().map(|s| s.score).sum();
        round_half_up(total as f64 / scores.len() as f64)
    } else {
        0
    };
    let grade = if !has_data && semester.is_some() {
        Grade::NoData
    } else {
        letter_grade(average)
    };

    StudentPerformance {
        student_id: student.id.clone(),
        name: student.name.clone(),
        class_name: student.class_name.clone(),
        scores,
        average,
        grade,
        has_data,
    }
}

pub fn compute_summary(students: &[StudentRecord], filters: &RecordFilters) -> SummaryModel {
    let search = filters.search.as_deref().map(str::to_lowercase);
    let class_name = filters.class_name.as_deref();
    let semester = filters.semester.as_deref();

    let performance: Vec<StudentPerformance> = students
        .iter()
        .filter(|s| matches_search(s, search.as_deref()))
        .filter(|s| matches_choice(&s.class_name, class_name))
        .map(|s| student_performance(s, semester))
        .collect();

    // Subjects keep first-seen order so chart rows are stable across calls.
    let mut subjects: Vec<String> = Vec::new();
    let mut per_subject: Vec<(i64, usize)> = Vec::new();
    for p in &performance {
        for s in &p.scores {
            let idx = match subjects.iter().position(|x| *x == s.subject) {
                Some(i) => i,
                None => {
                    subjects.push(s.subject.clone());
                    per_subject.push((0, 0));
                    subjects.len() - 1
                }
            };
            per_subject[idx].0 += s.score;
            per_subject[idx].1 += 1;
        }
    }
    let subject_averages: Vec<SubjectAverage> = subjects
        .iter()
        .zip(per_subject.iter())
        .map(|(subject, (sum, n))| SubjectAverage {
            subject: subject.clone(),
            average: round_half_up(*sum as f64 / *n as f64),
            result_count: *n,
        })
        .collect();

    let with_data: Vec<&StudentPerformance> = performance.iter().filter(|p| p.has_data).collect();
    let class_average = if with_data.is_empty() {
        0
    } else {
        let total: i64 = with_data.iter().map(|p| p.average).sum();
        round_half_up(total as f64 / with_data.len() as f64)
    };

    let mut top: Option<&StudentPerformance> = None;
    for p in with_data.iter().copied() {
        if top.map(|t| p.average > t.average).unwrap_or(true) {
            top = Some(p);
        }
    }
    let top_performer = top.map(|p| TopPerformer {
        student_id: p.student_id.clone(),
        name: p.name.clone(),
        average: p.average,
    });

    let at_risk_count = with_data
        .iter()
        .filter(|p| p.average < AT_RISK_BELOW)
        .count();

    SummaryModel {
        filters: filters.clone(),
        total_subjects: subjects.len(),
        subjects,
        students: performance,
        subject_averages,
        class_average,
        top_performer,
        at_risk_count,
        unique_classes: unique_classes(students),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportLine {
    pub subject: String,
    pub calculated_score: i64,
    pub letter_grade: Grade,
    pub teacher_comment: String,
    pub monthly_scores: Vec<MonthlyScore>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSnapshot {
    pub student_id: String,
    pub name: String,
    pub class_name: String,
    pub semester: String,
    pub lines: Vec<ReportLine>,
    pub average: i64,
    pub grade: Grade,
}

pub fn report_snapshot(student: &StudentRecord, semester: &str) -> ReportSnapshot {
    let lines: Vec<ReportLine> = student
        .results
        .iter()
        .filter(|r| r.semester == semester)
        .map(|r| {
            let score = displayed_score(r);
            ReportLine {
                subject: r.subject.clone(),
                calculated_score: score,
                letter_grade: letter_grade(score),
                teacher_comment: r.teacher_comment.clone(),
                monthly_scores: r.monthly_scores.clone(),
            }
        })
        .collect();

    let (average, grade) = if lines.is_empty() {
        (0, Grade::NoData)
    } else {
        let total: i64 = lines.iter().map(|l| l.calculated_score).sum();
        let avg = round_half_up(total as f64 / lines.len() as f64);
        (avg, letter_grade(avg))
    };

    ReportSnapshot {
        student_id: student.id.clone(),
        name: student.name.clone(),
        class_name: student.class_name.clone(),
        semester: semester.to_string(),
        lines,
        average,
        grade,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Month, StudentStatus};

    fn month(n: u8) -> Month {
        Month::from_ordinal(n).expect("month")
    }

    fn result(subject: &str, semester: &str, score: i64) -> ExamResult {
        ExamResult {
            subject: subject.to_string(),
            semester: semester.to_string(),
            score,
            monthly_scores: Vec::new(),
            teacher_comment: String::new(),
            date: "2024-12-01".to_string(),
        }
    }

    fn student(id: &str, name: &str, class_name: &str, results: Vec<ExamResult>) -> StudentRecord {
        StudentRecord {
            id: id.to_string(),
            name: name.to_string(),
            email: String::new(),
            class_name: class_name.to_string(),
            avatar: String::new(),
            grade: "10".to_string(),
            attendance_rate: 95.0,
            enrollment_date: String::new(),
            expected_graduation_date: String::new(),
            status: StudentStatus::Active,
            results,
            activities: Vec::new(),
        }
    }

    #[test]
    fn round_half_up_matches_math_round() {
        assert_eq!(round_half_up(84.5), 85);
        assert_eq!(round_half_up(84.49), 84);
        assert_eq!(round_half_up(0.0), 0);
        assert_eq!(round_half_up(99.5), 100);
    }

    #[test]
    fn displayed_score_prefers_monthly_mean() {
        let mut r = result("Math", "Fall", 70);
        assert_eq!(displayed_score(&r), 70);

        r.monthly_scores = vec![
            MonthlyScore { month: month(9), score: 80, comment: None },
            MonthlyScore { month: month(10), score: 85, comment: None },
        ];
        // 82.5 rounds up.
        assert_eq!(displayed_score(&r), 83);
    }

    #[test]
    fn grade_bands() {
        assert_eq!(letter_grade(90), Grade::A);
        assert_eq!(letter_grade(89), Grade::B);
        assert_eq!(letter_grade(80), Grade::B);
        assert_eq!(letter_grade(70), Grade::C);
        assert_eq!(letter_grade(60), Grade::D);
        assert_eq!(letter_grade(59), Grade::F);
    }

    #[test]
    fn top_performer_and_class_average() {
        let students = vec![
            student("S1", "Ben", "10-A", vec![result("Math", "Fall", 85)]),
            student("S2", "Cara", "10-A", vec![result("Math", "Fall", 95)]),
        ];
        let m = compute_summary(&students, &RecordFilters::default());
        assert_eq!(m.class_average, 90);
        let top = m.top_performer.expect("top");
        assert_eq!(top.student_id, "S2");
        assert_eq!(top.average, 95);
    }

    #[test]
    fn top_performer_tie_keeps_first_seen() {
        let students = vec![
            student("S1", "Ben", "10-A", vec![result("Math", "Fall", 90)]),
            student("S2", "Cara", "10-A", vec![result("Math", "Fall", 90)]),
        ];
        let m = compute_summary(&students, &RecordFilters::default());
        assert_eq!(m.top_performer.expect("top").student_id, "S1");
    }

    #[test]
    fn semester_filter_reports_no_data_and_skips_class_average() {
        let students = vec![
            student("S1", "Ben", "10-A", vec![result("Math", "Fall", 50)]),
            student("S2", "Cara", "10-A", vec![result("Math", "Spring", 80)]),
        ];
        let filters = RecordFilters {
            semester: Some("Spring".to_string()),
            ..RecordFilters::default()
        };
        let m = compute_summary(&students, &filters);

        let ben = &m.students[0];
        assert!(!ben.has_data);
        assert_eq!(ben.grade, Grade::NoData);
        assert_eq!(m.class_average, 80);
        assert_eq!(m.at_risk_count, 0);
        assert_eq!(m.subjects, vec!["Math".to_string()]);
    }

    #[test]
    fn search_matches_name_or_id_case_insensitive() {
        let students = vec![
            student("S1", "Alice Tan", "10-A", vec![]),
            student("ALI-7", "Bob", "10-B", vec![]),
            student("S3", "Cara", "10-B", vec![]),
        ];
        let filters = parse_record_filters(Some(&serde_json::json!({ "search": "ali" })))
            .expect("filters");
        let m = compute_summary(&students, &filters);
        let ids: Vec<&str> = m.students.iter().map(|p| p.student_id.as_str()).collect();
        assert_eq!(ids, vec!["S1", "ALI-7"]);
    }

    #[test]
    fn subject_averages_and_at_risk() {
        let students = vec![
            student(
                "S1",
                "Ben",
                "10-A",
                vec![result("Math", "Fall", 60), result("Physics", "Fall", 65)],
            ),
            student("S2", "Cara", "10-B", vec![result("Math", "Fall", 91)]),
        ];
        let m = compute_summary(&students, &RecordFilters::default());
        assert_eq!(m.at_risk_count, 1);
        assert_eq!(m.total_subjects, 2);
        assert_eq!(m.subject_averages[0].subject, "Math");
        // (60 + 91) / 2 = 75.5
        assert_eq!(m.subject_averages[0].average, 76);
        assert_eq!(m.unique_classes, vec!["All", "10-A", "10-B"]);
    }

    #[test]
    fn parse_filters_accepts_all_and_rejects_non_strings() {
        let raw = serde_json::json!({ "className": "All", "semester": null, "search": "" });
        assert_eq!(
            parse_record_filters(Some(&raw)).expect("parse"),
            RecordFilters::default()
        );

        let bad = serde_json::json!({ "semester": 3 });
        let e = parse_record_filters(Some(&bad)).expect_err("must reject");
        assert_eq!(e.code, "bad_params");
    }

    #[test]
    fn report_snapshot_uses_displayed_scores() {
        let mut math = result("Math", "Fall", 40);
        math.teacher_comment = "Steady work.".to_string();
        math.monthly_scores = vec![MonthlyScore { month: month(9), score: 92, comment: None }];
        let s = student(
            "S1",
            "Ben",
            "10-A",
            vec![math, result("Art", "Spring", 77)],
        );

        let snap = report_snapshot(&s, "Fall");
        assert_eq!(snap.lines.len(), 1);
        assert_eq!(snap.lines[0].calculated_score, 92);
        assert_eq!(snap.lines[0].letter_grade, Grade::A);
        assert_eq!(snap.lines[0].teacher_comment, "Steady work.");
        assert_eq!(snap.average, 92);

        let empty = report_snapshot(&s, "Summer");
        assert_eq!(empty.grade, Grade::NoData);
    }
}
