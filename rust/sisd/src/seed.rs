use crate::model::{ExamResult, Month, MonthlyScore, StudentRecord, StudentStatus};
use anyhow::Context;
use std::path::Path;

pub fn load_roster_file(path: &Path) -> anyhow::Result<Vec<StudentRecord>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read roster {}", path.to_string_lossy()))?;
    let students: Vec<StudentRecord> = serde_json::from_str(&text)
        .with_context(|| format!("invalid roster json in {}", path.to_string_lossy()))?;
    Ok(students)
}

fn monthly(entries: &[(u8, i64)]) -> Vec<MonthlyScore> {
    entries
        .iter()
        .filter_map(|(m, score)| {
            Month::from_ordinal(*m).map(|month| MonthlyScore {
                month,
                score: *score,
                comment: None,
            })
        })
        .collect()
}

fn result(
    subject: &str,
    semester: &str,
    score: i64,
    months: &[(u8, i64)],
    comment: &str,
    date: &str,
) -> ExamResult {
    ExamResult {
        subject: subject.to_string(),
        semester: semester.to_string(),
        score,
        monthly_scores: monthly(months),
        teacher_comment: comment.to_string(),
        date: date.to_string(),
    }
}

#[allow(clippy::too_many_arguments)]
fn student(
    id: &str,
    name: &str,
    class_name: &str,
    grade: &str,
    attendance_rate: f64,
    status: StudentStatus,
    results: Vec<ExamResult>,
    activities: &[&str],
) -> StudentRecord {
    let slug = name.to_ascii_lowercase().replace(' ', ".");
    StudentRecord {
        id: id.to_string(),
        name: name.to_string(),
        email: format!("{slug}@school.edu"),
        class_name: class_name.to_string(),
        avatar: format!("https://picsum.photos/seed/{id}/100/100"),
        grade: grade.to_string(),
        attendance_rate,
        enrollment_date: "2022-09-01".to_string(),
        expected_graduation_date: "2026-06-30".to_string(),
        status,
        results,
        activities: activities.iter().map(|a| a.to_string()).collect(),
    }
}

/// Built-in demo roster used when no roster file is configured.
pub fn demo_roster() -> Vec<StudentRecord> {
    const FALL: &str = "Fall 2024";
    const SPRING: &str = "Spring 2025";
    vec![
        student(
            "ST2024001",
            "Alice Chen",
            "10-A",
            "Grade 10",
            98.0,
            StudentStatus::Active,
            vec![
                result("Mathematics", FALL, 95, &[(9, 94), (10, 96), (11, 95)], "Excellent problem-solving skills.", "2024-12-15"),
                result("Physics", FALL, 88, &[], "Strong grasp of mechanics.", "2024-12-16"),
                result("English", FALL, 92, &[], "Articulate and thoughtful essays.", "2024-12-17"),
                result("Mathematics", SPRING, 97, &[(2, 97), (3, 98)], "Keeps raising the bar.", "2025-05-20"),
            ],
            &["Math Olympiad", "Debate Club"],
        ),
        student(
            "ST2024002",
            "Brandon Lee",
            "10-A",
            "Grade 10",
            91.5,
            StudentStatus::Active,
            vec![
                result("Mathematics", FALL, 72, &[(9, 68), (10, 74)], "Needs more practice with algebra.", "2024-12-15"),
                result("Physics", FALL, 65, &[], "Should review lab procedures.", "2024-12-16"),
                result("English", FALL, 80, &[], "Good participation in class.", "2024-12-17"),
            ],
            &["Basketball"],
        ),
        student(
            "ST2024003",
            "Chloe Wang",
            "10-B",
            "Grade 10",
            95.0,
            StudentStatus::Active,
            vec![
                result("Mathematics", FALL, 85, &[], "Consistent effort.", "2024-12-15"),
                result("Chemistry", FALL, 90, &[(10, 88), (11, 92)], "Meticulous in the lab.", "2024-12-18"),
                result("Chemistry", SPRING, 93, &[], "Outstanding project work.", "2025-05-21"),
            ],
            &["Science Club", "Orchestra"],
        ),
        student(
            "ST2024004",
            "Daniel Kim",
            "11-A",
            "Grade 11",
            84.0,
            StudentStatus::Active,
            vec![
                result("Mathematics", FALL, 58, &[(9, 55), (10, 60), (11, 59)], "Must attend extra help sessions.", "2024-12-15"),
                result("History", FALL, 66, &[], "Improving steadily.", "2024-12-19"),
            ],
            &["Drama"],
        ),
        student(
            "ST2024005",
            "Emma Rossi",
            "11-A",
            "Grade 11",
            72.0,
            StudentStatus::Inactive,
            vec![result("History", SPRING, 78, &[], "Engaged in discussions.", "2025-05-22")],
            &[],
        ),
    ]
}
