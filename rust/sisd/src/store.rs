use crate::calc::monthly_average;
use crate::model::{ExamResult, Month, MonthlyScore, StudentRecord};
use tracing::debug;

pub const SCORE_MIN: i64 = 0;
pub const SCORE_MAX: i64 = 100;

/// Outcome of resolving a student or a `(student, semester, subject)` triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(v) => Some(v),
            Lookup::NotFound => None,
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => Lookup::Found(v),
            None => Lookup::NotFound,
        }
    }
}

/// Re-derives `score` from the monthly entries. An empty collection keeps the
/// stored score as-is.
fn recompute_score(result: &mut ExamResult) {
    if let Some(avg) = monthly_average(&result.monthly_scores) {
        result.score = avg;
    }
}

/// In-memory roster. Every read path (summaries, reports, the selected
/// student) goes through here, so edits are visible everywhere at once.
#[derive(Debug, Default)]
pub struct Store {
    students: Vec<StudentRecord>,
}

impl Store {
    pub fn new(students: Vec<StudentRecord>) -> Self {
        let mut store = Store::default();
        store.replace_all(students);
        store
    }

    pub fn replace_all(&mut self, mut students: Vec<StudentRecord>) {
        for s in &mut students {
            for r in &mut s.results {
                r.monthly_scores.sort_by_key(|m| m.month);
                r.monthly_scores.dedup_by_key(|m| m.month);
                recompute_score(r);
            }
        }
        self.students = students;
    }

    pub fn students(&self) -> &[StudentRecord] {
        &self.students
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn student(&self, student_id: &str) -> Lookup<&StudentRecord> {
        self.students.iter().find(|s| s.id == student_id).into()
    }

    fn result_mut(
        &mut self,
        student_id: &str,
        semester: &str,
        subject: &str,
    ) -> Option<&mut ExamResult> {
        self.students
            .iter_mut()
            .find(|s| s.id == student_id)?
            .results
            .iter_mut()
            .find(|r| r.semester == semester && r.subject == subject)
    }

    /// Sets or clears one month cell and restores the monthly-average invariant.
    /// `value: None` removes the month's entry; values are clamped to 0..=100.
    pub fn set_monthly_score(
        &mut self,
        student_id: &str,
        semester: &str,
        subject: &str,
        month: Month,
        value: Option<i64>,
        comment: Option<String>,
    ) -> Lookup<&ExamResult> {
        let Some(result) = self.result_mut(student_id, semester, subject) else {
            debug!(student_id, semester, subject, "monthly score target not found");
            return Lookup::NotFound;
        };

        let existing = result.monthly_scores.iter().position(|m| m.month == month);
        match (value, existing) {
            (None, Some(idx)) => {
                result.monthly_scores.remove(idx);
            }
            (None, None) => {}
            (Some(v), existing) => {
                let entry = MonthlyScore {
                    month,
                    score: v.clamp(SCORE_MIN, SCORE_MAX),
                    comment: comment.filter(|c| !c.trim().is_empty()),
                };
                match existing {
                    Some(idx) => result.monthly_scores[idx] = entry,
                    None => {
                        let at = result
                            .monthly_scores
                            .partition_point(|m| m.month < month);
                        result.monthly_scores.insert(at, entry);
                    }
                }
            }
        }

        recompute_score(result);
        debug!(
            student_id,
            semester,
            subject,
            month = %month,
            score = result.score,
            entries = result.monthly_scores.len(),
            "monthly score applied"
        );
        Lookup::Found(&*result)
    }

    pub fn set_semester_comment(
        &mut self,
        student_id: &str,
        semester: &str,
        subject: &str,
        comment: &str,
    ) -> Lookup<&ExamResult> {
        let Some(result) = self.result_mut(student_id, semester, subject) else {
            return Lookup::NotFound;
        };
        result.teacher_comment = comment.to_string();
        Lookup::Found(&*result)
    }
}
