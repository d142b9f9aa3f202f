use crate::model::{Month, StudentRecord};
use crate::store::{Lookup, Store};
use serde::Serialize;

/// Which screen of the academic-records panel is open. Only ids are held
/// here; the student itself is always read back from the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum View {
    #[default]
    List,
    #[serde(rename_all = "camelCase")]
    Detail { student_id: String },
    #[serde(rename_all = "camelCase")]
    Editing {
        student_id: String,
        semester: String,
        subject: String,
        month: Month,
    },
}

impl View {
    pub fn student_id(&self) -> Option<&str> {
        match self {
            View::List => None,
            View::Detail { student_id } | View::Editing { student_id, .. } => {
                Some(student_id.as_str())
            }
        }
    }

    pub fn selected<'a>(&self, store: &'a Store) -> Option<&'a StudentRecord> {
        self.student_id().and_then(|id| store.student(id).found())
    }

    pub fn select_student(&mut self, store: &Store, student_id: &str) -> Lookup<()> {
        match store.student(student_id) {
            Lookup::Found(_) => {
                *self = View::Detail {
                    student_id: student_id.to_string(),
                };
                Lookup::Found(())
            }
            Lookup::NotFound => Lookup::NotFound,
        }
    }

    /// Opens a month cell for editing. The target triple must exist.
    pub fn edit_cell(
        &mut self,
        store: &Store,
        student_id: &str,
        semester: &str,
        subject: &str,
        month: Month,
    ) -> Lookup<()> {
        let exists = store
            .student(student_id)
            .found()
            .map(|s| {
                s.results
                    .iter()
                    .any(|r| r.semester == semester && r.subject == subject)
            })
            .unwrap_or(false);
        if !exists {
            return Lookup::NotFound;
        }
        *self = View::Editing {
            student_id: student_id.to_string(),
            semester: semester.to_string(),
            subject: subject.to_string(),
            month,
        };
        Lookup::Found(())
    }

    pub fn back(&mut self) {
        *self = match std::mem::take(self) {
            View::Editing { student_id, .. } => View::Detail { student_id },
            View::Detail { .. } | View::List => View::List,
        };
    }

    /// Falls back to the list when the selected student disappeared, e.g. after
    /// a roster reload.
    pub fn revalidate(&mut self, store: &Store) {
        if self.student_id().is_some() && self.selected(store).is_none() {
            *self = View::List;
        }
    }
}
