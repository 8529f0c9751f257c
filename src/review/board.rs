// src/review/board.rs
//! Local state behind the admin candidate table.
//!
//! Two independent pieces of state sit on top of the loaded records: which
//! rows are editing their remarks, and which rows are selected for bulk
//! email. Neither changes server state. The board only produces the
//! request bodies and applies results once the server has accepted them.

use std::collections::{HashMap, HashSet};

use crate::applications::models::{Application, ApplicationStatus, BulkEmailRequest};

/// Per-row remarks editing state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowMode {
    Viewing,
    EditingRemarks { draft: String },
}

/// Remarks change ready to be sent to the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemarksUpdate {
    pub id: String,
    pub remarks: String,
}

#[derive(Debug, Clone, Default)]
pub struct BoardFilter {
    pub status: Option<ApplicationStatus>,
    /// Case-insensitive substring over name, email, qualification and skills
    pub query: Option<String>,
}

#[derive(Debug, Default)]
pub struct ReviewBoard {
    applications: Vec<Application>,
    drafts: HashMap<String, String>,
    selected: HashSet<String>,
}

impl ReviewBoard {
    pub fn new(applications: Vec<Application>) -> Self {
        Self {
            applications,
            ..Default::default()
        }
    }

    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    fn find(&self, id: &str) -> Option<&Application> {
        self.applications.iter().find(|app| app.id == id)
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Application> {
        self.applications.iter_mut().find(|app| app.id == id)
    }

    // ------------------------------------------------------------------
    // Remarks editing
    // ------------------------------------------------------------------

    pub fn mode(&self, id: &str) -> RowMode {
        match self.drafts.get(id) {
            Some(draft) => RowMode::EditingRemarks {
                draft: draft.clone(),
            },
            None => RowMode::Viewing,
        }
    }

    /// Starts editing with the current remarks as the draft. Returns false
    /// for unknown rows.
    pub fn begin_edit(&mut self, id: &str) -> bool {
        let Some(current) = self.find(id).map(|app| app.remarks.clone()) else {
            return false;
        };
        self.drafts.insert(id.to_string(), current);
        true
    }

    /// Ignored unless the row is being edited.
    pub fn edit_draft(&mut self, id: &str, text: &str) {
        if let Some(draft) = self.drafts.get_mut(id) {
            *draft = text.to_string();
        }
    }

    pub fn cancel_edit(&mut self, id: &str) {
        self.drafts.remove(id);
    }

    /// The update to send for a row being edited. The row stays in editing
    /// mode until [`ReviewBoard::remarks_saved`] confirms the save.
    pub fn save_remarks(&self, id: &str) -> Option<RemarksUpdate> {
        self.drafts.get(id).map(|draft| RemarksUpdate {
            id: id.to_string(),
            remarks: draft.clone(),
        })
    }

    pub fn remarks_saved(&mut self, update: &RemarksUpdate) {
        if let Some(app) = self.find_mut(&update.id) {
            app.remarks = update.remarks.clone();
        }
        self.drafts.remove(&update.id);
    }

    // ------------------------------------------------------------------
    // Status
    // ------------------------------------------------------------------

    /// Applies a status the server has already accepted.
    pub fn apply_status(&mut self, id: &str, status: ApplicationStatus) -> bool {
        match self.find_mut(id) {
            Some(app) => {
                app.status = status;
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn toggle_select(&mut self, id: &str) {
        if !self.selected.remove(id) && self.find(id).is_some() {
            self.selected.insert(id.to_string());
        }
    }

    pub fn select_all(&mut self, checked: bool) {
        if checked {
            self.selected = self.applications.iter().map(|app| app.id.clone()).collect();
        } else {
            self.selected.clear();
        }
    }

    /// False for an empty board, matching an unchecked header checkbox.
    pub fn all_selected(&self) -> bool {
        !self.applications.is_empty()
            && self
                .applications
                .iter()
                .all(|app| self.selected.contains(&app.id))
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Selected ids in table order
    pub fn selected_ids(&self) -> Vec<String> {
        self.applications
            .iter()
            .filter(|app| self.selected.contains(&app.id))
            .map(|app| app.id.clone())
            .collect()
    }

    /// Body for the bulk email endpoint, or `None` when nothing is selected.
    pub fn bulk_email_request(&self, subject: &str, message: &str) -> Option<BulkEmailRequest> {
        let ids = self.selected_ids();
        if ids.is_empty() {
            return None;
        }
        Some(BulkEmailRequest {
            ids,
            subject: Some(subject.to_string()),
            message: Some(message.to_string()),
        })
    }

    // ------------------------------------------------------------------
    // Filtering
    // ------------------------------------------------------------------

    pub fn filter(&self, filter: &BoardFilter) -> Vec<&Application> {
        let needle = filter
            .query
            .as_deref()
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());

        self.applications
            .iter()
            .filter(|app| filter.status.map_or(true, |status| app.status == status))
            .filter(|app| match &needle {
                Some(needle) => [&app.name, &app.email, &app.qualification, &app.skills]
                    .iter()
                    .any(|field| field.to_lowercase().contains(needle)),
                None => true,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(id: &str, name: &str, skills: &str, status: ApplicationStatus) -> Application {
        Application {
            id: id.to_string(),
            name: name.to_string(),
            email: format!("{}@example.com", id),
            mobile: String::new(),
            qualification: "BSc".to_string(),
            skills: skills.to_string(),
            cv_url: None,
            status,
            remarks: String::new(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn board() -> ReviewBoard {
        ReviewBoard::new(vec![
            app("a", "Ada", "Rust, SQL", ApplicationStatus::Pending),
            app("b", "Brian", "Go", ApplicationStatus::Accepted),
            app("c", "Chen", "rust", ApplicationStatus::Rejected),
        ])
    }

    #[test]
    fn test_edit_lifecycle() {
        let mut board = board();
        assert_eq!(board.mode("a"), RowMode::Viewing);

        assert!(board.begin_edit("a"));
        board.edit_draft("a", "Strong systems background");
        assert_eq!(
            board.mode("a"),
            RowMode::EditingRemarks {
                draft: "Strong systems background".to_string()
            }
        );
        // Other rows are unaffected
        assert_eq!(board.mode("b"), RowMode::Viewing);

        let update = board.save_remarks("a").unwrap();
        assert_eq!(board.mode("a"), RowMode::EditingRemarks { draft: update.remarks.clone() });

        board.remarks_saved(&update);
        assert_eq!(board.mode("a"), RowMode::Viewing);
        assert_eq!(board.applications()[0].remarks, "Strong systems background");
    }

    #[test]
    fn test_cancel_edit_discards_draft() {
        let mut board = board();
        board.begin_edit("b");
        board.edit_draft("b", "draft");
        board.cancel_edit("b");

        assert_eq!(board.mode("b"), RowMode::Viewing);
        assert!(board.save_remarks("b").is_none());
        assert_eq!(board.applications()[1].remarks, "");
    }

    #[test]
    fn test_unknown_rows_are_ignored() {
        let mut board = board();
        assert!(!board.begin_edit("zzz"));
        board.edit_draft("zzz", "x");
        board.toggle_select("zzz");
        assert_eq!(board.mode("zzz"), RowMode::Viewing);
        assert_eq!(board.selected_count(), 0);
        assert!(!board.apply_status("zzz", ApplicationStatus::Accepted));
    }

    #[test]
    fn test_selection_is_independent_of_editing() {
        let mut board = board();
        board.begin_edit("a");
        board.toggle_select("a");
        board.toggle_select("c");

        assert!(board.is_selected("a"));
        assert!(matches!(board.mode("a"), RowMode::EditingRemarks { .. }));

        board.cancel_edit("a");
        assert!(board.is_selected("a"));
        assert_eq!(board.selected_ids(), vec!["a".to_string(), "c".to_string()]);

        board.toggle_select("a");
        assert_eq!(board.selected_ids(), vec!["c".to_string()]);
    }

    #[test]
    fn test_select_all_and_none() {
        let mut board = board();
        assert!(!board.all_selected());

        board.select_all(true);
        assert!(board.all_selected());
        assert_eq!(board.selected_count(), 3);

        board.select_all(false);
        assert_eq!(board.selected_count(), 0);

        assert!(!ReviewBoard::new(Vec::new()).all_selected());
    }

    #[test]
    fn test_bulk_email_request_from_selection() {
        let mut board = board();
        assert!(board.bulk_email_request("Hi", "Body").is_none());

        board.toggle_select("b");
        let request = board.bulk_email_request("Hi", "Body").unwrap();
        assert_eq!(request.ids, vec!["b".to_string()]);
        assert_eq!(request.subject.as_deref(), Some("Hi"));
        assert_eq!(request.message.as_deref(), Some("Body"));
    }

    #[test]
    fn test_filter_by_status_and_query() {
        let mut board = board();

        let rust: Vec<&str> = board
            .filter(&BoardFilter {
                query: Some("RUST".to_string()),
                ..Default::default()
            })
            .iter()
            .map(|app| app.id.as_str())
            .collect();
        assert_eq!(rust, vec!["a", "c"]);

        board.apply_status("a", ApplicationStatus::Rejected);
        let rejected_rust = board.filter(&BoardFilter {
            status: Some(ApplicationStatus::Rejected),
            query: Some("rust".to_string()),
        });
        assert_eq!(rejected_rust.len(), 2);

        let everything = board.filter(&BoardFilter {
            query: Some("  ".to_string()),
            ..Default::default()
        });
        assert_eq!(everything.len(), 3);
    }
}
