use project_board_db::{
    object_id::{ProjectId, UserId},
    users::Designer,
};

use crate::client_state::{Outcome, ProjectBoard};

/// Typing fewer characters than this doesn't search on its own. Enter still does.
pub const MIN_QUERY_LENGTH: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelState {
    Idle,
    Searching,
    Results(Vec<Designer>),
    Empty,
    /// A designer was assigned and the panel closed.
    Assigned(UserId),
}

/// A search waiting for results. Results are applied only if the query is still current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
}

/// Incremental search for a designer to assign to one project.
#[derive(Debug)]
pub struct AssignmentSearchPanel {
    project_id: ProjectId,
    input: String,
    state: PanelState,
    open: bool,
}

impl AssignmentSearchPanel {
    pub fn new(project_id: ProjectId) -> Self {
        AssignmentSearchPanel {
            project_id,
            input: String::new(),
            state: PanelState::Idle,
            open: true,
        }
    }

    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    fn current_query(&self) -> &str {
        self.input.trim()
    }

    /// Update the input text. Returns the search to run, if the input is long enough.
    pub fn set_input(&mut self, text: &str) -> Option<SearchRequest> {
        self.input = text.to_string();
        if self.current_query().chars().count() < MIN_QUERY_LENGTH {
            self.state = PanelState::Idle;
            return None;
        }

        self.state = PanelState::Searching;
        Some(SearchRequest {
            query: self.current_query().to_string(),
        })
    }

    /// Enter pressed: search immediately, whatever the input length.
    pub fn submit(&mut self) -> SearchRequest {
        self.state = PanelState::Searching;
        SearchRequest {
            query: self.current_query().to_string(),
        }
    }

    /// Apply the results of a search. Returns false, leaving the panel unchanged, when the
    /// input has moved on since the search was issued.
    pub fn apply_results(&mut self, request: &SearchRequest, results: Vec<Designer>) -> bool {
        if !self.open || request.query != self.current_query() {
            return false;
        }

        self.state = if results.is_empty() {
            PanelState::Empty
        } else {
            PanelState::Results(results)
        };
        true
    }

    async fn run(&mut self, board: &mut ProjectBoard, request: SearchRequest) {
        match board.search_designers(&request.query).await {
            Outcome::Done(results) => {
                self.apply_results(&request, results);
            }
            Outcome::NotPermitted | Outcome::Failed => {
                if request.query == self.current_query() {
                    self.state = PanelState::Idle;
                }
            }
        }
    }

    /// Handle a change to the input text, searching if it is long enough.
    pub async fn input(&mut self, board: &mut ProjectBoard, text: &str) {
        if let Some(request) = self.set_input(text) {
            self.run(board, request).await;
        }
    }

    /// Handle Enter.
    pub async fn enter(&mut self, board: &mut ProjectBoard) {
        let request = self.submit();
        self.run(board, request).await;
    }

    /// Assign the chosen designer and close the panel.
    pub async fn select(&mut self, board: &mut ProjectBoard, designer_id: UserId) -> Outcome<()> {
        let outcome = board.assign(self.project_id, designer_id).await;
        if outcome.is_done() {
            self.state = PanelState::Assigned(designer_id);
            self.open = false;
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use project_board_db::Role;

    use super::*;
    use crate::{client_state::tests::env, projects::ProjectInput};

    fn designer(email: &str) -> Designer {
        Designer {
            id: UserId::new(),
            email: email.to_string(),
        }
    }

    #[test]
    fn short_input_stays_idle() {
        let mut panel = AssignmentSearchPanel::new(ProjectId::new());
        assert_eq!(panel.set_input("ab"), None);
        assert_eq!(panel.state(), &PanelState::Idle);
        assert_eq!(panel.set_input("  ab  "), None);

        let request = panel.set_input("abc").expect("search issued");
        assert_eq!(request.query, "abc");
        assert_eq!(panel.state(), &PanelState::Searching);

        // Dropping back below the threshold returns to idle.
        assert_eq!(panel.set_input("a"), None);
        assert_eq!(panel.state(), &PanelState::Idle);
    }

    #[test]
    fn stale_results_are_discarded() {
        let mut panel = AssignmentSearchPanel::new(ProjectId::new());
        let first = panel.set_input("ann").unwrap();
        let second = panel.set_input("anna").unwrap();

        assert!(!panel.apply_results(&first, vec![designer("ann@studio.test")]));
        assert_eq!(panel.state(), &PanelState::Searching);

        assert!(panel.apply_results(&second, vec![]));
        assert_eq!(panel.state(), &PanelState::Empty);
    }

    #[test]
    fn enter_searches_below_threshold() {
        let mut panel = AssignmentSearchPanel::new(ProjectId::new());
        assert_eq!(panel.set_input("a"), None);
        let request = panel.submit();
        assert_eq!(request.query, "a");
        assert_eq!(panel.state(), &PanelState::Searching);

        let found = vec![designer("ada@studio.test")];
        assert!(panel.apply_results(&request, found.clone()));
        assert_eq!(panel.state(), &PanelState::Results(found));
    }

    #[tokio::test]
    async fn search_and_assign_closes_panel() {
        let env = env();
        let mut client = env.board("client@example.com", Role::Client).await;
        let mut manager = env.board("manager@example.com", Role::Manager).await;
        let ada = env.board("ada@studio.test", Role::Designer).await;
        env.board("bob@studio.test", Role::Designer).await;

        let Outcome::Done(p) = client
            .create_project(ProjectInput {
                title: "Rebrand".to_string(),
                description: None,
            })
            .await
        else {
            panic!("create failed");
        };
        manager.refresh().await.unwrap();

        let mut panel = AssignmentSearchPanel::new(p);
        panel.input(&mut manager, "ad").await;
        assert_eq!(panel.state(), &PanelState::Idle);

        panel.input(&mut manager, "ada@").await;
        let PanelState::Results(results) = panel.state().clone() else {
            panic!("expected results, got {:?}", panel.state());
        };
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, ada.user().user_id);

        panel.input(&mut manager, "nobody-here").await;
        assert_eq!(panel.state(), &PanelState::Empty);

        env.store.clear_operations();
        panel.input(&mut manager, "").await;
        panel.enter(&mut manager).await;
        assert_eq!(panel.state(), &PanelState::Empty);
        assert!(
            env.store.operations().is_empty(),
            "empty query makes no store call"
        );

        let outcome = panel.select(&mut manager, ada.user().user_id).await;
        assert!(outcome.is_done());
        assert_eq!(panel.state(), &PanelState::Assigned(ada.user().user_id));
        assert!(!panel.is_open());
        assert_eq!(manager.designers_for(p).len(), 1);
    }

    #[tokio::test]
    async fn non_managers_get_no_results() {
        let env = env();
        let mut client = env.board("client@example.com", Role::Client).await;
        env.board("ada@studio.test", Role::Designer).await;

        let mut panel = AssignmentSearchPanel::new(ProjectId::new());
        panel.input(&mut client, "ada@").await;
        assert_eq!(panel.state(), &PanelState::Idle);
    }
}
