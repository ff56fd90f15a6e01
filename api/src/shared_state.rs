use std::sync::Arc;

use crate::{accounts::Accounts, projects::ProjectService};

pub struct InnerState {
    pub production: bool,
    pub projects: Arc<ProjectService>,
    pub accounts: Accounts,
}

pub type State = Arc<InnerState>;
