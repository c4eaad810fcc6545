//! Two-step group create/edit dialog.
//!
//! `Closed → Details → Members → Submitting → Closed` on success, or back to
//! `Members` with the error retained when the mutation fails.

use attendify_client::{ApiClient, ApiError};
use attendify_core::{Group, GroupInput, ListQueryState, MemberRef, PageSize, User};

use crate::error::{ServiceError, ValidationErrors};

pub const NAME_REQUIRED: &str = "Group name is required";
pub const NAME_TAKEN: &str = "A group with this name already exists";
pub const MEMBER_ALREADY_ADDED: &str = "User already added to the group";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Closed,
    Details,
    Members,
    Submitting,
}

impl WizardStep {
    const fn name(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Details => "editing details",
            Self::Members => "editing members",
            Self::Submitting => "submitting",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardMode {
    Create,
    Edit { group_id: String, original_name: String },
}

/// Answer to a close request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseRequest {
    Closed,
    /// There are unsaved changes; call `confirm_discard` to close anyway.
    ConfirmDiscard,
}

/// Fields collected by the wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupDraft {
    pub name: String,
    pub description: String,
    pub members: Vec<User>,
}

impl GroupDraft {
    fn to_input(&self) -> GroupInput {
        GroupInput {
            name: self.name.trim().to_owned(),
            description: self.description.trim().to_owned(),
            users: self.members.iter().map(MemberRef::from).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GroupWizard {
    mode: WizardMode,
    step: WizardStep,
    draft: GroupDraft,
    initial: GroupDraft,
    errors: ValidationErrors,
    submit_error: Option<String>,
}

impl Default for GroupWizard {
    fn default() -> Self {
        Self {
            mode: WizardMode::Create,
            step: WizardStep::Closed,
            draft: GroupDraft::default(),
            initial: GroupDraft::default(),
            errors: ValidationErrors::new(),
            submit_error: None,
        }
    }
}

impl GroupWizard {
    /// Opens an empty wizard for a new group.
    #[must_use]
    pub fn create() -> Self {
        Self { step: WizardStep::Details, ..Self::default() }
    }

    /// Opens the wizard prefilled from an existing group.
    #[must_use]
    pub fn edit(group: &Group) -> Self {
        let draft = GroupDraft {
            name: group.name.clone(),
            description: group.description.clone().unwrap_or_default(),
            members: group.members.clone(),
        };
        Self {
            mode: WizardMode::Edit { group_id: group.id.clone(), original_name: group.name.clone() },
            step: WizardStep::Details,
            initial: draft.clone(),
            draft,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn step(&self) -> WizardStep {
        self.step
    }

    #[must_use]
    pub const fn mode(&self) -> &WizardMode {
        &self.mode
    }

    #[must_use]
    pub const fn draft(&self) -> &GroupDraft {
        &self.draft
    }

    #[must_use]
    pub const fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Server message of the last failed submission.
    #[must_use]
    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.step != WizardStep::Closed && self.draft != self.initial
    }

    /// "Create Group (1/2)" style title.
    #[must_use]
    pub fn title(&self) -> String {
        let verb = match self.mode {
            WizardMode::Create => "Create Group",
            WizardMode::Edit { .. } => "Edit Group",
        };
        let position = if self.step == WizardStep::Details { 1 } else { 2 };
        format!("{verb} ({position}/2)")
    }

    fn expect_step(&self, step: WizardStep, action: &'static str) -> Result<(), ServiceError> {
        if self.step == step {
            Ok(())
        } else {
            Err(ServiceError::InvalidTransition { state: self.step.name(), action })
        }
    }

    /// # Errors
    /// `InvalidTransition` outside the details step.
    pub fn set_name(&mut self, name: &str) -> Result<(), ServiceError> {
        self.expect_step(WizardStep::Details, "edit the name")?;
        name.clone_into(&mut self.draft.name);
        Ok(())
    }

    /// # Errors
    /// `InvalidTransition` outside the details step.
    pub fn set_description(&mut self, description: &str) -> Result<(), ServiceError> {
        self.expect_step(WizardStep::Details, "edit the description")?;
        description.clone_into(&mut self.draft.description);
        Ok(())
    }

    /// Validates the details and moves to the members step.
    ///
    /// The name must be non-blank and must not match an existing group
    /// (case-insensitive) unless it is the unchanged name of the group being
    /// edited. No mutation is sent here.
    ///
    /// Returns whether the wizard advanced; on `false` the reasons are in
    /// [`GroupWizard::errors`].
    ///
    /// # Errors
    /// `InvalidTransition` outside the details step, or the API error of the
    /// duplicate lookup.
    pub async fn advance(&mut self, client: &ApiClient) -> Result<bool, ServiceError> {
        self.expect_step(WizardStep::Details, "advance")?;
        self.errors.clear();

        let name = self.draft.name.trim().to_owned();
        if name.is_empty() {
            self.errors.insert("name", NAME_REQUIRED);
            return Ok(false);
        }
        if self.needs_duplicate_check(&name) && self.name_taken(client, &name).await? {
            tracing::debug!(name = %name, "Group name already in use");
            self.errors.insert("name", NAME_TAKEN);
            return Ok(false);
        }

        self.step = WizardStep::Members;
        Ok(true)
    }

    /// Returns from the members step to the details step.
    ///
    /// # Errors
    /// `InvalidTransition` outside the members step.
    pub fn back(&mut self) -> Result<(), ServiceError> {
        self.expect_step(WizardStep::Members, "go back")?;
        self.step = WizardStep::Details;
        Ok(())
    }

    /// Adds a member; a user already in the draft is rejected.
    ///
    /// # Errors
    /// `InvalidTransition` outside the members step, `Validation` for a
    /// duplicate.
    pub fn add_member(&mut self, user: User) -> Result<(), ServiceError> {
        self.expect_step(WizardStep::Members, "add a member")?;
        if self.draft.members.iter().any(|m| m.id == user.id) {
            let mut errors = ValidationErrors::new();
            errors.insert("members", MEMBER_ALREADY_ADDED);
            return Err(ServiceError::Validation(errors));
        }
        self.draft.members.push(user);
        Ok(())
    }

    /// Removes a member by id. Returns whether one was removed.
    ///
    /// # Errors
    /// `InvalidTransition` outside the members step.
    pub fn remove_member(&mut self, user_id: &str) -> Result<bool, ServiceError> {
        self.expect_step(WizardStep::Members, "remove a member")?;
        let before = self.draft.members.len();
        self.draft.members.retain(|m| m.id != user_id);
        Ok(self.draft.members.len() != before)
    }

    /// Enters `Submitting` and returns the body to send.
    ///
    /// # Errors
    /// `InvalidTransition` outside the members step.
    pub fn begin_submit(&mut self) -> Result<GroupInput, ServiceError> {
        self.expect_step(WizardStep::Members, "submit")?;
        self.submit_error = None;
        self.step = WizardStep::Submitting;
        Ok(self.draft.to_input())
    }

    /// Leaves `Submitting`: closes on success, returns to `Members` with the
    /// server message on failure.
    ///
    /// # Errors
    /// `InvalidTransition` when no submission is in progress.
    pub fn finish_submit(&mut self, outcome: &Result<(), ApiError>) -> Result<(), ServiceError> {
        self.expect_step(WizardStep::Submitting, "finish submitting")?;
        match outcome {
            Ok(()) => self.close_now(),
            Err(err) => {
                self.submit_error = Some(err.message());
                self.step = WizardStep::Members;
            },
        }
        Ok(())
    }

    /// Sends the draft: `POST /group/create` or `PUT /group/{id}/edit`.
    ///
    /// # Errors
    /// `InvalidTransition` outside the members step, or the API error; the
    /// wizard is back in `Members` in that case.
    pub async fn submit(&mut self, client: &ApiClient) -> Result<(), ServiceError> {
        let input = self.begin_submit()?;
        let outcome = match &self.mode {
            WizardMode::Create => client.create::<Group, _>(&input).await,
            WizardMode::Edit { group_id, .. } => client.update::<Group, _>(group_id, &input).await,
        };
        self.finish_submit(&outcome)?;
        outcome.map_err(ServiceError::from)
    }

    /// Closes unless there are unsaved changes.
    pub fn request_close(&mut self) -> CloseRequest {
        if self.step == WizardStep::Submitting || self.is_dirty() {
            return CloseRequest::ConfirmDiscard;
        }
        self.close_now();
        CloseRequest::Closed
    }

    /// Closes and drops unsaved changes.
    pub fn confirm_discard(&mut self) {
        self.close_now();
    }

    fn close_now(&mut self) {
        self.step = WizardStep::Closed;
        self.draft = self.initial.clone();
        self.errors.clear();
        self.submit_error = None;
    }

    fn needs_duplicate_check(&self, name: &str) -> bool {
        match &self.mode {
            WizardMode::Create => true,
            WizardMode::Edit { original_name, .. } => original_name.trim().to_lowercase() != name.to_lowercase(),
        }
    }

    /// Walks every page of the substring search until an exact,
    /// case-insensitive match other than the edited group turns up.
    async fn name_taken(&self, client: &ApiClient, name: &str) -> Result<bool, ApiError> {
        let wanted = name.to_lowercase();
        let own_id = match &self.mode {
            WizardMode::Edit { group_id, .. } => Some(group_id.as_str()),
            WizardMode::Create => None,
        };
        let mut query = ListQueryState { page_size: PageSize::Fifty, search: name.to_owned(), ..ListQueryState::default() };
        loop {
            let page = client.fetch_page::<Group>(&query).await?;
            if page.items.iter().any(|g| g.name.trim().to_lowercase() == wanted && Some(g.id.as_str()) != own_id) {
                return Ok(true);
            }
            if page.items.is_empty() || u64::from(query.page) >= page.total_pages {
                return Ok(false);
            }
            query.page += 1;
        }
    }
}
