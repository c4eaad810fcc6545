//! Dialog for managing the members of an existing group.

use attendify_client::{ApiClient, ApiError};
use attendify_core::User;

use crate::error::{ServiceError, ValidationErrors};
use crate::group_wizard::{CloseRequest, MEMBER_ALREADY_ADDED};

pub const MEMBERS_REQUIRED: &str = "Please add at least one member to the group";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberDialogState {
    Closed,
    Editing,
    Saving,
}

impl MemberDialogState {
    const fn name(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Editing => "editing",
            Self::Saving => "saving",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MemberDialog {
    group_id: String,
    state: MemberDialogState,
    members: Vec<User>,
    initial: Vec<User>,
    errors: ValidationErrors,
    save_error: Option<String>,
}

impl MemberDialog {
    /// Opens the dialog on the current membership of `group_id`.
    #[must_use]
    pub fn open(group_id: impl Into<String>, members: Vec<User>) -> Self {
        Self {
            group_id: group_id.into(),
            state: MemberDialogState::Editing,
            initial: members.clone(),
            members,
            errors: ValidationErrors::new(),
            save_error: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> MemberDialogState {
        self.state
    }

    #[must_use]
    pub fn members(&self) -> &[User] {
        &self.members
    }

    #[must_use]
    pub const fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    #[must_use]
    pub fn save_error(&self) -> Option<&str> {
        self.save_error.as_deref()
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.state != MemberDialogState::Closed && self.members != self.initial
    }

    fn expect_editing(&self, action: &'static str) -> Result<(), ServiceError> {
        if self.state == MemberDialogState::Editing {
            Ok(())
        } else {
            Err(ServiceError::InvalidTransition { state: self.state.name(), action })
        }
    }

    /// # Errors
    /// `Validation` when the user is already a member.
    pub fn add_member(&mut self, user: User) -> Result<(), ServiceError> {
        self.expect_editing("add a member")?;
        if self.members.iter().any(|m| m.id == user.id) {
            let mut errors = ValidationErrors::new();
            errors.insert("members", MEMBER_ALREADY_ADDED);
            return Err(ServiceError::Validation(errors));
        }
        self.errors.clear();
        self.members.push(user);
        Ok(())
    }

    /// # Errors
    /// `InvalidTransition` unless editing.
    pub fn remove_member(&mut self, user_id: &str) -> Result<bool, ServiceError> {
        self.expect_editing("remove a member")?;
        let before = self.members.len();
        self.members.retain(|m| m.id != user_id);
        Ok(self.members.len() != before)
    }

    /// Enters `Saving` and returns the membership to send.
    ///
    /// # Errors
    /// `Validation` when the membership would be empty; the dialog stays in
    /// `Editing`.
    pub fn begin_save(&mut self) -> Result<Vec<User>, ServiceError> {
        self.expect_editing("save")?;
        self.errors.clear();
        if self.members.is_empty() {
            self.errors.insert("members", MEMBERS_REQUIRED);
            return Err(ServiceError::Validation(self.errors.clone()));
        }
        self.save_error = None;
        self.state = MemberDialogState::Saving;
        Ok(self.members.clone())
    }

    /// # Errors
    /// `InvalidTransition` unless saving.
    pub fn finish_save(&mut self, outcome: &Result<(), ApiError>) -> Result<(), ServiceError> {
        if self.state != MemberDialogState::Saving {
            return Err(ServiceError::InvalidTransition { state: self.state.name(), action: "finish saving" });
        }
        match outcome {
            Ok(()) => {
                self.initial = self.members.clone();
                self.state = MemberDialogState::Closed;
            },
            Err(err) => {
                self.save_error = Some(err.message());
                self.state = MemberDialogState::Editing;
            },
        }
        Ok(())
    }

    /// Replaces the group's membership with the dialog's list.
    ///
    /// # Errors
    /// `Validation` for an empty list, or the API error with the dialog back
    /// in `Editing`.
    pub async fn save(&mut self, client: &ApiClient) -> Result<(), ServiceError> {
        let members = self.begin_save()?;
        let outcome = client.replace_group_members(&self.group_id, &members).await;
        self.finish_save(&outcome)?;
        outcome.map_err(ServiceError::from)
    }

    pub fn request_close(&mut self) -> CloseRequest {
        if self.state == MemberDialogState::Saving || self.is_dirty() {
            return CloseRequest::ConfirmDiscard;
        }
        self.state = MemberDialogState::Closed;
        CloseRequest::Closed
    }

    pub fn confirm_discard(&mut self) {
        self.members = self.initial.clone();
        self.errors.clear();
        self.save_error = None;
        self.state = MemberDialogState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> User {
        User {
            id: id.to_owned(),
            username: id.to_owned(),
            first_name: String::new(),
            last_name: String::new(),
            email: format!("{id}@example.com"),
            avatar: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_empty_membership_cannot_be_saved() {
        let mut dialog = MemberDialog::open("g1", vec![user("u1")]);
        dialog.remove_member("u1").unwrap();
        assert!(matches!(dialog.begin_save(), Err(ServiceError::Validation(_))));
        assert_eq!(dialog.state(), MemberDialogState::Editing);
        assert_eq!(dialog.errors().get("members"), Some(MEMBERS_REQUIRED));
    }

    #[test]
    fn test_already_member_rejected() {
        let mut dialog = MemberDialog::open("g1", vec![user("u1")]);
        assert!(dialog.add_member(user("u1")).is_err());
        dialog.add_member(user("u2")).unwrap();
        assert_eq!(dialog.members().len(), 2);
    }

    #[test]
    fn test_dirty_close_and_discard() {
        let mut dialog = MemberDialog::open("g1", vec![user("u1")]);
        dialog.add_member(user("u2")).unwrap();
        assert_eq!(dialog.request_close(), CloseRequest::ConfirmDiscard);
        dialog.confirm_discard();
        assert_eq!(dialog.state(), MemberDialogState::Closed);
        assert_eq!(dialog.members(), &[user("u1")]);
    }

    #[test]
    fn test_save_failure_keeps_dialog_open() {
        let mut dialog = MemberDialog::open("g1", vec![user("u1")]);
        dialog.begin_save().unwrap();
        assert_eq!(dialog.state(), MemberDialogState::Saving);
        assert_eq!(dialog.request_close(), CloseRequest::ConfirmDiscard);

        dialog.finish_save(&Err(ApiError::Timeout)).unwrap();
        assert_eq!(dialog.state(), MemberDialogState::Editing);
        assert!(dialog.save_error().is_some());
    }

    #[test]
    fn test_save_success_closes() {
        let mut dialog = MemberDialog::open("g1", vec![user("u1")]);
        dialog.add_member(user("u2")).unwrap();
        dialog.begin_save().unwrap();
        dialog.finish_save(&Ok(())).unwrap();
        assert_eq!(dialog.state(), MemberDialogState::Closed);
        assert!(!dialog.is_dirty());
    }
}
