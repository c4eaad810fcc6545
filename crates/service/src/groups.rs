//! Group and membership workflows: mutations followed by local refresh,
//! with every outcome reported through the notifier.

use std::sync::Arc;

use attendify_client::ApiClient;
use attendify_core::{Group, ListQueryState, PageSize, Resource, User};

use crate::error::ServiceError;
use crate::group_wizard::{GroupWizard, WizardMode};
use crate::list_view::ListView;
use crate::member_dialog::MemberDialog;
use crate::notify::{Notice, Notifier};

pub struct GroupWorkflows {
    client: Arc<ApiClient>,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for GroupWorkflows {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupWorkflows").field("client", &self.client).finish_non_exhaustive()
    }
}

impl GroupWorkflows {
    #[must_use]
    pub fn new(client: Arc<ApiClient>, notifier: Arc<dyn Notifier>) -> Self {
        Self { client, notifier }
    }

    fn report<T>(&self, result: Result<T, ServiceError>, success: &str) -> Result<T, ServiceError> {
        match &result {
            Ok(_) => self.notifier.notify(Notice::success(success)),
            Err(ServiceError::Validation(errors)) => {
                tracing::debug!(%errors, "Rejected before submission");
            },
            Err(err) => {
                tracing::warn!(error = %err, "Group workflow failed");
                self.notifier.notify(Notice::error(err.user_message()));
            },
        }
        result
    }

    /// Loads one group, mapping a 404 to `ServiceError::NotFound`.
    ///
    /// # Errors
    /// `NotFound` or the API error.
    pub async fn load_group(&self, id: &str) -> Result<Group, ServiceError> {
        match self.client.fetch_one::<Group>(id).await {
            Ok(group) => Ok(group),
            Err(e) if e.is_not_found() => Err(ServiceError::NotFound { what: Group::LABEL, id: id.to_owned() }),
            Err(e) => Err(e.into()),
        }
    }

    /// Users matching `text` for a member picker; blank text matches nobody.
    ///
    /// # Errors
    /// The API error, also reported as a notice.
    pub async fn search_users(&self, text: &str) -> Result<Vec<User>, ServiceError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        match self.client.search_users(text.trim()).await {
            Ok(users) => Ok(users),
            Err(err) => {
                self.notifier.notify(Notice::error("Failed to search users"));
                Err(err.into())
            },
        }
    }

    /// Advances the wizard past the details step.
    ///
    /// # Errors
    /// See [`GroupWizard::advance`]; API failures are also reported.
    pub async fn advance(&self, wizard: &mut GroupWizard) -> Result<bool, ServiceError> {
        let result = wizard.advance(&self.client).await;
        if let Err(err) = &result {
            self.notifier.notify(Notice::error(err.user_message()));
        }
        result
    }

    /// Submits the wizard and refreshes the group list on success.
    ///
    /// # Errors
    /// See [`GroupWizard::submit`]; failures are reported and the wizard
    /// stays open.
    pub async fn submit(&self, wizard: &mut GroupWizard, list: Option<&ListView<Group>>) -> Result<(), ServiceError> {
        let success = match wizard.mode() {
            WizardMode::Create => "Group created successfully!",
            WizardMode::Edit { .. } => "Group updated successfully!",
        };
        self.report(wizard.submit(&self.client).await, success)?;
        if let Some(list) = list {
            refresh_after_mutation(list).await;
        }
        Ok(())
    }

    /// Deletes a group and refreshes the list.
    ///
    /// # Errors
    /// The API error, also reported as a notice.
    pub async fn delete_group(&self, group_id: &str, list: Option<&ListView<Group>>) -> Result<(), ServiceError> {
        let result = self.client.delete::<Group>(group_id).await.map_err(ServiceError::from);
        self.report(result, "Group deleted successfully!")?;
        if let Some(list) = list {
            refresh_after_mutation(list).await;
        }
        Ok(())
    }

    /// Every member of a group, across all pages.
    ///
    /// # Errors
    /// The API error of any page.
    pub async fn all_members(&self, group_id: &str) -> Result<Vec<User>, ServiceError> {
        let mut query = ListQueryState { page_size: PageSize::Fifty, ..ListQueryState::default() };
        let mut members = Vec::new();
        loop {
            let page = self.client.group_members(group_id, &query).await?;
            let done = page.items.is_empty() || u64::from(query.page) >= page.total_pages;
            members.extend(page.items);
            if done {
                return Ok(members);
            }
            query.page += 1;
        }
    }

    /// Opens the member dialog on the group's current membership.
    ///
    /// # Errors
    /// The API error of the membership lookup.
    pub async fn open_member_dialog(&self, group_id: &str) -> Result<MemberDialog, ServiceError> {
        Ok(MemberDialog::open(group_id, self.all_members(group_id).await?))
    }

    /// Saves the member dialog and refreshes the member list.
    ///
    /// # Errors
    /// See [`MemberDialog::save`]; failures are reported and the dialog stays
    /// open.
    pub async fn save_members(&self, dialog: &mut MemberDialog, list: Option<&ListView<User>>) -> Result<(), ServiceError> {
        self.report(dialog.save(&self.client).await, "Members added successfully!")?;
        if let Some(list) = list {
            refresh_after_mutation(list).await;
        }
        Ok(())
    }

    /// Removes exactly one member from a group.
    ///
    /// The membership is replaced server-side without `user_id`, then the
    /// row is dropped from the displayed member list.
    ///
    /// # Errors
    /// `NotFound` when the user is not a member, or the API error.
    pub async fn remove_member(
        &self,
        group_id: &str,
        user_id: &str,
        list: Option<&ListView<User>>,
    ) -> Result<(), ServiceError> {
        let result = self.remove_member_remote(group_id, user_id).await;
        self.report(result, "Member removed successfully!")?;
        if let Some(list) = list {
            list.remove_local(|u| u.id == user_id).await;
        }
        Ok(())
    }

    async fn remove_member_remote(&self, group_id: &str, user_id: &str) -> Result<(), ServiceError> {
        let members = self.all_members(group_id).await?;
        let remaining: Vec<User> = members.iter().filter(|u| u.id != user_id).cloned().collect();
        if remaining.len() == members.len() {
            return Err(ServiceError::NotFound { what: "member", id: user_id.to_owned() });
        }
        tracing::debug!(group_id, user_id, remaining = remaining.len(), "Replacing membership");
        self.client.replace_group_members(group_id, &remaining).await?;
        Ok(())
    }
}

/// Reloads a list after a mutation that already succeeded. The list view
/// reports its own fetch failures, so the mutation still counts as done.
async fn refresh_after_mutation<T: Clone + Send + 'static>(list: &ListView<T>) {
    if let Err(err) = list.refresh().await {
        tracing::warn!(error = %err, "Refresh after mutation failed");
    }
}
