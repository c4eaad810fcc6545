use std::sync::Arc;

use anyhow::{Result, bail};
use attendify_client::{Collection, PageSource};
use attendify_core::{User, routes};
use attendify_service::{GroupWizard, GroupWorkflows, ServiceError};
use clap::Subcommand;

use crate::commands::list::{ListArgs, show_list, user_columns};
use crate::context::AppContext;
use crate::render;

#[derive(Subcommand)]
pub(crate) enum GroupCommand {
    /// Create a group through the details and members steps
    Create {
        #[arg(short, long)]
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// User id, email or username to add; repeatable
        #[arg(short, long)]
        member: Vec<String>,
    },
    /// Change the name or description of a group
    Edit {
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a group
    Delete { id: String },
    /// Show one group
    Show { id: String },
    /// List the members of a group
    Members {
        id: String,
        #[command(flatten)]
        args: ListArgs,
    },
    /// Add users to a group
    AddMember {
        id: String,
        /// User id, email or username; repeatable
        #[arg(required = true)]
        users: Vec<String>,
    },
    /// Remove one user from a group
    RemoveMember { id: String, user_id: String },
}

/// Resolves a member argument to exactly one user.
async fn find_user(workflows: &GroupWorkflows, needle: &str) -> Result<User> {
    let candidates = workflows.search_users(needle).await?;
    let wanted = needle.trim().to_lowercase();
    if let Some(user) = candidates
        .iter()
        .find(|u| u.id == needle || u.email.to_lowercase() == wanted || u.username.to_lowercase() == wanted)
    {
        return Ok(user.clone());
    }
    match candidates.as_slice() {
        [only] => Ok(only.clone()),
        [] => Err(ServiceError::NotFound { what: "user", id: needle.to_owned() }.into()),
        many => bail!("'{needle}' matches {} users; use an id or email", many.len()),
    }
}

/// Prints wizard validation errors and fails when the details step did not
/// pass.
fn ensure_advanced(wizard: &GroupWizard, advanced: bool) -> Result<()> {
    if advanced {
        return Ok(());
    }
    render::print_validation(wizard.errors());
    bail!("{} was not saved", wizard.title())
}

async fn run_create(
    ctx: &AppContext,
    workflows: &GroupWorkflows,
    name: &str,
    description: &str,
    members: &[String],
) -> Result<()> {
    let mut wizard = GroupWizard::create();
    wizard.set_name(name)?;
    wizard.set_description(description)?;
    let advanced = workflows.advance(&mut wizard).await;
    ctx.flush_notices();
    ensure_advanced(&wizard, advanced?)?;

    for needle in members {
        let user = find_user(workflows, needle).await;
        ctx.flush_notices();
        if let Err(err) = wizard.add_member(user?) {
            if let ServiceError::Validation(errors) = &err {
                render::print_validation(errors);
                continue;
            }
            return Err(err.into());
        }
    }

    let submitted = workflows.submit(&mut wizard, None).await;
    ctx.flush_notices();
    Ok(submitted?)
}

async fn run_edit(
    ctx: &AppContext,
    workflows: &GroupWorkflows,
    id: &str,
    name: Option<&str>,
    description: Option<&str>,
) -> Result<()> {
    let group = workflows.load_group(id).await?;
    let mut wizard = GroupWizard::edit(&group);
    if let Some(name) = name {
        wizard.set_name(name)?;
    }
    if let Some(description) = description {
        wizard.set_description(description)?;
    }
    if !wizard.is_dirty() {
        println!("Nothing to change");
        return Ok(());
    }
    let advanced = workflows.advance(&mut wizard).await;
    ctx.flush_notices();
    ensure_advanced(&wizard, advanced?)?;

    let submitted = workflows.submit(&mut wizard, None).await;
    ctx.flush_notices();
    Ok(submitted?)
}

async fn run_show(workflows: &GroupWorkflows, id: &str) -> Result<()> {
    let group = workflows.load_group(id).await?;
    println!("{}", group.name);
    if let Some(description) = group.description.as_deref().filter(|d| !d.is_empty()) {
        println!("{description}");
    }
    println!("members: {}", group.members.len());
    for member in &group.members {
        println!("  {} <{}>", member.display_name(), member.email);
    }
    println!("View: {}", routes::with_id(routes::GROUP_VIEW, &group.id));
    Ok(())
}

async fn run_add_members(ctx: &AppContext, workflows: &GroupWorkflows, id: &str, users: &[String]) -> Result<()> {
    let mut dialog = workflows.open_member_dialog(id).await?;
    for needle in users {
        let user = find_user(workflows, needle).await;
        ctx.flush_notices();
        if let Err(err) = dialog.add_member(user?) {
            if let ServiceError::Validation(errors) = &err {
                render::print_validation(errors);
                continue;
            }
            return Err(err.into());
        }
    }
    if !dialog.is_dirty() {
        println!("Nothing to change");
        return Ok(());
    }
    let saved = workflows.save_members(&mut dialog, None).await;
    ctx.flush_notices();
    if let Err(ServiceError::Validation(errors)) = &saved {
        render::print_validation(errors);
    }
    Ok(saved?)
}

pub(crate) async fn run_group(command: GroupCommand) -> Result<()> {
    let ctx = AppContext::from_env()?;
    ctx.signed_in().await?;
    let workflows = GroupWorkflows::new(Arc::clone(&ctx.client), ctx.notices.clone());

    let result = match &command {
        GroupCommand::Create { name, description, member } => {
            run_create(&ctx, &workflows, name, description, member).await
        },
        GroupCommand::Edit { id, name, description } => {
            run_edit(&ctx, &workflows, id, name.as_deref(), description.as_deref()).await
        },
        GroupCommand::Delete { id } => workflows.delete_group(id, None).await.map_err(Into::into),
        GroupCommand::Show { id } => run_show(&workflows, id).await,
        GroupCommand::Members { id, args } => {
            let source: Arc<dyn PageSource<User>> =
                Arc::new(Collection::<User>::group_members(Arc::clone(&ctx.client), id));
            let route = routes::with_id(routes::GROUP_VIEW, id);
            show_list(&ctx, source, &route, Some(routes::USER_VIEW), &user_columns(), args).await
        },
        GroupCommand::AddMember { id, users } => run_add_members(&ctx, &workflows, id, users).await,
        GroupCommand::RemoveMember { id, user_id } => {
            workflows.remove_member(id, user_id, None).await.map_err(Into::into)
        },
    };
    ctx.flush_notices();
    result
}
