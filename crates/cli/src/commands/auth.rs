use std::io::BufRead;

use anyhow::{Context, Result, bail};
use attendify_client::ClientConfig;
use attendify_core::OAuthProvider;
use attendify_service::guard::{public_route, visible_menu};
use attendify_service::{CallbackOutcome, GuardDecision, SessionState};

use crate::context::AppContext;
use crate::render;

fn read_password() -> Result<String> {
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line).context("failed to read password")?;
    let password = line.trim_end_matches(['\r', '\n']).to_owned();
    if password.is_empty() {
        bail!("password is required");
    }
    Ok(password)
}

pub(crate) async fn run_login(email: &str, password: Option<String>) -> Result<()> {
    let ctx = AppContext::from_env()?;
    let state = ctx.session.restore().await.unwrap_or_else(|e| {
        tracing::debug!(error = %e, "No session to resume");
        SessionState::Anonymous
    });
    if let GuardDecision::Redirect(route) = public_route(&state) {
        let name = state.user().map(|u| u.user.display_name()).unwrap_or_default();
        println!("Already signed in as {name} ({route})");
        return Ok(());
    }

    let password = match password {
        Some(p) => p,
        None => read_password()?,
    };
    let user = ctx.session.login(email.trim(), &password).await?;
    println!("Signed in as {}", user.user.display_name());
    Ok(())
}

pub(crate) async fn run_logout() -> Result<()> {
    let ctx = AppContext::from_env()?;
    ctx.session.logout().await?;
    println!("Signed out");
    Ok(())
}

pub(crate) async fn run_whoami() -> Result<()> {
    let ctx = AppContext::from_env()?;
    let user = ctx.signed_in().await?;
    println!("{} <{}>", user.user.display_name(), user.user.email);
    println!("username:    {}", user.user.username);
    println!("roles:       {}", user.roles.join(", "));
    println!("permissions: {}", user.permissions.join(", "));
    Ok(())
}

pub(crate) async fn run_refresh() -> Result<()> {
    let ctx = AppContext::from_env()?;
    ctx.signed_in().await?;
    ctx.session.refresh().await?;
    println!("Session renewed");
    Ok(())
}

pub(crate) fn run_oauth_url(provider: OAuthProvider) -> Result<()> {
    let config = ClientConfig::from_env()?;
    println!("{}", config.oauth_login_url(provider)?);
    Ok(())
}

pub(crate) async fn run_callback(query: &str) -> Result<()> {
    let ctx = AppContext::from_env()?;
    let outcome = ctx.session.complete_oauth_callback(query).await?;
    match &outcome {
        CallbackOutcome::SignedIn(user) => println!("Signed in as {}", user.user.display_name()),
        CallbackOutcome::MissingTokens => eprintln!("Login failed: the callback carried no tokens"),
    }
    println!("Continue at {}", outcome.redirect());
    if outcome == CallbackOutcome::MissingTokens {
        bail!("OAuth callback without tokens");
    }
    Ok(())
}

pub(crate) async fn run_menu() -> Result<()> {
    let ctx = AppContext::from_env()?;
    let user = ctx.signed_in().await?;
    for line in render::menu_lines(&visible_menu(&user)) {
        println!("{line}");
    }
    Ok(())
}
