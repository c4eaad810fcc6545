//! Route guards and the permission-filtered navigation menu.

use attendify_core::{UserProfile, permissions, routes};

use crate::session::SessionState;

/// What a guarded route should do for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Render,
    /// Session is still being resolved; show a loading state.
    Loading,
    Redirect(&'static str),
}

/// Pages that need a signed-in user.
#[must_use]
pub const fn private_route(state: &SessionState) -> GuardDecision {
    match state {
        SessionState::Authenticating => GuardDecision::Loading,
        SessionState::Authenticated(_) | SessionState::Refreshing(_) => GuardDecision::Render,
        SessionState::Anonymous => GuardDecision::Redirect(routes::LOGIN),
    }
}

/// Pages only for signed-out users (login, OAuth callback).
#[must_use]
pub const fn public_route(state: &SessionState) -> GuardDecision {
    match state {
        SessionState::Authenticated(_) | SessionState::Refreshing(_) => GuardDecision::Redirect(routes::HOME),
        SessionState::Anonymous | SessionState::Authenticating => GuardDecision::Render,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub title: &'static str,
    /// `None` for a section that only groups children.
    pub route: Option<&'static str>,
    pub permission: Option<&'static str>,
    pub children: Vec<MenuItem>,
}

impl MenuItem {
    const fn link(title: &'static str, route: &'static str, permission: Option<&'static str>) -> Self {
        Self { title, route: Some(route), permission, children: Vec::new() }
    }

    fn allowed(&self, user: &UserProfile) -> bool {
        self.permission.is_none_or(|p| user.has_permission(p))
    }
}

/// The full sidebar, before permission filtering.
#[must_use]
pub fn navigation_menu() -> Vec<MenuItem> {
    vec![
        MenuItem::link("Home", routes::HOME, None),
        MenuItem::link("Calendar", routes::CALENDAR, Some(permissions::CALENDAR_VIEW)),
        MenuItem::link("My Activities", routes::MY_ACTIVITIES, Some(permissions::ACTIVITIES_MINE)),
        MenuItem {
            title: "Managements",
            route: None,
            permission: None,
            children: vec![
                MenuItem::link("Projects", routes::PROJECTS, Some(permissions::PROJECTS_BASE)),
                MenuItem::link("Users", routes::USERS, Some(permissions::USERS_BASE)),
                MenuItem::link("Groups", routes::GROUPS, Some(permissions::GROUPS_BASE)),
                MenuItem::link("Locations", routes::LOCATIONS, Some(permissions::LOCATIONS_BASE)),
            ],
        },
    ]
}

/// Entries the user may see. Sections whose children are all hidden are
/// dropped.
#[must_use]
pub fn visible_menu(user: &UserProfile) -> Vec<MenuItem> {
    filter_items(navigation_menu(), user)
}

fn filter_items(items: Vec<MenuItem>, user: &UserProfile) -> Vec<MenuItem> {
    items
        .into_iter()
        .filter(|item| item.allowed(user))
        .filter_map(|mut item| {
            if item.children.is_empty() {
                return Some(item);
            }
            item.children = filter_items(std::mem::take(&mut item.children), user);
            (!item.children.is_empty()).then_some(item)
        })
        .collect()
}
