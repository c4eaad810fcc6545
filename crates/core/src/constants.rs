//! Shared constants for attendify.
//!
//! Centralizes API paths, application routes and permission names so the
//! client, services and CLI agree on them.

/// Service name sent to the OpenID Connect gateway.
pub const SERVICE_NAME: &str = "attendify";

/// Default HTTP request timeout in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// First page number; pages are 1-based.
pub const FIRST_PAGE: u32 = 1;

/// Default number of calendar days shown before today.
pub const CALENDAR_DAYS_BEFORE: i64 = 1;

/// Default number of calendar days shown after today.
pub const CALENDAR_DAYS_AFTER: i64 = 30;

/// Padding in days applied around a month when navigating the calendar.
pub const CALENDAR_MONTH_PADDING_DAYS: i64 = 7;

/// Message shown in an empty table body.
pub const EMPTY_TABLE_MESSAGE: &str = "No results.";

/// Message shown by the top-level error boundary.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// REST endpoints exposed by the attendify API.
pub mod endpoints {
    pub const AUTH_LOGIN: &str = "/auth/login";
    pub const AUTH_LOGOUT: &str = "/auth/logout";
    pub const AUTH_ME: &str = "/auth/me";
    pub const AUTH_REFRESH: &str = "/auth/refresh";

    pub const GROUPS: &str = "/group";
    pub const USERS: &str = "/user";
    pub const LOCATIONS: &str = "/location";
    pub const PROJECTS: &str = "/project";
    pub const ACTIVITIES: &str = "/activity";

    /// Upcoming events for the calendar (the server spells it this way).
    pub const PROJECTS_UPCOMING: &str = "/project/upcomming";

    /// Suffix appended to `/user/{group_id}` to list members of a group.
    pub const USERS_BY_GROUP_SUFFIX: &str = "get-by-group";

    /// Prefix for replacing the membership of a group: `{prefix}/{id}/edit`.
    pub const GROUP_MEMBERSHIP: &str = "/group/group-user";
}

/// Client-side routes of the dashboard.
pub mod routes {
    pub const HOME: &str = "/";
    pub const LOGIN: &str = "/login";
    pub const CALLBACK: &str = "/callback";
    pub const PROFILE: &str = "/profile";
    pub const CALENDAR: &str = "/calendar";
    pub const SCAN: &str = "/scan";

    pub const ACTIVITIES: &str = "/activities";
    pub const ACTIVITY_VIEW: &str = "/activity/:id";
    pub const MY_ACTIVITIES: &str = "/activities/me";

    pub const PROJECTS: &str = "/projects";
    pub const PROJECT_VIEW: &str = "/project/:id";
    pub const PROJECT_CREATE: &str = "/project/create";
    pub const PROJECT_EDIT: &str = "/project/:id/edit";
    pub const PROJECT_RESTORE: &str = "/project/restore";

    pub const LOCATIONS: &str = "/locations";
    pub const LOCATION_VIEW: &str = "/location/:id";

    pub const USERS: &str = "/users";
    pub const USER_VIEW: &str = "/user/:id";
    pub const USER_CREATE: &str = "/user/create";
    pub const USER_EDIT: &str = "/user/:id/edit";

    pub const GROUPS: &str = "/groups";
    pub const GROUP_VIEW: &str = "/group/:id";

    /// Substitutes the `:id` segment of a route template.
    #[must_use]
    pub fn with_id(template: &str, id: &str) -> String {
        template.replace(":id", id)
    }
}

/// Permission names granted to users by the API.
pub mod permissions {
    pub const USERS_BASE: &str = "users:base";
    pub const USERS_VIEW: &str = "users:view";
    pub const USERS_CREATE: &str = "users:create";
    pub const USERS_EDIT: &str = "users:edit";
    pub const USERS_DELETE: &str = "users:delete";

    pub const GROUPS_BASE: &str = "groups:base";
    pub const GROUPS_VIEW: &str = "groups:view";
    pub const GROUPS_CREATE: &str = "groups:create";
    pub const GROUPS_EDIT: &str = "groups:edit";
    pub const GROUPS_DELETE: &str = "groups:delete";

    pub const PROJECTS_BASE: &str = "projects:base";
    pub const PROJECTS_VIEW: &str = "projects:view";
    pub const PROJECTS_CREATE: &str = "projects:create";
    pub const PROJECTS_EDIT: &str = "projects:edit";
    pub const PROJECTS_DELETE: &str = "projects:delete";
    pub const PROJECTS_RESTORE: &str = "projects:restore";

    pub const ACTIVITIES_BASE: &str = "activities:base";
    pub const ACTIVITIES_VIEW: &str = "activities:view";
    pub const ACTIVITIES_MINE: &str = "activities:my_activities";

    pub const LOCATIONS_BASE: &str = "locations:base";
    pub const LOCATIONS_VIEW: &str = "locations:view";

    pub const CALENDAR_VIEW: &str = "calendar:view";
    pub const SCAN_PARTICIPATE: &str = "scan:participate";
}
