//! Entities managed through the attendify API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::endpoints;

/// A collection exposed by the API under a fixed base path.
///
/// `PATH` is used for listing (`GET {PATH}`) and mutations
/// (`{PATH}/create`, `{PATH}/{id}/edit`, `{PATH}/{id}/delete`).
pub trait Resource: Clone + Send + Sync + 'static {
    /// Base path of the collection, e.g. `/group`.
    const PATH: &'static str;
    /// Human-readable singular name used in messages.
    const LABEL: &'static str;

    /// Stable identifier of the entity.
    fn id(&self) -> &str;
}

/// Audit entry attached to most entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataLog {
    pub action: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
    #[serde(default)]
    pub meta: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Full name when known, otherwise the email address.
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.first_name.trim().is_empty() {
            return self.email.clone();
        }
        format!("{} {}", self.first_name, self.last_name).trim().to_owned()
    }
}

impl Resource for User {
    const PATH: &'static str = endpoints::USERS;
    const LABEL: &'static str = "user";

    fn id(&self) -> &str {
        &self.id
    }
}

/// The signed-in user together with granted roles and permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    #[serde(default)]
    pub roles: Vec<String>,
    /// The API has historically spelled this field `premissions`.
    #[serde(default, alias = "premissions")]
    pub permissions: Vec<String>,
}

impl UserProfile {
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub members: Vec<User>,
}

impl Resource for Group {
    const PATH: &'static str = endpoints::GROUPS;
    const LABEL: &'static str = "group";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventType {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub announce: bool,
}

/// An event, shown as a "project" in the dashboard routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub event_type_id: Option<String>,
    #[serde(default)]
    pub event_type: Option<EventType>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub announce: bool,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub banner: Option<String>,
    pub year: i32,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub data_logs: Vec<DataLog>,
}

impl Resource for Event {
    const PATH: &'static str = endpoints::PROJECTS;
    const LABEL: &'static str = "project";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub name: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    #[serde(default)]
    pub start_check_in: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_check_in: Option<DateTime<Utc>>,
    #[serde(default)]
    pub start_check_out: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_check_out: Option<DateTime<Utc>>,
    /// Allowed distance in metres between the participant and the location.
    #[serde(default)]
    pub check_radius: f64,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub is_register: bool,
    pub event_id: String,
    #[serde(default)]
    pub hour: f64,
}

impl Resource for Activity {
    const PATH: &'static str = endpoints::ACTIVITIES;
    const LABEL: &'static str = "activity";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub sub_locations: Vec<SubLocation>,
}

impl Resource for Location {
    const PATH: &'static str = endpoints::LOCATIONS;
    const LABEL: &'static str = "location";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubLocation {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub location_id: String,
}

/// Reference to a user inside a membership payload: `{ "id": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRef {
    pub id: String,
}

impl From<&User> for MemberRef {
    fn from(user: &User) -> Self {
        Self { id: user.id.clone() }
    }
}

/// Body for creating or editing a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupInput {
    pub name: String,
    pub description: String,
    pub users: Vec<MemberRef>,
}

/// Body for replacing a group's membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MembershipInput {
    pub users: Vec<MemberRef>,
}

impl MembershipInput {
    #[must_use]
    pub fn from_users(users: &[User]) -> Self {
        Self { users: users.iter().map(MemberRef::from).collect() }
    }
}
