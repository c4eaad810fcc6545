pub(crate) mod auth;
pub(crate) mod calendar;
pub(crate) mod groups;
pub(crate) mod list;
