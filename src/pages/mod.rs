mod admin;
mod auth;
mod document;
mod files;
mod hide_data;
mod layout;
mod preferences;

pub use admin::{PermissionsPage, RolesPage, SettingsPage, UsersPage};
pub use auth::{GoogleCallbackPage, LoginPage, SignupPage};
pub use document::DocumentPage;
pub use files::FileManagerPage;
pub use hide_data::HideDataPage;
pub use layout::RootAuthed;
pub use preferences::PreferencesPage;
