//! Headless page state: modals, loaded lists and the actions a visitor or
//! admin can take. Rendering is left to whatever front end drives it.

pub mod admin_panel;
pub mod controller;
pub mod state;

pub use admin_panel::{AdminPanel, AdminTab};
pub use controller::SiteController;
pub use state::{AuthMode, Key, Notice, NoticeKind, ViewState};
