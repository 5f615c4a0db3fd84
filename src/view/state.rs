use std::collections::HashSet;

use uuid::Uuid;

use crate::models::bookings::Booking;
use crate::models::destination::Destination;
use crate::models::package::Package;
use crate::models::user::UserProfile;
use crate::models::wishlist::WishlistItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    SignIn,
    SignUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A message shown to the visitor after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// One slot per modal category; any combination may be open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modals {
    pub booking: bool,
    pub auth: Option<AuthMode>,
    pub admin: bool,
    pub dashboard: bool,
    /// Index into the loaded destinations.
    pub destination_detail: Option<usize>,
}

pub fn wrap_next(index: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        (index + 1) % len
    }
}

pub fn wrap_prev(index: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        (index + len - 1) % len
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub modals: Modals,
    /// Package name preselected in the booking form.
    pub selected_package: Option<String>,
    pub destinations: Vec<Destination>,
    pub packages: Vec<Package>,
    pub profile: Option<UserProfile>,
    pub wishlist: HashSet<Uuid>,
    pub wishlist_items: Vec<WishlistItem>,
    pub booking_history: Vec<Booking>,
    pub auth_error: Option<String>,
    pub notice: Option<Notice>,
}

impl ViewState {
    pub fn open_destination(&mut self, index: usize) {
        if index < self.destinations.len() {
            self.modals.destination_detail = Some(index);
        }
    }

    pub fn close_destination(&mut self) {
        self.modals.destination_detail = None;
    }

    pub fn current_destination(&self) -> Option<&Destination> {
        self.modals
            .destination_detail
            .and_then(|index| self.destinations.get(index))
    }

    pub fn next_destination(&mut self) {
        let len = self.destinations.len();
        if let Some(index) = self.modals.destination_detail.as_mut() {
            *index = wrap_next(*index, len);
        }
    }

    pub fn prev_destination(&mut self) {
        let len = self.destinations.len();
        if let Some(index) = self.modals.destination_detail.as_mut() {
            *index = wrap_prev(*index, len);
        }
    }

    /// Arrow keys page through destinations and Escape closes the detail
    /// view. Returns false when the key was ignored.
    pub fn handle_key(&mut self, key: Key) -> bool {
        if self.modals.destination_detail.is_none() {
            return false;
        }
        match key {
            Key::Left => self.prev_destination(),
            Key::Right => self.next_destination(),
            Key::Escape => self.close_destination(),
        }
        true
    }

    pub fn is_wishlisted(&self, package_id: Uuid) -> bool {
        self.wishlist.contains(&package_id)
    }

    pub(crate) fn set_wishlisted(&mut self, package_id: Uuid, member: bool) {
        if member {
            self.wishlist.insert(package_id);
        } else {
            self.wishlist.remove(&package_id);
        }
    }

    /// Drops everything tied to the signed-in user.
    pub(crate) fn clear_user(&mut self) {
        self.profile = None;
        self.wishlist.clear();
        self.wishlist_items.clear();
        self.booking_history.clear();
        self.modals.dashboard = false;
    }
}
