use crate::models::bookings::Booking;
use crate::models::destination::Destination;
use crate::models::package::Package;
use crate::models::user::UserProfile;
use crate::services::admin_service::{filter_bookings, page_count, paginate, AdminConsole};

pub const BOOKINGS_PER_PAGE: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AdminTab {
    #[default]
    Bookings,
    Users,
    Destinations,
    Packages,
}

impl AdminTab {
    pub const ALL: [AdminTab; 4] = [
        AdminTab::Bookings,
        AdminTab::Users,
        AdminTab::Destinations,
        AdminTab::Packages,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AdminTab::Bookings => "Bookings",
            AdminTab::Users => "Users",
            AdminTab::Destinations => "Destinations",
            AdminTab::Packages => "Packages",
        }
    }
}

/// Table state behind the admin console tabs.
#[derive(Debug, Clone)]
pub struct AdminPanel {
    pub tab: AdminTab,
    search: String,
    page: usize,
    per_page: usize,
    pub bookings: Vec<Booking>,
    pub users: Vec<UserProfile>,
    pub destinations: Vec<Destination>,
    pub packages: Vec<Package>,
}

impl Default for AdminPanel {
    fn default() -> Self {
        Self {
            tab: AdminTab::default(),
            search: String::new(),
            page: 0,
            per_page: BOOKINGS_PER_PAGE,
            bookings: Vec::new(),
            users: Vec::new(),
            destinations: Vec::new(),
            packages: Vec::new(),
        }
    }
}

impl AdminPanel {
    pub fn select_tab(&mut self, tab: AdminTab) {
        self.tab = tab;
        self.page = 0;
    }

    /// Reloads the rows behind the current tab.
    pub async fn refresh(&mut self, console: &AdminConsole) {
        match self.tab {
            AdminTab::Bookings => self.bookings = console.bookings().await,
            AdminTab::Users => self.users = console.users().await,
            AdminTab::Destinations => self.destinations = console.destinations().await,
            AdminTab::Packages => self.packages = console.packages().await,
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 0;
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        page_count(self.matching_bookings().len(), self.per_page)
    }

    pub fn next_page(&mut self) {
        if self.page + 1 < self.page_count() {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    pub fn matching_bookings(&self) -> Vec<&Booking> {
        filter_bookings(&self.bookings, &self.search)
    }

    /// The current page of bookings matching the search box.
    pub fn visible_bookings(&self) -> Vec<&Booking> {
        let matching = self.matching_bookings();
        paginate(&matching, self.page, self.per_page).to_vec()
    }
}
