use std::{fmt::Debug, str::FromStr};

use crate::{data_types::Role, errors::NavigationError, session::Session};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Signup,
    AdminDashboard,
    RestaurantDashboard,
}

impl Route {
    pub fn from_path(path: &str) -> Result<Route, NavigationError> {
        match path.trim_end_matches('/') {
            "" | "/login" => Ok(Route::Login),
            "/signup" => Ok(Route::Signup),
            "/admin" => Ok(Route::AdminDashboard),
            "/restaurant" => Ok(Route::RestaurantDashboard),
            _ => Err(NavigationError::UnknownRoute(path.to_string())),
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::AdminDashboard => "/admin",
            Route::RestaurantDashboard => "/restaurant",
        }
    }

    pub fn for_role(role: Role) -> Route {
        match role {
            Role::Admin => Route::AdminDashboard,
            Role::Restaurant => Route::RestaurantDashboard,
        }
    }

    /// Dashboards need a session; everything else is public.
    pub fn guard(self, session: Option<&Session>) -> Route {
        match (self, session) {
            (Route::AdminDashboard | Route::RestaurantDashboard, None) => Route::Login,
            (route, _) => route,
        }
    }

    pub fn after_logout() -> Route {
        Route::Login
    }
}

/// One independent data load a section performs on entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FetchKind {
    Stats,
    ChartData,
    RecentActivity,
    Restaurants,
    Admins,
    Clients,
    MealLogs,
    ClientStats,
    MealAnalytics,
    RestaurantStats,
    RevenueAnalytics,
    Profile,
}

const DASHBOARD_FETCHES: &[FetchKind] = &[
    FetchKind::Stats,
    FetchKind::ChartData,
    FetchKind::RecentActivity,
];

pub trait Section: Copy + Eq + Debug + FromStr<Err = NavigationError> + 'static {
    /// Sidebar order; the first entry is where a dashboard opens.
    const ALL: &'static [Self];

    fn key(self) -> &'static str;
    fn title(self) -> &'static str;
    fn fetches(self) -> &'static [FetchKind];

    fn parse_key(key: &str) -> Result<Self, NavigationError> {
        Self::ALL
            .iter()
            .copied()
            .find(|section| section.key().eq_ignore_ascii_case(key.trim()))
            .ok_or_else(|| NavigationError::UnknownSection(key.to_string()))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AdminSection {
    Dashboard,
    Restaurants,
    Users,
    Logs,
    Report,
    University,
    Settings,
}

impl Section for AdminSection {
    const ALL: &'static [Self] = &[
        AdminSection::Dashboard,
        AdminSection::Restaurants,
        AdminSection::Users,
        AdminSection::Logs,
        AdminSection::Report,
        AdminSection::University,
        AdminSection::Settings,
    ];

    fn key(self) -> &'static str {
        match self {
            AdminSection::Dashboard => "dashboard",
            AdminSection::Restaurants => "restaurants",
            AdminSection::Users => "users",
            AdminSection::Logs => "logs",
            AdminSection::Report => "report",
            AdminSection::University => "university",
            AdminSection::Settings => "settings",
        }
    }

    fn title(self) -> &'static str {
        match self {
            AdminSection::Dashboard => "Dashboard",
            AdminSection::Restaurants => "Restaurants",
            AdminSection::Users => "Users",
            AdminSection::Logs => "Meal Logs",
            AdminSection::Report => "Report",
            AdminSection::University => "University Analytics",
            AdminSection::Settings => "Settings",
        }
    }

    fn fetches(self) -> &'static [FetchKind] {
        match self {
            AdminSection::Dashboard => DASHBOARD_FETCHES,
            AdminSection::Restaurants => &[FetchKind::Restaurants],
            AdminSection::Users => &[FetchKind::Admins, FetchKind::Clients],
            AdminSection::Logs | AdminSection::Report => &[FetchKind::MealLogs],
            AdminSection::University => &[FetchKind::ClientStats, FetchKind::MealAnalytics],
            AdminSection::Settings => &[],
        }
    }
}

impl FromStr for AdminSection {
    type Err = NavigationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_key(s)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RestaurantSection {
    Dashboard,
    Analytics,
    Clients,
    Logs,
    Report,
    Tap,
    Settings,
}

impl Section for RestaurantSection {
    const ALL: &'static [Self] = &[
        RestaurantSection::Dashboard,
        RestaurantSection::Analytics,
        RestaurantSection::Clients,
        RestaurantSection::Logs,
        RestaurantSection::Report,
        RestaurantSection::Tap,
        RestaurantSection::Settings,
    ];

    fn key(self) -> &'static str {
        match self {
            RestaurantSection::Dashboard => "dashboard",
            RestaurantSection::Analytics => "analytics",
            RestaurantSection::Clients => "clients",
            RestaurantSection::Logs => "logs",
            RestaurantSection::Report => "report",
            RestaurantSection::Tap => "tap",
            RestaurantSection::Settings => "settings",
        }
    }

    fn title(self) -> &'static str {
        match self {
            RestaurantSection::Dashboard => "Dashboard",
            RestaurantSection::Analytics => "Analytics",
            RestaurantSection::Clients => "Clients",
            RestaurantSection::Logs => "Meal Logs",
            RestaurantSection::Report => "Report",
            RestaurantSection::Tap => "Card Tap",
            RestaurantSection::Settings => "Settings",
        }
    }

    fn fetches(self) -> &'static [FetchKind] {
        match self {
            RestaurantSection::Dashboard => DASHBOARD_FETCHES,
            RestaurantSection::Analytics => {
                &[FetchKind::RestaurantStats, FetchKind::RevenueAnalytics]
            }
            RestaurantSection::Clients => &[FetchKind::Clients],
            RestaurantSection::Logs | RestaurantSection::Report => &[FetchKind::MealLogs],
            RestaurantSection::Tap => &[],
            RestaurantSection::Settings => &[FetchKind::Profile],
        }
    }
}

impl FromStr for RestaurantSection {
    type Err = NavigationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_key(s)
    }
}

/// What the dashboard must do after a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition<S> {
    pub section: S,
    pub generation: u64,
    pub fetches: &'static [FetchKind],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarEntry {
    pub key: &'static str,
    pub title: &'static str,
    pub active: bool,
}

/// Exactly one active section, plus the generation that identifies this entry into it.
#[derive(Debug, Clone)]
pub struct Shell<S: Section> {
    active: S,
    generation: u64,
    sidebar_collapsed: bool,
}

impl<S: Section> Shell<S> {
    pub fn new(sidebar_collapsed: bool) -> Self {
        Shell {
            active: S::ALL[0],
            generation: 0,
            sidebar_collapsed,
        }
    }

    pub fn active(&self) -> S {
        self.active
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Re-selecting the active section counts as a fresh entry.
    pub fn select(&mut self, section: S) -> Transition<S> {
        self.active = section;
        self.generation += 1;
        log::debug!("section -> {} (gen {})", section.key(), self.generation);

        Transition {
            section,
            generation: self.generation,
            fetches: section.fetches(),
        }
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    pub fn sidebar_collapsed(&self) -> bool {
        self.sidebar_collapsed
    }

    pub fn toggle_sidebar(&mut self) -> bool {
        self.sidebar_collapsed = !self.sidebar_collapsed;
        self.sidebar_collapsed
    }

    pub fn sidebar(&self) -> Vec<SidebarEntry> {
        S::ALL
            .iter()
            .map(|section| SidebarEntry {
                key: section.key(),
                title: section.title(),
                active: *section == self.active,
            })
            .collect()
    }
}
