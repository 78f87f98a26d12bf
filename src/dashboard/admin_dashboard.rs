use chrono::{DateTime, Local, TimeZone};
use futures_util::future::join_all;

use crate::{
    analytics::{self, ActivityEntry, ActivitySplit, ChartPoint, DashboardStats},
    constants::{RECENT_ACTIVITY_LIMIT, REVENUE_CHART_MONTHS},
    dashboard::{reconcile, Reconcile, Upsert},
    data_backend::AdminBackend,
    data_types::{
        admin_types::{Admin, BalanceAdjustment, Client, MealLog, Restaurant},
        stats_types::{ClientStats, MealAnalytics},
    },
    errors::{ApiError, FormError},
    forms::{
        form_error, parse_adjustment, signup_error, AdminForm, ClientForm, Confirm,
        EditRestaurantForm, RestaurantForm,
    },
    navigation::{AdminSection, FetchKind, Shell, Transition},
    panels::Panel,
};

#[derive(Debug, Clone, PartialEq)]
pub struct AdminCharts {
    pub monthly_revenue: Vec<ChartPoint>,
    pub activity: ActivitySplit,
}

/// One finished fetch, not yet applied.
#[derive(Debug)]
pub enum AdminLoad {
    Stats(Result<DashboardStats, ApiError>),
    Charts(Result<AdminCharts, ApiError>),
    Activity(Result<Vec<ActivityEntry>, ApiError>),
    Restaurants(Result<Vec<Restaurant>, ApiError>),
    Admins(Result<Vec<Admin>, ApiError>),
    Clients(Result<Vec<Client>, ApiError>),
    MealLogs(Result<Vec<MealLog>, ApiError>),
    ClientStats(Result<ClientStats, ApiError>),
    MealAnalytics(Result<MealAnalytics, ApiError>),
}

pub struct AdminDashboard<B> {
    backend: B,
    pub shell: Shell<AdminSection>,
    pub stats: Panel<DashboardStats>,
    pub charts: Panel<AdminCharts>,
    pub activity: Panel<Vec<ActivityEntry>>,
    pub restaurants: Panel<Vec<Restaurant>>,
    pub admins: Panel<Vec<Admin>>,
    pub clients: Panel<Vec<Client>>,
    pub logs: Panel<Vec<MealLog>>,
    pub client_stats: Panel<ClientStats>,
    pub meal_analytics: Panel<MealAnalytics>,
}

impl<B: AdminBackend> AdminDashboard<B> {
    pub fn new(backend: B, sidebar_collapsed: bool) -> Self {
        AdminDashboard {
            backend,
            shell: Shell::new(sidebar_collapsed),
            stats: Panel::default(),
            charts: Panel::default(),
            activity: Panel::default(),
            restaurants: Panel::default(),
            admins: Panel::default(),
            clients: Panel::default(),
            logs: Panel::default(),
            client_stats: Panel::default(),
            meal_analytics: Panel::default(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Selects `section` and loads its panels.
    pub async fn enter(&mut self, section: AdminSection) -> Transition<AdminSection> {
        let transition = self.start(section);
        let loads = self.load(&transition, &Local::now()).await;
        self.apply(transition.generation, loads);
        transition
    }

    /// Switches section and marks its panels as loading. Other panels keep their data.
    pub fn start(&mut self, section: AdminSection) -> Transition<AdminSection> {
        let transition = self.shell.select(section);
        for kind in transition.fetches {
            self.begin(*kind, transition.generation);
        }
        transition
    }

    /// Runs all fetches of `transition` together.
    pub async fn load<Tz: TimeZone>(
        &self,
        transition: &Transition<AdminSection>,
        now: &DateTime<Tz>,
    ) -> Vec<AdminLoad> {
        join_all(transition.fetches.iter().map(|kind| self.fetch(*kind, now)))
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    /// Applies loads started under `generation`; stale ones are dropped. Returns how
    /// many were applied.
    pub fn apply(&mut self, generation: u64, loads: Vec<AdminLoad>) -> usize {
        if !self.shell.is_current(generation) {
            log::debug!(
                "dropping {} stale loads of generation {}",
                loads.len(),
                generation
            );
            return 0;
        }

        loads
            .into_iter()
            .map(|load| self.apply_one(generation, load))
            .filter(|applied| *applied)
            .count()
    }

    fn begin(&mut self, kind: FetchKind, generation: u64) {
        match kind {
            FetchKind::Stats => self.stats.begin(generation),
            FetchKind::ChartData => self.charts.begin(generation),
            FetchKind::RecentActivity => self.activity.begin(generation),
            FetchKind::Restaurants => self.restaurants.begin(generation),
            FetchKind::Admins => self.admins.begin(generation),
            FetchKind::Clients => self.clients.begin(generation),
            FetchKind::MealLogs => self.logs.begin(generation),
            FetchKind::ClientStats => self.client_stats.begin(generation),
            FetchKind::MealAnalytics => self.meal_analytics.begin(generation),
            FetchKind::RestaurantStats | FetchKind::RevenueAnalytics | FetchKind::Profile => {}
        }
    }

    async fn fetch<Tz: TimeZone>(&self, kind: FetchKind, now: &DateTime<Tz>) -> Option<AdminLoad> {
        let backend = &self.backend;
        let load = match kind {
            FetchKind::Stats => AdminLoad::Stats(
                tokio::try_join!(backend.clients(), backend.meal_logs())
                    .map(|(clients, logs)| analytics::dashboard_stats(&clients, &logs, now)),
            ),
            FetchKind::ChartData => AdminLoad::Charts(
                tokio::try_join!(backend.meal_logs(), backend.clients()).map(
                    |(logs, clients)| AdminCharts {
                        monthly_revenue: analytics::revenue_by_month(
                            &logs,
                            now,
                            REVENUE_CHART_MONTHS,
                        ),
                        activity: analytics::activity_split(&clients),
                    },
                ),
            ),
            FetchKind::RecentActivity => AdminLoad::Activity(
                backend
                    .meal_logs()
                    .await
                    .map(|logs| analytics::recent_activity(&logs, now, RECENT_ACTIVITY_LIMIT)),
            ),
            FetchKind::Restaurants => AdminLoad::Restaurants(backend.restaurants().await),
            FetchKind::Admins => AdminLoad::Admins(backend.admins().await),
            FetchKind::Clients => AdminLoad::Clients(backend.clients().await),
            FetchKind::MealLogs => AdminLoad::MealLogs(backend.meal_logs().await),
            FetchKind::ClientStats => AdminLoad::ClientStats(backend.client_stats().await),
            FetchKind::MealAnalytics => AdminLoad::MealAnalytics(backend.meal_analytics().await),
            FetchKind::RestaurantStats | FetchKind::RevenueAnalytics | FetchKind::Profile => {
                log::warn!("{:?} is not an admin panel", kind);
                return None;
            }
        };
        Some(load)
    }

    fn apply_one(&mut self, generation: u64, load: AdminLoad) -> bool {
        match load {
            AdminLoad::Stats(result) => {
                self.stats
                    .finish(generation, result, "Failed to fetch dashboard statistics.")
            }
            AdminLoad::Charts(result) => {
                self.charts
                    .finish(generation, result, "Failed to fetch chart data.")
            }
            AdminLoad::Activity(result) => {
                self.activity
                    .finish(generation, result, "Failed to fetch recent activity.")
            }
            AdminLoad::Restaurants(result) => {
                self.restaurants
                    .finish(generation, result, "Failed to fetch restaurants.")
            }
            AdminLoad::Admins(result) => {
                self.admins
                    .finish(generation, result, "Failed to fetch admins.")
            }
            AdminLoad::Clients(result) => {
                self.clients
                    .finish(generation, result, "Failed to fetch users.")
            }
            AdminLoad::MealLogs(result) => {
                self.logs
                    .finish(generation, result, "Failed to fetch meal logs.")
            }
            AdminLoad::ClientStats(result) => {
                self.client_stats
                    .finish(generation, result, "Failed to fetch client statistics.")
            }
            AdminLoad::MealAnalytics(result) => {
                self.meal_analytics
                    .finish(generation, result, "Failed to fetch meal analytics.")
            }
        }
    }

    /// Reloads one panel under the current generation.
    pub async fn refetch(&mut self, kind: FetchKind) {
        let generation = self.shell.generation();
        self.begin(kind, generation);
        if let Some(load) = self.fetch(kind, &Local::now()).await {
            self.apply_one(generation, load);
        }
    }

    async fn settle(&mut self, kind: FetchKind, outcome: Reconcile) -> Result<(), FormError> {
        match outcome {
            Reconcile::Done => Ok(()),
            Reconcile::Refetch => {
                self.refetch(kind).await;
                Ok(())
            }
            Reconcile::Conflict(err) => {
                self.refetch(kind).await;
                Err(err)
            }
            Reconcile::Failed(err) => Err(err),
        }
    }

    pub async fn create_restaurant(&mut self, form: &RestaurantForm) -> Result<(), FormError> {
        let payload = form.to_payload()?;
        let result = self.backend.create_restaurant(&payload).await;
        let outcome = reconcile(&mut self.restaurants, result, Upsert::Insert, |err| {
            form_error(err, "Failed to add restaurant.")
        });
        self.settle(FetchKind::Restaurants, outcome).await
    }

    pub async fn update_restaurant(
        &mut self,
        id: &str,
        form: &EditRestaurantForm,
    ) -> Result<(), FormError> {
        let payload = form.to_payload()?;
        let result = self.backend.update_restaurant(id, &payload).await;
        let outcome = reconcile(&mut self.restaurants, result, Upsert::Replace, |err| {
            form_error(err, "Failed to update restaurant.")
        });
        self.settle(FetchKind::Restaurants, outcome).await
    }

    /// Returns `Ok(false)` when the operator declines; nothing is sent then.
    pub async fn delete_restaurant(
        &mut self,
        id: &str,
        confirm: &mut impl Confirm,
    ) -> Result<bool, FormError> {
        let label = self
            .restaurants
            .items()
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.name.clone())
            .unwrap_or_else(|| id.to_string());
        if !confirm.confirm(&format!("Delete restaurant {}?", label)) {
            return Ok(false);
        }

        self.backend
            .delete_restaurant(id)
            .await
            .map_err(|err| form_error(&err, "Failed to delete restaurant."))?;
        self.restaurants.remove(id);
        log::info!("Deleted restaurant {}", id);
        Ok(true)
    }

    pub async fn create_admin(&mut self, form: &AdminForm) -> Result<(), FormError> {
        let payload = form.to_payload()?;
        let result = self.backend.create_admin(&payload).await;
        let outcome = reconcile(&mut self.admins, result, Upsert::Insert, signup_error);
        self.settle(FetchKind::Admins, outcome).await
    }

    pub async fn delete_admin(
        &mut self,
        id: &str,
        confirm: &mut impl Confirm,
    ) -> Result<bool, FormError> {
        let label = self
            .admins
            .items()
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.username.clone())
            .unwrap_or_else(|| id.to_string());
        if !confirm.confirm(&format!("Delete admin {}?", label)) {
            return Ok(false);
        }

        self.backend
            .delete_admin(id)
            .await
            .map_err(|err| form_error(&err, "Failed to delete admin."))?;
        self.admins.remove(id);
        log::info!("Deleted admin {}", id);
        Ok(true)
    }

    pub async fn create_client(&mut self, form: &ClientForm) -> Result<(), FormError> {
        let payload = form.to_admin_payload()?;
        let result = self.backend.create_client(&payload).await;
        let outcome = reconcile(&mut self.clients, result, Upsert::Insert, |err| {
            form_error(err, "Failed to create client.")
        });
        self.settle(FetchKind::Clients, outcome).await
    }

    /// Adds `amount` to the client's balance at `restaurant_id`, or at the first known
    /// restaurant when none is named.
    pub async fn adjust_balance(
        &mut self,
        client_id: &str,
        restaurant_id: Option<&str>,
        amount: &str,
    ) -> Result<(), FormError> {
        let amount = parse_adjustment(amount)?;

        let restaurant_id = match restaurant_id {
            Some(id) => id.to_string(),
            None => {
                if self.restaurants.data().is_none() {
                    self.refetch(FetchKind::Restaurants).await;
                }
                self.restaurants
                    .items()
                    .first()
                    .map(|r| r.id.clone())
                    .ok_or_else(|| FormError::Rejected("No restaurants available.".into()))?
            }
        };

        let adjustment = BalanceAdjustment {
            restaurant_id,
            amount,
        };
        let result = self.backend.adjust_balance(client_id, &adjustment).await;
        let outcome = reconcile(&mut self.clients, result, Upsert::Replace, |err| {
            form_error(err, "Failed to adjust balance.")
        });
        self.settle(FetchKind::Clients, outcome).await
    }
}
