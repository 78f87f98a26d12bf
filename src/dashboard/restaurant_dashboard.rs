use chrono::{DateTime, Local, TimeZone};
use futures_util::future::join_all;

use crate::{
    analytics::{self, ActivityEntry, ActivitySplit, ChartPoint, DashboardStats},
    constants::{RECENT_ACTIVITY_LIMIT, REVENUE_CHART_DAYS},
    dashboard::{reconcile, Reconcile, Upsert},
    data_backend::RestaurantBackend,
    data_types::{
        admin_types::{Client, MealLog, Profile},
        device_types::{BalanceLookup, DeviceResponse, OfflineTap, TapRequest, TapResult},
        stats_types::{RestaurantStats, RevenueAnalytics},
    },
    errors::{ApiError, FormError},
    forms::{
        form_error, parse_amount, require, restaurant_client_error, ClientDetailsForm,
        ClientForm, SettingsForm,
    },
    navigation::{FetchKind, RestaurantSection, Shell, Transition},
    panels::Panel,
};

#[derive(Debug, Clone, PartialEq)]
pub struct RestaurantCharts {
    pub daily_revenue: Vec<ChartPoint>,
    pub activity: ActivitySplit,
}

#[derive(Debug)]
pub enum RestaurantLoad {
    Stats(Result<DashboardStats, ApiError>),
    Charts(Result<RestaurantCharts, ApiError>),
    Activity(Result<Vec<ActivityEntry>, ApiError>),
    RestaurantStats(Result<RestaurantStats, ApiError>),
    Revenue(Result<RevenueAnalytics, ApiError>),
    Clients(Result<Vec<Client>, ApiError>),
    MealLogs(Result<Vec<MealLog>, ApiError>),
    Profile(Result<Profile, ApiError>),
}

/// The restaurant operator's view, scoped to one restaurant id.
pub struct RestaurantDashboard<B> {
    backend: B,
    restaurant_id: String,
    pub shell: Shell<RestaurantSection>,
    pub stats: Panel<DashboardStats>,
    pub charts: Panel<RestaurantCharts>,
    pub activity: Panel<Vec<ActivityEntry>>,
    pub restaurant_stats: Panel<RestaurantStats>,
    pub revenue: Panel<RevenueAnalytics>,
    pub clients: Panel<Vec<Client>>,
    pub logs: Panel<Vec<MealLog>>,
    pub profile: Panel<Profile>,
}

impl<B: RestaurantBackend> RestaurantDashboard<B> {
    pub fn new(backend: B, restaurant_id: impl Into<String>, sidebar_collapsed: bool) -> Self {
        RestaurantDashboard {
            backend,
            restaurant_id: restaurant_id.into(),
            shell: Shell::new(sidebar_collapsed),
            stats: Panel::default(),
            charts: Panel::default(),
            activity: Panel::default(),
            restaurant_stats: Panel::default(),
            revenue: Panel::default(),
            clients: Panel::default(),
            logs: Panel::default(),
            profile: Panel::default(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn restaurant_id(&self) -> &str {
        &self.restaurant_id
    }

    pub async fn enter(&mut self, section: RestaurantSection) -> Transition<RestaurantSection> {
        let transition = self.start(section);
        let loads = self.load(&transition, &Local::now()).await;
        self.apply(transition.generation, loads);
        transition
    }

    pub fn start(&mut self, section: RestaurantSection) -> Transition<RestaurantSection> {
        let transition = self.shell.select(section);
        for kind in transition.fetches {
            self.begin(*kind, transition.generation);
        }
        transition
    }

    pub async fn load<Tz: TimeZone>(
        &self,
        transition: &Transition<RestaurantSection>,
        now: &DateTime<Tz>,
    ) -> Vec<RestaurantLoad> {
        join_all(transition.fetches.iter().map(|kind| self.fetch(*kind, now)))
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    pub fn apply(&mut self, generation: u64, loads: Vec<RestaurantLoad>) -> usize {
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
            FetchKind::RestaurantStats => self.restaurant_stats.begin(generation),
            FetchKind::RevenueAnalytics => self.revenue.begin(generation),
            FetchKind::Clients => self.clients.begin(generation),
            FetchKind::MealLogs => self.logs.begin(generation),
            FetchKind::Profile => self.profile.begin(generation),
            FetchKind::Restaurants
            | FetchKind::Admins
            | FetchKind::ClientStats
            | FetchKind::MealAnalytics => {}
        }
    }

    async fn fetch<Tz: TimeZone>(
        &self,
        kind: FetchKind,
        now: &DateTime<Tz>,
    ) -> Option<RestaurantLoad> {
        let backend = &self.backend;
        let rid = self.restaurant_id.as_str();
        let load = match kind {
            FetchKind::Stats => RestaurantLoad::Stats(
                tokio::try_join!(backend.clients(rid), backend.meal_logs(rid))
                    .map(|(clients, logs)| analytics::dashboard_stats(&clients, &logs, now)),
            ),
            FetchKind::ChartData => RestaurantLoad::Charts(
                tokio::try_join!(backend.meal_logs(rid), backend.clients(rid)).map(
                    |(logs, clients)| RestaurantCharts {
                        daily_revenue: analytics::revenue_by_day(&logs, now, REVENUE_CHART_DAYS),
                        activity: analytics::activity_split(&clients),
                    },
                ),
            ),
            FetchKind::RecentActivity => RestaurantLoad::Activity(
                backend
                    .meal_logs(rid)
                    .await
                    .map(|logs| analytics::recent_activity(&logs, now, RECENT_ACTIVITY_LIMIT)),
            ),
            FetchKind::RestaurantStats => {
                RestaurantLoad::RestaurantStats(backend.restaurant_stats(rid).await)
            }
            FetchKind::RevenueAnalytics => {
                RestaurantLoad::Revenue(backend.revenue_analytics(rid).await)
            }
            FetchKind::Clients => RestaurantLoad::Clients(backend.clients(rid).await),
            FetchKind::MealLogs => RestaurantLoad::MealLogs(backend.meal_logs(rid).await),
            FetchKind::Profile => RestaurantLoad::Profile(backend.profile().await),
            FetchKind::Restaurants
            | FetchKind::Admins
            | FetchKind::ClientStats
            | FetchKind::MealAnalytics => {
                log::warn!("{:?} is not a restaurant panel", kind);
                return None;
            }
        };
        Some(load)
    }

    fn apply_one(&mut self, generation: u64, load: RestaurantLoad) -> bool {
        match load {
            RestaurantLoad::Stats(result) => {
                self.stats
                    .finish(generation, result, "Failed to fetch dashboard statistics.")
            }
            RestaurantLoad::Charts(result) => {
                self.charts
                    .finish(generation, result, "Failed to fetch chart data.")
            }
            RestaurantLoad::Activity(result) => {
                self.activity
                    .finish(generation, result, "Failed to fetch recent activity.")
            }
            RestaurantLoad::RestaurantStats(result) => self.restaurant_stats.finish(
                generation,
                result,
                "Failed to fetch restaurant statistics.",
            ),
            RestaurantLoad::Revenue(result) => {
                self.revenue
                    .finish(generation, result, "Failed to fetch revenue analytics.")
            }
            RestaurantLoad::Clients(result) => {
                self.clients
                    .finish(generation, result, "Failed to fetch clients.")
            }
            RestaurantLoad::MealLogs(result) => {
                self.logs
                    .finish(generation, result, "Failed to fetch meal logs.")
            }
            RestaurantLoad::Profile(result) => {
                self.profile
                    .finish(generation, result, "Failed to fetch profile.")
            }
        }
    }

    pub async fn refetch(&mut self, kind: FetchKind) {
        let generation = self.shell.generation();
        self.begin(kind, generation);
        if let Some(load) = self.fetch(kind, &Local::now()).await {
            self.apply_one(generation, load);
        }
    }

    async fn settle_clients(&mut self, outcome: Reconcile) -> Result<(), FormError> {
        match outcome {
            Reconcile::Done => Ok(()),
            Reconcile::Refetch => {
                self.refetch(FetchKind::Clients).await;
                Ok(())
            }
            Reconcile::Conflict(err) => {
                self.refetch(FetchKind::Clients).await;
                Err(err)
            }
            Reconcile::Failed(err) => Err(err),
        }
    }

    /// Registers a client subscribed to this restaurant.
    pub async fn create_client(&mut self, form: &ClientForm) -> Result<(), FormError> {
        let payload = form.to_restaurant_payload(&self.restaurant_id)?;
        let result = self.backend.create_client(&payload).await;
        let outcome = reconcile(
            &mut self.clients,
            result,
            Upsert::Insert,
            restaurant_client_error,
        );
        self.settle_clients(outcome).await
    }

    pub async fn replace_card(
        &mut self,
        card_number: &str,
        new_card_number: &str,
    ) -> Result<(), FormError> {
        require(&[card_number, new_card_number])?;
        let result = self
            .backend
            .replace_card(card_number.trim(), new_card_number.trim())
            .await;
        let outcome = reconcile(&mut self.clients, result, Upsert::Replace, |err| {
            form_error(err, "Failed to replace card.")
        });
        self.settle_clients(outcome).await
    }

    pub async fn update_details(
        &mut self,
        card_number: &str,
        form: &ClientDetailsForm,
    ) -> Result<(), FormError> {
        require(&[card_number])?;
        let details = form.to_payload()?;
        let result = self
            .backend
            .update_details(card_number.trim(), &self.restaurant_id, &details)
            .await;
        let outcome = reconcile(&mut self.clients, result, Upsert::Replace, |err| {
            form_error(err, "Failed to update client.")
        });
        self.settle_clients(outcome).await
    }

    pub async fn top_up(&mut self, card_number: &str, amount: &str) -> Result<(), FormError> {
        require(&[card_number])?;
        let amount = parse_amount(amount)?;
        let result = self
            .backend
            .top_up(card_number.trim(), &self.restaurant_id, amount)
            .await;
        let outcome = reconcile(&mut self.clients, result, Upsert::Replace, |err| {
            form_error(err, "Failed to top up.")
        });
        self.settle_clients(outcome).await
    }

    /// Simulates a card tap on `device_id`.
    pub async fn tap(&self, device_id: &str, card_number: &str) -> Result<TapResult, FormError> {
        require(&[device_id, card_number])?;
        let request = TapRequest {
            device_id: device_id.trim().to_string(),
            card_number: card_number.trim().to_string(),
        };
        let result = self
            .backend
            .tap(&request)
            .await
            .map_err(|err| form_error(&err, "Tap failed."))?;
        log::info!(
            "Tap on {} for {}, remaining {:?}",
            request.device_id,
            result.client(),
            result.remaining()
        );
        Ok(result)
    }

    pub async fn lookup_balance(&self, card_number: &str) -> Result<BalanceLookup, FormError> {
        require(&[card_number])?;
        self.backend
            .lookup_balance(card_number.trim())
            .await
            .map_err(|err| form_error(&err, "Balance lookup failed."))
    }

    pub async fn register_card(&self, device_id: &str) -> Result<DeviceResponse, FormError> {
        require(&[device_id])?;
        self.backend
            .register_card(device_id.trim())
            .await
            .map_err(|err| form_error(&err, "Card registration failed."))
    }

    pub async fn sync_device(
        &self,
        device_id: &str,
        taps: &[OfflineTap],
    ) -> Result<DeviceResponse, FormError> {
        require(&[device_id])?;
        self.backend
            .sync_device(device_id.trim(), taps)
            .await
            .map_err(|err| form_error(&err, "Device sync failed."))
    }

    /// Saves the restaurant's own settings, then reloads the profile.
    pub async fn update_settings(&mut self, form: &SettingsForm) -> Result<(), FormError> {
        let update = form.to_payload()?;
        let saved = self
            .backend
            .update_settings(&self.restaurant_id, &update)
            .await
            .map_err(|err| form_error(&err, "Failed to update settings."))?;

        match saved {
            Some(restaurant) => self.profile.set(Profile::from(restaurant)),
            None => self.refetch(FetchKind::Profile).await,
        }
        log::info!("Updated settings of restaurant {}", self.restaurant_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data_types::{ActionType, YearOfStudy},
        test_utils::{client, log_at, restaurant, ts, FakeRestaurantBackend},
    };

    fn backend() -> FakeRestaurantBackend {
        let backend = FakeRestaurantBackend {
            profile: Some(restaurant("r1", "Main Campus")),
            logs: vec![
                log_at(ts("2024-03-20T08:00:00Z"), None, 1000.0, 800.0),
                log_at(
                    ts("2024-03-18T08:00:00Z"),
                    Some(ActionType::Topup),
                    0.0,
                    5000.0,
                ),
            ],
            ..Default::default()
        };
        *backend.clients.borrow_mut() = vec![
            client("c1", "Ann", YearOfStudy::Y1, "CS", 1000.0),
            client("c2", "Ben", YearOfStudy::Y2, "Math", 0.0),
        ];
        backend
    }

    #[tokio::test]
    async fn dashboard_entry_is_scoped_to_the_restaurant() {
        let mut dash = RestaurantDashboard::new(backend(), "r1", false);
        let transition = dash.start(RestaurantSection::Dashboard);
        let loads = dash.load(&transition, &ts("2024-03-20T12:00:00Z")).await;
        assert_eq!(dash.apply(transition.generation, loads), 3);

        assert_eq!(dash.backend.count("meal_logs"), 3);
        assert_eq!(dash.backend.count("clients"), 2);
        assert_eq!(
            dash.backend.last_restaurant_id.borrow().as_deref(),
            Some("r1")
        );

        let charts = dash.charts.data().unwrap();
        assert_eq!(charts.daily_revenue.len(), 7);
        let activity = dash.activity.data().unwrap();
        assert_eq!(activity[0].action, "Purchased meal");
        assert_eq!(activity[1].action, "Topped up");
    }

    #[tokio::test]
    async fn tap_section_fetches_nothing() {
        let mut dash = RestaurantDashboard::new(backend(), "r1", false);
        dash.enter(RestaurantSection::Tap).await;
        assert_eq!(dash.backend.calls.borrow().len(), 0);
    }

    #[tokio::test]
    async fn settings_loads_profile_or_reports_error() {
        let mut dash = RestaurantDashboard::new(backend(), "r1", false);
        dash.enter(RestaurantSection::Settings).await;
        assert_eq!(
            dash.profile.data().map(|p| p.display_name()),
            Some("Main Campus")
        );

        let mut missing = RestaurantDashboard::new(FakeRestaurantBackend::default(), "r9", false);
        missing.enter(RestaurantSection::Settings).await;
        assert_eq!(missing.profile.error(), Some("Restaurant not found"));
    }

    #[tokio::test]
    async fn created_client_is_inserted() {
        let mut dash = RestaurantDashboard::new(backend(), "r1", false);
        dash.enter(RestaurantSection::Clients).await;

        let form = ClientForm {
            name: "Cleo".into(),
            phone: "0781111111".into(),
            id_number: "ID-9".into(),
            card_number: "CARD-9".into(),
            year_of_study: "3".into(),
            field_of_study: "Law".into(),
            ..Default::default()
        };
        dash.create_client(&form).await.unwrap();
        assert_eq!(dash.clients.items().len(), 3);
        assert_eq!(dash.backend.count("clients"), 1);
    }

    #[tokio::test]
    async fn client_created_before_loading_refetches() {
        let mut dash = RestaurantDashboard::new(backend(), "r1", false);
        let form = ClientForm {
            name: "Cleo".into(),
            phone: "0781111111".into(),
            id_number: "ID-9".into(),
            card_number: "CARD-9".into(),
            year_of_study: "3".into(),
            field_of_study: "Law".into(),
            ..Default::default()
        };
        dash.create_client(&form).await.unwrap();
        assert_eq!(dash.clients.items().len(), 3);
        assert_eq!(dash.backend.count("clients"), 1);
    }

    #[tokio::test]
    async fn duplicate_card_is_reported() {
        let mut dash = RestaurantDashboard::new(backend(), "r1", false);
        dash.backend.fail_next("create_client", 400, "E11000");
        let form = ClientForm {
            name: "Cleo".into(),
            phone: "0781111111".into(),
            id_number: "ID-9".into(),
            card_number: "CARD-c1".into(),
            year_of_study: "1".into(),
            field_of_study: "Law".into(),
            ..Default::default()
        };
        let err = dash.create_client(&form).await.unwrap_err();
        assert_eq!(err.to_string(), crate::constants::CARD_EXISTS_MSG);
    }

    #[tokio::test]
    async fn card_replacement_updates_the_cached_client() {
        let mut dash = RestaurantDashboard::new(backend(), "r1", false);
        dash.enter(RestaurantSection::Clients).await;

        dash.replace_card("CARD-c2", "CARD-NEW").await.unwrap();
        assert_eq!(dash.clients.items()[1].card_number, "CARD-NEW");
        assert_eq!(dash.clients.items()[0].card_number, "CARD-c1");
        assert_eq!(dash.backend.count("clients"), 1);
    }

    #[tokio::test]
    async fn top_up_without_record_refetches() {
        let mut dash = RestaurantDashboard::new(backend(), "r1", false);
        dash.enter(RestaurantSection::Clients).await;

        dash.top_up("CARD-c1", "1500").await.unwrap();
        assert_eq!(dash.backend.count("top_up"), 1);
        assert_eq!(dash.backend.count("clients"), 2);

        assert_eq!(
            dash.top_up("CARD-c1", "-5").await,
            Err(FormError::InvalidAmount("-5".into()))
        );
        assert_eq!(dash.backend.count("top_up"), 1);
    }

    #[tokio::test]
    async fn tap_needs_device_and_card() {
        let dash = RestaurantDashboard::new(backend(), "r1", false);
        assert_eq!(
            dash.tap("dev-r1", " ").await.unwrap_err(),
            FormError::MissingFields
        );

        let result = dash.tap("dev-r1", "CARD-c1").await.unwrap();
        assert_eq!(result.client(), "holder of CARD-c1");
        assert_eq!(result.remaining(), Some(500.0));
    }

    #[tokio::test]
    async fn settings_save_reloads_profile() {
        let mut dash = RestaurantDashboard::new(backend(), "r1", false);
        let form = SettingsForm {
            name: "Main Campus".into(),
            email: "r1@campus.rw".into(),
            meal_price: "600".into(),
            password: String::new(),
        };
        dash.update_settings(&form).await.unwrap();
        assert_eq!(dash.backend.count("update_settings"), 1);
        assert_eq!(dash.backend.count("profile"), 1);
        assert!(dash.profile.data().is_some());
    }
}
