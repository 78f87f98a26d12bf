//! Reductions over fetched logs and clients. Everything here is pure; the caller
//! passes `now` (in the timezone the calendar should follow).

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, TimeZone};

use crate::data_types::{
    admin_types::{Client, MealLog},
    stats_types::{ClientStats, MealAnalytics, RestaurantStats, RevenueAnalytics},
};

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub total_clients: usize,
    pub daily_transactions: usize,
    pub monthly_revenue: f64,
    pub active_clients: usize,
    /// Percent change of the last 7 days' transactions over the 7 before.
    pub weekly_growth: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivitySplit {
    pub active: usize,
    pub inactive: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEntry {
    pub client: String,
    pub action: &'static str,
    pub time_ago: String,
    pub amount: Option<f64>,
    pub is_topup: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportStats {
    pub total_meals: usize,
    pub per_restaurant: BTreeMap<String, usize>,
    /// Keyed by ISO date, `Unknown` for rows without a timestamp.
    pub per_day: BTreeMap<String, usize>,
}

fn local_date<Tz: TimeZone>(log: &MealLog, tz: &Tz) -> Option<NaiveDate> {
    log.timestamp
        .map(|ts| ts.with_timezone(tz).date_naive())
}

pub fn dashboard_stats<Tz: TimeZone>(
    clients: &[Client],
    logs: &[MealLog],
    now: &DateTime<Tz>,
) -> DashboardStats {
    let today = now.date_naive();
    let tz = now.timezone();

    DashboardStats {
        total_clients: clients.len(),
        daily_transactions: logs
            .iter()
            .filter(|log| local_date(log, &tz) == Some(today))
            .count(),
        monthly_revenue: monthly_revenue(logs, now),
        active_clients: activity_split(clients).active,
        weekly_growth: weekly_growth(logs, now),
    }
}

/// Revenue of the calendar month containing `now`.
pub fn monthly_revenue<Tz: TimeZone>(logs: &[MealLog], now: &DateTime<Tz>) -> f64 {
    let tz = now.timezone();
    logs.iter()
        .filter(|log| {
            local_date(log, &tz)
                .is_some_and(|date| date.year() == now.year() && date.month() == now.month())
        })
        .map(MealLog::revenue)
        .sum()
}

pub fn weekly_growth<Tz: TimeZone>(logs: &[MealLog], now: &DateTime<Tz>) -> i64 {
    let now = now.to_utc();
    let week_ago = now - Duration::days(7);
    let two_weeks_ago = now - Duration::days(14);

    let (mut last_week, mut previous_week) = (0usize, 0usize);
    for ts in logs.iter().filter_map(|log| log.timestamp) {
        if ts >= week_ago {
            last_week += 1;
        } else if ts >= two_weeks_ago {
            previous_week += 1;
        }
    }

    if previous_week > 0 {
        let change = (last_week as f64 - previous_week as f64) / previous_week as f64;
        (change * 100.0).round() as i64
    } else if last_week > 0 {
        100
    } else {
        0
    }
}

/// Revenue per calendar month, oldest first, ending with the month of `now`.
pub fn revenue_by_month<Tz: TimeZone>(
    logs: &[MealLog],
    now: &DateTime<Tz>,
    months: u32,
) -> Vec<ChartPoint> {
    let tz = now.timezone();
    let Some(this_month) = now.date_naive().with_day(1) else {
        return Vec::new();
    };

    (0..months)
        .rev()
        .filter_map(|back| this_month.checked_sub_months(Months::new(back)))
        .map(|month| ChartPoint {
            label: month.format("%b").to_string(),
            value: logs
                .iter()
                .filter(|log| {
                    local_date(log, &tz).is_some_and(|date| {
                        date.year() == month.year() && date.month() == month.month()
                    })
                })
                .map(MealLog::revenue)
                .sum(),
        })
        .collect()
}

/// Revenue per day, oldest first, ending with today.
pub fn revenue_by_day<Tz: TimeZone>(
    logs: &[MealLog],
    now: &DateTime<Tz>,
    days: i64,
) -> Vec<ChartPoint> {
    let tz = now.timezone();
    let today = now.date_naive();

    (0..days)
        .rev()
        .map(|back| today - Duration::days(back))
        .map(|day| ChartPoint {
            label: day.format("%a").to_string(),
            value: logs
                .iter()
                .filter(|log| local_date(log, &tz) == Some(day))
                .map(MealLog::revenue)
                .sum(),
        })
        .collect()
}

pub fn activity_split(clients: &[Client]) -> ActivitySplit {
    let active = clients.iter().filter(|client| client.is_active()).count();
    ActivitySplit {
        active,
        inactive: clients.len() - active,
    }
}

pub fn time_ago<Tz: TimeZone>(then: DateTime<chrono::Utc>, now: &DateTime<Tz>) -> String {
    let minutes = (now.to_utc() - then).num_minutes();
    if minutes < 1 {
        return "Just now".to_string();
    }
    if minutes < 60 {
        return format!("{} mins ago", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{} hour{} ago", hours, if hours > 1 { "s" } else { "" });
    }

    let days = hours / 24;
    format!("{} day{} ago", days, if days > 1 { "s" } else { "" })
}

/// The `limit` newest logs, newest first.
pub fn recent_activity<Tz: TimeZone>(
    logs: &[MealLog],
    now: &DateTime<Tz>,
    limit: usize,
) -> Vec<ActivityEntry> {
    let mut sorted: Vec<&MealLog> = logs.iter().collect();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    sorted
        .into_iter()
        .take(limit)
        .map(|log| {
            let is_topup = log.is_topup();
            let client = match log.client_label() {
                "" => "Unknown".to_string(),
                name => name.to_string(),
            };
            ActivityEntry {
                client,
                action: if is_topup { "Topped up" } else { "Purchased meal" },
                time_ago: log
                    .timestamp
                    .map(|ts| time_ago(ts, now))
                    .unwrap_or_default(),
                amount: log.transaction_amount(),
                is_topup,
            }
        })
        .collect()
}

/// Meal tallies for the report section. Only purchases count as meals.
pub fn report_stats<Tz: TimeZone>(logs: &[MealLog], tz: &Tz) -> ReportStats {
    let mut stats = ReportStats::default();

    for log in logs.iter().filter(|log| !log.is_topup()) {
        stats.total_meals += 1;

        let restaurant = match log.restaurant_label() {
            "" => "Unknown",
            name => name,
        };
        *stats
            .per_restaurant
            .entry(restaurant.to_string())
            .or_default() += 1;

        let day = local_date(log, tz)
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        *stats.per_day.entry(day).or_default() += 1;
    }

    stats
}

pub fn clients_by_year(clients: &[Client]) -> BTreeMap<String, usize> {
    let mut tally = BTreeMap::new();
    for client in clients {
        let year = client
            .year_of_study
            .map(|year| year.label())
            .unwrap_or("Unknown");
        *tally.entry(year.to_string()).or_default() += 1;
    }
    tally
}

pub fn clients_by_field(clients: &[Client]) -> BTreeMap<String, usize> {
    let mut tally = BTreeMap::new();
    for client in clients {
        let field = client
            .field_of_study
            .as_deref()
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .unwrap_or("Unknown");
        *tally.entry(field.to_string()).or_default() += 1;
    }
    tally
}

/// Revenue of logs stamped within `[from, to)`.
pub fn revenue_between<Tz: TimeZone>(
    logs: &[MealLog],
    from: &DateTime<Tz>,
    to: &DateTime<Tz>,
) -> f64 {
    let (from, to) = (from.to_utc(), to.to_utc());
    logs.iter()
        .filter(|log| log.timestamp.is_some_and(|ts| ts >= from && ts < to))
        .map(MealLog::revenue)
        .sum()
}

#[derive(Debug, Clone, PartialEq)]
pub struct UniversitySummary {
    pub total_students: u64,
    pub total_meals: u64,
    pub avg_meals_per_student: f64,
}

pub fn university_summary(stats: &ClientStats, meals: &MealAnalytics) -> UniversitySummary {
    let total_students: u64 = stats.by_year.iter().map(|row| row.count).sum();
    let total_meals: u64 = meals.by_year.iter().map(|row| row.total_meals).sum();

    UniversitySummary {
        total_students,
        total_meals,
        avg_meals_per_student: if total_students > 0 {
            total_meals as f64 / total_students as f64
        } else {
            0.0
        },
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestaurantSummary {
    pub total_transactions: u64,
    pub total_revenue: f64,
    pub avg_daily_revenue: f64,
    pub top_client_count: usize,
    pub purchases: u64,
    pub topups: u64,
}

pub fn restaurant_summary(stats: &RestaurantStats, revenue: &RevenueAnalytics) -> RestaurantSummary {
    let total_transactions: u64 = stats.daily.iter().map(|day| day.transaction_count).sum();
    let total_revenue: f64 = stats.daily.iter().map(|day| day.revenue).sum();
    let split = &revenue.purchases_vs_topups;

    RestaurantSummary {
        total_transactions,
        total_revenue,
        avg_daily_revenue: if total_transactions > 0 && !stats.daily.is_empty() {
            total_revenue / stats.daily.len() as f64
        } else {
            0.0
        },
        top_client_count: stats.top_clients.len(),
        purchases: split.purchases.iter().map(|row| row.count).sum(),
        topups: split.topups.iter().map(|row| row.count).sum(),
    }
}
