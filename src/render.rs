//! Plain-text rendering of dashboard panels for the terminal.

use std::collections::BTreeMap;

use crate::{
    analytics::{
        ActivityEntry, ActivitySplit, ChartPoint, DashboardStats, ReportStats,
        RestaurantSummary, UniversitySummary,
    },
    constants::CURRENCY,
    data_types::Role,
    navigation::SidebarEntry,
    panels::Panel,
};

const BAR_WIDTH: f64 = 30.0;

pub fn format_money(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{} {:.0}", CURRENCY, amount)
    } else {
        format!("{} {:.2}", CURRENCY, amount)
    }
}

/// Left-aligned columns separated by two spaces, with a dashed rule under the header.
pub fn table<S: AsRef<str>>(headers: &[S], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.as_ref().chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = line(headers.iter().map(|h| h.as_ref()).collect());
    out.push('\n');
    out += &"-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1));
    out.push('\n');
    for row in rows {
        out += &line(row.iter().map(String::as_str).collect());
        out.push('\n');
    }
    out
}

/// Shows the panel's loading or error state, else renders its data.
pub fn panel<T>(title: &str, panel: &Panel<T>, body: impl FnOnce(&T) -> String) -> String {
    let mut out = format!("== {} ==\n", title);
    if let Some(err) = panel.error() {
        out += &format!("! {}\n", err);
    } else if panel.is_loading() {
        out += "Loading...\n";
    } else if let Some(data) = panel.data() {
        out += &body(data);
    } else {
        out += "No data.\n";
    }
    out
}

/// Dashboard header line naming who is logged in.
pub fn greeting(role: Role, name: Option<&str>) -> String {
    match name {
        Some(name) => format!("Signed in as {} ({})\n", name, role),
        None => format!("Signed in as {}\n", role),
    }
}

pub fn sidebar(entries: &[SidebarEntry], collapsed: bool) -> String {
    entries
        .iter()
        .map(|entry| {
            let marker = if entry.active { '>' } else { ' ' };
            let label = if collapsed { entry.key } else { entry.title };
            format!("{} {}", marker, label)
        })
        .collect::<Vec<_>>()
        .join("\n")
        + "\n"
}

pub fn stats(stats: &DashboardStats, clients_label: &str) -> String {
    let mut msg = String::new();
    msg += &format!("{}: {}\n", clients_label, stats.total_clients);
    msg += &format!("Today's transactions: {}\n", stats.daily_transactions);
    msg += &format!("Monthly revenue: {}\n", format_money(stats.monthly_revenue));
    msg += &format!("Active: {}\n", stats.active_clients);
    msg += &format!("Weekly growth: {:+}%\n", stats.weekly_growth);
    msg
}

/// Horizontal bars scaled to the largest value.
pub fn chart(points: &[ChartPoint]) -> String {
    let max = points.iter().map(|p| p.value).fold(0.0_f64, f64::max);
    let mut msg = String::new();
    for point in points {
        let len = if max > 0.0 {
            ((point.value.max(0.0) / max) * BAR_WIDTH).round() as usize
        } else {
            0
        };
        msg += &format!(
            "{:>4} {:<width$} {}\n",
            point.label,
            "#".repeat(len),
            format_money(point.value),
            width = BAR_WIDTH as usize
        );
    }
    msg
}

pub fn activity_split(split: &ActivitySplit) -> String {
    format!("Active: {}  Inactive: {}\n", split.active, split.inactive)
}

pub fn activity(entries: &[ActivityEntry]) -> String {
    if entries.is_empty() {
        return "No recent activity.\n".to_string();
    }
    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|entry| {
            vec![
                entry.client.clone(),
                entry.action.to_string(),
                entry.amount.map(format_money).unwrap_or_default(),
                entry.time_ago.clone(),
            ]
        })
        .collect();
    table(&["Client", "Action", "Amount", "When"], &rows)
}

pub fn tally(title: &str, counts: &BTreeMap<String, usize>) -> String {
    let mut msg = format!("{}:\n", title);
    if counts.is_empty() {
        msg += "  (none)\n";
    }
    for (key, count) in counts {
        msg += &format!("  {}: {}\n", key, count);
    }
    msg
}

pub fn report(report: &ReportStats) -> String {
    let mut msg = format!("Total meals: {}\n", report.total_meals);
    msg += &format!("Restaurants served: {}\n", report.per_restaurant.len());
    msg += &tally("Meals per restaurant", &report.per_restaurant);
    msg += &tally("Meals per day", &report.per_day);
    msg
}

pub fn university_summary(summary: &UniversitySummary) -> String {
    format!(
        "Students: {}\nMeals: {}\nMeals per student: {:.1}\n",
        summary.total_students, summary.total_meals, summary.avg_meals_per_student
    )
}

pub fn restaurant_summary(summary: &RestaurantSummary) -> String {
    let mut msg = String::new();
    msg += &format!("Transactions: {}\n", summary.total_transactions);
    msg += &format!("Revenue: {}\n", format_money(summary.total_revenue));
    msg += &format!("Average daily revenue: {}\n", format_money(summary.avg_daily_revenue));
    msg += &format!("Top clients: {}\n", summary.top_client_count);
    msg += &format!("Purchases / top-ups: {} / {}\n", summary.purchases, summary.topups);
    msg
}

/// Device answers have no fixed shape; show them as pretty JSON.
pub fn json(value: Option<&serde_json::Value>) -> String {
    match value {
        Some(value) => serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()) + "\n",
        None => "(empty response)\n".to_string(),
    }
}
