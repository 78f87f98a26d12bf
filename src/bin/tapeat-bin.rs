use std::{collections::BTreeMap, path::PathBuf};

use anyhow::{bail, Context};
use chrono::{Duration, Local};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::log_enabled;

use tapeat_dashboard::{
    analytics,
    constants::{APP_TITLE, DEFAULT_API_URL, DEFAULT_SESSION_FILE},
    dashboard::{AdminDashboard, RestaurantDashboard},
    data_backend::{auth_api, AdminBackend, RestaurantBackend},
    data_types::{
        admin_types::{Client, MealLog},
        device_types::OfflineTap,
        Role,
    },
    export::{write_export, ExportFormat, Table},
    forms::{
        AdminForm, AssumeYes, ClientDetailsForm, ClientForm, Confirm, EditRestaurantForm,
        LoginForm, RestaurantForm, SettingsForm,
    },
    navigation::{AdminSection, RestaurantSection, Route},
    render,
    session::AppContext,
    shared_main::{backend_for, build_context, logger_init, StdinConfirm},
};

/// Terminal dashboard for the Tape & Eat campus meal-card system.
/// {n}Admins manage restaurants, users and balances; restaurants manage their clients and devices.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Base URL of the Tape & Eat REST backend
    #[arg(long, env = "TAPEAT_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,
    /// Where the session token and preferences are kept (owner-only on Unix)
    #[arg(long, env = "TAPEAT_SESSION_FILE", default_value = DEFAULT_SESSION_FILE)]
    session_file: PathBuf,
    /// Enable verbose logging{n}[SETS env: RUST_LOG=debug]
    #[arg(short, long)]
    verbose: bool,
    /// Answer yes to every confirmation prompt
    #[arg(short, long)]
    yes: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum RoleArg {
    Admin,
    Restaurant,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Admin => Role::Admin,
            RoleArg::Restaurant => Role::Restaurant,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the session
    Login {
        #[arg(value_enum)]
        role: RoleArg,
        /// Username (admin) or email (restaurant)
        identifier: String,
        #[arg(short, long, env = "TAPEAT_PASSWORD")]
        password: String,
    },
    /// Create an admin account
    Signup {
        username: String,
        #[arg(short, long, env = "TAPEAT_PASSWORD")]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show who the stored session belongs to
    Whoami,
    /// Resolve a dashboard path against the stored session
    Open { path: String },
    /// Admin dashboard
    #[command(subcommand)]
    Admin(AdminCommand),
    /// Restaurant dashboard
    #[command(subcommand)]
    Restaurant(RestaurantCommand),
}

#[derive(Args, Debug)]
struct ClientArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    email: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    id_number: String,
    #[arg(long)]
    card: String,
    /// Y1..Y4, Y5+ or a bare number
    #[arg(long)]
    year: String,
    #[arg(long)]
    field: String,
}

impl From<ClientArgs> for ClientForm {
    fn from(args: ClientArgs) -> Self {
        ClientForm {
            name: args.name,
            email: args.email,
            phone: args.phone,
            id_number: args.id_number,
            card_number: args.card,
            year_of_study: args.year,
            field_of_study: args.field,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ExportTable {
    Logs,
    Clients,
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    /// Open a section: dashboard, restaurants, users, logs, report, university, settings
    Show {
        #[arg(default_value = "dashboard")]
        section: AdminSection,
        /// Collapse or expand the sidebar and remember the choice
        #[arg(long)]
        toggle_sidebar: bool,
    },
    AddRestaurant {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        meal_price: String,
        /// Comma separated device ids
        #[arg(long, default_value = "")]
        devices: String,
    },
    /// Edit a restaurant; omitted fields keep their current value
    EditRestaurant {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        meal_price: Option<String>,
        #[arg(long)]
        devices: Option<String>,
    },
    DeleteRestaurant { id: String },
    AddAdmin {
        username: String,
        #[arg(short, long, env = "TAPEAT_PASSWORD")]
        password: String,
    },
    DeleteAdmin { id: String },
    AddClient(ClientArgs),
    /// Add (or with a negative amount, take) money from a client's balance
    AdjustBalance {
        client_id: String,
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Defaults to the first restaurant
        #[arg(long)]
        restaurant: Option<String>,
    },
    Export {
        #[arg(value_enum)]
        table: ExportTable,
        format: ExportFormat,
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum RestaurantCommand {
    /// Open a section: dashboard, analytics, clients, logs, report, tap, settings
    Show {
        #[arg(default_value = "dashboard")]
        section: RestaurantSection,
        /// Collapse or expand the sidebar and remember the choice
        #[arg(long)]
        toggle_sidebar: bool,
    },
    AddClient(ClientArgs),
    ReplaceCard { card: String, new_card: String },
    EditClient {
        card: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        id_number: String,
    },
    TopUp { card: String, amount: String },
    /// Simulate a card tap on a device
    Tap { device: String, card: String },
    Balance { card: String },
    /// Put a device into card registration mode
    Register { device: String },
    /// Upload offline taps, each given as CARD=AMOUNT
    Sync {
        device: String,
        #[arg(long = "tap")]
        taps: Vec<String>,
    },
    /// Change settings; omitted fields keep their current value
    Settings {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        meal_price: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    Export {
        #[arg(value_enum)]
        table: ExportTable,
        format: ExportFormat,
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        std::env::set_var("RUST_LOG", "debug");
    }

    logger_init(module_path!());
    if log_enabled!(log::Level::Debug) {
        log::debug!("{} starting against {}", APP_TITLE, cli.api_url);
    }

    let ctx = build_context(&cli.api_url, &cli.session_file)?;
    let mut confirm: Box<dyn Confirm> = if cli.yes {
        Box::new(AssumeYes)
    } else {
        Box::new(StdinConfirm)
    };

    match cli.command {
        Command::Login {
            role,
            identifier,
            password,
        } => {
            let form = LoginForm {
                identifier,
                password,
            };
            let route = form.submit(&ctx, role.into()).await?;
            println!("Logged in. Continue at {}", route.path());
        }
        Command::Signup { username, password } => {
            let route = AdminForm { username, password }.signup(&ctx).await?;
            println!("Admin created. Continue at {}", route.path());
        }
        Command::Logout => {
            ctx.store.logout().await?;
            println!("Logged out. Continue at {}", Route::after_logout().path());
        }
        Command::Whoami => whoami(&ctx).await?,
        Command::Open { path } => {
            let route = Route::from_path(&path)?;
            let session = ctx.store.session().await.ok();
            println!("{}", route.guard(session.as_ref()).path());
        }
        Command::Admin(command) => admin(&ctx, command, confirm.as_mut()).await?,
        Command::Restaurant(command) => restaurant(&ctx, command).await?,
    }

    Ok(())
}

async fn whoami(ctx: &AppContext) -> anyhow::Result<()> {
    let session = ctx.store.session().await?;
    let profile = auth_api::resolve_identity(&ctx.api, &session).await?;

    println!("{} ({})", profile.display_name(), session.role);
    println!("id: {}", profile.id);
    if let Some(email) = &profile.email {
        println!("email: {}", email);
    }
    if let Some(price) = profile.meal_price {
        println!("meal price: {}", render::format_money(price));
    }
    if let Some(expires_at) = session.claims.expires_at() {
        println!(
            "session expires: {}",
            expires_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

async fn admin(
    ctx: &AppContext,
    command: AdminCommand,
    confirm: &mut dyn Confirm,
) -> anyhow::Result<()> {
    let (backend, session) = backend_for(ctx, Role::Admin).await?;
    let prefs = ctx.store.preferences().await?;
    let mut dash = AdminDashboard::new(backend, prefs.sidebar_collapsed(Role::Admin));

    match command {
        AdminCommand::Show {
            section,
            toggle_sidebar,
        } => {
            if toggle_sidebar {
                let collapsed = dash.shell.toggle_sidebar();
                remember_sidebar(ctx, Role::Admin, collapsed).await?;
            }
            let (name, _) = tokio::join!(
                auth_api::display_name(&ctx.api, &session),
                dash.enter(section)
            );
            print!("{}", render::greeting(Role::Admin, name.as_deref()));
            print!("{}", render::sidebar(&dash.shell.sidebar(), dash.shell.sidebar_collapsed()));
            println!();
            print!("{}", admin_section(&dash, ctx).await);
        }
        AdminCommand::AddRestaurant {
            name,
            email,
            password,
            meal_price,
            devices,
        } => {
            let form = RestaurantForm {
                name,
                email,
                password,
                meal_price,
                devices,
            };
            dash.create_restaurant(&form).await?;
            print!("{}", restaurants_table(&dash));
        }
        AdminCommand::EditRestaurant {
            id,
            name,
            email,
            meal_price,
            devices,
        } => {
            dash.enter(AdminSection::Restaurants).await;
            let Some(current) = dash.restaurants.items().iter().find(|r| r.id == id) else {
                bail!("No restaurant with id {}", id);
            };
            let mut form = EditRestaurantForm::from_restaurant(current);
            form.name = name.unwrap_or(form.name);
            form.email = email.unwrap_or(form.email);
            form.meal_price = meal_price.unwrap_or(form.meal_price);
            form.devices = devices.unwrap_or(form.devices);

            dash.update_restaurant(&id, &form).await?;
            print!("{}", restaurants_table(&dash));
        }
        AdminCommand::DeleteRestaurant { id } => {
            dash.enter(AdminSection::Restaurants).await;
            if dash.delete_restaurant(&id, &mut ForwardConfirm(confirm)).await? {
                print!("{}", restaurants_table(&dash));
            } else {
                println!("Cancelled.");
            }
        }
        AdminCommand::AddAdmin { username, password } => {
            dash.enter(AdminSection::Users).await;
            dash.create_admin(&AdminForm { username, password }).await?;
            print!("{}", admins_table(&dash));
        }
        AdminCommand::DeleteAdmin { id } => {
            dash.enter(AdminSection::Users).await;
            if dash.delete_admin(&id, &mut ForwardConfirm(confirm)).await? {
                print!("{}", admins_table(&dash));
            } else {
                println!("Cancelled.");
            }
        }
        AdminCommand::AddClient(args) => {
            dash.enter(AdminSection::Users).await;
            dash.create_client(&args.into()).await?;
            print!("{}", clients_table(dash.clients.items()));
        }
        AdminCommand::AdjustBalance {
            client_id,
            amount,
            restaurant,
        } => {
            dash.enter(AdminSection::Users).await;
            dash.adjust_balance(&client_id, restaurant.as_deref(), &amount)
                .await?;
            print!("{}", clients_table(dash.clients.items()));
        }
        AdminCommand::Export { table, format, dir } => {
            let table = match table {
                ExportTable::Logs => {
                    Table::admin_meal_logs(&fetch(AdminBackend::meal_logs(dash.backend())).await?)
                }
                ExportTable::Clients => {
                    Table::clients(&fetch(AdminBackend::clients(dash.backend())).await?)
                }
            };
            let path = write_export(&dir, &table, format).await?;
            println!("Saved {}", path.display());
        }
    }
    Ok(())
}

async fn restaurant(ctx: &AppContext, command: RestaurantCommand) -> anyhow::Result<()> {
    let (backend, session) = backend_for(ctx, Role::Restaurant).await?;
    let prefs = ctx.store.preferences().await?;
    let restaurant_id = prefs
        .restaurant_id
        .clone()
        .unwrap_or_else(|| session.subject().to_string());
    let mut dash = RestaurantDashboard::new(
        backend,
        restaurant_id,
        prefs.sidebar_collapsed(Role::Restaurant),
    );

    match command {
        RestaurantCommand::Show {
            section,
            toggle_sidebar,
        } => {
            if toggle_sidebar {
                let collapsed = dash.shell.toggle_sidebar();
                remember_sidebar(ctx, Role::Restaurant, collapsed).await?;
            }
            let (name, _) = tokio::join!(
                auth_api::display_name(&ctx.api, &session),
                dash.enter(section)
            );
            print!("{}", render::greeting(Role::Restaurant, name.as_deref()));
            print!("{}", render::sidebar(&dash.shell.sidebar(), dash.shell.sidebar_collapsed()));
            println!();
            print!("{}", restaurant_section(&dash));
        }
        RestaurantCommand::AddClient(args) => {
            dash.enter(RestaurantSection::Clients).await;
            dash.create_client(&args.into()).await?;
            print!("{}", clients_table(dash.clients.items()));
        }
        RestaurantCommand::ReplaceCard { card, new_card } => {
            dash.enter(RestaurantSection::Clients).await;
            dash.replace_card(&card, &new_card).await?;
            print!("{}", clients_table(dash.clients.items()));
        }
        RestaurantCommand::EditClient {
            card,
            name,
            phone,
            id_number,
        } => {
            dash.enter(RestaurantSection::Clients).await;
            let form = ClientDetailsForm {
                name,
                phone,
                id_number,
            };
            dash.update_details(&card, &form).await?;
            print!("{}", clients_table(dash.clients.items()));
        }
        RestaurantCommand::TopUp { card, amount } => {
            dash.enter(RestaurantSection::Clients).await;
            dash.top_up(&card, &amount).await?;
            print!("{}", clients_table(dash.clients.items()));
        }
        RestaurantCommand::Tap { device, card } => {
            let result = dash.tap(&device, &card).await?;
            match result.remaining() {
                Some(remaining) => println!(
                    "{}: remaining {}",
                    result.client(),
                    render::format_money(remaining)
                ),
                None => println!("{}: tap accepted", result.client()),
            }
        }
        RestaurantCommand::Balance { card } => {
            let lookup = dash.lookup_balance(&card).await?;
            println!("{} ({})", lookup.name, lookup.card_number);
            let rows: Vec<Vec<String>> = lookup
                .subscriptions
                .iter()
                .map(|sub| {
                    vec![
                        sub.restaurant_label().to_string(),
                        render::format_money(sub.balance),
                    ]
                })
                .collect();
            print!("{}", render::table(&["Restaurant", "Balance"], &rows));
        }
        RestaurantCommand::Register { device } => {
            print!("{}", render::json(dash.register_card(&device).await?.as_ref()));
        }
        RestaurantCommand::Sync { device, taps } => {
            let taps = taps
                .iter()
                .map(|raw| parse_offline_tap(raw))
                .collect::<anyhow::Result<Vec<_>>>()?;
            print!("{}", render::json(dash.sync_device(&device, &taps).await?.as_ref()));
        }
        RestaurantCommand::Settings {
            name,
            email,
            meal_price,
            password,
        } => {
            dash.enter(RestaurantSection::Settings).await;
            let Some(profile) = dash.profile.data() else {
                bail!(dash
                    .profile
                    .error()
                    .unwrap_or("Failed to fetch profile.")
                    .to_string());
            };
            let mut form = SettingsForm::from_profile(profile);
            form.name = name.unwrap_or(form.name);
            form.email = email.unwrap_or(form.email);
            form.meal_price = meal_price.unwrap_or(form.meal_price);
            form.password = password.unwrap_or_default();

            dash.update_settings(&form).await?;
            print!("{}", restaurant_section(&dash));
        }
        RestaurantCommand::Export { table, format, dir } => {
            let rid = dash.restaurant_id().to_string();
            let table = match table {
                ExportTable::Logs => Table::restaurant_meal_logs(
                    &fetch(RestaurantBackend::meal_logs(dash.backend(), &rid)).await?,
                ),
                ExportTable::Clients => {
                    Table::clients(&fetch(RestaurantBackend::clients(dash.backend(), &rid)).await?)
                }
            };
            let path = write_export(&dir, &table, format).await?;
            println!("Saved {}", path.display());
        }
    }
    Ok(())
}

async fn remember_sidebar(ctx: &AppContext, role: Role, collapsed: bool) -> anyhow::Result<()> {
    ctx.store
        .update_preferences(|prefs| prefs.set_sidebar_collapsed(role, collapsed))
        .await?;
    Ok(())
}

/// Lets a boxed prompt stand in where a sized `Confirm` is expected.
struct ForwardConfirm<'a>(&'a mut dyn Confirm);

impl Confirm for ForwardConfirm<'_> {
    fn confirm(&mut self, prompt: &str) -> bool {
        self.0.confirm(prompt)
    }
}

async fn fetch<T>(
    call: impl std::future::Future<Output = Result<T, tapeat_dashboard::errors::ApiError>>,
) -> anyhow::Result<T> {
    call.await.context("Failed to fetch export data")
}

fn parse_offline_tap(raw: &str) -> anyhow::Result<OfflineTap> {
    let Some((card, amount)) = raw.split_once('=') else {
        bail!("offline tap '{}' is not CARD=AMOUNT", raw);
    };
    let amount: f64 = amount
        .trim()
        .parse()
        .with_context(|| format!("bad amount in offline tap '{}'", raw))?;
    Ok(OfflineTap {
        card_number: card.trim().to_string(),
        offline_deducted: amount,
    })
}

fn restaurants_table<B: AdminBackend>(dash: &AdminDashboard<B>) -> String {
    render::panel("Restaurants", &dash.restaurants, |restaurants| {
        let rows: Vec<Vec<String>> = restaurants
            .iter()
            .map(|r| {
                vec![
                    r.id.clone(),
                    r.name.clone(),
                    r.email.clone(),
                    render::format_money(r.meal_price),
                    r.device_list(),
                ]
            })
            .collect();
        render::table(&["ID", "Name", "Email", "Meal price", "Devices"], &rows)
    })
}

fn admins_table<B: AdminBackend>(dash: &AdminDashboard<B>) -> String {
    render::panel("Admins", &dash.admins, |admins| {
        let rows: Vec<Vec<String>> = admins
            .iter()
            .map(|a| vec![a.id.clone(), a.username.clone()])
            .collect();
        render::table(&["ID", "Username"], &rows)
    })
}

fn clients_table(clients: &[Client]) -> String {
    let rows: Vec<Vec<String>> = clients
        .iter()
        .map(|c| {
            vec![
                c.id.clone(),
                c.name.clone(),
                c.card_number.clone(),
                c.year_of_study.map(|y| y.to_string()).unwrap_or_default(),
                c.field_of_study.clone().unwrap_or_default(),
                render::format_money(c.total_balance()),
            ]
        })
        .collect();
    render::table(&["ID", "Name", "Card", "Year", "Field", "Balance"], &rows)
}

fn client_tallies(clients: &[Client]) -> String {
    render::tally("By year of study", &analytics::clients_by_year(clients))
        + &render::tally("By field of study", &analytics::clients_by_field(clients))
}

/// Report tallies plus the revenue of the last 30 days.
fn report(logs: &[MealLog]) -> String {
    let now = Local::now();
    let month_ago = now - Duration::days(30);
    render::report(&analytics::report_stats(logs, &Local))
        + &format!(
            "Revenue, last 30 days: {}\n",
            render::format_money(analytics::revenue_between(logs, &month_ago, &now))
        )
}

fn logs_table(table: Table) -> String {
    render::table(&table.headers, &table.rows)
}

async fn admin_section<B: AdminBackend>(dash: &AdminDashboard<B>, ctx: &AppContext) -> String {
    let mut out = String::new();
    match dash.shell.active() {
        AdminSection::Dashboard => {
            out += &render::panel("Overview", &dash.stats, |s| render::stats(s, "Clients"));
            out += &render::panel("Monthly revenue", &dash.charts, |c| {
                render::chart(&c.monthly_revenue) + &render::activity_split(&c.activity)
            });
            out += &render::panel("Recent activity", &dash.activity, |a| render::activity(a));
        }
        AdminSection::Restaurants => out += &restaurants_table(dash),
        AdminSection::Users => {
            out += &admins_table(dash);
            out += &render::panel("Clients", &dash.clients, |c| {
                clients_table(c) + &client_tallies(c)
            });
        }
        AdminSection::Logs => {
            out += &render::panel("Meal logs", &dash.logs, |logs| {
                logs_table(Table::admin_meal_logs(logs))
            });
        }
        AdminSection::Report => {
            out += &render::panel("Report", &dash.logs, |logs| {
                report(logs)
            });
        }
        AdminSection::University => {
            out += &university(dash);
        }
        AdminSection::Settings => {
            let prefs = ctx.store.preferences().await.unwrap_or_default();
            out += &format!("API: {}\n", ctx.api.base_url());
            out += &format!("Session file: {}\n", ctx.store.path().display());
            out += &format!(
                "Sidebar: {}\n",
                if prefs.admin_sidebar_collapsed {
                    "collapsed"
                } else {
                    "expanded"
                }
            );
        }
    }
    out
}

fn university<B: AdminBackend>(dash: &AdminDashboard<B>) -> String {
    let mut out = String::new();
    if let (Some(stats), Some(meals)) = (dash.client_stats.data(), dash.meal_analytics.data()) {
        out += &render::university_summary(&analytics::university_summary(stats, meals));
    }
    out += &render::panel("Students by year", &dash.client_stats, |stats| {
        let counts: BTreeMap<String, usize> = stats
            .by_year
            .iter()
            .map(|row| (row.label().to_string(), row.count as usize))
            .collect();
        render::tally("Year of study", &counts)
    });
    out += &render::panel("Meals by field", &dash.meal_analytics, |meals| {
        let rows: Vec<Vec<String>> = meals
            .by_field
            .iter()
            .map(|row| {
                vec![
                    row.field_of_study.clone().unwrap_or_else(|| "Unknown".into()),
                    row.total_meals.to_string(),
                ]
            })
            .collect();
        render::table(&["Field", "Meals"], &rows)
    });
    out
}

fn restaurant_section<B: RestaurantBackend>(dash: &RestaurantDashboard<B>) -> String {
    let mut out = String::new();
    match dash.shell.active() {
        RestaurantSection::Dashboard => {
            out += &render::panel("Overview", &dash.stats, |s| render::stats(s, "Clients"));
            out += &render::panel("Daily revenue", &dash.charts, |c| {
                render::chart(&c.daily_revenue) + &render::activity_split(&c.activity)
            });
            out += &render::panel("Recent activity", &dash.activity, |a| render::activity(a));
        }
        RestaurantSection::Analytics => {
            if let (Some(stats), Some(revenue)) =
                (dash.restaurant_stats.data(), dash.revenue.data())
            {
                out += &render::restaurant_summary(&analytics::restaurant_summary(stats, revenue));
            }
            out += &render::panel("Revenue", &dash.revenue, |revenue| {
                let rows: Vec<Vec<String>> = revenue
                    .revenue
                    .iter()
                    .map(|point| {
                        vec![
                            point.period.clone().unwrap_or_default(),
                            render::format_money(point.revenue),
                        ]
                    })
                    .collect();
                render::table(&["Period", "Revenue"], &rows)
            });
            out += &render::panel("Top clients", &dash.restaurant_stats, |stats| {
                let rows: Vec<Vec<String>> = stats
                    .top_clients
                    .iter()
                    .map(|top| {
                        vec![
                            top.client_name.clone().unwrap_or_else(|| "Unknown".into()),
                            top.transaction_count.to_string(),
                        ]
                    })
                    .collect();
                render::table(&["Client", "Transactions"], &rows)
            });
        }
        RestaurantSection::Clients => {
            out += &render::panel("Clients", &dash.clients, |c| {
                clients_table(c) + &client_tallies(c)
            });
        }
        RestaurantSection::Logs => {
            out += &render::panel("Meal logs", &dash.logs, |logs| {
                logs_table(Table::restaurant_meal_logs(logs))
            });
        }
        RestaurantSection::Report => {
            out += &render::panel("Report", &dash.logs, |logs| {
                report(logs)
            });
        }
        RestaurantSection::Tap => {
            out += "Use `tapeat restaurant tap <device> <card>` to simulate a tap.\n";
        }
        RestaurantSection::Settings => {
            out += &render::panel("Settings", &dash.profile, |profile| {
                let mut msg = format!("Name: {}\n", profile.display_name());
                msg += &format!("Email: {}\n", profile.email.as_deref().unwrap_or("-"));
                if let Some(price) = profile.meal_price {
                    msg += &format!("Meal price: {}\n", render::format_money(price));
                }
                msg
            });
        }
    }
    out
}
