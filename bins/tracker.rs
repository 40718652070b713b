//! `tracker`: command-line front end for the maintenance record keeper.
//!
//! Talks to the resource store at `client.base_url` and keeps the signed-in
//! state in `client.session_file`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;

use configs::AppConfig;
use models::Record;
use service::auth::{settle, AuthService, LoginInput, RegisterInput, Route};
use service::client::{RecordsApi, ResourceClient};
use service::dashboard::DashboardStats;
use service::navigation::{DropPosition, Sidebar};
use service::pagination::Pagination;
use service::profile::{Identity, ProfileEditor};
use service::records::{plate_options, Field, RecordEntryBuilder, RecordQuery, RecordsService};
use service::session::{FileSessionStore, IdentityFeed, PollingFeed, SessionContext};

#[derive(Parser)]
#[command(name = "tracker")]
#[command(about = "Vehicle maintenance records from the command line")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Repeat of the password
        #[arg(long)]
        confirm: String,
    },
    Logout,
    /// Show who is signed in
    Whoami {
        /// Keep printing whenever the identity changes
        #[arg(long)]
        follow: bool,
    },
    /// Summary statistics over all records
    Dashboard {
        #[arg(long)]
        json: bool,
    },
    /// List records with search, filters, sort and paging
    Records {
        #[arg(short, long, default_value = "")]
        search: String,
        /// all | completed | pending | in-progress
        #[arg(long, default_value = "all")]
        status: String,
        /// all | low | medium | high
        #[arg(long, default_value = "all")]
        cost: String,
        /// all or a plate number
        #[arg(long, default_value = "all")]
        plate: String,
        /// newest | oldest
        #[arg(long, default_value = "newest")]
        sort: String,
        #[arg(short, long, default_value_t = 1)]
        page: usize,
        /// Print the known plate numbers and exit
        #[arg(long)]
        plates: bool,
    },
    /// Show one record with its parts
    Show { id: String },
    /// Create a record
    Add {
        #[arg(long)]
        driver: String,
        #[arg(long)]
        plate: String,
        #[arg(long)]
        model: String,
        /// Comma separated key=value pairs, e.g. `type=Battery,replaced=yes,cost=50,brand=Bosch`.
        /// Repeat for each part.
        #[arg(long = "part", required = true)]
        parts: Vec<String>,
        /// Validate and print the payload without saving
        #[arg(long)]
        dry_run: bool,
    },
    Delete { id: String },
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    Menu {
        #[command(subcommand)]
        action: MenuAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    Show,
    Set {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        company: Option<String>,
    },
}

#[derive(Subcommand)]
enum MenuAction {
    Show,
    /// Move the item at index FROM to index TO
    Move { from: usize, to: usize },
    /// Drop the item with path DRAGGED above or below the item with path TARGET
    Drop {
        dragged: String,
        target: String,
        #[arg(long, value_enum, default_value = "below")]
        position: Side,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Side {
    Above,
    Below,
}

struct App {
    cfg: AppConfig,
    session: SessionContext,
    api: Arc<ResourceClient>,
}

impl App {
    async fn open() -> Result<Self> {
        let cfg = AppConfig::load_or_default()?;
        service::runtime::ensure_session_dir(&cfg.client.session_file).await?;
        let store = FileSessionStore::open(&cfg.client.session_file).await?;
        let session = SessionContext::new(Arc::new(store));
        let api = Arc::new(ResourceClient::new(
            &cfg.client.base_url,
            Duration::from_secs(cfg.client.request_timeout_secs),
        )?);
        debug!(base_url = %cfg.client.base_url, "tracker ready");
        Ok(Self { cfg, session, api })
    }

    /// Apply the route gate; errors unless `route` itself is allowed.
    async fn enter(&self, route: Route) -> Result<()> {
        let authenticated = self.session.is_authenticated().await?;
        let landed = settle(route.path(), authenticated);
        if landed == route {
            return Ok(());
        }
        match landed {
            Route::Login => bail!("not signed in; run `tracker login` first"),
            _ => {
                let who = self.session.identity().await?.email.unwrap_or_default();
                bail!("already signed in as {who}; run `tracker logout` first")
            }
        }
    }

    fn auth(&self) -> AuthService { AuthService::new(self.api.clone(), self.session.clone()) }

    fn records(&self) -> RecordsService { RecordsService::new(self.api.clone()) }
}

fn today() -> chrono::NaiveDate { chrono::Local::now().date_naive() }

fn print_identity(id: &Identity) {
    println!("[{}] {} <{}>", id.initial, id.name, id.email);
}

fn print_record_line(r: &Record) {
    println!(
        "{:<10} {:<10} {:<12} {:<14} {:>3} parts {:>10.2}  {:<12} {}",
        r.id, r.date, r.car_plate, r.car_model, r.parts_count, r.total_cost, r.status, r.driver_name
    );
}

/// `type=Battery,cost=50` style part description → builder fields.
fn apply_part(builder: &mut RecordEntryBuilder, desc: &str) -> Result<()> {
    for pair in desc.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("part attribute '{pair}' is not key=value"))?;
        let field = match key.trim().to_ascii_lowercase().as_str() {
            "type" => Field::PartType,
            "replaced" => Field::PartReplaced,
            "brand" => Field::PartBrand,
            "supplier" => Field::Supplier,
            "manufactured" => Field::ManufactureDate,
            "expires" => Field::ExpiryDate,
            "changed" => Field::PartChangeDate,
            "cost" => Field::PartCost,
            other => other.parse::<Field>()?,
        };
        builder.set_field(field, value.trim());
    }
    builder.add_part().map_err(|e| anyhow!("part '{desc}': {e}"))?;
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let app = App::open().await?;

    match cli.command {
        Commands::Login { email, password } => {
            app.enter(Route::Login).await?;
            let user = app.auth().login(LoginInput { email, password }).await?;
            println!("signed in as {} <{}>", user.name, user.email);
        }
        Commands::Register { name, email, password, confirm } => {
            app.enter(Route::Register).await?;
            let user = app
                .auth()
                .register(RegisterInput { name, email, password, confirm_password: confirm })
                .await?;
            println!("account created; signed in as {} <{}>", user.name, user.email);
        }
        Commands::Logout => {
            app.auth().logout().await?;
            println!("signed out");
        }
        Commands::Whoami { follow } => {
            app.enter(Route::EditProfile).await?;
            if !follow {
                print_identity(&ProfileEditor::new(app.session.clone()).display_identity().await?);
                return Ok(());
            }
            let every = Duration::from_millis(app.cfg.client.profile_poll_ms);
            let mut feed = PollingFeed::new(app.session.clone(), every);
            loop {
                tokio::select! {
                    snap = feed.next() => match snap {
                        Some(s) => print_identity(&Identity::from_snapshot(&s)),
                        None => break,
                    },
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
        }
        Commands::Dashboard { json } => {
            app.enter(Route::Dashboard).await?;
            let records = app.api.list_records().await?;
            let stats = DashboardStats::compute(&records, today());
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
                return Ok(());
            }
            println!("Total records:     {}", stats.total_records);
            println!("Parts replaced:    {} out of {} total", stats.parts_replaced, stats.total_parts);
            println!("Total cost:        {:.2}", stats.total_cost);
            println!("Most serviced car: {} ({} visits)", stats.most_serviced_car.plate, stats.most_serviced_car.visits);
            println!("\nReplaced parts:");
            for share in stats.sorted_breakdown() {
                println!("  {:<14} {:>3}  {:>5.1}%", share.part_type, share.count, share.percent);
            }
            println!("\nCost trend:");
            for m in &stats.cost_trend {
                println!("  {} {}  {:>10.2}", m.label, m.year, m.cost);
            }
            println!("\nRecent:");
            for r in &stats.recent {
                print_record_line(r);
            }
        }
        Commands::Records { search, status, cost, plate, sort, page, plates } => {
            app.enter(Route::ViewRecords).await?;
            let records = app.records().refresh().await?;
            if plates {
                for p in plate_options(&records) {
                    println!("{p}");
                }
                return Ok(());
            }
            let query = RecordQuery {
                search,
                status: status.parse()?,
                cost: cost.parse()?,
                plate: plate.parse()?,
                sort: sort.parse()?,
            };
            let result = query.apply(&records, Pagination { page, ..Pagination::default() });
            for r in &result.items {
                print_record_line(r);
            }
            let plural = if result.total_matches == 1 { "" } else { "s" };
            println!(
                "{} record{plural} found; page {} of {}",
                result.total_matches,
                result.page,
                result.total_pages.max(1)
            );
        }
        Commands::Show { id } => {
            app.enter(Route::ViewRecords).await?;
            let r = app.records().get(&id).await?;
            print_record_line(&r);
            for (i, p) in r.parts.iter().enumerate() {
                println!(
                    "  #{:<2} {:<12} replaced={:<3} brand={} supplier={} changed={} cost={:.2}",
                    i + 1,
                    p.part_type,
                    p.replaced.as_str(),
                    p.brand_name,
                    p.supplier,
                    p.change_date,
                    p.cost
                );
            }
        }
        Commands::Add { driver, plate, model, parts, dry_run } => {
            app.enter(Route::AddRecord).await?;
            let mut builder = RecordEntryBuilder::new();
            builder.set_field(Field::DriverName, &driver);
            builder.set_field(Field::CarPlate, &plate);
            builder.set_field(Field::CarModel, &model);
            for desc in &parts {
                apply_part(&mut builder, desc)?;
            }
            if dry_run {
                let input = builder.build(today())?;
                println!("{}", serde_json::to_string_pretty(&input)?);
                return Ok(());
            }
            let saved = builder.submit(app.api.as_ref(), today()).await?;
            println!("saved record {} ({} parts, total {:.2})", saved.id, saved.parts_count, saved.total_cost);
        }
        Commands::Delete { id } => {
            app.enter(Route::ViewRecords).await?;
            let svc = app.records();
            svc.refresh().await?;
            svc.delete(&id).await.with_context(|| format!("deleting record {id}"))?;
            println!("deleted record {id}");
        }
        Commands::Profile { action } => {
            app.enter(Route::EditProfile).await?;
            let editor = ProfileEditor::new(app.session.clone());
            match action {
                ProfileAction::Show => {
                    let p = editor.load().await?;
                    println!("name:    {}\nemail:   {}\nphone:   {}\ncompany: {}", p.name, p.email, p.phone, p.company);
                }
                ProfileAction::Set { name, email, phone, company } => {
                    let mut p = editor.load().await?;
                    if let Some(v) = name { p.name = v; }
                    if let Some(v) = email { p.email = v; }
                    if let Some(v) = phone { p.phone = v; }
                    if let Some(v) = company { p.company = v; }
                    editor.save(&p).await?;
                    print_identity(&editor.display_identity().await?);
                }
            }
        }
        Commands::Menu { action } => {
            app.enter(Route::Dashboard).await?;
            let mut bar = Sidebar::load(app.session.clone()).await?;
            match action {
                MenuAction::Show => {}
                MenuAction::Move { from, to } => bar.move_item(from, to).await?,
                MenuAction::Drop { dragged, target, position } => {
                    let position = match position {
                        Side::Above => DropPosition::Above,
                        Side::Below => DropPosition::Below,
                    };
                    if !bar.drop_on(&dragged, &target, position).await? {
                        bail!("nothing moved: unknown path or dropped onto itself");
                    }
                }
            }
            for (i, item) in bar.items.iter().enumerate() {
                let done = if item.completed { "✓" } else { " " };
                println!("{i}. {} {:<13} {:<14} {done} {}", item.icon, item.label, item.path, item.description);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    common::utils::logging::init_logging_cli(cli.verbose);
    run(cli).await
}
