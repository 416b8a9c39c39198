use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use stationery_client::{
    config,
    models::{
        inventory::ItemDraft,
        notifications::ReadFilter,
        reports::{ReportFormat, ReportQuery, ReportType},
        requests::RequestDecision,
        users::{ClassSubjectSelection, SignupForm},
    },
    AuthClient, ClientConfig, ClientError, InventoryScope, InventoryViewModel, NotificationFeed,
    ReportsClient, RequestSelection, RequestWorkflow, Role, SessionStore, TeacherProfileClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let context = CliContext::initialize()?;

    match cli.command {
        Commands::Auth(command) => handle_auth_command(&context, command, cli.json).await?,
        Commands::Inventory(command) => {
            handle_inventory_command(&context, command, cli.json).await?
        }
        Commands::Requests(command) => {
            handle_requests_command(&context, command, cli.json).await?
        }
        Commands::Notifications(command) => {
            handle_notifications_command(&context, command, cli.json).await?
        }
        Commands::Reports(command) => handle_reports_command(&context, command, cli.json).await?,
        Commands::Profile(command) => handle_profile_command(&context, command, cli.json).await?,
    }

    Ok(())
}

#[derive(Parser)]
#[command(
    name = "stationery",
    about = "CLI for the stationery inventory and request-management backend",
    version
)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON when available"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in, sign up, inspect or drop the stored session
    #[command(subcommand)]
    Auth(AuthCommands),
    /// Browse and edit inventory
    #[command(subcommand)]
    Inventory(InventoryCommands),
    /// Submit and review inventory requests
    #[command(subcommand)]
    Requests(RequestCommands),
    /// Poll and acknowledge notifications
    #[command(subcommand)]
    Notifications(NotificationCommands),
    /// Aggregated reports and export
    #[command(subcommand)]
    Reports(ReportCommands),
    /// Teacher profile and class/subject assignments
    #[command(subcommand)]
    Profile(ProfileCommands),
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Admin,
    StockManager,
    Teacher,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Admin => Role::Admin,
            RoleArg::StockManager => Role::StockManager,
            RoleArg::Teacher => Role::Teacher,
        }
    }
}

#[derive(Subcommand)]
enum AuthCommands {
    /// Authenticate and persist the session
    Login(LoginArgs),
    /// Register a new teacher account
    Signup(SignupArgs),
    /// Refresh the access token now instead of waiting for a 401
    Refresh,
    /// Show the logged-in user from the stored session
    Whoami,
    /// Clear the stored session
    Logout,
}

#[derive(Args)]
struct LoginArgs {
    #[arg(long, value_enum)]
    role: RoleArg,
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
}

#[derive(Args)]
struct SignupArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    confirm_password: String,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long, default_value = "")]
    bio: String,
    /// class/subject pair as "<class_id>:<subject_id>", repeatable
    #[arg(long = "class-subject", value_name = "CLASS:SUBJECT")]
    class_subjects: Vec<String>,
}

#[derive(Subcommand)]
enum InventoryCommands {
    /// List items with derived stock status
    List(InventoryListArgs),
    /// Create an item (category created on the fly when unknown)
    Add(ItemArgs),
    /// Update an existing item
    Update(ItemUpdateArgs),
    /// Delete an item
    Delete(DeleteArgs),
}

#[derive(Args)]
struct InventoryListArgs {
    /// Use the teacher-scoped inventory instead of the shared stockroom
    #[arg(long, action = ArgAction::SetTrue)]
    teacher: bool,
    #[arg(long, default_value = "")]
    search: String,
    #[arg(long, default_value_t = 1)]
    page: usize,
}

#[derive(Args)]
struct ItemArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    category: String,
    #[arg(long)]
    quantity: u32,
    #[arg(long, default_value_t = 5)]
    threshold: u32,
    #[arg(long, action = ArgAction::SetTrue)]
    teacher: bool,
}

#[derive(Args)]
struct ItemUpdateArgs {
    #[arg(long)]
    id: u64,
    #[command(flatten)]
    item: ItemArgs,
}

#[derive(Args)]
struct DeleteArgs {
    #[arg(long)]
    id: u64,
    #[arg(long, action = ArgAction::SetTrue)]
    teacher: bool,
}

#[derive(Subcommand)]
enum RequestCommands {
    /// List requests (scope depends on the logged-in role)
    List(RequestListArgs),
    /// Submit one request per selected item
    Submit(SubmitArgs),
    /// Approve a pending request and deduct its quantity from stock
    Approve(ReviewArgs),
    /// Reject a pending request
    Reject(ReviewArgs),
}

#[derive(Args)]
struct RequestListArgs {
    #[arg(long, default_value = "")]
    search: String,
    #[arg(long, default_value_t = 1)]
    page: usize,
}

#[derive(Args)]
struct SubmitArgs {
    /// selection as "<item_id>:<quantity>", repeatable
    #[arg(long = "item", value_name = "ITEM:QTY", required = true)]
    items: Vec<String>,
    #[arg(long, default_value = "")]
    notes: String,
}

#[derive(Args)]
struct ReviewArgs {
    #[arg(long)]
    id: u64,
}

#[derive(Subcommand)]
enum NotificationCommands {
    /// List notifications relevant to the logged-in role
    List(NotificationListArgs),
    /// Mark one notification read
    Read(ReviewArgs),
    /// Mark every notification read
    ReadAll,
}

#[derive(Args)]
struct NotificationListArgs {
    /// Include already-read notifications
    #[arg(long, action = ArgAction::SetTrue)]
    all: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportTypeArg {
    Stock,
    Requests,
    Movement,
    Teacher,
}

impl From<ReportTypeArg> for ReportType {
    fn from(arg: ReportTypeArg) -> Self {
        match arg {
            ReportTypeArg::Stock => ReportType::Stock,
            ReportTypeArg::Requests => ReportType::Requests,
            ReportTypeArg::Movement => ReportType::Movement,
            ReportTypeArg::Teacher => ReportType::Teacher,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportFormatArg {
    Pdf,
    Excel,
}

impl From<ReportFormatArg> for ReportFormat {
    fn from(arg: ReportFormatArg) -> Self {
        match arg {
            ReportFormatArg::Pdf => ReportFormat::Pdf,
            ReportFormatArg::Excel => ReportFormat::Excel,
        }
    }
}

#[derive(Subcommand)]
enum ReportCommands {
    /// Fetch report data and stats
    Show(ReportArgs),
    /// Download the report as a file
    Export(ExportArgs),
}

#[derive(Args)]
struct ReportArgs {
    #[arg(long, value_enum, default_value = "stock")]
    r#type: ReportTypeArg,
    #[arg(long)]
    start_date: Option<String>,
    #[arg(long)]
    end_date: Option<String>,
    #[arg(long, default_value = "all")]
    category: String,
}

#[derive(Args)]
struct ExportArgs {
    #[command(flatten)]
    report: ReportArgs,
    #[arg(long, value_enum, default_value = "pdf")]
    format: ReportFormatArg,
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Show the teacher profile
    Show,
    /// Replace the bio
    SetBio(BioArgs),
    /// Append a class/subject assignment
    AddClass(AddClassArgs),
    /// Remove a class/subject assignment
    RemoveClass(ReviewArgs),
}

#[derive(Args)]
struct BioArgs {
    #[arg(long)]
    bio: String,
}

#[derive(Args)]
struct AddClassArgs {
    #[arg(long)]
    class: u64,
    #[arg(long)]
    subject: u64,
}

struct CliContext {
    config: ClientConfig,
    store: SessionStore,
}

impl CliContext {
    fn initialize() -> Result<Self> {
        let config = config::load_config().context("failed to load configuration")?;
        config::init_tracing(&config.log_level, config.log_json);
        let store = match config.session_path() {
            Some(path) => SessionStore::file(path),
            None => SessionStore::in_memory(),
        };
        Ok(Self { config, store })
    }

    fn auth_client(&self) -> AuthClient {
        AuthClient::new(self.config.clone(), self.store.clone())
    }

    fn role(&self) -> Result<Role> {
        self.auth_client()
            .current_role()?
            .ok_or_else(|| anyhow!("no stored session, run `stationery auth login` first"))
    }
}

async fn handle_auth_command(context: &CliContext, command: AuthCommands, json: bool) -> Result<()> {
    let auth = context.auth_client();
    match command {
        AuthCommands::Login(args) => {
            let user = auth
                .login(args.role.into(), &args.email, &args.password)
                .await?;
            if json {
                print_json(&serde_json::json!({
                    "role": user.role.as_str(),
                    "redirect": user.redirect_target(),
                    "user": user.user,
                }))?;
            } else {
                println!("Logged in as {} ({})", args.email, user.role);
                println!("Next stop: {}", user.redirect_target());
            }
        }
        AuthCommands::Signup(args) => {
            let class_subjects = args
                .class_subjects
                .iter()
                .map(|pair| parse_pair(pair).map(|(class_id, subject_id)| ClassSubjectSelection {
                    class_id,
                    subject_id,
                }))
                .collect::<Result<Vec<_>>>()?;
            let form = SignupForm {
                email: args.email,
                password: args.password,
                confirm_password: args.confirm_password,
                first_name: args.first_name,
                last_name: args.last_name,
                bio: args.bio,
                class_subjects,
            };
            let created = auth.signup(&form).await?;
            if json {
                print_json(&created)?;
            } else {
                println!("Account created for {}", form.email);
            }
        }
        AuthCommands::Refresh => {
            auth.session_client().refresh_session().await?;
            println!("Access token refreshed");
        }
        AuthCommands::Whoami => match auth.current_role()? {
            Some(role) => println!("Logged in with role: {role}"),
            None => println!("No stored session"),
        },
        AuthCommands::Logout => {
            auth.logout()?;
            println!("Session cleared");
        }
    }
    Ok(())
}

async fn handle_inventory_command(
    context: &CliContext,
    command: InventoryCommands,
    json: bool,
) -> Result<()> {
    let session = context.auth_client().session_client();
    match command {
        InventoryCommands::List(args) => {
            let mut view = InventoryViewModel::new(session, scope_for(args.teacher));
            view.refresh().await?;
            view.set_search(args.search);
            for _ in 1..args.page {
                view.next_page();
            }
            if json {
                print_json(&view.visible())?;
            } else if view.items().is_empty() {
                println!("No inventory items found.");
            } else {
                println!(
                    "{:<6} {:<30} {:<18} {:>8}  {}",
                    "ID", "NAME", "CATEGORY", "QTY", "STATUS"
                );
                for item in view.visible() {
                    println!(
                        "{:<6} {:<30} {:<18} {:>8}  {}",
                        item.id,
                        item.name,
                        item.category,
                        item.quantity,
                        item.status.label()
                    );
                }
                println!("Page {} of {}", view.page(), view.page_count().max(1));
            }
        }
        InventoryCommands::Add(args) => {
            let mut view = InventoryViewModel::new(session, scope_for(args.teacher));
            view.load().await?;
            let draft = draft_from(&args);
            view.save(&draft, None).await?;
            println!("Created '{}'", draft.name);
        }
        InventoryCommands::Update(args) => {
            let mut view = InventoryViewModel::new(session, scope_for(args.item.teacher));
            view.load().await?;
            let draft = draft_from(&args.item);
            view.save(&draft, Some(args.id)).await?;
            println!("Updated item {}", args.id);
        }
        InventoryCommands::Delete(args) => {
            let mut view = InventoryViewModel::new(session, scope_for(args.teacher));
            view.refresh().await?;
            view.delete(args.id).await?;
            println!("Deleted item {}", args.id);
        }
    }
    Ok(())
}

async fn handle_requests_command(
    context: &CliContext,
    command: RequestCommands,
    json: bool,
) -> Result<()> {
    let session = context.auth_client().session_client();
    match command {
        RequestCommands::List(args) => {
            let mut workflow = RequestWorkflow::new(session);
            workflow.refresh().await?;
            workflow.set_search(args.search);
            for _ in 1..args.page {
                workflow.next_page();
            }
            if json {
                print_json(&workflow.visible())?;
            } else if workflow.requests().is_empty() {
                println!("No requests found.");
            } else {
                println!(
                    "{:<6} {:<24} {:<28} {:<24} {:>6}  {}",
                    "ID", "REQUESTER", "CLASSES", "ITEM", "QTY", "STATUS"
                );
                for req in workflow.visible() {
                    println!(
                        "{:<6} {:<24} {:<28} {:<24} {:>6}  {}",
                        req.id,
                        req.requester_name(),
                        req.requester_classes(),
                        req.item_name(),
                        req.quantity,
                        req.status.as_str()
                    );
                }
                println!("Page {} of {}", workflow.page(), workflow.page_count().max(1));
            }
        }
        RequestCommands::Submit(args) => {
            // Availability comes from the shared stockroom, like the form.
            let mut inventory = InventoryViewModel::new(session.clone(), InventoryScope::Shared);
            inventory.refresh().await?;
            let mut selections = Vec::new();
            for pair in &args.items {
                let (item_id, quantity) = parse_pair(pair)?;
                let item = inventory
                    .items()
                    .iter()
                    .find(|i| i.id == item_id)
                    .ok_or_else(|| anyhow!("item {item_id} is not in the inventory"))?;
                selections.push(RequestSelection {
                    item_id,
                    item_name: item.name.clone(),
                    quantity: quantity as u32,
                    available: item.quantity,
                });
            }
            let workflow = RequestWorkflow::new(session);
            let outcomes = workflow.submit(&selections, &args.notes).await?;
            let failures = outcomes.iter().filter(|o| !o.succeeded()).count();
            for outcome in &outcomes {
                match &outcome.result {
                    Ok(req) => println!("submitted: {} (request {})", outcome.item_name, req.id),
                    Err(err) => println!("FAILED:    {} ({err})", outcome.item_name),
                }
            }
            if failures > 0 {
                return Err(anyhow!(
                    "{failures} of {} submissions failed (the rest went through)",
                    outcomes.len()
                ));
            }
        }
        RequestCommands::Approve(args) => {
            review(session, args.id, RequestDecision::Approve).await?;
            println!("Request {} approved and stock deducted", args.id);
        }
        RequestCommands::Reject(args) => {
            review(session, args.id, RequestDecision::Reject).await?;
            println!("Request {} rejected", args.id);
        }
    }
    Ok(())
}

async fn review(
    session: stationery_client::SessionClient,
    id: u64,
    decision: RequestDecision,
) -> Result<()> {
    let mut workflow = RequestWorkflow::new(session);
    workflow.refresh().await?;
    match workflow.review(id, decision).await {
        Ok(()) => Ok(()),
        // Approved but not deducted: report loudly, nothing to undo.
        Err(err @ ClientError::PartialApproval { .. }) => Err(anyhow!("{err}")),
        Err(err) => Err(err.into()),
    }
}

async fn handle_notifications_command(
    context: &CliContext,
    command: NotificationCommands,
    json: bool,
) -> Result<()> {
    let role = context.role()?;
    let session = context.auth_client().session_client();
    let mut feed = NotificationFeed::new(session, role);
    match command {
        NotificationCommands::List(args) => {
            let filter = if args.all {
                ReadFilter::All
            } else {
                ReadFilter::Unread
            };
            feed.refresh(filter).await?;
            if json {
                print_json(&feed.notifications())?;
            } else if feed.notifications().is_empty() {
                println!("No notifications found.");
            } else {
                for n in feed.notifications() {
                    let marker = if n.is_read { " " } else { "*" };
                    println!("{marker} [{:<18}] #{:<5} {}", n.notification_type, n.id, n.message);
                }
                println!("{} unread", feed.unread_count());
            }
        }
        NotificationCommands::Read(args) => {
            feed.refresh(ReadFilter::All).await?;
            feed.mark_read(args.id).await?;
            println!("Notification {} marked read", args.id);
        }
        NotificationCommands::ReadAll => {
            feed.refresh(ReadFilter::All).await?;
            feed.mark_all_read().await?;
            println!("All notifications marked read");
        }
    }
    Ok(())
}

async fn handle_reports_command(
    context: &CliContext,
    command: ReportCommands,
    json: bool,
) -> Result<()> {
    let session = context.auth_client().session_client();
    let reports = ReportsClient::new(session);
    match command {
        ReportCommands::Show(args) => {
            let query = query_from(&args);
            let bundle = reports.fetch(&query).await?;
            if json {
                print_json(&serde_json::json!({
                    "data": bundle.data,
                    "stats": bundle.stats,
                }))?;
            } else {
                let columns = query.report_type.columns();
                println!("{}", columns.join(" | "));
                for row in &bundle.data {
                    let cells: Vec<String> = columns
                        .iter()
                        .map(|col| render_cell(row.get(*col)))
                        .collect();
                    println!("{}", cells.join(" | "));
                }
                println!("stats: {}", bundle.stats);
            }
        }
        ReportCommands::Export(args) => {
            let query = query_from(&args.report);
            let path = reports
                .export(&query, args.format.into(), &args.out_dir)
                .await?;
            println!("Exported to {}", path.display());
        }
    }
    Ok(())
}

async fn handle_profile_command(
    context: &CliContext,
    command: ProfileCommands,
    json: bool,
) -> Result<()> {
    let session = context.auth_client().session_client();
    let mut profile = TeacherProfileClient::new(session);
    profile.refresh().await?;
    match command {
        ProfileCommands::Show => {
            let current = profile
                .profile()
                .ok_or_else(|| anyhow!("profile not loaded"))?;
            if json {
                print_json(current)?;
            } else {
                if let Some(user) = &current.user {
                    println!("{} <{}>", user.display_name(), user.email.as_deref().unwrap_or("-"));
                }
                println!("bio: {}", current.bio.as_deref().unwrap_or("-"));
                println!("classes: {}", current.class_list());
                for cs in &current.class_subjects {
                    let subject = cs
                        .subject
                        .as_ref()
                        .map(|s| s.name.clone())
                        .unwrap_or_else(|| "N/A".to_string());
                    println!(
                        "  #{:<5} {} — {}",
                        cs.id,
                        cs.class_label().unwrap_or_else(|| "N/A".to_string()),
                        subject
                    );
                }
            }
        }
        ProfileCommands::SetBio(args) => {
            profile.update_bio(&args.bio).await?;
            println!("Bio updated");
        }
        ProfileCommands::AddClass(args) => {
            let created = profile.add_class_subject(args.class, args.subject).await?;
            println!("Added class/subject assignment {}", created.id);
        }
        ProfileCommands::RemoveClass(args) => {
            profile.remove_class_subject(args.id).await?;
            println!("Removed class/subject assignment {}", args.id);
        }
    }
    Ok(())
}

fn scope_for(teacher: bool) -> InventoryScope {
    if teacher {
        InventoryScope::Teacher
    } else {
        InventoryScope::Shared
    }
}

fn draft_from(args: &ItemArgs) -> ItemDraft {
    ItemDraft {
        name: args.name.clone(),
        category: args.category.clone(),
        quantity: args.quantity,
        low_stock_threshold: args.threshold,
    }
}

fn query_from(args: &ReportArgs) -> ReportQuery {
    let mut query = ReportQuery::new(args.r#type.into());
    query.start_date = args.start_date.clone();
    query.end_date = args.end_date.clone();
    query.category = args.category.clone();
    query
}

/// Parses "<a>:<b>" id pairs used by `--class-subject` and `--item`.
fn parse_pair(pair: &str) -> Result<(u64, u64)> {
    let (left, right) = pair
        .split_once(':')
        .ok_or_else(|| anyhow!("expected '<id>:<id>', got '{pair}'"))?;
    Ok((
        left.trim().parse().context("left side is not a number")?,
        right.trim().parse().context("right side is not a number")?,
    ))
}

fn render_cell(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => "N/A".to_string(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
