//! `brokecoin-admin`: the admin console from a terminal.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use url::Url;
use uuid::Uuid;

use brokecoin_admin::api::tasks::TaskFilters;
use brokecoin_admin::api::transactions::TransactionFilters;
use brokecoin_admin::api::users::{AdminList, UserFilters};
use brokecoin_admin::api::{ApiClient, Filters};
use brokecoin_admin::config::{self, Config};
use brokecoin_admin::dialog::{ConfirmOutcome, MutationContext};
use brokecoin_admin::features::auth::SignIn;
use brokecoin_admin::features::dashboard::Dashboard;
use brokecoin_admin::features::settings::{AccountKind, AdminAccountForm, ProfilePage};
use brokecoin_admin::features::tasks::TasksPage;
use brokecoin_admin::features::transactions::TransactionsPage;
use brokecoin_admin::features::users::{self as user_page, UsersPage};
use brokecoin_admin::features::ListView;
use brokecoin_admin::format;
use brokecoin_admin::forms::TaskForm;
use brokecoin_admin::models::{
    Currency, TaskStatus, TaskType, TransactionStatus, TransactionType, UserRole,
};
use brokecoin_admin::notify::{Level, Notifier};
use brokecoin_admin::query::{PageSource, QueryClient, ResourceQuery};
use brokecoin_admin::session::SessionStore;
use brokecoin_admin::shell::{Identity, Route, Shell};
use brokecoin_admin::AppError;

/// BrokeCoin admin console
#[derive(Parser, Debug)]
#[command(name = "brokecoin-admin", version)]
#[command(about = "Manage BrokeCoin users, transactions and tasks")]
struct Cli {
    /// Backend base URL, overrides BROKECOIN_API_URL
    #[arg(long, global = true)]
    api_url: Option<Url>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and remember the session
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long, env = "BROKECOIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show who is signed in
    Whoami,
    /// Show or update your own profile
    Profile {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        bio: Option<String>,
    },
    /// Create the first super admin on a fresh backend
    Setup(AccountArgs),
    /// Create another operator account
    Register {
        #[command(flatten)]
        account: AccountArgs,
        #[arg(long)]
        role: Option<UserRole>,
    },
    /// Totals and the latest transactions
    Dashboard,
    #[command(subcommand)]
    Users(UsersCommand),
    #[command(subcommand)]
    Transactions(TransactionsCommand),
    #[command(subcommand)]
    Tasks(TasksCommand),
    #[command(subcommand)]
    Admins(AdminsCommand),
}

#[derive(Args, Debug)]
struct AccountArgs {
    #[arg(short, long)]
    username: String,
    #[arg(short, long)]
    email: String,
    #[arg(short, long, env = "BROKECOIN_NEW_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Args, Debug)]
struct PageArgs {
    #[arg(long, default_value_t = 1)]
    page: u32,
    /// One of 10, 20, 30, 40, 50
    #[arg(long)]
    page_size: Option<u32>,
}

#[derive(Subcommand, Debug)]
enum UsersCommand {
    List {
        #[command(flatten)]
        paging: PageArgs,
        #[arg(long)]
        role: Option<UserRole>,
    },
    Show {
        id: Uuid,
    },
    Add {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        wallet: String,
        #[arg(long, default_value = "user")]
        role: UserRole,
        #[arg(long, default_value_t = 0.0)]
        chips: f64,
        #[arg(long, default_value_t = 0.0)]
        brokecoin: f64,
    },
    Edit {
        id: Uuid,
        #[arg(short, long)]
        username: Option<String>,
        #[arg(short, long)]
        wallet: Option<String>,
        #[arg(long)]
        role: Option<UserRole>,
        #[arg(long)]
        chips: Option<f64>,
        #[arg(long)]
        brokecoin: Option<f64>,
    },
    Delete {
        id: Uuid,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Credit (positive) or debit (negative) a user's balances
    Balance {
        id: Uuid,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        brokecoin: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        chips: f64,
    },
}

#[derive(Subcommand, Debug)]
enum TransactionsCommand {
    List {
        #[command(flatten)]
        paging: PageArgs,
        #[arg(long)]
        status: Option<TransactionStatus>,
        #[arg(long = "type")]
        kind: Option<TransactionType>,
        #[arg(long)]
        wallet: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        from: Option<NaiveDate>,
        /// YYYY-MM-DD
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    SetStatus {
        id: Uuid,
        status: TransactionStatus,
    },
}

#[derive(Args, Debug)]
struct TaskFields {
    #[arg(long)]
    description: Option<String>,
    #[arg(long = "type")]
    task_type: Option<TaskType>,
    #[arg(long)]
    status: Option<TaskStatus>,
    #[arg(long)]
    reward: Option<f64>,
    #[arg(long)]
    reward_type: Option<Currency>,
    #[arg(long)]
    link: Option<String>,
}

#[derive(Subcommand, Debug)]
enum TasksCommand {
    List {
        #[command(flatten)]
        paging: PageArgs,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long = "type")]
        task_type: Option<TaskType>,
    },
    Show {
        id: Uuid,
    },
    Create {
        #[arg(short, long)]
        title: String,
        #[command(flatten)]
        fields: TaskFields,
    },
    Update {
        id: Uuid,
        #[arg(short, long)]
        title: Option<String>,
        #[command(flatten)]
        fields: TaskFields,
    },
    Delete {
        id: Uuid,
        #[arg(short, long)]
        yes: bool,
    },
    Status {
        id: Uuid,
        status: TaskStatus,
    },
    Comment {
        id: Uuid,
        text: String,
    },
    Attach {
        id: Uuid,
        #[arg(long)]
        name: String,
        #[arg(long)]
        url: String,
        #[arg(long)]
        content_type: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum AdminsCommand {
    List {
        #[command(flatten)]
        paging: PageArgs,
    },
}

impl Command {
    /// The console route a command stands in for.
    fn route(&self) -> Route {
        match self {
            Command::Login { .. } | Command::Logout | Command::Setup(_) => Route::SignIn,
            Command::Whoami | Command::Dashboard => Route::Dashboard,
            Command::Profile { .. } | Command::Register { .. } => Route::Settings,
            Command::Users(_) | Command::Admins(_) => Route::Users,
            Command::Transactions(_) => Route::Transactions,
            Command::Tasks(_) => Route::Tasks,
        }
    }
}

struct Console {
    config: Config,
    api: ApiClient,
    ctx: MutationContext,
}

impl Console {
    fn page_size(&self, paging: &PageArgs) -> u32 {
        paging.page_size.unwrap_or(self.config.page_size)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    config::load_env();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("brokecoin_admin=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("error: {}", e.user_message());
            if e.is_unauthorized() {
                eprintln!("run `brokecoin-admin login` to sign in again");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let mut config = Config::from_env()?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    let session = SessionStore::open(&config.session_file)?;
    let api = ApiClient::new(&config, session.clone())?;

    let route = cli.command.route();
    let mut shell = Shell::new(session);
    if !route.is_public() && shell.navigate(route.path()) != route {
        return Err(AppError::Unauthorized);
    }

    let console = Console {
        config,
        api,
        ctx: MutationContext::new(QueryClient::new(), Notifier::new()),
    };
    let result = dispatch(&console, cli.command).await;
    flush(&console.ctx.notifier);
    if shell.on_session_change().is_some() {
        tracing::debug!(route = ?shell.current(), "session changed during command");
    }
    result
}

fn flush(notifier: &Notifier) {
    for toast in notifier.drain() {
        match toast.level {
            Level::Success => println!("{}", toast.message),
            Level::Error => eprintln!("{}: {}", toast.title, toast.message),
        }
    }
}

fn confirm(question: &str) -> Result<bool, AppError> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

async fn dispatch(console: &Console, command: Command) -> Result<(), AppError> {
    let api = console.api.clone();
    let ctx = console.ctx.clone();
    match command {
        Command::Login { username, password } => {
            let mut page = SignIn::new(api, ctx, None);
            page.form.values_mut().username = username;
            page.form.values_mut().password = password;
            let admin = page.submit().await.into_result()?;
            println!("signed in as {} <{}> ({})", admin.username, admin.email, admin.role.label());
        }
        Command::Logout => {
            api.session().reset()?;
            println!("signed out");
        }
        Command::Whoami => {
            let who = Identity::of(api.session());
            println!("{} <{}>", who.name, who.email);
        }
        Command::Profile {
            username,
            email,
            bio,
        } => {
            let mut page = ProfilePage::new(api, ctx);
            let admin = page.load().await?;
            if username.is_none() && email.is_none() && bio.is_none() {
                println!("id:       {}", admin.id);
                println!("username: {}", admin.username);
                println!("email:    {}", admin.email);
                println!("role:     {}", admin.role.label());
                return Ok(());
            }
            let values = page.form.values_mut();
            if let Some(username) = username {
                values.username = username;
            }
            if let Some(email) = email {
                values.email = email;
            }
            values.bio = bio;
            page.save().await.into_result()?;
        }
        Command::Setup(account) => {
            let mut form = AdminAccountForm::new(api, ctx, AccountKind::Setup);
            fill_account(&mut form, account, None);
            form.submit().await.into_result()?;
        }
        Command::Register { account, role } => {
            let mut form = AdminAccountForm::new(api, ctx, AccountKind::Register);
            fill_account(&mut form, account, role);
            form.submit().await.into_result()?;
        }
        Command::Dashboard => dashboard(api, ctx).await?,
        Command::Users(command) => users(console, command).await?,
        Command::Transactions(command) => transactions(console, command).await?,
        Command::Tasks(command) => tasks(console, command).await?,
        Command::Admins(AdminsCommand::List { paging }) => {
            let query = ResourceQuery::new(AdminList(api), ctx.queries.clone());
            let mut list = ListView::new(query, user_page::columns());
            show_list(&mut list, Filters::new(), &paging, console.page_size(&paging)).await?;
        }
    }
    Ok(())
}

fn fill_account(form: &mut AdminAccountForm, account: AccountArgs, role: Option<UserRole>) {
    let values = form.form.values_mut();
    values.username = account.username;
    values.email = account.email;
    values.password = account.password;
    values.role = role;
}

async fn show_list<S>(
    list: &mut ListView<S>,
    filters: Filters,
    paging: &PageArgs,
    page_size: u32,
) -> Result<(), AppError>
where
    S: PageSource,
    S::Item: Clone,
{
    let query = list.query_mut();
    query.set_filters(filters);
    query.set_page_size(page_size);
    query.set_page(paging.page);
    list.refresh().await?;
    println!("{}", list.render());
    Ok(())
}

async fn dashboard(api: ApiClient, ctx: MutationContext) -> Result<(), AppError> {
    let mut board = Dashboard::new(api, ctx.queries);
    let loaded = board.load().await;
    for card in board.cards() {
        match card.detail {
            Some(detail) => println!("{:<22} {}  ({detail})", card.title, card.value),
            None => println!("{:<22} {}", card.title, card.value),
        }
    }
    println!();
    println!("Recent transactions");
    for row in board.recent() {
        println!("  {:<14} {:>10}  {:<10} {}", row.label, row.amount, row.status, row.when);
    }
    loaded
}

async fn users(console: &Console, command: UsersCommand) -> Result<(), AppError> {
    let api = console.api.clone();
    let mut page = UsersPage::new(api.clone(), console.ctx.clone(), console.config.page_size);
    match command {
        UsersCommand::List { paging, role } => {
            page.configure(&UserFilters { role }, paging.page, console.page_size(&paging));
            page.load().await?;
            println!("{}", page.render());
        }
        UsersCommand::Show { id } => {
            let user = api.get_user(id).await?;
            println!("id:        {}", user.id);
            println!("username:  {}", user.username);
            println!("email:     {}", user.email.as_deref().unwrap_or(format::DASH));
            println!("wallet:    {}", user.wallet_address.as_deref().unwrap_or(format::DASH));
            println!("role:      {}", user.role().label());
            println!("chips:     {}", Currency::Chips.format_amount(user.chips_balance));
            println!("brokecoin: {}", Currency::Brokecoin.format_amount(user.brokecoin_balance));
            println!("created:   {}", format::timestamp(&user.created_at));
            println!("last login: {}", format::optional_timestamp(user.last_login.as_ref()));
        }
        UsersCommand::Add {
            username,
            wallet,
            role,
            chips,
            brokecoin,
        } => {
            page.open_add();
            let values = page.form.values_mut();
            values.username = username;
            values.wallet_address = wallet;
            values.role = role;
            values.chips_balance = chips;
            values.brokecoin_balance = brokecoin;
            page.save().await.into_result()?;
        }
        UsersCommand::Edit {
            id,
            username,
            wallet,
            role,
            chips,
            brokecoin,
        } => {
            let user = api.get_user(id).await?;
            page.open_edit(&user);
            let values = page.form.values_mut();
            if let Some(username) = username {
                values.username = username;
            }
            if let Some(wallet) = wallet {
                values.wallet_address = wallet;
            }
            if let Some(role) = role {
                values.role = role;
            }
            if let Some(chips) = chips {
                values.chips_balance = chips;
            }
            if let Some(brokecoin) = brokecoin {
                values.brokecoin_balance = brokecoin;
            }
            page.save().await.into_result()?;
        }
        UsersCommand::Delete { id, yes } => {
            let user = api.get_user(id).await?;
            page.request_delete(user.clone());
            let question = format!("Delete user {} ({})?", user.username, user.id);
            if !yes && !confirm(&question)? {
                page.cancel_delete();
                println!("cancelled");
                return Ok(());
            }
            if let ConfirmOutcome::Failed(e) = page.confirm_delete().await {
                return Err(e);
            }
            page.load().await?;
            println!("{}", page.render());
        }
        UsersCommand::Balance {
            id,
            brokecoin,
            chips,
        } => {
            page.open_balance();
            let values = page.balance.values_mut();
            values.brokecoin_delta = brokecoin;
            values.chips_delta = chips;
            page.adjust_balance(id).await.into_result()?;
        }
    }
    Ok(())
}

async fn transactions(console: &Console, command: TransactionsCommand) -> Result<(), AppError> {
    let mut page = TransactionsPage::new(
        console.api.clone(),
        console.ctx.clone(),
        console.config.page_size,
    );
    match command {
        TransactionsCommand::List {
            paging,
            status,
            kind,
            wallet,
            from,
            to,
        } => {
            let filters = Filters::from(&TransactionFilters {
                status,
                kind,
                wallet_address: wallet,
                start_date: from,
                end_date: to,
            });
            let size = console.page_size(&paging);
            show_list(&mut page.list, filters, &paging, size).await?;
        }
        TransactionsCommand::SetStatus { id, status } => {
            page.status.open();
            page.status.values_mut().status = status;
            page.save_status(id).await.into_result()?;
        }
    }
    Ok(())
}

fn apply_task_fields(form: &mut TaskForm, fields: TaskFields) {
    if let Some(description) = fields.description {
        form.description = Some(description);
    }
    if let Some(task_type) = fields.task_type {
        form.task_type = task_type;
    }
    if let Some(status) = fields.status {
        form.status = status;
    }
    if let Some(reward) = fields.reward {
        form.reward_amount = reward;
    }
    if let Some(reward_type) = fields.reward_type {
        form.reward_type = reward_type;
    }
    if let Some(link) = fields.link {
        form.task_link = Some(link);
    }
}

async fn tasks(console: &Console, command: TasksCommand) -> Result<(), AppError> {
    let api = console.api.clone();
    let mut page = TasksPage::new(api.clone(), console.ctx.clone(), console.config.page_size);
    match command {
        TasksCommand::List {
            paging,
            status,
            task_type,
        } => {
            let filters = Filters::from(&TaskFilters { status, task_type });
            let size = console.page_size(&paging);
            show_list(&mut page.list, filters, &paging, size).await?;
        }
        TasksCommand::Show { id } => {
            let task = api.get_task(id).await?;
            println!("id:          {}", task.id);
            println!("title:       {}", task.title);
            println!("description: {}", task.description.as_deref().unwrap_or(format::DASH));
            println!("type:        {}", task.task_type.label());
            println!("status:      {}", task.status.label());
            println!("reward:      {}", task.reward_type.format_amount(task.reward_amount));
            println!("link:        {}", task.task_link.as_deref().unwrap_or(format::DASH));
            if let Some(creator) = task.creator() {
                println!("created by:  {} <{}>", creator.username, creator.email);
            }
            println!("created:     {}", format::timestamp(&task.created_at));
            println!("completed:   {}", format::optional_timestamp(task.completed_at.as_ref()));
        }
        TasksCommand::Create { title, fields } => {
            page.open_create();
            let values = page.drawer.values_mut();
            values.title = title;
            apply_task_fields(values, fields);
            page.save().await.into_result()?;
        }
        TasksCommand::Update { id, title, fields } => {
            let task = api.get_task(id).await?;
            page.open_update(&task);
            let values = page.drawer.values_mut();
            if let Some(title) = title {
                values.title = title;
            }
            apply_task_fields(values, fields);
            page.save().await.into_result()?;
        }
        TasksCommand::Delete { id, yes } => {
            let task = api.get_task(id).await?;
            page.request_delete(task.clone());
            let question = format!("Delete task \"{}\"?", task.title);
            if !yes && !confirm(&question)? {
                page.delete.cancel();
                println!("cancelled");
                return Ok(());
            }
            page.confirm_delete().await.into_result()?;
        }
        TasksCommand::Status { id, status } => {
            page.status.open();
            page.status.values_mut().status = status;
            page.save_status(id).await.into_result()?;
        }
        TasksCommand::Comment { id, text } => {
            page.comment.open();
            page.comment.values_mut().comment = text;
            page.add_comment(id).await.into_result()?;
        }
        TasksCommand::Attach {
            id,
            name,
            url,
            content_type,
        } => {
            page.attachment.open();
            let values = page.attachment.values_mut();
            values.file_name = name;
            values.url = url;
            values.content_type = content_type;
            page.add_attachment(id).await.into_result()?;
        }
    }
    Ok(())
}
