//! CLI binary for browsing a shared-expense ledger.

use std::collections::BTreeMap;
use std::io::{self, Write as _};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use owo_colors::OwoColorize;
use rateio_rs::aggregate::{MonthTotals, PeriodSummary};
use rateio_rs::calendar::{self, CalendarEvent};
use rateio_rs::card::{PortfolioUtilization, UtilizationLevel};
use rateio_rs::dates::Period;
use rateio_rs::ledger::{ExpenseFilter, LedgerBlocking};
use rateio_rs::models::{
    CardId, Category, CategoryId, Decimal, EventStatus, Expense, ExpenseStatus, Investor,
    InvestorId, InvestorShare, NaiveDate, PaymentKind,
};
use rateio_rs::money::{format_currency, format_percent};
use rateio_rs::storage::{BlockingStorage, FileStorage};

/// Environment variable overriding the data directory.
const DATA_DIR_ENV: &str = "RATEIO_DATA_DIR";

/// Shared-expense ledger: splits, card limits and monthly reports.
#[derive(Debug, Parser)]
#[command(name = "rateio", version, about)]
struct Cli {
    /// Override the storage directory (default: $RATEIO_DATA_DIR, then the
    /// XDG data dir).
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Monthly summary: totals, categories, investors and cash flow.
    Summary {
        /// Month to report (YYYY-MM or YYYY-MM-DD, default: current).
        #[arg(long)]
        month: Option<String>,
    },
    /// Credit card utilization.
    Cards,
    /// Calendar events for a day, or the current month grouped by day.
    Calendar {
        /// Day to show (YYYY-MM-DD).
        #[arg(long, value_parser = parse_date)]
        day: Option<NaiveDate>,
    },
    /// Preview how an amount splits among active investors.
    Split {
        /// Amount to split, e.g. 100.00.
        #[arg(long)]
        amount: Decimal,
    },
    /// List expenses, optionally filtered.
    Expenses(ExpenseArgs),
    /// List investors.
    Investors,
    /// Pending expenses due soon, plus overdue ones.
    Upcoming {
        /// Look-ahead window in days.
        #[arg(long, default_value_t = 7)]
        days: u32,
    },
    /// Month-by-month totals.
    Trend {
        /// Number of months, ending with the current one.
        #[arg(long, default_value_t = 6)]
        months: u32,
    },
}

/// Arguments for the `expenses` subcommand.
#[derive(Debug, Default, Args)]
struct ExpenseArgs {
    /// Earliest due date (inclusive, YYYY-MM-DD). Requires --to.
    #[arg(long, requires = "to", value_parser = parse_date)]
    from: Option<NaiveDate>,
    /// Latest due date (inclusive, YYYY-MM-DD). Requires --from.
    #[arg(long, requires = "from", value_parser = parse_date)]
    to: Option<NaiveDate>,
    /// Category ID.
    #[arg(long)]
    category: Option<String>,
    /// Card ID.
    #[arg(long)]
    card: Option<String>,
    /// Payment status.
    #[arg(long, value_enum)]
    status: Option<StatusArg>,
    /// Payment method.
    #[arg(long, value_enum)]
    payment: Option<PaymentArg>,
    /// Investor ID taking part in the split.
    #[arg(long)]
    investor: Option<String>,
}

/// Payment status accepted by `--status`.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatusArg {
    /// Not yet paid.
    Pending,
    /// Already paid.
    Paid,
}

impl From<StatusArg> for ExpenseStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Pending => Self::Pending,
            StatusArg::Paid => Self::Paid,
        }
    }
}

/// Payment method accepted by `--payment`.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum PaymentArg {
    /// Cash.
    Cash,
    /// Bank transfer.
    Transfer,
    /// Any credit card.
    Card,
}

impl From<PaymentArg> for PaymentKind {
    fn from(arg: PaymentArg) -> Self {
        match arg {
            PaymentArg::Cash => Self::Cash,
            PaymentArg::Transfer => Self::Transfer,
            PaymentArg::Card => Self::Card,
        }
    }
}

/// Parses a date string in `YYYY-MM-DD` format for clap.
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|err| format!("{err}"))
}

/// Runs the CLI, returning an appropriate exit code.
fn run() -> io::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let _dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let storage = match create_storage(cli.data_dir) {
        Ok(storage) => storage,
        Err(err) => {
            report("failed to initialize storage", &err)?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let ledger = match LedgerBlocking::builder().storage(storage).build() {
        Ok(ledger) => ledger,
        Err(err) => {
            report("failed to open ledger", &err)?;
            return Ok(ExitCode::FAILURE);
        }
    };

    dispatch(&ledger, cli.command, chrono::Local::now().date_naive())
}

/// Creates the storage backend from `--data-dir`, then
/// `RATEIO_DATA_DIR`, then the default XDG data directory.
fn create_storage(data_dir: Option<PathBuf>) -> rateio_rs::error::Result<FileStorage> {
    let dir = match data_dir.or_else(data_dir_from_env) {
        Some(dir) => dir,
        None => FileStorage::default_dir()?,
    };
    FileStorage::new(dir)
}

/// Reads a non-empty `RATEIO_DATA_DIR`.
fn data_dir_from_env() -> Option<PathBuf> {
    std::env::var_os(DATA_DIR_ENV)
        .filter(|val| !val.is_empty())
        .map(PathBuf::from)
}

/// Prints an error line to stderr.
fn report(context: &str, err: &dyn core::fmt::Display) -> io::Result<()> {
    writeln!(
        io::stderr().lock(),
        "{} {context}: {err}",
        "error:".red().bold()
    )
}

/// Dispatches to the appropriate subcommand handler.
fn dispatch<S: BlockingStorage>(
    ledger: &LedgerBlocking<S>,
    command: Command,
    today: NaiveDate,
) -> io::Result<ExitCode> {
    match command {
        Command::Summary { month } => cmd_summary(ledger, month.as_deref(), today),
        Command::Cards => cmd_cards(ledger),
        Command::Calendar { day } => cmd_calendar(ledger, day, today),
        Command::Split { amount } => cmd_split(ledger, amount),
        Command::Expenses(args) => cmd_expenses(ledger, &args),
        Command::Investors => cmd_investors(ledger),
        Command::Upcoming { days } => cmd_upcoming(ledger, today, days),
        Command::Trend { months } => cmd_trend(ledger, today, months),
    }
}

/// Executes the `summary` subcommand.
fn cmd_summary<S: BlockingStorage>(
    ledger: &LedgerBlocking<S>,
    month: Option<&str>,
    today: NaiveDate,
) -> io::Result<ExitCode> {
    let built = match month {
        Some(input) => ledger.period_summary_for(input),
        None => ledger.period_summary(today),
    };
    let lookups = ledger
        .categories()
        .and_then(|cats| ledger.investors().map(|invs| (cats, invs)));
    match built.and_then(|summary| lookups.map(|names| (summary, names))) {
        Ok((summary, (categories, investors))) => {
            print_summary(&summary, &categories, &investors)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report("failed to build summary", &err)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Executes the `cards` subcommand.
fn cmd_cards<S: BlockingStorage>(ledger: &LedgerBlocking<S>) -> io::Result<ExitCode> {
    match ledger.portfolio().and_then(|p| ledger.cards().map(|c| (p, c))) {
        Ok((portfolio, cards)) => {
            let names: BTreeMap<CardId, String> =
                cards.into_iter().map(|card| (card.id, card.name)).collect();
            print_portfolio(&portfolio, &names)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report("failed to compute card utilization", &err)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Executes the `calendar` subcommand.
fn cmd_calendar<S: BlockingStorage>(
    ledger: &LedgerBlocking<S>,
    day: Option<NaiveDate>,
    today: NaiveDate,
) -> io::Result<ExitCode> {
    let events = match ledger.calendar_events() {
        Ok(events) => events,
        Err(err) => {
            report("failed to read calendar", &err)?;
            return Ok(ExitCode::FAILURE);
        }
    };
    if let Some(selected) = day {
        let on_day: Vec<CalendarEvent> = calendar::events_on_day(&events, selected)
            .into_iter()
            .cloned()
            .collect();
        print_events(&selected.to_string(), &on_day)?;
        return Ok(ExitCode::SUCCESS);
    }
    let period = match Period::containing(today) {
        Ok(period) => period,
        Err(err) => {
            report("invalid month", &err)?;
            return Ok(ExitCode::FAILURE);
        }
    };
    let grouped = calendar::events_in_period(&events, period);
    if grouped.is_empty() {
        writeln!(io::stdout().lock(), "{}", "No events this month.".dimmed())?;
    }
    for (date, day_events) in grouped {
        let owned: Vec<CalendarEvent> = day_events.into_iter().cloned().collect();
        print_events(&date.to_string(), &owned)?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the `split` subcommand.
fn cmd_split<S: BlockingStorage>(
    ledger: &LedgerBlocking<S>,
    amount: Decimal,
) -> io::Result<ExitCode> {
    match ledger
        .split_amount(amount)
        .and_then(|shares| ledger.investors().map(|invs| (shares, invs)))
    {
        Ok((shares, investors)) => {
            print_split(amount, &shares, &investors)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report("cannot split", &err)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Builds an [`ExpenseFilter`] from CLI arguments.
fn build_expense_filter(args: &ExpenseArgs) -> ExpenseFilter {
    let mut filter = ExpenseFilter::new();
    if let Some((from, to)) = args.from.zip(args.to) {
        filter = filter.due_between(from, to);
    }
    if let Some(id) = args.category.as_deref() {
        filter = filter.category(CategoryId::from(id));
    }
    if let Some(id) = args.card.as_deref() {
        filter = filter.card(CardId::from(id));
    }
    if let Some(status) = args.status {
        filter = filter.status(status.into());
    }
    if let Some(payment) = args.payment {
        filter = filter.payment(payment.into());
    }
    if let Some(id) = args.investor.as_deref() {
        filter = filter.investor(InvestorId::from(id));
    }
    filter
}

/// Executes the `expenses` subcommand.
fn cmd_expenses<S: BlockingStorage>(
    ledger: &LedgerBlocking<S>,
    args: &ExpenseArgs,
) -> io::Result<ExitCode> {
    let filter = build_expense_filter(args);
    match ledger.filter_expenses(&filter) {
        Ok(mut expenses) => {
            expenses.sort_by(|left, right| {
                left.due_date
                    .cmp(&right.due_date)
                    .then_with(|| left.id.cmp(&right.id))
            });
            let focus = args.investor.as_deref().map(InvestorId::from);
            print_expenses_table("Expenses", &expenses, focus.as_ref())?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report("failed to read expenses", &err)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Executes the `investors` subcommand.
fn cmd_investors<S: BlockingStorage>(ledger: &LedgerBlocking<S>) -> io::Result<ExitCode> {
    match ledger.investors() {
        Ok(investors) => {
            print_investors_table(&investors)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report("failed to read investors", &err)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Executes the `upcoming` subcommand.
fn cmd_upcoming<S: BlockingStorage>(
    ledger: &LedgerBlocking<S>,
    today: NaiveDate,
    days: u32,
) -> io::Result<ExitCode> {
    match ledger
        .overdue_expenses(today)
        .and_then(|overdue| ledger.upcoming_expenses(today, days).map(|up| (overdue, up)))
    {
        Ok((overdue, upcoming)) => {
            if !overdue.is_empty() {
                print_expenses_table("Overdue", &overdue, None)?;
            }
            print_expenses_table(&format!("Due in the next {days} days"), &upcoming, None)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report("failed to read expenses", &err)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Executes the `trend` subcommand.
fn cmd_trend<S: BlockingStorage>(
    ledger: &LedgerBlocking<S>,
    today: NaiveDate,
    months: u32,
) -> io::Result<ExitCode> {
    match ledger.monthly_trend(today, months) {
        Ok(trend) => {
            print_trend(&trend)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report("failed to build trend", &err)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

// ── Output formatting ────────────────────────────────────────────────

/// Builds a cyan table header row.
fn header(titles: &[&str]) -> Vec<Cell> {
    titles
        .iter()
        .map(|title| Cell::new(title).fg(Color::Cyan))
        .collect()
}

/// Formats an amount, red when negative.
fn money_cell(amount: Decimal) -> Cell {
    let cell = Cell::new(format_currency(amount));
    if amount < Decimal::ZERO {
        cell.fg(Color::Red)
    } else {
        cell
    }
}

/// Resolves a category name, falling back for dangling IDs.
fn category_name<'a>(categories: &'a [Category], id: Option<&CategoryId>) -> &'a str {
    id.and_then(|id| categories.iter().find(|cat| cat.id == *id))
        .map_or("(unknown category)", |cat| cat.name.as_str())
}

/// Resolves an investor name, falling back for dangling IDs.
fn investor_name<'a>(investors: &'a [Investor], id: Option<&InvestorId>) -> &'a str {
    id.and_then(|id| investors.iter().find(|inv| inv.id == *id))
        .map_or("(unknown investor)", |inv| inv.name.as_str())
}

/// Prints the monthly summary.
fn print_summary(
    summary: &PeriodSummary,
    categories: &[Category],
    investors: &[Investor],
) -> io::Result<()> {
    let mut out = io::stdout().lock();
    let opens = summary.period.start_of_day();
    let closes = summary.period.end_of_day();
    writeln!(
        out,
        "{} {}",
        "Summary".green().bold(),
        format_args!("({}: {opens} to {closes})", summary.period).dimmed()
    )?;
    writeln!(out)?;

    let mut totals = Table::new();
    _ = totals.load_preset(UTF8_FULL);
    _ = totals.set_header(header(&["Figure", "Amount"]));
    let rows = [
        ("Expenses", summary.expenses_total),
        ("Paid", summary.expenses_paid),
        ("Pending", summary.expenses_pending),
        ("Contributions", summary.contributions_total),
        ("Available", summary.available_balance),
    ];
    for (label, amount) in rows {
        _ = totals.add_row(vec![Cell::new(label), money_cell(amount)]);
    }
    writeln!(out, "{totals}")?;

    if !summary.per_category.is_empty() {
        let mut table = Table::new();
        _ = table.load_preset(UTF8_FULL);
        _ = table.set_header(header(&["Category", "Total", "Share"]));
        for row in &summary.per_category {
            let share = if summary.expenses_total.is_zero() {
                Decimal::ZERO
            } else {
                row.total * Decimal::ONE_HUNDRED / summary.expenses_total
            };
            _ = table.add_row(vec![
                Cell::new(category_name(categories, row.category_id.as_ref())),
                money_cell(row.total),
                Cell::new(format_percent(share, 1)),
            ]);
        }
        writeln!(out, "{table}")?;
    }

    if !summary.per_investor.is_empty() {
        let mut table = Table::new();
        _ = table.load_preset(UTF8_FULL);
        _ = table.set_header(header(&["Investor", "Contributed", "Allocated", "Net"]));
        for row in &summary.per_investor {
            _ = table.add_row(vec![
                Cell::new(investor_name(investors, row.investor_id.as_ref())),
                money_cell(row.contributed),
                money_cell(row.allocated_expense),
                money_cell(row.net),
            ]);
        }
        writeln!(out, "{table}")?;
    }

    let moving: Vec<_> = summary
        .daily_running_balance
        .iter()
        .filter(|day| !day.inflow.is_zero() || !day.outflow.is_zero())
        .collect();
    if !moving.is_empty() {
        let mut table = Table::new();
        _ = table.load_preset(UTF8_FULL);
        _ = table.set_header(header(&["Day", "In", "Out", "Balance"]));
        for day in moving {
            _ = table.add_row(vec![
                Cell::new(day.day),
                money_cell(day.inflow),
                money_cell(day.outflow),
                money_cell(day.cumulative_balance),
            ]);
        }
        writeln!(out, "{table}")?;
    }
    Ok(())
}

/// Table color for a utilization band.
const fn level_color(level: UtilizationLevel) -> Color {
    match level {
        UtilizationLevel::Low => Color::Green,
        UtilizationLevel::Moderate => Color::Yellow,
        UtilizationLevel::High | UtilizationLevel::OverLimit => Color::Red,
    }
}

/// Prints per-card utilization and portfolio totals.
fn print_portfolio(
    portfolio: &PortfolioUtilization,
    names: &BTreeMap<CardId, String>,
) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if portfolio.per_card.is_empty() {
        writeln!(out, "{}", "No cards found.".dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(header(&["Card", "Utilized", "Available", "Usage"]));
    for (id, util) in &portfolio.per_card {
        let name = names.get(id).map_or(id.as_inner(), String::as_str);
        _ = table.add_row(vec![
            Cell::new(name),
            money_cell(util.utilized),
            money_cell(util.available),
            Cell::new(format_percent(util.display_percent(), 1)).fg(level_color(util.level())),
        ]);
    }

    writeln!(
        out,
        "{} {}",
        "Cards".green().bold(),
        format_args!("({})", portfolio.active_card_count).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    writeln!(
        out,
        "  {} {} of {} ({})",
        "Total:".bold(),
        format_currency(portfolio.total_utilized),
        format_currency(portfolio.total_limit),
        format_percent(portfolio.percent_utilized, 1)
    )?;
    writeln!(
        out,
        "  {} {}",
        "Upcoming invoices:".bold(),
        format_currency(portfolio.upcoming_invoice_total)
    )?;
    Ok(())
}

/// Prints calendar events under a heading.
fn print_events(heading: &str, events: &[CalendarEvent]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if events.is_empty() {
        writeln!(out, "{}", format_args!("No events on {heading}.").dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(header(&["Title", "Detail", "Amount", "Status", "Who"]));
    for event in events {
        let status = match event.status {
            EventStatus::Pending => Cell::new("pending").fg(Color::Yellow),
            EventStatus::Paid => Cell::new("paid").fg(Color::Green),
            EventStatus::Confirmed => Cell::new("confirmed").fg(Color::Green),
        };
        _ = table.add_row(vec![
            Cell::new(&event.title),
            Cell::new(&event.description),
            money_cell(event.amount),
            status,
            Cell::new(event.attribution.label()),
        ]);
    }
    writeln!(out, "{}", heading.green().bold())?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints a split preview.
fn print_split(amount: Decimal, shares: &[InvestorShare], investors: &[Investor]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(header(&["Investor", "Share"]));
    for share in shares {
        _ = table.add_row(vec![
            Cell::new(investor_name(investors, Some(&share.investor_id))),
            money_cell(share.amount),
        ]);
    }
    writeln!(
        out,
        "{} {}",
        "Split".green().bold(),
        format_args!("({})", format_currency(amount)).dimmed()
    )?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Instalment marker, or the next due date of a recurring expense.
fn schedule_label(expense: &Expense) -> String {
    expense
        .installment_label()
        .or_else(|| expense.next_due_date().map(|next| format!("next {next}")))
        .unwrap_or_default()
}

/// Prints expenses in a table, with the share of `focus` when given.
fn print_expenses_table(
    title: &str,
    expenses: &[Expense],
    focus: Option<&InvestorId>,
) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if expenses.is_empty() {
        writeln!(out, "{}", format_args!("{title}: none.").dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    let mut titles = vec!["Due", "Description", "Amount"];
    if focus.is_some() {
        titles.push("Share");
    }
    titles.extend(["Status", "Schedule"]);
    _ = table.set_header(header(&titles));
    for expense in expenses {
        let status = if expense.is_paid() {
            Cell::new("paid").fg(Color::Green)
        } else {
            Cell::new("pending").fg(Color::Yellow)
        };
        let mut row = vec![
            Cell::new(expense.due_date),
            Cell::new(&expense.description),
            money_cell(expense.amount),
        ];
        if let Some(investor) = focus {
            row.push(money_cell(expense.share_of(investor)));
        }
        row.push(status);
        row.push(Cell::new(schedule_label(expense)));
        _ = table.add_row(row);
    }
    writeln!(
        out,
        "{} {}",
        title.green().bold(),
        format_args!("({})", expenses.len()).dimmed()
    )?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints investors in a table.
fn print_investors_table(investors: &[Investor]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if investors.is_empty() {
        writeln!(out, "{}", "No investors found.".dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(header(&["Name", "Email", "Active", "Balance"]));
    for investor in investors {
        let active = if investor.active {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("no").fg(Color::DarkGrey)
        };
        _ = table.add_row(vec![
            Cell::new(&investor.name),
            Cell::new(&investor.email),
            active,
            money_cell(investor.current_balance),
        ]);
    }
    writeln!(
        out,
        "{} {}",
        "Investors".green().bold(),
        format_args!("({})", investors.len()).dimmed()
    )?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints a month-by-month trend.
fn print_trend(trend: &[MonthTotals]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(header(&["Month", "Expenses", "Paid", "Contributions", "Balance"]));
    for month in trend {
        _ = table.add_row(vec![
            Cell::new(month.period),
            money_cell(month.expenses_total),
            money_cell(month.expenses_paid),
            money_cell(month.contributions_total),
            money_cell(month.balance),
        ]);
    }
    writeln!(out, "{}", "Trend".green().bold())?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Entry point.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            // stderr itself may be gone; nothing left to report to.
            let _ignored = writeln!(io::stderr(), "fatal I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}
