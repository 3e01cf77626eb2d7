//! # Commands
//!
//! Argument definitions and the handlers behind each subcommand.
//!
//! ## Command Tree
//! ```text
//! tripsplit
//! ├── person   add | list | set-payment
//! ├── expense  add | list | delete
//! ├── balances [--person NAME]
//! ├── settle   recalc | list | confirm
//! └── seed
//! ```
//!
//! People can be addressed by id or by name (case-insensitive) anywhere a
//! person is expected.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use tripsplit_core::validation::validate_uuid;
use tripsplit_core::{
    compute_settlement, expenses_by_category, person_summary, Expense, ExpenseCategory,
    ExpenseWithShares, Money, NewExpense, ParticipantRef, PaymentMethod, Person, SettlementView,
    SplitMode, DEFAULT_NIGHTS,
};
use tripsplit_db::{seed_sample_trip, Database};

use crate::settings::AppConfig;

// =============================================================================
// Argument Definitions
// =============================================================================

#[derive(Parser, Debug)]
#[command(name = "tripsplit", version)]
#[command(about = "Split group trip expenses and settle up with as few payments as possible")]
pub struct Cli {
    /// Config file (TOML). Defaults to ./tripsplit.toml when present.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage trip members
    #[command(subcommand)]
    Person(PersonCommand),

    /// Record and review expenses
    #[command(subcommand)]
    Expense(ExpenseCommand),

    /// Show what everyone paid, consumed and is owed
    Balances {
        /// Also break one person's expenses down by category
        #[arg(long)]
        person: Option<String>,
    },

    /// Compute and track the payments that settle the trip
    #[command(subcommand)]
    Settle(SettleCommand),

    /// Fill an empty database with a sample trip
    Seed,
}

#[derive(Subcommand, Debug)]
pub enum PersonCommand {
    /// Add someone to the trip
    Add {
        name: String,
        /// Color as #rrggbb
        #[arg(long)]
        color: Option<String>,
        /// Nights assumed for lodging
        #[arg(long, default_value_t = DEFAULT_NIGHTS)]
        nights: u32,
    },

    /// List everyone on the trip
    List,

    /// Set how someone wants to be paid (no flags clears it)
    SetPayment {
        person: String,
        #[arg(long, value_parser = parse_payment_method)]
        method: Option<PaymentMethod>,
        #[arg(long)]
        handle: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ExpenseCommand {
    /// Record an expense
    Add(ExpenseAddArgs),

    /// List expenses, newest first
    List,

    /// Delete an expense (run `settle recalc` afterwards)
    Delete { id: String },
}

#[derive(Args, Debug)]
pub struct ExpenseAddArgs {
    pub title: String,

    /// Total in dollars, e.g. 123.45
    #[arg(long, value_parser = parse_amount)]
    pub amount: Money,

    /// Who fronted the money
    #[arg(long)]
    pub paid_by: String,

    /// Who shares it, as NAME or NAME:NIGHTS. Repeatable; order is kept.
    /// Defaults to everyone.
    #[arg(long = "participant", value_parser = parse_participant)]
    pub participants: Vec<ParticipantArg>,

    #[arg(long, default_value = "general", value_parser = parse_category)]
    pub category: ExpenseCategory,

    /// even or weighted. Defaults to weighted for lodging.
    #[arg(long, value_parser = parse_split_mode)]
    pub split: Option<SplitMode>,

    /// YYYY-MM-DD, defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,

    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum SettleCommand {
    /// Replace the settlement set with a fresh one
    Recalc,

    /// List the current settlements
    List,

    /// Mark a payment as sent and/or received
    Confirm {
        id: String,
        /// Sender says they paid (`--sender false` to undo)
        #[arg(long, num_args = 0..=1, default_missing_value = "true")]
        sender: Option<bool>,
        /// Receiver says they got it (`--receiver false` to undo)
        #[arg(long, num_args = 0..=1, default_missing_value = "true")]
        receiver: Option<bool>,
    },
}

/// A `--participant` value: who, and optionally how many nights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantArg {
    pub person: String,
    pub nights: Option<u32>,
}

// =============================================================================
// Value Parsers
// =============================================================================

fn parse_amount(raw: &str) -> Result<Money, String> {
    let amount = Money::from_dollars_str(raw).map_err(|e| e.to_string())?;
    if !amount.is_positive() {
        return Err("amount must be greater than zero".to_string());
    }
    Ok(amount)
}

fn parse_participant(raw: &str) -> Result<ParticipantArg, String> {
    let (person, nights) = match raw.rsplit_once(':') {
        Some((person, nights)) => {
            let nights: u32 = nights
                .trim()
                .parse()
                .map_err(|_| format!("invalid nights in '{raw}'"))?;
            if nights == 0 {
                return Err(format!("nights must be at least 1 in '{raw}'"));
            }
            (person, Some(nights))
        }
        None => (raw, None),
    };

    let person = person.trim();
    if person.is_empty() {
        return Err("participant must not be empty".to_string());
    }

    Ok(ParticipantArg {
        person: person.to_string(),
        nights,
    })
}

fn parse_category(raw: &str) -> Result<ExpenseCategory, String> {
    raw.parse().map_err(|e: tripsplit_core::ValidationError| e.to_string())
}

fn parse_split_mode(raw: &str) -> Result<SplitMode, String> {
    raw.parse().map_err(|e: tripsplit_core::ValidationError| e.to_string())
}

fn parse_payment_method(raw: &str) -> Result<PaymentMethod, String> {
    raw.parse().map_err(|e: tripsplit_core::ValidationError| e.to_string())
}

// =============================================================================
// Dispatch
// =============================================================================

/// Runs one command against the database.
pub async fn run(db: &Database, config: &AppConfig, command: Command, json: bool) -> Result<()> {
    match command {
        Command::Person(cmd) => person(db, cmd, json).await,
        Command::Expense(cmd) => expense(db, cmd, json).await,
        Command::Balances { person } => balances(db, config, person.as_deref(), json).await,
        Command::Settle(cmd) => settle(db, cmd, json).await,
        Command::Seed => {
            let summary = seed_sample_trip(db)
                .await
                .context("failed to seed sample trip")?;
            if json {
                return print_json(&summary);
            }
            println!(
                "Seeded {} people, {} expenses, {} settlements",
                summary.people, summary.expenses, summary.settlements
            );
            Ok(())
        }
    }
}

async fn person(db: &Database, cmd: PersonCommand, json: bool) -> Result<()> {
    match cmd {
        PersonCommand::Add { name, color, nights } => {
            let person = db
                .people()
                .create(&name, color.as_deref(), nights)
                .await
                .context("failed to add person")?;
            if json {
                return print_json(&person);
            }
            println!("Added {} ({})", person.name, person.id);
        }
        PersonCommand::List => {
            let people = db.people().list().await.context("failed to list people")?;
            if json {
                return print_json(&people);
            }
            for person in &people {
                println!(
                    "{:<24} {:>2} nights  {:<28} {}",
                    person.name,
                    person.default_nights,
                    payment_label(person),
                    person.id
                );
            }
        }
        PersonCommand::SetPayment { person, method, handle } => {
            let target = resolve_person(db, &person).await?;
            let updated = db
                .people()
                .update_payment_info(&target.id, method, handle.as_deref())
                .await
                .context("failed to update payment info")?;
            if json {
                return print_json(&updated);
            }
            println!("{}: {}", updated.name, payment_label(&updated));
        }
    }
    Ok(())
}

async fn expense(db: &Database, cmd: ExpenseCommand, json: bool) -> Result<()> {
    match cmd {
        ExpenseCommand::Add(args) => {
            let expense = add_expense(db, args).await?;
            if json {
                return print_json(&expense);
            }
            println!(
                "Recorded {} {} ({}), run `tripsplit settle recalc` to update payments",
                expense.title,
                expense.total(),
                expense.id
            );
        }
        ExpenseCommand::List => {
            let expenses = db.expenses().list().await.context("failed to list expenses")?;
            if json {
                return print_json(&expenses);
            }
            let people = db.people().list().await.context("failed to list people")?;
            for expense in &expenses {
                println!(
                    "{}  {:<28} {:>11}  {:<14} paid by {:<12} {} people  {}",
                    expense.date,
                    expense.title,
                    expense.total().to_string(),
                    expense.category.label(),
                    name_of(&people, &expense.payer_id),
                    expense.participants.len(),
                    expense.id
                );
            }
        }
        ExpenseCommand::Delete { id } => {
            db.expenses()
                .delete(&id)
                .await
                .context("failed to delete expense")?;
            if !json {
                println!("Deleted {id}, run `tripsplit settle recalc` to update payments");
            }
        }
    }
    Ok(())
}

/// Resolves names to ids and records the expense.
///
/// Without `--participant` everyone shares. A weighted participant
/// without explicit nights uses their default nights.
async fn add_expense(db: &Database, args: ExpenseAddArgs) -> Result<Expense> {
    let payer = resolve_person(db, &args.paid_by).await?;
    let split_mode = args
        .split
        .unwrap_or_else(|| args.category.default_split_mode());

    let mut people = Vec::with_capacity(args.participants.len());
    if args.participants.is_empty() {
        for person in db.people().list().await.context("failed to list people")? {
            people.push((person, None));
        }
    } else {
        for participant in &args.participants {
            people.push((resolve_person(db, &participant.person).await?, participant.nights));
        }
    }

    if people.is_empty() {
        bail!("nobody to split with, add people first");
    }

    let participants = people
        .into_iter()
        .map(|(person, nights)| match split_mode {
            SplitMode::Even => ParticipantRef::new(person.id),
            SplitMode::Weighted => {
                let nights = nights.unwrap_or_else(|| {
                    u32::try_from(person.default_nights).unwrap_or(DEFAULT_NIGHTS)
                });
                ParticipantRef::with_nights(person.id, nights)
            }
        })
        .collect();

    let new_expense = NewExpense {
        title: args.title,
        description: args.description,
        amount_cents: args.amount.cents(),
        payer_id: payer.id,
        category: args.category,
        date: args.date,
        split_mode,
        participants,
    };

    debug!(
        title = %new_expense.title,
        amount_cents = new_expense.amount_cents,
        split_mode = new_expense.split_mode.as_str(),
        "Adding expense"
    );

    db.expenses()
        .create(&new_expense)
        .await
        .context("failed to create expense")
}

// =============================================================================
// Balances
// =============================================================================

/// One row of the balances report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct BalanceRow {
    person_id: String,
    name: String,
    paid_cents: i64,
    share_cents: i64,
    net_cents: i64,
}

/// One person's expenses in one category.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct CategoryBreakdown {
    category: ExpenseCategory,
    share_cents: i64,
    expenses: Vec<BreakdownLine>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct BreakdownLine {
    expense_id: String,
    title: String,
    date: NaiveDate,
    paid: bool,
    share_cents: i64,
}

/// Groups what `person_id` paid for or shared in, by category.
fn category_breakdown(person_id: &str, expenses: &[ExpenseWithShares]) -> Vec<CategoryBreakdown> {
    expenses_by_category(person_id, expenses)
        .into_iter()
        .map(|(category, group)| {
            let lines: Vec<BreakdownLine> = group
                .into_iter()
                .map(|expense| BreakdownLine {
                    expense_id: expense.id.clone(),
                    title: expense.title.clone(),
                    date: expense.date,
                    paid: expense.payer_id == person_id,
                    share_cents: expense.share_of(person_id).map_or(0, |m| m.cents()),
                })
                .collect();
            CategoryBreakdown {
                category,
                share_cents: lines.iter().map(|l| l.share_cents).sum(),
                expenses: lines,
            }
        })
        .collect()
}

async fn balances(db: &Database, config: &AppConfig, person: Option<&str>, json: bool) -> Result<()> {
    let people = db.people().list().await.context("failed to list people")?;
    let expenses = db.expenses().list().await.context("failed to list expenses")?;
    let ids: Vec<String> = people.iter().map(|p| p.id.clone()).collect();

    let plan = compute_settlement(&expenses, &ids).context("failed to compute balances")?;

    let rows: Vec<BalanceRow> = plan
        .balances
        .iter()
        .map(|balance| {
            let summary = person_summary(&balance.person_id, &plan.expenses);
            BalanceRow {
                person_id: balance.person_id.clone(),
                name: name_of(&people, &balance.person_id).to_string(),
                paid_cents: summary.total_paid.cents(),
                share_cents: summary.total_share.cents(),
                net_cents: balance.amount_cents,
            }
        })
        .collect();

    if let Some(who) = person {
        let target = resolve_person(db, who).await?;
        let breakdown = category_breakdown(&target.id, &plan.expenses);
        if json {
            return print_json(&breakdown);
        }
        println!("{} on {}", target.name, config.trip_name);
        for group in &breakdown {
            println!(
                "{:<38} {:>11}",
                group.category.label(),
                Money::from_cents(group.share_cents).to_string()
            );
            for line in &group.expenses {
                println!(
                    "  {}  {:<28} {:>11}{}",
                    line.date,
                    line.title,
                    Money::from_cents(line.share_cents).to_string(),
                    if line.paid { "  (paid)" } else { "" }
                );
            }
        }
        return Ok(());
    }

    if json {
        return print_json(&rows);
    }

    println!("{} balances", config.trip_name);
    println!("{:<24} {:>11} {:>11} {:>11}", "", "paid", "share", "net");
    for row in &rows {
        println!(
            "{:<24} {:>11} {:>11} {:>11}",
            row.name,
            Money::from_cents(row.paid_cents).to_string(),
            Money::from_cents(row.share_cents).to_string(),
            Money::from_cents(row.net_cents).to_string()
        );
    }
    Ok(())
}

// =============================================================================
// Settlements
// =============================================================================

async fn settle(db: &Database, cmd: SettleCommand, json: bool) -> Result<()> {
    match cmd {
        SettleCommand::Recalc => {
            let views = db
                .settlements()
                .recalculate()
                .await
                .context("failed to recalculate settlements")?;
            if json {
                return print_json(&views);
            }
            if views.is_empty() {
                println!("Everyone is square");
            }
            print_settlements(&views);
        }
        SettleCommand::List => {
            let views = db
                .settlements()
                .list()
                .await
                .context("failed to list settlements")?;
            if json {
                return print_json(&views);
            }
            print_settlements(&views);
        }
        SettleCommand::Confirm { id, sender, receiver } => {
            if sender.is_none() && receiver.is_none() {
                bail!("pass --sender and/or --receiver");
            }
            let view = db
                .settlements()
                .update_confirmation(&id, sender, receiver)
                .await
                .context("failed to update settlement")?;
            if json {
                return print_json(&view);
            }
            print_settlements(std::slice::from_ref(&view));
        }
    }
    Ok(())
}

fn print_settlements(views: &[SettlementView]) {
    for view in views {
        let record = &view.settlement;
        println!(
            "{:<12} -> {:<12} {:>11}  {:<19}  {:<28} {}",
            view.from_person.name,
            view.to_person.name,
            record.amount().to_string(),
            record.status().label(),
            payment_label(&view.to_person),
            record.id
        );
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Finds a person by id, or by name when the input is not a UUID.
async fn resolve_person(db: &Database, who: &str) -> Result<Person> {
    let found = if validate_uuid(who).is_ok() {
        db.people().get_by_id(who).await
    } else {
        db.people().find_by_name(who).await
    }
    .with_context(|| format!("failed to look up '{who}'"))?;

    found.with_context(|| format!("no one on the trip matches '{who}'"))
}

fn name_of<'a>(people: &'a [Person], id: &'a str) -> &'a str {
    people
        .iter()
        .find(|p| p.id == id)
        .map(|p| p.name.as_str())
        .unwrap_or(id)
}

fn payment_label(person: &Person) -> String {
    match (person.payment_method, person.payment_handle.as_deref()) {
        (Some(method), Some(handle)) => format!("{method} {handle}"),
        (Some(method), None) => method.to_string(),
        (None, Some(handle)) => handle.to_string(),
        (None, None) => "-".to_string(),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("failed to encode JSON")?;
    println!("{out}");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
