use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use ledger::{Ledger, MoneyCents, OpenAccountCmd};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection, EntityTrait, Set};

mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub username: String,
        pub password: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Parser, Debug)]
#[command(name = "souq_admin")]
#[command(about = "Admin utilities for the Souq capital ledger (bootstrap staff/vendors, audit)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./souq.db?mode=rwc")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Staff(Staff),
    Vendor(Vendor),
    /// Run the reconciliation audit and print the drift report.
    Audit(AuditArgs),
}

#[derive(Args, Debug)]
struct Staff {
    #[command(subcommand)]
    command: StaffCommand,
}

#[derive(Subcommand, Debug)]
enum StaffCommand {
    Create(StaffCreateArgs),
}

#[derive(Args, Debug)]
struct StaffCreateArgs {
    #[arg(long)]
    username: String,
}

#[derive(Args, Debug)]
struct Vendor {
    #[command(subcommand)]
    command: VendorCommand,
}

#[derive(Subcommand, Debug)]
enum VendorCommand {
    /// Create a vendor and open its capital account.
    Create(VendorCreateArgs),
}

#[derive(Args, Debug)]
struct VendorCreateArgs {
    #[arg(long)]
    name: String,
    /// Starting cash contribution, e.g. "7500" or "7500.00".
    #[arg(long)]
    initial_capital: String,
}

#[derive(Args, Debug)]
struct AuditArgs {
    /// Audit one vendor; sweeps every vendor when omitted.
    #[arg(long)]
    vendor_id: Option<String>,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.is_empty() {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print("Password must not be empty.\r\n")
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn audit_vendor(ledger: &Ledger, vendor_id: &str) -> Result<bool, Box<dyn Error + Send + Sync>> {
    let report = ledger.reconcile(vendor_id).await?;
    let status = if report.is_clean() { "ok" } else { "DRIFT" };
    println!(
        "{vendor_id}  [{status}]  expected {}  actual {}  delta {}",
        MoneyCents::new(report.expected_minor),
        MoneyCents::new(report.actual_minor),
        MoneyCents::new(report.delta_minor),
    );
    for explanation in &report.explanations {
        println!("    - {explanation}");
    }
    Ok(report.is_clean())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::Staff(Staff {
            command: StaffCommand::Create(args),
        }) => {
            let password = prompt_password_twice()?;

            if users::Entity::find_by_id(args.username.clone())
                .one(&db)
                .await?
                .is_some()
            {
                eprintln!("user already exists: {}", args.username);
                std::process::exit(1);
            }

            let user = users::ActiveModel {
                username: Set(args.username.clone()),
                password: Set(password),
            };
            users::Entity::insert(user).exec(&db).await?;

            println!("created staff user: {}", args.username);
        }
        Command::Vendor(Vendor {
            command: VendorCommand::Create(args),
        }) => {
            let initial: MoneyCents = match args.initial_capital.parse() {
                Ok(v) => v,
                Err(err) => {
                    eprintln!("invalid initial capital: {err}");
                    std::process::exit(2);
                }
            };

            let ledger = Ledger::builder().database(db.clone()).build().await?;
            let vendor = ledger.create_vendor(&args.name).await?;
            let account = ledger
                .open_account(OpenAccountCmd::new(vendor.id.to_string(), initial.cents()))
                .await?;

            println!(
                "created vendor {} ({}) with capital {}",
                vendor.name,
                vendor.id,
                MoneyCents::new(account.initial_capital_minor)
            );
        }
        Command::Audit(args) => {
            let ledger = Ledger::builder().database(db.clone()).build().await?;

            let mut all_clean = true;
            match args.vendor_id {
                Some(vendor_id) => {
                    all_clean = audit_vendor(&ledger, &vendor_id).await?;
                }
                None => {
                    for vendor in ledger.list_vendors().await? {
                        let id = vendor.id.to_string();
                        // Vendors without an account yet have nothing to audit.
                        match ledger.account(&id).await {
                            Ok(_) => {
                                if !audit_vendor(&ledger, &id).await? {
                                    all_clean = false;
                                }
                            }
                            Err(ledger::LedgerError::AccountNotFound(_)) => continue,
                            Err(err) => return Err(err.into()),
                        }
                    }
                }
            }

            if !all_clean {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
