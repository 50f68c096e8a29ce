// Billminder - terminal client for the bills backend
// Entry point and application setup

use billminder::api::{BillStatus, SortField};
use billminder::app;
use billminder::config::ClientConfig;
use billminder::services::{Toast, ToastLevel, ToastSink};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "\
Usage: billminder <command>

Commands:
  list [upcoming|overdue|paid] [search] [--sort amount|due_date]
  export <dir> [upcoming|overdue|paid] [search]
  reminders
  watch";

/// Prints toasts to the terminal
struct TerminalToasts;

impl ToastSink for TerminalToasts {
    fn show(&self, toast: Toast) {
        let tag = match toast.level {
            ToastLevel::Success => "ok",
            ToastLevel::Info => "info",
            ToastLevel::Warning => "warn",
            ToastLevel::Error => "error",
        };
        eprintln!("[{}] {}", tag, toast.message);
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "billminder=debug,info".into());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Positional status, search term and `--sort` flag shared by list/export
struct ListArgs {
    status: BillStatus,
    search: String,
    sort: SortField,
}

fn parse_list_args(args: &[String]) -> anyhow::Result<ListArgs> {
    let mut parsed = ListArgs {
        status: BillStatus::Upcoming,
        search: String::new(),
        sort: SortField::DueDate,
    };
    let mut positional = 0;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        if arg == "--sort" {
            let value = iter
                .next()
                .ok_or_else(|| anyhow::anyhow!("--sort needs a value"))?;
            parsed.sort = value.parse()?;
            continue;
        }
        match positional {
            0 => parsed.status = arg.parse()?,
            1 => parsed.search = arg.clone(),
            _ => anyhow::bail!("Unexpected argument: {}", arg),
        }
        positional += 1;
    }

    Ok(parsed)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        println!("{}", USAGE);
        return Ok(());
    };

    tracing::info!("Starting Billminder");

    let config = ClientConfig::from_env()?;
    let state = app::setup(config, Arc::new(TerminalToasts))?;

    match command.as_str() {
        "list" => {
            let list_args = parse_list_args(&args[1..])?;
            let view = state.bill_list();
            view.set_search(list_args.search).await;
            view.set_sort(list_args.sort).await;
            view.set_tab(list_args.status).await;
            print!("{}", view.render().await);
        }
        "export" => {
            let dir = args
                .get(1)
                .map(PathBuf::from)
                .ok_or_else(|| anyhow::anyhow!("export needs a target directory"))?;
            let list_args = parse_list_args(&args[2..])?;
            let view = state.bill_list();
            view.set_search(list_args.search).await;
            view.set_sort(list_args.sort).await;
            view.set_tab(list_args.status).await;
            if let Some(path) = view.export_csv(&dir).await {
                println!("{}", path.display());
            }
        }
        "reminders" => {
            let view = state.reminder_list();
            view.load().await;
            print!("{}", view.render().await);
        }
        "watch" => {
            let subscription = state.start_push();
            println!("Listening for bill updates, Ctrl-C to stop");
            tokio::signal::ctrl_c().await?;
            subscription.disconnect().await;
        }
        _ => {
            println!("{}", USAGE);
        }
    }

    Ok(())
}
