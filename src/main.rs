use crate::dashboard::DisplayOptions;
use crate::error::PortfolioError;
use crate::holdings::{aggregate, apply_quotes, Holdings};
use crate::quotes::{QuoteClient, QuoteMap};
use crate::transaction::TransactionSet;

use clap::{arg, Command};
use eyre::WrapErr;
use serde::Deserialize;
use serde::Serialize;

mod dashboard;
mod error;
mod holdings;
mod quotes;
mod transaction;

#[derive(Serialize, Deserialize)]
struct Config {
    portfolio_file: String,
    base_url: String,
    api_key: String,
    top_n: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            portfolio_file: "data/data.json".to_string(),
            base_url: "https://api.twelvedata.com".to_string(),
            api_key: String::new(),
            top_n: 5,
        }
    }
}

fn cli() -> Command {
    Command::new("stockfolio")
        .about("A terminal dashboard for your stock portfolio")
        .arg_required_else_help(true)
        .subcommand(Command::new("config").about("Print the path to the config file"))
        .subcommand(
            Command::new("dashboard")
                .about("Show the full portfolio dashboard")
                .arg(
                    arg!(<FILE> "JSON file with your buy transactions")
                        .required(false)
                        .default_value(""),
                ),
        )
        .subcommand(
            Command::new("overview")
                .about("Show all holdings with live valuation")
                .arg(
                    arg!(<FILE> "JSON file with your buy transactions")
                        .required(false)
                        .default_value(""),
                ),
        )
        .subcommand(
            Command::new("records")
                .about("Show the most recent buy transactions")
                .arg(
                    arg!(<FILE> "JSON file with your buy transactions")
                        .required(false)
                        .default_value(""),
                ),
        )
}

// Fetch live prices, degrading to an empty quote map when the quote source
// is unreachable. With no quotes every holding is priced at its average
// cost, which is exactly the cost-basis-only display.
async fn fetch_quotes(transactions: &TransactionSet, config: &Config) -> QuoteMap {
    let result = match QuoteClient::new(&config.base_url, &config.api_key) {
        Ok(client) => client.latest_prices(&transactions.unique_symbols()).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(quotes) => quotes,
        Err(e) => {
            eprintln!("Warning: {e}; showing cost-basis figures");
            QuoteMap::new()
        }
    }
}

async fn value_portfolio(
    transactions: &TransactionSet,
    config: &Config,
) -> Result<Holdings, PortfolioError> {
    let basis = aggregate(transactions)?;
    let quotes = fetch_quotes(transactions, config).await;
    Ok(apply_quotes(basis, &quotes))
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cfg: Config =
        confy::load("stockfolio", "config").wrap_err("could not load configuration")?;

    let matches = cli().get_matches();

    if matches.subcommand_matches("config").is_some() {
        println!(
            "Your config file is located here: \n{}",
            confy::get_configuration_file_path("stockfolio", "config")?.display()
        );
        return Ok(());
    }

    for subcommand in ["dashboard", "overview", "records"] {
        if let Some(matches) = matches.subcommand_matches(subcommand) {
            let mut filename = String::new();

            // try to get filename as argument
            if let Ok(Some(f)) = matches.try_get_one::<String>("FILE") {
                filename = f.to_string();
            }
            // if no argument is given, try to get filename from config
            if filename.is_empty() {
                filename.clone_from(&cfg.portfolio_file);
            }
            // if no argument and no config is given, print help
            if filename.is_empty() {
                cli().print_help()?;
                return Ok(());
            }

            let transactions = TransactionSet::load(&filename)
                .wrap_err_with(|| format!("while reading {filename}"))?;

            let options = DisplayOptions {
                top_n: Some(cfg.top_n),
                ..DisplayOptions::default()
            };

            match subcommand {
                "dashboard" => {
                    let holdings = value_portfolio(&transactions, &cfg).await?;
                    dashboard::print_dashboard(&transactions, &holdings, &options);
                }
                "overview" => {
                    let holdings = value_portfolio(&transactions, &cfg).await?;
                    dashboard::print_overview(
                        &holdings,
                        &DisplayOptions {
                            top_n: None,
                            ..options
                        },
                    );
                    dashboard::print_totals(&holdings.totals());
                }
                "records" => {
                    dashboard::print_records(&transactions, 10);
                }
                _ => (),
            }
        }
    }

    Ok(())
}
