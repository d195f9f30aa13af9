use anyhow::{Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand};
use gengi::cli::list::ListOptions;
use gengi::core::asset::{AssetClass, AssetKey};
use gengi::core::conversion::quick_pick;
use gengi::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount in the base currency
    Convert {
        /// Amount in the base currency, e.g. "12 500" or "1.234,56" [default: 1000]
        amount: Option<String>,
        /// Target code: currency code, crypto slug or metal name [default: USD]
        #[arg(short, long)]
        to: Option<String>,
        /// Class of the target: currency, crypto or metal
        #[arg(long, default_value = "currency")]
        class: String,
        /// Preset target: bitcoin, gold or eur
        #[arg(long, conflicts_with_all = ["to", "class"])]
        pick: Option<String>,
    },
    /// List currencies, cryptocurrencies and metals
    List {
        /// Asset class to show: all, currency, crypto or metal
        #[arg(short, long, default_value = "all")]
        filter: String,
        /// Case-insensitive match on code or name
        #[arg(short, long, default_value = "")]
        search: String,
        /// Sort order: popularity, priceHigh, priceLow or name
        #[arg(long, default_value = "popularity")]
        sort: String,
        /// Show at most this many assets
        #[arg(short, long)]
        limit: Option<usize>,
        /// Resolve icons and colors (crypto icons are rate limited)
        #[arg(long)]
        icons: bool,
    },
    /// Show the icon or color used for an asset
    Visual {
        code: String,
        /// Class of the asset: currency, crypto or metal
        #[arg(long, default_value = "currency")]
        class: String,
    },
}

fn target_key(code: String, class: &str) -> Result<AssetKey> {
    let class: AssetClass = class.parse()?;
    let code = match class {
        AssetClass::Currency => code.to_uppercase(),
        AssetClass::Crypto | AssetClass::Metal => code.to_lowercase(),
    };
    Ok(AssetKey::new(class, code))
}

impl TryFrom<Commands> for gengi::AppCommand {
    type Error = anyhow::Error;

    fn try_from(cmd: Commands) -> Result<gengi::AppCommand> {
        Ok(match cmd {
            Commands::Convert {
                amount,
                to,
                class,
                pick,
            } => {
                let target = match (pick, to) {
                    (Some(pick), _) => Some(
                        quick_pick(&pick).ok_or_else(|| anyhow!("Unknown quick pick: {pick}"))?,
                    ),
                    (None, Some(to)) => Some(target_key(to, &class)?),
                    (None, None) => None,
                };
                gengi::AppCommand::Convert { amount, target }
            }
            Commands::List {
                filter,
                search,
                sort,
                limit,
                icons,
            } => gengi::AppCommand::List(ListOptions {
                filter: filter.parse()?,
                search,
                sort: sort.parse()?,
                limit,
                icons,
            }),
            Commands::Visual { code, class } => gengi::AppCommand::Visual(target_key(code, &class)?),
            Commands::Setup => return Err(anyhow!("Setup command should be handled separately")),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => gengi::cli::setup::setup(),
        Some(cmd) => match gengi::AppCommand::try_from(cmd) {
            Ok(command) => gengi::run_command(command, cli.config_path.as_deref()).await,
            Err(e) => Err(e),
        },
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
