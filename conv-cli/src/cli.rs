use anyhow::{Context, bail};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use conv_core::{
    CatalogStore, Config, ConversionEngine, ConversionInput, CurrencyCode, services_from_config,
};
use std::ffi::OsString;

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "conv",
    version,
    about = "Convert currency amounts using daily exchange rates",
    after_help = "Shorthand: `conv <amount> <from> [to]` is `conv convert ...`"
)]
pub struct Cli {
    /// Output machine-readable JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// List all available currencies.
    #[arg(short, long)]
    pub list: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Amount in the source currency, e.g. 100 or -2.5.
    #[arg(allow_negative_numbers = true)]
    pub amount: String,

    /// Source currency code, e.g. USD.
    pub from: String,

    /// Target currency code; the configured default is used when omitted.
    pub to: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert an amount from one currency to another.
    Convert(ConvertArgs),

    /// List all available currencies.
    List,

    /// Manage configuration settings.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Set a configuration value.
    Set {
        setting: Setting,

        /// New value; prompts interactively when omitted.
        value: Option<String>,
    },

    /// Show a configuration value.
    Get { setting: Setting },

    /// Show all configuration settings.
    Show,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Setting {
    /// Target currency used when none is given.
    DefaultCurrency,
}

impl Cli {
    /// Parse the process arguments, accepting the root conversion shorthand.
    pub fn parse_args() -> Self {
        Self::parse_from(expand_shorthand(std::env::args_os()))
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let json = self.json;
        let config = Config::load()?;
        tracing::debug!(
            default_currency = ?config.default_currency(),
            "configuration loaded"
        );

        match self.command {
            Some(Command::Convert(args)) => {
                convert(&config, &args.amount, &args.from, args.to.as_deref(), json).await
            }
            Some(Command::List) => list(&config, json).await,
            Some(Command::Config { command }) => run_config(config, command, json).await,
            None if self.list => list(&config, json).await,
            None => bail!(
                "conversion requires at least 2 arguments: <amount> <from> [to]\n\
                 Use `conv --help` for more information"
            ),
        }
    }
}

/// Rewrite `conv [flags] <amount> <from> [to]` into
/// `conv [flags] convert <amount> <from> [to]`.
///
/// Leading flags are skipped; the global ones take no value. The first
/// positional decides: a subcommand name leaves the arguments alone, anything
/// else (including negative amounts) gets `convert` inserted before it.
pub fn expand_shorthand<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args: Vec<OsString> = args.into_iter().map(Into::into).collect();

    let positional = args.iter().enumerate().skip(1).find_map(|(idx, arg)| {
        let arg = arg.to_string_lossy();
        if arg == "--" {
            Some(None)
        } else if is_flag(&arg) {
            None
        } else {
            Some(Some((idx, is_subcommand(&arg))))
        }
    });

    if let Some(Some((idx, false))) = positional {
        args.insert(idx, OsString::from("convert"));
    }
    args
}

fn is_flag(arg: &str) -> bool {
    arg.len() > 1 && arg.starts_with('-') && arg.parse::<f64>().is_err()
}

fn is_subcommand(arg: &str) -> bool {
    arg == "help"
        || Cli::command()
            .get_subcommands()
            .any(|cmd| cmd.get_name() == arg || cmd.get_all_aliases().any(|a| a == arg))
}

async fn convert(
    config: &Config,
    amount: &str,
    from: &str,
    to: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let input = ConversionInput::parse(amount, from, to, config.default_currency())?;
    let (catalog, rates) = services_from_config(config)?;

    let engine = ConversionEngine::new(&catalog, &rates);
    let conversion = engine.quote(&input).await?;

    output::print_conversion(&conversion, json)
}

async fn list(config: &Config, json: bool) -> anyhow::Result<()> {
    let (catalog, _) = services_from_config(config)?;
    output::print_catalog(catalog.list().await, json)
}

async fn run_config(mut config: Config, command: ConfigCommand, json: bool) -> anyhow::Result<()> {
    match command {
        ConfigCommand::Set {
            setting: Setting::DefaultCurrency,
            value,
        } => {
            let (catalog, _) = services_from_config(&config)?;

            let code = match value {
                Some(v) => CurrencyCode::new(&v),
                None => prompt_currency(&catalog).await?,
            };

            if !code.is_valid(&catalog).await {
                bail!("unsupported currency: {code}");
            }

            config.set_default_currency(&code);
            config.save()?;
            output::print_default_currency_saved(&code)?;
        }
        ConfigCommand::Get {
            setting: Setting::DefaultCurrency,
        } => {
            output::print_default_currency(config.default_currency(), json)?;
        }
        ConfigCommand::Show => {
            output::print_config(&config, json)?;
        }
    }

    Ok(())
}

async fn prompt_currency(catalog: &CatalogStore) -> anyhow::Result<CurrencyCode> {
    let options: Vec<String> = catalog
        .list()
        .await
        .iter()
        .map(|(code, name)| output::entry_line(code, name))
        .collect();

    let choice = inquire::Select::new("Default currency:", options)
        .with_page_size(15)
        .prompt()
        .context("Failed to read default currency")?;

    let code = choice.split_whitespace().next().unwrap_or_default();
    Ok(CurrencyCode::new(code))
}
