use anyhow::{Context, Result};
use clap::Parser;
use hours_annotator::cli::{AnnotateArgs, Cli, Command, RatesCommand, SettingsCommand};
use hours_annotator::{AnnotatorOptions, HoursApp, SnapshotDom};
use hours_common::Config;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    info!("Using storage at {}", config.storage_dir().display());

    let app = HoursApp::from_config(config)?;

    match cli.command {
        Command::Init => {
            let settings = app.install().await?;
            println!(
                "Hourly wage: {} {}",
                settings.hourly_wage, settings.currency
            );
        }
        Command::Settings(SettingsCommand::Show) => {
            let settings = app.settings().load().await;
            println!("Hourly wage: {}", settings.hourly_wage);
            println!("Currency: {}", settings.currency);
        }
        Command::Settings(SettingsCommand::Set { wage, currency }) => {
            let settings = app.settings().save_raw(&wage, &currency).await?;
            println!(
                "Hourly wage saved! ({} {})",
                settings.hourly_wage, settings.currency
            );
        }
        Command::Rates(RatesCommand::Show) => {
            let status = app.rate_status().await;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::Rates(RatesCommand::Refresh) => {
            if !app.converter().refresh().await {
                anyhow::bail!("Exchange rate refresh failed; the cache was left unchanged");
            }
            let status = app.rate_status().await;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::Convert { amount, currency } => {
            let converted = app
                .converter()
                .try_convert_from_base(amount, &currency)
                .await?;
            println!(
                "{:.2} {} = {:.2} {}",
                amount,
                app.converter().base_currency(),
                converted,
                currency.to_ascii_uppercase()
            );
        }
        Command::Annotate(args) => annotate(&app, args).await?,
    }

    Ok(())
}

async fn annotate(app: &HoursApp, args: AnnotateArgs) -> Result<()> {
    let raw = if args.snapshot.as_os_str() == "-" {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("Failed to read snapshot from stdin")?;
        buf
    } else {
        tokio::fs::read_to_string(&args.snapshot)
            .await
            .with_context(|| format!("Failed to read snapshot {}", args.snapshot.display()))?
    };

    let mut dom = SnapshotDom::from_json(&raw).context("Snapshot is not valid JSON")?;
    let options = AnnotatorOptions {
        skip_unconverted: args.strict,
    };
    let report = app.annotate_page(&mut dom, options).await;

    if report.wage_unconverted {
        warn!(
            "No rate for {}; hours are computed against the unconverted wage",
            report.settings.currency
        );
    }
    info!(
        "Wage {} {} = {:.2} {} per hour",
        report.settings.hourly_wage,
        report.settings.currency,
        report.normalized_wage,
        app.config().base_currency
    );
    println!("{}", dom.to_json_pretty()?);
    Ok(())
}
