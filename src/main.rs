use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

use crub_web::agenda::{AgendaService, ListOptions};
use crub_web::cli::{AgendaArgs, Command, ResolveArgs};
use crub_web::cms::CmsClient;
use crub_web::cms::items::{default_item_endpoints, resolve_item_by_slug};
use crub_web::config::SiteConfig;

#[tokio::main]
async fn main() -> ExitCode {
    match try_main().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn try_main() -> anyhow::Result<ExitCode> {
    crub_web::logging::init().context("init logging")?;

    let cli = crub_web::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        Command::Fetch(args) => {
            if let Err(err) = crub_web::fetch::run(args).await {
                eprintln!("{err}");
                return Ok(ExitCode::from(err.exit_code()));
            }
        }
        Command::Resolve(args) => resolve(args).await.context("resolve")?,
        Command::Agenda(args) => agenda(args).await.context("agenda")?,
    }

    Ok(ExitCode::SUCCESS)
}

async fn resolve(args: ResolveArgs) -> anyhow::Result<()> {
    let dir = std::env::current_dir().context("current dir")?;
    let config = SiteConfig::load(&dir);
    let client = CmsClient::from_config(&config);

    let endpoints: Vec<&str> = if args.endpoints.is_empty() {
        default_item_endpoints()
    } else {
        args.endpoints.iter().map(String::as_str).collect()
    };
    let item = resolve_item_by_slug(&client, &args.slug, &endpoints)
        .await
        .with_context(|| format!("Página no encontrada: {}", args.slug))?;
    println!("{}", serde_json::to_string_pretty(&item)?);
    Ok(())
}

async fn agenda(args: AgendaArgs) -> anyhow::Result<()> {
    let service = AgendaService::new();
    let now = chrono::Utc::now();
    let options = ListOptions {
        from: args.days.map(|_| now),
        to: args.days.map(|days| now + chrono::TimeDelta::days(days)),
        page: args.page,
        page_size: args.page_size,
    };
    let page = service.list(options).await;
    println!("{}", serde_json::to_string_pretty(&page)?);
    Ok(())
}
