use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;

use crub_web::agenda::AgendaService;
use crub_web::cms::CmsClient;
use crub_web::config::SiteConfig;
use crub_web::site::{AppState, DevProxy, PROXY_PREFIX, router};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct AppArgs {
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    /// Static assets directory, served under `/static` if it exists.
    #[arg(long, default_value = "public")]
    static_dir: PathBuf,

    /// Route CMS calls through the local proxy so the token stays server-side.
    #[arg(long)]
    dev: bool,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    crub_web::logging::init()?;

    let args = AppArgs::parse();
    tracing::info!(?args, "starting crub-web-app");

    let dir = std::env::current_dir().context("current dir")?;
    let config = SiteConfig::load(&dir);
    let dev = args.dev || config.dev;

    let state = if dev {
        let proxy = DevProxy::from_config(&config)
            .context("dev mode needs STRAPI_API_URL or VITE_STRAPI_API_URL")?;
        let cms = CmsClient::proxied(&format!("http://{}{PROXY_PREFIX}", args.addr))
            .with_files_base(config.files_base());
        tracing::info!("cms calls go through {PROXY_PREFIX}");
        AppState::new(cms, AgendaService::new()).with_proxy(proxy)
    } else {
        AppState::new(CmsClient::from_config(&config), AgendaService::new())
    };

    let static_dir = args.static_dir.is_dir().then_some(args.static_dir.clone());
    if static_dir.is_none() {
        tracing::warn!(
            dir = %args.static_dir.display(),
            "static dir not found; serving pages only"
        );
    }
    let app = router(state, static_dir);

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .map_err(|err| anyhow::anyhow!("bind {}: {err}", args.addr))?;
    tracing::info!(addr = %args.addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %err, "cannot listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}
