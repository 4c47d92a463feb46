use clap::{Args, Parser, Subcommand};

use crate::config::FetchProfile;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// GET one CMS endpoint and print the JSON response.
    Fetch(FetchArgs),
    /// Find the page for a slug across the audience collections.
    Resolve(ResolveArgs),
    /// List agenda activities.
    Agenda(AgendaArgs),
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Which CMS configuration to use.
    #[arg(long, value_enum, default_value_t = FetchProfile::Strapi)]
    pub profile: FetchProfile,

    /// Endpoint path, e.g. `/novedades?populate=*`. Defaults per profile.
    pub path: Option<String>,
}

#[derive(Debug, Args)]
pub struct ResolveArgs {
    pub slug: String,

    /// Collection endpoint to search, in order. Repeatable; defaults to the
    /// four audience collections.
    #[arg(long = "endpoint")]
    pub endpoints: Vec<String>,
}

#[derive(Debug, Args)]
pub struct AgendaArgs {
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    #[arg(long, default_value_t = crate::agenda::DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    /// Only activities between now and this many days ahead.
    #[arg(long)]
    pub days: Option<i64>,
}
