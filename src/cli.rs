use ccingest::window::parse_date;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use time::Date;

#[derive(Parser, Debug)]
#[command(name = "ccingest")]
#[command(about = "Collect openly licensed media records from content providers", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to $CCINGEST_CONFIG or config/ccingest.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Walk the Thingiverse listing for one day
    Thingiverse(ThingiverseArgs),
    /// Extract records from McCord Museum collection pages
    Mccord(McCordArgs),
    /// List registered providers
    Providers,
}

#[derive(clap::Args, Debug)]
pub struct ThingiverseArgs {
    /// Day to collect, YYYY-MM-DD in UTC (defaults to two days ago)
    #[arg(long, value_parser = parse_date)]
    pub date: Option<Date>,
}

#[derive(clap::Args, Debug)]
pub struct McCordArgs {
    /// Collection page URLs
    #[arg(required = true)]
    pub urls: Vec<String>,
}
