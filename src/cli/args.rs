use clap::Parser;
use std::env;

use crate::cli::command::Command;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Shoe voting service: like/favorite ledger, ranked gallery, admin catalog tools",
    long_about = "Serves a REST API over a SQLite-backed vote ledger: voters like any number of catalog items and favorite exactly one; admins manage the catalog and read ranked results.",
    subcommand_required = false,
    arg_required_else_help = false
)]
pub struct Cli {
    #[arg(
        long,
        default_value = ".shoevote/",
        value_name = "DIR",
        help = "Directory to store persistent data"
    )]
    pub data_dir: String,

    #[arg(
        long = "api-listen",
        env = "SHOEVOTE_API_LISTEN",
        value_name = "ADDR",
        default_value = "127.0.0.1:8085",
        help = "REST API listen address (host:port)"
    )]
    pub api_listen: std::net::SocketAddr,

    #[arg(
        long = "admin-secret",
        env = "SHOEVOTE_ADMIN_SECRET",
        value_name = "SECRET",
        help = "Shared secret required on admin endpoints (daemon mode only)"
    )]
    pub admin_secret: Option<String>,

    #[arg(
        long = "page-size",
        env = "SHOEVOTE_PAGE_SIZE",
        default_value_t = 12usize,
        value_name = "N",
        help = "Items per gallery page"
    )]
    pub page_size: usize,

    #[arg(
        long,
        default_value_t = false,
        help = "Reset all persisted state (delete the SQLite database) before starting"
    )]
    pub reset: bool,

    #[arg(
        long = "log-file",
        env = "SHOEVOTE_LOG_FILE",
        value_name = "PATH",
        help = "Write logs to PATH (in addition to stderr)"
    )]
    pub log_file: Option<String>,

    #[command(subcommand)]
    pub cmd: Option<Command>,
}

pub fn parse() -> Cli {
    let dotenv_path = env::var("DOTENV_PATH").unwrap_or(".env".into());
    dotenvy::from_filename(&dotenv_path).ok();

    Cli::parse()
}
