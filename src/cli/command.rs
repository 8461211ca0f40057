use clap::Subcommand;

use crate::cli::catalog_cmd::CatalogCmd;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    #[command(
        about = "Catalog management commands",
        long_about = "Bulk-add image references, list the catalog, delete a single item (cascading its votes), or wipe everything."
    )]
    Catalog {
        #[command(subcommand)]
        cmd: CatalogCmd,
    },
    #[command(about = "Print the current leaderboard")]
    Stats {
        #[arg(
            short = 'n',
            long,
            default_value_t = 10usize,
            value_name = "N",
            help = "Number of items to print"
        )]
        limit: usize,
    },
}
