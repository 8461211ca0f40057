use clap::Subcommand;

#[derive(Subcommand, Debug, Clone)]
pub enum CatalogCmd {
    #[command(about = "Add image references (filenames or http(s) URLs) to the catalog")]
    Add {
        #[arg(value_name = "REF", required = true)]
        references: Vec<String>,
    },
    #[command(about = "List catalog items")]
    List,
    #[command(about = "Delete one item and all votes referencing it")]
    Remove {
        #[arg(value_name = "ID")]
        id: i64,
    },
    #[command(about = "Delete every item and every vote")]
    Wipe,
}
