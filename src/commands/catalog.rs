use anyhow::Result;

use crate::catalog::Catalog;
use crate::cli::CatalogCmd;
use crate::commands::CommandRunner;
use crate::context::Context;
use crate::storage::SqliteStorage;

impl CommandRunner for CatalogCmd {
    fn run(&self, ctx: &Context) -> Result<()> {
        let storage = SqliteStorage::new(ctx.db_path());
        storage.init()?;
        let catalog = Catalog::new(storage);

        match self {
            CatalogCmd::Add { references } => {
                let ids = catalog.add_references(references)?;
                for (reference, id) in references.iter().zip(&ids) {
                    println!("{id}\t{reference}");
                }
                log::info!("Added {} catalog items", ids.len());
            }
            CatalogCmd::List => {
                let items = catalog.list_items()?;
                if items.is_empty() {
                    println!("catalog is empty");
                }
                for item in items {
                    println!("{}\t{}", item.id, item.reference);
                }
            }
            CatalogCmd::Remove { id } => {
                if catalog.remove_item(*id)? {
                    println!("removed item {id} and its votes");
                } else {
                    anyhow::bail!("no item with id {id}");
                }
            }
            CatalogCmd::Wipe => {
                catalog.wipe()?;
                println!("catalog and votes wiped");
            }
        }
        Ok(())
    }
}
