use std::path::{Path, PathBuf};

use crate::configuration::Configuration;

pub struct Context {
    pub config: Configuration,
}

impl Context {
    pub fn from_cli(cli: &crate::cli::Cli) -> Self {
        let cfg = Configuration {
            data_dir: cli.data_dir.clone(),
            api_listen: cli.api_listen,
            admin_secret: cli.admin_secret.clone(),
            page_size: cli.page_size,
            log_file: cli.log_file.clone(),
            reset: cli.reset,
        };
        Self { config: cfg }
    }

    pub fn db_path(&self) -> PathBuf {
        Path::new(&self.config.data_dir).join("shoevote.db")
    }
}
