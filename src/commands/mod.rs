use crate::cli::Command;
use crate::context;

pub mod catalog;
pub mod stats;

pub trait CommandRunner {
    fn run(&self, ctx: &context::Context) -> anyhow::Result<()>;
}

impl Command {
    pub fn run(&self, ctx: &context::Context) -> anyhow::Result<()> {
        match self {
            Command::Catalog { cmd } => cmd.run(ctx),
            Command::Stats { limit } => stats::print_leaderboard(ctx, *limit),
        }
    }
}
