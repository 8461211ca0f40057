mod app;
mod catalog;
mod cli;
mod commands;
mod configuration;
mod context;
mod ledger;
mod ranking;
mod rest;
mod storage;
mod tracing;
mod types;

#[cfg(test)]
mod integration_tests;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::run().await
}
