pub mod api;
pub mod cli;
pub mod config;
pub mod database;
pub mod errors;
pub mod index;
pub mod services;
pub mod store;
pub mod table;
pub mod transform;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

use crate::config::AppConfig;
use crate::services::recommendation::RecommendationService;
use crate::services::server::ServerService;
use crate::services::training::TrainingService;

pub fn interpret() -> Cli {
    Cli::parse()
}

pub fn handle_train(config: AppConfig) -> Result<()> {
    let service = TrainingService::new(config)?;
    let outcome = service.run()?;

    let summary = &outcome.summary.transform;
    println!(
        "Trained {} index over {} titles x {} users ({} of {} ratings kept)",
        outcome.summary.metric.as_str(),
        summary.matrix_rows,
        summary.matrix_cols,
        summary.merged_rows,
        summary.raw_ratings
    );
    Ok(())
}

pub fn handle_recommend(config: AppConfig, title: &str, k: Option<usize>) -> Result<()> {
    let k = k.unwrap_or(config.model.k_default);
    let service = RecommendationService::load(&config)?;
    let neighbors = service.recommend(title, k)?;

    println!("Books similar to '{}':", title);
    for (rank, neighbor) in neighbors.iter().enumerate() {
        println!("{:>3}. {} ({:.4})", rank + 1, neighbor.title, neighbor.distance);
    }
    Ok(())
}

pub fn handle_titles(config: AppConfig) -> Result<()> {
    let service = RecommendationService::load(&config)?;
    for title in service.titles()? {
        println!("{}", title);
    }
    Ok(())
}

pub fn handle_serve(config: AppConfig, port: u16) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let service = ServerService::new(port, config);
        service.run().await
    })
}
