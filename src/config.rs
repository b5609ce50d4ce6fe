use std::net::SocketAddr;

use anyhow::Context;

use crate::{pipeline::PipelineConfig, query::QueryConfig};

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub page_size: u64,
    pub build_batch_size: u64,
    pub max_concurrent_writes: usize,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "5000".to_string()).parse().context("PORT")?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://cinedex.db?mode=rwc".to_string());

        let page_size: u64 = std::env::var("PAGE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(24);

        let build_batch_size: u64 = std::env::var("BUILD_BATCH_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(1000);

        let max_concurrent_writes: usize =
            std::env::var("MAX_CONCURRENT_WRITES").ok().and_then(|s| s.parse().ok()).unwrap_or(4);

        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            page_size,
            build_batch_size,
            max_concurrent_writes,
            cors_origins,
        })
    }

    pub fn query(&self) -> QueryConfig {
        QueryConfig { page_size: self.page_size }
    }

    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            batch_size: self.build_batch_size,
            max_concurrent_writes: self.max_concurrent_writes,
        }
    }
}
