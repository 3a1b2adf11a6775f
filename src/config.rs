use std::env;

use anyhow::{Context, Result};

use crate::filter::paginator::PageSize;
use crate::repository::sample::DEFAULT_SAMPLE_ROWS;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub service_name: String,
    pub version: String,
    pub sample_rows: usize,
    pub sample_seed: Option<u64>,
    pub default_page_size: PageSize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let service_name = env::var("SERVICE_NAME").unwrap_or_else(|_| "query-insights".into());
        let version = env::var("SERVICE_VERSION").unwrap_or_else(|_| env!("CARGO_PKG_VERSION").into());

        let sample_rows: usize = env::var("SAMPLE_ROWS")
            .unwrap_or_else(|_| DEFAULT_SAMPLE_ROWS.to_string())
            .parse()
            .context("invalid SAMPLE_ROWS")?;

        let sample_seed = env::var("SAMPLE_SEED")
            .ok()
            .map(|raw| raw.parse::<u64>())
            .transpose()
            .context("invalid SAMPLE_SEED")?;

        let page_size: usize = env::var("DEFAULT_PAGE_SIZE")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("invalid DEFAULT_PAGE_SIZE")?;
        let default_page_size =
            PageSize::try_from(page_size).context("invalid DEFAULT_PAGE_SIZE")?;

        Ok(Self {
            service_name,
            version,
            sample_rows,
            sample_seed,
            default_page_size,
        })
    }
}
