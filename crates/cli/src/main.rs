mod cli;
mod summary;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use geocat_catalog::{LiveCatalog, LiveGeoServer};
use geocat_core::config::{load_dotenv, LoaderConfig};
use geocat_core::YamlCodec;
use geocat_loader::{DescriptorServiceLoader, Extensions, GeoServerLoader};
use tracing::info;

use crate::cli::CliArgs;

fn main() -> Result<()> {
    load_dotenv();
    let args = CliArgs::parse();

    let mut config = LoaderConfig::from_env();
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if args.legacy {
        config.legacy = true;
    }
    if args.no_probe {
        config.probe_stores = false;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    config.log_summary();

    let extensions = args.services.iter().fold(Extensions::new(), |ext, service_type| {
        ext.with_service_loader(Arc::new(DescriptorServiceLoader::new(
            service_type.to_uppercase(),
            YamlCodec,
        )))
    });
    let loader = GeoServerLoader::from_config(&config).with_extensions(extensions);

    let catalog = LiveCatalog::default();
    let geoserver = LiveGeoServer::default();
    let mut report = loader
        .load(&catalog, &geoserver)
        .with_context(|| format!("failed to load {}", config.data_dir.display()))?;
    if args.reload {
        info!("reloading");
        report = loader
            .reload(&catalog, &geoserver)
            .with_context(|| format!("failed to reload {}", config.data_dir.display()))?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        summary::print(&report, &catalog.read());
    }
    Ok(())
}
