use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use benthos_catalog::{ApiFlavor, CatalogClient, Credentials, HttpTransport};
use benthos_core::{validate_campaign, UploadConfig, UploadPipeline, ValidationReport};

/// Validate benthic survey campaign packages and upload them to a catalog
/// server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a campaign package without touching the network.
    Validate {
        /// Campaign root directory (contains campaign.txt).
        root: PathBuf,
    },
    /// Validate and upload a whole campaign package.
    UploadCampaign {
        root: PathBuf,
        #[command(flatten)]
        server: ServerArgs,
        /// Stop after validation, upload nothing.
        #[arg(long)]
        validate_only: bool,
    },
    /// Upload a single deployment directory into an existing campaign.
    UploadDeployment {
        dir: PathBuf,
        /// Resource URI of the campaign on the server.
        #[arg(long)]
        campaign_uri: String,
        #[command(flatten)]
        server: ServerArgs,
    },
}

#[derive(Args, Debug)]
struct ServerArgs {
    /// Catalog server root, e.g. http://catalog.example.org
    #[arg(long)]
    server: Option<String>,
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    api_key: Option<String>,
    /// Resource path family: standard or generic.
    #[arg(long, default_value = "standard")]
    api_flavor: String,
    /// Width of the image upload worker pool.
    #[arg(long, default_value_t = 10)]
    concurrency: usize,
}

impl ServerArgs {
    fn pipeline(&self) -> Result<UploadPipeline> {
        let server = resolve(self.server.clone(), "BENTHOS_SERVER", "--server")?;
        let username = resolve(self.username.clone(), "BENTHOS_USERNAME", "--username")?;
        let api_key = resolve(self.api_key.clone(), "BENTHOS_API_KEY", "--api-key")?;
        let flavor = ApiFlavor::try_from(self.api_flavor.as_str())
            .map_err(|err| anyhow::anyhow!(err))?;

        let transport = HttpTransport::new(server)?;
        let client = CatalogClient::new(Arc::new(transport), Credentials { username, api_key }, flavor);
        Ok(UploadPipeline::new(
            client,
            UploadConfig {
                concurrency: self.concurrency,
                ..Default::default()
            },
        ))
    }
}

fn resolve(flag: Option<String>, env_var: &str, flag_name: &str) -> Result<String> {
    flag.or_else(|| std::env::var(env_var).ok())
        .with_context(|| format!("{flag_name} (or {env_var}) must be set"))
}

fn report_findings(report: &ValidationReport) -> Result<()> {
    for finding in &report.findings {
        println!("{finding}");
    }
    if !report.is_complete() {
        bail!(
            "validation failed with {} error(s); fix them and try again",
            report.error_count()
        );
    }
    println!("SUCCESS: all checks passed, package is ready to upload");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Validate { root } => {
            report_findings(&validate_campaign(&root))?;
        }
        Command::UploadCampaign {
            root,
            server,
            validate_only,
        } => {
            report_findings(&validate_campaign(&root))?;
            if validate_only {
                return Ok(());
            }
            let pipeline = server.pipeline()?;
            let campaign_uri = pipeline.upload_campaign(&root).await?;
            info!(%campaign_uri, "campaign upload finished");
            println!("SUCCESS: campaign uploaded as {campaign_uri}");
        }
        Command::UploadDeployment {
            dir,
            campaign_uri,
            server,
        } => {
            let mut report = ValidationReport::default();
            benthos_core::validate_deployment(&dir, &mut report);
            report_findings(&report)?;
            let pipeline = server.pipeline()?;
            pipeline.upload_deployment(&dir, &campaign_uri).await?;
            println!("SUCCESS: deployment uploaded into {campaign_uri}");
        }
    }

    Ok(())
}
