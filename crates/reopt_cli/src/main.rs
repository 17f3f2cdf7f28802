use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use reopt_client::{ReoptClient, ServiceConfig};
use reopt_core::prelude::*;
use reopt_fs::FileSystemStore;
use reopt_runner::{JobRunner, RunOptions, StoreHook};
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "reopt", about = "Submit and track REopt optimization jobs", version)]
struct Cli {
    /// Directory for submitted requests, results and auxiliary documents
    #[arg(long, env = "REOPT_DATA_DIR", default_value = "./reopt_data", global = true)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ServiceArgs {
    #[arg(long, env = "REOPT_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, env = "REOPT_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Seconds to wait between status polls
    #[arg(long, default_value_t = polling::DEFAULT_INTERVAL.as_secs())]
    poll_interval_secs: u64,

    /// Status polls before giving up (the job keeps running and can be resumed)
    #[arg(long, default_value_t = polling::DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u32,
}

impl ServiceArgs {
    fn client(&self) -> Result<ReoptClient> {
        let config = ServiceConfig::new(&self.base_url, self.api_key.clone())
            .with_context(|| format!("Invalid base url `{}`", self.base_url))?;
        Ok(ReoptClient::new(config))
    }

    /// A runner whose stored results are tagged with the service they came from.
    fn runner(
        &self,
        store: FileSystemStore,
    ) -> Result<JobRunner<ReoptClient, StoreHook<FileSystemStore>>> {
        let client = self.client()?;
        let hook = StoreHook::new(store).for_service(client.config().base_url());
        Ok(JobRunner::new(client).with_hook(hook))
    }

    fn options(&self) -> RunOptions {
        RunOptions::default()
            .with_poll_interval(Duration::from_secs(self.poll_interval_secs))
            .with_max_attempts(self.max_attempts)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a job document and wait for the result
    Submit {
        /// Path to the job document (JSON)
        request: PathBuf,

        #[command(flatten)]
        service: ServiceArgs,
    },
    /// Continue polling a submitted job without submitting it again
    Resume {
        run_uuid: String,

        /// Poll the service even if a result is already stored
        #[arg(long)]
        refresh: bool,

        #[command(flatten)]
        service: ServiceArgs,
    },
    /// Print the summary of a stored result
    Summary {
        run_uuid: String,

        /// Print the whole stored result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Store an auxiliary document, e.g. a load profile or a rate definition
    Store {
        /// request, output, load_profile or rate_definition
        category: Category,
        name: String,
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = FileSystemStore::new(&cli.data_dir);
    store.init().await.context("Failed to prepare data directory")?;

    match cli.command {
        Commands::Submit { request, service } => {
            let file = File::open(&request)
                .with_context(|| format!("Failed to open {}", request.display()))?;
            let request = JobRequest::from_reader(file)
                .with_context(|| format!("{} is not valid JSON", request.display()))?;

            let runner = service.runner(store)?;
            let result = runner.run(&request, &service.options()).await;
            report(result)
        }
        Commands::Resume {
            run_uuid,
            refresh,
            service,
        } => {
            let handle = JobHandle::new(run_uuid);
            let runner = service.runner(store)?;
            if !refresh {
                if let Some(result) = runner.hook().cached(&handle).await? {
                    info!(%handle, "Using stored result");
                    return report(Ok(result));
                }
            }

            let result = runner.resume(&handle, &service.options()).await;
            report(result)
        }
        Commands::Summary { run_uuid, json } => {
            if !store.exists(Category::Output, &run_uuid).await? {
                bail!("No stored result for {run_uuid}, try `reopt resume {run_uuid}`");
            }
            let result: JobResult = store.load_as(Category::Output, &run_uuid).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }
            report(Ok(result))
        }
        Commands::Store {
            category,
            name,
            file,
        } => {
            let document: serde_json::Value = serde_json::from_reader(
                File::open(&file).with_context(|| format!("Failed to open {}", file.display()))?,
            )
            .with_context(|| format!("{} is not valid JSON", file.display()))?;

            store.save(category, &name, &document).await?;
            println!("Stored {category}/{name}");
            Ok(())
        }
    }
}

fn report(result: Result<JobResult, JobError>) -> Result<()> {
    let result = match result {
        Ok(result) => result,
        Err(JobError::PollingTimeout { handle, attempts }) => {
            bail!(
                "Job {handle} is still running after {attempts} polls, continue with `reopt resume {handle}`"
            );
        }
        Err(e) => return Err(e.into()),
    };

    match &result.outcome {
        JobOutcome::Completed(output) => {
            println!("Job {} finished: {}", result.handle, output.status);
            if let Some(warnings) = &output.messages.warnings {
                println!("warnings: {warnings}");
            }
            let summary = summarize(&result);
            if summary.is_empty() {
                println!("(no summary figures in outputs)");
            } else {
                print!("{summary}");
            }
            Ok(())
        }
        JobOutcome::Failed(detail) => bail!("Job {} failed: {detail}", result.handle),
    }
}
