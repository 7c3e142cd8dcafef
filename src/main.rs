use analysis::{summarize, Annotator, LexiconScorer, TopicClassifier, REPORT_TOP_TOPICS};
use anyhow::Context;
use brandpulse_core::{CoreError, ErrorReporter, PipelineConfig, RedditCredentials};
use clap::{Parser, Subcommand};
use reddit_client::{RedditClient, RedditClientConfig};
use std::path::PathBuf;
use storage::ProjectLayout;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str =
    "brandpulse=info,reddit_client=info,analysis=info,storage=info,report=info";

#[derive(Parser)]
#[command(name = "brandpulse")]
#[command(about = "Collect brand mentions from Reddit and report on customer sentiment")]
#[command(version)]
struct Cli {
    /// Pipeline configuration file (TOML); built-in defaults when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Project directory holding data/ and outputs/
    #[arg(long, global = true, default_value = ".")]
    base_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone, Copy, PartialEq, Eq)]
enum Commands {
    /// Create the data/ and outputs/ directories
    Init,
    /// Search Reddit and write the raw table
    Collect,
    /// Annotate the raw table and write the processed table
    Process,
    /// Render the topic and sentiment charts
    Charts,
    /// Write the Markdown report and JSON summary
    Report,
    /// Every stage in order
    Run,
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Init => "init",
            Commands::Collect => "collect",
            Commands::Process => "process",
            Commands::Charts => "charts",
            Commands::Report => "report",
            Commands::Run => "run",
        }
    }
}

struct Pipeline {
    config: PipelineConfig,
    layout: ProjectLayout,
}

impl Pipeline {
    fn init(&self) -> Result<(), CoreError> {
        self.layout.ensure()?;
        info!("Project directories ready under {}", self.layout.base().display());
        Ok(())
    }

    async fn collect(&self) -> Result<(), CoreError> {
        self.layout.ensure()?;

        let credentials = RedditCredentials::from_env()?;
        let client_config = RedditClientConfig::new(credentials, self.config.user_agent.clone())?;
        let client = RedditClient::new(client_config)?;
        client.authenticate().await?;

        info!(
            "Collecting posts for {} keywords across {} subreddits",
            self.config.keywords.len(),
            self.config.source_groups.len()
        );
        let records = analysis::collect(&client, &self.config).await?;
        client.log_api_metrics().await;

        storage::write_raw_table(&self.layout.raw_table_path(), &records)?;
        Ok(())
    }

    fn process(&self) -> Result<(), CoreError> {
        self.layout.ensure()?;

        let posts = storage::read_raw_table(&self.layout.raw_table_path())?;
        let annotator = Annotator::new(
            LexiconScorer::new(),
            TopicClassifier::new(self.config.topic_rules.clone()),
        );
        let records = annotator.annotate_all(posts);

        storage::write_processed_table(&self.layout.processed_table_path(), &records)?;
        Ok(())
    }

    fn charts(&self) -> Result<(), CoreError> {
        self.layout.ensure()?;

        let records = storage::read_processed_table(&self.layout.processed_table_path())?;
        let summary = summarize(&records);
        report::write_charts(&self.layout.charts_dir(), &summary, &records)?;
        Ok(())
    }

    fn report(&self) -> Result<(), CoreError> {
        self.layout.ensure()?;

        let records = storage::read_processed_table(&self.layout.processed_table_path())?;
        let summary = summarize(&records);
        let path = report::write_report(
            &self.layout.reports_dir(),
            &self.layout.charts_dir(),
            &self.config.brand,
            REPORT_TOP_TOPICS,
            &summary,
            &records,
        )?;

        info!(
            "{} posts, average sentiment {}, {} questions",
            summary.total,
            report::format_mean(summary.mean_sentiment),
            summary.questions
        );
        info!("Report available at {}", path.display());
        Ok(())
    }

    async fn execute(&self, command: Commands) -> Result<(), CoreError> {
        match command {
            Commands::Init => self.init(),
            Commands::Collect => self.collect().await,
            Commands::Process => self.process(),
            Commands::Charts => self.charts(),
            Commands::Report => self.report(),
            Commands::Run => {
                self.init()?;
                self.collect().await?;
                self.process()?;
                self.charts()?;
                self.report()
            }
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<PipelineConfig, CoreError> {
    match path {
        Some(path) => Ok(PipelineConfig::load(path)?),
        None => Ok(PipelineConfig::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let reporter = ErrorReporter::new();

    let config = load_config(cli.config.as_ref())
        .inspect_err(|e| reporter.report_error(e))
        .context("failed to load pipeline configuration")?;

    info!("Starting brandpulse {} for {}", cli.command.name(), config.brand);
    let pipeline = Pipeline {
        config,
        layout: ProjectLayout::new(cli.base_dir),
    };

    pipeline
        .execute(cli.command)
        .await
        .inspect_err(|e| reporter.report_error(e))
        .with_context(|| format!("{} stage failed", cli.command.name()))?;

    info!("Finished {}", cli.command.name());
    Ok(())
}
