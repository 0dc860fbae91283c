//! esql-reports - charts for Typst reports from Elasticsearch ES|QL queries.

use esql_reports::cli::Cli;
use esql_reports::config::Config;
use esql_reports::error::Result;
use esql_reports::esql::{ClientConfig, EsqlClient};
use esql_reports::logging;
use esql_reports::render::ProcessRenderer;
use esql_reports::report::ReportRunner;
use esql_reports::typst::Compiler;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    // Before parsing, so ES_URL from a .env file is visible to clap.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();
    logging::init_stderr_logging(cli.debug);

    if cli.has_no_files() {
        Cli::print_help();
        std::process::exit(1);
    }

    if let Err(e) = run(cli).await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config_path();
    debug!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let url = config.resolve_es_url(cli.es.as_deref());

    let client = EsqlClient::new(ClientConfig::default().with_timeout(config.timeout_secs))?;
    // Fail on bad credentials before touching any document.
    let target = client.resolver().resolve(&url)?;
    info!("Querying {}", target.request_target());

    let renderer = ProcessRenderer::new(&config.renderer.command, config.renderer.args.clone());
    let compiler = if cli.no_compile {
        None
    } else {
        Some(Compiler::new(
            &config.compiler.command,
            config.compiler.args.clone(),
        ))
    };

    let runner = ReportRunner::new(Box::new(client), Box::new(renderer), url)
        .with_compiler(compiler);

    runner.run(&cli.files).await
}
