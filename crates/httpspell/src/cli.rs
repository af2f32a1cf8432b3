use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use tracing_subscriber::EnvFilter;

use httpspell_core::{HunspellBuilder, Mode, WordResult};

use crate::response::ResultPayload;
use crate::server::{serve, AppState};
use crate::{info_1, Config};

#[derive(Debug, PartialEq, Eq, clap::ValueEnum, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[clap(version)]
pub struct Opts {
    #[clap(
        long,
        help = "Path to the configuration file",
        long_help = "Path to the configuration file - defaults to httpspell.toml in the working directory, if present"
    )]
    config: Option<PathBuf>,

    #[clap(long, help = "Directory containing the <lang>.aff and <lang>.dic files")]
    dict_base: Option<PathBuf>,

    #[clap(long, help = "Language to use when requests do not specify one")]
    lang: Option<String>,

    #[clap(subcommand)]
    action: Action,
}

#[derive(Parser)]
enum Action {
    #[clap(about = "Run the HTTP server")]
    Serve(ServeOpts),
    #[clap(about = "Check the given text for spelling errors")]
    Check(TextOpts),
    #[clap(about = "Suggest replacements for every misspelled word in the given text")]
    Suggest(TextOpts),
}

#[derive(Parser)]
struct ServeOpts {
    #[clap(long, help = "Address to listen on")]
    host: Option<String>,

    #[clap(long, help = "Port to listen on")]
    port: Option<u16>,

    #[clap(long, help = "Document root for static files")]
    root: Option<PathBuf>,
}

#[derive(Parser)]
struct TextOpts {
    #[clap(long, value_enum, short = 'o', help = "Output format")]
    output_format: Option<OutputFormat>,

    #[clap(required = true, help = "Text to check")]
    text: Vec<String>,
}

impl Opts {
    fn apply(&self, config: &mut Config) {
        if let Some(dict_base) = &self.dict_base {
            config.dict.base = dict_base.clone();
        }
        if let Some(lang) = &self.lang {
            config.dict.lang = lang.clone();
        }
        if let Action::Serve(serve_opts) = &self.action {
            if let Some(host) = &serve_opts.host {
                config.http.host = host.clone();
            }
            if let Some(port) = serve_opts.port {
                config.http.port = port;
            }
            if let Some(root) = &serve_opts.root {
                config.http.root = root.clone();
            }
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_text(results: &[WordResult]) {
    for result in results {
        if result.correct {
            println!("{} {}", "✓".green(), result.word);
        } else if result.suggestions.is_empty() {
            println!("{} {}", "✗".red(), result.word.bold());
        } else {
            println!(
                "{} {} -> {}",
                "✗".red(),
                result.word.bold(),
                result.suggestions.join(", ")
            );
        }
    }
}

async fn spell(config: Config, opts: &TextOpts, mode: Mode) -> Result<()> {
    let state = AppState::new(HunspellBuilder, config);
    let text = opts.text.join(" ");
    let result = state.spell(None, &text, mode).await?;
    match opts.output_format.unwrap_or_default() {
        OutputFormat::Text => print_text(&result),
        OutputFormat::Json => {
            let payload = ResultPayload { result };
            let json = serde_json::to_string_pretty(&payload)
                .context("Could not serialize result")?;
            println!("{json}");
        }
    }
    Ok(())
}

async fn run(opts: Opts, config: Config) -> Result<()> {
    match &opts.action {
        Action::Serve(_) => {
            info_1!(
                "Serving {} on http://{}",
                config.http.root.display(),
                config.bind_address()
            );
            serve(config).await
        }
        Action::Check(text_opts) => spell(config, text_opts, Mode::Check).await,
        Action::Suggest(text_opts) => spell(config, text_opts, Mode::Suggest).await,
    }
}

pub fn main() -> Result<()> {
    let opts: Opts = Opts::parse();
    init_tracing();

    let mut config = Config::find(opts.config.as_deref())?;
    opts.apply(&mut config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Could not start tokio runtime")?;
    runtime.block_on(run(opts, config))
}
