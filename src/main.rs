use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use campus_directory::config::AppConfig;
use campus_directory::core::directory::{CardRenderer, DirectoryLexicon, Resolver, ResolverChain};
use campus_directory::database::Database;

/// Parsed command line.
#[derive(Debug, Default)]
struct CliArgs {
    import: Option<PathBuf>,
    listing: bool,
    query: Vec<String>,
}

fn parse_args() -> Result<CliArgs, String> {
    let mut args = CliArgs::default();
    let mut iter = std::env::args().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--import" => {
                let path = iter.next().ok_or("--import needs a JSON file path")?;
                args.import = Some(PathBuf::from(path));
            }
            "--all" => args.listing = true,
            "--help" | "-h" => {
                return Err(format!(
                    "{} v{}\n\n\
                     Usage: campus-directory [--import <file.json>] [--all] [query...]\n\n\
                     Without a query, each line read from stdin is answered.",
                    campus_directory::NAME,
                    campus_directory::VERSION
                ));
            }
            _ => args.query.push(arg),
        }
    }

    Ok(args)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            std::process::exit(2);
        }
    };

    let config = AppConfig::load();
    let _log_guard = campus_directory::core::logging::init(&config.log_dir());
    log::info!("Campus Directory v{} starting", campus_directory::VERSION);

    let db = Database::new(&config.data_dir(), &config.data.database_file).await?;
    if let Some(seed) = &args.import {
        let summary = db.import_json(seed).await?;
        eprintln!("Imported {} rooms and {} laboratories", summary.rooms, summary.labs);
    }

    let lexicon = Arc::new(DirectoryLexicon::from_config(&config.resolver)?);
    let chain = ResolverChain::new(Resolver::new(db, lexicon));
    let renderer = CardRenderer::new(config.assets.clone());
    let budget = if args.listing {
        config.resolver.listing_budget
    } else {
        config.resolver.chat_budget
    };

    let mut stdout = io::stdout().lock();

    if !args.query.is_empty() {
        let query = args.query.join(" ");
        let reply = answer(&chain, &renderer, &query, budget).await;
        writeln!(stdout, "{}", serde_json::to_string(&reply)?)?;
        return Ok(());
    }

    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let reply = answer(&chain, &renderer, &line, budget).await;
        writeln!(stdout, "{}", serde_json::to_string(&reply)?)?;
        stdout.flush()?;
    }

    Ok(())
}

async fn answer(
    chain: &ResolverChain<Database>,
    renderer: &CardRenderer,
    query: &str,
    budget: usize,
) -> campus_directory::core::directory::ChatReply {
    match chain.resolve_all(query, budget).await {
        Ok(matches) => renderer.reply(query, &matches),
        Err(e) => {
            log::error!("Directory lookup failed for {query:?}: {e}");
            renderer.failure_reply(query)
        }
    }
}
