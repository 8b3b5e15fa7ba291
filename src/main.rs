//! finseek - client-side fuzzy search for the finance blog
//!
//! Builds an in-memory index from the bundled direct-link table and the
//! articles served by the blog backend, ranks documents with weighted bitap
//! matching, and resolves submitted queries into routes.

use anyhow::Result;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod config;
mod error;
mod indexer;
mod output;
mod presenter;
mod ranker;
mod session;

use cli::{Cli, Commands};
use config::Config;
use indexer::{load_index, ArticleSource, FileArticleSource};
use output::ResultPrinter;
use presenter::{resolve_query, SearchWidget, WidgetEvent, WidgetView};
use ranker::FuzzyRanker;
use session::SearchSession;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let config = Config::load(&config_path)?;

    match cli.command {
        Commands::Search { query, articles, json } => {
            tracing::info!("Searching for: {}", query);

            let mut session = open_session(&config, articles.as_deref()).await?;
            session.set_query(query);

            ResultPrinter::new(json).print_results(session.results())?;
        }
        Commands::Go { query, articles, json } => {
            let catalog = config.catalog()?;
            let mut session = open_session(&config, articles.as_deref()).await?;
            session.set_query(query.as_str());

            match resolve_query(
                &query,
                &catalog.direct_links,
                session.results(),
                config.confident_cutoff,
            ) {
                Some(nav) => ResultPrinter::new(json).print_navigation(&nav)?,
                None => println!("Nothing to search for."),
            }
        }
        Commands::Index { articles, json } => {
            let catalog = config.catalog()?;
            let source = article_source(&config, articles.as_deref())?;
            let (index, stats) = load_index(&catalog, source.as_ref()).await;

            ResultPrinter::new(json).print_index(&index, &stats)?;
        }
        Commands::Shell { articles } => {
            run_shell(&config, articles.as_deref())?;
        }
        Commands::Config { key, value } => {
            let mut config = config;
            if let Some(val) = value {
                tracing::info!("Setting config: {} = {}", key, val);
                config.set(&key, &val)?;
                config.save(&config_path)?;
                println!("{} = {}", key, config.get(&key)?);
            } else {
                println!("{}", config.get(&key)?);
            }
        }
        Commands::Status => {
            let catalog = config.catalog()?;
            println!("\n📊 Search Status");
            println!("   Config: {:?}", config_path);
            println!("   Content API: {}{}", config.api_base_url, config.search_data_path);
            println!("   Direct links: {}", catalog.direct_links.len());
            println!("   Page titles: {}", catalog.page_titles.len());
            println!("   Threshold: {}", config.ranker.threshold);
            println!("   Confident cutoff: {}", config.confident_cutoff);
        }
    }

    Ok(())
}

fn article_source(config: &Config, articles: Option<&Path>) -> Result<Arc<dyn ArticleSource>> {
    let source: Arc<dyn ArticleSource> = match articles {
        Some(path) => Arc::new(FileArticleSource::new(path)),
        None => Arc::new(config.article_source()?),
    };
    Ok(source)
}

fn spawn_session(config: &Config, articles: Option<&Path>) -> Result<SearchSession> {
    let catalog = config.catalog()?;
    let source = article_source(config, articles)?;
    Ok(SearchSession::spawn(
        catalog,
        source,
        FuzzyRanker::new(config.ranker.clone()),
    ))
}

async fn open_session(config: &Config, articles: Option<&Path>) -> Result<SearchSession> {
    let mut session = spawn_session(config, articles)?;
    session.ready().await;
    Ok(session)
}

const SHELL_HELP: &str = "\
/open      open the search box (same as clicking the icon)
/close     close the search box
/esc       press Escape
/outside   click outside the search box
/go        submit the current query
/pick N    open suggestion N
/link N    open quick link N
/reload    fetch the articles again
/quit      exit
anything else replaces the query text";

fn run_shell(config: &Config, articles: Option<&Path>) -> Result<()> {
    let catalog = config.catalog()?;
    let session = spawn_session(config, articles)?;
    let mut widget = SearchWidget::new(session, catalog.direct_links, config.confident_cutoff);
    let printer = ResultPrinter::new(false);

    println!("🔍 finseek shell (/help for commands)");

    let stdin = io::stdin();
    loop {
        print!("{} ", if widget.session().is_loading() { "…>" } else { ">" });
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end_matches(['\r', '\n']);

        if widget.session_mut().poll() {
            widget.refresh();
        }

        let event = match parse_shell_line(line) {
            ShellLine::Event(event) => event,
            ShellLine::Reload => {
                widget.session_mut().reload();
                continue;
            }
            ShellLine::Help => {
                println!("{SHELL_HELP}");
                continue;
            }
            ShellLine::Quit => break,
            ShellLine::Invalid(msg) => {
                println!("{msg}");
                continue;
            }
        };

        if let Some(nav) = widget.handle(event) {
            printer.print_navigation(&nav)?;
            continue;
        }

        match widget.view() {
            WidgetView::Hidden => println!("(search closed, /open to start)"),
            WidgetView::Suggestions(results) => printer.print_results(results)?,
            WidgetView::QuickLinks(links) => printer.print_quick_links(links)?,
        }
    }

    Ok(())
}

enum ShellLine {
    Event(WidgetEvent),
    Reload,
    Help,
    Quit,
    Invalid(String),
}

fn parse_shell_line(line: &str) -> ShellLine {
    let Some(command) = line.strip_prefix('/') else {
        return ShellLine::Event(WidgetEvent::Input(line.to_string()));
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or("");
    let number = parts.next().and_then(|n| n.parse::<usize>().ok());

    match (name, number) {
        ("open", _) => ShellLine::Event(WidgetEvent::Activate),
        ("close", _) => ShellLine::Event(WidgetEvent::Close),
        ("esc", _) => ShellLine::Event(WidgetEvent::Escape),
        ("outside", _) => ShellLine::Event(WidgetEvent::OutsideClick),
        ("go", _) => ShellLine::Event(WidgetEvent::Submit),
        ("pick", Some(n)) if n > 0 => ShellLine::Event(WidgetEvent::PickResult(n - 1)),
        ("link", Some(n)) if n > 0 => ShellLine::Event(WidgetEvent::PickQuickLink(n - 1)),
        ("pick" | "link", _) => ShellLine::Invalid(format!("usage: /{name} N")),
        ("reload", _) => ShellLine::Reload,
        ("help", _) => ShellLine::Help,
        ("quit" | "exit", _) => ShellLine::Quit,
        _ => ShellLine::Invalid(format!("unknown command /{name}, try /help")),
    }
}
