//! Terminal output for search results
//!
//! Uses colored for emphasis: matched spans in titles are bold yellow,
//! everything else stays plain or dimmed.

use anyhow::Result;
use colored::*;
use serde::Serialize;

use crate::indexer::{DocumentKind, IndexStats, SearchDocument};
use crate::presenter::{highlight_field, Navigation, QuickLink, Segment};
use crate::ranker::{FieldKey, MatchResult};

/// Handles formatting and printing search results
pub struct ResultPrinter {
    json: bool,
}

#[derive(Serialize)]
struct JsonResult<'a> {
    #[serde(flatten)]
    result: &'a MatchResult,
    title_segments: Vec<Segment>,
}

impl ResultPrinter {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Print ranked suggestions with highlighted titles
    pub fn print_results(&self, results: &[MatchResult]) -> Result<()> {
        if self.json {
            let payload: Vec<_> = results
                .iter()
                .map(|result| JsonResult {
                    result,
                    title_segments: highlight_field(
                        &result.item.title,
                        &result.matches,
                        FieldKey::Title,
                    ),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&payload)?);
            return Ok(());
        }

        if results.is_empty() {
            println!("\n{}", "No suggestions.".yellow());
            return Ok(());
        }

        println!(
            "\n{} {}",
            "Suggestions".green().bold(),
            format!("({})", results.len()).green()
        );
        println!();

        for (i, result) in results.iter().enumerate() {
            self.print_result(i + 1, result);
        }

        Ok(())
    }

    fn print_result(&self, index: usize, result: &MatchResult) {
        let title = render_segments(&highlight_field(
            &result.item.title,
            &result.matches,
            FieldKey::Title,
        ));

        println!(
            "{} {} {} {}",
            format!("[{}]", index).cyan().bold(),
            kind_badge(result.item.kind),
            title,
            format!("score: {:.3}", result.score).dimmed()
        );
        println!("    {}", result.item.path.blue());

        let fields: Vec<&str> = result.matches.iter().map(|m| m.key.name()).collect();
        println!("    {} {}", "matched:".dimmed(), fields.join(", ").magenta());
    }

    pub fn print_quick_links(&self, links: &[QuickLink]) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(links)?);
            return Ok(());
        }

        println!("\n{}", "Quick links".green().bold());
        for (i, link) in links.iter().enumerate() {
            println!(
                "{} {} {}",
                format!("[{}]", i + 1).cyan(),
                link.name,
                link.path.dimmed()
            );
        }
        Ok(())
    }

    pub fn print_navigation(&self, nav: &Navigation) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string(nav)?);
            return Ok(());
        }

        let how = match nav {
            Navigation::DirectLink(_) => "direct link",
            Navigation::Document(_) => "best match",
            Navigation::SearchPage(_) => "search page",
        };
        println!("{} {} {}", "→".green().bold(), nav.path().bold(), format!("({how})").dimmed());
        Ok(())
    }

    pub fn print_index(&self, index: &[SearchDocument], stats: &IndexStats) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(index)?);
            return Ok(());
        }

        for doc in index {
            println!("{} {} {}", kind_badge(doc.kind), doc.title, doc.path.dimmed());
        }

        println!("\n✨ Index built");
        println!("   Pages: {}", stats.pages);
        println!("   Articles: {}", stats.articles);
        println!("   Time: {:.3}s", stats.duration_secs);
        Ok(())
    }
}

fn kind_badge(kind: DocumentKind) -> ColoredString {
    match kind {
        DocumentKind::Page => kind.label().purple(),
        DocumentKind::Article => kind.label().blue(),
    }
}

/// Join segments, emphasizing matched spans
pub fn render_segments(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| {
            if s.emphasized {
                s.text.yellow().bold().to_string()
            } else {
                s.text.clone()
            }
        })
        .collect()
}
