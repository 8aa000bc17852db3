use std::fmt::Write;

use crate::app::{AppContext, Result, UnifeedError};
use crate::cli::ParseMode;
use crate::detector::detect_feed_type_with_limit;
use crate::domain::Feed;

pub async fn detect(ctx: &AppContext, location: &str) -> Result<()> {
    let body = ctx.fetch(location).await?;
    let feed_type = detect_feed_type_with_limit(&body, ctx.config.parser.sniff_limit);
    println!("{}", feed_type);
    Ok(())
}

pub async fn parse_feed(
    ctx: &AppContext,
    location: &str,
    mode: ParseMode,
    sort: bool,
    json: bool,
) -> Result<()> {
    let mut feed = ctx.fetch_feed(location, mode.feed_type()).await?;
    if sort {
        feed.sort();
        debug_assert!(feed.is_sorted());
    }

    if json {
        let out = serde_json::to_string_pretty(&feed)
            .map_err(|e| UnifeedError::Other(format!("Failed to serialize feed: {}", e)))?;
        println!("{}", out);
    } else {
        print!("{}", render_items(&feed));
    }

    Ok(())
}

pub async fn batch(ctx: &AppContext, locations: Vec<String>) -> Result<()> {
    println!("Parsing {} feeds...", locations.len());

    let results = ctx.fetch_all(locations).await;

    let mut total_items = 0;
    let mut errors = 0;

    for (location, result) in results {
        match result {
            Ok(feed) => {
                total_items += feed.len();
                println!(
                    "  {} [{}] {} items\n    {}",
                    feed.display_title(),
                    feed.feed_type,
                    feed.len(),
                    location
                );
                if !feed.display_link().is_empty() {
                    println!("    {}", feed.display_link());
                }
            }
            Err(e) => {
                errors += 1;
                eprintln!("  Error parsing {}: {}", location, e);
            }
        }
    }

    println!("Batch complete: {} items, {} errors", total_items, errors);
    Ok(())
}

/// Item count, then one line per item with its link and enclosures indented
/// below.
pub fn render_items(feed: &Feed) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} items", feed.len());

    for item in &feed.items {
        let date = item
            .published_parsed
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "          ".to_string());
        let _ = writeln!(out, "{} {}", date, item.display_title());
        if !item.display_link().is_empty() {
            let _ = writeln!(out, "    {}", item.display_link());
        }

        for enclosure in &item.enclosures {
            let _ = writeln!(
                out,
                "    {} ({}, {} bytes)",
                enclosure.url, enclosure.mime_type, enclosure.length
            );
        }
    }

    out
}
