use std::sync::Arc;

use futures::future::join_all;
use serde_json::json;

use crate::app::{AppContext, Result};
use crate::view::{CategorizedFeed, DetailRecord, RenderRecord, StatusTag, ViewState};

pub fn list_views(ctx: &AppContext) -> Result<()> {
    for view in ctx.config.views() {
        println!("{} ({})", view.name, view.category);
    }
    Ok(())
}

pub fn format_record(record: &RenderRecord) -> String {
    let mut out = format!("{}\n", record.title);

    let byline = match (&record.publish_date[..], record.author_name.as_deref()) {
        ("", None) => String::new(),
        ("", Some(author)) => author.to_string(),
        (date, None) => date.to_string(),
        (date, Some(author)) => format!("{} · {}", date, author),
    };
    if !byline.is_empty() {
        out.push_str(&format!("  {}\n", byline));
    }
    if !record.excerpt.is_empty() {
        out.push_str(&format!("  {}\n", record.excerpt));
    }
    out.push_str(&format!("  {}\n", record.poster_url));
    out.push_str(&format!("  id: {}\n", record.id));
    out
}

pub fn format_detail(record: &DetailRecord) -> String {
    let summary = &record.summary;
    let mut out = format!("{}\n", summary.title);
    out.push_str(&"=".repeat(summary.title.chars().count()));
    out.push('\n');

    let author = match (summary.author_name.as_deref(), record.author_email.as_deref()) {
        (Some(name), Some(email)) => format!("{} <{}>", name, email),
        (Some(name), None) => name.to_string(),
        (None, _) => "Unknown author".to_string(),
    };
    out.push_str(&format!("{}  {}\n", author, summary.publish_date));
    out.push_str(&format!("{}\n", summary.poster_url));

    for paragraph in &record.body {
        out.push('\n');
        out.push_str(paragraph);
        out.push('\n');
    }
    out
}

fn print_feed(ctx: &AppContext, feed: &CategorizedFeed) {
    println!("== {} ==", feed.name());
    match feed.state() {
        ViewState::Loading => println!("Loading..."),
        ViewState::Failed(e) => eprintln!("Failed to load {}: {}", feed.name(), e),
        ViewState::Loaded(docs) if docs.is_empty() => println!("No articles"),
        ViewState::Loaded(docs) => {
            for record in ctx.records.render_all(&docs) {
                println!("{}", format_record(&record));
            }
        }
    }
}

fn feed_json(ctx: &AppContext, feed: &CategorizedFeed) -> serde_json::Value {
    match feed.state() {
        ViewState::Loaded(docs) => json!({
            "status": StatusTag::Loaded,
            "records": ctx.records.render_all(&docs),
        }),
        ViewState::Failed(e) => json!({
            "status": StatusTag::Failed,
            "error": e.to_string(),
            "retryable": e.is_retryable(),
        }),
        ViewState::Loading => json!({ "status": StatusTag::Loading }),
    }
}

pub async fn show_feed(ctx: &AppContext, category: &str, as_json: bool) -> Result<StatusTag> {
    let feed = ctx.feed_for(category);
    let status = feed.activate().await;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&feed_json(ctx, &feed))?);
    } else {
        print_feed(ctx, &feed);
    }

    Ok(status)
}

/// Every configured view, fetched concurrently.
pub async fn show_front(ctx: &AppContext, as_json: bool) -> Result<StatusTag> {
    let feeds: Vec<Arc<CategorizedFeed>> =
        ctx.config.views().into_iter().map(|v| ctx.feed(v)).collect();

    join_all(feeds.iter().map(|f| f.activate())).await;

    if as_json {
        let views: serde_json::Map<String, serde_json::Value> = feeds
            .iter()
            .map(|f| (f.category(), feed_json(ctx, f)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&views)?);
    } else {
        for feed in &feeds {
            print_feed(ctx, feed);
        }
    }

    // Per-view failures are already reported inline.
    Ok(StatusTag::Loaded)
}

pub async fn show_article(ctx: &AppContext, id: &str, as_json: bool) -> Result<StatusTag> {
    let view = ctx.detail();
    let status = view.load(id).await;

    match view.state() {
        ViewState::Failed(e) => eprintln!("Failed to load article {}: {}", id, e),
        _ => {
            if let Some(record) = view.record(&ctx.records) {
                if as_json {
                    println!("{}", serde_json::to_string_pretty(&record)?);
                } else {
                    print!("{}", format_detail(&record));
                }
            }
        }
    }

    Ok(status)
}
