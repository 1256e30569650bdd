use bookshelf_sync::PageOutcome;
use eyre::Result;

use crate::commands::Session;
use crate::utils::format_feed_item;

pub async fn handle_feed_command(pages: u32, expand: bool, session: &Session) -> Result<()> {
    let feed = session.feed();

    for _ in 0..pages.max(1) {
        match feed.fetch_next_page().await? {
            PageOutcome::Loaded { has_more: true, .. } => continue,
            PageOutcome::Loaded { has_more: false, .. } | PageOutcome::Exhausted => break,
            PageOutcome::AlreadyLoading | PageOutcome::Discarded => break,
        }
    }

    let items = feed.items().await;
    if items.is_empty() {
        println!("Nothing in your feed yet. Follow someone with `bookshelf follow <user>`");
        return Ok(());
    }

    for item in &items {
        for line in format_feed_item(item, expand) {
            println!("{}", line);
        }
    }
    if feed.has_more().await {
        println!("\nMore available with --pages {}", feed.pages_fetched().await + 1);
    }
    Ok(())
}
