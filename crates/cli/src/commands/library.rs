//! Library command handlers: listing, searching, adding and editing readings.

use bookshelf_sync::LibraryIndex;
use bookshelf_types::{BookDetails, NewBook, ReadingId, ReadingStatus, ReadingUpdate};
use eyre::Result;

use crate::commands::Session;
use crate::utils::format_reading;

pub async fn handle_library_command(
    status: Option<ReadingStatus>,
    session: &Session,
) -> Result<()> {
    let user_id = session.config.user_id()?;
    let readings = session.backend.list_readings(user_id, status).await?;

    if readings.is_empty() {
        match status {
            Some(status) => println!("No books marked {}", status),
            None => println!("No books in library"),
        }
        return Ok(());
    }

    println!("Library ({} books):", readings.len());
    for reading in &readings {
        println!("  {}", format_reading(reading));
    }
    Ok(())
}

pub async fn handle_search_command(query: String, limit: u32, session: &Session) -> Result<()> {
    let results = session.backend.search_books(&query, limit).await?;
    if results.is_empty() {
        println!("No books found for '{}'", query);
        return Ok(());
    }

    for result in results {
        let year = result
            .publication_year
            .map(|year| format!(" ({})", year))
            .unwrap_or_default();
        println!("  {} by {}{}", result.title, result.author, year);
        if let Some(isbn) = &result.isbn {
            println!("    ISBN {}", isbn);
        }
    }
    Ok(())
}

pub async fn handle_add_command(
    title: String,
    author: String,
    isbn: Option<String>,
    status: Option<ReadingStatus>,
    session: &Session,
) -> Result<()> {
    let orchestrator = session.orchestrator()?;
    let library: LibraryIndex = orchestrator.load_library().await?;

    let book = NewBook {
        details: BookDetails {
            isbn,
            ..BookDetails::new(title, author)
        },
        open_library_id: None,
    };

    let added = orchestrator.add_to_library(book, status, &library).await?;
    println!(
        "✅ Added {} by {} as {} (reading {})",
        added.book.title(),
        added.book.author(),
        added.reading.status,
        added.reading.id
    );
    Ok(())
}

pub async fn handle_status_command(
    reading_id: i64,
    status: ReadingStatus,
    session: &Session,
) -> Result<()> {
    let orchestrator = session.orchestrator()?;
    let reading = orchestrator
        .update_reading(ReadingId(reading_id), &ReadingUpdate::status(status))
        .await?;
    println!("✅ {}", format_reading(&reading));
    Ok(())
}

pub async fn handle_remove_command(reading_id: i64, session: &Session) -> Result<()> {
    let orchestrator = session.orchestrator()?;
    orchestrator.delete_reading(ReadingId(reading_id)).await?;
    println!("✅ Removed reading {}", reading_id);
    Ok(())
}
