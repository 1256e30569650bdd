//! Terminal formatting shared by the command handlers.

use bookshelf_types::{ActivityEvent, ActivityPayload, FeedItem, Reading, Recommendation};
use chrono::{DateTime, Utc};

pub fn format_reading(reading: &Reading) -> String {
    let (title, author) = match &reading.book {
        Some(book) => (book.title().to_string(), book.author().to_string()),
        None => (format!("book {}", reading.book_id), "unknown author".to_string()),
    };
    let mut line = format!(
        "[{}] {} by {} ({})",
        reading.id, title, author, reading.status
    );
    if let Some(total) = reading.total_pages.filter(|total| *total > 0) {
        line.push_str(&format!(" {}/{} pages", reading.progress_pages, total));
    }
    if let Some(rating) = reading.rating {
        line.push_str(&format!(" {}", stars(rating)));
    }
    line
}

pub fn format_recommendation(recommendation: &Recommendation) -> String {
    format!(
        "[{}] {} by {} ({:.0}% match)\n    {}",
        recommendation.id,
        recommendation.book.title(),
        recommendation.book.author(),
        recommendation.confidence() * 100.0,
        recommendation.reason
    )
}

pub fn format_feed_item(item: &FeedItem, expand: bool) -> Vec<String> {
    match item {
        FeedItem::Review(reading) => {
            let who = reading
                .user
                .as_ref()
                .map(|user| user.name.clone())
                .unwrap_or_else(|| format!("user {}", reading.user_id));
            let mut line = format!("{} {} reviewed", when(reading.updated_at), who);
            match &reading.book {
                Some(book) => line.push_str(&format!(" {}", book.title())),
                None => line.push_str(&format!(" book {}", reading.book_id)),
            }
            if let Some(rating) = reading.rating {
                line.push_str(&format!(" {}", stars(rating)));
            }
            let mut lines = vec![line];
            if let Some(review) = &reading.review {
                lines.push(format!("    \"{}\"", review));
            }
            lines
        }
        FeedItem::GroupedActivity(group) => {
            let mut lines = Vec::new();
            if let Some(head) = group.head() {
                lines.push(format!(
                    "{} {} {}",
                    when(group.latest),
                    group.user.name,
                    describe(head)
                ));
            }
            let rest = group.rest();
            if expand {
                for event in rest {
                    lines.push(format!("    {} {}", when(event.created_at), describe(event)));
                }
            } else if !rest.is_empty() {
                lines.push(format!("    and {} more", rest.len()));
            }
            lines
        }
    }
}

fn describe(event: &ActivityEvent) -> String {
    match &event.payload {
        ActivityPayload::FollowedUser(follow) => {
            format!("started following {}", follow.followed_user_name)
        }
        ActivityPayload::StartedBook(book) => format!("started reading {}", book.book_title),
        ActivityPayload::FinishedBook(book) => format!("finished {}", book.book_title),
        ActivityPayload::WantToRead(book) => format!("wants to read {}", book.book_title),
        ActivityPayload::RatedBook { book, rating } => {
            format!("rated {} {}", book.book_title, stars(*rating))
        }
        ActivityPayload::AddedReview(book) | ActivityPayload::ReviewedBook(book) => {
            format!("reviewed {}", book.book_title)
        }
        ActivityPayload::Other { activity_type, .. } => activity_type.replace('_', " "),
    }
}

fn stars(rating: u8) -> String {
    let rating = rating.min(5) as usize;
    format!("{}{}", "★".repeat(rating), "☆".repeat(5 - rating))
}

fn when(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_ratings() {
        assert_eq!(stars(3), "★★★☆☆");
        assert_eq!(stars(9), "★★★★★");
    }
}
