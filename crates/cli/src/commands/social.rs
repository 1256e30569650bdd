use bookshelf_types::UserId;
use eyre::Result;

use crate::commands::Session;

pub async fn handle_follow_command(user_id: i64, session: &Session) -> Result<()> {
    session.social().follow_user(UserId(user_id)).await?;
    println!("✅ Following user {}", user_id);
    Ok(())
}

pub async fn handle_unfollow_command(user_id: i64, session: &Session) -> Result<()> {
    session.social().unfollow_user(UserId(user_id)).await?;
    println!("✅ Unfollowed user {}", user_id);
    Ok(())
}
