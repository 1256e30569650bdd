use bookshelf_types::RecommendationId;
use eyre::Result;

use crate::cli::RecommendationCommands;
use crate::commands::Session;
use crate::utils::format_recommendation;

pub async fn handle_recommendations_command(
    cmd: RecommendationCommands,
    session: &Session,
) -> Result<()> {
    let orchestrator = session.orchestrator()?;
    let recommendations = orchestrator.refresh_recommendations().await?;

    match cmd {
        RecommendationCommands::List => {
            let shown = orchestrator.recommendations().await;
            if shown.is_empty() {
                println!("No recommendations right now");
                return Ok(());
            }
            println!("Recommendations ({}):", shown.len());
            for recommendation in &shown {
                println!("  {}", format_recommendation(recommendation));
            }
        }
        RecommendationCommands::Accept { id, status } => {
            let id = RecommendationId(id);
            let recommendation = recommendations
                .iter()
                .find(|r| r.id == id && !r.is_dismissed)
                .ok_or_else(|| eyre::eyre!("No open recommendation with id {}", id))?;

            let library = orchestrator.load_library().await?;
            let conversion = orchestrator
                .add_from_recommendation(recommendation, status, &library)
                .await?;
            println!(
                "✅ Added {} to your library as {} (reading {})",
                conversion.book.title(),
                conversion.reading.status,
                conversion.reading.id
            );
        }
        RecommendationCommands::Dismiss { id } => {
            orchestrator
                .dismiss_recommendation(RecommendationId(id))
                .await?;
            println!("✅ Dismissed recommendation {}", id);
        }
    }

    Ok(())
}
