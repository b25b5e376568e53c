//! Suggestion review commands: list, show, set-status, errors

use colored::Colorize;

use crate::domain::{KaizenSuggestion, SuggestionStatus};
use crate::interfaces::cli::CliError;
use crate::services::{ListQuery, SuggestionService};

fn colored_status(status: SuggestionStatus) -> String {
    match status {
        SuggestionStatus::PendingReview => status.as_str().yellow().to_string(),
        SuggestionStatus::Approved => status.as_str().cyan().to_string(),
        SuggestionStatus::Rejected => status.as_str().red().to_string(),
        SuggestionStatus::Implemented => status.as_str().green().to_string(),
    }
}

fn print_suggestion_line(s: &KaizenSuggestion) {
    println!(
        "  {} {} {} [{} / {}]",
        s.timestamp.format("%Y-%m-%d %H:%M").to_string().dimmed(),
        s.id.cyan(),
        colored_status(s.status),
        s.lean_category.as_str().blue(),
        s.suggestion_level.as_str().magenta()
    );
    println!("      {}", s.summary);
}

pub async fn list_suggestions(
    service: &SuggestionService,
    status: Option<String>,
    category: Option<String>,
    limit: Option<u64>,
    skip: Option<u64>,
    json: bool,
) -> Result<(), CliError> {
    let page = service
        .list(ListQuery {
            skip,
            limit,
            status,
            lean_category: category,
        })
        .await?;

    if json {
        let out = serde_json::to_string_pretty(&page)
            .map_err(|e| CliError::CommandError(format!("Failed to serialize: {}", e)))?;
        println!("{}", out);
        return Ok(());
    }

    if page.suggestions.is_empty() {
        println!("{} No suggestions found", "ℹ".bold().blue());
        return Ok(());
    }

    println!("{}", "Kaizen suggestions:".bold().green());
    println!();
    for suggestion in &page.suggestions {
        print_suggestion_line(suggestion);
    }
    println!();
    println!(
        "{} Showing {} of {} (skip {})",
        "ℹ".bold().blue(),
        page.suggestions.len().to_string().green(),
        page.total.to_string().green(),
        page.skip
    );
    Ok(())
}

pub async fn show_suggestion(service: &SuggestionService, id: &str) -> Result<(), CliError> {
    let s = service.get(id).await?;

    println!("{}", "Suggestion".bold().green());
    println!("  {}:        {}", "Id".cyan(), s.id);
    println!("  {}:       {}", "Job".cyan(), s.job_id);
    println!("  {}:    {}", "Status".cyan(), colored_status(s.status));
    println!("  {}:  {}", "Category".cyan(), s.lean_category);
    println!("  {}:     {}", "Level".cyan(), s.suggestion_level);
    println!(
        "  {}:   {}",
        "Created".cyan(),
        s.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if let Some(updated) = s.last_updated {
        println!(
            "  {}:   {}",
            "Updated".cyan(),
            updated.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    for (label, value) in [
        ("Location", &s.location),
        ("Shift", &s.shift),
        ("Associate", &s.associate_name),
        ("Audio", &s.audio_key),
    ] {
        if let Some(value) = value {
            println!("  {}: {}", format!("{:<9}", label).cyan(), value);
        }
    }
    println!();
    println!("  {}", "Summary".bold());
    println!("    {}", s.summary);
    if let Some(reasoning) = s.reasoning.as_deref().filter(|r| !r.is_empty()) {
        println!("  {}", "Reasoning".bold());
        println!("    {}", reasoning.dimmed());
    }
    println!("  {}", "Transcript".bold());
    println!("    {}", s.transcript);
    Ok(())
}

pub async fn set_status(
    service: &SuggestionService,
    id: &str,
    status: &str,
) -> Result<(), CliError> {
    let message = service.update_status(id, status).await?;
    println!("{} {}", "✓".bold().green(), message);
    Ok(())
}

pub async fn recent_errors(service: &SuggestionService, limit: u64) -> Result<(), CliError> {
    let entries = service.storage().recent_errors(limit.max(1)).await?;

    if entries.is_empty() {
        println!("{} No errors recorded", "ℹ".bold().blue());
        return Ok(());
    }

    println!("{}", "Recent errors:".bold().red());
    for entry in &entries {
        println!(
            "  {} {} {}",
            entry
                .timestamp
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
                .dimmed(),
            entry.method.yellow(),
            entry.endpoint.blue()
        );
        println!("      {}", entry.error);
    }
    Ok(())
}
