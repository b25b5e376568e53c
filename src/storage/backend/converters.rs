use crate::domain::KaizenSuggestion;
use crate::errors::{KaizenError, Result};
use migration::entities::kaizen_suggestion;

/// 将 Sea-ORM Model 转换为 KaizenSuggestion
pub fn model_to_suggestion(model: kaizen_suggestion::Model) -> Result<KaizenSuggestion> {
    let lean_category = model.lean_category.parse().map_err(|e: String| {
        KaizenError::serialization(format!("Suggestion {}: {}", model.id, e))
    })?;
    let suggestion_level = model.suggestion_level.parse().map_err(|e: String| {
        KaizenError::serialization(format!("Suggestion {}: {}", model.id, e))
    })?;
    let status = model.status.parse().map_err(|e: String| {
        KaizenError::serialization(format!("Suggestion {}: {}", model.id, e))
    })?;

    Ok(KaizenSuggestion {
        id: model.id,
        job_id: model.job_id,
        transcript: model.transcript,
        summary: model.summary,
        lean_category,
        suggestion_level,
        reasoning: model.reasoning,
        location: model.location,
        shift: model.shift,
        associate_name: model.associate_name,
        timestamp: model.timestamp,
        status,
        last_updated: model.last_updated,
        audio_key: model.audio_key,
    })
}

/// 将 KaizenSuggestion 转换为 ActiveModel（用于插入）
pub fn suggestion_to_active_model(suggestion: &KaizenSuggestion) -> kaizen_suggestion::ActiveModel {
    use sea_orm::ActiveValue::*;

    kaizen_suggestion::ActiveModel {
        id: Set(suggestion.id.clone()),
        job_id: Set(suggestion.job_id.clone()),
        transcript: Set(suggestion.transcript.clone()),
        summary: Set(suggestion.summary.clone()),
        lean_category: Set(suggestion.lean_category.to_string()),
        suggestion_level: Set(suggestion.suggestion_level.to_string()),
        reasoning: Set(suggestion.reasoning.clone()),
        location: Set(suggestion.location.clone()),
        shift: Set(suggestion.shift.clone()),
        associate_name: Set(suggestion.associate_name.clone()),
        timestamp: Set(suggestion.timestamp),
        status: Set(suggestion.status.to_string()),
        last_updated: Set(suggestion.last_updated),
        audio_key: Set(suggestion.audio_key.clone()),
    }
}
