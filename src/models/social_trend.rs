use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::ValidationError;

/// Source platform of a social trend item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Reddit,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Reddit => "reddit",
        }
    }
}

impl TryFrom<String> for Platform {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "reddit" => Ok(Platform::Reddit),
            other => Err(format!("unknown platform: {}", other)),
        }
    }
}

/// One social post/thread observed on an upstream platform.
/// Natural key: (external_id, platform).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SocialTrendRecord {
    pub id: Uuid,
    pub external_id: String, // source-assigned id, e.g. a Reddit post id
    pub symbol_or_title: String,
    #[sqlx(try_from = "String")]
    pub platform: Platform,
    pub followers_or_comments: i64,
    pub engagement_score: f64,
    pub sentiment: f64,
    pub trend_label: String,
    pub body_text: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl SocialTrendRecord {
    /// Builds a record, rejecting out-of-domain fields. Sentiment outside
    /// [0, 1] is a hard validation failure, never clamped.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        external_id: String,
        symbol_or_title: String,
        platform: Platform,
        followers_or_comments: i64,
        engagement_score: f64,
        sentiment: f64,
        trend_label: String,
        body_text: Option<String>,
        fetched_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if external_id.is_empty() {
            return Err(ValidationError("external_id must not be empty".into()));
        }
        if !(0.0..=1.0).contains(&sentiment) {
            return Err(ValidationError(format!(
                "sentiment must be within [0, 1], got {}",
                sentiment
            )));
        }
        if followers_or_comments < 0 {
            return Err(ValidationError(format!(
                "followers_or_comments must be >= 0, got {}",
                followers_or_comments
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            external_id,
            symbol_or_title,
            platform,
            followers_or_comments,
            engagement_score,
            sentiment,
            trend_label,
            body_text,
            fetched_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(sentiment: f64) -> Result<SocialTrendRecord, ValidationError> {
        SocialTrendRecord::new(
            "abc123".into(),
            "BTC to the moon".into(),
            Platform::Reddit,
            42,
            3.5,
            sentiment,
            "Neutral".into(),
            None,
            Utc::now(),
        )
    }

    #[test]
    fn sentiment_bounds_are_inclusive() {
        assert!(build(0.0).is_ok());
        assert!(build(1.0).is_ok());
        assert!(build(0.5).is_ok());
    }

    #[test]
    fn out_of_range_sentiment_is_rejected_not_clamped() {
        assert!(build(1.2).is_err());
        assert!(build(-0.1).is_err());
    }

    #[test]
    fn empty_external_id_is_rejected() {
        let res = SocialTrendRecord::new(
            "".into(),
            "title".into(),
            Platform::Reddit,
            0,
            0.0,
            0.5,
            "Neutral".into(),
            None,
            Utc::now(),
        );
        assert!(res.is_err());
    }
}
