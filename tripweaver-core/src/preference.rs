//! Raw member wishes and their standardised form.

use serde::{Deserialize, Serialize};

/// Inclusive bounds of the raw wish rating scale.
pub const RAW_SCORE_RANGE: std::ops::RangeInclusive<f64> = 1.0..=5.0;

/// A single member's wish for a place.
///
/// Preferences are engine input and are never mutated by the pipeline.
///
/// # Examples
/// ```
/// use tripweaver_core::Preference;
///
/// let wish = Preference::new("m-alice", "p-tower", 4.5, 90);
/// assert!(!wish.favourite);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preference {
    /// Member who expressed the wish.
    pub member_id: String,
    /// Place being wished for.
    pub place_id: String,
    /// Raw rating on the member's personal 1–5 scale.
    pub raw_score: f64,
    /// How long the member wants to stay, in minutes.
    pub requested_minutes: u32,
    /// Marks a must-see for this member.
    #[serde(default)]
    pub favourite: bool,
}

impl Preference {
    /// Construct a non-favourite preference.
    pub fn new(
        member_id: impl Into<String>,
        place_id: impl Into<String>,
        raw_score: f64,
        requested_minutes: u32,
    ) -> Self {
        Self {
            member_id: member_id.into(),
            place_id: place_id.into(),
            raw_score,
            requested_minutes,
            favourite: false,
        }
    }

    /// Construct a favourite-flagged preference.
    pub fn favourite(
        member_id: impl Into<String>,
        place_id: impl Into<String>,
        raw_score: f64,
        requested_minutes: u32,
    ) -> Self {
        Self {
            favourite: true,
            ..Self::new(member_id, place_id, raw_score, requested_minutes)
        }
    }
}

/// Why a member's scores fell back to panel-wide statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// The member rated only one place.
    SingleRating,
    /// All of the member's ratings were identical.
    IdenticalRatings,
}

impl FallbackReason {
    /// Machine-readable reason code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::SingleRating => "single_rating",
            Self::IdenticalRatings => "identical_ratings",
        }
    }
}

/// Which statistics produced a standardised score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    /// The member's own mean and spread.
    MemberScale,
    /// Panel-wide statistics, used when the member's own scale is
    /// degenerate.
    PanelFallback(FallbackReason),
}

/// A raw wish converted to a z-score on the owning member's scale.
///
/// For every member with at least two distinct raw scores, the mean of
/// their standardised scores over all rated places is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardisedPreference {
    /// Member whose scale the score was standardised against.
    pub member_id: String,
    /// Place the score applies to.
    pub place_id: String,
    /// Bias-corrected score; positive means above the member's average.
    pub score: f64,
    /// Statistics used to derive the score.
    pub source: ScoreSource,
}
