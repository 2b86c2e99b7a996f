//! Preference normalisation.
//!
//! Converts raw 1–5 wish ratings into per-member z-scores so that a
//! member who rates everything 4–5 carries no more weight than one who
//! rates 1–3. Members whose own scale is degenerate (a single rating, or
//! identical ratings throughout) fall back to panel-wide statistics, and
//! each fallback is surfaced as a warning.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tripweaver_core::error::ValidationError;
use tripweaver_core::preference::RAW_SCORE_RANGE;
use tripweaver_core::{FallbackReason, Preference, ScoreSource, StandardisedPreference};

/// Tolerances for the post-normalisation quality check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormaliserConfig {
    /// Maximum allowed deviation of the mean-of-member-means from zero.
    pub mean_tolerance: f64,
    /// Maximum fraction of members allowed on the fallback path before
    /// the normalisation is flagged degraded.
    pub max_fallback_fraction: f64,
}

impl Default for NormaliserConfig {
    fn default() -> Self {
        Self {
            mean_tolerance: 0.05,
            max_fallback_fraction: 0.5,
        }
    }
}

/// Per-member rating statistics computed during normalisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberStatistics {
    /// Member the statistics describe.
    pub member_id: String,
    /// Number of places the member rated.
    pub rating_count: usize,
    /// Mean raw score.
    pub mean: f64,
    /// Population standard deviation of the raw scores.
    pub std_dev: f64,
    /// Set when the member's scores were standardised against panel
    /// statistics instead of their own.
    pub fallback: Option<FallbackReason>,
}

/// Non-fatal conditions observed during normalisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum NormalisationWarning {
    /// The input carried no preferences at all.
    EmptyInput,
    /// A member's scores fell back to panel statistics.
    PanelFallback {
        /// Affected member.
        member_id: String,
        /// Why their own scale was unusable.
        reason: FallbackReason,
    },
    /// The quality check flagged the normalisation as degraded.
    QualityDegraded {
        /// Human-readable description of the failed check.
        detail: String,
    },
}

impl NormalisationWarning {
    /// Human-readable message for result payloads and logs.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::EmptyInput => "no preferences were supplied".to_owned(),
            Self::PanelFallback { member_id, reason } => format!(
                "member {member_id} was standardised against panel statistics ({})",
                reason.code()
            ),
            Self::QualityDegraded { detail } => format!("normalisation quality degraded: {detail}"),
        }
    }
}

/// Outcome of the post-normalisation quality check.
///
/// Degraded quality is surfaced, never fatal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalisationQuality {
    /// Mean over members of their standardised-score means; near zero
    /// for a healthy normalisation.
    pub mean_of_member_means: f64,
    /// Fraction of members on the fallback path.
    pub fallback_fraction: f64,
    /// Whether both checks passed their configured tolerances.
    pub valid: bool,
}

/// Everything the normaliser produces for one trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalisationOutcome {
    /// Standardised preferences, in input order.
    pub standardised: Vec<StandardisedPreference>,
    /// Per-member statistics, ordered by member id.
    pub member_statistics: Vec<MemberStatistics>,
    /// Non-fatal conditions observed.
    pub warnings: Vec<NormalisationWarning>,
    /// Quality-check outcome.
    pub quality: NormalisationQuality,
}

/// Standardise raw wish ratings against each member's own scale.
///
/// Zero preferences yield an empty outcome with an
/// [`NormalisationWarning::EmptyInput`] warning rather than an error.
///
/// # Errors
/// Returns [`ValidationError::RatingOutOfRange`] for any score outside
/// the 1–5 scale; scores are rejected, never clamped.
///
/// # Examples
/// ```
/// use tripweaver_core::Preference;
/// use tripweaver_scoring::{NormaliserConfig, normalise_preferences};
///
/// let prefs = vec![
///     Preference::new("m-1", "p-a", 2.0, 60),
///     Preference::new("m-1", "p-b", 4.0, 60),
/// ];
/// let outcome = normalise_preferences(&prefs, &NormaliserConfig::default())?;
/// let mean: f64 = outcome.standardised.iter().map(|s| s.score).sum::<f64>()
///     / outcome.standardised.len() as f64;
/// assert!(mean.abs() < 1e-9);
/// # Ok::<(), tripweaver_core::ValidationError>(())
/// ```
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "z-score standardisation is floating-point throughout"
)]
pub fn normalise_preferences(
    preferences: &[Preference],
    config: &NormaliserConfig,
) -> Result<NormalisationOutcome, ValidationError> {
    for wish in preferences {
        if !wish.raw_score.is_finite() || !RAW_SCORE_RANGE.contains(&wish.raw_score) {
            return Err(ValidationError::RatingOutOfRange {
                member_id: wish.member_id.clone(),
                place_id: wish.place_id.clone(),
                raw_score: wish.raw_score,
            });
        }
    }
    if preferences.is_empty() {
        return Ok(NormalisationOutcome {
            standardised: Vec::new(),
            member_statistics: Vec::new(),
            warnings: vec![NormalisationWarning::EmptyInput],
            quality: NormalisationQuality {
                mean_of_member_means: 0.0,
                fallback_fraction: 0.0,
                valid: true,
            },
        });
    }

    let by_member = group_by_member(preferences);
    let panel = ScaleStatistics::over(preferences.iter().map(|p| p.raw_score));

    let mut member_statistics = Vec::with_capacity(by_member.len());
    let mut warnings = Vec::new();
    for (member_id, scores) in &by_member {
        let stats = ScaleStatistics::over(scores.iter().copied());
        let fallback = classify_fallback(scores, stats.std_dev);
        if let Some(reason) = fallback {
            warnings.push(NormalisationWarning::PanelFallback {
                member_id: (*member_id).to_owned(),
                reason,
            });
        }
        member_statistics.push(MemberStatistics {
            member_id: (*member_id).to_owned(),
            rating_count: scores.len(),
            mean: stats.mean,
            std_dev: stats.std_dev,
            fallback,
        });
    }

    let standardised = preferences
        .iter()
        .map(|wish| standardise(wish, &member_statistics, &panel))
        .collect::<Vec<_>>();

    let quality = assess_quality(&member_statistics, &standardised, config, &mut warnings);

    Ok(NormalisationOutcome {
        standardised,
        member_statistics,
        warnings,
        quality,
    })
}

fn group_by_member(preferences: &[Preference]) -> BTreeMap<&str, Vec<f64>> {
    let mut by_member: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for wish in preferences {
        by_member
            .entry(wish.member_id.as_str())
            .or_default()
            .push(wish.raw_score);
    }
    by_member
}

fn classify_fallback(scores: &[f64], std_dev: f64) -> Option<FallbackReason> {
    if scores.len() < 2 {
        Some(FallbackReason::SingleRating)
    } else if std_dev <= f64::EPSILON {
        Some(FallbackReason::IdenticalRatings)
    } else {
        None
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "z-score standardisation is floating-point throughout"
)]
fn standardise(
    wish: &Preference,
    member_statistics: &[MemberStatistics],
    panel: &ScaleStatistics,
) -> StandardisedPreference {
    let stats = member_statistics
        .iter()
        .find(|s| s.member_id == wish.member_id);
    let (score, source) = match stats {
        Some(s) if s.fallback.is_none() => (
            (wish.raw_score - s.mean) / s.std_dev,
            ScoreSource::MemberScale,
        ),
        Some(s) => {
            let reason = s.fallback.unwrap_or(FallbackReason::SingleRating);
            let score = if panel.std_dev > f64::EPSILON {
                (wish.raw_score - panel.mean) / panel.std_dev
            } else {
                0.0
            };
            (score, ScoreSource::PanelFallback(reason))
        }
        // Unreachable in practice: statistics cover every member present
        // in the input.
        None => (0.0, ScoreSource::PanelFallback(FallbackReason::SingleRating)),
    };
    StandardisedPreference {
        member_id: wish.member_id.clone(),
        place_id: wish.place_id.clone(),
        score,
        source,
    }
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "quality assessment aggregates floating-point means"
)]
fn assess_quality(
    member_statistics: &[MemberStatistics],
    standardised: &[StandardisedPreference],
    config: &NormaliserConfig,
    warnings: &mut Vec<NormalisationWarning>,
) -> NormalisationQuality {
    let member_count = member_statistics.len();
    let mean_of_member_means = if member_count == 0 {
        0.0
    } else {
        member_statistics
            .iter()
            .map(|stats| member_score_mean(&stats.member_id, standardised))
            .sum::<f64>()
            / member_count as f64
    };
    let fallback_count = member_statistics
        .iter()
        .filter(|s| s.fallback.is_some())
        .count();
    let fallback_fraction = if member_count == 0 {
        0.0
    } else {
        fallback_count as f64 / member_count as f64
    };

    let centred = mean_of_member_means.abs() <= config.mean_tolerance;
    let fallback_ok = fallback_fraction <= config.max_fallback_fraction;
    if !centred {
        warnings.push(NormalisationWarning::QualityDegraded {
            detail: format!(
                "mean of member means {mean_of_member_means:.4} exceeds tolerance {:.4}",
                config.mean_tolerance
            ),
        });
    }
    if !fallback_ok {
        warnings.push(NormalisationWarning::QualityDegraded {
            detail: format!(
                "{fallback_count} of {member_count} members fell back to panel statistics"
            ),
        });
    }
    NormalisationQuality {
        mean_of_member_means,
        fallback_fraction,
        valid: centred && fallback_ok,
    }
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "per-member mean of standardised scores"
)]
fn member_score_mean(member_id: &str, standardised: &[StandardisedPreference]) -> f64 {
    let scores: Vec<f64> = standardised
        .iter()
        .filter(|s| s.member_id == member_id)
        .map(|s| s.score)
        .collect();
    if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}

/// Mean and population standard deviation of a score stream.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ScaleStatistics {
    mean: f64,
    std_dev: f64,
}

impl ScaleStatistics {
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "mean and variance over raw scores"
    )]
    fn over(scores: impl Iterator<Item = f64> + Clone) -> Self {
        let count = scores.clone().count();
        if count == 0 {
            return Self {
                mean: 0.0,
                std_dev: 0.0,
            };
        }
        let n = count as f64;
        let mean = scores.clone().sum::<f64>() / n;
        let variance = scores.map(|s| (s - mean) * (s - mean)).sum::<f64>() / n;
        Self {
            mean,
            std_dev: variance.sqrt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn score_for<'a>(
        outcome: &'a NormalisationOutcome,
        member: &str,
        place: &str,
    ) -> &'a StandardisedPreference {
        outcome
            .standardised
            .iter()
            .find(|s| s.member_id == member && s.place_id == place)
            .expect("standardised preference present")
    }

    #[rstest]
    fn member_means_are_zero_after_standardisation() {
        let prefs = vec![
            Preference::new("m-1", "p-a", 1.0, 30),
            Preference::new("m-1", "p-b", 3.0, 30),
            Preference::new("m-1", "p-c", 5.0, 30),
        ];
        let outcome =
            normalise_preferences(&prefs, &NormaliserConfig::default()).expect("normalise");
        let mean: f64 = outcome.standardised.iter().map(|s| s.score).sum::<f64>() / 3.0;
        assert!(mean.abs() < 1e-9);
        assert!(outcome.quality.valid);
    }

    #[rstest]
    fn single_rating_member_falls_back_to_panel() {
        let prefs = vec![
            Preference::new("m-solo", "p-a", 5.0, 30),
            Preference::new("m-duo", "p-a", 2.0, 30),
            Preference::new("m-duo", "p-b", 4.0, 30),
        ];
        let outcome =
            normalise_preferences(&prefs, &NormaliserConfig::default()).expect("normalise");
        let solo = score_for(&outcome, "m-solo", "p-a");
        assert_eq!(
            solo.source,
            ScoreSource::PanelFallback(FallbackReason::SingleRating)
        );
        assert!(outcome.warnings.iter().any(|w| matches!(
            w,
            NormalisationWarning::PanelFallback { member_id, reason: FallbackReason::SingleRating }
                if member_id == "m-solo"
        )));
    }

    #[rstest]
    fn identical_ratings_member_falls_back_to_panel() {
        let prefs = vec![
            Preference::new("m-flat", "p-a", 3.0, 30),
            Preference::new("m-flat", "p-b", 3.0, 30),
            Preference::new("m-vary", "p-a", 2.0, 30),
            Preference::new("m-vary", "p-b", 5.0, 30),
        ];
        let outcome =
            normalise_preferences(&prefs, &NormaliserConfig::default()).expect("normalise");
        let flat = score_for(&outcome, "m-flat", "p-a");
        assert_eq!(
            flat.source,
            ScoreSource::PanelFallback(FallbackReason::IdenticalRatings)
        );
    }

    #[rstest]
    fn empty_input_warns_instead_of_erroring() {
        let outcome =
            normalise_preferences(&[], &NormaliserConfig::default()).expect("empty input is fine");
        assert!(outcome.standardised.is_empty());
        assert_eq!(outcome.warnings, vec![NormalisationWarning::EmptyInput]);
    }

    #[rstest]
    fn out_of_range_score_is_rejected_not_clamped() {
        let prefs = vec![Preference::new("m-1", "p-a", 9.0, 30)];
        let err = normalise_preferences(&prefs, &NormaliserConfig::default())
            .expect_err("9.0 is outside the 1-5 scale");
        assert_eq!(err.code(), "rating_out_of_range");
    }

    #[rstest]
    fn excessive_fallbacks_degrade_quality() {
        let prefs = vec![
            Preference::new("m-1", "p-a", 5.0, 30),
            Preference::new("m-2", "p-a", 1.0, 30),
        ];
        let outcome =
            normalise_preferences(&prefs, &NormaliserConfig::default()).expect("normalise");
        assert!(!outcome.quality.valid);
        assert!(
            outcome
                .warnings
                .iter()
                .any(|w| matches!(w, NormalisationWarning::QualityDegraded { .. }))
        );
    }

    #[rstest]
    fn compressed_and_expansive_scales_equalise() {
        // Alice uses the top of the scale, Bob the bottom; after
        // standardisation their per-place influence matches.
        let prefs = vec![
            Preference::new("alice", "p-a", 4.5, 60),
            Preference::new("alice", "p-b", 4.0, 60),
            Preference::new("alice", "p-c", 5.0, 60),
            Preference::new("bob", "p-a", 1.5, 60),
            Preference::new("bob", "p-b", 1.0, 60),
            Preference::new("bob", "p-c", 2.0, 60),
        ];
        let outcome =
            normalise_preferences(&prefs, &NormaliserConfig::default()).expect("normalise");
        for place in ["p-a", "p-b", "p-c"] {
            let alice = score_for(&outcome, "alice", place).score;
            let bob = score_for(&outcome, "bob", place).score;
            assert!(
                (alice - bob).abs() < 1e-9,
                "scores for {place} should match: alice {alice}, bob {bob}"
            );
        }
    }
}
