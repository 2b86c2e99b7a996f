//! Fair place selection.
//!
//! Round-based greedy selection balancing aggregate desirability against
//! member representation. Each round scores every remaining candidate as
//! `(1 - w) * wish + w * fairness_impact` and takes the single best,
//! where the fairness impact rewards candidates whose contributors are
//! under-represented relative to the group's running selection ratio.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tripweaver_core::{Contribution, Member, Place, Preference, SelectedPlace, StandardisedPreference};

/// Selection parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionParams {
    /// Upper bound on competed (non-system) places.
    pub max_places: usize,
    /// Balance between desirability and fairness, in `[0, 1]`.
    pub fairness_weight: f64,
}

/// A member's representation in the final selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberFairness {
    /// Member described.
    pub member_id: String,
    /// Number of candidate places the member rated.
    pub owned_places: usize,
    /// Weighted count of selections the member contributed to.
    pub selected_weight: f64,
    /// `selected_weight / owned_places`; the running selection ratio.
    pub ratio: f64,
}

/// Selected places plus fairness accounting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionOutcome {
    /// Chosen places: system-owned first (round zero), then competed
    /// places in selection order.
    pub selected: Vec<SelectedPlace>,
    /// Per-member fairness figures, ordered by member id.
    pub member_fairness: Vec<MemberFairness>,
    /// Group fairness `exp(-variance(ratios))` in `(0, 1]`.
    pub fairness_score: f64,
}

/// Choose up to `max_places` candidates, balancing desirability and
/// fairness.
///
/// System-owned departure/destination places are always included, never
/// compete, and do not consume the budget. If at least one candidate
/// exists, at least one is selected: no fairness threshold can empty the
/// result.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use tripweaver_core::{Member, Place, Preference, StandardisedPreference, ScoreSource};
/// use tripweaver_scoring::{SelectionParams, select_places};
///
/// let places = vec![Place::new("p-a", "A", Coord { x: 0.0, y: 0.0 }, "poi")];
/// let members = vec![Member::new("m-1", "Ada", "#111111")];
/// let standardised = vec![StandardisedPreference {
///     member_id: "m-1".into(),
///     place_id: "p-a".into(),
///     score: 1.0,
///     source: ScoreSource::MemberScale,
/// }];
/// let preferences = vec![Preference::new("m-1", "p-a", 5.0, 60)];
/// let outcome = select_places(
///     &places,
///     &standardised,
///     &preferences,
///     &members,
///     &SelectionParams { max_places: 3, fairness_weight: 0.5 },
/// );
/// assert_eq!(outcome.selected.len(), 1);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "selection blends floating-point scores"
)]
pub fn select_places(
    places: &[Place],
    standardised: &[StandardisedPreference],
    preferences: &[Preference],
    members: &[Member],
    params: &SelectionParams,
) -> SelectionOutcome {
    let mut selected: Vec<SelectedPlace> = places
        .iter()
        .filter(|p| p.is_system_owned())
        .map(|p| SelectedPlace {
            place: p.clone(),
            selection_round: 0,
            selection_score: 0.0,
            contributors: Vec::new(),
        })
        .collect();
    selected.sort_by(|a, b| a.place.id.cmp(&b.place.id));

    let mut candidates: Vec<Candidate> = places
        .iter()
        .filter(|p| !p.is_system_owned())
        .filter_map(|p| Candidate::assemble(p, standardised, preferences))
        .collect();
    candidates.sort_by(|a, b| a.place.id.cmp(&b.place.id));
    let wish_scores = normalised_wish_scores(&candidates);

    let mut ledger = FairnessLedger::new(members, &candidates);
    let mut round = 0_u32;
    while round < u32::try_from(params.max_places).unwrap_or(u32::MAX) && !candidates.is_empty() {
        round += 1;
        let Some(winner_index) = best_candidate(&candidates, &wish_scores, &ledger, params) else {
            break;
        };
        let candidate = candidates.remove(winner_index);
        let combined = combined_score(&candidate, &wish_scores, &ledger, params);
        ledger.record(&candidate);
        selected.push(candidate.into_selected(round, combined));
    }

    let member_fairness = ledger.into_fairness();
    let fairness_score = group_fairness(&member_fairness);
    SelectionOutcome {
        selected,
        member_fairness,
        fairness_score,
    }
}

/// A candidate place with its interested members.
#[derive(Debug, Clone)]
struct Candidate {
    place: Place,
    /// Total standardised desirability across interested members.
    desirability: f64,
    /// Contribution weights per member, normalised to sum to one.
    contributors: Vec<Contribution>,
}

impl Candidate {
    /// Build a candidate from the preferences touching `place`.
    ///
    /// Places nobody rated yield `None`; they cannot compete.
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "contribution weights are normalised shares"
    )]
    fn assemble(
        place: &Place,
        standardised: &[StandardisedPreference],
        preferences: &[Preference],
    ) -> Option<Self> {
        let scores: Vec<&StandardisedPreference> = standardised
            .iter()
            .filter(|s| s.place_id == place.id)
            .collect();
        if scores.is_empty() {
            return None;
        }
        let desirability = scores.iter().map(|s| s.score).sum::<f64>();

        // Positive shares of interest; uniform when nobody is positive.
        let positive_total: f64 = scores.iter().map(|s| s.score.max(0.0)).sum();
        let uniform = 1.0 / scores.len() as f64;
        let mut contributors: Vec<Contribution> = scores
            .iter()
            .map(|s| {
                let weight = if positive_total > 0.0 {
                    s.score.max(0.0) / positive_total
                } else {
                    uniform
                };
                let wish = preferences
                    .iter()
                    .find(|p| p.place_id == place.id && p.member_id == s.member_id);
                Contribution {
                    member_id: s.member_id.clone(),
                    weight,
                    favourite: wish.is_some_and(|p| p.favourite),
                    requested_minutes: wish.map_or(0, |p| p.requested_minutes),
                }
            })
            .collect();
        contributors.sort_by(|a, b| a.member_id.cmp(&b.member_id));
        Some(Self {
            place: place.clone(),
            desirability,
            contributors,
        })
    }

    fn into_selected(self, round: u32, score: f64) -> SelectedPlace {
        SelectedPlace {
            place: self.place,
            selection_round: round,
            selection_score: score,
            contributors: self.contributors,
        }
    }
}

/// Min-max normalise candidate desirability to `[0, 1]`.
///
/// A flat field (all candidates equally desirable) maps to 0.5 so the
/// fairness term alone decides.
#[expect(
    clippy::float_arithmetic,
    reason = "min-max normalisation over candidate scores"
)]
fn normalised_wish_scores(candidates: &[Candidate]) -> BTreeMap<String, f64> {
    let min = candidates
        .iter()
        .map(|c| c.desirability)
        .fold(f64::INFINITY, f64::min);
    let max = candidates
        .iter()
        .map(|c| c.desirability)
        .fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    candidates
        .iter()
        .map(|c| {
            let wish = if span > 0.0 {
                (c.desirability - min) / span
            } else {
                0.5
            };
            (c.place.id.clone(), wish)
        })
        .collect()
}

/// Running per-member selection counts.
#[derive(Debug, Clone)]
struct FairnessLedger {
    /// member id -> (owned candidate places, weighted selected count).
    counts: BTreeMap<String, (usize, f64)>,
}

impl FairnessLedger {
    fn new(members: &[Member], candidates: &[Candidate]) -> Self {
        let mut counts: BTreeMap<String, (usize, f64)> = members
            .iter()
            .map(|m| (m.id.clone(), (0_usize, 0.0_f64)))
            .collect();
        for candidate in candidates {
            for contribution in &candidate.contributors {
                if let Some(entry) = counts.get_mut(&contribution.member_id) {
                    entry.0 += 1;
                }
            }
        }
        Self { counts }
    }

    /// Selection ratio for one member; zero when they own nothing.
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "ratio of weighted selections to owned places"
    )]
    fn ratio(&self, member_id: &str) -> f64 {
        self.counts
            .get(member_id)
            .filter(|(owned, _)| *owned > 0)
            .map_or(0.0, |(owned, selected)| selected / *owned as f64)
    }

    /// Mean selection ratio over members owning at least one candidate.
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "mean over member ratios"
    )]
    fn average_ratio(&self) -> f64 {
        let owners: Vec<f64> = self
            .counts
            .iter()
            .filter(|(_, (owned, _))| *owned > 0)
            .map(|(id, _)| self.ratio(id))
            .collect();
        if owners.is_empty() {
            0.0
        } else {
            owners.iter().sum::<f64>() / owners.len() as f64
        }
    }

    /// How much selecting `candidate` would help under-represented
    /// members, mapped to `[0, 1]`.
    #[expect(
        clippy::float_arithmetic,
        reason = "fairness impact is a weighted deficit sum"
    )]
    fn impact(&self, candidate: &Candidate) -> f64 {
        let average = self.average_ratio();
        let deficit: f64 = candidate
            .contributors
            .iter()
            .map(|c| c.weight * (average - self.ratio(&c.member_id)))
            .sum();
        ((deficit + 1.0) / 2.0).clamp(0.0, 1.0)
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "weighted selection counts accumulate contribution shares"
    )]
    fn record(&mut self, candidate: &Candidate) {
        for contribution in &candidate.contributors {
            if let Some(entry) = self.counts.get_mut(&contribution.member_id) {
                entry.1 += contribution.weight;
            }
        }
    }

    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "final ratios divide weighted counts by owned places"
    )]
    fn into_fairness(self) -> Vec<MemberFairness> {
        self.counts
            .into_iter()
            .map(|(member_id, (owned, selected))| {
                let ratio = if owned > 0 {
                    selected / owned as f64
                } else {
                    0.0
                };
                MemberFairness {
                    member_id,
                    owned_places: owned,
                    selected_weight: selected,
                    ratio,
                }
            })
            .collect()
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "combined score blends wish and fairness terms"
)]
fn combined_score(
    candidate: &Candidate,
    wish_scores: &BTreeMap<String, f64>,
    ledger: &FairnessLedger,
    params: &SelectionParams,
) -> f64 {
    let wish = wish_scores.get(&candidate.place.id).copied().unwrap_or(0.0);
    (1.0 - params.fairness_weight) * wish + params.fairness_weight * ledger.impact(candidate)
}

/// Index of the highest-scoring candidate; ties break on lexical place
/// id, which the pre-sorted candidate list provides for free.
fn best_candidate(
    candidates: &[Candidate],
    wish_scores: &BTreeMap<String, f64>,
    ledger: &FairnessLedger,
    params: &SelectionParams,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        let score = combined_score(candidate, wish_scores, ledger, params);
        let better = best.is_none_or(|(_, best_score)| score > best_score);
        if better {
            best = Some((index, score));
        }
    }
    best.map(|(index, _)| index)
}

/// Group fairness `exp(-variance(ratios))` over members owning places.
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "variance of member ratios"
)]
fn group_fairness(member_fairness: &[MemberFairness]) -> f64 {
    let ratios: Vec<f64> = member_fairness
        .iter()
        .filter(|m| m.owned_places > 0)
        .map(|m| m.ratio)
        .collect();
    if ratios.is_empty() {
        return 1.0;
    }
    let n = ratios.len() as f64;
    let mean = ratios.iter().sum::<f64>() / n;
    let variance = ratios.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / n;
    (-variance).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;
    use rstest::rstest;
    use tripweaver_core::{PlaceRole, ScoreSource};

    fn place(id: &str) -> Place {
        Place::new(id, id.to_uppercase(), Coord { x: 0.0, y: 0.0 }, "poi")
    }

    fn pref(member: &str, place_id: &str, score: f64) -> StandardisedPreference {
        StandardisedPreference {
            member_id: member.into(),
            place_id: place_id.into(),
            score,
            source: ScoreSource::MemberScale,
        }
    }

    fn params(max_places: usize, fairness_weight: f64) -> SelectionParams {
        SelectionParams {
            max_places,
            fairness_weight,
        }
    }

    #[rstest]
    fn respects_the_place_budget() {
        let places = vec![place("p-a"), place("p-b"), place("p-c")];
        let members = vec![Member::new("m-1", "Ada", "#111111")];
        let standardised = vec![
            pref("m-1", "p-a", 1.0),
            pref("m-1", "p-b", 0.5),
            pref("m-1", "p-c", -0.5),
        ];
        let preferences = vec![
            Preference::new("m-1", "p-a", 5.0, 60),
            Preference::new("m-1", "p-b", 4.0, 60),
            Preference::new("m-1", "p-c", 2.0, 60),
        ];
        let outcome = select_places(
            &places,
            &standardised,
            &preferences,
            &members,
            &params(2, 0.5),
        );
        assert_eq!(outcome.selected.len(), 2);
    }

    #[rstest]
    fn system_places_bypass_the_budget() {
        let mut places = vec![place("p-a")];
        places.push(Place::with_role(
            "p-hotel",
            "Hotel",
            Coord { x: 0.0, y: 0.0 },
            "hotel",
            PlaceRole::Departure,
        ));
        let members = vec![Member::new("m-1", "Ada", "#111111")];
        let standardised = vec![pref("m-1", "p-a", 1.0)];
        let preferences = vec![Preference::new("m-1", "p-a", 5.0, 60)];
        let outcome = select_places(
            &places,
            &standardised,
            &preferences,
            &members,
            &params(1, 0.5),
        );
        assert_eq!(outcome.selected.len(), 2);
        let hotel = outcome
            .selected
            .iter()
            .find(|s| s.place.id == "p-hotel")
            .expect("hotel included");
        assert_eq!(hotel.selection_round, 0);
    }

    #[rstest]
    fn selects_at_least_one_candidate_when_any_exists() {
        // A single member owning everything is maximally "over-represented"
        // after the first pick, yet selection must never come up empty.
        let places = vec![place("p-a")];
        let members = vec![Member::new("m-1", "Ada", "#111111")];
        let standardised = vec![pref("m-1", "p-a", -2.0)];
        let preferences = vec![Preference::new("m-1", "p-a", 1.0, 60)];
        let outcome = select_places(
            &places,
            &standardised,
            &preferences,
            &members,
            &params(5, 1.0),
        );
        assert_eq!(outcome.selected.len(), 1);
    }

    #[rstest]
    fn unrated_places_cannot_compete() {
        let places = vec![place("p-a"), place("p-ghost")];
        let members = vec![Member::new("m-1", "Ada", "#111111")];
        let standardised = vec![pref("m-1", "p-a", 1.0)];
        let preferences = vec![Preference::new("m-1", "p-a", 5.0, 60)];
        let outcome = select_places(
            &places,
            &standardised,
            &preferences,
            &members,
            &params(5, 0.0),
        );
        assert!(outcome.selected.iter().all(|s| s.place.id != "p-ghost"));
    }

    #[rstest]
    fn fairness_weight_rebalances_towards_underdog() {
        // Alice's wishes dominate on raw desirability; with a high
        // fairness weight Bob still lands one of his places.
        let places = vec![place("p-a1"), place("p-a2"), place("p-b1")];
        let members = vec![
            Member::new("alice", "Alice", "#111111"),
            Member::new("bob", "Bob", "#222222"),
        ];
        let standardised = vec![
            pref("alice", "p-a1", 1.4),
            pref("alice", "p-a2", 1.0),
            pref("bob", "p-b1", 0.9),
        ];
        let preferences = vec![
            Preference::new("alice", "p-a1", 5.0, 60),
            Preference::new("alice", "p-a2", 4.5, 60),
            Preference::new("bob", "p-b1", 4.0, 60),
        ];
        let outcome = select_places(
            &places,
            &standardised,
            &preferences,
            &members,
            &params(2, 0.6),
        );
        assert!(
            outcome.selected.iter().any(|s| s.place.id == "p-b1"),
            "bob's place should be selected under fairness weighting"
        );
    }

    #[rstest]
    fn perfectly_even_selection_scores_one() {
        let places = vec![place("p-a"), place("p-b")];
        let members = vec![
            Member::new("m-1", "Ada", "#111111"),
            Member::new("m-2", "Bea", "#222222"),
        ];
        let standardised = vec![pref("m-1", "p-a", 1.0), pref("m-2", "p-b", 1.0)];
        let preferences = vec![
            Preference::new("m-1", "p-a", 5.0, 60),
            Preference::new("m-2", "p-b", 5.0, 60),
        ];
        let outcome = select_places(
            &places,
            &standardised,
            &preferences,
            &members,
            &params(2, 0.5),
        );
        assert!((outcome.fairness_score - 1.0).abs() < 1e-9);
    }

    #[rstest]
    fn ties_break_on_lexical_place_id() {
        let places = vec![place("p-b"), place("p-a")];
        let members = vec![Member::new("m-1", "Ada", "#111111")];
        let standardised = vec![pref("m-1", "p-a", 1.0), pref("m-1", "p-b", 1.0)];
        let preferences = vec![
            Preference::new("m-1", "p-a", 5.0, 60),
            Preference::new("m-1", "p-b", 5.0, 60),
        ];
        let outcome = select_places(
            &places,
            &standardised,
            &preferences,
            &members,
            &params(1, 0.0),
        );
        let first = outcome.selected.first().expect("one selection");
        assert_eq!(first.place.id, "p-a");
    }
}
