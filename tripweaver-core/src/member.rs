//! Trip members and their identity.

use serde::{Deserialize, Serialize};

/// A participant in a shared trip.
///
/// Members are created when they join a trip and are immutable for the
/// duration of an optimisation run.
///
/// # Examples
/// ```
/// use tripweaver_core::Member;
///
/// let member = Member::new("m-alice", "Alice", "#e74c3c");
/// assert_eq!(member.id, "m-alice");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Unique member identifier.
    pub id: String,
    /// Name shown in shared views.
    pub display_name: String,
    /// Colour tag used to attribute wishes in the itinerary.
    pub colour: String,
}

impl Member {
    /// Construct a member from its identity parts.
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        colour: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            colour: colour.into(),
        }
    }
}
