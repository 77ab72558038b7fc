//! Spatial classification cascade: outer locality, inner locality, frustum.

use crate::math::{Aabb, Intersection};

use super::services::{FrustumProvider, LocalityProvider};

/// Ordered classification of a boundary; each state implies all weaker ones.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LocalityState {
    #[default]
    Initial = 0,
    OutsideOuter = 1,
    IntersectOuter = 2,
    IntersectInner = 3,
    IntersectFrustum = 4,
}

impl LocalityState {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// Where the cascade stopped for one evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CascadeOutcome {
    /// Outer radius failed; nothing else was tested.
    OutsideOuter,
    /// Inside the outer radius only; frustum was not tested.
    OutsideInner,
    /// Inside the inner radius, but the frustum rejected the box.
    OutsideFrustum,
    /// Inside or intersecting the frustum.
    InsideFrustum,
}

impl CascadeOutcome {
    /// State reported for this outcome. Frustum rejection has no state of its
    /// own and reports the last stage that passed.
    pub fn state(self) -> LocalityState {
        match self {
            CascadeOutcome::OutsideOuter => LocalityState::OutsideOuter,
            CascadeOutcome::OutsideInner => LocalityState::IntersectOuter,
            CascadeOutcome::OutsideFrustum => LocalityState::IntersectInner,
            CascadeOutcome::InsideFrustum => LocalityState::IntersectFrustum,
        }
    }

    /// Whether the subtree below the boundary is visited this frame.
    pub fn visits_children(self) -> bool {
        matches!(self, CascadeOutcome::OutsideInner | CascadeOutcome::InsideFrustum)
    }
}

/// Run the cascade. Later stages are only consulted when earlier ones pass.
pub fn run_cascade(
    view_box: &Aabb,
    locality: &dyn LocalityProvider,
    frustum: &dyn FrustumProvider,
) -> CascadeOutcome {
    if !locality.test_outer_radius(view_box) {
        return CascadeOutcome::OutsideOuter;
    }
    if !locality.test_inner_radius(view_box) {
        return CascadeOutcome::OutsideInner;
    }
    match frustum.test_intersection(view_box) {
        Intersection::Inside | Intersection::Intersecting => CascadeOutcome::InsideFrustum,
        Intersection::Outside => CascadeOutcome::OutsideFrustum,
    }
}

/// A state change produced by one evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateTransition {
    pub previous: LocalityState,
    pub current: LocalityState,
}

/// Pure transition: the new state, and the change if there was one.
pub fn transition(
    previous: LocalityState,
    outcome: CascadeOutcome,
) -> (LocalityState, Option<StateTransition>) {
    let current = outcome.state();
    let change = (current != previous).then_some(StateTransition { previous, current });
    (current, change)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::DVec3;
    use crate::scene::services::testing::{ScriptedFrustum, ScriptedLocality};

    fn unit_box() -> Aabb {
        Aabb::new(DVec3::ZERO, DVec3::ONE)
    }

    #[test]
    fn test_state_ordering() {
        assert!(LocalityState::Initial < LocalityState::OutsideOuter);
        assert!(LocalityState::OutsideOuter < LocalityState::IntersectOuter);
        assert!(LocalityState::IntersectOuter < LocalityState::IntersectInner);
        assert!(LocalityState::IntersectInner < LocalityState::IntersectFrustum);
        assert_eq!(LocalityState::IntersectFrustum.as_i32(), 4);
        assert_eq!(LocalityState::default(), LocalityState::Initial);
    }

    #[test]
    fn test_outer_failure_short_circuits() {
        let locality = ScriptedLocality::new(false, true);
        let frustum = ScriptedFrustum::new(Intersection::Inside, 100.0);

        let outcome = run_cascade(&unit_box(), &locality, &frustum);

        assert_eq!(outcome, CascadeOutcome::OutsideOuter);
        assert!(!outcome.visits_children());
        assert_eq!(locality.outer_calls.get(), 1);
        assert_eq!(locality.inner_calls.get(), 0);
        assert_eq!(frustum.test_calls.get(), 0);
        assert_eq!(frustum.size_calls.get(), 0);
    }

    #[test]
    fn test_inner_failure_skips_frustum_but_visits() {
        let locality = ScriptedLocality::new(true, false);
        let frustum = ScriptedFrustum::new(Intersection::Outside, 100.0);

        let outcome = run_cascade(&unit_box(), &locality, &frustum);

        assert_eq!(outcome, CascadeOutcome::OutsideInner);
        assert_eq!(outcome.state(), LocalityState::IntersectOuter);
        assert!(outcome.visits_children());
        assert_eq!(frustum.test_calls.get(), 0);
    }

    #[test]
    fn test_inside_and_intersecting_are_not_distinguished() {
        let locality = ScriptedLocality::new(true, true);
        for result in [Intersection::Inside, Intersection::Intersecting] {
            let frustum = ScriptedFrustum::new(result, 100.0);
            let outcome = run_cascade(&unit_box(), &locality, &frustum);
            assert_eq!(outcome, CascadeOutcome::InsideFrustum);
            assert_eq!(outcome.state(), LocalityState::IntersectFrustum);
            assert_eq!(frustum.test_calls.get(), 1);
        }
    }

    #[test]
    fn test_frustum_rejection_reports_inner() {
        let locality = ScriptedLocality::new(true, true);
        let frustum = ScriptedFrustum::new(Intersection::Outside, 100.0);

        let outcome = run_cascade(&unit_box(), &locality, &frustum);

        assert_eq!(outcome, CascadeOutcome::OutsideFrustum);
        assert_eq!(outcome.state(), LocalityState::IntersectInner);
        assert!(!outcome.visits_children());
    }

    #[test]
    fn test_transition_reports_only_changes() {
        let (state, change) = transition(LocalityState::Initial, CascadeOutcome::InsideFrustum);
        assert_eq!(state, LocalityState::IntersectFrustum);
        assert_eq!(
            change,
            Some(StateTransition {
                previous: LocalityState::Initial,
                current: LocalityState::IntersectFrustum,
            })
        );

        let (state, change) = transition(state, CascadeOutcome::InsideFrustum);
        assert_eq!(state, LocalityState::IntersectFrustum);
        assert_eq!(change, None);

        let (state, change) = transition(state, CascadeOutcome::OutsideOuter);
        assert_eq!(state, LocalityState::OutsideOuter);
        assert!(change.is_some());
    }
}
