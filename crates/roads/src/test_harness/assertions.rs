//! Assertion helpers for `TestRoads` integration tests.

use super::TestRoads;

impl TestRoads {
    // -----------------------------------------------------------------------
    // Assertions
    // -----------------------------------------------------------------------

    /// Assert every crossroad adjacency is indexed back to its crossroad and
    /// points at a known segment whose spline still exists.
    pub fn assert_network_consistent(&self) {
        let network = self.network();
        let problems = network.check_consistency();
        assert!(problems.is_empty(), "Inconsistent road network: {problems:?}");
        for segment in network.segments() {
            assert!(
                !segment.is_corrupted(self.scene()),
                "Segment {segment} has no spline"
            );
        }
    }

    pub fn assert_counts(&self, segments: usize, crossroads: usize) {
        let network = self.network();
        assert_eq!(
            (network.segment_count(), network.crossroad_count()),
            (segments, crossroads),
            "Expected {segments} segments and {crossroads} crossroads"
        );
    }

    pub fn assert_running(&self) {
        assert!(self.is_running(), "Expected the operator lock to be held");
        assert!(self.session().is_active(), "Expected an active session");
    }

    pub fn assert_not_running(&self) {
        assert!(!self.is_running(), "Expected the operator lock to be free");
        assert!(!self.session().is_active(), "Expected no active session");
    }
}
