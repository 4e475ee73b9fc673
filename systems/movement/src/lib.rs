#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! One-dimensional movement along a shared waypoint polyline.
//!
//! A [`PathFollower`] stores where an enemy is and which waypoint it is
//! heading for. The waypoint list itself is shared read-only between every
//! follower on the same map and is passed into each call.

use glam::Vec2;

/// Position and waypoint cursor of a single walker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathFollower {
    position: Vec2,
    next_waypoint: usize,
    reached_goal: bool,
}

impl PathFollower {
    /// Places a follower on the first waypoint, heading for the second.
    #[must_use]
    pub fn new(waypoints: &[Vec2]) -> Self {
        Self {
            position: waypoints.first().copied().unwrap_or(Vec2::ZERO),
            next_waypoint: 1,
            reached_goal: false,
        }
    }

    /// Places a follower at an arbitrary position with the provided cursor.
    ///
    /// The cursor is clamped to the waypoint count.
    #[must_use]
    pub fn resume_at(waypoints: &[Vec2], position: Vec2, next_waypoint: usize) -> Self {
        Self {
            position,
            next_waypoint: next_waypoint.min(waypoints.len()),
            reached_goal: false,
        }
    }

    /// Current world-space position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Index of the waypoint the follower is heading for.
    #[must_use]
    pub const fn next_waypoint(&self) -> usize {
        self.next_waypoint
    }

    /// Reports whether the follower arrived at the final waypoint.
    #[must_use]
    pub const fn reached_goal(&self) -> bool {
        self.reached_goal
    }

    /// Monotonic measure of how far along the polyline the follower is.
    ///
    /// Equals the cursor plus the fraction of the last unit of distance before
    /// the next waypoint that has already been covered.
    #[must_use]
    pub fn progress(&self, waypoints: &[Vec2]) -> f32 {
        match waypoints.get(self.next_waypoint) {
            Some(target) => {
                let remaining = self.position.distance(*target);
                self.next_waypoint as f32 + (1.0 - remaining.min(1.0))
            }
            None => waypoints.len() as f32,
        }
    }

    /// Moves `distance` world units along the polyline.
    ///
    /// Consumes as many waypoints as the distance allows within a single call.
    /// Passing the final waypoint marks the follower as arrived, after which
    /// further calls do nothing.
    pub fn advance(&mut self, waypoints: &[Vec2], distance: f32) {
        if self.reached_goal {
            return;
        }

        let mut remaining = distance;
        while remaining > 0.0 {
            let Some(target) = waypoints.get(self.next_waypoint).copied() else {
                break;
            };
            let to_target = target - self.position;
            let gap = to_target.length();
            if gap <= remaining {
                self.position = target;
                self.next_waypoint += 1;
                remaining -= gap;
            } else {
                self.position += to_target / gap * remaining;
                remaining = 0.0;
            }
        }

        if self.next_waypoint >= waypoints.len() {
            self.reached_goal = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(0.0, 2.0),
        ]
    }

    #[test]
    fn starts_on_first_waypoint() {
        let follower = PathFollower::new(&square());
        assert_eq!(follower.position(), Vec2::ZERO);
        assert_eq!(follower.next_waypoint(), 1);
        assert!(!follower.reached_goal());
    }

    #[test]
    fn consumes_several_waypoints_in_one_step() {
        let waypoints = square();
        let mut follower = PathFollower::new(&waypoints);
        follower.advance(&waypoints, 3.0);
        assert_eq!(follower.position(), Vec2::new(2.0, 1.0));
        assert_eq!(follower.next_waypoint(), 2);
    }

    #[test]
    fn overshoot_stops_at_goal() {
        let waypoints = square();
        let mut follower = PathFollower::new(&waypoints);
        follower.advance(&waypoints, 100.0);
        assert!(follower.reached_goal());
        assert_eq!(follower.position(), Vec2::new(0.0, 2.0));

        follower.advance(&waypoints, 1.0);
        assert_eq!(follower.position(), Vec2::new(0.0, 2.0));
    }

    #[test]
    fn progress_grows_with_distance() {
        let waypoints = square();
        let mut follower = PathFollower::new(&waypoints);
        let mut last = follower.progress(&waypoints);
        for _ in 0..12 {
            follower.advance(&waypoints, 0.5);
            let progress = follower.progress(&waypoints);
            assert!(progress >= last, "{progress} < {last}");
            last = progress;
        }
        assert_eq!(last, 4.0);
    }

    #[test]
    fn progress_counts_only_the_final_unit_of_a_segment() {
        let waypoints = square();
        let mut follower = PathFollower::new(&waypoints);
        assert_eq!(follower.progress(&waypoints), 1.0);
        follower.advance(&waypoints, 1.5);
        assert_eq!(follower.progress(&waypoints), 1.5);
    }

    #[test]
    fn resume_clamps_cursor() {
        let waypoints = square();
        let mut follower = PathFollower::resume_at(&waypoints, Vec2::new(1.0, 1.0), 99);
        assert_eq!(follower.next_waypoint(), 4);
        follower.advance(&waypoints, 0.1);
        assert!(follower.reached_goal());
    }

    #[test]
    fn single_waypoint_path_arrives_immediately() {
        let waypoints = vec![Vec2::new(3.0, 3.0)];
        let mut follower = PathFollower::new(&waypoints);
        follower.advance(&waypoints, 0.0);
        assert!(follower.reached_goal());
    }
}
