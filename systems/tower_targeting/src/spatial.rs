//! X-sorted snapshot of targets answering nearest and radius queries.

use glam::Vec3;
use warden_defence_core::{planar_distance_sq, Target};

/// Targets sorted by ascending x-coordinate.
///
/// The index is rebuilt wholesale once per tick and read-only afterwards.
/// Queries binary-search to the centre's x-coordinate and scan outward in
/// both directions, stopping once the x-gap alone exceeds the current bound.
#[derive(Clone, Debug, Default)]
pub struct SpatialIndex {
    targets: Vec<Target>,
}

impl SpatialIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the contents with a fresh sort of `targets`.
    ///
    /// Targets sharing an x-coordinate keep their input order.
    pub fn rebuild<I>(&mut self, targets: I)
    where
        I: IntoIterator<Item = Target>,
    {
        self.targets.clear();
        self.targets.extend(targets);
        self.targets
            .sort_by(|a, b| a.position.x.total_cmp(&b.position.x));
    }

    /// Number of indexed targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Reports whether the index holds no targets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Indexed targets in ascending x order.
    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter()
    }

    /// Closest target within `max_range_sq` of `center` accepted by `predicate`.
    ///
    /// Distances are squared and planar. The predicate receives the target and
    /// its squared distance; on equal distances the first target scanned wins,
    /// scanning rightward from the centre before leftward.
    pub fn nearest_in_range<P>(
        &self,
        center: Vec3,
        max_range_sq: f32,
        mut predicate: P,
    ) -> Option<Target>
    where
        P: FnMut(&Target, f32) -> bool,
    {
        let split = self.split(center);
        let mut best: Option<(Target, f32)> = None;

        let mut consider = |target: &Target, best: &mut Option<(Target, f32)>| -> bool {
            let bound = best.map_or(max_range_sq, |(_, distance)| distance);
            let dx = target.position.x - center.x;
            if dx * dx > bound {
                return false;
            }

            let distance_sq = planar_distance_sq(center, target.position);
            if distance_sq > max_range_sq {
                return true;
            }
            let improves = best.map_or(true, |(_, distance)| distance_sq < distance);
            if improves && predicate(target, distance_sq) {
                *best = Some((*target, distance_sq));
            }
            true
        };

        for target in &self.targets[split..] {
            if !consider(target, &mut best) {
                break;
            }
        }
        for target in self.targets[..split].iter().rev() {
            if !consider(target, &mut best) {
                break;
            }
        }

        best.map(|(target, _)| target)
    }

    /// Invokes `visit` for every target within `radius_sq` of `center`.
    ///
    /// Visits rightward from the centre first, then leftward.
    pub fn all_in_radius<V>(&self, center: Vec3, radius_sq: f32, mut visit: V)
    where
        V: FnMut(&Target, f32),
    {
        let split = self.split(center);
        let mut scan = |target: &Target| -> bool {
            let dx = target.position.x - center.x;
            if dx * dx > radius_sq {
                return false;
            }
            let distance_sq = planar_distance_sq(center, target.position);
            if distance_sq <= radius_sq {
                visit(target, distance_sq);
            }
            true
        };

        for target in &self.targets[split..] {
            if !scan(target) {
                break;
            }
        }
        for target in self.targets[..split].iter().rev() {
            if !scan(target) {
                break;
            }
        }
    }

    fn split(&self, center: Vec3) -> usize {
        self.targets
            .partition_point(|target| target.position.x < center.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_defence_core::TargetHandle;

    fn target(handle: u32, x: f32, z: f32) -> Target {
        Target {
            position: Vec3::new(x, 0.0, z),
            handle: TargetHandle::new(handle),
        }
    }

    fn index(targets: &[Target]) -> SpatialIndex {
        let mut index = SpatialIndex::new();
        index.rebuild(targets.iter().copied());
        index
    }

    #[test]
    fn rebuild_sorts_by_x() {
        let index = index(&[target(0, 5.0, 0.0), target(1, -2.0, 0.0), target(2, 1.0, 0.0)]);

        let xs: Vec<f32> = index.iter().map(|target| target.position.x).collect();
        assert_eq!(xs, vec![-2.0, 1.0, 5.0]);
    }

    #[test]
    fn empty_index_finds_nothing() {
        let index = SpatialIndex::new();
        let mut visited = 0;

        assert!(index
            .nearest_in_range(Vec3::ZERO, 100.0, |_, _| true)
            .is_none());
        index.all_in_radius(Vec3::ZERO, 100.0, |_, _| visited += 1);
        assert_eq!(visited, 0);
    }

    #[test]
    fn nearest_picks_closest_on_either_side() {
        let index = index(&[
            target(0, -1.0, 0.0),
            target(1, 3.0, 0.0),
            target(2, 0.5, 2.0),
        ]);

        let found = index.nearest_in_range(Vec3::ZERO, 25.0, |_, _| true);

        assert_eq!(found.map(|target| target.handle), Some(TargetHandle::new(0)));
    }

    #[test]
    fn nearest_ignores_height() {
        let mut high = target(0, 1.0, 0.0);
        high.position.y = 50.0;
        let index = index(&[high, target(1, 2.0, 0.0)]);

        let found = index.nearest_in_range(Vec3::ZERO, 9.0, |_, _| true);

        assert_eq!(found.map(|target| target.handle), Some(TargetHandle::new(0)));
    }

    #[test]
    fn nearest_respects_range_and_predicate() {
        let index = index(&[target(0, 1.0, 0.0), target(1, 2.0, 0.0), target(2, 9.0, 0.0)]);

        let filtered = index.nearest_in_range(Vec3::ZERO, 25.0, |target, _| {
            target.handle != TargetHandle::new(0)
        });
        let out_of_range = index.nearest_in_range(Vec3::new(20.0, 0.0, 0.0), 4.0, |_, _| true);

        assert_eq!(filtered.map(|target| target.handle), Some(TargetHandle::new(1)));
        assert!(out_of_range.is_none());
    }

    #[test]
    fn first_scanned_wins_ties() {
        let index = index(&[target(0, -2.0, 0.0), target(1, 2.0, 0.0)]);

        let found = index.nearest_in_range(Vec3::ZERO, 16.0, |_, _| true);

        assert_eq!(found.map(|target| target.handle), Some(TargetHandle::new(1)));
    }

    #[test]
    fn pruning_stops_scan_once_x_gap_exceeds_best() {
        let index = index(&[
            target(0, 0.5, 0.0),
            target(1, 1.0, 0.0),
            target(2, 2.0, 0.0),
            target(3, 3.0, 0.0),
        ]);
        let mut evaluated = Vec::new();

        let found = index.nearest_in_range(Vec3::ZERO, 100.0, |target, _| {
            evaluated.push(target.handle.get());
            true
        });

        assert_eq!(found.map(|target| target.handle), Some(TargetHandle::new(0)));
        assert_eq!(evaluated, vec![0]);
    }

    #[test]
    fn all_in_radius_visits_every_match() {
        let index = index(&[
            target(0, -1.0, 0.0),
            target(1, 0.0, 1.0),
            target(2, 1.0, 1.0),
            target(3, 4.0, 0.0),
        ]);
        let mut visited = Vec::new();

        index.all_in_radius(Vec3::ZERO, 2.0, |target, _| visited.push(target.handle.get()));

        visited.sort_unstable();
        assert_eq!(visited, vec![0, 1, 2]);
    }
}
