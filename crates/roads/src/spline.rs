//! Bezier splines: the drawable path behind every road segment.
//!
//! A spline is an ordered list of bezier points owned by one curve object.
//! The builder only ever creates `Vector` handles, which are re-derived from
//! the neighbouring points after each edit so the spline stays a polyline.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SplineId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandleType {
    #[default]
    Vector,
    Free,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BezierPoint {
    pub co: Vec3,
    pub handle_left: Vec3,
    pub handle_right: Vec3,
    pub handle_type: HandleType,
    pub tilt: f32,
    pub radius: f32,
}

impl BezierPoint {
    pub fn new(co: Vec3) -> Self {
        Self {
            co,
            handle_left: co,
            handle_right: co,
            handle_type: HandleType::Vector,
            tilt: 0.0,
            radius: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spline {
    /// Name of the curve object owning this spline.
    pub curve_object: String,
    pub points: Vec<BezierPoint>,
}

impl Spline {
    pub fn new(curve_object: impl Into<String>, first: Vec3) -> Self {
        Self {
            curve_object: curve_object.into(),
            points: vec![BezierPoint::new(first)],
        }
    }

    pub fn from_points(curve_object: impl Into<String>, points: Vec<BezierPoint>) -> Self {
        let mut spline = Self {
            curve_object: curve_object.into(),
            points,
        };
        spline.recalc_vector_handles();
        spline
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last_idx(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    pub fn is_endpoint(&self, idx: usize) -> bool {
        idx == 0 || idx == self.last_idx()
    }

    pub fn co(&self, idx: usize) -> Option<Vec3> {
        self.points.get(idx).map(|p| p.co)
    }

    pub fn first_co(&self) -> Option<Vec3> {
        self.points.first().map(|p| p.co)
    }

    pub fn last_co(&self) -> Option<Vec3> {
        self.points.last().map(|p| p.co)
    }

    /// Move point `idx` to `co`. Out of range indices are ignored.
    pub fn set_co(&mut self, idx: usize, co: Vec3) {
        if let Some(point) = self.points.get_mut(idx) {
            point.co = co;
        }
        self.recalc_vector_handles();
    }

    /// Append (or prepend) a point with vector handles, returning its index.
    pub fn add_point(&mut self, position: Vec3, prepend: bool) -> usize {
        let idx = if prepend {
            self.points.insert(0, BezierPoint::new(position));
            0
        } else {
            self.points.push(BezierPoint::new(position));
            self.points.len() - 1
        };
        self.recalc_vector_handles();
        idx
    }

    /// Split at `split_idx`. The point at `split_idx` ends up in both halves.
    pub fn split(&self, split_idx: usize) -> (Spline, Spline) {
        let split_idx = split_idx.min(self.last_idx());
        let left = self.points[..=split_idx].to_vec();
        let right = self.points[split_idx..].to_vec();
        (
            Spline::from_points(self.curve_object.clone(), left),
            Spline::from_points(self.curve_object.clone(), right),
        )
    }

    /// Join `first` and `second` into a new spline owned by `curve_object`.
    ///
    /// The two splines share one joint point, so the result has
    /// `first.len() + second.len() - 1` points. With `reverse` the points of
    /// `second` are taken back to front. With `prepend` `second` goes in front
    /// of `first`, otherwise behind it.
    pub fn join(
        curve_object: impl Into<String>,
        first: &Spline,
        second: &Spline,
        reverse: bool,
        prepend: bool,
    ) -> Spline {
        let mut tail: Vec<BezierPoint> = second.points.clone();
        if reverse {
            tail.reverse();
        }

        let points = if prepend {
            // Joint point comes from `second`, same as the host's overwrite order
            let mut points = tail;
            points.extend(first.points.iter().skip(1).cloned());
            points
        } else {
            let mut points: Vec<BezierPoint> =
                first.points[..first.last_idx()].to_vec();
            points.extend(tail);
            points
        };
        Spline::from_points(curve_object, points)
    }

    /// Total length of the polyline through all points.
    pub fn polyline_length(&self) -> f32 {
        self.points
            .windows(2)
            .map(|w| w[0].co.distance(w[1].co))
            .sum()
    }

    /// Place vector handles a third of the way towards each neighbour.
    pub fn recalc_vector_handles(&mut self) {
        let n = self.points.len();
        for i in 0..n {
            if self.points[i].handle_type != HandleType::Vector {
                continue;
            }
            let co = self.points[i].co;
            let prev = if i > 0 { self.points[i - 1].co } else { co };
            let next = if i + 1 < n { self.points[i + 1].co } else { co };
            self.points[i].handle_left = co + (prev - co) / 3.0;
            self.points[i].handle_right = co + (next - co) / 3.0;
        }
    }
}

/// Offsets `p1` towards `p2` by `s`. A zero direction leaves `p1` unchanged.
pub fn move_point_towards_other_point(p1: Vec3, p2: Vec3, s: f32) -> Vec3 {
    p1 + (p2 - p1).normalize_or_zero() * s
}

/// Index of the neighbour of an endpoint: `1` for the first point, `idx - 1`
/// for the last one.
pub fn endpoint_neighbor_idx(idx: usize) -> usize {
    if idx == 0 {
        1
    } else {
        idx - 1
    }
}

/// Arithmetic mean of `points`, `Vec3::ZERO` for an empty iterator.
pub fn mean_position(points: impl IntoIterator<Item = Vec3>) -> Vec3 {
    let mut sum = Vec3::ZERO;
    let mut n = 0u32;
    for p in points {
        sum += p;
        n += 1;
    }
    if n == 0 {
        Vec3::ZERO
    } else {
        sum / n as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> Spline {
        Spline::from_points(
            "road",
            (0..n)
                .map(|i| BezierPoint::new(Vec3::new(i as f32 * 10.0, 0.0, 0.0)))
                .collect(),
        )
    }

    fn xs(spline: &Spline) -> Vec<f32> {
        spline.points.iter().map(|p| p.co.x).collect()
    }

    #[test]
    fn test_split_shares_split_point() {
        let spline = line(5);
        let (left, right) = spline.split(2);
        assert_eq!(xs(&left), vec![0.0, 10.0, 20.0]);
        assert_eq!(xs(&right), vec![20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_join_append() {
        let (left, right) = line(5).split(2);
        let joined = Spline::join("road", &left, &right, false, false);
        assert_eq!(xs(&joined), xs(&line(5)));
    }

    #[test]
    fn test_join_append_reversed() {
        let a = line(3);
        let b = Spline::from_points(
            "road",
            vec![
                BezierPoint::new(Vec3::new(50.0, 0.0, 0.0)),
                BezierPoint::new(Vec3::new(20.0, 0.0, 0.0)),
            ],
        );
        let joined = Spline::join("road", &a, &b, true, false);
        assert_eq!(xs(&joined), vec![0.0, 10.0, 20.0, 50.0]);
    }

    #[test]
    fn test_join_prepend_reversed() {
        // first = [0, 10], second's first point touches first's first point
        let a = line(2);
        let b = Spline::from_points(
            "road",
            vec![
                BezierPoint::new(Vec3::new(0.0, 0.0, 0.0)),
                BezierPoint::new(Vec3::new(-10.0, 0.0, 0.0)),
                BezierPoint::new(Vec3::new(-20.0, 0.0, 0.0)),
            ],
        );
        let joined = Spline::join("road", &a, &b, true, true);
        assert_eq!(xs(&joined), vec![-20.0, -10.0, 0.0, 10.0]);
        assert_eq!(joined.len(), a.len() + b.len() - 1);
    }

    #[test]
    fn test_add_point_prepend_shifts_points() {
        let mut spline = line(2);
        let idx = spline.add_point(Vec3::new(-10.0, 0.0, 0.0), true);
        assert_eq!(idx, 0);
        assert_eq!(xs(&spline), vec![-10.0, 0.0, 10.0]);
    }

    #[test]
    fn test_vector_handles_point_towards_neighbours() {
        let spline = line(3);
        let mid = &spline.points[1];
        assert!((mid.handle_left - Vec3::new(10.0 - 10.0 / 3.0, 0.0, 0.0)).length() < 1e-5);
        assert!((mid.handle_right - Vec3::new(10.0 + 10.0 / 3.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_move_point_towards_other_point() {
        let moved = move_point_towards_other_point(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 3.0);
        assert!((moved - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-6);

        let backwards =
            move_point_towards_other_point(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), -6.0);
        assert!((backwards - Vec3::new(-6.0, 0.0, 0.0)).length() < 1e-6);

        let same = move_point_towards_other_point(Vec3::ONE, Vec3::ONE, 5.0);
        assert_eq!(same, Vec3::ONE);
    }

    #[test]
    fn test_endpoint_neighbor_idx() {
        assert_eq!(endpoint_neighbor_idx(0), 1);
        assert_eq!(endpoint_neighbor_idx(4), 3);
    }

    #[test]
    fn test_mean_position() {
        let mean = mean_position([Vec3::ZERO, Vec3::new(2.0, 4.0, 6.0)]);
        assert_eq!(mean, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(mean_position(std::iter::empty()), Vec3::ZERO);
    }

    #[test]
    fn test_polyline_length() {
        assert!((line(4).polyline_length() - 30.0).abs() < 1e-5);
    }
}
