//! Edge routing between rendered node boxes.
//!
//! Runs after the consumer has laid out the layered rows on screen: for
//! every retained parent/child edge it turns the two bounding boxes into
//! a cubic Bezier and an arrowhead orientation. Pure geometry — no graph
//! semantics, recomputed whenever a box moves.

use serde::{Deserialize, Serialize};

/// A point in consumer pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box of a rendered node. Boxes come from laid-out
/// visual elements and are assumed to have nonzero size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

/// A routed edge: one cubic Bezier segment plus the arrowhead rotation
/// at its endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgePath {
    pub start: Point,
    pub c1: Point,
    pub c2: Point,
    pub end: Point,
    /// Rotation of the arrowhead in radians, along the curve tangent at
    /// the endpoint.
    pub angle: f64,
}

impl EdgePath {
    /// Evaluate the curve at `t ∈ [0, 1]`.
    pub fn point_at(&self, t: f64) -> Point {
        let u = 1.0 - t;
        let b0 = u * u * u;
        let b1 = 3.0 * u * u * t;
        let b2 = 3.0 * u * t * t;
        let b3 = t * t * t;
        Point::new(
            b0 * self.start.x + b1 * self.c1.x + b2 * self.c2.x + b3 * self.end.x,
            b0 * self.start.y + b1 * self.c1.y + b2 * self.c2.y + b3 * self.end.y,
        )
    }

    /// The SVG-like path string the rendering consumer feeds to its
    /// drawing layer.
    pub fn svg_path(&self) -> String {
        format!(
            "M {} {} C {} {}, {} {}, {} {}",
            self.start.x, self.start.y, self.c1.x, self.c1.y, self.c2.x, self.c2.y, self.end.x,
            self.end.y,
        )
    }
}

/// Compute the curve connecting `source` to `target`.
///
/// The curve leaves the source box on the side facing the target, enters
/// the target on the opposite side, and its control points are pushed at
/// least `padding` away from each box along the dominant axis so the
/// curve clears both outlines. Arrowhead angle is the tangent direction
/// at the endpoint.
pub fn route_edge(source: &Rect, target: &Rect, padding: f64) -> EdgePath {
    let sc = source.center();
    let tc = target.center();
    let dx = tc.x - sc.x;
    let dy = tc.y - sc.y;

    let (start, end, c1, c2) = if dy.abs() >= dx.abs() {
        // Vertical routing: leave through the top or bottom side.
        let (start, end) = if dy >= 0.0 {
            (
                Point::new(sc.x, source.bottom()),
                Point::new(tc.x, target.y),
            )
        } else {
            (
                Point::new(sc.x, source.y),
                Point::new(tc.x, target.bottom()),
            )
        };
        let reach = ((end.y - start.y).abs() / 2.0).max(padding);
        let sign = if dy >= 0.0 { 1.0 } else { -1.0 };
        (
            start,
            end,
            Point::new(start.x, start.y + sign * reach),
            Point::new(end.x, end.y - sign * reach),
        )
    } else {
        // Horizontal routing: leave through the left or right side.
        let (start, end) = if dx >= 0.0 {
            (
                Point::new(source.right(), sc.y),
                Point::new(target.x, tc.y),
            )
        } else {
            (
                Point::new(source.x, sc.y),
                Point::new(target.right(), tc.y),
            )
        };
        let reach = ((end.x - start.x).abs() / 2.0).max(padding);
        let sign = if dx >= 0.0 { 1.0 } else { -1.0 };
        (
            start,
            end,
            Point::new(start.x + sign * reach, start.y),
            Point::new(end.x - sign * reach, end.y),
        )
    };

    EdgePath {
        start,
        c1,
        c2,
        end,
        angle: end_angle(&start, &c2, &end),
    }
}

/// Tangent direction at the end of the cubic. Falls back to the chord
/// when the last control point collapses onto the endpoint.
fn end_angle(start: &Point, c2: &Point, end: &Point) -> f64 {
    let (dx, dy) = (end.x - c2.x, end.y - c2.y);
    if dx.abs() < f64::EPSILON && dy.abs() < f64::EPSILON {
        (end.y - start.y).atan2(end.x - start.x)
    } else {
        dy.atan2(dx)
    }
}
