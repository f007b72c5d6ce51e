//! Neighbor descriptors.
//!
//! Every pair of minutiae is joined by a [`Connection`] (length and
//! direction). Connections are sorted by length and each minutia keeps the
//! first `num_neighbors` connections it takes part in, re-expressed in its
//! own frame: the connection direction is rotated by the minutia angle and
//! projected back to `(relative_x, relative_y)`.

use crate::error::TemplateError;
use crate::minutia::{Minutia, Neighbor};

/// Vector between two minutiae of the same template.
#[derive(Debug, Clone, Copy)]
struct Connection {
    magnitude: u32,
    /// Direction from `first` to `second`, degrees.
    direction: u32,
    first: usize,
    second: usize,
}

impl Connection {
    fn between(minutiae: &[Minutia], first: usize, second: usize) -> Self {
        let dx = minutiae[second].x as i64 - minutiae[first].x as i64;
        let dy = minutiae[second].y as i64 - minutiae[first].y as i64;
        Self {
            magnitude: ((dx * dx + dy * dy) as f64).sqrt() as u32,
            direction: direction_of(dx, dy),
            first,
            second,
        }
    }
}

/// Fills `neighbors` of every minutia with its `num_neighbors` closest
/// minutiae.
///
/// Requires strictly more minutiae than `num_neighbors`, so that every
/// minutia ends up with exactly `num_neighbors` descriptors.
pub fn build_neighbors(minutiae: &mut [Minutia], num_neighbors: usize) -> Result<(), TemplateError> {
    if num_neighbors == 0 {
        return Err(TemplateError::InvalidParameter(
            "num_neighbors must be positive".into(),
        ));
    }
    if minutiae.len() <= num_neighbors {
        return Err(TemplateError::TooFewMinutiae {
            got: minutiae.len(),
            need: num_neighbors + 1,
        });
    }

    let connections = connect(minutiae);

    let mut all_neighbors = Vec::with_capacity(minutiae.len());
    for index in 0..minutiae.len() {
        all_neighbors.push(neighbors_of(minutiae, index, &connections, num_neighbors));
    }
    for (minutia, neighbors) in minutiae.iter_mut().zip(all_neighbors) {
        minutia.neighbors = neighbors;
    }

    tracing::trace!(
        minutiae = minutiae.len(),
        connections = connections.len(),
        num_neighbors,
        "neighbor descriptors built"
    );
    Ok(())
}

/// All pairwise connections, shortest first. Equal lengths keep pair order.
fn connect(minutiae: &[Minutia]) -> Vec<Connection> {
    let n = minutiae.len();
    let mut connections = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for first in 0..n.saturating_sub(1) {
        for second in first + 1..n {
            connections.push(Connection::between(minutiae, first, second));
        }
    }
    connections.sort_by_key(|c| c.magnitude);
    connections
}

fn neighbors_of(
    minutiae: &[Minutia],
    index: usize,
    connections: &[Connection],
    max_neighbors: usize,
) -> Vec<Neighbor> {
    let owner = &minutiae[index];
    let mut neighbors = Vec::with_capacity(max_neighbors);

    for c in connections {
        if neighbors.len() >= max_neighbors {
            break;
        }
        // Direction as seen from the owner: reversed when it is the
        // connection's second end.
        let (other, direction) = if c.first == index {
            (c.second, c.direction)
        } else if c.second == index {
            (c.first, (c.direction + 180) % 360)
        } else {
            continue;
        };

        let other = &minutiae[other];
        let rotated = (direction as i64 - owner.angle as i64).rem_euclid(360) as u32;
        let (relative_x, relative_y) = polar_to_xy(c.magnitude, rotated);

        neighbors.push(Neighbor {
            relative_x,
            relative_y,
            relative_angle: other.angle.abs_diff(owner.angle),
            neighbor_id: other.id,
        });
    }

    neighbors
}

/// Direction of `(dx, dy)` in whole degrees, `0..=359`.
fn direction_of(dx: i64, dy: i64) -> u32 {
    if dx == 0 && dy == 0 {
        return 0;
    }
    let mut degrees = (dy as f64).atan2(dx as f64).to_degrees();
    if degrees < 0.0 {
        degrees += 360.0;
    }
    (degrees as u32) % 360
}

fn polar_to_xy(magnitude: u32, direction: u32) -> (i32, i32) {
    let rad = (direction as f64).to_radians();
    let m = magnitude as f64;
    ((rad.cos() * m).round() as i32, (rad.sin() * m).round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minutiae(points: &[(u32, u32, u32)]) -> Vec<Minutia> {
        points
            .iter()
            .enumerate()
            .map(|(i, &(x, y, t))| Minutia::new(i as u32, x, y, t))
            .collect()
    }

    #[test]
    fn direction_quadrants() {
        assert_eq!(direction_of(1, 0), 0);
        assert_eq!(direction_of(4, 4), 45);
        assert_eq!(direction_of(0, 3), 90);
        assert_eq!(direction_of(-2, 0), 180);
        assert_eq!(direction_of(0, -3), 270);
        assert_eq!(direction_of(0, 0), 0);
    }

    #[test]
    fn polar_round_trip_axes() {
        assert_eq!(polar_to_xy(5, 0), (5, 0));
        assert_eq!(polar_to_xy(5, 90), (0, 5));
        assert_eq!(polar_to_xy(5, 180), (-5, 0));
        assert_eq!(polar_to_xy(5, 315), (4, -4));
    }

    #[test]
    fn two_minutiae_see_each_other() {
        let mut ms = minutiae(&[(0, 0, 90), (4, 4, 270)]);
        build_neighbors(&mut ms, 1).unwrap();

        let expected0 = Neighbor {
            relative_x: 4,
            relative_y: -4,
            relative_angle: 180,
            neighbor_id: 1,
        };
        assert_eq!(ms[0].neighbors, vec![expected0]);

        let expected1 = Neighbor {
            neighbor_id: 0,
            ..expected0
        };
        assert_eq!(ms[1].neighbors, vec![expected1]);
    }

    #[test]
    fn neighbors_sorted_by_distance() {
        // Points on a line: 0 is closest to 1, then 2, then 3.
        let mut ms = minutiae(&[(0, 0, 0), (3, 0, 0), (7, 0, 0), (20, 0, 0)]);
        build_neighbors(&mut ms, 3).unwrap();

        let ids: Vec<u32> = ms[0].neighbors.iter().map(|n| n.neighbor_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        let xs: Vec<i32> = ms[0].neighbors.iter().map(|n| n.relative_x).collect();
        assert_eq!(xs, vec![3, 7, 20]);

        // Minutia 2 sees 1 (distance 4) before 0 (7) and 3 (13).
        let ids: Vec<u32> = ms[2].neighbors.iter().map(|n| n.neighbor_id).collect();
        assert_eq!(ids, vec![1, 0, 3]);
        assert_eq!(ms[2].neighbors[0].relative_x, -4);
    }

    #[test]
    fn keeps_requested_count() {
        let mut ms = minutiae(&[(0, 0, 10), (10, 0, 20), (0, 10, 30), (10, 10, 40), (5, 5, 50)]);
        build_neighbors(&mut ms, 2).unwrap();
        assert!(ms.iter().all(|m| m.neighbors.len() == 2));
        // The centre point is the closest neighbor of every corner.
        for m in &ms[..4] {
            assert_eq!(m.neighbors[0].neighbor_id, 4);
        }
    }

    #[test]
    fn too_few_minutiae() {
        let mut ms = minutiae(&[(0, 0, 0), (1, 1, 0)]);
        let err = build_neighbors(&mut ms, 2).unwrap_err();
        assert_eq!(err, TemplateError::TooFewMinutiae { got: 2, need: 3 });
    }

    #[test]
    fn zero_neighbors_rejected() {
        let mut ms = minutiae(&[(0, 0, 0), (1, 1, 0)]);
        assert!(matches!(
            build_neighbors(&mut ms, 0),
            Err(TemplateError::InvalidParameter(_))
        ));
    }
}
