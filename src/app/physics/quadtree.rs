use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 12;

#[derive(Clone, Copy, Debug)]
pub(super) struct Square {
    center: Vec2,
    half: f32,
}

impl Square {
    fn enclosing(points: &[Vec2]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (mut min, mut max) = (*first, *first);
        for point in rest {
            min = min.min(*point);
            max = max.max(*point);
        }

        if !(min.is_finite() && max.is_finite()) {
            return None;
        }

        let span = (max - min).max_elem().max(1.0);
        Some(Self {
            center: (min + max) * 0.5,
            half: span * 0.5 + 1.0,
        })
    }

    fn contains(self, point: Vec2) -> bool {
        (point.x - self.center.x).abs() <= self.half && (point.y - self.center.y).abs() <= self.half
    }

    fn quadrant(self, point: Vec2) -> usize {
        usize::from(point.x >= self.center.x) | (usize::from(point.y >= self.center.y) << 1)
    }

    fn child(self, quadrant: usize) -> Self {
        let quarter = self.half * 0.5;
        let dx = if quadrant & 1 == 0 { -quarter } else { quarter };
        let dy = if quadrant & 2 == 0 { -quarter } else { quarter };
        Self {
            center: self.center + vec2(dx, dy),
            half: quarter,
        }
    }
}

/// Barnes-Hut cell: either a leaf holding point indices or up to four children.
pub(super) struct Cell {
    square: Square,
    mass_center: Vec2,
    mass: f32,
    members: Vec<usize>,
    children: [Option<Box<Cell>>; 4],
}

impl Cell {
    pub(super) fn build(points: &[Vec2]) -> Option<Self> {
        let square = Square::enclosing(points)?;
        Some(Self::subdivide(square, (0..points.len()).collect(), points, 0))
    }

    fn subdivide(square: Square, members: Vec<usize>, points: &[Vec2], depth: usize) -> Self {
        let mass = members.len() as f32;
        let mass_center = if members.is_empty() {
            square.center
        } else {
            members
                .iter()
                .fold(Vec2::ZERO, |sum, &index| sum + points[index])
                / mass
        };

        let mut cell = Self {
            square,
            mass_center,
            mass,
            members,
            children: [None, None, None, None],
        };
        if depth >= MAX_DEPTH || cell.members.len() <= LEAF_CAPACITY {
            return cell;
        }

        let mut buckets: [Vec<usize>; 4] = Default::default();
        for &index in &cell.members {
            buckets[square.quadrant(points[index])].push(index);
        }
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() <= 1 {
            return cell;
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if !bucket.is_empty() {
                cell.children[quadrant] = Some(Box::new(Self::subdivide(
                    square.child(quadrant),
                    bucket,
                    points,
                    depth + 1,
                )));
            }
        }
        cell.members.clear();
        cell
    }

    fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    /// Accumulates the repulsion felt by `points[index]` from every other point.
    pub(super) fn repulsion_on(
        &self,
        index: usize,
        points: &[Vec2],
        strength: f32,
        softening: f32,
        theta: f32,
    ) -> Vec2 {
        let point = points[index];

        if self.is_leaf() {
            return self
                .members
                .iter()
                .filter(|&&other| other != index)
                .fold(Vec2::ZERO, |force, &other| {
                    force + repel(point, points[other], strength, softening, index + other)
                });
        }

        let distance = (point - self.mass_center).length().max(0.01);
        if !self.square.contains(point) && (self.square.half * 2.0) / distance < theta {
            return repel(point, self.mass_center, strength * self.mass, softening, index);
        }

        self.children
            .iter()
            .flatten()
            .fold(Vec2::ZERO, |force, child| {
                force + child.repulsion_on(index, points, strength, softening, theta)
            })
    }
}

fn repel(point: Vec2, other: Vec2, strength: f32, softening: f32, salt: usize) -> Vec2 {
    let delta = point - other;
    let distance_sq = delta.length_sq();
    let direction = if distance_sq > 0.000_1 {
        delta / distance_sq.sqrt()
    } else {
        let angle = (salt as f32 * 0.618_034).fract() * std::f32::consts::TAU;
        vec2(angle.cos(), angle.sin())
    };
    direction * (strength / (distance_sq + softening))
}
