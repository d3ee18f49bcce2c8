//! Physical overlap queries
//!
//! The world hands the probe a snapshot of every character capsule; the
//! probe returns the actors a swept sphere touches.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::types::ActorId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionCategory {
    Pawn,
    WorldStatic,
}

/// Vertical capsule standing on `base`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapsuleBody {
    pub id: ActorId,
    pub category: CollisionCategory,
    pub base: Vec3,
    pub radius: f32,
    pub height: f32,
}

impl CapsuleBody {
    /// End points of the capsule's inner segment
    pub fn segment(&self) -> (Vec3, Vec3) {
        let bottom = self.base + Vec3::Z * self.radius;
        let top = self.base + Vec3::Z * (self.height - self.radius).max(self.radius);
        (bottom, top)
    }
}

/// Sphere of `radius` swept from `start` to `end`
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeQuery {
    pub start: Vec3,
    pub end: Vec3,
    pub radius: f32,
    pub category: CollisionCategory,
    pub ignore: Vec<ActorId>,
}

pub trait PhysicsProbe {
    /// Actors whose bodies the query touches, in body order
    fn sweep(&self, query: &ProbeQuery, bodies: &[CapsuleBody]) -> Vec<ActorId>;
}

/// Exact segment-versus-capsule overlap test
#[derive(Debug, Clone, Copy, Default)]
pub struct CapsuleOverlapProbe;

impl PhysicsProbe for CapsuleOverlapProbe {
    fn sweep(&self, query: &ProbeQuery, bodies: &[CapsuleBody]) -> Vec<ActorId> {
        bodies
            .iter()
            .filter(|body| body.category == query.category && !query.ignore.contains(&body.id))
            .filter(|body| {
                let (a, b) = body.segment();
                let reach = query.radius + body.radius;
                segment_distance_squared(query.start, query.end, a, b) <= reach * reach
            })
            .map(|body| body.id)
            .collect()
    }
}

/// Squared distance between segments `p1-q1` and `p2-q2`
pub fn segment_distance_squared(p1: Vec3, q1: Vec3, p2: Vec3, q2: Vec3) -> f32 {
    const EPSILON: f32 = 1.0e-6;

    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.length_squared();
    let e = d2.length_squared();
    let f = d2.dot(r);

    let (s, t) = if a <= EPSILON && e <= EPSILON {
        (0.0, 0.0)
    } else if a <= EPSILON {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(r);
        if e <= EPSILON {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(d2);
            let denom = a * e - b * b;
            let mut s = if denom > EPSILON {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let mut t = (b * s + f) / e;
            if t < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            }
            (s, t)
        }
    };

    let closest1 = p1 + d1 * s;
    let closest2 = p2 + d2 * t;
    closest1.distance_squared(closest2)
}
