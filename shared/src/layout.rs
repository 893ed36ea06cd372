//! Concentric ring placement of markers around a country anchor.
//!
//! Offsets are applied directly in degrees on a flat plane. Longitude is not
//! compressed by latitude, so rings drawn near the poles look stretched
//! horizontally on a Mercator map. This is a known limitation of the layout.

use std::f64::consts::TAU;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingLayout {
    /// Radius of the innermost ring, in degrees.
    pub base_radius: f64,
    /// Radius added for each further ring.
    pub increment: f64,
    /// Minimum arc length between neighbours on a ring.
    pub min_spacing: f64,
}

impl Default for RingLayout {
    fn default() -> Self {
        Self {
            base_radius: 1.2,
            increment: 0.9,
            min_spacing: 0.35,
        }
    }
}

/// One circle of markers. Members are evenly spaced starting at angle 0.
#[derive(Debug, PartialEq)]
pub struct Ring<'a, T> {
    pub radius: f64,
    pub members: &'a [T],
    pub angular_step: f64,
}

#[derive(Debug, PartialEq)]
pub struct PlacedMarker<'a, T> {
    pub position: [f64; 2],
    pub ring: usize,
    pub member: &'a T,
}

impl RingLayout {
    /// How many markers fit on a ring of `radius` while keeping `min_spacing`.
    /// Always at least one so placement terminates.
    pub fn capacity(&self, radius: f64) -> usize {
        if self.min_spacing.is_nan() || self.min_spacing <= 0.0 {
            return usize::MAX;
        }
        let raw = (TAU * radius / self.min_spacing).floor();
        if raw.is_finite() && raw >= 1.0 {
            raw as usize
        } else if raw.is_infinite() && raw > 0.0 {
            usize::MAX
        } else {
            1
        }
    }

    /// Split `members` over rings, filling the innermost ring first.
    pub fn rings<'a, T>(&self, members: &'a [T]) -> Vec<Ring<'a, T>> {
        let mut rings = Vec::new();
        let mut rest = members;
        let mut radius = self.base_radius;

        while !rest.is_empty() {
            let take = self.capacity(radius).min(rest.len());
            let (ring, tail) = rest.split_at(take);
            rings.push(Ring {
                radius,
                members: ring,
                angular_step: TAU / take as f64,
            });
            rest = tail;
            radius += self.increment;
        }

        rings
    }

    /// Positions for every member around `anchor`, in input order.
    pub fn layout<'a, T>(&self, anchor: [f64; 2], members: &'a [T]) -> Vec<PlacedMarker<'a, T>> {
        let mut placed = Vec::with_capacity(members.len());
        for (ring_index, ring) in self.rings(members).into_iter().enumerate() {
            for (slot, member) in ring.members.iter().enumerate() {
                let angle = slot as f64 * ring.angular_step;
                placed.push(PlacedMarker {
                    position: [
                        anchor[0] + ring.radius * angle.cos(),
                        anchor[1] + ring.radius * angle.sin(),
                    ],
                    ring: ring_index,
                    member,
                });
            }
        }
        placed
    }
}
