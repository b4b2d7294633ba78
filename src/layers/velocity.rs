// Copyright (c) 2024 Mike Tsao

use crate::{
    entities::{GridEntity, Tracked},
    types::{EntityId, Px},
};
use rustc_hash::FxHashMap;

/// A bar in the velocity lane. Its height is the note's velocity scaled to
/// the lane.
#[derive(Clone, Debug, PartialEq)]
pub struct VelocityMarker {
    #[allow(missing_docs)]
    pub x: Px,
    #[allow(missing_docs)]
    pub height: Tracked,
}

/// The piano roll's velocity lane: one marker per note id.
#[derive(Debug)]
pub struct VelocityLayer {
    lane_height: Px,
    markers: FxHashMap<EntityId, VelocityMarker>,
}
impl VelocityLayer {
    #[allow(missing_docs)]
    pub fn new_with(lane_height: Px) -> Self {
        Self {
            lane_height: lane_height.max(Px(1.0)),
            markers: Default::default(),
        }
    }

    #[allow(missing_docs)]
    pub fn lane_height(&self) -> Px {
        self.lane_height
    }

    /// Adds or replaces the marker for a note.
    pub fn add(&mut self, id: &EntityId, x: Px, velocity: f64) {
        self.markers.insert(
            id.clone(),
            VelocityMarker {
                x,
                height: Tracked::new(self.lane_height * velocity.clamp(0.0, 1.0)),
            },
        );
    }

    #[allow(missing_docs)]
    pub fn remove(&mut self, id: &EntityId) {
        self.markers.remove(id);
    }

    #[allow(missing_docs)]
    pub fn marker(&self, id: &EntityId) -> Option<&VelocityMarker> {
        self.markers.get(id)
    }

    /// The live velocity for a note, in 0.0..=1.0.
    pub fn velocity_of(&self, id: &EntityId) -> Option<f64> {
        self.markers
            .get(id)
            .map(|m| m.height.working() / self.lane_height)
    }

    /// Drags the named markers. Moving the pointer up raises velocity. Each
    /// marker changes by the same amount from its committed height.
    pub fn adjust(&mut self, origin_y: Px, terminal_y: Px, ids: &[EntityId]) {
        let delta = origin_y - terminal_y;
        let lane_height = self.lane_height;
        for id in ids {
            if let Some(marker) = self.markers.get_mut(id) {
                let height = (marker.height.committed() + delta).clamp(Px::ZERO, lane_height);
                marker.height.set(height);
            }
        }
    }

    /// Confirms live heights for the named markers.
    pub fn commit(&mut self, ids: &[EntityId]) {
        for id in ids {
            if let Some(marker) = self.markers.get_mut(id) {
                marker.height.commit();
            }
        }
    }

    /// True if any named marker has an uncommitted height.
    pub fn is_dirty(&self, ids: &[EntityId]) -> bool {
        ids.iter()
            .filter_map(|id| self.markers.get(id))
            .any(|m| m.height.is_dirty())
    }

    /// Keeps a note's marker under the note as it moves.
    pub fn follow(&mut self, entity: &GridEntity) {
        if let Some(marker) = self.markers.get_mut(entity.id()) {
            marker.x = entity.x.working();
        }
    }

    /// Applies a zoom change.
    pub fn rescale(&mut self, factor: f64) {
        self.markers.values_mut().for_each(|m| m.x = m.x * factor);
    }

    /// Rebuilds every marker from `(note id, x, velocity)` triples.
    pub fn force_to_state(&mut self, markers: impl IntoIterator<Item = (EntityId, Px, f64)>) {
        self.markers.clear();
        for (id, x, velocity) in markers {
            self.add(&id, x, velocity);
        }
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn velocity_adjustments_clamp() {
        let mut layer = VelocityLayer::new_with(Px(100.0));
        let a = EntityId::from("a");
        let b = EntityId::from("b");
        layer.add(&a, Px(0.0), 0.5);
        layer.add(&b, Px(48.0), 0.9);

        layer.adjust(Px(50.0), Px(30.0), &[a.clone(), b.clone()]);
        assert!(approx_eq!(f64, layer.velocity_of(&a).unwrap(), 0.7, epsilon = 1e-9));
        assert_eq!(layer.velocity_of(&b), Some(1.0), "clamped at the top");

        layer.adjust(Px(50.0), Px(500.0), &[a.clone()]);
        assert_eq!(layer.velocity_of(&a), Some(0.0), "clamped at the bottom");

        layer.adjust(Px(50.0), Px(40.0), &[a.clone()]);
        assert!(layer.is_dirty(&[a.clone()]));
        layer.commit(&[a.clone()]);
        assert!(!layer.is_dirty(&[a.clone()]));
        assert!(layer.is_dirty(&[b.clone()]), "b was never committed");
        assert!(approx_eq!(f64, layer.velocity_of(&a).unwrap(), 0.6, epsilon = 1e-9));
        assert_eq!(layer.velocity_of(&"missing".into()), None);
    }

    #[test]
    fn markers_follow_notes() {
        let mut layer = VelocityLayer::new_with(Px(100.0));
        let mut note = GridEntity::new("n".into(), Px(0.0), Px(0.0), Px(48.0), Px(16.0));
        layer.add(note.id(), note.x.working(), 0.8);
        note.x.set(Px(96.0));
        layer.follow(&note);
        assert_eq!(layer.marker(note.id()).unwrap().x, Px(96.0));

        layer.force_to_state(vec![("m".into(), Px(10.0), 0.25)]);
        assert_eq!(layer.len(), 1);
        assert!(layer.marker(note.id()).is_none());
    }
}
