//! Collision event collection
//!
//! rapier reports events from inside the pipeline through an [`EventHandler`].
//! The queue buffers them until the step returns, then turns trigger entries
//! into [`SensorEntry`] values.

use std::collections::HashMap;

use parking_lot::Mutex;
use rapier3d::prelude::*;
use tracing::trace;

/// Something entered a trigger volume
#[derive(Debug, Clone, PartialEq)]
pub struct SensorEntry {
    /// The trigger volume
    pub sensor: ColliderHandle,
    /// The collider that entered it
    pub other: ColliderHandle,
    /// Owner label of the trigger, if one was registered
    pub label: Option<String>,
}

/// Buffers collision events emitted during a physics step
#[derive(Default)]
pub struct ContactEventQueue {
    events: Mutex<Vec<CollisionEvent>>,
}

impl ContactEventQueue {
    /// Drain buffered events, keeping only trigger entries
    pub fn drain_sensor_entries(
        &self,
        colliders: &ColliderSet,
        labels: &HashMap<ColliderHandle, String>,
    ) -> Vec<SensorEntry> {
        let events = std::mem::take(&mut *self.events.lock());

        events
            .into_iter()
            .filter(|event| event.started() && event.sensor())
            .filter_map(|event| {
                let (a, b) = (event.collider1(), event.collider2());
                let a_is_sensor = colliders.get(a).is_some_and(|c| c.is_sensor());
                let (sensor, other) = if a_is_sensor { (a, b) } else { (b, a) };
                // A collider removed mid-step has nothing left to report
                colliders.get(other)?;
                Some(SensorEntry {
                    sensor,
                    other,
                    label: labels.get(&sensor).cloned(),
                })
            })
            .collect()
    }

    /// Number of buffered events
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventHandler for ContactEventQueue {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        trace!(?event, "Collision event");
        self.events.lock().push(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}
