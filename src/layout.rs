use crate::models::{GridPosition, WidgetInstance, WidgetKind};
use crate::registry;
use chrono::Utc;
use std::collections::HashMap;

/// The dashboard's placed-widget collection. Exclusively owned by one
/// session; every operation is synchronous and in-memory.
#[derive(Debug, Default)]
pub struct LayoutModel {
    instances: Vec<WidgetInstance>,
    dirty: bool,
}

impl LayoutModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instances(&self) -> &[WidgetInstance] {
        &self.instances
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Reads and clears the dirty flag. Drives the write-after-mutation
    /// effect in the session.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Replaces the whole collection, e.g. with the backend's saved layout.
    /// Does not mark the model dirty; a load is not a user edit.
    pub fn replace_all(&mut self, instances: Vec<WidgetInstance>) {
        self.instances = instances;
        self.dirty = false;
    }

    /// Appends a new instance of `kind` below the lowest-reaching existing
    /// widget, in the left column. Silently refuses when the kind is at
    /// capacity; the picker disables the entry for the same reason.
    pub fn add_widget(&mut self, kind: WidgetKind) -> Option<&WidgetInstance> {
        self.add_widget_at(kind, Utc::now().timestamp_millis())
    }

    pub(crate) fn add_widget_at(
        &mut self,
        kind: WidgetKind,
        created_millis: i64,
    ) -> Option<&WidgetInstance> {
        if registry::is_disabled(kind, &self.instances) {
            return None;
        }

        let descriptor = registry::descriptor(kind);
        // Geometry can arrive verbatim from a saved layout, so guard the sum.
        let y = self
            .instances
            .iter()
            .map(|item| item.y.saturating_add(item.h))
            .max()
            .unwrap_or(0);

        // Two adds inside the same millisecond would mint the same id;
        // bump forward until the id is unused in the live collection.
        let mut millis = created_millis;
        let mut id = format!("{}-{}", kind.as_str(), millis);
        while self.instances.iter().any(|item| item.id == id) {
            millis += 1;
            id = format!("{}-{}", kind.as_str(), millis);
        }

        self.instances.push(WidgetInstance {
            id,
            kind,
            x: 0,
            y,
            w: descriptor.default_w,
            h: descriptor.default_h,
            static_h: true,
        });
        self.dirty = true;
        self.instances.last()
    }

    /// Removes the instance with the given id. Absent ids are a no-op, not
    /// an error.
    pub fn remove_widget(&mut self, id: &str) -> bool {
        let before = self.instances.len();
        self.instances.retain(|item| item.id != id);
        let removed = self.instances.len() != before;
        if removed {
            self.dirty = true;
        }
        removed
    }

    /// Overwrites `x, y` of every instance named in `positions`. Geometry
    /// (`w`, `h`), kind, and unnamed instances are never touched. Returns
    /// the number of instances that actually moved.
    pub fn apply_layout_change(&mut self, positions: &HashMap<String, GridPosition>) -> usize {
        let mut moved = 0;
        for item in &mut self.instances {
            if let Some(position) = positions.get(&item.id) {
                if item.x != position.x || item.y != position.y {
                    item.x = position.x;
                    item.y = position.y;
                    moved += 1;
                }
            }
        }
        if moved > 0 {
            self.dirty = true;
        }
        moved
    }
}
