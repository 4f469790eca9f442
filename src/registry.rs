use crate::models::{WidgetInstance, WidgetKind};
use once_cell::sync::Lazy;

#[derive(Debug, Clone)]
pub struct WidgetDescriptor {
    pub kind: WidgetKind,
    pub title: &'static str,
    pub description: &'static str,
    pub preview: &'static str,
    pub default_w: u32,
    pub default_h: u32,
    pub max_instances: usize,
}

// Declaration order is the picker's tie-break order.
static REGISTRY: Lazy<Vec<WidgetDescriptor>> = Lazy::new(|| {
    vec![
        WidgetDescriptor {
            kind: WidgetKind::Stats,
            title: "Statistics",
            description: "Usage counters for commands, clips, and sessions",
            preview: "widget-stats.png",
            default_w: 4,
            default_h: 2,
            max_instances: 1,
        },
        WidgetDescriptor {
            kind: WidgetKind::Clips,
            title: "Clips",
            description: "Your most recent saved clips",
            preview: "widget-clips.png",
            default_w: 4,
            default_h: 3,
            max_instances: 1,
        },
        WidgetDescriptor {
            kind: WidgetKind::Clock,
            title: "Clock",
            description: "Local time at a glance",
            preview: "widget-clock.png",
            default_w: 2,
            default_h: 2,
            max_instances: 1,
        },
        WidgetDescriptor {
            kind: WidgetKind::Diagram,
            title: "Usage diagram",
            description: "Activity charted over the last weeks",
            preview: "widget-diagram.png",
            default_w: 6,
            default_h: 3,
            max_instances: 1,
        },
        WidgetDescriptor {
            kind: WidgetKind::Chat,
            title: "Chat",
            description: "Assistant conversation panel",
            preview: "widget-chat.png",
            default_w: 3,
            default_h: 4,
            max_instances: 1,
        },
    ]
});

#[derive(Debug, Clone)]
pub struct PickerEntry {
    pub descriptor: &'static WidgetDescriptor,
    pub disabled: bool,
}

pub fn descriptor(kind: WidgetKind) -> &'static WidgetDescriptor {
    REGISTRY
        .iter()
        .find(|entry| entry.kind == kind)
        .unwrap_or_else(|| unreachable!("every widget kind is registered"))
}

pub fn all_descriptors() -> &'static [WidgetDescriptor] {
    REGISTRY.as_slice()
}

pub fn is_disabled(kind: WidgetKind, existing: &[WidgetInstance]) -> bool {
    let count = existing.iter().filter(|item| item.kind == kind).count();
    count >= descriptor(kind).max_instances
}

/// All kinds in picker order: enabled entries first, disabled entries last,
/// ties broken by registry declaration order (stable sort).
pub fn sorted_for_picker(existing: &[WidgetInstance]) -> Vec<PickerEntry> {
    let mut entries: Vec<PickerEntry> = REGISTRY
        .iter()
        .map(|descriptor| PickerEntry {
            descriptor,
            disabled: is_disabled(descriptor.kind, existing),
        })
        .collect();
    entries.sort_by_key(|entry| entry.disabled);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(kind: WidgetKind, id: &str) -> WidgetInstance {
        let descriptor = descriptor(kind);
        WidgetInstance {
            id: id.to_string(),
            kind,
            x: 0,
            y: 0,
            w: descriptor.default_w,
            h: descriptor.default_h,
            static_h: true,
        }
    }

    #[test]
    fn every_kind_has_a_descriptor() {
        for kind in [
            WidgetKind::Stats,
            WidgetKind::Clips,
            WidgetKind::Clock,
            WidgetKind::Diagram,
            WidgetKind::Chat,
        ] {
            let descriptor = descriptor(kind);
            assert_eq!(descriptor.kind, kind);
            assert!(descriptor.default_w >= 1);
            assert!(descriptor.default_h >= 1);
            assert_eq!(descriptor.max_instances, 1);
        }
    }

    #[test]
    fn kind_at_capacity_is_disabled() {
        let existing = vec![instance(WidgetKind::Stats, "stats-1")];
        assert!(is_disabled(WidgetKind::Stats, &existing));
        assert!(!is_disabled(WidgetKind::Clock, &existing));
    }

    #[test]
    fn empty_dashboard_disables_nothing() {
        for entry in sorted_for_picker(&[]) {
            assert!(!entry.disabled);
        }
    }

    #[test]
    fn picker_sorts_disabled_kinds_last() {
        let existing = vec![instance(WidgetKind::Stats, "stats-1")];
        let entries = sorted_for_picker(&existing);
        assert_eq!(entries.len(), 5);
        assert_eq!(entries.last().unwrap().descriptor.kind, WidgetKind::Stats);
        assert!(entries.last().unwrap().disabled);
        // Enabled entries keep declaration order.
        let enabled: Vec<WidgetKind> = entries
            .iter()
            .filter(|entry| !entry.disabled)
            .map(|entry| entry.descriptor.kind)
            .collect();
        assert_eq!(
            enabled,
            vec![
                WidgetKind::Clips,
                WidgetKind::Clock,
                WidgetKind::Diagram,
                WidgetKind::Chat
            ]
        );
    }

    #[test]
    fn picker_order_is_stable_among_disabled() {
        let existing = vec![
            instance(WidgetKind::Clips, "clips-1"),
            instance(WidgetKind::Clock, "clock-1"),
        ];
        let disabled: Vec<WidgetKind> = sorted_for_picker(&existing)
            .iter()
            .filter(|entry| entry.disabled)
            .map(|entry| entry.descriptor.kind)
            .collect();
        assert_eq!(disabled, vec![WidgetKind::Clips, WidgetKind::Clock]);
    }
}
