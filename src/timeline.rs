use std::collections::BTreeMap;

use crate::config::{HexColor, Resolution};

/// Resolved on-screen anchor for a caption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
}

impl Placement {
    pub fn centered(resolution: Resolution) -> Self {
        Self {
            x: (resolution.width / 2) as i32,
            y: (resolution.height / 2) as i32,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacementEntry {
    /// Inclusive upper bound in seconds.
    pub end: f64,
    pub x: i32,
    pub y: i32,
    pub segment_id: Option<i64>,
}

impl PlacementEntry {
    pub fn placement(&self) -> Placement {
        Placement {
            x: self.x,
            y: self.y,
        }
    }
}

/// Segment-keyed placements plus an `end`-sorted fallback list that always
/// terminates in an `end = +inf` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementTimeline {
    by_segment: BTreeMap<i64, Placement>,
    by_time: Vec<PlacementEntry>,
}

impl PlacementTimeline {
    pub fn centered(resolution: Resolution) -> Self {
        Self::new(Vec::new(), resolution)
    }

    pub fn new(entries: Vec<PlacementEntry>, resolution: Resolution) -> Self {
        let mut by_segment = BTreeMap::new();
        let mut by_time = Vec::with_capacity(entries.len() + 1);

        for entry in entries {
            match entry.segment_id {
                Some(segment_id) => {
                    by_segment.entry(segment_id).or_insert(entry.placement());
                }
                None if entry.end.is_nan() => {}
                None => by_time.push(entry),
            }
        }

        by_time.sort_by(|left, right| left.end.total_cmp(&right.end));
        let has_terminal = by_time
            .last()
            .is_some_and(|entry| entry.end == f64::INFINITY);
        if !has_terminal {
            let center = Placement::centered(resolution);
            by_time.push(PlacementEntry {
                end: f64::INFINITY,
                x: center.x,
                y: center.y,
                segment_id: None,
            });
        }

        Self {
            by_segment,
            by_time,
        }
    }

    pub fn for_segment(&self, segment_id: i64) -> Option<Placement> {
        self.by_segment.get(&segment_id).copied()
    }

    pub fn at_time(&self, time: f64) -> Placement {
        self.by_time
            .iter()
            .find(|entry| time <= entry.end)
            .or_else(|| self.by_time.last())
            .map(PlacementEntry::placement)
            .unwrap_or(Placement { x: 0, y: 0 })
    }

    /// Segment id match wins; otherwise the first time entry whose end covers `time`.
    pub fn resolve(&self, segment_id: Option<i64>, time: f64) -> Placement {
        segment_id
            .and_then(|id| self.for_segment(id))
            .unwrap_or_else(|| self.at_time(time))
    }

    pub fn time_entries(&self) -> &[PlacementEntry] {
        &self.by_time
    }

    pub fn segment_count(&self) -> usize {
        self.by_segment.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColorOverride {
    pub start: f64,
    pub end: f64,
    pub color: HexColor,
    pub shadow: HexColor,
}

impl ColorOverride {
    pub fn contains(&self, time: f64) -> bool {
        self.start <= time && time <= self.end
    }
}

/// Closed-interval color windows; gaps fall through to the configured default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorTimeline {
    entries: Vec<ColorOverride>,
}

impl ColorTimeline {
    pub fn new(mut entries: Vec<ColorOverride>) -> Self {
        entries.retain(|entry| entry.end >= entry.start);
        entries.sort_by(|left, right| left.start.total_cmp(&right.start));
        Self { entries }
    }

    pub fn lookup(&self, time: f64) -> Option<&ColorOverride> {
        self.entries.iter().find(|entry| entry.contains(time))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{ColorOverride, ColorTimeline, Placement, PlacementEntry, PlacementTimeline};
    use crate::config::{HexColor, Resolution};

    fn resolution() -> Resolution {
        Resolution {
            width: 1920,
            height: 1080,
        }
    }

    fn entry(end: f64, x: i32, y: i32, segment_id: Option<i64>) -> PlacementEntry {
        PlacementEntry {
            end,
            x,
            y,
            segment_id,
        }
    }

    #[test]
    fn empty_timeline_falls_back_to_center() {
        let timeline = PlacementTimeline::centered(resolution());
        assert_eq!(timeline.at_time(123.0), Placement { x: 960, y: 540 });
        assert_eq!(timeline.time_entries().len(), 1);
    }

    #[test]
    fn time_lookup_is_inclusive_and_sorted() {
        let timeline = PlacementTimeline::new(
            vec![entry(5.0, 10, 20, None), entry(2.0, 1, 2, None)],
            resolution(),
        );
        assert_eq!(timeline.at_time(2.0), Placement { x: 1, y: 2 });
        assert_eq!(timeline.at_time(2.01), Placement { x: 10, y: 20 });
        assert_eq!(timeline.at_time(9.0), Placement { x: 960, y: 540 });
    }

    #[test]
    fn explicit_terminal_entry_is_not_duplicated() {
        let timeline = PlacementTimeline::new(
            vec![entry(f64::INFINITY, 5, 5, None), entry(1.0, 0, 0, None)],
            resolution(),
        );
        assert_eq!(timeline.time_entries().len(), 2);
        assert_eq!(timeline.at_time(50.0), Placement { x: 5, y: 5 });
    }

    #[test]
    fn segment_key_takes_priority_over_time() {
        let timeline = PlacementTimeline::new(
            vec![entry(10.0, 1, 1, None), entry(0.0, 300, 400, Some(3))],
            resolution(),
        );
        assert_eq!(timeline.resolve(Some(3), 1.0), Placement { x: 300, y: 400 });
        assert_eq!(timeline.resolve(Some(4), 1.0), Placement { x: 1, y: 1 });
        assert_eq!(timeline.resolve(None, 1.0), Placement { x: 1, y: 1 });
        assert_eq!(timeline.segment_count(), 1);
    }

    #[test]
    fn color_lookup_uses_closed_intervals_with_gaps() {
        let red = HexColor::parse("#ff0000").expect("valid color");
        let black = HexColor::parse("000000").expect("valid color");
        let timeline = ColorTimeline::new(vec![
            ColorOverride {
                start: 3.0,
                end: 4.0,
                color: black.clone(),
                shadow: black.clone(),
            },
            ColorOverride {
                start: 1.0,
                end: 2.0,
                color: red.clone(),
                shadow: black,
            },
        ]);
        assert_eq!(timeline.lookup(1.0).map(|c| &c.color), Some(&red));
        assert_eq!(timeline.lookup(2.0).map(|c| &c.color), Some(&red));
        assert!(timeline.lookup(2.5).is_none());
        assert!(timeline.lookup(3.5).is_some());
    }
}
