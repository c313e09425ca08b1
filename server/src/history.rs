use driftboard_shared::StrokeSegment;

/// Append-only log of every segment accepted by a hub, in arrival order.
///
/// Lives for the life of the process; nothing is ever removed or rewritten.
#[derive(Default, Debug)]
pub struct SessionHistory {
    segments: Vec<StrokeSegment>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends and returns the zero-based position the segment now holds.
    pub fn append(&mut self, segment: StrokeSegment) -> usize {
        self.segments.push(segment);
        self.segments.len() - 1
    }

    pub fn snapshot(&self) -> Vec<StrokeSegment> {
        self.segments.clone()
    }
}

#[cfg(test)]
mod tests {
    use driftboard_shared::{BrushStyle, Point};

    use super::*;

    fn segment_at(x: f32) -> StrokeSegment {
        StrokeSegment::new(
            Point::new(x, 0.0),
            Point::new(x + 1.0, 1.0),
            "#123456",
            1.0,
            1.0,
            BrushStyle::Square,
        )
    }

    #[test]
    fn append_reports_arrival_position() {
        let mut history = SessionHistory::new();
        assert!(history.snapshot().is_empty());
        assert_eq!(history.append(segment_at(0.0)), 0);
        assert_eq!(history.append(segment_at(1.0)), 1);
        assert_eq!(history.append(segment_at(2.0)), 2);
        assert_eq!(history.snapshot().len(), 3);
    }

    #[test]
    fn snapshot_preserves_order_and_is_detached() {
        let mut history = SessionHistory::new();
        for i in 0..5 {
            history.append(segment_at(i as f32));
        }
        let snapshot = history.snapshot();
        history.append(segment_at(99.0));

        let xs = snapshot.iter().map(|s| s.x0).collect::<Vec<_>>();
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(history.snapshot().len(), 6);
    }
}
