use crate::RawFile;

/// Drag-over state for a drop zone.
///
/// Enter and leave events also fire when the pointer crosses child elements,
/// so the zone counts them and only reports "not over" once every enter has
/// been matched by a leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DragTracker {
    depth: u32,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self) {
        self.depth += 1;
    }

    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn is_over(&self) -> bool {
        self.depth > 0
    }

    /// Resets the zone and hands back the dropped batch for submission.
    pub fn drop_files(&mut self, files: Vec<RawFile>) -> Vec<RawFile> {
        self.depth = 0;
        files
    }
}

#[cfg(test)]
mod tests {
    use super::DragTracker;
    use crate::RawFile;

    #[test]
    fn nested_enter_leave_keeps_zone_active() {
        let mut zone = DragTracker::new();
        zone.enter();
        zone.enter();
        zone.leave();
        assert!(zone.is_over());
        zone.leave();
        assert!(!zone.is_over());
    }

    #[test]
    fn stray_leave_does_not_underflow() {
        let mut zone = DragTracker::new();
        zone.leave();
        zone.enter();
        assert!(zone.is_over());
    }

    #[test]
    fn drop_resets_and_returns_batch() {
        let mut zone = DragTracker::new();
        zone.enter();
        zone.enter();
        let batch = zone.drop_files(vec![RawFile::new("a.png", "x")]);
        assert!(!zone.is_over());
        assert_eq!(batch.len(), 1);
    }
}
