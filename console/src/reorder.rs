use wire::model::Song;

/// Phase of a single drag-and-drop gesture over the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GesturePhase {
    #[default]
    Idle,
    /// A row is grabbed but not hovering a usable drop candidate
    Dragging { src: u64 },
    /// A row is grabbed and hovering over another row
    Targeting { src: u64, over: u64 },
}

/// Tracks one reorder gesture and, on drop, produces the full id sequence
/// to submit as the authoritative new queue order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReorderGesture {
    phase: GesturePhase,
}

impl ReorderGesture {
    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    /// Grab a row. Restarts any gesture already in flight.
    pub fn grab(&mut self, src: u64) {
        self.phase = GesturePhase::Dragging { src };
    }

    /// Hover a drop candidate. The grabbed row itself is never a target.
    pub fn hover(&mut self, over: u64) {
        match self.phase {
            GesturePhase::Dragging { src } | GesturePhase::Targeting { src, .. } => {
                self.phase = if over == src {
                    GesturePhase::Dragging { src }
                } else {
                    GesturePhase::Targeting { src, over }
                };
            }
            GesturePhase::Idle => {}
        }
    }

    pub fn cancel(&mut self) {
        self.phase = GesturePhase::Idle;
    }

    /// Commit the gesture against the current queue. Returns the rearranged
    /// id sequence, or `None` when there was no usable target or either row
    /// has meanwhile left the queue. The gesture always returns to idle.
    pub fn drop_on_target(&mut self, queue: &[Song]) -> Option<Vec<u64>> {
        let phase = std::mem::take(&mut self.phase);
        let GesturePhase::Targeting { src, over } = phase else {
            return None;
        };

        let mut ids: Vec<u64> = queue.iter().map(|song| song.id).collect();
        let src_idx = ids.iter().position(|&id| id == src)?;
        let over_idx = ids.iter().position(|&id| id == over)?;

        let moved = ids.remove(src_idx);
        // Dragging downwards lands the row after the target, dragging
        // upwards lands it before; after removing the source both cases
        // collapse to inserting at the target's original index.
        ids.insert(over_idx, moved);

        Some(ids)
    }
}
