/// Input events the table understands, in table-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Cursor/touch moved to (x, y). Re-aims while aiming.
    PointerMove { x: f32, y: f32 },
    /// Touch/click began at (x, y). Arms the shot.
    PointerDown { x: f32, y: f32 },
    /// Touch/click ended at (x, y). Fires an armed shot.
    PointerUp { x: f32, y: f32 },
    /// Power slider moved. Clamped to [0, 100].
    SetPower { value: f32 },
    /// Power +/- button. Clamped to [0, 100].
    AdjustPower { delta: f32 },
    /// Fire now (keyboard or a UI button), without the pointer gesture.
    Shoot,
    /// Throw away the current rack and set up a new one.
    Rack,
}

/// A queue of input events.
/// The host writes events into the queue; the session drains them each step.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Take every pending event, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}
