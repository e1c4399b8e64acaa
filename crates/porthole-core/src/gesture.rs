use crate::consts::EPSILON;

/// Phase of a raw pointer event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// One touch position in viewport display coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchPoint {
    pub x: f32,
    pub y: f32,
}

impl TouchPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

fn distance(a: TouchPoint, b: TouchPoint) -> f32 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Gesture recognized from a move event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureAction {
    /// Single-finger drag delta in display pixels.
    Pan { dx: f32, dy: f32 },
    /// Two-finger pinch: ratio of the current to the previous finger
    /// distance.
    Pinch { factor: f32 },
}

/// Tracking state between pointer events.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    /// One active finger and its last seen position.
    OneFinger { last: TouchPoint },
    /// Two active fingers and their last seen distance.
    TwoFinger { last_distance: f32 },
}

/// Explicit pan/pinch state machine over raw pointer events.
///
/// Every event must carry the positions of all currently active pointers.
/// `Up` events still include the pointer being released; `pointer` is its
/// index into `touches`, so the tracker can reseed from the fingers that
/// remain. Skipping the reseed would show up as a jump on the next move.
#[derive(Clone, Copy, Debug, Default)]
pub struct GestureTracker {
    state: GestureState,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Drop any in-progress gesture.
    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
    }

    /// Feed one pointer event; returns the action it produced, if any.
    pub fn handle(
        &mut self,
        phase: PointerPhase,
        pointer: usize,
        touches: &[TouchPoint],
    ) -> Option<GestureAction> {
        match phase {
            PointerPhase::Down => {
                self.on_down(touches);
                None
            }
            PointerPhase::Move => self.on_move(touches),
            PointerPhase::Up => {
                self.on_up(pointer, touches);
                None
            }
            PointerPhase::Cancel => {
                self.reset();
                None
            }
        }
    }

    fn on_down(&mut self, touches: &[TouchPoint]) {
        match touches.len() {
            1 => self.state = GestureState::OneFinger { last: touches[0] },
            2 => {
                self.state = GestureState::TwoFinger {
                    last_distance: distance(touches[0], touches[1]),
                }
            }
            // A third or later finger does not change what is tracked.
            _ => {}
        }
    }

    fn on_move(&mut self, touches: &[TouchPoint]) -> Option<GestureAction> {
        match (self.state, touches.len()) {
            (GestureState::OneFinger { last }, 1) => {
                let now = touches[0];
                self.state = GestureState::OneFinger { last: now };
                Some(GestureAction::Pan {
                    dx: now.x - last.x,
                    dy: now.y - last.y,
                })
            }
            (GestureState::TwoFinger { last_distance }, 2) => {
                let now = distance(touches[0], touches[1]);
                self.state = GestureState::TwoFinger { last_distance: now };
                if last_distance > EPSILON {
                    Some(GestureAction::Pinch {
                        factor: now / last_distance,
                    })
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    fn on_up(&mut self, pointer: usize, touches: &[TouchPoint]) {
        // `touches` still includes the pointer being released.
        match touches.len() {
            0 | 1 => self.reset(),
            2 | 3 => {
                let remaining: Vec<TouchPoint> = touches
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != pointer)
                    .map(|(_, p)| *p)
                    .collect();
                match remaining.as_slice() {
                    [point] => self.state = GestureState::OneFinger { last: *point },
                    [a, b] => {
                        self.state = GestureState::TwoFinger {
                            last_distance: distance(*a, *b),
                        }
                    }
                    _ => {}
                }
            }
            // With four or more fingers down, tracking is already saturated.
            _ => {}
        }
    }
}
