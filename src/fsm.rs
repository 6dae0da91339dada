/// Minimal finite-state-machine container shared by the minigames.
///
/// `S` is the state type (an enum). The machine tracks the current state and
/// how long it has been there; transition logic lives in whatever drives the
/// machine, not here.
pub struct StateMachine<S> {
    pub state: S,
    /// Seconds spent in the current state. Reset to 0.0 on each transition.
    pub elapsed: f32,
    entered_this_frame: bool,
}

impl<S> StateMachine<S> {
    pub fn new(initial: S) -> Self {
        Self {
            state: initial,
            elapsed: 0.0,
            entered_this_frame: true,
        }
    }

    /// Transition to `next` only if it is a different variant from the
    /// current state (compared by discriminant, no `PartialEq` required).
    pub fn go(&mut self, next: S) {
        if std::mem::discriminant(&self.state) != std::mem::discriminant(&next) {
            self.force_go(next);
        }
    }

    /// Like [`Self::go`], but always transitions — needed when the variant
    /// carries data that changed (e.g. advancing a playback index).
    pub fn force_go(&mut self, next: S) {
        self.state = next;
        self.elapsed = 0.0;
        self.entered_this_frame = true;
    }

    /// Advance the in-state timer and clear the `just_entered` flag. Call
    /// once per frame after processing transitions.
    pub fn tick(&mut self, dt: f32) {
        self.elapsed += dt;
        self.entered_this_frame = false;
    }

    /// True only until the first `tick` after entering the current state.
    pub fn just_entered(&self) -> bool {
        self.entered_this_frame
    }
}
