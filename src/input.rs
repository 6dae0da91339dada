/// One frame of latched input, produced by whatever host owns the actual
/// devices. The core never polls hardware; it only reads snapshots.
///
/// Movement and `jump`/`sprint`/`grab` are held states; `interact` is also a
/// held state — edge detection happens in the session so a key held across a
/// room switch does not re-trigger.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputSnapshot {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub sprint: bool,
    pub interact: bool,
    pub grab: bool,
    pub mouse_dx: f32,
    pub mouse_dy: f32,
    /// Pointer-lock state. When unlocked the session freezes look and
    /// movement, mirroring a browser losing pointer capture.
    pub pointer_locked: bool,
}

impl InputSnapshot {
    /// Snapshot with the pointer captured and nothing pressed. Handy in
    /// tests and scripted drivers.
    pub fn locked() -> Self {
        Self {
            pointer_locked: true,
            ..Self::default()
        }
    }
}
