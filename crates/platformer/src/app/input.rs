use serde::{Deserialize, Serialize};

/// Axis ramp rate in units per second, matching the classic keyboard axis feel.
pub const DEFAULT_AXIS_SENSITIVITY: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputAction {
    Jump,
    Dash,
    MoveLeft,
    MoveRight,
}

const ACTION_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }

    fn clear(&mut self) {
        self.down = [false; ACTION_COUNT];
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::Jump => 0,
            InputAction::Dash => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
        }
    }
}

/// Input state for one logic frame: held levels, press/release edges and the
/// horizontal axis.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    held: ActionStates,
    pressed: ActionStates,
    released: ActionStates,
    horizontal_axis: f32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.held.is_down(action)
    }

    pub fn was_pressed(&self, action: InputAction) -> bool {
        self.pressed.is_down(action)
    }

    pub fn was_released(&self, action: InputAction) -> bool {
        self.released.is_down(action)
    }

    pub fn horizontal_axis(&self) -> f32 {
        self.horizontal_axis
    }

    /// Unsmoothed direction from the held movement keys: -1, 0 or 1.
    pub fn raw_horizontal(&self) -> f32 {
        raw_direction(&self.held)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.held.set(action, is_down);
        self
    }

    /// Press edge; the action is also held for this frame.
    pub fn with_pressed(mut self, action: InputAction) -> Self {
        self.pressed.set(action, true);
        self.held.set(action, true);
        self
    }

    /// Release edge; the action is no longer held.
    pub fn with_released(mut self, action: InputAction) -> Self {
        self.released.set(action, true);
        self.held.set(action, false);
        self
    }

    pub fn with_horizontal_axis(mut self, axis: f32) -> Self {
        self.horizontal_axis = sanitize_axis(axis);
        self
    }
}

/// Turns raw key up/down events into per-frame snapshots. Edges survive until
/// the next `snapshot_for_frame`, so a tap shorter than a frame still registers.
#[derive(Debug)]
pub struct InputCollector {
    held: ActionStates,
    pressed: ActionStates,
    released: ActionStates,
    smoothed_axis: f32,
    analog_axis: Option<f32>,
    axis_sensitivity: f32,
}

impl Default for InputCollector {
    fn default() -> Self {
        Self::new(DEFAULT_AXIS_SENSITIVITY)
    }
}

impl InputCollector {
    pub fn new(axis_sensitivity: f32) -> Self {
        Self {
            held: ActionStates::default(),
            pressed: ActionStates::default(),
            released: ActionStates::default(),
            smoothed_axis: 0.0,
            analog_axis: None,
            axis_sensitivity,
        }
    }

    pub fn handle_action(&mut self, action: InputAction, is_down: bool) {
        let was_down = self.held.is_down(action);
        if is_down && !was_down {
            self.pressed.set(action, true);
        }
        if !is_down && was_down {
            self.released.set(action, true);
        }
        self.held.set(action, is_down);
    }

    /// An analog stick value overrides the keyboard-derived axis until cleared.
    pub fn set_analog_axis(&mut self, axis: Option<f32>) {
        self.analog_axis = axis.map(sanitize_axis);
    }

    pub fn snapshot_for_frame(&mut self, dt_seconds: f32) -> InputSnapshot {
        let raw = raw_direction(&self.held);
        self.smoothed_axis = step_axis(self.smoothed_axis, raw, self.axis_sensitivity, dt_seconds);
        let horizontal_axis = self.analog_axis.unwrap_or(self.smoothed_axis);

        let snapshot = InputSnapshot {
            held: self.held,
            pressed: self.pressed,
            released: self.released,
            horizontal_axis,
        };
        self.pressed.clear();
        self.released.clear();
        snapshot
    }
}

fn raw_direction(held: &ActionStates) -> f32 {
    let mut raw = 0.0;
    if held.is_down(InputAction::MoveRight) {
        raw += 1.0;
    }
    if held.is_down(InputAction::MoveLeft) {
        raw -= 1.0;
    }
    raw
}

fn step_axis(current: f32, target: f32, sensitivity: f32, dt_seconds: f32) -> f32 {
    if !sensitivity.is_finite() || sensitivity <= 0.0 {
        return target;
    }
    // Reversing direction snaps through zero instead of ramping across it.
    let current = if target != 0.0 && current * target < 0.0 {
        0.0
    } else {
        current
    };
    let max_step = sensitivity * dt_seconds.max(0.0);
    let delta = target - current;
    if delta.abs() <= max_step {
        target
    } else {
        current + max_step * delta.signum()
    }
}

fn sanitize_axis(axis: f32) -> f32 {
    if axis.is_finite() {
        axis.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_is_edge_triggered_for_single_frame() {
        let mut input = InputCollector::default();
        input.handle_action(InputAction::Jump, true);

        let first = input.snapshot_for_frame(0.016);
        let second = input.snapshot_for_frame(0.016);

        assert!(first.was_pressed(InputAction::Jump));
        assert!(first.is_down(InputAction::Jump));
        assert!(!second.was_pressed(InputAction::Jump));
        assert!(second.is_down(InputAction::Jump));
    }

    #[test]
    fn held_key_does_not_spam_press_edges() {
        let mut input = InputCollector::default();
        input.handle_action(InputAction::Dash, true);
        let _ = input.snapshot_for_frame(0.016);

        input.handle_action(InputAction::Dash, true);
        let repeat = input.snapshot_for_frame(0.016);

        assert!(!repeat.was_pressed(InputAction::Dash));
    }

    #[test]
    fn tap_within_one_frame_keeps_both_edges() {
        let mut input = InputCollector::default();
        input.handle_action(InputAction::Jump, true);
        input.handle_action(InputAction::Jump, false);

        let snapshot = input.snapshot_for_frame(0.016);

        assert!(snapshot.was_pressed(InputAction::Jump));
        assert!(snapshot.was_released(InputAction::Jump));
        assert!(!snapshot.is_down(InputAction::Jump));
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut input = InputCollector::default();
        input.handle_action(InputAction::MoveLeft, false);

        let snapshot = input.snapshot_for_frame(0.016);

        assert!(!snapshot.was_released(InputAction::MoveLeft));
    }

    #[test]
    fn axis_ramps_toward_held_direction() {
        let mut input = InputCollector::new(3.0);
        input.handle_action(InputAction::MoveRight, true);

        let first = input.snapshot_for_frame(0.1);
        let later = (0..10)
            .map(|_| input.snapshot_for_frame(0.1))
            .last()
            .expect("snapshot");

        assert!((first.horizontal_axis() - 0.3).abs() < 1e-5);
        assert_eq!(later.horizontal_axis(), 1.0);
        assert_eq!(later.raw_horizontal(), 1.0);
    }

    #[test]
    fn axis_snaps_through_zero_on_reversal() {
        let mut input = InputCollector::new(3.0);
        input.handle_action(InputAction::MoveRight, true);
        for _ in 0..10 {
            let _ = input.snapshot_for_frame(0.1);
        }

        input.handle_action(InputAction::MoveRight, false);
        input.handle_action(InputAction::MoveLeft, true);
        let reversed = input.snapshot_for_frame(0.1);

        assert!((reversed.horizontal_axis() + 0.3).abs() < 1e-5);
    }

    #[test]
    fn analog_axis_overrides_keys_and_is_clamped() {
        let mut input = InputCollector::default();
        input.handle_action(InputAction::MoveLeft, true);
        input.set_analog_axis(Some(4.0));

        let snapshot = input.snapshot_for_frame(0.016);

        assert_eq!(snapshot.horizontal_axis(), 1.0);
        assert_eq!(snapshot.raw_horizontal(), -1.0);
    }

    #[test]
    fn opposing_keys_cancel_raw_direction() {
        let snapshot = InputSnapshot::empty()
            .with_action_down(InputAction::MoveLeft, true)
            .with_action_down(InputAction::MoveRight, true);

        assert_eq!(snapshot.raw_horizontal(), 0.0);
    }

    #[test]
    fn snapshot_and_collector_agree_on_raw_direction() {
        let cases = [
            (false, false, 0.0),
            (true, false, -1.0),
            (false, true, 1.0),
            (true, true, 0.0),
        ];
        for (left, right, expected) in cases {
            let mut input = InputCollector::default();
            input.handle_action(InputAction::MoveLeft, left);
            input.handle_action(InputAction::MoveRight, right);
            let collected = input.snapshot_for_frame(0.016);
            let built = InputSnapshot::empty()
                .with_action_down(InputAction::MoveLeft, left)
                .with_action_down(InputAction::MoveRight, right);

            assert_eq!(collected.raw_horizontal(), expected);
            assert_eq!(built.raw_horizontal(), expected);
        }
    }
}
