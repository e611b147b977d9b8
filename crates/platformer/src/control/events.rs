use crate::math::Vec2;

/// Transitions raised by the controllers during one logic frame, in the
/// order they happened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControllerEvent {
    Jumped { velocity_y: f32 },
    JumpCut { velocity_y: f32 },
    JumpCeilingCancel,
    JumpSustainEnded,
    Landed,
    LeftGround,
    DashStarted { direction: Vec2 },
    DashVetoed { direction: Vec2 },
    DashEnded { carry_velocity_x: f32 },
    DashReady,
}

impl ControllerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ControllerEvent::Jumped { .. } => "jumped",
            ControllerEvent::JumpCut { .. } => "jump_cut",
            ControllerEvent::JumpCeilingCancel => "jump_ceiling_cancel",
            ControllerEvent::JumpSustainEnded => "jump_sustain_ended",
            ControllerEvent::Landed => "landed",
            ControllerEvent::LeftGround => "left_ground",
            ControllerEvent::DashStarted { .. } => "dash_started",
            ControllerEvent::DashVetoed { .. } => "dash_vetoed",
            ControllerEvent::DashEnded { .. } => "dash_ended",
            ControllerEvent::DashReady => "dash_ready",
        }
    }
}
