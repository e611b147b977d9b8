mod body;
mod character;
mod dash;
mod events;
mod jump;
mod movement;
mod sensor;

pub use body::{BodyCollider, BodyState, Facing};
pub use character::Character;
pub use dash::{DashConfig, DashController, DashPhase, DashState, DashVisuals, DoubleTapDetector};
pub use events::ControllerEvent;
pub use jump::{GravityConfig, JumpConfig, JumpController, JumpPhase, JumpState};
pub use movement::{MovementConfig, MovementController};
pub use sensor::{GroundQueryResult, GroundSensor, GroundSensorConfig};
