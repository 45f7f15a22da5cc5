pub mod error;
pub mod config;
pub mod protocol;
pub mod sync;
pub mod vehicle;
pub mod link;
pub mod operator;
pub mod ffi;

#[cfg(feature = "python")]
pub mod python;

pub use error::{VehicleError, LinkError, ConfigError};
pub use config::BridgeConfig;
pub use protocol::{
    CommandFrame, FeedbackFrame, ControlBit, CommandBit, Side,
    encode_command, decode_feedback, FRAME_SIZE, OPERATOR_PAYLOAD_SIZE,
};
pub use sync::FairMutex;
pub use vehicle::{
    SharedVehicleState, VehicleState, PidParameters, ControlMode,
    ModeSupervisor, ModeObserver, TargetFix,
};
pub use link::{SerialLink, MsgType, SYNC_BYTE, MAX_MSG_SIZE};
pub use operator::OperatorLink;
