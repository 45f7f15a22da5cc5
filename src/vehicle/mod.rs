/**
 * Vehicle state module
 *
 * The shared state merged from three independently clocked actors:
 * - operator console (commands, tuning)
 * - vehicle microcontroller (feedback)
 * - vision tracker (target telemetry)
 */

pub mod mode;
pub mod pid;
pub mod state;

pub use mode::{
    AuthorityLog, CommandSource, ControlMode, ModeEvent, ModeObserver, ModeSignal, ModeSupervisor,
};
pub use pid::{PidParameters, PidTracker};
pub use state::{SharedVehicleState, TargetFix, VehicleState};
