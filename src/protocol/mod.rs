/**
 * Vehicle wire protocol
 *
 * Both directions use fixed 6-byte frames.
 *
 * To vehicle (command):
 *   byte0  controls    bit0 stop, bit1 fwd, bit2 rev, bit3 left, bit4 right
 *   byte1  left motor speed  (sensitivity scaled)
 *   byte2  right motor speed (sensitivity scaled)
 *   byte3  commands    bit0 right servo, bit1 auto/manual, bit2 start, bit7 request feedback
 *   byte4  sensitivity (0-100)
 *   byte5  reserved (0)
 *
 * From vehicle (feedback):
 *   byte0-1  pixy x (little endian)
 *   byte2-3  pixy y (little endian)
 *   byte4    distance sensor
 *   byte5    request sequence echo
 */

pub mod bits;
pub mod frames;

pub use bits::{set_bit, clear_bit, read_bit, write_bit};
pub use frames::{CommandFrame, FeedbackFrame, encode_command, decode_feedback, scale_speed, unscale_speed};

pub const FRAME_SIZE: usize = 6;
pub const PID_FIELD_COUNT: usize = 5;
//command layout mirror + raw pid bytes
pub const OPERATOR_PAYLOAD_SIZE: usize = FRAME_SIZE + PID_FIELD_COUNT;
pub const MAX_SENSITIVITY: u8 = 100;

//command frame offsets
pub const CONTROLS: usize = 0;
pub const LEFT_MOTOR_SPEED: usize = 1;
pub const RIGHT_MOTOR_SPEED: usize = 2;
pub const COMMANDS: usize = 3;
pub const SENSITIVITY: usize = 4;
pub const RESERVED: usize = 5;

//feedback frame offsets
pub const PIXY_X: usize = 0;
pub const PIXY_Y: usize = 2;
pub const DISTANCE: usize = 4;
pub const REQUEST_SEQ: usize = 5;

/// Bits of the `controls` byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ControlBit{
    Stop = 0,
    Forward = 1,
    Reverse = 2,
    Left = 3,
    Right = 4,
}

impl ControlBit{
    pub const ALL: [ControlBit; 5] = [
        ControlBit::Stop,
        ControlBit::Forward,
        ControlBit::Reverse,
        ControlBit::Left,
        ControlBit::Right,
    ];

    pub fn index(self) -> u8{
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Self>{
        Self::ALL.iter().copied().find(|bit| bit.index() == index)
    }

    pub fn from_name(name: &str) -> Option<Self>{
        match name{
            "stop" => Some(ControlBit::Stop),
            "forward" | "fwd" => Some(ControlBit::Forward),
            "reverse" | "rev" => Some(ControlBit::Reverse),
            "left" => Some(ControlBit::Left),
            "right" => Some(ControlBit::Right),
            _ => None,
        }
    }
}

/// Bits of the `commands` byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandBit{
    RightServo = 0,
    AutoMode = 1,
    Start = 2,
    RequestFeedback = 7,
}

impl CommandBit{
    pub fn index(self) -> u8{
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side{
    Left,
    Right,
}

impl Side{
    pub fn offset(self) -> usize{
        match self{
            Side::Left => LEFT_MOTOR_SPEED,
            Side::Right => RIGHT_MOTOR_SPEED,
        }
    }
}
