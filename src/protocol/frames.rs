use crate::error::{Result, VehicleError};
use super::bits::{read_bit, write_bit};
use super::{
    ControlBit, CommandBit, Side, FRAME_SIZE,
    CONTROLS, LEFT_MOTOR_SPEED, RIGHT_MOTOR_SPEED, COMMANDS, SENSITIVITY, RESERVED,
    PIXY_X, PIXY_Y, DISTANCE, REQUEST_SEQ,
};

/// Percent to wire byte: `floor(min(percent, 255) * sensitivity / 100)`.
pub fn scale_speed(percent: u16, sensitivity: u8) -> u8{
    let percent = u32::from(percent.min(255));
    (percent * u32::from(sensitivity) / 100).min(255) as u8
}

/// Wire byte back to percent. Truncates `100 / sensitivity` before multiplying,
/// so the result never exceeds the percent that produced `stored`.
pub fn unscale_speed(stored: u8, sensitivity: u8) -> u32{
    if sensitivity == 0{
        return 0;
    }
    u32::from(stored) * (100 / u32::from(sensitivity))
}

//outgoing frame, operator -> vehicle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandFrame{
    pub controls: u8,
    pub left_motor_speed: u8,
    pub right_motor_speed: u8,
    pub commands: u8,
    pub sensitivity: u8,
    pub reserved: u8,
}

impl CommandFrame{
    pub fn encode(&self) -> [u8; FRAME_SIZE]{
        let mut bytes = [0u8; FRAME_SIZE];
        bytes[CONTROLS] = self.controls;
        bytes[LEFT_MOTOR_SPEED] = self.left_motor_speed;
        bytes[RIGHT_MOTOR_SPEED] = self.right_motor_speed;
        bytes[COMMANDS] = self.commands;
        bytes[SENSITIVITY] = self.sensitivity;
        bytes[RESERVED] = self.reserved;
        bytes
    }

    pub fn decode(data: &[u8]) -> Result<Self>{
        if data.len() != FRAME_SIZE{
            return Err(VehicleError::Format{ expected: FRAME_SIZE, actual: data.len() });
        }
        Ok(CommandFrame{
            controls: data[CONTROLS],
            left_motor_speed: data[LEFT_MOTOR_SPEED],
            right_motor_speed: data[RIGHT_MOTOR_SPEED],
            commands: data[COMMANDS],
            sensitivity: data[SENSITIVITY],
            reserved: data[RESERVED],
        })
    }

    pub fn control(&self, bit: ControlBit) -> bool{
        read_bit(self.controls, bit.index())
    }

    pub fn set_control(&mut self, bit: ControlBit, on: bool){
        self.controls = write_bit(self.controls, bit.index(), on);
    }

    pub fn command(&self, bit: CommandBit) -> bool{
        read_bit(self.commands, bit.index())
    }

    pub fn set_command(&mut self, bit: CommandBit, on: bool){
        self.commands = write_bit(self.commands, bit.index(), on);
    }

    pub fn motor_speed(&self, side: Side) -> u8{
        match side{
            Side::Left => self.left_motor_speed,
            Side::Right => self.right_motor_speed,
        }
    }

    //scaled with the frame's current sensitivity
    pub fn set_motor_speed(&mut self, side: Side, percent: u16){
        let scaled = scale_speed(percent, self.sensitivity);
        match side{
            Side::Left => self.left_motor_speed = scaled,
            Side::Right => self.right_motor_speed = scaled,
        }
    }

    pub fn motor_speed_percent(&self, side: Side) -> u32{
        unscale_speed(self.motor_speed(side), self.sensitivity)
    }
}

pub fn encode_command(frame: &CommandFrame) -> [u8; FRAME_SIZE]{
    frame.encode()
}

//incoming frame, vehicle -> operator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedbackFrame{
    pub pixy_x: u16,
    pub pixy_y: u16,
    pub distance: u8,        //cm, nominal 4-30, unfiltered
    pub request_seq: u8,
}

impl FeedbackFrame{
    //vehicle side packing
    pub fn encode(&self) -> [u8; FRAME_SIZE]{
        let mut bytes = [0u8; FRAME_SIZE];
        bytes[PIXY_X..PIXY_X + 2].copy_from_slice(&self.pixy_x.to_le_bytes());
        bytes[PIXY_Y..PIXY_Y + 2].copy_from_slice(&self.pixy_y.to_le_bytes());
        bytes[DISTANCE] = self.distance;
        bytes[REQUEST_SEQ] = self.request_seq;
        bytes
    }
}

pub fn decode_feedback(data: &[u8]) -> Result<FeedbackFrame>{
    if data.len() != FRAME_SIZE{
        return Err(VehicleError::Format{ expected: FRAME_SIZE, actual: data.len() });
    }
    Ok(FeedbackFrame{
        pixy_x: u16::from_le_bytes([data[PIXY_X], data[PIXY_X + 1]]),
        pixy_y: u16::from_le_bytes([data[PIXY_Y], data[PIXY_Y + 1]]),
        distance: data[DISTANCE],
        request_seq: data[REQUEST_SEQ],
    })
}
