use std::sync::Arc;

use log::{debug, info, warn};

use crate::error::{Result, VehicleError};
use crate::protocol::{
    decode_feedback, CommandBit, CommandFrame, ControlBit, FeedbackFrame, Side,
    FRAME_SIZE, MAX_SENSITIVITY, OPERATOR_PAYLOAD_SIZE, PID_FIELD_COUNT,
};
use crate::sync::FairMutex;
use super::mode::{CommandSource, ControlMode, ModeSignal};
use super::pid::{PidParameters, PidTracker};

/// Target position reported by the vision tracker, in camera pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TargetFix{
    pub x: f32,
    pub y: f32,
}

/// Commanded and observed vehicle state.
///
/// Plain data with no locking of its own; shared access goes through
/// [`SharedVehicleState`].
#[derive(Debug, Clone, Default)]
pub struct VehicleState{
    command: CommandFrame,        //in-flight frame to the vehicle
    operator_input: CommandFrame, //last command-layout bytes from the operator
    feedback: FeedbackFrame,
    target: Option<TargetFix>,
    pid: PidTracker,
    dirty: bool,
    feedback_available: bool,
}

impl VehicleState{
    pub fn new() -> Self{
        Self::default()
    }

    //bulk update from the operator console: 6 command-layout bytes + 5 pid bytes
    pub fn apply_operator_update(&mut self, raw: &[u8]) -> Result<()>{
        if raw.len() < OPERATOR_PAYLOAD_SIZE{
            return Err(VehicleError::InvalidLength{
                expected: OPERATOR_PAYLOAD_SIZE,
                actual: raw.len(),
            });
        }

        let input = CommandFrame::decode(&raw[..FRAME_SIZE])?;
        let mut pid_raw = [0u8; PID_FIELD_COUNT];
        pid_raw.copy_from_slice(&raw[FRAME_SIZE..OPERATOR_PAYLOAD_SIZE]);

        //request-feedback bit belongs to the serial side
        let request_bit = self.command.command(CommandBit::RequestFeedback);
        let sensitivity = input.sensitivity.min(MAX_SENSITIVITY);
        let next = match ControlMode::from_commands(input.commands).authority(){
            CommandSource::Operator =>{
                let mut next = CommandFrame{
                    controls: input.controls,
                    commands: input.commands,
                    sensitivity,
                    ..CommandFrame::default()
                };
                next.set_command(CommandBit::RequestFeedback, request_bit);
                //operator sends speeds as percent
                next.set_motor_speed(Side::Left, u16::from(input.left_motor_speed));
                next.set_motor_speed(Side::Right, u16::from(input.right_motor_speed));
                next
            }
            CommandSource::Autopilot =>{
                //controls, speed bytes and servo stay with the autopilot
                let mut next = self.command;
                next.set_command(CommandBit::AutoMode, true);
                next.set_command(CommandBit::Start, input.command(CommandBit::Start));
                next.sensitivity = sensitivity;
                next
            }
        };

        self.operator_input = input;
        self.command = next;
        if self.pid.update(pid_raw){
            debug!("pid parameters changed: {:?}", self.pid.current());
        }
        self.dirty = true;
        Ok(())
    }

    pub fn set_control(&mut self, bit: ControlBit, on: bool){
        self.command.set_control(bit, on);
        self.dirty = true;
    }

    pub fn set_control_bit(&mut self, bit: ControlBit){
        self.set_control(bit, true);
    }

    pub fn clear_control_bit(&mut self, bit: ControlBit){
        self.set_control(bit, false);
    }

    pub fn control(&self, bit: ControlBit) -> bool{
        self.command.control(bit)
    }

    fn set_command(&mut self, bit: CommandBit, on: bool){
        self.command.set_command(bit, on);
        self.dirty = true;
    }

    pub fn set_mode(&mut self, auto: bool){
        self.set_command(CommandBit::AutoMode, auto);
    }

    pub fn mode(&self) -> ControlMode{
        ControlMode::from_commands(self.command.commands)
    }

    pub fn set_servo(&mut self, on: bool){
        self.set_command(CommandBit::RightServo, on);
    }

    //start bit enables the vehicle
    pub fn set_started(&mut self, on: bool){
        self.set_command(CommandBit::Start, on);
    }

    //flips the request sequence bit so the next echo is distinguishable
    pub fn request_feedback(&mut self) -> bool{
        let next = !self.command.command(CommandBit::RequestFeedback);
        self.set_command(CommandBit::RequestFeedback, next);
        next
    }

    pub fn set_motor_speed(&mut self, side: Side, percent: u16){
        self.command.set_motor_speed(side, percent);
        self.dirty = true;
    }

    pub fn motor_speed(&self, side: Side) -> u32{
        self.command.motor_speed_percent(side)
    }

    pub fn set_sensitivity(&mut self, percent: u8){
        self.command.sensitivity = percent.min(MAX_SENSITIVITY);
        self.dirty = true;
    }

    pub fn sensitivity(&self) -> u8{
        self.command.sensitivity
    }

    /// Accept a feedback frame if it has the right size and a new request
    /// sequence. Wrong-size frames come back as `Err`, stale ones as `Ok(false)`.
    pub fn try_ingest_feedback(&mut self, raw: &[u8]) -> Result<bool>{
        let frame = decode_feedback(raw)?;
        if frame.request_seq == self.feedback.request_seq{
            return Ok(false);
        }
        self.feedback = frame;
        self.feedback_available = true;
        Ok(true)
    }

    pub fn ingest_feedback(&mut self, raw: &[u8]) -> bool{
        match self.try_ingest_feedback(raw){
            Ok(true) => true,
            Ok(false) =>{
                debug!("stale feedback, seq {} already seen", self.feedback.request_seq);
                false
            }
            Err(e) =>{
                warn!("dropping feedback: {}", e);
                false
            }
        }
    }

    pub fn take_outgoing_frame(&mut self) -> [u8; FRAME_SIZE]{
        self.dirty = false;
        self.command.encode()
    }

    pub fn take_outgoing_if_dirty(&mut self) -> Option<[u8; FRAME_SIZE]>{
        if self.dirty{
            Some(self.take_outgoing_frame())
        }else{
            None
        }
    }

    pub fn peek_dirty(&self) -> bool{
        self.dirty
    }

    pub fn peek_feedback_available(&self) -> bool{
        self.feedback_available
    }

    pub fn feedback(&self) -> FeedbackFrame{
        self.feedback
    }

    pub fn take_feedback(&mut self) -> Option<FeedbackFrame>{
        if !self.feedback_available{
            return None;
        }
        self.feedback_available = false;
        Some(self.feedback)
    }

    pub fn update_target(&mut self, x: f32, y: f32){
        self.target = Some(TargetFix{ x, y });
    }

    pub fn clear_target(&mut self){
        self.target = None;
    }

    pub fn target(&self) -> Option<TargetFix>{
        self.target
    }

    pub fn consume_pid_change(&mut self) -> (PidParameters, bool){
        self.pid.consume()
    }

    //undo a take whose frame never reached the vehicle
    pub fn mark_dirty(&mut self){
        self.dirty = true;
    }

    pub fn restore_pid_change(&mut self){
        self.pid.mark_changed();
    }

    pub fn pid_parameters(&self) -> PidParameters{
        self.pid.current()
    }

    pub fn command_frame(&self) -> CommandFrame{
        self.command
    }

    pub fn operator_input(&self) -> CommandFrame{
        self.operator_input
    }

    pub fn operator_control(&self, bit: ControlBit) -> bool{
        self.operator_input.control(bit)
    }
}

/// Cloneable handle to the one [`VehicleState`] of the process.
///
/// Every method takes the fair permit, does in-memory work only and
/// releases it before returning.
#[derive(Clone)]
pub struct SharedVehicleState{
    state: Arc<FairMutex<VehicleState>>,
    mode_signal: Arc<ModeSignal>,
}

impl Default for SharedVehicleState{
    fn default() -> Self{
        Self::new()
    }
}

impl SharedVehicleState{
    pub fn new() -> Self{
        SharedVehicleState{
            state: Arc::new(FairMutex::new(VehicleState::new())),
            mode_signal: Arc::new(ModeSignal::new()),
        }
    }

    /// Run `f` while holding the permit. `f` must not block.
    ///
    /// A mode change made by `f` is published before the permit is released,
    /// so the supervisor sees modes in frame order.
    pub fn with<R>(&self, f: impl FnOnce(&mut VehicleState) -> R) -> R{
        let mut guard = self.state.lock();
        let result = f(&mut *guard);
        let mode = guard.mode();
        if self.mode_signal.publish(mode){
            info!("control mode -> {:?}", mode);
        }
        result
    }

    pub fn mode_signal(&self) -> Arc<ModeSignal>{
        Arc::clone(&self.mode_signal)
    }

    pub fn apply_operator_update(&self, raw: &[u8]) -> Result<()>{
        self.with(|s| s.apply_operator_update(raw))
    }

    pub fn set_control_bit(&self, bit: ControlBit){
        self.with(|s| s.set_control_bit(bit))
    }

    pub fn clear_control_bit(&self, bit: ControlBit){
        self.with(|s| s.clear_control_bit(bit))
    }

    pub fn control(&self, bit: ControlBit) -> bool{
        self.with(|s| s.control(bit))
    }

    pub fn set_motor_speed(&self, side: Side, percent: u16){
        self.with(|s| s.set_motor_speed(side, percent))
    }

    pub fn get_motor_speed(&self, side: Side) -> u32{
        self.with(|s| s.motor_speed(side))
    }

    pub fn set_sensitivity(&self, percent: u8){
        self.with(|s| s.set_sensitivity(percent))
    }

    pub fn sensitivity(&self) -> u8{
        self.with(|s| s.sensitivity())
    }

    pub fn set_mode(&self, auto: bool){
        self.with(|s| s.set_mode(auto))
    }

    pub fn mode(&self) -> ControlMode{
        self.with(|s| s.mode())
    }

    pub fn set_servo(&self, on: bool){
        self.with(|s| s.set_servo(on))
    }

    pub fn set_started(&self, on: bool){
        self.with(|s| s.set_started(on))
    }

    pub fn request_feedback(&self) -> bool{
        self.with(|s| s.request_feedback())
    }

    pub fn ingest_feedback(&self, raw: &[u8]) -> bool{
        self.with(|s| s.ingest_feedback(raw))
    }

    pub fn try_ingest_feedback(&self, raw: &[u8]) -> Result<bool>{
        self.with(|s| s.try_ingest_feedback(raw))
    }

    pub fn take_outgoing_frame(&self) -> [u8; FRAME_SIZE]{
        self.with(|s| s.take_outgoing_frame())
    }

    pub fn take_outgoing_if_dirty(&self) -> Option<[u8; FRAME_SIZE]>{
        self.with(|s| s.take_outgoing_if_dirty())
    }

    pub fn peek_dirty(&self) -> bool{
        self.with(|s| s.peek_dirty())
    }

    pub fn peek_feedback_available(&self) -> bool{
        self.with(|s| s.peek_feedback_available())
    }

    pub fn feedback(&self) -> FeedbackFrame{
        self.with(|s| s.feedback())
    }

    pub fn take_feedback(&self) -> Option<FeedbackFrame>{
        self.with(|s| s.take_feedback())
    }

    pub fn update_target(&self, x: f32, y: f32){
        self.with(|s| s.update_target(x, y))
    }

    pub fn clear_target(&self){
        self.with(|s| s.clear_target())
    }

    pub fn target(&self) -> Option<TargetFix>{
        self.with(|s| s.target())
    }

    pub fn consume_pid_change(&self) -> (PidParameters, bool){
        self.with(|s| s.consume_pid_change())
    }

    pub fn mark_dirty(&self){
        self.with(|s| s.mark_dirty())
    }

    pub fn restore_pid_change(&self){
        self.with(|s| s.restore_pid_change())
    }

    pub fn pid_parameters(&self) -> PidParameters{
        self.with(|s| s.pid_parameters())
    }

    pub fn command_frame(&self) -> CommandFrame{
        self.with(|s| s.command_frame())
    }

    pub fn operator_input(&self) -> CommandFrame{
        self.with(|s| s.operator_input())
    }

    pub fn shutdown(&self){
        self.mode_signal.shutdown();
    }

    pub fn is_running(&self) -> bool{
        !self.mode_signal.is_shutdown()
    }
}

#[cfg(test)]
mod tests{
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    fn feedback(pixy_x: u16, seq: u8) -> [u8; FRAME_SIZE]{
        FeedbackFrame{ pixy_x, pixy_y: 0, distance: 12, request_seq: seq }.encode()
    }

    #[test]
    fn test_initial_state(){
        let state = VehicleState::new();
        assert_eq!(state.command_frame().encode(), [0; FRAME_SIZE]);
        assert_eq!(state.sensitivity(), 0);
        assert!(!state.peek_dirty());
        assert!(!state.peek_feedback_available());
        assert_eq!(state.mode(), ControlMode::Manual);
        assert_eq!(state.pid_parameters(), PidParameters::default());
    }

    #[test]
    fn test_forward_then_take_clears_dirty(){
        let vehicle = SharedVehicleState::new();
        vehicle.set_control_bit(ControlBit::Forward);
        assert!(vehicle.peek_dirty());

        let frame = vehicle.take_outgoing_frame();
        assert_eq!(frame[0] & 0b10, 0b10);
        assert!(!vehicle.peek_dirty());

        let again = vehicle.take_outgoing_frame();
        assert_eq!(again, frame);
        assert!(!vehicle.peek_dirty());
        assert_eq!(vehicle.take_outgoing_if_dirty(), None);
    }

    #[test]
    fn test_control_bits_are_idempotent(){
        let mut state = VehicleState::new();
        state.set_control_bit(ControlBit::Left);
        state.set_control_bit(ControlBit::Left);
        state.set_control_bit(ControlBit::Stop);
        assert_eq!(state.command_frame().controls, 0b0000_1001);
        state.clear_control_bit(ControlBit::Left);
        state.clear_control_bit(ControlBit::Left);
        assert_eq!(state.command_frame().controls, 0b0000_0001);
        assert!(state.peek_dirty());
    }

    #[test]
    fn test_motor_speed_clamp_and_zero_sensitivity(){
        let vehicle = SharedVehicleState::new();
        vehicle.set_motor_speed(Side::Left, 300);
        assert_eq!(vehicle.get_motor_speed(Side::Left), 0);
        assert_eq!(vehicle.command_frame().left_motor_speed, 0);

        vehicle.set_sensitivity(100);
        vehicle.set_motor_speed(Side::Left, 300);
        assert_eq!(vehicle.command_frame().left_motor_speed, 255);
        assert_eq!(vehicle.get_motor_speed(Side::Left), 255);
    }

    #[test]
    fn test_motor_speed_lossy_round_trip(){
        let mut state = VehicleState::new();
        state.set_sensitivity(30);
        state.set_motor_speed(Side::Right, 50);
        assert_eq!(state.command_frame().right_motor_speed, 15);
        assert_eq!(state.motor_speed(Side::Right), 45);
    }

    #[test]
    fn test_sensitivity_clamped(){
        let mut state = VehicleState::new();
        state.set_sensitivity(250);
        assert_eq!(state.sensitivity(), 100);
    }

    #[test]
    fn test_feedback_dedup_by_request_seq(){
        let vehicle = SharedVehicleState::new();
        assert!(vehicle.ingest_feedback(&feedback(100, 1)));
        assert!(vehicle.peek_feedback_available());
        assert_eq!(vehicle.take_feedback().unwrap().pixy_x, 100);
        assert!(!vehicle.peek_feedback_available());

        //same sequence, different payload: still stale
        assert!(!vehicle.ingest_feedback(&feedback(999, 1)));
        assert!(!vehicle.peek_feedback_available());
        assert_eq!(vehicle.feedback().pixy_x, 100);

        assert!(vehicle.ingest_feedback(&feedback(200, 2)));
        assert_eq!(vehicle.feedback().pixy_x, 200);
    }

    #[test]
    fn test_first_feedback_with_zero_seq_is_stale(){
        let mut state = VehicleState::new();
        assert_eq!(state.try_ingest_feedback(&feedback(5, 0)), Ok(false));
    }

    #[test]
    fn test_wrong_length_feedback_rejected(){
        let mut state = VehicleState::new();
        assert_eq!(
            state.try_ingest_feedback(&[1, 2, 3]),
            Err(VehicleError::Format{ expected: 6, actual: 3 })
        );
        assert!(!state.ingest_feedback(&[0, 0, 0, 0, 0, 1, 0]));
        assert!(!state.peek_feedback_available());
    }

    #[test]
    fn test_operator_update_pid_change(){
        let vehicle = SharedVehicleState::new();
        let payload = [0, 0, 0, 0, 50, 0, 50, 20, 10, 5, 30];

        vehicle.apply_operator_update(&payload).unwrap();
        let (params, changed) = vehicle.consume_pid_change();
        assert!(changed);
        assert_eq!(params, PidParameters{ p: 5.0, i: 2.0, d: 1.0, f: 0.5, ramp_rate: 3.0 });

        vehicle.apply_operator_update(&payload).unwrap();
        let (params, changed) = vehicle.consume_pid_change();
        assert!(!changed);
        assert_eq!(params.p, 5.0);
    }

    #[test]
    fn test_operator_update_short_payload_keeps_state(){
        let vehicle = SharedVehicleState::new();
        vehicle.set_control_bit(ControlBit::Stop);
        vehicle.take_outgoing_frame();

        let err = vehicle.apply_operator_update(&[0xFF; 10]).unwrap_err();
        assert_eq!(err, VehicleError::InvalidLength{ expected: 11, actual: 10 });
        assert_eq!(vehicle.command_frame().controls, 0b1);
        assert!(!vehicle.peek_dirty());
    }

    #[test]
    fn test_operator_update_mirrors_command_layout(){
        let mut state = VehicleState::new();
        state.request_feedback();
        //fwd+left, 80%/40% speed, servo+start, sensitivity 50
        let payload = [0b0000_1010, 80, 40, 0b0000_0101, 50, 0, 0, 0, 0, 0, 0];
        state.apply_operator_update(&payload).unwrap();

        let frame = state.command_frame();
        assert_eq!(frame.controls, 0b0000_1010);
        assert_eq!(frame.left_motor_speed, 40);
        assert_eq!(frame.right_motor_speed, 20);
        //request bit kept from before the update
        assert_eq!(frame.commands, 0b1000_0101);
        assert_eq!(frame.sensitivity, 50);
        assert_eq!(frame.reserved, 0);
        assert!(state.operator_control(ControlBit::Left));
        assert_eq!(state.operator_input().left_motor_speed, 80);
        assert!(state.peek_dirty());
    }

    #[test]
    fn test_operator_update_in_auto_leaves_autopilot_setters(){
        let vehicle = SharedVehicleState::new();
        //operator hands over: auto + start, sensitivity 100
        let payload = [0, 0, 0, 0b0000_0110, 100, 0, 0, 0, 0, 0, 0];
        vehicle.apply_operator_update(&payload).unwrap();
        assert_eq!(vehicle.mode(), ControlMode::Auto);

        vehicle.set_control_bit(ControlBit::Forward);
        vehicle.set_motor_speed(Side::Left, 80);
        vehicle.set_servo(true);

        //operator keeps streaming the same datagram, now with new pid and sensitivity
        let payload = [0, 0, 0, 0b0000_0110, 50, 0, 50, 20, 10, 5, 30];
        vehicle.apply_operator_update(&payload).unwrap();

        let frame = vehicle.command_frame();
        assert!(frame.control(ControlBit::Forward));
        assert_eq!(frame.left_motor_speed, 80);
        assert!(frame.command(CommandBit::RightServo));
        assert!(frame.command(CommandBit::Start));
        assert_eq!(frame.sensitivity, 50);
        assert_eq!(vehicle.operator_input().commands, 0b0000_0110);
        assert!(vehicle.consume_pid_change().1);

        //operator takes control back
        vehicle.apply_operator_update(&[0, 0, 0, 0, 100, 0, 50, 20, 10, 5, 30]).unwrap();
        let frame = vehicle.command_frame();
        assert_eq!(vehicle.mode(), ControlMode::Manual);
        assert_eq!(frame.controls, 0);
        assert_eq!(frame.left_motor_speed, 0);
        assert!(!frame.command(CommandBit::RightServo));
    }

    #[test]
    fn test_set_mode_transitions(){
        let vehicle = SharedVehicleState::new();
        assert_eq!(vehicle.mode(), ControlMode::Manual);
        vehicle.set_mode(true);
        assert_eq!(vehicle.mode(), ControlMode::Auto);
        assert_eq!(vehicle.mode_signal().current(), ControlMode::Auto);
        assert_eq!(vehicle.take_outgoing_frame()[3] & 0b10, 0b10);
        vehicle.set_mode(false);
        assert_eq!(vehicle.mode(), ControlMode::Manual);
        assert_eq!(vehicle.mode_signal().snapshot(), (ControlMode::Manual, 2));
    }

    #[test]
    fn test_operator_update_publishes_mode(){
        let vehicle = SharedVehicleState::new();
        vehicle.apply_operator_update(&[0, 0, 0, 0b10, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(vehicle.mode_signal().current(), ControlMode::Auto);
    }

    #[test]
    fn test_request_feedback_toggles_sequence_bit(){
        let mut state = VehicleState::new();
        assert!(state.request_feedback());
        assert_eq!(state.take_outgoing_frame()[3], 0b1000_0000);
        assert!(!state.request_feedback());
        assert_eq!(state.take_outgoing_frame()[3], 0);
    }

    #[test]
    fn test_target_telemetry(){
        let vehicle = SharedVehicleState::new();
        assert_eq!(vehicle.target(), None);
        vehicle.update_target(160.0, 100.5);
        assert_eq!(vehicle.target(), Some(TargetFix{ x: 160.0, y: 100.5 }));
        vehicle.clear_target();
        assert_eq!(vehicle.target(), None);
        //telemetry does not touch the outgoing frame
        assert!(!vehicle.peek_dirty());
    }

    #[test]
    fn test_shutdown_flag(){
        let vehicle = SharedVehicleState::new();
        let other = vehicle.clone();
        assert!(other.is_running());
        vehicle.shutdown();
        assert!(!other.is_running());
    }

    #[test]
    fn test_concurrent_bit_producers_lose_no_updates(){
        let vehicle = SharedVehicleState::new();
        let done = Arc::new(AtomicBool::new(false));

        let producers: Vec<_> = ControlBit::ALL.iter().enumerate().map(|(n, &bit)|{
            let vehicle = vehicle.clone();
            thread::spawn(move ||{
                for _ in 0..500{
                    vehicle.set_control_bit(bit);
                    vehicle.clear_control_bit(bit);
                }
                //even bits end set
                if n % 2 == 0{
                    vehicle.set_control_bit(bit);
                }
            })
        }).collect();

        let consumer ={
            let vehicle = vehicle.clone();
            let done = Arc::clone(&done);
            thread::spawn(move ||{
                let mut seen = 0usize;
                while !done.load(Ordering::SeqCst){
                    if let Some(frame) = vehicle.take_outgoing_if_dirty(){
                        assert_eq!(frame[0] & !0x1F, 0);
                        assert_eq!(&frame[1..], &[0, 0, 0, 0, 0]);
                        seen += 1;
                    }
                }
                seen
            })
        };

        for producer in producers{
            producer.join().unwrap();
        }
        done.store(true, Ordering::SeqCst);
        consumer.join().unwrap();

        assert_eq!(vehicle.take_outgoing_frame()[0], 0b0001_0101);
        assert!(!vehicle.peek_dirty());
    }

    #[test]
    fn test_concurrent_bulk_updates_never_torn(){
        let vehicle = SharedVehicleState::new();
        let done = Arc::new(AtomicBool::new(false));

        //controls = k, sensitivity = 3k, left speed 100% (== sensitivity),
        //servo bit = k odd
        let producers: Vec<_> = (0..4u8).map(|offset|{
            let vehicle = vehicle.clone();
            thread::spawn(move ||{
                for round in 0..400u32{
                    let k = ((round as u8).wrapping_add(offset * 7)) % 32;
                    let payload = [k, 100, 0, k & 1, k * 3, 0, 0, 0, 0, 0, 0];
                    vehicle.apply_operator_update(&payload).unwrap();
                }
            })
        }).collect();

        let consumer ={
            let vehicle = vehicle.clone();
            let done = Arc::clone(&done);
            thread::spawn(move ||{
                while !done.load(Ordering::SeqCst){
                    let frame = vehicle.take_outgoing_frame();
                    assert_eq!(frame[4], frame[0] * 3, "torn frame {:?}", frame);
                    assert_eq!(frame[1], frame[4], "torn frame {:?}", frame);
                    assert_eq!(frame[3] & 1, frame[0] & 1, "torn frame {:?}", frame);
                }
            })
        };

        for producer in producers{
            producer.join().unwrap();
        }
        done.store(true, Ordering::SeqCst);
        consumer.join().unwrap();
    }
}
