pub mod framing;
pub use framing::*;

use std::io::{Read, Write};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, error, info};
use serialport::SerialPort;

use crate::error::LinkError;
use crate::protocol::{ControlBit, Side};
use crate::vehicle::SharedVehicleState;

const READ_CHUNK: usize = 256;
const ERROR_BACKOFF: Duration = Duration::from_millis(100);
const IDLE_BACKOFF: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats{
    pub commands_sent: u64,
    pub pid_updates_sent: u64,
    pub feedback_accepted: u64,
    pub feedback_rejected: u64,
}

/// Serial transport between the vehicle state and the microcontroller.
///
/// Blocking reads and writes happen here, never while the vehicle permit is
/// held: the state is only touched through its short operations.
pub struct SerialLink<P: Read + Write>{
    port: P,
    vehicle: SharedVehicleState,
    parser: FrameParser,
    stats: LinkStats,
}

impl SerialLink<Box<dyn SerialPort>>{
    pub fn open(port_name: &str, baud_rate: u32, timeout: Duration, vehicle: SharedVehicleState) -> Result<Self, LinkError>{
        let port = serialport::new(port_name, baud_rate)
            .timeout(timeout)
            .open()?;
        info!("opened {} at {} baud", port_name, baud_rate);
        Ok(SerialLink::new(port, vehicle))
    }
}

impl<P: Read + Write> SerialLink<P>{
    pub fn new(port: P, vehicle: SharedVehicleState) -> Self{
        SerialLink{
            port,
            vehicle,
            parser: FrameParser::new(),
            stats: LinkStats::default(),
        }
    }

    pub fn stats(&self) -> LinkStats{
        self.stats
    }

    #[cfg(test)]
    fn port(&self) -> &P{
        &self.port
    }

    #[cfg(test)]
    fn port_mut(&mut self) -> &mut P{
        &mut self.port
    }

    //one read, then flush pending command/pid changes
    pub fn poll_once(&mut self) -> Result<(), LinkError>{
        self.receive()?;
        self.transmit()
    }

    fn receive(&mut self) -> Result<(), LinkError>{
        let mut read_buf = [0u8; READ_CHUNK];
        match self.port.read(&mut read_buf){
            Ok(n) if n > 0 =>{
                self.parser.push(&read_buf[..n]);
                self.process_frames();
            }
            //eof or a non-blocking port with nothing queued
            Ok(_) => thread::sleep(IDLE_BACKOFF),
            Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => {}
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {}
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    fn process_frames(&mut self){
        while let Some(frame) = self.parser.next_frame(){
            match frame.msg_type{
                MsgType::Feedback =>{
                    if self.vehicle.ingest_feedback(&frame.payload){
                        self.stats.feedback_accepted += 1;
                    }else{
                        self.stats.feedback_rejected += 1;
                    }
                }
                other => debug!("ignoring {:?} frame from vehicle", other),
            }
        }
    }

    fn transmit(&mut self) -> Result<(), LinkError>{
        //a failed write re-arms the flag so the next poll retries
        if let Some(frame) = self.vehicle.take_outgoing_if_dirty(){
            if let Err(e) = self.send_frame(MsgType::Command, &frame){
                self.vehicle.mark_dirty();
                return Err(e);
            }
            self.stats.commands_sent += 1;
        }

        let (params, changed) = self.vehicle.consume_pid_change();
        if changed{
            debug!("forwarding pid parameters {:?}", params);
            if let Err(e) = self.send_frame(MsgType::PidTuning, &params.to_raw()){
                self.vehicle.restore_pid_change();
                return Err(e);
            }
            self.stats.pid_updates_sent += 1;
        }
        Ok(())
    }

    pub fn send_frame(&mut self, msg_type: MsgType, payload: &[u8]) -> Result<(), LinkError>{
        let frame = encode_frame(msg_type, payload)?;
        self.port.write_all(&frame)?;
        self.port.flush()?;
        Ok(())
    }

    /// Poll until the vehicle is shut down, then command a stop.
    pub fn run(&mut self){
        info!("serial link running");

        while self.vehicle.is_running(){
            if let Err(e) = self.poll_once(){
                error!("serial link error: {}", e);
                thread::sleep(ERROR_BACKOFF);
            }
        }

        info!("stopping vehicle");
        let frame = self.vehicle.with(|state|{
            state.set_control_bit(ControlBit::Stop);
            state.set_started(false);
            state.set_motor_speed(Side::Left, 0);
            state.set_motor_speed(Side::Right, 0);
            state.take_outgoing_frame()
        });
        if let Err(e) = self.send_frame(MsgType::Command, &frame){
            error!("failed to send stop frame: {}", e);
        }
        info!("serial link stopped, {:?}", self.stats);
    }
}

impl<P: Read + Write + Send + 'static> SerialLink<P>{
    /// Start in background thread; the link is handed back on exit.
    pub fn start(mut self) -> JoinHandle<Self>{
        thread::spawn(move ||{
            self.run();
            self
        })
    }
}
