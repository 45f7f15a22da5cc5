/**
 * Operator link
 *
 * UDP listener for the operator console. Each datagram is an 11-byte
 * operator update (command layout + raw PID bytes). Fresh vehicle feedback
 * is sent back to whoever sent the last update.
 */

use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::protocol::FRAME_SIZE;
use crate::vehicle::SharedVehicleState;

const MAX_DATAGRAM: usize = 64;

pub struct OperatorLink {
    socket: UdpSocket,
    vehicle: SharedVehicleState,
}

impl OperatorLink {
    /// Bind the listener. `poll_timeout` bounds how long a receive may block
    /// before the shutdown flag is checked again.
    pub fn bind<A: ToSocketAddrs>(
        addr: A,
        poll_timeout: Duration,
        vehicle: SharedVehicleState,
    ) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        socket.set_read_timeout(Some(poll_timeout))?;
        info!("operator link listening on {}", socket.local_addr()?);
        Ok(Self { socket, vehicle })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Apply one operator datagram; returns the feedback reply, if any.
    pub fn handle_datagram(&self, data: &[u8]) -> Option<[u8; FRAME_SIZE]> {
        if let Err(e) = self.vehicle.apply_operator_update(data) {
            warn!("dropping operator packet: {}", e);
            return None;
        }
        self.vehicle.take_feedback().map(|frame| frame.encode())
    }

    pub fn run(&self) {
        let mut buf = [0u8; MAX_DATAGRAM];

        while self.vehicle.is_running() {
            match self.socket.recv_from(&mut buf) {
                Ok((n, peer)) => {
                    debug!("{} bytes from {}", n, peer);
                    if let Some(reply) = self.handle_datagram(&buf[..n]) {
                        if let Err(e) = self.socket.send_to(&reply, peer) {
                            warn!("failed to send feedback to {}: {}", peer, e);
                        }
                    }
                }
                Err(ref e)
                    if e.kind() == io::ErrorKind::WouldBlock
                        || e.kind() == io::ErrorKind::TimedOut => {}
                Err(e) => error!("operator link receive error: {}", e),
            }
        }

        info!("operator link stopped");
    }

    /// Start in background thread
    pub fn start(self) -> JoinHandle<()> {
        thread::spawn(move || {
            self.run();
        })
    }
}
