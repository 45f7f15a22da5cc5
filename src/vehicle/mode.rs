/**
 * Mode / control state machine
 *
 * Two states, Manual (initial) and Auto, driven by the auto/manual bit of the
 * outgoing command frame. The supervisor sleeps on a condition variable and
 * only wakes when the mode changes or the process shuts down.
 */

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use log::info;

use crate::protocol::{read_bit, CommandBit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ControlMode {
    #[default]
    Manual,
    Auto,
}

/// Who may drive the motor/servo setters in a given mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandSource {
    Operator,
    Autopilot,
}

impl ControlMode {
    pub fn from_auto(auto: bool) -> Self {
        if auto {
            ControlMode::Auto
        } else {
            ControlMode::Manual
        }
    }

    /// Mode encoded in a `commands` byte.
    pub fn from_commands(commands: u8) -> Self {
        Self::from_auto(read_bit(commands, CommandBit::AutoMode.index()))
    }

    pub fn is_auto(self) -> bool {
        self == ControlMode::Auto
    }

    pub fn authority(self) -> CommandSource {
        match self {
            ControlMode::Manual => CommandSource::Operator,
            ControlMode::Auto => CommandSource::Autopilot,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeEvent {
    Changed { mode: ControlMode, generation: u64 },
    Shutdown,
}

#[derive(Debug)]
struct SignalState {
    mode: ControlMode,
    generation: u64,
    shutdown: bool,
}

/// Mode-change / shutdown notification shared between the vehicle state
/// (publisher) and the supervisor (waiter).
#[derive(Debug)]
pub struct ModeSignal {
    state: Mutex<SignalState>,
    changed: Condvar,
}

impl Default for ModeSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeSignal {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SignalState {
                mode: ControlMode::Manual,
                generation: 0,
                shutdown: false,
            }),
            changed: Condvar::new(),
        }
    }

    /// Record `mode`; wakes waiters only if it differs from the last one.
    pub fn publish(&self, mode: ControlMode) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.mode == mode {
            return false;
        }
        state.mode = mode;
        state.generation += 1;
        drop(state);
        self.changed.notify_all();
        true
    }

    pub fn shutdown(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.shutdown = true;
        drop(state);
        self.changed.notify_all();
    }

    pub fn is_shutdown(&self) -> bool {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).shutdown
    }

    pub fn current(&self) -> ControlMode {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).mode
    }

    /// Current mode and its generation counter.
    pub fn snapshot(&self) -> (ControlMode, u64) {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        (state.mode, state.generation)
    }

    /// Block until the generation moves past `seen` or shutdown is signalled.
    pub fn wait_for_change(&self, seen: u64) -> ModeEvent {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        while !state.shutdown && state.generation == seen {
            state = self.changed.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
        Self::event(&state)
    }

    #[cfg(test)]
    fn wait_for_change_timeout(&self, seen: u64, timeout: std::time::Duration) -> Option<ModeEvent> {
        use std::time::Instant;

        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        while !state.shutdown && state.generation == seen {
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            let (next, _) = self
                .changed
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            state = next;
        }
        Some(Self::event(&state))
    }

    fn event(state: &SignalState) -> ModeEvent {
        if state.shutdown {
            ModeEvent::Shutdown
        } else {
            ModeEvent::Changed {
                mode: state.mode,
                generation: state.generation,
            }
        }
    }
}

/// Receives control-authority handovers from the supervisor.
pub trait ModeObserver {
    fn on_mode(&mut self, mode: ControlMode);

    fn on_shutdown(&mut self) {}
}

/// Observer that only logs the handover.
#[derive(Debug, Default)]
pub struct AuthorityLog;

impl ModeObserver for AuthorityLog {
    fn on_mode(&mut self, mode: ControlMode) {
        info!("[MODE] {:?}, control authority: {:?}", mode, mode.authority());
    }

    fn on_shutdown(&mut self) {
        info!("[MODE] supervisor stopped");
    }
}

pub struct ModeSupervisor {
    signal: Arc<ModeSignal>,
}

impl ModeSupervisor {
    pub fn new(signal: Arc<ModeSignal>) -> Self {
        Self { signal }
    }

    /// Dispatch the current mode, then every change, until shutdown.
    pub fn run<O: ModeObserver>(&self, observer: &mut O) {
        let (mode, mut seen) = self.signal.snapshot();
        if self.signal.is_shutdown() {
            observer.on_shutdown();
            return;
        }
        observer.on_mode(mode);

        loop {
            match self.signal.wait_for_change(seen) {
                ModeEvent::Changed { mode, generation } => {
                    seen = generation;
                    observer.on_mode(mode);
                }
                ModeEvent::Shutdown => {
                    observer.on_shutdown();
                    break;
                }
            }
        }
    }

    /// Start in background thread; the observer is handed back on exit.
    pub fn start<O: ModeObserver + Send + 'static>(self, mut observer: O) -> JoinHandle<O> {
        thread::spawn(move || {
            self.run(&mut observer);
            observer
        })
    }
}
