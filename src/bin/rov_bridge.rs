/**
 * ROV Bridge Binary
 *
 * Runs the bridge that:
 * 1. Connects to the vehicle microcontroller via serial
 * 2. Listens for operator updates over UDP
 * 3. Supervises manual/auto control authority
 * 4. Offers a keyboard console for bench testing
 *
 * Usage: rov_bridge [--port PATH] [--baud RATE] [--listen ADDR]
 * Log level via RUST_LOG (e.g. RUST_LOG=debug).
 */

use rov_sync::config::usage;
use rov_sync::vehicle::{AuthorityLog, ModeSupervisor};
use rov_sync::{BridgeConfig, ControlBit, OperatorLink, SerialLink, SharedVehicleState, Side};
use std::io::{self, Write};
use std::process;

const CONSOLE_SPEED: u16 = 60;

fn drive(vehicle: &SharedVehicleState, bit: Option<ControlBit>, left: u16, right: u16) {
    vehicle.with(|state| {
        for control in ControlBit::ALL {
            state.clear_control_bit(control);
        }
        if let Some(control) = bit {
            state.set_control_bit(control);
        }
        state.set_motor_speed(Side::Left, left);
        state.set_motor_speed(Side::Right, right);
    });
}

fn print_telemetry(vehicle: &SharedVehicleState) {
    let feedback = vehicle.feedback();
    println!(
        "[FEEDBACK] pixy=({}, {}) distance={} cm seq={}",
        feedback.pixy_x, feedback.pixy_y, feedback.distance, feedback.request_seq
    );
    match vehicle.target() {
        Some(t) => println!("[TARGET] x={:.1} y={:.1}", t.x, t.y),
        None => println!("[TARGET] none"),
    }
    let pid = vehicle.pid_parameters();
    println!(
        "[PID] P={:.1} I={:.1} D={:.1} F={:.1} RR={:.1}",
        pid.p, pid.i, pid.d, pid.f, pid.ramp_rate
    );
    println!(
        "[STATE] mode={:?} sensitivity={}% frame={:02X?}",
        vehicle.mode(),
        vehicle.sensitivity(),
        vehicle.command_frame().encode()
    );
}

fn main() {
    env_logger::init();

    let config = match BridgeConfig::from_args(std::env::args().skip(1)) {
        Ok(Some(config)) => config,
        Ok(None) => {
            println!("{}", usage());
            return;
        }
        Err(e) => {
            eprintln!("{}\n\n{}", e, usage());
            process::exit(2);
        }
    };

    println!("==============================================");
    println!("  ROV Bridge");
    println!("==============================================");
    println!("  Serial: {} @ {}", config.serial_port, config.baud_rate);
    println!("  Operator: udp://{}", config.operator_addr);
    println!("==============================================\n");

    let vehicle = SharedVehicleState::new();

    let link = match SerialLink::open(&config.serial_port, config.baud_rate, config.timeout, vehicle.clone()) {
        Ok(link) => link,
        Err(e) => {
            log::error!("failed to open {}: {}", config.serial_port, e);
            process::exit(1);
        }
    };
    let operator = match OperatorLink::bind(config.operator_addr.as_str(), config.timeout, vehicle.clone()) {
        Ok(operator) => operator,
        Err(e) => {
            log::error!("failed to bind {}: {}", config.operator_addr, e);
            process::exit(1);
        }
    };

    let link_handle = link.start();
    let operator_handle = operator.start();
    let supervisor_handle = ModeSupervisor::new(vehicle.mode_signal()).start(AuthorityLog);

    println!("[Commands]");
    println!("  w/s - forward/reverse");
    println!("  a/d - turn left/right");
    println!("  space - stop");
    println!("  + / - - sensitivity up/down");
    println!("  auto/manual - control mode");
    println!("  start/halt - enable/disable vehicle");
    println!("  servo/unservo - right servo");
    println!("  f - request feedback");
    println!("  r - show telemetry");
    println!("  x - exit\n");

    loop {
        print!("> ");
        if let Err(e) = io::stdout().flush() {
            log::warn!("stdout flush failed: {}", e);
        }

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        match input.trim_end_matches(['\r', '\n']) {
            "w" => drive(&vehicle, Some(ControlBit::Forward), CONSOLE_SPEED, CONSOLE_SPEED),
            "s" => drive(&vehicle, Some(ControlBit::Reverse), CONSOLE_SPEED, CONSOLE_SPEED),
            "a" => drive(&vehicle, Some(ControlBit::Left), 0, CONSOLE_SPEED),
            "d" => drive(&vehicle, Some(ControlBit::Right), CONSOLE_SPEED, 0),
            " " | "stop" => drive(&vehicle, Some(ControlBit::Stop), 0, 0),
            "+" => vehicle.set_sensitivity(vehicle.sensitivity().saturating_add(10)),
            "-" => vehicle.set_sensitivity(vehicle.sensitivity().saturating_sub(10)),
            "auto" => vehicle.set_mode(true),
            "manual" => vehicle.set_mode(false),
            "start" => vehicle.set_started(true),
            "halt" => vehicle.set_started(false),
            "servo" => vehicle.set_servo(true),
            "unservo" => vehicle.set_servo(false),
            "f" => {
                let bit = vehicle.request_feedback();
                println!("[REQUEST] sequence bit {}", u8::from(bit));
            }
            "r" | "sensors" => print_telemetry(&vehicle),
            "x" | "exit" | "quit" => {
                println!("[SHUTDOWN]");
                break;
            }
            "" => {}
            other => println!("Unknown command: {}", other),
        }
    }

    vehicle.shutdown();
    if link_handle.join().is_err() {
        log::error!("serial link thread panicked");
    }
    if operator_handle.join().is_err() {
        log::error!("operator link thread panicked");
    }
    if supervisor_handle.join().is_err() {
        log::error!("mode supervisor thread panicked");
    }
    println!("Goodbye!");
}
