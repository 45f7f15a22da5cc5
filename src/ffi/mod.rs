use std::ptr;
use libc::c_int;
use crate::protocol::{ControlBit, Side, FRAME_SIZE};
use crate::vehicle::SharedVehicleState;

//status codes
pub const ROV_OK: c_int = 0;
pub const ROV_ERR_NULL: c_int = -1;
pub const ROV_ERR_LENGTH: c_int = -2;
pub const ROV_ERR_ARG: c_int = -3;

pub struct RovVehicle{
    inner: SharedVehicleState,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct RovFeedback{
    pub pixy_x: u16,
    pub pixy_y: u16,
    pub distance: u8,
    pub request_seq: u8,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct RovPid{
    pub p: f64,
    pub i: f64,
    pub d: f64,
    pub f: f64,
    pub ramp_rate: f64,
}

fn side_from(side: c_int) -> Option<Side>{
    match side{
        0 => Some(Side::Left),
        1 => Some(Side::Right),
        _ => None,
    }
}

#[no_mangle]
pub extern "C" fn rov_vehicle_new() -> *mut RovVehicle{
    let vehicle = Box::new(RovVehicle{
        inner: SharedVehicleState::new(),
    });
    Box::into_raw(vehicle)
}

/// Second handle to the same state, for another thread or actor.
#[no_mangle]
pub unsafe extern "C" fn rov_vehicle_clone(vehicle: *const RovVehicle) -> *mut RovVehicle{
    if vehicle.is_null(){
        return ptr::null_mut();
    }
    unsafe{
        let v = &*vehicle;
        Box::into_raw(Box::new(RovVehicle{ inner: v.inner.clone() }))
    }
}

#[no_mangle]
pub unsafe extern "C" fn rov_vehicle_free(vehicle: *mut RovVehicle){
    if !vehicle.is_null(){
        unsafe{ drop(Box::from_raw(vehicle)); }
    }
}

#[no_mangle]
pub unsafe extern "C" fn rov_vehicle_apply_operator_update(
    vehicle: *const RovVehicle,
    data: *const u8,
    len: usize,
) -> c_int{
    if vehicle.is_null() || data.is_null(){
        return ROV_ERR_NULL;
    }

    unsafe{
        let v = &*vehicle;
        let slice = std::slice::from_raw_parts(data, len);
        match v.inner.apply_operator_update(slice){
            Ok(()) => ROV_OK,
            Err(_) => ROV_ERR_LENGTH,
        }
    }
}

/// 1 accepted, 0 stale, negative on error.
#[no_mangle]
pub unsafe extern "C" fn rov_vehicle_ingest_feedback(
    vehicle: *const RovVehicle,
    data: *const u8,
    len: usize,
) -> c_int{
    if vehicle.is_null() || data.is_null(){
        return ROV_ERR_NULL;
    }

    unsafe{
        let v = &*vehicle;
        let slice = std::slice::from_raw_parts(data, len);
        match v.inner.try_ingest_feedback(slice){
            Ok(true) => 1,
            Ok(false) => 0,
            Err(_) => ROV_ERR_LENGTH,
        }
    }
}

/// Copies the 6-byte command frame into `out_frame` and clears the dirty
/// flag. Returns 1 if there were unsent changes, 0 if not.
#[no_mangle]
pub unsafe extern "C" fn rov_vehicle_take_outgoing_frame(
    vehicle: *const RovVehicle,
    out_frame: *mut u8,
) -> c_int{
    if vehicle.is_null() || out_frame.is_null(){
        return ROV_ERR_NULL;
    }

    unsafe{
        let v = &*vehicle;
        let (was_dirty, frame) = v.inner.with(|s| (s.peek_dirty(), s.take_outgoing_frame()));
        ptr::copy_nonoverlapping(frame.as_ptr(), out_frame, FRAME_SIZE);
        c_int::from(was_dirty)
    }
}

#[no_mangle]
pub unsafe extern "C" fn rov_vehicle_peek_dirty(vehicle: *const RovVehicle) -> bool{
    if vehicle.is_null(){
        return false;
    }
    unsafe{
        let v = &*vehicle;
        v.inner.peek_dirty()
    }
}

#[no_mangle]
pub unsafe extern "C" fn rov_vehicle_peek_feedback_available(vehicle: *const RovVehicle) -> bool{
    if vehicle.is_null(){
        return false;
    }
    unsafe{
        let v = &*vehicle;
        v.inner.peek_feedback_available()
    }
}

#[no_mangle]
pub unsafe extern "C" fn rov_vehicle_take_feedback(
    vehicle: *const RovVehicle,
    out_feedback: *mut RovFeedback,
) -> c_int{
    if vehicle.is_null() || out_feedback.is_null(){
        return ROV_ERR_NULL;
    }

    unsafe{
        let v = &*vehicle;
        match v.inner.take_feedback(){
            Some(frame) =>{
                *out_feedback = RovFeedback{
                    pixy_x: frame.pixy_x,
                    pixy_y: frame.pixy_y,
                    distance: frame.distance,
                    request_seq: frame.request_seq,
                };
                1
            }
            None => 0,
        }
    }
}

#[no_mangle]
pub unsafe extern "C" fn rov_vehicle_set_control(
    vehicle: *const RovVehicle,
    bit: u8,
    on: bool,
) -> c_int{
    if vehicle.is_null(){
        return ROV_ERR_NULL;
    }
    let bit = match ControlBit::from_index(bit){
        Some(bit) => bit,
        None => return ROV_ERR_ARG,
    };

    unsafe{
        let v = &*vehicle;
        if on{
            v.inner.set_control_bit(bit);
        }else{
            v.inner.clear_control_bit(bit);
        }
    }
    ROV_OK
}

/// `side`: 0 left, 1 right.
#[no_mangle]
pub unsafe extern "C" fn rov_vehicle_set_motor_speed(
    vehicle: *const RovVehicle,
    side: c_int,
    percent: u16,
) -> c_int{
    if vehicle.is_null(){
        return ROV_ERR_NULL;
    }
    let side = match side_from(side){
        Some(side) => side,
        None => return ROV_ERR_ARG,
    };

    unsafe{
        let v = &*vehicle;
        v.inner.set_motor_speed(side, percent);
    }
    ROV_OK
}

#[no_mangle]
pub unsafe extern "C" fn rov_vehicle_get_motor_speed(vehicle: *const RovVehicle, side: c_int) -> u32{
    if vehicle.is_null(){
        return 0;
    }
    match side_from(side){
        Some(side) => unsafe{ (*vehicle).inner.get_motor_speed(side) },
        None => 0,
    }
}

#[no_mangle]
pub unsafe extern "C" fn rov_vehicle_set_sensitivity(vehicle: *const RovVehicle, percent: u8) -> c_int{
    if vehicle.is_null(){
        return ROV_ERR_NULL;
    }
    unsafe{ (*vehicle).inner.set_sensitivity(percent); }
    ROV_OK
}

#[no_mangle]
pub unsafe extern "C" fn rov_vehicle_set_mode(vehicle: *const RovVehicle, auto: bool) -> c_int{
    if vehicle.is_null(){
        return ROV_ERR_NULL;
    }
    unsafe{ (*vehicle).inner.set_mode(auto); }
    ROV_OK
}

#[no_mangle]
pub unsafe extern "C" fn rov_vehicle_is_auto(vehicle: *const RovVehicle) -> bool{
    if vehicle.is_null(){
        return false;
    }
    unsafe{ (*vehicle).inner.mode().is_auto() }
}

#[no_mangle]
pub unsafe extern "C" fn rov_vehicle_update_target(vehicle: *const RovVehicle, x: f32, y: f32) -> c_int{
    if vehicle.is_null(){
        return ROV_ERR_NULL;
    }
    unsafe{ (*vehicle).inner.update_target(x, y); }
    ROV_OK
}

/// Writes the latest PID values; returns 1 if they changed since the last
/// call, 0 if they must not be resent.
#[no_mangle]
pub unsafe extern "C" fn rov_vehicle_consume_pid(
    vehicle: *const RovVehicle,
    out_pid: *mut RovPid,
) -> c_int{
    if vehicle.is_null() || out_pid.is_null(){
        return ROV_ERR_NULL;
    }

    unsafe{
        let v = &*vehicle;
        let (params, changed) = v.inner.consume_pid_change();
        *out_pid = RovPid{
            p: params.p,
            i: params.i,
            d: params.d,
            f: params.f,
            ramp_rate: params.ramp_rate,
        };
        c_int::from(changed)
    }
}

#[no_mangle]
pub unsafe extern "C" fn rov_vehicle_shutdown(vehicle: *const RovVehicle){
    if !vehicle.is_null(){
        unsafe{ (*vehicle).inner.shutdown(); }
    }
}
