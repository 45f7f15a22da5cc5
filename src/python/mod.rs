use pyo3::prelude::*;
use pyo3::exceptions::PyValueError;
use crate::protocol::{ControlBit, Side};
use crate::vehicle::SharedVehicleState;

fn parse_side(side: &str) -> PyResult<Side>{
    match side{
        "left" => Ok(Side::Left),
        "right" => Ok(Side::Right),
        _ => Err(PyValueError::new_err(format!("Unknown side: {}", side))),
    }
}

fn parse_control(name: &str) -> PyResult<ControlBit>{
    ControlBit::from_name(name)
        .ok_or_else(|| PyValueError::new_err(format!("Unknown control: {}", name)))
}

//handle for a python vision tracker / autopilot
#[pyclass(name = "Vehicle")]
#[derive(Clone)]
pub struct PyVehicle{
    inner: SharedVehicleState,
}

impl PyVehicle{
    pub fn from_shared(inner: SharedVehicleState) -> Self{
        PyVehicle{ inner }
    }
}

#[pymethods]
impl PyVehicle{
    #[new]
    fn new() -> Self{
        PyVehicle{ inner: SharedVehicleState::new() }
    }

    fn update_target(&self, x: f32, y: f32){
        self.inner.update_target(x, y);
    }

    fn clear_target(&self){
        self.inner.clear_target();
    }

    fn target(&self) -> Option<(f32, f32)>{
        self.inner.target().map(|t| (t.x, t.y))
    }

    //(pixy_x, pixy_y, distance, request_seq)
    fn feedback(&self) -> (u16, u16, u8, u8){
        let f = self.inner.feedback();
        (f.pixy_x, f.pixy_y, f.distance, f.request_seq)
    }

    fn take_feedback(&self) -> Option<(u16, u16, u8, u8)>{
        self.inner.take_feedback().map(|f| (f.pixy_x, f.pixy_y, f.distance, f.request_seq))
    }

    fn ingest_feedback(&self, data: &[u8]) -> bool{
        self.inner.ingest_feedback(data)
    }

    fn apply_operator_update(&self, data: &[u8]) -> PyResult<()>{
        self.inner.apply_operator_update(data)
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    fn set_control(&self, name: &str, on: bool) -> PyResult<()>{
        let bit = parse_control(name)?;
        if on{
            self.inner.set_control_bit(bit);
        }else{
            self.inner.clear_control_bit(bit);
        }
        Ok(())
    }

    fn control(&self, name: &str) -> PyResult<bool>{
        Ok(self.inner.control(parse_control(name)?))
    }

    fn set_motor_speed(&self, side: &str, percent: u16) -> PyResult<()>{
        self.inner.set_motor_speed(parse_side(side)?, percent);
        Ok(())
    }

    fn motor_speed(&self, side: &str) -> PyResult<u32>{
        Ok(self.inner.get_motor_speed(parse_side(side)?))
    }

    fn set_sensitivity(&self, percent: u8){
        self.inner.set_sensitivity(percent);
    }

    fn set_servo(&self, on: bool){
        self.inner.set_servo(on);
    }

    fn set_mode(&self, auto: bool){
        self.inner.set_mode(auto);
    }

    fn is_auto(&self) -> bool{
        self.inner.mode().is_auto()
    }

    fn take_outgoing_frame(&self) -> Vec<u8>{
        self.inner.take_outgoing_frame().to_vec()
    }

    fn is_dirty(&self) -> bool{
        self.inner.peek_dirty()
    }

    fn pid(&self) -> (f64, f64, f64, f64, f64){
        let p = self.inner.pid_parameters();
        (p.p, p.i, p.d, p.f, p.ramp_rate)
    }

    fn is_running(&self) -> bool{
        self.inner.is_running()
    }

    fn shutdown(&self){
        self.inner.shutdown();
    }
}

#[pymodule]
fn rov_sync(_py: Python, m: &PyModule) -> PyResult<()>{
    m.add_class::<PyVehicle>()?;
    Ok(())
}

#[cfg(test)]
mod tests{
    use super::*;

    #[test]
    fn test_py_target_round_trip(){
        let vehicle = PyVehicle::new();
        assert_eq!(vehicle.target(), None);
        vehicle.update_target(12.5, 40.0);
        assert_eq!(vehicle.target(), Some((12.5, 40.0)));
    }

    #[test]
    fn test_py_shared_state(){
        let shared = SharedVehicleState::new();
        let vehicle = PyVehicle::from_shared(shared.clone());

        vehicle.set_sensitivity(100);
        vehicle.set_motor_speed("right", 42).unwrap();
        vehicle.set_control("forward", true).unwrap();
        vehicle.set_mode(true);

        assert_eq!(shared.get_motor_speed(Side::Right), 42);
        assert!(shared.control(ControlBit::Forward));
        assert!(vehicle.is_auto());
        assert_eq!(vehicle.take_outgoing_frame(), vec![0b10, 0, 42, 0b10, 100, 0]);
        assert!(!vehicle.is_dirty());
    }

    #[test]
    fn test_py_rejects_unknown_names(){
        let vehicle = PyVehicle::new();
        assert!(vehicle.set_motor_speed("middle", 10).is_err());
        assert!(vehicle.set_control("jump", true).is_err());
    }
}
