use crate::protocol::PID_FIELD_COUNT;

//raw tuning bytes carry one decimal
pub const PID_SCALE: f64 = 10.0;

/// Tuning values forwarded to the vehicle's controller.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PidParameters{
    pub p: f64,
    pub i: f64,
    pub d: f64,
    pub f: f64,         //feed forward
    pub ramp_rate: f64, //max output delta
}

impl PidParameters{
    pub fn from_raw(raw: [u8; PID_FIELD_COUNT]) -> Self{
        PidParameters{
            p: f64::from(raw[0]) / PID_SCALE,
            i: f64::from(raw[1]) / PID_SCALE,
            d: f64::from(raw[2]) / PID_SCALE,
            f: f64::from(raw[3]) / PID_SCALE,
            ramp_rate: f64::from(raw[4]) / PID_SCALE,
        }
    }

    //inverse of from_raw for values that came from it
    pub fn to_raw(&self) -> [u8; PID_FIELD_COUNT]{
        let encode = |v: f64| (v * PID_SCALE).round().clamp(0.0, 255.0) as u8;
        [
            encode(self.p),
            encode(self.i),
            encode(self.d),
            encode(self.f),
            encode(self.ramp_rate),
        ]
    }

    fn fields(&self) -> [f64; PID_FIELD_COUNT]{
        [self.p, self.i, self.d, self.f, self.ramp_rate]
    }
}

/// Latest tuning values plus a read-and-clear change flag.
#[derive(Debug, Clone, Default)]
pub struct PidTracker{
    params: PidParameters,
    changed: bool,
}

impl PidTracker{
    pub fn new() -> Self{
        Self::default()
    }

    //returns true if this update changed any value
    pub fn update(&mut self, raw: [u8; PID_FIELD_COUNT]) -> bool{
        let next = PidParameters::from_raw(raw);
        let differs = self.params.fields()
            .iter()
            .zip(next.fields().iter())
            .any(|(old, new)| old != new);

        if differs{
            self.params = next;
            self.changed = true;
        }
        differs
    }

    pub fn current(&self) -> PidParameters{
        self.params
    }

    //re-arm after a consumed change could not be delivered
    pub fn mark_changed(&mut self){
        self.changed = true;
    }

    pub fn consume(&mut self) -> (PidParameters, bool){
        let changed = self.changed;
        self.changed = false;
        (self.params, changed)
    }
}
