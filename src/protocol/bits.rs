//single-byte bit helpers, bit index must be 0..=7

pub fn set_bit(byte: u8, bit: u8) -> u8{
    debug_assert!(bit < 8, "bit index {} out of range", bit);
    byte | (1 << bit)
}

pub fn clear_bit(byte: u8, bit: u8) -> u8{
    debug_assert!(bit < 8, "bit index {} out of range", bit);
    byte & !(1 << bit)
}

pub fn read_bit(byte: u8, bit: u8) -> bool{
    debug_assert!(bit < 8, "bit index {} out of range", bit);
    (byte >> bit) & 1 == 1
}

pub fn write_bit(byte: u8, bit: u8, on: bool) -> u8{
    if on{
        set_bit(byte, bit)
    }else{
        clear_bit(byte, bit)
    }
}
