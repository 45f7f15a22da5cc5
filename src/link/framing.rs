use log::warn;

use crate::error::LinkError;

pub const SYNC_BYTE: u8 = 0xAA;
pub const MAX_MSG_SIZE: usize = 244;
//sync + type + len + checksum
pub const FRAME_OVERHEAD: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MsgType{
    Feedback = 0x01,
    Command = 0x10,
    PidTuning = 0x11,
}

impl MsgType{
    pub fn from_u8(val: u8) -> Option<Self>{
        match val{
            0x01 => Some(MsgType::Feedback),
            0x10 => Some(MsgType::Command),
            0x11 => Some(MsgType::PidTuning),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFrame{
    pub msg_type: MsgType,
    pub payload: Vec<u8>,
}

pub fn calculate_checksum(data: &[u8]) -> u8{
    data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

pub fn encode_frame(msg_type: MsgType, payload: &[u8]) -> Result<Vec<u8>, LinkError>{
    if payload.len() > MAX_MSG_SIZE{
        return Err(LinkError::PayloadTooLarge(payload.len()));
    }

    let mut frame = Vec::with_capacity(FRAME_OVERHEAD + payload.len());
    frame.push(SYNC_BYTE);
    frame.push(msg_type as u8);
    frame.push(payload.len() as u8);
    frame.extend_from_slice(payload);

    let checksum = calculate_checksum(&frame[1..]);
    frame.push(checksum);
    Ok(frame)
}

/// Reassembles link frames from an arbitrary chunked byte stream.
#[derive(Debug, Default)]
pub struct FrameParser{
    rx_buffer: Vec<u8>,
}

impl FrameParser{
    pub fn new() -> Self{
        FrameParser{ rx_buffer: Vec::with_capacity(512) }
    }

    pub fn push(&mut self, data: &[u8]){
        self.rx_buffer.extend_from_slice(data);
    }

    pub fn buffered(&self) -> usize{
        self.rx_buffer.len()
    }

    pub fn next_frame(&mut self) -> Option<LinkFrame>{
        //frame format: [SYNC][TYPE][LEN][PAYLOAD...][CHECKSUM]
        //              0xAA  1byte 1byte  LEN bytes   1byte
        loop{
            if self.rx_buffer.len() < FRAME_OVERHEAD{
                return None;
            }

            //no sync byte anywhere means the whole buffer is noise
            let sync_pos = match self.rx_buffer.iter().position(|&b| b == SYNC_BYTE){
                Some(pos) => pos,
                None =>{
                    self.rx_buffer.clear();
                    return None;
                }
            };
            if sync_pos > 0{
                self.rx_buffer.drain(0..sync_pos);
            }

            if self.rx_buffer.len() < FRAME_OVERHEAD{
                return None;
            }

            let msg_type_byte = self.rx_buffer[1];
            let len = self.rx_buffer[2] as usize;

            if len > MAX_MSG_SIZE{
                self.rx_buffer.remove(0);
                continue;
            }

            let frame_len = FRAME_OVERHEAD + len;
            if self.rx_buffer.len() < frame_len{
                return None;
            }

            let checksum = self.rx_buffer[3 + len];
            let calculated = calculate_checksum(&self.rx_buffer[1..3 + len]);
            if checksum != calculated{
                self.rx_buffer.remove(0);
                continue;
            }

            let payload = self.rx_buffer[3..3 + len].to_vec();
            self.rx_buffer.drain(0..frame_len);

            match MsgType::from_u8(msg_type_byte){
                Some(msg_type) => return Some(LinkFrame{ msg_type, payload }),
                None => warn!("skipping frame with unknown type 0x{:02X}", msg_type_byte),
            }
        }
    }
}

#[cfg(test)]
mod tests{
    use super::*;

    #[test]
    fn test_msg_type_conversion(){
        assert_eq!(MsgType::from_u8(0x01), Some(MsgType::Feedback));
        assert_eq!(MsgType::from_u8(0x11), Some(MsgType::PidTuning));
        assert_eq!(MsgType::from_u8(0xFF), None);
    }

    #[test]
    fn test_checksum(){
        let data = [0x01, 0x05, 0xAB, 0xCD];
        let checksum = calculate_checksum(&data);
        assert_eq!(checksum, 0x01u8.wrapping_add(0x05).wrapping_add(0xAB).wrapping_add(0xCD));
    }

    #[test]
    fn test_encode_frame_layout(){
        let frame = encode_frame(MsgType::Command, &[1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(frame.len(), 10);
        assert_eq!(&frame[..3], &[SYNC_BYTE, 0x10, 6]);
        assert_eq!(&frame[3..9], &[1, 2, 3, 4, 5, 6]);
        assert_eq!(frame[9], calculate_checksum(&frame[1..9]));
    }

    #[test]
    fn test_encode_rejects_oversize(){
        let payload = vec![0u8; MAX_MSG_SIZE + 1];
        assert!(matches!(
            encode_frame(MsgType::Command, &payload),
            Err(LinkError::PayloadTooLarge(245))
        ));
    }

    #[test]
    fn test_parse_after_garbage_and_split_reads(){
        let frame = encode_frame(MsgType::Feedback, &[9, 8, 7, 6, 5, 4]).unwrap();
        let mut parser = FrameParser::new();
        parser.push(&[0x00, 0x13, 0x37]);
        parser.push(&frame[..5]);
        assert_eq!(parser.next_frame(), None);

        parser.push(&frame[5..]);
        let parsed = parser.next_frame().unwrap();
        assert_eq!(parsed.msg_type, MsgType::Feedback);
        assert_eq!(parsed.payload, vec![9, 8, 7, 6, 5, 4]);
        assert_eq!(parser.buffered(), 0);
    }

    #[test]
    fn test_bad_checksum_is_skipped(){
        let mut bad = encode_frame(MsgType::Feedback, &[1, 1, 1, 1, 1, 1]).unwrap();
        let last = bad.len() - 1;
        bad[last] ^= 0xFF;
        let good = encode_frame(MsgType::Feedback, &[2, 2, 2, 2, 2, 2]).unwrap();

        let mut parser = FrameParser::new();
        parser.push(&bad);
        parser.push(&good);
        assert_eq!(parser.next_frame().unwrap().payload, vec![2; 6]);
        assert_eq!(parser.next_frame(), None);
    }

    #[test]
    fn test_unknown_type_is_dropped_not_stuck(){
        let mut unknown = vec![SYNC_BYTE, 0x42, 1, 0x00];
        unknown.push(calculate_checksum(&unknown[1..]));
        let good = encode_frame(MsgType::Feedback, &[3; 6]).unwrap();

        let mut parser = FrameParser::new();
        parser.push(&unknown);
        parser.push(&good);
        assert_eq!(parser.next_frame().unwrap().payload, vec![3; 6]);
    }

    #[test]
    fn test_noise_without_sync_is_discarded(){
        let mut parser = FrameParser::new();
        parser.push(&[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(parser.next_frame(), None);
        assert_eq!(parser.buffered(), 0);
    }
}
