//! CRC-16 as used by UMB (reflected polynomial 0x8408, initial value
//! 0xFFFF, no final XOR; also known as CRC-16/MCRF4XX).

const INITIAL: u16 = 0xFFFF;
const POLYNOMIAL: u16 = 0x8408;

/// Compute the UMB checksum of `data`.
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc = Crc16::new();
    crc.update(data);
    crc.finish()
}

/// Incremental UMB checksum.
#[derive(Debug, Clone, Copy)]
pub struct Crc16 {
    value: u16,
}

impl Crc16 {
    pub fn new() -> Self {
        Self { value: INITIAL }
    }

    /// Feed more bytes into the checksum.
    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.value = next(self.value, byte);
        }
    }

    /// The checksum of everything fed so far.
    pub fn finish(&self) -> u16 {
        self.value
    }
}

impl Default for Crc16 {
    fn default() -> Self {
        Self::new()
    }
}

fn next(mut crc: u16, mut byte: u8) -> u16 {
    for _ in 0..8 {
        let feedback = if (crc ^ u16::from(byte)) & 0x0001 != 0 {
            POLYNOMIAL
        } else {
            0
        };
        crc = (crc >> 1) ^ feedback;
        byte >>= 1;
    }
    crc
}
