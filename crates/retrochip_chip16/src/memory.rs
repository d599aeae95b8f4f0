//! Flat 64 KB address space shared by ROM, RAM, the stack and the I/O
//! ports. ROM contents are simply copied into RAM at load time and may be
//! overwritten by the program.

pub const MEMORY_SIZE: usize = 0x10000;

/// Start of the ROM/RAM region.
pub const ROM_START: u16 = 0x0000;
/// Start of the 512-byte call/data stack.
pub const STACK_START: u16 = 0xFDF0;
/// Start of the 4-byte controller I/O window.
pub const IO_START: u16 = 0xFFF0;

/// Image header magic, "CH16".
const MAGIC: [u8; 4] = [0x43, 0x48, 0x31, 0x36];
const HEADER_SIZE: usize = 0x10;

/// Optional 16-byte image header. Presence is detected solely by the magic
/// signature; everything else is informational apart from the start address.
#[derive(Debug, Clone, Copy)]
struct RomHeader {
    version: u8,
    body_size: u32,
    start_address: u16,
    crc32: u32,
}

impl RomHeader {
    fn parse(data: &[u8]) -> Option<RomHeader> {
        if data.len() < MAGIC.len() || data[..MAGIC.len()] != MAGIC {
            return None;
        }
        // A short image zero-fills the missing header fields rather than
        // failing the load.
        let byte = |index: usize| data.get(index).copied().unwrap_or(0);
        Some(RomHeader {
            version: byte(0x05),
            body_size: u32::from_be_bytes([byte(0x06), byte(0x07), byte(0x08), byte(0x09)]),
            start_address: u16::from_be_bytes([byte(0x0A), byte(0x0B)]),
            crc32: u32::from_be_bytes([byte(0x0C), byte(0x0D), byte(0x0E), byte(0x0F)]),
        })
    }
}

pub struct Memory {
    bytes: [u8; MEMORY_SIZE],
}

impl Default for Memory {
    fn default() -> Self {
        Memory {
            bytes: [0; MEMORY_SIZE],
        }
    }
}

impl Memory {
    pub fn reset(&mut self) {
        self.bytes = [0; MEMORY_SIZE];
    }

    #[inline]
    pub fn read_byte(&self, address: u16) -> u8 {
        self.bytes[address as usize]
    }

    #[inline]
    pub fn write_byte(&mut self, address: u16, value: u8) {
        self.bytes[address as usize] = value;
    }

    /// Reads a 16-bit word, most significant byte first. The second byte
    /// wraps around the top of the address space.
    #[inline]
    pub fn read_word(&self, address: u16) -> u16 {
        u16::from(self.read_byte(address)) << 8 | u16::from(self.read_byte(address.wrapping_add(1)))
    }

    /// Inverse of [`read_word`](Self::read_word): high byte at `address`,
    /// low byte at `address + 1`.
    #[inline]
    pub fn write_word(&mut self, address: u16, value: u16) {
        self.write_byte(address, (value >> 8) as u8);
        self.write_byte(address.wrapping_add(1), value as u8);
    }

    /// Reads a 4-byte instruction word, first byte most significant.
    pub fn read_opcode(&self, address: u16) -> u32 {
        let mut word = 0u32;
        for offset in 0..4 {
            word = word << 8 | u32::from(self.read_byte(address.wrapping_add(offset)));
        }
        word
    }

    /// Copies an image into memory starting at address 0 and returns the
    /// execution start address.
    ///
    /// If the image begins with the "CH16" magic, the 16-byte header is
    /// stripped and its start-address field is returned; otherwise the whole
    /// image is raw code/data and execution starts at 0. Memory beyond the
    /// image is zeroed. Loading never fails: short images zero-fill.
    pub fn load_image(&mut self, data: &[u8]) -> u16 {
        let (body_offset, start_address) = match RomHeader::parse(data) {
            Some(header) => {
                log::info!(
                    "image header: spec version {}, body size {} B, start {:#06x}, crc32 {:#010x}",
                    header.version,
                    header.body_size,
                    header.start_address,
                    header.crc32,
                );
                (HEADER_SIZE, header.start_address)
            }
            None => {
                log::info!("no image header, loading raw code at {:#06x}", ROM_START);
                (0, 0)
            }
        };

        let body = &data[body_offset.min(data.len())..];
        let length = body.len().min(MEMORY_SIZE);
        self.bytes = [0; MEMORY_SIZE];
        self.bytes[..length].copy_from_slice(&body[..length]);
        start_address
    }
}
