/// Section header block type, first four bytes of every pcapng file.
pub const PCAPNG_MAGIC: [u8; 4] = [0x0a, 0x0d, 0x0d, 0x0a];

pub const READER_BUFFER_SIZE: usize = 64 * 1024;

/// pcapng default `if_tsresol`: microseconds.
pub const PCAPNG_DEFAULT_TS_UNITS_PER_SEC: f64 = 1e6;
