pub mod field;
pub mod pattern;

pub const SYNC_BLIP: &[u8] = &[
    0x76, 0x53, 0x19, 0x52, //
    0x76, 0x53, 0x19, 0x52, //
    0x76, 0x53, 0x19, 0x52, //
    0x76, 0x53, 0x19, 0x52,
];

pub const SYNC_TONE_FRAMES: usize = 4;
pub const SYNC_TONE: &[u8] = &[
    0x00, 0x00, 0x00, 0x00, //
    0x00, 0x10, 0x00, 0x10, //
    0x00, 0x10, 0x00, 0x10, //
    0x00, 0x10, 0x00, 0x10,
];

/// Length of the song name stored after the first sync blip.
pub const NAME_LEN: usize = 16;
/// Frames between the end of the first sync blip and the name field.
pub const NAME_OFFSET: u64 = 11;
/// Left channel, byte swapped.
pub const NAME_SELECTION: &[usize] = &[1, 0];
pub const NAME_SKIP_FIRST: usize = 1;
