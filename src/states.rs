#[derive(Debug, Clone)]
pub struct TransportState {
    pub copying: bool,
    /// Set when some rule wants output to start; cleared once acted on.
    pub start_trigger: bool,
    /// Set when some rule wants output to stop; cleared once acted on.
    pub stop_trigger: bool,
    pub syncblips: u32,
    /// Frame index at which the latest sync blip completed.
    pub blip_frame: u64,
    /// Longest blip spacing seen from the fourth blip on; 0 until then.
    pub song_delta: u64,
    pub synctone_found: bool,
    pub found_name: bool,
    /// Raw name bytes, NUL-truncated and trimmed.
    pub song_name: Option<Vec<u8>>,
    /// Song number still being looked for; 1 means the current song.
    pub song_countdown: u32,
}

impl TransportState {
    pub fn new(song_number: u32) -> Self {
        Self {
            copying: false,
            start_trigger: false,
            stop_trigger: false,
            syncblips: 0,
            blip_frame: 0,
            song_delta: 0,
            synctone_found: false,
            found_name: false,
            song_name: None,
            song_countdown: song_number,
        }
    }
}
