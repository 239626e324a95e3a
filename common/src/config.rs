/// Global configuration options for a chat session.
///
/// This struct controls the runtime behavior of the application: which
/// interface carries the channel, where the frame profile lives, how loud
/// the logging is and where it is persisted. It is typically constructed
/// from CLI arguments.
#[derive(Debug, Clone)]
pub struct Config {
    /// Name of the network interface the channel is bound to (`-i`).
    pub interface: String,

    /// Path of the frame profile file (`-f`).
    ///
    /// The profile supplies the outgoing frame template and the optional
    /// receive filter rules. Loading it is mandatory; a missing or invalid
    /// profile aborts initialization.
    pub profile_path: String,

    /// Logging detail, mapped from `-d`.
    ///
    /// # Levels
    /// * **0** (Default): errors and warnings only.
    /// * **1**: standard progress messages.
    /// * **2**: verbose mode, including per-frame traces.
    pub verbosity: u8,

    /// Path of the persistent log file.
    ///
    /// Every event lands here regardless of `verbosity`, which only gates
    /// the terminal output.
    pub log_path: String,

    /// Column at which received text wraps into a new display line.
    pub wrap_width: usize,
}

pub const DEFAULT_WRAP_WIDTH: usize = 80;

impl Default for Config {
    fn default() -> Self {
        Self {
            interface: String::new(),
            profile_path: "./arpchat.toml".to_string(),
            verbosity: 0,
            log_path: "./arpchat.log.txt".to_string(),
            wrap_width: DEFAULT_WRAP_WIDTH,
        }
    }
}
