// src/output.rs
use parking_lot::Mutex;

/// Line-oriented reply channel.
pub trait OutputSink: Send + Sync {
    fn deliver(&self, line: &str);
}

/// Writes each line to stdout tagged with the channel name.
pub struct ConsoleSink {
    channel: String,
}

impl ConsoleSink {
    pub fn new(channel: &str) -> Self {
        Self { channel: channel.to_string() }
    }
}

impl OutputSink for ConsoleSink {
    fn deliver(&self, line: &str) {
        println!("[{}] {}", self.channel, line);
    }
}

/// Keeps every delivered line in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl OutputSink for MemorySink {
    fn deliver(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}
