//! Output sink for human-readable command progress.

use parking_lot::Mutex;

/// Where commands send progress lines.
pub trait RuntimeEnv: Send + Sync {
    fn log(&self, line: &str);
}

/// Prints progress lines to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultRuntime;

impl RuntimeEnv for DefaultRuntime {
    fn log(&self, line: &str) {
        println!("{line}");
    }
}

/// Buffers progress lines in memory instead of printing them.
#[derive(Debug, Default)]
pub struct CapturingRuntime {
    lines: Mutex<Vec<String>>,
}

impl CapturingRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl RuntimeEnv for CapturingRuntime {
    fn log(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}
