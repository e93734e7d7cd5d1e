//! Incremental JSON extraction from a token stream
//!
//! The model is prompted to include one structured JSON object somewhere in
//! its free-text output. This scanner watches the token deltas as they
//! arrive, captures the first balanced `{...}` candidate, and yields it as
//! soon as it parses — without waiting for the stream to finish.

/// Scanner states. `Escaped` only ever follows `InString`; `Balanced` is
/// terminal and the scanner refuses further input once reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Scanning,
    InString,
    Escaped,
    Balanced,
}

/// Character-at-a-time JSON scanner.
///
/// Input before the first `{` at depth zero is ignored. From there the
/// scanner buffers characters, tracking brace depth and string-literal
/// state so braces inside strings never affect the depth count. When the
/// depth returns to zero the buffer is parsed: success yields the value
/// exactly once; failure discards the candidate and resumes scanning, so
/// a later well-formed object can still be captured.
///
/// One growing buffer is the only allocation; the per-character transition
/// is branch-only, which matters since it runs over the model's entire
/// output in the worst case.
#[derive(Debug)]
pub struct JsonScanner {
    state: ScanState,
    buf: String,
    depth: u32,
    started: bool,
}

impl JsonScanner {
    /// Create a scanner in its initial state
    pub fn new() -> Self {
        Self {
            state: ScanState::Scanning,
            buf: String::new(),
            depth: 0,
            started: false,
        }
    }

    /// True once a value has been yielded; all further input is ignored.
    pub fn completed(&self) -> bool {
        self.state == ScanState::Balanced
    }

    /// Feed one delta of model output.
    ///
    /// Returns the captured object on the call whose final brace balances
    /// the candidate, `None` otherwise.
    pub fn feed(&mut self, delta: &str) -> Option<serde_json::Value> {
        if self.completed() {
            return None;
        }

        for c in delta.chars() {
            if !self.started {
                if c == '{' {
                    self.started = true;
                    self.depth = 1;
                    self.buf.push(c);
                }
                continue;
            }

            self.buf.push(c);
            match self.state {
                ScanState::Scanning => match c {
                    '"' => self.state = ScanState::InString,
                    '{' => self.depth += 1,
                    '}' => {
                        self.depth -= 1;
                        if self.depth == 0 {
                            match serde_json::from_str(&self.buf) {
                                Ok(value) => {
                                    self.state = ScanState::Balanced;
                                    return Some(value);
                                }
                                Err(_) => self.reset(),
                            }
                        }
                    }
                    _ => {}
                },
                ScanState::InString => match c {
                    '\\' => self.state = ScanState::Escaped,
                    '"' => self.state = ScanState::Scanning,
                    _ => {}
                },
                ScanState::Escaped => self.state = ScanState::InString,
                ScanState::Balanced => unreachable!("balanced scanner received input"),
            }
        }
        None
    }

    /// Discard the current candidate and resume looking for a `{`.
    fn reset(&mut self) {
        self.state = ScanState::Scanning;
        self.buf.clear();
        self.depth = 0;
        self.started = false;
    }
}

impl Default for JsonScanner {
    fn default() -> Self {
        Self::new()
    }
}
