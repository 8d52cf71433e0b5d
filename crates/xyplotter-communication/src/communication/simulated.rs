//! In-process simulated GRBL device
//!
//! `SimulatedDevice` behaves like a GRBL controller on the far end of a
//! serial link: every complete line gets one reply, `?` and Ctrl-X are
//! handled as realtime bytes, and `G0` moves update a tracked position.
//! Handles are cheap clones sharing one device, so a test can keep a handle
//! while the controller owns another and inspect what was sent afterwards.

use super::{Transport, SOFT_RESET, STATUS_QUERY};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use xyplotter_core::{ConnectionError, Point};

/// Startup banner emitted after a soft reset
pub const GRBL_BANNER: &str = "Grbl 1.1h ['$' for help]";

/// How the simulated device answers command lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulatedBehavior {
    /// Acknowledge every line with `ok`
    Acknowledge,
    /// Answer the `move_number`-th `G0` line (1-based) with `error:<code>`
    FailOnMove { move_number: usize, code: u8 },
    /// Answer the `move_number`-th `G0` line (1-based) with `ALARM:<code>`
    AlarmOnMove { move_number: usize, code: u8 },
    /// Acknowledge the first `lines` command lines, then go quiet
    SilentAfter { lines: usize },
    /// Never answer anything
    Silent,
    /// Answer every command line with the given text
    Garbage(String),
    /// Hold the reply to the `move_number`-th `G0` line (1-based) for
    /// `delay`; later replies queue behind it
    LateOnMove { move_number: usize, delay: Duration },
}

#[derive(Debug)]
struct DeviceState {
    behavior: SimulatedBehavior,
    open: bool,
    close_count: usize,
    partial: String,
    /// Replies with the instant each becomes readable
    replies: VecDeque<(Instant, String)>,
    /// Readable instant of the newest line reply; line replies never overtake
    line_ready: Instant,
    sent: Vec<String>,
    lines_seen: usize,
    moves_seen: usize,
    position: Point,
    status_queries: usize,
}

impl DeviceState {
    fn new(behavior: SimulatedBehavior) -> Self {
        Self {
            behavior,
            open: true,
            close_count: 0,
            partial: String::new(),
            replies: VecDeque::new(),
            line_ready: Instant::now(),
            sent: Vec::new(),
            lines_seen: 0,
            moves_seen: 0,
            position: Point::ORIGIN,
            status_queries: 0,
        }
    }

    fn silent(&self) -> bool {
        match self.behavior {
            SimulatedBehavior::Silent => true,
            SimulatedBehavior::SilentAfter { lines } => self.lines_seen > lines,
            _ => false,
        }
    }

    fn realtime(&mut self, byte: u8) {
        match byte {
            STATUS_QUERY => {
                self.status_queries += 1;
                if !self.silent() {
                    let status = format!(
                        "<Idle|MPos:{:.3},{:.3},0.000|FS:0,0>",
                        self.position.x, self.position.y
                    );
                    self.replies.push_back((Instant::now(), status));
                }
            }
            SOFT_RESET => {
                self.partial.clear();
                self.replies.clear();
                let now = Instant::now();
                self.line_ready = now;
                self.replies.push_back((now, String::new()));
                self.replies.push_back((now, GRBL_BANNER.to_string()));
            }
            _ => {}
        }
    }

    fn line(&mut self, line: String) {
        let line = line.trim().to_string();
        if line.is_empty() {
            return;
        }
        self.lines_seen += 1;
        let is_move = line.starts_with("G0 ") || line.starts_with("G1 ");
        if is_move {
            self.moves_seen += 1;
        }
        self.sent.push(line.clone());

        let behavior = self.behavior.clone();
        let mut delay = Duration::ZERO;
        let reply = match &behavior {
            SimulatedBehavior::Silent => None,
            SimulatedBehavior::SilentAfter { .. } if self.silent() => None,
            SimulatedBehavior::Garbage(text) => Some(text.clone()),
            SimulatedBehavior::FailOnMove { move_number, code }
                if is_move && self.moves_seen == *move_number =>
            {
                Some(format!("error:{}", code))
            }
            SimulatedBehavior::AlarmOnMove { move_number, code }
                if is_move && self.moves_seen == *move_number =>
            {
                Some(format!("ALARM:{}", code))
            }
            SimulatedBehavior::LateOnMove {
                move_number,
                delay: hold,
            } if is_move && self.moves_seen == *move_number => {
                delay = *hold;
                self.execute(&line);
                Some("ok".to_string())
            }
            _ => {
                self.execute(&line);
                Some("ok".to_string())
            }
        };
        if let Some(reply) = reply {
            self.line_ready = self.line_ready.max(Instant::now() + delay);
            self.replies.push_back((self.line_ready, reply));
        }
    }

    /// Pop the first readable reply, or report how long until one is due
    fn next_reply(&mut self, now: Instant) -> Result<String, Option<Duration>> {
        let ready = self.replies.iter().position(|(at, _)| *at <= now);
        match ready.and_then(|i| self.replies.remove(i)) {
            Some((_, reply)) => Ok(reply),
            None => Err(self
                .replies
                .iter()
                .map(|(at, _)| at.saturating_duration_since(now))
                .min()),
        }
    }

    /// Apply the side effects of an accepted line
    fn execute(&mut self, line: &str) {
        if line == "$H" {
            self.position = Point::ORIGIN;
        } else if line.starts_with("G0 ") || line.starts_with("G1 ") {
            for word in line.split_whitespace().skip(1) {
                let (axis, value) = word.split_at(1);
                let Ok(value) = value.parse::<f64>() else {
                    continue;
                };
                match axis {
                    "X" => self.position.x = value,
                    "Y" => self.position.y = value,
                    _ => {}
                }
            }
        }
    }
}

/// Scripted GRBL device usable as a `Transport`
#[derive(Debug, Clone)]
pub struct SimulatedDevice {
    inner: Arc<Mutex<DeviceState>>,
}

impl SimulatedDevice {
    /// A device that acknowledges everything
    pub fn new() -> Self {
        Self::with_behavior(SimulatedBehavior::Acknowledge)
    }

    pub fn with_behavior(behavior: SimulatedBehavior) -> Self {
        Self {
            inner: Arc::new(Mutex::new(DeviceState::new(behavior))),
        }
    }

    pub fn failing_on_move(move_number: usize, code: u8) -> Self {
        Self::with_behavior(SimulatedBehavior::FailOnMove { move_number, code })
    }

    pub fn silent() -> Self {
        Self::with_behavior(SimulatedBehavior::Silent)
    }

    pub fn garbage(text: impl Into<String>) -> Self {
        Self::with_behavior(SimulatedBehavior::Garbage(text.into()))
    }

    pub fn late_on_move(move_number: usize, delay: Duration) -> Self {
        Self::with_behavior(SimulatedBehavior::LateOnMove { move_number, delay })
    }

    /// Every command line received, in order
    pub fn sent_lines(&self) -> Vec<String> {
        self.inner.lock().sent.clone()
    }

    /// Only the motion lines received
    pub fn move_commands(&self) -> Vec<String> {
        self.inner
            .lock()
            .sent
            .iter()
            .filter(|line| line.starts_with("G0 ") || line.starts_with("G1 "))
            .cloned()
            .collect()
    }

    pub fn status_queries(&self) -> usize {
        self.inner.lock().status_queries
    }

    /// Position after the last accepted move
    pub fn position(&self) -> Point {
        self.inner.lock().position
    }

    /// How many times the link was closed
    pub fn close_count(&self) -> usize {
        self.inner.lock().close_count
    }
}

impl Default for SimulatedDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for SimulatedDevice {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ConnectionError> {
        let mut state = self.inner.lock();
        if !state.open {
            return Err(ConnectionError::NotConnected);
        }
        for &byte in bytes {
            match byte {
                STATUS_QUERY | SOFT_RESET => state.realtime(byte),
                b'\n' => {
                    let line = std::mem::take(&mut state.partial);
                    state.line(line);
                }
                _ => state.partial.push(byte as char),
            }
        }
        Ok(())
    }

    fn read_line(&mut self, timeout: Duration) -> Result<Option<String>, ConnectionError> {
        let deadline = Instant::now() + timeout;
        loop {
            let now = Instant::now();
            let due = {
                let mut state = self.inner.lock();
                if !state.open {
                    return Err(ConnectionError::NotConnected);
                }
                match state.next_reply(now) {
                    Ok(reply) => return Ok(Some(reply)),
                    Err(due) => due,
                }
            };

            let remaining = deadline.saturating_duration_since(now);
            if remaining.is_zero() {
                return Ok(None);
            }
            // only held replies can become readable while the caller blocks
            std::thread::sleep(due.map_or(remaining, |due| due.min(remaining)));
        }
    }

    fn close(&mut self) {
        let mut state = self.inner.lock();
        if state.open {
            state.open = false;
            state.close_count += 1;
        }
    }

    fn is_open(&self) -> bool {
        self.inner.lock().open
    }

    fn name(&self) -> String {
        "simulated".to_string()
    }
}
