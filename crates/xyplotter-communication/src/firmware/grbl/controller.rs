//! GRBL Controller Implementation
//!
//! Synchronous line-by-line streaming: every command is written, then the
//! controller blocks until exactly one acknowledgment line arrives or the
//! configured wait runs out. There is never more than one command in flight.
//!
//! GRBL answers every line exactly once and in order, so a line that timed
//! out is still owed a reply. The controller counts those and drops the
//! same number of late `ok`/`error` lines before taking a reply as the
//! acknowledgment of the current command.
//!
//! The controller owns its transport for its whole lifetime and closes it
//! on drop, so every exit path (normal completion, early return on error,
//! panic unwinding) releases the link.

use super::error_decoder::{decode_alarm, decode_error};
use super::response_parser::{GrblResponse, GrblResponseParser};
use super::status_parser::{format_status_position, StatusReport};
use super::{format_move, HOME_COMMAND, ZERO_WORK_COMMAND};
use crate::communication::{ConnectionParams, SerialTransport, Transport, STATUS_QUERY};
use serde::{Deserialize, Serialize};
use std::ops::ControlFlow;
use std::time::{Duration, Instant};
use xyplotter_core::{
    ConnectionError, ControllerError, ControllerState, ControllerStatus, Error, Point, Result,
    WorkArea,
};
use xyplotter_patterns::{resolve_pattern, Pattern};

/// Streaming behaviour of a controller session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Feed rate appended to every move line
    pub feed_rate: f64,
    /// Wait for each acknowledgment and status reply
    pub ack_timeout: Duration,
    /// Wait for the homing acknowledgment, also bounds idle polling
    pub homing_timeout: Duration,
    /// Zero the work coordinates after homing
    pub zero_after_home: bool,
    /// Lines sent (and acknowledged) right after connecting
    pub init_commands: Vec<String>,
    /// Pause after each acknowledged move
    pub dwell: Duration,
    /// Poll `?` after each acknowledged move until the device reports Idle
    pub wait_for_idle: bool,
    /// Pause between idle polls
    pub poll_interval: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            feed_rate: 20.0,
            ack_timeout: Duration::from_secs(1),
            homing_timeout: Duration::from_secs(60),
            zero_after_home: true,
            init_commands: vec!["G21".to_string(), "G90".to_string()],
            dwell: Duration::ZERO,
            wait_for_idle: false,
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// Passed to the progress callback after each acknowledged point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamProgress {
    /// 0-based index of the point just acknowledged
    pub index: usize,
    pub point: Point,
    pub points_sent: usize,
}

/// Outcome of a completed or cancelled stream
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StreamSummary {
    /// Moves acknowledged by the device
    pub points_sent: usize,
    /// Last acknowledged position
    pub last_position: Option<Point>,
    /// The progress callback asked to stop early
    pub cancelled: bool,
}

fn timeout_error(timeout: Duration) -> Error {
    ControllerError::Timeout {
        timeout_ms: timeout.as_millis() as u64,
        index: None,
    }
    .into()
}

/// Attach the streamed point index to controller errors
fn at_index(err: Error, index: usize) -> Error {
    match err {
        Error::Controller(e) => Error::Controller(e.at_index(index)),
        other => other,
    }
}

/// GRBL controller driving one transport
pub struct GrblController {
    transport: Option<Box<dyn Transport>>,
    config: ControllerConfig,
    state: ControllerState,
    parser: GrblResponseParser,
    /// Replies still owed for lines whose wait timed out
    stale_replies: usize,
}

impl GrblController {
    /// Take ownership of an open transport and send the init commands
    pub fn connect<T>(transport: T, config: ControllerConfig) -> Result<Self>
    where
        T: Transport + 'static,
    {
        if !transport.is_open() {
            return Err(ConnectionError::NotConnected.into());
        }

        let name = transport.name();
        let mut controller = Self {
            transport: Some(Box::new(transport)),
            config,
            state: ControllerState::default(),
            parser: GrblResponseParser::new(),
            stale_replies: 0,
        };
        controller.set_status(ControllerStatus::Connected);
        tracing::info!("Connected to {}", name);

        let init_commands = controller.config.init_commands.clone();
        for command in &init_commands {
            // an error here drops the controller, which closes the link
            controller.send_command(command)?;
        }
        Ok(controller)
    }

    /// Open a serial port and connect to it
    pub fn open_serial(params: &ConnectionParams, config: ControllerConfig) -> Result<Self> {
        let transport = SerialTransport::open(params)?;
        Self::connect(transport, config)
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn status(&self) -> ControllerStatus {
        self.state.status
    }

    pub fn position(&self) -> Option<Point> {
        self.state.position
    }

    pub fn is_homed(&self) -> bool {
        self.state.homed
    }

    /// Replies to timed-out lines that have not arrived yet
    pub fn stale_replies(&self) -> usize {
        self.stale_replies
    }

    pub fn is_connected(&self) -> bool {
        self.transport.as_ref().is_some_and(|t| t.is_open())
    }

    fn set_status(&mut self, status: ControllerStatus) {
        if !self.state.status.can_transition_to(status) {
            tracing::warn!(
                "Unexpected state transition {} -> {}",
                self.state.status,
                status
            );
        }
        if self.state.status != status {
            tracing::debug!("State {} -> {}", self.state.status, status);
        }
        self.state.status = status;
    }

    fn transport(&mut self) -> Result<&mut Box<dyn Transport>> {
        match self.transport.as_mut() {
            Some(t) if t.is_open() => Ok(t),
            _ => Err(ConnectionError::NotConnected.into()),
        }
    }

    fn require_homed(&self) -> Result<()> {
        if self.state.homed {
            Ok(())
        } else {
            Err(ControllerError::NotHomed.into())
        }
    }

    /// Send one raw line and wait for its acknowledgment
    pub fn send_command(&mut self, line: &str) -> Result<()> {
        let timeout = self.config.ack_timeout;
        self.exchange(line, timeout)
    }

    fn exchange(&mut self, line: &str, timeout: Duration) -> Result<()> {
        let line = line.trim();
        tracing::debug!(">> {}", line);
        self.transport()?.write_line(line)?;
        self.await_ack(timeout)
    }

    /// Block until one acknowledgment line arrives; blank lines are skipped
    fn await_ack(&mut self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                self.stale_replies += 1;
                tracing::warn!("No acknowledgment within {:?}", timeout);
                return Err(timeout_error(timeout));
            }

            let Some(raw) = self.transport()?.read_line(remaining)? else {
                continue;
            };
            let Some(response) = self.parser.parse(&raw) else {
                continue;
            };
            tracing::debug!("<< {}", raw.trim());
            if self.discard_stale(&response, &raw) {
                continue;
            }
            if let GrblResponse::Status(_) = response {
                // only `?` produces these; this one answers an earlier query
                tracing::debug!("Ignoring late status report");
                continue;
            }

            return match response {
                GrblResponse::Ok => Ok(()),
                GrblResponse::Error(code) => {
                    let message = decode_error(code);
                    tracing::warn!("Device error {}: {}", code, message);
                    Err(ControllerError::DeviceError {
                        code,
                        message,
                        index: None,
                    }
                    .into())
                }
                GrblResponse::Alarm(code) => {
                    let message = decode_alarm(code);
                    tracing::warn!("Device alarm {}: {}", code, message);
                    Err(ControllerError::Alarm {
                        code,
                        message,
                        index: None,
                    }
                    .into())
                }
                _ => Err(ControllerError::ProtocolError {
                    line: raw.trim().to_string(),
                    index: None,
                }
                .into()),
            };
        }
    }

    /// Consume a late reply owed to a line that already timed out
    fn discard_stale(&mut self, response: &GrblResponse, raw: &str) -> bool {
        let is_reply = matches!(response, GrblResponse::Ok | GrblResponse::Error(_));
        if !is_reply || self.stale_replies == 0 {
            return false;
        }
        self.stale_replies -= 1;
        tracing::warn!("Discarding late reply {:?} to a timed-out line", raw.trim());
        true
    }

    /// Run the homing cycle and optionally zero the work coordinates
    ///
    /// A failed homing cycle leaves the controller connected and unhomed.
    pub fn home(&mut self) -> Result<()> {
        self.transport()?;
        tracing::info!("Homing");

        let homed = self.run_homing();
        if let Err(err) = homed {
            self.state.homed = false;
            self.state.position = None;
            self.set_status(ControllerStatus::Connected);
            tracing::warn!("Homing failed: {}", err);
            return Err(err);
        }

        self.state.homed = true;
        self.state.position = Some(Point::ORIGIN);
        self.set_status(ControllerStatus::Homed);
        tracing::info!("Homed");
        Ok(())
    }

    fn run_homing(&mut self) -> Result<()> {
        let homing_timeout = self.config.homing_timeout;
        self.exchange(HOME_COMMAND, homing_timeout)?;
        if self.config.zero_after_home {
            self.send_command(ZERO_WORK_COMMAND)?;
        }
        if self.config.wait_for_idle {
            self.wait_till_idle()?;
        }
        Ok(())
    }

    /// Single acknowledged move; requires a completed homing cycle
    pub fn move_to(&mut self, point: Point) -> Result<()> {
        self.require_homed()?;
        self.step(point)
    }

    pub fn move_to_origin(&mut self) -> Result<()> {
        self.move_to(Point::ORIGIN)
    }

    fn step(&mut self, point: Point) -> Result<()> {
        let line = format_move(point.x, point.y, self.config.feed_rate);
        self.send_command(&line)?;
        self.state.position = Some(point);

        if self.config.wait_for_idle {
            self.wait_till_idle()?;
        }
        if !self.config.dwell.is_zero() {
            std::thread::sleep(self.config.dwell);
        }
        Ok(())
    }

    /// Query the realtime status report
    pub fn query_status(&mut self) -> Result<StatusReport> {
        let timeout = self.config.ack_timeout;
        self.transport()?.write_bytes(&[STATUS_QUERY])?;

        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(timeout_error(timeout));
            }
            let Some(raw) = self.transport()?.read_line(remaining)? else {
                continue;
            };
            match self.parser.parse(&raw) {
                None => continue,
                Some(response) if self.discard_stale(&response, &raw) => continue,
                Some(GrblResponse::Status(report)) => {
                    if let Some(summary) = format_status_position(&raw) {
                        tracing::debug!("{}", summary);
                    }
                    return Ok(report);
                }
                Some(_) => {
                    return Err(ControllerError::ProtocolError {
                        line: raw.trim().to_string(),
                        index: None,
                    }
                    .into())
                }
            }
        }
    }

    /// Poll the status report until the device reports Idle, bounded by the
    /// homing timeout
    pub fn wait_till_idle(&mut self) -> Result<StatusReport> {
        let limit = self.config.homing_timeout;
        let deadline = Instant::now() + limit;
        loop {
            std::thread::sleep(self.config.poll_interval);
            let report = self.query_status()?;
            if report.state.is_idle() {
                return Ok(report);
            }
            if Instant::now() >= deadline {
                tracing::warn!("Device still {} after {:?}", report.state, limit);
                return Err(timeout_error(limit));
            }
        }
    }

    /// Stream a pattern over `area`
    pub fn run_pattern(&mut self, area: &WorkArea, pattern: &Pattern) -> Result<StreamSummary> {
        self.run_pattern_with(area, pattern, |_| ControlFlow::Continue(()))
    }

    /// Stream a registered pattern by name; `None` selects the default
    pub fn run_named_pattern(&mut self, area: &WorkArea, name: Option<&str>) -> Result<StreamSummary> {
        let pattern = resolve_pattern(name)?;
        self.run_pattern(area, &pattern)
    }

    /// Stream a pattern, calling `on_progress` after every acknowledged point
    ///
    /// Returning `ControlFlow::Break(())` stops the stream before the next
    /// command is sent.
    pub fn run_pattern_with<F>(
        &mut self,
        area: &WorkArea,
        pattern: &Pattern,
        on_progress: F,
    ) -> Result<StreamSummary>
    where
        F: FnMut(&StreamProgress) -> ControlFlow<()>,
    {
        self.require_homed()?;
        let points = pattern.generate(area)?;
        tracing::info!("Running pattern {} over {}", pattern.name(), area);
        self.stream(points, on_progress)
    }

    /// Stream caller-supplied points; stop iterating to cancel
    pub fn stream_points<I>(&mut self, points: I) -> Result<StreamSummary>
    where
        I: IntoIterator<Item = Point>,
    {
        self.require_homed()?;
        self.stream(points.into_iter(), |_| ControlFlow::Continue(()))
    }

    fn stream<I, F>(&mut self, points: I, mut on_progress: F) -> Result<StreamSummary>
    where
        I: Iterator<Item = Point>,
        F: FnMut(&StreamProgress) -> ControlFlow<()>,
    {
        self.transport()?;
        self.set_status(ControllerStatus::Streaming);

        let mut summary = StreamSummary {
            points_sent: 0,
            last_position: self.state.position,
            cancelled: false,
        };

        for (index, point) in points.enumerate() {
            if let Err(err) = self.step(point) {
                let err = at_index(err, index);
                tracing::warn!(
                    "Streaming stopped after {} points: {}",
                    summary.points_sent,
                    err
                );
                self.set_status(ControllerStatus::Idle);
                return Err(err);
            }

            summary.points_sent += 1;
            summary.last_position = Some(point);

            let progress = StreamProgress {
                index,
                point,
                points_sent: summary.points_sent,
            };
            if on_progress(&progress).is_break() {
                summary.cancelled = true;
                tracing::info!("Streaming cancelled after {} points", summary.points_sent);
                break;
            }
        }

        self.set_status(ControllerStatus::Idle);
        tracing::info!("Streamed {} points", summary.points_sent);
        Ok(summary)
    }

    /// Close the transport; safe to call any number of times
    pub fn disconnect(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
            tracing::info!("Disconnected from {}", transport.name());
        }
        self.state = ControllerState::default();
        self.stale_replies = 0;
    }
}

impl Drop for GrblController {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl std::fmt::Debug for GrblController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrblController")
            .field("transport", &self.transport.as_ref().map(|t| t.name()))
            .field("config", &self.config)
            .field("state", &self.state)
            .field("stale_replies", &self.stale_replies)
            .finish()
    }
}
