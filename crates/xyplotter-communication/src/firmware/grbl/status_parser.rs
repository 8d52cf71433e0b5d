//! GRBL Status Report Parsing
//!
//! Parses the `<State|MPos:...|WPos:...|...>` reports GRBL returns for a `?`
//! query. Only the fields a plotter cares about are kept: machine state,
//! machine/work position, work coordinate offset, planner buffer and feed.

use serde::{Deserialize, Serialize};
use std::fmt;
use xyplotter_core::Point;

/// Machine state reported in the first field of a status report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineState {
    Idle,
    Run,
    Hold,
    Jog,
    Alarm,
    Door,
    Check,
    Home,
    Sleep,
    /// Anything this parser does not recognise
    Other(String),
}

impl MachineState {
    /// Parse a state field; sub-states such as `Hold:0` map to their base state
    pub fn parse(field: &str) -> Self {
        let base = field.split(':').next().unwrap_or_default().trim();
        match base {
            "Idle" => Self::Idle,
            "Run" => Self::Run,
            "Hold" => Self::Hold,
            "Jog" => Self::Jog,
            "Alarm" => Self::Alarm,
            "Door" => Self::Door,
            "Check" => Self::Check,
            "Home" => Self::Home,
            "Sleep" => Self::Sleep,
            _ => Self::Other(field.trim().to_string()),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

impl fmt::Display for MachineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Run => write!(f, "Run"),
            Self::Hold => write!(f, "Hold"),
            Self::Jog => write!(f, "Jog"),
            Self::Alarm => write!(f, "Alarm"),
            Self::Door => write!(f, "Door"),
            Self::Check => write!(f, "Check"),
            Self::Home => write!(f, "Home"),
            Self::Sleep => write!(f, "Sleep"),
            Self::Other(state) => write!(f, "{}", state),
        }
    }
}

/// Axis values reported in a position field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisPosition {
    pub x: f64,
    pub y: f64,
    /// Present on three-axis firmware builds
    pub z: Option<f64>,
}

impl AxisPosition {
    /// Parse `x,y[,z,...]`; at least two axes are required
    pub fn parse(pos_str: &str) -> Option<Self> {
        let coords: Vec<f64> = pos_str
            .split(',')
            .map(|s| s.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .ok()?;

        if coords.len() < 2 {
            return None;
        }

        Some(Self {
            x: coords[0],
            y: coords[1],
            z: coords.get(2).copied(),
        })
    }

    pub fn xy(&self) -> Point {
        Point::new(self.x, self.y)
    }

    fn offset_by(&self, other: &AxisPosition, sign: f64) -> AxisPosition {
        AxisPosition {
            x: self.x + sign * other.x,
            y: self.y + sign * other.y,
            z: match (self.z, other.z) {
                (Some(a), Some(b)) => Some(a + sign * b),
                (z, None) => z,
                (None, Some(_)) => None,
            },
        }
    }
}

/// Planner blocks and serial RX bytes available (`Bf:` / `Buf:`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferRxState {
    pub plan: u16,
    pub rx: u16,
}

impl BufferRxState {
    pub fn parse(buf_str: &str) -> Option<Self> {
        let (plan, rx) = buf_str.split_once([',', ':'])?;
        Some(Self {
            plan: plan.trim().parse().ok()?,
            rx: rx.trim().parse().ok()?,
        })
    }
}

/// Parsed status report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub state: MachineState,
    pub machine_pos: Option<AxisPosition>,
    pub work_pos: Option<AxisPosition>,
    pub work_coord_offset: Option<AxisPosition>,
    pub buffer: Option<BufferRxState>,
    pub feed_rate: Option<f64>,
}

impl StatusReport {
    /// Parse a full `<...>` report; `None` if the line is not a status report
    pub fn parse(line: &str) -> Option<Self> {
        let body = line.trim().strip_prefix('<')?.strip_suffix('>')?;
        let mut fields = body.split('|');
        let state = MachineState::parse(fields.next()?);
        if matches!(&state, MachineState::Other(s) if s.is_empty()) {
            return None;
        }

        let mut report = StatusReport {
            state,
            machine_pos: None,
            work_pos: None,
            work_coord_offset: None,
            buffer: None,
            feed_rate: None,
        };

        for field in fields {
            let Some((key, value)) = field.split_once(':') else {
                continue;
            };
            match key.trim() {
                "MPos" => report.machine_pos = AxisPosition::parse(value),
                "WPos" => report.work_pos = AxisPosition::parse(value),
                "WCO" => report.work_coord_offset = AxisPosition::parse(value),
                "Bf" | "Buf" => report.buffer = BufferRxState::parse(value),
                "F" => report.feed_rate = value.trim().parse().ok(),
                "FS" => {
                    report.feed_rate = value
                        .split(',')
                        .next()
                        .and_then(|feed| feed.trim().parse().ok())
                }
                _ => {}
            }
        }

        Some(report)
    }

    /// Work position, derived from `MPos - WCO` when only the machine position was reported
    pub fn work_position(&self) -> Option<AxisPosition> {
        match (self.work_pos, self.machine_pos, self.work_coord_offset) {
            (Some(wpos), _, _) => Some(wpos),
            (None, Some(mpos), Some(wco)) => Some(mpos.offset_by(&wco, -1.0)),
            _ => None,
        }
    }

    /// Machine position, derived from `WPos + WCO` when only the work position was reported
    pub fn machine_position(&self) -> Option<AxisPosition> {
        match (self.machine_pos, self.work_pos, self.work_coord_offset) {
            (Some(mpos), _, _) => Some(mpos),
            (None, Some(wpos), Some(wco)) => Some(wpos.offset_by(&wco, 1.0)),
            _ => None,
        }
    }
}

/// One-line summary of a status report using its first position field
///
/// `"<Idle|WPos:1.000,2.000,0.000>"` becomes `"Idle WPos: 1.000, 2.000, 0.000"`.
/// Returns `None` for lines that are not status reports or carry no position.
pub fn format_status_position(line: &str) -> Option<String> {
    let body = line.trim().strip_prefix('<')?.strip_suffix('>')?;
    let mut fields = body.split('|');
    let state = fields.next().unwrap_or_default().trim();

    let (label, position) = fields.find_map(|field| {
        ["WPos", "MPos"].into_iter().find_map(|label| {
            field
                .strip_prefix(label)
                .and_then(|rest| rest.strip_prefix(':'))
                .map(|pos| (label, pos))
        })
    })?;

    let coords: Vec<&str> = position
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .take(3)
        .collect();
    if coords.is_empty() {
        return None;
    }

    let formatted = coords.join(", ");
    if state.is_empty() {
        Some(format!("{}: {}", label, formatted))
    } else {
        Some(format!("{} {}: {}", state, label, formatted))
    }
}
