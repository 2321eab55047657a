use super::*;

pub const KEY_UP: &str = "ArrowUp";
pub const KEY_DOWN: &str = "ArrowDown";
pub const KEY_LEFT: &str = "ArrowLeft";
pub const KEY_RIGHT: &str = "ArrowRight";
pub const KEY_SELECT: &str = "Enter";
pub const KEY_BACK: &str = "Escape";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Up => KEY_UP,
            Self::Down => KEY_DOWN,
            Self::Left => KEY_LEFT,
            Self::Right => KEY_RIGHT,
        }
    }

    pub(crate) fn from_key(key: &str) -> Option<Self> {
        match key {
            KEY_UP => Some(Self::Up),
            KEY_DOWN => Some(Self::Down),
            KEY_LEFT => Some(Self::Left),
            KEY_RIGHT => Some(Self::Right),
            _ => None,
        }
    }

    pub(crate) fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    pub(crate) fn is_forward(self) -> bool {
        matches!(self, Self::Down | Self::Right)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        };
        f.write_str(name)
    }
}

/// A single remote-control button action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Select,
    Back,
    /// Select held down for the given number of milliseconds.
    HoldSelect(i64),
}

impl Command {
    pub fn key(&self) -> &'static str {
        match self {
            Self::MoveUp => KEY_UP,
            Self::MoveDown => KEY_DOWN,
            Self::MoveLeft => KEY_LEFT,
            Self::MoveRight => KEY_RIGHT,
            Self::Select | Self::HoldSelect(_) => KEY_SELECT,
            Self::Back => KEY_BACK,
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        match self {
            Self::MoveUp => Some(Direction::Up),
            Self::MoveDown => Some(Direction::Down),
            Self::MoveLeft => Some(Direction::Left),
            Self::MoveRight => Some(Direction::Right),
            _ => None,
        }
    }
}

impl From<Direction> for Command {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => Self::MoveUp,
            Direction::Down => Self::MoveDown,
            Direction::Left => Self::MoveLeft,
            Direction::Right => Self::MoveRight,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MoveUp => f.write_str("up"),
            Self::MoveDown => f.write_str("down"),
            Self::MoveLeft => f.write_str("left"),
            Self::MoveRight => f.write_str("right"),
            Self::Select => f.write_str("select"),
            Self::Back => f.write_str("back"),
            Self::HoldSelect(duration_ms) => write!(f, "hold({duration_ms})"),
        }
    }
}

impl std::str::FromStr for Command {
    type Err = Error;

    fn from_str(src: &str) -> Result<Self> {
        let name = src.trim().to_ascii_lowercase();
        if let Some(args) = name
            .strip_prefix("hold(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let duration_ms = args
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|value| *value >= 0)
                .ok_or_else(|| Error::UnknownKey(src.trim().to_string()))?;
            return Ok(Self::HoldSelect(duration_ms));
        }
        match name.as_str() {
            "up" => Ok(Self::MoveUp),
            "down" => Ok(Self::MoveDown),
            "left" => Ok(Self::MoveLeft),
            "right" => Ok(Self::MoveRight),
            "select" | "ok" | "enter" => Ok(Self::Select),
            "back" | "escape" => Ok(Self::Back),
            _ => Err(Error::UnknownKey(src.trim().to_string())),
        }
    }
}

/// Parses a button script such as `"right*3, select, hold(1500), back"`.
///
/// Each comma separated entry names one command with an optional `*N`
/// repeat count. The whole script is validated before anything is returned.
pub fn parse_sequence(src: &str) -> Result<Vec<(Command, usize)>> {
    let mut out = Vec::new();
    for raw in src.split(',') {
        let entry = raw.trim();
        if entry.is_empty() {
            if src.trim().is_empty() {
                continue;
            }
            return Err(Error::UnknownKey(src.trim().to_string()));
        }
        let (name, count) = match entry.rsplit_once('*') {
            Some((name, count)) => {
                let count = count
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| Error::UnknownKey(entry.to_string()))?;
                (name, count)
            }
            None => (entry, 1),
        };
        out.push((name.parse::<Command>()?, count));
    }
    Ok(out)
}
