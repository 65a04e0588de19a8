use std::collections::HashMap;
use std::sync::Arc;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

pub const MAX_POSITION: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Motor {
    Head,
    Feet,
}

impl Motor {
    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "head" => Some(Motor::Head),
            "feet" => Some(Motor::Feet),
            _ => None,
        }
    }
}

/// Direction flags for one motor, as sent in a `set` query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Drive {
    pub up: bool,
    pub down: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BedState {
    pub head_position: u8,
    pub feet_position: u8,
}

impl BedState {
    pub fn apply(&mut self, motor: Motor, drive: Drive, step: u8) {
        let position = match motor {
            Motor::Head => &mut self.head_position,
            Motor::Feet => &mut self.feet_position,
        };

        match (drive.up, drive.down) {
            (true, false) => *position = position.saturating_add(step).min(MAX_POSITION),
            (false, true) => *position = position.saturating_sub(step),
            _ => {}
        }
    }
}

/// Parse `{motor}u` / `{motor}d` pairs into per-motor drive flags.
pub fn parse_command(params: &HashMap<String, String>) -> Result<HashMap<Motor, Drive>, String> {
    let mut drives: HashMap<Motor, Drive> = HashMap::new();

    for (key, value) in params {
        let (prefix, up) = match (key.strip_suffix('u'), key.strip_suffix('d')) {
            (Some(prefix), _) => (prefix, true),
            (_, Some(prefix)) => (prefix, false),
            _ => return Err(format!("Unknown direction: {key}")),
        };
        let motor = Motor::from_prefix(prefix).ok_or_else(|| format!("Unknown motor: {key}"))?;
        let flag = match value.as_str() {
            "true" | "1" => true,
            "false" | "0" => false,
            _ => return Err(format!("Invalid value for {key}: {value}")),
        };

        let drive = drives.entry(motor).or_default();
        if up {
            drive.up = flag;
        } else {
            drive.down = flag;
        }
    }

    if drives.is_empty() {
        return Err("Empty motor command".to_string());
    }

    Ok(drives)
}

#[derive(Debug, Default)]
struct Controls {
    forced_status: Option<StatusCode>,
    corrupt_status: bool,
    last_query: Option<String>,
}

/// Shared state of a simulated bed, plus knobs tests use to misbehave.
#[derive(Clone)]
pub struct MockState {
    bed: Arc<RwLock<BedState>>,
    controls: Arc<RwLock<Controls>>,
    step: u8,
}

impl MockState {
    pub fn new(step: u8) -> Self {
        Self {
            bed: Arc::new(RwLock::new(BedState::default())),
            controls: Arc::new(RwLock::new(Controls::default())),
            step,
        }
    }

    pub fn step(&self) -> u8 {
        self.step
    }

    pub async fn bed(&self) -> BedState {
        *self.bed.read().await
    }

    pub async fn set_positions(&self, head_position: u8, feet_position: u8) {
        *self.bed.write().await = BedState {
            head_position,
            feet_position,
        };
    }

    pub async fn apply(&self, drives: &HashMap<Motor, Drive>) {
        let mut bed = self.bed.write().await;
        for (motor, drive) in drives {
            bed.apply(*motor, *drive, self.step);
        }
    }

    /// Answer every endpoint with `status` until cleared with `None`.
    pub async fn force_status(&self, status: Option<StatusCode>) {
        self.controls.write().await.forced_status = status;
    }

    pub async fn forced_status(&self) -> Option<StatusCode> {
        self.controls.read().await.forced_status
    }

    /// Make `/status` answer 200 with a body that is not JSON.
    pub async fn corrupt_status(&self, corrupt: bool) {
        self.controls.write().await.corrupt_status = corrupt;
    }

    pub async fn is_status_corrupt(&self) -> bool {
        self.controls.read().await.corrupt_status
    }

    pub async fn record_query(&self, query: Option<String>) {
        self.controls.write().await.last_query = query;
    }

    pub async fn last_query(&self) -> Option<String> {
        self.controls.read().await.last_query.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_command_accepts_bool_and_digit_values() {
        let drives = parse_command(&params(&[("headu", "true"), ("headd", "0")])).unwrap();

        assert_eq!(drives[&Motor::Head], Drive { up: true, down: false });
    }

    #[test]
    fn test_parse_command_rejects_unknown_motor() {
        assert!(parse_command(&params(&[("backu", "1")])).is_err());
        assert!(parse_command(&params(&[("u", "1")])).is_err());
    }

    #[test]
    fn test_parse_command_rejects_bad_value() {
        assert!(parse_command(&params(&[("feetd", "maybe")])).is_err());
    }

    #[test]
    fn test_parse_command_rejects_empty_query() {
        assert!(parse_command(&HashMap::new()).is_err());
    }

    #[test]
    fn test_apply_clamps_positions() {
        let mut bed = BedState {
            head_position: 95,
            feet_position: 5,
        };

        bed.apply(Motor::Head, Drive { up: true, down: false }, 10);
        bed.apply(Motor::Feet, Drive { up: false, down: true }, 10);

        assert_eq!(bed.head_position, MAX_POSITION);
        assert_eq!(bed.feet_position, 0);
    }

    #[test]
    fn test_apply_conflicting_directions_holds_position() {
        let mut bed = BedState {
            head_position: 40,
            feet_position: 40,
        };

        bed.apply(Motor::Head, Drive { up: true, down: true }, 10);
        bed.apply(Motor::Feet, Drive::default(), 10);

        assert_eq!(bed, BedState { head_position: 40, feet_position: 40 });
    }
}
