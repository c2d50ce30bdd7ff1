use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Bar size of a closing-price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    Minute,
    #[serde(rename = "1d")]
    Daily,
}

impl Interval {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minute => "1m",
            Self::Daily => "1d",
        }
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lowered = value.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "1m" | "minute" => Ok(Self::Minute),
            "1d" | "daily" | "day" => Ok(Self::Daily),
            _ => Err(ValidationError::InvalidInterval { value: lowered }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_codes_and_names() {
        assert_eq!("1d".parse::<Interval>(), Ok(Interval::Daily));
        assert_eq!(" Minute ".parse::<Interval>(), Ok(Interval::Minute));
        assert_eq!(Interval::Daily.to_string(), "1d");
    }

    #[test]
    fn rejects_unsupported_bar_sizes() {
        assert_eq!(
            "5m".parse::<Interval>(),
            Err(ValidationError::InvalidInterval {
                value: String::from("5m")
            })
        );
    }
}
