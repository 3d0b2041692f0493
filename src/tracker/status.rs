use std::fmt;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Where an application stands. Declaration order is the sort order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    #[default]
    NotApplied,
    Applied,
    InterviewScheduled,
    Interviewed,
    OfferReceived,
    AcceptedOffer,
    Rejected,
    NoResponse,
}

impl Status {
    pub const ALL: [Status; 8] = [
        Status::NotApplied,
        Status::Applied,
        Status::InterviewScheduled,
        Status::Interviewed,
        Status::OfferReceived,
        Status::AcceptedOffer,
        Status::Rejected,
        Status::NoResponse,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Status::NotApplied => "Not Applied",
            Status::Applied => "Applied",
            Status::InterviewScheduled => "Interview Scheduled",
            Status::Interviewed => "Interviewed",
            Status::OfferReceived => "Offer Received",
            Status::AcceptedOffer => "Accepted Offer",
            Status::Rejected => "Rejected",
            Status::NoResponse => "No Response",
        }
    }

    pub fn sort_order(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Status {
    type Err = String;

    /// Accepts labels case-insensitively, with `-` or `_` in place of spaces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .trim()
            .replace(['-', '_'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        Status::ALL
            .into_iter()
            .find(|status| status.label().to_lowercase() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown status '{}', expected one of: {}",
                    s,
                    Status::ALL.map(|s| s.label()).join(", ")
                )
            })
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Status {
    /// Empty or unrecognised values read as `Not Applied`.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.trim().is_empty() {
            return Ok(Status::default());
        }

        Ok(raw.parse().unwrap_or_else(|_| {
            warn!("unrecognised status '{}', treating as {}", raw, Status::default());
            Status::default()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_order_follows_pipeline() {
        let orders: Vec<u8> = Status::ALL.iter().map(Status::sort_order).collect();
        assert_eq!(orders, (0..8).collect::<Vec<u8>>());
        assert!(Status::Applied < Status::Rejected);
    }

    #[test]
    fn parses_loose_spellings() {
        assert_eq!("Applied".parse::<Status>(), Ok(Status::Applied));
        assert_eq!(
            "interview-scheduled".parse::<Status>(),
            Ok(Status::InterviewScheduled)
        );
        assert_eq!("NO_RESPONSE".parse::<Status>(), Ok(Status::NoResponse));
        assert_eq!(
            "  accepted   offer ".parse::<Status>(),
            Ok(Status::AcceptedOffer)
        );
        assert!("ghosted".parse::<Status>().is_err());
    }

    #[test]
    fn display_uses_label() {
        assert_eq!(Status::OfferReceived.to_string(), "Offer Received");
    }
}
