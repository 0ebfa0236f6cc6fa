//! Customer segments derived from the composite RFM score

use serde::Serialize;
use std::fmt;

/// Named customer tier, a total function of the RFM score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Segment {
    #[serde(rename = "Champions")]
    Champions,
    #[serde(rename = "Loyal Customers")]
    LoyalCustomers,
    #[serde(rename = "Potential Loyalist")]
    PotentialLoyalist,
    #[serde(rename = "At Risk")]
    AtRisk,
    #[serde(rename = "Lost")]
    Lost,
}

impl Segment {
    /// All segments, best tier first
    pub const ALL: [Segment; 5] = [
        Segment::Champions,
        Segment::LoyalCustomers,
        Segment::PotentialLoyalist,
        Segment::AtRisk,
        Segment::Lost,
    ];

    /// Classify a composite score (3..=12)
    pub fn from_score(score: u8) -> Self {
        match score {
            s if s >= 10 => Segment::Champions,
            8..=9 => Segment::LoyalCustomers,
            6..=7 => Segment::PotentialLoyalist,
            4..=5 => Segment::AtRisk,
            _ => Segment::Lost,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Segment::Champions => "Champions",
            Segment::LoyalCustomers => "Loyal Customers",
            Segment::PotentialLoyalist => "Potential Loyalist",
            Segment::AtRisk => "At Risk",
            Segment::Lost => "Lost",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
