use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of modalities the registry (C8) dispatches on, plus the
/// `Unknown` sentinel §3 of the indexing contract requires parsers to fall
/// back to instead of ever crashing on an unrecognized `Modality` element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modality {
    CT,
    MR,
    PT,
    SEG,
    #[serde(rename = "RTSTRUCT")]
    RtStruct,
    #[serde(rename = "RTDOSE")]
    RtDose,
    #[serde(rename = "RTPLAN")]
    RtPlan,
    SR,
    #[default]
    Unknown,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::CT => "CT",
            Modality::MR => "MR",
            Modality::PT => "PT",
            Modality::SEG => "SEG",
            Modality::RtStruct => "RTSTRUCT",
            Modality::RtDose => "RTDOSE",
            Modality::RtPlan => "RTPLAN",
            Modality::SR => "SR",
            Modality::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modality {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "CT" => Modality::CT,
            "MR" => Modality::MR,
            "PT" => Modality::PT,
            "SEG" => Modality::SEG,
            "RTSTRUCT" => Modality::RtStruct,
            "RTDOSE" => Modality::RtDose,
            "RTPLAN" => Modality::RtPlan,
            "SR" => Modality::SR,
            _ => Modality::Unknown,
        })
    }
}
