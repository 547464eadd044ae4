use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    Strict,
    Legacy,
    Auto,
}

impl AuthMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "strict" => Some(Self::Strict),
            "legacy" => Some(Self::Legacy),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }
}
