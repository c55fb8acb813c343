use derivative::Derivative;
use enum_derive_2018::EnumDisplay;
use enum_iterator::Sequence;
use macro_attr_2018::macro_attr;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

macro_attr! {
    #[derive(Debug, Clone, Copy, Derivative, PartialEq, Eq, Hash, Serialize, Deserialize, Sequence, EnumDisplay!)]
    #[derivative(Default)]
    #[serde(rename_all = "lowercase")]
    pub enum Position {
        #[derivative(Default)]
        Attack,
        Midfield,
        Defense,
        Goalie,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown position `{0}`")]
pub struct UnknownPosition(pub String);

impl FromStr for Position {
    type Err = UnknownPosition;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "attack" => Ok(Self::Attack),
            "midfield" => Ok(Self::Midfield),
            "defense" => Ok(Self::Defense),
            "goalie" => Ok(Self::Goalie),
            _ => Err(UnknownPosition(s.to_string())),
        }
    }
}
