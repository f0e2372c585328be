//! Directory setup topology modes used by the installer to branch its behavior

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Installation topology of a directory node. Each variant carries a stable integer code.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DirectorySetupMode {
    Unknown = 0,
    Standalone = 1,
    Partner = 2,
    Client = 3,
}

impl DirectorySetupMode {
    /// All modes in code order
    pub const ALL: [DirectorySetupMode; 4] = [
        DirectorySetupMode::Unknown,
        DirectorySetupMode::Standalone,
        DirectorySetupMode::Partner,
        DirectorySetupMode::Client,
    ];

    /// Returns the integer code associated with the mode
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Returns the upper-case name of the mode
    pub fn name(self) -> &'static str {
        match self {
            DirectorySetupMode::Unknown => "UNKNOWN",
            DirectorySetupMode::Standalone => "STANDALONE",
            DirectorySetupMode::Partner => "PARTNER",
            DirectorySetupMode::Client => "CLIENT",
        }
    }
}

impl TryFrom<i32> for DirectorySetupMode {
    type Error = Error;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        DirectorySetupMode::ALL
            .into_iter()
            .find(|m| m.code() == code)
            .ok_or(Error::BadInput)
    }
}

impl FromStr for DirectorySetupMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DirectorySetupMode::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or(Error::BadInput)
    }
}

impl fmt::Display for DirectorySetupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
