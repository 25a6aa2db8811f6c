//! Format versions of traces files.

use crate::utils::error::DecodeError;
use std::fmt;
use std::str::FromStr;

/// A "Major.Minor.Patch" format version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FormatVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

/// Version written by this library; must match `config::FORMAT_VERSION`
pub const CURRENT: FormatVersion = FormatVersion {
    major: 0,
    minor: 1,
    patch: 4,
};

impl FormatVersion {
    /// Major and minor parts; files of the same series are compatible
    pub fn series(&self) -> (u32, u32) {
        (self.major, self.minor)
    }
}

/// Where a stored event keeps its metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLayout {
    /// Extra top-level keys (list format and 0.1.0 to 0.1.2)
    TopLevelKeys,
    /// A `properties` object (0.1.3)
    Properties,
    /// A `meta_data` object (0.1.4 onwards)
    MetaData,
}

impl EventLayout {
    pub fn for_version(version: &FormatVersion) -> Self {
        if version.series() != CURRENT.series() {
            return EventLayout::MetaData;
        }
        match version.patch {
            0..=2 => EventLayout::TopLevelKeys,
            3 => EventLayout::Properties,
            _ => EventLayout::MetaData,
        }
    }
}

impl FromStr for FormatVersion {
    type Err = DecodeError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || DecodeError::UnsupportedVersion(text.to_string());
        let parts: Vec<u32> = text
            .trim()
            .split('.')
            .map(|part| part.parse::<u32>().map_err(|_| invalid()))
            .collect::<Result<_, _>>()?;
        match parts.as_slice() {
            [major, minor, patch] => Ok(Self {
                major: *major,
                minor: *minor,
                patch: *patch,
            }),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
