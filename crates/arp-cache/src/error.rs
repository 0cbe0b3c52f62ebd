use core::fmt::{Debug, Display, Formatter, Result};

/// Errors of the cache management API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CacheError {
    /// The IP address is unspecified or broadcast, or the MAC address is zero.
    InvalidAddress,
    /// No matching entry.
    EntryNotFound,
    /// Every entry of the pool is static.
    NoFreeEntry,
}

impl Display for CacheError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            CacheError::InvalidAddress => write!(f, "invalid address"),
            CacheError::EntryNotFound => write!(f, "entry not found"),
            CacheError::NoFreeEntry => write!(f, "no free entry"),
        }
    }
}

/// Errors of operations that talk to an [`ArpLink`](crate::ArpLink).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArpError<E> {
    /// The link failed to send a frame.
    Link(E),
    Cache(CacheError),
}

impl<E> From<CacheError> for ArpError<E> {
    fn from(value: CacheError) -> Self {
        ArpError::Cache(value)
    }
}

impl<E: Display> Display for ArpError<E> {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            ArpError::Link(e) => write!(f, "link error: {e}"),
            ArpError::Cache(e) => Display::fmt(e, f),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CacheError {}

#[cfg(feature = "std")]
impl<E: Debug + Display> std::error::Error for ArpError<E> {}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for ArpError<E> {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            ArpError::Link(e) => defmt::write!(fmt, "link error: {}", e),
            ArpError::Cache(e) => defmt::write!(fmt, "{}", e),
        }
    }
}

#[cfg(test)]
mod test {
    extern crate std;
    use super::{ArpError, CacheError};
    use std::{format, string::String};

    #[test]
    fn display() {
        let cache: ArpError<&str> = CacheError::NoFreeEntry.into();
        assert_eq!(format!("{cache}"), String::from("no free entry"));
        let link: ArpError<&str> = ArpError::Link("bus off");
        assert_eq!(format!("{link}"), String::from("link error: bus off"));
    }
}
