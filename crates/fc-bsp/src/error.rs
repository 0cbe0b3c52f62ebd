use core::fmt::{Display, Formatter, Result};

use crate::{DmaIdentifier, IoTag, Owner};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BspError {
    /// The pin is claimed by another resource.
    PinInUse { tag: IoTag, owner: Owner, index: u8 },
    /// The DMA stream is allocated to another resource.
    DmaInUse {
        ident: DmaIdentifier,
        owner: Owner,
        index: u8,
    },
    /// The pin is not among the peripheral's alternate function options.
    PinNotRoutable(IoTag),
    /// The MCU has no such peripheral instance.
    UnknownDevice,
    /// No DMA mapping for the requested peripheral/timer channel and option.
    NoDmaMapping,
    /// The [`ResourceRegistry`](crate::ResourceRegistry) has no room for another pin.
    RegistryFull,
}

impl Display for BspError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            BspError::PinInUse { tag, owner, index } => {
                write!(f, "{tag} already used by {owner:?} {index}")
            }
            BspError::DmaInUse {
                ident,
                owner,
                index,
            } => write!(f, "{ident} already used by {owner:?} {index}"),
            BspError::PinNotRoutable(tag) => write!(f, "{tag} cannot be routed to this peripheral"),
            BspError::UnknownDevice => write!(f, "unknown peripheral instance"),
            BspError::NoDmaMapping => write!(f, "no DMA mapping"),
            BspError::RegistryFull => write!(f, "resource registry is full"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BspError {}
