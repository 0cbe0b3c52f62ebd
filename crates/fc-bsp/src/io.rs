use core::fmt::{Display, Formatter, Result};

use bitfield_struct::bitfield;
use heapless::Vec;

use crate::BspError;

/// A GPIO port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Port {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
}

impl Port {
    const ALL: [Port; 11] = [
        Port::A,
        Port::B,
        Port::C,
        Port::D,
        Port::E,
        Port::F,
        Port::G,
        Port::H,
        Port::I,
        Port::J,
        Port::K,
    ];

    pub const fn from_index(index: u8) -> Option<Port> {
        if (index as usize) < Self::ALL.len() {
            Some(Self::ALL[index as usize])
        } else {
            None
        }
    }

    pub const fn index(self) -> u8 {
        self as u8
    }

    pub const fn letter(self) -> char {
        (b'A' + self as u8) as char
    }

    pub fn from_letter(letter: char) -> Option<Port> {
        let upper = letter.to_ascii_uppercase();
        if upper.is_ascii_uppercase() {
            Self::from_index(upper as u8 - b'A')
        } else {
            None
        }
    }
}

/// A packed pin reference: the high nibble is the port index + 1 and
/// the low nibble the pin number. The value 0 means "no pin".
///
/// ```
/// use fc_bsp::{IoTag, Port};
///
/// let tag = IoTag::new(Port::B, 13);
/// assert_eq!(tag.into_bits(), 0x2D);
/// assert_eq!(IoTag::parse("pb13"), Some(tag));
/// ```
#[bitfield(u8, new = false, order = Msb)]
#[derive(PartialEq, Eq, Hash)]
pub struct IoTag {
    #[bits(4)]
    gpio: u8,
    #[bits(4)]
    pin_number: u8,
}

impl IoTag {
    pub const NONE: IoTag = IoTag::from_bits(0);

    pub const fn new(port: Port, pin: u8) -> Self {
        IoTag::from_bits(((port as u8 + 1) << 4) | (pin & 0xF))
    }

    /// `None` for [`IoTag::NONE`].
    pub const fn port(&self) -> Option<Port> {
        match self.gpio() {
            0 => None,
            gpio => Port::from_index(gpio - 1),
        }
    }

    pub const fn pin(&self) -> u8 {
        self.pin_number()
    }

    pub const fn is_none(&self) -> bool {
        self.into_bits() == 0
    }

    /// Parse a pin name such as `PA5`, `pa05` or `A5`.
    /// `NONE` (any case) yields [`IoTag::NONE`].
    pub fn parse(name: &str) -> Option<IoTag> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("none") {
            return Some(IoTag::NONE);
        }
        let name = match name.as_bytes().first() {
            Some(b'P' | b'p') if name.len() > 2 => &name[1..],
            _ => name,
        };
        let mut chars = name.chars();
        let port = Port::from_letter(chars.next()?)?;
        let digits = chars.as_str();
        if digits.is_empty() || digits.len() > 2 {
            return None;
        }
        let pin: u8 = digits.parse().ok()?;
        if pin > 15 {
            return None;
        }
        Some(IoTag::new(port, pin))
    }
}

impl Display for IoTag {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self.port() {
            Some(port) => write!(f, "P{}{}", port.letter(), self.pin()),
            None => write!(f, "NONE"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for IoTag {
    fn format(&self, fmt: defmt::Formatter) {
        match self.port() {
            Some(port) => defmt::write!(fmt, "P{=char}{=u8}", port.letter(), self.pin()),
            None => defmt::write!(fmt, "NONE"),
        }
    }
}

/// The function a pin (or DMA stream) is claimed for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Owner {
    Motor,
    Servo,
    LedStrip,
    Ppm,
    PwmInput,
    Beeper,
    Led,
    SpiSck,
    SpiSdi,
    SpiSdo,
    SpiCs,
    I2cScl,
    I2cSda,
    SerialTx,
    SerialRx,
    Adc,
    Timer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Claim {
    tag: IoTag,
    owner: Owner,
    index: u8,
}

/// Tracks which function owns each pin, for up to `N` pins.
#[derive(Debug, Default)]
pub struct ResourceRegistry<const N: usize> {
    claims: Vec<Claim, N>,
}

impl<const N: usize> ResourceRegistry<N> {
    pub const fn new() -> Self {
        Self { claims: Vec::new() }
    }

    /// Claim `tag` for the `index`th resource of `owner` (1-based, 0 = the only one).
    ///
    /// Claiming [`IoTag::NONE`] or re-claiming a pin for the same resource
    /// succeeds without effect.
    pub fn claim(
        &mut self,
        tag: IoTag,
        owner: Owner,
        index: u8,
    ) -> core::result::Result<(), BspError> {
        if tag.is_none() {
            return Ok(());
        }
        if let Some(claim) = self.claims.iter().find(|c| c.tag == tag) {
            if claim.owner == owner && claim.index == index {
                return Ok(());
            }
            warn!("{} is already claimed", tag);
            return Err(BspError::PinInUse {
                tag,
                owner: claim.owner,
                index: claim.index,
            });
        }
        self.claims
            .push(Claim { tag, owner, index })
            .map_err(|_| BspError::RegistryFull)
    }

    pub fn owner(&self, tag: IoTag) -> Option<(Owner, u8)> {
        self.claims
            .iter()
            .find(|c| c.tag == tag)
            .map(|c| (c.owner, c.index))
    }

    /// Release `tag`, returning its former owner.
    pub fn release(&mut self, tag: IoTag) -> Option<(Owner, u8)> {
        let position = self.claims.iter().position(|c| c.tag == tag)?;
        let claim = self.claims.swap_remove(position);
        Some((claim.owner, claim.index))
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

#[cfg(test)]
mod test {
    extern crate std;
    use super::{IoTag, Owner, Port, ResourceRegistry};
    use crate::BspError;
    use std::string::ToString;

    #[test]
    fn tag_layout() {
        let tag = IoTag::new(Port::A, 5);
        assert_eq!(tag.into_bits(), 0x15);
        assert_eq!(tag.port(), Some(Port::A));
        assert_eq!(tag.pin(), 5);
        assert!(!tag.is_none());
        assert_eq!(IoTag::new(Port::K, 15).into_bits(), 0xBF);
        assert!(IoTag::NONE.is_none());
        assert_eq!(IoTag::NONE.port(), None);
        assert_eq!(IoTag::from_bits(0xF0).port(), None);
    }

    #[test]
    fn display() {
        assert_eq!(IoTag::new(Port::C, 13).to_string(), "PC13");
        assert_eq!(IoTag::NONE.to_string(), "NONE");
    }

    #[test]
    fn parse() {
        let pa5 = Some(IoTag::new(Port::A, 5));
        assert_eq!(IoTag::parse("PA5"), pa5);
        assert_eq!(IoTag::parse("pa05"), pa5);
        assert_eq!(IoTag::parse("A05"), pa5);
        assert_eq!(IoTag::parse("a5"), pa5);
        assert_eq!(IoTag::parse(" PB12 "), Some(IoTag::new(Port::B, 12)));
        // there is no port P
        assert_eq!(IoTag::parse("P1"), None);
        assert_eq!(IoTag::parse("none"), Some(IoTag::NONE));
        assert_eq!(IoTag::parse("PA16"), None);
        assert_eq!(IoTag::parse("PZ1"), None);
        assert_eq!(IoTag::parse("PA"), None);
        assert_eq!(IoTag::parse(""), None);
        assert_eq!(IoTag::parse("PA123"), None);
    }

    #[test]
    fn claims() {
        let mut registry = ResourceRegistry::<2>::new();
        let pa5 = IoTag::new(Port::A, 5);
        let pb3 = IoTag::new(Port::B, 3);
        registry.claim(pa5, Owner::SpiSck, 1).unwrap();
        registry.claim(pa5, Owner::SpiSck, 1).unwrap();
        assert_eq!(
            registry.claim(pa5, Owner::SpiSck, 2),
            Err(BspError::PinInUse {
                tag: pa5,
                owner: Owner::SpiSck,
                index: 1
            })
        );
        registry.claim(IoTag::NONE, Owner::Motor, 1).unwrap();
        registry.claim(pb3, Owner::Motor, 1).unwrap();
        assert_eq!(
            registry.claim(IoTag::new(Port::C, 0), Owner::Motor, 2),
            Err(BspError::RegistryFull)
        );
        assert_eq!(registry.owner(pb3), Some((Owner::Motor, 1)));
        assert_eq!(registry.release(pa5), Some((Owner::SpiSck, 1)));
        assert_eq!(registry.owner(pa5), None);
        assert_eq!(registry.release(pa5), None);
        assert_eq!(registry.len(), 1);
    }
}
