use core::{
    fmt::{Display, Formatter, Result},
    net::Ipv4Addr,
};

/// A 48 bit IEEE 802 hardware address.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    pub const BROADCAST: MacAddress = MacAddress([0xFF; 6]);
    pub const ZERO: MacAddress = MacAddress([0; 6]);

    /// Build an address from the 16 most significant bits and the
    /// 32 least significant bits (the layout many MAC drivers report).
    pub const fn from_msw_lsw(msw: u16, lsw: u32) -> Self {
        let msw = msw.to_be_bytes();
        let lsw = lsw.to_be_bytes();
        MacAddress([msw[0], msw[1], lsw[0], lsw[1], lsw[2], lsw[3]])
    }

    pub const fn is_zero(&self) -> bool {
        let b = &self.0;
        (b[0] | b[1] | b[2] | b[3] | b[4] | b[5]) == 0
    }

    pub const fn is_broadcast(&self) -> bool {
        let b = &self.0;
        (b[0] & b[1] & b[2] & b[3] & b[4] & b[5]) == 0xFF
    }

    /// The Ethernet group address an IPv4 multicast `ip` maps to (RFC 1112).
    pub const fn ipv4_multicast(ip: Ipv4Addr) -> Self {
        let o = ip.octets();
        MacAddress([0x01, 0x00, 0x5E, o[1] & 0x7F, o[2], o[3]])
    }

    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl From<[u8; 6]> for MacAddress {
    fn from(value: [u8; 6]) -> Self {
        MacAddress(value)
    }
}

impl Display for MacAddress {
    fn fmt(&self, f: &mut Formatter) -> Result {
        let b = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for MacAddress {
    fn format(&self, fmt: defmt::Formatter) {
        let b = &self.0;
        defmt::write!(
            fmt,
            "{=u8:02x}:{=u8:02x}:{=u8:02x}:{=u8:02x}:{=u8:02x}:{=u8:02x}",
            b[0],
            b[1],
            b[2],
            b[3],
            b[4],
            b[5]
        )
    }
}

/// Wraps an [`Ipv4Addr`] so it can be handed to either logging backend.
#[derive(Clone, Copy)]
pub(crate) struct Ip(pub Ipv4Addr);

impl Display for Ip {
    fn fmt(&self, f: &mut Formatter) -> Result {
        Display::fmt(&self.0, f)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Ip {
    fn format(&self, fmt: defmt::Formatter) {
        let o = self.0.octets();
        defmt::write!(fmt, "{=u8}.{=u8}.{=u8}.{=u8}", o[0], o[1], o[2], o[3])
    }
}
