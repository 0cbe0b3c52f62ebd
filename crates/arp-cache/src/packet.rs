//! The ARP payload as carried in an Ethernet frame (RFC 826), restricted to
//! Ethernet hardware addresses and IPv4 protocol addresses.

use core::{
    fmt::{Display, Formatter, Result},
    net::Ipv4Addr,
};

use crate::MacAddress;

/// The EtherType of frames carrying an [`ArpPacket`].
pub const ETHERTYPE_ARP: u16 = 0x0806;

const HTYPE_ETHERNET: u16 = 1;
const PTYPE_IPV4: u16 = 0x0800;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArpOperation {
    Request,
    Reply,
}

impl ArpOperation {
    pub const fn into_bits(self) -> u16 {
        match self {
            ArpOperation::Request => 1,
            ArpOperation::Reply => 2,
        }
    }
}

/// Reasons a received ARP payload is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Fewer than [`ArpPacket::LEN`] bytes.
    Truncated,
    /// Hardware type is not Ethernet or hardware address length is not 6.
    UnsupportedHardware,
    /// Protocol type is not IPv4 or protocol address length is not 4.
    UnsupportedProtocol,
    UnknownOperation(u16),
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            ParseError::Truncated => write!(f, "truncated packet"),
            ParseError::UnsupportedHardware => write!(f, "unsupported hardware type"),
            ParseError::UnsupportedProtocol => write!(f, "unsupported protocol type"),
            ParseError::UnknownOperation(op) => write!(f, "unknown operation {op}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArpPacket {
    pub operation: ArpOperation,
    pub sender_mac: MacAddress,
    pub sender_ip: Ipv4Addr,
    pub target_mac: MacAddress,
    pub target_ip: Ipv4Addr,
}

#[cfg(feature = "defmt")]
impl defmt::Format for ArpPacket {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "{} {} ({}) -> {} ({})",
            self.operation,
            crate::address::Ip(self.sender_ip),
            self.sender_mac,
            crate::address::Ip(self.target_ip),
            self.target_mac
        )
    }
}

impl ArpPacket {
    /// Length of the encoded payload.
    pub const LEN: usize = 28;

    /// A request asking who owns `target_ip`.
    pub const fn request(sender_mac: MacAddress, sender_ip: Ipv4Addr, target_ip: Ipv4Addr) -> Self {
        ArpPacket {
            operation: ArpOperation::Request,
            sender_mac,
            sender_ip,
            target_mac: MacAddress::ZERO,
            target_ip,
        }
    }

    pub const fn reply(
        sender_mac: MacAddress,
        sender_ip: Ipv4Addr,
        target_mac: MacAddress,
        target_ip: Ipv4Addr,
    ) -> Self {
        ArpPacket {
            operation: ArpOperation::Reply,
            sender_mac,
            sender_ip,
            target_mac,
            target_ip,
        }
    }

    /// An announcement of our own binding: sender and target IP are both `ip`.
    pub const fn gratuitous(operation: ArpOperation, mac: MacAddress, ip: Ipv4Addr) -> Self {
        ArpPacket {
            operation,
            sender_mac: mac,
            sender_ip: ip,
            target_mac: MacAddress::ZERO,
            target_ip: ip,
        }
    }

    pub fn is_gratuitous(&self) -> bool {
        self.sender_ip == self.target_ip
    }

    pub fn parse(buf: &[u8]) -> core::result::Result<Self, ParseError> {
        if buf.len() < Self::LEN {
            return Err(ParseError::Truncated);
        }
        let field = |at: usize| u16::from_be_bytes([buf[at], buf[at + 1]]);
        if field(0) != HTYPE_ETHERNET || buf[4] != 6 {
            return Err(ParseError::UnsupportedHardware);
        }
        if field(2) != PTYPE_IPV4 || buf[5] != 4 {
            return Err(ParseError::UnsupportedProtocol);
        }
        let operation = match field(6) {
            1 => ArpOperation::Request,
            2 => ArpOperation::Reply,
            other => return Err(ParseError::UnknownOperation(other)),
        };
        let mac = |at: usize| {
            let mut octets = [0u8; 6];
            octets.copy_from_slice(&buf[at..at + 6]);
            MacAddress(octets)
        };
        let ip = |at: usize| Ipv4Addr::new(buf[at], buf[at + 1], buf[at + 2], buf[at + 3]);
        Ok(ArpPacket {
            operation,
            sender_mac: mac(8),
            sender_ip: ip(14),
            target_mac: mac(18),
            target_ip: ip(24),
        })
    }

    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut buf = [0u8; Self::LEN];
        buf[0..2].copy_from_slice(&HTYPE_ETHERNET.to_be_bytes());
        buf[2..4].copy_from_slice(&PTYPE_IPV4.to_be_bytes());
        buf[4] = 6;
        buf[5] = 4;
        buf[6..8].copy_from_slice(&self.operation.into_bits().to_be_bytes());
        buf[8..14].copy_from_slice(&self.sender_mac.0);
        buf[14..18].copy_from_slice(&self.sender_ip.octets());
        buf[18..24].copy_from_slice(&self.target_mac.0);
        buf[24..28].copy_from_slice(&self.target_ip.octets());
        buf
    }
}

#[cfg(test)]
mod test {
    use super::{ArpOperation, ArpPacket, ParseError};
    use crate::MacAddress;
    use core::net::Ipv4Addr;

    // Captured request: who has 192.168.1.1? tell 192.168.1.20
    const REQUEST: [u8; 28] = [
        0x00, 0x01, 0x08, 0x00, 0x06, 0x04, 0x00, 0x01, 0x02, 0x00, 0x00, 0xAA, 0xBB, 0xCC, 192,
        168, 1, 20, 0, 0, 0, 0, 0, 0, 192, 168, 1, 1,
    ];

    #[test]
    fn parse_request() {
        let packet = ArpPacket::parse(&REQUEST).unwrap();
        assert_eq!(packet.operation, ArpOperation::Request);
        assert_eq!(
            packet.sender_mac,
            MacAddress([0x02, 0x00, 0x00, 0xAA, 0xBB, 0xCC])
        );
        assert_eq!(packet.sender_ip, Ipv4Addr::new(192, 168, 1, 20));
        assert!(packet.target_mac.is_zero());
        assert_eq!(packet.target_ip, Ipv4Addr::new(192, 168, 1, 1));
        assert!(!packet.is_gratuitous());
        assert_eq!(packet.to_bytes(), REQUEST);
    }

    #[test]
    fn trailing_padding_is_ignored() {
        // Ethernet pads short frames to 46 bytes of payload
        let mut frame = [0u8; 46];
        frame[..28].copy_from_slice(&REQUEST);
        assert!(ArpPacket::parse(&frame).is_ok());
    }

    #[test]
    fn rejects_malformed() {
        assert_eq!(ArpPacket::parse(&REQUEST[..27]), Err(ParseError::Truncated));

        let mut bad = REQUEST;
        bad[1] = 6; // IEEE 802 hardware type
        assert_eq!(ArpPacket::parse(&bad), Err(ParseError::UnsupportedHardware));

        let mut bad = REQUEST;
        bad[2] = 0x86; // IPv6
        bad[3] = 0xDD;
        assert_eq!(ArpPacket::parse(&bad), Err(ParseError::UnsupportedProtocol));

        let mut bad = REQUEST;
        bad[5] = 16;
        assert_eq!(ArpPacket::parse(&bad), Err(ParseError::UnsupportedProtocol));

        let mut bad = REQUEST;
        bad[7] = 3; // RARP request
        assert_eq!(ArpPacket::parse(&bad), Err(ParseError::UnknownOperation(3)));
    }

    #[test]
    fn gratuitous() {
        let ip = Ipv4Addr::new(10, 0, 0, 7);
        let packet = ArpPacket::gratuitous(ArpOperation::Reply, MacAddress([2, 0, 0, 0, 0, 7]), ip);
        assert!(packet.is_gratuitous());
        let bytes = packet.to_bytes();
        assert_eq!(&bytes[6..8], &[0, 2]);
        assert_eq!(&bytes[14..18], &bytes[24..28]);
    }
}
