use core::net::Ipv4Addr;

use crate::{MacAddress, ParseError};

/// Counters kept by an [`ArpCache`](crate::ArpCache).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ArpStats {
    pub requests_sent: u32,
    pub requests_received: u32,
    pub responses_sent: u32,
    pub responses_received: u32,
    /// Dynamic entries currently in use.
    pub dynamic_entries: u32,
    /// Static entries currently in use.
    pub static_entries: u32,
    /// Entries freed after exhausting their retries.
    pub aged_entries: u32,
    /// Received ARP payloads that failed to parse.
    pub invalid_messages: u32,
    /// Received packets claiming our IP address from another hardware address.
    pub conflicts: u32,
    /// Queued packets discarded before their entry resolved.
    pub packets_dropped: u32,
}

/// What [`ArpCache::resolve()`](crate::ArpCache::resolve) did with a packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resolution {
    /// The destination was known and the packet was sent.
    Sent,
    /// The packet joined the queue of an entry already waiting for a reply.
    Queued,
    /// A new entry was created, the packet queued and a request broadcast.
    Requested,
}

/// The outcome of [`ArpCache::receive()`](crate::ArpCache::receive).
///
/// When a packet has several effects the one affecting the cache is reported,
/// e.g. a request from an unknown host to us yields [`ArpEvent::Learned`]
/// although a reply was sent too.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArpEvent {
    Invalid(ParseError),
    /// Nothing to do with this packet.
    Ignored,
    /// We answered a request for our address.
    Replied,
    /// Another host (the given hardware address) claims our IP address.
    Conflict(MacAddress),
    /// A new dynamic entry was created for the sender.
    Learned(Ipv4Addr),
    /// The binding of a resolved entry was refreshed.
    Updated(Ipv4Addr),
    /// A pending entry was resolved and its queued packets were sent.
    Resolved { ip: Ipv4Addr, flushed: usize },
}

#[cfg(feature = "defmt")]
impl defmt::Format for ArpEvent {
    fn format(&self, fmt: defmt::Formatter) {
        use crate::address::Ip;
        match self {
            ArpEvent::Invalid(e) => defmt::write!(fmt, "invalid: {}", e),
            ArpEvent::Ignored => defmt::write!(fmt, "ignored"),
            ArpEvent::Replied => defmt::write!(fmt, "replied"),
            ArpEvent::Conflict(mac) => defmt::write!(fmt, "conflict with {}", mac),
            ArpEvent::Learned(ip) => defmt::write!(fmt, "learned {}", Ip(*ip)),
            ArpEvent::Updated(ip) => defmt::write!(fmt, "updated {}", Ip(*ip)),
            ArpEvent::Resolved { ip, flushed } => {
                defmt::write!(fmt, "resolved {} ({} sent)", Ip(*ip), flushed)
            }
        }
    }
}
