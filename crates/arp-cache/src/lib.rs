//! An ARP (RFC 826) resolver for IPv4 over Ethernet, sized at compile time.
//!
//! [`ArpCache`] keeps a fixed pool of entries mapping IP addresses to
//! hardware addresses. Entries are static (configured, never aged) or
//! dynamic (learned, recycled least recently used first). Packets sent to an
//! unresolved address wait in a small per-entry queue until the reply arrives.
//!
//! The cache never owns the network interface. Every operation that
//! transmits takes an [`ArpLink`].
//!
//! ## Management API
//!
//! - [`ArpCache::static_entry_create()`](fn@crate::ArpCache::static_entry_create)
//! - [`ArpCache::static_entry_delete()`](fn@crate::ArpCache::static_entry_delete)
//! - [`ArpCache::static_entries_delete()`](fn@crate::ArpCache::static_entries_delete)
//! - [`ArpCache::dynamic_entry_set()`](fn@crate::ArpCache::dynamic_entry_set)
//! - [`ArpCache::dynamic_entries_invalidate()`](fn@crate::ArpCache::dynamic_entries_invalidate)
//! - [`ArpCache::entry_delete()`](fn@crate::ArpCache::entry_delete)
//! - [`ArpCache::hardware_address_find()`](fn@crate::ArpCache::hardware_address_find)
//! - [`ArpCache::ip_address_find()`](fn@crate::ArpCache::ip_address_find)
//! - [`ArpCache::entries()`](fn@crate::ArpCache::entries)
//! - [`ArpCache::stats()`](fn@crate::ArpCache::stats)
//!
//! ## Protocol API
//!
//! - [`ArpCache::resolve()`](fn@crate::ArpCache::resolve)
//! - [`ArpCache::receive()`](fn@crate::ArpCache::receive)
//! - [`ArpCache::periodic_update()`](fn@crate::ArpCache::periodic_update)
//! - [`ArpCache::send_gratuitous()`](fn@crate::ArpCache::send_gratuitous)
//! - [`ArpCache::probe()`](fn@crate::ArpCache::probe)
//!
#![no_std]

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod fmt;

mod address;
pub use address::MacAddress;

mod packet;
pub use packet::{ArpOperation, ArpPacket, ParseError, ETHERTYPE_ARP};

mod config;
pub use config::ArpConfig;

mod error;
pub use error::{ArpError, CacheError};

mod link;
pub use link::ArpLink;

mod stats;
pub use stats::{ArpEvent, ArpStats, Resolution};

mod cache;
pub use cache::{ArpCache, ArpEntry, BUCKETS};

mod protocol;

#[cfg(test)]
mod test {
    extern crate std;
    use crate::{ArpLink, ArpPacket, MacAddress};
    use std::vec::Vec;

    /// Records every frame instead of sending it.
    #[derive(Default)]
    pub struct RecordingLink {
        pub arp: Vec<(MacAddress, ArpPacket)>,
        pub ip: Vec<(MacAddress, u32)>,
        /// Makes every send fail.
        pub fail: bool,
    }

    impl ArpLink for RecordingLink {
        type Packet = u32;
        type Error = ();

        fn send_arp(&mut self, dest: MacAddress, packet: &ArpPacket) -> Result<(), ()> {
            if self.fail {
                return Err(());
            }
            self.arp.push((dest, *packet));
            Ok(())
        }

        fn send_ip(&mut self, dest: MacAddress, packet: u32) -> Result<(), ()> {
            if self.fail {
                return Err(());
            }
            self.ip.push((dest, packet));
            Ok(())
        }
    }
}
