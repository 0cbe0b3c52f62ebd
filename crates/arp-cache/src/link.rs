use crate::{ArpPacket, MacAddress};

/// The network interface an [`ArpCache`](crate::ArpCache) transmits through.
///
/// Packets handed to the cache for resolution are owned values of
/// [`ArpLink::Packet`]; a packet the cache discards is dropped, so a pool
/// backed packet type should return its buffer in [`Drop`].
pub trait ArpLink {
    type Packet;
    type Error;

    /// Frame `packet` with [`ETHERTYPE_ARP`](crate::ETHERTYPE_ARP) and send it to `dest`.
    fn send_arp(&mut self, dest: MacAddress, packet: &ArpPacket) -> Result<(), Self::Error>;

    /// Send an IPv4 `packet` to the hardware address `dest`.
    fn send_ip(&mut self, dest: MacAddress, packet: Self::Packet) -> Result<(), Self::Error>;
}
