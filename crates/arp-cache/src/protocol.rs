use core::net::Ipv4Addr;

use crate::{
    address::Ip,
    cache::{valid_unicast, ArpCache},
    ArpError, ArpEvent, ArpLink, ArpOperation, ArpPacket, CacheError, MacAddress, Resolution,
};

impl<P, const N: usize, const Q: usize> ArpCache<P, N, Q> {
    fn send_request<L>(&mut self, link: &mut L, target: Ipv4Addr) -> Result<(), L::Error>
    where
        L: ArpLink<Packet = P>,
    {
        let request = ArpPacket::request(self.local_mac, self.local_ip, target);
        link.send_arp(MacAddress::BROADCAST, &request)?;
        self.stats.requests_sent += 1;
        Ok(())
    }

    /// Queue `packet` on an unresolved entry, discarding the oldest packet
    /// once the queue holds [`ArpConfig::queue_depth()`](crate::ArpConfig::queue_depth) packets.
    fn enqueue(&mut self, index: usize, packet: P) {
        let depth = self.queue_depth();
        let queue = &mut self.slots[index].queue;
        while !queue.is_empty() && queue.len() >= depth {
            queue.pop_front();
            self.stats.packets_dropped += 1;
        }
        if queue.push_back(packet).is_err() {
            self.stats.packets_dropped += 1;
        }
    }

    /// Send an IPv4 `packet` to `ip`, resolving its hardware address first
    /// if needed.
    ///
    /// The limited broadcast address and multicast groups map to hardware
    /// addresses directly. Packets to an unresolved destination are queued
    /// until the reply arrives (see [`ArpCache::receive()`]).
    ///
    /// [`Resolution::Requested`] and [`Resolution::Queued`] mean the packet
    /// was accepted. If the link fails to send the first request, the packet
    /// stays queued, the failure is logged and the request is sent again by
    /// [`ArpCache::periodic_update()`]. An `Err` means the packet was dropped.
    pub fn resolve<L>(
        &mut self,
        link: &mut L,
        ip: Ipv4Addr,
        packet: P,
    ) -> Result<Resolution, ArpError<L::Error>>
    where
        L: ArpLink<Packet = P>,
    {
        if ip.is_broadcast() {
            link.send_ip(MacAddress::BROADCAST, packet)
                .map_err(ArpError::Link)?;
            return Ok(Resolution::Sent);
        }
        if ip.is_multicast() {
            link.send_ip(MacAddress::ipv4_multicast(ip), packet)
                .map_err(ArpError::Link)?;
            return Ok(Resolution::Sent);
        }
        if !valid_unicast(ip) {
            return Err(CacheError::InvalidAddress.into());
        }

        if let Some(index) = self.find(ip) {
            self.touch(index);
            let slot = &self.slots[index];
            if slot.is_resolved() {
                let mac = slot.mac;
                link.send_ip(mac, packet).map_err(ArpError::Link)?;
                return Ok(Resolution::Sent);
            }
            self.enqueue(index, packet);
            return Ok(Resolution::Queued);
        }

        let index = self.allocate(ip).ok_or(CacheError::NoFreeEntry)?;
        self.slots[index].next_update = self.config.update_interval();
        self.enqueue(index, packet);
        debug!("resolving {}", Ip(ip));
        if self.send_request(link, ip).is_err() {
            warn!("request for {} not sent, retrying on the next update", Ip(ip));
        }
        Ok(Resolution::Requested)
    }

    /// Process the payload of a received ARP frame.
    ///
    /// Answers requests for our address, updates the entry of the sender
    /// if there is one (sending the packets waiting for it) and, when
    /// [`ArpConfig::auto_entry()`](crate::ArpConfig::auto_entry) is set,
    /// learns senders that address us. A host claiming our own IP address
    /// is answered with a gratuitous reply, at most once per
    /// [`ArpConfig::defend_interval()`](crate::ArpConfig::defend_interval).
    pub fn receive<L>(
        &mut self,
        link: &mut L,
        payload: &[u8],
    ) -> Result<ArpEvent, ArpError<L::Error>>
    where
        L: ArpLink<Packet = P>,
    {
        let packet = match ArpPacket::parse(payload) {
            Ok(packet) => packet,
            Err(e) => {
                self.stats.invalid_messages += 1;
                warn!("dropping ARP packet: {}", e);
                return Ok(ArpEvent::Invalid(e));
            }
        };
        match packet.operation {
            ArpOperation::Request => self.stats.requests_received += 1,
            ArpOperation::Reply => self.stats.responses_received += 1,
        }

        let have_ip = !self.local_ip.is_unspecified();
        if have_ip && packet.sender_ip == self.local_ip {
            if packet.sender_mac == self.local_mac {
                return Ok(ArpEvent::Ignored);
            }
            self.stats.conflicts += 1;
            warn!("{} is claimed by {}", Ip(self.local_ip), packet.sender_mac);
            if self.defend_timer == 0 {
                let defence =
                    ArpPacket::gratuitous(ArpOperation::Reply, self.local_mac, self.local_ip);
                link.send_arp(MacAddress::BROADCAST, &defence)
                    .map_err(ArpError::Link)?;
                self.stats.responses_sent += 1;
                self.defend_timer = self.config.defend_interval();
            }
            return Ok(ArpEvent::Conflict(packet.sender_mac));
        }

        let for_us = have_ip && packet.target_ip == self.local_ip;
        let mut replied = false;
        if for_us && packet.operation == ArpOperation::Request {
            let reply = ArpPacket::reply(
                self.local_mac,
                self.local_ip,
                packet.sender_mac,
                packet.sender_ip,
            );
            link.send_arp(packet.sender_mac, &reply)
                .map_err(ArpError::Link)?;
            self.stats.responses_sent += 1;
            replied = true;
        }

        let fallback = if replied {
            ArpEvent::Replied
        } else {
            ArpEvent::Ignored
        };
        // probes (sender IP 0) and bogus senders are never cached
        let sender = packet.sender_ip;
        if !valid_unicast(sender) || packet.sender_mac.is_zero() || packet.sender_mac.is_broadcast()
        {
            return Ok(fallback);
        }

        match self.find(sender) {
            Some(index) if self.slots[index].is_static => Ok(fallback),
            Some(index) => {
                let was_resolved = self.slots[index].is_resolved();
                self.touch(index);
                let flushed = self.bind(link, index, packet.sender_mac)?;
                if was_resolved {
                    trace!("refreshed {} -> {}", Ip(sender), packet.sender_mac);
                    Ok(ArpEvent::Updated(sender))
                } else {
                    debug!("resolved {} -> {}", Ip(sender), packet.sender_mac);
                    Ok(ArpEvent::Resolved {
                        ip: sender,
                        flushed,
                    })
                }
            }
            None if for_us && self.config.auto_entry() => match self.allocate(sender) {
                Some(index) => {
                    self.bind(link, index, packet.sender_mac)?;
                    debug!("learned {} -> {}", Ip(sender), packet.sender_mac);
                    Ok(ArpEvent::Learned(sender))
                }
                None => Ok(fallback),
            },
            None => Ok(fallback),
        }
    }

    /// Advance the cache by one second. Call this from a 1 Hz timer.
    ///
    /// Unanswered entries are re-requested every
    /// [`ArpConfig::update_interval()`](crate::ArpConfig::update_interval)
    /// seconds and freed (with their queued packets) after
    /// [`ArpConfig::max_retries()`](crate::ArpConfig::max_retries) retries.
    /// Resolved dynamic entries lose their binding once their
    /// [`ArpConfig::expiration()`](crate::ArpConfig::expiration) elapses and
    /// are resolved again.
    ///
    /// A failing link does not stop the sweep; the first link error is returned.
    pub fn periodic_update<L>(&mut self, link: &mut L) -> Result<(), ArpError<L::Error>>
    where
        L: ArpLink<Packet = P>,
    {
        self.defend_timer = self.defend_timer.saturating_sub(1);
        let update_interval = self.config.update_interval();
        let max_retries = self.config.max_retries();
        let mut result = Ok(());

        for index in 0..N {
            let slot = &mut self.slots[index];
            if !slot.in_use || slot.is_static || slot.next_update == 0 {
                continue;
            }
            slot.next_update -= 1;
            if slot.next_update > 0 {
                continue;
            }

            let ip = slot.ip;
            if slot.is_resolved() {
                trace!("{} expired", Ip(ip));
                slot.mac = MacAddress::ZERO;
                slot.retries = 0;
            } else if slot.retries >= max_retries {
                let dropped = slot.queue.len() as u32;
                debug!("{} unresolved after {} retries", Ip(ip), max_retries);
                self.stats.aged_entries += 1;
                self.stats.packets_dropped += dropped;
                self.release(index);
                continue;
            } else {
                slot.retries += 1;
            }
            self.slots[index].next_update = update_interval;
            if let Err(e) = self.send_request(link, ip) {
                if result.is_ok() {
                    result = Err(ArpError::Link(e));
                }
            }
        }
        result
    }

    /// Broadcast a gratuitous request announcing our binding.
    pub fn send_gratuitous<L>(&mut self, link: &mut L) -> Result<(), ArpError<L::Error>>
    where
        L: ArpLink<Packet = P>,
    {
        if self.local_ip.is_unspecified() {
            return Err(CacheError::InvalidAddress.into());
        }
        let announce = ArpPacket::gratuitous(ArpOperation::Request, self.local_mac, self.local_ip);
        link.send_arp(MacAddress::BROADCAST, &announce)
            .map_err(ArpError::Link)?;
        self.stats.requests_sent += 1;
        Ok(())
    }

    /// Broadcast a probe (a request with an unspecified sender IP) asking
    /// whether `ip` is in use, before claiming it.
    ///
    /// Any answer shows up as [`ArpEvent::Learned`], [`ArpEvent::Updated`] or
    /// through [`ArpCache::hardware_address_find()`] if an entry exists.
    pub fn probe<L>(&mut self, link: &mut L, ip: Ipv4Addr) -> Result<(), ArpError<L::Error>>
    where
        L: ArpLink<Packet = P>,
    {
        if !valid_unicast(ip) {
            return Err(CacheError::InvalidAddress.into());
        }
        let probe = ArpPacket::request(self.local_mac, Ipv4Addr::UNSPECIFIED, ip);
        link.send_arp(MacAddress::BROADCAST, &probe)
            .map_err(ArpError::Link)?;
        self.stats.requests_sent += 1;
        Ok(())
    }
}
