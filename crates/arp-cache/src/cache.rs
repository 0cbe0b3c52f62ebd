use core::net::Ipv4Addr;

use heapless::Deque;

use crate::{address::Ip, ArpConfig, ArpError, ArpLink, ArpStats, CacheError, MacAddress};

/// Number of hash buckets. Must be a power of 2.
pub const BUCKETS: usize = 32;

/// Pool indices. `None` terminates a list.
type Link = Option<usize>;

#[derive(Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Dynamic,
    Static,
}

#[derive(Clone, Copy, Default)]
struct ListHead {
    head: Link,
    tail: Link,
    len: usize,
}

pub(crate) struct Slot<P, const Q: usize> {
    pub(crate) ip: Ipv4Addr,
    pub(crate) mac: MacAddress,
    pub(crate) in_use: bool,
    pub(crate) is_static: bool,
    pub(crate) retries: u8,
    pub(crate) next_update: u32,
    pub(crate) queue: Deque<P, Q>,
    hash_prev: Link,
    hash_next: Link,
    list_prev: Link,
    list_next: Link,
}

impl<P, const Q: usize> Slot<P, Q> {
    fn new() -> Self {
        Slot {
            ip: Ipv4Addr::UNSPECIFIED,
            mac: MacAddress::ZERO,
            in_use: false,
            is_static: false,
            retries: 0,
            next_update: 0,
            queue: Deque::new(),
            hash_prev: None,
            hash_next: None,
            list_prev: None,
            list_next: None,
        }
    }

    pub(crate) fn is_resolved(&self) -> bool {
        !self.mac.is_zero()
    }

    fn view(&self) -> ArpEntry {
        ArpEntry {
            ip: self.ip,
            mac: if self.is_resolved() {
                Some(self.mac)
            } else {
                None
            },
            is_static: self.is_static,
            retries: self.retries,
            next_update: self.next_update,
            queued: self.queue.len(),
        }
    }
}

/// A snapshot of an in-use cache entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArpEntry {
    pub ip: Ipv4Addr,
    /// `None` while the entry waits for a reply.
    pub mac: Option<MacAddress>,
    pub is_static: bool,
    /// Requests sent since the first one.
    pub retries: u8,
    /// Seconds until the next retry (or expiration). 0 = not scheduled.
    pub next_update: u32,
    /// Packets waiting for the resolution.
    pub queued: usize,
}

/// An ARP cache of `N` entries, each holding up to `Q` packets while unresolved.
///
/// Every entry is on exactly one of two lists:
///
/// - the dynamic list, ordered from most to least recently used.
///   Unused entries sit at its tail, so allocation always takes the tail
///   and only evicts a live binding once the pool is exhausted.
/// - the static list, whose entries are never evicted nor aged.
///
/// In-use entries are also chained in one of [`BUCKETS`] hash buckets by IP.
///
/// The cache does no locking. Wrap it in the mutex of your execution
/// environment to share it between the receive path and the timer tick.
pub struct ArpCache<P, const N: usize, const Q: usize = 4> {
    pub(crate) slots: [Slot<P, Q>; N],
    buckets: [Link; BUCKETS],
    dynamic: ListHead,
    statics: ListHead,
    pub(crate) local_mac: MacAddress,
    pub(crate) local_ip: Ipv4Addr,
    pub(crate) config: ArpConfig,
    pub(crate) stats: ArpStats,
    pub(crate) defend_timer: u32,
}

pub(crate) const fn bucket_of(ip: Ipv4Addr) -> usize {
    let value = u32::from_be_bytes(ip.octets());
    (value.wrapping_add(value >> 8) as usize) & (BUCKETS - 1)
}

pub(crate) fn valid_unicast(ip: Ipv4Addr) -> bool {
    !(ip.is_unspecified() || ip.is_broadcast() || ip.is_multicast())
}

impl<P, const N: usize, const Q: usize> ArpCache<P, N, Q> {
    /// Create a cache for the interface owning `local_mac` and `local_ip`.
    ///
    /// `local_ip` may be [`Ipv4Addr::UNSPECIFIED`] until an address is assigned
    /// (see [`ArpCache::set_local_ip()`]).
    pub fn new(local_mac: MacAddress, local_ip: Ipv4Addr, config: ArpConfig) -> Self {
        let mut cache = ArpCache {
            slots: core::array::from_fn(|_| Slot::new()),
            buckets: [None; BUCKETS],
            dynamic: ListHead::default(),
            statics: ListHead::default(),
            local_mac,
            local_ip,
            config,
            stats: ArpStats::default(),
            defend_timer: 0,
        };
        for index in 0..N {
            cache.list_push_back(ListKind::Dynamic, index);
        }
        cache
    }

    pub fn local_mac(&self) -> MacAddress {
        self.local_mac
    }

    pub fn local_ip(&self) -> Ipv4Addr {
        self.local_ip
    }

    pub fn set_local_ip(&mut self, ip: Ipv4Addr) {
        self.local_ip = ip;
    }

    pub fn config(&self) -> &ArpConfig {
        &self.config
    }

    pub fn stats(&self) -> ArpStats {
        let mut stats = self.stats;
        stats.static_entries = self.statics.len as u32;
        stats.dynamic_entries = self
            .slots
            .iter()
            .filter(|s| s.in_use && !s.is_static)
            .count() as u32;
        stats
    }

    /// Iterate over the entries in use.
    pub fn entries(&self) -> impl Iterator<Item = ArpEntry> + '_ {
        self.slots.iter().filter(|s| s.in_use).map(Slot::view)
    }

    pub fn entry(&self, ip: Ipv4Addr) -> Option<ArpEntry> {
        self.find(ip).map(|index| self.slots[index].view())
    }

    /// The packets per entry actually queued: the configured depth, limited by `Q`.
    pub(crate) fn queue_depth(&self) -> usize {
        self.config.queue_depth().min(Q)
    }

    fn list(&mut self, kind: ListKind) -> &mut ListHead {
        match kind {
            ListKind::Dynamic => &mut self.dynamic,
            ListKind::Static => &mut self.statics,
        }
    }

    fn list_push_front(&mut self, kind: ListKind, index: usize) {
        let old_head = self.list(kind).head;
        self.slots[index].list_prev = None;
        self.slots[index].list_next = old_head;
        match old_head {
            Some(head) => self.slots[head].list_prev = Some(index),
            None => self.list(kind).tail = Some(index),
        }
        let list = self.list(kind);
        list.head = Some(index);
        list.len += 1;
    }

    fn list_push_back(&mut self, kind: ListKind, index: usize) {
        let old_tail = self.list(kind).tail;
        self.slots[index].list_next = None;
        self.slots[index].list_prev = old_tail;
        match old_tail {
            Some(tail) => self.slots[tail].list_next = Some(index),
            None => self.list(kind).head = Some(index),
        }
        let list = self.list(kind);
        list.tail = Some(index);
        list.len += 1;
    }

    fn list_remove(&mut self, kind: ListKind, index: usize) {
        let (prev, next) = (self.slots[index].list_prev, self.slots[index].list_next);
        match prev {
            Some(prev) => self.slots[prev].list_next = next,
            None => self.list(kind).head = next,
        }
        match next {
            Some(next) => self.slots[next].list_prev = prev,
            None => self.list(kind).tail = prev,
        }
        self.slots[index].list_prev = None;
        self.slots[index].list_next = None;
        self.list(kind).len -= 1;
    }

    fn kind_of(&self, index: usize) -> ListKind {
        if self.slots[index].is_static {
            ListKind::Static
        } else {
            ListKind::Dynamic
        }
    }

    fn hash_insert(&mut self, index: usize) {
        let bucket = bucket_of(self.slots[index].ip);
        let old_head = self.buckets[bucket];
        self.slots[index].hash_prev = None;
        self.slots[index].hash_next = old_head;
        if let Some(head) = old_head {
            self.slots[head].hash_prev = Some(index);
        }
        self.buckets[bucket] = Some(index);
    }

    fn hash_remove(&mut self, index: usize) {
        let (prev, next) = (self.slots[index].hash_prev, self.slots[index].hash_next);
        match prev {
            Some(prev) => self.slots[prev].hash_next = next,
            None => self.buckets[bucket_of(self.slots[index].ip)] = next,
        }
        if let Some(next) = next {
            self.slots[next].hash_prev = prev;
        }
        self.slots[index].hash_prev = None;
        self.slots[index].hash_next = None;
    }

    pub(crate) fn find(&self, ip: Ipv4Addr) -> Option<usize> {
        let mut cursor = self.buckets[bucket_of(ip)];
        while let Some(index) = cursor {
            if self.slots[index].ip == ip {
                return Some(index);
            }
            cursor = self.slots[index].hash_next;
        }
        None
    }

    /// Mark a dynamic entry as the most recently used.
    pub(crate) fn touch(&mut self, index: usize) {
        if !self.slots[index].is_static && self.dynamic.head != Some(index) {
            self.list_remove(ListKind::Dynamic, index);
            self.list_push_front(ListKind::Dynamic, index);
        }
    }

    /// Claim the least recently used dynamic entry for `ip`, evicting
    /// its binding (and dropping its queued packets) if it was in use.
    ///
    /// The new entry is unresolved, in its hash bucket and at the head
    /// of the dynamic list.
    pub(crate) fn allocate(&mut self, ip: Ipv4Addr) -> Option<usize> {
        let index = self.dynamic.tail?;
        if self.slots[index].in_use {
            let evicted = &self.slots[index];
            debug!(
                "evicting {} ({} packets queued)",
                Ip(evicted.ip),
                evicted.queue.len()
            );
            self.stats.packets_dropped += evicted.queue.len() as u32;
            self.hash_remove(index);
        }
        let slot = &mut self.slots[index];
        slot.queue.clear();
        slot.ip = ip;
        slot.mac = MacAddress::ZERO;
        slot.in_use = true;
        slot.retries = 0;
        slot.next_update = 0;
        self.hash_insert(index);
        self.touch(index);
        Some(index)
    }

    /// Return an entry to the tail of the dynamic list as unused.
    /// Its queued packets are dropped.
    pub(crate) fn release(&mut self, index: usize) {
        let kind = self.kind_of(index);
        if self.slots[index].in_use {
            self.hash_remove(index);
        }
        self.list_remove(kind, index);
        let slot = &mut self.slots[index];
        slot.queue.clear();
        slot.ip = Ipv4Addr::UNSPECIFIED;
        slot.mac = MacAddress::ZERO;
        slot.in_use = false;
        slot.is_static = false;
        slot.retries = 0;
        slot.next_update = 0;
        self.list_push_back(ListKind::Dynamic, index);
    }

    /// Store a binding on an entry and send every packet waiting for it.
    ///
    /// Returns the number of packets sent. If the link fails, the packet
    /// it failed on and every packet behind it are dropped, so a resolved
    /// entry never holds queued packets.
    pub(crate) fn bind<L>(
        &mut self,
        link: &mut L,
        index: usize,
        mac: MacAddress,
    ) -> Result<usize, ArpError<L::Error>>
    where
        L: ArpLink<Packet = P>,
    {
        let expiration = self.config.expiration();
        let slot = &mut self.slots[index];
        slot.mac = mac;
        slot.retries = 0;
        slot.next_update = if slot.is_static { 0 } else { expiration };
        let mut sent = 0;
        while let Some(packet) = self.slots[index].queue.pop_front() {
            if let Err(e) = link.send_ip(mac, packet) {
                let queue = &mut self.slots[index].queue;
                let dropped = 1 + queue.len();
                queue.clear();
                warn!("flush to {} failed, {} packets dropped", mac, dropped);
                self.stats.packets_dropped += dropped as u32;
                return Err(ArpError::Link(e));
            }
            sent += 1;
        }
        Ok(sent)
    }

    /// Create (or update) a static binding.
    ///
    /// An existing dynamic entry for `ip` is promoted and the packets
    /// queued on it are sent.
    pub fn static_entry_create<L>(
        &mut self,
        link: &mut L,
        ip: Ipv4Addr,
        mac: MacAddress,
    ) -> Result<(), ArpError<L::Error>>
    where
        L: ArpLink<Packet = P>,
    {
        if !valid_unicast(ip) || mac.is_zero() || mac.is_broadcast() {
            return Err(ArpError::Cache(CacheError::InvalidAddress));
        }
        let index = match self.find(ip) {
            Some(index) => index,
            None => self.allocate(ip).ok_or(CacheError::NoFreeEntry)?,
        };
        if !self.slots[index].is_static {
            self.list_remove(ListKind::Dynamic, index);
            self.slots[index].is_static = true;
            self.list_push_back(ListKind::Static, index);
        }
        debug!("static entry {} -> {}", Ip(ip), mac);
        self.bind(link, index, mac).map(|_| ())
    }

    /// Delete the static entry binding `ip` to `mac`.
    pub fn static_entry_delete(
        &mut self,
        ip: Ipv4Addr,
        mac: MacAddress,
    ) -> Result<(), CacheError> {
        match self.find(ip) {
            Some(index) if self.slots[index].is_static && self.slots[index].mac == mac => {
                self.release(index);
                Ok(())
            }
            _ => Err(CacheError::EntryNotFound),
        }
    }

    /// Delete every static entry. Returns how many were deleted.
    pub fn static_entries_delete(&mut self) -> usize {
        let mut deleted = 0;
        while let Some(index) = self.statics.head {
            self.release(index);
            deleted += 1;
        }
        deleted
    }

    /// Create (or update) a resolved dynamic binding and send the packets
    /// queued on it.
    ///
    /// A static entry for `ip` takes precedence and is left untouched.
    pub fn dynamic_entry_set<L>(
        &mut self,
        link: &mut L,
        ip: Ipv4Addr,
        mac: MacAddress,
    ) -> Result<(), ArpError<L::Error>>
    where
        L: ArpLink<Packet = P>,
    {
        if !valid_unicast(ip) || mac.is_zero() || mac.is_broadcast() {
            return Err(ArpError::Cache(CacheError::InvalidAddress));
        }
        let index = match self.find(ip) {
            Some(index) if self.slots[index].is_static => return Ok(()),
            Some(index) => index,
            None => self.allocate(ip).ok_or(CacheError::NoFreeEntry)?,
        };
        self.touch(index);
        self.bind(link, index, mac).map(|_| ())
    }

    /// Forget every dynamic binding (queued packets are dropped).
    /// Returns how many entries were invalidated.
    pub fn dynamic_entries_invalidate(&mut self) -> usize {
        let mut invalidated = 0;
        for index in 0..N {
            if self.slots[index].in_use && !self.slots[index].is_static {
                self.stats.packets_dropped += self.slots[index].queue.len() as u32;
                self.release(index);
                invalidated += 1;
            }
        }
        invalidated
    }

    /// Delete the entry for `ip`, static or dynamic.
    pub fn entry_delete(&mut self, ip: Ipv4Addr) -> Result<(), CacheError> {
        let index = self.find(ip).ok_or(CacheError::EntryNotFound)?;
        self.stats.packets_dropped += self.slots[index].queue.len() as u32;
        self.release(index);
        Ok(())
    }

    /// Look up the hardware address bound to `ip`.
    pub fn hardware_address_find(&self, ip: Ipv4Addr) -> Result<MacAddress, CacheError> {
        match self.find(ip) {
            Some(index) if self.slots[index].is_resolved() => Ok(self.slots[index].mac),
            _ => Err(CacheError::EntryNotFound),
        }
    }

    /// Look up the IP address bound to `mac`.
    pub fn ip_address_find(&self, mac: MacAddress) -> Result<Ipv4Addr, CacheError> {
        if mac.is_zero() {
            return Err(CacheError::InvalidAddress);
        }
        self.slots
            .iter()
            .find(|s| s.in_use && s.mac == mac)
            .map(|s| s.ip)
            .ok_or(CacheError::EntryNotFound)
    }

    #[cfg(test)]
    pub(crate) fn dynamic_order(&self) -> heapless::Vec<usize, N> {
        let mut order = heapless::Vec::new();
        let mut cursor = self.dynamic.head;
        while let Some(index) = cursor {
            let _ = order.push(index);
            cursor = self.slots[index].list_next;
        }
        order
    }
}
