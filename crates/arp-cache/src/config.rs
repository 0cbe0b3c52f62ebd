/// Timing and policy parameters of an [`ArpCache`](crate::ArpCache).
///
/// This struct follows a builder pattern. Start with [`ArpConfig::default`]:
/// ```
/// use arp_cache::ArpConfig;
///
/// let config = ArpConfig::default().with_expiration(300).with_max_retries(5);
/// assert_eq!(config.expiration(), 300);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpConfig {
    update_interval: u32,
    expiration: u32,
    max_retries: u8,
    queue_depth: usize,
    defend_interval: u32,
    auto_entry: bool,
}

impl Default for ArpConfig {
    /// | parameter | default value |
    /// |----------:|:--------------|
    /// | [`ArpConfig::update_interval()`] | `10` seconds |
    /// | [`ArpConfig::expiration()`] | `0` (resolved entries never age) |
    /// | [`ArpConfig::max_retries()`] | `18` |
    /// | [`ArpConfig::queue_depth()`] | `4` |
    /// | [`ArpConfig::defend_interval()`] | `10` seconds |
    /// | [`ArpConfig::auto_entry()`] | `true` |
    fn default() -> Self {
        Self {
            update_interval: 10,
            expiration: 0,
            max_retries: 18,
            queue_depth: 4,
            defend_interval: 10,
            auto_entry: true,
        }
    }
}

impl ArpConfig {
    /// Seconds between two requests for an unanswered entry.
    pub const fn update_interval(&self) -> u32 {
        self.update_interval
    }

    /// This value is clamped to a minimum of 1.
    pub fn with_update_interval(self, seconds: u32) -> Self {
        Self {
            update_interval: seconds.max(1),
            ..self
        }
    }

    /// Seconds a resolved dynamic entry stays valid before it is
    /// re-requested (0 = forever).
    pub const fn expiration(&self) -> u32 {
        self.expiration
    }

    pub fn with_expiration(self, seconds: u32) -> Self {
        Self {
            expiration: seconds,
            ..self
        }
    }

    /// Requests sent (after the first) before an entry is given up.
    pub const fn max_retries(&self) -> u8 {
        self.max_retries
    }

    pub fn with_max_retries(self, retries: u8) -> Self {
        Self {
            max_retries: retries,
            ..self
        }
    }

    /// Packets held per unresolved entry. The cache further limits this
    /// to its `Q` parameter.
    pub const fn queue_depth(&self) -> usize {
        self.queue_depth
    }

    /// This value is clamped to a minimum of 1.
    pub fn with_queue_depth(self, depth: usize) -> Self {
        Self {
            queue_depth: depth.max(1),
            ..self
        }
    }

    /// Minimum seconds between two defences of our address.
    pub const fn defend_interval(&self) -> u32 {
        self.defend_interval
    }

    pub fn with_defend_interval(self, seconds: u32) -> Self {
        Self {
            defend_interval: seconds,
            ..self
        }
    }

    /// Learn the sender's binding from any ARP packet addressed to us.
    pub const fn auto_entry(&self) -> bool {
        self.auto_entry
    }

    pub fn with_auto_entry(self, enable: bool) -> Self {
        Self {
            auto_entry: enable,
            ..self
        }
    }
}
