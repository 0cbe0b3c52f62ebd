use core::fmt::{Display, Formatter, Result};

use crate::{BspError, Owner, Timer, TimerChannel};

/// A DMA stream: DMA1 stream 0 is 1, DMA2 stream 7 is 16.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DmaIdentifier(u8);

impl DmaIdentifier {
    pub const STREAMS_PER_CONTROLLER: u8 = 8;
    pub const COUNT: usize = 16;

    /// `controller` is 1 or 2, `stream` 0 - 7.
    pub const fn new(controller: u8, stream: u8) -> Option<Self> {
        if controller < 1 || controller > 2 || stream >= Self::STREAMS_PER_CONTROLLER {
            return None;
        }
        Some(Self(
            (controller - 1) * Self::STREAMS_PER_CONTROLLER + stream + 1,
        ))
    }

    /// Panics at compile time when used in a `const` with invalid numbers.
    pub(crate) const fn stream_of(controller: u8, stream: u8) -> Self {
        match Self::new(controller, stream) {
            Some(ident) => ident,
            None => panic!("invalid DMA stream"),
        }
    }

    pub const fn from_raw(raw: u8) -> Option<Self> {
        if raw >= 1 && raw as usize <= Self::COUNT {
            Some(Self(raw))
        } else {
            None
        }
    }

    /// 1 - 16
    pub const fn raw(self) -> u8 {
        self.0
    }

    pub const fn controller(self) -> u8 {
        (self.0 - 1) / Self::STREAMS_PER_CONTROLLER + 1
    }

    pub const fn stream(self) -> u8 {
        (self.0 - 1) % Self::STREAMS_PER_CONTROLLER
    }
}

impl Display for DmaIdentifier {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "DMA{} Stream {}", self.controller(), self.stream())
    }
}

/// A stream and the request channel (or DMAMUX request id) selecting a peripheral on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DmaChannelSpec {
    pub ident: DmaIdentifier,
    pub channel: u8,
}

impl DmaChannelSpec {
    pub(crate) const fn new(controller: u8, stream: u8, channel: u8) -> Self {
        Self {
            ident: DmaIdentifier::stream_of(controller, stream),
            channel,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaPeripheral {
    SpiSdo,
    SpiSdi,
    Adc,
    Sdio,
    UartTx,
    UartRx,
}

/// The streams a peripheral instance (1-based `index`) can use, in option order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DmaPeripheralMapping {
    pub peripheral: DmaPeripheral,
    pub index: u8,
    pub specs: &'static [DmaChannelSpec],
}

/// The streams a timer channel can use, in option order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DmaTimerMapping {
    pub tim: Timer,
    pub channel: TimerChannel,
    pub specs: &'static [DmaChannelSpec],
}

/// Option `opt` of the streams serving `peripheral` number `index`.
pub fn spec_by_peripheral(
    map: &[DmaPeripheralMapping],
    peripheral: DmaPeripheral,
    index: u8,
    opt: u8,
) -> Option<&'static DmaChannelSpec> {
    map.iter()
        .find(|m| m.peripheral == peripheral && m.index == index)
        .and_then(|m| m.specs.get(opt as usize))
}

/// Option `opt` of the streams serving channel `channel` of `tim`.
pub fn spec_by_timer(
    map: &[DmaTimerMapping],
    tim: Timer,
    channel: TimerChannel,
    opt: u8,
) -> Option<&'static DmaChannelSpec> {
    map.iter()
        .find(|m| m.tim == tim && m.channel == channel)
        .and_then(|m| m.specs.get(opt as usize))
}

/// Tracks which resource owns each DMA stream.
#[derive(Debug, Default)]
pub struct DmaAllocator {
    owners: [Option<(Owner, u8)>; DmaIdentifier::COUNT],
}

impl DmaAllocator {
    pub const fn new() -> Self {
        Self {
            owners: [None; DmaIdentifier::COUNT],
        }
    }

    /// Allocate `ident` to the `index`th resource of `owner`.
    /// Allocating a stream twice to the same resource succeeds.
    pub fn allocate(
        &mut self,
        ident: DmaIdentifier,
        owner: Owner,
        index: u8,
    ) -> core::result::Result<(), BspError> {
        let slot = &mut self.owners[ident.raw() as usize - 1];
        match *slot {
            Some((o, i)) if (o, i) == (owner, index) => Ok(()),
            Some((o, i)) => {
                warn!("{} is already allocated", ident);
                Err(BspError::DmaInUse {
                    ident,
                    owner: o,
                    index: i,
                })
            }
            None => {
                *slot = Some((owner, index));
                Ok(())
            }
        }
    }

    pub fn owner(&self, ident: DmaIdentifier) -> Option<(Owner, u8)> {
        self.owners[ident.raw() as usize - 1]
    }

    pub fn free(&mut self, ident: DmaIdentifier) -> Option<(Owner, u8)> {
        self.owners[ident.raw() as usize - 1].take()
    }
}

#[cfg(test)]
mod test {
    extern crate std;
    use super::{
        spec_by_peripheral, spec_by_timer, DmaAllocator, DmaChannelSpec, DmaIdentifier,
        DmaPeripheral, DmaPeripheralMapping, DmaTimerMapping,
    };
    use crate::{BspError, Owner, Timer, TimerChannel};
    use std::string::ToString;

    const PERIPHERALS: [DmaPeripheralMapping; 1] = [DmaPeripheralMapping {
        peripheral: DmaPeripheral::SpiSdo,
        index: 1,
        specs: &[DmaChannelSpec::new(2, 3, 3), DmaChannelSpec::new(2, 5, 3)],
    }];

    const TIMERS: [DmaTimerMapping; 1] = [DmaTimerMapping {
        tim: Timer::Tim4,
        channel: TimerChannel::Ch1,
        specs: &[DmaChannelSpec::new(1, 0, 2)],
    }];

    #[test]
    fn identifiers() {
        let first = DmaIdentifier::new(1, 0).unwrap();
        let last = DmaIdentifier::new(2, 7).unwrap();
        assert_eq!(first.raw(), 1);
        assert_eq!(last.raw(), 16);
        assert_eq!((last.controller(), last.stream()), (2, 7));
        assert_eq!(DmaIdentifier::new(2, 3).unwrap().to_string(), "DMA2 Stream 3");
        assert_eq!(DmaIdentifier::new(0, 0), None);
        assert_eq!(DmaIdentifier::new(3, 0), None);
        assert_eq!(DmaIdentifier::new(1, 8), None);
        assert_eq!(DmaIdentifier::from_raw(0), None);
        assert_eq!(DmaIdentifier::from_raw(12), DmaIdentifier::new(2, 3));
        assert_eq!(DmaIdentifier::from_raw(17), None);
    }

    #[test]
    fn lookups() {
        let spec = spec_by_peripheral(&PERIPHERALS, DmaPeripheral::SpiSdo, 1, 1).unwrap();
        assert_eq!(spec.ident.to_string(), "DMA2 Stream 5");
        assert_eq!(spec.channel, 3);
        assert_eq!(spec_by_peripheral(&PERIPHERALS, DmaPeripheral::SpiSdo, 1, 2), None);
        assert_eq!(spec_by_peripheral(&PERIPHERALS, DmaPeripheral::SpiSdi, 1, 0), None);
        assert_eq!(spec_by_peripheral(&PERIPHERALS, DmaPeripheral::SpiSdo, 2, 0), None);

        let spec = spec_by_timer(&TIMERS, Timer::Tim4, TimerChannel::Ch1, 0).unwrap();
        assert_eq!(spec.ident, DmaIdentifier::new(1, 0).unwrap());
        assert_eq!(spec_by_timer(&TIMERS, Timer::Tim4, TimerChannel::Ch2, 0), None);
    }

    #[test]
    fn allocation() {
        let mut dma = DmaAllocator::new();
        let ident = DmaIdentifier::new(1, 4).unwrap();
        dma.allocate(ident, Owner::Motor, 1).unwrap();
        dma.allocate(ident, Owner::Motor, 1).unwrap();
        assert_eq!(
            dma.allocate(ident, Owner::Motor, 2),
            Err(BspError::DmaInUse {
                ident,
                owner: Owner::Motor,
                index: 1
            })
        );
        assert_eq!(dma.owner(ident), Some((Owner::Motor, 1)));
        assert_eq!(dma.free(ident), Some((Owner::Motor, 1)));
        assert_eq!(dma.owner(ident), None);
        dma.allocate(ident, Owner::SpiSdo, 2).unwrap();
    }
}
