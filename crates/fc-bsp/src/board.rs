use crate::{
    dma::spec_by_timer, i2c, spi, BspError, DmaAllocator, I2cInstance, I2cPinConfig, IoTag, Mcu,
    Owner, Port, ResourceRegistry, SpiInstance, SpiPinConfig, Timer, TimerChannel, TimerHardware,
    TimerUsage,
};

/// The wiring of a flight controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Board {
    pub name: &'static str,
    pub mcu: Mcu,
    pub timers: &'static [TimerHardware],
    pub spi: &'static [SpiPinConfig],
    pub i2c: &'static [I2cPinConfig],
    /// Status LEDs, LED0 first.
    pub leds: &'static [IoTag],
    /// [`IoTag::NONE`] without a beeper.
    pub beeper: IoTag,
}

/// The owner a timer output is claimed for.
fn timer_owner(usage: TimerUsage) -> Owner {
    if usage.motor() {
        Owner::Motor
    } else if usage.servo() {
        Owner::Servo
    } else if usage.led() {
        Owner::LedStrip
    } else if usage.ppm() {
        Owner::Ppm
    } else if usage.pwm() {
        Owner::PwmInput
    } else if usage.beeper() {
        Owner::Beeper
    } else {
        Owner::Timer
    }
}

impl Board {
    /// Claim every pin the board uses and the DMA streams of its timer outputs.
    ///
    /// Stops at the first pin or stream already held by another resource,
    /// or at the first SPI/I2C pin the MCU cannot route.
    pub fn claim_resources<const N: usize>(
        &self,
        io: &mut ResourceRegistry<N>,
        dma: &mut DmaAllocator,
    ) -> Result<(), BspError> {
        let dma_map = self.mcu.dma_timer_map();
        for (position, timer) in self.timers.iter().enumerate() {
            let owner = timer_owner(timer.usage);
            // 1-based among the outputs of the same owner
            let index = self.timers[..=position]
                .iter()
                .filter(|t| timer_owner(t.usage) == owner)
                .count() as u8;
            io.claim(timer.tag, owner, index)?;
            if let Some(opt) = timer.dma_opt {
                let spec = spec_by_timer(dma_map, timer.tim, timer.channel, opt)
                    .ok_or(BspError::NoDmaMapping)?;
                dma.allocate(spec.ident, owner, index)?;
            }
        }

        for config in self.spi {
            let pins = spi::resolve(self.mcu.spi_hardware(), config)?;
            let index = pins.instance.number();
            io.claim(pins.sck.tag, Owner::SpiSck, index)?;
            io.claim(pins.sdi.tag, Owner::SpiSdi, index)?;
            io.claim(pins.sdo.tag, Owner::SpiSdo, index)?;
        }

        for config in self.i2c {
            let pins = i2c::resolve(self.mcu.i2c_hardware(), config)?;
            let index = pins.instance.number();
            io.claim(pins.scl.tag, Owner::I2cScl, index)?;
            io.claim(pins.sda.tag, Owner::I2cSda, index)?;
        }

        for (led, tag) in self.leds.iter().enumerate() {
            io.claim(*tag, Owner::Led, led as u8 + 1)?;
        }
        io.claim(self.beeper, Owner::Beeper, 0)?;

        info!("{} ({}): {} pins claimed", self.name, self.mcu.name(), io.len());
        Ok(())
    }
}

const fn tag(port: Port, pin: u8) -> IoTag {
    IoTag::new(port, pin)
}

pub const MATEKF405: Board = {
    use Port::*;
    use Timer::*;
    use TimerChannel::*;
    Board {
        name: "MATEKF405",
        mcu: Mcu::Stm32F405,
        timers: &[
            TimerHardware::new(Tim9, Ch2, tag(A, 3), TimerUsage::PPM, 3),
            TimerHardware::new(Tim8, Ch1, tag(C, 6), TimerUsage::MOTOR, 3).with_dma_opt(1),
            TimerHardware::new(Tim8, Ch2, tag(C, 7), TimerUsage::MOTOR, 3).with_dma_opt(1),
            TimerHardware::new(Tim8, Ch3, tag(C, 8), TimerUsage::MOTOR, 3).with_dma_opt(1),
            TimerHardware::new(Tim8, Ch4, tag(C, 9), TimerUsage::MOTOR, 3).with_dma_opt(0),
            TimerHardware::new(Tim2, Ch1, tag(A, 15), TimerUsage::MOTOR, 1).with_dma_opt(0),
            TimerHardware::new(Tim1, Ch1, tag(A, 8), TimerUsage::MOTOR, 1).with_dma_opt(0),
            TimerHardware::new(Tim4, Ch1, tag(B, 6), TimerUsage::LED, 2).with_dma_opt(0),
        ],
        spi: &[
            SpiPinConfig {
                instance: SpiInstance::Spi1,
                sck: tag(A, 5),
                sdi: tag(A, 6),
                sdo: tag(A, 7),
            },
            SpiPinConfig {
                instance: SpiInstance::Spi2,
                sck: tag(B, 13),
                sdi: tag(B, 14),
                sdo: tag(B, 15),
            },
            SpiPinConfig {
                instance: SpiInstance::Spi3,
                sck: tag(C, 10),
                sdi: tag(C, 11),
                sdo: tag(C, 12),
            },
        ],
        i2c: &[I2cPinConfig::new(I2cInstance::I2c2, tag(B, 10), tag(B, 11))],
        leds: &[tag(B, 9), tag(A, 14)],
        beeper: tag(C, 13),
    }
};

pub const AT32F435_GENERIC: Board = {
    use Port::*;
    use Timer::*;
    use TimerChannel::*;
    Board {
        name: "AT32F435_GENERIC",
        mcu: Mcu::At32F435,
        timers: &[
            TimerHardware::new(Tim3, Ch3, tag(B, 0), TimerUsage::MOTOR, 2).with_dma_opt(0),
            TimerHardware::new(Tim3, Ch4, tag(B, 1), TimerUsage::MOTOR, 2).with_dma_opt(0),
            TimerHardware::new(Tim2, Ch4, tag(A, 3), TimerUsage::MOTOR, 1).with_dma_opt(1),
            TimerHardware::new(Tim2, Ch3, tag(A, 2), TimerUsage::MOTOR, 1).with_dma_opt(1),
            TimerHardware::new(Tim1, Ch1, tag(A, 8), TimerUsage::LED, 1).with_dma_opt(1),
            TimerHardware::new(Tim4, Ch1, tag(B, 6), TimerUsage::SERVO, 2),
        ],
        spi: &[
            SpiPinConfig {
                instance: SpiInstance::Spi1,
                sck: tag(A, 5),
                sdi: tag(A, 6),
                sdo: tag(A, 7),
            },
            SpiPinConfig {
                instance: SpiInstance::Spi2,
                sck: tag(B, 13),
                sdi: tag(B, 14),
                sdo: tag(B, 15),
            },
            SpiPinConfig {
                instance: SpiInstance::Spi3,
                sck: tag(C, 10),
                sdi: tag(C, 11),
                sdo: tag(C, 12),
            },
        ],
        i2c: &[I2cPinConfig::new(I2cInstance::I2c2, tag(H, 2), tag(H, 3)).with_pullup(true)],
        leds: &[tag(C, 13), tag(C, 14)],
        beeper: tag(C, 15),
    }
};

pub static BOARDS: [&Board; 2] = [&MATEKF405, &AT32F435_GENERIC];

/// Look a board up by name, ignoring case.
pub fn find_board(name: &str) -> Option<&'static Board> {
    BOARDS
        .iter()
        .copied()
        .find(|board| board.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod test {
    use super::{find_board, AT32F435_GENERIC, BOARDS, MATEKF405};
    use crate::{
        timer::with_usage, BspError, DmaAllocator, DmaIdentifier, IoTag, Owner, Port,
        ResourceRegistry, TimerUsage,
    };

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(find_board("matekf405"), Some(&MATEKF405));
        assert_eq!(find_board("AT32F435_Generic"), Some(&AT32F435_GENERIC));
        assert_eq!(find_board("OMNIBUSF4"), None);
    }

    #[test]
    fn every_board_claims_cleanly() {
        for board in BOARDS {
            let mut io = ResourceRegistry::<32>::new();
            let mut dma = DmaAllocator::new();
            board.claim_resources(&mut io, &mut dma).unwrap();
            let pins = board.timers.len()
                + board.spi.len() * 3
                + board.i2c.len() * 2
                + board.leds.len()
                + usize::from(!board.beeper.is_none());
            assert_eq!(io.len(), pins, "{}", board.name);
            // a second pass re-claims the same resources
            board.claim_resources(&mut io, &mut dma).unwrap();
        }
    }

    #[test]
    fn claims_are_attributed() {
        let mut io = ResourceRegistry::<32>::new();
        let mut dma = DmaAllocator::new();
        MATEKF405.claim_resources(&mut io, &mut dma).unwrap();
        assert_eq!(io.owner(IoTag::new(Port::C, 6)), Some((Owner::Motor, 1)));
        assert_eq!(io.owner(IoTag::new(Port::A, 8)), Some((Owner::Motor, 6)));
        assert_eq!(io.owner(IoTag::new(Port::B, 6)), Some((Owner::LedStrip, 1)));
        assert_eq!(io.owner(IoTag::new(Port::A, 3)), Some((Owner::Ppm, 1)));
        assert_eq!(io.owner(IoTag::new(Port::B, 14)), Some((Owner::SpiSdi, 2)));
        assert_eq!(io.owner(IoTag::new(Port::B, 11)), Some((Owner::I2cSda, 2)));
        assert_eq!(io.owner(IoTag::new(Port::A, 14)), Some((Owner::Led, 2)));
        assert_eq!(io.owner(IoTag::new(Port::C, 13)), Some((Owner::Beeper, 0)));
        // TIM8 CH4 option 0
        let stream = DmaIdentifier::new(2, 7).unwrap();
        assert_eq!(dma.owner(stream), Some((Owner::Motor, 4)));
        assert_eq!(with_usage(MATEKF405.timers, TimerUsage::MOTOR).count(), 6);
    }

    #[test]
    fn conflicts_are_reported() {
        let mut io = ResourceRegistry::<32>::new();
        let mut dma = DmaAllocator::new();
        let pa5 = IoTag::new(Port::A, 5);
        io.claim(pa5, Owner::SerialTx, 1).unwrap();
        assert_eq!(
            MATEKF405.claim_resources(&mut io, &mut dma),
            Err(BspError::PinInUse {
                tag: pa5,
                owner: Owner::SerialTx,
                index: 1
            })
        );

        let mut io = ResourceRegistry::<32>::new();
        let mut dma = DmaAllocator::new();
        let stream = DmaIdentifier::new(1, 5).unwrap();
        dma.allocate(stream, Owner::SpiSdo, 3).unwrap();
        assert_eq!(
            MATEKF405.claim_resources(&mut io, &mut dma),
            Err(BspError::DmaInUse {
                ident: stream,
                owner: Owner::SpiSdo,
                index: 3
            })
        );
    }

    #[test]
    fn registry_too_small() {
        let mut io = ResourceRegistry::<4>::new();
        let mut dma = DmaAllocator::new();
        assert_eq!(
            AT32F435_GENERIC.claim_resources(&mut io, &mut dma),
            Err(BspError::RegistryFull)
        );
    }
}
