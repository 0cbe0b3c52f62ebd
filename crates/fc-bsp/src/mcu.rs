//! Peripheral routing tables of the supported microcontrollers.

use crate::{
    DmaChannelSpec, DmaPeripheralMapping, DmaTimerMapping, I2cHardware, IoTag, PinDef, Port,
    SpiHardware, SpiInstance, Timer,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mcu {
    /// 168 MHz Cortex-M4, DMA request channels.
    Stm32F405,
    /// 288 MHz Cortex-M4, DMAMUX request ids.
    At32F435,
}

impl Mcu {
    pub const fn name(self) -> &'static str {
        match self {
            Mcu::Stm32F405 => "STM32F405",
            Mcu::At32F435 => "AT32F435",
        }
    }

    pub const fn system_clock(self) -> u32 {
        match self {
            Mcu::Stm32F405 => 168_000_000,
            Mcu::At32F435 => 288_000_000,
        }
    }

    pub fn spi_hardware(self) -> &'static [SpiHardware] {
        match self {
            Mcu::Stm32F405 => &stm32f405::SPI,
            Mcu::At32F435 => &at32f435::SPI,
        }
    }

    pub fn i2c_hardware(self) -> &'static [I2cHardware] {
        match self {
            Mcu::Stm32F405 => &stm32f405::I2C,
            Mcu::At32F435 => &at32f435::I2C,
        }
    }

    pub fn dma_peripheral_map(self) -> &'static [DmaPeripheralMapping] {
        match self {
            Mcu::Stm32F405 => &stm32f405::DMA_PERIPHERALS,
            Mcu::At32F435 => &at32f435::DMA_PERIPHERALS,
        }
    }

    pub fn dma_timer_map(self) -> &'static [DmaTimerMapping] {
        match self {
            Mcu::Stm32F405 => &stm32f405::DMA_TIMERS,
            Mcu::At32F435 => &at32f435::DMA_TIMERS,
        }
    }

    /// The kernel clock of `tim`.
    ///
    /// The STM32F405 runs APB1 at a quarter and APB2 at half the system
    /// clock; their timers see twice the bus clock. Both AT32F435 buses
    /// run at half the system clock.
    pub const fn apb_timer_clock(self, tim: Timer) -> u32 {
        match self {
            Mcu::Stm32F405 if tim.on_apb2() => self.system_clock(),
            Mcu::Stm32F405 => self.system_clock() / 2,
            Mcu::At32F435 => self.system_clock(),
        }
    }

    /// The clock of the bus `instance` sits on, for SPI divisors.
    pub const fn spi_bus_clock(self, instance: SpiInstance) -> u32 {
        let apb2 = matches!(
            instance,
            SpiInstance::Spi1 | SpiInstance::Spi4 | SpiInstance::Spi5 | SpiInstance::Spi6
        );
        match self {
            Mcu::Stm32F405 if apb2 => self.system_clock() / 2,
            Mcu::Stm32F405 => self.system_clock() / 4,
            Mcu::At32F435 => self.system_clock() / 2,
        }
    }
}

const fn pin(port: Port, pin: u8, af: u8) -> PinDef {
    PinDef::new(IoTag::new(port, pin), af)
}

const fn dma(controller: u8, stream: u8, channel: u8) -> DmaChannelSpec {
    DmaChannelSpec::new(controller, stream, channel)
}

mod stm32f405 {
    use super::{dma, pin};
    use crate::{
        DmaPeripheral::*, DmaPeripheralMapping, DmaTimerMapping, I2cHardware, I2cInstance,
        Port::*, SpiHardware, SpiInstance, Timer::*, TimerChannel::*,
    };

    pub(super) const SPI: [SpiHardware; 3] = [
        SpiHardware {
            instance: SpiInstance::Spi1,
            sck: &[pin(A, 5, 5), pin(B, 3, 5)],
            sdi: &[pin(A, 6, 5), pin(B, 4, 5)],
            sdo: &[pin(A, 7, 5), pin(B, 5, 5)],
        },
        SpiHardware {
            instance: SpiInstance::Spi2,
            sck: &[pin(B, 10, 5), pin(B, 13, 5)],
            sdi: &[pin(B, 14, 5), pin(C, 2, 5)],
            sdo: &[pin(B, 15, 5), pin(C, 3, 5)],
        },
        SpiHardware {
            instance: SpiInstance::Spi3,
            sck: &[pin(B, 3, 6), pin(C, 10, 6)],
            sdi: &[pin(B, 4, 6), pin(C, 11, 6)],
            sdo: &[pin(B, 5, 6), pin(C, 12, 6)],
        },
    ];

    pub(super) const I2C: [I2cHardware; 3] = [
        I2cHardware {
            instance: I2cInstance::I2c1,
            scl: &[pin(B, 6, 4), pin(B, 8, 4)],
            sda: &[pin(B, 7, 4), pin(B, 9, 4)],
        },
        I2cHardware {
            instance: I2cInstance::I2c2,
            scl: &[pin(B, 10, 4), pin(F, 1, 4)],
            sda: &[pin(B, 11, 4), pin(F, 0, 4)],
        },
        I2cHardware {
            instance: I2cInstance::I2c3,
            scl: &[pin(A, 8, 4)],
            sda: &[pin(C, 9, 4)],
        },
    ];

    pub(super) const DMA_PERIPHERALS: [DmaPeripheralMapping; 9] = [
        DmaPeripheralMapping {
            peripheral: SpiSdo,
            index: 1,
            specs: &[dma(2, 3, 3), dma(2, 5, 3)],
        },
        DmaPeripheralMapping {
            peripheral: SpiSdi,
            index: 1,
            specs: &[dma(2, 0, 3), dma(2, 2, 3)],
        },
        DmaPeripheralMapping {
            peripheral: SpiSdo,
            index: 2,
            specs: &[dma(1, 4, 0)],
        },
        DmaPeripheralMapping {
            peripheral: SpiSdi,
            index: 2,
            specs: &[dma(1, 3, 0)],
        },
        DmaPeripheralMapping {
            peripheral: SpiSdo,
            index: 3,
            specs: &[dma(1, 5, 0), dma(1, 7, 0)],
        },
        DmaPeripheralMapping {
            peripheral: SpiSdi,
            index: 3,
            specs: &[dma(1, 0, 0), dma(1, 2, 0)],
        },
        DmaPeripheralMapping {
            peripheral: Adc,
            index: 1,
            specs: &[dma(2, 0, 0), dma(2, 4, 0)],
        },
        DmaPeripheralMapping {
            peripheral: UartTx,
            index: 1,
            specs: &[dma(2, 7, 4)],
        },
        DmaPeripheralMapping {
            peripheral: UartRx,
            index: 1,
            specs: &[dma(2, 5, 4), dma(2, 2, 4)],
        },
    ];

    pub(super) const DMA_TIMERS: [DmaTimerMapping; 17] = [
        DmaTimerMapping {
            tim: Tim1,
            channel: Ch1,
            specs: &[dma(2, 6, 0), dma(2, 1, 6), dma(2, 3, 6)],
        },
        DmaTimerMapping {
            tim: Tim1,
            channel: Ch2,
            specs: &[dma(2, 6, 0), dma(2, 2, 6)],
        },
        DmaTimerMapping {
            tim: Tim1,
            channel: Ch3,
            specs: &[dma(2, 6, 0), dma(2, 6, 6)],
        },
        DmaTimerMapping {
            tim: Tim1,
            channel: Ch4,
            specs: &[dma(2, 4, 6)],
        },
        DmaTimerMapping {
            tim: Tim2,
            channel: Ch1,
            specs: &[dma(1, 5, 3)],
        },
        DmaTimerMapping {
            tim: Tim2,
            channel: Ch2,
            specs: &[dma(1, 6, 3)],
        },
        DmaTimerMapping {
            tim: Tim2,
            channel: Ch3,
            specs: &[dma(1, 1, 3)],
        },
        DmaTimerMapping {
            tim: Tim2,
            channel: Ch4,
            specs: &[dma(1, 7, 3), dma(1, 6, 3)],
        },
        DmaTimerMapping {
            tim: Tim3,
            channel: Ch1,
            specs: &[dma(1, 4, 5)],
        },
        DmaTimerMapping {
            tim: Tim3,
            channel: Ch2,
            specs: &[dma(1, 5, 5)],
        },
        DmaTimerMapping {
            tim: Tim3,
            channel: Ch3,
            specs: &[dma(1, 7, 5)],
        },
        DmaTimerMapping {
            tim: Tim3,
            channel: Ch4,
            specs: &[dma(1, 2, 5)],
        },
        DmaTimerMapping {
            tim: Tim4,
            channel: Ch1,
            specs: &[dma(1, 0, 2)],
        },
        DmaTimerMapping {
            tim: Tim8,
            channel: Ch1,
            specs: &[dma(2, 2, 0), dma(2, 2, 7)],
        },
        DmaTimerMapping {
            tim: Tim8,
            channel: Ch2,
            specs: &[dma(2, 2, 0), dma(2, 3, 7)],
        },
        DmaTimerMapping {
            tim: Tim8,
            channel: Ch3,
            specs: &[dma(2, 2, 0), dma(2, 4, 7)],
        },
        DmaTimerMapping {
            tim: Tim8,
            channel: Ch4,
            specs: &[dma(2, 7, 7)],
        },
    ];
}

mod at32f435 {
    use super::{dma, pin};
    use crate::{
        DmaPeripheral::*, DmaPeripheralMapping, DmaTimerMapping, I2cHardware, I2cInstance,
        Port::*, SpiHardware, SpiInstance, Timer::*, TimerChannel::*,
    };

    pub(super) const SPI: [SpiHardware; 4] = [
        SpiHardware {
            instance: SpiInstance::Spi1,
            sck: &[pin(A, 5, 5), pin(B, 3, 5)],
            sdi: &[pin(A, 6, 5), pin(B, 4, 5)],
            sdo: &[pin(A, 7, 5), pin(B, 5, 5)],
        },
        SpiHardware {
            instance: SpiInstance::Spi2,
            sck: &[pin(B, 10, 5), pin(B, 13, 5), pin(D, 1, 6)],
            sdi: &[pin(B, 14, 5), pin(C, 2, 5)],
            sdo: &[pin(B, 15, 5), pin(C, 3, 5), pin(D, 4, 6)],
        },
        SpiHardware {
            instance: SpiInstance::Spi3,
            sck: &[pin(B, 3, 6), pin(C, 10, 6)],
            sdi: &[pin(B, 4, 6), pin(C, 11, 6)],
            sdo: &[pin(B, 5, 6), pin(C, 12, 6), pin(D, 0, 6)],
        },
        SpiHardware {
            instance: SpiInstance::Spi4,
            sck: &[pin(E, 2, 5), pin(E, 12, 5)],
            sdi: &[pin(E, 5, 5), pin(E, 13, 5)],
            sdo: &[pin(E, 6, 5), pin(E, 14, 5)],
        },
    ];

    pub(super) const I2C: [I2cHardware; 3] = [
        I2cHardware {
            instance: I2cInstance::I2c1,
            scl: &[pin(B, 6, 4), pin(B, 8, 4)],
            sda: &[pin(B, 7, 4), pin(B, 9, 4)],
        },
        I2cHardware {
            instance: I2cInstance::I2c2,
            scl: &[pin(B, 10, 4), pin(H, 2, 4)],
            sda: &[pin(B, 11, 4), pin(H, 3, 4)],
        },
        I2cHardware {
            instance: I2cInstance::I2c3,
            scl: &[pin(A, 8, 4), pin(C, 0, 4)],
            sda: &[pin(C, 9, 4), pin(C, 1, 4)],
        },
    ];

    // Any stream can serve any request through the DMAMUX. Options below
    // spread the defaults over distinct streams.
    pub(super) const DMA_PERIPHERALS: [DmaPeripheralMapping; 7] = [
        DmaPeripheralMapping {
            peripheral: SpiSdi,
            index: 1,
            specs: &[dma(2, 0, 10)],
        },
        DmaPeripheralMapping {
            peripheral: SpiSdo,
            index: 1,
            specs: &[dma(2, 1, 11)],
        },
        DmaPeripheralMapping {
            peripheral: SpiSdi,
            index: 2,
            specs: &[dma(2, 2, 12)],
        },
        DmaPeripheralMapping {
            peripheral: SpiSdo,
            index: 2,
            specs: &[dma(2, 3, 13)],
        },
        DmaPeripheralMapping {
            peripheral: Adc,
            index: 1,
            specs: &[dma(2, 4, 5)],
        },
        DmaPeripheralMapping {
            peripheral: UartRx,
            index: 1,
            specs: &[dma(2, 5, 24)],
        },
        DmaPeripheralMapping {
            peripheral: UartTx,
            index: 1,
            specs: &[dma(2, 6, 25)],
        },
    ];

    pub(super) const DMA_TIMERS: [DmaTimerMapping; 12] = [
        DmaTimerMapping {
            tim: Tim1,
            channel: Ch1,
            specs: &[dma(1, 6, 43), dma(2, 7, 43)],
        },
        DmaTimerMapping {
            tim: Tim1,
            channel: Ch2,
            specs: &[dma(1, 6, 44)],
        },
        DmaTimerMapping {
            tim: Tim2,
            channel: Ch1,
            specs: &[dma(1, 0, 56), dma(1, 4, 56)],
        },
        DmaTimerMapping {
            tim: Tim2,
            channel: Ch2,
            specs: &[dma(1, 1, 57), dma(1, 5, 57)],
        },
        DmaTimerMapping {
            tim: Tim2,
            channel: Ch3,
            specs: &[dma(1, 2, 58), dma(1, 6, 58)],
        },
        DmaTimerMapping {
            tim: Tim2,
            channel: Ch4,
            specs: &[dma(1, 3, 59), dma(1, 7, 59)],
        },
        DmaTimerMapping {
            tim: Tim3,
            channel: Ch1,
            specs: &[dma(1, 0, 62), dma(1, 4, 62)],
        },
        DmaTimerMapping {
            tim: Tim3,
            channel: Ch2,
            specs: &[dma(1, 1, 63), dma(1, 5, 63)],
        },
        DmaTimerMapping {
            tim: Tim3,
            channel: Ch3,
            specs: &[dma(1, 2, 64), dma(1, 6, 64)],
        },
        DmaTimerMapping {
            tim: Tim3,
            channel: Ch4,
            specs: &[dma(1, 3, 65), dma(1, 7, 65)],
        },
        DmaTimerMapping {
            tim: Tim4,
            channel: Ch1,
            specs: &[dma(1, 4, 67)],
        },
        DmaTimerMapping {
            tim: Tim4,
            channel: Ch2,
            specs: &[dma(1, 5, 68)],
        },
    ];
}
