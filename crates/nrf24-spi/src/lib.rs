//! A register and command level driver for the nRF24L01(+) transceiver.
//!
//! The driver talks to the radio through an [`embedded_hal::spi::SpiDevice`]
//! (the device owns the CSN line) plus a CE [`embedded_hal::digital::OutputPin`].
//! It exposes two layers:
//!
//! ## Register API
//!
//! - [`Nrf24::read_register()`](fn@crate::Nrf24::read_register)
//! - [`Nrf24::write_register()`](fn@crate::Nrf24::write_register)
//! - [`Nrf24::read_registers()`](fn@crate::Nrf24::read_registers)
//! - [`Nrf24::write_registers()`](fn@crate::Nrf24::write_registers)
//! - [`Nrf24::command()`](fn@crate::Nrf24::command)
//! - [`Nrf24::status()`](fn@crate::Nrf24::status)
//! - [`Nrf24::read_payload()`](fn@crate::Nrf24::read_payload)
//! - [`Nrf24::write_payload()`](fn@crate::Nrf24::write_payload)
//! - [`Nrf24::write_ack_payload()`](fn@crate::Nrf24::write_ack_payload)
//! - [`Nrf24::payload_width()`](fn@crate::Nrf24::payload_width)
//! - [`Nrf24::flush_tx()`](fn@crate::Nrf24::flush_tx)
//! - [`Nrf24::flush_rx()`](fn@crate::Nrf24::flush_rx)
//! - [`Nrf24::clear_irq()`](fn@crate::Nrf24::clear_irq)
//! - [`Nrf24::fifo_status()`](fn@crate::Nrf24::fifo_status)
//!
//! ## Radio API
//!
//! - [`Nrf24::init()`](fn@crate::Nrf24::init)
//! - [`Nrf24::apply_config()`](fn@crate::Nrf24::apply_config)
//! - [`Nrf24::power_up()`](fn@crate::Nrf24::power_up)
//! - [`Nrf24::power_down()`](fn@crate::Nrf24::power_down)
//! - [`Nrf24::set_role()`](fn@crate::Nrf24::set_role)
//! - [`Nrf24::set_channel()`](fn@crate::Nrf24::set_channel)
//! - [`Nrf24::start_transmit()`](fn@crate::Nrf24::start_transmit)
//! - [`Nrf24::poll_transmit()`](fn@crate::Nrf24::poll_transmit)
//! - [`Nrf24::receive()`](fn@crate::Nrf24::receive)
//!
#![no_std]

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod fmt;

mod types;
pub use types::{CrcLength, DataRate, FifoStatus, PaLevel, Role, Status, TxOutcome};

mod registers;
pub use registers::{commands, mnemonics, Register};

mod config;
pub use config::Nrf24Config;

mod driver;
pub use driver::{Nrf24, Nrf24Error};

mod radio;

#[cfg(test)]
mod test {
    extern crate std;
    use crate::Nrf24;
    use embedded_hal_mock::eh1::{
        delay::NoopDelay,
        digital::{Mock as PinMock, Transaction as PinTransaction},
        spi::{Mock as SpiMock, Transaction as SpiTransaction},
    };

    /// Takes an indefinite repetition of a tuple of 2 vectors: `(expected_data, response_data)`
    /// and generates an array of `SpiTransaction`s.
    ///
    /// NOTE: This macro is only used to generate code in unit tests (for this crate only).
    #[macro_export]
    macro_rules! spi_test_expects {
        ($( ($expected:expr , $response:expr $(,)? ) , ) + ) => {
            [
                $(
                    SpiTransaction::transaction_start(),
                    SpiTransaction::transfer_in_place($expected, $response),
                    SpiTransaction::transaction_end(),
                )*
            ]
        }
    }

    /// Expand a single `(expected, response)` pair into its 3 mock transactions.
    pub fn spi_expect(
        expected: std::vec::Vec<u8>,
        response: std::vec::Vec<u8>,
    ) -> [SpiTransaction<u8>; 3] {
        [
            SpiTransaction::transaction_start(),
            SpiTransaction::transfer_in_place(expected, response),
            SpiTransaction::transaction_end(),
        ]
    }

    /// A tuple struct to encapsulate objects used to mock [`Nrf24`].
    pub struct MockRadio(
        pub Nrf24<SpiMock<u8>, PinMock, NoopDelay>,
        pub SpiMock<u8>,
        pub PinMock,
    );

    /// Create the mock objects using the given expectations.
    pub fn mk_radio(
        ce_expectations: &[PinTransaction],
        spi_expectations: &[SpiTransaction<u8>],
    ) -> MockRadio {
        let spi = SpiMock::new(spi_expectations);
        let ce_pin = PinMock::new(ce_expectations);
        let radio = Nrf24::new(ce_pin.clone(), spi.clone(), NoopDelay);
        MockRadio(radio, spi, ce_pin)
    }
}
