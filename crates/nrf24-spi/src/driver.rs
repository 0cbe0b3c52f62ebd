use core::fmt::{Debug, Display, Formatter};

use embedded_hal::{delay::DelayNs, digital::OutputPin, spi::SpiDevice};

use crate::{
    registers::{commands, mnemonics, Register},
    types::{FifoStatus, Status},
};

/// The largest payload (and the longest multi-byte register) the radio handles.
pub(crate) const MAX_PAYLOAD: usize = 32;

/// A collection of error types to describe hardware malfunctions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Nrf24Error<SPI, DO> {
    /// Represents a SPI transaction error.
    Spi(SPI),
    /// Represents a DigitalOutput error.
    Gpo(DO),
    /// A register did not read back what was written to it.
    ///
    /// This usually means the SPI wiring (MISO in particular) is faulty
    /// or the radio is not powered.
    BinaryCorruption,
    /// The radio reported a dynamic payload width above 32.
    /// The RX FIFO has been flushed.
    InvalidPayloadWidth(u8),
    /// A pipe number outside the range [0, 5].
    InvalidPipe(u8),
}

impl<SPI: Debug, DO: Debug> Display for Nrf24Error<SPI, DO> {
    fn fmt(&self, f: &mut Formatter) -> core::fmt::Result {
        match self {
            Nrf24Error::Spi(e) => write!(f, "SPI error: {e:?}"),
            Nrf24Error::Gpo(e) => write!(f, "CE pin error: {e:?}"),
            Nrf24Error::BinaryCorruption => write!(f, "register read back mismatch"),
            Nrf24Error::InvalidPayloadWidth(width) => write!(f, "invalid payload width {width}"),
            Nrf24Error::InvalidPipe(pipe) => write!(f, "invalid pipe {pipe}"),
        }
    }
}

#[cfg(feature = "std")]
impl<SPI: Debug, DO: Debug> std::error::Error for Nrf24Error<SPI, DO> {}

#[cfg(feature = "defmt")]
impl<SPI, DO> defmt::Format for Nrf24Error<SPI, DO> {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Nrf24Error::Spi(_) => defmt::write!(fmt, "SPI error"),
            Nrf24Error::Gpo(_) => defmt::write!(fmt, "CE pin error"),
            Nrf24Error::BinaryCorruption => defmt::write!(fmt, "register read back mismatch"),
            Nrf24Error::InvalidPayloadWidth(width) => {
                defmt::write!(fmt, "invalid payload width {}", width)
            }
            Nrf24Error::InvalidPipe(pipe) => defmt::write!(fmt, "invalid pipe {}", pipe),
        }
    }
}

/// A driver for the nRF24L01 that encodes register reads/writes and
/// SPI commands.
pub struct Nrf24<SPI, DO, DELAY> {
    /// The CE pin for the radio.
    ///
    /// Exposed for advanced manipulation of active RX/TX modes. Prefer
    /// [`Nrf24::set_role()`] and [`Nrf24::start_transmit()`].
    pub ce_pin: DO,
    _spi: SPI,
    _delay_impl: DELAY,
    _buf: [u8; MAX_PAYLOAD + 1],
    _status: Status,
    pub(crate) config_reg: u8,
    pub(crate) payload_length: u8,
    pub(crate) dynamic_payloads: bool,
}

pub(crate) type Nrf24Result<T, SPI, DO> = Result<
    T,
    Nrf24Error<
        <SPI as embedded_hal::spi::ErrorType>::Error,
        <DO as embedded_hal::digital::ErrorType>::Error,
    >,
>;

impl<SPI, DO, DELAY> Nrf24<SPI, DO, DELAY>
where
    SPI: SpiDevice,
    DO: OutputPin,
    DELAY: DelayNs,
{
    /// Instantiate a [`Nrf24`] object for use on the specified
    /// `spi` device with the given `ce_pin`.
    ///
    /// The radio's CSN pin shall be managed by the
    /// [`SpiDevice`](trait@embedded_hal::spi::SpiDevice) implementation.
    /// No SPI traffic happens until a method is called.
    pub fn new(ce_pin: DO, spi: SPI, delay_impl: DELAY) -> Nrf24<SPI, DO, DELAY> {
        Nrf24 {
            ce_pin,
            _spi: spi,
            _delay_impl: delay_impl,
            _buf: [0u8; MAX_PAYLOAD + 1],
            _status: Status::from_bits(0),
            // 16 bit CRC, all IRQ events enabled, powered down as PTX
            config_reg: 0x0C,
            payload_length: 32,
            dynamic_payloads: false,
        }
    }

    /// Release the bus, pin and delay objects.
    pub fn free(self) -> (DO, SPI, DELAY) {
        (self.ce_pin, self._spi, self._delay_impl)
    }

    /// Clock `len` bytes of the internal buffer through the radio.
    /// The first byte received is always the STATUS register.
    fn spi_transfer(&mut self, len: usize) -> Nrf24Result<(), SPI, DO> {
        self._spi
            .transfer_in_place(&mut self._buf[..len])
            .map_err(Nrf24Error::Spi)?;
        self._status = Status::from_bits(self._buf[0]);
        Ok(())
    }

    /// Send `command` followed by `len` dummy bytes; the response
    /// is left in `self._buf[1..=len]`.
    fn spi_read(&mut self, command: u8, len: usize) -> Nrf24Result<(), SPI, DO> {
        let len = len.min(MAX_PAYLOAD);
        self._buf[0] = command;
        self._buf[1..=len].fill(0);
        self.spi_transfer(len + 1)
    }

    fn spi_write(&mut self, command: u8, data: &[u8]) -> Nrf24Result<(), SPI, DO> {
        let len = data.len().min(MAX_PAYLOAD);
        self._buf[0] = command;
        self._buf[1..=len].copy_from_slice(&data[..len]);
        self.spi_transfer(len + 1)
    }

    pub(crate) fn delay_us(&mut self, us: u32) {
        self._delay_impl.delay_us(us);
    }

    pub(crate) fn ce(&mut self, active: bool) -> Nrf24Result<(), SPI, DO> {
        if active {
            self.ce_pin.set_high().map_err(Nrf24Error::Gpo)
        } else {
            self.ce_pin.set_low().map_err(Nrf24Error::Gpo)
        }
    }

    /// Read a single byte register.
    pub fn read_register(&mut self, register: Register) -> Nrf24Result<u8, SPI, DO> {
        self.spi_read(commands::R_REGISTER | register.addr(), 1)?;
        Ok(self._buf[1])
    }

    /// Write a single byte register.
    pub fn write_register(&mut self, register: Register, value: u8) -> Nrf24Result<(), SPI, DO> {
        self.spi_write(commands::W_REGISTER | register.addr(), &[value])
    }

    /// Read a multi-byte register (like [`Register::TxAddr`]) into `buf`.
    ///
    /// The number of bytes read is the length of `buf` (at most 32).
    pub fn read_registers(
        &mut self,
        register: Register,
        buf: &mut [u8],
    ) -> Nrf24Result<(), SPI, DO> {
        let len = buf.len().min(MAX_PAYLOAD);
        self.spi_read(commands::R_REGISTER | register.addr(), len)?;
        buf[..len].copy_from_slice(&self._buf[1..=len]);
        Ok(())
    }

    /// Write a multi-byte register (like [`Register::RxAddrP0`]) from `buf`.
    ///
    /// Anything beyond 32 bytes is truncated.
    pub fn write_registers(&mut self, register: Register, buf: &[u8]) -> Nrf24Result<(), SPI, DO> {
        self.spi_write(commands::W_REGISTER | register.addr(), buf)
    }

    /// Send a single byte `command` (like [`commands::FLUSH_TX`]).
    pub fn command(&mut self, command: u8) -> Nrf24Result<Status, SPI, DO> {
        self.spi_read(command, 0)?;
        Ok(self._status)
    }

    /// Fetch the STATUS register (with a NOP command).
    pub fn status(&mut self) -> Nrf24Result<Status, SPI, DO> {
        self.command(commands::NOP)
    }

    /// The STATUS register as it was received during the latest SPI transaction.
    pub fn last_status(&self) -> Status {
        self._status
    }

    /// Read `buf.len()` bytes (at most 32) from the top of the RX FIFO.
    pub fn read_payload(&mut self, buf: &mut [u8]) -> Nrf24Result<(), SPI, DO> {
        let len = buf.len().min(MAX_PAYLOAD);
        self.spi_read(commands::R_RX_PAYLOAD, len)?;
        buf[..len].copy_from_slice(&self._buf[1..=len]);
        Ok(())
    }

    /// Put a payload in the TX FIFO.
    ///
    /// Set `ack` to `false` to ask the receiver not to acknowledge the payload
    /// (only honored when dynamic ACK is enabled in the FEATURE register).
    ///
    /// Unless dynamic payloads are enabled, the payload is zero padded up to the
    /// configured static payload length.
    pub fn write_payload(&mut self, payload: &[u8], ack: bool) -> Nrf24Result<(), SPI, DO> {
        let mut len = payload.len().min(MAX_PAYLOAD);
        self._buf[0] = if ack {
            commands::W_TX_PAYLOAD
        } else {
            commands::W_TX_PAYLOAD_NO_ACK
        };
        self._buf[1..=len].copy_from_slice(&payload[..len]);
        let static_len = self.payload_length as usize;
        if !self.dynamic_payloads && len < static_len {
            self._buf[(len + 1)..=static_len].fill(0);
            len = static_len;
        }
        self.spi_transfer(len + 1)
    }

    /// Put a payload in the TX FIFO to be attached to the next ACK sent on `pipe`.
    pub fn write_ack_payload(&mut self, pipe: u8, payload: &[u8]) -> Nrf24Result<(), SPI, DO> {
        if pipe > 5 {
            return Err(Nrf24Error::InvalidPipe(pipe));
        }
        self.spi_write(commands::W_ACK_PAYLOAD | pipe, payload)
    }

    /// Get the width of the payload on top of the RX FIFO (dynamic payloads only).
    pub fn payload_width(&mut self) -> Nrf24Result<u8, SPI, DO> {
        self.spi_read(commands::R_RX_PL_WID, 1)?;
        let width = self._buf[1];
        if width as usize > MAX_PAYLOAD {
            warn!("discarding corrupt payload of width {}", width);
            self.flush_rx()?;
            return Err(Nrf24Error::InvalidPayloadWidth(width));
        }
        Ok(width)
    }

    /// Discard all payloads in the TX FIFO.
    pub fn flush_tx(&mut self) -> Nrf24Result<(), SPI, DO> {
        self.command(commands::FLUSH_TX).map(|_| ())
    }

    /// Discard all payloads in the RX FIFO.
    pub fn flush_rx(&mut self) -> Nrf24Result<(), SPI, DO> {
        self.command(commands::FLUSH_RX).map(|_| ())
    }

    /// Re-transmit the last payload for as long as CE is held high.
    pub fn reuse_tx_payload(&mut self) -> Nrf24Result<(), SPI, DO> {
        self.command(commands::REUSE_TX_PL).map(|_| ())
    }

    /// Toggle access to the FEATURE, DYNPD and R_RX_PL_WID registers
    /// on older non-plus variants. Plus variants ignore this command.
    pub fn activate_features(&mut self) -> Nrf24Result<(), SPI, DO> {
        self.spi_write(commands::ACTIVATE, &[commands::ACTIVATE_KEY])
    }

    /// Clear the IRQ events whose parameter is `true`.
    pub fn clear_irq(
        &mut self,
        rx_dr: bool,
        tx_ds: bool,
        max_rt: bool,
    ) -> Nrf24Result<(), SPI, DO> {
        let value = (rx_dr as u8 * mnemonics::RX_DR)
            | (tx_ds as u8 * mnemonics::TX_DS)
            | (max_rt as u8 * mnemonics::MAX_RT);
        self.write_register(Register::Status, value)
    }

    pub fn fifo_status(&mut self) -> Nrf24Result<FifoStatus, SPI, DO> {
        Ok(FifoStatus::from_bits(self.read_register(Register::FifoStatus)?))
    }
}

/////////////////////////////////////////////////////////////////////////////////
/// unit tests
#[cfg(test)]
mod test {
    extern crate std;
    use super::Nrf24Error;
    use crate::{commands, spi_test_expects, test::mk_radio, Register};
    use embedded_hal_mock::eh1::spi::Transaction as SpiTransaction;
    use std::vec;

    #[test]
    fn read_register() {
        let spi_expectations = spi_test_expects![
            (vec![Register::RfCh.addr(), 0u8], vec![0xEu8, 76u8]),
        ];
        let mocks = mk_radio(&[], &spi_expectations);
        let (mut radio, mut spi, mut ce_pin) = (mocks.0, mocks.1, mocks.2);
        assert_eq!(radio.read_register(Register::RfCh).unwrap(), 76);
        assert!(radio.last_status().rx_fifo_empty());
        spi.done();
        ce_pin.done();
    }

    #[test]
    fn write_register() {
        let spi_expectations = spi_test_expects![
            (
                vec![Register::RfSetup.addr() | commands::W_REGISTER, 0x27u8],
                vec![0xEu8, 0u8],
            ),
        ];
        let mocks = mk_radio(&[], &spi_expectations);
        let (mut radio, mut spi, mut ce_pin) = (mocks.0, mocks.1, mocks.2);
        radio.write_register(Register::RfSetup, 0x27).unwrap();
        spi.done();
        ce_pin.done();
    }

    #[test]
    fn multi_byte_registers() {
        let spi_expectations = spi_test_expects![
            (
                vec![Register::TxAddr.addr() | commands::W_REGISTER, 1, 2, 3, 4, 5],
                vec![0xEu8, 0, 0, 0, 0, 0],
            ),
            (
                vec![Register::TxAddr.addr(), 0, 0, 0, 0, 0],
                vec![0xEu8, 1, 2, 3, 4, 5],
            ),
        ];
        let mocks = mk_radio(&[], &spi_expectations);
        let (mut radio, mut spi, mut ce_pin) = (mocks.0, mocks.1, mocks.2);
        radio.write_registers(Register::TxAddr, &[1, 2, 3, 4, 5]).unwrap();
        let mut address = [0u8; 5];
        radio.read_registers(Register::TxAddr, &mut address).unwrap();
        assert_eq!(address, [1, 2, 3, 4, 5]);
        spi.done();
        ce_pin.done();
    }

    #[test]
    fn single_byte_commands() {
        let spi_expectations = spi_test_expects![
            (vec![commands::NOP], vec![0x2Eu8]),
            (vec![commands::FLUSH_TX], vec![0xEu8]),
            (vec![commands::FLUSH_RX], vec![0xEu8]),
            (vec![commands::REUSE_TX_PL], vec![0xEu8]),
            (vec![commands::ACTIVATE, commands::ACTIVATE_KEY], vec![0xEu8, 0]),
        ];
        let mocks = mk_radio(&[], &spi_expectations);
        let (mut radio, mut spi, mut ce_pin) = (mocks.0, mocks.1, mocks.2);
        let status = radio.status().unwrap();
        assert!(status.tx_ds());
        radio.flush_tx().unwrap();
        radio.flush_rx().unwrap();
        radio.reuse_tx_payload().unwrap();
        radio.activate_features().unwrap();
        assert!(!radio.last_status().tx_ds());
        spi.done();
        ce_pin.done();
    }

    #[test]
    fn write_static_payload_is_padded() {
        let mut expected = vec![0u8; 33];
        expected[0] = commands::W_TX_PAYLOAD;
        expected[1..6].copy_from_slice(b"hello");
        let spi_expectations = spi_test_expects![
            (expected, vec![0xEu8; 33]),
        ];
        let mocks = mk_radio(&[], &spi_expectations);
        let (mut radio, mut spi, mut ce_pin) = (mocks.0, mocks.1, mocks.2);
        radio.write_payload(b"hello", true).unwrap();
        spi.done();
        ce_pin.done();
    }

    #[test]
    fn write_dynamic_payload_no_ack() {
        let mut expected = vec![commands::W_TX_PAYLOAD_NO_ACK];
        expected.extend_from_slice(b"hi");
        let spi_expectations = spi_test_expects![
            (expected, vec![0xEu8, 0, 0]),
        ];
        let mocks = mk_radio(&[], &spi_expectations);
        let (mut radio, mut spi, mut ce_pin) = (mocks.0, mocks.1, mocks.2);
        radio.dynamic_payloads = true;
        radio.write_payload(b"hi", false).unwrap();
        spi.done();
        ce_pin.done();
    }

    #[test]
    fn ack_payload() {
        let spi_expectations = spi_test_expects![
            (vec![commands::W_ACK_PAYLOAD | 2, 0xAA, 0xBB], vec![0xEu8, 0, 0]),
        ];
        let mocks = mk_radio(&[], &spi_expectations);
        let (mut radio, mut spi, mut ce_pin) = (mocks.0, mocks.1, mocks.2);
        radio.write_ack_payload(2, &[0xAA, 0xBB]).unwrap();
        assert!(matches!(
            radio.write_ack_payload(6, &[0xAA]),
            Err(Nrf24Error::InvalidPipe(6))
        ));
        spi.done();
        ce_pin.done();
    }

    #[test]
    fn read_payload() {
        let spi_expectations = spi_test_expects![
            (vec![commands::R_RX_PAYLOAD, 0, 0, 0], vec![0x40u8, 7, 8, 9]),
        ];
        let mocks = mk_radio(&[], &spi_expectations);
        let (mut radio, mut spi, mut ce_pin) = (mocks.0, mocks.1, mocks.2);
        let mut buf = [0u8; 3];
        radio.read_payload(&mut buf).unwrap();
        assert_eq!(buf, [7, 8, 9]);
        assert!(radio.last_status().rx_dr());
        spi.done();
        ce_pin.done();
    }

    #[test]
    fn corrupt_payload_width() {
        let spi_expectations = spi_test_expects![
            (vec![commands::R_RX_PL_WID, 0], vec![0x40u8, 33]),
            (vec![commands::FLUSH_RX], vec![0xEu8]),
            (vec![commands::R_RX_PL_WID, 0], vec![0x40u8, 12]),
        ];
        let mocks = mk_radio(&[], &spi_expectations);
        let (mut radio, mut spi, mut ce_pin) = (mocks.0, mocks.1, mocks.2);
        assert!(matches!(
            radio.payload_width(),
            Err(Nrf24Error::InvalidPayloadWidth(33))
        ));
        assert!(matches!(radio.payload_width(), Ok(12)));
        spi.done();
        ce_pin.done();
    }

    #[test]
    fn clear_irq() {
        let spi_expectations = spi_test_expects![
            (
                vec![Register::Status.addr() | commands::W_REGISTER, 0x50u8],
                vec![0xEu8, 0u8],
            ),
        ];
        let mocks = mk_radio(&[], &spi_expectations);
        let (mut radio, mut spi, mut ce_pin) = (mocks.0, mocks.1, mocks.2);
        radio.clear_irq(true, false, true).unwrap();
        spi.done();
        ce_pin.done();
    }

    #[test]
    fn fifo_status() {
        let spi_expectations = spi_test_expects![
            (vec![Register::FifoStatus.addr(), 0u8], vec![0xEu8, 0x11u8]),
        ];
        let mocks = mk_radio(&[], &spi_expectations);
        let (mut radio, mut spi, mut ce_pin) = (mocks.0, mocks.1, mocks.2);
        let fifo = radio.fifo_status().unwrap();
        assert!(fifo.rx_empty());
        assert!(fifo.tx_empty());
        spi.done();
        ce_pin.done();
    }
}
