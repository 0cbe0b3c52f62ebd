use embedded_hal::{delay::DelayNs, digital::OutputPin, spi::SpiDevice};

use crate::{
    config::Nrf24Config,
    driver::{Nrf24, Nrf24Error, Nrf24Result},
    registers::{mnemonics, Register},
    types::{CrcLength, DataRate, PaLevel, Role, TxOutcome},
};

impl<SPI, DO, DELAY> Nrf24<SPI, DO, DELAY>
where
    SPI: SpiDevice,
    DO: OutputPin,
    DELAY: DelayNs,
{
    /// Initialize the radio's hardware and apply the given `config`.
    ///
    /// The radio is left powered down in TX role. Call [`Nrf24::power_up()`]
    /// and [`Nrf24::set_role()`] before use.
    pub fn init(&mut self, config: &Nrf24Config) -> Nrf24Result<(), SPI, DO> {
        // Power-on reset takes up to 4.5 ms; the same settle time is
        // needed after an MCU-only reset.
        self.delay_us(5000);
        self.ce(false)?;

        self.config_reg = config.config_reg();
        self.write_register(Register::Config, self.config_reg)?;
        let readback = self.read_register(Register::Config)?;
        if readback != self.config_reg {
            error!(
                "CONFIG read back {:#X}, expected {:#X}",
                readback, self.config_reg
            );
            return Err(Nrf24Error::BinaryCorruption);
        }

        self.apply_config(config)?;
        self.flush_rx()?;
        self.flush_tx()?;
        self.clear_irq(true, true, true)?;
        debug!("radio initialized on channel {}", config.channel());
        Ok(())
    }

    /// Write every register described by `config`.
    ///
    /// The PWR_UP and PRIM_RX bits of CONFIG keep their current state.
    pub fn apply_config(&mut self, config: &Nrf24Config) -> Nrf24Result<(), SPI, DO> {
        self.write_register(Register::SetupAw, config.setup_aw())?;
        self.write_register(Register::SetupRetr, config.setup_retr())?;
        self.write_register(Register::RfCh, config.channel())?;
        self.write_register(Register::RfSetup, config.rf_setup())?;
        self.write_register(Register::Feature, config.feature())?;
        self.write_register(Register::Dynpd, config.dynpd())?;
        self.write_register(Register::EnAa, config.auto_ack())?;

        self.write_registers(Register::TxAddr, config.tx_address())?;
        for pipe in 0..6 {
            if let Some(register) = Register::rx_addr(pipe) {
                self.write_registers(register, config.rx_address(pipe))?;
            }
        }
        for pipe in 0..6 {
            if let Some(register) = Register::rx_pw(pipe) {
                self.write_register(register, config.payload_length())?;
            }
        }
        self.write_register(Register::EnRxAddr, config.en_rxaddr())?;

        self.payload_length = config.payload_length();
        self.dynamic_payloads = config.dynamic_payloads();

        let keep = self.config_reg & (mnemonics::PWR_UP | mnemonics::PRIM_RX);
        self.config_reg = config.config_reg() | keep;
        self.write_register(Register::Config, self.config_reg)
    }

    /// Is the PWR_UP bit set (as last written)?
    pub fn is_powered(&self) -> bool {
        self.config_reg & mnemonics::PWR_UP > 0
    }

    /// Power up the radio into Standby-I mode.
    ///
    /// This blocks for 1.5 ms (the crystal oscillator start up time)
    /// when the radio was powered down.
    pub fn power_up(&mut self) -> Nrf24Result<(), SPI, DO> {
        if self.is_powered() {
            return Ok(());
        }
        self.config_reg |= mnemonics::PWR_UP;
        self.write_register(Register::Config, self.config_reg)?;
        self.delay_us(1500);
        Ok(())
    }

    /// Power down the radio (CE is deactivated first).
    pub fn power_down(&mut self) -> Nrf24Result<(), SPI, DO> {
        self.ce(false)?;
        self.config_reg &= !mnemonics::PWR_UP;
        self.write_register(Register::Config, self.config_reg)
    }

    pub fn role(&self) -> Role {
        if self.config_reg & mnemonics::PRIM_RX > 0 {
            Role::Receiver
        } else {
            Role::Transmitter
        }
    }

    /// Switch between primary TX and primary RX.
    ///
    /// A receiver activates CE (and starts listening) immediately;
    /// a transmitter keeps CE inactive until [`Nrf24::start_transmit()`].
    pub fn set_role(&mut self, role: Role) -> Nrf24Result<(), SPI, DO> {
        match role {
            Role::Receiver => {
                self.config_reg |= mnemonics::PRIM_RX;
                self.write_register(Register::Config, self.config_reg)?;
                self.clear_irq(true, true, true)?;
                self.ce(true)
            }
            Role::Transmitter => {
                self.ce(false)?;
                self.config_reg &= !mnemonics::PRIM_RX;
                self.write_register(Register::Config, self.config_reg)
            }
        }
    }

    /// Set the RF channel (clamped to 125).
    pub fn set_channel(&mut self, channel: u8) -> Nrf24Result<(), SPI, DO> {
        self.write_register(Register::RfCh, channel.min(125))
    }

    pub fn channel(&mut self) -> Nrf24Result<u8, SPI, DO> {
        self.read_register(Register::RfCh)
    }

    /// Read back the PA level from `RF_SETUP`.
    pub fn pa_level(&mut self) -> Nrf24Result<PaLevel, SPI, DO> {
        Ok(PaLevel::from_bits(self.read_register(Register::RfSetup)?))
    }

    /// Read back the data rate from `RF_SETUP`.
    pub fn data_rate(&mut self) -> Nrf24Result<DataRate, SPI, DO> {
        Ok(DataRate::from_bits(self.read_register(Register::RfSetup)?))
    }

    /// Read back the CRC length from `CONFIG`.
    pub fn crc_length(&mut self) -> Nrf24Result<CrcLength, SPI, DO> {
        Ok(CrcLength::from_bits(self.read_register(Register::Config)?))
    }

    /// Write a payload and pulse CE to transmit it.
    ///
    /// This does not wait for the transmission to finish; use
    /// [`Nrf24::poll_transmit()`] (or the IRQ pin) to get the outcome.
    pub fn start_transmit(&mut self, payload: &[u8], ack: bool) -> Nrf24Result<(), SPI, DO> {
        self.write_payload(payload, ack)?;
        self.ce(true)?;
        // a CE pulse must last at least 10 us
        self.delay_us(10);
        self.ce(false)
    }

    /// Check if the latest transmission has finished.
    ///
    /// The corresponding STATUS flag is cleared before returning `Some`.
    pub fn poll_transmit(&mut self) -> Nrf24Result<Option<TxOutcome>, SPI, DO> {
        let status = self.status()?;
        if status.tx_ds() {
            self.clear_irq(false, true, false)?;
            return Ok(Some(TxOutcome::Sent));
        }
        if status.max_rt() {
            debug!("transmission reached the max number of retries");
            self.flush_tx()?;
            self.clear_irq(false, false, true)?;
            return Ok(Some(TxOutcome::MaxRetries));
        }
        Ok(None)
    }

    /// Fetch the next received payload (if any) into `buf`.
    ///
    /// Returns the pipe number and the number of bytes copied into `buf`.
    /// The whole payload is removed from the RX FIFO even when `buf`
    /// is too small to hold it.
    pub fn receive(&mut self, buf: &mut [u8]) -> Nrf24Result<Option<(u8, usize)>, SPI, DO> {
        let fifo = self.fifo_status()?;
        if fifo.rx_empty() {
            return Ok(None);
        }
        let pipe = self.last_status().rx_pipe();
        let width = if self.dynamic_payloads {
            self.payload_width()?
        } else {
            self.payload_length
        };
        let mut payload = [0u8; crate::driver::MAX_PAYLOAD];
        self.read_payload(&mut payload[..width as usize])?;
        let len = buf.len().min(width as usize);
        buf[..len].copy_from_slice(&payload[..len]);
        self.clear_irq(true, false, false)?;
        Ok(Some((pipe, len)))
    }

    /// Get the lost packet count (since the last channel change)
    /// and the retransmission count of the latest payload.
    pub fn observe_tx(&mut self) -> Nrf24Result<(u8, u8), SPI, DO> {
        let value = self.read_register(Register::ObserveTx)?;
        Ok((value >> 4, value & 0xF))
    }

    /// Was a carrier above -64 dBm detected during the last RX period?
    pub fn carrier_detected(&mut self) -> Nrf24Result<bool, SPI, DO> {
        Ok(self.read_register(Register::Rpd)? & 1 == 1)
    }
}

/////////////////////////////////////////////////////////////////////////////////
/// unit tests
#[cfg(test)]
mod test {
    extern crate std;
    use crate::{
        commands, spi_test_expects,
        test::{mk_radio, spi_expect},
        CrcLength, DataRate, Nrf24Config, Nrf24Error, PaLevel, Register, Role, TxOutcome,
    };
    use embedded_hal_mock::eh1::{
        digital::{State as PinState, Transaction as PinTransaction},
        spi::Transaction as SpiTransaction,
    };
    use std::{vec, vec::Vec};

    fn write(register: Register, data: &[u8]) -> [SpiTransaction<u8>; 3] {
        let mut expected = vec![register.addr() | commands::W_REGISTER];
        expected.extend_from_slice(data);
        let response = vec![0xEu8; expected.len()];
        spi_expect(expected, response)
    }

    fn apply_config_expectations(config: &Nrf24Config, config_reg: u8) -> Vec<SpiTransaction<u8>> {
        let mut expectations = Vec::new();
        expectations.extend(write(Register::SetupAw, &[config.setup_aw()]));
        expectations.extend(write(Register::SetupRetr, &[config.setup_retr()]));
        expectations.extend(write(Register::RfCh, &[config.channel()]));
        expectations.extend(write(Register::RfSetup, &[config.rf_setup()]));
        expectations.extend(write(Register::Feature, &[config.feature()]));
        expectations.extend(write(Register::Dynpd, &[config.dynpd()]));
        expectations.extend(write(Register::EnAa, &[config.auto_ack()]));
        expectations.extend(write(Register::TxAddr, config.tx_address()));
        for pipe in 0..6 {
            let register = Register::rx_addr(pipe).unwrap();
            expectations.extend(write(register, config.rx_address(pipe)));
        }
        for pipe in 0..6 {
            let register = Register::rx_pw(pipe).unwrap();
            expectations.extend(write(register, &[config.payload_length()]));
        }
        expectations.extend(write(Register::EnRxAddr, &[config.en_rxaddr()]));
        expectations.extend(write(Register::Config, &[config_reg]));
        expectations
    }

    fn init_parametrized(corrupted_binary: bool) {
        let config = Nrf24Config::default()
            .with_channel(42)
            .with_address_width(3)
            .with_dynamic_payloads(true);
        let ce_expectations = [PinTransaction::set(PinState::Low)];
        let mut spi_expectations = Vec::new();
        spi_expectations.extend(write(Register::Config, &[0x0C]));
        let readback = if corrupted_binary { 0xFF } else { 0x0C };
        spi_expectations.extend(spi_expect(
            vec![Register::Config.addr(), 0],
            vec![0xE, readback],
        ));
        if !corrupted_binary {
            spi_expectations.extend(apply_config_expectations(&config, 0x0C));
            spi_expectations.extend(spi_test_expects![
                (vec![commands::FLUSH_RX], vec![0xEu8]),
                (vec![commands::FLUSH_TX], vec![0xEu8]),
            ]);
            spi_expectations.extend(write(Register::Status, &[0x70]));
        }
        let mocks = mk_radio(&ce_expectations, &spi_expectations);
        let (mut radio, mut spi, mut ce_pin) = (mocks.0, mocks.1, mocks.2);
        let result = radio.init(&config);
        if corrupted_binary {
            assert!(matches!(result, Err(Nrf24Error::BinaryCorruption)));
        } else {
            assert!(result.is_ok());
            assert!(radio.dynamic_payloads);
            assert!(!radio.is_powered());
        }
        spi.done();
        ce_pin.done();
    }

    #[test]
    fn init() {
        init_parametrized(false);
    }

    #[test]
    fn init_corrupted_binary() {
        init_parametrized(true);
    }

    #[test]
    fn apply_config_keeps_power_and_role() {
        let config = Nrf24Config::default().with_crc_length(crate::CrcLength::Bit8);
        let spi_expectations = apply_config_expectations(&config, 0x0B);
        let mocks = mk_radio(&[], &spi_expectations);
        let (mut radio, mut spi, mut ce_pin) = (mocks.0, mocks.1, mocks.2);
        radio.config_reg = 0x0F;
        radio.apply_config(&config).unwrap();
        assert_eq!(radio.role(), Role::Receiver);
        spi.done();
        ce_pin.done();
    }

    #[test]
    fn power() {
        let ce_expectations = [PinTransaction::set(PinState::Low)];
        let mut spi_expectations = Vec::new();
        spi_expectations.extend(write(Register::Config, &[0x0E]));
        spi_expectations.extend(write(Register::Config, &[0x0C]));
        let mocks = mk_radio(&ce_expectations, &spi_expectations);
        let (mut radio, mut spi, mut ce_pin) = (mocks.0, mocks.1, mocks.2);
        radio.power_up().unwrap();
        assert!(radio.is_powered());
        // already powered: no SPI traffic
        radio.power_up().unwrap();
        radio.power_down().unwrap();
        assert!(!radio.is_powered());
        spi.done();
        ce_pin.done();
    }

    #[test]
    fn roles() {
        let ce_expectations = [
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
        ];
        let mut spi_expectations = Vec::new();
        spi_expectations.extend(write(Register::Config, &[0x0D]));
        spi_expectations.extend(write(Register::Status, &[0x70]));
        spi_expectations.extend(write(Register::Config, &[0x0C]));
        let mocks = mk_radio(&ce_expectations, &spi_expectations);
        let (mut radio, mut spi, mut ce_pin) = (mocks.0, mocks.1, mocks.2);
        radio.set_role(Role::Receiver).unwrap();
        assert_eq!(radio.role(), Role::Receiver);
        radio.set_role(Role::Transmitter).unwrap();
        assert_eq!(radio.role(), Role::Transmitter);
        spi.done();
        ce_pin.done();
    }

    #[test]
    fn channel() {
        let mut spi_expectations = Vec::new();
        spi_expectations.extend(write(Register::RfCh, &[125]));
        spi_expectations.extend(spi_expect(vec![Register::RfCh.addr(), 0], vec![0xE, 125]));
        let mocks = mk_radio(&[], &spi_expectations);
        let (mut radio, mut spi, mut ce_pin) = (mocks.0, mocks.1, mocks.2);
        radio.set_channel(200).unwrap();
        assert_eq!(radio.channel().unwrap(), 125);
        spi.done();
        ce_pin.done();
    }

    #[test]
    fn transmit() {
        let ce_expectations = [
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
        ];
        let mut payload = vec![commands::W_TX_PAYLOAD, 1, 2, 3];
        let mut spi_expectations = Vec::new();
        spi_expectations.extend(spi_expect(payload.clone(), vec![0xE; 4]));
        spi_expectations.extend(spi_test_expects![
            // still in progress
            (vec![commands::NOP], vec![0xEu8]),
            // TX_DS asserted
            (vec![commands::NOP], vec![0x2Eu8]),
        ]);
        spi_expectations.extend(write(Register::Status, &[0x20]));
        let mocks = mk_radio(&ce_expectations, &spi_expectations);
        let (mut radio, mut spi, mut ce_pin) = (mocks.0, mocks.1, mocks.2);
        radio.dynamic_payloads = true;
        payload.remove(0);
        radio.start_transmit(&payload, true).unwrap();
        assert_eq!(radio.poll_transmit().unwrap(), None);
        assert_eq!(radio.poll_transmit().unwrap(), Some(TxOutcome::Sent));
        spi.done();
        ce_pin.done();
    }

    #[test]
    fn transmit_max_retries() {
        let mut spi_expectations = Vec::new();
        spi_expectations.extend(spi_test_expects![
            (vec![commands::NOP], vec![0x1Eu8]),
            (vec![commands::FLUSH_TX], vec![0x1Eu8]),
        ]);
        spi_expectations.extend(write(Register::Status, &[0x10]));
        let mocks = mk_radio(&[], &spi_expectations);
        let (mut radio, mut spi, mut ce_pin) = (mocks.0, mocks.1, mocks.2);
        assert_eq!(
            radio.poll_transmit().unwrap(),
            Some(TxOutcome::MaxRetries)
        );
        spi.done();
        ce_pin.done();
    }

    #[test]
    fn receive_static_payload() {
        let mut spi_expectations = Vec::new();
        // RX FIFO not empty, payload waiting on pipe 1
        spi_expectations.extend(spi_expect(
            vec![Register::FifoStatus.addr(), 0],
            vec![0x42, 0x10],
        ));
        let mut expected = vec![0u8; 5];
        expected[0] = commands::R_RX_PAYLOAD;
        spi_expectations.extend(spi_expect(expected, vec![0x42, 9, 8, 7, 6]));
        spi_expectations.extend(write(Register::Status, &[0x40]));
        let mocks = mk_radio(&[], &spi_expectations);
        let (mut radio, mut spi, mut ce_pin) = (mocks.0, mocks.1, mocks.2);
        radio.payload_length = 4;
        let mut buf = [0u8; 2];
        assert_eq!(radio.receive(&mut buf).unwrap(), Some((1, 2)));
        assert_eq!(buf, [9, 8]);
        spi.done();
        ce_pin.done();
    }

    #[test]
    fn receive_dynamic_payload() {
        let mut spi_expectations = Vec::new();
        spi_expectations.extend(spi_expect(
            vec![Register::FifoStatus.addr(), 0],
            vec![0x44, 0x10],
        ));
        spi_expectations.extend(spi_expect(vec![commands::R_RX_PL_WID, 0], vec![0x44, 3]));
        spi_expectations.extend(spi_expect(
            vec![commands::R_RX_PAYLOAD, 0, 0, 0],
            vec![0x44, 1, 2, 3],
        ));
        spi_expectations.extend(write(Register::Status, &[0x40]));
        // now empty
        spi_expectations.extend(spi_expect(
            vec![Register::FifoStatus.addr(), 0],
            vec![0x0E, 0x11],
        ));
        let mocks = mk_radio(&[], &spi_expectations);
        let (mut radio, mut spi, mut ce_pin) = (mocks.0, mocks.1, mocks.2);
        radio.dynamic_payloads = true;
        let mut buf = [0u8; 32];
        assert_eq!(radio.receive(&mut buf).unwrap(), Some((2, 3)));
        assert_eq!(&buf[..3], &[1, 2, 3]);
        assert_eq!(radio.receive(&mut buf).unwrap(), None);
        spi.done();
        ce_pin.done();
    }

    #[test]
    fn observe_and_rpd() {
        let spi_expectations = spi_test_expects![
            (vec![Register::ObserveTx.addr(), 0u8], vec![0xEu8, 0x35u8]),
            (vec![Register::Rpd.addr(), 0u8], vec![0xEu8, 0xFFu8]),
        ];
        let mocks = mk_radio(&[], &spi_expectations);
        let (mut radio, mut spi, mut ce_pin) = (mocks.0, mocks.1, mocks.2);
        assert_eq!(radio.observe_tx().unwrap(), (3, 5));
        assert!(radio.carrier_detected().unwrap());
        spi.done();
        ce_pin.done();
    }

    #[test]
    fn rf_setup_readback() {
        let spi_expectations = spi_test_expects![
            (vec![Register::RfSetup.addr(), 0u8], vec![0xEu8, 0x25u8]),
            (vec![Register::RfSetup.addr(), 0u8], vec![0xEu8, 0x25u8]),
            (vec![Register::Config.addr(), 0u8], vec![0xEu8, 0x0Eu8]),
        ];
        let mocks = mk_radio(&[], &spi_expectations);
        let (mut radio, mut spi, mut ce_pin) = (mocks.0, mocks.1, mocks.2);
        assert_eq!(radio.pa_level().unwrap(), PaLevel::High);
        assert_eq!(radio.data_rate().unwrap(), DataRate::Kbps250);
        assert_eq!(radio.crc_length().unwrap(), CrcLength::Bit16);
        spi.done();
        ce_pin.done();
    }
}
