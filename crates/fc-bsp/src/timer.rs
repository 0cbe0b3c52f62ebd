use core::ops::BitOr;

use bitfield_struct::bitfield;

use crate::IoTag;

/// A general purpose or advanced timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Timer {
    Tim1 = 1,
    Tim2 = 2,
    Tim3 = 3,
    Tim4 = 4,
    Tim5 = 5,
    Tim6 = 6,
    Tim7 = 7,
    Tim8 = 8,
    Tim9 = 9,
    Tim10 = 10,
    Tim11 = 11,
    Tim12 = 12,
    Tim13 = 13,
    Tim14 = 14,
    Tim20 = 20,
}

impl Timer {
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// Advanced timers have complementary outputs and a main output enable.
    pub const fn is_advanced(self) -> bool {
        matches!(self, Timer::Tim1 | Timer::Tim8 | Timer::Tim20)
    }

    /// Timers clocked from APB2 (the others sit on APB1).
    pub const fn on_apb2(self) -> bool {
        matches!(
            self,
            Timer::Tim1 | Timer::Tim8 | Timer::Tim9 | Timer::Tim10 | Timer::Tim11 | Timer::Tim20
        )
    }

    /// 32 bit counters.
    pub const fn is_32bit(self) -> bool {
        matches!(self, Timer::Tim2 | Timer::Tim5)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerChannel {
    Ch1,
    Ch2,
    Ch3,
    Ch4,
}

impl TimerChannel {
    /// 1 - 4
    pub const fn number(self) -> u8 {
        self as u8 + 1
    }
}

/// What a timer output may be used for.
#[bitfield(u16)]
#[derive(PartialEq, Eq)]
pub struct TimerUsage {
    pub motor: bool,
    pub servo: bool,
    pub led: bool,
    pub ppm: bool,
    pub pwm: bool,
    pub beeper: bool,
    pub camera_control: bool,
    pub transponder: bool,
    #[bits(8)]
    _padding: u8,
}

impl TimerUsage {
    pub const NONE: TimerUsage = TimerUsage::new();
    pub const MOTOR: TimerUsage = TimerUsage::new().with_motor(true);
    pub const SERVO: TimerUsage = TimerUsage::new().with_servo(true);
    pub const LED: TimerUsage = TimerUsage::new().with_led(true);
    pub const PPM: TimerUsage = TimerUsage::new().with_ppm(true);
    pub const PWM: TimerUsage = TimerUsage::new().with_pwm(true);
    pub const BEEPER: TimerUsage = TimerUsage::new().with_beeper(true);
    pub const CAMERA_CONTROL: TimerUsage = TimerUsage::new().with_camera_control(true);
    pub const TRANSPONDER: TimerUsage = TimerUsage::new().with_transponder(true);

    /// `true` if any usage of `other` is also in `self`.
    pub const fn intersects(self, other: TimerUsage) -> bool {
        self.into_bits() & other.into_bits() != 0
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TimerUsage {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "TimerUsage({=u16:#X})", self.into_bits())
    }
}

impl BitOr for TimerUsage {
    type Output = TimerUsage;

    fn bitor(self, rhs: Self) -> Self::Output {
        TimerUsage::from_bits(self.into_bits() | rhs.into_bits())
    }
}

/// One timer output routed to a pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerHardware {
    pub tim: Timer,
    pub tag: IoTag,
    pub channel: TimerChannel,
    pub usage: TimerUsage,
    /// The pin carries the complementary (CHxN) output.
    pub complementary: bool,
    /// GPIO alternate function number.
    pub af: u8,
    /// Which of the channel's DMA mappings to use, if any.
    pub dma_opt: Option<u8>,
}

impl TimerHardware {
    pub const fn new(
        tim: Timer,
        channel: TimerChannel,
        tag: IoTag,
        usage: TimerUsage,
        af: u8,
    ) -> Self {
        Self {
            tim,
            tag,
            channel,
            usage,
            complementary: false,
            af,
            dma_opt: None,
        }
    }

    pub const fn complementary(self) -> Self {
        Self {
            complementary: true,
            ..self
        }
    }

    pub const fn with_dma_opt(self, opt: u8) -> Self {
        Self {
            dma_opt: Some(opt),
            ..self
        }
    }
}

/// The first timer output routed to `tag`.
pub fn by_tag(table: &[TimerHardware], tag: IoTag) -> Option<&TimerHardware> {
    table.iter().find(|t| t.tag == tag)
}

/// The `index`th timer output routed to `tag` (1-based, 0 = the first).
pub fn by_tag_and_index(table: &[TimerHardware], tag: IoTag, index: u8) -> Option<&TimerHardware> {
    let skip = index.saturating_sub(1) as usize;
    table.iter().filter(|t| t.tag == tag).nth(skip)
}

/// Timer outputs sharing any usage with `usage`, in table order.
pub fn with_usage(
    table: &[TimerHardware],
    usage: TimerUsage,
) -> impl Iterator<Item = &TimerHardware> {
    table.iter().filter(move |t| t.usage.intersects(usage))
}

/// The prescaler register value making a timer clocked at `timer_clock`
/// count at `hz`, rounded to the nearest divider.
pub const fn prescaler_for_hz(timer_clock: u32, hz: u32) -> u16 {
    if hz == 0 {
        return u16::MAX;
    }
    if hz >= timer_clock {
        return 0;
    }
    let divider = (timer_clock as u64 + hz as u64 / 2) / hz as u64;
    let prescaler = divider - 1;
    if prescaler > u16::MAX as u64 {
        u16::MAX
    } else {
        prescaler as u16
    }
}

/// The auto-reload period producing `hz` update events with `prescaler`.
/// 0 if `hz` is 0.
pub const fn period_for_hz(timer_clock: u32, prescaler: u16, hz: u32) -> u32 {
    if hz == 0 {
        return 0;
    }
    timer_clock / (prescaler as u32 + 1) / hz
}

#[cfg(test)]
mod test {
    use super::{
        by_tag, by_tag_and_index, period_for_hz, prescaler_for_hz, with_usage, Timer,
        TimerChannel, TimerHardware, TimerUsage,
    };
    use crate::{IoTag, Port};

    const PB0: IoTag = IoTag::new(Port::B, 0);
    const PB1: IoTag = IoTag::new(Port::B, 1);

    const TABLE: [TimerHardware; 4] = [
        TimerHardware::new(Timer::Tim3, TimerChannel::Ch3, PB0, TimerUsage::MOTOR, 2),
        TimerHardware::new(Timer::Tim8, TimerChannel::Ch2, PB0, TimerUsage::MOTOR, 3)
            .complementary(),
        TimerHardware::new(Timer::Tim1, TimerChannel::Ch3, PB1, TimerUsage::LED, 1).with_dma_opt(0),
        TimerHardware::new(Timer::Tim3, TimerChannel::Ch4, PB1, TimerUsage::NONE, 2),
    ];

    #[test]
    fn lookups() {
        assert_eq!(by_tag(&TABLE, PB0), Some(&TABLE[0]));
        assert_eq!(by_tag_and_index(&TABLE, PB0, 0), Some(&TABLE[0]));
        assert_eq!(by_tag_and_index(&TABLE, PB0, 1), Some(&TABLE[0]));
        assert_eq!(by_tag_and_index(&TABLE, PB0, 2), Some(&TABLE[1]));
        assert_eq!(by_tag_and_index(&TABLE, PB0, 3), None);
        assert_eq!(by_tag(&TABLE, IoTag::new(Port::C, 0)), None);
        assert!(TABLE[1].complementary);
        assert_eq!(TABLE[2].dma_opt, Some(0));
    }

    #[test]
    fn usage_filter() {
        assert_eq!(with_usage(&TABLE, TimerUsage::MOTOR).count(), 2);
        assert_eq!(
            with_usage(&TABLE, TimerUsage::MOTOR | TimerUsage::LED).count(),
            3
        );
        assert_eq!(with_usage(&TABLE, TimerUsage::SERVO).count(), 0);
        assert_eq!(TimerUsage::MOTOR.into_bits(), 1);
        assert_eq!(TimerUsage::TRANSPONDER.into_bits(), 0x80);
    }

    #[test]
    fn timer_properties() {
        assert!(Timer::Tim8.is_advanced());
        assert!(!Timer::Tim4.is_advanced());
        assert!(Timer::Tim9.on_apb2());
        assert!(!Timer::Tim2.on_apb2());
        assert!(Timer::Tim5.is_32bit());
        assert_eq!(Timer::Tim20.number(), 20);
        assert_eq!(TimerChannel::Ch4.number(), 4);
    }

    #[test]
    fn clock_math() {
        // 168 MHz down to a 1 MHz tick
        assert_eq!(prescaler_for_hz(168_000_000, 1_000_000), 167);
        assert_eq!(period_for_hz(168_000_000, 167, 50), 20_000);
        // 84 MHz / 24 MHz = 3.5, rounded up to 4
        assert_eq!(prescaler_for_hz(84_000_000, 24_000_000), 3);
        assert_eq!(prescaler_for_hz(84_000_000, 100_000_000), 0);
        assert_eq!(prescaler_for_hz(168_000_000, 1), u16::MAX);
        assert_eq!(prescaler_for_hz(168_000_000, 0), u16::MAX);
        assert_eq!(period_for_hz(168_000_000, 0, 0), 0);
    }
}
