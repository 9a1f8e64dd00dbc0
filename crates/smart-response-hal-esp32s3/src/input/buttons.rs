use embedded_hal::digital::InputPin;

use smart_response_core::input::{InputEvent, InputProvider};

#[derive(Debug, Clone, Copy)]
pub struct ButtonConfig {
    active_low: bool,
    debounce_polls: u8,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            active_low: true,
            debounce_polls: 3,
        }
    }
}

impl ButtonConfig {
    pub const fn with_active_low(mut self, active_low: bool) -> Self {
        self.active_low = active_low;
        self
    }

    pub const fn with_debounce_polls(mut self, debounce_polls: u8) -> Self {
        self.debounce_polls = debounce_polls;
        self
    }
}

#[derive(Debug)]
pub enum ButtonInputError<PwrErr, BootErr> {
    Power(PwrErr),
    Boot(BootErr),
}

type ButtonResult<PwrErr, BootErr, T> = Result<T, ButtonInputError<PwrErr, BootErr>>;

/// Press-edge detector for one polled pin.
#[derive(Debug, Clone, Copy)]
struct Debounce {
    raw: bool,
    stable: bool,
    stable_count: u8,
}

impl Debounce {
    const fn new(pressed: bool) -> Self {
        Self {
            raw: pressed,
            stable: pressed,
            stable_count: 0,
        }
    }

    /// `true` once per debounced press.
    fn feed(&mut self, pressed: bool, threshold: u8) -> bool {
        if pressed == self.raw {
            self.stable_count = self.stable_count.saturating_add(1);
        } else {
            self.raw = pressed;
            self.stable_count = 0;
        }

        if self.stable_count >= threshold.max(1) && self.stable != self.raw {
            self.stable = self.raw;
            return self.stable;
        }
        false
    }
}

/// Power and boot buttons mapped to the primary and secondary input slots.
#[derive(Debug)]
pub struct ButtonInput<PWR, BOOT> {
    power: PWR,
    boot: BOOT,
    config: ButtonConfig,
    power_state: Debounce,
    boot_state: Debounce,
    pending_event: Option<InputEvent>,
}

impl<PWR, BOOT> ButtonInput<PWR, BOOT>
where
    PWR: InputPin,
    BOOT: InputPin,
{
    pub fn new(
        mut power: PWR,
        mut boot: BOOT,
        config: ButtonConfig,
    ) -> ButtonResult<PWR::Error, BOOT::Error, Self> {
        let power_high = power.is_high().map_err(ButtonInputError::Power)?;
        let boot_high = boot.is_high().map_err(ButtonInputError::Boot)?;

        Ok(Self {
            power,
            boot,
            config,
            power_state: Debounce::new(pressed_from_level(power_high, config.active_low)),
            boot_state: Debounce::new(pressed_from_level(boot_high, config.active_low)),
            pending_event: None,
        })
    }
}

impl<PWR, BOOT> InputProvider for ButtonInput<PWR, BOOT>
where
    PWR: InputPin,
    BOOT: InputPin,
{
    type Error = ButtonInputError<PWR::Error, BOOT::Error>;

    fn poll_event(&mut self) -> Result<Option<InputEvent>, Self::Error> {
        if let Some(event) = self.pending_event.take() {
            return Ok(Some(event));
        }

        let threshold = self.config.debounce_polls;
        let power_high = self.power.is_high().map_err(ButtonInputError::Power)?;
        let boot_high = self.boot.is_high().map_err(ButtonInputError::Boot)?;

        let primary = self
            .power_state
            .feed(pressed_from_level(power_high, self.config.active_low), threshold);
        let secondary = self
            .boot_state
            .feed(pressed_from_level(boot_high, self.config.active_low), threshold);

        match (primary, secondary) {
            (true, true) => {
                self.pending_event = Some(InputEvent::Secondary);
                Ok(Some(InputEvent::Primary))
            }
            (true, false) => Ok(Some(InputEvent::Primary)),
            (false, true) => Ok(Some(InputEvent::Secondary)),
            (false, false) => Ok(None),
        }
    }
}

#[inline]
fn pressed_from_level(high: bool, active_low: bool) -> bool {
    if active_low { !high } else { high }
}
