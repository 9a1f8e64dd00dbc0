//! Steady-state loop: input, peripheral polling, network upkeep, app updates.
//!
//! Until the readiness flag is set the loop only sleeps; the hardware is not
//! even reachable from here before boot hands it over.

use log::{error, info, warn};

use crate::{
    device::{Board, DeviceState, Hardware},
    input::InputProvider,
    network::NetworkLink,
    peripherals::{AudioDevice, BatteryGauge},
    time::Clock,
};

const MAX_EVENTS_PER_TICK: u8 = 8;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TickOutcome {
    WaitingForBoot,
    Serviced { events: u8 },
}

pub struct EventLoop<'a, B: Board> {
    state: &'a DeviceState<B>,
    hardware: Option<Hardware<B>>,
    ticks: u64,
}

impl<'a, B: Board> EventLoop<'a, B> {
    pub const fn new(state: &'a DeviceState<B>) -> Self {
        Self {
            state,
            hardware: None,
            ticks: 0,
        }
    }

    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn hardware(&self) -> Option<&Hardware<B>> {
        self.hardware.as_ref()
    }

    pub fn hardware_mut(&mut self) -> Option<&mut Hardware<B>> {
        self.hardware.as_mut()
    }

    pub async fn run(mut self) -> ! {
        loop {
            self.tick().await;
        }
    }

    pub async fn tick(&mut self) -> TickOutcome {
        let state = self.state;
        let clock = state.clock();
        let timing = state.config().event_loop;

        if !state.is_ready() {
            clock.sleep_ms(timing.ready_poll_ms).await;
            return TickOutcome::WaitingForBoot;
        }

        if self.hardware.is_none() {
            self.hardware = state.take_hardware();
            if self.hardware.is_some() {
                info!("event loop: system initialized, starting main loop");
            }
        }
        let Some(hardware) = self.hardware.as_mut() else {
            error!("event loop: ready flag set without hardware");
            clock.sleep_ms(timing.ready_poll_ms).await;
            return TickOutcome::WaitingForBoot;
        };

        let now_ms = clock.now_ms();
        let mut status = hardware.status();
        let mut events = 0u8;
        while events < MAX_EVENTS_PER_TICK {
            match hardware.input.poll_event() {
                Ok(Some(event)) => {
                    state.with_ui(|ui, ctx| ui.handle_input(event, ctx, &status));
                    events += 1;
                }
                Ok(None) => break,
                Err(err) => {
                    warn!("input: poll failed: {:?}", err);
                    break;
                }
            }
        }

        hardware.battery.update(now_ms);
        hardware.network.handle(now_ms).await;
        if hardware.health.audio {
            hardware.audio.process();
        }

        status = hardware.status();
        state.with_ui(|ui, ctx| ui.service(ctx, &status));

        self.ticks = self.ticks.saturating_add(1);
        clock.sleep_ms(timing.tick_ms).await;
        TickOutcome::Serviced { events }
    }
}

#[cfg(test)]
mod tests;
