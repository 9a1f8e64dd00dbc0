//! Exclusive access to the rendering surface.
//!
//! The toolkit is owned by a [`DisplayGatekeeper`]; every screen mutation goes
//! through a [`DisplayGuard`] obtained from it and the token is released when
//! the guard drops. Acquisition is bounded: callers give a timeout and treat
//! failure as "skip this mutation".

use core::ops::{Deref, DerefMut};

use embassy_sync::{
    blocking_mutex::raw::NoopRawMutex,
    mutex::{Mutex, MutexGuard},
};
use log::warn;

use crate::time::Clock;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GateError {
    /// The display never came up; nothing can be drawn.
    SurfaceUnavailable,
    /// Another holder owns the token right now.
    Busy,
    /// The token stayed busy for the whole timeout.
    Timeout,
}

/// Single-executor gate: the render loop, boot and the event loop are joined
/// futures on one task, so a no-op raw mutex is enough.
pub struct DisplayGatekeeper<T> {
    toolkit: Option<Mutex<NoopRawMutex, T>>,
}

impl<T> DisplayGatekeeper<T> {
    /// `None` records a failed display bring-up.
    pub fn new(toolkit: Option<T>) -> Self {
        Self {
            toolkit: toolkit.map(Mutex::new),
        }
    }

    pub fn unavailable() -> Self {
        Self::new(None)
    }

    pub fn is_ready(&self) -> bool {
        self.toolkit.is_some()
    }

    pub fn is_held(&self) -> bool {
        self.toolkit
            .as_ref()
            .is_some_and(|toolkit| toolkit.try_lock().is_err())
    }

    pub fn try_acquire(&self) -> Result<DisplayGuard<'_, T>, GateError> {
        let toolkit = self.toolkit.as_ref().ok_or(GateError::SurfaceUnavailable)?;
        toolkit
            .try_lock()
            .map(|inner| DisplayGuard { inner })
            .map_err(|_| GateError::Busy)
    }

    /// Spins until the token frees up or `timeout_ms` elapses on `clock`.
    pub fn acquire<C: Clock>(
        &self,
        clock: &C,
        timeout_ms: u64,
    ) -> Result<DisplayGuard<'_, T>, GateError> {
        let deadline = clock.now_ms().saturating_add(timeout_ms);
        loop {
            match self.try_acquire() {
                Err(GateError::Busy) => {}
                other => return other,
            }

            if clock.now_ms() >= deadline {
                warn!("display: lock timeout after {}ms", timeout_ms);
                return Err(GateError::Timeout);
            }
            core::hint::spin_loop();
        }
    }

    pub fn into_inner(self) -> Option<T> {
        self.toolkit.map(Mutex::into_inner)
    }
}

impl<T> core::fmt::Debug for DisplayGatekeeper<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DisplayGatekeeper")
            .field("ready", &self.is_ready())
            .field("held", &self.is_held())
            .finish()
    }
}

/// Scoped ownership of the toolkit; releases the token on drop.
pub struct DisplayGuard<'a, T> {
    inner: MutexGuard<'a, NoopRawMutex, T>,
}

impl<T> Deref for DisplayGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T> DerefMut for DisplayGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualClock;

    #[test]
    fn only_one_guard_at_a_time() {
        let gate = DisplayGatekeeper::new(Some(0u32));
        let guard = gate.try_acquire().unwrap();
        assert!(gate.is_held());
        assert_eq!(gate.try_acquire().err(), Some(GateError::Busy));
        drop(guard);
        assert!(!gate.is_held());
        assert!(gate.try_acquire().is_ok());
    }

    #[test]
    fn guard_mutations_land_in_the_toolkit() {
        let gate = DisplayGatekeeper::new(Some(1u32));
        {
            let mut guard = gate.try_acquire().unwrap();
            *guard += 41;
        }
        assert_eq!(gate.into_inner(), Some(42));
    }

    #[test]
    fn nested_acquire_times_out_instead_of_deadlocking() {
        let gate = DisplayGatekeeper::new(Some(()));
        let clock = ManualClock::new(0).with_read_step_ms(5);
        let _outer = gate.acquire(&clock, 50).unwrap();
        assert!(gate.is_ready());
        assert_eq!(gate.acquire(&clock, 50).err(), Some(GateError::Timeout));
    }

    #[test]
    fn readiness_is_fixed_while_a_guard_is_live() {
        let gate = DisplayGatekeeper::new(Some(7u8));
        let guard = gate.try_acquire().unwrap();
        assert!(gate.is_ready());
        assert!(gate.is_held());
        assert_eq!(*guard, 7);
    }

    #[test]
    fn unavailable_surface_never_hands_out_guards() {
        let gate: DisplayGatekeeper<u8> = DisplayGatekeeper::unavailable();
        let clock = ManualClock::new(0);
        assert!(!gate.is_ready());
        assert_eq!(
            gate.acquire(&clock, 10).err(),
            Some(GateError::SurfaceUnavailable)
        );
        assert!(!gate.is_held());
    }
}
