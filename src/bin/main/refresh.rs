use embedded_graphics::{pixelcolor::Rgb565, prelude::DrawTarget};
use log::{info, warn};
use smart_response_core::{
    boot::park,
    display::{DisplayGatekeeper, GateError},
    time::Clock,
};
use smart_response_hal_esp32s3::render::CanvasToolkit;

/// Takes the display token once per `interval_ms` and pushes dirty content
/// to the panel. Skips a frame when the token is busy.
pub async fn display_refresh_loop<D, C>(
    display: &DisplayGatekeeper<CanvasToolkit<D>>,
    clock: &C,
    interval_ms: u64,
    lock_timeout_ms: u64,
) -> !
where
    D: DrawTarget<Color = Rgb565>,
    C: Clock,
{
    if !display.is_ready() {
        warn!("display: no surface; refresh disabled");
        park(clock).await
    }

    let mut first_frame_logged = false;
    let mut failure_logged = false;
    loop {
        match display.acquire(clock, lock_timeout_ms) {
            Ok(mut toolkit) => match toolkit.flush() {
                Ok(true) if !first_frame_logged => {
                    info!("display: first frame flushed");
                    first_frame_logged = true;
                }
                Ok(_) => failure_logged = false,
                Err(err) => {
                    if !failure_logged {
                        warn!("display: flush failed: {:?}", err);
                        failure_logged = true;
                    }
                }
            },
            Err(GateError::Busy | GateError::Timeout) => {}
            Err(GateError::SurfaceUnavailable) => park(clock).await,
        }

        clock.sleep_ms(interval_ms).await;
    }
}
