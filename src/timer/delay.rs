use crate::beacon::Beacon;
use crate::driver::ManchesterTx;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

/// Runs a blocking loop that repeatedly calls `tick()` on the provided transmitter.
///
/// This is a simple timing loop for use in environments where interrupts are unavailable
/// or undesired. It drives the encoder's timing using a delay provider implementing
/// `embedded_hal::delay::DelayNs`.
///
/// # Arguments
/// - `tx`: A mutable reference to a `ManchesterTx` instance.
/// - `delay`: A delay provider implementing `DelayNs`, typically from the HAL.
/// - `tick_us`: The delay between each tick call, in microseconds (e.g. 5000 for 100 bit/s).
///
/// # Notes
/// - This loop will never return; it is intended for single-purpose polling firmware.
/// - Requests must come from an interrupt, since nothing else runs.
/// - The time spent in `tick()` adds to every period; prefer a timer interrupt when
///   the bit rate matters.
pub fn run_tick_loop<D: DelayNs, TX: OutputPin>(
    tx: &mut ManchesterTx<TX>,
    delay: &mut D,
    tick_us: u32,
) -> ! {
    loop {
        let _ = tx.tick();
        delay.delay_us(tick_us);
    }
}

/// Same as [`run_tick_loop`], polling `beacon` before every tick.
///
/// This is the whole firmware of a fixed-payload transmitter: the beacon requests a
/// frame at its period and the loop clocks it out.
///
/// # Example
/// ```rust,ignore
/// let mut tx = ManchesterTx::new(pin).unwrap();
/// let mut beacon = Beacon::default();
/// run_beacon_loop(&mut tx, &mut beacon, &mut delay, TICK_PERIOD_US);
/// ```
pub fn run_beacon_loop<D: DelayNs, TX: OutputPin>(
    tx: &mut ManchesterTx<TX>,
    beacon: &mut Beacon,
    delay: &mut D,
    tick_us: u32,
) -> ! {
    loop {
        let _ = beacon.poll(tx);
        let _ = tx.tick();
        delay.delay_us(tick_us);
    }
}
