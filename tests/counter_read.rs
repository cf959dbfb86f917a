//! Elapsed-time reads, including direction probing in symmetric modes.

mod common;

use avr_timer_hal::{
    Error, InterruptBridge, TimerError, TimerState,
    regs::Register,
    timer::{CountDir, CounterSnapshot, TIMER1_CTC, TIMER1_PWM, TIMER2_CTC, TIMER2_PWM},
};
use common::timer;

const STATE_VIOLATION: Error = Error::TimerError(TimerError::StateViolation);

#[test]
fn read_requires_running_or_stopped() {
    static BRIDGE: InterruptBridge = InterruptBridge::new();
    let mut timer = timer(&TIMER1_CTC, &BRIDGE);

    assert_eq!(timer.read(), Err(STATE_VIOLATION));
    timer.init(1_000, None).unwrap();
    assert_eq!(timer.read(), Err(STATE_VIOLATION));
    assert_eq!(timer.read_raw(), Err(STATE_VIOLATION));
}

#[test]
fn read_without_any_prescaler_fails() {
    static BRIDGE: InterruptBridge = InterruptBridge::new();
    let mut timer = timer(&TIMER1_CTC, &BRIDGE);

    // Stopped, but no period was ever set.
    timer.stop();
    assert_eq!(timer.read(), Err(STATE_VIOLATION));
}

#[test]
fn linear_reads_stay_within_period_and_increase() {
    static BRIDGE: InterruptBridge = InterruptBridge::new();
    let mut timer = timer(&TIMER1_CTC, &BRIDGE);
    timer.init(1_000, None).unwrap();
    timer.start().unwrap();

    // 160 ticks at 16Mhz: 10µs between reads.
    timer.port().set_step(160);

    let mut last = 0;
    for i in 0..50 {
        let elapsed = timer.read().unwrap();
        assert_eq!(elapsed, i * 10);
        assert!(elapsed >= last);
        assert!(elapsed <= 1_000);
        last = elapsed;
    }
}

#[test]
fn linear_reads_use_the_prescaler_shift() {
    static BRIDGE: InterruptBridge = InterruptBridge::new();
    let mut timer = timer(&TIMER2_CTC, &BRIDGE);
    // ÷64, TOP 250
    timer.init(1_000, None).unwrap();
    timer.start().unwrap();
    timer.port().set_step(0);
    timer.port().poke(Register::Counter, 160);

    // 160 ticks * 64 / 16Mhz
    assert_eq!(timer.read(), Ok(640));
}

#[test]
fn descending_snapshot_is_folded() {
    static BRIDGE: InterruptBridge = InterruptBridge::new();
    let mut timer = timer(&TIMER2_PWM, &BRIDGE);
    timer.init(1_000, None).unwrap();
    timer.start().unwrap();

    let port = timer.port();
    port.poke(Register::CompareA, 100);
    port.poke(Register::Counter, 60);
    port.set_counting_up(false);

    // 60, then 59 one tick later.
    let snapshot = timer.read_raw().unwrap();
    assert_eq!(
        snapshot,
        CounterSnapshot {
            raw: 60,
            top: 100,
            direction: CountDir::Down
        }
    );
    assert_eq!(snapshot.ticks(), 140);
}

#[test]
fn descending_read_converts_folded_ticks() {
    static BRIDGE: InterruptBridge = InterruptBridge::new();
    let mut timer = timer(&TIMER1_PWM, &BRIDGE);
    // TOP 8000, no prescaler.
    timer.init(1_000, None).unwrap();
    timer.start().unwrap();

    timer.port().poke(Register::Counter, 6_000);
    timer.port().set_counting_up(false);

    // (8000 - 6000) + 8000 ticks at 16Mhz.
    assert_eq!(timer.read(), Ok(625));
}

#[test]
fn ascending_symmetric_read_is_not_folded() {
    static BRIDGE: InterruptBridge = InterruptBridge::new();
    let mut timer = timer(&TIMER1_PWM, &BRIDGE);
    timer.init(1_000, None).unwrap();
    timer.start().unwrap();

    timer.port().poke(Register::Counter, 6_000);

    let snapshot = timer.read_raw().unwrap();
    assert_eq!(snapshot.direction, CountDir::Up);
    assert_eq!(snapshot.ticks(), 6_000);
}

#[test]
fn turnaround_at_top_reads_half_period() {
    static BRIDGE: InterruptBridge = InterruptBridge::new();
    let mut timer = timer(&TIMER1_PWM, &BRIDGE);
    timer.init(1_000, None).unwrap();
    timer.start().unwrap();

    timer.port().poke(Register::Counter, 8_000);

    let snapshot = timer.read_raw().unwrap();
    assert_eq!(snapshot.direction, CountDir::Down);
    assert_eq!(snapshot.ticks(), 8_000);
}

#[test]
fn symmetric_reads_cover_the_whole_period() {
    static BRIDGE: InterruptBridge = InterruptBridge::new();
    let mut timer = timer(&TIMER1_PWM, &BRIDGE);
    timer.init(1_000, None).unwrap();
    timer.start().unwrap();
    timer.port().set_step(97);

    // Up to TOP and back down: elapsed time keeps growing until the period ends.
    let mut last = 0;
    loop {
        let elapsed = timer.read().unwrap();
        if elapsed < last {
            break;
        }
        assert!(elapsed <= 1_000);
        last = elapsed;
    }
    assert!(last > 950);
}

#[test]
fn stopped_while_descending_reads_second_half() {
    static BRIDGE: InterruptBridge = InterruptBridge::new();
    let mut timer = timer(&TIMER1_PWM, &BRIDGE);
    timer.init(1_000, None).unwrap();
    timer.start().unwrap();

    timer.port().poke(Register::Counter, 4_000);
    timer.port().set_counting_up(false);
    timer.stop();

    // Watching for the direction moved the counter two ticks before the clock went.
    assert_eq!(timer.port().peek(Register::Counter), 3_998);
    assert_eq!(timer.port().clock_bits(), 0);

    let snapshot = timer.read_raw().unwrap();
    assert_eq!(snapshot.direction, CountDir::Down);
    assert_eq!(snapshot.ticks(), 12_002);
    // Same count as while running: (8000 - 3998) + 8000 ticks at 16Mhz.
    assert_eq!(timer.read(), Ok(750));
    assert_eq!(timer.read(), Ok(750));

    // Stopping again doesn't lose it.
    timer.stop();
    assert_eq!(timer.read(), Ok(750));
}

#[test]
fn stopped_while_ascending_is_not_folded() {
    static BRIDGE: InterruptBridge = InterruptBridge::new();
    let mut timer = timer(&TIMER1_PWM, &BRIDGE);
    timer.init(1_000, None).unwrap();
    timer.start().unwrap();

    timer.port().poke(Register::Counter, 4_000);
    timer.stop();

    let snapshot = timer.read_raw().unwrap();
    assert_eq!(snapshot.direction, CountDir::Up);
    assert_eq!(snapshot.raw, 4_002);
    assert_eq!(timer.read(), Ok(250));
}

#[test]
fn resumed_counter_is_watched_again() {
    static BRIDGE: InterruptBridge = InterruptBridge::new();
    let mut timer = timer(&TIMER1_PWM, &BRIDGE);
    timer.init(1_000, None).unwrap();
    timer.start().unwrap();

    timer.port().poke(Register::Counter, 4_000);
    timer.port().set_counting_up(false);
    timer.stop();
    timer.resume().unwrap();
    timer.port().set_counting_up(true);

    assert_eq!(timer.read_raw().unwrap().direction, CountDir::Up);
}

#[test]
fn zero_top_reads_without_waiting() {
    static BRIDGE: InterruptBridge = InterruptBridge::new();
    let mut timer = timer(&TIMER1_PWM, &BRIDGE);
    timer.init(0, None).unwrap();
    timer.start().unwrap();

    let snapshot = timer.read_raw().unwrap();
    assert_eq!(
        snapshot,
        CounterSnapshot {
            raw: 0,
            top: 0,
            direction: CountDir::Up
        }
    );
    assert_eq!(timer.read(), Ok(0));

    timer.stop();
    assert_eq!(timer.state(), TimerState::Stopped);
    assert_eq!(timer.read(), Ok(0));
}

#[test]
fn frozen_counter_fails_direction_probe() {
    static BRIDGE: InterruptBridge = InterruptBridge::new();
    let mut timer = timer(&TIMER2_PWM, &BRIDGE);
    timer.init(1_000, None).unwrap();
    timer.start().unwrap();
    timer.port().set_step(0);

    assert_eq!(timer.read(), Err(Error::RegisterUnchanged));
}

#[test]
fn frozen_counter_still_stops() {
    static BRIDGE: InterruptBridge = InterruptBridge::new();
    let mut timer = timer(&TIMER1_PWM, &BRIDGE);
    timer.init(1_000, None).unwrap();
    timer.start().unwrap();
    timer.port().poke(Register::Counter, 4_000);
    timer.port().set_step(0);

    timer.stop();
    assert_eq!(timer.state(), TimerState::Stopped);
    assert_eq!(timer.port().clock_bits(), 0);
    assert_eq!(timer.read_raw().unwrap().direction, CountDir::Up);
}
