//! Fixed-timestep clock and interval timers.
//!
//! A frame callback (e.g. `requestAnimationFrame`) calls with a variable
//! delta. `GameTime` turns that into whole simulation ticks so the economy
//! always advances in multiples of the tick interval; `Interval` fires the
//! autosave. The simulation step itself only ever sees a `dt`.

pub struct GameTime {
    /// Milliseconds per tick (e.g. 100ms = 10 ticks/sec)
    ms_per_tick: f64,
    /// Accumulated milliseconds not yet consumed as ticks
    accumulator: f64,
    /// Total elapsed ticks since creation
    pub total_ticks: u64,
    /// Timestamp of the last update (ms), None if first frame
    last_timestamp: Option<f64>,
}

impl GameTime {
    /// `ms_per_tick`: length of one simulation tick.
    pub fn new(ms_per_tick: u32) -> Self {
        Self {
            ms_per_tick: ms_per_tick.max(1) as f64,
            accumulator: 0.0,
            total_ticks: 0,
            last_timestamp: None,
        }
    }

    pub fn ms_per_tick(&self) -> f64 {
        self.ms_per_tick
    }

    /// Feed a monotonic timestamp. Returns the number of whole ticks that
    /// elapsed since the previous call.
    ///
    /// No upper clamp: a tick is O(1) in `dt`, so a long background gap is
    /// simply one large step.
    pub fn update(&mut self, now_ms: f64) -> u64 {
        let delta = match self.last_timestamp {
            Some(prev) => (now_ms - prev).max(0.0),
            None => 0.0,
        };
        self.last_timestamp = Some(now_ms);

        self.accumulator += delta;
        let ticks = (self.accumulator / self.ms_per_tick) as u64;
        self.accumulator -= ticks as f64 * self.ms_per_tick;
        self.total_ticks += ticks;
        ticks
    }

    /// Forget the previous timestamp, e.g. after the timers were stopped.
    pub fn reset(&mut self) {
        self.last_timestamp = None;
        self.accumulator = 0.0;
    }
}

/// A repeating timer driven by elapsed milliseconds.
#[derive(Debug, Clone)]
pub struct Interval {
    period_ms: f64,
    elapsed_ms: f64,
    running: bool,
}

impl Interval {
    pub fn new(period_ms: f64) -> Self {
        Self {
            period_ms: period_ms.max(1.0),
            elapsed_ms: 0.0,
            running: true,
        }
    }

    /// Advance by `dt_ms`. Returns true when at least one period completed;
    /// missed periods collapse into a single firing.
    pub fn advance(&mut self, dt_ms: f64) -> bool {
        self.advance_periods(dt_ms) > 0
    }

    /// Advance by `dt_ms` and return how many whole periods completed. The
    /// remainder carries over to the next call.
    pub fn advance_periods(&mut self, dt_ms: f64) -> u64 {
        if !self.running || !(dt_ms > 0.0) {
            return 0;
        }
        self.elapsed_ms += dt_ms;
        let periods = (self.elapsed_ms / self.period_ms).floor();
        self.elapsed_ms -= periods * self.period_ms;
        periods as u64
    }

    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.elapsed_ms = 0.0;
        }
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.elapsed_ms = 0.0;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_returns_zero_ticks() {
        let mut gt = GameTime::new(100);
        assert_eq!(gt.update(0.0), 0);
    }

    #[test]
    fn one_tick_at_100ms() {
        let mut gt = GameTime::new(100);
        gt.update(0.0);
        assert_eq!(gt.update(100.0), 1);
        assert_eq!(gt.total_ticks, 1);
    }

    #[test]
    fn remainder_carried_over() {
        let mut gt = GameTime::new(100);
        gt.update(0.0);
        assert_eq!(gt.update(150.0), 1);
        // 50ms left over + 50ms new = 1 tick
        assert_eq!(gt.update(200.0), 1);
        assert_eq!(gt.total_ticks, 2);
    }

    #[test]
    fn long_gap_is_not_clamped() {
        let mut gt = GameTime::new(100);
        gt.update(0.0);
        assert_eq!(gt.update(10_000.0), 100);
    }

    #[test]
    fn clock_going_backwards_yields_nothing() {
        let mut gt = GameTime::new(100);
        gt.update(1_000.0);
        assert_eq!(gt.update(500.0), 0);
        assert_eq!(gt.update(600.0), 1);
    }

    #[test]
    fn steady_60fps() {
        let mut gt = GameTime::new(100);
        gt.update(0.0);
        let mut total = 0;
        for i in 1..=60 {
            total += gt.update(i as f64 * 16.667);
        }
        assert!((9..=11).contains(&total), "expected ~10 ticks, got {}", total);
    }

    #[test]
    fn reset_drops_pending_time() {
        let mut gt = GameTime::new(100);
        gt.update(0.0);
        gt.update(90.0);
        gt.reset();
        assert_eq!(gt.update(5_000.0), 0);
        assert_eq!(gt.update(5_100.0), 1);
    }

    #[test]
    fn interval_fires_once_per_period() {
        let mut iv = Interval::new(1_000.0);
        assert!(!iv.advance(600.0));
        assert!(iv.advance(600.0));
        // 200 carried over from the previous period
        assert!(!iv.advance(300.0));
        assert!(iv.advance(500.0));
    }

    #[test]
    fn interval_counts_every_elapsed_period() {
        let mut iv = Interval::new(500.0);
        assert_eq!(iv.advance_periods(400.0), 0);
        assert_eq!(iv.advance_periods(1_700.0), 4);
        assert_eq!(iv.advance_periods(400.0), 1);
        iv.stop();
        assert_eq!(iv.advance_periods(10_000.0), 0);
    }

    #[test]
    fn interval_collapses_missed_periods() {
        let mut iv = Interval::new(1_000.0);
        assert!(iv.advance(5_500.0));
        assert!(!iv.advance(400.0));
        assert!(iv.advance(100.0));
    }

    #[test]
    fn stopped_interval_never_fires() {
        let mut iv = Interval::new(100.0);
        iv.stop();
        assert!(!iv.advance(1_000.0));
        iv.start();
        assert!(iv.advance(100.0));
    }
}
