//! Timed gates keyed off the shared millisecond clock.
//!
//! Each timer only reads `now_ms` handed to it by the tick; none of them own a
//! clock or know about each other.

/// Fire-rate gate. Closed by a shot, re-opened once the cooldown has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FireCooldown {
    ready: bool,
    last_fire_ms: u64,
    cooldown_ms: u64,
}

impl FireCooldown {
    pub fn new(cooldown_ms: u64) -> Self {
        Self {
            ready: true,
            last_fire_ms: 0,
            cooldown_ms,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn update(&mut self, now_ms: u64) {
        if !self.ready && now_ms.saturating_sub(self.last_fire_ms) >= self.cooldown_ms {
            self.ready = true;
        }
    }

    /// Consume the gate. Returns false (and changes nothing) while cooling down.
    pub fn trigger(&mut self, now_ms: u64) -> bool {
        if !self.ready {
            return false;
        }
        self.ready = false;
        self.last_fire_ms = now_ms;
        true
    }
}

/// Periodic enemy spawn source. An interval of zero disables it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnTicker {
    interval_ms: u64,
    next_fire_ms: u64,
}

impl SpawnTicker {
    pub fn new(interval_ms: u64, now_ms: u64) -> Self {
        let mut ticker = Self {
            interval_ms: 0,
            next_fire_ms: 0,
        };
        ticker.arm(interval_ms, now_ms);
        ticker
    }

    pub fn arm(&mut self, interval_ms: u64, now_ms: u64) {
        self.interval_ms = interval_ms;
        self.next_fire_ms = now_ms.saturating_add(interval_ms);
    }

    pub fn stop(&mut self) {
        self.interval_ms = 0;
    }

    pub fn is_running(&self) -> bool {
        self.interval_ms > 0
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// At most one firing per call. A long stall does not produce a burst:
    /// the schedule skips ahead so at most one more firing is owed.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if self.interval_ms == 0 || now_ms < self.next_fire_ms {
            return false;
        }
        self.next_fire_ms += self.interval_ms;
        if self.next_fire_ms + self.interval_ms <= now_ms {
            let behind = (now_ms - self.next_fire_ms) / self.interval_ms;
            self.next_fire_ms += behind * self.interval_ms;
        }
        true
    }
}

/// Post-hit grace window during which the player cannot lose lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invulnerability {
    active: bool,
    hit_ms: u64,
    duration_ms: u64,
}

impl Invulnerability {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            active: false,
            hit_ms: 0,
            duration_ms,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn start(&mut self, now_ms: u64) {
        self.active = true;
        self.hit_ms = now_ms;
    }

    pub fn update(&mut self, now_ms: u64) {
        if self.active && now_ms.saturating_sub(self.hit_ms) >= self.duration_ms {
            self.active = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooldown_blocks_until_elapsed() {
        let mut gun = FireCooldown::new(100);
        assert!(gun.trigger(1_000));
        assert!(!gun.trigger(1_001));

        gun.update(1_099);
        assert!(!gun.is_ready());
        assert!(!gun.trigger(1_099));

        gun.update(1_100);
        assert!(gun.trigger(1_100));
    }

    #[test]
    fn ticker_fires_once_per_interval() {
        let mut ticker = SpawnTicker::new(300, 0);
        assert!(!ticker.poll(299));
        assert!(ticker.poll(300));
        assert!(!ticker.poll(300));
        assert!(!ticker.poll(599));
        assert!(ticker.poll(600));
    }

    #[test]
    fn ticker_catches_up_by_at_most_one() {
        let mut ticker = SpawnTicker::new(100, 0);
        assert!(ticker.poll(1_050));
        assert!(ticker.poll(1_051));
        assert!(!ticker.poll(1_052));
        assert!(ticker.poll(1_100));
    }

    #[test]
    fn stopped_ticker_never_fires_until_rearmed() {
        let mut ticker = SpawnTicker::new(300, 0);
        ticker.stop();
        assert!(!ticker.is_running());
        assert!(!ticker.poll(10_000));

        ticker.arm(300, 10_000);
        assert!(!ticker.poll(10_299));
        assert!(ticker.poll(10_300));
    }

    #[test]
    fn invulnerability_boundary() {
        let mut inv = Invulnerability::new(1_000);
        inv.start(5_000);
        inv.update(5_999);
        assert!(inv.is_active());
        inv.update(6_000);
        assert!(!inv.is_active());
    }
}
