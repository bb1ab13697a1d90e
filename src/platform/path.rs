use bevy::prelude::*;

/// How a platform continues once it reaches its last waypoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathMode {
    /// Travel back to the first waypoint and loop
    Cyclic,
    /// Retrace the waypoints in reverse
    #[default]
    PingPong,
}

/// Largest accepted ease amount; 0 is linear, 2 is a strong ease in/out
pub const MAX_EASE_AMOUNT: f32 = 2.0;

/// Eases a `[0, 1]` progress value: `t^k / (t^k + (1 - t)^k)` with
/// `k = ease_amount + 1`.
pub fn ease(t: f32, ease_amount: f32) -> f32 {
    let k = ease_amount + 1.0;
    let a = t.powf(k);
    a / (a + (1.0 - t).powf(k))
}

/// Scripted waypoint motion for a moving platform.
#[derive(Debug, Clone)]
pub struct PlatformPath {
    waypoints: Vec<Vec2>,
    /// Units per second along each segment
    pub speed: f32,
    pub mode: PathMode,
    /// Seconds to hold at each waypoint
    pub wait_time: f32,
    ease_amount: f32,
    from_index: usize,
    percent: f32,
    next_move_time: f32,
    reversed: bool,
}

impl PlatformPath {
    /// Path through world-space waypoints.
    ///
    /// An empty list is replaced by a single waypoint at the origin, which
    /// keeps the platform still.
    pub fn new(waypoints: impl IntoIterator<Item = Vec2>) -> Self {
        let mut waypoints: Vec<Vec2> = waypoints.into_iter().collect();
        if waypoints.is_empty() {
            warn!("platform path has no waypoints, holding at the origin");
            waypoints.push(Vec2::ZERO);
        }

        Self {
            waypoints,
            speed: 3.0,
            mode: PathMode::default(),
            wait_time: 0.0,
            ease_amount: 0.0,
            from_index: 0,
            percent: 0.0,
            next_move_time: 0.0,
            reversed: false,
        }
    }

    /// Path through waypoints given relative to `origin`, usually the
    /// platform's spawn position.
    pub fn from_local(origin: Vec2, local: impl IntoIterator<Item = Vec2>) -> Self {
        let waypoints: Vec<Vec2> = local.into_iter().map(|point| point + origin).collect();
        if waypoints.is_empty() {
            warn!("platform path has no waypoints, holding at {origin}");
            return Self::new([origin]);
        }
        Self::new(waypoints)
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_mode(mut self, mode: PathMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn cyclic(self) -> Self {
        self.with_mode(PathMode::Cyclic)
    }

    pub fn with_wait_time(mut self, seconds: f32) -> Self {
        self.wait_time = seconds;
        self
    }

    /// Sets the ease amount, clamped to `[0, MAX_EASE_AMOUNT]`.
    pub fn with_ease_amount(mut self, ease_amount: f32) -> Self {
        let clamped = ease_amount.clamp(0.0, MAX_EASE_AMOUNT);
        if clamped != ease_amount {
            warn!("ease amount {ease_amount} out of range, using {clamped}");
        }
        self.ease_amount = clamped;
        self
    }

    pub fn ease_amount(&self) -> f32 {
        self.ease_amount
    }

    /// Waypoints in current traversal order.
    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    /// Index of the waypoint the platform is leaving.
    pub fn from_index(&self) -> usize {
        self.from_index
    }

    /// Progress along the current segment, `[0, 1)`.
    pub fn percent(&self) -> f32 {
        self.percent
    }

    /// True while retracing a ping-pong path backwards.
    pub fn reversed(&self) -> bool {
        self.reversed
    }

    /// Simulation time before which the platform holds still.
    pub fn next_move_time(&self) -> f32 {
        self.next_move_time
    }

    /// Advances along the path and returns the displacement from `position`
    /// to where the platform should be at time `now`.
    pub fn advance(&mut self, position: Vec2, dt: f32, now: f32) -> Vec2 {
        if now < self.next_move_time {
            return Vec2::ZERO;
        }

        let count = self.waypoints.len();
        self.from_index %= count;
        let to_index = (self.from_index + 1) % count;
        let from = self.waypoints[self.from_index];
        let to = self.waypoints[to_index];

        let distance = from.distance(to);
        if distance > 0.0 {
            self.percent += dt * self.speed / distance;
        } else {
            self.percent = 1.0;
        }
        self.percent = self.percent.clamp(0.0, 1.0);

        let target = from.lerp(to, ease(self.percent, self.ease_amount));

        if self.percent >= 1.0 {
            self.percent = 0.0;
            self.from_index += 1;

            if self.mode == PathMode::PingPong && self.from_index >= count - 1 {
                self.from_index = 0;
                self.waypoints.reverse();
                self.reversed = !self.reversed;
            }

            self.next_move_time = now + self.wait_time;
        }

        target - position
    }
}
