#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    Pomodoro,
    ShortBreak,
    LongBreak,
    Custom,
}

impl TimerMode {
    /// Preset length in seconds; custom timers keep whatever was set.
    pub fn preset_secs(&self) -> Option<u32> {
        match self {
            Self::Pomodoro => Some(25 * 60),
            Self::ShortBreak => Some(5 * 60),
            Self::LongBreak => Some(15 * 60),
            Self::Custom => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Idle,
    Running(u32),
    /// Reached zero on this tick. The timer is stopped.
    Finished,
}

/// Countdown behind the global focus timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusTimer {
    mode: TimerMode,
    time_left: u32,
    total: u32,
    active: bool,
    custom_secs: u32,
}

impl Default for FocusTimer {
    fn default() -> Self {
        let secs = 25 * 60;
        Self {
            mode: TimerMode::Pomodoro,
            time_left: secs,
            total: secs,
            active: false,
            custom_secs: secs,
        }
    }
}

impl FocusTimer {
    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Stops the countdown. Presets load their length; custom keeps the current value.
    pub fn switch_mode(&mut self, mode: TimerMode) {
        self.active = false;
        self.mode = mode;
        if let Some(secs) = mode.preset_secs() {
            self.time_left = secs;
            self.total = secs;
        }
    }

    /// Load a custom length. A zero length is rejected.
    pub fn set_custom(&mut self, minutes: u32, seconds: u32) -> bool {
        let secs = minutes.saturating_mul(60).saturating_add(seconds);
        if secs == 0 {
            return false;
        }
        self.mode = TimerMode::Custom;
        self.custom_secs = secs;
        self.time_left = secs;
        self.total = secs;
        self.active = false;
        true
    }

    /// Start or pause. Returns whether the timer is now running.
    pub fn toggle(&mut self) -> bool {
        if !self.active && self.time_left == 0 {
            return false;
        }
        self.active = !self.active;
        self.active
    }

    pub fn reset(&mut self) {
        self.active = false;
        self.time_left = self.mode.preset_secs().unwrap_or(self.custom_secs);
        self.total = self.time_left;
    }

    /// Advance by one second.
    pub fn tick(&mut self) -> Tick {
        if !self.active {
            return Tick::Idle;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            self.active = false;
            Tick::Finished
        } else {
            Tick::Running(self.time_left)
        }
    }

    /// Elapsed share of the countdown, 0.0 to 1.0.
    pub fn progress(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        1.0 - self.time_left as f32 / self.total as f32
    }

    /// `MM:SS` for display.
    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.time_left / 60, self.time_left % 60)
    }
}
