use super::registers::Registers;
use super::timing::{self, UP_DOWN_DURATION};
use crate::base::address::MASK;

/// Fade times in ms, indexed by the fade time register.
/// The last entry is half of the real 90.510s, which doesn't fit. The fade
/// period is doubled for that index instead.
const FADE_TIMES: [u16; 16] = [
    0, 707, 1000, 1414, 2000, 2828, 4000, 5657, 8000, 11314, 16000, 22627, 32000, 45255, 64000,
    45255,
];
const HALVED_FADE_TIME: u8 = 15;

/// Fade rates in steps per 200ms, indexed by the fade rate register
const FADE_RATES: [u8; 16] = [0, 72, 51, 36, 25, 18, 13, 9, 6, 4, 3, 2, 2, 1, 1, 0];

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Moves the actual level towards the requested level one step at a time.
#[derive(Debug, Clone)]
pub struct FadeEngine {
    requested_level: u8,
    // Ticks between steps, 0 when not fading
    fade_period: u32,
    direction: Direction,
    elapsed: u32,
}

impl FadeEngine {
    pub fn new() -> FadeEngine {
        FadeEngine {
            requested_level: 0,
            fade_period: 0,
            direction: Direction::Down,
            elapsed: 0,
        }
    }

    pub fn requested_level(&self) -> u8 {
        self.requested_level
    }

    pub fn fade_period(&self) -> u32 {
        self.fade_period
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_fading(&self) -> bool {
        self.fade_period != 0
    }

    /// Stop any running fade, leaving the actual level where it is.
    pub fn stop(&mut self, regs: &mut Registers) {
        self.requested_level = regs.actual_level;
        self.fade_period = 0;
        self.elapsed = 0;
        regs.status.fade_running = false;
    }

    fn start(&mut self, regs: &mut Registers, period: u32, direction: Direction) {
        self.fade_period = period;
        self.direction = direction;
        self.elapsed = 0;
        regs.status.fade_running = period != 0;
    }

    fn jump(&mut self, regs: &mut Registers, level: u8) {
        regs.actual_level = level;
        self.stop(regs);
    }

    /// Go to `level` using the fade time. MASK leaves everything as is.
    ///
    /// The level is limited to min..=max, except 0 which switches off.
    /// Limiting sets the limit error flag.
    pub fn fade_to(&mut self, regs: &mut Registers, level: u8) {
        if level == MASK {
            return;
        }
        let mut level = level;
        regs.status.limit_error = false;
        if level < regs.min_level && level != 0 {
            level = regs.min_level;
            regs.status.limit_error = true;
        }
        if level > regs.max_level {
            level = regs.max_level;
            regs.status.limit_error = true;
        }
        self.requested_level = level;

        if regs.fade_time == 0 {
            self.jump(regs, level);
            return;
        }
        let fade_time = FADE_TIMES[(regs.fade_time & 0x0f) as usize] as u32;
        let actual = regs.actual_level as i16;
        let requested = level as i16;
        let min = regs.min_level as i16;
        // A fade needs at least two steps, closer levels are set at once
        let (steps, direction) = if requested > actual + 1 {
            if actual == 0 {
                // Switching on starts at min level
                (requested - min + 1, Direction::Up)
            } else {
                (requested - actual, Direction::Up)
            }
        } else if requested < actual - 1 {
            if requested == 0 {
                // Switching off ends at min level
                (actual - min + 1, Direction::Down)
            } else {
                (actual - requested, Direction::Down)
            }
        } else {
            self.jump(regs, level);
            return;
        };
        let mut period = fade_time / steps.max(1) as u32;
        if regs.fade_time == HALVED_FADE_TIME {
            period <<= 1;
        }
        self.start(regs, period.max(1), direction);
    }

    /// Fade up for 200ms using the fade rate. Only while the lamp is on.
    pub fn up_with_fade_rate(&mut self, regs: &mut Registers) {
        let rate = FADE_RATES[(regs.fade_rate & 0x0f) as usize];
        if regs.fade_rate == 0 || !regs.status.lamp_on {
            self.stop(regs);
            return;
        }
        let target = if (regs.actual_level as i16) < regs.max_level as i16 - rate as i16 {
            regs.actual_level + rate
        } else {
            regs.max_level
        };
        self.rate_fade(regs, target, Direction::Up);
    }

    /// Fade down for 200ms using the fade rate. Only while the lamp is on.
    pub fn down_with_fade_rate(&mut self, regs: &mut Registers) {
        let rate = FADE_RATES[(regs.fade_rate & 0x0f) as usize];
        if regs.fade_rate == 0 || !regs.status.lamp_on {
            self.stop(regs);
            return;
        }
        let target = if regs.actual_level as i16 > regs.min_level as i16 + rate as i16 {
            regs.actual_level - rate
        } else {
            regs.min_level
        };
        self.rate_fade(regs, target, Direction::Down);
    }

    fn rate_fade(&mut self, regs: &mut Registers, target: u8, direction: Direction) {
        self.requested_level = target;
        let steps = (target as i16 - regs.actual_level as i16).unsigned_abs() as u32;
        if steps == 0 {
            self.fade_period = 0;
            regs.status.fade_running = false;
        } else {
            let period = timing::ticks(UP_DOWN_DURATION) / steps;
            self.start(regs, period.max(1), direction);
        }
    }

    /// Advance time by `elapsed` ticks. Takes at most one step.
    pub fn advance(&mut self, regs: &mut Registers, elapsed: u16) {
        if self.fade_period == 0 {
            return;
        }
        self.elapsed += elapsed as u32;
        if self.elapsed >= self.fade_period {
            self.step(regs);
            self.elapsed = 0;
        }
    }

    fn step(&mut self, regs: &mut Registers) {
        regs.status.fade_running = true;
        let before = regs.actual_level;
        match self.direction {
            Direction::Up => {
                if regs.actual_level == 0 {
                    regs.actual_level = regs.min_level;
                } else if regs.actual_level < regs.max_level {
                    regs.actual_level += 1;
                }
            }
            Direction::Down => {
                if regs.actual_level > regs.min_level {
                    regs.actual_level -= 1;
                } else {
                    regs.actual_level = 0;
                }
            }
        }
        // Also stop if limits prevent reaching the requested level
        if regs.actual_level == self.requested_level || regs.actual_level == before {
            self.fade_period = 0;
            regs.status.fade_running = false;
        }
    }
}

impl Default for FadeEngine {
    fn default() -> Self {
        Self::new()
    }
}
