//! Resumable fades for screen alpha and background music volume.

use log::info;

/// Linear interpolation from `from` to `to` over `duration` seconds, advanced by `tick`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
}

impl Fade {
    pub fn new(from: f32, to: f32, duration: f32) -> Self {
        Self {
            from,
            to,
            duration: duration.max(0.0),
            elapsed: 0.0,
        }
    }

    /// Advance by `dt` seconds and return the new value.
    pub fn tick(&mut self, dt: f32) -> f32 {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        self.value()
    }

    pub fn value(&self) -> f32 {
        if self.duration <= f32::EPSILON {
            return self.to;
        }
        let t = (self.elapsed / self.duration).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * t
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

#[derive(Debug, Clone, PartialEq)]
enum BgmPhase {
    Idle,
    FadingOut { next: String },
    FadingIn,
}

/// Background music with fade-out / switch / fade-in on every change.
///
/// Volume moves at `fade_rate` units per second. A change requested mid-fade replaces the
/// pending clip and carries on from the current volume.
#[derive(Debug, Clone)]
pub struct BgmPlayer {
    clip: Option<String>,
    volume: f32,
    fade_rate: f32,
    phase: BgmPhase,
}

impl Default for BgmPlayer {
    fn default() -> Self {
        Self::new(2.0)
    }
}

impl BgmPlayer {
    pub fn new(fade_rate: f32) -> Self {
        Self {
            clip: None,
            volume: 0.0,
            fade_rate: fade_rate.max(0.0),
            phase: BgmPhase::Idle,
        }
    }

    pub fn set_fade_rate(&mut self, fade_rate: f32) {
        self.fade_rate = fade_rate.max(0.0);
    }

    /// Switch to `clip`, fading out whatever is audible first.
    pub fn change(&mut self, clip: &str) {
        let already_target = match &self.phase {
            BgmPhase::FadingOut { next } => next == clip,
            _ => self.clip.as_deref() == Some(clip),
        };
        if already_target {
            return;
        }
        if self.clip.as_deref() == Some(clip) {
            info!("bgm switch cancelled; '{clip}' fades back in");
            self.phase = BgmPhase::FadingIn;
            return;
        }
        info!("bgm change requested: {:?} -> '{clip}'", self.clip);
        if self.clip.is_some() && self.volume > 0.0 {
            self.phase = BgmPhase::FadingOut { next: clip.to_string() };
        } else {
            self.start_clip(clip.to_string());
        }
    }

    pub fn tick(&mut self, dt: f32) {
        let step = dt.max(0.0) * self.fade_rate;
        match &self.phase {
            BgmPhase::Idle => {},
            BgmPhase::FadingOut { next } => {
                self.volume = if self.fade_rate <= 0.0 { 0.0 } else { (self.volume - step).max(0.0) };
                if self.volume <= 0.0 {
                    let next = next.clone();
                    self.start_clip(next);
                }
            },
            BgmPhase::FadingIn => {
                self.volume = if self.fade_rate <= 0.0 { 1.0 } else { (self.volume + step).min(1.0) };
                if self.volume >= 1.0 {
                    self.phase = BgmPhase::Idle;
                }
            },
        }
    }

    pub fn clip(&self) -> Option<&str> {
        self.clip.as_deref()
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_fading(&self) -> bool {
        self.phase != BgmPhase::Idle
    }

    fn start_clip(&mut self, clip: String) {
        info!("bgm now playing '{clip}'");
        self.clip = Some(clip);
        self.volume = 0.0;
        self.phase = BgmPhase::FadingIn;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_interpolates_and_finishes() {
        let mut fade = Fade::new(0.0, 1.0, 0.5);
        assert!((fade.tick(0.25) - 0.5).abs() < 1e-5);
        assert!(!fade.is_finished());
        assert!((fade.tick(1.0) - 1.0).abs() < 1e-5);
        assert!(fade.is_finished());
    }

    #[test]
    fn zero_length_fade_jumps_to_target() {
        let mut fade = Fade::new(1.0, 0.0, 0.0);
        assert!(fade.is_finished());
        assert!(fade.tick(0.0).abs() < 1e-5);
    }

    #[test]
    fn first_clip_fades_in_from_silence() {
        let mut bgm = BgmPlayer::new(2.0);
        bgm.change("menu");
        assert_eq!(bgm.clip(), Some("menu"));
        bgm.tick(0.25);
        assert!((bgm.volume() - 0.5).abs() < 1e-5);
        bgm.tick(1.0);
        assert!((bgm.volume() - 1.0).abs() < 1e-5);
        assert!(!bgm.is_fading());
    }

    #[test]
    fn change_fades_out_before_switching() {
        let mut bgm = BgmPlayer::new(2.0);
        bgm.change("menu");
        bgm.tick(1.0);
        bgm.change("village");
        bgm.tick(0.25);
        assert_eq!(bgm.clip(), Some("menu"));
        // a newer request replaces the pending clip
        bgm.change("harbor");
        bgm.tick(0.25);
        assert_eq!(bgm.clip(), Some("harbor"));
        assert!(bgm.volume().abs() < 1e-5);
        bgm.tick(1.0);
        assert!((bgm.volume() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn requesting_the_playing_clip_is_a_no_op() {
        let mut bgm = BgmPlayer::new(2.0);
        bgm.change("menu");
        bgm.tick(1.0);
        bgm.change("menu");
        assert!(!bgm.is_fading());
    }

    #[test]
    fn returning_to_the_fading_clip_fades_it_back_in() {
        let mut bgm = BgmPlayer::new(2.0);
        bgm.change("menu");
        bgm.tick(1.0);
        bgm.change("village");
        bgm.tick(0.25);
        bgm.change("menu");
        assert_eq!(bgm.clip(), Some("menu"));
        assert!((bgm.volume() - 0.5).abs() < 1e-5);
        bgm.tick(0.1);
        assert!((bgm.volume() - 0.7).abs() < 1e-5);
        bgm.tick(1.0);
        assert_eq!(bgm.clip(), Some("menu"));
        assert!(!bgm.is_fading());
    }
}
