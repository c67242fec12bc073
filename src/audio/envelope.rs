/// Linear ADSR envelope generator
/// Output level is 0.0 to 1.0, one value per sample
pub struct Envelope {
    stage: Stage,
    /// Attack time in seconds
    attack: f32,
    /// Decay time in seconds
    decay: f32,
    /// Sustain level (0.0 to 1.0)
    sustain: f32,
    /// Release time in seconds
    release: f32,
    level: f32,
    sample_rate: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Idle,
    Attack { elapsed: u64 },
    Decay { elapsed: u64 },
    Sustain,
    Release { elapsed: u64, from: f32 },
}

impl Envelope {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            stage: Stage::Idle,
            attack: 0.01,
            decay: 0.1,
            sustain: 0.7,
            release: 0.3,
            level: 0.0,
            sample_rate,
        }
    }

    pub fn set_adsr(&mut self, attack: f32, decay: f32, sustain: f32, release: f32) {
        // 1ms floor avoids clicks
        self.attack = attack.max(0.001);
        self.decay = decay.max(0.001);
        self.sustain = sustain.clamp(0.0, 1.0);
        self.release = release.max(0.001);
    }

    pub fn note_on(&mut self) {
        self.stage = Stage::Attack { elapsed: 0 };
    }

    /// Start the release from the current level
    pub fn note_off(&mut self) {
        if self.stage != Stage::Idle {
            self.stage = Stage::Release {
                elapsed: 0,
                from: self.level,
            };
        }
    }

    pub fn is_active(&self) -> bool {
        self.stage != Stage::Idle
    }

    pub fn is_releasing(&self) -> bool {
        matches!(self.stage, Stage::Release { .. })
    }

    fn samples(&self, seconds: f32) -> u64 {
        ((seconds * self.sample_rate) as u64).max(1)
    }

    pub fn next_sample(&mut self) -> f32 {
        match self.stage {
            Stage::Idle => self.level = 0.0,
            Stage::Attack { elapsed } => {
                let length = self.samples(self.attack);
                if elapsed >= length {
                    self.level = 1.0;
                    self.stage = Stage::Decay { elapsed: 0 };
                } else {
                    self.level = elapsed as f32 / length as f32;
                    self.stage = Stage::Attack {
                        elapsed: elapsed + 1,
                    };
                }
            }
            Stage::Decay { elapsed } => {
                let length = self.samples(self.decay);
                if elapsed >= length {
                    self.level = self.sustain;
                    self.stage = Stage::Sustain;
                } else {
                    let progress = elapsed as f32 / length as f32;
                    self.level = 1.0 - progress * (1.0 - self.sustain);
                    self.stage = Stage::Decay {
                        elapsed: elapsed + 1,
                    };
                }
            }
            Stage::Sustain => self.level = self.sustain,
            Stage::Release { elapsed, from } => {
                let length = self.samples(self.release);
                if elapsed >= length {
                    self.level = 0.0;
                    self.stage = Stage::Idle;
                } else {
                    let progress = elapsed as f32 / length as f32;
                    self.level = from * (1.0 - progress);
                    self.stage = Stage::Release {
                        elapsed: elapsed + 1,
                        from,
                    };
                }
            }
        }

        self.level
    }
}
