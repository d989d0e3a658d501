use std::time::Duration;

/// Pipeline stages, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    ColorConvert,
    Smooth,
    MotionSearch,
    Delta,
    Subsample,
    Transform,
    Quantize,
    DcDiff,
    ZigZag,
    Tokens,
}

impl Stage {
    pub const ALL: [Stage; 10] = [
        Stage::ColorConvert,
        Stage::Smooth,
        Stage::MotionSearch,
        Stage::Delta,
        Stage::Subsample,
        Stage::Transform,
        Stage::Quantize,
        Stage::DcDiff,
        Stage::ZigZag,
        Stage::Tokens,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::ColorConvert => "color_convert",
            Stage::Smooth => "smooth",
            Stage::MotionSearch => "motion_search",
            Stage::Delta => "delta",
            Stage::Subsample => "subsample",
            Stage::Transform => "transform",
            Stage::Quantize => "quantize",
            Stage::DcDiff => "dc_diff",
            Stage::ZigZag => "zigzag",
            Stage::Tokens => "tokens",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Wall-clock time spent per stage. Stages that did not run stay at zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StageTimings {
    elapsed: [Duration; 10],
}

impl StageTimings {
    pub fn record(&mut self, stage: Stage, elapsed: Duration) {
        self.elapsed[stage.slot()] += elapsed;
    }

    pub fn get(&self, stage: Stage) -> Duration {
        self.elapsed[stage.slot()]
    }

    pub fn total(&self) -> Duration {
        self.elapsed.iter().sum()
    }

    pub fn accumulate(&mut self, other: &StageTimings) {
        for (acc, d) in self.elapsed.iter_mut().zip(other.elapsed) {
            *acc += d;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stage, Duration)> + '_ {
        Stage::ALL.into_iter().map(|s| (s, self.get(s)))
    }
}

/// Totals for one encoded sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncodeStats {
    pub frames: u64,
    pub i_frames: u64,
    pub p_frames: u64,
    pub motion_vectors: u64,
    pub tokens: u64,
    /// Kernel calls that failed on the configured backend and were re-run on the reference one.
    pub fallbacks: u64,
    pub timings: StageTimings,
}
