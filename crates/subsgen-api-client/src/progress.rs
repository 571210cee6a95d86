//! Simulated processing progress.
//!
//! Progress jumps to 20% once the upload starts, then creeps up 5% per tick
//! and parks at 90% until the service answers. The five steps shown beside
//! the bar are derived from the percentage alone.

pub const UPLOADING_MESSAGE: &str = "Uploading video...";
pub const COMPLETE_MESSAGE: &str = "Complete!";

/// Stage messages, indexed by how far past 20% the bar is.
pub const STAGE_MESSAGES: [&str; 4] = [
    "Extracting audio...",
    "Transcribing speech...",
    "Generating subtitles...",
    "Burning subtitles...",
];

const START_PERCENT: u8 = 20;
const CEILING_PERCENT: u8 = 90;
const STEP_PERCENT: u8 = 5;
const STAGE_SPAN: f64 = 17.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub percent: u8,
    pub message: &'static str,
}

impl ProgressUpdate {
    pub fn idle() -> Self {
        Self {
            percent: 0,
            message: "",
        }
    }

    pub fn uploading() -> Self {
        Self {
            percent: 0,
            message: UPLOADING_MESSAGE,
        }
    }

    pub fn started() -> Self {
        Self {
            percent: START_PERCENT,
            message: STAGE_MESSAGES[0],
        }
    }

    pub fn complete() -> Self {
        Self {
            percent: 100,
            message: COMPLETE_MESSAGE,
        }
    }

    /// The update after one more tick, or `None` once the ceiling is reached.
    ///
    /// The message is picked from the percentage before the increment.
    pub fn next(&self) -> Option<Self> {
        if self.percent >= CEILING_PERCENT {
            return None;
        }

        let stage = ((self.percent as f64 - START_PERCENT as f64) / STAGE_SPAN)
            .floor()
            .max(0.0) as usize;

        Some(Self {
            percent: self.percent + STEP_PERCENT,
            message: STAGE_MESSAGES[stage.min(STAGE_MESSAGES.len() - 1)],
        })
    }
}

impl Default for ProgressUpdate {
    fn default() -> Self {
        Self::idle()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Pending,
    Active,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingStep {
    pub label: &'static str,
    pub status: StepStatus,
}

// (label, active from, completed at)
const STEPS: [(&str, u8, u8); 5] = [
    ("Upload video", 0, 20),
    ("Extract audio", 20, 35),
    ("Transcribe speech", 35, 55),
    ("Generate subtitles", 55, 75),
    ("Burn onto video", 75, 100),
];

pub fn processing_steps(percent: u8) -> Vec<ProcessingStep> {
    STEPS
        .iter()
        .map(|&(label, from, done_at)| {
            let started = if from == 0 {
                percent > 0
            } else {
                percent >= from
            };
            let status = if percent >= done_at {
                StepStatus::Completed
            } else if started {
                StepStatus::Active
            } else {
                StepStatus::Pending
            };
            ProcessingStep { label, status }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_stop_at_ninety() {
        let mut update = ProgressUpdate::started();
        let mut seen = vec![update.percent];
        while let Some(next) = update.next() {
            update = next;
            seen.push(update.percent);
        }
        assert_eq!(*seen.last().unwrap(), 90);
        assert_eq!(seen.len(), 15);
    }

    #[test]
    fn messages_follow_the_percentage() {
        let at = |percent| {
            ProgressUpdate {
                percent,
                message: "",
            }
            .next()
            .unwrap()
            .message
        };
        assert_eq!(at(20), "Extracting audio...");
        assert_eq!(at(35), "Extracting audio...");
        assert_eq!(at(40), "Transcribing speech...");
        assert_eq!(at(55), "Generating subtitles...");
        assert_eq!(at(75), "Burning subtitles...");
        assert_eq!(at(85), "Burning subtitles...");
    }

    #[test]
    fn steps_at_start() {
        let steps = processing_steps(0);
        assert!(steps.iter().all(|s| s.status == StepStatus::Pending));
        assert_eq!(steps.len(), 5);
    }

    #[test]
    fn steps_mid_way() {
        let statuses: Vec<_> = processing_steps(40).iter().map(|s| s.status).collect();
        assert_eq!(
            statuses,
            vec![
                StepStatus::Completed,
                StepStatus::Completed,
                StepStatus::Active,
                StepStatus::Pending,
                StepStatus::Pending,
            ]
        );
        assert_eq!(processing_steps(10)[0].status, StepStatus::Active);
    }

    #[test]
    fn steps_when_done() {
        assert!(processing_steps(100)
            .iter()
            .all(|s| s.status == StepStatus::Completed));
        assert_eq!(processing_steps(90)[4].status, StepStatus::Active);
    }
}
