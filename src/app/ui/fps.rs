use std::collections::VecDeque;

use super::super::ViewModel;

const SAMPLE_WINDOW: usize = 180;

/// Rolling frame timings, sampled from the same delta the engine advances by.
#[derive(Debug, Default)]
pub(in crate::app) struct FrameStats {
    samples_ms: VecDeque<f32>,
    animated_frames: u64,
    pub show: bool,
    pub show_average: bool,
    pub show_frame_time: bool,
}

impl FrameStats {
    pub fn new() -> Self {
        Self {
            show: true,
            show_average: true,
            show_frame_time: true,
            ..Self::default()
        }
    }

    /// Zero-length frames (the first one, or a paused clock) are skipped.
    pub fn record(&mut self, dt_secs: f32, animating: bool) {
        if dt_secs <= f32::EPSILON {
            return;
        }

        self.samples_ms.push_back(dt_secs * 1000.0);
        if self.samples_ms.len() > SAMPLE_WINDOW {
            self.samples_ms.pop_front();
        }
        if animating {
            self.animated_frames += 1;
        }
    }

    fn last_ms(&self) -> Option<f32> {
        self.samples_ms.back().copied()
    }

    fn average_ms(&self) -> Option<f32> {
        (!self.samples_ms.is_empty())
            .then(|| self.samples_ms.iter().sum::<f32>() / self.samples_ms.len() as f32)
    }

    pub fn text(&self) -> Option<String> {
        if !self.show {
            return None;
        }
        let last = self.last_ms()?;

        let mut parts = vec![format!("FPS {:.0}", 1000.0 / last)];
        if self.show_average {
            if let Some(average) = self.average_ms() {
                parts.push(format!("avg {:.1}", 1000.0 / average));
            }
        }
        if self.show_frame_time {
            parts.push(format!("{last:.1} ms"));
        }
        parts.push(format!("animated {}", self.animated_frames));

        Some(parts.join(" | "))
    }
}

impl ViewModel {
    pub(in crate::app) fn visible_graph_text(&self) -> String {
        format!(
            "drawn: {} nodes / {} edges",
            self.visible_node_count, self.visible_edge_count
        )
    }
}
