use crate::models::{DEFAULT_WATER_GOAL_ML, ProgressView};
use std::f64::consts::PI;

/// Share of the daily goal reached, clamped to `[0, 1]`.
pub fn ratio(ml: u32, goal_ml: u32) -> f64 {
    let goal = if goal_ml == 0 {
        DEFAULT_WATER_GOAL_ML
    } else {
        goal_ml
    };
    (f64::from(ml) / f64::from(goal)).clamp(0.0, 1.0)
}

pub fn percent(ratio: f64) -> u32 {
    (ratio.clamp(0.0, 1.0) * 100.0).round() as u32
}

pub fn view(ml: u32, goal_ml: u32) -> ProgressView {
    let ratio = ratio(ml, goal_ml);
    ProgressView {
        ratio,
        percent: percent(ratio),
    }
}

/// Circular progress indicator geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ring {
    pub size: f64,
    pub stroke: f64,
}

impl Default for Ring {
    fn default() -> Self {
        Self {
            size: 180.0,
            stroke: 16.0,
        }
    }
}

impl Ring {
    pub fn radius(&self) -> f64 {
        (self.size - self.stroke) / 2.0
    }

    pub fn circumference(&self) -> f64 {
        2.0 * PI * self.radius()
    }

    pub fn dash(&self, ratio: f64) -> f64 {
        ratio.clamp(0.0, 1.0) * self.circumference()
    }

    pub fn render_svg(&self, ratio: f64, color: &str) -> String {
        let center = self.size / 2.0;
        let radius = self.radius();
        let dash = self.dash(ratio);
        let gap = self.circumference() - dash;
        format!(
            concat!(
                r#"<svg class="ring" width="{size}" height="{size}" viewBox="0 0 {size} {size}">"#,
                r##"<circle cx="{c}" cy="{c}" r="{r:.2}" stroke="#ffffff55" stroke-width="{stroke}" fill="none" />"##,
                r#"<circle cx="{c}" cy="{c}" r="{r:.2}" stroke="{color}" stroke-width="{stroke}" fill="none" "#,
                r#"stroke-linecap="round" stroke-dasharray="{dash:.2} {gap:.2}" transform="rotate(-90 {c} {c})" />"#,
                r#"<text x="50%" y="50%" dominant-baseline="middle" text-anchor="middle" font-size="20" fill="currentColor">{pct}%</text>"#,
                "</svg>"
            ),
            size = self.size,
            c = center,
            r = radius,
            stroke = self.stroke,
            color = color,
            dash = dash,
            gap = gap,
            pct = percent(ratio),
        )
    }
}
