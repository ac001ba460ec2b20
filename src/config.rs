use serde::Deserialize;

use crate::{
    dom::{Dom, CONFIG_SCRIPT},
    error::ConfigError,
    logging::LogLevel,
};

pub const DEFAULT_MOBILE_BREAKPOINT_PX: f64 = 768.0;
pub const DEFAULT_DESKTOP_BREAKPOINT_PX: f64 = 1024.0;
pub const DEFAULT_MOBILE_REVEAL_THRESHOLD: f64 = 0.05;
pub const DEFAULT_DESKTOP_REVEAL_THRESHOLD: f64 = 0.1;
pub const DEFAULT_REVEAL_OFFSET_PX: f64 = 20.0;
pub const DEFAULT_REVEAL_ROOT_MARGIN_BOTTOM_PX: f64 = 50.0;
pub const DEFAULT_REVEAL_TRANSITION_MS: u32 = 600;
pub const DEFAULT_HOVER_LIFT_PX: f64 = 8.0;
pub const DEFAULT_HOVER_SCALE: f64 = 1.02;
pub const DEFAULT_RIPPLE_DURATION_MS: u32 = 600;
pub const DEFAULT_PARALLAX_RATE: f64 = -0.3;
pub const DEFAULT_VIDEO_VISIBILITY_THRESHOLD: f64 = 0.1;
pub const DEFAULT_RESIZE_DEBOUNCE_MS: u32 = 250;
pub const DEFAULT_SPEECH_LANG: &str = "en-US";
pub const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

const BREAKPOINT_PX_BOUNDS: (f64, f64) = (1.0, 10_000.0);
const THRESHOLD_BOUNDS: (f64, f64) = (0.0, 1.0);
const OFFSET_PX_BOUNDS: (f64, f64) = (0.0, 500.0);
const DURATION_MS_BOUNDS: (u32, u32) = (0, 10_000);
const HOVER_SCALE_BOUNDS: (f64, f64) = (0.5, 2.0);
const PARALLAX_RATE_BOUNDS: (f64, f64) = (-1.0, 1.0);

/// Tunables for every behavior group. Read from the optional
/// `<script type="application/json" id="page-effects-config">` element;
/// missing keys keep their defaults.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EffectsConfig {
    /// Viewports narrower than this use the mobile reveal threshold.
    pub mobile_breakpoint_px: f64,
    /// Crossing this width in either direction re-runs the reveal setup.
    pub desktop_breakpoint_px: f64,
    pub mobile_reveal_threshold: f64,
    pub desktop_reveal_threshold: f64,
    pub reveal_offset_px: f64,
    pub reveal_root_margin_bottom_px: f64,
    pub reveal_transition_ms: u32,
    pub hover_lift_px: f64,
    pub hover_scale: f64,
    pub ripple_duration_ms: u32,
    /// Multiplier applied to the scroll offset; negative moves the hero up.
    pub parallax_rate: f64,
    pub video_visibility_threshold: f64,
    pub resize_debounce_ms: u32,
    pub speech_lang: String,
    pub log_level: LogLevel,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            mobile_breakpoint_px: DEFAULT_MOBILE_BREAKPOINT_PX,
            desktop_breakpoint_px: DEFAULT_DESKTOP_BREAKPOINT_PX,
            mobile_reveal_threshold: DEFAULT_MOBILE_REVEAL_THRESHOLD,
            desktop_reveal_threshold: DEFAULT_DESKTOP_REVEAL_THRESHOLD,
            reveal_offset_px: DEFAULT_REVEAL_OFFSET_PX,
            reveal_root_margin_bottom_px: DEFAULT_REVEAL_ROOT_MARGIN_BOTTOM_PX,
            reveal_transition_ms: DEFAULT_REVEAL_TRANSITION_MS,
            hover_lift_px: DEFAULT_HOVER_LIFT_PX,
            hover_scale: DEFAULT_HOVER_SCALE,
            ripple_duration_ms: DEFAULT_RIPPLE_DURATION_MS,
            parallax_rate: DEFAULT_PARALLAX_RATE,
            video_visibility_threshold: DEFAULT_VIDEO_VISIBILITY_THRESHOLD,
            resize_debounce_ms: DEFAULT_RESIZE_DEBOUNCE_MS,
            speech_lang: DEFAULT_SPEECH_LANG.to_string(),
            log_level: DEFAULT_LOG_LEVEL,
        }
    }
}

impl EffectsConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let parsed: Self = serde_json::from_str(raw)?;
        Ok(parsed.bounded())
    }

    /// Reads the page's config script; a page without one gets the defaults.
    pub fn from_dom<D: Dom>(dom: &D) -> Result<Self, ConfigError> {
        let raw = dom
            .query_selector(CONFIG_SCRIPT)
            .ok()
            .flatten()
            .and_then(|script| dom.text_content(&script))
            .filter(|raw| !raw.trim().is_empty());

        match raw {
            Some(raw) => Self::from_json(&raw),
            None => Ok(Self::default()),
        }
    }

    /// Replaces every out-of-range value with its default.
    pub fn bounded(self) -> Self {
        Self {
            mobile_breakpoint_px: f64_with_bounds(
                self.mobile_breakpoint_px,
                DEFAULT_MOBILE_BREAKPOINT_PX,
                BREAKPOINT_PX_BOUNDS,
            ),
            desktop_breakpoint_px: f64_with_bounds(
                self.desktop_breakpoint_px,
                DEFAULT_DESKTOP_BREAKPOINT_PX,
                BREAKPOINT_PX_BOUNDS,
            ),
            mobile_reveal_threshold: f64_with_bounds(
                self.mobile_reveal_threshold,
                DEFAULT_MOBILE_REVEAL_THRESHOLD,
                THRESHOLD_BOUNDS,
            ),
            desktop_reveal_threshold: f64_with_bounds(
                self.desktop_reveal_threshold,
                DEFAULT_DESKTOP_REVEAL_THRESHOLD,
                THRESHOLD_BOUNDS,
            ),
            reveal_offset_px: f64_with_bounds(
                self.reveal_offset_px,
                DEFAULT_REVEAL_OFFSET_PX,
                OFFSET_PX_BOUNDS,
            ),
            reveal_root_margin_bottom_px: f64_with_bounds(
                self.reveal_root_margin_bottom_px,
                DEFAULT_REVEAL_ROOT_MARGIN_BOTTOM_PX,
                OFFSET_PX_BOUNDS,
            ),
            reveal_transition_ms: u32_with_bounds(
                self.reveal_transition_ms,
                DEFAULT_REVEAL_TRANSITION_MS,
                DURATION_MS_BOUNDS,
            ),
            hover_lift_px: f64_with_bounds(self.hover_lift_px, DEFAULT_HOVER_LIFT_PX, OFFSET_PX_BOUNDS),
            hover_scale: f64_with_bounds(self.hover_scale, DEFAULT_HOVER_SCALE, HOVER_SCALE_BOUNDS),
            ripple_duration_ms: u32_with_bounds(
                self.ripple_duration_ms,
                DEFAULT_RIPPLE_DURATION_MS,
                DURATION_MS_BOUNDS,
            ),
            parallax_rate: f64_with_bounds(self.parallax_rate, DEFAULT_PARALLAX_RATE, PARALLAX_RATE_BOUNDS),
            video_visibility_threshold: f64_with_bounds(
                self.video_visibility_threshold,
                DEFAULT_VIDEO_VISIBILITY_THRESHOLD,
                THRESHOLD_BOUNDS,
            ),
            resize_debounce_ms: u32_with_bounds(
                self.resize_debounce_ms,
                DEFAULT_RESIZE_DEBOUNCE_MS,
                DURATION_MS_BOUNDS,
            ),
            speech_lang: Some(self.speech_lang.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| DEFAULT_SPEECH_LANG.to_string()),
            log_level: self.log_level,
        }
    }

    /// Intersection ratio the reveal observer uses at the given viewport width.
    pub fn reveal_threshold(&self, viewport_width: f64) -> f64 {
        if viewport_width < self.mobile_breakpoint_px {
            self.mobile_reveal_threshold
        } else {
            self.desktop_reveal_threshold
        }
    }

    pub fn reveal_root_margin(&self) -> String {
        format!("0px 0px -{}px 0px", css_number(self.reveal_root_margin_bottom_px))
    }
}

fn f64_with_bounds(value: f64, default: f64, bounds: (f64, f64)) -> f64 {
    Some(value)
        .filter(|value| value.is_finite() && (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

fn u32_with_bounds(value: u32, default: u32, bounds: (u32, u32)) -> u32 {
    Some(value)
        .filter(|value| (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

/// Formats a CSS length without trailing zeros: `-75.00` becomes `-75`.
pub fn css_number(value: f64) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
