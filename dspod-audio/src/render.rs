//! Parameter display.
//!
//! The display shows each parameter of the active effect in its own 80×60
//! region along the bottom of the screen. The audio path publishes what the
//! display needs into a [`ParamBoard`] of atomics; the foreground formats
//! those values and redraws a region only when its text would change.
//!
//! Drawing itself goes through [`ParamCanvas`], so any display driver (or a
//! test recorder) can sit behind it.

use core::fmt::Write;
use core::sync::atomic::{AtomicU16, Ordering};

use heapless::String;

use crate::constants::{CONTROL_CHANNELS, MAX_PARAMS};
use crate::control::ControlFrame;
use crate::effects::clean_delay::RANGE_NAMES;
use crate::effects::{EffectDescriptor, ParamFormat};

/// Control counts per displayed percent (`4095 / 41 = 99`).
const PERCENT_DIVISOR: u16 = 41;

/// Screen rectangle of one parameter, inclusive corners.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParamRegion {
    pub x0: u16,
    pub y0: u16,
    pub x1: u16,
    pub y1: u16,
}

impl ParamRegion {
    /// Region of parameter `index`: 80 pixels wide, rows 70..=129.
    pub const fn for_index(index: usize) -> Self {
        let x0 = index as u16 * 80;
        ParamRegion {
            x0,
            y0: 70,
            x1: x0 + 79,
            y1: 129,
        }
    }

    pub const fn center_x(&self) -> u16 {
        (self.x0 + self.x1) / 2
    }
}

/// Minimal drawing surface used for parameter rendering.
pub trait ParamCanvas {
    /// Fill `region` with the background colour.
    fn clear(&mut self, region: &ParamRegion);

    /// Draw `text` horizontally centred on `x`, baseline at `y`.
    fn draw_centered(&mut self, x: u16, y: u16, text: &str);
}

/// Values published by the audio path for the display.
pub struct ParamBoard {
    controls: [AtomicU16; CONTROL_CHANNELS],
    values: [AtomicU16; MAX_PARAMS],
}

impl ParamBoard {
    #[allow(clippy::declare_interior_mut_const)]
    pub const fn new() -> Self {
        const ZERO: AtomicU16 = AtomicU16::new(0);
        ParamBoard {
            controls: [ZERO; CONTROL_CHANNELS],
            values: [ZERO; MAX_PARAMS],
        }
    }

    /// Record the control frame the current block was processed with.
    pub fn publish_controls(&self, frame: &ControlFrame) {
        for (slot, &v) in self.controls.iter().zip(frame.0.iter()) {
            slot.store(v, Ordering::Relaxed);
        }
    }

    /// Publish an effect-specific value for parameter `index`.
    pub fn publish(&self, index: usize, value: u16) {
        if let Some(slot) = self.values.get(index) {
            slot.store(value, Ordering::Relaxed);
        }
    }

    pub fn control(&self, ch: usize) -> u16 {
        self.controls
            .get(ch)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn value(&self, index: usize) -> u16 {
        self.values
            .get(index)
            .map(|v| v.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Zero the effect-specific values. Called when an effect is replaced.
    pub fn reset_values(&self) {
        for v in &self.values {
            v.store(0, Ordering::Relaxed);
        }
    }
}

impl Default for ParamBoard {
    fn default() -> Self {
        Self::new()
    }
}

/// Last value drawn in each region, so unchanged values are not redrawn.
#[derive(Debug, Default)]
pub struct RenderCache {
    prev: [Option<u16>; MAX_PARAMS],
}

impl RenderCache {
    pub const fn new() -> Self {
        RenderCache {
            prev: [None; MAX_PARAMS],
        }
    }

    /// Forget everything drawn so far.
    pub fn invalidate(&mut self) {
        self.prev = [None; MAX_PARAMS];
    }
}

/// Displayed number and text for parameter `index` under `format`.
pub fn format_value(format: ParamFormat, board: &ParamBoard, index: usize) -> (u16, String<16>) {
    let mut text = String::new();
    let shown = match format {
        ParamFormat::Percent => {
            let pct = board.control(index) / PERCENT_DIVISOR;
            let _ = write!(text, "{pct:2}% ");
            pct
        }
        ParamFormat::Hertz => {
            let hz = board.value(index);
            let _ = write!(text, "{hz:5} Hz ");
            hz
        }
        ParamFormat::Millis => {
            let ms = board.value(index);
            let _ = write!(text, "{ms:6} ms ");
            ms
        }
        ParamFormat::Range => {
            let range = board.value(index);
            let name = RANGE_NAMES.get(range as usize).copied().unwrap_or("?");
            let _ = write!(text, " {name} ");
            range
        }
    };
    (shown, text)
}

/// Draw parameter `index` of `desc`.
///
/// With `first_draw` the region is cleared and the parameter name drawn;
/// otherwise the value is redrawn if it differs from the last one drawn.
pub fn render_parameter<C: ParamCanvas + ?Sized>(
    desc: &EffectDescriptor,
    board: &ParamBoard,
    cache: &mut RenderCache,
    index: usize,
    first_draw: bool,
    canvas: &mut C,
) {
    let Some(&name) = desc.param_names.get(index) else {
        return;
    };
    let region = ParamRegion::for_index(index);

    if first_draw {
        canvas.clear(&region);
        if !name.is_empty() {
            canvas.draw_centered(region.center_x(), region.y1 - 16, name);
        }
        cache.prev[index] = None;
        return;
    }
    if name.is_empty() {
        return;
    }

    let (shown, text) = format_value(desc.formats[index], board, index);
    if cache.prev[index] != Some(shown) {
        cache.prev[index] = Some(shown);
        canvas.draw_centered(region.center_x(), region.y1 - 6, &text);
    }
}
