//! Canvas 2D surface

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::Surface;
use crate::sim::BallTint;

/// Ball colors
const NEUTRAL_COLOR: &str = "#0095DD";
const PRESSED_COLOR: &str = "red";
const COUNTDOWN_COLOR: &str = "rgba(255, 0, 0, 1)";
const COUNTDOWN_FONT: &str = "italic 20pt Arial";

/// Draws onto an HTML canvas
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    size: Vec2,
}

impl CanvasSurface {
    /// Wrap a canvas; its current width and height are fixed for the run
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let size = Vec2::new(canvas.width() as f32, canvas.height() as f32);
        Ok(Self { ctx, size })
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn clear(&mut self) {
        self.ctx
            .clear_rect(0.0, 0.0, f64::from(self.size.x), f64::from(self.size.y));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, tint: BallTint) {
        let color = match tint {
            BallTint::Neutral => NEUTRAL_COLOR,
            BallTint::Pressed => PRESSED_COLOR,
        };
        self.ctx.begin_path();
        if let Err(e) = self.ctx.arc(
            f64::from(center.x),
            f64::from(center.y),
            f64::from(radius),
            0.0,
            std::f64::consts::TAU,
        ) {
            log::warn!("Canvas arc failed: {:?}", e);
            return;
        }
        self.ctx.set_fill_style_str(color);
        self.ctx.fill();
        self.ctx.close_path();
    }

    fn draw_countdown(&mut self, value: u32) {
        self.clear();
        self.ctx.set_fill_style_str(COUNTDOWN_COLOR);
        self.ctx.set_font(COUNTDOWN_FONT);
        let x = f64::from(self.size.x) / 2.0;
        let y = f64::from(self.size.y) / 2.0;
        if let Err(e) = self.ctx.fill_text(&value.to_string(), x, y) {
            log::warn!("Canvas text failed: {:?}", e);
        }
    }
}
