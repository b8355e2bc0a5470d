//! A row (or column) of clickable dots drawn with cairo. Used for the gallery
//! indicators and for the panel navigator.

use crate::gui::theme::ThemeColors;
use cairo::Context;
use gtk::prelude::*;
use gtk4 as gtk;
use palette::Srgba;
use std::cell::RefCell;
use std::f64::consts::PI;
use std::rc::Rc;

pub const DOT_RADIUS: f64 = 5.0;
pub const ACTIVE_DOT_RADIUS: f64 = 7.0;
pub const DOT_SPACING: f64 = 22.0;
pub const HIT_RADIUS: f64 = 11.0;
pub const STRIP_THICKNESS: i32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DotGeometry {
    pub center: Point,
}

impl DotGeometry {
    /// Spaces `count` dots evenly along `orientation`, centered in the area.
    pub fn layout(
        count: usize,
        width: f64,
        height: f64,
        orientation: gtk::Orientation,
    ) -> Vec<Self> {
        let span = count.saturating_sub(1) as f64 * DOT_SPACING;
        let along = |i: usize, length: f64| (length - span) / 2.0 + i as f64 * DOT_SPACING;

        (0..count)
            .map(|i| {
                let center = match orientation {
                    gtk::Orientation::Vertical => Point::new(width / 2.0, along(i, height)),
                    _ => Point::new(along(i, width), height / 2.0),
                };
                Self { center }
            })
            .collect()
    }

    /// The dot nearest to `point`, if it is within reach.
    pub fn hit_test(dots: &[Self], point: Point) -> Option<usize> {
        dots.iter()
            .enumerate()
            .map(|(i, dot)| (i, dot.center.distance(point)))
            .filter(|(_, d)| *d <= HIT_RADIUS)
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i, _)| i)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DotState {
    Active,
    Hovered,
    Idle,
}

impl DotState {
    fn resolve(active: bool, hovered: bool) -> Self {
        if active {
            Self::Active
        } else if hovered {
            Self::Hovered
        } else {
            Self::Idle
        }
    }

    fn color(&self, colors: &ThemeColors) -> Srgba<f64> {
        match self {
            Self::Active => colors.active,
            Self::Hovered => colors.hovered,
            Self::Idle => colors.idle,
        }
    }

    fn radius(&self) -> f64 {
        match self {
            Self::Active => ACTIVE_DOT_RADIUS,
            _ => DOT_RADIUS,
        }
    }
}

pub fn draw(
    cr: &Context,
    dots: &[DotGeometry],
    active: &[bool],
    hovered: Option<usize>,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    for (i, (dot, &is_active)) in dots.iter().zip(active).enumerate() {
        let state = DotState::resolve(is_active, hovered == Some(i));
        let (r, g, b, a) = state.color(colors).into_components();
        cr.set_source_rgba(r, g, b, a);
        cr.arc(dot.center.x, dot.center.y, state.radius(), 0.0, 2.0 * PI);
        cr.fill()?;
    }
    Ok(())
}

struct StripState {
    labels: Vec<String>,
    active: Vec<bool>,
    hovered: Option<usize>,
    orientation: gtk::Orientation,
}

impl StripState {
    fn hit(&self, area: &gtk::DrawingArea, x: f64, y: f64) -> Option<usize> {
        let dots = DotGeometry::layout(
            self.active.len(),
            area.width() as f64,
            area.height() as f64,
            self.orientation,
        );
        DotGeometry::hit_test(&dots, Point::new(x, y))
    }
}

#[derive(Clone)]
pub struct DotStrip {
    area: gtk::DrawingArea,
    state: Rc<RefCell<StripState>>,
}

impl DotStrip {
    pub fn new(orientation: gtk::Orientation, on_click: impl Fn(usize) + 'static) -> Self {
        let area = gtk::DrawingArea::new();
        area.add_css_class("vitrine-dots");
        match orientation {
            gtk::Orientation::Vertical => area.set_width_request(STRIP_THICKNESS),
            _ => area.set_height_request(STRIP_THICKNESS),
        }

        let state = Rc::new(RefCell::new(StripState {
            labels: Vec::new(),
            active: Vec::new(),
            hovered: None,
            orientation,
        }));

        let state_draw = state.clone();
        area.set_draw_func(move |area, cr, width, height| {
            let colors = ThemeColors::from_context(&area.style_context());
            let state = state_draw.borrow();
            let dots =
                DotGeometry::layout(state.active.len(), width as f64, height as f64, orientation);
            if let Err(e) = draw(cr, &dots, &state.active, state.hovered, &colors) {
                log::error!("Drawing error: {}", e);
            }
        });

        let click = gtk::GestureClick::new();
        let state_click = state.clone();
        let area_click = area.clone();
        click.connect_released(move |_, _, x, y| {
            // release the borrow before handing control to the caller
            let hit = state_click.borrow().hit(&area_click, x, y);
            if let Some(i) = hit {
                on_click(i);
            }
        });
        area.add_controller(click);

        let motion = gtk::EventControllerMotion::new();
        let state_motion = state.clone();
        let area_motion = area.clone();
        motion.connect_motion(move |_, x, y| {
            let mut state = state_motion.borrow_mut();
            let hovered = state.hit(&area_motion, x, y);
            if hovered != state.hovered {
                state.hovered = hovered;
                area_motion.queue_draw();
            }
        });
        let state_leave = state.clone();
        let area_leave = area.clone();
        motion.connect_leave(move |_| {
            if state_leave.borrow_mut().hovered.take().is_some() {
                area_leave.queue_draw();
            }
        });
        area.add_controller(motion);

        area.set_has_tooltip(true);
        let state_tooltip = state.clone();
        area.connect_query_tooltip(move |area, x, y, _, tooltip| {
            let state = state_tooltip.borrow();
            state
                .hit(area, x as f64, y as f64)
                .and_then(|i| state.labels.get(i))
                .map(|label| tooltip.set_text(Some(label.as_str())))
                .is_some()
        });

        Self { area, state }
    }

    pub fn area(&self) -> &gtk::DrawingArea {
        &self.area
    }

    /// One dot per label, all inactive.
    pub fn reset(&self, labels: Vec<String>) {
        {
            let mut state = self.state.borrow_mut();
            state.active = vec![false; labels.len()];
            state.labels = labels;
            state.hovered = None;
        }
        self.area.queue_draw();
    }

    pub fn set_active(&self, index: usize, active: bool) {
        let changed = self
            .state
            .borrow_mut()
            .active
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, active) != active)
            .unwrap_or(false);
        if changed {
            self.area.queue_draw();
        }
    }
}
