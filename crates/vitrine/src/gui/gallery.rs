//! Photo strip driven by [`CenteredCarousel`]. GTK supplies layout and scroll
//! samples; the carousel decides where to go and which dot is lit.

use crate::config::GalleryConfig;
use crate::gui::dots::DotStrip;
use gdk_pixbuf::Pixbuf;
use gtk::gdk;
use gtk::prelude::*;
use gtk4 as gtk;
use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};
use vitrine_core::{
    CarouselConfig, CarouselError, CenteredCarousel, Indicator, Item, ScrollAction,
    ScrollBehavior, ScrollHost, Step, Viewport,
};

pub const PHOTO_WIDTH: i32 = 640;
pub const PHOTO_HEIGHT: i32 = 420;
pub const SCROLL_DURATION: Duration = Duration::from_millis(350);

type SharedCarousel = Rc<RefCell<Option<CenteredCarousel<GalleryHost>>>>;

#[derive(Debug, Clone, Copy)]
struct Tween {
    from: f64,
    to: f64,
    start: Instant,
}

impl Tween {
    /// Ease-out cubic. Returns the value and whether the tween is finished.
    fn sample(&self, now: Instant) -> (f64, bool) {
        let t = (now.duration_since(self.start).as_secs_f64() / SCROLL_DURATION.as_secs_f64())
            .min(1.0);
        let eased = 1.0 - (1.0 - t).powi(3);
        (self.from + (self.to - self.from) * eased, t >= 1.0)
    }
}

/// Smooth scrolling for an adjustment, stepped from the widget's frame clock.
/// A new target replaces the running tween instead of queueing behind it.
#[derive(Clone)]
struct ScrollAnimator {
    adjustment: gtk::Adjustment,
    widget: gtk::Widget,
    tween: Rc<RefCell<Option<Tween>>>,
}

impl ScrollAnimator {
    fn new(adjustment: gtk::Adjustment, widget: gtk::Widget) -> Self {
        Self {
            adjustment,
            widget,
            tween: Rc::new(RefCell::new(None)),
        }
    }

    fn animate_to(&self, offset: f64) {
        let from = self.adjustment.value();
        if (from - offset).abs() < 0.5 {
            return;
        }

        let running = self
            .tween
            .replace(Some(Tween {
                from,
                to: offset,
                start: Instant::now(),
            }))
            .is_some();
        if running {
            return;
        }

        let tween = self.tween.clone();
        let adjustment = self.adjustment.clone();
        self.widget.add_tick_callback(move |_, _| {
            let Some(current) = *tween.borrow() else {
                return glib::ControlFlow::Break;
            };
            let (value, done) = current.sample(Instant::now());
            if done {
                tween.replace(None);
            }
            adjustment.set_value(value);
            if done {
                glib::ControlFlow::Break
            } else {
                glib::ControlFlow::Continue
            }
        });
    }

    fn jump_to(&self, offset: f64) {
        self.tween.replace(None);
        self.adjustment.set_value(offset);
    }
}

#[derive(Clone)]
pub struct GalleryHost {
    animator: ScrollAnimator,
    dots: DotStrip,
}

impl ScrollHost for GalleryHost {
    fn scroll_to(&mut self, offset: f64, behavior: ScrollBehavior) {
        match behavior {
            ScrollBehavior::Smooth => self.animator.animate_to(offset),
            ScrollBehavior::Instant => self.animator.jump_to(offset),
        }
    }

    fn set_indicator_active(&mut self, index: usize, active: bool) {
        self.dots.set_active(index, active);
    }
}

pub struct Gallery {
    pub root: gtk::Box,
    scroller: gtk::ScrolledWindow,
    carousel: SharedCarousel,
    photos: usize,
    /// Slide requested before the strip got its first allocation.
    pending_slide: Rc<Cell<Option<usize>>>,
}

impl Gallery {
    pub fn new(config: &GalleryConfig) -> Self {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 8);
        root.add_css_class("vitrine-gallery");
        root.set_focusable(true);
        root.set_valign(gtk::Align::Center);

        let strip = gtk::Box::new(gtk::Orientation::Horizontal, 0);
        let scroller = gtk::ScrolledWindow::builder()
            .hscrollbar_policy(gtk::PolicyType::External)
            .vscrollbar_policy(gtk::PolicyType::Never)
            .hexpand(true)
            .child(&strip)
            .build();

        let carousel: SharedCarousel = Rc::new(RefCell::new(None));

        let dots = {
            let carousel = carousel.clone();
            DotStrip::new(gtk::Orientation::Horizontal, move |i| {
                if let Some(c) = carousel.borrow_mut().as_mut() {
                    c.on_indicator_click(i);
                }
            })
        };

        root.append(&scroller);
        root.append(dots.area());

        let gallery = Self {
            root,
            scroller,
            carousel,
            photos: config.photos.len(),
            pending_slide: Rc::new(Cell::new(None)),
        };

        if config.photos.is_empty() {
            log::warn!("Gallery disabled: {}", CarouselError::Empty);
            let placeholder = gtk::Label::new(Some("No photos configured"));
            gallery.scroller.set_child(Some(&placeholder));
            return gallery;
        }

        fill_strip(&strip, &config.photos, config.clones);
        dots.reset(
            Indicator::build_set(config.photos.len())
                .into_iter()
                .map(|i| i.label.to_string())
                .collect(),
        );

        let host = GalleryHost {
            animator: ScrollAnimator::new(
                gallery.scroller.hadjustment(),
                gallery.scroller.clone().upcast(),
            ),
            dots,
        };
        gallery.connect_layout(host, strip, config.photos.len(), config.carousel_config());
        gallery.connect_scroll();
        gallery.connect_keys();
        gallery.block_wheel_propagation();

        gallery
    }

    /// Builds the carousel once GTK has allocated the strip, and re-feeds item
    /// geometry on every later size change.
    fn connect_layout(
        &self,
        host: GalleryHost,
        strip: gtk::Box,
        photos: usize,
        config: CarouselConfig,
    ) {
        let carousel = self.carousel.clone();
        let pending_slide = self.pending_slide.clone();
        self.scroller.hadjustment().connect_changed(move |adjustment| {
            let items = collect_items(&strip, photos, config.clones);
            if adjustment.page_size() <= 0.0 || items.iter().any(|i| i.extent <= 0.0) {
                return;
            }
            let Ok(mut slot) = carousel.try_borrow_mut() else {
                return;
            };

            if let Some(c) = slot.as_mut() {
                if let Err(e) = c.relayout(items, adjustment.page_size()) {
                    log::warn!("Ignoring gallery relayout: {}", e);
                }
                return;
            }

            let viewport = Viewport::new(adjustment.value(), adjustment.page_size());
            let config = start_config(config, &pending_slide);
            match CenteredCarousel::new(host.clone(), items, viewport, config) {
                Ok(c) => *slot = Some(c),
                Err(e) => log::error!("Failed to set up gallery: {}", e),
            }
        });
    }

    fn connect_scroll(&self) {
        let carousel = self.carousel.clone();
        let widget: gtk::Widget = self.scroller.clone().upcast();
        let pending_snap: Rc<RefCell<Option<glib::SourceId>>> = Rc::new(RefCell::new(None));

        self.scroller.hadjustment().connect_value_changed(move |adjustment| {
            // jumps issued by the carousel itself arrive while it is borrowed
            let Ok(mut slot) = carousel.try_borrow_mut() else {
                return;
            };
            let Some(c) = slot.as_mut() else {
                return;
            };
            let action = c.on_scroll(adjustment.value(), Instant::now());
            drop(slot);

            schedule(&carousel, &widget, &pending_snap, action);
        });
    }

    fn connect_keys(&self) {
        let keys = gtk::EventControllerKey::new();
        let carousel = self.carousel.clone();
        keys.connect_key_pressed(move |_, key, _, _| {
            let step = match key {
                gdk::Key::Left => Step::Previous,
                gdk::Key::Right => Step::Next,
                _ => return glib::Propagation::Proceed,
            };
            if let Some(c) = carousel.borrow_mut().as_mut() {
                c.on_key(step);
            }
            glib::Propagation::Stop
        });
        self.root.add_controller(keys);
    }

    /// Wheel input over the photos scrolls the strip, never the panels.
    fn block_wheel_propagation(&self) {
        let wheel = gtk::EventControllerScroll::new(gtk::EventControllerScrollFlags::BOTH_AXES);
        wheel.connect_scroll(|_, _, _| glib::Propagation::Stop);
        self.root.add_controller(wheel);
    }

    /// Centers photo `index` (0-based, clamped or wrapped per config). Before
    /// the first layout the request becomes the starting photo instead.
    pub fn goto(&self, index: usize) {
        if self.photos == 0 {
            log::warn!("Ignoring slide {}: {}", index, CarouselError::Empty);
            return;
        }
        match self.carousel.borrow_mut().as_mut() {
            Some(c) => {
                c.on_indicator_click(index);
            }
            None => {
                log::debug!("Gallery not laid out yet; starting on slide {}", index);
                self.pending_slide.set(Some(index));
            }
        }
    }

    pub fn focus(&self) {
        self.root.grab_focus();
    }
}

fn schedule(
    carousel: &SharedCarousel,
    widget: &gtk::Widget,
    pending_snap: &Rc<RefCell<Option<glib::SourceId>>>,
    action: ScrollAction,
) {
    if action.request_frame {
        let carousel = carousel.clone();
        widget.add_tick_callback(move |_, _| {
            if let Ok(mut slot) = carousel.try_borrow_mut()
                && let Some(c) = slot.as_mut()
            {
                c.on_frame();
            }
            glib::ControlFlow::Break
        });
    }

    // a newer scroll sample cancels the pending snap
    if let Some(source) = pending_snap.borrow_mut().take() {
        source.remove();
    }

    let delay = action
        .snap_deadline
        .saturating_duration_since(Instant::now())
        + Duration::from_millis(1);
    let carousel = carousel.clone();
    let pending = pending_snap.clone();
    let source = glib::timeout_add_local_once(delay, move || {
        pending.borrow_mut().take();
        if let Ok(mut slot) = carousel.try_borrow_mut()
            && let Some(c) = slot.as_mut()
        {
            c.on_idle(Instant::now());
        }
    });
    *pending_snap.borrow_mut() = Some(source);
}

/// The configured start, unless a slide was requested before the carousel
/// existed.
fn start_config(config: CarouselConfig, pending_slide: &Cell<Option<usize>>) -> CarouselConfig {
    CarouselConfig {
        start_index: pending_slide.take().unwrap_or(config.start_index),
        ..config
    }
}

fn fill_strip(strip: &gtk::Box, photos: &[impl AsRef<Path>], clones: bool) {
    let (Some(first), Some(last)) = (photos.first(), photos.last()) else {
        return;
    };

    if clones {
        strip.append(&photo_widget(last.as_ref(), true));
    }
    for photo in photos {
        strip.append(&photo_widget(photo.as_ref(), false));
    }
    if clones {
        strip.append(&photo_widget(first.as_ref(), true));
    }
}

fn photo_widget(path: &Path, clone: bool) -> gtk::Widget {
    let widget: gtk::Widget =
        match Pixbuf::from_file_at_scale(path, PHOTO_WIDTH, PHOTO_HEIGHT, true) {
            Ok(pixbuf) => {
                let texture = gdk::Texture::for_pixbuf(&pixbuf);
                gtk::Picture::builder()
                    .paintable(&texture)
                    .content_fit(gtk::ContentFit::Cover)
                    .build()
                    .upcast()
            }
            Err(e) => {
                if !clone {
                    log::warn!("Failed to load photo {}: {}", path.display(), e);
                }
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                gtk::Label::new(Some(name.as_str())).upcast()
            }
        };

    widget.set_size_request(PHOTO_WIDTH, PHOTO_HEIGHT);
    widget.add_css_class("vitrine-photo");
    if clone {
        widget.add_css_class("clone");
    }
    widget
}

/// Current geometry of the strip's children, in presentation order.
fn collect_items(strip: &gtk::Box, photos: usize, clones: bool) -> Vec<Item> {
    let mut items = Vec::new();
    let mut offset = 0.0;
    let mut child = strip.first_child();

    while let Some(widget) = child {
        let position = items.len();
        let index = if clones {
            (position + photos - 1) % photos
        } else {
            position
        };
        let extent = widget.width() as f64;
        items.push(Item::new(index, offset, extent));
        offset += extent + strip.spacing() as f64;
        child = widget.next_sibling();
    }
    items
}
