//! A scrollable strip of items where exactly one item counts as centered.
//!
//! The carousel never touches a widget directly. Layout comes in as [`Item`]s
//! and [`Viewport`] samples, and every visible effect goes out through a
//! [`ScrollHost`]. Smooth scrolls are fire-and-forget: their progress is only
//! observed through later [`CenteredCarousel::on_scroll`] calls.

use crate::geometry::{self, Item, Viewport};
use crate::indicator::Indicator;
use crate::pacing::{FrameGate, IdleTimer};
use serde::Serialize;
use serde_with::DeserializeFromStr;
use std::time::{Duration, Instant};
use strum::{Display as StrumDisplay, EnumString};
use thiserror::Error;

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(120);

/// What happens to an index that falls off either end of the strip.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    DeserializeFromStr,
    EnumString,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum WrapMode {
    #[default]
    #[strum(to_string = "clamp", serialize = "finite", serialize = "linear")]
    Clamp,
    #[strum(to_string = "wrap", serialize = "loop", serialize = "circular")]
    Wrap,
}

impl WrapMode {
    pub fn normalize(&self, index: isize, len: usize) -> usize {
        let len = len as isize;
        match self {
            Self::Clamp => index.clamp(0, len - 1) as usize,
            Self::Wrap => index.rem_euclid(len) as usize,
        }
    }

    /// [`normalize`](Self::normalize) for indices that can only overshoot
    /// the end, such as dot clicks and socket requests.
    pub fn normalize_from_start(&self, index: usize, len: usize) -> usize {
        match self {
            Self::Clamp => index.min(len - 1),
            Self::Wrap => index % len,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, StrumDisplay)]
#[strum(ascii_case_insensitive)]
pub enum Step {
    #[strum(to_string = "next", serialize = "right")]
    Next,
    #[strum(to_string = "previous", serialize = "prev", serialize = "left")]
    Previous,
}

impl Step {
    pub fn delta(&self) -> isize {
        match self {
            Self::Next => 1,
            Self::Previous => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarouselConfig {
    pub wrap: WrapMode,
    /// The laid-out items include a copy of the last item before the first
    /// and a copy of the first item after the last.
    pub clones: bool,
    pub start_index: usize,
    pub quiet_period: Duration,
    /// Refresh indicators once per frame instead of on every scroll sample.
    pub frame_coalescing: bool,
}

impl CarouselConfig {
    pub fn linear() -> Self {
        Self {
            wrap: WrapMode::Clamp,
            clones: false,
            start_index: 0,
            quiet_period: DEFAULT_QUIET_PERIOD,
            frame_coalescing: true,
        }
    }

    pub fn circular() -> Self {
        Self {
            wrap: WrapMode::Wrap,
            clones: true,
            ..Self::linear()
        }
    }
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self::linear()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CarouselError {
    #[error("Carousel needs at least one item")]
    Empty,
    #[error("Boundary clones need at least three laid-out items, got {0}")]
    CloneLayout(usize),
    #[error("Relayout must keep {expected} items, got {actual}")]
    ItemCountChanged { expected: usize, actual: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// The rendering side of a carousel.
pub trait ScrollHost {
    /// Starts a scroll of the viewport to `offset`. Must not call back into
    /// the carousel synchronously.
    fn scroll_to(&mut self, offset: f64, behavior: ScrollBehavior);

    fn set_indicator_active(&mut self, index: usize, active: bool);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollTarget {
    pub index: usize,
    pub offset: f64,
}

/// Scheduling work the host owes the carousel after a scroll sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollAction {
    /// Call [`CenteredCarousel::on_frame`] on the next frame.
    pub request_frame: bool,
    /// Call [`CenteredCarousel::on_idle`] at (or after) this instant.
    pub snap_deadline: Instant,
}

pub struct CenteredCarousel<H: ScrollHost> {
    host: H,
    config: CarouselConfig,
    items: Vec<Item>,
    viewport: Viewport,
    indicators: Vec<Indicator>,
    frame_gate: FrameGate,
    idle: IdleTimer,
}

impl<H: ScrollHost> CenteredCarousel<H> {
    /// Builds the indicator set and jumps straight to `config.start_index`.
    /// `items` is the full presentation sequence, clones included.
    pub fn new(
        host: H,
        items: Vec<Item>,
        viewport: Viewport,
        config: CarouselConfig,
    ) -> Result<Self, CarouselError> {
        let len = Self::real_len(&items, config.clones)?;

        let mut carousel = Self {
            host,
            config,
            items,
            viewport,
            indicators: Indicator::build_set(len),
            frame_gate: FrameGate::new(),
            idle: IdleTimer::new(config.quiet_period),
        };

        let start_index = carousel.normalize_from_start(config.start_index);
        let start = carousel.jump_to(start_index);
        carousel.apply_indicators(start.index);

        Ok(carousel)
    }

    fn real_len(items: &[Item], clones: bool) -> Result<usize, CarouselError> {
        match (items.len(), clones) {
            (0, _) => Err(CarouselError::Empty),
            (n, true) if n < 3 => Err(CarouselError::CloneLayout(n)),
            (n, true) => Ok(n - 2),
            (n, false) => Ok(n),
        }
    }

    fn lead(&self) -> usize {
        usize::from(self.config.clones)
    }

    /// Items that take part in centering, clones excluded.
    fn real_items(&self) -> &[Item] {
        let lead = self.lead();
        &self.items[lead..lead + self.len()]
    }

    fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn centered_index(&self) -> usize {
        geometry::centered_index(self.real_items(), self.viewport).unwrap_or(0)
    }

    fn normalize(&self, index: isize) -> usize {
        self.config.wrap.normalize(index, self.len())
    }

    fn normalize_from_start(&self, index: usize) -> usize {
        self.config.wrap.normalize_from_start(index, self.len())
    }

    /// Where `scroll_to_index(index)` would go, without going there.
    pub fn target_for(&self, index: isize) -> ScrollTarget {
        let index = self.normalize(index);
        let item = &self.real_items()[index];
        ScrollTarget {
            index,
            offset: geometry::centering_offset(item, self.viewport.extent),
        }
    }

    pub fn scroll_to_index(&mut self, index: isize) -> ScrollTarget {
        let target = self.target_for(index);
        log::debug!(
            "carousel: scroll {} -> item {} at {}",
            index,
            target.index,
            target.offset
        );
        self.host.scroll_to(target.offset, ScrollBehavior::Smooth);
        target
    }

    /// Instant jump. The host applies it synchronously, so the position is
    /// known without waiting for a scroll sample.
    fn jump_to(&mut self, index: usize) -> ScrollTarget {
        let target = self.target_for(index as isize);
        self.host.scroll_to(target.offset, ScrollBehavior::Instant);
        self.viewport.position = target.offset;
        target
    }

    /// Feeds a scroll position sample from the host.
    pub fn on_scroll(&mut self, position: f64, now: Instant) -> ScrollAction {
        self.viewport.position = position;

        let request_frame = if self.config.frame_coalescing {
            self.frame_gate.request()
        } else {
            self.refresh_indicators();
            false
        };

        ScrollAction {
            request_frame,
            snap_deadline: self.idle.reset(now),
        }
    }

    /// Frame callback requested by [`ScrollAction::request_frame`]. Returns
    /// whether indicators were refreshed.
    pub fn on_frame(&mut self) -> bool {
        let pending = self.frame_gate.take();
        if pending {
            self.refresh_indicators();
        }
        pending
    }

    /// Idle callback scheduled for [`ScrollAction::snap_deadline`]. Snaps onto
    /// the centered item if no scroll sample arrived in the meantime.
    pub fn on_idle(&mut self, now: Instant) -> Option<ScrollTarget> {
        if !self.idle.fire(now) {
            return None;
        }
        let centered = self.centered_index();
        log::debug!("carousel: scroll settled, snapping to {}", centered);
        let target = self.scroll_to_index(centered as isize);
        self.refresh_indicators();
        Some(target)
    }

    pub fn on_indicator_click(&mut self, index: usize) -> ScrollTarget {
        let index = self.normalize_from_start(index);
        self.scroll_to_index(index as isize)
    }

    pub fn on_key(&mut self, step: Step) -> ScrollTarget {
        let from = self.centered_index() as isize;
        self.scroll_to_index(from + step.delta())
    }

    pub fn refresh_indicators(&mut self) {
        let centered = self.centered_index();
        self.apply_indicators(centered);
    }

    fn apply_indicators(&mut self, active_index: usize) {
        for indicator in &mut self.indicators {
            let active = indicator.index == active_index;
            indicator.set_active(active);
            self.host.set_indicator_active(indicator.index, active);
        }
    }

    /// Replaces item geometry after the host re-laid the strip out (e.g. on
    /// resize) and jumps back onto the item that was centered before. The
    /// item count must stay the same.
    pub fn relayout(
        &mut self,
        items: Vec<Item>,
        viewport_extent: f64,
    ) -> Result<ScrollTarget, CarouselError> {
        let len = Self::real_len(&items, self.config.clones)?;
        if len != self.len() {
            return Err(CarouselError::ItemCountChanged {
                expected: self.len(),
                actual: len,
            });
        }
        let centered = self.centered_index();
        self.items = items;
        self.viewport.extent = viewport_extent;
        Ok(self.jump_to(centered))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingHost {
        requests: Vec<(f64, ScrollBehavior)>,
        dots: Vec<bool>,
    }

    impl RecordingHost {
        fn last_offset(&self) -> Option<f64> {
            self.requests.last().map(|(offset, _)| *offset)
        }

        fn active_dots(&self) -> Vec<usize> {
            self.dots
                .iter()
                .enumerate()
                .filter_map(|(i, &active)| active.then_some(i))
                .collect()
        }
    }

    impl ScrollHost for RecordingHost {
        fn scroll_to(&mut self, offset: f64, behavior: ScrollBehavior) {
            self.requests.push((offset, behavior));
        }

        fn set_indicator_active(&mut self, index: usize, active: bool) {
            if self.dots.len() <= index {
                self.dots.resize(index + 1, false);
            }
            self.dots[index] = active;
        }
    }

    fn five_items(config: CarouselConfig) -> CenteredCarousel<RecordingHost> {
        CenteredCarousel::new(
            RecordingHost::default(),
            Item::contiguous(5, 300.0),
            Viewport::new(0.0, 300.0),
            config,
        )
        .unwrap()
    }

    /// Five 300-wide photos with a clone at each end, as the host lays them out.
    fn five_items_with_clones() -> Vec<Item> {
        let mut items = vec![Item::new(4, 0.0, 300.0)];
        items.extend((0..5).map(|i| Item::new(i, (i + 1) as f64 * 300.0, 300.0)));
        items.push(Item::new(0, 1800.0, 300.0));
        items
    }

    fn settle(carousel: &mut CenteredCarousel<RecordingHost>) {
        let offset = carousel.host.last_offset().unwrap();
        carousel.on_scroll(offset, Instant::now());
        carousel.on_frame();
    }

    #[test]
    fn test_initialize_rejects_empty() {
        let result = CenteredCarousel::new(
            RecordingHost::default(),
            Vec::new(),
            Viewport::new(0.0, 300.0),
            CarouselConfig::linear(),
        );
        assert_eq!(result.err(), Some(CarouselError::Empty));
    }

    #[test]
    fn test_initialize_rejects_short_clone_layout() {
        let result = CenteredCarousel::new(
            RecordingHost::default(),
            Item::contiguous(2, 300.0),
            Viewport::new(0.0, 300.0),
            CarouselConfig::circular(),
        );
        assert_eq!(result.err(), Some(CarouselError::CloneLayout(2)));
    }

    #[test]
    fn test_initialize_jumps_to_start_and_marks_indicator() {
        let carousel = five_items(CarouselConfig::linear());

        assert_eq!(carousel.host.requests, vec![(0.0, ScrollBehavior::Instant)]);
        assert_eq!(carousel.host.active_dots(), vec![0]);
        assert_eq!(carousel.indicators.len(), 5);
        assert!(carousel.indicators[0].is_active());
        assert_eq!(carousel.centered_index(), 0);
    }

    #[test]
    fn test_initialize_with_clones_starts_on_first_real_item() {
        let carousel = CenteredCarousel::new(
            RecordingHost::default(),
            five_items_with_clones(),
            Viewport::new(0.0, 300.0),
            CarouselConfig::circular(),
        )
        .unwrap();

        assert_eq!(carousel.len(), 5);
        assert_eq!(carousel.host.last_offset(), Some(300.0));
        assert_eq!(carousel.centered_index(), 0);
        assert_eq!(carousel.host.active_dots(), vec![0]);
    }

    #[test]
    fn test_initialize_honours_start_index() {
        let mut config = CarouselConfig::linear();
        config.start_index = 3;
        let carousel = five_items(config);

        assert_eq!(carousel.target_for(3).offset, 900.0);
        assert_eq!(carousel.host.requests, vec![(900.0, ScrollBehavior::Instant)]);
        assert_eq!(carousel.host.active_dots(), vec![3]);
        assert!(carousel.indicators[3].is_active());
        assert_eq!(carousel.centered_index(), 3);

        config.start_index = usize::MAX;
        assert_eq!(five_items(config).centered_index(), 4);
    }

    #[test]
    fn test_scroll_then_settle_centers_every_index() {
        for config in [CarouselConfig::linear(), CarouselConfig::circular()] {
            let mut carousel = if config.clones {
                CenteredCarousel::new(
                    RecordingHost::default(),
                    five_items_with_clones(),
                    Viewport::new(0.0, 300.0),
                    config,
                )
                .unwrap()
            } else {
                five_items(config)
            };

            for i in 0..5 {
                carousel.scroll_to_index(i);
                settle(&mut carousel);
                assert_eq!(carousel.centered_index(), i as usize);
                assert_eq!(carousel.host.active_dots(), vec![i as usize]);
            }
        }
    }

    #[test]
    fn test_centered_index_is_idempotent() {
        let mut carousel = five_items(CarouselConfig::linear());
        carousel.on_scroll(470.0, Instant::now());
        let first = carousel.centered_index();
        assert_eq!(carousel.centered_index(), first);
        assert_eq!(first, 2);
    }

    #[test]
    fn test_clamp_law() {
        let carousel = five_items(CarouselConfig::linear());
        assert_eq!(carousel.target_for(-1), carousel.target_for(0));
        assert_eq!(carousel.target_for(5), carousel.target_for(4));
        assert_eq!(carousel.target_for(-100), carousel.target_for(0));
    }

    #[test]
    fn test_huge_indicator_index_is_clamped() {
        let mut carousel = five_items(CarouselConfig::linear());
        assert_eq!(carousel.on_indicator_click(usize::MAX).index, 4);
        assert_eq!(carousel.on_indicator_click(1 << 63).index, 4);
        assert_eq!(carousel.on_indicator_click(7).index, 4);
    }

    #[test]
    fn test_huge_indicator_index_wraps_unsigned() {
        let mut config = CarouselConfig::linear();
        config.wrap = WrapMode::Wrap;
        let mut carousel = five_items(config);

        assert_eq!(carousel.on_indicator_click(usize::MAX).index, usize::MAX % 5);
        assert_eq!(carousel.on_indicator_click(1 << 63).index, (1usize << 63) % 5);
        assert_eq!(carousel.on_indicator_click(7).index, 2);
    }

    #[test]
    fn test_wrap_law() {
        let mut config = CarouselConfig::linear();
        config.wrap = WrapMode::Wrap;
        let carousel = five_items(config);
        assert_eq!(carousel.target_for(-1), carousel.target_for(4));
        assert_eq!(carousel.target_for(5), carousel.target_for(0));
        assert_eq!(carousel.target_for(-6), carousel.target_for(4));
    }

    #[test]
    fn test_refresh_leaves_exactly_one_active() {
        let mut carousel = five_items(CarouselConfig::linear());
        for position in [0.0, 80.0, 310.0, 899.0, 1200.0] {
            carousel.on_scroll(position, Instant::now());
            carousel.refresh_indicators();

            let active: Vec<_> = carousel
                .indicators
                .iter()
                .filter(|i| i.is_active())
                .map(|i| i.index)
                .collect();
            assert_eq!(active, vec![carousel.centered_index()]);
            assert_eq!(carousel.host.active_dots(), active);
        }
    }

    #[test]
    fn test_frame_coalescing() {
        let mut carousel = five_items(CarouselConfig::linear());
        let now = Instant::now();

        assert!(carousel.on_scroll(100.0, now).request_frame);
        assert!(!carousel.on_scroll(200.0, now).request_frame);
        assert!(!carousel.on_scroll(600.0, now).request_frame);
        // indicators still show the start until the frame runs
        assert_eq!(carousel.host.active_dots(), vec![0]);

        assert!(carousel.on_frame());
        assert_eq!(carousel.host.active_dots(), vec![2]);
        assert!(!carousel.on_frame());
    }

    #[test]
    fn test_without_frame_coalescing_refreshes_immediately() {
        let mut config = CarouselConfig::linear();
        config.frame_coalescing = false;
        let mut carousel = five_items(config);

        let action = carousel.on_scroll(900.0, Instant::now());
        assert!(!action.request_frame);
        assert_eq!(carousel.host.active_dots(), vec![3]);
    }

    #[test]
    fn test_idle_snap_converges_after_quiet_period() {
        let mut carousel = five_items(CarouselConfig::linear());
        let start = Instant::now();
        let ms = Duration::from_millis;

        carousel.on_scroll(120.0, start);
        carousel.on_scroll(250.0, start + ms(30));
        let action = carousel.on_scroll(380.0, start + ms(60));
        assert_eq!(action.snap_deadline, start + ms(180));

        // a wakeup for the first, superseded deadline does nothing
        assert_eq!(carousel.on_idle(start + ms(120)), None);

        let expected = carousel.target_for(carousel.centered_index() as isize);
        let snapped = carousel.on_idle(start + ms(180)).unwrap();
        assert_eq!(snapped, expected);
        assert_eq!(snapped, ScrollTarget { index: 1, offset: 300.0 });
        assert_eq!(
            carousel.host.requests.last(),
            Some(&(300.0, ScrollBehavior::Smooth))
        );
        assert_eq!(carousel.host.active_dots(), vec![1]);

        // fires once per gesture
        assert_eq!(carousel.on_idle(start + ms(500)), None);
    }

    #[test]
    fn test_indicator_click_does_not_toggle_dots() {
        let mut carousel = five_items(CarouselConfig::linear());
        let target = carousel.on_indicator_click(3);

        assert_eq!(target, ScrollTarget { index: 3, offset: 900.0 });
        assert_eq!(carousel.host.active_dots(), vec![0]);

        settle(&mut carousel);
        assert_eq!(carousel.host.active_dots(), vec![3]);
    }

    #[test]
    fn test_keys_step_and_clamp() {
        let mut carousel = five_items(CarouselConfig::linear());
        assert_eq!(carousel.centered_index(), 0);

        let first = carousel.on_key(Step::Next);
        assert_eq!(first, ScrollTarget { index: 1, offset: 300.0 });
        settle(&mut carousel);

        let mut visited = Vec::new();
        for _ in 0..4 {
            visited.push(carousel.on_key(Step::Next).index);
            settle(&mut carousel);
        }
        assert_eq!(visited, vec![2, 3, 4, 4]);

        assert_eq!(carousel.on_key(Step::Previous).index, 3);
    }

    #[test]
    fn test_keys_wrap_in_circular_config() {
        let mut carousel = CenteredCarousel::new(
            RecordingHost::default(),
            five_items_with_clones(),
            Viewport::new(0.0, 300.0),
            CarouselConfig::circular(),
        )
        .unwrap();

        carousel.scroll_to_index(4);
        settle(&mut carousel);
        assert_eq!(carousel.centered_index(), 4);

        let target = carousel.on_key(Step::Next);
        assert_eq!(target, ScrollTarget { index: 0, offset: 300.0 });
        settle(&mut carousel);

        assert_eq!(carousel.on_key(Step::Previous).index, 4);
    }

    #[test]
    fn test_clones_never_win_centering() {
        let mut carousel = CenteredCarousel::new(
            RecordingHost::default(),
            five_items_with_clones(),
            Viewport::new(0.0, 300.0),
            CarouselConfig::circular(),
        )
        .unwrap();

        // viewport sits exactly on the leading clone of item 4
        carousel.on_scroll(0.0, Instant::now());
        assert_eq!(carousel.centered_index(), 0);

        // and on the trailing clone of item 0
        carousel.on_scroll(1800.0, Instant::now());
        assert_eq!(carousel.centered_index(), 4);
    }

    #[test]
    fn test_relayout_keeps_count_and_recenters() {
        let mut carousel = five_items(CarouselConfig::linear());
        carousel.on_scroll(600.0, Instant::now());
        assert_eq!(carousel.centered_index(), 2);

        let target = carousel.relayout(Item::contiguous(5, 500.0), 500.0).unwrap();
        assert_eq!(target, ScrollTarget { index: 2, offset: 1000.0 });
        assert_eq!(
            carousel.host.requests.last(),
            Some(&(1000.0, ScrollBehavior::Instant))
        );
        assert_eq!(carousel.centered_index(), 2);

        assert_eq!(
            carousel.relayout(Item::contiguous(4, 500.0), 500.0),
            Err(CarouselError::ItemCountChanged {
                expected: 5,
                actual: 4
            })
        );
    }

    #[test]
    fn test_wrap_mode_parsing() {
        let cases = vec![
            ("\"clamp\"", WrapMode::Clamp),
            ("\"Linear\"", WrapMode::Clamp),
            ("\"wrap\"", WrapMode::Wrap),
            ("\"LOOP\"", WrapMode::Wrap),
            ("\"circular\"", WrapMode::Wrap),
        ];

        for (json, expected) in cases {
            let deserialized: WrapMode = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized, expected);
        }
        assert_eq!(WrapMode::Wrap.to_string(), "wrap");
    }
}
