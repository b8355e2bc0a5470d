use derive_more::{AsRef, Deref, Display, From, Into};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Deref, From, Into, AsRef)]
pub struct IndicatorLabel(String);

impl_string_newtype!(IndicatorLabel);

/// One dot per real item. Only the carousel flips `active`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indicator {
    pub index: usize,
    pub label: IndicatorLabel,
    active: bool,
}

impl Indicator {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            label: IndicatorLabel::new(format!("Go to slide {}", index + 1)),
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn build_set(count: usize) -> Vec<Self> {
        (0..count).map(Self::new).collect()
    }
}
