use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct SelectLimit(i64);

impl SelectLimit {
    pub const MAX: i64 = 100;

    pub fn new(value: impl Into<i64>) -> Self {
        SelectLimit(value.into().clamp(1, Self::MAX))
    }
}

impl Default for SelectLimit {
    fn default() -> Self {
        Self::new(30)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct SelectOffset(i64);

impl SelectOffset {
    pub fn new(value: impl Into<i64>) -> Self {
        SelectOffset(value.into().max(0))
    }
}

#[cfg(test)]
mod test {
    use super::{SelectLimit, SelectOffset};

    #[test]
    fn limit_is_clamped() {
        assert_eq!(*SelectLimit::new(0).as_ref(), 1);
        assert_eq!(*SelectLimit::new(1000).as_ref(), SelectLimit::MAX);
        assert_eq!(*SelectOffset::new(-5).as_ref(), 0);
    }
}
