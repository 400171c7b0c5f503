//! Application contract and area layouts.

use super::area::AreaHandle;
use super::shell::Shell;
use std::fmt;
use std::rc::Rc;

/// Opaque handle of one running application, minted by the instance registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub(crate) u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "instance#{}", self.0)
    }
}

pub type AppHandle = Rc<dyn Application>;

pub trait Application {
    /// Name used in logs and messages
    fn name(&self) -> String;

    /// Initialise; `Ok(false)` or an error aborts the launch
    fn on_launch(&self, shell: &mut Shell, instance: InstanceId) -> anyhow::Result<bool>;

    /// Areas to show while the application is in the foreground
    fn areas_to_show(&self) -> anyhow::Result<Option<AreaLayout>>;

    /// Called once the shell has agreed to close the application
    fn on_close(&self, _shell: &mut Shell) {}
}

/// Screen arrangement of an application's areas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    Single,
    LeftRight,
    TopBottom,
    LeftTopBottom,
    LeftRightBottom,
}

impl LayoutKind {
    pub fn area_count(self) -> usize {
        match self {
            LayoutKind::Single => 1,
            LayoutKind::LeftRight | LayoutKind::TopBottom => 2,
            LayoutKind::LeftTopBottom | LayoutKind::LeftRightBottom => 3,
        }
    }
}

/// Ordered areas plus the one focused on launch
#[derive(Clone)]
pub struct AreaLayout {
    pub kind: LayoutKind,
    pub areas: Vec<AreaHandle>,
    pub default_area: usize,
}

impl AreaLayout {
    pub fn single(area: AreaHandle) -> Self {
        Self {
            kind: LayoutKind::Single,
            areas: vec![area],
            default_area: 0,
        }
    }

    pub fn new(kind: LayoutKind, areas: Vec<AreaHandle>, default_area: usize) -> Self {
        Self {
            kind,
            areas,
            default_area,
        }
    }

    /// Area count matches the kind and the default area exists
    pub fn is_valid(&self) -> bool {
        !self.areas.is_empty()
            && self.areas.len() == self.kind.area_count()
            && self.default_area < self.areas.len()
    }

    pub fn default_area(&self) -> Option<&AreaHandle> {
        self.areas.get(self.default_area)
    }

    pub fn position_of(&self, area: &dyn super::area::Area) -> Option<usize> {
        let id = area.area_id();
        self.areas.iter().position(|a| a.area_id() == id)
    }
}

impl fmt::Debug for AreaLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AreaLayout")
            .field("kind", &self.kind)
            .field("areas", &self.areas.iter().map(|a| a.area_id()).collect::<Vec<_>>())
            .field("default_area", &self.default_area)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::area::AreaHandle;
    use crate::core::testing::TestArea;

    #[test]
    fn test_layout_validation() {
        let a: AreaHandle = TestArea::new("a");
        let b: AreaHandle = TestArea::new("b");
        assert!(AreaLayout::single(a.clone()).is_valid());
        assert!(AreaLayout::new(LayoutKind::LeftRight, vec![a.clone(), b.clone()], 1).is_valid());
        // wrong count for kind
        assert!(!AreaLayout::new(LayoutKind::LeftRight, vec![a.clone()], 0).is_valid());
        // default out of range
        assert!(!AreaLayout::new(LayoutKind::Single, vec![a.clone()], 1).is_valid());
        assert!(!AreaLayout::new(LayoutKind::Single, vec![], 0).is_valid());
    }

    #[test]
    fn test_position_of() {
        let a: AreaHandle = TestArea::new("a");
        let b: AreaHandle = TestArea::new("b");
        let c: AreaHandle = TestArea::new("c");
        let layout = AreaLayout::new(LayoutKind::LeftRight, vec![a.clone(), b.clone()], 0);
        assert_eq!(layout.position_of(&*b), Some(1));
        assert_eq!(layout.position_of(&*c), None);
    }
}
