use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

/// On-screen bounding box of an item, as reported by the host renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub origin: Point,
    pub size: Size,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size { width, height },
        }
    }

    /// Whether `point` lies within the bounds along `axis`, edges included.
    ///
    /// The other axis is not checked.
    pub fn contains_on(&self, axis: Axis, point: Point) -> bool {
        let start = axis.start(self);
        let coord = axis.coordinate(point);
        coord >= start && coord <= start + axis.extent(self)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Horizontal,
    #[default]
    Vertical,
}

impl Axis {
    pub fn from_allow_horizontal(allow_horizontal: bool) -> Self {
        if allow_horizontal {
            Axis::Horizontal
        } else {
            Axis::Vertical
        }
    }

    #[inline]
    fn coordinate(self, point: Point) -> f32 {
        match self {
            Axis::Horizontal => point.x,
            Axis::Vertical => point.y,
        }
    }

    #[inline]
    fn start(self, bounds: &Bounds) -> f32 {
        match self {
            Axis::Horizontal => bounds.origin.x,
            Axis::Vertical => bounds.origin.y,
        }
    }

    #[inline]
    fn extent(self, bounds: &Bounds) -> f32 {
        match self {
            Axis::Horizontal => bounds.size.width,
            Axis::Vertical => bounds.size.height,
        }
    }
}

/// Which half of a hovered item the pointer is in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropSide {
    Before,
    After,
}

impl DropSide {
    /// Insertion index in the hovered item's dropzone.
    pub fn insertion_index(self, target_ix: usize) -> usize {
        match self {
            DropSide::Before => target_ix,
            DropSide::After => target_ix.saturating_add(1),
        }
    }
}

/// Per-item drop indicator; the renderer decides how it looks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InsertionMarker {
    #[default]
    None,
    Before,
    After,
}

impl From<DropSide> for InsertionMarker {
    fn from(side: DropSide) -> Self {
        match side {
            DropSide::Before => InsertionMarker::Before,
            DropSide::After => InsertionMarker::After,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub side: DropSide,
    pub index: usize,
}

/// Classify `pointer` against the midpoint of `bounds` along `axis`.
///
/// Strictly before the midpoint is [`DropSide::Before`]; the midpoint itself and
/// everything past it is [`DropSide::After`]. Callers are expected to check
/// [`Bounds::contains_on`] first.
pub fn classify(pointer: Point, bounds: Bounds, axis: Axis) -> DropSide {
    let mid = axis.start(&bounds) + axis.extent(&bounds) / 2.0;
    if axis.coordinate(pointer) < mid {
        DropSide::Before
    } else {
        DropSide::After
    }
}

/// Resolve the insertion index for a drag hovering the item at `target_ix`.
///
/// Returns `None` without classifying when the dropzone has no space left or the
/// pointer is outside `bounds` on the relevant axis.
pub fn resolve(
    pointer: Point,
    bounds: Bounds,
    axis: Axis,
    space_available: bool,
    target_ix: usize,
) -> Option<Resolution> {
    if !space_available || !bounds.contains_on(axis, pointer) {
        return None;
    }

    let side = classify(pointer, bounds, axis);
    Some(Resolution {
        side,
        index: side.insertion_index(target_ix),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_midpoint_is_after() {
        let bounds = Bounds::new(0., 100., 50., 40.);
        assert_eq!(
            classify(Point::new(10., 119.9), bounds, Axis::Vertical),
            DropSide::Before
        );
        assert_eq!(
            classify(Point::new(10., 120.), bounds, Axis::Vertical),
            DropSide::After
        );
        assert_eq!(
            classify(Point::new(10., 140.), bounds, Axis::Vertical),
            DropSide::After
        );
    }

    #[test]
    fn horizontal_uses_width() {
        let bounds = Bounds::new(200., 0., 100., 10.);
        assert_eq!(
            classify(Point::new(249., 500.), bounds, Axis::Horizontal),
            DropSide::Before
        );
        assert_eq!(
            classify(Point::new(250., -3.), bounds, Axis::Horizontal),
            DropSide::After
        );
    }

    #[test]
    fn resolve_maps_side_to_index() {
        let bounds = Bounds::new(0., 100., 300., 40.);
        let before = resolve(Point::new(5., 110.), bounds, Axis::Vertical, true, 3).unwrap();
        assert_eq!(before.side, DropSide::Before);
        assert_eq!(before.index, 3);

        let after = resolve(Point::new(5., 135.), bounds, Axis::Vertical, true, 3).unwrap();
        assert_eq!(after.side, DropSide::After);
        assert_eq!(after.index, 4);
    }

    #[test]
    fn resolve_includes_edges() {
        let bounds = Bounds::new(0., 100., 300., 40.);
        assert!(resolve(Point::new(0., 100.), bounds, Axis::Vertical, true, 0).is_some());
        assert!(resolve(Point::new(0., 140.), bounds, Axis::Vertical, true, 0).is_some());
    }

    #[test]
    fn resolve_ignores_pointer_outside_axis() {
        let bounds = Bounds::new(0., 100., 300., 40.);
        assert_eq!(
            resolve(Point::new(5., 99.), bounds, Axis::Vertical, true, 0),
            None
        );
        assert_eq!(
            resolve(Point::new(5., 141.), bounds, Axis::Vertical, true, 0),
            None
        );
        // Only the configured axis is checked.
        assert!(resolve(Point::new(-50., 120.), bounds, Axis::Vertical, true, 0).is_some());
    }

    #[test]
    fn resolve_skipped_without_space() {
        let bounds = Bounds::new(0., 0., 100., 100.);
        for y in [0., 10., 49.9, 50., 99., 100.] {
            assert_eq!(
                resolve(Point::new(10., y), bounds, Axis::Vertical, false, 2),
                None
            );
        }
    }
}
