use std::collections::HashMap;

use gpui::{Bounds, Pixels, Point, SharedString};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct RowKey {
    pub canvas_id: SharedString,
    pub element_id: SharedString,
}

impl RowKey {
    pub(crate) fn new(
        canvas_id: impl Into<SharedString>,
        element_id: impl Into<SharedString>,
    ) -> Self {
        Self {
            canvas_id: canvas_id.into(),
            element_id: element_id.into(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct RowBounds {
    depth: usize,
    bounds: Bounds<Pixels>,
}

/// Last known bounds of every canvas row seen during the current drag.
///
/// Rows are nested, so a pointer over a child row is also inside all of its
/// ancestors. Only the deepest row under the pointer classifies the drag.
#[derive(Default)]
pub(crate) struct RowHitboxes {
    rows: HashMap<RowKey, RowBounds>,
    hovered: Option<RowKey>,
}

impl RowHitboxes {
    pub(crate) fn record(&mut self, key: RowKey, depth: usize, bounds: Bounds<Pixels>) {
        self.rows.insert(key, RowBounds { depth, bounds });
    }

    pub(crate) fn innermost(&self, position: Point<Pixels>) -> Option<&RowKey> {
        self.rows
            .iter()
            .filter(|(_, row)| row.bounds.contains(&position))
            .max_by_key(|(_, row)| row.depth)
            .map(|(key, _)| key)
    }

    pub(crate) fn hovered(&self) -> Option<&RowKey> {
        self.hovered.as_ref()
    }

    /// Returns the previously hovered row when it differs from `key`.
    pub(crate) fn set_hovered(&mut self, key: Option<RowKey>) -> Option<RowKey> {
        if self.hovered == key {
            return None;
        }
        std::mem::replace(&mut self.hovered, key)
    }

    pub(crate) fn clear(&mut self) {
        self.rows.clear();
        self.hovered = None;
    }
}

pub(crate) fn form_point(point: Point<Pixels>) -> gpui_form_core::Point {
    gpui_form_core::Point::new(f32::from(point.x), f32::from(point.y))
}

pub(crate) fn form_bounds(bounds: Bounds<Pixels>) -> gpui_form_core::Bounds {
    gpui_form_core::Bounds::new(
        f32::from(bounds.origin.x),
        f32::from(bounds.origin.y),
        f32::from(bounds.size.width),
        f32::from(bounds.size.height),
    )
}

#[cfg(test)]
mod tests {
    use gpui::{point, px, size};

    use super::*;

    fn rect(x: f32, y: f32, w: f32, h: f32) -> Bounds<Pixels> {
        Bounds::new(point(px(x), px(y)), size(px(w), px(h)))
    }

    #[test]
    fn innermost_row_wins() {
        let mut rows = RowHitboxes::default();
        rows.record(RowKey::new("form", "section"), 0, rect(0., 0., 300., 200.));
        rows.record(RowKey::new("form", "title"), 1, rect(10., 30., 280., 40.));
        rows.record(RowKey::new("form", "footer"), 0, rect(0., 200., 300., 40.));

        assert_eq!(
            rows.innermost(point(px(20.), px(50.))),
            Some(&RowKey::new("form", "title"))
        );
        assert_eq!(
            rows.innermost(point(px(20.), px(150.))),
            Some(&RowKey::new("form", "section"))
        );
        assert_eq!(rows.innermost(point(px(500.), px(50.))), None);
    }

    #[test]
    fn set_hovered_reports_previous_row_once() {
        let mut rows = RowHitboxes::default();
        assert_eq!(rows.set_hovered(Some(RowKey::new("form", "a"))), None);
        assert_eq!(rows.set_hovered(Some(RowKey::new("form", "a"))), None);
        assert_eq!(
            rows.set_hovered(Some(RowKey::new("form", "b"))),
            Some(RowKey::new("form", "a"))
        );
        rows.clear();
        assert_eq!(rows.hovered(), None);
    }

    #[test]
    fn converts_pixels_to_form_geometry() {
        let bounds = form_bounds(rect(1., 2., 3., 4.));
        assert_eq!(bounds, gpui_form_core::Bounds::new(1., 2., 3., 4.));
        assert_eq!(
            form_point(point(px(5.), px(6.))),
            gpui_form_core::Point::new(5., 6.)
        );
    }
}
