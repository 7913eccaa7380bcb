use crate::geometry::{self, Aabb};
use crate::{Attachment, BoundingBoxAttachmentData, Skeleton};
use std::cell::Cell;
use std::sync::Arc;

/// World-space bounding polygons of the bounding box attachments a skeleton currently shows,
/// and the box enclosing them.
///
/// Point and segment queries reject anything outside the box before testing polygons, and
/// report the first polygon that matches in slot order.
#[derive(Debug, Default)]
pub struct SkeletonBounds {
    attachments: Vec<Arc<Attachment>>,
    polygons: Vec<Vec<f32>>,
    polygon_pool: Vec<Vec<f32>>,
    aabb: Aabb,
    polygon_tests: Cell<usize>,
}

impl SkeletonBounds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the skeleton's bounding boxes and computes their world polygons. Without
    /// `update_aabb` the box is unbounded, so queries go straight to the polygons.
    pub fn update(&mut self, skeleton: &Skeleton, update_aabb: bool) {
        self.attachments.clear();
        self.polygon_pool.append(&mut self.polygons);

        for (slot_index, slot) in skeleton.slots.iter().enumerate() {
            let Some(attachment) = slot.attachment() else {
                continue;
            };
            let Attachment::BoundingBox(bounding_box) = attachment.as_ref() else {
                continue;
            };

            let mut polygon = self.polygon_pool.pop().unwrap_or_default();
            let length = bounding_box.vertex.world_vertices_length();
            polygon.clear();
            polygon.resize(length, 0.0);
            if let Err(err) =
                bounding_box
                    .vertex
                    .compute_world_vertices(skeleton, slot_index, 0, length, &mut polygon, 0, 2)
            {
                log::warn!("bounding box '{}' in slot {slot_index}: {err}", bounding_box.name);
                self.polygon_pool.push(polygon);
                continue;
            }

            self.attachments.push(Arc::clone(attachment));
            self.polygons.push(polygon);
        }

        if update_aabb {
            self.aabb = Aabb::EMPTY;
            for polygon in &self.polygons {
                self.aabb.include_vertices(polygon);
            }
        } else {
            self.aabb = Aabb {
                min_x: f32::NEG_INFINITY,
                min_y: f32::NEG_INFINITY,
                max_x: f32::INFINITY,
                max_y: f32::INFINITY,
            };
        }
    }

    pub fn aabb(&self) -> Aabb {
        self.aabb
    }

    pub fn aabb_contains_point(&self, x: f32, y: f32) -> bool {
        self.aabb.contains_point(x, y)
    }

    pub fn aabb_intersects_segment(&self, x1: f32, y1: f32, x2: f32, y2: f32) -> bool {
        self.aabb.intersects_segment(x1, y1, x2, y2)
    }

    pub fn aabb_intersects_skeleton(&self, other: &SkeletonBounds) -> bool {
        self.aabb.intersects(&other.aabb)
    }

    /// The first bounding box containing the point.
    pub fn contains_point(&self, x: f32, y: f32) -> Option<&BoundingBoxAttachmentData> {
        if !self.aabb_contains_point(x, y) {
            return None;
        }
        self.polygons
            .iter()
            .position(|polygon| self.polygon_contains_point(polygon, x, y))
            .and_then(|i| self.bounding_box(i))
    }

    /// The first bounding box with an edge crossing the segment.
    pub fn intersects_segment(
        &self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    ) -> Option<&BoundingBoxAttachmentData> {
        if !self.aabb_intersects_segment(x1, y1, x2, y2) {
            return None;
        }
        self.polygons
            .iter()
            .position(|polygon| self.polygon_intersects_segment(polygon, x1, y1, x2, y2))
            .and_then(|i| self.bounding_box(i))
    }

    pub fn polygon_contains_point(&self, polygon: &[f32], x: f32, y: f32) -> bool {
        self.polygon_tests.set(self.polygon_tests.get() + 1);
        geometry::polygon_contains_point(polygon, x, y)
    }

    pub fn polygon_intersects_segment(
        &self,
        polygon: &[f32],
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    ) -> bool {
        self.polygon_tests.set(self.polygon_tests.get() + 1);
        geometry::polygon_intersects_segment(polygon, x1, y1, x2, y2)
    }

    /// The world polygon computed for a bounding box, matched by attachment identity.
    pub fn polygon_for(&self, bounding_box: &BoundingBoxAttachmentData) -> Option<&[f32]> {
        let id = bounding_box.vertex.id();
        (0..self.attachments.len())
            .find(|&i| self.bounding_box(i).is_some_and(|b| b.vertex.id() == id))
            .and_then(|i| self.polygons.get(i))
            .map(Vec::as_slice)
    }

    fn bounding_box(&self, index: usize) -> Option<&BoundingBoxAttachmentData> {
        match self.attachments.get(index)?.as_ref() {
            Attachment::BoundingBox(bounding_box) => Some(bounding_box),
            _ => None,
        }
    }

    pub fn bounding_boxes(&self) -> impl Iterator<Item = &BoundingBoxAttachmentData> {
        (0..self.attachments.len()).filter_map(|i| self.bounding_box(i))
    }

    pub fn polygons(&self) -> &[Vec<f32>] {
        &self.polygons
    }

    pub fn min_x(&self) -> f32 {
        self.aabb.min_x
    }

    pub fn min_y(&self) -> f32 {
        self.aabb.min_y
    }

    pub fn max_x(&self) -> f32 {
        self.aabb.max_x
    }

    pub fn max_y(&self) -> f32 {
        self.aabb.max_y
    }

    pub fn width(&self) -> f32 {
        self.aabb.width()
    }

    pub fn height(&self) -> f32 {
        self.aabb.height()
    }

    /// Number of polygon tests run since creation.
    pub fn polygon_test_count(&self) -> usize {
        self.polygon_tests.get()
    }
}
