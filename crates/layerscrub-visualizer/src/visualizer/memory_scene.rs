//! In-memory rendering scene
//!
//! Stores created objects in an ordered map keyed by a monotonically
//! increasing id. Used by the command-line preview and by tests, which can
//! inspect every object and inject delete failures.

use std::collections::BTreeMap;
use std::fmt;

use layerscrub_core::{Color, Point3, SceneError};
use serde::Serialize;
use tracing::trace;

use super::scene::{LayerRole, PathStyle, RenderScene};

/// Handle of an object in a [`MemoryScene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneObject {
    Path { points: Vec<Point3>, style: PathStyle },
    Marker { point: Point3, color: Color },
}

/// Running counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SceneStats {
    pub paths_added: usize,
    pub markers_added: usize,
    pub objects_deleted: usize,
    pub delete_failures: usize,
    /// Outermost suppression scopes that were closed
    pub redraw_scopes: usize,
    /// Redraws performed outside any suppression scope
    pub redraws: usize,
}

#[derive(Debug, Default)]
pub struct MemoryScene {
    next_id: u64,
    objects: BTreeMap<ObjectId, SceneObject>,
    redraw_depth: usize,
    stats: SceneStats,
    fail_deletes: bool,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.objects.iter().map(|(id, object)| (*id, object))
    }

    /// Point lists of every path with the given role, in creation order
    pub fn paths(&self, role: LayerRole) -> Vec<&[Point3]> {
        self.objects
            .values()
            .filter_map(|object| match object {
                SceneObject::Path { points, style } if style.role == role => {
                    Some(points.as_slice())
                }
                _ => None,
            })
            .collect()
    }

    pub fn markers(&self) -> Vec<Point3> {
        self.objects
            .values()
            .filter_map(|object| match object {
                SceneObject::Marker { point, .. } => Some(*point),
                _ => None,
            })
            .collect()
    }

    /// Current redraw suppression nesting depth
    pub fn redraw_depth(&self) -> usize {
        self.redraw_depth
    }

    pub fn stats(&self) -> SceneStats {
        self.stats
    }

    /// Make every subsequent `delete_objects` call fail without deleting
    pub fn set_fail_deletes(&mut self, fail: bool) {
        self.fail_deletes = fail;
    }

    /// Delete an object behind the owner's back, as a user editing the
    /// host document would
    pub fn remove_externally(&mut self, id: ObjectId) -> bool {
        self.objects.remove(&id).is_some()
    }

    fn insert(&mut self, object: SceneObject) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.insert(id, object);
        if self.redraw_depth == 0 {
            self.stats.redraws += 1;
        }
        id
    }
}

impl RenderScene for MemoryScene {
    type Handle = ObjectId;

    fn add_path(&mut self, points: &[Point3], style: &PathStyle) -> Result<ObjectId, SceneError> {
        if points.len() < 2 {
            return Err(SceneError::Rejected {
                kind: "path",
                reason: format!("{} point(s), need at least 2", points.len()),
            });
        }
        self.stats.paths_added += 1;
        let id = self.insert(SceneObject::Path {
            points: points.to_vec(),
            style: *style,
        });
        trace!("Scene: added {:?} path {} ({} points)", style.role, id, points.len());
        Ok(id)
    }

    fn add_marker(&mut self, point: Point3, color: Color) -> Result<ObjectId, SceneError> {
        self.stats.markers_added += 1;
        let id = self.insert(SceneObject::Marker { point, color });
        trace!("Scene: added marker {} at {}", id, point);
        Ok(id)
    }

    fn delete_objects(&mut self, handles: &[ObjectId]) -> Result<(), SceneError> {
        if self.fail_deletes {
            self.stats.delete_failures += 1;
            return Err(SceneError::Backend {
                message: format!("delete of {} object(s) refused", handles.len()),
            });
        }

        let mut unknown = None;
        for id in handles {
            if self.objects.remove(id).is_some() {
                self.stats.objects_deleted += 1;
            } else if unknown.is_none() {
                unknown = Some(*id);
            }
        }
        if self.redraw_depth == 0 && !handles.is_empty() {
            self.stats.redraws += 1;
        }

        match unknown {
            Some(id) => {
                self.stats.delete_failures += 1;
                Err(SceneError::UnknownObject {
                    handle: id.to_string(),
                })
            }
            None => Ok(()),
        }
    }

    fn begin_suppressed_redraw(&mut self) {
        self.redraw_depth += 1;
    }

    fn end_suppressed_redraw(&mut self) {
        match self.redraw_depth {
            0 => {}
            1 => {
                self.redraw_depth = 0;
                self.stats.redraw_scopes += 1;
                self.stats.redraws += 1;
            }
            _ => self.redraw_depth -= 1,
        }
    }
}
