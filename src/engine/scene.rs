// Scene graph primitives: transforms, node trees, skeletons

use glam::{Quat, Vec3};
use std::collections::HashMap;

/// Position, rotation and scale of a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Identity transform moved to a position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Builder-style rotation override
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Builder-style uniform scale override
    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Apply a delta expressed in this transform's local frame.
    ///
    /// The translation is rotated by the current orientation, then the
    /// rotation delta is composed on the right.
    pub fn apply_local_delta(&mut self, translation: Vec3, rotation: Quat) {
        self.position += self.rotation * translation;
        self.rotation = (self.rotation * rotation).normalize();
    }

    /// Delta that takes this transform to `target` when passed to
    /// [`Transform::apply_local_delta`]
    pub fn local_delta_to(&self, position: Vec3, rotation: Quat) -> (Vec3, Quat) {
        let inverse = self.rotation.inverse();
        let translation = inverse * (position - self.position);
        let rotation = (inverse * rotation).normalize();
        (translation, rotation)
    }
}

/// A single joint of a skeleton
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub name: String,
    /// Index of the bone inside its skeleton
    pub index: usize,
    /// Rest pose relative to the parent bone
    pub bind_pose: Transform,
}

/// Bones driven by a skinned mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skeleton {
    pub bones: Vec<Bone>,
}

impl Skeleton {
    /// Build a skeleton from bone names, assigning indices in order
    pub fn from_names(names: &[&str]) -> Self {
        Self {
            bones: names
                .iter()
                .enumerate()
                .map(|(index, name)| Bone {
                    name: name.to_string(),
                    index,
                    bind_pose: Transform::IDENTITY,
                })
                .collect(),
        }
    }
}

/// Node of a loaded scene graph
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    /// Present on skinned meshes
    pub skeleton: Option<Skeleton>,
    pub visible: bool,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    /// Create an empty visible node
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            transform: Transform::IDENTITY,
            skeleton: None,
            visible: true,
            children: Vec::new(),
        }
    }

    /// Attach a skeleton (marks this node as a skinned mesh)
    pub fn with_skeleton(mut self, skeleton: Skeleton) -> Self {
        self.skeleton = Some(skeleton);
        self
    }

    /// Add a child node
    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    /// Visit this node and all descendants depth-first
    pub fn traverse<'a>(&'a self, visit: &mut impl FnMut(&'a SceneNode)) {
        visit(self);
        for child in &self.children {
            child.traverse(visit);
        }
    }

    /// Number of nodes in this subtree, including self
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.traverse(&mut |_| count += 1);
        count
    }
}

/// Immutable bone-name lookup built once from a model's node tree
#[derive(Debug, Clone, Default)]
pub struct BoneMap {
    bones: HashMap<String, Bone>,
}

impl BoneMap {
    /// Collect the bones of every skinned node under `root`.
    ///
    /// When two skeletons share a bone name the later one in traversal
    /// order wins.
    pub fn build(root: &SceneNode) -> Self {
        let mut bones = HashMap::new();
        root.traverse(&mut |node| {
            if let Some(skeleton) = &node.skeleton {
                for bone in &skeleton.bones {
                    bones.insert(bone.name.clone(), bone.clone());
                }
            }
        });
        Self { bones }
    }

    pub fn get(&self, name: &str) -> Option<&Bone> {
        self.bones.get(name)
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bones.keys().map(String::as_str)
    }
}

/// Invisible vertical cylinder attached to a character for ray picking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickCylinder {
    pub radius: f32,
    pub height: f32,
    /// Centre of the cylinder relative to the owning node
    pub offset: Vec3,
}

impl PickCylinder {
    /// Distance along the ray to the first hit, if any.
    ///
    /// `origin` and `direction` are in world space and `owner` is the
    /// owning node's position. Rotation is ignored since the cylinder is
    /// upright. Rays starting inside the cylinder hit at distance 0.
    pub fn intersect_ray(&self, owner: Vec3, origin: Vec3, direction: Vec3) -> Option<f32> {
        let center = owner + self.offset;
        let half = self.height / 2.0;
        let (y_min, y_max) = (center.y - half, center.y + half);
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO {
            return None;
        }

        let rel_x = origin.x - center.x;
        let rel_z = origin.z - center.z;
        let inside_radial = rel_x * rel_x + rel_z * rel_z <= self.radius * self.radius;
        if inside_radial && origin.y >= y_min && origin.y <= y_max {
            return Some(0.0);
        }

        let mut best: Option<f32> = None;
        let mut consider = |t: f32| {
            if t >= 0.0 && best.map_or(true, |b| t < b) {
                best = Some(t);
            }
        };

        // Side wall
        let a = dir.x * dir.x + dir.z * dir.z;
        if a > f32::EPSILON {
            let b = 2.0 * (rel_x * dir.x + rel_z * dir.z);
            let c = rel_x * rel_x + rel_z * rel_z - self.radius * self.radius;
            let disc = b * b - 4.0 * a * c;
            if disc >= 0.0 {
                let sqrt = disc.sqrt();
                for t in [(-b - sqrt) / (2.0 * a), (-b + sqrt) / (2.0 * a)] {
                    let y = origin.y + dir.y * t;
                    if y >= y_min && y <= y_max {
                        consider(t);
                    }
                }
            }
        }

        // Caps
        if dir.y.abs() > f32::EPSILON {
            for cap_y in [y_min, y_max] {
                let t = (cap_y - origin.y) / dir.y;
                let x = rel_x + dir.x * t;
                let z = rel_z + dir.z * t;
                if x * x + z * z <= self.radius * self.radius {
                    consider(t);
                }
            }
        }

        best
    }
}
