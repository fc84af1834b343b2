use crate::material::Material;
use crate::math::{Aabb, Mat3, Point3, Ray, Vec3};
use crate::triangle::TriangleGeom;
use crate::vertex::Vertex;
use rand::rngs::SmallRng;
use rand::Rng;

/// Flat vertex/triangle buffers for one loaded mesh, with the load-time
/// scale → rotate → translate transform already baked into vertex positions.
/// Immutable once [`MeshData::finalize`] has run; nothing in the render path
/// mutates a `MeshData` afterward.
#[derive(Debug, Clone)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub triangle_indices: Vec<[usize; 3]>,
    pub triangles: Vec<TriangleGeom>,
    pub bounds: Aabb,
    pub total_area: f64,
}

/// The (position, Euler-angle rotation, non-uniform scale) transform applied
/// to every vertex at load time. There is no hierarchical or runtime transform.
#[derive(Debug, Clone, Copy)]
pub struct MeshTransform {
    pub position: Point3,
    pub rotation_euler: Vec3,
    pub scale: Vec3,
}

impl Default for MeshTransform {
    fn default() -> Self {
        Self {
            position: Point3::zero(),
            rotation_euler: Vec3::zero(),
            scale: Vec3::ones(),
        }
    }
}

impl MeshTransform {
    fn rotation(&self) -> Mat3 {
        Mat3::rotation_xyz(self.rotation_euler)
    }

    fn transform_position(&self, p: Point3) -> Point3 {
        self.position + self.rotation().mul_vec(Mat3::diagonal(self.scale).mul_vec(p))
    }

    /// Normals are transformed by rotation composed with the *inverse* scale,
    /// so that non-uniform scaling doesn't skew shading normals.
    fn transform_normal(&self, n: Vec3) -> Vec3 {
        let inv_scale = Vec3::new(1.0 / self.scale.x, 1.0 / self.scale.y, 1.0 / self.scale.z);
        self.rotation().mul_vec(Mat3::diagonal(inv_scale).mul_vec(n))
    }
}

/// Raw, untransformed vertex data as read from a mesh file, before the
/// load-time transform and normal accumulation/normalization pass.
pub struct MeshBuilder {
    vertices: Vec<Vertex>,
    faces: Vec<[usize; 3]>,
}

impl MeshBuilder {
    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(triangle_count),
        }
    }

    pub fn push_vertex(&mut self, position: Point3) -> usize {
        self.vertices.push(Vertex::new(position));
        self.vertices.len() - 1
    }

    pub fn push_vertex_uv(&mut self, position: Point3, uv: (f64, f64)) -> usize {
        let i = self.push_vertex(position);
        self.vertices[i].uv = uv;
        i
    }

    pub fn push_face(&mut self, a: usize, b: usize, c: usize) {
        self.faces.push([a, b, c]);
    }

    /// Bakes the transform into vertex positions, accumulates per-triangle
    /// geometric normals onto their vertices, normalizes, and computes the
    /// mesh-level bounds. Returns `None` if any face references a degenerate
    /// (collinear) triangle.
    pub fn finalize(mut self, transform: &MeshTransform) -> Option<MeshData> {
        for v in &mut self.vertices {
            v.position = transform.transform_position(v.position);
        }

        let mut triangles = Vec::with_capacity(self.faces.len());
        let mut bounds = Aabb::empty();
        for &[a, b, c] in &self.faces {
            let geom = TriangleGeom::new(self.vertices[a].position, self.vertices[b].position, self.vertices[c].position);
            self.vertices[a].accumulate_normal(geom.normal);
            self.vertices[b].accumulate_normal(geom.normal);
            self.vertices[c].accumulate_normal(geom.normal);
            bounds.grow_point(geom.v0);
            bounds.grow_point(geom.v1);
            bounds.grow_point(geom.v2);
            triangles.push(geom);
        }

        let vertices = self
            .vertices
            .into_iter()
            .map(|mut v| {
                v.normalize();
                let n = if v.normal.near_zero() {
                    Vec3::unit_y()
                } else {
                    transform.transform_normal(v.normal).normalized()
                };
                Vertex::with_normal_uv(v.position, n, v.uv)
            })
            .collect();

        let total_area = triangles.iter().map(|t| t.area).sum();

        Some(MeshData {
            vertices,
            triangle_indices: self.faces,
            triangles,
            bounds,
            total_area,
        })
    }
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Draws a point uniformly over the mesh's total surface area: picks a
    /// triangle with probability proportional to its area, then samples
    /// uniformly within it. Returns the sampled point and that triangle's
    /// face normal.
    pub fn sample_area(&self, rng: &mut SmallRng) -> (Point3, Vec3) {
        let target = rng.gen_range(0.0..self.total_area);
        let mut acc = 0.0;
        for tri in &self.triangles {
            acc += tri.area;
            if acc >= target {
                return (tri.random_area(rng), tri.normal);
            }
        }
        let last = self.triangles.last().expect("mesh with zero triangles");
        (last.random_area(rng), last.normal)
    }
}

/// A recursive octree node over a triangle soup. Non-leaf nodes own exactly
/// eight children (one per octant of their own AABB, split at center); leaves
/// own the (possibly empty) list of triangle indices that overlap them.
///
/// This mirrors a `Box`-owned recursive enum rather than an arena of indices:
/// build and traversal recursion are both bounded by the caller-supplied max
/// depth, so the arena's cache-locality win isn't worth the extra bookkeeping
/// here.
#[derive(Debug)]
pub enum OctreeNode {
    Leaf {
        bounds: Aabb,
        triangles: Vec<usize>,
    },
    Interior {
        bounds: Aabb,
        children: Box<[OctreeNode; 8]>,
    },
}

impl OctreeNode {
    pub fn build(bounds: Aabb, candidates: &[usize], mesh: &MeshData, depth: usize, max_elements: usize) -> Self {
        if depth == 0 || candidates.len() <= max_elements {
            return OctreeNode::Leaf {
                bounds,
                triangles: candidates.to_vec(),
            };
        }

        let octants = bounds.octant_split();
        let children = octants.map(|child_bounds| {
            let child_candidates: Vec<usize> = candidates
                .iter()
                .copied()
                .filter(|&i| mesh.triangles[i].overlaps_aabb_fast(&child_bounds))
                .collect();
            OctreeNode::build(child_bounds, &child_candidates, mesh, depth - 1, max_elements)
        });

        OctreeNode::Interior {
            bounds,
            children: Box::new(children),
        }
    }

    pub fn bounds(&self) -> &Aabb {
        match self {
            OctreeNode::Leaf { bounds, .. } => bounds,
            OctreeNode::Interior { bounds, .. } => bounds,
        }
    }

    /// Front-to-back traversal. Tracks the closest confirmed hit across every
    /// visited child (not just the first one reporting a hit) and tightens
    /// `t_max` from every hit found, in both the leaf and interior branches.
    pub fn intersect(
        &self,
        ray: &Ray,
        mesh: &MeshData,
        t_min: f64,
        t_max: f64,
    ) -> Option<(f64, f64, f64, usize)> {
        match self {
            OctreeNode::Leaf { triangles, .. } => {
                let mut closest = t_max;
                let mut best = None;
                for &tri_index in triangles {
                    if let Some((t, u, v)) = mesh.triangles[tri_index].intersect(ray, t_min, closest) {
                        closest = t;
                        best = Some((t, u, v, tri_index));
                    }
                }
                best
            }
            OctreeNode::Interior { children, .. } => {
                let mut entries: Vec<(usize, f64)> = children
                    .iter()
                    .enumerate()
                    .filter_map(|(i, child)| child.bounds().hit_t(ray, t_min, t_max).map(|t| (i, t)))
                    .collect();
                entries.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());

                let mut closest = t_max;
                let mut best = None;
                for (i, _) in entries {
                    if let Some((t, u, v, tri_index)) = children[i].intersect(ray, t_min, closest) {
                        closest = t;
                        best = Some((t, u, v, tri_index));
                    }
                }
                best
            }
        }
    }
}

/// A plain (non-accelerated) mesh: ray intersection is a linear scan over
/// every triangle. Used for the `Mesh` scene-description production.
#[derive(Debug, Clone)]
pub struct TriangleMesh {
    pub data: std::sync::Arc<MeshData>,
    pub material: Material,
}

impl TriangleMesh {
    pub fn new(data: std::sync::Arc<MeshData>, material: Material) -> Self {
        Self { data, material }
    }

    pub fn bounds(&self) -> Aabb {
        self.data.bounds
    }

    pub fn intersect(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<(f64, f64, f64, usize)> {
        let mut closest = t_max;
        let mut best = None;
        for (i, tri) in self.data.triangles.iter().enumerate() {
            if let Some((t, u, v)) = tri.intersect(ray, t_min, closest) {
                closest = t;
                best = Some((t, u, v, i));
            }
        }
        best
    }
}

/// An octree-accelerated mesh, used for the `OctreeMesh` scene-description
/// production. Always rejects against its own root AABB before descending,
/// so a ray that misses the mesh entirely never touches the tree.
#[derive(Debug)]
pub struct TriangleOctreeMesh {
    pub data: std::sync::Arc<MeshData>,
    pub root: OctreeNode,
    pub material: Material,
}

impl TriangleOctreeMesh {
    pub fn build(data: std::sync::Arc<MeshData>, max_depth: usize, max_elements: usize, material: Material) -> Self {
        let all: Vec<usize> = (0..data.triangles.len()).collect();
        let root = OctreeNode::build(data.bounds, &all, &data, max_depth, max_elements);
        Self { data, root, material }
    }

    pub fn bounds(&self) -> Aabb {
        self.data.bounds
    }

    pub fn intersect(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<(f64, f64, f64, usize)> {
        if self.data.bounds.hit_t(ray, t_min, t_max).is_none() {
            return None;
        }
        self.root.intersect(ray, &self.data, t_min, t_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_triangle_mesh() -> std::sync::Arc<MeshData> {
        let mut b = MeshBuilder::with_capacity(6, 2);
        // Triangle A sits in the -x-y-z octant of a [-10,10]^3 root box.
        let a0 = b.push_vertex(Point3::new(-5.0, -5.0, -5.1));
        let a1 = b.push_vertex(Point3::new(-4.0, -5.0, -5.1));
        let a2 = b.push_vertex(Point3::new(-5.0, -4.0, -5.1));
        b.push_face(a0, a1, a2);
        // Triangle B sits diagonally opposite, in +x+y+z.
        let c0 = b.push_vertex(Point3::new(5.0, 5.0, 5.1));
        let c1 = b.push_vertex(Point3::new(6.0, 5.0, 5.1));
        let c2 = b.push_vertex(Point3::new(5.0, 6.0, 5.1));
        b.push_face(c0, c1, c2);
        std::sync::Arc::new(b.finalize(&MeshTransform::default()).unwrap())
    }

    fn test_material() -> Material {
        Material::lambertian(crate::texture::Texture::constant(crate::math::Vec4::new(
            0.8, 0.8, 0.8, 1.0,
        )))
    }

    #[test]
    fn octree_with_one_element_per_leaf_finds_triangle_in_opposite_octant() {
        let mesh = two_triangle_mesh();
        let octree = TriangleOctreeMesh::build(mesh, 3, 1, test_material());

        // Triangle A's normal faces +z; approaching from above (front face).
        let ray_a = Ray::new(Point3::new(-4.7, -4.7, 20.0), Vec3::new(0.0, 0.0, -1.0));
        let hit_a = octree.intersect(&ray_a, 0.001, f64::INFINITY);
        assert!(hit_a.is_some());

        // Flipping the ray direction (now approaching from below) should miss
        // since the triangle is single-sided.
        let ray_a_reversed = Ray::new(Point3::new(-4.7, -4.7, -20.0), Vec3::new(0.0, 0.0, 1.0));
        let hit_reversed = octree.intersect(&ray_a_reversed, 0.001, f64::INFINITY);
        assert!(hit_reversed.is_none());
    }

    #[test]
    fn linear_scan_and_octree_agree_on_closest_hit() {
        let mesh = two_triangle_mesh();
        let linear = TriangleMesh::new(mesh.clone(), test_material());
        let octree = TriangleOctreeMesh::build(mesh, 4, 1, test_material());

        let ray = Ray::new(Point3::new(5.5, 5.2, 20.0), Vec3::new(0.0, 0.0, -1.0));
        let a = linear.intersect(&ray, 0.001, f64::INFINITY);
        let b = octree.intersect(&ray, 0.001, f64::INFINITY);
        assert_eq!(a.is_some(), b.is_some());
        if let (Some(a), Some(b)) = (a, b) {
            assert!((a.0 - b.0).abs() < 1e-9);
        }
    }
}
