//! Conversion between the physics engine's Z-up convention and the
//! renderer's Y-up convention.
//!
//! The physics engine stores vectors as `(x, y, z)` with Z pointing up and
//! quaternions as `(w, x, y, z)`. The renderer expects Y up with a
//! right-handed frame, so every vector read from a model or simulation
//! buffer goes through [`position`] and every orientation through
//! [`quaternion`]. Mesh buffers are converted once with [`swizzle_in_place`].
//!
//! The mapping is a fixed component permutation with sign flips and must not
//! be altered: positions become `(x, z, -y)` and quaternions
//! `(x, y, z, w) = (-q1, -q3, q2, -q0)`.

use cgmath::{Quaternion, Vector3};

fn at<T: Copy + Into<f64>>(buffer: &[T], i: usize) -> f64 {
    buffer[i].into()
}

/// Read the 3-vector at `index` from a flat buffer and convert it to renderer
/// coordinates.
pub fn position<T: Copy + Into<f64>>(buffer: &[T], index: usize) -> Vector3<f32> {
    let x = at(buffer, index * 3);
    let y = at(buffer, index * 3 + 1);
    let z = at(buffer, index * 3 + 2);
    Vector3::new(x as f32, z as f32, -y as f32)
}

/// Read the 3-vector at `index` without converting it.
pub fn position_raw<T: Copy + Into<f64>>(buffer: &[T], index: usize) -> Vector3<f32> {
    Vector3::new(
        at(buffer, index * 3) as f32,
        at(buffer, index * 3 + 1) as f32,
        at(buffer, index * 3 + 2) as f32,
    )
}

/// Read the `(w, x, y, z)` quaternion at `index` from a flat buffer and
/// convert it to renderer coordinates.
///
/// The source identity `(1, 0, 0, 0)` maps to `w = -1`, which encodes the same
/// (identity) rotation.
pub fn quaternion<T: Copy + Into<f64>>(buffer: &[T], index: usize) -> Quaternion<f32> {
    let q0 = at(buffer, index * 4);
    let q1 = at(buffer, index * 4 + 1);
    let q2 = at(buffer, index * 4 + 2);
    let q3 = at(buffer, index * 4 + 3);
    // cgmath takes the scalar part first
    Quaternion::new(-q0 as f32, -q1 as f32, -q3 as f32, q2 as f32)
}

/// Read the `(w, x, y, z)` quaternion at `index` without converting it.
pub fn quaternion_raw<T: Copy + Into<f64>>(buffer: &[T], index: usize) -> Quaternion<f32> {
    Quaternion::new(
        at(buffer, index * 4) as f32,
        at(buffer, index * 4 + 1) as f32,
        at(buffer, index * 4 + 2) as f32,
        at(buffer, index * 4 + 3) as f32,
    )
}

/// Convert a renderer-space vector back into physics coordinates.
pub fn to_source_position(v: Vector3<f32>) -> Vector3<f32> {
    Vector3::new(v.x, -v.z, v.y)
}

/// Convert a renderer-space quaternion back into physics `(w, x, y, z)` order.
pub fn to_source_quaternion(q: Quaternion<f32>) -> [f32; 4] {
    [-q.s, -q.v.x, q.v.z, -q.v.y]
}

/// Apply the position conversion to every 3-tuple of `buffer`.
///
/// Trailing elements that do not form a full tuple are left untouched.
pub fn swizzle_in_place(buffer: &mut [f32]) {
    for v in buffer.chunks_exact_mut(3) {
        let temp = v[1];
        v[1] = v[2];
        v[2] = -temp;
    }
}
