//! Affine 4x4 transforms.
//!
//! Transforms use the row-vector convention: a point is the row `[x y z 1]`
//! multiplied on the left, so translation lives in the bottom row and
//! `a * b` applies `a` first, then `b` in the frame `a` produced.
//!
//! The elementary builders (`translate`, `scale`, `rotate`) right-multiply
//! their elementary matrix into `self`.

use std::ops::Mul;

use nalgebra::{Matrix3, Matrix4, Vector3};

/// A 4x4 affine transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    m: Matrix4<f64>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// The identity transform.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            m: Matrix4::identity(),
        }
    }

    /// Build a transform from row-major cells.
    #[must_use]
    pub fn from_rows(rows: [[f64; 4]; 4]) -> Self {
        let mut m = Matrix4::zeros();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                m[(r, c)] = *value;
            }
        }
        Self::from_matrix(m)
    }

    /// Wrap an existing matrix.
    #[must_use]
    pub const fn from_matrix(m: Matrix4<f64>) -> Self {
        Self { m }
    }

    /// The underlying matrix.
    #[must_use]
    pub const fn matrix(&self) -> &Matrix4<f64> {
        &self.m
    }

    /// Read one cell.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is not below 4.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.m[(row, col)]
    }

    /// Write one cell.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is not below 4.
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.m[(row, col)] = value;
    }

    /// Reset to the identity.
    pub fn set_identity(&mut self) {
        self.m = Matrix4::identity();
    }

    /// Whether this is exactly the identity.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.m == Matrix4::identity()
    }

    /// Append a translation.
    pub fn translate(&mut self, x: f64, y: f64, z: f64) {
        let mut t = Self::identity();
        t.m[(3, 0)] = x;
        t.m[(3, 1)] = y;
        t.m[(3, 2)] = z;
        *self = *self * t;
    }

    /// Append a per-axis scale.
    pub fn scale(&mut self, x: f64, y: f64, z: f64) {
        let mut t = Self::identity();
        t.m[(0, 0)] = x;
        t.m[(1, 1)] = y;
        t.m[(2, 2)] = z;
        *self = *self * t;
    }

    /// Append a rotation given in radians.
    ///
    /// The composition is `z * y' * z`, where the `y'` block is built from
    /// the `x` angle. The `y` angle does not contribute. Scenes authored
    /// against this loader depend on these exact numbers.
    pub fn rotate(&mut self, x: f64, _y: f64, z: f64) {
        let (sx, cx) = x.sin_cos();
        let (sz, cz) = z.sin_cos();

        let mut ry = Self::identity();
        ry.m[(0, 0)] = cx;
        ry.m[(0, 2)] = -sx;
        ry.m[(2, 0)] = sx;
        ry.m[(2, 2)] = cx;

        let mut rz = Self::identity();
        rz.m[(0, 0)] = cz;
        rz.m[(0, 1)] = sz;
        rz.m[(1, 0)] = -sz;
        rz.m[(1, 1)] = cz;

        *self = *self * rz * ry * rz;
    }

    /// The translation part (bottom row).
    #[must_use]
    pub fn position(&self) -> Vector3<f64> {
        Vector3::new(self.m[(3, 0)], self.m[(3, 1)], self.m[(3, 2)])
    }

    /// The upper-left 3x3 block.
    #[must_use]
    pub fn rotation(&self) -> Matrix3<f64> {
        self.m.fixed_view::<3, 3>(0, 0).into_owned()
    }
}

impl Mul for Transform {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::from_matrix(self.m * rhs.m)
    }
}

impl Mul<&Transform> for &Transform {
    type Output = Transform;

    fn mul(self, rhs: &Transform) -> Transform {
        Transform::from_matrix(self.m * rhs.m)
    }
}
