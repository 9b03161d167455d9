use crate::error::VectorError;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Double precision 3D vector. Every operation returns a new value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Vector3 { x, y, z }
    }

    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn scale_by(self, s: f64) -> Self {
        Vector3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    pub fn dot(&self, rhs: &Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    pub fn cross(&self, rhs: &Self) -> Self {
        Vector3 {
            x: self.y * rhs.z - self.z * rhs.y,
            y: self.z * rhs.x - self.x * rhs.z,
            z: self.x * rhs.y - self.y * rhs.x,
        }
    }

    pub fn length_squared(&self) -> f64 {
        self.dot(self)
    }

    pub fn length(&self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Unit vector pointing the same way, or `DivideByZero` for the zero vector.
    pub fn normalize(&self) -> Result<Self, VectorError> {
        let len = self.length();
        if len == 0.0 {
            return Err(VectorError::DivideByZero);
        }
        Ok(self.scale_by(1.0 / len))
    }
}

impl From<[f64; 3]> for Vector3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Vector3::new(x, y, z)
    }
}

impl From<nalgebra::Vector3<f64>> for Vector3 {
    fn from(v: nalgebra::Vector3<f64>) -> Self {
        Vector3::new(v[0], v[1], v[2])
    }
}

impl From<Vector3> for nalgebra::Vector3<f64> {
    fn from(v: Vector3) -> Self {
        nalgebra::Vector3::new(v.x, v.y, v.z)
    }
}

impl<'a> Add<&'a Self> for Vector3 {
    type Output = Self;
    fn add(self, rhs: &'a Self) -> Self {
        Vector3 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl Add for Vector3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        self.add(&rhs)
    }
}

impl<'a> Sub<&'a Self> for Vector3 {
    type Output = Self;
    fn sub(self, rhs: &'a Self) -> Self {
        Vector3 {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

impl Sub for Vector3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        self.sub(&rhs)
    }
}

impl Neg for Vector3 {
    type Output = Self;
    fn neg(self) -> Self {
        Vector3 {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

impl Mul<f64> for Vector3 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        self.scale_by(rhs)
    }
}

impl Mul<Vector3> for f64 {
    type Output = Vector3;
    fn mul(self, rhs: Vector3) -> Vector3 {
        rhs.scale_by(self)
    }
}

impl Div<f64> for Vector3 {
    type Output = Self;
    fn div(self, rhs: f64) -> Self {
        self.scale_by(1.0 / rhs)
    }
}

#[cfg(test)]
const EPS: f64 = 1e-9;

#[cfg(test)]
fn random_vectors(n: usize) -> Vec<Vector3> {
    use rand::distributions::Uniform;
    use rand::prelude::*;
    let mut rng = thread_rng();
    let distribution = Uniform::new(-100.0, 100.0);
    (0..n)
        .map(|_| {
            let x = distribution.sample(&mut rng);
            let y = distribution.sample(&mut rng);
            let z = distribution.sample(&mut rng);
            Vector3::new(x, y, z)
        })
        .collect()
}

#[cfg(test)]
fn assert_close(a: Vector3, b: Vector3) {
    assert!((a - b).length() < EPS, "{:?} != {:?}", a, b);
}

#[test]
fn add_sub_neg() {
    let vs = random_vectors(64);
    for pair in vs.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        assert_eq!(a + b, b + a);
        assert_eq!(a + (-b), a - b);
        assert_eq!(a + &b, a + b);
        assert_eq!(a - &b, a - b);
    }
    let a = Vector3::new(1.0, 2.0, 3.0);
    let b = Vector3::new(-4.0, 0.5, 10.0);
    let c = Vector3::new(0.25, 0.25, -1.0);
    assert_eq!((a + b) + c, a + (b + c));
    assert_eq!(a - b, Vector3::new(5.0, 1.5, -7.0));
}

#[test]
fn scale() {
    let a = Vector3::new(1.0, -2.0, 4.0);
    assert_eq!(a.scale_by(2.0), Vector3::new(2.0, -4.0, 8.0));
    assert_eq!(a * 2.0, a.scale_by(2.0));
    assert_eq!(2.0 * a, a.scale_by(2.0));
    assert_eq!(a / 4.0, a.scale_by(0.25));
    assert_eq!(a.scale_by(0.0), Vector3::zero());
}

#[test]
fn dot() {
    let x = Vector3::new(1.0, 0.0, 0.0);
    let y = Vector3::new(0.0, 1.0, 0.0);
    assert_eq!(x.dot(&y), 0.0);
    for pair in random_vectors(64).windows(2) {
        let (a, b) = (pair[0], pair[1]);
        assert_eq!(a.dot(&b), b.dot(&a));
        // codirectional
        let c = a.scale_by(3.5);
        assert!((a.dot(&c) - a.length() * c.length()).abs() < 1e-6 * a.dot(&c).abs().max(1.0));
    }
}

#[test]
fn cross() {
    let x = Vector3::new(1.0, 0.0, 0.0);
    let y = Vector3::new(0.0, 1.0, 0.0);
    assert_eq!(x.cross(&y), Vector3::new(0.0, 0.0, 1.0));
    for pair in random_vectors(64).windows(2) {
        let (a, b) = (pair[0], pair[1]);
        assert_eq!(a.cross(&b), -b.cross(&a));
        let c = a.cross(&b);
        let tolerance = 1e-9 * a.length() * b.length() * c.length().max(1.0);
        assert!(c.dot(&a).abs() < tolerance);
        assert!(c.dot(&b).abs() < tolerance);
    }
}

#[test]
fn length() {
    assert_eq!(Vector3::new(3.0, 0.0, 0.0).length(), 3.0);
    assert!((Vector3::new(6.0, 2.0, 0.0).length() - 6.324555320336759).abs() < EPS);
    assert_eq!(Vector3::new(0.0, -4.0, 3.0).length_squared(), 25.0);
    for a in random_vectors(16) {
        assert!(a.length() >= 0.0);
        assert!((-a).length() >= 0.0);
    }
}

#[test]
fn normalize() {
    assert_close(
        Vector3::new(10.0, 0.0, 0.0).normalize().unwrap(),
        Vector3::new(1.0, 0.0, 0.0),
    );
    for a in random_vectors(64) {
        let n = a.normalize().unwrap();
        assert!((n.length() - 1.0).abs() < EPS);
        assert_close(n, a.scale_by(1.0 / a.length()));
    }
    assert_eq!(Vector3::zero().normalize(), Err(VectorError::DivideByZero));
}

#[test]
fn nalgebra_interop() {
    let a = Vector3::new(1.5, -2.0, 0.25);
    let na: nalgebra::Vector3<f64> = a.into();
    assert!((na.norm() - a.length()).abs() < EPS);
    assert_eq!(Vector3::from(na), a);
    assert_eq!(Vector3::from(a.to_array()), a);
    let b = Vector3::new(0.0, 3.0, -1.0);
    let nb: nalgebra::Vector3<f64> = b.into();
    assert_close(Vector3::from(na.cross(&nb)), a.cross(&b));
}
