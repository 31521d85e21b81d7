//! Deferred fine-precision vector expressions.
//!
//! A [`FineExpr`] describes a computation such as
//! `normalize_twice(a x b)` without naming where the result goes. It can be
//! evaluated into a fresh temporary with [`FineExpr::eval`] or written straight
//! into a destination with [`FineExpr::eval_into`].
//!
//! The inputs are borrowed for the lifetime of the expression, so the borrow
//! checker rejects a destination that aliases one of them. Evaluating into a
//! temporary and assigning afterwards is the way to update an input in place;
//! both paths produce identical values.
//!
//! ```
//! use gravityframe::math::expr;
//! use gravityframe::math::vector::Vector3Fine;
//!
//! let a = Vector3Fine::X;
//! let b = Vector3Fine::UP;
//! let mut dst = Vector3Fine::ZERO;
//! expr::cross(&a, &b).normalized_twice().eval_into(&mut dst);
//! assert_eq!(dst, Vector3Fine::Z);
//! ```

use super::fixed::Fix24;
use super::vector::{Vector3, Vector3Fine};

/// A pending computation producing a [`Vector3Fine`].
#[must_use = "expressions do nothing until evaluated"]
pub struct FineExpr<F> {
    build: F,
}

impl<F> FineExpr<F>
where
    F: FnOnce(&mut Vector3Fine),
{
    /// Wrap a closure that writes its result into the destination.
    pub fn from_fn(build: F) -> Self {
        Self { build }
    }

    /// Evaluate directly into `dst`.
    pub fn eval_into(self, dst: &mut Vector3Fine) {
        (self.build)(dst);
    }

    /// Evaluate into a new temporary.
    pub fn eval(self) -> Vector3Fine {
        let mut tmp = Vector3Fine::ZERO;
        self.eval_into(&mut tmp);
        tmp
    }

    /// Evaluate, then round to coarse precision.
    pub fn eval_coarse(self) -> Vector3 {
        self.eval().to_coarse()
    }

    pub fn normalized(self) -> FineExpr<impl FnOnce(&mut Vector3Fine)> {
        FineExpr::from_fn(move |dst: &mut Vector3Fine| {
            (self.build)(dst);
            dst.normalize();
        })
    }

    pub fn normalized_twice(self) -> FineExpr<impl FnOnce(&mut Vector3Fine)> {
        self.normalized().normalized()
    }

    pub fn plus(self, rhs: Vector3Fine) -> FineExpr<impl FnOnce(&mut Vector3Fine)> {
        FineExpr::from_fn(move |dst: &mut Vector3Fine| {
            (self.build)(dst);
            *dst += rhs;
        })
    }

    pub fn minus(self, rhs: Vector3Fine) -> FineExpr<impl FnOnce(&mut Vector3Fine)> {
        FineExpr::from_fn(move |dst: &mut Vector3Fine| {
            (self.build)(dst);
            *dst -= rhs;
        })
    }

    pub fn scaled(self, s: Fix24) -> FineExpr<impl FnOnce(&mut Vector3Fine)> {
        FineExpr::from_fn(move |dst: &mut Vector3Fine| {
            (self.build)(dst);
            *dst *= s;
        })
    }

    pub fn shifted_left(self, bits: u32) -> FineExpr<impl FnOnce(&mut Vector3Fine)> {
        FineExpr::from_fn(move |dst: &mut Vector3Fine| {
            (self.build)(dst);
            *dst = *dst << bits;
        })
    }

    pub fn shifted_right(self, bits: u32) -> FineExpr<impl FnOnce(&mut Vector3Fine)> {
        FineExpr::from_fn(move |dst: &mut Vector3Fine| {
            (self.build)(dst);
            *dst = *dst >> bits;
        })
    }

    /// Cross the pending result with `rhs` on the right.
    pub fn cross_with(self, rhs: Vector3Fine) -> FineExpr<impl FnOnce(&mut Vector3Fine)> {
        FineExpr::from_fn(move |dst: &mut Vector3Fine| {
            (self.build)(dst);
            *dst = dst.cross(&rhs);
        })
    }
}

/// The vector `v` itself.
pub fn of(v: &Vector3Fine) -> FineExpr<impl FnOnce(&mut Vector3Fine) + '_> {
    FineExpr::from_fn(move |dst: &mut Vector3Fine| *dst = *v)
}

/// `a x b` at fine precision.
pub fn cross<'a>(
    a: &'a Vector3Fine,
    b: &'a Vector3Fine,
) -> FineExpr<impl FnOnce(&mut Vector3Fine) + 'a> {
    FineExpr::from_fn(move |dst: &mut Vector3Fine| *dst = a.cross(b))
}

/// `a x b` on coarse inputs, kept at fine precision.
pub fn cross_coarse<'a>(
    a: &'a Vector3,
    b: &'a Vector3,
) -> FineExpr<impl FnOnce(&mut Vector3Fine) + 'a> {
    FineExpr::from_fn(move |dst: &mut Vector3Fine| *dst = a.to_fine().cross(&b.to_fine()))
}
