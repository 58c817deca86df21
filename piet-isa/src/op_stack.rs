use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::ops::Index;

use arbitrary::Arbitrary;
use itertools::Itertools;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

type Result<T> = std::result::Result<T, OpStackError>;

/// The operational stack of a Piet program.
///
/// Every operation either succeeds completely or leaves the stack untouched
/// and returns an [`OpStackError`]. Binary operations use the element that was
/// pushed earlier as the left-hand side and the top element as the right-hand
/// side: for a stack `[…, a, b]`, [`subtract`](Self::subtract) results in
/// `[…, a - b]`.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize, Arbitrary)]
pub struct OpStack {
    /// The underlying, actual stack. When manually accessing, be aware of
    /// reversed indexing: while `op_stack[0]` is the top of the stack,
    /// `op_stack.stack[0]` is the lowest element in the stack.
    pub stack: Vec<i64>,
}

#[non_exhaustive]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
pub enum OpStackError {
    #[error("operational stack is too shallow")]
    TooShallow,

    #[error("division by 0 is impossible")]
    DivisionByZero,

    #[error("arithmetic overflow")]
    Overflow,

    #[error("cannot roll to negative depth {0}")]
    NegativeRollDepth(i64),

    #[error("cannot roll to depth {depth} with only {len} elements on the stack")]
    RollDepthExceedsStack { depth: i64, len: usize },
}

impl OpStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn has_at_least(&self, num_elements: usize) -> bool {
        self.len() >= num_elements
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }

    pub fn push(&mut self, element: i64) {
        self.stack.push(element);
    }

    pub fn pop(&mut self) -> Result<i64> {
        self.stack.pop().ok_or(OpStackError::TooShallow)
    }

    pub fn peek(&self) -> Option<i64> {
        self.stack.last().copied()
    }

    /// A copy of the stack, bottom element first.
    pub fn snapshot(&self) -> Vec<i64> {
        self.stack.clone()
    }

    /// Iterate over the stack, top element first.
    pub fn iter(&self) -> impl Iterator<Item = &i64> {
        self.stack.iter().rev()
    }

    pub fn add(&mut self) -> Result<()> {
        self.binary_operation(|lhs, rhs| lhs.checked_add(rhs).ok_or(OpStackError::Overflow))
    }

    pub fn subtract(&mut self) -> Result<()> {
        self.binary_operation(|lhs, rhs| lhs.checked_sub(rhs).ok_or(OpStackError::Overflow))
    }

    pub fn multiply(&mut self) -> Result<()> {
        self.binary_operation(|lhs, rhs| lhs.checked_mul(rhs).ok_or(OpStackError::Overflow))
    }

    /// Floored division: the quotient is rounded towards negative infinity.
    pub fn divide(&mut self) -> Result<()> {
        self.binary_operation(floored_div)
    }

    /// The remainder of [floored division](Self::divide). Takes the sign of
    /// the divisor.
    pub fn modulo(&mut self) -> Result<()> {
        self.binary_operation(floored_mod)
    }

    /// Replace the top element by 1 if it is 0, and by 0 otherwise.
    pub fn not(&mut self) -> Result<()> {
        let top = self.pop()?;
        self.push(i64::from(top == 0));
        Ok(())
    }

    /// Push 1 if the second element is greater than the top element, 0
    /// otherwise.
    pub fn greater(&mut self) -> Result<()> {
        self.binary_operation(|lhs, rhs| Ok(i64::from(lhs > rhs)))
    }

    pub fn duplicate(&mut self) -> Result<()> {
        let top = self.peek().ok_or(OpStackError::TooShallow)?;
        self.push(top);
        Ok(())
    }

    /// Pop the number of rolls (top) and the depth (second), then roll the
    /// `depth` elements below them. A single roll to depth `n` buries the top
    /// element `n` deep and moves every element above that position up by one.
    /// A negative number of rolls rolls in the opposite direction.
    pub fn roll(&mut self) -> Result<()> {
        if !self.has_at_least(2) {
            return Err(OpStackError::TooShallow);
        }
        let num_rolls = self[0];
        let depth = self[1];
        let remaining = self.len() - 2;
        if depth < 0 {
            return Err(OpStackError::NegativeRollDepth(depth));
        }
        let Ok(depth_usize) = usize::try_from(depth) else {
            return Err(OpStackError::RollDepthExceedsStack { depth, len: remaining });
        };
        if depth_usize > remaining {
            return Err(OpStackError::RollDepthExceedsStack { depth, len: remaining });
        }

        self.stack.truncate(remaining);
        if depth_usize == 0 {
            return Ok(());
        }
        let rolled_section = &mut self.stack[remaining - depth_usize..];
        let shift = usize::try_from(num_rolls.rem_euclid(depth)).unwrap_or_default();
        rolled_section.rotate_right(shift);
        Ok(())
    }

    /// Apply `operation` to the second (left-hand side) and top (right-hand
    /// side) element, replacing both with the result. The stack is unchanged if
    /// the operation fails.
    fn binary_operation<F>(&mut self, operation: F) -> Result<()>
    where
        F: FnOnce(i64, i64) -> Result<i64>,
    {
        if !self.has_at_least(2) {
            return Err(OpStackError::TooShallow);
        }
        let rhs = self[0];
        let lhs = self[1];
        let result = operation(lhs, rhs)?;
        self.stack.truncate(self.len() - 2);
        self.push(result);
        Ok(())
    }
}

fn floored_div(lhs: i64, rhs: i64) -> Result<i64> {
    if rhs == 0 {
        return Err(OpStackError::DivisionByZero);
    }
    let quotient = lhs.checked_div(rhs).ok_or(OpStackError::Overflow)?;
    let remainder = lhs % rhs;
    let needs_adjustment = remainder != 0 && ((remainder < 0) != (rhs < 0));
    Ok(if needs_adjustment { quotient - 1 } else { quotient })
}

fn floored_mod(lhs: i64, rhs: i64) -> Result<i64> {
    if rhs == 0 {
        return Err(OpStackError::DivisionByZero);
    }
    let remainder = lhs.checked_rem(rhs).ok_or(OpStackError::Overflow)?;
    let needs_adjustment = remainder != 0 && ((remainder < 0) != (rhs < 0));
    Ok(if needs_adjustment { remainder + rhs } else { remainder })
}

impl Index<usize> for OpStack {
    type Output = i64;

    fn index(&self, index: usize) -> &Self::Output {
        let top_of_stack = self.len() - 1;
        &self.stack[top_of_stack - index]
    }
}

impl From<Vec<i64>> for OpStack {
    /// The last element of the vector becomes the top of the stack.
    fn from(stack: Vec<i64>) -> Self {
        Self { stack }
    }
}

impl<const N: usize> From<[i64; N]> for OpStack {
    fn from(stack: [i64; N]) -> Self {
        Self::from(stack.to_vec())
    }
}

impl IntoIterator for OpStack {
    type Item = i64;
    type IntoIter = std::iter::Rev<std::vec::IntoIter<i64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.stack.into_iter().rev()
    }
}

impl Display for OpStack {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "[{}]", self.stack.iter().join(", "))
    }
}
