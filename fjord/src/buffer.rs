//! Render target: SQL text plus the ordered arguments its `?` markers stand for

use crate::{Builder, ToValue, Value};
use std::fmt;
use std::sync::Arc;

/// One entry of a buffer's argument list.
///
/// Values are bound or interpolated; nested builders are rendered in place
/// of their `?` marker by the interpolator.
#[derive(Debug, Clone)]
pub enum Arg {
    Value(Value),
    Builder(Arc<dyn Builder>),
}

impl Arg {
    pub fn builder<B: Builder + 'static>(builder: B) -> Self {
        Arg::Builder(Arc::new(builder))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Arg::Value(v) => Some(v),
            Arg::Builder(_) => None,
        }
    }
}

impl PartialEq for Arg {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Arg::Value(a), Arg::Value(b)) => a == b,
            (Arg::Builder(a), Arg::Builder(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Arg::Value(value)
    }
}

/// Anything that can stand behind a single `?` marker.
pub trait IntoArg {
    fn into_arg(self) -> Arg;
}

impl<T: ToValue> IntoArg for T {
    fn into_arg(self) -> Arg {
        Arg::Value(self.to_value())
    }
}

impl IntoArg for Arg {
    fn into_arg(self) -> Arg {
        self
    }
}

impl IntoArg for Arc<dyn Builder> {
    fn into_arg(self) -> Arg {
        Arg::Builder(self)
    }
}

/// An ordered argument list for a raw SQL fragment.
///
/// Implemented for `()`, tuples, arrays and vectors:
/// `expr("a = ? AND b = ?", (1, "x"))`.
pub trait IntoArgs {
    fn into_args(self) -> Vec<Arg>;
}

impl IntoArgs for () {
    fn into_args(self) -> Vec<Arg> {
        Vec::new()
    }
}

impl<A: IntoArg> IntoArgs for Vec<A> {
    fn into_args(self) -> Vec<Arg> {
        self.into_iter().map(IntoArg::into_arg).collect()
    }
}

impl<A: IntoArg, const N: usize> IntoArgs for [A; N] {
    fn into_args(self) -> Vec<Arg> {
        self.into_iter().map(IntoArg::into_arg).collect()
    }
}

macro_rules! impl_into_args_tuple {
    ($($name:ident),+) => {
        impl<$($name: IntoArg),+> IntoArgs for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_args(self) -> Vec<Arg> {
                let ($($name,)+) = self;
                vec![$($name.into_arg()),+]
            }
        }
    };
}

impl_into_args_tuple!(A);
impl_into_args_tuple!(A, B);
impl_into_args_tuple!(A, B, C);
impl_into_args_tuple!(A, B, C, D);
impl_into_args_tuple!(A, B, C, D, E);
impl_into_args_tuple!(A, B, C, D, E, F);
impl_into_args_tuple!(A, B, C, D, E, F, G);
impl_into_args_tuple!(A, B, C, D, E, F, G, H);

/// Append-only SQL text with its argument list.
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    sql: String,
    args: Vec<Arg>,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_str(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    pub fn push_arg(&mut self, arg: Arg) {
        self.args.push(arg);
    }

    pub fn push_args(&mut self, args: impl IntoIterator<Item = Arg>) {
        self.args.extend(args);
    }

    /// Write a `?` marker and the argument it stands for.
    pub fn write_placeholder(&mut self, arg: Arg) {
        self.sql.push('?');
        self.args.push(arg);
    }

    pub fn as_str(&self) -> &str {
        &self.sql
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    pub fn into_parts(self) -> (String, Vec<Arg>) {
        (self.sql, self.args)
    }
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_accumulates() {
        let mut buf = Buffer::new();
        buf.write_str("a = ");
        buf.write_placeholder(Arg::from(Value::I32(1)));
        buf.write_str(" AND b IS NULL");

        assert_eq!(buf.as_str(), "a = ? AND b IS NULL");
        assert_eq!(buf.args(), &[Arg::Value(Value::I32(1))]);
        assert_eq!(buf.to_string(), "a = ? AND b IS NULL");
    }

    #[test]
    fn test_into_args() {
        let args = (1, "one", None::<i64>).into_args();
        assert_eq!(
            args,
            vec![
                Arg::Value(Value::I32(1)),
                Arg::Value(Value::String("one".into())),
                Arg::Value(Value::Null),
            ]
        );
        assert!(().into_args().is_empty());
        assert_eq!([7i64, 8].into_args().len(), 2);
    }
}
