//! Example of code with strict warnings that might fail to compile.

#![forbid(unused)]

pub fn some_fn(a: usize) -> usize {
    a + 2
}
