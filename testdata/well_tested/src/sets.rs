use std::collections::HashSet;

pub fn union_len(a: &HashSet<i32>, b: &HashSet<i32>) -> usize {
    a.union(b).count()
}
