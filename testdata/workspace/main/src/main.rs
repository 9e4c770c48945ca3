use cargo_mutants_testdata_workspace_utils::{add, is_even};

fn main() {
    println!("{}", add(2, 3));
    println!("{}", is_even(4));
}

fn double(a: i32) -> i32 {
    a * 2
}
