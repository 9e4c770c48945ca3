use cargo_mutants_testdata_workspace_utils::multiply;

fn main() {
    println!("{}", multiply(2, 3));
}

fn square(a: i32) -> i32 {
    a * a
}
