pub fn broken() -> usize {
    "not a number"
}
