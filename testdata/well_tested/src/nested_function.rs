fn has_nested() -> u32 {
    fn inner() -> u32 {
        12
    }
    inner() * inner()
}
