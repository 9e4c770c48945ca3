static GREETING: &str = "hello";

pub fn greeting() -> &'static str {
    GREETING
}
