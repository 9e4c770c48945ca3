use std::result::Result;

pub fn zero_is_ok(n: u32) -> Result<u32, &'static str> {
    if n == 0 {
        Ok(n)
    } else {
        Err("not zero")
    }
}
