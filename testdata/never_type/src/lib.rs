//! A function whose return type is `!`, which has no reasonable mutation value.

pub fn always_panics() -> ! {
    panic!("this function never returns");
}
