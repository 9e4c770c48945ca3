pub mod greeting {
    pub fn hello() -> &'static str {
        "hello"
    }
}

#[cfg(test)]
mod test {
    #[test]
    fn test_hello() {
        assert_eq!(super::greeting::hello(), "hello");
    }
}
