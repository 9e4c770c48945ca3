pub struct Wrapper<'a> {
    inner: &'a str,
}

impl<'a> Wrapper<'a> {
    pub fn new(inner: &'a str) -> Self {
        Wrapper { inner }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}
