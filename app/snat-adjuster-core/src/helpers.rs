pub trait With<F> {
    fn with(self, op: F) -> Self;
}

impl<T, F> With<F> for T
where
    F: FnOnce(&mut Self),
{
    fn with(mut self, op: F) -> Self {
        op(&mut self);

        self
    }
}

pub trait OrEmpty {
    fn or_empty(&self) -> &str;
}

impl OrEmpty for Option<String> {
    fn or_empty(&self) -> &str {
        self.as_deref().unwrap_or("")
    }
}
