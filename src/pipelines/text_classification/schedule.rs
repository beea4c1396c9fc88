/// Fires an action every `every` global steps
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Schedule {
    every: usize,
}

impl Schedule {
    /// A schedule firing every `every` steps; zero never fires
    pub fn new(every: usize) -> Self {
        Self { every }
    }

    /// Whether the action is due after the given step
    pub fn is_due(&self, step: usize) -> bool {
        self.every > 0 && step > 0 && step % self.every == 0
    }
}
