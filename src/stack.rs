/// The shape of an open group
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Frame {
    Object,
    Array,
}

/// Shapes of the currently open groups, innermost last. The depth always
/// equals the brace nesting depth of the input read so far.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct FrameStack {
    values: Vec<Frame>,
}

impl FrameStack {
    pub fn new() -> Self {
        FrameStack::default()
    }

    pub fn push(&mut self, val: Frame) {
        self.values.push(val);
    }

    pub fn pop(&mut self) -> Option<Frame> {
        self.values.pop()
    }

    /// The innermost open group
    #[inline]
    pub fn last(&self) -> Option<Frame> {
        self.values.last().copied()
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
