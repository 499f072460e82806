//! Stack-allocated field paths for codec error messages

use std::fmt;

#[derive(Debug, Clone, Copy)]
pub(crate) enum Segment<'a> {
    Name(&'a str),
    Index(usize),
}

impl<'a> Segment<'a> {
    /// Named segment, or the position when the name is empty
    pub(crate) fn named_or_index(name: &'a str, index: usize) -> Self {
        if name.is_empty() {
            Self::Index(index)
        } else {
            Self::Name(name)
        }
    }
}

/// Location of the value being encoded or decoded, e.g. `users[1].wallet`
///
/// Paths are chained through parent references so building one costs nothing
/// until an error actually renders it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Path<'a> {
    parent: Option<&'a Path<'a>>,
    segment: Segment<'a>,
}

impl<'a> Path<'a> {
    pub(crate) fn root(name: &'a str) -> Self {
        Self { parent: None, segment: Segment::Name(name) }
    }

    pub(crate) fn new(parent: Option<&'a Path<'a>>, segment: Segment<'a>) -> Self {
        Self { parent, segment }
    }
}

impl fmt::Display for Path<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = self.parent {
            write!(f, "{}", parent)?;
        }
        match (self.parent, self.segment) {
            (_, Segment::Index(i)) => write!(f, "[{}]", i),
            (None, Segment::Name(name)) => write!(f, "{}", name),
            (Some(_), Segment::Name(name)) => write!(f, ".{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_rendering() {
        let root = Path::root("users");
        let elem = Path::new(Some(&root), Segment::Index(1));
        let field = Path::new(Some(&elem), Segment::Name("wallet"));
        assert_eq!(field.to_string(), "users[1].wallet");
    }

    #[test]
    fn test_unnamed_slot_uses_index() {
        let path = Path::new(None, Segment::named_or_index("", 2));
        assert_eq!(path.to_string(), "[2]");
    }
}
