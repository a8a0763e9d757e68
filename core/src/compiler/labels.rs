//! Label table for forward and backward jump targets.

use core::fmt;

use tracing::trace;

use super::error::ErrorKind;

/// Placeholder for a not-yet-known script offset.
///
/// Jumps and calls are emitted with the label index as their operand; the
/// linker rewrites it to a relative displacement once every offset is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(u16);

impl Label {
    pub fn index(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct LabelTable {
    offsets: Vec<Option<usize>>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new, unresolved label.
    pub fn new_label(&mut self) -> Result<Label, ErrorKind> {
        let index = u16::try_from(self.offsets.len()).map_err(|_| ErrorKind::TooManyLabels)?;
        self.offsets.push(None);
        Ok(Label(index))
    }

    /// Resolve `label` to `offset`, the position of the next emitted byte.
    pub fn set(&mut self, label: Label, offset: usize) -> Result<(), ErrorKind> {
        let slot = self
            .offsets
            .get_mut(label.0 as usize)
            .ok_or(ErrorKind::UnknownLabel(label.0))?;
        if slot.is_some() {
            return Err(ErrorKind::LabelResolvedTwice(label.0));
        }
        trace!(%label, offset, "Resolved label");
        *slot = Some(offset);
        Ok(())
    }

    /// Offset of the label stored as a jump operand.
    pub fn resolve(&self, index: u16) -> Result<usize, ErrorKind> {
        match self.offsets.get(index as usize) {
            Some(Some(offset)) => Ok(*offset),
            Some(None) => Err(ErrorKind::UnresolvedLabel(index)),
            None => Err(ErrorKind::UnknownLabel(index)),
        }
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_dense_and_resolved_once() {
        let mut labels = LabelTable::new();
        let a = labels.new_label().unwrap();
        let b = labels.new_label().unwrap();
        assert_eq!((a.index(), b.index()), (0, 1));

        assert_eq!(labels.resolve(0), Err(ErrorKind::UnresolvedLabel(0)));
        labels.set(a, 7).unwrap();
        assert_eq!(labels.resolve(0), Ok(7));
        assert_eq!(labels.set(a, 9), Err(ErrorKind::LabelResolvedTwice(0)));
        assert_eq!(labels.resolve(5), Err(ErrorKind::UnknownLabel(5)));
    }

    #[test]
    fn test_label_limit() {
        let mut labels = LabelTable::new();
        for _ in 0..=u16::MAX as usize {
            labels.new_label().unwrap();
        }
        assert_eq!(labels.new_label(), Err(ErrorKind::TooManyLabels));
    }
}
