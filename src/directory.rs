use std::collections::HashMap;

use thiserror::Error;

use crate::buffer::entity::FrameId;
use crate::storage::entity::{FileId, PageId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("page {1} of {0} is already indexed")]
    Duplicate(FileId, PageId),
    #[error("page {1} of {0} is not indexed")]
    NotFound(FileId, PageId),
}

/// Index from a resident page to the frame holding it.
/// Only the buffer pool may mutate it.
pub trait PageDirectory {
    fn lookup(&self, file: FileId, page_id: PageId) -> Option<FrameId>;
    fn insert(&mut self, file: FileId, page_id: PageId, frame_id: FrameId)
        -> Result<(), DirectoryError>;
    fn remove(&mut self, file: FileId, page_id: PageId) -> Result<(), DirectoryError>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct HashDirectory {
    page_table: HashMap<(FileId, PageId), FrameId>,
}

impl HashDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            page_table: HashMap::with_capacity(capacity),
        }
    }
}

impl PageDirectory for HashDirectory {
    fn lookup(&self, file: FileId, page_id: PageId) -> Option<FrameId> {
        self.page_table.get(&(file, page_id)).copied()
    }

    fn insert(
        &mut self,
        file: FileId,
        page_id: PageId,
        frame_id: FrameId,
    ) -> Result<(), DirectoryError> {
        if self.page_table.contains_key(&(file, page_id)) {
            return Err(DirectoryError::Duplicate(file, page_id));
        }
        self.page_table.insert((file, page_id), frame_id);
        Ok(())
    }

    fn remove(&mut self, file: FileId, page_id: PageId) -> Result<(), DirectoryError> {
        self.page_table
            .remove(&(file, page_id))
            .map(|_| ())
            .ok_or(DirectoryError::NotFound(file, page_id))
    }

    fn len(&self) -> usize {
        self.page_table.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_lookup_remove() {
        let mut dir = HashDirectory::new();
        let (f, g) = (FileId(1), FileId(2));
        dir.insert(f, PageId(0), FrameId(3)).unwrap();
        dir.insert(g, PageId(0), FrameId(4)).unwrap();
        assert_eq!(Some(FrameId(3)), dir.lookup(f, PageId(0)));
        assert_eq!(Some(FrameId(4)), dir.lookup(g, PageId(0)));
        assert_eq!(None, dir.lookup(f, PageId(1)));
        assert_eq!(2, dir.len());

        dir.remove(f, PageId(0)).unwrap();
        assert_eq!(None, dir.lookup(f, PageId(0)));
        assert_eq!(1, dir.len());
    }

    #[test]
    fn duplicate_and_missing() {
        let mut dir = HashDirectory::with_capacity(4);
        let f = FileId(1);
        dir.insert(f, PageId(7), FrameId(0)).unwrap();
        assert_eq!(
            Err(DirectoryError::Duplicate(f, PageId(7))),
            dir.insert(f, PageId(7), FrameId(1))
        );
        assert_eq!(Some(FrameId(0)), dir.lookup(f, PageId(7)));
        assert_eq!(
            Err(DirectoryError::NotFound(f, PageId(8))),
            dir.remove(f, PageId(8))
        );
    }
}
