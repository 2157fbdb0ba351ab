use super::entity::{FrameId, Page};
use super::manager::{BufferPoolManager, Error};
use crate::storage::{entity::PageId, manager::FileHandle};

/// A pinned page that unpins itself when dropped.
///
/// The guard borrows the buffer pool mutably, so the page bytes cannot be
/// reached once the pin is gone.
pub struct PinnedPage<'a, T: BufferPoolManager + ?Sized> {
    bufmgr: &'a mut T,
    file: FileHandle,
    page_id: PageId,
    frame_id: FrameId,
    dirty: bool,
}

impl<'a, T: BufferPoolManager + ?Sized> PinnedPage<'a, T> {
    pub fn fetch(bufmgr: &'a mut T, file: &FileHandle, page_id: PageId) -> Result<Self, Error> {
        let frame_id = bufmgr.read_page(file, page_id)?;
        Ok(Self {
            bufmgr,
            file: file.clone(),
            page_id,
            frame_id,
            dirty: false,
        })
    }

    pub fn create(bufmgr: &'a mut T, file: &FileHandle) -> Result<Self, Error> {
        let (page_id, frame_id) = bufmgr.alloc_page(file)?;
        Ok(Self {
            bufmgr,
            file: file.clone(),
            page_id,
            frame_id,
            dirty: false,
        })
    }

    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn data(&self) -> Result<&Page, Error> {
        self.bufmgr.page(&self.file, self.page_id)
    }

    pub fn data_mut(&mut self) -> Result<&mut Page, Error> {
        let page = self.bufmgr.page_mut(&self.file, self.page_id)?;
        self.dirty = true;
        Ok(page)
    }
}

impl<T: BufferPoolManager + ?Sized> Drop for PinnedPage<'_, T> {
    fn drop(&mut self) {
        if let Err(err) = self.bufmgr.unpin_page(&self.file, self.page_id, self.dirty) {
            log::error!("failed to unpin page {}: {}", self.page_id, err);
        }
    }
}
