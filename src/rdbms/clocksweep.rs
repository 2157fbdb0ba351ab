use std::ops::{Index, IndexMut};

use log::{debug, error, info, trace, warn};

use crate::buffer::entity::{BufStats, FrameId, Page, PAGE_SIZE};
use crate::buffer::manager::{internal_inconsistency, BufferPoolManager, Error};
use crate::directory::{HashDirectory, PageDirectory};
use crate::storage::{
    entity::{FileId, PageId},
    manager::FileHandle,
};

#[derive(Debug, Default)]
struct FrameDesc {
    owner: Option<FileHandle>,
    page_id: PageId,
    valid: bool,
    dirty: bool,
    ref_bit: bool,
    pin_count: u32,
}

impl FrameDesc {
    fn set(&mut self, file: FileHandle, page_id: PageId) {
        self.owner = Some(file);
        self.page_id = page_id;
        self.valid = true;
        self.dirty = false;
        self.ref_bit = true;
        self.pin_count = 1;
    }

    fn clear(&mut self) {
        *self = Self::default();
    }

    fn owned_by(&self, file: FileId) -> bool {
        self.owner.as_ref().map_or(false, |owner| owner.id() == file)
    }
}

// descs と slots は同じ添字で対応する
struct BufferPool {
    descs: Vec<FrameDesc>,
    slots: Vec<Page>,
    clock_hand: FrameId,
}

impl Index<FrameId> for BufferPool {
    type Output = FrameDesc;
    fn index(&self, index: FrameId) -> &Self::Output {
        &self.descs[index.0]
    }
}

impl IndexMut<FrameId> for BufferPool {
    fn index_mut(&mut self, index: FrameId) -> &mut Self::Output {
        &mut self.descs[index.0]
    }
}

impl BufferPool {
    fn new(pool_size: usize) -> Self {
        let mut descs = vec![];
        descs.resize_with(pool_size, Default::default);
        let slots = vec![[0u8; PAGE_SIZE]; pool_size];
        // 最初の advance で 0 番に来るように
        let clock_hand = FrameId(pool_size.saturating_sub(1));
        Self {
            descs,
            slots,
            clock_hand,
        }
    }

    fn size(&self) -> usize {
        self.descs.len()
    }

    fn advance_clock(&mut self) -> FrameId {
        self.clock_hand = FrameId((self.clock_hand.0 + 1) % self.size());
        self.clock_hand
    }
}

/// Buffer pool manager with second-chance (clock) replacement.
///
/// Frames are tracked in a descriptor table index-aligned with the page
/// slots. Exactly the valid frames are indexed in the page directory.
/// Dropping the manager writes back every dirty frame.
pub struct ClockSweepManager<D: PageDirectory = HashDirectory> {
    pool: BufferPool,
    directory: D,
    stats: BufStats,
}

impl ClockSweepManager<HashDirectory> {
    pub fn new(pool_size: usize) -> Self {
        let directory = HashDirectory::with_capacity(pool_size * 6 / 5 + 1);
        Self::with_directory(pool_size, directory)
    }
}

impl<D: PageDirectory> ClockSweepManager<D> {
    pub fn with_directory(pool_size: usize, directory: D) -> Self {
        info!(
            "allocating buffer pool of {} frames ({} bytes)",
            pool_size,
            pool_size * PAGE_SIZE
        );
        Self {
            pool: BufferPool::new(pool_size),
            directory,
            stats: BufStats::default(),
        }
    }

    pub fn num_frames(&self) -> usize {
        self.pool.size()
    }

    pub fn stats(&self) -> BufStats {
        self.stats
    }

    pub fn clear_stats(&mut self) {
        self.stats = BufStats::default();
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn is_resident(&self, file: &FileHandle, page_id: PageId) -> bool {
        self.directory.lookup(file.id(), page_id).is_some()
    }

    pub fn pin_count(&self, file: &FileHandle, page_id: PageId) -> Option<u32> {
        self.directory
            .lookup(file.id(), page_id)
            .map(|frame_id| self.pool[frame_id].pin_count)
    }

    // Clock-sweep
    fn alloc_buf(&mut self) -> Result<FrameId, Error> {
        let pool_size = self.pool.size();
        let mut pinned = 0;
        while pinned < pool_size {
            let frame_id = self.pool.advance_clock();
            let desc = &mut self.pool.descs[frame_id.0];
            if !desc.valid {
                desc.clear();
                return Ok(frame_id);
            }
            if desc.ref_bit {
                desc.ref_bit = false;
                continue;
            }
            if desc.pin_count > 0 {
                pinned += 1;
                continue;
            }
            let owner = match desc.owner.clone() {
                Some(owner) => owner,
                None => {
                    return Err(internal_inconsistency(format!(
                        "frame {} is valid without an owner",
                        frame_id
                    )))
                }
            };
            let page_id = desc.page_id;
            if desc.dirty {
                debug!(
                    "writing back page {} of {} from frame {}",
                    page_id,
                    owner.id(),
                    frame_id
                );
                owner.write_page_data(page_id, &self.pool.slots[frame_id.0])?;
                self.stats.disk_writes += 1;
                desc.dirty = false;
            }
            self.directory.remove(owner.id(), page_id).map_err(|err| {
                internal_inconsistency(format!("evicted frame {}: {}", frame_id, err))
            })?;
            desc.clear();
            debug!(
                "evicted page {} of {} from frame {}",
                page_id,
                owner.id(),
                frame_id
            );
            return Ok(frame_id);
        }
        Err(Error::PoolExhausted)
    }

    fn check_indexed(
        &self,
        frame_id: FrameId,
        file: &FileHandle,
        page_id: PageId,
    ) -> Result<(), Error> {
        let desc = &self.pool[frame_id];
        if desc.valid && desc.owned_by(file.id()) && desc.page_id == page_id {
            Ok(())
        } else {
            Err(internal_inconsistency(format!(
                "page {} of {} is indexed at frame {} which holds something else",
                page_id,
                file.id(),
                frame_id
            )))
        }
    }

    fn resident_frame(&self, file: &FileHandle, page_id: PageId) -> Result<FrameId, Error> {
        let frame_id = self
            .directory
            .lookup(file.id(), page_id)
            .ok_or(Error::PageNotResident {
                file: file.id(),
                page_id,
            })?;
        self.check_indexed(frame_id, file, page_id)?;
        Ok(frame_id)
    }

    fn pinned_frame(&self, file: &FileHandle, page_id: PageId) -> Result<FrameId, Error> {
        let frame_id = self.resident_frame(file, page_id)?;
        if self.pool[frame_id].pin_count == 0 {
            return Err(Error::PageNotPinned {
                file: file.id(),
                page_id,
            });
        }
        Ok(frame_id)
    }
}

impl<D: PageDirectory> BufferPoolManager for ClockSweepManager<D> {
    fn read_page(&mut self, file: &FileHandle, page_id: PageId) -> Result<FrameId, Error> {
        self.stats.accesses += 1;
        if let Some(frame_id) = self.directory.lookup(file.id(), page_id) {
            self.check_indexed(frame_id, file, page_id)?;
            let desc = &mut self.pool[frame_id];
            desc.ref_bit = true;
            desc.pin_count += 1;
            trace!(
                "hit page {} of {} in frame {} (pin {})",
                page_id,
                file.id(),
                frame_id,
                desc.pin_count
            );
            return Ok(frame_id);
        }
        let frame_id = self.alloc_buf()?;
        debug!(
            "reading page {} of {} into frame {}",
            page_id,
            file.id(),
            frame_id
        );
        file.read_page_data(page_id, &mut self.pool.slots[frame_id.0])?;
        self.stats.disk_reads += 1;
        self.directory.insert(file.id(), page_id, frame_id)?;
        self.pool[frame_id].set(file.clone(), page_id);
        Ok(frame_id)
    }

    fn unpin_page(
        &mut self,
        file: &FileHandle,
        page_id: PageId,
        dirty: bool,
    ) -> Result<(), Error> {
        let frame_id = self.resident_frame(file, page_id)?;
        let desc = &mut self.pool[frame_id];
        if desc.pin_count == 0 {
            return Err(Error::PageNotPinned {
                file: file.id(),
                page_id,
            });
        }
        desc.pin_count -= 1;
        if dirty {
            desc.dirty = true;
        }
        Ok(())
    }

    fn alloc_page(&mut self, file: &FileHandle) -> Result<(PageId, FrameId), Error> {
        // フレームを先に確保し、満杯ならファイルに触れない
        let frame_id = self.alloc_buf()?;
        let page_id = file.allocate_page()?;
        if let Err(err) = self.directory.insert(file.id(), page_id, frame_id) {
            warn!(
                "returning page {} to {} after failed indexing: {}",
                page_id,
                file.id(),
                err
            );
            if let Err(dispose_err) = file.dispose_page(page_id) {
                warn!("failed to return page {}: {}", page_id, dispose_err);
            }
            return Err(err.into());
        }
        // 確保直後のページはゼロ埋めなので読み込まない
        self.pool.slots[frame_id.0].fill(0);
        self.pool[frame_id].set(file.clone(), page_id);
        debug!(
            "allocated page {} of {} in frame {}",
            page_id,
            file.id(),
            frame_id
        );
        Ok((page_id, frame_id))
    }

    fn dispose_page(&mut self, file: &FileHandle, page_id: PageId) -> Result<(), Error> {
        if let Some(frame_id) = self.directory.lookup(file.id(), page_id) {
            self.check_indexed(frame_id, file, page_id)?;
            if self.pool[frame_id].pin_count > 0 {
                return Err(Error::PagePinned {
                    file: file.id(),
                    page_id,
                });
            }
            self.directory.remove(file.id(), page_id)?;
            self.pool[frame_id].clear();
            self.pool.slots[frame_id.0].fill(0);
            debug!(
                "discarded page {} of {} from frame {}",
                page_id,
                file.id(),
                frame_id
            );
        }
        file.dispose_page(page_id)?;
        Ok(())
    }

    fn flush_file(&mut self, file: &FileHandle) -> Result<(), Error> {
        let file_id = file.id();
        for (i, desc) in self.pool.descs.iter().enumerate() {
            if !desc.owned_by(file_id) {
                continue;
            }
            if !desc.valid {
                return Err(internal_inconsistency(format!(
                    "frame {} is owned by {} but invalid",
                    i, file_id
                )));
            }
            if desc.pin_count > 0 {
                return Err(Error::PagePinned {
                    file: file_id,
                    page_id: desc.page_id,
                });
            }
        }

        // 全て書き出せてから追い出す
        let mut written = false;
        for i in 0..self.pool.size() {
            let desc = &mut self.pool.descs[i];
            if !(desc.owned_by(file_id) && desc.dirty) {
                continue;
            }
            debug!("flushing page {} of {} from frame {}", desc.page_id, file_id, i);
            file.write_page_data(desc.page_id, &self.pool.slots[i])?;
            self.stats.disk_writes += 1;
            desc.dirty = false;
            written = true;
        }
        if written {
            file.sync()?;
        }

        for i in 0..self.pool.size() {
            let desc = &mut self.pool.descs[i];
            if !desc.owned_by(file_id) {
                continue;
            }
            self.directory.remove(file_id, desc.page_id).map_err(|err| {
                internal_inconsistency(format!("flushed frame {}: {}", i, err))
            })?;
            desc.clear();
        }
        Ok(())
    }

    fn flush_all(&mut self) -> Result<(), Error> {
        let mut first_err = None;
        let mut written: Vec<FileHandle> = vec![];
        for i in 0..self.pool.size() {
            let desc = &mut self.pool.descs[i];
            if !(desc.valid && desc.dirty) {
                continue;
            }
            let owner = match desc.owner.clone() {
                Some(owner) => owner,
                None => {
                    let err = internal_inconsistency(format!("frame {} has no owner", i));
                    first_err.get_or_insert(err);
                    continue;
                }
            };
            debug!("flushing page {} of {} from frame {}", desc.page_id, owner.id(), i);
            match owner.write_page_data(desc.page_id, &self.pool.slots[i]) {
                Ok(()) => {
                    self.stats.disk_writes += 1;
                    desc.dirty = false;
                    if !written.contains(&owner) {
                        written.push(owner);
                    }
                }
                Err(err) => {
                    error!("failed to write back page {}: {}", desc.page_id, err);
                    first_err.get_or_insert(Error::from(err));
                }
            }
        }
        for file in &written {
            if let Err(err) = file.sync() {
                first_err.get_or_insert(Error::from(err));
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn page(&self, file: &FileHandle, page_id: PageId) -> Result<&Page, Error> {
        let frame_id = self.pinned_frame(file, page_id)?;
        Ok(&self.pool.slots[frame_id.0])
    }

    fn page_mut(&mut self, file: &FileHandle, page_id: PageId) -> Result<&mut Page, Error> {
        let frame_id = self.pinned_frame(file, page_id)?;
        Ok(&mut self.pool.slots[frame_id.0])
    }
}

impl<D: PageDirectory> Drop for ClockSweepManager<D> {
    fn drop(&mut self) {
        if let Err(err) = self.flush_all() {
            error!("buffer pool shut down with unwritten pages: {}", err);
        }
    }
}
