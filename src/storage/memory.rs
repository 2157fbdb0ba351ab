use std::io::{Error, ErrorKind, Read, Result, Write};

use zerocopy::AsBytes;

use super::entity::PageId;
use super::manager::PagedFile;
use crate::config::PAGE_SIZE;

/// A `PagedFile` kept entirely in memory. Disposed pages are recycled.
#[derive(Default)]
pub struct MemoryFile {
    heap: Vec<[u8; PAGE_SIZE]>,
    allocated: Vec<bool>,
    free_pages: Vec<u64>,
}

impl MemoryFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_allocated(&self) -> usize {
        self.allocated.iter().filter(|&&a| a).count()
    }

    fn slot(&self, page_id: PageId) -> Result<usize> {
        let index = page_id.to_u64() as usize;
        if self.allocated.get(index).copied().unwrap_or(false) {
            Ok(index)
        } else {
            Err(bad_page(page_id))
        }
    }
}

pub(crate) fn bad_page(page_id: PageId) -> Error {
    Error::new(
        ErrorKind::InvalidInput,
        format!("page {} is not allocated", page_id),
    )
}

impl PagedFile for MemoryFile {
    fn allocate_page(&mut self) -> Result<PageId> {
        if let Some(page_id) = self.free_pages.pop() {
            let index = page_id as usize;
            self.heap[index] = [0; PAGE_SIZE];
            self.allocated[index] = true;
            return Ok(PageId(page_id));
        }
        let page_id = self.heap.len() as u64;
        self.heap.push([0; PAGE_SIZE]);
        self.allocated.push(true);
        Ok(PageId(page_id))
    }
    fn dispose_page(&mut self, page_id: PageId) -> Result<()> {
        let index = self.slot(page_id)?;
        self.allocated[index] = false;
        self.free_pages.push(page_id.to_u64());
        Ok(())
    }
    fn read_page_data(&mut self, page_id: PageId, data: &mut [u8]) -> Result<()> {
        let index = self.slot(page_id)?;
        let mut row: &[u8] = self.heap[index].as_bytes();
        row.read_exact(data)?;
        Ok(())
    }
    fn write_page_data(&mut self, page_id: PageId, data: &[u8]) -> Result<()> {
        let index = self.slot(page_id)?;
        let buf: &[u8] = data.as_bytes();
        let mut row: &mut [u8] = self.heap[index].as_bytes_mut();
        row.write_all(buf)?;
        Ok(())
    }
    fn sync(&mut self) -> Result<()> {
        Ok(())
    }
}
