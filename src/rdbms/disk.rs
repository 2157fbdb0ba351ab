use std::convert::TryInto;
use std::fs::{File, OpenOptions};
use std::io::{prelude::*, Error, ErrorKind, Result, SeekFrom};
use std::path::Path;

use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::config::PAGE_SIZE;
use crate::storage::memory::bad_page;
use crate::storage::{entity::PageId, manager::PagedFile};

const HEADER_PAGE_ID: PageId = PageId(0);
const HEADER_LEN_SIZE: usize = 4;

// ヘッダページ (0 番) に置く確保状態
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct FileHeader {
    next_page_id: u64,
    free_pages: Vec<u64>,
}

impl FileHeader {
    fn to_page(&self) -> Result<Vec<u8>> {
        let body = bincode::options()
            .serialize(self)
            .map_err(|e| Error::new(ErrorKind::InvalidData, e.to_string()))?;
        if HEADER_LEN_SIZE + body.len() > PAGE_SIZE {
            return Err(Error::new(
                ErrorKind::Other,
                "too many free pages to fit in the header page",
            ));
        }
        let mut page = vec![0u8; PAGE_SIZE];
        page[..HEADER_LEN_SIZE].copy_from_slice(&(body.len() as u32).to_le_bytes());
        page[HEADER_LEN_SIZE..HEADER_LEN_SIZE + body.len()].copy_from_slice(&body);
        Ok(page)
    }

    fn from_page(page: &[u8]) -> Result<Self> {
        let len_bytes: [u8; HEADER_LEN_SIZE] = page[..HEADER_LEN_SIZE]
            .try_into()
            .map_err(|_| Error::new(ErrorKind::InvalidData, "short header page"))?;
        let len = u32::from_le_bytes(len_bytes) as usize;
        if HEADER_LEN_SIZE + len > page.len() {
            return Err(Error::new(ErrorKind::InvalidData, "corrupt header page"));
        }
        bincode::options()
            .deserialize(&page[HEADER_LEN_SIZE..HEADER_LEN_SIZE + len])
            .map_err(|e| Error::new(ErrorKind::InvalidData, e.to_string()))
    }
}

/// A `PagedFile` stored in a heap file. Page 0 holds the allocation state,
/// data pages start at 1.
pub struct DiskFile {
    // ヒープファイルのファイルディスクリプタ
    heap_file: File,
    header: FileHeader,
}

impl DiskFile {
    pub fn new(mut heap_file: File) -> Result<Self> {
        let heap_file_size = heap_file.metadata()?.len();
        if heap_file_size == 0 {
            let mut disk = Self {
                heap_file,
                header: FileHeader::default(),
            };
            disk.commit_header(FileHeader {
                next_page_id: HEADER_PAGE_ID.to_u64() + 1,
                free_pages: vec![],
            })?;
            return Ok(disk);
        }
        let mut page = vec![0u8; PAGE_SIZE];
        heap_file.seek(SeekFrom::Start(0))?;
        heap_file.read_exact(&mut page)?;
        let header = FileHeader::from_page(&page)?;
        Ok(Self { heap_file, header })
    }

    pub fn open(heap_file_path: impl AsRef<Path>) -> Result<Self> {
        let heap_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(heap_file_path)?;
        Self::new(heap_file)
    }

    pub fn num_pages(&self) -> u64 {
        self.header.next_page_id - 1 - self.header.free_pages.len() as u64
    }

    fn is_allocated(&self, page_id: PageId) -> bool {
        let id = page_id.to_u64();
        id != HEADER_PAGE_ID.to_u64()
            && id < self.header.next_page_id
            && !self.header.free_pages.contains(&id)
    }

    // ディスクに書けたときだけ確保状態を差し替える
    fn commit_header(&mut self, header: FileHeader) -> Result<()> {
        let page = header.to_page()?;
        self.write_raw(HEADER_PAGE_ID, &page)?;
        self.header = header;
        Ok(())
    }

    fn write_raw(&mut self, page_id: PageId, data: &[u8]) -> Result<()> {
        // オフセットを計算
        let offset = PAGE_SIZE as u64 * page_id.to_u64();
        // ページ先頭へシーク
        self.heap_file.seek(SeekFrom::Start(offset))?;
        // データを書きこむ
        self.heap_file.write_all(data)
    }
}

impl PagedFile for DiskFile {
    fn allocate_page(&mut self) -> Result<PageId> {
        let mut header = self.header.clone();
        let page_id = match header.free_pages.pop() {
            Some(page_id) => page_id,
            None => {
                let page_id = header.next_page_id;
                header.next_page_id += 1;
                page_id
            }
        };
        let page_id = PageId(page_id);
        self.write_raw(page_id, &[0u8; PAGE_SIZE])?;
        self.commit_header(header)?;
        Ok(page_id)
    }
    fn dispose_page(&mut self, page_id: PageId) -> Result<()> {
        if !self.is_allocated(page_id) {
            return Err(bad_page(page_id));
        }
        let mut header = self.header.clone();
        header.free_pages.push(page_id.to_u64());
        self.commit_header(header)
    }
    fn read_page_data(&mut self, page_id: PageId, data: &mut [u8]) -> Result<()> {
        if !self.is_allocated(page_id) {
            return Err(bad_page(page_id));
        }
        let offset = PAGE_SIZE as u64 * page_id.to_u64();
        self.heap_file.seek(SeekFrom::Start(offset))?;
        // データを読み出す
        self.heap_file.read_exact(data)
    }
    fn write_page_data(&mut self, page_id: PageId, data: &[u8]) -> Result<()> {
        if !self.is_allocated(page_id) {
            return Err(bad_page(page_id));
        }
        self.write_raw(page_id, data)
    }
    fn sync(&mut self) -> Result<()> {
        self.heap_file.flush()?;
        self.heap_file.sync_all()
    }
}
