use std::cell::RefCell;
use std::fmt;
use std::io::Result;
use std::rc::Rc;

use super::entity::{FileId, PageId};

pub trait PagedFile {
    // 新しいページを確保する (中身はゼロ埋め)
    fn allocate_page(&mut self) -> Result<PageId>;
    // ページを解放する
    fn dispose_page(&mut self, page_id: PageId) -> Result<()>;
    // ページのデータを読み出す
    fn read_page_data(&mut self, page_id: PageId, data: &mut [u8]) -> Result<()>;
    // データをページに書き出す
    fn write_page_data(&mut self, page_id: PageId, data: &[u8]) -> Result<()>;
    // 同期処理
    fn sync(&mut self) -> Result<()>;
}

/// Shared handle to an open file. Clones compare equal and share one `FileId`.
#[derive(Clone)]
pub struct FileHandle(Rc<RefCell<dyn PagedFile>>);

impl FileHandle {
    pub fn new(file: impl PagedFile + 'static) -> Self {
        Self(Rc::new(RefCell::new(file)))
    }

    pub fn id(&self) -> FileId {
        FileId(Rc::as_ptr(&self.0) as *const () as usize)
    }

    pub fn allocate_page(&self) -> Result<PageId> {
        self.0.borrow_mut().allocate_page()
    }

    pub fn dispose_page(&self, page_id: PageId) -> Result<()> {
        self.0.borrow_mut().dispose_page(page_id)
    }

    pub fn read_page_data(&self, page_id: PageId, data: &mut [u8]) -> Result<()> {
        self.0.borrow_mut().read_page_data(page_id, data)
    }

    pub fn write_page_data(&self, page_id: PageId, data: &[u8]) -> Result<()> {
        self.0.borrow_mut().write_page_data(page_id, data)
    }

    pub fn sync(&self) -> Result<()> {
        self.0.borrow_mut().sync()
    }
}

impl<F: PagedFile + 'static> From<Rc<RefCell<F>>> for FileHandle {
    fn from(file: Rc<RefCell<F>>) -> Self {
        Self(file)
    }
}

impl PartialEq for FileHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for FileHandle {}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FileHandle").field(&self.id()).finish()
    }
}
