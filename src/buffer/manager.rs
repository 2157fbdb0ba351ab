use super::entity::{FrameId, Page};
use crate::directory::DirectoryError;
use crate::storage::{
    entity::{FileId, PageId},
    manager::FileHandle,
};

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("no free buffer available in buffer pool")]
    PoolExhausted,
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error("page {page_id} of {file} is not resident")]
    PageNotResident { file: FileId, page_id: PageId },
    #[error("page {page_id} of {file} is not pinned")]
    PageNotPinned { file: FileId, page_id: PageId },
    #[error("page {page_id} of {file} is pinned")]
    PagePinned { file: FileId, page_id: PageId },
    #[error("buffer pool is inconsistent: {0}")]
    InternalInconsistency(String),
}

/// Reports a broken invariant: aborts debug builds, returns a hard error otherwise.
pub(crate) fn internal_inconsistency(detail: String) -> Error {
    log::error!("buffer pool is inconsistent: {}", detail);
    debug_assert!(false, "buffer pool is inconsistent: {}", detail);
    Error::InternalInconsistency(detail)
}

/// Every page handed out by `read_page` or `alloc_page` is pinned and must be
/// released by exactly one `unpin_page`. Page bytes are only reachable while
/// the page is pinned.
pub trait BufferPoolManager {
    // ページを取得して pin する
    fn read_page(&mut self, file: &FileHandle, page_id: PageId) -> Result<FrameId, Error>;
    // pin を外す。dirty なら書き戻し対象にする
    fn unpin_page(&mut self, file: &FileHandle, page_id: PageId, dirty: bool)
        -> Result<(), Error>;
    // 新たにページを生成して pin する
    fn alloc_page(&mut self, file: &FileHandle) -> Result<(PageId, FrameId), Error>;
    // 書き戻さずにページを捨て、ストレージからも解放する
    fn dispose_page(&mut self, file: &FileHandle, page_id: PageId) -> Result<(), Error>;
    // ファイルのページを全て書き出してバッファから追い出す
    fn flush_file(&mut self, file: &FileHandle) -> Result<(), Error>;
    // dirty なページを全てストレージに書き出す
    fn flush_all(&mut self) -> Result<(), Error>;
    // pin 済みページの中身
    fn page(&self, file: &FileHandle, page_id: PageId) -> Result<&Page, Error>;
    fn page_mut(&mut self, file: &FileHandle, page_id: PageId) -> Result<&mut Page, Error>;
}
