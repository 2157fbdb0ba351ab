use anyhow::{Context, Result};
use log::info;

use minibuf::buffer::{guard::PinnedPage, manager::BufferPoolManager};
use minibuf::config::Config;
use minibuf::logger::setup_logger;
use minibuf::rdbms::{clocksweep::ClockSweepManager, disk::DiskFile};
use minibuf::storage::manager::FileHandle;

fn main() -> Result<()> {
    setup_logger();

    // config
    let config = Config::from_env()?;
    let disk = DiskFile::open(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    let file = FileHandle::new(disk);
    let mut bufmgr = ClockSweepManager::new(config.num_frames);

    // pool の倍のページを書いて追い出しを起こす
    let mut page_ids = vec![];
    for i in 0..config.num_frames * 2 {
        let mut page = PinnedPage::create(&mut bufmgr, &file)?;
        let text = format!("page #{}", i);
        page.data_mut()?[..text.len()].copy_from_slice(text.as_bytes());
        page_ids.push(page.page_id());
    }

    for &page_id in &page_ids {
        let page = PinnedPage::fetch(&mut bufmgr, &file, page_id)?;
        let data = page.data()?;
        let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
        info!("page {}: {}", page_id, String::from_utf8_lossy(&data[..end]));
    }

    bufmgr.flush_file(&file)?;
    println!("{:?}", bufmgr.stats());

    Ok(())
}
