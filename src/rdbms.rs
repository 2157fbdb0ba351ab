// ファイルを使った storage manager の具体的な実装
pub mod disk;

// Clock-sweep を使った buffer pool による buffer manager の具体的な実装
pub mod clocksweep;
