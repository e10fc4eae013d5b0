use mindsync_core::REPLICATED_TABLES;

/// Handle `msync tables`.
pub fn handle() {
    for table in REPLICATED_TABLES {
        println!("{table}");
    }
}
