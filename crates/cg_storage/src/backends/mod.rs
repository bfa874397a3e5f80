use rand::distributions::Alphanumeric;
use rand::Rng;

pub mod fs;
pub mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

const NAME_LEN: usize = 10;

/// `<10 random [A-Za-z0-9]>.md`
pub(crate) fn random_filename() -> String {
    let stem: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NAME_LEN)
        .map(char::from)
        .collect();
    format!("{}.md", stem)
}
