use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Generate a unique suffix based on timestamp + process id to avoid collisions.
pub fn unique_suffix() -> String {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}-{}", std::process::id(), ts % 1_000_000_000)
}

/// Create an empty scratch directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("answer-sensor-{name}-{}", unique_suffix()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Write `output_01.txt`, `output_02.txt`, ... into `dir`.
pub fn write_responses(dir: &Path, responses: &[&str]) {
    fs::create_dir_all(dir).unwrap();
    for (i, text) in responses.iter().enumerate() {
        fs::write(dir.join(format!("output_{:02}.txt", i + 1)), text).unwrap();
    }
}

pub fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}
