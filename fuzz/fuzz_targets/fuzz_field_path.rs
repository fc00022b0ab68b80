#![no_main]

use formwright::primitives::{FieldPath, resolve_path};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // Use the first byte to determine the split point between path and JSON value.
    let split = data[0] as usize % data.len().max(1);
    let (path_bytes, value_bytes) = data.split_at(split.min(data.len()));

    let text = String::from_utf8_lossy(path_bytes);
    let Some(path) = FieldPath::parse(&text) else {
        return;
    };

    assert_eq!(FieldPath::parse(&path.to_string()), Some(path.clone()));

    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(value_bytes) {
        let _ = resolve_path(&path, &value);
    }
});
