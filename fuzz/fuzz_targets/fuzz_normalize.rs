#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // The first byte splits the input into a definition and a JSON value.
    let split = data[0] as usize % data.len().max(1);
    let (yaml_bytes, value_bytes) = data.split_at(split.min(data.len()));

    let yaml = String::from_utf8_lossy(yaml_bytes);
    let Ok(definition) = formwright::parse(&yaml) else {
        return;
    };
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(value_bytes) else {
        return;
    };

    let once = formwright::normalize_value(&definition.schema, &value);
    let twice = formwright::normalize_value(&definition.schema, &once);
    assert_eq!(once, twice);
});
