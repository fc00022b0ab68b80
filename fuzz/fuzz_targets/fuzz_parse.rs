#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    if let Ok(definition) = formwright::parse(&s) {
        let _ = formwright::lint(&definition);
        let _ = formwright::introspect(&definition.schema, &definition.overrides);
    }
});
