#![no_main]

use libfuzzer_sys::fuzz_target;
use serde_json::json;
use tether_template::compile;

fuzz_target!(|data: &[u8]| {
    if let Ok(template) = std::str::from_utf8(data) {
        let snapshot = json!({
            "a": {"b": 0, "c": "", "d": false},
            "items": [1, "two", {"x": null}],
        });
        let _ = compile(template, &snapshot);
    }
});
