#![no_main]

use libfuzzer_sys::fuzz_target;
use tether_dom::parse_fragment;

fuzz_target!(|data: &[u8]| {
    if let Ok(markup) = std::str::from_utf8(data) {
        let doc = parse_fragment(markup);
        // Serialization of whatever tree came out must not panic either.
        let _ = doc.inner_markup(doc.root());
    }
});
