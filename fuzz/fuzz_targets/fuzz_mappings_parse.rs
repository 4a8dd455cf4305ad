#![no_main]

use libfuzzer_sys::fuzz_target;
use srg_format::MappingsFormat;

mod utils;

fuzz_target!(|data: &[u8]| {
    let Some(text) = utils::truncate_utf8(data) else {
        return;
    };

    // Malformed input must fail with an error, never a panic, and anything
    // that parses must survive a write/parse cycle unchanged.
    for format in MappingsFormat::ALL {
        let Ok(mappings) = format.parse_str(text) else {
            continue;
        };
        let written = format.to_lines(&mappings).join("\n");
        let reparsed = format
            .parse_str(&written)
            .unwrap_or_else(|err| panic!("{format} output failed to parse: {err}\n{written}"));
        assert_eq!(reparsed, mappings, "{format} round trip changed:\n{written}");
    }
});
