#![no_main]

use libfuzzer_sys::fuzz_target;
use srg_types::{Descriptor, TypeRef};

mod utils;

fuzz_target!(|data: &[u8]| {
    let Some(text) = utils::truncate_utf8(data) else {
        return;
    };

    if let Ok(desc) = Descriptor::parse(text) {
        assert_eq!(desc.to_string(), text);
    }
    if let Ok(ty) = TypeRef::from_descriptor(text) {
        assert_eq!(ty.descriptor(), text);
    }
    if let Ok(ty) = TypeRef::from_internal_name(text) {
        assert_eq!(ty.internal_name(), text);
    }
});
