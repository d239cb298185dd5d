#![no_main]
use libfuzzer_sys::fuzz_target;
use texshot_core::validate;

fuzz_target!(|data: &[u8]| {
    // Lossy conversion keeps inputs that are "almost" text in play.
    let s = String::from_utf8_lossy(data);
    let first = validate(&s);
    assert_eq!(first, validate(&s));
    if let Err(diagnostic) = first {
        assert_eq!(diagnostic.latex, s);
        if let Some(offset) = diagnostic.offset {
            assert!(s.is_char_boundary(offset));
        }
    }
});
