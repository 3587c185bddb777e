#![no_main]

use app_errors::{translate, UpstreamFailure};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let reason = String::from_utf8_lossy(data).into_owned();
    let err = translate(UpstreamFailure::with_reason(reason), None);

    let mut line = String::new();
    err.internal_log().write_to(&mut line).unwrap();
    assert!(line.len() < 4096);
    assert!(!err.to_string().contains(line.as_str()));
});
