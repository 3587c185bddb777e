#![no_main]

use app_errors::translate;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };

    let err = translate(&value, None);
    assert_eq!(err.payload().errno(), err.errno());
    assert_eq!(err.payload().message(), err.message());
    assert!(app_errors::definitions::lookup(err.errno()).is_some());

    let again = translate(err.clone(), None);
    assert_eq!(again, err);
});
