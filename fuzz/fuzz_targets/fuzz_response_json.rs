#![no_main]

use libfuzzer_sys::fuzz_target;
use talukscope::api::{AnalysisResult, UploadResult};

fuzz_target!(|data: &[u8]| {
    // Server replies are untrusted; decoding may fail but must never panic
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = UploadResult::from_body(s);
        if let Ok(result) = AnalysisResult::from_body(s) {
            let _ = result.present_fragments();
        }
    }
});
