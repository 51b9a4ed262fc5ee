// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

#![no_main]

use libfuzzer_sys::fuzz_target;
use neonfolio::ingest::ingest_bytes;
use neonfolio::model::ImageRef;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let image = ImageRef::parse(text);
        // Parsing the textual form again is stable
        assert_eq!(ImageRef::parse(&image.to_string()), image);
        if let ImageRef::Embedded(encoded) = &image {
            let _ = encoded.decode();
        }
    }

    match ingest_bytes(data, None, None) {
        ImageRef::Embedded(encoded) => assert_eq!(encoded.decode().ok().as_deref(), Some(data)),
        ImageRef::Remote(_) => unreachable!("ingestion always embeds"),
    }
});
