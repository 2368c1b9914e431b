#![no_main]

use geoassist_core::IndexObject;
use geoassist_wal::TransactionRecord;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Limit input size to prevent timeout
    if data.len() > 1_000_000 {
        return;
    }

    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };

    // Decoding must never panic, and whatever decodes must re-encode to a
    // line that decodes to the same record.
    if let Ok(record) = TransactionRecord::<String, String>::decode(line) {
        let encoded = record.encode().expect("decoded record must encode");
        assert!(!encoded.contains('\n'));

        let again = TransactionRecord::<String, String>::decode(&encoded)
            .expect("encoded record must decode");
        assert_eq!(record.transaction_id(), again.transaction_id());
        assert_eq!(record.operation(), again.operation());
        assert_eq!(record.id(), again.id());
        assert_eq!(record.data(), again.data());
        assert_eq!(
            record.index_object().map(IndexObject::id),
            again.index_object().map(IndexObject::id)
        );
    }
});
