#![no_main]

use libfuzzer_sys::fuzz_target;
use submission_protocol::core::checksum;
use submission_protocol::protocol::message::{Exchange, Request, Response};

fuzz_target!(|data: &[u8]| {
    // Decoding untrusted bytes must never panic, whatever the exchange
    for exchange in [Exchange::Login, Exchange::Submission, Exchange::Logout] {
        let mut buf = data.to_vec();
        let _ = Response::decode(&mut buf, exchange);
    }

    // Same bytes with a valid checksum reach the field readers
    let mut stamped = data.to_vec();
    if checksum::stamp(&mut stamped).is_some() {
        let _ = Request::from_bytes(&mut stamped.clone());
        let _ = Response::decode(&mut stamped, Exchange::Login);
    }
});
